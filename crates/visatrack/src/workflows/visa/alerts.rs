use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::applications::domain::VisaApplication;
use super::notifications::{
    AlertKey, Notice, NotificationDispatcher, NotificationKind, NotificationLedger,
};
use super::repository::{ApplicationStore, StoreError};
use super::timeline::{TimelineRisk, VisaTimeline};

const DEADLINE_WINDOW_DAYS: i64 = 7;

#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub scanned: u32,
    pub notified: u32,
    pub suppressed_duplicates: u32,
}

/// Daily scan over open applications for deadline and timeline-risk
/// escalation. Idempotent per day: each (application, kind, date) alert is
/// recorded in the ledger before dispatch, so re-running the sweep sends
/// nothing twice.
pub struct AlertSweep<A, N, L> {
    applications: Arc<A>,
    notifier: Arc<N>,
    ledger: Arc<L>,
}

impl<A, N, L> AlertSweep<A, N, L>
where
    A: ApplicationStore,
    N: NotificationDispatcher,
    L: NotificationLedger,
{
    pub fn new(applications: Arc<A>, notifier: Arc<N>, ledger: Arc<L>) -> Self {
        Self {
            applications,
            notifier,
            ledger,
        }
    }

    pub fn run(&self, today: NaiveDate) -> Result<SweepReport, SweepError> {
        let mut report = SweepReport::default();

        for application in self.applications.open_applications()? {
            report.scanned += 1;

            for kind in classify_alerts(&application, today) {
                let newly_recorded = self.ledger.record(AlertKey {
                    application_id: application.id.clone(),
                    kind,
                    date: today,
                })?;

                if !newly_recorded {
                    report.suppressed_duplicates += 1;
                    continue;
                }

                let notice = Notice::for_application(&application, kind);
                match self.notifier.dispatch(notice) {
                    Ok(()) => report.notified += 1,
                    Err(error) => {
                        warn!(application = %application.id, ?kind, %error, "alert dispatch failed");
                    }
                }
            }
        }

        info!(
            scanned = report.scanned,
            notified = report.notified,
            suppressed = report.suppressed_duplicates,
            "visa alert sweep finished"
        );

        Ok(report)
    }
}

/// Which alerts an open application earns today: at most one timeline-risk
/// alert, plus the deadline-approaching reminder inside its window.
fn classify_alerts(application: &VisaApplication, today: NaiveDate) -> Vec<NotificationKind> {
    let (Some(latest), Some(recommended)) = (
        application.latest_submission_date,
        application.recommended_submission_date,
    ) else {
        return Vec::new();
    };

    let timeline = VisaTimeline {
        latest_submission_date: latest,
        recommended_submission_date: recommended,
        expected_decision_date: application.expected_decision_date,
    };

    let mut kinds = Vec::new();
    match timeline.risk(today) {
        TimelineRisk::High => kinds.push(NotificationKind::VisaHighRisk),
        TimelineRisk::Tight => kinds.push(NotificationKind::VisaTimelineTight),
        TimelineRisk::ApplyNow => kinds.push(NotificationKind::VisaApplyNow),
        TimelineRisk::OnTrack => {}
    }

    let days_left = (latest - today).num_days();
    if (0..=DEADLINE_WINDOW_DAYS).contains(&days_left) {
        kinds.push(NotificationKind::DeadlineApproaching);
    }

    kinds
}
