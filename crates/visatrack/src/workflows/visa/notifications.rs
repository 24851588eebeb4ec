use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::applications::domain::VisaApplication;
use super::domain::{ApplicationId, UserId};
use super::repository::StoreError;

/// Closed set of user-facing alert kinds. The engine decides when and
/// which kind fires; delivery mechanics live behind the dispatcher trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    DeadlineApproaching,
    DecisionExpected,
    StatusUpdate,
    VisaApplyNow,
    VisaTimelineTight,
    VisaHighRisk,
}

impl NotificationKind {
    pub const fn title(self) -> &'static str {
        match self {
            Self::DeadlineApproaching => "Upcoming Deadline",
            Self::DecisionExpected => "Decision Expected",
            Self::StatusUpdate => "Status Updated",
            Self::VisaApplyNow => "Visa Application Reminder",
            Self::VisaTimelineTight => "Visa Timeline Tight",
            Self::VisaHighRisk => "High Risk Visa Timeline",
        }
    }

    pub fn message(self, application: &VisaApplication) -> String {
        match self {
            Self::DeadlineApproaching => {
                "Your visa submission deadline is approaching.".to_string()
            }
            Self::DecisionExpected => "Your visa decision is expected today.".to_string(),
            Self::StatusUpdate => {
                format!("Your application status is now {}", application.status.label())
            }
            Self::VisaApplyNow => "You should start your visa application now.".to_string(),
            Self::VisaTimelineTight => {
                "Your visa timeline is tight. Delays may affect your trip.".to_string()
            }
            Self::VisaHighRisk => {
                "High risk: your visa may not be ready before travel.".to_string()
            }
        }
    }
}

/// A fully rendered notification ready for a delivery channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub user_id: UserId,
    pub application_id: ApplicationId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn for_application(application: &VisaApplication, kind: NotificationKind) -> Self {
        Self {
            user_id: application.user_id.clone(),
            application_id: application.id.clone(),
            kind,
            title: kind.title().to_string(),
            message: kind.message(application),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Fire-and-forget delivery hook. At-least-once semantics are the
/// collaborator's responsibility.
pub trait NotificationDispatcher: Send + Sync {
    fn dispatch(&self, notice: Notice) -> Result<(), NotifyError>;
}

/// Idempotency key for the daily sweep: one alert per application, kind,
/// and calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertKey {
    pub application_id: ApplicationId,
    pub kind: NotificationKind,
    pub date: NaiveDate,
}

/// Records sent alerts so re-running the sweep on the same day sends
/// nothing twice.
pub trait NotificationLedger: Send + Sync {
    /// Returns true when the key was newly recorded, false when an alert
    /// with this key was already sent.
    fn record(&self, key: AlertKey) -> Result<bool, StoreError>;
}
