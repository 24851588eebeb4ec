use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::warn;

use super::super::domain::{
    ApplicationId, DestinationId, TravelerProfile, TripDestination,
};
use super::super::notifications::{
    Notice, NotificationDispatcher, NotificationKind,
};
use super::super::repository::{
    ApplicationStore, DocumentInventory, StoreError, TripStore, VisaRuleStore,
};
use super::super::timeline::calculate_timeline;
use super::super::trips::{TripError, TripService};
use super::domain::{
    progress_percentage, ApplicationStatus, DocumentCompleteness, StatusActor, StatusChange,
    StatusUpdate, TrackingView, VisaApplication,
};

#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error("visa application not found")]
    NotFound,
    #[error("trip destination not found: {0}")]
    DestinationNotFound(DestinationId),
    #[error("no active visa rule found for this destination")]
    RuleNotFound,
    #[error("visa is not required for this destination")]
    VisaNotRequired,
    #[error("invalid status transition: {from} -> {requested}")]
    InvalidTransition {
        from: ApplicationStatus,
        requested: ApplicationStatus,
    },
    #[error("{field} is required to enter {status}")]
    MissingDate {
        field: &'static str,
        status: ApplicationStatus,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Trip(#[from] TripError),
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// Orchestrates the application lifecycle: duplicate-safe starts, the
/// status state machine, document-driven auto-advance, and the
/// notification and trip-recalculation side effects of every transition.
pub struct VisaApplicationService<A, T, R, D, N> {
    applications: Arc<A>,
    documents: Arc<D>,
    notifier: Arc<N>,
    trips: TripService<T, R>,
}

impl<A, T, R, D, N> VisaApplicationService<A, T, R, D, N>
where
    A: ApplicationStore,
    T: TripStore,
    R: VisaRuleStore,
    D: DocumentInventory,
    N: NotificationDispatcher,
{
    pub fn new(
        applications: Arc<A>,
        documents: Arc<D>,
        notifier: Arc<N>,
        trips: TripService<T, R>,
    ) -> Self {
        Self {
            applications,
            documents,
            notifier,
            trips,
        }
    }

    /// Start tracking a visa pursuit for a trip destination. Visa-free
    /// destinations are rejected; a duplicate start returns the existing
    /// record instead of erroring.
    pub fn start(
        &self,
        traveler: &TravelerProfile,
        destination_id: &DestinationId,
        today: NaiveDate,
    ) -> Result<VisaApplication, ApplicationError> {
        let destination = self.fetch_destination(destination_id)?;

        if !destination.visa_required {
            return Err(ApplicationError::VisaNotRequired);
        }

        if let Some(existing) = self
            .applications
            .find_for_destination(&traveler.user_id, destination_id)?
        {
            return Ok(existing);
        }

        let rule = self
            .trips
            .matching_rule(
                &traveler.passport_country,
                &destination.country_code,
                destination.travel_purpose,
            )?
            .ok_or(ApplicationError::RuleNotFound)?;

        let timeline =
            calculate_timeline(Some(rule.processing_time_max), destination.entry_date, None);

        let application = VisaApplication {
            id: next_application_id(),
            user_id: traveler.user_id.clone(),
            trip_id: Some(destination.trip_id.clone()),
            trip_destination_id: destination.id.clone(),
            rule_id: Some(rule.id.clone()),
            destination_country: destination.country_code.clone(),
            status: ApplicationStatus::NotStarted,
            status_history: vec![StatusChange {
                status: ApplicationStatus::NotStarted,
                changed_at: today,
                changed_by: StatusActor::System,
                note: Some("Application created".to_string()),
            }],
            appointment_date: None,
            submission_date: None,
            decision_date: None,
            expected_decision_date: None,
            latest_submission_date: Some(timeline.latest_submission_date),
            recommended_submission_date: Some(timeline.recommended_submission_date),
        };

        let stored = self.applications.insert(application)?;

        if let Some(trip_id) = stored.trip_id.clone() {
            self.trips.recalculate(&trip_id, today)?;
        }

        Ok(stored)
    }

    /// Drive the status state machine. Every successful transition appends
    /// a history entry, fires a status notification, and triggers trip
    /// recalculation when the application is trip-linked.
    pub fn update_status(
        &self,
        id: &ApplicationId,
        requested: ApplicationStatus,
        update: StatusUpdate,
        today: NaiveDate,
    ) -> Result<VisaApplication, ApplicationError> {
        let mut application = self
            .applications
            .fetch(id)?
            .ok_or(ApplicationError::NotFound)?;

        let current = application.status;
        if !current.can_transition_to(requested) {
            return Err(ApplicationError::InvalidTransition {
                from: current,
                requested,
            });
        }

        if requested == ApplicationStatus::AppointmentBooked && update.appointment_date.is_none() {
            return Err(ApplicationError::MissingDate {
                field: "appointment_date",
                status: requested,
            });
        }

        if requested == ApplicationStatus::Submitted {
            let Some(submission_date) = update.submission_date else {
                return Err(ApplicationError::MissingDate {
                    field: "submission_date",
                    status: requested,
                });
            };
            let destination = self.fetch_destination(&application.trip_destination_id)?;
            let timeline = calculate_timeline(
                destination.processing_time_max,
                destination.entry_date,
                Some(submission_date),
            );
            application.expected_decision_date = timeline.expected_decision_date;
        }

        if requested == ApplicationStatus::UnderReview
            && application.expected_decision_date == Some(today)
        {
            self.notify(&application, NotificationKind::DecisionExpected);
        }

        if let Some(appointment_date) = update.appointment_date {
            application.appointment_date = Some(appointment_date);
        }
        if let Some(submission_date) = update.submission_date {
            application.submission_date = Some(submission_date);
        }
        if let Some(decision_date) = update.decision_date {
            application.decision_date = Some(decision_date);
        }

        application.status = requested;
        application.status_history.push(StatusChange {
            status: requested,
            changed_at: today,
            changed_by: StatusActor::User,
            note: update.note,
        });

        self.applications.update(application.clone())?;

        self.notify(&application, NotificationKind::StatusUpdate);

        if let Some(trip_id) = application.trip_id.clone() {
            self.trips.recalculate(&trip_id, today)?;
        }

        Ok(application)
    }

    pub fn tracking(&self, id: &ApplicationId) -> Result<TrackingView, ApplicationError> {
        let application = self
            .applications
            .fetch(id)?
            .ok_or(ApplicationError::NotFound)?;

        let completeness = self.documents.completeness(id)?;
        let progress = progress_percentage(application.status, &completeness);

        Ok(TrackingView {
            current_step: application.status,
            progress_percentage: progress,
            completeness,
            application,
        })
    }

    /// Document-upload driven check: once every mandatory document is
    /// present, a NOT_STARTED application advances to
    /// DOCUMENTS_IN_PROGRESS on its own.
    pub fn sync_documents(
        &self,
        id: &ApplicationId,
        today: NaiveDate,
    ) -> Result<DocumentCompleteness, ApplicationError> {
        let mut application = self
            .applications
            .fetch(id)?
            .ok_or(ApplicationError::NotFound)?;

        let completeness = self.documents.completeness(id)?;

        if completeness.is_complete() && application.status == ApplicationStatus::NotStarted {
            application.status = ApplicationStatus::DocumentsInProgress;
            application.status_history.push(StatusChange {
                status: ApplicationStatus::DocumentsInProgress,
                changed_at: today,
                changed_by: StatusActor::System,
                note: Some("All mandatory documents uploaded".to_string()),
            });
            self.applications.update(application)?;
        }

        Ok(completeness)
    }

    fn fetch_destination(
        &self,
        id: &DestinationId,
    ) -> Result<TripDestination, ApplicationError> {
        self.trips
            .trips()
            .fetch_destination(id)?
            .ok_or_else(|| ApplicationError::DestinationNotFound(id.clone()))
    }

    /// Delivery is fire-and-forget; a transport failure is logged and
    /// never fails the transition that caused it.
    fn notify(&self, application: &VisaApplication, kind: NotificationKind) {
        let notice = Notice::for_application(application, kind);
        if let Err(error) = self.notifier.dispatch(notice) {
            warn!(application = %application.id, ?kind, %error, "notification dispatch failed");
        }
    }
}
