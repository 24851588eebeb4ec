use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::super::domain::{
    ApplicationId, CountryCode, DestinationId, RuleId, TripId, UserId,
};

/// Lifecycle of one visa pursuit. The main chain runs NOT_STARTED through
/// APPROVED/REJECTED; the remaining states are side exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    NotStarted,
    DocumentsInProgress,
    AppointmentBooked,
    Submitted,
    UnderReview,
    AdditionalDocsRequested,
    Approved,
    Rejected,
    Cancelled,
    Expired,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::DocumentsInProgress => "DOCUMENTS_IN_PROGRESS",
            Self::AppointmentBooked => "APPOINTMENT_BOOKED",
            Self::Submitted => "SUBMITTED",
            Self::UnderReview => "UNDER_REVIEW",
            Self::AdditionalDocsRequested => "ADDITIONAL_DOCS_REQUESTED",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
            Self::Expired => "EXPIRED",
        }
    }

    /// Legal forward transitions; any other requested transition fails.
    pub const fn allowed_next(self) -> &'static [ApplicationStatus] {
        match self {
            Self::NotStarted => &[Self::DocumentsInProgress],
            Self::DocumentsInProgress => &[Self::AppointmentBooked],
            Self::AppointmentBooked => &[Self::Submitted],
            Self::Submitted => &[Self::UnderReview],
            Self::UnderReview => &[Self::Approved, Self::Rejected],
            Self::AdditionalDocsRequested
            | Self::Approved
            | Self::Rejected
            | Self::Cancelled
            | Self::Expired => &[],
        }
    }

    pub fn can_transition_to(self, requested: ApplicationStatus) -> bool {
        self.allowed_next().contains(&requested)
    }

    /// Still before submission, and therefore in scope for the daily
    /// timeline alert sweep.
    pub const fn is_open(self) -> bool {
        matches!(self, Self::NotStarted | Self::DocumentsInProgress)
    }

    pub const fn progress_weight(self) -> u8 {
        match self {
            Self::NotStarted => 0,
            Self::DocumentsInProgress => 20,
            Self::AppointmentBooked => 40,
            Self::Submitted => 60,
            Self::UnderReview => 80,
            Self::Approved | Self::Rejected => 100,
            Self::AdditionalDocsRequested | Self::Cancelled | Self::Expired => 0,
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusActor {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: ApplicationStatus,
    pub changed_at: NaiveDate,
    pub changed_by: StatusActor,
    pub note: Option<String>,
}

/// One traveler's pursuit of one visa for one trip destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisaApplication {
    pub id: ApplicationId,
    pub user_id: UserId,
    pub trip_id: Option<TripId>,
    pub trip_destination_id: DestinationId,
    pub rule_id: Option<RuleId>,
    pub destination_country: CountryCode,
    pub status: ApplicationStatus,
    pub status_history: Vec<StatusChange>,
    pub appointment_date: Option<NaiveDate>,
    pub submission_date: Option<NaiveDate>,
    pub decision_date: Option<NaiveDate>,
    pub expected_decision_date: Option<NaiveDate>,
    pub latest_submission_date: Option<NaiveDate>,
    pub recommended_submission_date: Option<NaiveDate>,
}

/// Caller-supplied fields accompanying a status transition request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub appointment_date: Option<NaiveDate>,
    pub submission_date: Option<NaiveDate>,
    pub decision_date: Option<NaiveDate>,
    pub note: Option<String>,
}

/// Presence/type tracking only; document contents are never inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentCompleteness {
    pub total_mandatory: u32,
    pub uploaded_count: u32,
    pub missing_mandatory: Vec<String>,
}

impl DocumentCompleteness {
    pub fn is_complete(&self) -> bool {
        self.missing_mandatory.is_empty()
    }
}

/// Fixed status weights, boosted within the document-gathering states by
/// the upload ratio (capped at the DOCUMENTS_IN_PROGRESS weight).
pub fn progress_percentage(
    status: ApplicationStatus,
    completeness: &DocumentCompleteness,
) -> u8 {
    let weight = status.progress_weight();

    if status.is_open() && completeness.total_mandatory > 0 {
        let ratio = f64::from(completeness.uploaded_count)
            / f64::from(completeness.total_mandatory)
            * 20.0;
        return weight.max(ratio.round() as u8);
    }

    weight
}

/// Tracking snapshot assembled for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingView {
    pub application: VisaApplication,
    pub completeness: DocumentCompleteness,
    pub progress_percentage: u8,
    pub current_step: ApplicationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_chain_transitions_are_legal() {
        use ApplicationStatus::*;
        assert!(NotStarted.can_transition_to(DocumentsInProgress));
        assert!(DocumentsInProgress.can_transition_to(AppointmentBooked));
        assert!(AppointmentBooked.can_transition_to(Submitted));
        assert!(Submitted.can_transition_to(UnderReview));
        assert!(UnderReview.can_transition_to(Approved));
        assert!(UnderReview.can_transition_to(Rejected));
    }

    #[test]
    fn skipping_states_is_illegal() {
        use ApplicationStatus::*;
        assert!(!NotStarted.can_transition_to(UnderReview));
        assert!(!NotStarted.can_transition_to(Submitted));
        assert!(!Approved.can_transition_to(UnderReview));
        assert!(!Cancelled.can_transition_to(DocumentsInProgress));
    }

    #[test]
    fn progress_uses_fixed_weights() {
        let no_docs = DocumentCompleteness {
            total_mandatory: 0,
            uploaded_count: 0,
            missing_mandatory: Vec::new(),
        };

        assert_eq!(progress_percentage(ApplicationStatus::Submitted, &no_docs), 60);
        assert_eq!(progress_percentage(ApplicationStatus::Approved, &no_docs), 100);
        assert_eq!(progress_percentage(ApplicationStatus::Cancelled, &no_docs), 0);
    }

    #[test]
    fn upload_ratio_boosts_early_states() {
        let half_uploaded = DocumentCompleteness {
            total_mandatory: 4,
            uploaded_count: 2,
            missing_mandatory: vec!["BANK_STATEMENT".to_string(), "PHOTO".to_string()],
        };

        // 2/4 of the 20-point document band
        assert_eq!(
            progress_percentage(ApplicationStatus::NotStarted, &half_uploaded),
            10
        );
        // never less than the status weight
        assert_eq!(
            progress_percentage(ApplicationStatus::DocumentsInProgress, &half_uploaded),
            20
        );
    }
}
