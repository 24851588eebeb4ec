use chrono::Duration;

use super::common::*;
use crate::workflows::visa::applications::domain::DocumentCompleteness;
use crate::workflows::visa::applications::{ApplicationError, ApplicationStatus, StatusUpdate};
use crate::workflows::visa::domain::{FeasibilityStatus, VisaType};
use crate::workflows::visa::notifications::NotificationKind;
use crate::workflows::visa::repository::ApplicationStore;

fn seeded_harness() -> ApplicationHarness {
    let harness = build_application_service();
    harness.trips.seed_trip(trip("trip-1"));
    // Ghana embassy leg three months out: comfortably feasible.
    harness.trips.seed_destination(destination(
        "dest-gh",
        "trip-1",
        "GH",
        90,
        Some(VisaType::EmbassyVisa),
        Some(15),
    ));
    harness
}

fn dest_id() -> crate::workflows::visa::domain::DestinationId {
    crate::workflows::visa::domain::DestinationId("dest-gh".to_string())
}

#[test]
fn start_computes_timeline_and_initial_history() {
    let harness = seeded_harness();

    let application = harness
        .service
        .start(&traveler("IN"), &dest_id(), today())
        .expect("starts");

    assert_eq!(application.status, ApplicationStatus::NotStarted);
    assert_eq!(application.status_history.len(), 1);
    assert!(application.rule_id.is_some());

    let entry = today() + Duration::days(90);
    assert_eq!(
        application.latest_submission_date,
        Some(entry - Duration::days(15 + 7))
    );
    assert_eq!(
        application.recommended_submission_date,
        Some(entry - Duration::days(15 + 7 + 14))
    );
    assert_eq!(application.expected_decision_date, None);
}

#[test]
fn duplicate_start_returns_existing_record() {
    let harness = seeded_harness();

    let first = harness
        .service
        .start(&traveler("IN"), &dest_id(), today())
        .expect("first start");
    let second = harness
        .service
        .start(&traveler("IN"), &dest_id(), today())
        .expect("second start");

    assert_eq!(first.id, second.id);
    let stored = harness
        .applications
        .open_applications()
        .expect("store scan");
    assert_eq!(stored.len(), 1);
}

#[test]
fn start_rejects_visa_free_destination() {
    let harness = build_application_service();
    harness.trips.seed_trip(trip("trip-1"));
    harness.trips.seed_destination(destination(
        "dest-rw",
        "trip-1",
        "RW",
        60,
        Some(VisaType::VisaFree),
        None,
    ));

    let error = harness
        .service
        .start(
            &traveler("IN"),
            &crate::workflows::visa::domain::DestinationId("dest-rw".to_string()),
            today(),
        )
        .expect_err("visa-free start must fail");

    assert!(matches!(error, ApplicationError::VisaNotRequired));
}

#[test]
fn start_fails_for_missing_destination() {
    let harness = build_application_service();

    let error = harness
        .service
        .start(
            &traveler("IN"),
            &crate::workflows::visa::domain::DestinationId("missing".to_string()),
            today(),
        )
        .expect_err("missing destination");

    assert!(matches!(error, ApplicationError::DestinationNotFound(_)));
}

#[test]
fn submitted_without_submission_date_fails() {
    let harness = seeded_harness();
    let application = harness
        .service
        .start(&traveler("IN"), &dest_id(), today())
        .expect("starts");

    // Walk to APPOINTMENT_BOOKED first.
    harness
        .service
        .update_status(
            &application.id,
            ApplicationStatus::DocumentsInProgress,
            StatusUpdate::default(),
            today(),
        )
        .expect("documents in progress");
    harness
        .service
        .update_status(
            &application.id,
            ApplicationStatus::AppointmentBooked,
            StatusUpdate {
                appointment_date: Some(today() + Duration::days(20)),
                ..StatusUpdate::default()
            },
            today(),
        )
        .expect("appointment booked");

    let error = harness
        .service
        .update_status(
            &application.id,
            ApplicationStatus::Submitted,
            StatusUpdate::default(),
            today(),
        )
        .expect_err("submission date required");

    assert!(matches!(
        error,
        ApplicationError::MissingDate {
            field: "submission_date",
            ..
        }
    ));
}

#[test]
fn appointment_requires_date() {
    let harness = seeded_harness();
    let application = harness
        .service
        .start(&traveler("IN"), &dest_id(), today())
        .expect("starts");

    harness
        .service
        .update_status(
            &application.id,
            ApplicationStatus::DocumentsInProgress,
            StatusUpdate::default(),
            today(),
        )
        .expect("documents in progress");

    let error = harness
        .service
        .update_status(
            &application.id,
            ApplicationStatus::AppointmentBooked,
            StatusUpdate::default(),
            today(),
        )
        .expect_err("appointment date required");

    assert!(matches!(
        error,
        ApplicationError::MissingDate {
            field: "appointment_date",
            ..
        }
    ));
}

#[test]
fn under_review_straight_from_not_started_fails() {
    let harness = seeded_harness();
    let application = harness
        .service
        .start(&traveler("IN"), &dest_id(), today())
        .expect("starts");

    let error = harness
        .service
        .update_status(
            &application.id,
            ApplicationStatus::UnderReview,
            StatusUpdate::default(),
            today(),
        )
        .expect_err("illegal jump");

    match error {
        ApplicationError::InvalidTransition { from, requested } => {
            assert_eq!(from, ApplicationStatus::NotStarted);
            assert_eq!(requested, ApplicationStatus::UnderReview);
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }
}

#[test]
fn full_legal_chain_records_history_and_notifies() {
    let harness = seeded_harness();
    let application = harness
        .service
        .start(&traveler("IN"), &dest_id(), today())
        .expect("starts");

    let submission_date = today() + Duration::days(30);
    let steps: Vec<(ApplicationStatus, StatusUpdate)> = vec![
        (ApplicationStatus::DocumentsInProgress, StatusUpdate::default()),
        (
            ApplicationStatus::AppointmentBooked,
            StatusUpdate {
                appointment_date: Some(today() + Duration::days(25)),
                ..StatusUpdate::default()
            },
        ),
        (
            ApplicationStatus::Submitted,
            StatusUpdate {
                submission_date: Some(submission_date),
                ..StatusUpdate::default()
            },
        ),
        (ApplicationStatus::UnderReview, StatusUpdate::default()),
        (ApplicationStatus::Approved, StatusUpdate::default()),
    ];

    let mut current = application;
    for (status, update) in steps {
        current = harness
            .service
            .update_status(&current.id, status, update, today())
            .expect("legal transition");
    }

    assert_eq!(current.status, ApplicationStatus::Approved);
    // Initial NOT_STARTED entry plus one per transition.
    assert_eq!(current.status_history.len(), 6);
    assert_eq!(
        current.expected_decision_date,
        Some(submission_date + Duration::days(15))
    );

    let status_updates = harness
        .notifier
        .notices()
        .iter()
        .filter(|notice| notice.kind == NotificationKind::StatusUpdate)
        .count();
    assert_eq!(status_updates, 5);
}

#[test]
fn decision_expected_notification_fires_on_review_day() {
    let harness = seeded_harness();
    let application = harness
        .service
        .start(&traveler("IN"), &dest_id(), today())
        .expect("starts");

    harness
        .service
        .update_status(
            &application.id,
            ApplicationStatus::DocumentsInProgress,
            StatusUpdate::default(),
            today(),
        )
        .expect("step");
    harness
        .service
        .update_status(
            &application.id,
            ApplicationStatus::AppointmentBooked,
            StatusUpdate {
                appointment_date: Some(today() + Duration::days(5)),
                ..StatusUpdate::default()
            },
            today(),
        )
        .expect("step");
    // Submitting 15 days before "review day" makes the expected decision
    // land exactly on it.
    harness
        .service
        .update_status(
            &application.id,
            ApplicationStatus::Submitted,
            StatusUpdate {
                submission_date: Some(today()),
                ..StatusUpdate::default()
            },
            today(),
        )
        .expect("step");

    let review_day = today() + Duration::days(15);
    harness
        .service
        .update_status(
            &application.id,
            ApplicationStatus::UnderReview,
            StatusUpdate::default(),
            review_day,
        )
        .expect("step");

    assert!(harness
        .notifier
        .notices()
        .iter()
        .any(|notice| notice.kind == NotificationKind::DecisionExpected));
}

#[test]
fn status_change_triggers_trip_recalculation() {
    let harness = seeded_harness();
    let application = harness
        .service
        .start(&traveler("IN"), &dest_id(), today())
        .expect("starts");

    // Poison the cached trip verdict; the next transition must refresh it.
    let mut stale = harness.trips.trip(&trip("trip-1").id).expect("trip");
    stale.feasibility_status = FeasibilityStatus::Impossible;
    harness.trips.seed_trip(stale);

    harness
        .service
        .update_status(
            &application.id,
            ApplicationStatus::DocumentsInProgress,
            StatusUpdate::default(),
            today(),
        )
        .expect("transition");

    let refreshed = harness.trips.trip(&trip("trip-1").id).expect("trip");
    assert_eq!(refreshed.feasibility_status, FeasibilityStatus::Feasible);
}

#[test]
fn tracking_combines_progress_and_completeness() {
    let harness = seeded_harness();
    let application = harness
        .service
        .start(&traveler("IN"), &dest_id(), today())
        .expect("starts");

    harness.documents.set(
        application.id.clone(),
        DocumentCompleteness {
            total_mandatory: 4,
            uploaded_count: 3,
            missing_mandatory: vec!["BANK_STATEMENT".to_string()],
        },
    );

    let tracking = harness.service.tracking(&application.id).expect("tracking");

    assert_eq!(tracking.current_step, ApplicationStatus::NotStarted);
    // 3/4 of the 20-point document band, rounded.
    assert_eq!(tracking.progress_percentage, 15);
    assert!(!tracking.completeness.is_complete());
}

#[test]
fn complete_documents_auto_advance_from_not_started() {
    let harness = seeded_harness();
    let application = harness
        .service
        .start(&traveler("IN"), &dest_id(), today())
        .expect("starts");

    harness.documents.set(
        application.id.clone(),
        DocumentCompleteness {
            total_mandatory: 2,
            uploaded_count: 2,
            missing_mandatory: Vec::new(),
        },
    );

    let completeness = harness
        .service
        .sync_documents(&application.id, today())
        .expect("sync");
    assert!(completeness.is_complete());

    let advanced = harness
        .service
        .tracking(&application.id)
        .expect("tracking")
        .application;
    assert_eq!(advanced.status, ApplicationStatus::DocumentsInProgress);
    assert_eq!(advanced.status_history.len(), 2);

    // A second sync is a no-op; the status machine is not re-entered.
    harness
        .service
        .sync_documents(&application.id, today())
        .expect("idempotent sync");
    let unchanged = harness
        .service
        .tracking(&application.id)
        .expect("tracking")
        .application;
    assert_eq!(unchanged.status, ApplicationStatus::DocumentsInProgress);
    assert_eq!(unchanged.status_history.len(), 2);
}
