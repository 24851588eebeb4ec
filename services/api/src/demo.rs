use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use std::sync::Arc;
use visatrack::error::AppError;
use visatrack::workflows::visa::{
    ApplicationStatus, CountryCatalog, CountryCode, FeasibilityStatus, MultiCountryPlanner,
    NewDestination, PlannedDestination, StatusUpdate, TravelPurpose, TravelerContext,
    TravelerProfile, Trip, TripId, TripStatus, TripStore, UserId,
};

use crate::server::build_services;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date override (YYYY-MM-DD); defaults to today
    #[arg(long)]
    today: Option<NaiveDate>,
}

/// Walk the whole engine once: lookup, multi-country plan, trip assembly,
/// application lifecycle, and the daily alert sweep.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let services = build_services(Arc::new(CountryCatalog::standard()));

    let traveler = TravelerProfile {
        user_id: UserId("demo-traveler".to_string()),
        passport_country: CountryCode::new("IN"),
        passport_expiry_date: Some(today + Duration::days(365 * 5)),
    };
    services.users.upsert(traveler.clone());

    println!("== Multi-country plan (IN passport: GH, KE, ZA) ==");
    let planner = MultiCountryPlanner::new(&services.resolver);
    let plan = planner.analyze(
        &traveler.passport_country,
        &[
            PlannedDestination {
                country_code: CountryCode::new("GH"),
                arrival_date: today + Duration::days(45),
                departure_date: Some(today + Duration::days(52)),
            },
            PlannedDestination {
                country_code: CountryCode::new("KE"),
                arrival_date: today + Duration::days(53),
                departure_date: Some(today + Duration::days(60)),
            },
            PlannedDestination {
                country_code: CountryCode::new("ZA"),
                arrival_date: today + Duration::days(61),
                departure_date: Some(today + Duration::days(70)),
            },
        ],
        TravelPurpose::Tourism,
        &TravelerContext {
            passport_expiry_date: traveler.passport_expiry_date,
            holds_valid_visa_from: Vec::new(),
        },
        today,
    )?;
    println!(
        "status={} score={} issues={} order={:?}",
        plan.status.label(),
        plan.score,
        plan.issues.len(),
        plan.optimal_application_order
            .iter()
            .map(|entry| entry.country_code.0.clone())
            .collect::<Vec<_>>()
    );

    println!("== Trip assembly ==");
    let trip_id = TripId("demo-trip".to_string());
    services.trips.update_trip(Trip {
        id: trip_id.clone(),
        user_id: traveler.user_id.clone(),
        title: "West & East Africa loop".to_string(),
        start_date: today + Duration::days(45),
        end_date: today + Duration::days(70),
        status: TripStatus::Planning,
        feasibility_status: FeasibilityStatus::Feasible,
        feasibility_issues: Vec::new(),
    })?;

    let destination = services.trip_service.add_destination(
        &trip_id,
        &traveler.passport_country,
        NewDestination {
            country_code: CountryCode::new("GH"),
            entry_date: today + Duration::days(45),
            exit_date: today + Duration::days(52),
            travel_purpose: TravelPurpose::Tourism,
        },
        today,
    )?;
    println!(
        "destination {} feasibility={} ({})",
        destination.country_code,
        destination.feasibility.status.label(),
        destination.feasibility.reason
    );

    println!("== Application lifecycle ==");
    let application = services
        .application_service
        .start(&traveler, &destination.id, today)?;
    println!(
        "application {} latest_submission={:?} recommended={:?}",
        application.id, application.latest_submission_date, application.recommended_submission_date
    );

    services.documents.set_mandatory(
        application.id.clone(),
        vec!["PASSPORT_SCAN".to_string(), "PHOTO".to_string()],
    );
    services
        .documents
        .record_upload(application.id.clone(), "PASSPORT_SCAN".to_string());
    services
        .documents
        .record_upload(application.id.clone(), "PHOTO".to_string());
    services
        .application_service
        .sync_documents(&application.id, today)?;

    let submission_date = today + Duration::days(10);
    let transitions = [
        (
            ApplicationStatus::AppointmentBooked,
            StatusUpdate {
                appointment_date: Some(today + Duration::days(7)),
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
    for (status, update) in transitions {
        let updated =
            services
                .application_service
                .update_status(&application.id, status, update, today)?;
        println!("-> {}", updated.status.label());
    }

    let tracking = services.application_service.tracking(&application.id)?;
    println!(
        "progress={}% expected_decision={:?}",
        tracking.progress_percentage, tracking.application.expected_decision_date
    );

    println!("== Alert sweep ==");
    let report = services.sweep.run(today)?;
    println!(
        "scanned={} notified={} suppressed={}",
        report.scanned, report.notified, report.suppressed_duplicates
    );
    println!("notifications sent so far: {}", services.notifier.sent().len());

    Ok(())
}
