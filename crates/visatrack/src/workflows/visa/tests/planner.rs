use chrono::Duration;

use super::common::*;
use crate::workflows::visa::domain::{
    FeasibilityStatus, Severity, TravelPurpose, TravelerContext,
};
use crate::workflows::visa::feasibility::{
    MultiCountryPlanner, PlanError, PlanIssueKind, PlannedDestination, RecommendationKind,
};

fn leg(country: &str, arrival_in_days: i64, stay_days: i64) -> PlannedDestination {
    PlannedDestination {
        country_code: code(country),
        arrival_date: today() + Duration::days(arrival_in_days),
        departure_date: Some(today() + Duration::days(arrival_in_days + stay_days)),
    }
}

fn context() -> TravelerContext {
    TravelerContext {
        passport_expiry_date: Some(today() + Duration::days(3650)),
        holds_valid_visa_from: Vec::new(),
    }
}

#[test]
fn empty_itinerary_is_rejected() {
    let resolver = build_resolver();
    let planner = MultiCountryPlanner::new(&resolver);

    let error = planner
        .analyze(&code("IN"), &[], TravelPurpose::Tourism, &context(), today())
        .expect_err("empty plan");

    assert!(matches!(error, PlanError::EmptyItinerary));
}

#[test]
fn comfortable_plan_is_feasible_with_full_score() {
    let resolver = build_resolver();
    let planner = MultiCountryPlanner::new(&resolver);

    let plan = planner
        .analyze(
            &code("IN"),
            &[leg("KE", 90, 7), leg("TZ", 100, 7)],
            TravelPurpose::Tourism,
            &context(),
            today(),
        )
        .expect("plan");

    assert_eq!(plan.status, FeasibilityStatus::Feasible);
    assert_eq!(plan.score, 100);
    assert!(plan.issues.is_empty());
    assert!(plan.recommendations.is_empty());
}

#[test]
fn timeline_conflict_severity_follows_raw_processing_max() {
    let resolver = build_resolver();
    let planner = MultiCountryPlanner::new(&resolver);

    // Ghana embassy visa: max 15. Arrival in 10 days is inside the raw
    // maximum (ERROR); arrival in 18 days only misses the padded window
    // (WARNING).
    let plan = planner
        .analyze(
            &code("IN"),
            &[leg("GH", 10, 5), leg("TZ", 18, 5)],
            TravelPurpose::Tourism,
            &context(),
            today(),
        )
        .expect("plan");

    let conflicts: Vec<_> = plan
        .issues
        .iter()
        .filter(|issue| issue.kind == PlanIssueKind::TimelineConflict)
        .collect();
    assert_eq!(conflicts.len(), 2);

    let ghana = conflicts
        .iter()
        .find(|issue| issue.destinations == vec![code("GH")])
        .expect("Ghana conflict");
    assert_eq!(ghana.severity, Severity::Error);

    let tanzania = conflicts
        .iter()
        .find(|issue| issue.destinations == vec![code("TZ")])
        .expect("Tanzania conflict");
    assert_eq!(tanzania.severity, Severity::Warning);
}

#[test]
fn visa_free_and_voa_legs_never_conflict() {
    let resolver = build_resolver();
    let planner = MultiCountryPlanner::new(&resolver);

    // Nigeria passport: Ghana is ECOWAS visa-free even at two days out.
    let plan = planner
        .analyze(
            &code("NG"),
            &[leg("GH", 2, 5)],
            TravelPurpose::Tourism,
            &context(),
            today(),
        )
        .expect("plan");

    assert!(plan.issues.is_empty());
    assert_eq!(plan.summary.visa_free_destinations, 1);
    assert_eq!(plan.summary.visas_required, 0);
}

#[test]
fn two_embassy_visas_trigger_passport_overlap_warning() {
    let resolver = build_resolver();
    let planner = MultiCountryPlanner::new(&resolver);

    // Indian passport: ZA and GH both resolve to embassy visas.
    let plan = planner
        .analyze(
            &code("IN"),
            &[leg("ZA", 90, 7), leg("GH", 110, 7)],
            TravelPurpose::Tourism,
            &context(),
            today(),
        )
        .expect("plan");

    let overlap = plan
        .issues
        .iter()
        .find(|issue| issue.kind == PlanIssueKind::PassportConflict)
        .expect("overlap warning");
    assert_eq!(overlap.severity, Severity::Warning);
    assert_eq!(overlap.destinations.len(), 2);

    assert!(plan
        .recommendations
        .iter()
        .any(|rec| rec.kind == RecommendationKind::ApplicationSequence));
}

#[test]
fn passport_validity_margin_is_thirty_days_for_za_only() {
    let resolver = build_resolver();
    let planner = MultiCountryPlanner::new(&resolver);

    // Expiry 60 days after both departures: clears ZA's 30-day margin,
    // violates the 180-day margin everywhere else.
    let traveler = TravelerContext {
        passport_expiry_date: Some(today() + Duration::days(90 + 7 + 60)),
        holds_valid_visa_from: Vec::new(),
    };

    let plan = planner
        .analyze(
            &code("US"),
            &[leg("ZA", 90, 7), leg("TH", 90, 7)],
            TravelPurpose::Tourism,
            &traveler,
            today(),
        )
        .expect("plan");

    let validity_issues: Vec<_> = plan
        .issues
        .iter()
        .filter(|issue| issue.kind == PlanIssueKind::PassportValidity)
        .collect();
    assert_eq!(validity_issues.len(), 1);
    assert_eq!(validity_issues[0].destinations, vec![code("TH")]);
    assert_eq!(validity_issues[0].severity, Severity::Error);
}

#[test]
fn score_drops_thirty_per_error_and_floors_status() {
    let resolver = build_resolver();
    let planner = MultiCountryPlanner::new(&resolver);

    // Two error-grade timeline conflicts: 100 - 60 = 40 => IMPOSSIBLE.
    let plan = planner
        .analyze(
            &code("IN"),
            &[leg("GH", 5, 5), leg("ZA", 6, 5)],
            TravelPurpose::Tourism,
            &context(),
            today(),
        )
        .expect("plan");

    assert_eq!(plan.score, 40);
    assert_eq!(plan.status, FeasibilityStatus::Impossible);
    assert!(plan
        .recommendations
        .iter()
        .any(|rec| rec.kind == RecommendationKind::Reschedule));
    // Priority-1 recommendations come first.
    assert!(plan.recommendations.windows(2).all(|pair| pair[0].priority <= pair[1].priority));
}

#[test]
fn optimal_order_puts_embassy_then_longest_processing_first() {
    let resolver = build_resolver();
    let planner = MultiCountryPlanner::new(&resolver);

    // GH embassy (15d) leads despite IN eVisa (10d) having an earlier
    // arrival; KE ETA (3d) trails.
    let plan = planner
        .analyze(
            &code("CA"),
            &[leg("KE", 95, 5), leg("IN", 60, 10), leg("GH", 120, 7)],
            TravelPurpose::Tourism,
            &context(),
            today(),
        )
        .expect("plan");

    let order: Vec<_> = plan
        .optimal_application_order
        .iter()
        .map(|entry| entry.country_code.clone())
        .collect();
    assert_eq!(order, vec![code("GH"), code("IN"), code("KE")]);
    assert_eq!(plan.optimal_application_order[0].order, 1);
}

#[test]
fn unknown_destination_becomes_failed_entry_not_error() {
    let resolver = build_resolver();
    let planner = MultiCountryPlanner::new(&resolver);

    let plan = planner
        .analyze(
            &code("IN"),
            &[leg("XX", 60, 5), leg("KE", 90, 5)],
            TravelPurpose::Tourism,
            &context(),
            today(),
        )
        .expect("plan despite bad leg");

    let failed = &plan.destinations[0];
    assert!(!failed.succeeded());
    assert!(failed.error.as_deref().expect("error recorded").contains("unknown country"));

    assert_eq!(plan.summary.total_destinations, 2);
    assert_eq!(plan.summary.visas_required, 1);
}
