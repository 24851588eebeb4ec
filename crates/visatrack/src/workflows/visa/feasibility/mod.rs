mod planner;

pub use planner::{
    DestinationAnalysis, MultiCountryPlan, MultiCountryPlanner, OptimalApplicationEntry,
    PlanError, PlanIssue, PlanIssueKind, PlanSummary, PlannedDestination, Recommendation,
    RecommendationKind,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    DestinationFeasibility, FeasibilityIssue, FeasibilityStatus, TripDestination,
};

/// Pessimism factor over the nominal processing maximum, modeling
/// real-world overrun beyond the published SLA.
pub const PROCESSING_OVERRUN_FACTOR: f64 = 1.4;
pub const FEASIBILITY_BUFFER_DAYS: i64 = 7;

/// Classify a single destination. No visa (or no processing estimate)
/// means nothing can drag the date, so the verdict is FEASIBLE.
pub fn check_destination_feasibility(
    entry_date: NaiveDate,
    processing_time_max: Option<u32>,
    today: NaiveDate,
) -> DestinationFeasibility {
    let processing_max = match processing_time_max {
        Some(max) if max > 0 => i64::from(max),
        _ => return DestinationFeasibility::visa_not_required(),
    };

    let days_available = (entry_date - today).num_days();
    let required_days = required_processing_days(processing_max);

    if days_available < required_days {
        let status = if days_available < processing_max {
            FeasibilityStatus::Impossible
        } else {
            FeasibilityStatus::Risky
        };
        return DestinationFeasibility {
            status,
            reason: format!(
                "Only {days_available} days available. Estimated {required_days} days needed."
            ),
        };
    }

    DestinationFeasibility {
        status: FeasibilityStatus::Feasible,
        reason: "Sufficient time for visa processing".to_string(),
    }
}

/// Processing maximum padded by the overrun factor plus the fixed buffer.
pub(crate) fn required_processing_days(processing_max: i64) -> i64 {
    (processing_max as f64 * PROCESSING_OVERRUN_FACTOR).ceil() as i64 + FEASIBILITY_BUFFER_DAYS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripFeasibility {
    pub status: FeasibilityStatus,
    pub issues: Vec<FeasibilityIssue>,
}

impl TripFeasibility {
    pub fn feasible() -> Self {
        Self {
            status: FeasibilityStatus::Feasible,
            issues: Vec::new(),
        }
    }
}

/// Fold per-destination verdicts into one trip verdict. Destinations with
/// no visa requirement are skipped; the first IMPOSSIBLE destination wins
/// outright and scanning stops there.
pub fn aggregate_trip_feasibility(destinations: &[TripDestination]) -> TripFeasibility {
    let mut has_risk = false;
    let mut issues = Vec::new();

    for destination in destinations {
        if !destination.visa_required {
            continue;
        }

        match destination.feasibility.status {
            FeasibilityStatus::Impossible => {
                return TripFeasibility {
                    status: FeasibilityStatus::Impossible,
                    issues: vec![FeasibilityIssue {
                        destination: destination.country_code.clone(),
                        message: destination.feasibility.reason.clone(),
                    }],
                };
            }
            FeasibilityStatus::Risky => {
                has_risk = true;
                issues.push(FeasibilityIssue {
                    destination: destination.country_code.clone(),
                    message: destination.feasibility.reason.clone(),
                });
            }
            FeasibilityStatus::Feasible => {}
        }
    }

    TripFeasibility {
        status: if has_risk {
            FeasibilityStatus::Risky
        } else {
            FeasibilityStatus::Feasible
        },
        issues: if has_risk { issues } else { Vec::new() },
    }
}
