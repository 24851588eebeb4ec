use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::super::domain::{
    Advisory, CountryCode, FeasibilityStatus, Severity, TravelDates, TravelPurpose,
    TravelerContext, VisaType,
};
use super::super::repository::VisaRuleStore;
use super::super::rules::{ProcessingTime, ResolveError, VisaRuleResolver};
use super::required_processing_days;

const SCORE_PENALTY_PER_ERROR: i32 = 30;
const FALLBACK_PROCESSING_MAX: u32 = 10;

/// One leg of a not-yet-persisted plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedDestination {
    pub country_code: CountryCode,
    pub arrival_date: NaiveDate,
    pub departure_date: Option<NaiveDate>,
}

/// Per-destination analysis row. A failed resolution (unknown country)
/// is recorded here rather than aborting the whole plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestinationAnalysis {
    pub order: u32,
    pub country_code: CountryCode,
    pub country_name: Option<String>,
    pub arrival_date: NaiveDate,
    pub departure_date: Option<NaiveDate>,
    pub visa_type: Option<VisaType>,
    pub visa_type_label: Option<&'static str>,
    pub processing_time: Option<ProcessingTime>,
    pub requires_passport_submission: bool,
    pub warnings: Vec<Advisory>,
    pub error: Option<String>,
}

impl DestinationAnalysis {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    fn needs_visa_processing(&self) -> bool {
        self.succeeded()
            && self
                .visa_type
                .map(VisaType::requires_processing)
                .unwrap_or(false)
    }

    fn processing_max(&self) -> u32 {
        self.processing_time
            .map(|range| range.max)
            .filter(|max| *max > 0)
            .unwrap_or(FALLBACK_PROCESSING_MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanIssueKind {
    TimelineConflict,
    PassportConflict,
    PassportValidity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanIssue {
    pub kind: PlanIssueKind,
    pub severity: Severity,
    pub destinations: Vec<CountryCode>,
    pub message: String,
    pub suggested_resolution: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationKind {
    ApplyImmediately,
    ApplicationSequence,
    Reschedule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub priority: u8,
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptimalApplicationEntry {
    pub order: u32,
    pub country_code: CountryCode,
    pub country_name: Option<String>,
    pub visa_type: Option<VisaType>,
    pub processing_days: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub total_destinations: usize,
    pub visa_free_destinations: usize,
    pub visas_required: usize,
    pub issue_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiCountryPlan {
    pub status: FeasibilityStatus,
    pub score: u32,
    pub message: &'static str,
    pub destinations: Vec<DestinationAnalysis>,
    pub issues: Vec<PlanIssue>,
    pub recommendations: Vec<Recommendation>,
    pub optimal_application_order: Vec<OptimalApplicationEntry>,
    pub summary: PlanSummary,
}

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("at least one destination is required")]
    EmptyItinerary,
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Batch feasibility analysis for an ad-hoc multi-country trip: resolves
/// every leg, detects timeline, passport-submission, and passport-validity
/// conflicts, scores the plan, and proposes an application order.
pub struct MultiCountryPlanner<'a, S> {
    resolver: &'a VisaRuleResolver<S>,
}

impl<'a, S> MultiCountryPlanner<'a, S>
where
    S: VisaRuleStore,
{
    pub fn new(resolver: &'a VisaRuleResolver<S>) -> Self {
        Self { resolver }
    }

    pub fn analyze(
        &self,
        passport_code: &CountryCode,
        destinations: &[PlannedDestination],
        purpose: TravelPurpose,
        traveler: &TravelerContext,
        today: NaiveDate,
    ) -> Result<MultiCountryPlan, PlanError> {
        if destinations.is_empty() {
            return Err(PlanError::EmptyItinerary);
        }

        let mut analysis = Vec::with_capacity(destinations.len());
        for (index, destination) in destinations.iter().enumerate() {
            analysis.push(self.analyze_destination(
                index as u32 + 1,
                passport_code,
                destination,
                purpose,
                traveler,
                today,
            )?);
        }

        let mut issues = detect_timeline_conflicts(&analysis, today);
        let had_timeline_conflicts = !issues.is_empty();
        let passport_conflicts = detect_passport_submission_conflicts(&analysis);
        let had_passport_conflicts = !passport_conflicts.is_empty();
        issues.extend(passport_conflicts);
        issues.extend(check_passport_validity(
            &analysis,
            traveler.passport_expiry_date,
        ));

        let error_count = issues
            .iter()
            .filter(|issue| issue.severity == Severity::Error)
            .count();
        let score = (100 - SCORE_PENALTY_PER_ERROR * error_count as i32).max(0) as u32;
        let (status, message) = classify_score(score);

        let recommendations =
            generate_recommendations(status, had_timeline_conflicts, had_passport_conflicts);
        let optimal_application_order = optimal_application_order(&analysis);

        let summary = PlanSummary {
            total_destinations: destinations.len(),
            visa_free_destinations: analysis
                .iter()
                .filter(|entry| entry.visa_type == Some(VisaType::VisaFree))
                .count(),
            visas_required: analysis
                .iter()
                .filter(|entry| entry.succeeded() && entry.visa_type != Some(VisaType::VisaFree))
                .count(),
            issue_count: issues.len(),
        };

        Ok(MultiCountryPlan {
            status,
            score,
            message,
            destinations: analysis,
            issues,
            recommendations,
            optimal_application_order,
            summary,
        })
    }

    fn analyze_destination(
        &self,
        order: u32,
        passport_code: &CountryCode,
        destination: &PlannedDestination,
        purpose: TravelPurpose,
        traveler: &TravelerContext,
        today: NaiveDate,
    ) -> Result<DestinationAnalysis, PlanError> {
        let dates = TravelDates {
            arrival_date: Some(destination.arrival_date),
            departure_date: destination.departure_date,
        };

        match self.resolver.resolve(
            passport_code,
            &destination.country_code,
            purpose,
            &dates,
            traveler,
            today,
        ) {
            Ok(assessment) => Ok(DestinationAnalysis {
                order,
                country_code: destination.country_code.clone(),
                country_name: Some(assessment.destination.name),
                arrival_date: destination.arrival_date,
                departure_date: destination.departure_date,
                visa_type: Some(assessment.visa_type),
                visa_type_label: Some(assessment.visa_type_label),
                processing_time: assessment.processing_time,
                requires_passport_submission: assessment.visa_type == VisaType::EmbassyVisa,
                warnings: assessment.warnings,
                error: None,
            }),
            Err(error @ ResolveError::UnknownCountry(_)) => Ok(DestinationAnalysis {
                order,
                country_code: destination.country_code.clone(),
                country_name: None,
                arrival_date: destination.arrival_date,
                departure_date: destination.departure_date,
                visa_type: None,
                visa_type_label: None,
                processing_time: None,
                requires_passport_submission: false,
                warnings: Vec::new(),
                error: Some(error.to_string()),
            }),
            Err(error) => Err(error.into()),
        }
    }
}

fn detect_timeline_conflicts(analysis: &[DestinationAnalysis], today: NaiveDate) -> Vec<PlanIssue> {
    let mut needing_processing: Vec<&DestinationAnalysis> = analysis
        .iter()
        .filter(|entry| entry.needs_visa_processing())
        .collect();
    needing_processing.sort_by_key(|entry| entry.arrival_date);

    let mut conflicts = Vec::new();
    for entry in needing_processing {
        let processing_max = i64::from(entry.processing_max());
        let days_needed = required_processing_days(processing_max);
        let days_available = (entry.arrival_date - today).num_days();

        if days_available < days_needed {
            let severity = if days_available < processing_max {
                Severity::Error
            } else {
                Severity::Warning
            };
            let name = entry
                .country_name
                .clone()
                .unwrap_or_else(|| entry.country_code.0.clone());
            conflicts.push(PlanIssue {
                kind: PlanIssueKind::TimelineConflict,
                severity,
                destinations: vec![entry.country_code.clone()],
                message: format!(
                    "Only {days_available} days until {name}. Need {days_needed} days."
                ),
                suggested_resolution: "Apply immediately or reschedule.",
            });
        }
    }

    conflicts
}

/// Only one physical passport exists, so two or more embassy applications
/// cannot run concurrently.
fn detect_passport_submission_conflicts(analysis: &[DestinationAnalysis]) -> Vec<PlanIssue> {
    let submitting: Vec<&DestinationAnalysis> = analysis
        .iter()
        .filter(|entry| entry.succeeded() && entry.requires_passport_submission)
        .collect();

    if submitting.len() < 2 {
        return Vec::new();
    }

    vec![PlanIssue {
        kind: PlanIssueKind::PassportConflict,
        severity: Severity::Warning,
        destinations: submitting
            .iter()
            .map(|entry| entry.country_code.clone())
            .collect(),
        message: format!(
            "{} destinations require passport submission. Apply sequentially.",
            submitting.len()
        ),
        suggested_resolution: "Apply for visas one at a time.",
    }]
}

fn check_passport_validity(
    analysis: &[DestinationAnalysis],
    passport_expiry: Option<NaiveDate>,
) -> Vec<PlanIssue> {
    let Some(expiry) = passport_expiry else {
        return Vec::new();
    };

    let mut issues = Vec::new();
    for entry in analysis.iter().filter(|entry| entry.succeeded()) {
        let required_days: i64 = if entry.country_code.0 == "ZA" { 30 } else { 180 };
        let departure = entry.departure_date.unwrap_or(entry.arrival_date);
        let required_expiry = departure + Duration::days(required_days);

        if expiry < required_expiry {
            let name = entry
                .country_name
                .clone()
                .unwrap_or_else(|| entry.country_code.0.clone());
            issues.push(PlanIssue {
                kind: PlanIssueKind::PassportValidity,
                severity: Severity::Error,
                destinations: vec![entry.country_code.clone()],
                message: format!("Passport must be valid for {required_days} days after {name}."),
                suggested_resolution: "Renew passport before applying.",
            });
        }
    }

    issues
}

fn classify_score(score: u32) -> (FeasibilityStatus, &'static str) {
    if score >= 80 {
        (
            FeasibilityStatus::Feasible,
            "Your trip is feasible with proper planning.",
        )
    } else if score >= 50 {
        (
            FeasibilityStatus::Risky,
            "Your trip has potential issues that need attention.",
        )
    } else {
        (
            FeasibilityStatus::Impossible,
            "Your trip as planned is not feasible.",
        )
    }
}

fn generate_recommendations(
    status: FeasibilityStatus,
    had_timeline_conflicts: bool,
    had_passport_conflicts: bool,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if had_timeline_conflicts {
        recommendations.push(Recommendation {
            kind: RecommendationKind::ApplyImmediately,
            priority: 1,
            title: "Start Applications Now",
            description: "Some destinations have tight timelines.",
        });
    }

    if had_passport_conflicts {
        recommendations.push(Recommendation {
            kind: RecommendationKind::ApplicationSequence,
            priority: 2,
            title: "Apply Sequentially",
            description: "Multiple embassy visas require your passport - apply one at a time.",
        });
    }

    if status == FeasibilityStatus::Impossible {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Reschedule,
            priority: 1,
            title: "Consider Rescheduling",
            description: "Some destinations cannot be reached in time.",
        });
    }

    recommendations.sort_by_key(|recommendation| recommendation.priority);
    recommendations
}

/// Longest, most rigid processes first: embassy (passport-submitting)
/// destinations lead, then descending processing maximum.
fn optimal_application_order(analysis: &[DestinationAnalysis]) -> Vec<OptimalApplicationEntry> {
    let mut needing_visa: Vec<&DestinationAnalysis> = analysis
        .iter()
        .filter(|entry| entry.needs_visa_processing())
        .collect();

    needing_visa.sort_by(|a, b| {
        b.requires_passport_submission
            .cmp(&a.requires_passport_submission)
            .then_with(|| b.processing_max().cmp(&a.processing_max()))
    });

    needing_visa
        .into_iter()
        .enumerate()
        .map(|(index, entry)| OptimalApplicationEntry {
            order: index as u32 + 1,
            country_code: entry.country_code.clone(),
            country_name: entry.country_name.clone(),
            visa_type: entry.visa_type,
            processing_days: entry.processing_time.map(|range| range.max),
        })
        .collect()
}
