use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::domain::{CountryCode, TravelDates, TravelPurpose, TravelerContext};
use super::feasibility::{MultiCountryPlanner, PlanError, PlannedDestination};
use super::repository::VisaRuleStore;
use super::rules::{application_steps, ResolveError, VisaRuleResolver};

/// Router builder exposing the lookup and planning endpoints.
pub fn visa_router<S>(resolver: Arc<VisaRuleResolver<S>>) -> Router
where
    S: VisaRuleStore + 'static,
{
    Router::new()
        .route("/api/v1/visa/check", post(check_handler::<S>))
        .route("/api/v1/visa/plan", post(plan_handler::<S>))
        .with_state(resolver)
}

#[derive(Debug, Deserialize)]
pub(crate) struct VisaCheckRequest {
    passport_country: String,
    destination_country: String,
    #[serde(default)]
    purpose: TravelPurpose,
    #[serde(default)]
    arrival_date: Option<NaiveDate>,
    #[serde(default)]
    departure_date: Option<NaiveDate>,
    #[serde(default)]
    passport_expiry_date: Option<NaiveDate>,
    #[serde(default)]
    holds_valid_visa_from: Vec<String>,
    /// Evaluation date override; defaults to the current date.
    #[serde(default)]
    today: Option<NaiveDate>,
}

pub(crate) async fn check_handler<S>(
    State(resolver): State<Arc<VisaRuleResolver<S>>>,
    axum::Json(request): axum::Json<VisaCheckRequest>,
) -> Response
where
    S: VisaRuleStore + 'static,
{
    let today = request.today.unwrap_or_else(current_date);
    let traveler = TravelerContext {
        passport_expiry_date: request.passport_expiry_date,
        holds_valid_visa_from: request
            .holds_valid_visa_from
            .iter()
            .map(CountryCode::new)
            .collect(),
    };
    let dates = TravelDates {
        arrival_date: request.arrival_date,
        departure_date: request.departure_date,
    };

    match resolver.resolve(
        &CountryCode::new(&request.passport_country),
        &CountryCode::new(&request.destination_country),
        request.purpose,
        &dates,
        &traveler,
        today,
    ) {
        Ok(assessment) => {
            let steps = application_steps(&assessment);
            let mut body = serde_json::to_value(&assessment).unwrap_or_else(|_| json!({}));
            if let Some(object) = body.as_object_mut() {
                object.insert(
                    "application_steps".to_string(),
                    serde_json::to_value(steps).unwrap_or_default(),
                );
            }
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(error @ ResolveError::UnknownCountry(_)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlanRequest {
    passport_country: String,
    destinations: Vec<PlanLeg>,
    #[serde(default)]
    purpose: TravelPurpose,
    #[serde(default)]
    passport_expiry_date: Option<NaiveDate>,
    #[serde(default)]
    holds_valid_visa_from: Vec<String>,
    #[serde(default)]
    today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlanLeg {
    country_code: String,
    arrival_date: NaiveDate,
    #[serde(default)]
    departure_date: Option<NaiveDate>,
}

pub(crate) async fn plan_handler<S>(
    State(resolver): State<Arc<VisaRuleResolver<S>>>,
    axum::Json(request): axum::Json<PlanRequest>,
) -> Response
where
    S: VisaRuleStore + 'static,
{
    let today = request.today.unwrap_or_else(current_date);
    let traveler = TravelerContext {
        passport_expiry_date: request.passport_expiry_date,
        holds_valid_visa_from: request
            .holds_valid_visa_from
            .iter()
            .map(CountryCode::new)
            .collect(),
    };
    let destinations: Vec<PlannedDestination> = request
        .destinations
        .iter()
        .map(|leg| PlannedDestination {
            country_code: CountryCode::new(&leg.country_code),
            arrival_date: leg.arrival_date,
            departure_date: leg.departure_date,
        })
        .collect();

    let planner = MultiCountryPlanner::new(&resolver);
    match planner.analyze(
        &CountryCode::new(&request.passport_country),
        &destinations,
        request.purpose,
        &traveler,
        today,
    ) {
        Ok(plan) => (StatusCode::OK, axum::Json(plan)).into_response(),
        Err(error @ PlanError::EmptyItinerary) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

fn current_date() -> NaiveDate {
    chrono::Local::now().date_naive()
}
