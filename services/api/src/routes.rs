use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Extension, Json, Router};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use visatrack::error::AppError;
use visatrack::workflows::visa::{
    visa_router, AlertSweep, ApplicationId, ApplicationStatus, CountryCode, DestinationId,
    FeasibilityStatus, NewDestination, StatusUpdate, TravelPurpose, Trip, TripId, TripService,
    TripStatus, TripStore, UserId, VisaApplicationService, VisaRuleResolver, VisaRuleStore,
};

use crate::infra::{
    AppState, InMemoryApplicationStore, InMemoryDocumentInventory, InMemoryNotificationLedger,
    InMemoryRuleStore, InMemoryTripStore, LoggingNotifier, UserDirectory,
};

pub(crate) type ApiTripService = TripService<InMemoryTripStore, InMemoryRuleStore>;
pub(crate) type ApiApplicationService = VisaApplicationService<
    InMemoryApplicationStore,
    InMemoryTripStore,
    InMemoryRuleStore,
    InMemoryDocumentInventory,
    LoggingNotifier,
>;
pub(crate) type ApiAlertSweep =
    AlertSweep<InMemoryApplicationStore, LoggingNotifier, InMemoryNotificationLedger>;

/// Everything the HTTP handlers need, shared by reference.
pub(crate) struct Services {
    pub(crate) resolver: Arc<VisaRuleResolver<InMemoryRuleStore>>,
    pub(crate) trip_service: ApiTripService,
    pub(crate) application_service: ApiApplicationService,
    pub(crate) sweep: ApiAlertSweep,
    pub(crate) rules: Arc<InMemoryRuleStore>,
    pub(crate) trips: Arc<InMemoryTripStore>,
    pub(crate) documents: Arc<InMemoryDocumentInventory>,
    pub(crate) users: Arc<UserDirectory>,
    pub(crate) notifier: Arc<LoggingNotifier>,
}

static TRIP_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_trip_id() -> TripId {
    let id = TRIP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    TripId(format!("trip-{id:06}"))
}

fn current_date() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) fn api_router(services: Arc<Services>) -> Router {
    let lookup_routes = visa_router(services.resolver.clone());

    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/metrics", get(metrics_handler))
        .route(
            "/api/v1/visa/rules/:destination",
            get(rules_for_destination_handler),
        )
        .route("/api/v1/trips", post(create_trip_handler))
        .route("/api/v1/trips/:trip_id", get(get_trip_handler))
        .route(
            "/api/v1/trips/:trip_id/destinations",
            post(add_destination_handler),
        )
        .route(
            "/api/v1/trips/:trip_id/recalculate",
            post(recalculate_handler),
        )
        .route("/api/v1/applications", post(start_application_handler))
        .route(
            "/api/v1/applications/:application_id/status",
            patch(update_status_handler),
        )
        .route(
            "/api/v1/applications/:application_id/tracking",
            get(tracking_handler),
        )
        .route(
            "/api/v1/applications/:application_id/documents",
            post(upload_document_handler),
        )
        .route("/api/v1/alerts/run", post(run_alerts_handler))
        .with_state(services)
        .merge(lookup_routes)
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn ready_handler(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.readiness.load(Ordering::Acquire) {
        (StatusCode::OK, Json(json!({ "ready": true })))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "ready": false })))
    }
}

async fn metrics_handler(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn rules_for_destination_handler(
    State(services): State<Arc<Services>>,
    Path(destination): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let rules = services
        .rules
        .rules_for_destination(&CountryCode::new(&destination))?;
    Ok(Json(rules))
}

#[derive(Debug, Deserialize)]
struct CreateTripRequest {
    user_id: String,
    title: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

async fn create_trip_handler(
    State(services): State<Arc<Services>>,
    Json(request): Json<CreateTripRequest>,
) -> Result<impl IntoResponse, AppError> {
    let trip = Trip {
        id: next_trip_id(),
        user_id: UserId(request.user_id),
        title: request.title,
        start_date: request.start_date,
        end_date: request.end_date,
        status: TripStatus::Planning,
        feasibility_status: FeasibilityStatus::Feasible,
        feasibility_issues: Vec::new(),
    };

    let stored = services.trips.create_trip(trip)?;
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn get_trip_handler(
    State(services): State<Arc<Services>>,
    Path(trip_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let trip_id = TripId(trip_id);
    let trip = services
        .trips
        .fetch_trip(&trip_id)?
        .ok_or(visatrack::workflows::visa::StoreError::NotFound)?;
    let destinations = services.trips.destinations_for_trip(&trip_id)?;

    Ok(Json(json!({
        "trip": trip,
        "destinations": destinations,
    })))
}

#[derive(Debug, Deserialize)]
struct AddDestinationRequest {
    user_id: String,
    country_code: String,
    entry_date: NaiveDate,
    exit_date: NaiveDate,
    #[serde(default)]
    travel_purpose: TravelPurpose,
}

async fn add_destination_handler(
    State(services): State<Arc<Services>>,
    Path(trip_id): Path<String>,
    Json(request): Json<AddDestinationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let profile = services
        .users
        .get(&UserId(request.user_id))
        .ok_or(visatrack::workflows::visa::StoreError::NotFound)?;

    let destination = services.trip_service.add_destination(
        &TripId(trip_id),
        &profile.passport_country,
        NewDestination {
            country_code: CountryCode::new(&request.country_code),
            entry_date: request.entry_date,
            exit_date: request.exit_date,
            travel_purpose: request.travel_purpose,
        },
        current_date(),
    )?;

    Ok((StatusCode::CREATED, Json(destination)))
}

async fn recalculate_handler(
    State(services): State<Arc<Services>>,
    Path(trip_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let feasibility = services
        .trip_service
        .recalculate(&TripId(trip_id), current_date())?;
    Ok(Json(feasibility))
}

#[derive(Debug, Deserialize)]
struct StartApplicationRequest {
    user_id: String,
    trip_destination_id: String,
}

async fn start_application_handler(
    State(services): State<Arc<Services>>,
    Json(request): Json<StartApplicationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let profile = services
        .users
        .get(&UserId(request.user_id))
        .ok_or(visatrack::workflows::visa::StoreError::NotFound)?;

    let application = services.application_service.start(
        &profile,
        &DestinationId(request.trip_destination_id),
        current_date(),
    )?;

    Ok((StatusCode::CREATED, Json(application)))
}

#[derive(Debug, Deserialize)]
struct UpdateStatusRequest {
    status: ApplicationStatus,
    #[serde(default)]
    appointment_date: Option<NaiveDate>,
    #[serde(default)]
    submission_date: Option<NaiveDate>,
    #[serde(default)]
    decision_date: Option<NaiveDate>,
    #[serde(default)]
    note: Option<String>,
}

async fn update_status_handler(
    State(services): State<Arc<Services>>,
    Path(application_id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let application = services.application_service.update_status(
        &ApplicationId(application_id),
        request.status,
        StatusUpdate {
            appointment_date: request.appointment_date,
            submission_date: request.submission_date,
            decision_date: request.decision_date,
            note: request.note,
        },
        current_date(),
    )?;

    Ok(Json(application))
}

async fn tracking_handler(
    State(services): State<Arc<Services>>,
    Path(application_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let tracking = services
        .application_service
        .tracking(&ApplicationId(application_id))?;
    Ok(Json(tracking))
}

#[derive(Debug, Deserialize)]
struct UploadDocumentRequest {
    document_type: String,
}

async fn upload_document_handler(
    State(services): State<Arc<Services>>,
    Path(application_id): Path<String>,
    Json(request): Json<UploadDocumentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let application_id = ApplicationId(application_id);
    services
        .documents
        .record_upload(application_id.clone(), request.document_type);

    let completeness = services
        .application_service
        .sync_documents(&application_id, current_date())?;

    Ok(Json(completeness))
}

async fn run_alerts_handler(
    State(services): State<Arc<Services>>,
) -> Result<impl IntoResponse, AppError> {
    let report = services.sweep.run(current_date())?;
    Ok(Json(report))
}
