use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::visa::applications::ApplicationError;
use crate::workflows::visa::catalog::CatalogError;
use crate::workflows::visa::feasibility::PlanError;
use crate::workflows::visa::repository::StoreError;
use crate::workflows::visa::alerts::SweepError;
use crate::workflows::visa::rules::ResolveError;
use crate::workflows::visa::trips::TripError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Catalog(CatalogError),
    Resolve(ResolveError),
    Plan(PlanError),
    Trip(TripError),
    Application(ApplicationError),
    Store(StoreError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Catalog(err) => write!(f, "catalog error: {}", err),
            AppError::Resolve(err) => write!(f, "visa lookup error: {}", err),
            AppError::Plan(err) => write!(f, "trip plan error: {}", err),
            AppError::Trip(err) => write!(f, "trip error: {}", err),
            AppError::Application(err) => write!(f, "application error: {}", err),
            AppError::Store(err) => write!(f, "store error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Catalog(err) => Some(err),
            AppError::Resolve(err) => Some(err),
            AppError::Plan(err) => Some(err),
            AppError::Trip(err) => Some(err),
            AppError::Application(err) => Some(err),
            AppError::Store(err) => Some(err),
        }
    }
}

impl AppError {
    /// NotFound-class failures map to 404, invalid requests and state
    /// violations to 400, everything infrastructural to 500.
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Resolve(ResolveError::UnknownCountry(_))
            | AppError::Plan(PlanError::EmptyItinerary)
            | AppError::Plan(PlanError::Resolve(ResolveError::UnknownCountry(_)))
            | AppError::Trip(TripError::UnknownCountry(_)) => StatusCode::BAD_REQUEST,
            AppError::Trip(TripError::TripNotFound(_))
            | AppError::Trip(TripError::DestinationNotFound(_))
            | AppError::Application(ApplicationError::NotFound)
            | AppError::Application(ApplicationError::DestinationNotFound(_))
            | AppError::Application(ApplicationError::RuleNotFound)
            | AppError::Application(ApplicationError::Trip(TripError::TripNotFound(_)))
            | AppError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Application(ApplicationError::InvalidTransition { .. })
            | AppError::Application(ApplicationError::MissingDate { .. })
            | AppError::Application(ApplicationError::VisaNotRequired) => StatusCode::BAD_REQUEST,
            AppError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<CatalogError> for AppError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<ResolveError> for AppError {
    fn from(value: ResolveError) -> Self {
        Self::Resolve(value)
    }
}

impl From<PlanError> for AppError {
    fn from(value: PlanError) -> Self {
        Self::Plan(value)
    }
}

impl From<TripError> for AppError {
    fn from(value: TripError) -> Self {
        Self::Trip(value)
    }
}

impl From<ApplicationError> for AppError {
    fn from(value: ApplicationError) -> Self {
        Self::Application(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<SweepError> for AppError {
    fn from(value: SweepError) -> Self {
        match value {
            SweepError::Store(error) => Self::Store(error),
        }
    }
}
