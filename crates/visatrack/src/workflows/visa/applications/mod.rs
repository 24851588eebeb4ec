pub mod domain;
pub mod service;

pub use domain::{
    progress_percentage, ApplicationStatus, DocumentCompleteness, StatusActor, StatusChange,
    StatusUpdate, TrackingView, VisaApplication,
};
pub use service::{ApplicationError, VisaApplicationService};
