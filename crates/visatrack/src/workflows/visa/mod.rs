//! Visa requirement determination and trip feasibility engine.
//!
//! Resolution flows from reference data (country catalog, rule store)
//! through the rule resolver into per-destination feasibility verdicts,
//! which aggregate into a trip-level verdict recomputed after every
//! invalidating event (destination added, application status change).

pub mod alerts;
pub mod applications;
pub mod catalog;
pub mod domain;
pub mod feasibility;
pub mod notifications;
pub mod repository;
pub mod router;
pub mod rules;
pub mod seed;
pub mod timeline;
pub mod trips;

#[cfg(test)]
mod tests;

pub use alerts::{AlertSweep, SweepError, SweepReport};
pub use applications::{
    ApplicationError, ApplicationStatus, DocumentCompleteness, StatusUpdate, TrackingView,
    VisaApplication, VisaApplicationService,
};
pub use catalog::{CatalogError, CountryCatalog};
pub use domain::{
    Advisory, AdvisoryKind, ApplicationId, ApplicationMethod, Country, CountryCode,
    DestinationFeasibility, DestinationId, FeasibilityIssue, FeasibilityStatus, PreArrivalKind,
    PreArrivalRequirement, RegionalBloc, RuleId, Severity, TravelDates, TravelPurpose,
    TravelerContext, TravelerProfile, Trip, TripDestination, TripId, TripStatus, UserId, VisaRule,
    VisaType,
};
pub use feasibility::{
    aggregate_trip_feasibility, check_destination_feasibility, MultiCountryPlan,
    MultiCountryPlanner, PlanError, PlannedDestination, TripFeasibility,
};
pub use notifications::{
    AlertKey, Notice, NotificationDispatcher, NotificationKind, NotificationLedger, NotifyError,
};
pub use repository::{
    ApplicationStore, DocumentInventory, StoreError, TripStore, VisaRuleStore,
};
pub use router::visa_router;
pub use rules::{
    application_steps, ResolveError, RuleTables, VisaAssessment, VisaRuleResolver,
};
pub use timeline::{calculate_timeline, TimelineRisk, VisaTimeline};
pub use trips::{NewDestination, TripError, TripService};
