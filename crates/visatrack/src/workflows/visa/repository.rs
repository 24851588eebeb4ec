use super::applications::domain::{DocumentCompleteness, VisaApplication};
use super::domain::{
    ApplicationId, CountryCode, DestinationId, TravelPurpose, Trip, TripDestination, TripId,
    UserId, VisaRule,
};

/// Error enumeration for collaborator store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to versioned visa rules. Implementations must return only
/// active rules; deactivated versions stay invisible to the engine.
pub trait VisaRuleStore: Send + Sync {
    fn find_active_rule(
        &self,
        passport: &CountryCode,
        destination: &CountryCode,
        purpose: TravelPurpose,
    ) -> Result<Option<VisaRule>, StoreError>;

    fn find_destination_default(
        &self,
        destination: &CountryCode,
        purpose: TravelPurpose,
    ) -> Result<Option<VisaRule>, StoreError>;

    fn rules_for_destination(
        &self,
        destination: &CountryCode,
    ) -> Result<Vec<VisaRule>, StoreError>;
}

/// Read-modify-write access to trips and their destinations. Writes are
/// last-write-wins; the engine reads, mutates in memory, and writes back.
pub trait TripStore: Send + Sync {
    fn fetch_trip(&self, id: &TripId) -> Result<Option<Trip>, StoreError>;
    fn update_trip(&self, trip: Trip) -> Result<(), StoreError>;
    fn destinations_for_trip(&self, id: &TripId) -> Result<Vec<TripDestination>, StoreError>;
    fn fetch_destination(
        &self,
        id: &DestinationId,
    ) -> Result<Option<TripDestination>, StoreError>;
    fn insert_destination(
        &self,
        destination: TripDestination,
    ) -> Result<TripDestination, StoreError>;
    fn update_destination(&self, destination: TripDestination) -> Result<(), StoreError>;
}

pub trait ApplicationStore: Send + Sync {
    fn insert(&self, application: VisaApplication) -> Result<VisaApplication, StoreError>;
    fn update(&self, application: VisaApplication) -> Result<(), StoreError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<VisaApplication>, StoreError>;
    fn find_for_destination(
        &self,
        user: &UserId,
        destination: &DestinationId,
    ) -> Result<Option<VisaApplication>, StoreError>;
    /// Applications still in a pre-submission state, scanned by the daily
    /// alert sweep.
    fn open_applications(&self) -> Result<Vec<VisaApplication>, StoreError>;
}

/// Document presence/type tracking for an application. Content is never
/// inspected here; completeness is uploaded-count vs mandatory-count.
pub trait DocumentInventory: Send + Sync {
    fn completeness(
        &self,
        application: &ApplicationId,
    ) -> Result<DocumentCompleteness, StoreError>;
}
