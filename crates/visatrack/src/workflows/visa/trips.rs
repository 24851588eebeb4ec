use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::catalog::CountryCatalog;
use super::domain::{
    CountryCode, DestinationFeasibility, DestinationId, TravelPurpose, TripDestination, TripId,
    VisaRule,
};
use super::feasibility::{aggregate_trip_feasibility, check_destination_feasibility, TripFeasibility};
use super::repository::{StoreError, TripStore, VisaRuleStore};

#[derive(Debug, thiserror::Error)]
pub enum TripError {
    #[error("trip not found: {0}")]
    TripNotFound(TripId),
    #[error("trip destination not found: {0}")]
    DestinationNotFound(DestinationId),
    #[error("unknown country code: {0}")]
    UnknownCountry(CountryCode),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Request payload for attaching a destination to a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDestination {
    pub country_code: CountryCode,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub travel_purpose: TravelPurpose,
}

static DESTINATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_destination_id() -> DestinationId {
    let id = DESTINATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    DestinationId(format!("dest-{id:06}"))
}

/// Owns the trip-level derived state: resolves the rule snapshot when a
/// destination is added and recomputes the cached feasibility verdicts
/// after every invalidating event. The persisted verdicts are a
/// performance cache only; this service is the source of truth.
pub struct TripService<T, R> {
    catalog: Arc<CountryCatalog>,
    trips: Arc<T>,
    rules: Arc<R>,
}

impl<T, R> TripService<T, R>
where
    T: TripStore,
    R: VisaRuleStore,
{
    pub fn new(catalog: Arc<CountryCatalog>, trips: Arc<T>, rules: Arc<R>) -> Self {
        Self {
            catalog,
            trips,
            rules,
        }
    }

    pub fn trips(&self) -> &Arc<T> {
        &self.trips
    }

    /// Specific pairing first, then the destination-wide default.
    pub fn matching_rule(
        &self,
        passport: &CountryCode,
        destination: &CountryCode,
        purpose: TravelPurpose,
    ) -> Result<Option<VisaRule>, StoreError> {
        if let Some(rule) = self.rules.find_active_rule(passport, destination, purpose)? {
            return Ok(Some(rule));
        }
        self.rules.find_destination_default(destination, purpose)
    }

    /// Attach a destination: snapshot the matching rule, compute the
    /// initial feasibility verdict, persist, then recalculate the trip.
    pub fn add_destination(
        &self,
        trip_id: &TripId,
        passport_country: &CountryCode,
        request: NewDestination,
        today: NaiveDate,
    ) -> Result<TripDestination, TripError> {
        let trip = self
            .trips
            .fetch_trip(trip_id)?
            .ok_or_else(|| TripError::TripNotFound(trip_id.clone()))?;

        if self.catalog.get(&request.country_code).is_none() {
            return Err(TripError::UnknownCountry(request.country_code));
        }

        let rule = self.matching_rule(passport_country, &request.country_code, request.travel_purpose)?;

        let visa_type = rule.as_ref().map(|rule| rule.visa_type);
        let visa_required = visa_type
            .map(|visa_type| visa_type.requires_processing())
            .unwrap_or(false);

        let feasibility = if visa_required {
            check_destination_feasibility(
                request.entry_date,
                rule.as_ref().map(|rule| rule.processing_time_max),
                today,
            )
        } else {
            DestinationFeasibility::visa_not_required()
        };

        let destination = TripDestination {
            id: next_destination_id(),
            trip_id: trip.id.clone(),
            country_code: request.country_code,
            entry_date: request.entry_date,
            exit_date: request.exit_date,
            travel_purpose: request.travel_purpose,
            visa_required,
            visa_type,
            processing_time_min: rule.as_ref().map(|rule| rule.processing_time_min),
            processing_time_max: rule.as_ref().map(|rule| rule.processing_time_max),
            feasibility,
            notes: None,
        };

        let stored = self.trips.insert_destination(destination)?;
        self.recalculate(trip_id, today)?;
        Ok(stored)
    }

    /// Recompute every visa-requiring destination's verdict, persist the
    /// refreshed verdicts, aggregate, and persist the trip. Idempotent:
    /// with no intervening state change, a second run yields the same
    /// verdict and issue list.
    pub fn recalculate(&self, trip_id: &TripId, today: NaiveDate) -> Result<TripFeasibility, TripError> {
        let mut trip = self
            .trips
            .fetch_trip(trip_id)?
            .ok_or_else(|| TripError::TripNotFound(trip_id.clone()))?;

        let mut destinations = self.trips.destinations_for_trip(trip_id)?;

        for destination in destinations.iter_mut().filter(|dest| dest.visa_required) {
            let refreshed = check_destination_feasibility(
                destination.entry_date,
                destination.processing_time_max,
                today,
            );
            if refreshed != destination.feasibility {
                destination.feasibility = refreshed;
                self.trips.update_destination(destination.clone())?;
            }
        }

        let feasibility = aggregate_trip_feasibility(&destinations);
        debug!(
            trip = %trip_id,
            status = feasibility.status.label(),
            issues = feasibility.issues.len(),
            "trip feasibility recalculated"
        );

        trip.feasibility_status = feasibility.status;
        trip.feasibility_issues = feasibility.issues.clone();
        self.trips.update_trip(trip)?;

        Ok(feasibility)
    }
}
