use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate};

use crate::workflows::visa::applications::domain::DocumentCompleteness;
use crate::workflows::visa::applications::{VisaApplication, VisaApplicationService};
use crate::workflows::visa::catalog::CountryCatalog;
use crate::workflows::visa::domain::{
    ApplicationId, CountryCode, DestinationFeasibility, DestinationId, FeasibilityStatus,
    TravelPurpose, TravelerProfile, Trip, TripDestination, TripId, TripStatus, UserId, VisaRule,
    VisaType,
};
use crate::workflows::visa::notifications::{
    AlertKey, Notice, NotificationDispatcher, NotificationLedger, NotifyError,
};
use crate::workflows::visa::repository::{
    ApplicationStore, DocumentInventory, StoreError, TripStore, VisaRuleStore,
};
use crate::workflows::visa::rules::VisaRuleResolver;
use crate::workflows::visa::seed::standard_rules;
use crate::workflows::visa::trips::TripService;

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn today() -> NaiveDate {
    date(2026, 3, 2)
}

pub(super) fn code(value: &str) -> CountryCode {
    CountryCode::new(value)
}

pub(super) fn traveler(passport: &str) -> TravelerProfile {
    TravelerProfile {
        user_id: UserId("user-1".to_string()),
        passport_country: code(passport),
        passport_expiry_date: Some(date(2030, 1, 1)),
    }
}

#[derive(Default)]
pub(super) struct MemoryRuleStore {
    rules: Vec<VisaRule>,
}

impl MemoryRuleStore {
    pub(super) fn with_standard_rules() -> Self {
        Self {
            rules: standard_rules(),
        }
    }

    pub(super) fn with_rules(rules: Vec<VisaRule>) -> Self {
        Self { rules }
    }
}

impl VisaRuleStore for MemoryRuleStore {
    fn find_active_rule(
        &self,
        passport: &CountryCode,
        destination: &CountryCode,
        purpose: TravelPurpose,
    ) -> Result<Option<VisaRule>, StoreError> {
        Ok(self
            .rules
            .iter()
            .find(|rule| {
                rule.is_active
                    && rule.passport_country.as_ref() == Some(passport)
                    && &rule.destination_country == destination
                    && rule.travel_purpose == purpose
            })
            .cloned())
    }

    fn find_destination_default(
        &self,
        destination: &CountryCode,
        purpose: TravelPurpose,
    ) -> Result<Option<VisaRule>, StoreError> {
        Ok(self
            .rules
            .iter()
            .find(|rule| {
                rule.is_active
                    && rule.passport_country.is_none()
                    && &rule.destination_country == destination
                    && rule.travel_purpose == purpose
            })
            .cloned())
    }

    fn rules_for_destination(
        &self,
        destination: &CountryCode,
    ) -> Result<Vec<VisaRule>, StoreError> {
        Ok(self
            .rules
            .iter()
            .filter(|rule| rule.is_active && &rule.destination_country == destination)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(super) struct MemoryTripStore {
    trips: Mutex<HashMap<TripId, Trip>>,
    destinations: Mutex<HashMap<DestinationId, TripDestination>>,
}

impl MemoryTripStore {
    pub(super) fn seed_trip(&self, trip: Trip) {
        self.trips
            .lock()
            .expect("trip mutex poisoned")
            .insert(trip.id.clone(), trip);
    }

    pub(super) fn seed_destination(&self, destination: TripDestination) {
        self.destinations
            .lock()
            .expect("destination mutex poisoned")
            .insert(destination.id.clone(), destination);
    }

    pub(super) fn trip(&self, id: &TripId) -> Option<Trip> {
        self.trips.lock().expect("trip mutex poisoned").get(id).cloned()
    }
}

impl TripStore for MemoryTripStore {
    fn fetch_trip(&self, id: &TripId) -> Result<Option<Trip>, StoreError> {
        Ok(self.trips.lock().expect("trip mutex poisoned").get(id).cloned())
    }

    fn update_trip(&self, trip: Trip) -> Result<(), StoreError> {
        self.trips
            .lock()
            .expect("trip mutex poisoned")
            .insert(trip.id.clone(), trip);
        Ok(())
    }

    fn destinations_for_trip(&self, id: &TripId) -> Result<Vec<TripDestination>, StoreError> {
        let mut destinations: Vec<TripDestination> = self
            .destinations
            .lock()
            .expect("destination mutex poisoned")
            .values()
            .filter(|dest| &dest.trip_id == id)
            .cloned()
            .collect();
        destinations.sort_by(|a, b| a.entry_date.cmp(&b.entry_date).then(a.id.0.cmp(&b.id.0)));
        Ok(destinations)
    }

    fn fetch_destination(
        &self,
        id: &DestinationId,
    ) -> Result<Option<TripDestination>, StoreError> {
        Ok(self
            .destinations
            .lock()
            .expect("destination mutex poisoned")
            .get(id)
            .cloned())
    }

    fn insert_destination(
        &self,
        destination: TripDestination,
    ) -> Result<TripDestination, StoreError> {
        let mut guard = self.destinations.lock().expect("destination mutex poisoned");
        if guard.contains_key(&destination.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(destination.id.clone(), destination.clone());
        Ok(destination)
    }

    fn update_destination(&self, destination: TripDestination) -> Result<(), StoreError> {
        self.destinations
            .lock()
            .expect("destination mutex poisoned")
            .insert(destination.id.clone(), destination);
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryApplicationStore {
    applications: Mutex<HashMap<ApplicationId, VisaApplication>>,
}

impl MemoryApplicationStore {
    pub(super) fn seed(&self, application: VisaApplication) {
        self.applications
            .lock()
            .expect("application mutex poisoned")
            .insert(application.id.clone(), application);
    }
}

impl ApplicationStore for MemoryApplicationStore {
    fn insert(&self, application: VisaApplication) -> Result<VisaApplication, StoreError> {
        let mut guard = self.applications.lock().expect("application mutex poisoned");
        if guard.contains_key(&application.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update(&self, application: VisaApplication) -> Result<(), StoreError> {
        self.applications
            .lock()
            .expect("application mutex poisoned")
            .insert(application.id.clone(), application);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<VisaApplication>, StoreError> {
        Ok(self
            .applications
            .lock()
            .expect("application mutex poisoned")
            .get(id)
            .cloned())
    }

    fn find_for_destination(
        &self,
        user: &UserId,
        destination: &DestinationId,
    ) -> Result<Option<VisaApplication>, StoreError> {
        Ok(self
            .applications
            .lock()
            .expect("application mutex poisoned")
            .values()
            .find(|app| &app.user_id == user && &app.trip_destination_id == destination)
            .cloned())
    }

    fn open_applications(&self) -> Result<Vec<VisaApplication>, StoreError> {
        let mut open: Vec<VisaApplication> = self
            .applications
            .lock()
            .expect("application mutex poisoned")
            .values()
            .filter(|app| app.status.is_open())
            .cloned()
            .collect();
        open.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(open)
    }
}

/// Fixed completeness responses keyed by application id.
#[derive(Default)]
pub(super) struct MemoryDocuments {
    responses: Mutex<HashMap<ApplicationId, DocumentCompleteness>>,
}

impl MemoryDocuments {
    pub(super) fn set(&self, id: ApplicationId, completeness: DocumentCompleteness) {
        self.responses
            .lock()
            .expect("documents mutex poisoned")
            .insert(id, completeness);
    }
}

impl DocumentInventory for MemoryDocuments {
    fn completeness(
        &self,
        application: &ApplicationId,
    ) -> Result<DocumentCompleteness, StoreError> {
        Ok(self
            .responses
            .lock()
            .expect("documents mutex poisoned")
            .get(application)
            .cloned()
            .unwrap_or(DocumentCompleteness {
                total_mandatory: 0,
                uploaded_count: 0,
                missing_mandatory: Vec::new(),
            }))
    }
}

#[derive(Default)]
pub(super) struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    pub(super) fn notices(&self) -> Vec<Notice> {
        self.notices.lock().expect("notifier mutex poisoned").clone()
    }
}

impl NotificationDispatcher for MemoryNotifier {
    fn dispatch(&self, notice: Notice) -> Result<(), NotifyError> {
        self.notices
            .lock()
            .expect("notifier mutex poisoned")
            .push(notice);
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryLedger {
    keys: Mutex<HashSet<AlertKey>>,
}

impl NotificationLedger for MemoryLedger {
    fn record(&self, key: AlertKey) -> Result<bool, StoreError> {
        Ok(self.keys.lock().expect("ledger mutex poisoned").insert(key))
    }
}

pub(super) fn build_resolver() -> VisaRuleResolver<MemoryRuleStore> {
    VisaRuleResolver::new(
        Arc::new(CountryCatalog::standard()),
        Arc::new(MemoryRuleStore::with_standard_rules()),
    )
}

pub(super) fn resolver_with_rules(rules: Vec<VisaRule>) -> VisaRuleResolver<MemoryRuleStore> {
    VisaRuleResolver::new(
        Arc::new(CountryCatalog::standard()),
        Arc::new(MemoryRuleStore::with_rules(rules)),
    )
}

pub(super) fn build_trip_service() -> (
    TripService<MemoryTripStore, MemoryRuleStore>,
    Arc<MemoryTripStore>,
) {
    let trips = Arc::new(MemoryTripStore::default());
    let service = TripService::new(
        Arc::new(CountryCatalog::standard()),
        trips.clone(),
        Arc::new(MemoryRuleStore::with_standard_rules()),
    );
    (service, trips)
}

pub(super) type TestApplicationService = VisaApplicationService<
    MemoryApplicationStore,
    MemoryTripStore,
    MemoryRuleStore,
    MemoryDocuments,
    MemoryNotifier,
>;

pub(super) struct ApplicationHarness {
    pub(super) service: TestApplicationService,
    pub(super) applications: Arc<MemoryApplicationStore>,
    pub(super) trips: Arc<MemoryTripStore>,
    pub(super) documents: Arc<MemoryDocuments>,
    pub(super) notifier: Arc<MemoryNotifier>,
}

pub(super) fn build_application_service() -> ApplicationHarness {
    let applications = Arc::new(MemoryApplicationStore::default());
    let trips = Arc::new(MemoryTripStore::default());
    let documents = Arc::new(MemoryDocuments::default());
    let notifier = Arc::new(MemoryNotifier::default());

    let trip_service = TripService::new(
        Arc::new(CountryCatalog::standard()),
        trips.clone(),
        Arc::new(MemoryRuleStore::with_standard_rules()),
    );

    let service = VisaApplicationService::new(
        applications.clone(),
        documents.clone(),
        notifier.clone(),
        trip_service,
    );

    ApplicationHarness {
        service,
        applications,
        trips,
        documents,
        notifier,
    }
}

pub(super) fn trip(id: &str) -> Trip {
    Trip {
        id: TripId(id.to_string()),
        user_id: UserId("user-1".to_string()),
        title: "East Africa circuit".to_string(),
        start_date: today() + Duration::days(30),
        end_date: today() + Duration::days(60),
        status: TripStatus::Planning,
        feasibility_status: FeasibilityStatus::Feasible,
        feasibility_issues: Vec::new(),
    }
}

pub(super) fn destination(
    id: &str,
    trip_id: &str,
    country: &str,
    entry_in_days: i64,
    visa_type: Option<VisaType>,
    processing_max: Option<u32>,
) -> TripDestination {
    let visa_required = visa_type
        .map(VisaType::requires_processing)
        .unwrap_or(false);
    TripDestination {
        id: DestinationId(id.to_string()),
        trip_id: TripId(trip_id.to_string()),
        country_code: code(country),
        entry_date: today() + Duration::days(entry_in_days),
        exit_date: today() + Duration::days(entry_in_days + 7),
        travel_purpose: TravelPurpose::Tourism,
        visa_required,
        visa_type,
        processing_time_min: processing_max.map(|_| 1),
        processing_time_max: processing_max,
        feasibility: DestinationFeasibility::visa_not_required(),
        notes: None,
    }
}
