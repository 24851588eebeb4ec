use std::collections::{HashMap, HashSet};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;
use visatrack::workflows::visa::{
    AlertKey, ApplicationId, ApplicationStore, CountryCode, DestinationId, DocumentCompleteness,
    DocumentInventory, Notice, NotificationDispatcher, NotificationLedger, NotifyError,
    StoreError, TravelPurpose, TravelerProfile, Trip, TripDestination, TripId, TripStore, UserId,
    VisaApplication, VisaRule, VisaRuleStore,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory rule store backing the demo service. Production deployments
/// implement `VisaRuleStore` over their database.
#[derive(Default)]
pub(crate) struct InMemoryRuleStore {
    rules: Mutex<Vec<VisaRule>>,
}

impl InMemoryRuleStore {
    pub(crate) fn with_rules(rules: Vec<VisaRule>) -> Self {
        Self {
            rules: Mutex::new(rules),
        }
    }
}

impl VisaRuleStore for InMemoryRuleStore {
    fn find_active_rule(
        &self,
        passport: &CountryCode,
        destination: &CountryCode,
        purpose: TravelPurpose,
    ) -> Result<Option<VisaRule>, StoreError> {
        Ok(self
            .rules
            .lock()
            .expect("rule mutex poisoned")
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
            .lock()
            .expect("rule mutex poisoned")
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
            .lock()
            .expect("rule mutex poisoned")
            .iter()
            .filter(|rule| rule.is_active && &rule.destination_country == destination)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryTripStore {
    trips: Mutex<HashMap<TripId, Trip>>,
    destinations: Mutex<HashMap<DestinationId, TripDestination>>,
}

impl InMemoryTripStore {
    pub(crate) fn create_trip(&self, trip: Trip) -> Result<Trip, StoreError> {
        let mut guard = self.trips.lock().expect("trip mutex poisoned");
        if guard.contains_key(&trip.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(trip.id.clone(), trip.clone());
        Ok(trip)
    }
}

impl TripStore for InMemoryTripStore {
    fn fetch_trip(&self, id: &TripId) -> Result<Option<Trip>, StoreError> {
        Ok(self
            .trips
            .lock()
            .expect("trip mutex poisoned")
            .get(id)
            .cloned())
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
        let mut guard = self
            .destinations
            .lock()
            .expect("destination mutex poisoned");
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
pub(crate) struct InMemoryApplicationStore {
    applications: Mutex<HashMap<ApplicationId, VisaApplication>>,
}

impl ApplicationStore for InMemoryApplicationStore {
    fn insert(&self, application: VisaApplication) -> Result<VisaApplication, StoreError> {
        let mut guard = self
            .applications
            .lock()
            .expect("application mutex poisoned");
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

/// Document completeness keyed by application. Uploads register a typed
/// document; content never leaves the caller.
#[derive(Default)]
pub(crate) struct InMemoryDocumentInventory {
    mandatory: Mutex<HashMap<ApplicationId, Vec<String>>>,
    uploaded: Mutex<HashMap<ApplicationId, HashSet<String>>>,
}

impl InMemoryDocumentInventory {
    pub(crate) fn set_mandatory(&self, id: ApplicationId, types: Vec<String>) {
        self.mandatory
            .lock()
            .expect("mandatory mutex poisoned")
            .insert(id, types);
    }

    pub(crate) fn record_upload(&self, id: ApplicationId, document_type: String) {
        self.uploaded
            .lock()
            .expect("uploaded mutex poisoned")
            .entry(id)
            .or_default()
            .insert(document_type);
    }
}

impl DocumentInventory for InMemoryDocumentInventory {
    fn completeness(
        &self,
        application: &ApplicationId,
    ) -> Result<DocumentCompleteness, StoreError> {
        let mandatory = self
            .mandatory
            .lock()
            .expect("mandatory mutex poisoned")
            .get(application)
            .cloned()
            .unwrap_or_default();
        let uploaded = self
            .uploaded
            .lock()
            .expect("uploaded mutex poisoned")
            .get(application)
            .cloned()
            .unwrap_or_default();

        let missing: Vec<String> = mandatory
            .iter()
            .filter(|doc| !uploaded.contains(*doc))
            .cloned()
            .collect();

        Ok(DocumentCompleteness {
            total_mandatory: mandatory.len() as u32,
            uploaded_count: uploaded.len() as u32,
            missing_mandatory: missing,
        })
    }
}

/// Log-only dispatcher standing in for push delivery.
#[derive(Default)]
pub(crate) struct LoggingNotifier {
    sent: Mutex<Vec<Notice>>,
}

impl LoggingNotifier {
    pub(crate) fn sent(&self) -> Vec<Notice> {
        self.sent.lock().expect("notifier mutex poisoned").clone()
    }
}

impl NotificationDispatcher for LoggingNotifier {
    fn dispatch(&self, notice: Notice) -> Result<(), NotifyError> {
        tracing::info!(
            user = %notice.user_id.0,
            application = %notice.application_id,
            kind = ?notice.kind,
            title = %notice.title,
            "notification dispatched"
        );
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .push(notice);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryNotificationLedger {
    keys: Mutex<HashSet<AlertKey>>,
}

impl NotificationLedger for InMemoryNotificationLedger {
    fn record(&self, key: AlertKey) -> Result<bool, StoreError> {
        Ok(self
            .keys
            .lock()
            .expect("ledger mutex poisoned")
            .insert(key))
    }
}

/// Known traveler profiles; a stand-in for the authenticated identity the
/// real deployment passes through.
#[derive(Default)]
pub(crate) struct UserDirectory {
    profiles: Mutex<HashMap<UserId, TravelerProfile>>,
}

impl UserDirectory {
    pub(crate) fn upsert(&self, profile: TravelerProfile) {
        self.profiles
            .lock()
            .expect("profile mutex poisoned")
            .insert(profile.user_id.clone(), profile);
    }

    pub(crate) fn get(&self, user: &UserId) -> Option<TravelerProfile> {
        self.profiles
            .lock()
            .expect("profile mutex poisoned")
            .get(user)
            .cloned()
    }
}
