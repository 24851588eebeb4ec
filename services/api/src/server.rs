use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;
use visatrack::config::AppConfig;
use visatrack::error::AppError;
use visatrack::telemetry;
use visatrack::workflows::visa::{
    AlertSweep, CountryCatalog, TravelerProfile, TripService, VisaApplicationService,
    VisaRuleResolver,
};

use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryApplicationStore, InMemoryDocumentInventory, InMemoryNotificationLedger,
    InMemoryRuleStore, InMemoryTripStore, LoggingNotifier, UserDirectory,
};
use crate::routes::{api_router, Services};

pub(crate) fn build_services(catalog: Arc<CountryCatalog>) -> Arc<Services> {
    let rules = Arc::new(InMemoryRuleStore::with_rules(
        visatrack::workflows::visa::seed::standard_rules(),
    ));
    let trips = Arc::new(InMemoryTripStore::default());
    let applications = Arc::new(InMemoryApplicationStore::default());
    let documents = Arc::new(InMemoryDocumentInventory::default());
    let notifier = Arc::new(LoggingNotifier::default());
    let ledger = Arc::new(InMemoryNotificationLedger::default());
    let users = Arc::new(UserDirectory::default());

    let resolver = Arc::new(VisaRuleResolver::new(catalog.clone(), rules.clone()));
    let trip_service = TripService::new(catalog.clone(), trips.clone(), rules.clone());
    let application_service = VisaApplicationService::new(
        applications.clone(),
        documents.clone(),
        notifier.clone(),
        TripService::new(catalog, trips.clone(), rules.clone()),
    );
    let sweep = AlertSweep::new(applications, notifier.clone(), ledger);

    Arc::new(Services {
        resolver,
        trip_service,
        application_service,
        sweep,
        rules,
        trips,
        documents,
        users,
        notifier,
    })
}

fn load_catalog(config: &AppConfig) -> Result<CountryCatalog, AppError> {
    match &config.reference_data.country_csv {
        Some(path) => {
            let file = std::fs::File::open(path)?;
            Ok(CountryCatalog::from_csv_reader(file)?)
        }
        None => Ok(CountryCatalog::standard()),
    }
}

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let catalog = Arc::new(load_catalog(&config)?);
    info!(countries = catalog.len(), "country catalog loaded");

    let services = build_services(catalog);

    // A demo traveler so the trip and application endpoints are usable
    // out of the box.
    services.users.upsert(TravelerProfile {
        user_id: visatrack::workflows::visa::UserId("demo-traveler".to_string()),
        passport_country: visatrack::workflows::visa::CountryCode::new("IN"),
        passport_expiry_date: chrono::NaiveDate::from_ymd_opt(2031, 1, 1),
    });

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = api_router(services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "visa feasibility service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
