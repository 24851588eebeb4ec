use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use visatrack::error::AppError;
use visatrack::workflows::visa::{
    application_steps, CountryCatalog, CountryCode, MultiCountryPlanner, PlannedDestination,
    TravelDates, TravelPurpose, TravelerContext, VisaRuleResolver,
};

use crate::demo::{run_demo, DemoArgs};
use crate::infra::InMemoryRuleStore;
use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "VisaTrack",
    about = "Visa requirement lookups and trip feasibility from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Resolve the visa requirement for one passport/destination pair
    Check(CheckArgs),
    /// Analyze a multi-country itinerary for feasibility
    Plan(PlanArgs),
    /// Run an end-to-end demo covering lookup, trip, and application flows
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Passport country (ISO alpha-2)
    #[arg(long)]
    passport: String,
    /// Destination country (ISO alpha-2)
    #[arg(long)]
    destination: String,
    /// Travel purpose
    #[arg(long, default_value = "TOURISM")]
    purpose: String,
    /// Planned arrival date (YYYY-MM-DD)
    #[arg(long)]
    arrival: Option<NaiveDate>,
    /// Planned departure date (YYYY-MM-DD)
    #[arg(long)]
    departure: Option<NaiveDate>,
    /// Passport expiry date (YYYY-MM-DD)
    #[arg(long)]
    passport_expiry: Option<NaiveDate>,
    /// Countries whose valid visas the traveler holds (repeatable)
    #[arg(long = "holds-visa-from")]
    holds_visa_from: Vec<String>,
}

#[derive(Args, Debug)]
pub(crate) struct PlanArgs {
    /// Passport country (ISO alpha-2)
    #[arg(long)]
    passport: String,
    /// Destination legs as CC:ARRIVAL[:DEPARTURE] (repeatable)
    #[arg(long = "leg", required = true)]
    legs: Vec<String>,
    /// Passport expiry date (YYYY-MM-DD)
    #[arg(long)]
    passport_expiry: Option<NaiveDate>,
}

fn parse_purpose(value: &str) -> TravelPurpose {
    serde_json::from_value(serde_json::Value::String(value.trim().to_ascii_uppercase()))
        .unwrap_or_default()
}

fn parse_leg(value: &str) -> Result<PlannedDestination, AppError> {
    let mut parts = value.split(':');
    let country = parts.next().unwrap_or_default();
    let arrival = parts
        .next()
        .and_then(|raw| raw.parse::<NaiveDate>().ok())
        .ok_or_else(|| {
            AppError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("leg '{value}' must look like CC:YYYY-MM-DD[:YYYY-MM-DD]"),
            ))
        })?;
    let departure = parts.next().and_then(|raw| raw.parse::<NaiveDate>().ok());

    Ok(PlannedDestination {
        country_code: CountryCode::new(country),
        arrival_date: arrival,
        departure_date: departure,
    })
}

fn standard_resolver() -> VisaRuleResolver<InMemoryRuleStore> {
    VisaRuleResolver::new(
        Arc::new(CountryCatalog::standard()),
        Arc::new(InMemoryRuleStore::with_rules(
            visatrack::workflows::visa::seed::standard_rules(),
        )),
    )
}

fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let resolver = standard_resolver();
    let today = Local::now().date_naive();

    let assessment = resolver.resolve(
        &CountryCode::new(&args.passport),
        &CountryCode::new(&args.destination),
        parse_purpose(&args.purpose),
        &TravelDates {
            arrival_date: args.arrival,
            departure_date: args.departure,
        },
        &TravelerContext {
            passport_expiry_date: args.passport_expiry,
            holds_valid_visa_from: args.holds_visa_from.iter().map(CountryCode::new).collect(),
        },
        today,
    )?;

    let steps = application_steps(&assessment);
    let mut body = serde_json::to_value(&assessment)
        .map_err(|error| AppError::Io(std::io::Error::other(error)))?;
    if let Some(object) = body.as_object_mut() {
        object.insert(
            "application_steps".to_string(),
            serde_json::to_value(steps).unwrap_or_default(),
        );
    }

    println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    Ok(())
}

fn run_plan(args: PlanArgs) -> Result<(), AppError> {
    let resolver = standard_resolver();
    let today = Local::now().date_naive();

    let legs = args
        .legs
        .iter()
        .map(|leg| parse_leg(leg))
        .collect::<Result<Vec<_>, _>>()?;

    let planner = MultiCountryPlanner::new(&resolver);
    let plan = planner.analyze(
        &CountryCode::new(&args.passport),
        &legs,
        TravelPurpose::Tourism,
        &TravelerContext {
            passport_expiry_date: args.passport_expiry,
            holds_valid_visa_from: Vec::new(),
        },
        today,
    )?;

    println!("{}", serde_json::to_string_pretty(&plan).unwrap_or_default());
    Ok(())
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Check(args) => run_check(args),
        Command::Plan(args) => run_plan(args),
        Command::Demo(args) => run_demo(args),
    }
}
