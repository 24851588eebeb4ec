use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// ISO 3166-1 alpha-2 code, normalized to uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CountryCode(pub String);

impl CountryCode {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Regional economic/political blocs used for visa exemption logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegionalBloc {
    Ecowas,
    Eac,
    Gcc,
    Au,
    Eu,
    Schengen,
    Sadc,
    Comesa,
}

impl RegionalBloc {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ecowas => "ECOWAS",
            Self::Eac => "EAC",
            Self::Gcc => "GCC",
            Self::Au => "AU",
            Self::Eu => "EU",
            Self::Schengen => "SCHENGEN",
            Self::Sadc => "SADC",
            Self::Comesa => "COMESA",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Continent {
    Africa,
    Asia,
    Europe,
    NorthAmerica,
    SouthAmerica,
    Oceania,
    Antarctica,
}

/// Immutable country reference data, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    pub iso_code: CountryCode,
    pub iso_code3: Option<String>,
    pub continent: Option<Continent>,
    pub regional_blocs: Vec<RegionalBloc>,
    pub default_passport_validity_days: u32,
    pub has_evisa_system: bool,
    pub has_eta_system: bool,
    pub has_voa: bool,
    pub yellow_fever_endemic: bool,
    pub currency: String,
    pub evisa_portal_url: Option<String>,
    pub immigration_portal_url: Option<String>,
}

impl Country {
    pub fn is_in_bloc(&self, bloc: RegionalBloc) -> bool {
        self.regional_blocs.contains(&bloc)
    }
}

/// Visa regime applicable to a (passport, destination, purpose) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisaType {
    VisaFree,
    EVisa,
    VisaOnArrival,
    EmbassyVisa,
    TransitVisa,
    Eta,
    TravelAuth,
}

impl VisaType {
    pub const ALL: [Self; 7] = [
        Self::VisaFree,
        Self::EVisa,
        Self::VisaOnArrival,
        Self::EmbassyVisa,
        Self::TransitVisa,
        Self::Eta,
        Self::TravelAuth,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::VisaFree => "Visa Not Required",
            Self::EVisa => "Electronic Visa (eVisa)",
            Self::VisaOnArrival => "Visa on Arrival",
            Self::EmbassyVisa => "Embassy/Consulate Visa",
            Self::TransitVisa => "Transit Visa",
            Self::Eta => "Electronic Travel Authorization",
            Self::TravelAuth => "Travel Authorization",
        }
    }

    /// True when the traveler must act before departure: gather documents,
    /// apply, and wait on processing.
    pub const fn requires_pre_arrival_action(self) -> bool {
        matches!(self, Self::EVisa | Self::EmbassyVisa | Self::TransitVisa)
    }

    /// True when the regime involves processing ahead of travel, which is
    /// what drags on trip feasibility. Visa-free and on-arrival entries
    /// need no lead time.
    pub const fn requires_processing(self) -> bool {
        !matches!(self, Self::VisaFree | Self::VisaOnArrival)
    }
}

impl fmt::Display for VisaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TravelPurpose {
    #[default]
    Tourism,
    Business,
    Transit,
    Study,
    Work,
    Diplomatic,
    Medical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationMethod {
    Online,
    Embassy,
    VfsGlobal,
    TlsContact,
    OnArrival,
    MobileApp,
    None,
}

/// Typed pre-arrival digital requirements (arrival cards, e-tickets,
/// travel authorizations) distinct from the visa itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PreArrivalKind {
    ETicket,
    Tdac,
    Eta,
    TravelAuth,
    HealthDeclaration,
    DigitalLandingCard,
}

pub const DEFAULT_PRE_ARRIVAL_ADVANCE_HOURS: u32 = 72;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreArrivalRequirement {
    pub kind: PreArrivalKind,
    pub name: String,
    pub portal_url: Option<String>,
    pub advance_hours: u32,
    pub mandatory: bool,
    pub cost: Option<u32>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum YellowFeverPolicy {
    Always,
    Conditional,
    #[default]
    NotRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct YellowFeverConditions {
    pub if_from_endemic_country: bool,
    pub if_transiting_endemic: bool,
    pub exempt_under_age: Option<u8>,
    pub exempt_over_age: Option<u8>,
}

/// Visa-on-arrival eligibility contingent on holding a valid visa or
/// residence permit from one of the listed third countries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConditionalAccess {
    pub requires_valid_visa_from: Vec<CountryCode>,
    pub valid_visa_types: Vec<String>,
    pub min_visa_validity_days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EligibilityConditions {
    pub exempt_blocs: Vec<RegionalBloc>,
    pub conditional_access: Option<ConditionalAccess>,
    pub excluded_countries: Vec<CountryCode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalFee {
    pub name: String,
    pub amount: u32,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleId(pub String);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One versioned visa rule. `passport_country` of `None` marks a
/// destination-wide default applied when no specific pairing exists.
/// At most one active rule per (passport, destination, purpose) key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisaRule {
    pub id: RuleId,
    pub passport_country: Option<CountryCode>,
    pub destination_country: CountryCode,
    pub travel_purpose: TravelPurpose,
    pub visa_type: VisaType,
    pub application_method: ApplicationMethod,
    pub visa_free_days: Option<u32>,
    pub allowed_stay_days: Option<u32>,
    pub validity_period_days: Option<u32>,
    pub processing_time_min: u32,
    pub processing_time_max: u32,
    pub visa_cost: Option<u32>,
    pub currency: String,
    pub additional_fees: Vec<AdditionalFee>,
    pub passport_validity_days: u32,
    pub blank_pages_required: u32,
    pub eligibility: EligibilityConditions,
    pub pre_arrival: Vec<PreArrivalRequirement>,
    pub yellow_fever: YellowFeverPolicy,
    pub yellow_fever_conditions: YellowFeverConditions,
    pub application_url: Option<String>,
    pub restrictions: Vec<String>,
    pub notes: Option<String>,
    pub version: u32,
    pub is_active: bool,
}

impl VisaRule {
    /// Maximum permitted stay, falling back to the visa-free allowance.
    pub fn allowed_stay(&self) -> Option<u32> {
        self.allowed_stay_days.or(self.visa_free_days)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TravelDates {
    pub arrival_date: Option<NaiveDate>,
    pub departure_date: Option<NaiveDate>,
}

impl TravelDates {
    pub fn trip_end(&self) -> Option<NaiveDate> {
        self.departure_date.or(self.arrival_date)
    }
}

/// What the engine knows about the traveler beyond their nationality.
/// Identity is established upstream; no authentication happens here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TravelerContext {
    pub passport_expiry_date: Option<NaiveDate>,
    pub holds_valid_visa_from: Vec<CountryCode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelerProfile {
    pub user_id: UserId,
    pub passport_country: CountryCode,
    pub passport_expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdvisoryKind {
    PassportValidity,
    YellowFever,
    PreArrivalForm,
    ProcessingTime,
}

/// Rejection-prevention advisory attached to a successful lookup.
/// Advisories surface risk; they never block a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub severity: Severity,
    pub message: String,
    pub action: String,
    pub form: Option<PreArrivalKind>,
}

/// Closed three-state feasibility classification, used uniformly at
/// destination and trip granularity. IMPOSSIBLE dominates, RISKY is next,
/// FEASIBLE is the null case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeasibilityStatus {
    #[default]
    Feasible,
    Risky,
    Impossible,
}

impl FeasibilityStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Feasible => "FEASIBLE",
            Self::Risky => "RISKY",
            Self::Impossible => "IMPOSSIBLE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationFeasibility {
    pub status: FeasibilityStatus,
    pub reason: String,
}

impl DestinationFeasibility {
    pub fn visa_not_required() -> Self {
        Self {
            status: FeasibilityStatus::Feasible,
            reason: "Visa not required".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TripId(pub String);

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DestinationId(pub String);

impl fmt::Display for DestinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One leg of a trip. Owned by its trip; carries a snapshot of the
/// resolved rule and a cached feasibility verdict that is recomputed on
/// every trip-level recalculation, never trusted as stale truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripDestination {
    pub id: DestinationId,
    pub trip_id: TripId,
    pub country_code: CountryCode,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub travel_purpose: TravelPurpose,
    pub visa_required: bool,
    pub visa_type: Option<VisaType>,
    pub processing_time_min: Option<u32>,
    pub processing_time_max: Option<u32>,
    pub feasibility: DestinationFeasibility,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripStatus {
    #[default]
    Planning,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeasibilityIssue {
    pub destination: CountryCode,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub user_id: UserId,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: TripStatus,
    pub feasibility_status: FeasibilityStatus,
    pub feasibility_issues: Vec<FeasibilityIssue>,
}
