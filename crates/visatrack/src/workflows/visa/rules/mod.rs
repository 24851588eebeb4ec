mod exemptions;
mod pre_arrival;
mod steps;
mod warnings;

pub use exemptions::{BlocExemption, ExemptionTable};
pub use pre_arrival::KnownPreArrivalTable;
pub use steps::{application_steps, ApplicationStep};

pub(crate) use super::timeline::SAFETY_BUFFER_DAYS;

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::catalog::CountryCatalog;
use super::domain::{
    AdditionalFee, Advisory, ApplicationMethod, Country, CountryCode, PreArrivalRequirement,
    RegionalBloc, RuleId, TravelDates, TravelPurpose, TravelerContext, VisaRule, VisaType,
    YellowFeverConditions, YellowFeverPolicy,
};
use super::repository::{StoreError, VisaRuleStore};

/// Immutable rule tables injected into the resolver at construction.
#[derive(Debug, Clone)]
pub struct RuleTables {
    pub exemptions: ExemptionTable,
    pub known_pre_arrival: KnownPreArrivalTable,
}

impl Default for RuleTables {
    fn default() -> Self {
        Self {
            exemptions: ExemptionTable::standard(),
            known_pre_arrival: KnownPreArrivalTable::standard(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("unknown country code: {0}")]
    UnknownCountry(CountryCode),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryRef {
    pub name: String,
    pub iso_code: CountryCode,
}

impl From<&Country> for CountryRef {
    fn from(country: &Country) -> Self {
        Self {
            name: country.name.clone(),
            iso_code: country.iso_code.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingTime {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FeeSummary {
    pub visa_cost: Option<u32>,
    pub currency: String,
    pub additional_fees: Vec<AdditionalFee>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExemptionGrant {
    pub bloc: RegionalBloc,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionalGrant {
    pub matched_country: CountryCode,
    pub reason: String,
}

/// Normalized outcome of a visa lookup. Never silently visa-free: when no
/// rule exists the result degrades to a conservative embassy-visa
/// assumption flagged `requires_confirmation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisaAssessment {
    pub visa_type: VisaType,
    pub visa_type_label: &'static str,
    pub passport: CountryRef,
    pub destination: CountryRef,
    pub purpose: TravelPurpose,
    pub allowed_stay_days: Option<u32>,
    pub processing_time: Option<ProcessingTime>,
    pub fees: FeeSummary,
    pub passport_validity_days: u32,
    pub blank_pages_required: u32,
    pub application_method: ApplicationMethod,
    pub application_url: Option<String>,
    pub pre_arrival: Vec<PreArrivalRequirement>,
    pub yellow_fever: YellowFeverPolicy,
    pub yellow_fever_conditions: YellowFeverConditions,
    pub exemption: Option<ExemptionGrant>,
    pub conditional_access: Option<ConditionalGrant>,
    pub warnings: Vec<Advisory>,
    pub restrictions: Vec<String>,
    pub notes: Option<String>,
    pub rule_id: Option<RuleId>,
    pub requires_confirmation: bool,
    pub is_default_rule: bool,
}

/// Layered rule resolution: bloc exemption, then specific rule, then
/// destination default, then the conservative fallback; conditional
/// access and advisories applied on the rule path.
pub struct VisaRuleResolver<S> {
    catalog: Arc<CountryCatalog>,
    rules: Arc<S>,
    tables: RuleTables,
}

impl<S> VisaRuleResolver<S>
where
    S: VisaRuleStore,
{
    pub fn new(catalog: Arc<CountryCatalog>, rules: Arc<S>) -> Self {
        Self::with_tables(catalog, rules, RuleTables::default())
    }

    pub fn with_tables(catalog: Arc<CountryCatalog>, rules: Arc<S>, tables: RuleTables) -> Self {
        Self {
            catalog,
            rules,
            tables,
        }
    }

    pub fn catalog(&self) -> &CountryCatalog {
        &self.catalog
    }

    pub fn resolve(
        &self,
        passport_code: &CountryCode,
        destination_code: &CountryCode,
        purpose: TravelPurpose,
        dates: &TravelDates,
        traveler: &TravelerContext,
        today: NaiveDate,
    ) -> Result<VisaAssessment, ResolveError> {
        let passport = self.require_country(passport_code)?;
        let destination = self.require_country(destination_code)?;

        if let Some(exemption) = self.tables.exemptions.matching(passport, destination) {
            return Ok(exempt_assessment(passport, destination, purpose, exemption));
        }

        let (rule, is_default_rule) = match self.rules.find_active_rule(
            &passport.iso_code,
            &destination.iso_code,
            purpose,
        )? {
            Some(rule) => (rule, false),
            None => match self
                .rules
                .find_destination_default(&destination.iso_code, purpose)?
            {
                Some(rule) => (rule, true),
                None => {
                    return Ok(unconfirmed_assessment(passport, destination, purpose));
                }
            },
        };

        let conditional_access = check_conditional_access(&rule, traveler);
        let warnings = warnings::generate_warnings(&rule, passport, dates, traveler, today);
        let pre_arrival = self
            .tables
            .known_pre_arrival
            .merge(&destination.iso_code, &rule.pre_arrival);

        Ok(VisaAssessment {
            visa_type: rule.visa_type,
            visa_type_label: rule.visa_type.label(),
            passport: passport.into(),
            destination: destination.into(),
            purpose,
            allowed_stay_days: rule.allowed_stay(),
            processing_time: Some(ProcessingTime {
                min: rule.processing_time_min,
                max: rule.processing_time_max,
            }),
            fees: FeeSummary {
                visa_cost: rule.visa_cost,
                currency: rule.currency.clone(),
                additional_fees: rule.additional_fees.clone(),
            },
            passport_validity_days: rule.passport_validity_days,
            blank_pages_required: rule.blank_pages_required,
            application_method: rule.application_method,
            application_url: rule.application_url.clone(),
            pre_arrival,
            yellow_fever: rule.yellow_fever,
            yellow_fever_conditions: rule.yellow_fever_conditions,
            exemption: None,
            conditional_access,
            warnings,
            restrictions: rule.restrictions.clone(),
            notes: rule.notes.clone(),
            rule_id: Some(rule.id.clone()),
            requires_confirmation: false,
            is_default_rule,
        })
    }

    fn require_country(&self, code: &CountryCode) -> Result<&Country, ResolveError> {
        self.catalog
            .get(code)
            .ok_or_else(|| ResolveError::UnknownCountry(code.clone()))
    }
}

fn check_conditional_access(rule: &VisaRule, traveler: &TravelerContext) -> Option<ConditionalGrant> {
    let conditions = rule.eligibility.conditional_access.as_ref()?;
    if conditions.requires_valid_visa_from.is_empty() {
        return None;
    }

    let matched = conditions
        .requires_valid_visa_from
        .iter()
        .find(|country| traveler.holds_valid_visa_from.contains(country))?;

    Some(ConditionalGrant {
        matched_country: matched.clone(),
        reason: format!(
            "Eligible for visa on arrival with valid {matched} visa/residence permit"
        ),
    })
}

fn exempt_assessment(
    passport: &Country,
    destination: &Country,
    purpose: TravelPurpose,
    exemption: &BlocExemption,
) -> VisaAssessment {
    VisaAssessment {
        visa_type: VisaType::VisaFree,
        visa_type_label: VisaType::VisaFree.label(),
        passport: passport.into(),
        destination: destination.into(),
        purpose,
        allowed_stay_days: Some(exemption.stay_days),
        processing_time: None,
        fees: FeeSummary {
            visa_cost: None,
            currency: destination.currency.clone(),
            additional_fees: Vec::new(),
        },
        passport_validity_days: destination.default_passport_validity_days,
        blank_pages_required: 2,
        application_method: ApplicationMethod::None,
        application_url: None,
        pre_arrival: Vec::new(),
        yellow_fever: YellowFeverPolicy::NotRequired,
        yellow_fever_conditions: YellowFeverConditions::default(),
        exemption: Some(ExemptionGrant {
            bloc: exemption.bloc,
            reason: exemption.reason.to_string(),
        }),
        conditional_access: None,
        warnings: Vec::new(),
        restrictions: Vec::new(),
        notes: None,
        rule_id: None,
        requires_confirmation: false,
        is_default_rule: false,
    }
}

fn unconfirmed_assessment(
    passport: &Country,
    destination: &Country,
    purpose: TravelPurpose,
) -> VisaAssessment {
    VisaAssessment {
        visa_type: VisaType::EmbassyVisa,
        visa_type_label: VisaType::EmbassyVisa.label(),
        passport: passport.into(),
        destination: destination.into(),
        purpose,
        allowed_stay_days: None,
        processing_time: None,
        fees: FeeSummary {
            visa_cost: None,
            currency: destination.currency.clone(),
            additional_fees: Vec::new(),
        },
        passport_validity_days: destination.default_passport_validity_days,
        blank_pages_required: 2,
        application_method: ApplicationMethod::Embassy,
        application_url: None,
        pre_arrival: Vec::new(),
        yellow_fever: YellowFeverPolicy::NotRequired,
        yellow_fever_conditions: YellowFeverConditions::default(),
        exemption: None,
        conditional_access: None,
        warnings: Vec::new(),
        restrictions: Vec::new(),
        notes: Some("No specific visa rule found. Embassy visa likely required.".to_string()),
        rule_id: None,
        requires_confirmation: true,
        is_default_rule: false,
    }
}
