//! Built-in visa rule seed covering the standard country catalog.
//! Rule data is supplied externally in production; this set backs the demo
//! service and the test suite.

use super::domain::{
    ApplicationMethod, ConditionalAccess, CountryCode, EligibilityConditions, PreArrivalKind,
    PreArrivalRequirement, RuleId, TravelPurpose, VisaRule, VisaType, YellowFeverConditions,
    YellowFeverPolicy,
};

fn base_rule(id: &str, destination: &str, visa_type: VisaType, method: ApplicationMethod) -> VisaRule {
    VisaRule {
        id: RuleId(id.to_string()),
        passport_country: None,
        destination_country: CountryCode::new(destination),
        travel_purpose: TravelPurpose::Tourism,
        visa_type,
        application_method: method,
        visa_free_days: None,
        allowed_stay_days: None,
        validity_period_days: None,
        processing_time_min: 1,
        processing_time_max: 7,
        visa_cost: None,
        currency: "USD".to_string(),
        additional_fees: Vec::new(),
        passport_validity_days: 180,
        blank_pages_required: 2,
        eligibility: EligibilityConditions::default(),
        pre_arrival: Vec::new(),
        yellow_fever: YellowFeverPolicy::NotRequired,
        yellow_fever_conditions: YellowFeverConditions::default(),
        application_url: None,
        restrictions: Vec::new(),
        notes: None,
        version: 1,
        is_active: true,
    }
}

fn specific(rule: VisaRule, passport: &str) -> VisaRule {
    VisaRule {
        id: RuleId(format!("{}-{}", rule.id, passport.to_ascii_lowercase())),
        passport_country: Some(CountryCode::new(passport)),
        ..rule
    }
}

fn visa_free_for(destination: &str, passport: &str, stay_days: u32) -> VisaRule {
    let mut rule = base_rule(
        &format!("rule-{}", destination.to_ascii_lowercase()),
        destination,
        VisaType::VisaFree,
        ApplicationMethod::None,
    );
    rule.visa_free_days = Some(stay_days);
    rule.processing_time_min = 0;
    rule.processing_time_max = 0;
    specific(rule, passport)
}

/// Seeded rules for the standard catalog: destination-wide defaults plus
/// the specific pairings that deviate from them.
pub fn standard_rules() -> Vec<VisaRule> {
    let mut rules = Vec::new();

    // South Africa: embassy visa through VFS by default, visa-free for
    // several Western passports, only 30 days passport validity required.
    let mut za = base_rule("rule-za-default", "ZA", VisaType::EmbassyVisa, ApplicationMethod::VfsGlobal);
    za.processing_time_min = 5;
    za.processing_time_max = 15;
    za.visa_cost = Some(50);
    za.passport_validity_days = 30;
    za.yellow_fever = YellowFeverPolicy::Conditional;
    za.yellow_fever_conditions = YellowFeverConditions {
        if_from_endemic_country: true,
        ..YellowFeverConditions::default()
    };
    za.notes = Some("South Africa requires only 30 days passport validity beyond departure".to_string());
    rules.push(za);
    for passport in ["US", "GB", "CA", "DE", "FR"] {
        rules.push(visa_free_for("ZA", passport, 90));
    }

    // Kenya: ETA mandatory for all non-EAC nationals.
    let mut ke = base_rule("rule-ke-default", "KE", VisaType::Eta, ApplicationMethod::Online);
    ke.application_url = Some("https://www.etakenya.go.ke".to_string());
    ke.processing_time_min = 1;
    ke.processing_time_max = 3;
    ke.visa_cost = Some(30);
    ke.allowed_stay_days = Some(90);
    ke.notes = Some("Kenya eliminated visa on arrival. ETA mandatory for all non-EAC nationals.".to_string());
    rules.push(ke);

    // Nigeria: eVisa for all non-ECOWAS nationals.
    let mut ng = base_rule("rule-ng-default", "NG", VisaType::EVisa, ApplicationMethod::Online);
    ng.application_url = Some("https://immigration.gov.ng".to_string());
    ng.processing_time_min = 2;
    ng.processing_time_max = 5;
    ng.visa_cost = Some(50);
    ng.allowed_stay_days = Some(90);
    ng.pre_arrival = vec![PreArrivalRequirement {
        kind: PreArrivalKind::DigitalLandingCard,
        name: "Nigeria Digital Landing Card".to_string(),
        portal_url: Some("https://immigration.gov.ng".to_string()),
        advance_hours: 24,
        mandatory: true,
        cost: None,
        currency: None,
    }];
    rules.push(ng);

    // Ghana: embassy visa, mandatory yellow fever certificate.
    let mut gh = base_rule("rule-gh-default", "GH", VisaType::EmbassyVisa, ApplicationMethod::Embassy);
    gh.processing_time_min = 7;
    gh.processing_time_max = 15;
    gh.visa_cost = Some(60);
    gh.allowed_stay_days = Some(60);
    gh.yellow_fever = YellowFeverPolicy::Always;
    rules.push(gh);

    // Tanzania: eVisa only.
    let mut tz = base_rule("rule-tz-default", "TZ", VisaType::EVisa, ApplicationMethod::Online);
    tz.application_url = Some("https://eservices.immigration.go.tz/visa/".to_string());
    tz.processing_time_min = 4;
    tz.processing_time_max = 10;
    tz.visa_cost = Some(50);
    tz.allowed_stay_days = Some(90);
    rules.push(tz);

    // UAE: eVisa by default, visa-free for several passports, and the
    // conditional visa-on-arrival channel for Indian nationals holding a
    // valid visa from select third countries.
    let mut ae = base_rule("rule-ae-default", "AE", VisaType::EVisa, ApplicationMethod::Online);
    ae.processing_time_min = 2;
    ae.processing_time_max = 7;
    ae.visa_cost = Some(100);
    ae.allowed_stay_days = Some(30);
    ae.currency = "USD".to_string();
    ae.notes = Some("UAE eVisa for most nationalities. Visa on arrival for select countries.".to_string());
    rules.push(ae);
    for passport in ["US", "GB", "CA"] {
        rules.push(visa_free_for("AE", passport, 30));
    }
    let mut ae_in = base_rule("rule-ae", "AE", VisaType::EVisa, ApplicationMethod::Online);
    ae_in.visa_cost = Some(100);
    ae_in.allowed_stay_days = Some(60);
    ae_in.eligibility = EligibilityConditions {
        conditional_access: Some(ConditionalAccess {
            requires_valid_visa_from: ["US", "GB", "DE", "FR", "IT", "ES"]
                .into_iter()
                .map(CountryCode::new)
                .collect(),
            valid_visa_types: vec![
                "TOURIST".to_string(),
                "BUSINESS".to_string(),
                "RESIDENCE".to_string(),
            ],
            min_visa_validity_days: Some(180),
        }),
        ..EligibilityConditions::default()
    };
    ae_in.notes = Some("Indian nationals with a valid US/UK/EU visa are eligible for visa on arrival".to_string());
    rules.push(specific(ae_in, "IN"));

    // Thailand: eVisa with the mandatory digital arrival card; short
    // visa-on-arrival channel for Indian passports.
    let mut th = base_rule("rule-th-default", "TH", VisaType::EVisa, ApplicationMethod::Online);
    th.application_url = Some("https://www.thaievisa.go.th".to_string());
    th.processing_time_min = 2;
    th.processing_time_max = 7;
    th.visa_cost = Some(40);
    th.allowed_stay_days = Some(60);
    th.pre_arrival = vec![PreArrivalRequirement {
        kind: PreArrivalKind::Tdac,
        name: "Thailand Digital Arrival Card".to_string(),
        portal_url: Some("https://tdac.immigration.go.th".to_string()),
        advance_hours: 72,
        mandatory: true,
        cost: None,
        currency: None,
    }];
    rules.push(th);
    let mut th_in = base_rule("rule-th", "TH", VisaType::VisaOnArrival, ApplicationMethod::OnArrival);
    th_in.visa_cost = Some(35);
    th_in.allowed_stay_days = Some(15);
    th_in.processing_time_min = 0;
    th_in.processing_time_max = 0;
    rules.push(specific(th_in, "IN"));

    // India: eVisa.
    let mut india = base_rule("rule-in-default", "IN", VisaType::EVisa, ApplicationMethod::Online);
    india.application_url = Some("https://indianvisaonline.gov.in".to_string());
    india.processing_time_min = 3;
    india.processing_time_max = 10;
    india.visa_cost = Some(25);
    india.allowed_stay_days = Some(30);
    india.pre_arrival = vec![PreArrivalRequirement {
        kind: PreArrivalKind::HealthDeclaration,
        name: "India e-Arrival Card".to_string(),
        portal_url: Some("https://indianvisaonline.gov.in".to_string()),
        advance_hours: 72,
        mandatory: true,
        cost: None,
        currency: None,
    }];
    rules.push(india);

    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_active_rule_per_key() {
        let rules = standard_rules();

        let mut keys = std::collections::BTreeSet::new();
        for rule in rules.iter().filter(|rule| rule.is_active) {
            let key = (
                rule.passport_country.clone(),
                rule.destination_country.clone(),
                rule.travel_purpose,
            );
            assert!(keys.insert(key), "duplicate active rule: {}", rule.id);
        }
    }

    #[test]
    fn seeded_ids_are_unique() {
        let rules = standard_rules();
        let mut ids = std::collections::BTreeSet::new();
        for rule in &rules {
            assert!(ids.insert(rule.id.clone()), "duplicate rule id: {}", rule.id);
        }
    }
}
