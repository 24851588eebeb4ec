use chrono::NaiveDate;

use super::super::domain::{
    Advisory, AdvisoryKind, Country, Severity, TravelDates, TravelerContext, VisaRule,
    YellowFeverPolicy,
};
use super::pre_arrival::advance_hours_or_default;
use super::SAFETY_BUFFER_DAYS;

/// Rejection-prevention advisories for a resolved rule. Advisories never
/// block the lookup; they ride along with the successful result.
pub(crate) fn generate_warnings(
    rule: &VisaRule,
    passport: &Country,
    dates: &TravelDates,
    traveler: &TravelerContext,
    today: NaiveDate,
) -> Vec<Advisory> {
    let mut warnings = Vec::new();

    if let (Some(expiry), Some(_arrival)) = (traveler.passport_expiry_date, dates.arrival_date) {
        let required_days = i64::from(rule.passport_validity_days);
        if let Some(trip_end) = dates.trip_end() {
            let days_after_trip = (expiry - trip_end).num_days();
            if days_after_trip < required_days {
                warnings.push(Advisory {
                    kind: AdvisoryKind::PassportValidity,
                    severity: Severity::Error,
                    message: format!(
                        "Passport must be valid for at least {required_days} days beyond the \
                         trip end date. Your passport expires {days_after_trip} days after \
                         your trip."
                    ),
                    action: "Renew passport before applying for visa".to_string(),
                    form: None,
                });
            }
        }
    }

    match rule.yellow_fever {
        YellowFeverPolicy::Always => warnings.push(Advisory {
            kind: AdvisoryKind::YellowFever,
            severity: Severity::Error,
            message: "Yellow fever vaccination certificate is mandatory for entry".to_string(),
            action: "Get vaccinated at least 10 days before travel".to_string(),
            form: None,
        }),
        YellowFeverPolicy::Conditional if passport.yellow_fever_endemic => {
            warnings.push(Advisory {
                kind: AdvisoryKind::YellowFever,
                severity: Severity::Error,
                message: "Yellow fever certificate required when traveling from endemic countries"
                    .to_string(),
                action: "Get vaccinated at least 10 days before travel".to_string(),
                form: None,
            });
        }
        _ => {}
    }

    for requirement in rule.pre_arrival.iter().filter(|req| req.mandatory) {
        let advance_hours = advance_hours_or_default(requirement);
        let action = match requirement.portal_url.as_deref() {
            Some(url) => format!("Complete at: {url}"),
            None => "Complete the form before departure".to_string(),
        };
        warnings.push(Advisory {
            kind: AdvisoryKind::PreArrivalForm,
            severity: Severity::Warning,
            message: format!(
                "{} must be completed {advance_hours} hours before arrival",
                requirement.name
            ),
            action,
            form: Some(requirement.kind),
        });
    }

    if let Some(arrival) = dates.arrival_date {
        let processing_max = i64::from(rule.processing_time_max);
        if processing_max > 0 {
            let days_until_trip = (arrival - today).num_days();
            let required_days = processing_max + SAFETY_BUFFER_DAYS;
            if days_until_trip < required_days {
                let severity = if days_until_trip < processing_max {
                    Severity::Error
                } else {
                    Severity::Warning
                };
                warnings.push(Advisory {
                    kind: AdvisoryKind::ProcessingTime,
                    severity,
                    message: format!(
                        "Only {days_until_trip} days until travel. Processing takes {}-{} \
                         business days.",
                        rule.processing_time_min, rule.processing_time_max
                    ),
                    action: "Apply immediately or consider rescheduling travel".to_string(),
                    form: None,
                });
            }
        }
    }

    warnings
}
