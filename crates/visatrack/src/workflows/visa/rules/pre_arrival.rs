use std::collections::BTreeMap;

use super::super::domain::{
    CountryCode, PreArrivalKind, PreArrivalRequirement, DEFAULT_PRE_ARRIVAL_ADVANCE_HOURS,
};

/// Country-specific pre-arrival forms known to the engine regardless of
/// what a rule declares. Merged into every rule-backed result.
#[derive(Debug, Clone)]
pub struct KnownPreArrivalTable {
    entries: BTreeMap<CountryCode, PreArrivalRequirement>,
}

impl KnownPreArrivalTable {
    pub fn new(entries: impl IntoIterator<Item = (CountryCode, PreArrivalRequirement)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn standard() -> Self {
        let known = [
            ("TH", PreArrivalKind::Tdac, "Thailand Digital Arrival Card", "https://tdac.immigration.go.th", 72),
            ("DO", PreArrivalKind::ETicket, "Dominican Republic e-Ticket", "https://eticket.migracion.gob.do", 72),
            ("KE", PreArrivalKind::Eta, "Kenya Electronic Travel Authorization", "https://www.etakenya.go.ke", 72),
            ("SC", PreArrivalKind::TravelAuth, "Seychelles Travel Authorization", "https://seychelles.govtas.com", 72),
            ("NG", PreArrivalKind::DigitalLandingCard, "Nigeria Digital Landing Card", "https://immigration.gov.ng", 24),
        ];

        Self::new(known.into_iter().map(|(code, kind, name, url, hours)| {
            (
                CountryCode::new(code),
                PreArrivalRequirement {
                    kind,
                    name: name.to_string(),
                    portal_url: Some(url.to_string()),
                    advance_hours: hours,
                    mandatory: true,
                    cost: None,
                    currency: None,
                },
            )
        }))
    }

    /// Combine a rule's declared requirements with the known table entry
    /// for the destination, deduplicated by requirement kind.
    pub fn merge(
        &self,
        destination: &CountryCode,
        declared: &[PreArrivalRequirement],
    ) -> Vec<PreArrivalRequirement> {
        let mut merged = declared.to_vec();

        if let Some(known) = self.entries.get(destination) {
            let already_declared = merged.iter().any(|req| req.kind == known.kind);
            if !already_declared {
                merged.push(known.clone());
            }
        }

        merged
    }
}

pub fn advance_hours_or_default(requirement: &PreArrivalRequirement) -> u32 {
    if requirement.advance_hours == 0 {
        DEFAULT_PRE_ARRIVAL_ADVANCE_HOURS
    } else {
        requirement.advance_hours
    }
}
