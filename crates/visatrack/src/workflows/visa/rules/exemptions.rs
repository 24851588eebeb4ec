use super::super::domain::{Country, CountryCode, RegionalBloc};

/// One regional-bloc exemption: nationals of `bloc` member states enter
/// the listed destinations visa-free, minus any excluded passports.
#[derive(Debug, Clone)]
pub struct BlocExemption {
    pub destinations: &'static [&'static str],
    pub bloc: RegionalBloc,
    pub excluded_passports: &'static [&'static str],
    pub stay_days: u32,
    pub reason: &'static str,
}

/// Ordered exemption table; the first matching entry wins and preempts
/// any specific rule lookup.
#[derive(Debug, Clone)]
pub struct ExemptionTable {
    entries: Vec<BlocExemption>,
}

impl ExemptionTable {
    pub fn new(entries: Vec<BlocExemption>) -> Self {
        Self { entries }
    }

    pub fn standard() -> Self {
        Self::new(vec![
            BlocExemption {
                destinations: &["GH", "NG"],
                bloc: RegionalBloc::Ecowas,
                excluded_passports: &[],
                stay_days: 90,
                reason: "ECOWAS member nationals enjoy visa-free travel within the community",
            },
            BlocExemption {
                destinations: &["KE", "UG", "TZ", "RW"],
                bloc: RegionalBloc::Eac,
                excluded_passports: &[],
                stay_days: 90,
                reason: "East African Community member nationals enjoy visa-free travel",
            },
            BlocExemption {
                destinations: &["RW"],
                bloc: RegionalBloc::Au,
                excluded_passports: &[],
                stay_days: 30,
                reason: "Rwanda grants visa-free entry to all African Union member nationals",
            },
            BlocExemption {
                destinations: &["AE"],
                bloc: RegionalBloc::Gcc,
                excluded_passports: &[],
                stay_days: 90,
                reason: "GCC nationals can enter UAE with national ID only",
            },
            BlocExemption {
                destinations: &["KE"],
                bloc: RegionalBloc::Au,
                excluded_passports: &["LY", "SO"],
                stay_days: 90,
                reason: "Kenya grants visa-free entry to most African nationals",
            },
        ])
    }

    pub fn matching(&self, passport: &Country, destination: &Country) -> Option<&BlocExemption> {
        self.entries.iter().find(|entry| {
            entry.covers_destination(&destination.iso_code)
                && passport.is_in_bloc(entry.bloc)
                && !entry.excludes_passport(&passport.iso_code)
        })
    }
}

impl BlocExemption {
    fn covers_destination(&self, code: &CountryCode) -> bool {
        self.destinations.iter().any(|dest| *dest == code.0)
    }

    fn excludes_passport(&self, code: &CountryCode) -> bool {
        self.excluded_passports.iter().any(|excluded| *excluded == code.0)
    }
}
