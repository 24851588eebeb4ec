use std::collections::BTreeMap;
use std::io::Read;

use serde::Deserialize;

use super::domain::{Continent, Country, CountryCode, RegionalBloc};

/// Read-only country directory keyed by ISO alpha-2 code. Built once at
/// startup from the standard seed or a CSV export and shared by reference.
#[derive(Debug, Clone)]
pub struct CountryCatalog {
    countries: BTreeMap<CountryCode, Country>,
}

impl CountryCatalog {
    pub fn new(countries: impl IntoIterator<Item = Country>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for country in countries {
            let code = country.iso_code.clone();
            if map.insert(code.clone(), country).is_some() {
                return Err(CatalogError::DuplicateCountry(code));
            }
        }
        Ok(Self { countries: map })
    }

    pub fn get(&self, code: &CountryCode) -> Option<&Country> {
        self.countries.get(code)
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Country> {
        self.countries.values()
    }

    /// Parse a country catalog from CSV. Columns: name, iso_code, iso_code3,
    /// continent, regional_blocs (semicolon separated), passport_validity_days,
    /// has_evisa, has_eta, has_voa, yellow_fever_endemic, currency.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut countries = Vec::new();
        for record in csv_reader.deserialize::<CountryRow>() {
            countries.push(record?.into_country()?);
        }

        Self::new(countries)
    }

    /// Built-in seed: the target countries the rules engine ships data for.
    pub fn standard() -> Self {
        Self::new(standard_countries()).expect("standard catalog has unique codes")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("duplicate country code: {0}")]
    DuplicateCountry(CountryCode),
    #[error("unknown regional bloc '{0}'")]
    UnknownBloc(String),
    #[error("unknown continent '{0}'")]
    UnknownContinent(String),
}

#[derive(Debug, Deserialize)]
struct CountryRow {
    name: String,
    iso_code: String,
    #[serde(default)]
    iso_code3: Option<String>,
    #[serde(default)]
    continent: Option<String>,
    #[serde(default)]
    regional_blocs: String,
    #[serde(default = "default_validity_days")]
    passport_validity_days: u32,
    #[serde(default)]
    has_evisa: bool,
    #[serde(default)]
    has_eta: bool,
    #[serde(default)]
    has_voa: bool,
    #[serde(default)]
    yellow_fever_endemic: bool,
    #[serde(default = "default_currency")]
    currency: String,
}

fn default_validity_days() -> u32 {
    180
}

fn default_currency() -> String {
    "USD".to_string()
}

impl CountryRow {
    fn into_country(self) -> Result<Country, CatalogError> {
        let regional_blocs = self
            .regional_blocs
            .split(';')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(parse_bloc)
            .collect::<Result<Vec<_>, _>>()?;

        let continent = self
            .continent
            .as_deref()
            .filter(|value| !value.is_empty())
            .map(parse_continent)
            .transpose()?;

        Ok(Country {
            name: self.name,
            iso_code: CountryCode::new(&self.iso_code),
            iso_code3: self.iso_code3.filter(|value| !value.is_empty()),
            continent,
            regional_blocs,
            default_passport_validity_days: self.passport_validity_days,
            has_evisa_system: self.has_evisa,
            has_eta_system: self.has_eta,
            has_voa: self.has_voa,
            yellow_fever_endemic: self.yellow_fever_endemic,
            currency: self.currency,
            evisa_portal_url: None,
            immigration_portal_url: None,
        })
    }
}

fn parse_bloc(value: &str) -> Result<RegionalBloc, CatalogError> {
    match value.to_ascii_uppercase().as_str() {
        "ECOWAS" => Ok(RegionalBloc::Ecowas),
        "EAC" => Ok(RegionalBloc::Eac),
        "GCC" => Ok(RegionalBloc::Gcc),
        "AU" => Ok(RegionalBloc::Au),
        "EU" => Ok(RegionalBloc::Eu),
        "SCHENGEN" => Ok(RegionalBloc::Schengen),
        "SADC" => Ok(RegionalBloc::Sadc),
        "COMESA" => Ok(RegionalBloc::Comesa),
        other => Err(CatalogError::UnknownBloc(other.to_string())),
    }
}

fn parse_continent(value: &str) -> Result<Continent, CatalogError> {
    match value.to_ascii_uppercase().as_str() {
        "AFRICA" => Ok(Continent::Africa),
        "ASIA" => Ok(Continent::Asia),
        "EUROPE" => Ok(Continent::Europe),
        "NORTH_AMERICA" => Ok(Continent::NorthAmerica),
        "SOUTH_AMERICA" => Ok(Continent::SouthAmerica),
        "OCEANIA" => Ok(Continent::Oceania),
        "ANTARCTICA" => Ok(Continent::Antarctica),
        other => Err(CatalogError::UnknownContinent(other.to_string())),
    }
}

struct CountrySpec {
    name: &'static str,
    iso_code: &'static str,
    iso_code3: &'static str,
    continent: Continent,
    blocs: &'static [RegionalBloc],
    validity_days: u32,
    has_evisa: bool,
    has_eta: bool,
    has_voa: bool,
    yellow_fever_endemic: bool,
    currency: &'static str,
}

impl CountrySpec {
    fn build(&self) -> Country {
        Country {
            name: self.name.to_string(),
            iso_code: CountryCode::new(self.iso_code),
            iso_code3: Some(self.iso_code3.to_string()),
            continent: Some(self.continent),
            regional_blocs: self.blocs.to_vec(),
            default_passport_validity_days: self.validity_days,
            has_evisa_system: self.has_evisa,
            has_eta_system: self.has_eta,
            has_voa: self.has_voa,
            yellow_fever_endemic: self.yellow_fever_endemic,
            currency: self.currency.to_string(),
            evisa_portal_url: None,
            immigration_portal_url: None,
        }
    }
}

fn standard_countries() -> Vec<Country> {
    use Continent::*;
    use RegionalBloc::*;

    const SPECS: &[CountrySpec] = &[
        CountrySpec {
            name: "South Africa",
            iso_code: "ZA",
            iso_code3: "ZAF",
            continent: Africa,
            blocs: &[Au, Sadc],
            validity_days: 30,
            has_evisa: true,
            has_eta: true,
            has_voa: false,
            yellow_fever_endemic: false,
            currency: "ZAR",
        },
        CountrySpec {
            name: "Ghana",
            iso_code: "GH",
            iso_code3: "GHA",
            continent: Africa,
            blocs: &[Au, Ecowas],
            validity_days: 180,
            has_evisa: true,
            has_eta: false,
            has_voa: false,
            yellow_fever_endemic: true,
            currency: "GHS",
        },
        CountrySpec {
            name: "Tanzania",
            iso_code: "TZ",
            iso_code3: "TZA",
            continent: Africa,
            blocs: &[Au, Eac, Sadc],
            validity_days: 180,
            has_evisa: true,
            has_eta: false,
            has_voa: false,
            yellow_fever_endemic: false,
            currency: "USD",
        },
        CountrySpec {
            name: "Rwanda",
            iso_code: "RW",
            iso_code3: "RWA",
            continent: Africa,
            blocs: &[Au, Eac, Comesa],
            validity_days: 180,
            has_evisa: true,
            has_eta: false,
            has_voa: true,
            yellow_fever_endemic: false,
            currency: "RWF",
        },
        CountrySpec {
            name: "Kenya",
            iso_code: "KE",
            iso_code3: "KEN",
            continent: Africa,
            blocs: &[Au, Eac, Comesa],
            validity_days: 180,
            has_evisa: false,
            has_eta: true,
            has_voa: false,
            yellow_fever_endemic: false,
            currency: "USD",
        },
        CountrySpec {
            name: "Uganda",
            iso_code: "UG",
            iso_code3: "UGA",
            continent: Africa,
            blocs: &[Au, Eac, Comesa],
            validity_days: 180,
            has_evisa: true,
            has_eta: false,
            has_voa: false,
            yellow_fever_endemic: true,
            currency: "USD",
        },
        CountrySpec {
            name: "Nigeria",
            iso_code: "NG",
            iso_code3: "NGA",
            continent: Africa,
            blocs: &[Au, Ecowas],
            validity_days: 180,
            has_evisa: true,
            has_eta: false,
            has_voa: false,
            yellow_fever_endemic: true,
            currency: "USD",
        },
        CountrySpec {
            name: "Egypt",
            iso_code: "EG",
            iso_code3: "EGY",
            continent: Africa,
            blocs: &[Au, Comesa],
            validity_days: 180,
            has_evisa: true,
            has_eta: false,
            has_voa: true,
            yellow_fever_endemic: false,
            currency: "USD",
        },
        CountrySpec {
            name: "Madagascar",
            iso_code: "MG",
            iso_code3: "MDG",
            continent: Africa,
            blocs: &[Au, Comesa, Sadc],
            validity_days: 180,
            has_evisa: true,
            has_eta: false,
            has_voa: true,
            yellow_fever_endemic: false,
            currency: "EUR",
        },
        CountrySpec {
            name: "Seychelles",
            iso_code: "SC",
            iso_code3: "SYC",
            continent: Africa,
            blocs: &[Au, Comesa, Sadc],
            validity_days: 0,
            has_evisa: false,
            has_eta: false,
            has_voa: true,
            yellow_fever_endemic: false,
            currency: "EUR",
        },
        CountrySpec {
            name: "United Arab Emirates",
            iso_code: "AE",
            iso_code3: "ARE",
            continent: Asia,
            blocs: &[Gcc],
            validity_days: 180,
            has_evisa: true,
            has_eta: false,
            has_voa: true,
            yellow_fever_endemic: false,
            currency: "AED",
        },
        CountrySpec {
            name: "Thailand",
            iso_code: "TH",
            iso_code3: "THA",
            continent: Asia,
            blocs: &[],
            validity_days: 180,
            has_evisa: true,
            has_eta: false,
            has_voa: true,
            yellow_fever_endemic: false,
            currency: "THB",
        },
        CountrySpec {
            name: "India",
            iso_code: "IN",
            iso_code3: "IND",
            continent: Asia,
            blocs: &[],
            validity_days: 180,
            has_evisa: true,
            has_eta: false,
            has_voa: false,
            yellow_fever_endemic: false,
            currency: "USD",
        },
        CountrySpec {
            name: "Australia",
            iso_code: "AU",
            iso_code3: "AUS",
            continent: Oceania,
            blocs: &[],
            validity_days: 180,
            has_evisa: true,
            has_eta: true,
            has_voa: false,
            yellow_fever_endemic: false,
            currency: "AUD",
        },
        CountrySpec {
            name: "Dominican Republic",
            iso_code: "DO",
            iso_code3: "DOM",
            continent: NorthAmerica,
            blocs: &[],
            validity_days: 0,
            has_evisa: false,
            has_eta: false,
            has_voa: false,
            yellow_fever_endemic: false,
            currency: "USD",
        },
        CountrySpec {
            name: "United Kingdom",
            iso_code: "GB",
            iso_code3: "GBR",
            continent: Europe,
            blocs: &[],
            validity_days: 180,
            has_evisa: false,
            has_eta: true,
            has_voa: false,
            yellow_fever_endemic: false,
            currency: "GBP",
        },
        CountrySpec {
            name: "United States",
            iso_code: "US",
            iso_code3: "USA",
            continent: NorthAmerica,
            blocs: &[],
            validity_days: 180,
            has_evisa: false,
            has_eta: true,
            has_voa: false,
            yellow_fever_endemic: false,
            currency: "USD",
        },
    ];

    let mut countries: Vec<Country> = SPECS.iter().map(CountrySpec::build).collect();
    countries.extend(partner_countries());
    countries
}

fn minimal(name: &str, iso_code: &str, blocs: &[RegionalBloc]) -> Country {
    Country {
        name: name.to_string(),
        iso_code: CountryCode::new(iso_code),
        iso_code3: None,
        continent: None,
        regional_blocs: blocs.to_vec(),
        default_passport_validity_days: 180,
        has_evisa_system: false,
        has_eta_system: false,
        has_voa: false,
        yellow_fever_endemic: false,
        currency: "USD".to_string(),
        evisa_portal_url: None,
        immigration_portal_url: None,
    }
}

/// Minimal entries for bloc members and common passport countries the
/// exemption table and seeded rules reference but that are not visa
/// destinations themselves.
fn partner_countries() -> Vec<Country> {
    use RegionalBloc::*;

    let ecowas = [
        ("Benin", "BJ"),
        ("Burkina Faso", "BF"),
        ("Cape Verde", "CV"),
        ("Ivory Coast", "CI"),
        ("Gambia", "GM"),
        ("Guinea", "GN"),
        ("Guinea-Bissau", "GW"),
        ("Liberia", "LR"),
        ("Mali", "ML"),
        ("Niger", "NE"),
        ("Senegal", "SN"),
        ("Sierra Leone", "SL"),
        ("Togo", "TG"),
    ];
    let gcc = [
        ("Saudi Arabia", "SA"),
        ("Qatar", "QA"),
        ("Kuwait", "KW"),
        ("Bahrain", "BH"),
        ("Oman", "OM"),
    ];
    let plain = [
        ("Canada", "CA"),
        ("Germany", "DE"),
        ("France", "FR"),
        ("Italy", "IT"),
        ("Spain", "ES"),
        ("China", "CN"),
        ("Libya", "LY"),
        ("Somalia", "SO"),
    ];

    let mut countries = Vec::new();
    countries.extend(
        ecowas
            .into_iter()
            .map(|(name, code)| minimal(name, code, &[Au, Ecowas])),
    );
    countries.extend(gcc.into_iter().map(|(name, code)| minimal(name, code, &[Gcc])));
    countries.extend(plain.into_iter().map(|(name, code)| {
        let blocs: &[RegionalBloc] = match code {
            "LY" | "SO" => &[Au],
            "DE" | "FR" | "IT" | "ES" => &[Eu, Schengen],
            _ => &[],
        };
        minimal(name, code, blocs)
    }));
    countries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_resolves_by_code() {
        let catalog = CountryCatalog::standard();

        let ghana = catalog.get(&CountryCode::new("GH")).expect("Ghana seeded");
        assert!(ghana.is_in_bloc(RegionalBloc::Ecowas));
        assert!(ghana.yellow_fever_endemic);

        let za = catalog.get(&CountryCode::new("ZA")).expect("South Africa seeded");
        assert_eq!(za.default_passport_validity_days, 30);
    }

    #[test]
    fn csv_ingest_parses_blocs_and_flags() {
        let data = "\
name,iso_code,iso_code3,continent,regional_blocs,passport_validity_days,has_evisa,has_eta,has_voa,yellow_fever_endemic,currency
Ghana,gh,GHA,AFRICA,AU;ECOWAS,180,true,false,false,true,GHS
Thailand,TH,THA,ASIA,,180,true,false,true,false,THB
";
        let catalog = CountryCatalog::from_csv_reader(data.as_bytes()).expect("csv parses");

        assert_eq!(catalog.len(), 2);
        let ghana = catalog.get(&CountryCode::new("GH")).expect("normalized code");
        assert_eq!(ghana.regional_blocs, vec![RegionalBloc::Au, RegionalBloc::Ecowas]);
        let thailand = catalog.get(&CountryCode::new("TH")).expect("Thailand row");
        assert!(thailand.regional_blocs.is_empty());
        assert!(thailand.has_voa);
    }

    #[test]
    fn csv_ingest_rejects_unknown_bloc() {
        let data = "\
name,iso_code,iso_code3,continent,regional_blocs,passport_validity_days,has_evisa,has_eta,has_voa,yellow_fever_endemic,currency
Atlantis,AT,ATL,EUROPE,PACT,180,false,false,false,false,USD
";
        let error = CountryCatalog::from_csv_reader(data.as_bytes()).expect_err("must fail");
        assert!(matches!(error, CatalogError::UnknownBloc(_)));
    }

    #[test]
    fn duplicate_codes_are_rejected() {
        let catalog = CountryCatalog::standard();
        let duplicated: Vec<_> = catalog.iter().cloned().chain(catalog.iter().cloned()).collect();
        let error = CountryCatalog::new(duplicated).expect_err("duplicates must fail");
        assert!(matches!(error, CatalogError::DuplicateCountry(_)));
    }
}
