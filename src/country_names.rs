//! Canonical country names shared by the case tables and the map geometry.
//!
//! Johns Hopkins, Natural Earth and ISO all spell countries differently
//! ("US", "United States of America", "USA"). Every name that enters a join
//! goes through [`normalize`] first.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Placeholder for names that are empty after cleaning.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

struct CountryEntry {
    name: &'static str,
    iso3: &'static str,
    aliases: &'static [&'static str],
}

const fn c(name: &'static str, iso3: &'static str, aliases: &'static [&'static str]) -> CountryEntry {
    CountryEntry { name, iso3, aliases }
}

static COUNTRIES: &[CountryEntry] = &[
    c("Afghanistan", "AFG", &[]),
    c("Albania", "ALB", &[]),
    c("Algeria", "DZA", &[]),
    c("Andorra", "AND", &[]),
    c("Angola", "AGO", &[]),
    c("Antarctica", "ATA", &[]),
    c("Antigua and Barbuda", "ATG", &["Antigua & Barbuda"]),
    c("Argentina", "ARG", &[]),
    c("Armenia", "ARM", &[]),
    c("Australia", "AUS", &[]),
    c("Austria", "AUT", &[]),
    c("Azerbaijan", "AZE", &[]),
    c("Bahamas", "BHS", &["The Bahamas", "Bahamas, The"]),
    c("Bahrain", "BHR", &[]),
    c("Bangladesh", "BGD", &[]),
    c("Barbados", "BRB", &[]),
    c("Belarus", "BLR", &[]),
    c("Belgium", "BEL", &[]),
    c("Belize", "BLZ", &[]),
    c("Benin", "BEN", &[]),
    c("Bhutan", "BTN", &[]),
    c("Bolivia", "BOL", &["Bolivia (Plurinational State of)", "Plurinational State of Bolivia"]),
    c("Bosnia and Herzegovina", "BIH", &["Bosnia & Herzegovina", "Bosnia-Herzegovina"]),
    c("Botswana", "BWA", &[]),
    c("Brazil", "BRA", &[]),
    c("Brunei", "BRN", &["Brunei Darussalam"]),
    c("Bulgaria", "BGR", &[]),
    c("Burkina Faso", "BFA", &[]),
    c("Burundi", "BDI", &[]),
    c("Cabo Verde", "CPV", &["Cape Verde"]),
    c("Cambodia", "KHM", &[]),
    c("Cameroon", "CMR", &[]),
    c("Canada", "CAN", &[]),
    c("Central African Republic", "CAF", &[]),
    c("Chad", "TCD", &[]),
    c("Chile", "CHL", &[]),
    c("China", "CHN", &["Mainland China", "People's Republic of China"]),
    c("Colombia", "COL", &[]),
    c("Comoros", "COM", &[]),
    c("Congo Republic", "COG", &[
        "Republic of the Congo",
        "Republic of Congo",
        "Congo (Brazzaville)",
        "Congo-Brazzaville",
        "Congo",
    ]),
    c("Costa Rica", "CRI", &[]),
    c("Cote d'Ivoire", "CIV", &["Ivory Coast", "Côte d'Ivoire"]),
    c("Croatia", "HRV", &[]),
    c("Cuba", "CUB", &[]),
    c("Cyprus", "CYP", &[]),
    c("Czechia", "CZE", &["Czech Republic"]),
    c("DR Congo", "COD", &[
        "Democratic Republic of the Congo",
        "Congo (Kinshasa)",
        "Congo-Kinshasa",
        "DRC",
    ]),
    c("Denmark", "DNK", &[]),
    c("Djibouti", "DJI", &[]),
    c("Dominica", "DMA", &[]),
    c("Dominican Republic", "DOM", &[]),
    c("Ecuador", "ECU", &[]),
    c("Egypt", "EGY", &[]),
    c("El Salvador", "SLV", &[]),
    c("Equatorial Guinea", "GNQ", &[]),
    c("Eritrea", "ERI", &[]),
    c("Estonia", "EST", &[]),
    c("Eswatini", "SWZ", &["eSwatini", "Swaziland", "Kingdom of eSwatini"]),
    c("Ethiopia", "ETH", &[]),
    c("Falkland Islands", "FLK", &["Falkland Islands (Malvinas)"]),
    c("Fiji", "FJI", &[]),
    c("Finland", "FIN", &[]),
    c("France", "FRA", &[]),
    c("French Southern Territories", "ATF", &["French Southern and Antarctic Lands"]),
    c("Gabon", "GAB", &[]),
    c("Gambia", "GMB", &["The Gambia", "Gambia, The"]),
    c("Georgia", "GEO", &[]),
    c("Germany", "DEU", &[]),
    c("Ghana", "GHA", &[]),
    c("Greece", "GRC", &[]),
    c("Greenland", "GRL", &[]),
    c("Grenada", "GRD", &[]),
    c("Guatemala", "GTM", &[]),
    c("Guinea", "GIN", &[]),
    c("Guinea-Bissau", "GNB", &[]),
    c("Guyana", "GUY", &[]),
    c("Haiti", "HTI", &[]),
    c("Honduras", "HND", &[]),
    c("Hungary", "HUN", &[]),
    c("Iceland", "ISL", &[]),
    c("India", "IND", &[]),
    c("Indonesia", "IDN", &[]),
    c("Iran", "IRN", &["Iran (Islamic Republic of)", "Islamic Republic of Iran"]),
    c("Iraq", "IRQ", &[]),
    c("Ireland", "IRL", &[]),
    c("Israel", "ISR", &[]),
    c("Italy", "ITA", &[]),
    c("Jamaica", "JAM", &[]),
    c("Japan", "JPN", &[]),
    c("Jordan", "JOR", &[]),
    c("Kazakhstan", "KAZ", &[]),
    c("Kenya", "KEN", &[]),
    c("Kiribati", "KIR", &[]),
    c("Kosovo", "XKX", &["KOS", "Republic of Kosovo"]),
    c("Kuwait", "KWT", &[]),
    c("Kyrgyzstan", "KGZ", &["Kyrgyz Republic"]),
    c("Laos", "LAO", &["Lao People's Democratic Republic", "Lao PDR"]),
    c("Latvia", "LVA", &[]),
    c("Lebanon", "LBN", &[]),
    c("Lesotho", "LSO", &[]),
    c("Liberia", "LBR", &[]),
    c("Libya", "LBY", &[]),
    c("Liechtenstein", "LIE", &[]),
    c("Lithuania", "LTU", &[]),
    c("Luxembourg", "LUX", &[]),
    c("Madagascar", "MDG", &[]),
    c("Malawi", "MWI", &[]),
    c("Malaysia", "MYS", &[]),
    c("Maldives", "MDV", &[]),
    c("Mali", "MLI", &[]),
    c("Malta", "MLT", &[]),
    c("Marshall Islands", "MHL", &[]),
    c("Mauritania", "MRT", &[]),
    c("Mauritius", "MUS", &[]),
    c("Mexico", "MEX", &[]),
    c("Micronesia", "FSM", &["Federated States of Micronesia", "Micronesia, Fed. Sts."]),
    c("Moldova", "MDA", &["Republic of Moldova"]),
    c("Monaco", "MCO", &[]),
    c("Mongolia", "MNG", &[]),
    c("Montenegro", "MNE", &[]),
    c("Morocco", "MAR", &[]),
    c("Mozambique", "MOZ", &[]),
    c("Myanmar", "MMR", &["Burma"]),
    c("Namibia", "NAM", &[]),
    c("Nepal", "NPL", &[]),
    c("Netherlands", "NLD", &["The Netherlands", "Holland"]),
    c("New Caledonia", "NCL", &[]),
    c("New Zealand", "NZL", &[]),
    c("Nicaragua", "NIC", &[]),
    c("Niger", "NER", &[]),
    c("Nigeria", "NGA", &[]),
    c("North Korea", "PRK", &[
        "Korea, North",
        "Democratic People's Republic of Korea",
        "Korea, Dem. People's Rep.",
    ]),
    c("North Macedonia", "MKD", &[
        "Macedonia",
        "Republic of North Macedonia",
        "The former Yugoslav Republic of Macedonia",
    ]),
    c("Northern Cyprus", "CYN", &["Turkish Republic of Northern Cyprus"]),
    c("Norway", "NOR", &[]),
    c("Oman", "OMN", &[]),
    c("Pakistan", "PAK", &[]),
    c("Palau", "PLW", &[]),
    c("Palestine", "PSE", &["West Bank and Gaza", "State of Palestine", "Palestinian Territories"]),
    c("Panama", "PAN", &[]),
    c("Papua New Guinea", "PNG", &[]),
    c("Paraguay", "PRY", &[]),
    c("Peru", "PER", &[]),
    c("Philippines", "PHL", &[]),
    c("Poland", "POL", &[]),
    c("Portugal", "PRT", &[]),
    c("Puerto Rico", "PRI", &[]),
    c("Qatar", "QAT", &[]),
    c("Romania", "ROU", &[]),
    c("Russia", "RUS", &["Russian Federation"]),
    c("Rwanda", "RWA", &[]),
    c("Saint Kitts and Nevis", "KNA", &["St. Kitts and Nevis"]),
    c("Saint Lucia", "LCA", &["St. Lucia"]),
    c("Saint Vincent and the Grenadines", "VCT", &["St. Vincent and the Grenadines"]),
    c("Samoa", "WSM", &[]),
    c("San Marino", "SMR", &[]),
    c("Sao Tome and Principe", "STP", &["São Tomé and Príncipe"]),
    c("Saudi Arabia", "SAU", &[]),
    c("Senegal", "SEN", &[]),
    c("Serbia", "SRB", &["Republic of Serbia"]),
    c("Seychelles", "SYC", &[]),
    c("Sierra Leone", "SLE", &[]),
    c("Singapore", "SGP", &[]),
    c("Slovakia", "SVK", &["Slovak Republic"]),
    c("Slovenia", "SVN", &[]),
    c("Solomon Islands", "SLB", &[]),
    c("Somalia", "SOM", &[]),
    c("Somaliland", "SOL", &[]),
    c("South Africa", "ZAF", &[]),
    c("South Korea", "KOR", &["Korea, South", "Republic of Korea", "Korea, Rep.", "Korea"]),
    c("South Sudan", "SSD", &["SDS"]),
    c("Spain", "ESP", &[]),
    c("Sri Lanka", "LKA", &[]),
    c("Sudan", "SDN", &[]),
    c("Suriname", "SUR", &[]),
    c("Sweden", "SWE", &[]),
    c("Switzerland", "CHE", &[]),
    c("Syria", "SYR", &["Syrian Arab Republic"]),
    c("Taiwan", "TWN", &["Republic of China", "Taiwan, Province of China"]),
    c("Tajikistan", "TJK", &[]),
    c("Tanzania", "TZA", &["United Republic of Tanzania"]),
    c("Thailand", "THA", &[]),
    c("Timor-Leste", "TLS", &["East Timor"]),
    c("Togo", "TGO", &[]),
    c("Tonga", "TON", &[]),
    c("Trinidad and Tobago", "TTO", &[]),
    c("Tunisia", "TUN", &[]),
    c("Turkey", "TUR", &["Türkiye", "Turkiye"]),
    c("Turkmenistan", "TKM", &[]),
    c("Tuvalu", "TUV", &[]),
    c("Uganda", "UGA", &[]),
    c("Ukraine", "UKR", &[]),
    c("United Arab Emirates", "ARE", &["UAE"]),
    c("United Kingdom", "GBR", &[
        "UK",
        "Great Britain",
        "United Kingdom of Great Britain and Northern Ireland",
    ]),
    c("United States", "USA", &["US", "United States of America", "U.S.A."]),
    c("Uruguay", "URY", &[]),
    c("Uzbekistan", "UZB", &[]),
    c("Vanuatu", "VUT", &[]),
    c("Vatican", "VAT", &["Holy See", "Vatican City"]),
    c("Venezuela", "VEN", &["Venezuela (Bolivarian Republic of)"]),
    c("Vietnam", "VNM", &["Viet Nam"]),
    c("Western Sahara", "ESH", &[]),
    c("Yemen", "YEM", &[]),
    c("Zambia", "ZMB", &[]),
    c("Zimbabwe", "ZWE", &[]),
];

fn lookup() -> &'static HashMap<String, &'static str> {
    static LOOKUP: OnceLock<HashMap<String, &'static str>> = OnceLock::new();
    LOOKUP.get_or_init(|| {
        let mut map = HashMap::new();
        for entry in COUNTRIES {
            map.insert(fold(entry.name), entry.name);
            map.insert(fold(entry.iso3), entry.name);
            for alias in entry.aliases {
                map.insert(fold(alias), entry.name);
            }
        }
        map
    })
}

/// Collapses whitespace, unifies apostrophes and drops trailing `*` markers.
fn clean(name: &str) -> String {
    let name = name.replace('\u{2019}', "'");
    name.trim_end_matches(|ch: char| ch == '*' || ch.is_whitespace())
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn fold(name: &str) -> String {
    clean(name).to_lowercase()
}

/// Looks a name up without falling back.
pub fn lookup_canonical(name: &str) -> Option<&'static str> {
    lookup().get(&fold(name)).copied()
}

/// Maps any known spelling or ISO alpha-3 code to the canonical short name.
///
/// Unknown names pass through cleaned; empty names become [`UNKNOWN_COUNTRY`].
pub fn normalize(name: &str) -> String {
    if let Some(canonical) = lookup_canonical(name) {
        return canonical.to_string();
    }
    let cleaned = clean(name);
    if cleaned.is_empty() {
        UNKNOWN_COUNTRY.to_string()
    } else {
        cleaned
    }
}

/// Normalizes a whole column, logging each distinct miss once.
pub fn normalize_all<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut misses = HashSet::new();
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            if lookup_canonical(name).is_none() && misses.insert(name.to_string()) {
                tracing::debug!(name, "no canonical country name, passing through");
            }
            normalize(name)
        })
        .collect()
}

/// ISO alpha-3 code for a canonical name, if known.
pub fn iso3(name: &str) -> Option<&'static str> {
    let canonical = lookup_canonical(name)?;
    COUNTRIES
        .iter()
        .find(|entry| entry.name == canonical)
        .map(|entry| entry.iso3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_source_spellings_agree() {
        assert_eq!(normalize("US"), "United States");
        assert_eq!(normalize("United States of America"), "United States");
        assert_eq!(normalize("USA"), "United States");
        assert_eq!(normalize("Korea, South"), "South Korea");
        assert_eq!(normalize("Taiwan*"), "Taiwan");
        assert_eq!(normalize("Congo (Kinshasa)"), "DR Congo");
        assert_eq!(normalize("Democratic Republic of the Congo"), "DR Congo");
        assert_eq!(normalize("Republic of Serbia"), "Serbia");
        assert_eq!(normalize("United Republic of Tanzania"), "Tanzania");
        assert_eq!(normalize("Burma"), "Myanmar");
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        assert_eq!(normalize("  germany "), "Germany");
        assert_eq!(normalize("CZECH   republic"), "Czechia");
        assert_eq!(normalize("Cote d\u{2019}Ivoire"), "Cote d'Ivoire");
    }

    #[test]
    fn test_unknown_passes_through() {
        assert_eq!(normalize("Diamond Princess"), "Diamond Princess");
        assert_eq!(normalize(" MS   Zaandam* "), "MS Zaandam");
        assert_eq!(normalize("   "), UNKNOWN_COUNTRY);
    }

    #[test]
    fn test_every_canonical_name_is_fixed_point() {
        for entry in COUNTRIES {
            assert_eq!(normalize(entry.name), entry.name);
        }
    }

    #[test]
    fn test_lookup_keys_are_unambiguous() {
        let mut seen: HashMap<String, &str> = HashMap::new();
        for entry in COUNTRIES {
            let keys = std::iter::once(entry.name)
                .chain(std::iter::once(entry.iso3))
                .chain(entry.aliases.iter().copied());
            for key in keys {
                if let Some(previous) = seen.insert(fold(key), entry.name) {
                    assert_eq!(previous, entry.name, "key {key} maps to two countries");
                }
            }
        }
    }

    #[test]
    fn test_normalize_all_preserves_length() {
        let names = vec!["US", "Atlantis", "France", "Atlantis"];
        let normalized = normalize_all(&names);
        assert_eq!(normalized, vec!["United States", "Atlantis", "France", "Atlantis"]);
    }

    #[test]
    fn test_iso3() {
        assert_eq!(iso3("Germany"), Some("DEU"));
        assert_eq!(iso3("US"), Some("USA"));
        assert_eq!(iso3("Atlantis"), None);
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(name in "\\PC{0,24}") {
            let once = normalize(&name);
            prop_assert_eq!(normalize(&once), once);
        }
    }
}
