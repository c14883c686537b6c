//! Unit normalization: energy to kWh, mass to kg, country names to ISO-2.
//! Multipliers are exact SI factors; imperial factors are the conventional
//! rounded constants used in trade documents.

use serde::{Deserialize, Serialize};

/// Convert an energy value to kWh. Unknown units pass through unchanged
/// (multiplier 1.0) — the raw-extraction trace preserves what was matched.
pub fn to_kwh(value: f64, unit: &str) -> f64 {
    let unit = unit.to_lowercase().replace(' ', "");
    let multiplier = match unit.as_str() {
        "kwh" | "kw/h" | "kw-h" => 1.0,
        "mwh" | "mw/h" | "mw-h" => 1000.0,
        "gwh" | "gw/h" => 1_000_000.0,
        "wh" => 0.001,
        "j" | "joule" => 1.0 / 3_600_000.0,
        "kj" | "kilojoule" => 1.0 / 3_600.0,
        "mj" | "megajoule" => 1.0 / 3.6,
        "gj" | "gigajoule" => 1000.0 / 3.6,
        "btu" => 0.000_293_071,
        "therm" => 29.3071,
        _ => 1.0,
    };
    value * multiplier
}

/// kWh → MWh.
pub fn to_mwh(kwh: f64) -> f64 {
    kwh / 1000.0
}

/// Convert a mass value to kg. Unknown units pass through unchanged.
pub fn to_kg(value: f64, unit: &str) -> f64 {
    let unit = unit.to_lowercase();
    let multiplier = match unit.trim() {
        "kg" | "kgs" | "kilogram" | "kilograms" => 1.0,
        "g" | "gram" | "grams" => 0.001,
        "mg" => 0.000_001,
        "t" | "tonne" | "tonnes" | "ton" | "tons" | "mt" | "metric ton" | "metric tons" => 1000.0,
        "lb" | "lbs" | "pound" | "pounds" => 0.453_592,
        "oz" | "ounce" => 0.028_349_5,
        "cwt" => 50.8023, // hundredweight
        _ => 1.0,
    };
    value * multiplier
}

/// kg → tonnes.
pub fn to_tonnes(kg: f64) -> f64 {
    kg / 1000.0
}

/// Outcome of country normalization. An unrecognized name is surfaced as
/// `Unresolved` with the raw text instead of a fabricated 2-letter code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "value")]
pub enum CountryResolution {
    Resolved(String),
    Unresolved(String),
}

impl CountryResolution {
    pub fn code(&self) -> Option<&str> {
        match self {
            CountryResolution::Resolved(code) => Some(code),
            CountryResolution::Unresolved(_) => None,
        }
    }
}

/// Country name/alias → ISO-2, first match wins.
static COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("india", "IN"), ("indian", "IN"), ("bharat", "IN"),
    ("china", "CN"), ("chinese", "CN"), ("prc", "CN"),
    ("germany", "DE"), ("german", "DE"), ("deutschland", "DE"),
    ("usa", "US"), ("united states", "US"), ("america", "US"), ("american", "US"),
    ("uk", "GB"), ("united kingdom", "GB"), ("britain", "GB"), ("british", "GB"),
    ("france", "FR"), ("french", "FR"),
    ("italy", "IT"), ("italian", "IT"),
    ("spain", "ES"), ("spanish", "ES"),
    ("japan", "JP"), ("japanese", "JP"),
    ("korea", "KR"), ("south korea", "KR"), ("korean", "KR"),
    ("brazil", "BR"), ("brazilian", "BR"),
    ("russia", "RU"), ("russian", "RU"),
    ("turkey", "TR"), ("turkish", "TR"), ("turkiye", "TR"),
    ("vietnam", "VN"), ("vietnamese", "VN"),
    ("indonesia", "ID"), ("indonesian", "ID"),
    ("malaysia", "MY"), ("malaysian", "MY"),
    ("thailand", "TH"), ("thai", "TH"),
    ("uae", "AE"), ("emirates", "AE"), ("dubai", "AE"),
    ("saudi", "SA"), ("saudi arabia", "SA"),
];

/// Normalize free-text country input to an ISO-2 code.
///
/// A 2-letter alphabetic input is upper-cased and trusted as-is. Longer
/// input goes through the alias table (substring match in either
/// direction). Anything unrecognized comes back `Unresolved`.
pub fn normalize_country(text: &str) -> CountryResolution {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return CountryResolution::Unresolved(String::new());
    }

    let lower = trimmed.to_lowercase();
    if lower.len() == 2 && lower.bytes().all(|b| b.is_ascii_alphabetic()) {
        return CountryResolution::Resolved(lower.to_uppercase());
    }

    for (name, code) in COUNTRY_ALIASES {
        if lower.contains(name) || name.contains(&lower) {
            return CountryResolution::Resolved((*code).to_string());
        }
    }

    CountryResolution::Unresolved(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mwh_to_kwh() {
        assert!((to_kwh(125.0, "MWh") - 125_000.0).abs() < 1e-9);
        assert!((to_mwh(125_000.0) - 125.0).abs() < 1e-9);
    }

    #[test]
    fn joule_family_exact_si() {
        assert!((to_kwh(3_600_000.0, "J") - 1.0).abs() < 1e-9);
        assert!((to_kwh(3.6, "GJ") - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_energy_unit_passes_through() {
        assert!((to_kwh(42.0, "parsec") - 42.0).abs() < 1e-9);
    }

    #[test]
    fn tonne_round_trip_within_tolerance() {
        let kg = to_kg(1.0, "t");
        assert!((kg - 1000.0).abs() < 1e-9);
        assert!((to_tonnes(kg) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn imperial_mass_units() {
        assert!((to_kg(1.0, "lb") - 0.453_592).abs() < 1e-9);
        assert!((to_kg(1.0, "cwt") - 50.8023).abs() < 1e-9);
    }

    #[test]
    fn iso_code_passes_through_uppercased() {
        assert_eq!(normalize_country("in"), CountryResolution::Resolved("IN".into()));
        assert_eq!(normalize_country(" DE "), CountryResolution::Resolved("DE".into()));
    }

    #[test]
    fn alias_lookup() {
        assert_eq!(normalize_country("India"), CountryResolution::Resolved("IN".into()));
        assert_eq!(
            normalize_country("Made in Deutschland"),
            CountryResolution::Resolved("DE".into())
        );
        assert_eq!(
            normalize_country("United Kingdom"),
            CountryResolution::Resolved("GB".into())
        );
    }

    #[test]
    fn unrecognized_country_is_unresolved_not_truncated() {
        let result = normalize_country("Atlantis");
        assert_eq!(result, CountryResolution::Unresolved("Atlantis".into()));
        assert_eq!(result.code(), None);
    }

    #[test]
    fn empty_country_is_unresolved() {
        assert_eq!(normalize_country("  "), CountryResolution::Unresolved(String::new()));
    }
}
