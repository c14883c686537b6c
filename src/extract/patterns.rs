//! Regex pattern families, in priority order: earlier patterns encode more
//! specific phrasing and win over generic fallbacks. The backend takes the
//! first pattern that produces at least one match, then the first match
//! within it.

use std::sync::LazyLock;

use regex::Regex;

fn build(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?im){p}")).expect("valid pattern"))
        .collect()
}

/// Electricity consumption: value + optional unit (`kwh` assumed when the
/// phrasing omits it, as utility bills commonly do).
pub static ELECTRICITY: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    build(&[
        r"(?:electricity|power|energy)\s*(?:consumed?|consumption|usage)?\s*[:\-]?\s*(?P<value>\d[\d,\.]*)\s*(?P<unit>kwh?|mwh?|gwh?)",
        r"(?P<value>\d[\d,\.]*)\s*(?P<unit>kwh?|mwh?|gwh?)\s*(?:consumed?|consumption|usage)",
        r"total\s*(?:units?|consumption)\s*[:\-]?\s*(?P<value>\d[\d,\.]*)\s*(?P<unit>kwh?|mwh?)",
        r"units?\s*consumed?\s*[:\-]?\s*(?P<value>\d[\d,\.]*)",
    ])
});

/// Weight: optional gross/net/total qualifier + value + unit.
pub static WEIGHT: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    build(&[
        r"(?P<qual>gross|net|total)\s*weight\s*[:\-]?\s*(?P<value>\d[\d,\.]*)\s*(?P<unit>kg|kgs|tonnes?|tons?|mt|lbs?)",
        r"(?:weight|qty|quantity)\s*[:\-]?\s*(?P<value>\d[\d,\.]*)\s*(?P<unit>kg|kgs|tonnes?|tons?|mt)",
        r"(?P<value>\d[\d,\.]*)\s*(?P<unit>kg|kgs|tonnes?|tons?|mt)\s*(?P<qual>gross|net)?",
    ])
});

/// Reporting-period dates: labelled single date, explicit range, or a
/// quarter reference ("Q3 2024") from which the range is derived.
pub static DATE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    build(&[
        r"(?P<d1>\d{1,2})[/\-\.](?P<m1>\d{1,2})[/\-\.](?P<y1>\d{2,4})\s*(?:to|through|[-–])\s*(?P<d2>\d{1,2})[/\-\.](?P<m2>\d{1,2})[/\-\.](?P<y2>\d{2,4})",
        r"(?:period|billing|from|date)\s*[:\-]?\s*(?P<d1>\d{1,2})[/\-\.](?P<m1>\d{1,2})[/\-\.](?P<y1>\d{2,4})",
        r"(?:q(?P<q>[1-4])|quarter\s*(?P<qn>[1-4]))\s*(?P<qy>\d{4})",
    ])
});

/// Producer / company name.
pub static PRODUCER: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    build(&[
        r"(?:manufacturer|producer|supplier|company)\s*[:\-]?\s*(?P<name>[A-Z][A-Za-z &\.]+(?:Ltd|Limited|Inc|Corp|GmbH|SA|PLC)?)",
        r"(?:mill|plant|factory)\s*[:\-]?\s*(?P<name>[A-Z][A-Za-z &\.]+)",
    ])
});

/// Country of origin phrasing.
pub static COUNTRY: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    build(&[
        r"(?:country\s*of\s*origin|origin|made\s*in)\s*[:\-]?\s*(?P<country>[A-Za-z ]+)",
        r"(?:imported\s*from|exported\s*from)\s*[:\-]?\s*(?P<country>[A-Za-z ]+)",
    ])
});

/// Document / reference number.
pub static DOCUMENT_NUMBER: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    build(&[
        r"(?:invoice|bill|certificate|doc)\s*(?:no|number|#)?\s*[:\-]?\s*(?P<num>[A-Z0-9][A-Z0-9\-/]+)",
        r"(?:ref|reference)\s*[:\-]?\s*(?P<num>[A-Z0-9][A-Z0-9\-/]+)",
    ])
});

/// CBAM installation identifier (country prefix + facility code).
pub static INSTALLATION_ID: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    build(&[
        r"(?:installation|facility)\s*(?:id|identifier|code)\s*[:\-]?\s*(?P<id>[A-Z]{2}-?[A-Z0-9\-]+)",
        r"(?:plant|site)\s*(?:code|id)\s*[:\-]?\s*(?P<id>[A-Z]{2}-?[A-Z0-9\-]+)",
    ])
});

/// First pattern (in priority order) that matches anywhere in `text`,
/// together with its first match.
pub fn first_match<'t>(families: &[Regex], text: &'t str) -> Option<regex::Captures<'t>> {
    families.iter().find_map(|re| re.captures(text))
}

/// Parse a number fragment, tolerating thousands separators and spaces.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned = text.replace([',', ' '], "");
    let trimmed = cleaned.trim_end_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn electricity_generic_units_consumed_matches_last_pattern() {
        let caps = first_match(&ELECTRICITY, "Total units consumed: 125,000 kWh").unwrap();
        assert_eq!(&caps["value"], "125,000");
        // Generic fallback pattern has no unit group.
        assert!(caps.name("unit").is_none());
    }

    #[test]
    fn electricity_labelled_kwh() {
        let caps = first_match(&ELECTRICITY, "Electricity consumption: 4,500 kWh").unwrap();
        assert_eq!(&caps["value"], "4,500");
        assert_eq!(&caps["unit"], "kWh");
    }

    #[test]
    fn weight_with_net_qualifier() {
        let caps = first_match(&WEIGHT, "Net Weight: 44,800 kg").unwrap();
        assert_eq!(caps.name("qual").unwrap().as_str().to_lowercase(), "net");
        assert_eq!(&caps["value"], "44,800");
        assert_eq!(&caps["unit"], "kg");
    }

    #[test]
    fn date_range_beats_single_date() {
        let caps = first_match(&DATE, "Period: 01/10/2024 to 31/12/2024").unwrap();
        assert_eq!(&caps["d1"], "01");
        assert_eq!(&caps["d2"], "31");
    }

    #[test]
    fn labelled_single_date() {
        let caps = first_match(&DATE, "Billing date: 5/4/2024").unwrap();
        assert_eq!(&caps["d1"], "5");
        assert_eq!(&caps["m1"], "4");
        assert!(caps.name("d2").is_none());
    }

    #[test]
    fn quarter_reference() {
        let caps = first_match(&DATE, "Reporting for Q3 2024").unwrap();
        assert_eq!(caps.name("q").unwrap().as_str(), "3");
        assert_eq!(&caps["qy"], "2024");
    }

    #[test]
    fn producer_with_suffix() {
        let caps = first_match(&PRODUCER, "Manufacturer: Tata Steel Limited").unwrap();
        assert!(caps["name"].contains("Tata Steel"));
    }

    #[test]
    fn installation_id_pattern() {
        let caps =
            first_match(&INSTALLATION_ID, "Installation ID: IN-TSL-JSR-001").unwrap();
        assert_eq!(&caps["id"], "IN-TSL-JSR-001");
    }

    #[test]
    fn parse_number_strips_separators() {
        assert_eq!(parse_number("125,000"), Some(125000.0));
        assert_eq!(parse_number("44 800.5"), Some(44800.5));
        assert_eq!(parse_number("1,250."), Some(1250.0));
        assert_eq!(parse_number("abc"), None);
    }
}
