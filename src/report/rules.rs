//! Regulatory rule checks applied to a [`CbamReport`] before XML
//! generation. Independent of schema validation: these are business
//! rules (EORI shape, CN-code coverage, emission plausibility), not
//! XML well-formedness.

use serde::{Deserialize, Serialize};

use super::types::CbamReport;

/// CN-code chapter prefixes currently covered by the regulation.
const CBAM_CHAPTER_PREFIXES: &[&str] = &["72", "73", "76", "25", "28", "31"];

/// EU member states plus the major exporter countries seen in filings.
/// Codes outside this list are legal but unusual enough to warn about.
const COMMON_COUNTRIES: &[&str] = &[
    "AT", "BE", "BG", "CY", "CZ", "DE", "DK", "EE", "ES", "FI", "FR", "GR", "HR", "HU",
    "IE", "IT", "LT", "LU", "LV", "MT", "NL", "PL", "PT", "RO", "SE", "SI", "SK",
    "IN", "CN", "TR", "RU", "UA", "BY", "EG", "ZA", "BR", "US", "GB",
];

const MIN_REPORTING_YEAR: i32 = 2023;
const MAX_REPORTING_YEAR: i32 = 2030;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// One finding from the rule checks, tied to the field it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleIssue {
    pub field: String,
    pub message: String,
    pub severity: Severity,
}

impl RuleIssue {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: Severity::Warning,
        }
    }
}

/// Aggregate outcome of the rule checks. `valid` means no errors;
/// warnings never fail a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleReport {
    pub valid: bool,
    pub schema_version: String,
    pub errors: Vec<RuleIssue>,
    pub warnings: Vec<RuleIssue>,
    pub summary: String,
}

/// EORI format: 10-17 characters, 2-letter country prefix, alphanumeric
/// remainder. Returns the reason when invalid.
pub fn check_eori(eori: &str) -> Result<(), String> {
    let eori = eori.trim().to_uppercase();
    if eori.is_empty() {
        return Err("EORI number is required".into());
    }
    // EORI is ASCII by definition; the slices below rely on it.
    if !eori.is_ascii() {
        return Err("EORI must contain only ASCII letters and digits".into());
    }
    if eori.len() < 10 {
        return Err(format!("EORI number too short ({} chars, min 10)", eori.len()));
    }
    if eori.len() > 17 {
        return Err(format!("EORI number too long ({} chars, max 17)", eori.len()));
    }
    let prefix = &eori[..2];
    if !prefix.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(format!(
            "EORI must start with 2-letter country code, got '{prefix}'"
        ));
    }
    if !eori[2..].bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err("EORI must contain only letters and numbers after country code".into());
    }
    Ok(())
}

/// CN code: exactly 8 digits after stripping spaces and periods. A valid
/// code outside the covered chapters yields `Ok(Some(warning))`.
pub fn check_cn_code(cn_code: &str) -> Result<Option<String>, String> {
    if cn_code.is_empty() {
        return Err("CN code is required".into());
    }
    let cleaned = cn_code.replace([' ', '.'], "");
    if cleaned.len() != 8 {
        return Err(format!(
            "CN code must be exactly 8 digits, got {}",
            cleaned.len()
        ));
    }
    if !cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return Err("CN code must contain only digits".into());
    }
    let prefix = &cleaned[..2];
    if !CBAM_CHAPTER_PREFIXES.contains(&prefix) {
        return Ok(Some(format!(
            "CN code prefix {prefix} may not be CBAM-covered"
        )));
    }
    Ok(None)
}

/// ISO country code: 2 letters. A well-formed code outside the common
/// list yields `Ok(Some(warning))`.
pub fn check_country_code(code: &str, field_name: &str) -> Result<Option<String>, String> {
    let code = code.trim().to_uppercase();
    if code.is_empty() {
        return Err(format!("{field_name} code is required"));
    }
    if code.len() != 2 {
        return Err(format!("{field_name} code must be 2 letters, got '{code}'"));
    }
    if !code.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(format!("{field_name} code must contain only letters"));
    }
    if !COMMON_COUNTRIES.contains(&code.as_str()) {
        return Ok(Some(format!("Uncommon {} code '{code}'", field_name.to_lowercase())));
    }
    Ok(None)
}

/// Emission plausibility checks for one goods item.
pub fn check_emissions(
    direct: f64,
    indirect: f64,
    total: f64,
    net_mass_kg: f64,
) -> Vec<RuleIssue> {
    let mut issues = Vec::new();

    if direct < 0.0 {
        issues.push(RuleIssue::error(
            "direct_emissions",
            "Direct emissions cannot be negative",
        ));
    }
    if indirect < 0.0 {
        issues.push(RuleIssue::error(
            "indirect_emissions",
            "Indirect emissions cannot be negative",
        ));
    }
    if total < 0.0 {
        issues.push(RuleIssue::error(
            "total_emissions",
            "Total emissions cannot be negative",
        ));
    }

    let calculated = direct + indirect;
    if (total - calculated).abs() > 0.01 {
        issues.push(RuleIssue::warning(
            "total_emissions",
            format!("Total ({total}) should equal direct + indirect ({calculated})"),
        ));
    }

    if net_mass_kg > 0.0 {
        let specific = total / (net_mass_kg / 1000.0);
        if specific > 20.0 {
            issues.push(RuleIssue::warning(
                "specific_emissions",
                format!("Specific emissions ({specific:.2} tCO2e/t) seem unusually high"),
            ));
        }
        if specific < 0.01 && total > 0.0 {
            issues.push(RuleIssue::warning(
                "specific_emissions",
                format!("Specific emissions ({specific:.4} tCO2e/t) seem unusually low"),
            ));
        }
    }

    issues
}

fn push_country_check(
    code: &str,
    field: &str,
    label: &str,
    errors: &mut Vec<RuleIssue>,
    warnings: &mut Vec<RuleIssue>,
) {
    match check_country_code(code, label) {
        Err(msg) => errors.push(RuleIssue::error(field, msg)),
        Ok(Some(msg)) => warnings.push(RuleIssue::warning(field, msg)),
        Ok(None) => {}
    }
}

/// Net mass in kg for the plausibility checks, from the item's declared
/// quantity and unit. Electricity items (MWh) have no mass.
fn net_mass_kg(quantity: f64, unit: &str) -> f64 {
    match unit.to_lowercase().as_str() {
        "kg" => quantity,
        "t" | "tonne" | "tonnes" => quantity * 1000.0,
        _ => 0.0,
    }
}

/// Run every regulatory rule against the report.
pub fn validate_report(report: &CbamReport) -> RuleReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Declarant
    if let Err(msg) = check_eori(&report.declarant.eori_number) {
        errors.push(RuleIssue::error("declarant_eori", msg));
    }
    if report.declarant.name.trim().is_empty() {
        errors.push(RuleIssue::error(
            "declarant_name",
            "Declarant name is required",
        ));
    }
    push_country_check(
        &report.declarant.address.country,
        "declarant_country",
        "Declarant country",
        &mut errors,
        &mut warnings,
    );

    // Reporting period
    if !(MIN_REPORTING_YEAR..=MAX_REPORTING_YEAR).contains(&report.reporting_period_year) {
        errors.push(RuleIssue::error(
            "reporting_period_year",
            format!(
                "Reporting year must be {MIN_REPORTING_YEAR}-{MAX_REPORTING_YEAR}, got {}",
                report.reporting_period_year
            ),
        ));
    }
    if !(1..=4).contains(&report.reporting_period_quarter) {
        errors.push(RuleIssue::error(
            "reporting_period_quarter",
            format!("Quarter must be 1-4, got {}", report.reporting_period_quarter),
        ));
    }

    if report.goods.is_empty() {
        errors.push(RuleIssue::error(
            "goods",
            "Report must contain at least one goods item",
        ));
    }

    // Goods
    for item in &report.goods {
        match check_cn_code(&item.cn_code) {
            Err(msg) => errors.push(RuleIssue::error("cn_code", msg)),
            Ok(Some(msg)) => warnings.push(RuleIssue::warning("cn_code", msg)),
            Ok(None) => {}
        }

        if item.cn_description.trim().is_empty() {
            errors.push(RuleIssue::error(
                "product_description",
                "Product description is required",
            ));
        }

        if item.quantity <= 0.0 {
            errors.push(RuleIssue::error(
                "quantity",
                "Quantity must be greater than 0",
            ));
        }

        push_country_check(
            &item.country_of_origin,
            "country_of_origin",
            "Origin country",
            &mut errors,
            &mut warnings,
        );

        // Installation
        if item.producer.name.trim().is_empty() {
            errors.push(RuleIssue::error(
                "installation_name",
                "Installation name is required",
            ));
        }
        push_country_check(
            &item.producer.country,
            "installation_country",
            "Installation country",
            &mut errors,
            &mut warnings,
        );
        if let Some(unlocode) = &item.producer.unlocode {
            if unlocode.chars().count() != 5 {
                warnings.push(RuleIssue::warning(
                    "installation_unlocode",
                    format!("UNLOCODE should be 5 characters, got '{unlocode}'"),
                ));
            }
        }
        match (item.producer.latitude, item.producer.longitude) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                    errors.push(RuleIssue::error("coordinates", "Invalid coordinates"));
                }
            }
            _ => warnings.push(RuleIssue::warning(
                "coordinates",
                "Installation coordinates recommended for verification",
            )),
        }

        for issue in check_emissions(
            item.emissions.direct_emissions_tco2,
            item.emissions.indirect_emissions_tco2,
            item.emissions.total_emissions_tco2,
            net_mass_kg(item.quantity, &item.unit),
        ) {
            match issue.severity {
                Severity::Error => errors.push(issue),
                Severity::Warning => warnings.push(issue),
            }
        }
    }

    let valid = errors.is_empty();
    let summary = if valid && warnings.is_empty() {
        "Report is valid and ready for EU submission".to_string()
    } else if valid {
        format!("Report is valid with {} warning(s)", warnings.len())
    } else {
        format!(
            "Report has {} error(s) and {} warning(s)",
            errors.len(),
            warnings.len()
        )
    };

    tracing::debug!(
        valid,
        errors = errors.len(),
        warnings = warnings.len(),
        report_id = %report.report_id,
        "rule validation complete"
    );

    RuleReport {
        valid,
        schema_version: format!("QReport_ver{}", crate::config::SCHEMA_VERSION),
        errors,
        warnings,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::types::sample_report;

    #[test]
    fn sample_report_passes_all_rules() {
        let result = validate_report(&sample_report());
        assert!(result.valid, "unexpected errors: {:?}", result.errors);
    }

    #[test]
    fn short_eori_is_an_error_on_the_declarant_field() {
        let mut report = sample_report();
        report.declarant.eori_number = "DE123".into();
        let result = validate_report(&report);
        assert!(!result.valid);
        assert!(result
            .errors
            .iter()
            .any(|e| e.field == "declarant_eori" && e.message.contains("too short")));
    }

    #[test]
    fn missing_installation_name_is_an_error() {
        let mut report = sample_report();
        report.goods[0].producer.name.clear();
        let result = validate_report(&report);
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.field == "installation_name"));
    }

    #[test]
    fn eori_prefix_must_be_letters() {
        assert!(check_eori("12123456789").is_err());
        assert!(check_eori("DE12345678").is_ok());
        assert!(check_eori("DE1234 5678").is_err());
    }

    #[test]
    fn non_ascii_eori_is_an_error_not_a_panic() {
        let err = check_eori("DÉ123456789").unwrap_err();
        assert!(err.contains("ASCII"));

        let mut report = sample_report();
        report.declarant.eori_number = "DÉ123456789".into();
        let result = validate_report(&report);
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.field == "declarant_eori"));
    }

    #[test]
    fn cn_code_outside_covered_chapters_warns() {
        assert_eq!(check_cn_code("72081000"), Ok(None));
        let warning = check_cn_code("84212100").unwrap();
        assert!(warning.unwrap().contains("84"));
        assert!(check_cn_code("7208").is_err());
        assert!(check_cn_code("7208100A").is_err());
    }

    #[test]
    fn cn_code_tolerates_grouping_punctuation() {
        assert_eq!(check_cn_code("7208 10 00"), Ok(None));
        assert_eq!(check_cn_code("7208.10.00"), Ok(None));
    }

    #[test]
    fn uncommon_country_warns_invalid_errors() {
        assert_eq!(check_country_code("DE", "Country"), Ok(None));
        assert!(check_country_code("ZZ", "Country").unwrap().is_some());
        assert!(check_country_code("DEU", "Country").is_err());
        assert!(check_country_code("1A", "Country").is_err());
    }

    #[test]
    fn mismatched_total_is_a_warning_not_error() {
        let issues = check_emissions(85.5, 12.3, 50.0, 45_000.0);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert!(issues[0].message.contains("should equal"));
    }

    #[test]
    fn negative_emissions_are_errors() {
        let issues = check_emissions(-1.0, -2.0, -3.0, 1000.0);
        assert_eq!(
            issues
                .iter()
                .filter(|i| i.severity == Severity::Error)
                .count(),
            3
        );
    }

    #[test]
    fn implausible_specific_emissions_warn() {
        // 1000 tCO2 over 10 t of product: 100 tCO2/t.
        let high = check_emissions(900.0, 100.0, 1000.0, 10_000.0);
        assert!(high.iter().any(|i| i.message.contains("unusually high")));

        // 0.005 tCO2 over 1000 t of product.
        let low = check_emissions(0.005, 0.0, 0.005, 1_000_000.0);
        assert!(low.iter().any(|i| i.message.contains("unusually low")));
    }

    #[test]
    fn out_of_range_period_is_an_error() {
        let mut report = sample_report();
        report.reporting_period_year = 2019;
        report.reporting_period_quarter = 5;
        let result = validate_report(&report);
        let fields: Vec<_> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"reporting_period_year"));
        assert!(fields.contains(&"reporting_period_quarter"));
    }

    #[test]
    fn short_unlocode_warns() {
        let mut report = sample_report();
        report.goods[0].producer.unlocode = Some("INJS".into());
        let result = validate_report(&report);
        assert!(result.valid);
        assert!(result.warnings.iter().any(|w| {
            w.field == "installation_unlocode" && w.message.contains("5 characters")
        }));
    }

    #[test]
    fn missing_coordinates_warn_out_of_range_errors() {
        let mut report = sample_report();
        report.goods[0].producer.latitude = None;
        let result = validate_report(&report);
        assert!(result.valid);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.field == "coordinates" && w.message.contains("recommended")));

        let mut report = sample_report();
        report.goods[0].producer.latitude = Some(95.0);
        let result = validate_report(&report);
        assert!(!result.valid);
        assert!(result
            .errors
            .iter()
            .any(|e| e.field == "coordinates" && e.message.contains("Invalid")));
    }

    #[test]
    fn empty_goods_list_is_an_error() {
        let mut report = sample_report();
        report.goods.clear();
        report.refresh_totals();
        let result = validate_report(&report);
        assert!(result.errors.iter().any(|e| e.field == "goods"));
    }
}
