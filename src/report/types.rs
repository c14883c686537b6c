use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::taxonomy::CbamCategory;

/// Physical address of the declarant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    /// ISO 2-letter code.
    pub country: String,
    pub building_number: Option<String>,
    pub additional_info: Option<String>,
}

impl Address {
    pub fn new(street: &str, city: &str, postal_code: &str, country: &str) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            postal_code: postal_code.into(),
            country: country.into(),
            building_number: None,
            additional_info: None,
        }
    }
}

/// The EU importer submitting the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declarant {
    pub eori_number: String,
    pub name: String,
    pub address: Address,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub representative_eori: Option<String>,
}

/// The non-EU production installation whose emissions are reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    pub installation_id: String,
    pub name: String,
    /// ISO 2-letter code.
    pub country: String,
    pub address: Option<String>,
    /// UN/LOCODE of the installation site, 5 characters when present.
    pub unlocode: Option<String>,
    /// WGS 84 coordinates of the installation.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_verified: bool,
    pub verification_body: Option<String>,
}

/// How the embedded emissions were determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    /// Measured at the installation.
    #[default]
    Actual,
    /// EU default emission factors.
    DefaultValue,
    Estimate,
    /// Third-party verified.
    Verified,
}

impl CalculationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationMethod::Actual => "actual",
            CalculationMethod::DefaultValue => "default_value",
            CalculationMethod::Estimate => "estimate",
            CalculationMethod::Verified => "verified",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    #[default]
    Quarterly,
    Amendment,
    Correction,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Quarterly => "quarterly",
            ReportType::Amendment => "amendment",
            ReportType::Correction => "correction",
        }
    }
}

/// Embedded-emissions data for one goods item.
///
/// `total_emissions_tco2` is derived; [`EmissionData::new`] sets it and
/// [`CbamReport::refresh_totals`] recomputes it on every node, so a stale
/// caller-supplied value never survives into the XML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionData {
    pub direct_emissions_tco2: f64,
    pub indirect_emissions_tco2: f64,
    pub total_emissions_tco2: f64,

    /// tCO2 per tonne of product.
    pub specific_direct_emissions: f64,
    pub specific_indirect_emissions: f64,

    pub electricity_consumption_mwh: Option<f64>,
    /// tCO2 per MWh.
    pub electricity_emission_factor: Option<f64>,

    pub calculation_method: CalculationMethod,
    pub data_source: Option<String>,
    pub verification_status: Option<String>,
}

impl EmissionData {
    pub fn new(direct_tco2: f64, indirect_tco2: f64) -> Self {
        Self {
            direct_emissions_tco2: direct_tco2,
            indirect_emissions_tco2: indirect_tco2,
            total_emissions_tco2: direct_tco2 + indirect_tco2,
            specific_direct_emissions: 0.0,
            specific_indirect_emissions: 0.0,
            electricity_consumption_mwh: None,
            electricity_emission_factor: None,
            calculation_method: CalculationMethod::default(),
            data_source: None,
            verification_status: None,
        }
    }

    pub fn recompute_total(&mut self) {
        self.total_emissions_tco2 = self.direct_emissions_tco2 + self.indirect_emissions_tco2;
    }
}

/// One goods line in the report. `precursor_goods` models composite goods
/// whose upstream raw materials carry their own embedded emissions; the
/// tree is practically shallow but depth is not bounded by the type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoodsItem {
    pub item_number: u32,
    pub cn_code: String,
    pub cn_description: String,
    pub cbam_category: CbamCategory,
    pub quantity: f64,
    /// "kg", "t", or "MWh".
    pub unit: String,
    pub country_of_origin: String,
    pub producer: Producer,
    pub emissions: EmissionData,

    pub inward_processing: bool,
    /// EUR unless `carbon_price_currency` says otherwise.
    pub carbon_price_paid: Option<f64>,
    pub carbon_price_currency: String,
    pub supplementary_info: Option<String>,

    pub precursor_goods: Vec<GoodsItem>,
}

impl GoodsItem {
    pub fn new(
        item_number: u32,
        cn_code: &str,
        cn_description: &str,
        cbam_category: CbamCategory,
        quantity: f64,
        unit: &str,
        country_of_origin: &str,
        producer: Producer,
        emissions: EmissionData,
    ) -> Self {
        Self {
            item_number,
            cn_code: cn_code.into(),
            cn_description: cn_description.into(),
            cbam_category,
            quantity,
            unit: unit.into(),
            country_of_origin: country_of_origin.into(),
            producer,
            emissions,
            inward_processing: false,
            carbon_price_paid: None,
            carbon_price_currency: "EUR".into(),
            supplementary_info: None,
            precursor_goods: Vec::new(),
        }
    }
}

/// Complete quarterly report. Constructed immediately before
/// serialization; not persisted by this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CbamReport {
    pub report_id: String,
    pub reporting_period_year: i32,
    /// 1-4.
    pub reporting_period_quarter: u32,
    pub declarant: Declarant,
    pub goods: Vec<GoodsItem>,

    pub report_type: ReportType,
    pub submission_date: Option<NaiveDate>,
    pub is_amendment: bool,
    pub original_report_id: Option<String>,
    pub amendment_reason: Option<String>,

    // Derived, maintained by refresh_totals.
    pub total_direct_emissions: f64,
    pub total_indirect_emissions: f64,
    pub total_emissions: f64,
}

impl CbamReport {
    pub fn new(
        report_id: &str,
        year: i32,
        quarter: u32,
        declarant: Declarant,
        goods: Vec<GoodsItem>,
    ) -> Self {
        let mut report = Self {
            report_id: report_id.into(),
            reporting_period_year: year,
            reporting_period_quarter: quarter,
            declarant,
            goods,
            report_type: ReportType::default(),
            submission_date: None,
            is_amendment: false,
            original_report_id: None,
            amendment_reason: None,
            total_direct_emissions: 0.0,
            total_indirect_emissions: 0.0,
            total_emissions: 0.0,
        };
        report.refresh_totals();
        report
    }

    /// Recompute every per-node emission total and the report aggregates.
    ///
    /// Walks the goods tree iteratively with an explicit work stack, so a
    /// deeply nested precursor chain cannot overflow the call stack.
    /// Aggregates sum the top-level goods only; precursor emissions are
    /// already embedded in their parent's figures.
    pub fn refresh_totals(&mut self) {
        let mut direct = 0.0;
        let mut indirect = 0.0;

        for item in &mut self.goods {
            item.emissions.recompute_total();
            direct += item.emissions.direct_emissions_tco2;
            indirect += item.emissions.indirect_emissions_tco2;

            let mut stack: Vec<&mut GoodsItem> = item.precursor_goods.iter_mut().collect();
            while let Some(precursor) = stack.pop() {
                precursor.emissions.recompute_total();
                stack.extend(precursor.precursor_goods.iter_mut());
            }
        }

        self.total_direct_emissions = direct;
        self.total_indirect_emissions = indirect;
        self.total_emissions = direct + indirect;
    }

    /// Count of goods items including nested precursors.
    pub fn goods_count_deep(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&GoodsItem> = self.goods.iter().collect();
        while let Some(item) = stack.pop() {
            count += 1;
            stack.extend(item.precursor_goods.iter());
        }
        count
    }
}

/// Report identifier: `CBAM-Q{quarter}-{year}-{8 hex chars}`, the suffix
/// digested from the declarant EORI and the current timestamp.
pub fn generate_report_id(declarant_eori: &str, year: i32, quarter: u32) -> String {
    let timestamp = Utc::now().format("%Y%m%d%H%M%S");
    let digest = Sha256::digest(format!("{declarant_eori}{timestamp}").as_bytes());
    let suffix: String = digest
        .iter()
        .take(4)
        .map(|b| format!("{b:02X}"))
        .collect();
    format!("CBAM-Q{quarter}-{year}-{suffix}")
}

/// A fully populated single-goods report used by fixtures and demos.
pub fn sample_report() -> CbamReport {
    let declarant = Declarant {
        eori_number: "DE123456789012345".into(),
        name: "German Steel Imports GmbH".into(),
        address: Address::new("Industriestraße 42", "Düsseldorf", "40210", "DE"),
        contact_email: Some("cbam@german-steel.de".into()),
        contact_phone: None,
        representative_eori: None,
    };

    let producer = Producer {
        installation_id: "IN-TSL-JSR-001".into(),
        name: "Tata Steel Limited".into(),
        country: "IN".into(),
        address: Some("Jamshedpur, Jharkhand, India".into()),
        unlocode: Some("INIXW".into()),
        latitude: Some(22.8046),
        longitude: Some(86.2029),
        is_verified: true,
        verification_body: Some("Bureau Veritas".into()),
    };

    let mut emissions = EmissionData::new(85.5, 12.3);
    emissions.specific_direct_emissions = 1.9;
    emissions.electricity_consumption_mwh = Some(125.0);
    emissions.electricity_emission_factor = Some(0.82);
    emissions.data_source = Some("Producer declaration + verification".into());

    let goods_item = GoodsItem::new(
        1,
        "72085191",
        "Hot-rolled steel coils, width >= 600mm, thickness > 10mm",
        CbamCategory::IronSteel,
        45000.0,
        "kg",
        "IN",
        producer,
        emissions,
    );

    let mut report = CbamReport::new(
        "CBAM-Q1-2024-SAMPLE001",
        2024,
        1,
        declarant,
        vec![goods_item],
    );
    report.submission_date = NaiveDate::from_ymd_opt(2024, 4, 15);
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emission_total_derived_at_construction() {
        let emissions = EmissionData::new(85.5, 12.3);
        assert!((emissions.total_emissions_tco2 - 97.8).abs() < 1e-9);
    }

    #[test]
    fn refresh_totals_ignores_caller_supplied_totals() {
        let mut report = sample_report();
        report.total_emissions = 9999.0;
        report.goods[0].emissions.total_emissions_tco2 = -1.0;
        report.refresh_totals();
        assert!((report.total_direct_emissions - 85.5).abs() < 1e-9);
        assert!((report.total_indirect_emissions - 12.3).abs() < 1e-9);
        assert!((report.total_emissions - 97.8).abs() < 1e-9);
        assert!((report.goods[0].emissions.total_emissions_tco2 - 97.8).abs() < 1e-9);
    }

    #[test]
    fn precursor_totals_recomputed_but_not_double_counted() {
        let mut report = sample_report();
        let mut precursor = report.goods[0].clone();
        precursor.item_number = 2;
        precursor.cn_code = "72011011".into();
        precursor.emissions = EmissionData::new(10.0, 1.0);
        precursor.emissions.total_emissions_tco2 = 0.0; // stale
        report.goods[0].precursor_goods.push(precursor);

        report.refresh_totals();
        // Aggregates come from the top-level goods only.
        assert!((report.total_emissions - 97.8).abs() < 1e-9);
        // But the precursor node's own total is still repaired.
        let nested = &report.goods[0].precursor_goods[0];
        assert!((nested.emissions.total_emissions_tco2 - 11.0).abs() < 1e-9);
        assert_eq!(report.goods_count_deep(), 2);
    }

    #[test]
    fn deep_precursor_chain_does_not_recurse() {
        let mut report = sample_report();
        let template = report.goods[0].clone();
        let mut chain = template.clone();
        for i in 0..2_000 {
            let mut parent = template.clone();
            parent.item_number = i + 2;
            parent.precursor_goods = vec![chain];
            chain = parent;
        }
        report.goods[0].precursor_goods.push(chain);
        report.refresh_totals();
        assert_eq!(report.goods_count_deep(), 2_002);
    }

    #[test]
    fn report_id_format() {
        let id = generate_report_id("DE123456789012345", 2024, 4);
        assert!(id.starts_with("CBAM-Q4-2024-"));
        let suffix = id.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn report_round_trips_through_json() {
        let report = sample_report();
        let json = serde_json::to_string(&report).unwrap();
        let back: CbamReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
