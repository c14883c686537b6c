use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::TextSourceError;

/// Heuristic document classification from the filename hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    ElectricityBill,
    MillTestCertificate,
    CommercialInvoice,
    Unknown,
}

impl DocumentKind {
    pub fn from_filename(hint: &str) -> DocumentKind {
        let lower = hint.to_lowercase();
        if lower.contains("electricity") || lower.contains("bill") || lower.contains("power") {
            DocumentKind::ElectricityBill
        } else if lower.contains("mill") || lower.contains("certificate") || lower.contains("test")
        {
            DocumentKind::MillTestCertificate
        } else if lower.contains("invoice") {
            DocumentKind::CommercialInvoice
        } else {
            DocumentKind::Unknown
        }
    }
}

/// Structured activity data extracted from one document.
///
/// Every field is best-effort: absent means "not extracted", never an
/// error. `confidence_scores` carries a calibrated per-field score in
/// [0, 1]; `raw_extractions` keeps the matched source text for audit.
/// Always JSON-serializable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedActivityData {
    // Core fields
    pub reporting_period_start: Option<NaiveDate>,
    pub reporting_period_end: Option<NaiveDate>,
    pub electricity_consumption_kwh: Option<f64>,
    pub electricity_consumption_mwh: Option<f64>,
    pub gross_weight_kg: Option<f64>,
    pub net_weight_kg: Option<f64>,
    pub country_of_origin: Option<String>,
    pub producer_name: Option<String>,
    pub producer_address: Option<String>,
    pub producer_country: Option<String>,
    pub installation_id: Option<String>,

    // Product details
    pub product_description: Option<String>,
    pub product_grade: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,

    // Document metadata
    pub document_type: Option<DocumentKind>,
    pub document_number: Option<String>,
    pub document_date: Option<NaiveDate>,

    // Extraction quality
    pub confidence_scores: BTreeMap<String, f64>,
    pub raw_extractions: BTreeMap<String, String>,
    pub extraction_warnings: Vec<String>,
    pub extraction_method: String,
}

/// An extraction backend: bytes + filename hint in, activity data out.
/// Infallible by contract — degraded results carry warnings instead.
pub trait ExtractionBackend {
    fn extract(&self, document: &[u8], filename_hint: &str) -> ExtractedActivityData;

    /// Identifier recorded in [`ExtractedActivityData::extraction_method`].
    fn name(&self) -> &'static str;
}

/// Turns raw document bytes into plain text. Real document-understanding
/// services (PDF renderers, OCR) implement this outside the core.
pub trait TextSource {
    fn text(&self, document: &[u8]) -> Result<String, TextSourceError>;
}

/// Default text source: lossy UTF-8 decoding of the raw bytes.
#[derive(Debug, Default)]
pub struct Utf8TextSource;

impl TextSource for Utf8TextSource {
    fn text(&self, document: &[u8]) -> Result<String, TextSourceError> {
        Ok(String::from_utf8_lossy(document).into_owned())
    }
}

/// Which backend the extractor should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Deterministic regex pattern matching. Always available.
    #[default]
    Pattern,
    /// Layout-aware model collaborator; falls back to Pattern when unwired.
    Layout,
    /// LLM document-understanding collaborator; falls back to Pattern.
    Llm,
    /// Fixed sample data for fixtures and demos.
    Mock,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_kind_heuristics() {
        assert_eq!(
            DocumentKind::from_filename("electricity_bill_oct.pdf"),
            DocumentKind::ElectricityBill
        );
        assert_eq!(
            DocumentKind::from_filename("MILL_TEST_CERT_0042.pdf"),
            DocumentKind::MillTestCertificate
        );
        assert_eq!(
            DocumentKind::from_filename("commercial-invoice.pdf"),
            DocumentKind::CommercialInvoice
        );
        assert_eq!(DocumentKind::from_filename("scan001.pdf"), DocumentKind::Unknown);
    }

    #[test]
    fn bill_beats_invoice_when_both_present() {
        // "bill" is checked first; electricity docs are the common case.
        assert_eq!(
            DocumentKind::from_filename("power_invoice.pdf"),
            DocumentKind::ElectricityBill
        );
    }

    #[test]
    fn activity_data_is_json_serializable() {
        let mut data = ExtractedActivityData {
            electricity_consumption_kwh: Some(125000.0),
            document_type: Some(DocumentKind::ElectricityBill),
            extraction_method: "pattern".into(),
            ..Default::default()
        };
        data.confidence_scores
            .insert("electricity_consumption_kwh".into(), 0.85);
        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("\"electricity_bill\""));
        let back: ExtractedActivityData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn utf8_source_is_lossy_not_fatal() {
        let source = Utf8TextSource;
        let text = source.text(&[0x48, 0x69, 0xFF]).unwrap();
        assert!(text.starts_with("Hi"));
    }
}
