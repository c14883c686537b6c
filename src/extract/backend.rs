use chrono::NaiveDate;

use super::patterns::{self, first_match, parse_number};
use super::types::{
    BackendKind, DocumentKind, ExtractedActivityData, ExtractionBackend, TextSource,
    Utf8TextSource,
};
use super::units::{normalize_country, to_kg, to_kwh, to_mwh, CountryResolution};

/// Calibrated per-field confidence for pattern extraction. These are fixed
/// constants, not computed values.
mod field_confidence {
    pub const ELECTRICITY: f64 = 0.85;
    pub const WEIGHT: f64 = 0.88;
    pub const COUNTRY: f64 = 0.75;
    pub const PRODUCER: f64 = 0.70;
    pub const DATE: f64 = 0.80;
    pub const DOCUMENT_NUMBER: f64 = 0.80;
    pub const INSTALLATION_ID: f64 = 0.90;
}

/// Deterministic regex extraction backend. For each pattern family the
/// first pattern with a match wins, and within it the first occurrence.
pub struct PatternBackend {
    source: Box<dyn TextSource + Send + Sync>,
}

impl Default for PatternBackend {
    fn default() -> Self {
        Self::new(Box::new(Utf8TextSource))
    }
}

impl PatternBackend {
    pub fn new(source: Box<dyn TextSource + Send + Sync>) -> Self {
        Self { source }
    }

    fn document_text(&self, document: &[u8], data: &mut ExtractedActivityData) -> String {
        match self.source.text(document) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "text extraction failed, continuing with empty text");
                data.extraction_warnings
                    .push(format!("Text extraction failed: {err}"));
                String::new()
            }
        }
    }

    fn extract_electricity(&self, text: &str, data: &mut ExtractedActivityData) {
        let Some(caps) = first_match(&patterns::ELECTRICITY, text) else {
            return;
        };
        let raw_value = &caps["value"];
        let Some(value) = parse_number(raw_value) else {
            return;
        };
        let unit = caps.name("unit").map_or("kwh", |m| m.as_str());
        let kwh = to_kwh(value, unit);
        data.electricity_consumption_kwh = Some(kwh);
        data.electricity_consumption_mwh = Some(to_mwh(kwh));
        data.raw_extractions
            .insert("electricity".into(), format!("{raw_value} {unit}"));
        data.confidence_scores.insert(
            "electricity_consumption_kwh".into(),
            field_confidence::ELECTRICITY,
        );
    }

    fn extract_weight(&self, text: &str, data: &mut ExtractedActivityData) {
        let Some(re) = patterns::WEIGHT.iter().find(|re| re.is_match(text)) else {
            return;
        };
        // First occurrence per field: a "net" qualifier routes to the net
        // weight, anything else (gross/total/unqualified) to the gross.
        for caps in re.captures_iter(text) {
            let Some(value) = parse_number(&caps["value"]) else {
                continue;
            };
            let unit = &caps["unit"];
            let kg = to_kg(value, unit);
            let qualifier = caps
                .name("qual")
                .map(|m| m.as_str().to_lowercase())
                .unwrap_or_default();

            let field = if qualifier == "net" {
                &mut data.net_weight_kg
            } else {
                &mut data.gross_weight_kg
            };
            if field.is_none() {
                *field = Some(kg);
                let key = if qualifier == "net" { "net_weight" } else { "weight" };
                data.raw_extractions
                    .insert(key.into(), format!("{} {unit}", &caps["value"]));
                data.confidence_scores.insert(
                    if qualifier == "net" {
                        "net_weight_kg".into()
                    } else {
                        "gross_weight_kg".into()
                    },
                    field_confidence::WEIGHT,
                );
            }
            if data.gross_weight_kg.is_some() && data.net_weight_kg.is_some() {
                break;
            }
        }
    }

    fn extract_dates(&self, text: &str, data: &mut ExtractedActivityData) {
        let Some(caps) = first_match(&patterns::DATE, text) else {
            return;
        };

        if let Some(quarter) = caps.name("q").or_else(|| caps.name("qn")) {
            let quarter: u32 = quarter.as_str().parse().unwrap_or(1);
            let year: i32 = caps["qy"].parse().unwrap_or(0);
            if let Some((start, end)) = quarter_bounds(year, quarter) {
                data.reporting_period_start = Some(start);
                data.reporting_period_end = Some(end);
                data.confidence_scores
                    .insert("reporting_period_start".into(), field_confidence::DATE);
                data.confidence_scores
                    .insert("reporting_period_end".into(), field_confidence::DATE);
                data.raw_extractions
                    .insert("period".into(), caps[0].to_string());
            }
            return;
        }

        if let Some(start) = parse_date(&caps["d1"], &caps["m1"], &caps["y1"]) {
            data.reporting_period_start = Some(start);
            data.confidence_scores
                .insert("reporting_period_start".into(), field_confidence::DATE);
        }
        if let (Some(d2), Some(m2), Some(y2)) = (caps.name("d2"), caps.name("m2"), caps.name("y2"))
        {
            if let Some(end) = parse_date(d2.as_str(), m2.as_str(), y2.as_str()) {
                data.reporting_period_end = Some(end);
                data.confidence_scores
                    .insert("reporting_period_end".into(), field_confidence::DATE);
            }
        }
    }

    fn extract_producer(&self, text: &str, data: &mut ExtractedActivityData) {
        let Some(caps) = first_match(&patterns::PRODUCER, text) else {
            return;
        };
        let raw = caps["name"].to_string();
        data.producer_name = Some(raw.trim().to_string());
        data.raw_extractions.insert("producer".into(), raw);
        data.confidence_scores
            .insert("producer_name".into(), field_confidence::PRODUCER);
    }

    fn extract_country(&self, text: &str, data: &mut ExtractedActivityData) {
        let Some(caps) = first_match(&patterns::COUNTRY, text) else {
            return;
        };
        let raw = caps["country"].trim().to_string();
        data.raw_extractions.insert("country".into(), raw.clone());
        match normalize_country(&raw) {
            CountryResolution::Resolved(code) => {
                data.country_of_origin = Some(code);
                data.confidence_scores
                    .insert("country_of_origin".into(), field_confidence::COUNTRY);
            }
            CountryResolution::Unresolved(raw) => {
                data.extraction_warnings
                    .push(format!("Could not resolve country of origin from '{raw}'"));
            }
        }
    }

    fn extract_document_number(&self, text: &str, data: &mut ExtractedActivityData) {
        let Some(caps) = first_match(&patterns::DOCUMENT_NUMBER, text) else {
            return;
        };
        let raw = caps["num"].to_string();
        data.raw_extractions
            .insert("document_number".into(), raw.clone());
        data.document_number = Some(raw);
        data.confidence_scores
            .insert("document_number".into(), field_confidence::DOCUMENT_NUMBER);
    }

    fn extract_installation_id(&self, text: &str, data: &mut ExtractedActivityData) {
        let Some(caps) = first_match(&patterns::INSTALLATION_ID, text) else {
            return;
        };
        let raw = caps["id"].to_string();
        data.installation_id = Some(raw.to_uppercase());
        data.raw_extractions.insert("installation_id".into(), raw);
        data.confidence_scores
            .insert("installation_id".into(), field_confidence::INSTALLATION_ID);
    }

    /// Warn when the inferred document kind implies a field that failed to
    /// extract.
    fn warn_missing_mandatory(&self, data: &mut ExtractedActivityData) {
        match data.document_type {
            Some(DocumentKind::ElectricityBill) if data.electricity_consumption_kwh.is_none() => {
                data.extraction_warnings
                    .push("Could not extract electricity consumption from bill".into());
            }
            Some(DocumentKind::MillTestCertificate) if data.gross_weight_kg.is_none() => {
                data.extraction_warnings
                    .push("Could not extract weight from certificate".into());
            }
            _ => {}
        }
    }
}

impl ExtractionBackend for PatternBackend {
    fn extract(&self, document: &[u8], filename_hint: &str) -> ExtractedActivityData {
        let mut data = ExtractedActivityData {
            extraction_method: self.name().into(),
            ..Default::default()
        };

        let kind = DocumentKind::from_filename(filename_hint);
        if kind != DocumentKind::Unknown {
            data.document_type = Some(kind);
        }

        let text = self.document_text(document, &mut data);

        self.extract_electricity(&text, &mut data);
        self.extract_weight(&text, &mut data);
        self.extract_dates(&text, &mut data);
        self.extract_producer(&text, &mut data);
        self.extract_country(&text, &mut data);
        self.extract_document_number(&text, &mut data);
        self.extract_installation_id(&text, &mut data);
        self.warn_missing_mandatory(&mut data);

        tracing::debug!(
            fields = data.confidence_scores.len(),
            warnings = data.extraction_warnings.len(),
            kind = ?data.document_type,
            "pattern extraction complete"
        );
        data
    }

    fn name(&self) -> &'static str {
        "pattern"
    }
}

/// Fixed sample data for fixtures and demos, keyed off the filename hint.
#[derive(Debug, Default)]
pub struct MockBackend;

impl ExtractionBackend for MockBackend {
    fn extract(&self, _document: &[u8], filename_hint: &str) -> ExtractedActivityData {
        let kind = DocumentKind::from_filename(filename_hint);
        let mut data = ExtractedActivityData {
            extraction_method: self.name().into(),
            reporting_period_start: NaiveDate::from_ymd_opt(2024, 1, 1),
            reporting_period_end: NaiveDate::from_ymd_opt(2024, 3, 31),
            document_date: NaiveDate::from_ymd_opt(2024, 4, 5),
            ..Default::default()
        };

        match kind {
            DocumentKind::ElectricityBill => {
                data.document_type = Some(kind);
                data.electricity_consumption_kwh = Some(125_000.0);
                data.electricity_consumption_mwh = Some(125.0);
                data.confidence_scores
                    .insert("electricity_consumption_kwh".into(), 0.95);
                data.raw_extractions
                    .insert("electricity".into(), "125 MWh".into());
            }
            DocumentKind::MillTestCertificate => {
                data.document_type = Some(kind);
                data.gross_weight_kg = Some(45_000.0);
                data.net_weight_kg = Some(44_800.0);
                data.country_of_origin = Some("IN".into());
                data.producer_country = Some("IN".into());
                data.producer_name = Some("Tata Steel Limited".into());
                data.producer_address = Some("Jamshedpur, Jharkhand, India".into());
                data.installation_id = Some("IN-TSL-JSR-001".into());
                data.product_description = Some("Hot-rolled steel coils".into());
                data.product_grade = Some("IS 2062 E250".into());
                data.quantity = Some(45.0);
                data.unit = Some("tonnes".into());
                data.document_number = Some("MTC/2024/00123".into());
                for (field, score) in [
                    ("gross_weight_kg", 0.95),
                    ("country_of_origin", 0.98),
                    ("producer_name", 0.92),
                    ("installation_id", 0.88),
                ] {
                    data.confidence_scores.insert(field.into(), score);
                }
            }
            _ => {}
        }
        data
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Extraction entry point: picks the configured backend, falling back to
/// the deterministic pattern backend when a higher-fidelity kind has no
/// collaborator wired in.
pub struct Extractor {
    backend: Box<dyn ExtractionBackend + Send + Sync>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(BackendKind::Pattern)
    }
}

impl Extractor {
    pub fn new(kind: BackendKind) -> Self {
        let backend: Box<dyn ExtractionBackend + Send + Sync> = match kind {
            BackendKind::Pattern => Box::new(PatternBackend::default()),
            BackendKind::Mock => Box::new(MockBackend),
            BackendKind::Layout | BackendKind::Llm => {
                // External document-understanding collaborators are not part
                // of the core; without one the pattern backend serves.
                tracing::warn!(
                    requested = ?kind,
                    "backend collaborator not configured, falling back to pattern matching"
                );
                Box::new(PatternBackend::default())
            }
        };
        Self { backend }
    }

    /// Use a caller-supplied backend (tests, external collaborators).
    pub fn with_backend(backend: Box<dyn ExtractionBackend + Send + Sync>) -> Self {
        Self { backend }
    }

    pub fn extract(&self, document: &[u8], filename_hint: &str) -> ExtractedActivityData {
        self.backend.extract(document, filename_hint)
    }

    /// Extract from each document independently.
    pub fn extract_batch(&self, documents: &[(&[u8], &str)]) -> Vec<ExtractedActivityData> {
        documents
            .iter()
            .map(|(bytes, hint)| self.extract(bytes, hint))
            .collect()
    }
}

fn parse_date(day: &str, month: &str, year: &str) -> Option<NaiveDate> {
    let day: u32 = day.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let mut year: i32 = year.parse().ok()?;
    if year < 100 {
        year += 2000;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// First and last day of a calendar quarter.
fn quarter_bounds(year: i32, quarter: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start_month = match quarter {
        1 => 1,
        2 => 4,
        3 => 7,
        4 => 10,
        _ => return None,
    };
    let start = NaiveDate::from_ymd_opt(year, start_month, 1)?;
    let end = match quarter {
        1 => NaiveDate::from_ymd_opt(year, 3, 31),
        2 => NaiveDate::from_ymd_opt(year, 6, 30),
        3 => NaiveDate::from_ymd_opt(year, 9, 30),
        _ => NaiveDate::from_ymd_opt(year, 12, 31),
    }?;
    Some((start, end))
}
