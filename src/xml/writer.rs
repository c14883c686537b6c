//! QReport XML writer.

use std::io::Write;

use chrono::{NaiveDate, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::config::{CBAM_NAMESPACE, SCHEMA_FILENAME};
use crate::report::{CbamReport, Declarant, EmissionData, GoodsItem, Producer};

use super::schema::{SchemaValidator, ValidationResult};
use super::XmlError;

const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Default decimal precision for emission values.
const DEFAULT_PRECISION: usize = 6;
/// Currency amounts.
const CURRENCY_PRECISION: usize = 2;
/// Quantities and electricity consumption.
const QUANTITY_PRECISION: usize = 3;
/// Specific-emission ratios and emission factors.
const FACTOR_PRECISION: usize = 4;

/// Normalize a CN code to exactly 8 characters: strip spaces and
/// periods, truncate, right-pad with '0'.
///
/// This is coercion, not validation — a malformed code is emitted
/// silently. Run [`crate::report::validate_report`] beforehand to catch
/// codes that should be rejected instead.
pub fn format_cn_code(code: &str) -> String {
    let mut cleaned: String = code
        .chars()
        .filter(|&c| c != ' ' && c != '.')
        .take(8)
        .collect();
    let mut count = cleaned.chars().count();
    while count < 8 {
        cleaned.push('0');
        count += 1;
    }
    cleaned
}

fn format_decimal(value: f64, precision: usize) -> String {
    format!("{value:.precision$}")
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.unwrap_or_else(|| Utc::now().date_naive())
        .format("%Y-%m-%d")
        .to_string()
}

/// Generates namespaced QReport XML from a [`CbamReport`].
///
/// Aggregate totals are recomputed from the goods tree at generation
/// time; the report's stored totals fields are never read.
pub struct XmlSerializer {
    pretty_print: bool,
}

impl Default for XmlSerializer {
    fn default() -> Self {
        Self { pretty_print: true }
    }
}

impl XmlSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pretty_print(pretty_print: bool) -> Self {
        Self { pretty_print }
    }

    /// Generate UTF-8 XML bytes. Pure: no I/O, no mutation of the
    /// report, deterministic for a report with a fixed submission date.
    pub fn generate(&self, report: &CbamReport) -> Result<Vec<u8>, XmlError> {
        let buffer = Vec::new();
        let mut writer = if self.pretty_print {
            Writer::new_with_indent(buffer, b' ', 2)
        } else {
            Writer::new(buffer)
        };

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut root = BytesStart::new("QReport");
        root.push_attribute(("xmlns", CBAM_NAMESPACE));
        root.push_attribute(("xmlns:xsi", XSI_NS));
        root.push_attribute((
            "xsi:schemaLocation",
            format!("{CBAM_NAMESPACE} {SCHEMA_FILENAME}").as_str(),
        ));
        writer.write_event(Event::Start(root))?;

        self.write_header(&mut writer, report)?;
        self.write_declarant(&mut writer, &report.declarant)?;
        self.write_goods_list(&mut writer, &report.goods)?;
        self.write_summary(&mut writer, &report.goods)?;

        writer.write_event(Event::End(BytesEnd::new("QReport")))?;

        tracing::debug!(
            report_id = %report.report_id,
            goods = report.goods.len(),
            "XML generated"
        );
        Ok(writer.into_inner())
    }

    /// Generate XML and run it through the schema validator in one call.
    /// Validation failure does not suppress the XML: callers get both.
    pub fn generate_and_validate(
        &self,
        report: &CbamReport,
        validator: &mut SchemaValidator,
    ) -> Result<(Vec<u8>, ValidationResult), XmlError> {
        let xml = self.generate(report)?;
        let validation = validator.validate(&xml);
        Ok((xml, validation))
    }

    fn write_header<W: Write>(
        &self,
        writer: &mut Writer<W>,
        report: &CbamReport,
    ) -> Result<(), XmlError> {
        writer.write_event(Event::Start(BytesStart::new("Header")))?;

        text_element(writer, "ReportId", &report.report_id)?;
        text_element(writer, "ReportType", report.report_type.as_str())?;

        writer.write_event(Event::Start(BytesStart::new("ReportingPeriod")))?;
        text_element(writer, "Year", &report.reporting_period_year.to_string())?;
        text_element(writer, "Quarter", &report.reporting_period_quarter.to_string())?;
        writer.write_event(Event::End(BytesEnd::new("ReportingPeriod")))?;

        text_element(writer, "SubmissionDate", &format_date(report.submission_date))?;
        text_element(
            writer,
            "IsAmendment",
            if report.is_amendment { "true" } else { "false" },
        )?;

        if report.is_amendment {
            if let Some(original) = &report.original_report_id {
                text_element(writer, "OriginalReportReference", original)?;
                if let Some(reason) = &report.amendment_reason {
                    text_element(writer, "AmendmentReason", reason)?;
                }
            }
        }

        writer.write_event(Event::End(BytesEnd::new("Header")))?;
        Ok(())
    }

    fn write_declarant<W: Write>(
        &self,
        writer: &mut Writer<W>,
        declarant: &Declarant,
    ) -> Result<(), XmlError> {
        writer.write_event(Event::Start(BytesStart::new("Declarant")))?;
        text_element(writer, "EORINumber", &declarant.eori_number)?;
        text_element(writer, "Name", &declarant.name)?;

        writer.write_event(Event::Start(BytesStart::new("Address")))?;
        text_element(writer, "Street", &declarant.address.street)?;
        if let Some(number) = &declarant.address.building_number {
            text_element(writer, "BuildingNumber", number)?;
        }
        text_element(writer, "City", &declarant.address.city)?;
        text_element(writer, "PostalCode", &declarant.address.postal_code)?;
        text_element(writer, "Country", &declarant.address.country)?;
        writer.write_event(Event::End(BytesEnd::new("Address")))?;

        if let Some(email) = &declarant.contact_email {
            text_element(writer, "ContactEmail", email)?;
        }
        if let Some(phone) = &declarant.contact_phone {
            text_element(writer, "ContactPhone", phone)?;
        }
        if let Some(representative) = &declarant.representative_eori {
            text_element(writer, "RepresentativeEORI", representative)?;
        }

        writer.write_event(Event::End(BytesEnd::new("Declarant")))?;
        Ok(())
    }

    fn write_goods_list<W: Write>(
        &self,
        writer: &mut Writer<W>,
        goods: &[GoodsItem],
    ) -> Result<(), XmlError> {
        writer.write_event(Event::Start(BytesStart::new("GoodsList")))?;
        for item in goods {
            self.write_goods_item(writer, item)?;
        }
        writer.write_event(Event::End(BytesEnd::new("GoodsList")))?;
        Ok(())
    }

    fn write_goods_item<W: Write>(
        &self,
        writer: &mut Writer<W>,
        item: &GoodsItem,
    ) -> Result<(), XmlError> {
        writer.write_event(Event::Start(BytesStart::new("Goods")))?;

        text_element(writer, "ItemNumber", &item.item_number.to_string())?;
        text_element(writer, "CNCommodityCode", &format_cn_code(&item.cn_code))?;
        text_element(writer, "CommodityDescription", &item.cn_description)?;
        text_element(writer, "CBAMCategory", item.cbam_category.as_str())?;

        writer.write_event(Event::Start(BytesStart::new("Quantity")))?;
        text_element(writer, "Value", &format_decimal(item.quantity, QUANTITY_PRECISION))?;
        text_element(writer, "Unit", &item.unit)?;
        writer.write_event(Event::End(BytesEnd::new("Quantity")))?;

        text_element(writer, "CountryOfOrigin", &item.country_of_origin)?;
        self.write_producer(writer, &item.producer)?;
        self.write_emissions(writer, &item.emissions)?;

        if item.inward_processing {
            text_element(writer, "InwardProcessing", "true")?;
        }
        if let Some(price) = item.carbon_price_paid {
            writer.write_event(Event::Start(BytesStart::new("CarbonPricePaid")))?;
            text_element(writer, "Amount", &format_decimal(price, CURRENCY_PRECISION))?;
            text_element(writer, "Currency", &item.carbon_price_currency)?;
            writer.write_event(Event::End(BytesEnd::new("CarbonPricePaid")))?;
        }
        if let Some(info) = &item.supplementary_info {
            text_element(writer, "SupplementaryInfo", info)?;
        }

        if !item.precursor_goods.is_empty() {
            writer.write_event(Event::Start(BytesStart::new("PrecursorGoods")))?;
            for precursor in &item.precursor_goods {
                self.write_goods_item(writer, precursor)?;
            }
            writer.write_event(Event::End(BytesEnd::new("PrecursorGoods")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("Goods")))?;
        Ok(())
    }

    fn write_producer<W: Write>(
        &self,
        writer: &mut Writer<W>,
        producer: &Producer,
    ) -> Result<(), XmlError> {
        writer.write_event(Event::Start(BytesStart::new("Producer")))?;
        text_element(writer, "InstallationId", &producer.installation_id)?;
        text_element(writer, "Name", &producer.name)?;
        text_element(writer, "Country", &producer.country)?;

        if let Some(address) = &producer.address {
            text_element(writer, "Address", address)?;
        }
        if producer.is_verified {
            text_element(writer, "IsVerified", "true")?;
            if let Some(body) = &producer.verification_body {
                text_element(writer, "VerificationBody", body)?;
            }
        }

        writer.write_event(Event::End(BytesEnd::new("Producer")))?;
        Ok(())
    }

    fn write_emissions<W: Write>(
        &self,
        writer: &mut Writer<W>,
        emissions: &EmissionData,
    ) -> Result<(), XmlError> {
        // Per-node total comes from direct + indirect here, never from
        // the stored field.
        let total = emissions.direct_emissions_tco2 + emissions.indirect_emissions_tco2;

        writer.write_event(Event::Start(BytesStart::new("Emissions")))?;
        value_unit(writer, "DirectEmissions", emissions.direct_emissions_tco2, DEFAULT_PRECISION, "tCO2")?;
        value_unit(writer, "IndirectEmissions", emissions.indirect_emissions_tco2, DEFAULT_PRECISION, "tCO2")?;
        value_unit(writer, "TotalEmissions", total, DEFAULT_PRECISION, "tCO2")?;
        text_element(writer, "CalculationMethod", emissions.calculation_method.as_str())?;

        if emissions.specific_direct_emissions > 0.0 {
            value_unit(
                writer,
                "SpecificDirectEmissions",
                emissions.specific_direct_emissions,
                FACTOR_PRECISION,
                "tCO2/t",
            )?;
        }
        if let Some(mwh) = emissions.electricity_consumption_mwh {
            value_unit(writer, "ElectricityConsumption", mwh, QUANTITY_PRECISION, "MWh")?;
        }
        if let Some(factor) = emissions.electricity_emission_factor {
            value_unit(
                writer,
                "ElectricityEmissionFactor",
                factor,
                FACTOR_PRECISION,
                "tCO2/MWh",
            )?;
        }
        if let Some(source) = &emissions.data_source {
            text_element(writer, "DataSource", source)?;
        }

        writer.write_event(Event::End(BytesEnd::new("Emissions")))?;
        Ok(())
    }

    fn write_summary<W: Write>(
        &self,
        writer: &mut Writer<W>,
        goods: &[GoodsItem],
    ) -> Result<(), XmlError> {
        let direct: f64 = goods.iter().map(|g| g.emissions.direct_emissions_tco2).sum();
        let indirect: f64 = goods
            .iter()
            .map(|g| g.emissions.indirect_emissions_tco2)
            .sum();

        writer.write_event(Event::Start(BytesStart::new("Summary")))?;
        text_element(writer, "TotalGoodsItems", &goods.len().to_string())?;
        value_unit(writer, "TotalDirectEmissions", direct, DEFAULT_PRECISION, "tCO2")?;
        value_unit(writer, "TotalIndirectEmissions", indirect, DEFAULT_PRECISION, "tCO2")?;
        value_unit(writer, "TotalEmissions", direct + indirect, DEFAULT_PRECISION, "tCO2")?;
        writer.write_event(Event::End(BytesEnd::new("Summary")))?;
        Ok(())
    }
}

fn text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &str,
) -> Result<(), XmlError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn value_unit<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: f64,
    precision: usize,
    unit: &str,
) -> Result<(), XmlError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    text_element(writer, "Value", &format_decimal(value, precision))?;
    text_element(writer, "Unit", unit)?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{sample_report, EmissionData};

    fn generate_string(report: &CbamReport) -> String {
        let bytes = XmlSerializer::new().generate(report).unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn cn_code_is_always_eight_characters() {
        assert_eq!(format_cn_code("72085191"), "72085191");
        assert_eq!(format_cn_code("7208 51 91"), "72085191");
        assert_eq!(format_cn_code("7208.51.91"), "72085191");
        assert_eq!(format_cn_code("7208"), "72080000");
        assert_eq!(format_cn_code("720851910123"), "72085191");
        assert_eq!(format_cn_code(""), "00000000");
    }

    #[test]
    fn non_ascii_cn_code_is_coerced_not_a_panic() {
        // Truncation must land on char boundaries even for multi-byte input.
        let coerced = format_cn_code("7208519€123");
        assert_eq!(coerced.chars().count(), 8);
        assert_eq!(coerced, "7208519€");
        assert_eq!(format_cn_code("€7").chars().count(), 8);

        let mut report = sample_report();
        report.goods[0].cn_code = "7208519€123".into();
        let xml = generate_string(&report);
        assert!(xml.contains("<CNCommodityCode>7208519€</CNCommodityCode>"));
    }

    #[test]
    fn sample_report_structure() {
        let xml = generate_string(&sample_report());
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("xmlns=\"urn:eu:ec:cbam:qreport:v2300\""));
        assert!(xml.contains(
            "xsi:schemaLocation=\"urn:eu:ec:cbam:qreport:v2300 QReport_ver23.00.xsd\""
        ));
        assert!(xml.contains("<ReportId>CBAM-Q1-2024-SAMPLE001</ReportId>"));
        assert!(xml.contains("<CNCommodityCode>72085191</CNCommodityCode>"));
        assert!(xml.contains("<CBAMCategory>iron_steel</CBAMCategory>"));
        assert!(xml.contains("<InstallationId>IN-TSL-JSR-001</InstallationId>"));
        assert!(xml.contains("<IsVerified>true</IsVerified>"));
    }

    #[test]
    fn total_emissions_formatted_to_default_precision() {
        let xml = generate_string(&sample_report());
        // 85.5 + 12.3 at six decimal places, in both Emissions and Summary.
        assert_eq!(xml.matches("<Value>97.800000</Value>").count(), 2);
        assert!(xml.contains("<Value>85.500000</Value>"));
        assert!(xml.contains("<Value>12.300000</Value>"));
    }

    #[test]
    fn quantity_uses_three_decimal_places() {
        let xml = generate_string(&sample_report());
        assert!(xml.contains("<Value>45000.000</Value>"));
        assert!(xml.contains("<ElectricityConsumption>"));
        assert!(xml.contains("<Value>125.000</Value>"));
        assert!(xml.contains("<Value>0.8200</Value>"));
    }

    #[test]
    fn caller_supplied_totals_are_ignored() {
        let mut report = sample_report();
        report.total_emissions = 12345.0;
        report.goods[0].emissions.total_emissions_tco2 = 12345.0;
        let xml = generate_string(&report);
        assert!(!xml.contains("12345"));
        assert_eq!(xml.matches("<Value>97.800000</Value>").count(), 2);
    }

    #[test]
    fn generation_is_byte_identical_for_fixed_dates() {
        let report = sample_report();
        let serializer = XmlSerializer::new();
        let first = serializer.generate(&report).unwrap();
        let second = serializer.generate(&report).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn compact_output_has_no_indentation() {
        let xml_bytes = XmlSerializer::with_pretty_print(false)
            .generate(&sample_report())
            .unwrap();
        let xml = String::from_utf8(xml_bytes).unwrap();
        assert!(!xml.contains('\n'));
    }

    #[test]
    fn amendment_fields_only_when_amending() {
        let mut report = sample_report();
        let plain = generate_string(&report);
        assert!(!plain.contains("OriginalReportReference"));

        report.is_amendment = true;
        report.original_report_id = Some("CBAM-Q4-2023-ABCD1234".into());
        report.amendment_reason = Some("Corrected producer data".into());
        let amended = generate_string(&report);
        assert!(amended.contains("<IsAmendment>true</IsAmendment>"));
        assert!(amended.contains("<OriginalReportReference>CBAM-Q4-2023-ABCD1234</OriginalReportReference>"));
        assert!(amended.contains("<AmendmentReason>Corrected producer data</AmendmentReason>"));
    }

    #[test]
    fn carbon_price_uses_currency_precision() {
        let mut report = sample_report();
        report.goods[0].carbon_price_paid = Some(1234.567);
        let xml = generate_string(&report);
        assert!(xml.contains("<Amount>1234.57</Amount>"));
        assert!(xml.contains("<Currency>EUR</Currency>"));
    }

    #[test]
    fn precursor_goods_nest_recursively() {
        let mut report = sample_report();
        let mut precursor = report.goods[0].clone();
        precursor.item_number = 2;
        precursor.cn_code = "72011011".into();
        precursor.cn_description = "Pig iron".into();
        precursor.emissions = EmissionData::new(10.0, 1.0);
        report.goods[0].precursor_goods.push(precursor);

        let xml = generate_string(&report);
        assert!(xml.contains("<PrecursorGoods>"));
        assert!(xml.contains("<CNCommodityCode>72011011</CNCommodityCode>"));
        // Precursor emissions do not leak into the summary.
        assert!(xml.contains("<TotalGoodsItems>1</TotalGoodsItems>"));
        assert_eq!(xml.matches("<Value>97.800000</Value>").count(), 2);
    }

    #[test]
    fn special_characters_are_escaped() {
        let mut report = sample_report();
        report.declarant.name = "Müller & Söhne <GmbH>".into();
        let xml = generate_string(&report);
        assert!(xml.contains("Müller &amp; Söhne &lt;GmbH&gt;"));
    }
}
