//! Plausibility checks on extracted activity data. Pure: issues are
//! returned, never panicked or logged away.

use super::types::ExtractedActivityData;

/// Upper bound on believable electricity consumption for a single
/// document, in kWh. Above this the value is almost certainly a
/// mis-parsed meter reading or account number.
const MAX_PLAUSIBLE_KWH: f64 = 1.0e9;

/// Validate extracted activity data, returning human-readable issues.
/// An empty result means nothing implausible was found, not that the
/// data is complete.
pub fn validate_activity_data(data: &ExtractedActivityData) -> Vec<String> {
    let mut issues = Vec::new();

    if let Some(kwh) = data.electricity_consumption_kwh {
        if kwh < 0.0 {
            issues.push(format!("Electricity consumption is negative: {kwh} kWh"));
        } else if kwh > MAX_PLAUSIBLE_KWH {
            issues.push(format!(
                "Electricity consumption implausibly large: {kwh} kWh"
            ));
        }
    }

    if let Some(gross) = data.gross_weight_kg {
        if gross < 0.0 {
            issues.push(format!("Gross weight is negative: {gross} kg"));
        }
    }

    if let (Some(gross), Some(net)) = (data.gross_weight_kg, data.net_weight_kg) {
        if net > gross {
            issues.push(format!(
                "Net weight ({net} kg) exceeds gross weight ({gross} kg)"
            ));
        }
    }

    if let Some(country) = &data.country_of_origin {
        if country.len() != 2 || !country.bytes().all(|b| b.is_ascii_alphabetic()) {
            issues.push(format!("Country of origin is not a 2-letter code: '{country}'"));
        }
    }

    if let (Some(start), Some(end)) = (data.reporting_period_start, data.reporting_period_end) {
        if start > end {
            issues.push(format!(
                "Reporting period starts after it ends: {start} > {end}"
            ));
        }
    }

    issues
}
