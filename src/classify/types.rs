use serde::{Deserialize, Serialize};

use crate::taxonomy::{CbamCategory, EmissionFactor};

/// Human-review disposition of a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Approved,
    NeedsReview,
    Rejected,
}

/// A ranked alternative to the primary code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeCode {
    /// Grouped 4-2-2 form, e.g. "7318 15 90".
    pub cn_code_formatted: String,
    pub description: String,
    pub score: f64,
}

/// Result of one classification call. Created fresh per call (or returned
/// from the cache); never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub cn_code: String,
    /// Grouped 4-2-2 form, e.g. "7318 15 00".
    pub cn_code_formatted: String,
    pub cn_description: String,
    /// In [0, 1], rounded to 3 decimal places.
    pub confidence: f64,
    pub review_status: ReviewStatus,

    // Hierarchy
    pub chapter: String,
    pub chapter_description: String,
    pub heading: String,
    pub subheading: String,

    // CBAM relevance
    pub is_cbam_relevant: bool,
    pub cbam_category: Option<CbamCategory>,
    pub emission_factor: Option<EmissionFactor>,

    /// Up to 3 ranked alternatives, best first.
    pub alternative_codes: Vec<AlternativeCode>,
    /// Keywords that contributed to the score; chapter-level matches are
    /// marked "keyword(chapter)".
    pub matched_keywords: Vec<String>,
    pub classification_notes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ReviewStatus::NeedsReview).unwrap(),
            "\"needs_review\""
        );
    }
}
