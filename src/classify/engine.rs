use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, Mutex};

use regex::Regex;

use crate::taxonomy::{
    category_for_chapter, chapter_description, cn_codes, default_emission_factor, find_code,
    format_cn_grouped, keyword_codes, EmissionFactor,
};

use super::cache::{ClassificationCache, DEFAULT_CACHE_CAPACITY};
use super::types::{AlternativeCode, ClassificationResult, ReviewStatus};

/// Confidence at or above which a classification is approved.
///
/// Note: [`HIGH_CONFIDENCE_THRESHOLD`] currently maps to the same outcome.
/// The intended auto-approved vs approved-but-flagged distinction is an
/// unresolved product decision; both constants are kept so the split can be
/// introduced without re-deriving the calibration.
pub const CONFIDENCE_THRESHOLD: f64 = 0.85;

/// See [`CONFIDENCE_THRESHOLD`].
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.92;

/// Score below which a candidate code is discarded.
const CANDIDATE_FLOOR: f64 = 0.30;

/// Fallback when no keyword matches: miscellaneous threaded steel article.
const FALLBACK_CODE: &str = "73181500";
const FALLBACK_CONFIDENCE: f64 = 0.40;

/// Words that carry no classification signal.
const STOP_WORDS: &[&str] = &[
    "of", "the", "and", "or", "for", "with", "in", "on", "at", "to", "a", "an",
];

/// Tokens are lowercase words, hyphenated compounds kept whole so that
/// entries like "cold-rolled" in the keyword table are reachable.
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z]+(?:-[a-z]+)*").unwrap());

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Clone)]
struct ScoredCode {
    code: &'static str,
    score: f64,
    matched: Vec<String>,
}

/// Deterministic keyword classifier over the static CN taxonomy.
///
/// `classify` is infallible and, for a fixed taxonomy, a pure function of
/// the normalized input text. The optional result cache is owned by the
/// instance and bounded (FIFO eviction).
pub struct Classifier {
    cache: Option<Mutex<ClassificationCache>>,
    loaded: AtomicBool,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    /// Classifier with a bounded cache of [`DEFAULT_CACHE_CAPACITY`] entries.
    pub fn new() -> Self {
        Self::with_cache_capacity(DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            cache: Some(Mutex::new(ClassificationCache::new(capacity))),
            loaded: AtomicBool::new(false),
        }
    }

    /// Classifier with result caching disabled.
    pub fn without_cache() -> Self {
        Self {
            cache: None,
            loaded: AtomicBool::new(false),
        }
    }

    /// Idempotent engine initialization. The keyword engine is always
    /// available, so this only flips the readiness flag and logs once;
    /// kept so callers can treat this engine like backends that do load
    /// external resources.
    pub fn ensure_loaded(&self) -> bool {
        if !self.loaded.swap(true, Ordering::SeqCst) {
            tracing::info!("classifier: keyword matching engine ready");
        }
        true
    }

    pub fn is_ready(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    /// Classify a product description into a CN code.
    ///
    /// Never fails: with no keyword match the result degrades to the fixed
    /// fallback code at low confidence, flagged for human review.
    pub fn classify(&self, description: &str) -> ClassificationResult {
        self.ensure_loaded();

        let normalized = normalize_text(description);
        let cache_key = self
            .cache
            .as_ref()
            .map(|_| ClassificationCache::key_for(&normalized));

        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            if let Ok(guard) = cache.lock() {
                if let Some(hit) = guard.get(key) {
                    tracing::debug!(key = %key, "classification cache hit");
                    return hit.clone();
                }
            }
        }

        let tokens = extract_tokens(&normalized);
        let mut candidates = score_all_codes(&tokens);
        // Stable sort: ties keep taxonomy listing order, first-listed wins.
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let result = self.build_result(&candidates);

        if let (Some(cache), Some(key)) = (&self.cache, cache_key) {
            if let Ok(mut guard) = cache.lock() {
                guard.insert(key, result.clone());
            }
        }

        result
    }

    /// Classify each description independently. No cross-item coupling.
    pub fn batch_classify(&self, descriptions: &[&str]) -> Vec<ClassificationResult> {
        descriptions.iter().map(|d| self.classify(d)).collect()
    }

    /// Default emission factor for a CN code's chapter, if CBAM-covered.
    pub fn emission_factor_for(&self, cn_code: &str) -> Option<&'static EmissionFactor> {
        let chapter = cn_code.get(..2)?;
        category_for_chapter(chapter).map(default_emission_factor)
    }

    pub fn cache_len(&self) -> usize {
        self.cache
            .as_ref()
            .and_then(|c| c.lock().ok().map(|g| g.len()))
            .unwrap_or(0)
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            if let Ok(mut guard) = cache.lock() {
                guard.clear();
                tracing::info!("classification cache cleared");
            }
        }
    }

    fn build_result(&self, candidates: &[ScoredCode]) -> ClassificationResult {
        let (best_code, confidence, matched_keywords) = match candidates.first() {
            Some(top) => (top.code, top.score, top.matched.clone()),
            None => (FALLBACK_CODE, FALLBACK_CONFIDENCE, Vec::new()),
        };

        let info = find_code(best_code).expect("candidates come from the taxonomy");
        let cbam_category = category_for_chapter(info.chapter);
        let is_cbam_relevant = cbam_category.is_some();
        let emission_factor = cbam_category.map(|c| *default_emission_factor(c));

        // Both thresholds currently collapse to Approved; see the constant
        // docs for why the branches stay separate.
        let review_status = if confidence >= HIGH_CONFIDENCE_THRESHOLD {
            ReviewStatus::Approved
        } else if confidence >= CONFIDENCE_THRESHOLD {
            ReviewStatus::Approved
        } else {
            ReviewStatus::NeedsReview
        };

        let alternative_codes = candidates
            .iter()
            .skip(1)
            .take(3)
            .map(|c| AlternativeCode {
                cn_code_formatted: format_cn_grouped(c.code),
                description: find_code(c.code)
                    .map(|i| i.description.to_string())
                    .unwrap_or_default(),
                score: c.score,
            })
            .collect();

        let mut classification_notes = Vec::new();
        if !is_cbam_relevant {
            classification_notes
                .push("This code is not subject to CBAM reporting requirements".to_string());
        }
        if confidence < CONFIDENCE_THRESHOLD {
            classification_notes.push(format!(
                "Confidence {:.0}% below threshold - recommend human verification",
                confidence * 100.0
            ));
        }

        ClassificationResult {
            cn_code: best_code.to_string(),
            cn_code_formatted: format_cn_grouped(best_code),
            cn_description: info.description.to_string(),
            confidence: round3(confidence),
            review_status,
            chapter: info.chapter.to_string(),
            chapter_description: chapter_description(info.chapter)
                .unwrap_or_default()
                .to_string(),
            heading: info.heading.to_string(),
            subheading: best_code.to_string(),
            is_cbam_relevant,
            cbam_category,
            emission_factor,
            alternative_codes,
            matched_keywords,
            classification_notes,
        }
    }
}

/// Lowercase and collapse whitespace. Also the cache-key input.
fn normalize_text(text: &str) -> String {
    WHITESPACE_RE
        .replace_all(text.to_lowercase().trim(), " ")
        .into_owned()
}

/// Tokenize into a sorted word set: stop words and words of 2 or fewer
/// characters are stripped. A `BTreeSet` keeps match traces deterministic.
fn extract_tokens(normalized: &str) -> BTreeSet<String> {
    TOKEN_RE
        .find_iter(normalized)
        .map(|m| m.as_str().to_string())
        .filter(|w| w.len() > 2 && !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

fn score_all_codes(tokens: &BTreeSet<String>) -> Vec<ScoredCode> {
    if tokens.is_empty() {
        // No signal at all: degrade straight to the fallback code.
        return Vec::new();
    }
    cn_codes()
        .iter()
        .filter_map(|entry| {
            let (score, matched) = match_score(tokens, entry.code);
            (score > CANDIDATE_FLOOR).then(|| ScoredCode {
                code: entry.code,
                score,
                matched,
            })
        })
        .collect()
}

/// Score one code against the token set: +0.25 for an exact code match in a
/// keyword's candidate list, +0.10 for a chapter-level match. The raw sum is
/// normalized by `tokens × 0.15` (capped at 1.0), then boosted by match
/// count: 3+ keywords +0.15 (cap 0.98), 2 keywords +0.08 (cap 0.95).
fn match_score(tokens: &BTreeSet<String>, code: &str) -> (f64, Vec<String>) {
    let mut base_score = 0.0;
    let mut matched = Vec::new();

    for token in tokens {
        let Some(codes) = keyword_codes(token) else {
            continue;
        };
        if codes.contains(&code) {
            base_score += 0.25;
            matched.push(token.clone());
        } else if codes
            .iter()
            .any(|c| c.len() == 2 && code.starts_with(c))
        {
            base_score += 0.10;
            matched.push(format!("{token}(chapter)"));
        }
    }

    let mut score = (base_score / (tokens.len() as f64 * 0.15)).min(1.0);

    if matched.len() >= 3 {
        score = (score + 0.15).min(0.98);
    } else if matched.len() >= 2 {
        score = (score + 0.08).min(0.95);
    }

    (score, matched)
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
