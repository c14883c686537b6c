use std::collections::{HashMap, VecDeque};

use sha2::{Digest, Sha256};

use super::types::ClassificationResult;

/// Default number of cached classifications.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Bounded FIFO cache for classification results, keyed by a digest of the
/// normalized description. Owned by the [`super::Classifier`] instance —
/// no process-wide state. Results are pure functions of the input, so
/// overwriting an existing key is idempotent.
#[derive(Debug, Default)]
pub struct ClassificationCache {
    entries: HashMap<String, ClassificationResult>,
    order: VecDeque<String>,
    capacity: usize,
}

impl ClassificationCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Cache key: hex SHA-256 of the normalized (lowercased,
    /// whitespace-collapsed) description.
    pub fn key_for(normalized_text: &str) -> String {
        let digest = Sha256::digest(normalized_text.as_bytes());
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }

    pub fn get(&self, key: &str) -> Option<&ClassificationResult> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: String, result: ClassificationResult) {
        if !self.entries.contains_key(&key) {
            if self.order.len() >= self.capacity {
                if let Some(oldest) = self.order.pop_front() {
                    self.entries.remove(&oldest);
                }
            }
            self.order.push_back(key.clone());
        }
        self.entries.insert(key, result);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ReviewStatus;

    fn dummy(code: &str) -> ClassificationResult {
        ClassificationResult {
            cn_code: code.into(),
            cn_code_formatted: code.into(),
            cn_description: String::new(),
            confidence: 0.5,
            review_status: ReviewStatus::NeedsReview,
            chapter: "73".into(),
            chapter_description: String::new(),
            heading: "7318".into(),
            subheading: code.into(),
            is_cbam_relevant: true,
            cbam_category: None,
            emission_factor: None,
            alternative_codes: vec![],
            matched_keywords: vec![],
            classification_notes: vec![],
        }
    }

    #[test]
    fn key_is_stable_for_normalized_text() {
        assert_eq!(
            ClassificationCache::key_for("steel coil"),
            ClassificationCache::key_for("steel coil")
        );
        assert_ne!(
            ClassificationCache::key_for("steel coil"),
            ClassificationCache::key_for("steel coils")
        );
    }

    #[test]
    fn insert_then_get() {
        let mut cache = ClassificationCache::new(4);
        cache.insert("k".into(), dummy("73181500"));
        assert_eq!(cache.get("k").unwrap().cn_code, "73181500");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn fifo_eviction_at_capacity() {
        let mut cache = ClassificationCache::new(2);
        cache.insert("a".into(), dummy("1"));
        cache.insert("b".into(), dummy("2"));
        cache.insert("c".into(), dummy("3"));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none(), "oldest entry evicted");
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn reinsert_same_key_does_not_evict() {
        let mut cache = ClassificationCache::new(2);
        cache.insert("a".into(), dummy("1"));
        cache.insert("b".into(), dummy("2"));
        cache.insert("a".into(), dummy("1"));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("b").is_some());
    }

    #[test]
    fn clear_empties_cache() {
        let mut cache = ClassificationCache::new(2);
        cache.insert("a".into(), dummy("1"));
        cache.clear();
        assert!(cache.is_empty());
    }
}
