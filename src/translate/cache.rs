use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use tracing::debug;

/// Size-bounded, TTL-bounded memo of source-text → translation lookups.
///
/// Eviction is insertion-ordered, not LRU: entries are never touched or
/// promoted on read, only inserted once, and the oldest insertion goes first
/// when capacity is exceeded. That is deliberately simpler than true LRU
/// recency tracking and close enough for short-lived subtitle text. Expired
/// entries are deleted lazily on lookup.
pub struct TranslationCache {
    entries: HashMap<CacheKey, CacheEntry>,
    insertion_order: VecDeque<CacheKey>,
    capacity: usize,
    ttl: Duration,
}

type CacheKey = (String, String);

struct CacheEntry {
    translated: String,
    inserted_at: Instant,
}

impl TranslationCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
            capacity,
            ttl,
        }
    }

    /// Normalized cache key: lower-cased trimmed source text + target language.
    fn key(text: &str, target_lang: &str) -> CacheKey {
        (text.trim().to_lowercase(), target_lang.to_string())
    }

    /// Look up a translation. Entries past their TTL are removed on access
    /// and reported as a miss.
    pub fn get(&mut self, text: &str, target_lang: &str, now: Instant) -> Option<String> {
        let key = Self::key(text, target_lang);
        match self.entries.get(&key) {
            Some(entry) if now.duration_since(entry.inserted_at) < self.ttl => {
                Some(entry.translated.clone())
            }
            Some(_) => {
                debug!("Cache entry expired for target '{}'", target_lang);
                self.entries.remove(&key);
                self.insertion_order.retain(|k| k != &key);
                None
            }
            None => None,
        }
    }

    /// Store a translation, evicting the oldest-inserted entry when full.
    pub fn insert(&mut self, text: &str, target_lang: &str, translated: String, now: Instant) {
        let key = Self::key(text, target_lang);

        if !self.entries.contains_key(&key) {
            while self.entries.len() >= self.capacity {
                match self.insertion_order.pop_front() {
                    Some(oldest) => {
                        self.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
            self.insertion_order.push_back(key.clone());
        }

        self.entries.insert(
            key,
            CacheEntry {
                translated,
                inserted_at: now,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_within_ttl() {
        let mut cache = TranslationCache::new(10, Duration::from_secs(300));
        let t0 = Instant::now();
        cache.insert("Ahoj", "en", "Hello".to_string(), t0);
        assert_eq!(cache.get("Ahoj", "en", t0), Some("Hello".to_string()));
    }

    #[test]
    fn test_key_normalization() {
        let mut cache = TranslationCache::new(10, Duration::from_secs(300));
        let t0 = Instant::now();
        cache.insert("  Ahoj ", "en", "Hello".to_string(), t0);
        assert_eq!(cache.get("ahoj", "en", t0), Some("Hello".to_string()));
        // Different target language is a different key
        assert_eq!(cache.get("ahoj", "de", t0), None);
    }

    #[test]
    fn test_expired_entry_is_miss_and_removed() {
        let mut cache = TranslationCache::new(10, Duration::from_secs(10));
        let t0 = Instant::now();
        cache.insert("Ahoj", "en", "Hello".to_string(), t0);

        let later = t0 + Duration::from_secs(11);
        assert_eq!(cache.get("Ahoj", "en", later), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insertion_order_eviction() {
        let mut cache = TranslationCache::new(3, Duration::from_secs(300));
        let t0 = Instant::now();
        cache.insert("one", "en", "1".to_string(), t0);
        cache.insert("two", "en", "2".to_string(), t0);
        cache.insert("three", "en", "3".to_string(), t0);

        // Reading "one" must NOT promote it; this is not an LRU
        assert!(cache.get("one", "en", t0).is_some());

        cache.insert("four", "en", "4".to_string(), t0);
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get("one", "en", t0), None);
        assert!(cache.get("four", "en", t0).is_some());
    }

    #[test]
    fn test_capacity_plus_one_keeps_capacity_entries() {
        let capacity = 5;
        let mut cache = TranslationCache::new(capacity, Duration::from_secs(300));
        let t0 = Instant::now();
        for i in 0..=capacity {
            cache.insert(&format!("text-{}", i), "en", format!("t-{}", i), t0);
        }
        assert_eq!(cache.len(), capacity);
        assert_eq!(cache.get("text-0", "en", t0), None);
    }

    #[test]
    fn test_reinsert_same_key_does_not_grow() {
        let mut cache = TranslationCache::new(3, Duration::from_secs(300));
        let t0 = Instant::now();
        cache.insert("one", "en", "1".to_string(), t0);
        cache.insert("one", "en", "1b".to_string(), t0);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("one", "en", t0), Some("1b".to_string()));
    }
}
