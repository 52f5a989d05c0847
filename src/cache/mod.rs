use cached::{Cached, TimedCache, TimedSizedCache};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::domain::SearchResult;

type Key = String;
type Value = Arc<SearchResult>;

enum Store {
    Unbounded(TimedCache<Key, Value>),
    Bounded(TimedSizedCache<Key, Value>),
}

/// In-memory search results with a fixed time-to-live
///
/// Entries are replaced wholesale, never mutated. An expired entry reads as
/// a miss and is dropped on that read. With `max_entries` set the least
/// recently used entry makes room for a new one.
pub struct SearchCache {
    store: Mutex<Store>,
}

impl SearchCache {
    /// `ttl` is counted in whole seconds
    pub fn new(ttl: Duration, max_entries: Option<usize>) -> Self {
        let lifespan = ttl.as_secs();
        let store = match max_entries {
            Some(max) => Store::Bounded(TimedSizedCache::with_size_and_lifespan(max.max(1), lifespan)),
            None => Store::Unbounded(TimedCache::with_lifespan(lifespan)),
        };
        Self {
            store: Mutex::new(store),
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<SearchResult>> {
        let key = key.to_string();
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        match &mut *store {
            Store::Unbounded(cache) => cache.cache_get(&key).cloned(),
            Store::Bounded(cache) => cache.cache_get(&key).cloned(),
        }
    }

    /// Store `value` under `key`, replacing any previous entry and restarting its TTL
    pub fn put(&self, key: String, value: Arc<SearchResult>) {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        match &mut *store {
            Store::Unbounded(cache) => cache.cache_set(key, value),
            Store::Bounded(cache) => cache.cache_set(key, value),
        };
    }

    /// Stored entries, including expired ones not yet read
    pub fn len(&self) -> usize {
        let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        match &*store {
            Store::Unbounded(cache) => cache.cache_size(),
            Store::Bounded(cache) => cache.cache_size(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinate;
    use std::thread;

    const TTL: Duration = Duration::from_secs(600);

    fn result(label: &str) -> Arc<SearchResult> {
        Arc::new(SearchResult {
            search_center: Coordinate::new(50.45, 30.52),
            bakeries: Vec::new(),
            source_label: label.to_string(),
        })
    }

    #[test]
    fn test_get_within_ttl() {
        let cache = SearchCache::new(TTL, None);
        cache.put("kyiv".to_string(), result("a"));

        assert_eq!(cache.get("kyiv").unwrap().source_label, "a");
        assert!(cache.get("lviv").is_none());
    }

    #[test]
    fn test_expired_entry_is_a_miss_and_removed() {
        let cache = SearchCache::new(Duration::from_secs(1), None);
        cache.put("kyiv".to_string(), result("a"));
        assert!(cache.get("kyiv").is_some());

        thread::sleep(Duration::from_millis(1100));
        assert!(cache.get("kyiv").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_bounded_entry_expires() {
        let cache = SearchCache::new(Duration::from_secs(1), Some(4));
        cache.put("kyiv".to_string(), result("a"));

        thread::sleep(Duration::from_millis(1100));
        assert!(cache.get("kyiv").is_none());
    }

    #[test]
    fn test_put_replaces_entry() {
        let cache = SearchCache::new(TTL, None);
        cache.put("kyiv".to_string(), result("old"));
        cache.put("kyiv".to_string(), result("new"));

        assert_eq!(cache.get("kyiv").unwrap().source_label, "new");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_hits_share_the_stored_value() {
        let cache = SearchCache::new(TTL, None);
        let stored = result("a");
        cache.put("kyiv".to_string(), stored.clone());

        assert!(Arc::ptr_eq(&stored, &cache.get("kyiv").unwrap()));
    }

    #[test]
    fn test_bounded_evicts_least_recently_used() {
        let cache = SearchCache::new(TTL, Some(2));
        cache.put("a".to_string(), result("a"));
        cache.put("b".to_string(), result("b"));
        assert!(cache.get("a").is_some());
        cache.put("c".to_string(), result("c"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("b").is_none());
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_bounded_replace_does_not_evict() {
        let cache = SearchCache::new(TTL, Some(2));
        cache.put("a".to_string(), result("a"));
        cache.put("b".to_string(), result("b"));
        cache.put("a".to_string(), result("a2"));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a").unwrap().source_label, "a2");
        assert!(cache.get("b").is_some());
    }

    #[test]
    fn test_zero_capacity_still_holds_one_entry() {
        let cache = SearchCache::new(TTL, Some(0));
        cache.put("a".to_string(), result("a"));
        assert!(cache.get("a").is_some());
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let cache = SearchCache::new(Duration::from_secs(u64::MAX), None);
        cache.put("a".to_string(), result("a"));
        assert!(cache.get("a").is_some());

        let cache = SearchCache::new(Duration::MAX, Some(2));
        cache.put("a".to_string(), result("a"));
        assert!(cache.get("a").is_some());
    }

    #[test]
    fn test_concurrent_readers_and_writers() {
        let cache = SearchCache::new(TTL, None);
        thread::scope(|s| {
            for t in 0..8 {
                let cache = &cache;
                s.spawn(move || {
                    for i in 0..100 {
                        let key = format!("k{}", i % 10);
                        cache.put(key.clone(), result(&format!("{t}-{i}")));
                        assert!(cache.get(&key).is_some());
                    }
                });
            }
        });
        assert_eq!(cache.len(), 10);
    }
}
