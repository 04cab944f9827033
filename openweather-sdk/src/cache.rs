use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use crate::model::WeatherReport;

/// Cache capacity used by every client.
pub const DEFAULT_CAPACITY: usize = 10;

/// A cached report plus the epoch second it was fetched at.
///
/// Entries are replaced wholesale on refresh, never mutated in place.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub report: WeatherReport,
    pub fetched_at: i64,
}

/// Bounded map with least-recently-used eviction.
///
/// Both reads and writes count as a use. Every operation takes one short
/// internal lock; nothing here performs I/O, so the lock is never held
/// across an await point.
#[derive(Debug)]
pub struct WeatherCache {
    inner: Mutex<Inner>,
    capacity: usize,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    /// Keys ordered least- to most-recently used.
    order: VecDeque<String>,
}

impl Inner {
    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(key) = self.order.remove(pos) {
                self.order.push_back(key);
            }
        }
    }
}

impl WeatherCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("cache lock poisoned")
    }

    /// Look up an entry, marking it most-recently used.
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let mut inner = self.lock();
        let entry = inner.entries.get(key).cloned();
        if entry.is_some() {
            inner.touch(key);
        }
        entry
    }

    /// Insert or replace an entry, marking it most-recently used. When a
    /// new key would exceed capacity, the least-recently-used entry is
    /// evicted in the same critical section.
    pub fn put(&self, key: String, entry: CacheEntry) {
        let mut inner = self.lock();
        if inner.entries.insert(key.clone(), entry).is_some() {
            inner.touch(&key);
            return;
        }
        if inner.entries.len() > self.capacity {
            if let Some(evicted) = inner.order.pop_front() {
                inner.entries.remove(&evicted);
            }
        }
        inner.order.push_back(key);
    }

    /// Snapshot of the cached keys, least-recently used first.
    pub fn keys(&self) -> Vec<String> {
        self.lock().order.iter().cloned().collect()
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::normalize;
    use serde_json::json;

    fn entry(city: &str) -> CacheEntry {
        CacheEntry {
            report: normalize(json!({}), city),
            fetched_at: 1_690_000_000,
        }
    }

    #[test]
    fn get_returns_stored_entry() {
        let cache = WeatherCache::new(DEFAULT_CAPACITY);
        cache.put("London".to_string(), entry("London"));

        let found = cache.get("London").expect("entry must be present");
        assert_eq!(found.report.name, "London");
        assert!(cache.get("Paris").is_none());
    }

    #[test]
    fn size_never_exceeds_capacity() {
        let cache = WeatherCache::new(DEFAULT_CAPACITY);
        for i in 0..25 {
            let city = format!("city-{i}");
            cache.put(city.clone(), entry(&city));
            assert!(cache.len() <= DEFAULT_CAPACITY);
        }
        assert_eq!(cache.len(), DEFAULT_CAPACITY);
    }

    #[test]
    fn insert_beyond_capacity_evicts_least_recently_used() {
        let cache = WeatherCache::new(DEFAULT_CAPACITY);
        for i in 1..=10 {
            let city = format!("city-{i}");
            cache.put(city.clone(), entry(&city));
        }

        // Reading city-1 refreshes it, leaving city-2 as the oldest.
        assert!(cache.get("city-1").is_some());
        cache.put("city-11".to_string(), entry("city-11"));

        assert_eq!(cache.len(), DEFAULT_CAPACITY);
        assert!(cache.get("city-2").is_none());
        assert!(cache.get("city-1").is_some());
        assert!(cache.get("city-11").is_some());
    }

    #[test]
    fn replacing_an_entry_counts_as_a_use() {
        let cache = WeatherCache::new(2);
        cache.put("a".to_string(), entry("a"));
        cache.put("b".to_string(), entry("b"));
        cache.put("a".to_string(), entry("a"));
        cache.put("c".to_string(), entry("c"));

        assert!(cache.get("b").is_none());
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn keys_snapshot_is_ordered_oldest_first() {
        let cache = WeatherCache::new(DEFAULT_CAPACITY);
        cache.put("a".to_string(), entry("a"));
        cache.put("b".to_string(), entry("b"));
        cache.put("c".to_string(), entry("c"));
        assert!(cache.get("a").is_some());

        assert_eq!(cache.keys(), vec!["b", "c", "a"]);
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = WeatherCache::new(DEFAULT_CAPACITY);
        cache.put("a".to_string(), entry("a"));
        cache.put("b".to_string(), entry("b"));

        cache.clear();

        assert!(cache.is_empty());
        assert!(cache.keys().is_empty());
        assert!(cache.get("a").is_none());
    }
}
