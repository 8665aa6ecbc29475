//! Audio Cache Module
//!
//! Bounded in-memory map from canonical request key to synthesized audio,
//! with least-recently-used eviction.

use std::collections::HashMap;

use tracing::debug;

use super::lru::RecencyIndex;
use super::{AudioEntry, CacheKey, CacheStats};

// == Audio Cache ==
/// Bounded audio cache.
///
/// Invariant: `len() <= capacity()` once any `put` has returned.
#[derive(Debug)]
pub struct AudioCache {
    entries: HashMap<CacheKey, AudioEntry>,
    recency: RecencyIndex,
    stats: CacheStats,
    capacity: usize,
}

impl AudioCache {
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` payloads.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            recency: RecencyIndex::new(),
            stats: CacheStats::new(),
            capacity: capacity.max(1),
        }
    }

    // == Get ==
    /// Returns the payload stored under `key`.
    ///
    /// A hit counts as a fresh use for eviction purposes. Never changes size.
    pub fn get(&mut self, key: &CacheKey) -> Option<AudioEntry> {
        let Some(entry) = self.entries.get(key) else {
            self.stats.on_miss();
            return None;
        };
        self.stats.on_hit(entry);
        let entry = entry.clone();
        self.recency.touch(key);
        Some(entry)
    }

    // == Put ==
    /// Inserts or replaces the payload for `key`, then evicts the least
    /// recently used entries until the capacity bound holds again.
    pub fn put(&mut self, key: CacheKey, entry: AudioEntry) {
        self.recency.touch(&key);
        let previous = self.entries.insert(key, entry.clone());
        self.stats.on_insert(&entry, previous.as_ref());

        while self.entries.len() > self.capacity {
            let Some(victim) = self.recency.pop_least_recent() else {
                break;
            };
            if let Some(evicted) = self.entries.remove(&victim) {
                self.stats.on_evict(&evicted);
                debug!(bytes = evicted.size(), "Evicted cached audio");
            }
        }
        debug_assert_eq!(self.recency.len(), self.entries.len());
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;

    fn key(s: &str) -> CacheKey {
        CacheKey::from(s)
    }

    fn audio(s: &'static str) -> AudioEntry {
        AudioEntry::new(Bytes::from_static(s.as_bytes()))
    }

    #[test]
    fn test_cache_new() {
        let cache = AudioCache::new(150);
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 150);
        assert_eq!(AudioCache::new(0).capacity(), 1);
    }

    #[test]
    fn test_put_and_get() {
        let mut cache = AudioCache::new(10);

        cache.put(key("k1"), audio("mp3-bytes"));
        let entry = cache.get(&key("k1")).unwrap();

        assert_eq!(&entry.audio[..], b"mp3-bytes");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_missing() {
        let mut cache = AudioCache::new(10);
        assert!(cache.get(&key("nope")).is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_repeated_get_keeps_size() {
        let mut cache = AudioCache::new(10);
        cache.put(key("k1"), audio("a"));
        cache.put(key("k2"), audio("b"));

        for _ in 0..5 {
            assert!(cache.get(&key("k1")).is_some());
        }
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_replace_keeps_single_entry() {
        let mut cache = AudioCache::new(10);

        cache.put(key("k1"), audio("first"));
        cache.put(key("k1"), audio("second!"));

        assert_eq!(cache.len(), 1);
        assert_eq!(&cache.get(&key("k1")).unwrap().audio[..], b"second!");
        assert_eq!(cache.stats().total_bytes, 7);
    }

    #[test]
    fn test_capacity_eviction() {
        let mut cache = AudioCache::new(3);

        cache.put(key("k1"), audio("1"));
        cache.put(key("k2"), audio("2"));
        cache.put(key("k3"), audio("3"));
        cache.put(key("k4"), audio("4"));

        assert_eq!(cache.len(), 3);
        assert!(!cache.contains(&key("k1")));
        assert!(cache.contains(&key("k2")));
        assert!(cache.contains(&key("k4")));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_get_refreshes_recency() {
        let mut cache = AudioCache::new(3);

        cache.put(key("k1"), audio("1"));
        cache.put(key("k2"), audio("2"));
        cache.put(key("k3"), audio("3"));

        cache.get(&key("k1"));
        cache.put(key("k4"), audio("4"));

        assert!(cache.contains(&key("k1")));
        assert!(!cache.contains(&key("k2")));
    }

    #[test]
    fn test_stats_track_bytes() {
        let mut cache = AudioCache::new(2);

        cache.put(key("k1"), audio("aaaa"));
        cache.put(key("k2"), audio("bb"));
        cache.put(key("k3"), audio("c"));

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.total_bytes, 3);
        assert_eq!(stats.bytes_fetched, 7);
    }

    #[test]
    fn test_hits_count_replayed_bytes() {
        let mut cache = AudioCache::new(4);
        cache.put(key("k1"), audio("0123456789"));

        cache.get(&key("k1"));
        cache.get(&key("k1"));
        cache.get(&key("missing"));

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.bytes_served, 20);
    }
}
