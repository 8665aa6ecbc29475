//! Recency Index Module
//!
//! Orders cached keys by last use so the store can find its eviction victim
//! in logarithmic time.

use std::collections::{BTreeMap, HashMap};

use super::CacheKey;

/// Last-use order over cache keys.
///
/// Every touch stamps the key with a fresh tick. The smallest live tick is
/// the least recently used key.
#[derive(Debug, Default)]
pub(crate) struct RecencyIndex {
    tick: u64,
    stamps: HashMap<CacheKey, u64>,
    by_tick: BTreeMap<u64, CacheKey>,
}

impl RecencyIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Marks `key` as just used, adding it if unseen.
    pub(crate) fn touch(&mut self, key: &CacheKey) {
        self.tick += 1;
        if let Some(old) = self.stamps.insert(key.clone(), self.tick) {
            self.by_tick.remove(&old);
        }
        self.by_tick.insert(self.tick, key.clone());
    }

    /// Removes and returns the least recently used key.
    pub(crate) fn pop_least_recent(&mut self) -> Option<CacheKey> {
        let (_, key) = self.by_tick.pop_first()?;
        self.stamps.remove(&key);
        Some(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.stamps.len()
    }
}
