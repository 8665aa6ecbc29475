//! Cache Statistics Module
//!
//! Counts how much synthesis traffic the cache absorbs: requests answered
//! from memory, the audio bytes that did not have to be fetched again, and
//! what the capacity bound pushed out.

use serde::Serialize;

use super::AudioEntry;

// == Cache Stats ==
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Requests answered without an upstream call
    pub hits: u64,
    /// Requests that had to be synthesized upstream
    pub misses: u64,
    /// Payloads dropped by the capacity bound
    pub evictions: u64,
    /// Audio bytes served from memory
    pub bytes_served: u64,
    /// Audio bytes stored after an upstream call
    pub bytes_fetched: u64,
    /// Payloads currently held
    pub total_entries: usize,
    /// Bytes currently held
    pub total_bytes: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of lookups answered from memory, 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        ratio(self.hits, self.hits + self.misses)
    }

    /// Share of all audio handed out that was replayed rather than paid for.
    pub fn byte_savings(&self) -> f64 {
        ratio(self.bytes_served, self.bytes_served + self.bytes_fetched)
    }

    pub(crate) fn on_hit(&mut self, entry: &AudioEntry) {
        self.hits += 1;
        self.bytes_served += entry.size() as u64;
    }

    pub(crate) fn on_miss(&mut self) {
        self.misses += 1;
    }

    /// Accounts a stored payload, net of the one it replaced under the same key.
    pub(crate) fn on_insert(&mut self, entry: &AudioEntry, replaced: Option<&AudioEntry>) {
        self.bytes_fetched += entry.size() as u64;
        self.total_bytes += entry.size();
        match replaced {
            Some(previous) => self.total_bytes -= previous.size(),
            None => self.total_entries += 1,
        }
    }

    pub(crate) fn on_evict(&mut self, entry: &AudioEntry) {
        self.evictions += 1;
        self.total_entries -= 1;
        self.total_bytes -= entry.size();
    }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
