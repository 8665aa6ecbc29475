//! Cache Module
//!
//! Bounded in-memory cache of synthesized audio keyed by canonical request.

mod entry;
mod key;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::{AudioEntry, AUDIO_MPEG};
pub use key::CacheKey;
pub use stats::CacheStats;
pub use store::AudioCache;

// == Public Constants ==
/// Default number of cached payloads
pub const DEFAULT_CAPACITY: usize = 150;
