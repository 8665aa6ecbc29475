//! Cache Key Module
//!
//! Canonical fingerprint of a resolved synthesis request.

use serde_json::json;

use crate::models::SynthesisRequest;

// == Cache Key ==
/// Deterministic string key for a synthesis request.
///
/// Built from a fixed, ordered field list so that two semantically identical
/// requests always map to the same key, whatever order the caller sent the
/// fields in and whether defaults were spelled out or omitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Canonicalizes a resolved request.
    ///
    /// Field order: text, voice, model, stability, similarity boost, style,
    /// speaker boost. A JSON array keeps the encoding unambiguous for text
    /// containing separators or quotes.
    pub fn from_request(req: &SynthesisRequest) -> Self {
        let settings = &req.voice_settings;
        let canonical = json!([
            req.text,
            req.voice_id,
            req.model_id,
            settings.stability,
            settings.similarity_boost,
            settings.style,
            settings.use_speaker_boost,
        ]);
        Self(canonical.to_string())
    }
}

// Raw keys for exercising the store directly
#[cfg(test)]
impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
