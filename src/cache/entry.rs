//! Cache Entry Module
//!
//! Defines the immutable audio payload stored per cache key.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::Bytes;

/// Content type of synthesized audio.
pub const AUDIO_MPEG: &str = "audio/mpeg";

// == Audio Entry ==
/// A synthesized audio payload.
///
/// Entries are created once and never mutated; cloning shares the buffer.
#[derive(Debug, Clone)]
pub struct AudioEntry {
    /// The audio bytes
    pub audio: Bytes,
    /// MIME type served with the payload
    pub content_type: String,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
}

impl AudioEntry {
    // == Constructor ==
    /// Creates a new entry for an MP3 payload.
    pub fn new(audio: Bytes) -> Self {
        Self::with_content_type(audio, AUDIO_MPEG)
    }

    pub fn with_content_type(audio: Bytes, content_type: impl Into<String>) -> Self {
        Self {
            audio,
            content_type: content_type.into(),
            created_at: current_timestamp_ms(),
        }
    }

    // == Size ==
    /// Payload length in bytes.
    pub fn size(&self) -> usize {
        self.audio.len()
    }

    /// Milliseconds since the entry was created.
    pub fn age_ms(&self) -> u64 {
        current_timestamp_ms().saturating_sub(self.created_at)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
