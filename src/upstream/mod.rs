//! Upstream Module
//!
//! Outbound clients for the synthesis and fitness-data APIs.

mod elevenlabs;
mod vital;

use async_trait::async_trait;
use axum::body::Bytes;
use futures_util::stream::BoxStream;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::SynthesisRequest;

pub use elevenlabs::ElevenLabsClient;
pub use vital::VitalClient;

/// Chunked audio as it arrives from the synthesis API.
pub type AudioStream = BoxStream<'static, std::result::Result<Bytes, AppError>>;

/// Text-to-speech provider used by the HTTP handlers.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesizes the whole payload in one call.
    async fn synthesize(&self, req: &SynthesisRequest) -> Result<Bytes>;

    /// Starts a streaming synthesis; the stream yields audio as produced.
    async fn stream(&self, req: &SynthesisRequest) -> Result<AudioStream>;

    /// Returns the raw voice listing.
    async fn list_voices(&self) -> Result<Value>;
}

/// Reads an error body and wraps it, keeping the upstream text verbatim.
async fn upstream_failure(source: &str, response: reqwest::Response) -> AppError {
    let status = response.status();
    match response.text().await {
        Ok(body) if !body.is_empty() => AppError::Upstream(format!("{} error: {}", source, body)),
        _ => AppError::Upstream(format!("{} error: HTTP {}", source, status)),
    }
}
