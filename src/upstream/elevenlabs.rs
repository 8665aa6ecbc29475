//! ElevenLabs client.
//!
//! See: <https://elevenlabs.io/docs/api-reference/text-to-speech>

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use futures_util::{StreamExt, TryStreamExt};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{upstream_failure, AudioStream, SpeechProvider};
use crate::error::{AppError, Result};
use crate::models::SynthesisRequest;

const SOURCE: &str = "ElevenLabs";

/// Client for the ElevenLabs REST API.
#[derive(Clone)]
pub struct ElevenLabsClient {
    api_key: String,
    http: Client,
    base_url: String,
}

impl ElevenLabsClient {
    /// Creates a client; every request is bounded by `timeout`.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: api_key.into(),
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post_tts(&self, req: &SynthesisRequest, path_suffix: &str) -> Result<reqwest::Response> {
        let url = format!(
            "{}/v1/text-to-speech/{}{}",
            self.base_url, req.voice_id, path_suffix
        );
        debug!(voice = %req.voice_id, model = %req.model_id, "Calling ElevenLabs");

        let response = self
            .http
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header("accept", "audio/mpeg")
            .json(req)
            .send()
            .await
            .map_err(|e| AppError::from_transport(SOURCE, e))?;

        if !response.status().is_success() {
            return Err(upstream_failure(SOURCE, response).await);
        }
        Ok(response)
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabsClient {
    async fn synthesize(&self, req: &SynthesisRequest) -> Result<Bytes> {
        self.post_tts(req, "")
            .await?
            .bytes()
            .await
            .map_err(|e| AppError::from_transport(SOURCE, e))
    }

    async fn stream(&self, req: &SynthesisRequest) -> Result<AudioStream> {
        let response = self.post_tts(req, "/stream").await?;
        Ok(response
            .bytes_stream()
            .map_err(|e| AppError::from_transport(SOURCE, e))
            .boxed())
    }

    async fn list_voices(&self) -> Result<Value> {
        let url = format!("{}/v1/voices", self.base_url);

        let response = self
            .http
            .get(&url)
            .header("xi-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::from_transport(SOURCE, e))?;

        if !response.status().is_success() {
            return Err(upstream_failure(SOURCE, response).await);
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("{} returned invalid JSON: {}", SOURCE, e)))
    }
}
