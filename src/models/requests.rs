//! Request DTOs for the relay server API
//!
//! Defines the structure of incoming query strings and HTTP request bodies,
//! and the resolved synthesis request sent upstream.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_MODEL_ID, DEFAULT_VOICE_ID};
use crate::error::{AppError, Result};

/// Synthesis parameters applied when the caller leaves them out.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceDefaults {
    pub voice_id: String,
    pub model_id: String,
    pub stability: f64,
    pub similarity_boost: f64,
    pub style: f64,
    pub use_speaker_boost: bool,
}

impl Default for VoiceDefaults {
    fn default() -> Self {
        Self {
            voice_id: DEFAULT_VOICE_ID.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            stability: 0.4,
            similarity_boost: 0.85,
            style: 0.0,
            use_speaker_boost: true,
        }
    }
}

/// Caller-supplied synthesis parameters (GET /tts query or POST /tts body)
///
/// Every field but `text` is optional and falls back to [`VoiceDefaults`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TtsParams {
    /// Text to synthesize
    #[serde(default)]
    pub text: Option<String>,
    /// Voice identifier
    #[serde(default, alias = "voice_id")]
    pub voice: Option<String>,
    /// Model identifier
    #[serde(default, alias = "model_id")]
    pub model: Option<String>,
    #[serde(default)]
    pub stability: Option<f64>,
    #[serde(default, alias = "similarity_boost")]
    pub similarity: Option<f64>,
    #[serde(default)]
    pub style: Option<f64>,
    #[serde(default)]
    pub use_speaker_boost: Option<bool>,
}

impl TtsParams {
    /// Validates the parameters and fills in defaults.
    ///
    /// Blank text is rejected before anything is sent upstream.
    pub fn resolve(self, defaults: &VoiceDefaults) -> Result<SynthesisRequest> {
        let text = self.text.unwrap_or_default();
        if text.trim().is_empty() {
            return Err(AppError::InvalidRequest("No text provided".to_string()));
        }

        let voice_settings = VoiceSettings {
            stability: unit_interval("stability", self.stability, defaults.stability)?,
            similarity_boost: unit_interval(
                "similarity",
                self.similarity,
                defaults.similarity_boost,
            )?,
            style: unit_interval("style", self.style, defaults.style)?,
            use_speaker_boost: self.use_speaker_boost.unwrap_or(defaults.use_speaker_boost),
        };

        Ok(SynthesisRequest {
            text,
            voice_id: non_blank(self.voice).unwrap_or_else(|| defaults.voice_id.clone()),
            model_id: non_blank(self.model).unwrap_or_else(|| defaults.model_id.clone()),
            voice_settings,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn unit_interval(name: &str, value: Option<f64>, default: f64) -> Result<f64> {
    match value {
        None => Ok(default),
        // Adding +0.0 folds -0.0 into 0.0 so both spellings share a cache key
        Some(v) if v.is_finite() && (0.0..=1.0).contains(&v) => Ok(v + 0.0),
        Some(v) => Err(AppError::InvalidRequest(format!(
            "{} must be between 0 and 1, got {}",
            name, v
        ))),
    }
}

/// Voice tuning parameters forwarded to the synthesis API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceSettings {
    pub stability: f64,
    pub similarity_boost: f64,
    pub style: f64,
    pub use_speaker_boost: bool,
}

/// Fully resolved synthesis request.
///
/// Serializes to the upstream request body; the voice travels in the URL path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesisRequest {
    pub text: String,
    #[serde(skip)]
    pub voice_id: String,
    pub model_id: String,
    pub voice_settings: VoiceSettings,
}

/// Query string for GET /voices
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoicesQuery {
    /// Project the upstream list down to `{id, name}` pairs
    #[serde(default)]
    pub simple: Option<bool>,
}

/// Request body for POST /vital/link-token
#[derive(Debug, Clone, Deserialize)]
pub struct LinkTokenRequest {
    #[serde(alias = "userId")]
    pub user_id: String,
}

/// Query string for the live socket upgrade (GET /ws)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SocketParams {
    #[serde(default, rename = "userId")]
    pub user_id: Option<String>,
}

impl SocketParams {
    /// Returns the trimmed identifier, or None when missing or blank.
    pub fn client_id(&self) -> Option<&str> {
        self.user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}
