//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::DEFAULT_CAPACITY;
use crate::models::VoiceDefaults;

// == Defaults ==
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_ELEVEN_BASE_URL: &str = "https://api.elevenlabs.io";
pub(crate) const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";
pub(crate) const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;
const DEFAULT_VITAL_BASE_URL: &str = "https://api.tryvital.io";

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Maximum number of synthesized payloads kept in memory
    pub max_entries: usize,
    /// ElevenLabs API key sent as `xi-api-key`
    pub eleven_api_key: String,
    /// ElevenLabs API base URL
    pub eleven_base_url: String,
    /// Voice used when the caller does not pick one
    pub default_voice_id: String,
    /// Model used when the caller does not pick one
    pub default_model_id: String,
    /// Timeout in seconds applied to every outbound call
    pub upstream_timeout_secs: u64,
    /// Vital API key, the link-token route is disabled without it
    pub vital_api_key: Option<String>,
    /// Vital API base URL
    pub vital_base_url: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PORT` - HTTP server port (default: 5000)
    /// - `MAX_CACHE_ENTRIES` - Maximum cached payloads (default: 150)
    /// - `ELEVEN_API_KEY` - ElevenLabs API key (default: empty)
    /// - `ELEVENLABS_BASE_URL` - ElevenLabs base URL
    /// - `DEFAULT_VOICE_ID` / `DEFAULT_MODEL_ID` - synthesis defaults
    /// - `UPSTREAM_TIMEOUT_SECS` - outbound call timeout (default: 30)
    /// - `VITAL_API_KEY` / `VITAL_BASE_URL` - Vital link-token API
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            max_entries: env::var("MAX_CACHE_ENTRIES")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(DEFAULT_CAPACITY)
                .max(1),
            eleven_api_key: env::var("ELEVEN_API_KEY").unwrap_or_default(),
            eleven_base_url: env::var("ELEVENLABS_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_ELEVEN_BASE_URL.to_string()),
            default_voice_id: non_blank_var("DEFAULT_VOICE_ID")
                .unwrap_or_else(|| DEFAULT_VOICE_ID.to_string()),
            default_model_id: non_blank_var("DEFAULT_MODEL_ID")
                .unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            upstream_timeout_secs: env::var("UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            vital_api_key: non_blank_var("VITAL_API_KEY"),
            vital_base_url: env::var("VITAL_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_VITAL_BASE_URL.to_string()),
        }
    }

    /// Timeout applied to every outbound call.
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// Synthesis parameters filled in when the caller omits them.
    pub fn voice_defaults(&self) -> VoiceDefaults {
        VoiceDefaults {
            voice_id: self.default_voice_id.clone(),
            model_id: self.default_model_id.clone(),
            ..VoiceDefaults::default()
        }
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_PORT,
            max_entries: DEFAULT_CAPACITY,
            eleven_api_key: String::new(),
            eleven_base_url: DEFAULT_ELEVEN_BASE_URL.to_string(),
            default_voice_id: DEFAULT_VOICE_ID.to_string(),
            default_model_id: DEFAULT_MODEL_ID.to_string(),
            upstream_timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
            vital_api_key: None,
            vital_base_url: DEFAULT_VITAL_BASE_URL.to_string(),
        }
    }
}
