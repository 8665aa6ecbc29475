//! API Handlers
//!
//! HTTP request handlers for the synthesis, voice listing and status
//! endpoints.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    body::{Body, Bytes},
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::cache::{AudioCache, AudioEntry, CacheKey, AUDIO_MPEG};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{
    HealthResponse, StatsResponse, TtsParams, VoiceDefaults, VoiceSummary, VoicesQuery,
};
use crate::range;
use crate::relay::ConnectionRegistry;
use crate::upstream::{ElevenLabsClient, SpeechProvider, VitalClient};

/// Application state shared across all handlers.
///
/// Every service is built once and injected here; handlers own no globals.
#[derive(Clone)]
pub struct AppState {
    /// Bounded audio cache
    pub cache: Arc<RwLock<AudioCache>>,
    /// Live connections keyed by user id
    pub registry: ConnectionRegistry,
    /// Synthesis API
    pub speech: Arc<dyn SpeechProvider>,
    /// Link-token API, absent when no key is configured
    pub vital: Option<Arc<VitalClient>>,
    /// Parameters applied when a request leaves them out
    pub defaults: Arc<VoiceDefaults>,
}

impl AppState {
    /// Creates a new AppState with the given cache and synthesis provider.
    pub fn new(cache: AudioCache, speech: Arc<dyn SpeechProvider>) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            registry: ConnectionRegistry::new(),
            speech,
            vital: None,
            defaults: Arc::new(VoiceDefaults::default()),
        }
    }

    pub fn with_vital(mut self, vital: VitalClient) -> Self {
        self.vital = Some(Arc::new(vital));
        self
    }

    pub fn with_defaults(mut self, defaults: VoiceDefaults) -> Self {
        self.defaults = Arc::new(defaults);
        self
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds the outbound clients with the configured timeout.
    pub fn from_config(config: &Config) -> Result<Self> {
        let speech = ElevenLabsClient::new(
            config.eleven_api_key.clone(),
            config.eleven_base_url.clone(),
            config.upstream_timeout(),
        )?;
        let mut state = Self::new(AudioCache::new(config.max_entries), Arc::new(speech))
            .with_defaults(config.voice_defaults());

        if let Some(key) = &config.vital_api_key {
            let vital = VitalClient::new(
                key.clone(),
                config.vital_base_url.clone(),
                config.upstream_timeout(),
            )?;
            state = state.with_vital(vital);
        }

        Ok(state)
    }
}

/// Handler for GET /
pub async fn root_handler() -> &'static str {
    "TTS server is running!"
}

/// Handler for GET /tts and GET /tts.mp3
pub async fn tts_get_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: std::result::Result<Query<TtsParams>, QueryRejection>,
) -> Result<Response> {
    let Query(params) = query?;
    synthesize_cached(&state, params, &headers).await
}

/// Handler for POST /tts
///
/// The body is read as JSON whatever the declared content type; an empty
/// body carries no text and is rejected as such.
pub async fn tts_post_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let params = parse_tts_body(&body)?;
    synthesize_cached(&state, params, &headers).await
}

fn parse_tts_body(body: &[u8]) -> Result<TtsParams> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(TtsParams::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::InvalidRequest(format!("invalid JSON body: {}", e)))
}

/// Serves synthesized audio from the cache, calling upstream on a miss.
///
/// The lock is not held across the upstream call, so two concurrent misses
/// for one key both fetch and the later insert wins.
async fn synthesize_cached(state: &AppState, params: TtsParams, headers: &HeaderMap) -> Result<Response> {
    let request = params.resolve(&state.defaults)?;
    let key = CacheKey::from_request(&request);

    let cached = state.cache.write().await.get(&key);
    let entry = match cached {
        Some(entry) => {
            debug!(bytes = entry.size(), age_ms = entry.age_ms(), "Serving cached audio");
            entry
        }
        None => {
            let audio = state.speech.synthesize(&request).await?;
            let entry = AudioEntry::new(audio);
            debug!(bytes = entry.size(), "Caching synthesized audio");
            state.cache.write().await.put(key, entry.clone());
            entry
        }
    };

    Ok(range::serve_bytes(entry.audio, &entry.content_type, headers))
}

/// Handler for GET /tts/stream
///
/// Bypasses the cache and relays upstream chunks as they arrive.
pub async fn tts_stream_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<TtsParams>, QueryRejection>,
) -> Result<Response> {
    let Query(params) = query?;
    let request = params.resolve(&state.defaults)?;
    let stream = state.speech.stream(&request).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, AUDIO_MPEG),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

/// Handler for GET /voices
///
/// `?simple=true` projects the listing to `[{id, name}]`.
pub async fn voices_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<VoicesQuery>, QueryRejection>,
) -> Result<Response> {
    let Query(query) = query?;
    let listing = state.speech.list_voices().await?;

    if query.simple.unwrap_or(false) {
        Ok(Json(VoiceSummary::project(&listing)).into_response())
    } else {
        Ok(Json(listing).into_response())
    }
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let (stats, capacity) = {
        let cache = state.cache.read().await;
        (cache.stats(), cache.capacity())
    };

    Json(StatsResponse {
        hits: stats.hits,
        misses: stats.misses,
        evictions: stats.evictions,
        total_entries: stats.total_entries,
        total_bytes: stats.total_bytes,
        bytes_served: stats.bytes_served,
        bytes_fetched: stats.bytes_fetched,
        capacity,
        hit_rate: stats.hit_rate(),
        byte_savings: stats.byte_savings(),
        live_connections: state.registry.len().await,
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::AudioStream;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSpeech {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SpeechProvider for CountingSpeech {
        async fn synthesize(&self, req: &crate::models::SynthesisRequest) -> Result<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Bytes::from(format!("audio:{}", req.text)))
        }

        async fn stream(&self, _req: &crate::models::SynthesisRequest) -> Result<AudioStream> {
            Err(AppError::Upstream("no streaming".into()))
        }

        async fn list_voices(&self) -> Result<Value> {
            Ok(json!({"voices": [{"voice_id": "v1", "name": "One"}]}))
        }
    }

    fn state_with(speech: Arc<CountingSpeech>) -> AppState {
        AppState::new(AudioCache::new(10), speech)
    }

    fn text(t: &str) -> TtsParams {
        TtsParams {
            text: Some(t.to_string()),
            ..TtsParams::default()
        }
    }

    #[tokio::test]
    async fn test_second_request_is_served_from_cache() {
        let speech = Arc::new(CountingSpeech::default());
        let state = state_with(speech.clone());

        for _ in 0..3 {
            let response =
                tts_get_handler(State(state.clone()), HeaderMap::new(), Ok(Query(text("hi"))))
                    .await
                    .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        assert_eq!(speech.calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.cache.read().await.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_text_skips_upstream() {
        let speech = Arc::new(CountingSpeech::default());
        let state = state_with(speech.clone());

        let body = Bytes::from_static(br#"{"text":"   "}"#);
        let result = tts_post_handler(State(state), HeaderMap::new(), body).await;

        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        assert_eq!(speech.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_post_body_reports_missing_text() {
        let speech = Arc::new(CountingSpeech::default());
        let state = state_with(speech.clone());

        let result = tts_post_handler(State(state), HeaderMap::new(), Bytes::new()).await;

        match result {
            Err(AppError::InvalidRequest(msg)) => assert_eq!(msg, "No text provided"),
            other => panic!("expected InvalidRequest, got {:?}", other.map(|r| r.status())),
        }
        assert_eq!(speech.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_parse_tts_body_rejects_wrong_types() {
        assert!(matches!(
            parse_tts_body(br#"{"text":"hi","stability":"0.5"}"#),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            parse_tts_body(b"not json"),
            Err(AppError::InvalidRequest(_))
        ));
        let params = parse_tts_body(br#"{"text":"hi","stability":0.5}"#).unwrap();
        assert_eq!(params.stability, Some(0.5));
    }

    #[tokio::test]
    async fn test_stream_error_propagates() {
        let state = state_with(Arc::new(CountingSpeech::default()));
        let result = tts_stream_handler(State(state), Ok(Query(text("hi")))).await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_voices_simple_projection() {
        let state = state_with(Arc::new(CountingSpeech::default()));

        let query = Ok(Query(VoicesQuery { simple: Some(true) }));
        let response = voices_handler(State(state), query).await.unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!([{"id": "v1", "name": "One"}]));
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = state_with(Arc::new(CountingSpeech::default()));

        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.capacity, 10);
        assert_eq!(response.live_connections, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_from_config_without_vital_key() {
        let state = AppState::from_config(&Config::default()).unwrap();
        assert!(state.vital.is_none());
        assert_eq!(state.cache.read().await.capacity(), 150);

        let with_key = Config {
            vital_api_key: Some("vk".to_string()),
            ..Config::default()
        };
        assert!(AppState::from_config(&with_key).unwrap().vital.is_some());
    }
}
