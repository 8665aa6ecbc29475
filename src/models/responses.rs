//! Response DTOs for the relay server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Bytes held by cached payloads
    pub total_bytes: usize,
    /// Audio bytes replayed from memory
    pub bytes_served: u64,
    /// Audio bytes fetched from the synthesis API
    pub bytes_fetched: u64,
    /// Cache capacity
    pub capacity: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// bytes_served / (bytes_served + bytes_fetched)
    pub byte_savings: f64,
    /// Open live connections
    pub live_connections: usize,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Projected voice entry for GET /voices?simple=true
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceSummary {
    pub id: String,
    pub name: String,
}

impl VoiceSummary {
    /// Projects the upstream `{"voices": [{"voice_id", "name", ..}]}` listing.
    ///
    /// Entries without a voice id are skipped.
    pub fn project(listing: &Value) -> Vec<VoiceSummary> {
        listing
            .get("voices")
            .and_then(Value::as_array)
            .map(|voices| {
                voices
                    .iter()
                    .filter_map(|voice| {
                        let id = voice.get("voice_id")?.as_str()?;
                        let name = voice.get("name").and_then(Value::as_str).unwrap_or(id);
                        Some(VoiceSummary {
                            id: id.to_string(),
                            name: name.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Acknowledgement returned to webhook senders
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub ok: bool,
    /// `delivered`, `dropped` or `ignored`
    pub outcome: &'static str,
}
