//! Webhook Event Module
//!
//! Inbound fitness-provider webhook envelope and the normalized metric record
//! pushed to live connections.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Event types that produce a metric update.
pub const RECOGNIZED_EVENTS: [&str; 2] = ["daily.data.activity.created", "daily.data.workouts.created"];

// == Webhook Event ==
/// Webhook envelope: a type tag plus a nested data object.
///
/// Every field is optional. A missing or unusable tag leaves the event
/// unrecognized rather than rejecting the delivery.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub event_type: String,
    #[serde(default, deserialize_with = "lenient_id")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub client_user_id: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl WebhookEvent {
    /// Reads an envelope from any JSON value.
    ///
    /// Values that do not fit the envelope shape (arrays, scalars, a
    /// non-string tag) yield an empty, unrecognized event.
    pub fn from_envelope(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    pub fn is_recognized(&self) -> bool {
        RECOGNIZED_EVENTS.contains(&self.event_type.as_str())
    }

    /// Identifier of the live connection this event is addressed to.
    ///
    /// `user_id` first, then `client_user_id`; blank values are skipped.
    pub fn target(&self) -> Option<&str> {
        [self.user_id.as_deref(), self.client_user_id.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|id| !id.is_empty())
    }
}

// == Metric Update ==
/// Normalized metrics extracted from an activity or workout record.
///
/// Every field is optional; absent source fields serialize as null.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricUpdate {
    pub heart_rate: Option<f64>,
    pub pace_sec_per_km: Option<f64>,
    pub distance_km: Option<f64>,
    pub elapsed_time_sec: Option<f64>,
    pub calories: Option<f64>,
    pub start_time: Option<String>,
}

impl MetricUpdate {
    /// Extracts the metric record from an event's `data` object.
    pub fn from_event_data(data: &Value) -> Self {
        let distance = number(data, "distance");
        let moving_time = number(data, "moving_time");

        let pace_sec_per_km = match (moving_time, distance) {
            (Some(time), Some(meters)) if meters != 0.0 => Some(time / (meters / 1000.0)),
            _ => None,
        };

        Self {
            heart_rate: number(data, "average_hr").or_else(|| number(data, "hr_avg")),
            pace_sec_per_km,
            distance_km: distance.map(|meters| meters / 1000.0),
            elapsed_time_sec: number(data, "active_duration").or_else(|| number(data, "duration")),
            calories: number(data, "calories_total")
                .or_else(|| number(data, "active_calories")),
            start_time: data
                .get("calendar_date")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

/// Accepts string or numeric identifiers; anything else counts as absent.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(id) => Some(id),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    })
}

fn number(data: &Value, field: &str) -> Option<f64> {
    data.get(field).and_then(Value::as_f64)
}

/// Message written to a live connection.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayMessage {
    Metrics {
        event_type: String,
        data: MetricUpdate,
    },
}
