//! Relay Module
//!
//! Pushes normalized fitness metrics from inbound webhooks to the live socket
//! registered for the addressed user. Delivery is at most once: events for
//! users without an open connection are dropped.

mod event;
mod registry;
pub mod session;

pub use event::{MetricUpdate, RelayMessage, WebhookEvent, RECOGNIZED_EVENTS};
pub use registry::{ConnectionRegistry, Registration};

use tracing::{debug, info};

use crate::error::{AppError, Result};

/// What happened to one webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Pushed to an open connection
    Delivered,
    /// Recognized, but no open connection for the target
    Dropped,
    /// Event type outside the recognized set
    Ignored,
}

impl DispatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::Delivered => "delivered",
            DispatchOutcome::Dropped => "dropped",
            DispatchOutcome::Ignored => "ignored",
        }
    }
}

/// Normalizes a recognized event and relays it to its target connection.
pub async fn dispatch(registry: &ConnectionRegistry, event: &WebhookEvent) -> Result<DispatchOutcome> {
    if !event.is_recognized() {
        debug!(event_type = %event.event_type, "Ignoring webhook event");
        return Ok(DispatchOutcome::Ignored);
    }

    let Some(target) = event.target() else {
        debug!(event_type = %event.event_type, "Webhook event has no user id");
        return Ok(DispatchOutcome::Dropped);
    };

    let message = RelayMessage::Metrics {
        event_type: event.event_type.clone(),
        data: MetricUpdate::from_event_data(&event.data),
    };
    let payload = serde_json::to_string(&message)
        .map_err(|e| AppError::Internal(format!("failed to encode metrics: {}", e)))?;

    if registry.deliver(target, payload).await {
        info!(user_id = target, event_type = %event.event_type, "Relayed metrics");
        Ok(DispatchOutcome::Delivered)
    } else {
        debug!(user_id = target, "No open connection, metrics dropped");
        Ok(DispatchOutcome::Dropped)
    }
}
