//! Relay Handlers
//!
//! Webhook intake, link-token issuance and the live socket upgrade.

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, ws::WebSocketUpgrade, Query, State},
    response::Response,
    Json,
};
use serde_json::Value;
use tracing::warn;

use super::handlers::AppState;
use crate::error::{AppError, Result};
use crate::models::{LinkTokenRequest, SocketParams, WebhookAck};
use crate::relay::{self, session, WebhookEvent};

/// Handler for POST /vital/webhook
///
/// Answers 200 for any JSON payload, recognized or not, so the sender does
/// not retry. Only a body that is not JSON at all yields 500.
pub async fn webhook_handler(State(state): State<AppState>, body: Bytes) -> Result<Json<WebhookAck>> {
    let envelope: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Unreadable webhook payload");
        AppError::Internal(format!("invalid webhook payload: {}", e))
    })?;
    let event = WebhookEvent::from_envelope(envelope);

    let outcome = relay::dispatch(&state.registry, &event).await?;

    Ok(Json(WebhookAck {
        ok: true,
        outcome: outcome.as_str(),
    }))
}

/// Handler for POST /vital/link-token
pub async fn link_token_handler(
    State(state): State<AppState>,
    req: std::result::Result<Json<LinkTokenRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(req) = req?;
    let user_id = req.user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::InvalidRequest("user_id is required".to_string()));
    }

    let vital = state
        .vital
        .as_ref()
        .ok_or_else(|| AppError::Internal("Vital API key is not configured".to_string()))?;

    Ok(Json(vital.create_link_token(user_id).await?))
}

/// Handler for GET /ws?userId=
///
/// Connections without a usable identifier are upgraded and then closed
/// with a policy-violation code.
pub async fn socket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<SocketParams>,
) -> Response {
    match params.client_id() {
        Some(user_id) => {
            let user_id = user_id.to_string();
            let registry = state.registry.clone();
            ws.on_upgrade(move |socket| session::run(socket, registry, user_id))
        }
        None => ws.on_upgrade(session::reject),
    }
}
