//! API Routes
//!
//! Configures the Axum router with all relay server endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    health_handler, root_handler, stats_handler, tts_get_handler, tts_post_handler,
    tts_stream_handler, voices_handler, AppState,
};
use super::relay::{link_token_handler, socket_handler, webhook_handler};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /tts`, `GET /tts.mp3`, `POST /tts` - cached synthesis with range support
/// - `GET /tts/stream` - uncached chunked synthesis
/// - `GET /voices` - upstream voice listing
/// - `POST /vital/webhook` - fitness event intake
/// - `POST /vital/link-token` - link token issuance
/// - `GET /ws?userId=` - live metric socket
/// - `GET /`, `GET /health`, `GET /stats` - status
///
/// # Middleware
/// - CORS: Allows any origin, browser clients call this directly
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/tts", get(tts_get_handler).post(tts_post_handler))
        .route("/tts.mp3", get(tts_get_handler))
        .route("/tts/stream", get(tts_stream_handler))
        .route("/voices", get(voices_handler))
        .route("/vital/webhook", post(webhook_handler))
        .route("/vital/link-token", post(link_token_handler))
        .route("/ws", get(socket_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
