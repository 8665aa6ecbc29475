//! API Module
//!
//! HTTP handlers and routing for the relay server.
//!
//! # Endpoints
//! - `GET|POST /tts`, `GET /tts.mp3` - Cached synthesis served with range support
//! - `GET /tts/stream` - Streaming synthesis, bypasses the cache
//! - `GET /voices` - Voice listing
//! - `POST /vital/webhook` - Webhook intake feeding the live relay
//! - `POST /vital/link-token` - Vital link token
//! - `GET /ws` - Live metric socket
//! - `GET /stats`, `GET /health` - Status

pub mod handlers;
pub mod relay;
pub mod routes;

pub use handlers::*;
pub use relay::{link_token_handler, socket_handler, webhook_handler};
pub use routes::create_router;
