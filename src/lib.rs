//! Voice Relay - caching text-to-speech relay server
//!
//! Forwards synthesis requests to ElevenLabs behind a bounded in-memory cache
//! with HTTP range serving, and relays Vital webhook metrics to live sockets.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod range;
pub mod relay;
pub mod upstream;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{AppError, Result};
