//! Vital client, used to issue link tokens for the fitness-data connection flow.

use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tracing::info;

use super::upstream_failure;
use crate::error::{AppError, Result};

const SOURCE: &str = "Vital";

/// Client for the Vital link API.
#[derive(Clone)]
pub struct VitalClient {
    api_key: String,
    http: Client,
    base_url: String,
}

impl VitalClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: api_key.into(),
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Requests a link token for `user_id`; the upstream JSON is returned as is.
    pub async fn create_link_token(&self, user_id: &str) -> Result<Value> {
        let url = format!("{}/v2/link/token", self.base_url);

        let response = self
            .http
            .post(&url)
            .header("x-vital-api-key", &self.api_key)
            .json(&json!({ "user_id": user_id }))
            .send()
            .await
            .map_err(|e| AppError::from_transport(SOURCE, e))?;

        if !response.status().is_success() {
            return Err(upstream_failure(SOURCE, response).await);
        }

        info!(user_id, "Issued Vital link token");
        response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("{} returned invalid JSON: {}", SOURCE, e)))
    }
}
