//! HTTP client for the homework-status endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::config::BotConfig;
use crate::error::PollError;

/// Source of status payloads. One call per poll cycle, no retries inside.
#[async_trait]
pub trait StatusApi: Send + Sync {
    /// Fetch the decoded payload for the window starting at `from_date`.
    async fn fetch(&self, from_date: i64) -> Result<Value, PollError>;
}

/// Practicum API client over reqwest.
pub struct PracticumClient {
    endpoint: String,
    token: SecretString,
    client: reqwest::Client,
}

impl PracticumClient {
    pub fn new(endpoint: impl Into<String>, token: SecretString, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {e}");
                reqwest::Client::new()
            });
        Self {
            endpoint: endpoint.into(),
            token,
            client,
        }
    }

    pub fn from_config(config: &BotConfig) -> Self {
        Self::new(
            config.endpoint.clone(),
            config.credentials.practicum_token.clone(),
            config.request_timeout,
        )
    }

    fn auth_header(&self) -> String {
        format!("OAuth {}", self.token.expose_secret())
    }
}

#[async_trait]
impl StatusApi for PracticumClient {
    async fn fetch(&self, from_date: i64) -> Result<Value, PollError> {
        tracing::info!(from_date, endpoint = %self.endpoint, "Requesting homework statuses");

        let resp = self
            .client
            .get(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| PollError::EndpointUnavailable {
                // The URL carries the cursor; keep it out so repeats dedup.
                reason: e.without_url().to_string(),
            })?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(PollError::EndpointUnavailable {
                reason: format!("{} вернул код {}", self.endpoint, status.as_u16()),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| PollError::EndpointUnavailable {
                reason: e.without_url().to_string(),
            })?;

        let payload: Value = serde_json::from_slice(&body)
            .map_err(|e| PollError::MalformedPayload(e.to_string()))?;

        tracing::info!("API response received");
        Ok(payload)
    }
}
