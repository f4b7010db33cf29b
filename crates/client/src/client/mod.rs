//! HTTP client for the didit entry service.

pub mod entries;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// HTTP client for the didit entry service.
#[derive(Debug, Clone)]
pub struct DiditClient {
    client: reqwest::Client,
    base_url: String,
}

impl DiditClient {
    /// Create a new client with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: normalize_base_url(base_url.into()),
        }
    }

    /// Create a client from a full configuration.
    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: normalize_base_url(config.base_url.clone()),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a URL for an endpoint.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Handle JSON responses, returning the untyped body.
    async fn handle_json_response(&self, response: reqwest::Response) -> Result<serde_json::Value> {
        let response = self.check_status(response).await?;
        response.json().await.map_err(ClientError::from)
    }

    /// Handle responses whose body is not consumed.
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        self.check_status(response).await.map(|_| ())
    }

    /// Map any non-2xx status to a server error.
    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::warn!(status = %status, message = %message, "Entry service error");
        Err(ClientError::ServerError {
            status: status.as_u16(),
            message,
        })
    }
}

fn normalize_base_url(base_url: String) -> String {
    base_url.trim_end_matches('/').to_string()
}
