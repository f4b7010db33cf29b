use std::{env, time::Duration};

/// Default API base URL of the entry service.
pub const DEFAULT_API_URL: &str = "http://localhost:3030/api";

/// HTTP client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL (default: "http://localhost:3030/api")
    pub base_url: String,
    /// Per-request timeout in seconds. No timeout when unset.
    pub request_timeout_secs: Option<u64>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout_secs: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DIDIT_API_URL` - API base URL (default: "http://localhost:3030/api")
    /// - `DIDIT_REQUEST_TIMEOUT_SECS` - Request timeout in seconds (default: none)
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("DIDIT_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            request_timeout_secs: env::var("DIDIT_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }

    pub fn with_timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Apply command-line values on top of this configuration.
    ///
    /// Only values that were given replace the loaded ones.
    pub fn with_overrides(mut self, base_url: Option<String>, timeout_secs: Option<u64>) -> Self {
        if let Some(base_url) = base_url {
            self.base_url = base_url;
        }
        if timeout_secs.is_some() {
            self.request_timeout_secs = timeout_secs;
        }
        self
    }

    /// Get request timeout as a Duration.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
