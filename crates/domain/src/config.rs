//! Process-wide submission configuration
//!
//! Loaded once at startup (see `declarations-infra::config`) and treated as
//! immutable afterwards.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{
    DEFAULT_BREAKER_MAX_FAILURES, DEFAULT_BREAKER_RESET_TIMEOUT_SECS, DEFAULT_LEGACY_PATH,
    DEFAULT_MODERNIZED_PATH, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::errors::{DeclarationsError, Result};

/// Top-level configuration for the submission client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionConfig {
    pub legacy: EndpointConfig,
    pub modernized: EndpointConfig,
    /// Routes submissions to the modernized integration when set.
    #[serde(default)]
    pub modernized_enabled: bool,
    #[serde(default)]
    pub circuit_breaker: BreakerSettings,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl SubmissionConfig {
    /// Reject configurations that could never produce a working client.
    pub fn validate(&self) -> Result<()> {
        self.legacy.validate("legacy")?;
        self.modernized.validate("modernized")?;

        if self.circuit_breaker.max_failures == 0 {
            return Err(DeclarationsError::Config(
                "circuit_breaker.max_failures must be greater than 0".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(DeclarationsError::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// One downstream integration: where to send and how to authenticate.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub base_url: String,
    #[serde(default)]
    pub path: Option<String>,
    pub bearer_token: String,
}

impl EndpointConfig {
    fn validate(&self, name: &str) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(DeclarationsError::Config(format!("{name}.base_url must not be empty")));
        }
        let url = Url::parse(&self.base_url).map_err(|e| {
            DeclarationsError::Config(format!("{name}.base_url is not a valid URL: {e}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DeclarationsError::Config(format!(
                "{name}.base_url must use http or https, got {}",
                url.scheme()
            )));
        }

        if self.bearer_token.trim().is_empty() {
            return Err(DeclarationsError::Config(format!(
                "{name}.bearer_token must not be empty"
            )));
        }
        // Sent verbatim after `Bearer ` in the Authorization header.
        if !self.bearer_token.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(DeclarationsError::Config(format!(
                "{name}.bearer_token must be printable ASCII without whitespace"
            )));
        }
        Ok(())
    }

    /// Versioned path, falling back to the integration's default.
    pub fn path_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.path.as_deref().unwrap_or(default)
    }

    pub fn legacy_path(&self) -> &str {
        self.path_or(DEFAULT_LEGACY_PATH)
    }

    pub fn modernized_path(&self) -> &str {
        self.path_or(DEFAULT_MODERNIZED_PATH)
    }
}

// Credentials must never end up in logs.
impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("base_url", &self.base_url)
            .field("path", &self.path)
            .field("bearer_token", &"<redacted>")
            .finish()
    }
}

/// Circuit breaker tuning shared by both endpoint breakers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerSettings {
    /// Consecutive failures before the breaker opens.
    #[serde(default = "default_max_failures")]
    pub max_failures: u64,
    /// Cool-down before a single probe call is admitted.
    #[serde(default = "default_reset_timeout_secs")]
    pub reset_timeout_secs: u64,
}

impl BreakerSettings {
    pub fn reset_timeout(&self) -> Duration {
        Duration::from_secs(self.reset_timeout_secs)
    }
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            max_failures: DEFAULT_BREAKER_MAX_FAILURES,
            reset_timeout_secs: DEFAULT_BREAKER_RESET_TIMEOUT_SECS,
        }
    }
}

fn default_max_failures() -> u64 {
    DEFAULT_BREAKER_MAX_FAILURES
}

fn default_reset_timeout_secs() -> u64 {
    DEFAULT_BREAKER_RESET_TIMEOUT_SECS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
