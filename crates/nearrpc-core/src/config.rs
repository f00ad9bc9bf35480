//! Client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::policy::BackoffConfig;

/// Environment variable that silences the "retrying after timeout" warning.
pub const NO_LOGS_ENV: &str = "NEAR_NO_LOGS";

/// Errors raised while loading a [`ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Serializable configuration for an [`RpcClient`](crate::client::RpcClient).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Total attempts per request, the first try included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Wait after the first failed attempt, in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Growth factor of the wait between attempts.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Optional ceiling on one wait, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_delay_ms: Option<u64>,
    /// Account used to resolve bare transaction-hash replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Suppress the timeout-retry diagnostic.
    #[serde(default)]
    pub suppress_retry_logs: bool,
}

fn default_max_attempts() -> u32 { 12 }
fn default_base_delay_ms() -> u64 { 500 }
fn default_multiplier() -> f64 { 1.5 }

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            multiplier: default_multiplier(),
            max_delay_ms: None,
            account_id: None,
            suppress_retry_logs: false,
        }
    }
}

impl ClientConfig {
    /// Parse and validate a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the retry loop cannot run with: zero attempts, or a
    /// multiplier that is below 1.0 or not finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "max_attempts",
                reason: "must be at least 1".into(),
            });
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(ConfigError::Invalid {
                field: "multiplier",
                reason: format!("must be a finite number >= 1.0, got {}", self.multiplier),
            });
        }
        Ok(())
    }

    /// Apply environment overrides (currently `NEAR_NO_LOGS`).
    pub fn with_env_overrides(mut self) -> Self {
        if std::env::var_os(NO_LOGS_ENV).is_some() {
            self.suppress_retry_logs = true;
        }
        self
    }

    /// Set the account used for bare transaction-hash replies.
    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    /// The runtime backoff settings.
    pub fn backoff(&self) -> BackoffConfig {
        BackoffConfig {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            multiplier: self.multiplier,
            max_delay: self.max_delay_ms.map(Duration::from_millis),
        }
    }
}
