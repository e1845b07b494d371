//! Workflow configuration.

use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::validate::{ExpiryWindow, InvalidExpiryWindow};

pub const ENV_BASE_URL: &str = "CARD_PAY_BASE_URL";
pub const ENV_POLL_INTERVAL_MS: &str = "CARD_PAY_POLL_INTERVAL_MS";
pub const ENV_EXPIRY_YEARS: &str = "CARD_PAY_EXPIRY_YEARS";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "CARD_PAY_REQUEST_TIMEOUT_MS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key}: expected a number of milliseconds, got '{value}'")]
    InvalidMillis { key: &'static str, value: String },

    #[error("CARD_PAY_POLL_INTERVAL_MS: poll interval must be greater than zero")]
    ZeroPollInterval,

    #[error("CARD_PAY_EXPIRY_YEARS: {0}")]
    ExpiryWindow(#[from] InvalidExpiryWindow),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Processor base URL, without the `/api` suffix.
    pub base_url: String,
    /// Delay before the first status check and between checks.
    pub poll_interval: Duration,
    /// Accepted two-digit expiry years.
    pub expiry_window: ExpiryWindow,
    /// Per-request HTTP timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:2050".to_string(),
            poll_interval: Duration::from_millis(1000),
            expiry_window: ExpiryWindow::default(),
            request_timeout: None,
        }
    }
}

impl Config {
    /// Load from `CARD_PAY_*` environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        if let Some(interval) = millis(&lookup, ENV_POLL_INTERVAL_MS)? {
            if interval.is_zero() {
                return Err(ConfigError::ZeroPollInterval);
            }
            config.poll_interval = interval;
        }
        if let Some(window) = lookup(ENV_EXPIRY_YEARS) {
            config.expiry_window = window.parse()?;
        }
        if let Some(timeout) = millis(&lookup, ENV_REQUEST_TIMEOUT_MS)? {
            config.request_timeout = Some(timeout);
        }

        Ok(config)
    }
}

fn millis(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<Duration>, ConfigError> {
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidMillis { key, value })
        })
        .transpose()
}
