//! Configuration model loaded from external sources.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::search::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageLimits};

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub database_url: String,
    #[serde(default)]
    pub search: SearchSettings,
}

/// Who turns matching rows into the response body.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RenderingMode {
    /// The store returns typed rows and the gateway serializes them.
    #[default]
    Gateway,
    /// The store returns a payload already serialized in the requested format.
    Store,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
/// Tunables for the employee search gateway.
pub struct SearchSettings {
    pub default_page_size: i64,
    pub max_page_size: i64,
    pub rendering: RenderingMode,
    /// Reject unknown `outputFormat` values instead of falling back to JSON.
    pub reject_unknown_format: bool,
    /// Upper bound on a single store call, in milliseconds.
    pub query_timeout_ms: Option<u64>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            rendering: RenderingMode::default(),
            reject_unknown_format: false,
            query_timeout_ms: None,
        }
    }
}

/// Inconsistent search settings detected at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("max_page_size must be at least 1, got {0}")]
    MaxPageSize(i64),
    #[error("default_page_size must be within [1, {max}], got {value}")]
    DefaultPageSize { value: i64, max: i64 },
    #[error("query_timeout_ms must be greater than zero")]
    ZeroTimeout,
}

impl SearchSettings {
    /// Checks the settings for values the gateway cannot honour.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_page_size < 1 {
            return Err(SettingsError::MaxPageSize(self.max_page_size));
        }
        if !(1..=self.max_page_size).contains(&self.default_page_size) {
            return Err(SettingsError::DefaultPageSize {
                value: self.default_page_size,
                max: self.max_page_size,
            });
        }
        if self.query_timeout_ms == Some(0) {
            return Err(SettingsError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn page_limits(&self) -> PageLimits {
        PageLimits {
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
        }
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_ms.map(Duration::from_millis)
    }
}
