//! # Sync Configuration
//!
//! Configuration for post views.
//!
//! The feed bus is injected into a view, so its buffer size belongs to
//! whoever builds the bus (see `view-runtime`'s `ReplayOptions`).

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A size or timeout that must be positive was zero.
    #[error("Invalid configuration: {field} must be greater than zero")]
    MustBePositive {
        /// Offending field name
        field: &'static str,
    },
}

/// Post view configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SyncConfig {
    /// Options requested per page.
    pub page_size: usize,

    /// Upper bound for a single page request in milliseconds.
    pub fetch_timeout_ms: u64,

    /// Capacity of the view's inbound command queue.
    pub command_queue_capacity: usize,

    /// Request the first page as soon as the view mounts.
    pub auto_load_first_page: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            fetch_timeout_ms: 10_000,
            command_queue_capacity: 64,
            auto_load_first_page: true,
        }
    }
}

impl SyncConfig {
    /// Create a config for testing (smaller values).
    pub fn for_testing() -> Self {
        Self {
            page_size: 5,
            fetch_timeout_ms: 1_000,
            command_queue_capacity: 16,
            auto_load_first_page: false,
        }
    }

    /// Defaults overridden by `SYNC_PAGE_SIZE`, `SYNC_FETCH_TIMEOUT_MS`,
    /// `SYNC_COMMAND_QUEUE` and `SYNC_AUTO_LOAD`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            page_size: env::var("SYNC_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.page_size),
            fetch_timeout_ms: env::var("SYNC_FETCH_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.fetch_timeout_ms),
            command_queue_capacity: env::var("SYNC_COMMAND_QUEUE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.command_queue_capacity),
            auto_load_first_page: env::var("SYNC_AUTO_LOAD")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.auto_load_first_page),
        }
    }

    /// Reject values that would stall a view.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::MustBePositive { field: "page_size" });
        }
        if self.fetch_timeout_ms == 0 {
            return Err(ConfigError::MustBePositive {
                field: "fetch_timeout_ms",
            });
        }
        if self.command_queue_capacity == 0 {
            return Err(ConfigError::MustBePositive {
                field: "command_queue_capacity",
            });
        }
        Ok(())
    }

    /// Page request timeout as a `Duration`.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}
