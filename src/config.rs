//! Guard configuration
//!
//! Loaded from a JSON file at startup; every field has a local-development
//! default so a missing file is not fatal when no path is given.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default listen address
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8002";

/// Default remote ledger base URL
pub const DEFAULT_LEDGER_URL: &str = "http://127.0.0.1:8001";

/// Default timeout for account fetches and submissions, in seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Config format error: {0}")]
    FormatError(#[from] serde_json::Error),
}

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Address the guard listens on for inbound messages
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Base URL of the remote ledger service
    #[serde(default = "default_ledger_url")]
    pub ledger_url: String,
    /// Timeout for account fetches and submissions, in seconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// Park proposals whose account is not yet known to the remote ledger
    /// as provisional entries instead of dropping them
    #[serde(default = "default_park")]
    pub park_unverified: bool,
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

fn default_ledger_url() -> String {
    DEFAULT_LEDGER_URL.to_string()
}

fn default_fetch_timeout() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

fn default_park() -> bool {
    true
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            ledger_url: default_ledger_url(),
            fetch_timeout_secs: default_fetch_timeout(),
            park_unverified: default_park(),
        }
    }
}

impl GuardConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Timeout as a [`std::time::Duration`]
    pub fn fetch_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.fetch_timeout_secs)
    }
}
