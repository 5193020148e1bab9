//! Event log configuration from environment variables.

use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::domain::{DEFAULT_BLOCK_INTERVAL, DEFAULT_BUCKET_MAX_AGE, DEFAULT_SEARCH_MAX};

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("bucket_max_age must be greater than zero")]
    ZeroBucketMaxAge,

    #[error("search_max must be greater than zero")]
    ZeroSearchMax,

    #[error("block_interval must be greater than zero")]
    ZeroBlockInterval,
}

/// Tunables of the event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLogConfig {
    /// Age after which the head bucket is closed and a new head opens.
    pub bucket_max_age: Duration,

    /// Maximum number of events returned by one search.
    pub search_max: usize,

    /// Block interval used when an init request leaves it at zero.
    pub block_interval: Duration,
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            bucket_max_age: DEFAULT_BUCKET_MAX_AGE,
            search_max: DEFAULT_SEARCH_MAX,
            block_interval: DEFAULT_BLOCK_INTERVAL,
        }
    }
}

impl EventLogConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QC_EVENTLOG_BUCKET_MAX_AGE_MS`: Head bucket max age (default: 5000)
    /// - `QC_EVENTLOG_SEARCH_MAX`: Search result cap (default: 10000)
    /// - `QC_EVENTLOG_BLOCK_INTERVAL_MS`: Default block interval (default: 5000)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let millis = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        Self {
            bucket_max_age: millis("QC_EVENTLOG_BUCKET_MAX_AGE_MS", defaults.bucket_max_age),

            search_max: lookup("QC_EVENTLOG_SEARCH_MAX")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.search_max),

            block_interval: millis("QC_EVENTLOG_BLOCK_INTERVAL_MS", defaults.block_interval),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket_max_age.is_zero() {
            return Err(ConfigError::ZeroBucketMaxAge);
        }
        if self.search_max == 0 {
            return Err(ConfigError::ZeroSearchMax);
        }
        if self.block_interval.is_zero() {
            return Err(ConfigError::ZeroBlockInterval);
        }
        Ok(())
    }
}
