//! Runtime configuration
//!
//! Bounds and offsets are crate constants. The few knobs that are product
//! decisions live here and load from TOML:
//!
//! ```toml
//! malformed_bucket_policy = "fail_open"
//!
//! [store]
//! max_records = 32
//! max_age_days = 30
//! ```

use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::error::ConfigError;

/// What contract expiry does when a period key fails to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedBucketPolicy {
    /// Treat the contract as not expired
    #[default]
    FailOpen,
    /// Treat the contract as expired
    FailClosed,
}

/// Retention enforced by the contract store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Records kept per circle
    pub max_records: usize,
    /// Oldest record kept, in days
    pub max_age_days: i64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { max_records: 32, max_age_days: 30 }
    }
}

impl StoreConfig {
    /// Retention age, or `None` when `max_age_days` is not a usable
    /// positive span
    pub fn max_age(&self) -> Option<chrono::Duration> {
        if self.max_age_days <= 0 {
            return None;
        }
        chrono::Duration::try_days(self.max_age_days)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_records == 0 {
            return Err(ConfigError::Invalid { field: "store.max_records", reason: "must be at least 1" });
        }
        if self.max_age_days <= 0 {
            return Err(ConfigError::Invalid { field: "store.max_age_days", reason: "must be positive" });
        }
        if self.max_age().is_none() {
            return Err(ConfigError::Invalid { field: "store.max_age_days", reason: "out of range" });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldlineConfig {
    pub malformed_bucket_policy: MalformedBucketPolicy,
    pub store: StoreConfig,
}

impl HoldlineConfig {
    /// Parse from TOML text. Missing fields take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.store.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
