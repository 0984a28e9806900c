//! Error types
//!
//! Construction failures are errors. Business absence (no signals, no
//! active envelope, no matching contract) is a value, never an error.

/// A value could not be constructed. Nothing partial is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid {field}: {value:?}")]
    InvalidEnum { field: &'static str, value: String },

    #[error("required field is blank: {field}")]
    BlankField { field: &'static str },

    #[error("malformed period key in {field}")]
    InvalidPeriodKey { field: &'static str },
}

/// Contract store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("contract not found for circle")]
    ContractNotFound,

    #[error("circle already has an active contract")]
    ActiveContractExists,

    #[error("store lock poisoned")]
    Poisoned,
}

/// Failures from the explicit commit and revoke steps.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HoldingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("contract not eligible: {0}")]
    NotEligible(crate::types::EligibilityReason),
}

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

pub type ValidationResult<T> = Result<T, ValidationError>;
