//! Eligibility reason codes for contract creation
//!
//! Exactly one reason is reported per decision, chosen by priority:
//! E001 < E002 < E003 < E000.

use serde::{Deserialize, Serialize};

closed_enum! {
    /// Why a contract may or may not be created
    EligibilityReason, field = "eligibility_reason" {
        /// No trust baseline for the circle
        TrustMissing => "trust_missing",
        /// An interrupt preview is already live
        InterruptPreviewActive => "interrupt_preview_active",
        /// The circle already has an active contract
        ActiveContractExists => "active_contract_exists",
        /// All checks passed
        Ok => "ok",
    }
}

impl EligibilityReason {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::Ok => "E000_OK",
            Self::TrustMissing => "E001_TRUST_MISSING",
            Self::InterruptPreviewActive => "E002_INTERRUPT_PREVIEW_ACTIVE",
            Self::ActiveContractExists => "E003_ACTIVE_CONTRACT_EXISTS",
        }
    }

    /// Calm display copy
    pub fn description(&self) -> &'static str {
        match self {
            Self::Ok => "Ready to delegate",
            Self::TrustMissing => "Trust needs to settle first",
            Self::InterruptPreviewActive => "Something is already waiting for you",
            Self::ActiveContractExists => "Already delegated",
        }
    }
}

/// Result of the eligibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityDecision {
    pub allowed: bool,
    pub reason: EligibilityReason,
}

impl EligibilityDecision {
    /// Allowed decision
    pub fn allow() -> Self {
        Self { allowed: true, reason: EligibilityReason::Ok }
    }

    /// Denied decision
    pub fn deny(reason: EligibilityReason) -> Self {
        Self { allowed: false, reason }
    }
}
