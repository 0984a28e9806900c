//! Delegated holding contract types
//!
//! A contract is pre-consent for one circle: matching pressure is held (or
//! proof-recorded) without a fresh interactive decision.

use serde::{Deserialize, Serialize};
use crate::types::{canon_field, DurationBucket, Magnitude, PressureCircleType, PressureHorizon};

closed_enum! {
    /// Which circles a contract may hold pressure for
    DelegationScope, field = "scope" {
        Human => "human",
        Institution => "institution",
    }
}

impl DelegationScope {
    pub fn display_text(&self) -> &'static str {
        match self {
            DelegationScope::Human => "people",
            DelegationScope::Institution => "organisations",
        }
    }
}

closed_enum! {
    /// What a matching contract does
    DelegationAction, field = "action" {
        Hold => "hold",
        QueueProof => "queue_proof",
    }
}

closed_enum! {
    ContractState, field = "contract_state" {
        Active => "active",
        Expired => "expired",
        /// Absorbing
        Revoked => "revoked",
    }
}

closed_enum! {
    /// Disposition. There is no surface or interrupt member.
    HoldingResult, field = "holding_result" {
        NoEffect => "no_effect",
        Hold => "hold",
        QueueProof => "queue_proof",
    }
}

closed_enum! {
    /// How a circle came to exist
    CircleKind, field = "circle_kind" {
        /// Derived from an external connector (always institution scope)
        Derived => "derived",
        /// Declared by the person
        Sovereign => "sovereign",
    }
}

closed_enum! {
    /// Category hint on a sovereign circle
    CircleCategory, field = "circle_category" {
        Delivery => "delivery",
        Retail => "retail",
        Subscription => "subscription",
        Transport => "transport",
        Other => "other",
        Unknown => "unknown",
    }
}

/// What scope matching knows about a circle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircleDescriptor {
    pub kind: CircleKind,
    pub category: CircleCategory,
}

impl CircleDescriptor {
    pub fn new(kind: CircleKind, category: CircleCategory) -> Self {
        Self { kind, category }
    }

    /// Descriptor implied by a pressure circle type when nothing richer is known
    pub fn from_pressure_type(circle_type: PressureCircleType) -> Self {
        match circle_type {
            PressureCircleType::Human => Self::new(CircleKind::Sovereign, CircleCategory::Other),
            PressureCircleType::Institution => Self::new(CircleKind::Derived, CircleCategory::Unknown),
            PressureCircleType::Commerce => Self::new(CircleKind::Sovereign, CircleCategory::Retail),
        }
    }

    /// Scope this circle falls under, if any
    pub fn scope(&self) -> Option<DelegationScope> {
        match self.kind {
            CircleKind::Derived => Some(DelegationScope::Institution),
            CircleKind::Sovereign => match self.category {
                CircleCategory::Delivery | CircleCategory::Retail | CircleCategory::Subscription => {
                    Some(DelegationScope::Institution)
                }
                CircleCategory::Transport | CircleCategory::Other => Some(DelegationScope::Human),
                CircleCategory::Unknown => None,
            },
        }
    }
}

/// Caller request to create a contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateContractInput {
    pub circle_id_hash: String,
    pub scope: DelegationScope,
    pub max_horizon: PressureHorizon,
    pub max_magnitude: Magnitude,
    pub action: DelegationAction,
    pub duration_bucket: DurationBucket,
    /// Period the contract starts in
    pub period_key: String,
}

/// Caller request to revoke a contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokeContractInput {
    pub circle_id_hash: String,
    pub contract_id_hash: String,
    pub now_bucket: String,
}

/// Booleans the eligibility check runs on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationInputs {
    pub circle_id_hash: String,
    pub has_trust_baseline: bool,
    pub has_active_preview: bool,
    pub has_active_contract: bool,
}

/// Pre-consented holding rule for one circle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegatedHoldingContract {
    pub contract_id_hash: String,
    pub circle_id_hash: String,
    pub scope: DelegationScope,
    pub max_horizon: PressureHorizon,
    pub max_magnitude: Magnitude,
    pub action: DelegationAction,
    pub duration_bucket: DurationBucket,
    pub state: ContractState,
    pub period_key: String,
    pub status_hash: String,
}

impl DelegatedHoldingContract {
    /// Identity form: never includes state
    pub fn identity_string(&self) -> String {
        format!(
            "{}|id|{}|{}|{}|{}|{}|{}|{}",
            crate::CANON_CONTRACT,
            canon_field(&self.circle_id_hash),
            self.scope,
            self.max_horizon,
            self.max_magnitude,
            self.action,
            self.duration_bucket,
            self.period_key
        )
    }

    pub fn canonical_string(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            crate::CANON_CONTRACT,
            canon_field(&self.contract_id_hash),
            self.state,
            self.identity_string()
        )
    }
}

/// Disposition plus the contract that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingDecision {
    pub result: HoldingResult,
    /// Empty for `no_effect` without a contract
    pub contract_id_hash: String,
}

impl HoldingDecision {
    pub fn no_effect() -> Self {
        Self { result: HoldingResult::NoEffect, contract_id_hash: String::new() }
    }

    pub fn is_held(&self) -> bool {
        !matches!(self.result, HoldingResult::NoEffect)
    }
}

/// Append-only revocation ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationRecord {
    pub circle_id_hash: String,
    pub contract_id_hash: String,
    pub period_key: String,
    pub record_hash: String,
}

impl RevocationRecord {
    pub fn canonical_string(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            crate::CANON_REVOCATION,
            canon_field(&self.circle_id_hash),
            canon_field(&self.contract_id_hash),
            canon_field(&self.period_key)
        )
    }
}

/// What a `queue_proof` disposition asks the caller to queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingProofRecord {
    pub circle_id_hash: String,
    pub contract_id_hash: String,
    pub period_key: String,
    pub magnitude: Magnitude,
    pub record_hash: String,
}

impl HoldingProofRecord {
    pub fn canonical_string(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}",
            crate::CANON_PROOF_RECORD,
            canon_field(&self.circle_id_hash),
            canon_field(&self.contract_id_hash),
            canon_field(&self.period_key),
            self.magnitude
        )
    }
}
