//! Delegated-Holding Engine: per-circle pre-consent contracts
//!
//! Disposition rules (first match wins):
//! - no contract, contract not active → NO_EFFECT
//! - circle scope, or the scope implied by the pressure's circle type,
//!   does not match contract scope → NO_EFFECT
//! - pressure later than max_horizon, or larger than max_magnitude → NO_EFFECT
//! - otherwise HOLD, or QUEUE_PROOF when the contract asks for a record
//!
//! Contract state is recomputed on read. Revocation is an append to the
//! store's ledger, and REVOKED absorbs every later computation.

use tracing::{debug, warn};
use crate::config::MalformedBucketPolicy;
use crate::core::collaborators::{Clock, ContractStore, PreviewSource, TrustSource};
use crate::core::hashing::hash_canonical;
use crate::core::period::{is_period_key, parse_period_hour, period_key};
use crate::error::{HoldingError, ValidationError, ValidationResult};
use crate::types::{
    CircleDescriptor, ContractState, CreateContractInput, DelegatedHoldingContract,
    DelegationAction, DelegationInputs, EligibilityDecision, EligibilityReason,
    HoldingDecision, HoldingProofRecord, HoldingResult, PressureDecisionInput,
    RevocationRecord, RevokeContractInput,
};

/// Holding engine. Holds no state beyond its configured bucket policy.
#[derive(Debug, Default, Clone, Copy)]
pub struct HoldingEngine {
    bucket_policy: MalformedBucketPolicy,
}

impl HoldingEngine {
    /// Engine with the default fail-open bucket policy
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(bucket_policy: MalformedBucketPolicy) -> Self {
        Self { bucket_policy }
    }

    /// Eligibility in strict priority order. Only the first failure is reported.
    pub fn can_create_contract(&self, inputs: &DelegationInputs) -> EligibilityDecision {
        let decision = if !inputs.has_trust_baseline {
            EligibilityDecision::deny(EligibilityReason::TrustMissing)
        } else if inputs.has_active_preview {
            EligibilityDecision::deny(EligibilityReason::InterruptPreviewActive)
        } else if inputs.has_active_contract {
            EligibilityDecision::deny(EligibilityReason::ActiveContractExists)
        } else {
            EligibilityDecision::allow()
        };

        debug!(reason = decision.reason.code(), allowed = decision.allowed, "delegation eligibility");
        decision
    }

    /// Build a contract. Validated, hashed, active, and NOT persisted.
    pub fn create_contract(&self, input: &CreateContractInput) -> ValidationResult<DelegatedHoldingContract> {
        require_non_blank("circle_id_hash", &input.circle_id_hash)?;
        require_period_key("period_key", &input.period_key)?;

        let mut contract = DelegatedHoldingContract {
            contract_id_hash: String::new(),
            circle_id_hash: input.circle_id_hash.clone(),
            scope: input.scope,
            max_horizon: input.max_horizon,
            max_magnitude: input.max_magnitude,
            action: input.action,
            duration_bucket: input.duration_bucket,
            state: ContractState::Active,
            period_key: input.period_key.clone(),
            status_hash: String::new(),
        };
        contract.contract_id_hash = hash_canonical(&contract.identity_string());
        contract.status_hash = hash_canonical(&contract.canonical_string());
        Ok(contract)
    }

    /// Persist a freshly created contract after re-checking eligibility.
    pub fn commit_contract(
        &self,
        contract: &DelegatedHoldingContract,
        ctx: &DelegationContext<'_>,
        clock: &dyn Clock,
    ) -> Result<(), HoldingError> {
        let now = clock.now();
        let inputs = ctx.build_delegation_inputs(&contract.circle_id_hash, &period_key(now));
        let decision = self.can_create_contract(&inputs);
        if !decision.allowed {
            return Err(HoldingError::NotEligible(decision.reason));
        }
        ctx.store.upsert_active_contract(&contract.circle_id_hash, contract, now)?;
        Ok(())
    }

    /// Contract state at `now_bucket`
    pub fn compute_state(&self, contract: &DelegatedHoldingContract, now_bucket: &str) -> ContractState {
        match contract.state {
            ContractState::Revoked => return ContractState::Revoked,
            ContractState::Expired => return ContractState::Expired,
            ContractState::Active => {}
        }

        let (created, now) = match (parse_period_hour(&contract.period_key), parse_period_hour(now_bucket)) {
            (Some(created), Some(now)) => (created, now),
            _ => {
                warn!(policy = ?self.bucket_policy, "unparseable period bucket in contract state");
                return match self.bucket_policy {
                    MalformedBucketPolicy::FailOpen => ContractState::Active,
                    MalformedBucketPolicy::FailClosed => ContractState::Expired,
                };
            }
        };

        if now >= created + contract.duration_bucket.offset() {
            ContractState::Expired
        } else {
            ContractState::Active
        }
    }

    /// Resolve the disposition for one pressure value
    pub fn apply_contract(
        &self,
        contract: Option<&DelegatedHoldingContract>,
        pressure: &PressureDecisionInput,
        circle: &CircleDescriptor,
        now_bucket: &str,
    ) -> HoldingDecision {
        let Some(contract) = contract else {
            return HoldingDecision::no_effect();
        };

        if contract.circle_id_hash != pressure.circle_id_hash {
            debug!("contract belongs to another circle");
            return HoldingDecision::no_effect();
        }
        if self.compute_state(contract, now_bucket) != ContractState::Active {
            debug!("contract not active");
            return HoldingDecision::no_effect();
        }
        let pressure_scope = CircleDescriptor::from_pressure_type(pressure.circle_type).scope();
        if circle.scope() != Some(contract.scope) || pressure_scope != Some(contract.scope) {
            debug!(
                scope = %contract.scope,
                kind = %circle.kind,
                category = %circle.category,
                circle_type = %pressure.circle_type,
                "scope mismatch"
            );
            return HoldingDecision::no_effect();
        }
        if pressure.horizon > contract.max_horizon || pressure.magnitude > contract.max_magnitude {
            debug!(horizon = %pressure.horizon, magnitude = %pressure.magnitude, "pressure exceeds contract bounds");
            return HoldingDecision::no_effect();
        }

        let result = match contract.action {
            DelegationAction::Hold => HoldingResult::Hold,
            DelegationAction::QueueProof => HoldingResult::QueueProof,
        };
        debug!(result = %result, "contract applied");
        HoldingDecision { result, contract_id_hash: contract.contract_id_hash.clone() }
    }

    /// Append a revocation. The contract record itself is never edited.
    pub fn revoke_contract(
        &self,
        input: &RevokeContractInput,
        store: &dyn ContractStore,
        clock: &dyn Clock,
    ) -> Result<RevocationRecord, HoldingError> {
        require_non_blank("circle_id_hash", &input.circle_id_hash)?;
        require_non_blank("contract_id_hash", &input.contract_id_hash)?;
        require_period_key("now_bucket", &input.now_bucket)?;

        let record = store.append_revocation(
            &input.circle_id_hash,
            &input.contract_id_hash,
            &input.now_bucket,
            clock.now(),
        )?;
        debug!("contract revoked");
        Ok(record)
    }

    /// Proof record for a `queue_proof` disposition; `None` otherwise
    pub fn build_proof_record(
        &self,
        decision: &HoldingDecision,
        pressure: &PressureDecisionInput,
    ) -> Option<HoldingProofRecord> {
        if decision.result != HoldingResult::QueueProof {
            return None;
        }
        let mut record = HoldingProofRecord {
            circle_id_hash: pressure.circle_id_hash.clone(),
            contract_id_hash: decision.contract_id_hash.clone(),
            period_key: pressure.period_key.clone(),
            magnitude: pressure.magnitude,
            record_hash: String::new(),
        };
        record.record_hash = hash_canonical(&record.canonical_string());
        Some(record)
    }
}

/// Copy of a contract in another state, with a fresh status hash
pub fn restate_contract(contract: &DelegatedHoldingContract, state: ContractState) -> DelegatedHoldingContract {
    let mut restated = DelegatedHoldingContract { state, ..contract.clone() };
    restated.status_hash = hash_canonical(&restated.canonical_string());
    restated
}

/// Read-only collaborators the eligibility inputs are composed from
#[derive(Clone, Copy)]
pub struct DelegationContext<'a> {
    pub trust: &'a dyn TrustSource,
    pub previews: &'a dyn PreviewSource,
    pub store: &'a dyn ContractStore,
}

impl<'a> DelegationContext<'a> {
    pub fn new(
        trust: &'a dyn TrustSource,
        previews: &'a dyn PreviewSource,
        store: &'a dyn ContractStore,
    ) -> Self {
        Self { trust, previews, store }
    }

    /// Compose eligibility inputs. No side effects.
    pub fn build_delegation_inputs(&self, circle_hash: &str, now_bucket: &str) -> DelegationInputs {
        DelegationInputs {
            circle_id_hash: circle_hash.to_string(),
            has_trust_baseline: self.trust.has_trust_baseline(circle_hash),
            has_active_preview: self.previews.has_active_preview(circle_hash),
            has_active_contract: self.store.get_active_contract(circle_hash, now_bucket).is_some(),
        }
    }
}

fn require_non_blank(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField { field });
    }
    Ok(())
}

fn require_period_key(field: &'static str, value: &str) -> ValidationResult<()> {
    require_non_blank(field, value)?;
    if !is_period_key(value) {
        return Err(ValidationError::InvalidPeriodKey { field });
    }
    Ok(())
}

/// Revocation ledger entry for a circle and contract at `now_bucket`
pub fn revocation_record(circle_hash: &str, contract_id_hash: &str, now_bucket: &str) -> RevocationRecord {
    let mut record = RevocationRecord {
        circle_id_hash: circle_hash.to_string(),
        contract_id_hash: contract_id_hash.to_string(),
        period_key: now_bucket.to_string(),
        record_hash: String::new(),
    };
    record.record_hash = hash_canonical(&record.canonical_string());
    record
}
