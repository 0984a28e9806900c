//! In-memory contract store
//!
//! Reference `ContractStore` for the CLI and tests. Records are append-only
//! per circle: contracts are never edited, revocations are ledger entries.
//! Retention (record count and age) is enforced here, never by the engines.

use std::collections::HashMap;
use std::sync::Mutex;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use crate::config::StoreConfig;
use crate::core::collaborators::ContractStore;
use crate::core::holding::{revocation_record, restate_contract, HoldingEngine};
use crate::core::period::period_key;
use crate::error::StoreError;
use crate::types::{ContractState, DelegatedHoldingContract, RevocationRecord};

#[derive(Debug, Clone)]
struct StoredContract {
    contract: DelegatedHoldingContract,
    stored_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct CircleLedger {
    /// Oldest first
    contracts: Vec<StoredContract>,
    revocations: Vec<RevocationRecord>,
}

impl CircleLedger {
    fn is_revoked(&self, contract_id_hash: &str) -> bool {
        self.revocations.iter().any(|r| r.contract_id_hash == contract_id_hash)
    }

    /// Stored contract with its revocation folded in
    fn folded(&self, stored: &StoredContract) -> DelegatedHoldingContract {
        if self.is_revoked(&stored.contract.contract_id_hash) {
            restate_contract(&stored.contract, ContractState::Revoked)
        } else {
            stored.contract.clone()
        }
    }

    /// Age and count retention. A contract that is still active at `now`
    /// is never dropped; past the count cap the oldest inactive ones go first.
    fn prune(&mut self, config: &StoreConfig, engine: &HoldingEngine, now: DateTime<Utc>) {
        let now_bucket = period_key(now);
        let live: Vec<bool> = self
            .contracts
            .iter()
            .map(|s| engine.compute_state(&self.folded(s), &now_bucket) == ContractState::Active)
            .collect();

        let cutoff = config.max_age().and_then(|age| now.checked_sub_signed(age));
        let mut keep: Vec<bool> = self
            .contracts
            .iter()
            .zip(&live)
            .map(|(s, live)| *live || cutoff.map_or(true, |cutoff| s.stored_at >= cutoff))
            .collect();

        let mut excess = keep.iter().filter(|k| **k).count().saturating_sub(config.max_records);
        for (k, live) in keep.iter_mut().zip(&live) {
            if excess == 0 {
                break;
            }
            if *k && !*live {
                *k = false;
                excess -= 1;
            }
        }

        let mut flags = keep.into_iter();
        self.contracts.retain(|_| flags.next().unwrap_or(true));

        // A revocation outlives nothing: it goes only once its contract is gone
        let contracts = &self.contracts;
        self.revocations
            .retain(|r| contracts.iter().any(|s| s.contract.contract_id_hash == r.contract_id_hash));
    }
}

/// Mutex-guarded map of per-circle ledgers
#[derive(Debug, Default)]
pub struct InMemoryContractStore {
    engine: HoldingEngine,
    config: StoreConfig,
    ledgers: Mutex<HashMap<String, CircleLedger>>,
}

impl InMemoryContractStore {
    pub fn new(engine: HoldingEngine, config: StoreConfig) -> Self {
        Self { engine, config, ledgers: Mutex::new(HashMap::new()) }
    }

    /// Revocation ledger for a circle, oldest first
    pub fn revocations(&self, circle_hash: &str) -> Vec<RevocationRecord> {
        match self.ledgers.lock() {
            Ok(ledgers) => ledgers
                .get(circle_hash)
                .map(|l| l.revocations.clone())
                .unwrap_or_default(),
            Err(_) => {
                warn!("contract store lock poisoned");
                Vec::new()
            }
        }
    }
}

impl ContractStore for InMemoryContractStore {
    fn get_active_contract(&self, circle_hash: &str, now_bucket: &str) -> Option<DelegatedHoldingContract> {
        let ledgers = match self.ledgers.lock() {
            Ok(ledgers) => ledgers,
            Err(_) => {
                warn!("contract store lock poisoned");
                return None;
            }
        };
        let ledger = ledgers.get(circle_hash)?;
        ledger
            .contracts
            .iter()
            .rev()
            .map(|s| ledger.folded(s))
            .find(|c| self.engine.compute_state(c, now_bucket) == ContractState::Active)
    }

    fn upsert_active_contract(
        &self,
        circle_hash: &str,
        contract: &DelegatedHoldingContract,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut ledgers = self.ledgers.lock().map_err(|_| StoreError::Poisoned)?;
        let ledger = ledgers.entry(circle_hash.to_string()).or_default();

        let already_active = ledger
            .contracts
            .iter()
            .map(|s| ledger.folded(s))
            .any(|c| {
                c.contract_id_hash != contract.contract_id_hash
                    && self.engine.compute_state(&c, &contract.period_key) == ContractState::Active
            });
        if already_active {
            return Err(StoreError::ActiveContractExists);
        }

        if !ledger.contracts.iter().any(|s| s.contract.contract_id_hash == contract.contract_id_hash) {
            ledger.contracts.push(StoredContract { contract: contract.clone(), stored_at: now });
        }
        ledger.prune(&self.config, &self.engine, now);
        debug!(records = ledger.contracts.len(), "contract stored");
        Ok(())
    }

    fn append_revocation(
        &self,
        circle_hash: &str,
        contract_id_hash: &str,
        now_bucket: &str,
        now: DateTime<Utc>,
    ) -> Result<RevocationRecord, StoreError> {
        let mut ledgers = self.ledgers.lock().map_err(|_| StoreError::Poisoned)?;
        let ledger = ledgers.get_mut(circle_hash).ok_or(StoreError::ContractNotFound)?;
        if !ledger.contracts.iter().any(|s| s.contract.contract_id_hash == contract_id_hash) {
            return Err(StoreError::ContractNotFound);
        }

        let record = revocation_record(circle_hash, contract_id_hash, now_bucket);
        ledger.revocations.push(record.clone());
        ledger.prune(&self.config, &self.engine, now);
        Ok(record)
    }

    fn list_recent_contracts(&self, circle_hash: &str, limit: usize) -> Vec<DelegatedHoldingContract> {
        let ledgers = match self.ledgers.lock() {
            Ok(ledgers) => ledgers,
            Err(_) => {
                warn!("contract store lock poisoned");
                return Vec::new();
            }
        };
        match ledgers.get(circle_hash) {
            Some(ledger) => ledger
                .contracts
                .iter()
                .rev()
                .take(limit)
                .map(|s| ledger.folded(s))
                .collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::types::{
        CreateContractInput, DelegationAction, DelegationScope, DurationBucket, Magnitude, PressureHorizon,
    };

    const CIRCLE: &str = "circle-a";

    fn make_contract(period_key: &str, action: DelegationAction) -> DelegatedHoldingContract {
        HoldingEngine::new()
            .create_contract(&CreateContractInput {
                circle_id_hash: CIRCLE.into(),
                scope: DelegationScope::Institution,
                max_horizon: PressureHorizon::Soon,
                max_magnitude: Magnitude::Several,
                action,
                duration_bucket: DurationBucket::Hour,
                period_key: period_key.into(),
            })
            .unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_upsert_then_get_active() {
        let store = InMemoryContractStore::default();
        let contract = make_contract("2026-10-17T09:00", DelegationAction::Hold);
        store.upsert_active_contract(CIRCLE, &contract, now()).unwrap();

        assert_eq!(store.get_active_contract(CIRCLE, "2026-10-17T09:30"), Some(contract.clone()));
        assert_eq!(store.get_active_contract(CIRCLE, "2026-10-17T10:00"), None);
        assert_eq!(store.get_active_contract("other", "2026-10-17T09:30"), None);
    }

    #[test]
    fn test_second_active_contract_rejected() {
        let store = InMemoryContractStore::default();
        let first = make_contract("2026-10-17T09:00", DelegationAction::Hold);
        let second = make_contract("2026-10-17T09:15", DelegationAction::QueueProof);
        store.upsert_active_contract(CIRCLE, &first, now()).unwrap();
        assert_eq!(
            store.upsert_active_contract(CIRCLE, &second, now()),
            Err(StoreError::ActiveContractExists)
        );
    }

    #[test]
    fn test_revocation_appends_and_keeps_record() {
        let store = InMemoryContractStore::default();
        let contract = make_contract("2026-10-17T09:00", DelegationAction::Hold);
        store.upsert_active_contract(CIRCLE, &contract, now()).unwrap();

        let record = store
            .append_revocation(CIRCLE, &contract.contract_id_hash, "2026-10-17T09:15", now())
            .unwrap();
        assert_eq!(record.contract_id_hash, contract.contract_id_hash);

        assert_eq!(store.get_active_contract(CIRCLE, "2026-10-17T09:30"), None);
        let recent = store.list_recent_contracts(CIRCLE, 10);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].state, ContractState::Revoked);
        assert_eq!(store.revocations(CIRCLE).len(), 1);
    }

    #[test]
    fn test_revoke_unknown_contract() {
        let store = InMemoryContractStore::default();
        assert_eq!(
            store.append_revocation(CIRCLE, "nope", "2026-10-17T09:15", now()),
            Err(StoreError::ContractNotFound)
        );
    }

    #[test]
    fn test_retention_caps_records() {
        let config = StoreConfig { max_records: 2, max_age_days: 30 };
        let store = InMemoryContractStore::new(HoldingEngine::new(), config);
        for hour in 0..4 {
            let contract = make_contract(&format!("2026-10-1{}T09:00", hour), DelegationAction::Hold);
            store
                .upsert_active_contract(CIRCLE, &contract, now() + chrono::Duration::days(hour))
                .unwrap();
        }
        let recent = store.list_recent_contracts(CIRCLE, 10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].period_key, "2026-10-13T09:00");
    }

    #[test]
    fn test_retention_drops_old_records() {
        let config = StoreConfig { max_records: 10, max_age_days: 1 };
        let store = InMemoryContractStore::new(HoldingEngine::new(), config);
        let old = make_contract("2026-10-17T09:00", DelegationAction::Hold);
        store.upsert_active_contract(CIRCLE, &old, now()).unwrap();
        let fresh = make_contract("2026-10-20T09:00", DelegationAction::Hold);
        store
            .upsert_active_contract(CIRCLE, &fresh, now() + chrono::Duration::days(3))
            .unwrap();
        let recent = store.list_recent_contracts(CIRCLE, 10);
        assert_eq!(recent, vec![fresh]);
    }

    #[test]
    fn test_retention_keeps_active_contract() {
        let config = StoreConfig { max_records: 10, max_age_days: 1 };
        let store = InMemoryContractStore::new(HoldingEngine::new(), config);
        let old = make_contract("2026-10-17T09:00", DelegationAction::Hold);
        store.upsert_active_contract(CIRCLE, &old, now()).unwrap();

        let trip = HoldingEngine::new()
            .create_contract(&CreateContractInput {
                circle_id_hash: CIRCLE.into(),
                scope: DelegationScope::Human,
                max_horizon: PressureHorizon::Later,
                max_magnitude: Magnitude::AFew,
                action: DelegationAction::Hold,
                duration_bucket: DurationBucket::Trip,
                period_key: "2026-10-17T10:00".into(),
            })
            .unwrap();
        store
            .upsert_active_contract(CIRCLE, &trip, now() + chrono::Duration::hours(1))
            .unwrap();

        // Three days on, past max age but inside the trip
        let later = now() + chrono::Duration::days(3);
        store.upsert_active_contract(CIRCLE, &trip, later).unwrap();

        assert_eq!(store.list_recent_contracts(CIRCLE, 10), vec![trip.clone()]);
        assert_eq!(store.get_active_contract(CIRCLE, &period_key(later)), Some(trip));
    }
}
