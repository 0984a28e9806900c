//! Collaborator contracts
//!
//! Engines never read time or state ambiently. Everything they need is
//! passed in through these traits.

use std::collections::HashSet;
use chrono::{DateTime, Utc};
use crate::error::StoreError;
use crate::types::{DelegatedHoldingContract, RevocationRecord};

/// Source of the current instant
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock. Only binaries should construct this.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Does a circle have a trust baseline?
pub trait TrustSource {
    fn has_trust_baseline(&self, circle_hash: &str) -> bool;
}

/// Does a circle have an interrupt preview live right now?
pub trait PreviewSource {
    fn has_active_preview(&self, circle_hash: &str) -> bool;
}

/// Append-only, hash-keyed contract persistence
pub trait ContractStore {
    /// Active contract for the circle at `now_bucket`, with state recomputed
    fn get_active_contract(&self, circle_hash: &str, now_bucket: &str) -> Option<DelegatedHoldingContract>;

    /// Record a contract as the circle's active one
    fn upsert_active_contract(
        &self,
        circle_hash: &str,
        contract: &DelegatedHoldingContract,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Append a revocation entry. The contract record is never touched.
    fn append_revocation(
        &self,
        circle_hash: &str,
        contract_id_hash: &str,
        now_bucket: &str,
        now: DateTime<Utc>,
    ) -> Result<RevocationRecord, StoreError>;

    /// Most recent contracts first, with revocations folded in
    fn list_recent_contracts(&self, circle_hash: &str, limit: usize) -> Vec<DelegatedHoldingContract>;
}

/// Trust source backed by a fixed set of circle hashes
#[derive(Debug, Default, Clone)]
pub struct StaticTrustSource {
    trusted: HashSet<String>,
}

impl StaticTrustSource {
    pub fn new<I, S>(circles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { trusted: circles.into_iter().map(Into::into).collect() }
    }
}

impl TrustSource for StaticTrustSource {
    fn has_trust_baseline(&self, circle_hash: &str) -> bool {
        self.trusted.contains(circle_hash)
    }
}

/// Preview source backed by a fixed set of circle hashes
#[derive(Debug, Default, Clone)]
pub struct StaticPreviewSource {
    previewing: HashSet<String>,
}

impl StaticPreviewSource {
    pub fn new<I, S>(circles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { previewing: circles.into_iter().map(Into::into).collect() }
    }
}

impl PreviewSource for StaticPreviewSource {
    fn has_active_preview(&self, circle_hash: &str) -> bool {
        self.previewing.contains(circle_hash)
    }
}
