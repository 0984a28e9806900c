//! Delegate and proof pages
//!
//! A handful of calm, enum-driven lines plus a status hash. Counts become
//! magnitude buckets before they get here.

use crate::core::hashing::hash_canonical;
use crate::types::{
    ContractState, DelegatePage, DelegatedHoldingContract, DelegationAction, EligibilityDecision,
    HoldingProofRecord, Magnitude, PressureHorizon, ProofPage,
};

const DELEGATE_TITLE: &str = "Delegated holding";
const PROOF_TITLE: &str = "Held quietly";

/// Page for one circle: current arrangement (if any) and whether a new one is possible
pub fn build_delegate_page(
    contract: Option<(&DelegatedHoldingContract, ContractState)>,
    eligibility: &EligibilityDecision,
) -> DelegatePage {
    let mut lines = Vec::new();

    match contract {
        Some((c, ContractState::Active)) => {
            lines.push(format!("Holding for {} {}.", c.scope.display_text(), c.duration_bucket.display_text()));
            lines.push(format!(
                "Up to {}, {}.",
                c.max_magnitude.display_text(),
                horizon_text(c.max_horizon)
            ));
            lines.push(
                match c.action {
                    DelegationAction::Hold => "Held items wait quietly.",
                    DelegationAction::QueueProof => "Held items leave a quiet record.",
                }
                .to_string(),
            );
        }
        Some((_, ContractState::Expired)) => lines.push("The last arrangement has ended.".to_string()),
        Some((_, ContractState::Revoked)) => lines.push("The last arrangement was withdrawn.".to_string()),
        None => lines.push("Nothing is delegated here.".to_string()),
    }

    lines.push(eligibility.reason.description().to_string());

    let mut page = DelegatePage { title: DELEGATE_TITLE.to_string(), lines, status_hash: String::new() };
    page.status_hash = hash_canonical(&page.canonical_string());
    page
}

/// Summary of proof records. Only buckets are rendered.
pub fn build_proof_page(records: &[HoldingProofRecord]) -> ProofPage {
    let mut lines = Vec::new();

    if records.is_empty() {
        lines.push("Nothing was held.".to_string());
    } else {
        let held = Magnitude::from_count(records.len());
        lines.push(format!("{} held quietly.", capitalize(held.display_text())));
        if let Some(largest) = records.iter().map(|r| r.magnitude).max() {
            lines.push(format!("The largest was {}.", largest.display_text()));
        }
        lines.push("Nothing here needs you.".to_string());
    }

    let mut page = ProofPage { title: PROOF_TITLE.to_string(), lines, status_hash: String::new() };
    page.status_hash = hash_canonical(&page.canonical_string());
    page
}

fn horizon_text(horizon: PressureHorizon) -> &'static str {
    match horizon {
        PressureHorizon::Now => "however soon",
        PressureHorizon::Soon => "unless it is needed now",
        PressureHorizon::Later => "only when it can wait",
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
