//! Presentation-ready pages
//!
//! Lines carry enum display text and bucket values only. No counts,
//! timestamps or identifiers.

use serde::{Deserialize, Serialize};

/// Delegation overview for one circle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegatePage {
    pub title: String,
    pub lines: Vec<String>,
    pub status_hash: String,
}

/// Quiet summary of proof-recorded holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofPage {
    pub title: String,
    pub lines: Vec<String>,
    pub status_hash: String,
}

/// Canonical form shared by both page kinds
pub(crate) fn page_canonical(kind: &str, title: &str, lines: &[String]) -> String {
    format!("{}|{}|{}|{}", crate::CANON_PAGE, kind, title, lines.join("|"))
}

impl DelegatePage {
    pub fn canonical_string(&self) -> String {
        page_canonical("delegate", &self.title, &self.lines)
    }
}

impl ProofPage {
    pub fn canonical_string(&self) -> String {
        page_canonical("proof", &self.title, &self.lines)
    }
}
