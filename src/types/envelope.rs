//! Attention envelope types
//!
//! State machine:
//! - ACTIVE → EXPIRED: time passed expiry (observed, never scheduled)
//! - ACTIVE → STOPPED: explicit caller action
//! - EXPIRED, STOPPED: absorbing

use serde::{Deserialize, Serialize};
use crate::types::{canon_field, DurationBucket};

closed_enum! {
    /// Declared operating mode
    EnvelopeKind, field = "envelope_kind" {
        None => "none",
        OnCall => "on_call",
        Working => "working",
        Travel => "travel",
        Emergency => "emergency",
    }
}

impl EnvelopeKind {
    /// Kinds that pull horizons one step earlier
    pub fn shifts_horizon(&self) -> bool {
        matches!(self, EnvelopeKind::OnCall | EnvelopeKind::Travel | EnvelopeKind::Emergency)
    }

    /// Kinds that raise magnitude one bucket
    pub fn raises_magnitude(&self) -> bool {
        matches!(self, EnvelopeKind::OnCall | EnvelopeKind::Working | EnvelopeKind::Emergency)
    }

    pub fn display_text(&self) -> &'static str {
        match self {
            EnvelopeKind::None => "No mode",
            EnvelopeKind::OnCall => "On call",
            EnvelopeKind::Working => "Working",
            EnvelopeKind::Travel => "Travelling",
            EnvelopeKind::Emergency => "Emergency",
        }
    }
}

closed_enum! {
    /// Why the mode was declared
    EnvelopeReason, field = "envelope_reason" {
        Work => "work",
        Family => "family",
        Health => "health",
        Travel => "travel",
        Other => "other",
    }
}

closed_enum! {
    EnvelopeState, field = "envelope_state" {
        Active => "active",
        Expired => "expired",
        Stopped => "stopped",
    }
}

impl EnvelopeState {
    /// Terminal states absorb every further transition
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EnvelopeState::Active)
    }
}

/// A short-lived declared operating mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttentionEnvelope {
    pub circle_id_hash: String,
    pub kind: EnvelopeKind,
    pub duration_bucket: DurationBucket,
    pub reason: EnvelopeReason,
    pub state: EnvelopeState,
    pub started_period: String,
    pub expires_at_period: String,
    pub envelope_id: String,
    pub status_hash: String,
}

impl AttentionEnvelope {
    /// Identity form: fixed at build time, excludes state
    pub fn identity_string(&self) -> String {
        format!(
            "{}|id|{}|{}|{}|{}|{}",
            crate::CANON_ENVELOPE,
            canon_field(&self.circle_id_hash),
            self.kind,
            self.duration_bucket,
            self.reason,
            self.started_period
        )
    }

    /// Status form: identity plus everything that can change
    pub fn canonical_string(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}|{}",
            crate::CANON_ENVELOPE,
            self.envelope_id,
            canon_field(&self.circle_id_hash),
            self.kind,
            self.duration_bucket,
            self.reason,
            self.state,
            self.expires_at_period
        )
    }
}
