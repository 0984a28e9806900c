//! Holdline: deterministic attention-pressure pipeline
//!
//! Three stages share one currency, the `PressureDecisionInput`:
//! time-window signals → attention envelope → delegated holding contract.
//! Every operation is a pure function of its inputs plus an injected clock.

pub mod config;
pub mod core;
pub mod error;
pub mod types;

// =============================================================================
// BOUNDS [C]
// =============================================================================

/// Maximum number of signals kept per build (at most one per circle type)
pub const MAX_SIGNALS: usize = 3;

/// Evidence hashes kept per signal after sorting
pub const MAX_EVIDENCE_HASHES: usize = 3;

/// Width of a period bucket in minutes
pub const PERIOD_MINUTES: u32 = 15;

// =============================================================================
// DURATION OFFSETS [C] - shared by envelopes and contracts
// =============================================================================

/// Hour bucket offset (hours)
pub const DURATION_HOUR_HOURS: i64 = 1;

/// Day bucket offset (hours)
pub const DURATION_DAY_HOURS: i64 = 24;

/// Trip bucket offset (hours) - 7 days
pub const DURATION_TRIP_HOURS: i64 = 24 * 7;

// =============================================================================
// CANONICAL FORMS [C] - bump the tag when a layout changes
// =============================================================================

pub const CANON_SIGNAL: &str = "TW_SIGNAL|v1";
pub const CANON_TW_INPUTS: &str = "TW_INPUTS|v1";
pub const CANON_TW_RESULT: &str = "TW_RESULT|v1";
pub const CANON_ENVELOPE: &str = "ENVELOPE|v1";
pub const CANON_CONTRACT: &str = "DELEGATION|v1";
pub const CANON_REVOCATION: &str = "DELEGATION_REVOKE|v1";
pub const CANON_PROOF_RECORD: &str = "DELEGATION_PROOF|v1";
pub const CANON_PAGE: &str = "PAGE|v1";

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
