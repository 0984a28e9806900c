//! Time-Window Signal Engine
//!
//! Pipeline per evaluation:
//! 1. Generate candidates independently per source (skip `nothing`)
//! 2. Cap evidence at 3 (sorted, then truncated)
//! 3. Shift horizons one step earlier under an active on_call/travel/emergency envelope
//! 4. Sort by (source precedence, status hash), keep first per circle type, stop at 3
//!
//! Result and input hashes come from canonical text and are the basis for
//! equality and replay.

use tracing::debug;
use crate::{MAX_EVIDENCE_HASHES, MAX_SIGNALS};
use crate::core::collaborators::Clock;
use crate::core::hashing::hash_canonical;
use crate::core::period::period_key;
use crate::types::{
    CircleType, HorizonKind, Magnitude, SignalReason, Source, TimeWindowBuildResult,
    TimeWindowInputs, TimeWindowSignal, TimeWindowStatus,
};

/// Signal engine. Stateless.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeWindowEngine;

impl TimeWindowEngine {
    pub fn new() -> Self {
        Self
    }

    /// Build the bounded signal set for one circle at the clock's instant
    pub fn build_signals(&self, inputs: Option<&TimeWindowInputs>, clock: &dyn Clock) -> TimeWindowBuildResult {
        let period = period_key(clock.now());

        let Some(inputs) = inputs else {
            return finish(Vec::new(), TimeWindowStatus::Empty, hash_canonical(crate::CANON_TW_INPUTS), period, String::new());
        };

        let input_hash = hash_canonical(&inputs.canonical_string());
        let circle_id_hash = inputs.circle_id_hash.trim().to_string();

        if circle_id_hash.is_empty() {
            debug!("time window blocked: no circle attribution");
            return finish(Vec::new(), TimeWindowStatus::Blocked, input_hash, period, circle_id_hash);
        }
        if inputs.has_no_sources() {
            return finish(Vec::new(), TimeWindowStatus::Empty, input_hash, period, circle_id_hash);
        }

        let mut candidates = collect_candidates(inputs);

        if inputs.envelope.map(|e| e.shifts_horizon()).unwrap_or(false) {
            candidates = candidates.iter().map(shift_signal).collect();
        }

        let signals = select(candidates);
        let status = if signals.is_empty() {
            TimeWindowStatus::Empty
        } else {
            TimeWindowStatus::Ok
        };

        debug!(status = %status, kept = signals.len(), "time window built");
        finish(signals, status, input_hash, period, circle_id_hash)
    }
}

/// Build a signal with capped evidence and its status hash
pub fn make_signal(
    source: Source,
    circle_type: CircleType,
    horizon_kind: HorizonKind,
    reason: SignalReason,
    magnitude: Magnitude,
    evidence: &[String],
) -> TimeWindowSignal {
    let mut signal = TimeWindowSignal {
        source,
        circle_type,
        horizon_kind,
        reason,
        magnitude,
        evidence_hashes: cap_evidence(evidence),
        status_hash: String::new(),
    };
    signal.status_hash = hash_canonical(&signal.canonical_string());
    signal
}

/// Sort lexicographically, keep the first 3
pub fn cap_evidence(evidence: &[String]) -> Vec<String> {
    let mut sorted = evidence.to_vec();
    sorted.sort();
    sorted.truncate(MAX_EVIDENCE_HASHES);
    sorted
}

/// New signal one horizon step earlier
fn shift_signal(signal: &TimeWindowSignal) -> TimeWindowSignal {
    make_signal(
        signal.source,
        signal.circle_type,
        signal.horizon_kind.shift_earlier(),
        signal.reason,
        signal.magnitude,
        &signal.evidence_hashes,
    )
}

fn collect_candidates(inputs: &TimeWindowInputs) -> Vec<TimeWindowSignal> {
    let mut candidates = Vec::new();

    if let Some(cal) = &inputs.calendar {
        if cal.has_upcoming && cal.count != Magnitude::Nothing {
            candidates.push(make_signal(
                Source::Calendar,
                CircleType::SelfCircle,
                cal.next_starts_in,
                SignalReason::MeetingUpcoming,
                cal.count,
                &cal.evidence_hashes,
            ));
        }
    }

    if let Some(inbox) = &inputs.inbox_institution {
        if inbox.magnitude != Magnitude::Nothing {
            candidates.push(make_signal(
                Source::InboxInstitution,
                CircleType::Institution,
                inbox.horizon,
                SignalReason::InstitutionWaiting,
                inbox.magnitude,
                &inbox.evidence_hashes,
            ));
        }
    }

    if let Some(inbox) = &inputs.inbox_human {
        if inbox.magnitude != Magnitude::Nothing {
            candidates.push(make_signal(
                Source::InboxHuman,
                CircleType::Human,
                inbox.horizon,
                SignalReason::HumanWaiting,
                inbox.magnitude,
                &inbox.evidence_hashes,
            ));
        }
    }

    if let Some(device) = &inputs.device {
        let hints = [
            (device.transport, CircleType::SelfCircle, SignalReason::TransportHint),
            (device.health, CircleType::SelfCircle, SignalReason::HealthHint),
            (device.institution, CircleType::Institution, SignalReason::InstitutionHint),
        ];
        for (magnitude, circle_type, reason) in hints {
            if magnitude == Magnitude::Nothing {
                continue;
            }
            candidates.push(make_signal(
                Source::DeviceHint,
                circle_type,
                device.horizon,
                reason,
                magnitude,
                &device.evidence_hashes,
            ));
        }
    }

    candidates
}

/// Deterministic selection: precedence, then status hash; first per circle type
fn select(mut candidates: Vec<TimeWindowSignal>) -> Vec<TimeWindowSignal> {
    candidates.sort_by(|a, b| {
        a.source
            .precedence()
            .cmp(&b.source.precedence())
            .then_with(|| a.status_hash.cmp(&b.status_hash))
    });

    let mut kept: Vec<TimeWindowSignal> = Vec::with_capacity(MAX_SIGNALS);
    for candidate in candidates {
        if kept.len() >= MAX_SIGNALS {
            break;
        }
        if kept.iter().any(|k| k.circle_type == candidate.circle_type) {
            continue;
        }
        kept.push(candidate);
    }
    kept
}

fn finish(
    signals: Vec<TimeWindowSignal>,
    status: TimeWindowStatus,
    input_hash: String,
    period_key: String,
    circle_id_hash: String,
) -> TimeWindowBuildResult {
    let mut result = TimeWindowBuildResult {
        signals,
        status,
        input_hash,
        result_hash: String::new(),
        period_key,
        circle_id_hash,
    };
    result.result_hash = hash_canonical(&result.canonical_string());
    result
}
