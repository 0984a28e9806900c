//! Attention-Envelope Engine: bounded, reversible modulation of pressure
//!
//! Effects on a pressure value:
//! - ON_CALL:   horizon -1 step, magnitude +1 bucket, cap delta +1
//! - TRAVEL:    horizon -1 step
//! - WORKING:   magnitude +1 bucket
//! - EMERGENCY: horizon -1 step, magnitude +1 bucket, cap delta +1
//! - NONE, and every COMMERCE pressure: untouched

use std::str::FromStr;
use tracing::debug;
use crate::core::collaborators::Clock;
use crate::core::hashing::hash_canonical;
use crate::core::period::{parse_period_key, period_key, period_key_after};
use crate::error::{ValidationError, ValidationResult};
use crate::types::{
    AttentionEnvelope, DurationBucket, EnvelopeKind, EnvelopeReason, EnvelopeState,
    EnvelopeSummary, PressureCircleType, PressureDecisionInput,
};

/// Raw envelope request as it arrives from a caller
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EnvelopeRequest {
    pub kind: String,
    pub duration_bucket: String,
    pub reason: String,
    pub circle_id_hash: String,
}

/// Validated envelope request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEnvelopeRequest {
    pub kind: EnvelopeKind,
    pub duration_bucket: DurationBucket,
    pub reason: EnvelopeReason,
    pub circle_id_hash: String,
}

impl EnvelopeRequest {
    /// Validate every field. The first failure is returned and nothing is built.
    pub fn parse(&self) -> ValidationResult<ParsedEnvelopeRequest> {
        Ok(ParsedEnvelopeRequest {
            kind: EnvelopeKind::from_str(self.kind.trim())?,
            duration_bucket: DurationBucket::from_str(self.duration_bucket.trim())?,
            reason: EnvelopeReason::from_str(self.reason.trim())?,
            circle_id_hash: non_blank("circle_id_hash", &self.circle_id_hash)?,
        })
    }
}

/// Envelope engine. Stateless.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvelopeEngine;

impl EnvelopeEngine {
    pub fn new() -> Self {
        Self
    }

    /// Build an active envelope starting in the clock's period
    pub fn build_envelope(
        &self,
        kind: EnvelopeKind,
        duration_bucket: DurationBucket,
        reason: EnvelopeReason,
        circle_id_hash: &str,
        clock: &dyn Clock,
    ) -> ValidationResult<AttentionEnvelope> {
        let circle_id_hash = non_blank("circle_id_hash", circle_id_hash)?;
        let now = clock.now();

        let mut envelope = AttentionEnvelope {
            circle_id_hash,
            kind,
            duration_bucket,
            reason,
            state: EnvelopeState::Active,
            started_period: period_key(now),
            expires_at_period: period_key_after(now, duration_bucket.offset()),
            envelope_id: String::new(),
            status_hash: String::new(),
        };
        envelope.envelope_id = hash_canonical(&envelope.identity_string());
        envelope.status_hash = hash_canonical(&envelope.canonical_string());

        debug!(kind = %kind, duration = %duration_bucket, "envelope built");
        Ok(envelope)
    }

    /// Build from a raw request, validating atomically
    pub fn build_from_request(&self, request: &EnvelopeRequest, clock: &dyn Clock) -> ValidationResult<AttentionEnvelope> {
        let parsed = request.parse()?;
        self.build_envelope(parsed.kind, parsed.duration_bucket, parsed.reason, &parsed.circle_id_hash, clock)
    }

    /// Active state AND not past expiry
    pub fn is_active(&self, envelope: &AttentionEnvelope, clock: &dyn Clock) -> bool {
        envelope.state == EnvelopeState::Active && !self.has_expired(envelope, clock)
    }

    /// Pure time check, independent of stored state. Unparseable expiry counts as expired.
    pub fn has_expired(&self, envelope: &AttentionEnvelope, clock: &dyn Clock) -> bool {
        match parse_period_key(&envelope.expires_at_period) {
            Some(expires) => clock.now().naive_utc() >= expires,
            None => true,
        }
    }

    /// Apply the envelope to a pressure value. Always returns a new value.
    pub fn apply_envelope(
        &self,
        envelope: Option<&AttentionEnvelope>,
        input: &PressureDecisionInput,
    ) -> PressureDecisionInput {
        let Some(envelope) = envelope else {
            return input.clone();
        };
        if envelope.kind == EnvelopeKind::None || input.circle_type == PressureCircleType::Commerce {
            return input.clone();
        }

        let mut output = input.clone();
        if envelope.kind.shifts_horizon() {
            output = output.with_horizon(input.horizon.shift_earlier());
        }
        if envelope.kind.raises_magnitude() {
            output = output.with_magnitude(input.magnitude.increment());
        }

        debug!(
            kind = %envelope.kind,
            horizon = %output.horizon,
            magnitude = %output.magnitude,
            "envelope applied"
        );
        output
    }

    /// Allowed effect on the downstream interrupt cap
    pub fn compute_cap_delta(&self, kind: EnvelopeKind) -> u8 {
        match kind {
            EnvelopeKind::OnCall | EnvelopeKind::Emergency => 1,
            EnvelopeKind::None | EnvelopeKind::Working | EnvelopeKind::Travel => 0,
        }
    }

    /// Explicit stop. Terminal states are returned unchanged.
    pub fn stop_envelope(&self, envelope: &AttentionEnvelope) -> AttentionEnvelope {
        transition(envelope, EnvelopeState::Stopped)
    }

    /// Observed expiry. Terminal states are returned unchanged.
    pub fn expire_envelope(&self, envelope: &AttentionEnvelope) -> AttentionEnvelope {
        transition(envelope, EnvelopeState::Expired)
    }

    /// Expire if time has passed, otherwise return as-is
    pub fn refresh(&self, envelope: &AttentionEnvelope, clock: &dyn Clock) -> AttentionEnvelope {
        if envelope.state == EnvelopeState::Active && self.has_expired(envelope, clock) {
            self.expire_envelope(envelope)
        } else {
            envelope.clone()
        }
    }

    /// The view handed to the signal engine
    pub fn summarize(&self, envelope: Option<&AttentionEnvelope>, clock: &dyn Clock) -> EnvelopeSummary {
        match envelope {
            Some(e) if self.is_active(e, clock) => EnvelopeSummary { active: true, kind: e.kind },
            _ => EnvelopeSummary::inactive(),
        }
    }
}

fn transition(envelope: &AttentionEnvelope, to: EnvelopeState) -> AttentionEnvelope {
    if envelope.state.is_terminal() {
        return envelope.clone();
    }
    let mut next = AttentionEnvelope { state: to, ..envelope.clone() };
    next.status_hash = hash_canonical(&next.canonical_string());
    next
}

fn non_blank(field: &'static str, value: &str) -> ValidationResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankField { field });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crate::core::collaborators::FixedClock;
    use crate::types::{Magnitude, PressureHorizon, TrustStatus};

    fn clock_at(h: u32, m: u32) -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 10, 17, h, m, 0).unwrap())
    }

    fn build(kind: EnvelopeKind, duration: DurationBucket) -> AttentionEnvelope {
        EnvelopeEngine::new()
            .build_envelope(kind, duration, EnvelopeReason::Work, "circle-a", &clock_at(9, 20))
            .unwrap()
    }

    fn pressure(circle_type: PressureCircleType) -> PressureDecisionInput {
        PressureDecisionInput {
            circle_id_hash: "circle-a".into(),
            period_key: "2026-10-17T09:15".into(),
            circle_type,
            horizon: PressureHorizon::Later,
            magnitude: Magnitude::AFew,
            trust_status: TrustStatus::Trusted,
        }
    }

    #[test]
    fn test_build_sets_periods() {
        let e = build(EnvelopeKind::OnCall, DurationBucket::Hour);
        assert_eq!(e.state, EnvelopeState::Active);
        assert_eq!(e.started_period, "2026-10-17T09:15");
        assert_eq!(e.expires_at_period, "2026-10-17T10:15");

        let trip = build(EnvelopeKind::Travel, DurationBucket::Trip);
        assert_eq!(trip.expires_at_period, "2026-10-24T09:15");
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = build(EnvelopeKind::Working, DurationBucket::Day);
        let b = build(EnvelopeKind::Working, DurationBucket::Day);
        assert_eq!(a, b);
        assert_eq!(a.envelope_id.len(), 64);
    }

    #[test]
    fn test_build_rejects_blank_circle() {
        let err = EnvelopeEngine::new()
            .build_envelope(EnvelopeKind::OnCall, DurationBucket::Hour, EnvelopeReason::Work, " ", &clock_at(9, 0))
            .unwrap_err();
        assert_eq!(err, ValidationError::BlankField { field: "circle_id_hash" });
    }

    #[test]
    fn test_request_parse_is_atomic() {
        let request = EnvelopeRequest {
            kind: "on_call".into(),
            duration_bucket: "fortnight".into(),
            reason: "work".into(),
            circle_id_hash: "circle-a".into(),
        };
        let err = EnvelopeEngine::new().build_from_request(&request, &clock_at(9, 0)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidEnum { field: "duration_bucket", value: "fortnight".into() }
        );
    }

    #[test]
    fn test_is_active_and_expiry() {
        let engine = EnvelopeEngine::new();
        let e = build(EnvelopeKind::OnCall, DurationBucket::Hour);
        assert!(engine.is_active(&e, &clock_at(10, 0)));
        assert!(!engine.is_active(&e, &clock_at(10, 15)));
        assert!(engine.has_expired(&e, &clock_at(11, 0)));

        // Stored state still says active: expiry is observed, not written
        assert_eq!(e.state, EnvelopeState::Active);
        let refreshed = engine.refresh(&e, &clock_at(11, 0));
        assert_eq!(refreshed.state, EnvelopeState::Expired);
    }

    #[test]
    fn test_stopped_is_not_active() {
        let engine = EnvelopeEngine::new();
        let e = build(EnvelopeKind::OnCall, DurationBucket::Day);
        let stopped = engine.stop_envelope(&e);
        assert_eq!(stopped.state, EnvelopeState::Stopped);
        assert_ne!(stopped.status_hash, e.status_hash);
        assert_eq!(stopped.envelope_id, e.envelope_id);
        assert!(!engine.is_active(&stopped, &clock_at(9, 30)));
        // Original untouched
        assert_eq!(e.state, EnvelopeState::Active);
    }

    #[test]
    fn test_terminal_states_absorb() {
        let engine = EnvelopeEngine::new();
        let e = build(EnvelopeKind::Travel, DurationBucket::Day);
        let expired = engine.expire_envelope(&e);
        assert_eq!(engine.stop_envelope(&expired).state, EnvelopeState::Expired);
        let stopped = engine.stop_envelope(&e);
        assert_eq!(engine.expire_envelope(&stopped).state, EnvelopeState::Stopped);
    }

    #[test]
    fn test_apply_per_kind() {
        let engine = EnvelopeEngine::new();
        let input = pressure(PressureCircleType::Human);

        let on_call = engine.apply_envelope(Some(&build(EnvelopeKind::OnCall, DurationBucket::Hour)), &input);
        assert_eq!((on_call.horizon, on_call.magnitude), (PressureHorizon::Soon, Magnitude::Several));

        let travel = engine.apply_envelope(Some(&build(EnvelopeKind::Travel, DurationBucket::Hour)), &input);
        assert_eq!((travel.horizon, travel.magnitude), (PressureHorizon::Soon, Magnitude::AFew));

        let working = engine.apply_envelope(Some(&build(EnvelopeKind::Working, DurationBucket::Hour)), &input);
        assert_eq!((working.horizon, working.magnitude), (PressureHorizon::Later, Magnitude::Several));

        let none = engine.apply_envelope(Some(&build(EnvelopeKind::None, DurationBucket::Hour)), &input);
        assert_eq!(none, input);
        assert_eq!(engine.apply_envelope(None, &input), input);
    }

    #[test]
    fn test_commerce_never_modulated() {
        let engine = EnvelopeEngine::new();
        let input = pressure(PressureCircleType::Commerce);
        for kind in EnvelopeKind::ALL {
            let e = build(*kind, DurationBucket::Hour);
            assert_eq!(engine.apply_envelope(Some(&e), &input), input);
        }
    }

    #[test]
    fn test_cap_delta() {
        let engine = EnvelopeEngine::new();
        assert_eq!(engine.compute_cap_delta(EnvelopeKind::OnCall), 1);
        assert_eq!(engine.compute_cap_delta(EnvelopeKind::Emergency), 1);
        assert_eq!(engine.compute_cap_delta(EnvelopeKind::Working), 0);
        assert_eq!(engine.compute_cap_delta(EnvelopeKind::Travel), 0);
        assert_eq!(engine.compute_cap_delta(EnvelopeKind::None), 0);
    }

    #[test]
    fn test_summarize() {
        let engine = EnvelopeEngine::new();
        let e = build(EnvelopeKind::Emergency, DurationBucket::Hour);
        assert_eq!(
            engine.summarize(Some(&e), &clock_at(9, 30)),
            EnvelopeSummary { active: true, kind: EnvelopeKind::Emergency }
        );
        assert_eq!(engine.summarize(Some(&e), &clock_at(12, 0)), EnvelopeSummary::inactive());
        assert_eq!(engine.summarize(None, &clock_at(9, 30)), EnvelopeSummary::inactive());
    }
}
