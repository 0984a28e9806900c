//! Time-window inputs, signals and build results

use serde::{Deserialize, Serialize};
use crate::types::{canon_field, canon_list, Source, CircleType, HorizonKind, Magnitude, SignalReason, EnvelopeKind};

/// Abstracted calendar view: is something coming up, how much, how soon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarInput {
    pub has_upcoming: bool,
    pub count: Magnitude,
    pub next_starts_in: HorizonKind,
    #[serde(default)]
    pub evidence_hashes: Vec<String>,
}

/// Abstracted inbox view for one circle kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxInput {
    pub magnitude: Magnitude,
    pub horizon: HorizonKind,
    #[serde(default)]
    pub evidence_hashes: Vec<String>,
}

/// Abstracted device hints. Each hint is an independent candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInput {
    pub transport: Magnitude,
    pub health: Magnitude,
    pub institution: Magnitude,
    pub horizon: HorizonKind,
    #[serde(default)]
    pub evidence_hashes: Vec<String>,
}

/// The only view of an attention envelope the signal engine gets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeSummary {
    pub active: bool,
    pub kind: EnvelopeKind,
}

impl EnvelopeSummary {
    /// No envelope in effect
    pub fn inactive() -> Self {
        Self { active: false, kind: EnvelopeKind::None }
    }

    /// Does this summary pull horizons earlier?
    pub fn shifts_horizon(&self) -> bool {
        self.active && self.kind.shifts_horizon()
    }
}

/// Everything the signal engine evaluates for one circle
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeWindowInputs {
    pub circle_id_hash: String,
    #[serde(default)]
    pub calendar: Option<CalendarInput>,
    #[serde(default)]
    pub inbox_institution: Option<InboxInput>,
    #[serde(default)]
    pub inbox_human: Option<InboxInput>,
    #[serde(default)]
    pub device: Option<DeviceInput>,
    #[serde(default)]
    pub envelope: Option<EnvelopeSummary>,
}

impl TimeWindowInputs {
    /// Are all sources absent?
    pub fn has_no_sources(&self) -> bool {
        self.calendar.is_none()
            && self.inbox_institution.is_none()
            && self.inbox_human.is_none()
            && self.device.is_none()
    }

    /// Canonical text form. Evidence lists are sorted so caller order is irrelevant.
    pub fn canonical_string(&self) -> String {
        let calendar = match &self.calendar {
            Some(c) => format!(
                "cal:{}:{}:{}:{}",
                c.has_upcoming,
                c.count,
                c.next_starts_in,
                sorted_join(&c.evidence_hashes)
            ),
            None => "cal:-".to_string(),
        };
        let inbox = |tag: &str, input: &Option<InboxInput>| match input {
            Some(i) => format!("{}:{}:{}:{}", tag, i.magnitude, i.horizon, sorted_join(&i.evidence_hashes)),
            None => format!("{}:-", tag),
        };
        let device = match &self.device {
            Some(d) => format!(
                "dev:{}:{}:{}:{}:{}",
                d.transport,
                d.health,
                d.institution,
                d.horizon,
                sorted_join(&d.evidence_hashes)
            ),
            None => "dev:-".to_string(),
        };
        let envelope = match &self.envelope {
            Some(e) => format!("env:{}:{}", e.active, e.kind),
            None => "env:-".to_string(),
        };

        format!(
            "{}|{}|{}|{}|{}|{}|{}",
            crate::CANON_TW_INPUTS,
            canon_field(&self.circle_id_hash),
            calendar,
            inbox("ii", &self.inbox_institution),
            inbox("ih", &self.inbox_human),
            device,
            envelope
        )
    }
}

fn sorted_join(hashes: &[String]) -> String {
    let mut sorted: Vec<&str> = hashes.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    canon_list(&sorted)
}

/// One abstract pressure signal. Built once, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindowSignal {
    pub source: Source,
    pub circle_type: CircleType,
    pub horizon_kind: HorizonKind,
    pub reason: SignalReason,
    pub magnitude: Magnitude,
    /// At most 3, sorted
    pub evidence_hashes: Vec<String>,
    pub status_hash: String,
}

impl TimeWindowSignal {
    /// Canonical text form (everything except the status hash itself)
    pub fn canonical_string(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}",
            crate::CANON_SIGNAL,
            self.source,
            self.circle_type,
            self.horizon_kind,
            self.reason,
            self.magnitude,
            canon_list(&self.evidence_hashes)
        )
    }
}

closed_enum! {
    /// Outcome of a signal build
    TimeWindowStatus, field = "status" {
        Ok => "ok",
        Empty => "empty",
        /// Inputs could not be attributed to a circle
        Blocked => "blocked",
    }
}

/// Result of one evaluation. Hashes are the basis for equality and replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindowBuildResult {
    pub signals: Vec<TimeWindowSignal>,
    pub status: TimeWindowStatus,
    pub input_hash: String,
    pub result_hash: String,
    pub period_key: String,
    pub circle_id_hash: String,
}

impl TimeWindowBuildResult {
    /// Canonical text form (everything except the result hash itself)
    pub fn canonical_string(&self) -> String {
        let signal_hashes: Vec<&str> = self.signals.iter().map(|s| s.status_hash.as_str()).collect();
        format!(
            "{}|{}|{}|{}|{}|{}|{}",
            crate::CANON_TW_RESULT,
            canon_field(&self.circle_id_hash),
            self.period_key,
            self.status,
            self.signals.len(),
            signal_hashes.join(","),
            self.input_hash
        )
    }

    /// Signal for a given circle type, if one was kept
    pub fn signal_for(&self, circle_type: CircleType) -> Option<&TimeWindowSignal> {
        self.signals.iter().find(|s| s.circle_type == circle_type)
    }
}
