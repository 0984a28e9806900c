//! Pressure-decision value: the currency shared by all three stages

use serde::{Deserialize, Serialize};
use crate::types::Magnitude;

closed_enum! {
    /// Circle category as seen by downstream policy
    PressureCircleType, field = "pressure_circle_type" {
        Human => "human",
        Institution => "institution",
        /// Never modulated by an envelope
        Commerce => "commerce",
    }
}

closed_enum! {
    /// Coarse pressure horizon: now < soon < later
    PressureHorizon, field = "pressure_horizon" {
        Now => "now",
        Soon => "soon",
        Later => "later",
    }
}

impl PressureHorizon {
    /// One step earlier, floored at `now`
    pub fn shift_earlier(self) -> Self {
        match self {
            PressureHorizon::Later => PressureHorizon::Soon,
            PressureHorizon::Soon | PressureHorizon::Now => PressureHorizon::Now,
        }
    }
}

closed_enum! {
    /// Trust posture of the circle, filled in by the caller
    TrustStatus, field = "trust_status" {
        Unknown => "unknown",
        Trusted => "trusted",
        Degraded => "degraded",
    }
}

impl Default for TrustStatus {
    fn default() -> Self {
        TrustStatus::Unknown
    }
}

/// Every transform returns a new value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PressureDecisionInput {
    pub circle_id_hash: String,
    pub period_key: String,
    pub circle_type: PressureCircleType,
    pub horizon: PressureHorizon,
    pub magnitude: Magnitude,
    #[serde(default)]
    pub trust_status: TrustStatus,
}

impl PressureDecisionInput {
    /// Copy with a different horizon
    pub fn with_horizon(&self, horizon: PressureHorizon) -> Self {
        Self { horizon, ..self.clone() }
    }

    /// Copy with a different magnitude
    pub fn with_magnitude(&self, magnitude: Magnitude) -> Self {
        Self { magnitude, ..self.clone() }
    }

    /// Copy with the caller's trust status
    pub fn with_trust_status(&self, trust_status: TrustStatus) -> Self {
        Self { trust_status, ..self.clone() }
    }
}
