//! Signal → pressure-decision mapping

use crate::types::{
    CircleType, HorizonKind, PressureCircleType, PressureDecisionInput, PressureHorizon,
    TimeWindowSignal, TrustStatus,
};

/// Pure 1:1 mapping. Trust status starts unknown; the caller fills it in.
pub fn signal_to_pressure_input(signal: &TimeWindowSignal, circle_id_hash: &str, period_key: &str) -> PressureDecisionInput {
    PressureDecisionInput {
        circle_id_hash: circle_id_hash.to_string(),
        period_key: period_key.to_string(),
        circle_type: map_circle_type(signal.circle_type),
        horizon: map_horizon(signal.horizon_kind),
        magnitude: signal.magnitude,
        trust_status: TrustStatus::Unknown,
    }
}

/// Self is a human circle downstream
pub fn map_circle_type(circle_type: CircleType) -> PressureCircleType {
    match circle_type {
        CircleType::Human | CircleType::SelfCircle => PressureCircleType::Human,
        CircleType::Institution => PressureCircleType::Institution,
    }
}

/// today and later collapse to later
pub fn map_horizon(horizon: HorizonKind) -> PressureHorizon {
    match horizon {
        HorizonKind::Now => PressureHorizon::Now,
        HorizonKind::Soon => PressureHorizon::Soon,
        HorizonKind::Today | HorizonKind::Later => PressureHorizon::Later,
    }
}
