//! Pipeline: signals → pressure → envelope → holding, for one circle and instant
//!
//! An envelope acts on exactly one stage per run, chosen by `EnvelopeStage`,
//! so its horizon shift is never applied twice.

use serde::{Deserialize, Serialize};
use tracing::info;
use crate::config::HoldlineConfig;
use crate::core::collaborators::Clock;
use crate::core::envelope::EnvelopeEngine;
use crate::core::holding::HoldingEngine;
use crate::core::pages::build_proof_page;
use crate::core::period::period_key;
use crate::core::pressure::signal_to_pressure_input;
use crate::core::time_window::TimeWindowEngine;
use crate::types::{
    AttentionEnvelope, CircleDescriptor, DelegatedHoldingContract, HoldingDecision,
    HoldingProofRecord, PressureDecisionInput, ProofPage, TimeWindowBuildResult,
    TimeWindowInputs, TimeWindowSignal, TrustStatus,
};

/// Where an active envelope takes effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeStage {
    /// Summary fed to the signal engine (horizon shift only)
    #[default]
    Signals,
    /// `apply_envelope` on each pressure value (horizon and magnitude)
    Pressure,
}

/// Everything one run needs besides the clock
#[derive(Debug, Clone)]
pub struct PipelineRequest<'a> {
    pub inputs: &'a TimeWindowInputs,
    pub envelope: Option<&'a AttentionEnvelope>,
    pub envelope_stage: EnvelopeStage,
    pub contract: Option<&'a DelegatedHoldingContract>,
    /// Circle the run is for; each pressure must also match the contract
    /// scope through its own circle type
    pub circle: CircleDescriptor,
    pub trust_status: TrustStatus,
}

/// One signal followed through every stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalEvaluation {
    pub signal: TimeWindowSignal,
    pub pressure: PressureDecisionInput,
    pub modulated: PressureDecisionInput,
    pub decision: HoldingDecision,
    pub proof_record: Option<HoldingProofRecord>,
}

/// Result of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineOutcome {
    pub window: TimeWindowBuildResult,
    pub envelope_active: bool,
    pub cap_delta: u8,
    pub evaluations: Vec<SignalEvaluation>,
    pub proof_page: ProofPage,
}

impl PipelineOutcome {
    /// Proof records queued by this run
    pub fn proof_records(&self) -> Vec<&HoldingProofRecord> {
        self.evaluations.iter().filter_map(|e| e.proof_record.as_ref()).collect()
    }
}

/// The three engines wired together
#[derive(Debug, Default, Clone, Copy)]
pub struct Pipeline {
    time_window: TimeWindowEngine,
    envelope: EnvelopeEngine,
    holding: HoldingEngine,
}

impl Pipeline {
    pub fn new(config: &HoldlineConfig) -> Self {
        Self {
            time_window: TimeWindowEngine::new(),
            envelope: EnvelopeEngine::new(),
            holding: HoldingEngine::with_policy(config.malformed_bucket_policy),
        }
    }

    pub fn holding(&self) -> &HoldingEngine {
        &self.holding
    }

    pub fn envelope(&self) -> &EnvelopeEngine {
        &self.envelope
    }

    /// Run every stage. Pure apart from the clock.
    pub fn evaluate(&self, request: &PipelineRequest<'_>, clock: &dyn Clock) -> PipelineOutcome {
        let now_bucket = period_key(clock.now());
        let summary = self.envelope.summarize(request.envelope, clock);
        let active_envelope = request.envelope.filter(|_| summary.active);

        let mut inputs = request.inputs.clone();
        inputs.envelope = match request.envelope_stage {
            EnvelopeStage::Signals if summary.active => Some(summary),
            _ => None,
        };
        let window = self.time_window.build_signals(Some(&inputs), clock);

        let pressure_envelope = match request.envelope_stage {
            EnvelopeStage::Pressure => active_envelope,
            EnvelopeStage::Signals => None,
        };

        let evaluations: Vec<SignalEvaluation> = window
            .signals
            .iter()
            .map(|signal| {
                let pressure = signal_to_pressure_input(signal, &window.circle_id_hash, &window.period_key)
                    .with_trust_status(request.trust_status);
                let modulated = self.envelope.apply_envelope(pressure_envelope, &pressure);
                let decision = self
                    .holding
                    .apply_contract(request.contract, &modulated, &request.circle, &now_bucket);
                let proof_record = self.holding.build_proof_record(&decision, &modulated);
                SignalEvaluation { signal: signal.clone(), pressure, modulated, decision, proof_record }
            })
            .collect();

        let cap_delta = active_envelope
            .map(|e| self.envelope.compute_cap_delta(e.kind))
            .unwrap_or(0);
        let records: Vec<HoldingProofRecord> =
            evaluations.iter().filter_map(|e| e.proof_record.clone()).collect();
        let proof_page = build_proof_page(&records);

        info!(
            status = %window.status,
            signals = window.signals.len(),
            held = evaluations.iter().filter(|e| e.decision.is_held()).count(),
            "pipeline evaluated"
        );

        PipelineOutcome {
            window,
            envelope_active: summary.active,
            cap_delta,
            evaluations,
            proof_page,
        }
    }
}
