//! Core engines for Holdline

pub mod hashing;
pub mod period;
pub mod collaborators;
pub mod time_window;
pub mod pressure;
pub mod envelope;
pub mod holding;
pub mod store;
pub mod pages;
pub mod pipeline;

pub use collaborators::{Clock, SystemClock, FixedClock, TrustSource, PreviewSource, ContractStore, StaticTrustSource, StaticPreviewSource};
pub use time_window::TimeWindowEngine;
pub use pressure::signal_to_pressure_input;
pub use envelope::{EnvelopeEngine, EnvelopeRequest};
pub use holding::{HoldingEngine, DelegationContext, restate_contract};
pub use store::InMemoryContractStore;
pub use pages::{build_delegate_page, build_proof_page};
pub use pipeline::{Pipeline, PipelineRequest, PipelineOutcome, SignalEvaluation, EnvelopeStage};
