//! Integration tests for Slice 4
//!
//! Tests the full path: inputs + envelope → signals → pressure → contract → pages

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

use holdline::config::{HoldlineConfig, MalformedBucketPolicy};
use holdline::core::period::period_key;
use holdline::core::{
    build_delegate_page, signal_to_pressure_input, ContractStore, DelegationContext,
    EnvelopeEngine, EnvelopeStage, FixedClock, HoldingEngine, InMemoryContractStore, Pipeline,
    PipelineRequest, StaticPreviewSource, StaticTrustSource, TimeWindowEngine,
};
use holdline::types::{
    CalendarInput, CircleCategory, CircleDescriptor, CircleKind, ContractState, CreateContractInput, DelegationAction,
    DelegationScope, DurationBucket, EligibilityReason, EnvelopeKind, EnvelopeReason, HorizonKind,
    HoldingResult, InboxInput, Magnitude, PressureCircleType, PressureHorizon, TimeWindowInputs,
    TrustStatus,
};

const CIRCLE: &str = "0ddba11";

fn clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2026, 10, 17, 9, 5, 0).unwrap())
}

fn calendar_inputs() -> TimeWindowInputs {
    TimeWindowInputs {
        circle_id_hash: CIRCLE.into(),
        calendar: Some(CalendarInput {
            has_upcoming: true,
            count: Magnitude::AFew,
            next_starts_in: HorizonKind::Later,
            evidence_hashes: vec![],
        }),
        ..Default::default()
    }
}

fn people_contract(action: DelegationAction) -> CreateContractInput {
    CreateContractInput {
        circle_id_hash: CIRCLE.into(),
        scope: DelegationScope::Human,
        max_horizon: PressureHorizon::Later,
        max_magnitude: Magnitude::AFew,
        action,
        duration_bucket: DurationBucket::Day,
        period_key: period_key(clock().0),
    }
}

/// On-call envelope shifts a later meeting to today; a people contract holds it
#[test]
fn test_on_call_calendar_held_by_people_contract() {
    let envelopes = EnvelopeEngine::new();
    let holding = HoldingEngine::new();

    let envelope = envelopes
        .build_envelope(EnvelopeKind::OnCall, DurationBucket::Day, EnvelopeReason::Work, CIRCLE, &clock())
        .unwrap();

    let mut inputs = calendar_inputs();
    inputs.envelope = Some(envelopes.summarize(Some(&envelope), &clock()));
    let window = TimeWindowEngine::new().build_signals(Some(&inputs), &clock());
    assert_eq!(window.signals.len(), 1);
    assert_eq!(window.signals[0].horizon_kind, HorizonKind::Today);

    let pressure = signal_to_pressure_input(&window.signals[0], CIRCLE, &window.period_key);
    assert_eq!(pressure.circle_type, PressureCircleType::Human);
    assert_eq!(pressure.horizon, PressureHorizon::Later);

    let contract = holding.create_contract(&people_contract(DelegationAction::Hold)).unwrap();
    let circle = CircleDescriptor::from_pressure_type(pressure.circle_type);
    let decision = holding.apply_contract(Some(&contract), &pressure, &circle, &window.period_key);
    assert_eq!(decision.result, HoldingResult::Hold);
    assert_eq!(decision.contract_id_hash, contract.contract_id_hash);
}

/// The same scenario through the pipeline and a real store
#[test]
fn test_pipeline_with_store() {
    let config = HoldlineConfig::default();
    let pipeline = Pipeline::new(&config);
    let holding = pipeline.holding();
    let store = InMemoryContractStore::new(*holding, config.store);
    let trust = StaticTrustSource::new([CIRCLE]);
    let previews = StaticPreviewSource::default();
    let ctx = DelegationContext::new(&trust, &previews, &store);
    let now_bucket = period_key(clock().0);

    let envelope = pipeline
        .envelope()
        .build_envelope(EnvelopeKind::OnCall, DurationBucket::Hour, EnvelopeReason::Health, CIRCLE, &clock())
        .unwrap();
    let contract = holding.create_contract(&people_contract(DelegationAction::QueueProof)).unwrap();
    holding.commit_contract(&contract, &ctx, &clock()).unwrap();

    let active = store.get_active_contract(CIRCLE, &now_bucket);
    let inputs = calendar_inputs();
    let outcome = pipeline.evaluate(
        &PipelineRequest {
            inputs: &inputs,
            envelope: Some(&envelope),
            envelope_stage: EnvelopeStage::Signals,
            contract: active.as_ref(),
            circle: CircleDescriptor::from_pressure_type(PressureCircleType::Human),
            trust_status: TrustStatus::Trusted,
        },
        &clock(),
    );

    assert_eq!(outcome.cap_delta, 1);
    assert_eq!(outcome.evaluations[0].decision.result, HoldingResult::QueueProof);
    let records = outcome.proof_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].contract_id_hash, contract.contract_id_hash);
    assert_eq!(records[0].magnitude, Magnitude::AFew);

    let eligibility = holding.can_create_contract(&ctx.build_delegation_inputs(CIRCLE, &now_bucket));
    assert_eq!(eligibility.reason, EligibilityReason::ActiveContractExists);
    let page = build_delegate_page(Some((&contract, ContractState::Active)), &eligibility);
    assert_eq!(page.lines[0], "Holding for people for a day.");
    assert_eq!(page.lines.last().unwrap(), "Already delegated");
}

/// Institution pressure is not held by a people contract
#[test]
fn test_scope_mismatch_passes_through() {
    let holding = HoldingEngine::new();
    let contract = holding.create_contract(&people_contract(DelegationAction::Hold)).unwrap();

    let inputs = TimeWindowInputs {
        circle_id_hash: CIRCLE.into(),
        inbox_institution: Some(InboxInput {
            magnitude: Magnitude::AFew,
            horizon: HorizonKind::Later,
            evidence_hashes: vec![],
        }),
        ..Default::default()
    };
    let outcome = Pipeline::default().evaluate(
        &PipelineRequest {
            inputs: &inputs,
            envelope: None,
            envelope_stage: EnvelopeStage::default(),
            contract: Some(&contract),
            circle: CircleDescriptor::from_pressure_type(PressureCircleType::Institution),
            trust_status: TrustStatus::Unknown,
        },
        &clock(),
    );
    assert_eq!(outcome.evaluations.len(), 1);
    assert_eq!(outcome.evaluations[0].decision.result, HoldingResult::NoEffect);
    assert_eq!(outcome.proof_page.lines, vec!["Nothing was held."]);
}

/// A people circle descriptor does not let a people contract hold institution pressure
#[test]
fn test_institution_pressure_under_people_circle() {
    let holding = HoldingEngine::new();
    let contract = holding.create_contract(&people_contract(DelegationAction::QueueProof)).unwrap();

    let inputs = TimeWindowInputs {
        circle_id_hash: CIRCLE.into(),
        inbox_institution: Some(InboxInput {
            magnitude: Magnitude::AFew,
            horizon: HorizonKind::Later,
            evidence_hashes: vec![],
        }),
        ..Default::default()
    };
    let outcome = Pipeline::default().evaluate(
        &PipelineRequest {
            inputs: &inputs,
            envelope: None,
            envelope_stage: EnvelopeStage::default(),
            contract: Some(&contract),
            circle: CircleDescriptor::new(CircleKind::Sovereign, CircleCategory::Other),
            trust_status: TrustStatus::Trusted,
        },
        &clock(),
    );
    assert_eq!(outcome.evaluations.len(), 1);
    assert_eq!(outcome.evaluations[0].pressure.circle_type, PressureCircleType::Institution);
    assert_eq!(outcome.evaluations[0].decision.result, HoldingResult::NoEffect);
    assert!(outcome.proof_records().is_empty());
}

/// Fail-closed policy turns a corrupted contract bucket into expiry
#[test]
fn test_fail_closed_config() {
    let config = HoldlineConfig::from_toml_str("malformed_bucket_policy = \"fail_closed\"").unwrap();
    assert_eq!(config.malformed_bucket_policy, MalformedBucketPolicy::FailClosed);

    let pipeline = Pipeline::new(&config);
    let mut contract = pipeline
        .holding()
        .create_contract(&people_contract(DelegationAction::Hold))
        .unwrap();
    contract.period_key = "not-a-bucket".into();

    let inputs = calendar_inputs();
    let outcome = pipeline.evaluate(
        &PipelineRequest {
            inputs: &inputs,
            envelope: None,
            envelope_stage: EnvelopeStage::Signals,
            contract: Some(&contract),
            circle: CircleDescriptor::from_pressure_type(PressureCircleType::Human),
            trust_status: TrustStatus::Trusted,
        },
        &clock(),
    );
    assert_eq!(outcome.evaluations[0].decision.result, HoldingResult::NoEffect);

    // Default policy keeps it active
    let outcome = Pipeline::default().evaluate(
        &PipelineRequest {
            inputs: &inputs,
            envelope: None,
            envelope_stage: EnvelopeStage::Signals,
            contract: Some(&contract),
            circle: CircleDescriptor::from_pressure_type(PressureCircleType::Human),
            trust_status: TrustStatus::Trusted,
        },
        &clock(),
    );
    assert_eq!(outcome.evaluations[0].decision.result, HoldingResult::Hold);
}
