//! Holdline CLI
//!
//! Usage:
//!   holdline --demo                         # Built-in on-call scenario
//!   holdline --scenario scenario.json       # Evaluate a scenario file
//!   holdline --scenario s.json --json       # JSON output
//!   holdline --config holdline.toml ...     # Override config defaults

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use holdline::config::HoldlineConfig;
use holdline::core::period::period_key;
use holdline::core::{
    build_delegate_page, ContractStore, DelegationContext, EnvelopeRequest, EnvelopeStage,
    FixedClock, InMemoryContractStore, Pipeline, PipelineOutcome, PipelineRequest,
    StaticPreviewSource, StaticTrustSource,
};
use holdline::error::HoldingError;
use holdline::types::{
    CircleCategory, CircleDescriptor, CircleKind, CreateContractInput, DelegatePage,
    DelegationAction, DelegationScope, DurationBucket, EligibilityDecision, Magnitude,
    PressureHorizon, TimeWindowInputs, TrustStatus,
};
use holdline::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "holdline",
    version = VERSION,
    about = "Holdline - bounded time-window signals, attention envelopes and delegated holding",
    long_about = "Holdline evaluates one circle at one instant.\n\n\
                  Abstract source summaries become at most three time-window signals.\n\
                  An active attention envelope may shift urgency by one step.\n\
                  A delegated holding contract may then hold matching pressure quietly.\n\n\
                  Dispositions:\n  \
                  no_effect    - Pressure passes through\n  \
                  hold         - Pressure is held quietly\n  \
                  queue_proof  - Pressure is held and leaves a proof record"
)]
struct Args {
    /// Scenario file (JSON)
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Run the built-in on-call scenario
    #[arg(short, long)]
    demo: bool,

    /// Config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Log level for holdline targets (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

/// On-call envelope over a calendar signal, with a people contract in place
const DEMO_SCENARIO: &str = r#"{
    "now": "2026-10-17T09:05:00Z",
    "inputs": {
        "circle_id_hash": "demo-circle",
        "calendar": {
            "has_upcoming": true,
            "count": "a_few",
            "next_starts_in": "later",
            "evidence_hashes": []
        }
    },
    "envelope": { "kind": "on_call", "duration_bucket": "day", "reason": "work" },
    "contract": {
        "scope": "human",
        "max_horizon": "later",
        "max_magnitude": "a_few",
        "action": "queue_proof",
        "duration_bucket": "day"
    }
}"#;

/// Envelope as written in a scenario; the circle comes from the inputs
#[derive(Debug, Clone, Deserialize)]
struct ScenarioEnvelope {
    kind: String,
    duration_bucket: String,
    reason: String,
}

/// Contract terms as written in a scenario; circle and period come from the run
#[derive(Debug, Clone, Deserialize)]
struct ScenarioContract {
    scope: DelegationScope,
    max_horizon: PressureHorizon,
    max_magnitude: Magnitude,
    action: DelegationAction,
    duration_bucket: DurationBucket,
}

#[derive(Debug, Clone, Deserialize)]
struct Scenario {
    now: DateTime<Utc>,
    inputs: TimeWindowInputs,
    #[serde(default)]
    envelope: Option<ScenarioEnvelope>,
    #[serde(default)]
    envelope_stage: EnvelopeStage,
    #[serde(default)]
    contract: Option<ScenarioContract>,
    #[serde(default = "default_circle")]
    circle: CircleDescriptor,
    #[serde(default = "default_true")]
    trusted: bool,
    #[serde(default)]
    preview_active: bool,
    #[serde(default)]
    trust_status: TrustStatus,
}

fn default_circle() -> CircleDescriptor {
    CircleDescriptor::new(CircleKind::Sovereign, CircleCategory::Other)
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
struct Report {
    version: &'static str,
    outcome: PipelineOutcome,
    eligibility: EligibilityDecision,
    delegate_page: DelegatePage,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    if args.no_color {
        colored::control::set_override(false);
    }

    let config = match &args.config {
        Some(path) => HoldlineConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => HoldlineConfig::default(),
    };

    let scenario_text = match &args.scenario {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?,
        None => {
            if !args.demo {
                info!("no scenario given, running the demo");
            }
            DEMO_SCENARIO.to_string()
        }
    };
    let scenario: Scenario = serde_json::from_str(&scenario_text).context("parsing scenario")?;

    let report = run_scenario(&scenario, &config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(format!("holdline={level}")),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("holdline=info")),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Wire the collaborators for one scenario and run the pipeline
fn run_scenario(scenario: &Scenario, config: &HoldlineConfig) -> Result<Report> {
    let clock = FixedClock(scenario.now);
    let now_bucket = period_key(scenario.now);
    let circle_hash = scenario.inputs.circle_id_hash.trim().to_string();

    let pipeline = Pipeline::new(config);
    let holding = pipeline.holding();
    let store = InMemoryContractStore::new(*holding, config.store);
    let trust = StaticTrustSource::new(scenario.trusted.then(|| circle_hash.clone()));
    let previews = StaticPreviewSource::new(scenario.preview_active.then(|| circle_hash.clone()));
    let ctx = DelegationContext::new(&trust, &previews, &store);

    let envelope = scenario
        .envelope
        .as_ref()
        .map(|e| {
            let request = EnvelopeRequest {
                kind: e.kind.clone(),
                duration_bucket: e.duration_bucket.clone(),
                reason: e.reason.clone(),
                circle_id_hash: circle_hash.clone(),
            };
            pipeline.envelope().build_from_request(&request, &clock)
        })
        .transpose()
        .context("building envelope")?;

    if let Some(terms) = &scenario.contract {
        let contract = holding
            .create_contract(&CreateContractInput {
                circle_id_hash: circle_hash.clone(),
                scope: terms.scope,
                max_horizon: terms.max_horizon,
                max_magnitude: terms.max_magnitude,
                action: terms.action,
                duration_bucket: terms.duration_bucket,
                period_key: now_bucket.clone(),
            })
            .context("creating contract")?;
        match holding.commit_contract(&contract, &ctx, &clock) {
            Ok(()) => info!("contract committed"),
            Err(HoldingError::NotEligible(reason)) => {
                warn!(reason = reason.code(), "contract not committed")
            }
            Err(e) => return Err(e).context("committing contract"),
        }
    }

    let active = store.get_active_contract(&circle_hash, &now_bucket);
    let outcome = pipeline.evaluate(
        &PipelineRequest {
            inputs: &scenario.inputs,
            envelope: envelope.as_ref(),
            envelope_stage: scenario.envelope_stage,
            contract: active.as_ref(),
            circle: scenario.circle,
            trust_status: scenario.trust_status,
        },
        &clock,
    );

    let eligibility = holding.can_create_contract(&ctx.build_delegation_inputs(&circle_hash, &now_bucket));
    let latest = store.list_recent_contracts(&circle_hash, 1).into_iter().next();
    let delegate_page = build_delegate_page(
        latest.as_ref().map(|c| (c, holding.compute_state(c, &now_bucket))),
        &eligibility,
    );

    Ok(Report { version: VERSION, outcome, eligibility, delegate_page })
}

fn print_report(report: &Report) {
    let outcome = &report.outcome;
    println!("{}", format!("Holdline v{}", report.version).bold());
    println!(
        "{} {}  {} {}",
        "period".dimmed(),
        outcome.window.period_key,
        "status".dimmed(),
        outcome.window.status
    );
    if outcome.envelope_active {
        println!("{} active, cap +{}", "envelope".dimmed(), outcome.cap_delta);
    }
    println!();

    for eval in &outcome.evaluations {
        let disposition = eval.decision.result.to_string();
        let disposition = if eval.decision.is_held() {
            disposition.green()
        } else {
            disposition.normal()
        };
        println!(
            "  {:<18} {:<12} {:<6} {:<8} → {}",
            eval.signal.source.as_str().cyan(),
            eval.signal.circle_type.as_str(),
            eval.modulated.horizon.as_str(),
            eval.modulated.magnitude.as_str(),
            disposition
        );
    }
    if outcome.evaluations.is_empty() {
        println!("  {}", "no signals".dimmed());
    }
    println!();

    print_page(&report.delegate_page.title, &report.delegate_page.lines);
    print_page(&outcome.proof_page.title, &outcome.proof_page.lines);
}

fn print_page(title: &str, lines: &[String]) {
    println!("{}", title.bold());
    for line in lines {
        println!("  {}", line);
    }
    println!();
}
