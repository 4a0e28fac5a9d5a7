//! Signalscope CLI - run a market-signal research pipeline from the terminal.

mod render;

use anyhow::{bail, Context};
use clap::Parser;
use signalscope_core::{
    load_config, GeminiGateway, HttpProfileStore, PipelineError, ProfileStore, ResearchPipeline,
    RunState, SignalReport,
};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Signalscope: validated problem patterns for a target market
#[derive(Parser, Debug)]
#[command(name = "signalscope", version, about, long_about = None)]
struct Cli {
    /// Free-text description of the target market, e.g. "gym owners"
    market: String,

    /// Model to use (overrides configuration)
    #[arg(short, long)]
    model: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Profile id to check credits against (skips the check if omitted)
    #[arg(short, long)]
    user_id: Option<String>,

    /// Emit the report as JSON instead of formatted text
    #[arg(long)]
    json: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("signalscope={default}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let market = cli.market.trim();
    if market.is_empty() {
        bail!("market description must not be blank");
    }

    let mut config =
        load_config(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(model) = cli.model {
        config.llm.model = model;
    }
    tracing::debug!(model = config.llm.model.as_str(), "configuration loaded");

    let missing = config.missing_secrets();
    if !missing.is_empty() {
        eprintln!("signalscope is not configured. Missing secrets:");
        for var in &missing {
            eprintln!("  - {var}");
        }
        eprintln!("Set them in the environment or in signalscope.toml.");
        std::process::exit(2);
    }

    // Free-tier gate: the caller's concern, consulted before any paid call.
    let store = HttpProfileStore::new(&config.profile_store)
        .context("failed to initialize profile store")?;
    if let Some(user_id) = &cli.user_id {
        let profile = store
            .get_profile(user_id)
            .await
            .context("failed to fetch profile")?;
        match profile {
            Some(p) if !p.has_free_run() => {
                bail!("free-tier limit reached: upgrade to run more research");
            }
            _ => {}
        }
    }

    let gateway = GeminiGateway::new(&config.llm).context("failed to initialize gateway")?;
    let pipeline = ResearchPipeline::new(gateway);

    // A Ctrl-C flips the token so an abandoned run stops between stages
    // instead of continuing to consume paid backend calls.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    match drive(&pipeline, market, &cancel).await {
        Ok(report) => {
            // Best-effort: a lost credit tick never fails the run.
            if let Some(user_id) = &cli.user_id {
                store.increment_credits(user_id).await;
            }
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render::render_report(&report));
            }
            Ok(())
        }
        Err(e) => {
            render::print_progress(RunState::Failed);
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    }
}

/// Run the stages one at a time, rendering progress from an explicit
/// caller-owned run state. The pipeline itself stays stateless.
async fn drive<G: signalscope_core::ModelGateway>(
    pipeline: &ResearchPipeline<G>,
    market: &str,
    cancel: &CancellationToken,
) -> Result<SignalReport, PipelineError> {
    let mut state = RunState::Idle;

    state = state.next();
    render::print_progress(state);
    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }
    let plan = pipeline.plan(market).await?;

    state = state.next();
    render::print_progress(state);
    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }
    let findings = pipeline.gather_findings(market, &plan).await?;

    state = state.next();
    render::print_progress(state);
    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }
    let report = pipeline.analyze(market, &findings).await?;

    render::print_progress(RunState::Completed);
    Ok(report)
}
