//! The three-stage research pipeline.
//!
//! A strictly sequential chain: plan -> research -> analyze. Each stage's
//! prompt depends on the previous stage's full output, so there is no
//! internal parallelism and no partial resume: the first failure terminates
//! the run and the caller restarts from stage 1 if the user retries.
//!
//! The pipeline is stateless and reentrant - it owns only the gateway
//! handle. Run state is an explicit value ([`RunState`]) owned by the
//! caller, which is also responsible for not starting overlapping runs.

pub mod prompts;

use crate::error::{PipelineError, StageError};
use crate::gateway::ModelGateway;
use crate::report::{ResearchPlan, SignalReport};
use crate::schema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

/// Caller-owned run state for progress display and run serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Planning,
    Researching,
    Analyzing,
    Completed,
    Failed,
}

impl RunState {
    /// The state a successfully finishing stage hands over to.
    pub fn next(self) -> RunState {
        match self {
            RunState::Idle => RunState::Planning,
            RunState::Planning => RunState::Researching,
            RunState::Researching => RunState::Analyzing,
            RunState::Analyzing => RunState::Completed,
            done @ (RunState::Completed | RunState::Failed) => done,
        }
    }
}

/// Orchestrates the three stages over a [`ModelGateway`].
pub struct ResearchPipeline<G: ModelGateway> {
    gateway: G,
}

impl<G: ModelGateway> ResearchPipeline<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    /// Stage 1: turn a market description into a structured research plan.
    ///
    /// The market string must be non-blank; rejecting blank input is the
    /// caller's responsibility before invoking.
    pub async fn plan(&self, market: &str) -> Result<ResearchPlan, PipelineError> {
        self.structured_stage(
            market,
            prompts::planning_prompt(market),
            schema::research_plan_schema(),
            PipelineError::Planning,
        )
        .await
    }

    /// Stage 2: gather raw findings grounded in the plan.
    ///
    /// Never fails on empty findings - the gateway substitutes the no-data
    /// sentinel and analysis proceeds over it. Only hard backend errors
    /// fail this stage.
    pub async fn gather_findings(
        &self,
        market: &str,
        plan: &ResearchPlan,
    ) -> Result<String, PipelineError> {
        let prompt = prompts::research_prompt(market, plan);
        let findings = self
            .gateway
            .generate_with_search(&prompt)
            .await
            .map_err(|e| PipelineError::Research(StageError::Gateway(e)))?;
        info!(chars = findings.len(), "research findings gathered");
        Ok(findings)
    }

    /// Stage 3: extract and classify signal patterns from the findings.
    pub async fn analyze(
        &self,
        market: &str,
        findings: &str,
    ) -> Result<SignalReport, PipelineError> {
        let report: SignalReport = self
            .structured_stage(
                market,
                prompts::analysis_prompt(market, findings),
                schema::signal_report_schema(),
                PipelineError::Analysis,
            )
            .await?;

        for pattern in &report.patterns {
            if !pattern.scores.in_conventional_range() {
                warn!(
                    pattern = pattern.id.as_str(),
                    "scores outside the conventional [1,5] range, passing through"
                );
            }
        }
        Ok(report)
    }

    /// Run all three stages in order, checking for cancellation before each
    /// stage so an abandoned run stops consuming paid backend calls.
    pub async fn run(
        &self,
        market: &str,
        cancel: &CancellationToken,
    ) -> Result<SignalReport, PipelineError> {
        let run_id = Uuid::new_v4();
        info!(%run_id, market, "starting research run");

        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        let plan = self.plan(market).await?;

        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        let findings = self.gather_findings(market, &plan).await?;

        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        self.analyze(market, &findings).await
    }

    /// Shared body of the two structured stages: call the gateway with a
    /// schema, parse the returned text, and re-validate the parsed JSON
    /// against the schema before deserializing into the typed artifact.
    async fn structured_stage<T: DeserializeOwned>(
        &self,
        market: &str,
        prompt: String,
        stage_schema: Value,
        wrap: fn(StageError) -> PipelineError,
    ) -> Result<T, PipelineError> {
        let text = self
            .gateway
            .generate_structured(&prompt, &stage_schema)
            .await
            .map_err(|e| wrap(StageError::Gateway(e)))?;

        let parsed: Value =
            serde_json::from_str(&text).map_err(|e| wrap(StageError::Parse(e)))?;

        schema::validate(&parsed, &stage_schema).map_err(|v| {
            wrap(StageError::SchemaViolation {
                path: v.path,
                message: v.message,
            })
        })?;

        info!(market, "structured stage output validated");
        serde_json::from_value(parsed).map_err(|e| wrap(StageError::Parse(e)))
    }
}
