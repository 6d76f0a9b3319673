//! Orchestrator — the quality-gated state machine that answers a query.
//!
//! ```text
//!   Analyze ──► Execute ──► Synthesize ──► QualityCheck ──pass/fail──► Format ──► Done
//!      ▲                                        │
//!      │                                      retry
//!      │                                        ▼
//!      └──────────────── retry ─────────────  Retry ──give_up──► Format
//! ```
//!
//! The only back-edge is `Retry -> Analyze`, bounded by `max_retries`. A
//! second guard, `max_iterations`, caps how often `Analyze` may be entered.
//! Cancellation is checked at every stage boundary and sends the run
//! straight to `Format`. No stage can fail the run: tool errors become
//! recorded errors and fallbacks, and `Format` always leaves a non-empty
//! answer.

pub mod format;
pub mod quality;
pub mod retry;
pub mod routing;
pub mod synthesizer;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::AgentConfig;
use crate::error::ConfigError;
use crate::state::{RunExit, RunState};
use crate::tools::ToolRegistry;
use crate::workflow::{
    ClassifierRules, ExecutionContext, PlannedWorkflow, Planner, StepExecutor, WorkflowRunner,
};

pub use format::format_report;
pub use quality::{QualityGate, QualityVerdict};
pub use retry::{build_feedback, RetryController};
pub use routing::{check_quality, should_retry, QualityRoute, RetryRoute, Stage};
pub use synthesizer::{Synthesis, Synthesizer};

pub struct Orchestrator {
    config: AgentConfig,
    registry: Arc<ToolRegistry>,
    planner: Planner,
}

impl Orchestrator {
    /// Build an orchestrator, loading classifier rules from
    /// `config.rules_file` when one is set.
    pub fn new(config: AgentConfig, registry: Arc<ToolRegistry>) -> Result<Self, ConfigError> {
        let rules = match &config.rules_file {
            Some(path) => {
                tracing::info!("[Orchestrator] Loading classifier rules from {}", path.display());
                ClassifierRules::from_file(path)?
            }
            None => ClassifierRules::default(),
        };
        let planner = Planner::from_rules(&rules)?;
        Ok(Self::with_planner(config, registry, planner))
    }

    pub fn with_planner(config: AgentConfig, registry: Arc<ToolRegistry>, planner: Planner) -> Self {
        Self {
            config,
            registry,
            planner,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    /// Classify and plan without executing anything.
    pub fn analyze(&self, query: &str) -> PlannedWorkflow {
        self.planner.analyze(query)
    }

    pub async fn run(&self, query: &str) -> RunState {
        self.run_with_cancel(query, &CancellationToken::new()).await
    }

    /// Drive one query through the state machine.
    pub async fn run_with_cancel(&self, query: &str, cancel: &CancellationToken) -> RunState {
        let mut state = RunState::new(query);
        tracing::info!("[Orchestrator] Run {} started: {}", state.run_id, query);

        let runner = WorkflowRunner::new(StepExecutor::new(
            self.registry.clone(),
            self.config.max_tokens,
        ));
        let synthesizer = Synthesizer::new(self.registry.clone(), self.config.max_tokens);
        let quality = QualityGate::new(self.registry.clone(), self.config.quality_threshold);
        let retry = RetryController::new(self.config.quality_threshold);

        let mut stage = Stage::Analyze;
        while stage != Stage::Done {
            if !stage.is_terminal() && cancel.is_cancelled() {
                tracing::warn!("[Orchestrator] Cancelled during {}", stage.as_str());
                state.record_error(format!("Run cancelled during {}", stage.as_str()));
                state.exit = Some(RunExit::Cancelled);
                stage = self.transition(&mut state, stage, Stage::Format, Some("cancelled"));
                continue;
            }

            let next = match stage {
                Stage::Analyze => self.analyze_stage(&mut state),
                Stage::Execute => {
                    self.execute_stage(&mut state, &runner, cancel).await;
                    (Stage::Synthesize, None)
                }
                Stage::Synthesize => {
                    self.synthesize_stage(&mut state, &synthesizer, cancel).await;
                    (Stage::QualityCheck, None)
                }
                Stage::QualityCheck => self.quality_stage(&mut state, &quality, cancel).await,
                Stage::Retry => {
                    retry.prepare(&mut state);
                    match should_retry(state.retry_count, self.config.max_retries) {
                        RetryRoute::Retry => (Stage::Analyze, Some(RetryRoute::Retry.label())),
                        RetryRoute::GiveUp => {
                            state.exit = Some(RunExit::GiveUp);
                            (Stage::Format, Some(RetryRoute::GiveUp.label()))
                        }
                    }
                }
                Stage::Format => {
                    self.format_stage(&mut state);
                    (Stage::Done, None)
                }
                Stage::Done => break,
            };

            stage = self.transition(&mut state, stage, next.0, next.1);
        }

        tracing::info!(
            "[Orchestrator] Run {} finished: {} after {} attempt(s)",
            state.run_id,
            state.exit.map(|e| e.as_str()).unwrap_or("unknown"),
            state.attempts
        );
        state
    }

    fn transition(
        &self,
        state: &mut RunState,
        from: Stage,
        to: Stage,
        label: Option<&str>,
    ) -> Stage {
        match label {
            Some(l) => tracing::debug!("[Orchestrator] {} -> {} ({})", from.as_str(), to.as_str(), l),
            None => tracing::debug!("[Orchestrator] {} -> {}", from.as_str(), to.as_str()),
        }
        state.record_route(from.as_str(), to.as_str(), label);
        to
    }

    // ─── Stages ──────────────────────────────────────────────────────────

    fn analyze_stage(&self, state: &mut RunState) -> (Stage, Option<&'static str>) {
        if state.attempts >= self.config.max_iterations {
            tracing::warn!(
                "[Orchestrator] Reached max iterations ({})",
                self.config.max_iterations
            );
            state.record_error(format!(
                "Stopped after {} iterations",
                self.config.max_iterations
            ));
            state.exit = Some(RunExit::IterationLimit);
            return (Stage::Format, Some("iteration_limit"));
        }

        state.attempts += 1;
        state.reset_attempt();

        let planned = self.planner.analyze(&state.query);
        state.record_step(format!(
            "Analyzed query: type={}, tools=[{}], steps={}",
            planned.task_type,
            planned.tool_summary.join(", "),
            planned.plan.len()
        ));
        state.task_type = Some(planned.task_type);
        state.selected_tools = planned.tool_summary;
        state.plan = planned.plan;

        (Stage::Execute, None)
    }

    async fn execute_stage(
        &self,
        state: &mut RunState,
        runner: &WorkflowRunner,
        cancel: &CancellationToken,
    ) {
        let context = ExecutionContext::new(state.query.clone())
            .with_feedback(state.latest_feedback().map(|f| f.to_string()));

        let result = runner
            .run(state.task_type(), &state.plan, context, cancel)
            .await;

        for record in result.failed_steps() {
            state.record_error(format!(
                "Step {} ({}) failed: {}",
                record.ordinal + 1,
                record.tool,
                record.error.as_deref().unwrap_or("unknown error")
            ));
        }

        state.processing_steps.extend(result.processing_steps);
        if result.cancelled {
            state.record_step("Workflow stopped early: run cancelled");
        }
        state.tools_used = result.tools_used;
        state.step_log = result.step_log;
        state.search_results = result.search_results;
        state.analysis = result.analysis;
        state.raw_answer = result.answer;
    }

    async fn synthesize_stage(
        &self,
        state: &mut RunState,
        synthesizer: &Synthesizer,
        cancel: &CancellationToken,
    ) {
        let synthesis = synthesizer.synthesize(state, cancel).await;
        match synthesis.mode {
            Some(mode) => state.record_step(format!("Synthesized answer ({} mode)", mode)),
            None if synthesis.error.is_none() => {
                state.record_step("Used tool output as the answer")
            }
            None => state.record_step("Synthesis failed, using best available answer"),
        }
        if let Some(error) = synthesis.error {
            state.record_error(error);
        }
        state.final_answer = synthesis.answer;
    }

    async fn quality_stage(
        &self,
        state: &mut RunState,
        quality: &QualityGate,
        cancel: &CancellationToken,
    ) -> (Stage, Option<&'static str>) {
        let verdict = quality
            .score(&state.query, &state.final_answer, state.task_type(), cancel)
            .await;
        if verdict.cancelled || cancel.is_cancelled() {
            tracing::warn!("[Orchestrator] Cancelled during quality_check, score discarded");
            state.record_error("Run cancelled during quality_check");
            state.exit = Some(RunExit::Cancelled);
            return (Stage::Format, Some("cancelled"));
        }
        if let Some(error) = verdict.error {
            state.record_error(error);
        }
        state.quality_score = Some(verdict.score);
        state.record_step(format!("Quality score: {:.1}/10", verdict.score));

        let route = check_quality(
            verdict.score,
            state.retry_count,
            self.config.quality_threshold,
            self.config.max_retries,
        );
        match route {
            QualityRoute::Pass => {
                state.exit = Some(RunExit::Pass);
                (Stage::Format, Some(route.label()))
            }
            QualityRoute::Retry => (Stage::Retry, Some(route.label())),
            QualityRoute::Fail => {
                state.exit = Some(RunExit::Fail);
                (Stage::Format, Some(route.label()))
            }
        }
    }

    fn format_stage(&self, state: &mut RunState) {
        if state.final_answer.trim().is_empty() {
            state.final_answer = synthesizer::fallback_answer(state);
        }
        state.report = format_report(state);
    }
}
