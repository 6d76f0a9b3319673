//! Workflow runner — executes a plan step by step.
//!
//! Steps run strictly in plan order. A failing step is logged and the run
//! moves on; later steps simply see less context. Once every step has run,
//! the runner derives the attempt's result fields from the context.

use tokio_util::sync::CancellationToken;

use crate::state::StepRecord;
use crate::workflow::executor::{ExecutionContext, StepExecutor};
use crate::workflow::schema::{TaskType, WorkflowPlan};

/// Output of one plan run.
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    /// Tools whose step succeeded, in plan order
    pub tools_used: Vec<String>,
    pub step_log: Vec<StepRecord>,
    /// Set only when the raw search result is the best thing we have
    pub search_results: Option<String>,
    /// Explanation, else summary
    pub analysis: Option<String>,
    /// Best raw answer for the synthesizer
    pub answer: Option<String>,
    /// Human-readable trace lines
    pub processing_steps: Vec<String>,
    pub context: ExecutionContext,
    /// Stopped early because the run was cancelled
    pub cancelled: bool,
}

impl RunResult {
    pub fn failed_steps(&self) -> impl Iterator<Item = &StepRecord> {
        self.step_log.iter().filter(|r| !r.succeeded)
    }
}

pub struct WorkflowRunner {
    executor: StepExecutor,
}

impl WorkflowRunner {
    pub fn new(executor: StepExecutor) -> Self {
        Self { executor }
    }

    pub async fn run(
        &self,
        task_type: TaskType,
        plan: &WorkflowPlan,
        mut context: ExecutionContext,
        cancel: &CancellationToken,
    ) -> RunResult {
        let mut result = RunResult::default();

        for step in plan {
            if cancel.is_cancelled() {
                tracing::warn!(
                    "[WorkflowRunner] Cancelled before step {} ({})",
                    step.ordinal,
                    step.label()
                );
                result.cancelled = true;
                break;
            }

            tracing::info!(
                "[WorkflowRunner] Step {}: {} ({})",
                step.ordinal + 1,
                step.action,
                step.label()
            );

            match self.executor.execute(step, &context, cancel).await {
                Ok(output) => {
                    context.set(ExecutionContext::role_for(step), output);
                    result.tools_used.push(step.tool.clone());
                    result
                        .processing_steps
                        .push(format!("{} ({})", step.action, step.label()));
                    result.step_log.push(StepRecord {
                        ordinal: step.ordinal,
                        tool: step.tool.clone(),
                        action: step.action.clone(),
                        succeeded: true,
                        error: None,
                    });
                }
                Err(e) => {
                    tracing::error!(
                        "[WorkflowRunner] Step {} ({}) failed: {}",
                        step.ordinal + 1,
                        step.label(),
                        e
                    );
                    // Credential problems are named in the trace.
                    let note = if e.is_configuration() {
                        format!("{} ({}) skipped: {}", step.action, step.label(), e)
                    } else {
                        format!("{} ({}) failed", step.action, step.label())
                    };
                    result.processing_steps.push(note);
                    result.step_log.push(StepRecord {
                        ordinal: step.ordinal,
                        tool: step.tool.clone(),
                        action: step.action.clone(),
                        succeeded: false,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        derive_fields(task_type, &mut result, &context);
        result.context = context;
        result
    }
}

/// Fill the result fields from the context.
///
/// Priority: explanation, summary, generic answer, raw search result. For
/// dice tasks the dice output always wins.
fn derive_fields(task_type: TaskType, result: &mut RunResult, context: &ExecutionContext) {
    result.analysis = context
        .explanation
        .clone()
        .or_else(|| context.summary.clone());

    let generated = result.analysis.clone().or_else(|| context.answer.clone());
    if generated.is_none() {
        result.search_results = context.search_result.clone();
    }

    let dice = match task_type {
        TaskType::DiceAction => context.dice_result.clone(),
        _ => None,
    };

    result.answer = dice
        .or(generated)
        .or_else(|| result.search_results.clone());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::tools::{Tool, ToolRegistry, DICE_TOOL, GENERATE_TOOL, SEARCH_TOOL};
    use crate::workflow::catalog::base_plan;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    struct Fixed(&'static str, Result<&'static str, &'static str>);

    #[async_trait]
    impl Tool for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "fixed output"
        }

        async fn invoke(&self, params: serde_json::Value) -> Result<String, ToolError> {
            match self.1 {
                Ok(text) => match params.get("mode").and_then(|m| m.as_str()) {
                    Some(mode) => Ok(format!("{}:{}", text, mode)),
                    None => Ok(text.to_string()),
                },
                Err(reason) => Err(ToolError::invocation(self.0, reason)),
            }
        }
    }

    fn runner(tools: Vec<Fixed>) -> WorkflowRunner {
        let mut registry = ToolRegistry::new(Duration::from_secs(5));
        for tool in tools {
            registry.register(Arc::new(tool));
        }
        WorkflowRunner::new(StepExecutor::new(Arc::new(registry), 256))
    }

    #[tokio::test]
    async fn test_research_prefers_explanation() {
        let runner = runner(vec![
            Fixed(SEARCH_TOOL, Ok("results")),
            Fixed(GENERATE_TOOL, Ok("gen")),
        ]);
        let result = runner
            .run(
                TaskType::Research,
                &base_plan(TaskType::Research),
                ExecutionContext::new("latest AI research 2025"),
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(result.tools_used, vec![SEARCH_TOOL, GENERATE_TOOL, GENERATE_TOOL]);
        assert_eq!(result.context.summary.as_deref(), Some("gen:condense"));
        assert_eq!(result.analysis.as_deref(), Some("gen:simplify"));
        assert_eq!(result.answer.as_deref(), Some("gen:simplify"));
        assert!(result.search_results.is_none());
    }

    #[tokio::test]
    async fn test_failed_steps_do_not_abort() {
        let runner = runner(vec![
            Fixed(SEARCH_TOOL, Ok("results")),
            Fixed(GENERATE_TOOL, Err("model down")),
        ]);
        let result = runner
            .run(
                TaskType::Research,
                &base_plan(TaskType::Research),
                ExecutionContext::new("compare a and b"),
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(result.step_log.len(), 3);
        assert!(result.step_log[0].succeeded);
        assert_eq!(result.failed_steps().count(), 2);
        assert!(result.step_log[1]
            .error
            .as_deref()
            .unwrap()
            .contains("model down"));
        assert_eq!(result.search_results.as_deref(), Some("results"));
        assert_eq!(result.answer.as_deref(), Some("results"));
        assert_eq!(result.tools_used, vec![SEARCH_TOOL]);
    }

    #[tokio::test]
    async fn test_dice_result_wins() {
        let runner = runner(vec![Fixed(DICE_TOOL, Ok("Rolled 2d20: 17"))]);
        let result = runner
            .run(
                TaskType::DiceAction,
                &base_plan(TaskType::DiceAction),
                ExecutionContext::new("roll 2d20"),
                &CancellationToken::new(),
            )
            .await;
        assert_eq!(result.answer.as_deref(), Some("Rolled 2d20: 17"));
        assert!(result.analysis.is_none());
    }

    #[tokio::test]
    async fn test_total_failure_leaves_fields_empty() {
        let runner = runner(vec![]);
        let result = runner
            .run(
                TaskType::General,
                &base_plan(TaskType::General),
                ExecutionContext::new("what is photosynthesis"),
                &CancellationToken::new(),
            )
            .await;
        assert_eq!(result.step_log.len(), 1);
        assert!(!result.step_log[0].succeeded);
        assert!(result.answer.is_none());
        assert!(result.context.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_run_stops() {
        let runner = runner(vec![Fixed(SEARCH_TOOL, Ok("results"))]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = runner
            .run(
                TaskType::Research,
                &base_plan(TaskType::Research),
                ExecutionContext::new("q"),
                &cancel,
            )
            .await;
        assert!(result.cancelled);
        assert!(result.step_log.is_empty());
    }

    struct Unconfigured;

    #[async_trait]
    impl Tool for Unconfigured {
        fn name(&self) -> &str {
            SEARCH_TOOL
        }

        fn description(&self) -> &str {
            "no credentials"
        }

        async fn invoke(&self, _params: serde_json::Value) -> Result<String, ToolError> {
            Err(ToolError::Configuration("TAVILY_API_KEY is not set".to_string()))
        }
    }

    #[tokio::test]
    async fn test_configuration_failure_is_named_in_trace() {
        let registry = ToolRegistry::new(Duration::from_secs(5))
            .with_tool(Arc::new(Unconfigured))
            .with_tool(Arc::new(Fixed(GENERATE_TOOL, Ok("gen"))));
        let runner = WorkflowRunner::new(StepExecutor::new(Arc::new(registry), 256));
        let result = runner
            .run(
                TaskType::Research,
                &base_plan(TaskType::Research),
                ExecutionContext::new("compare a and b"),
                &CancellationToken::new(),
            )
            .await;

        assert!(result.processing_steps[0].contains("skipped: Configuration error: TAVILY_API_KEY"));
        assert!(result.processing_steps[1].ends_with(")"));
        assert!(!result.processing_steps[1].contains("skipped"));
    }
}
