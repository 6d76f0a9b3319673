//! Run state — the single record threaded through one orchestration run.
//!
//! A `RunState` is owned by the orchestrator for the duration of one query
//! and is never shared between runs.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::workflow::{TaskType, WorkflowPlan};

/// Outcome of one executed workflow step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub ordinal: u32,
    pub tool: String,
    pub action: String,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// How the run left the quality loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunExit {
    /// Score reached the threshold
    Pass,
    /// Score below threshold with no retries left
    Fail,
    /// Retry budget exhausted
    GiveUp,
    /// Cancellation token fired
    Cancelled,
    /// Iteration guard tripped
    IterationLimit,
}

impl RunExit {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunExit::Pass => "pass",
            RunExit::Fail => "fail",
            RunExit::GiveUp => "give_up",
            RunExit::Cancelled => "cancelled",
            RunExit::IterationLimit => "iteration_limit",
        }
    }

    /// Whether the answer should carry a low-confidence note.
    pub fn is_low_confidence(&self) -> bool {
        !matches!(self, RunExit::Pass)
    }
}

/// A state-machine transition, recorded for transparency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteRecord {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunState {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub query: String,

    pub task_type: Option<TaskType>,
    pub plan: WorkflowPlan,
    /// `tool` / `tool(param)` labels of the current plan
    pub selected_tools: Vec<String>,
    /// Tools whose step succeeded in the latest attempt
    pub tools_used: Vec<String>,
    /// Step outcomes of the latest attempt
    pub step_log: Vec<StepRecord>,
    /// Human-readable trace across all attempts
    pub processing_steps: Vec<String>,

    pub search_results: Option<String>,
    pub analysis: Option<String>,
    pub raw_answer: Option<String>,
    pub final_answer: String,

    pub quality_score: Option<f64>,
    pub retry_count: u32,
    /// Number of times the Analyze stage was entered
    pub attempts: u32,

    pub errors: Vec<String>,
    /// Retry feedback messages, oldest first
    pub messages: Vec<String>,
    pub routes: Vec<RouteRecord>,
    pub exit: Option<RunExit>,

    /// Rendered report, filled in by the Format stage
    pub report: String,
}

impl RunState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            query: query.into(),
            task_type: None,
            plan: WorkflowPlan::default(),
            selected_tools: Vec::new(),
            tools_used: Vec::new(),
            step_log: Vec::new(),
            processing_steps: Vec::new(),
            search_results: None,
            analysis: None,
            raw_answer: None,
            final_answer: String::new(),
            quality_score: None,
            retry_count: 0,
            attempts: 0,
            errors: Vec::new(),
            messages: Vec::new(),
            routes: Vec::new(),
            exit: None,
            report: String::new(),
        }
    }

    pub fn task_type(&self) -> TaskType {
        self.task_type.unwrap_or_default()
    }

    pub fn record_step(&mut self, step: impl Into<String>) {
        self.processing_steps.push(step.into());
    }

    pub fn record_error(&mut self, error: impl Into<String>) {
        let error = error.into();
        tracing::warn!("[RunState] {}", error);
        self.errors.push(error);
    }

    pub fn record_route(&mut self, from: &str, to: &str, label: Option<&str>) {
        self.routes.push(RouteRecord {
            from: from.to_string(),
            to: to.to_string(),
            label: label.map(|l| l.to_string()),
        });
    }

    pub fn last_error(&self) -> Option<&str> {
        self.errors.last().map(String::as_str)
    }

    /// Most recent retry feedback, if any.
    pub fn latest_feedback(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }

    /// Clear everything derived from the previous attempt.
    pub fn reset_attempt(&mut self) {
        self.plan = WorkflowPlan::default();
        self.selected_tools.clear();
        self.tools_used.clear();
        self.step_log.clear();
        self.search_results = None;
        self.analysis = None;
        self.raw_answer = None;
    }

    /// Best text available without synthesis.
    pub fn best_available_answer(&self) -> Option<&str> {
        [&self.raw_answer, &self.analysis, &self.search_results]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.trim().is_empty())
    }
}
