//! Turns a query into a concrete plan.
//!
//! The base plan comes from the catalog. When a general query asks for live
//! information and the plan does not already search, a web search step is
//! prepended and the remaining steps are renumbered.

use serde::Serialize;

use crate::error::ConfigError;
use crate::tools::SEARCH_TOOL;
use crate::workflow::catalog::{base_plan, live_search_step};
use crate::workflow::classifier::{Classifier, ClassifierRules};
use crate::workflow::schema::{TaskType, WorkflowPlan};

/// Output of the analysis stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedWorkflow {
    pub task_type: TaskType,
    pub plan: WorkflowPlan,
    /// `tool` / `tool(param)` labels in plan order
    pub tool_summary: Vec<String>,
    pub live_search_injected: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Planner {
    classifier: Classifier,
}

impl Planner {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    pub fn from_rules(rules: &ClassifierRules) -> Result<Self, ConfigError> {
        Ok(Self::new(Classifier::new(rules)?))
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Classify the query and build its plan.
    pub fn analyze(&self, query: &str) -> PlannedWorkflow {
        let task_type = self.classifier.classify(query);
        self.plan(query, task_type)
    }

    /// Build the plan for an already-classified query.
    pub fn plan(&self, query: &str, task_type: TaskType) -> PlannedWorkflow {
        let base = base_plan(task_type);

        let inject = task_type == TaskType::General
            && !base.uses_tool(SEARCH_TOOL)
            && self.classifier.needs_live_info(query);

        let plan = if inject {
            tracing::info!("[Planner] Query needs live information, adding web search");
            let mut steps = vec![live_search_step()];
            steps.extend(base.steps().iter().cloned());
            WorkflowPlan::from_steps(steps)
        } else {
            base
        };

        let tool_summary = plan.tool_summary();
        tracing::info!(
            "[Planner] Task type: {}, plan: {}",
            task_type,
            tool_summary.join(" -> ")
        );

        PlannedWorkflow {
            task_type,
            plan,
            tool_summary,
            live_search_injected: inject,
        }
    }
}
