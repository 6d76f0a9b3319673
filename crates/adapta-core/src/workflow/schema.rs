//! Plan model: task types, workflow steps and plans.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Coarse category of a query; selects the base workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    DiceAction,
    Research,
    #[default]
    General,
}

impl TaskType {
    pub const ALL: [TaskType; 3] = [TaskType::DiceAction, TaskType::Research, TaskType::General];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::DiceAction => "dice_action",
            TaskType::Research => "research",
            TaskType::General => "general",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown task type: {}", s))
    }
}

/// A single tool invocation in a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// Position in the plan, starting at 0
    pub ordinal: u32,

    /// Registry name of the tool to invoke
    pub tool: String,

    /// Human-readable label
    pub action: String,

    /// Tool sub-mode (generation mode for `generate_text`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

impl WorkflowStep {
    pub fn new(ordinal: u32, tool: &str, action: &str, parameter: Option<&str>) -> Self {
        Self {
            ordinal,
            tool: tool.to_string(),
            action: action.to_string(),
            parameter: parameter.map(|p| p.to_string()),
        }
    }

    /// `tool` or `tool(parameter)`.
    pub fn label(&self) -> String {
        match &self.parameter {
            Some(p) => format!("{}({})", self.tool, p),
            None => self.tool.clone(),
        }
    }
}

/// An ordered, immutable list of steps.
///
/// Ordinals are always `0, 1, 2, …` in plan order; [`WorkflowPlan::from_steps`]
/// renumbers whatever it is given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowPlan {
    steps: Vec<WorkflowStep>,
}

impl WorkflowPlan {
    pub fn from_steps(steps: Vec<WorkflowStep>) -> Self {
        let steps = steps
            .into_iter()
            .enumerate()
            .map(|(i, step)| WorkflowStep {
                ordinal: i as u32,
                ..step
            })
            .collect();
        Self { steps }
    }

    pub fn steps(&self) -> &[WorkflowStep] {
        &self.steps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WorkflowStep> {
        self.steps.iter()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step labels in plan order.
    pub fn tool_summary(&self) -> Vec<String> {
        self.steps.iter().map(WorkflowStep::label).collect()
    }

    pub fn uses_tool(&self, tool: &str) -> bool {
        self.steps.iter().any(|s| s.tool == tool)
    }
}

impl<'a> IntoIterator for &'a WorkflowPlan {
    type Item = &'a WorkflowStep;
    type IntoIter = std::slice::Iter<'a, WorkflowStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
