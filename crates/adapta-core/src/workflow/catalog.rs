//! Base plans per task type.

use crate::tools::{GenerationMode, DICE_TOOL, GENERATE_TOOL, SEARCH_TOOL};
use crate::workflow::schema::{TaskType, WorkflowPlan, WorkflowStep};

pub const ACTION_ROLL_DICE: &str = "Roll dice";
pub const ACTION_RESEARCH: &str = "Research topic";
pub const ACTION_CONDENSE: &str = "Condense findings";
pub const ACTION_SIMPLIFY: &str = "Simplify explanation";
pub const ACTION_ANSWER: &str = "Answer question";
pub const ACTION_LIVE_SEARCH: &str = "Search for current information";

/// The fixed plan for a task type, before any live-search injection.
pub fn base_plan(task_type: TaskType) -> WorkflowPlan {
    let steps = match task_type {
        TaskType::DiceAction => vec![WorkflowStep::new(0, DICE_TOOL, ACTION_ROLL_DICE, None)],
        TaskType::Research => vec![
            WorkflowStep::new(0, SEARCH_TOOL, ACTION_RESEARCH, None),
            WorkflowStep::new(
                1,
                GENERATE_TOOL,
                ACTION_CONDENSE,
                Some(GenerationMode::Condense.as_str()),
            ),
            WorkflowStep::new(
                2,
                GENERATE_TOOL,
                ACTION_SIMPLIFY,
                Some(GenerationMode::Simplify.as_str()),
            ),
        ],
        TaskType::General => vec![WorkflowStep::new(
            0,
            GENERATE_TOOL,
            ACTION_ANSWER,
            Some(GenerationMode::General.as_str()),
        )],
    };
    WorkflowPlan::from_steps(steps)
}

/// The step prepended when a query needs live information.
pub fn live_search_step() -> WorkflowStep {
    WorkflowStep::new(0, SEARCH_TOOL, ACTION_LIVE_SEARCH, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_research_plan() {
        let plan = base_plan(TaskType::Research);
        assert_eq!(
            plan.tool_summary(),
            vec![
                "web_search".to_string(),
                "generate_text(condense)".to_string(),
                "generate_text(simplify)".to_string(),
            ]
        );
    }

    #[test]
    fn test_single_step_plans() {
        assert_eq!(base_plan(TaskType::DiceAction).tool_summary(), vec!["roll_dice"]);
        assert_eq!(
            base_plan(TaskType::General).tool_summary(),
            vec!["generate_text(general)"]
        );
    }
}
