//! Step executor — turns one plan step into one tool call.
//!
//! The executor reads the [`ExecutionContext`] to build the tool's request
//! but never writes to it; the runner stores the result under the role
//! returned by [`ExecutionContext::role_for`].

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::ToolError;
use crate::tools::{
    DiceRollRequest, GenerateRequest, GenerationMode, SearchRequest, ToolRegistry, DICE_TOOL,
    GENERATE_TOOL, SEARCH_TOOL,
};
use crate::workflow::schema::WorkflowStep;

/// Notation used when the query names no dice.
pub const DEFAULT_DICE_NOTATION: &str = "1d6";

/// Semantic slot a step result is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextRole {
    SearchResult,
    Summary,
    Explanation,
    DiceResult,
    Answer,
}

/// Intermediate results of one attempt.
///
/// Built fresh for every attempt; only the retry feedback carries over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionContext {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dice_result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl ExecutionContext {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_feedback(mut self, feedback: Option<String>) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn get(&self, role: ContextRole) -> Option<&str> {
        self.slot(role).as_deref()
    }

    pub fn set(&mut self, role: ContextRole, value: String) {
        *self.slot_mut(role) = Some(value);
    }

    /// Where the result of `step` belongs.
    pub fn role_for(step: &WorkflowStep) -> ContextRole {
        match step.tool.as_str() {
            DICE_TOOL => ContextRole::DiceResult,
            SEARCH_TOOL => ContextRole::SearchResult,
            _ => match step.parameter.as_deref().map(str::parse::<GenerationMode>) {
                Some(Ok(GenerationMode::Condense)) => ContextRole::Summary,
                Some(Ok(GenerationMode::Simplify)) => ContextRole::Explanation,
                _ => ContextRole::Answer,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.search_result.is_none()
            && self.summary.is_none()
            && self.explanation.is_none()
            && self.dice_result.is_none()
            && self.answer.is_none()
    }

    fn slot(&self, role: ContextRole) -> &Option<String> {
        match role {
            ContextRole::SearchResult => &self.search_result,
            ContextRole::Summary => &self.summary,
            ContextRole::Explanation => &self.explanation,
            ContextRole::DiceResult => &self.dice_result,
            ContextRole::Answer => &self.answer,
        }
    }

    fn slot_mut(&mut self, role: ContextRole) -> &mut Option<String> {
        match role {
            ContextRole::SearchResult => &mut self.search_result,
            ContextRole::Summary => &mut self.summary,
            ContextRole::Explanation => &mut self.explanation,
            ContextRole::DiceResult => &mut self.dice_result,
            ContextRole::Answer => &mut self.answer,
        }
    }
}

/// Executes single workflow steps against the shared registry.
#[derive(Clone)]
pub struct StepExecutor {
    registry: Arc<ToolRegistry>,
    max_tokens: u32,
}

impl StepExecutor {
    pub fn new(registry: Arc<ToolRegistry>, max_tokens: u32) -> Self {
        Self {
            registry,
            max_tokens,
        }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Run one step and return the tool's raw text.
    pub async fn execute(
        &self,
        step: &WorkflowStep,
        context: &ExecutionContext,
        cancel: &CancellationToken,
    ) -> Result<String, ToolError> {
        if !self.registry.contains(&step.tool) {
            return Err(ToolError::Unavailable(step.tool.clone()));
        }

        match step.tool.as_str() {
            DICE_TOOL => {
                let (notation, num_rolls) = parse_dice_query(&context.query);
                tracing::info!(
                    "[StepExecutor] Rolling {} ({} time{})",
                    notation,
                    num_rolls,
                    if num_rolls == 1 { "" } else { "s" }
                );
                let request = DiceRollRequest {
                    notation,
                    num_rolls,
                };
                self.registry.invoke_with(DICE_TOOL, &request, cancel).await
            }
            SEARCH_TOOL => {
                let request = SearchRequest {
                    query: context.query.clone(),
                };
                self.registry.invoke_with(SEARCH_TOOL, &request, cancel).await
            }
            GENERATE_TOOL => {
                let mode = match step.parameter.as_deref() {
                    Some(p) => p.parse::<GenerationMode>()?,
                    None => GenerationMode::General,
                };
                let prompt = build_generation_prompt(mode, context);
                let request = GenerateRequest::new(prompt, mode, self.max_tokens);
                self.registry.invoke_with(GENERATE_TOOL, &request, cancel).await
            }
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }
}

/// Prompt for a generation step, built from whatever the context holds.
pub fn build_generation_prompt(mode: GenerationMode, context: &ExecutionContext) -> String {
    let query = &context.query;
    let prompt = match mode {
        GenerationMode::Condense => match &context.search_result {
            Some(search) => format!(
                "Question: {}\n\nWeb Search Results:\n{}\n\n\
                 Based on the search results above, provide a comprehensive summary \
                 that answers the question.",
                query, search
            ),
            None => query.clone(),
        },
        GenerationMode::Simplify => match (&context.summary, &context.search_result) {
            (Some(summary), _) => format!(
                "Question: {}\n\nSummary:\n{}\n\n\
                 Explain this in simple, easy-to-understand terms as if teaching \
                 someone new to the topic.",
                query, summary
            ),
            (None, Some(search)) => format!(
                "Question: {}\n\nWeb Search Results:\n{}\n\n\
                 Explain the answer in simple, easy-to-understand terms.",
                query, search
            ),
            (None, None) => query.clone(),
        },
        _ => match &context.search_result {
            Some(search) => format!(
                "Question: {}\n\nCurrent information:\n{}\n\n\
                 Answer the question, using the information above where relevant.",
                query, search
            ),
            None => query.clone(),
        },
    };

    match &context.feedback {
        Some(feedback) => format!("{}\n\n{}", prompt, feedback),
        None => prompt,
    }
}

/// Dice notation and repeat count mentioned in a query.
pub fn parse_dice_query(query: &str) -> (String, u32) {
    let lowered = query.to_lowercase();

    let notation_re = regex::Regex::new(r"(\d+d\d+(?:k\d+)?)").unwrap();
    let notation = notation_re
        .captures(&lowered)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| DEFAULT_DICE_NOTATION.to_string());

    (notation, repeat_count(&lowered))
}

fn repeat_count(lowered: &str) -> u32 {
    let times_re = regex::Regex::new(
        r"\b(\d+|one|two|three|four|five|six|seven|eight|nine|ten)\s*times?\b",
    )
    .unwrap();
    if let Some(caps) = times_re.captures(lowered) {
        let word = &caps[1];
        return match word {
            "one" => 1,
            "two" => 2,
            "three" => 3,
            "four" => 4,
            "five" => 5,
            "six" => 6,
            "seven" => 7,
            "eight" => 8,
            "nine" => 9,
            "ten" => 10,
            digits => digits.parse().unwrap_or(1),
        };
    }

    let adverb_re = regex::Regex::new(r"\b(once|twice|thrice)\b").unwrap();
    let adverb = adverb_re
        .captures(lowered)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str());
    match adverb {
        Some("twice") => 2,
        Some("thrice") => 3,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::Tool;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records every params payload and answers with a fixed string.
    struct Recorder {
        name: &'static str,
        calls: Mutex<Vec<serde_json::Value>>,
    }

    impl Recorder {
        fn new(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn last(&self) -> serde_json::Value {
            self.calls.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Tool for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "records calls"
        }

        async fn invoke(&self, params: serde_json::Value) -> Result<String, ToolError> {
            self.calls.lock().unwrap().push(params);
            Ok(format!("{} output", self.name))
        }
    }

    #[test]
    fn test_parse_dice_query() {
        assert_eq!(
            parse_dice_query("roll 2d20k1 three times"),
            ("2d20k1".to_string(), 3)
        );
        assert_eq!(parse_dice_query("Roll 4D6 5 times"), ("4d6".to_string(), 5));
        assert_eq!(parse_dice_query("roll a dice"), ("1d6".to_string(), 1));
        assert_eq!(parse_dice_query("roll 3d8 twice"), ("3d8".to_string(), 2));
        assert_eq!(parse_dice_query("roll 1d4 1 time"), ("1d4".to_string(), 1));
    }

    #[test]
    fn test_role_for() {
        let step = |tool, param| WorkflowStep::new(0, tool, "x", param);
        assert_eq!(
            ExecutionContext::role_for(&step(DICE_TOOL, None)),
            ContextRole::DiceResult
        );
        assert_eq!(
            ExecutionContext::role_for(&step(SEARCH_TOOL, None)),
            ContextRole::SearchResult
        );
        assert_eq!(
            ExecutionContext::role_for(&step(GENERATE_TOOL, Some("condense"))),
            ContextRole::Summary
        );
        assert_eq!(
            ExecutionContext::role_for(&step(GENERATE_TOOL, Some("simplify"))),
            ContextRole::Explanation
        );
        assert_eq!(
            ExecutionContext::role_for(&step(GENERATE_TOOL, Some("general"))),
            ContextRole::Answer
        );
    }

    #[test]
    fn test_prompt_threads_context() {
        let mut ctx = ExecutionContext::new("latest AI research");
        assert_eq!(
            build_generation_prompt(GenerationMode::Condense, &ctx),
            "latest AI research"
        );

        ctx.set(ContextRole::SearchResult, "SEARCH-BODY".to_string());
        let condense = build_generation_prompt(GenerationMode::Condense, &ctx);
        assert!(condense.contains("SEARCH-BODY"));

        ctx.set(ContextRole::Summary, "SUMMARY-BODY".to_string());
        let simplify = build_generation_prompt(GenerationMode::Simplify, &ctx);
        assert!(simplify.contains("SUMMARY-BODY"));
        assert!(!simplify.contains("SEARCH-BODY"));
    }

    #[test]
    fn test_prompt_appends_feedback() {
        let ctx = ExecutionContext::new("what is rust")
            .with_feedback(Some("Be more specific.".to_string()));
        let prompt = build_generation_prompt(GenerationMode::General, &ctx);
        assert!(prompt.starts_with("what is rust"));
        assert!(prompt.ends_with("Be more specific."));
    }

    #[tokio::test]
    async fn test_execute_builds_requests() {
        let dice = Recorder::new(DICE_TOOL);
        let generate = Recorder::new(GENERATE_TOOL);
        let registry = ToolRegistry::new(Duration::from_secs(5))
            .with_tool(dice.clone())
            .with_tool(generate.clone());
        let executor = StepExecutor::new(Arc::new(registry), 512);
        let cancel = CancellationToken::new();

        let ctx = ExecutionContext::new("roll 2d20k1 three times");
        let out = executor
            .execute(&WorkflowStep::new(0, DICE_TOOL, "Roll", None), &ctx, &cancel)
            .await
            .unwrap();
        assert_eq!(out, "roll_dice output");
        assert_eq!(
            dice.last(),
            serde_json::json!({ "notation": "2d20k1", "num_rolls": 3 })
        );

        let step = WorkflowStep::new(0, GENERATE_TOOL, "Answer", Some("general"));
        executor
            .execute(&step, &ExecutionContext::new("hello"), &cancel)
            .await
            .unwrap();
        assert_eq!(
            generate.last(),
            serde_json::json!({ "prompt": "hello", "mode": "general", "max_tokens": 512 })
        );
    }

    #[tokio::test]
    async fn test_execute_errors() {
        let custom = Recorder::new("custom_tool");
        let generate = Recorder::new(GENERATE_TOOL);
        let registry = ToolRegistry::new(Duration::from_secs(5))
            .with_tool(custom)
            .with_tool(generate);
        let executor = StepExecutor::new(Arc::new(registry), 512);
        let cancel = CancellationToken::new();
        let ctx = ExecutionContext::new("q");

        let missing = executor
            .execute(&WorkflowStep::new(0, SEARCH_TOOL, "Search", None), &ctx, &cancel)
            .await;
        assert!(matches!(missing, Err(ToolError::Unavailable(t)) if t == SEARCH_TOOL));

        let unknown = executor
            .execute(&WorkflowStep::new(0, "custom_tool", "Custom", None), &ctx, &cancel)
            .await;
        assert!(matches!(unknown, Err(ToolError::UnknownTool(t)) if t == "custom_tool"));

        let bad_mode = executor
            .execute(
                &WorkflowStep::new(0, GENERATE_TOOL, "Answer", Some("shout")),
                &ctx,
                &cancel,
            )
            .await;
        assert!(matches!(bad_mode, Err(ToolError::InvalidMode { .. })));
    }
}
