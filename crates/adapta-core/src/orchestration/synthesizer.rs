//! Synthesizer — turns the runner's raw material into the final answer.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::state::RunState;
use crate::tools::{GenerateRequest, GenerationMode, ToolRegistry, GENERATE_TOOL};
use crate::workflow::TaskType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    /// Never empty
    pub answer: String,
    /// Generation mode used, `None` when synthesis was skipped or failed
    pub mode: Option<GenerationMode>,
    pub error: Option<String>,
}

pub struct Synthesizer {
    registry: Arc<ToolRegistry>,
    max_tokens: u32,
}

impl Synthesizer {
    pub fn new(registry: Arc<ToolRegistry>, max_tokens: u32) -> Self {
        Self {
            registry,
            max_tokens,
        }
    }

    pub async fn synthesize(&self, state: &RunState, cancel: &CancellationToken) -> Synthesis {
        let mode = match state.task_type() {
            TaskType::DiceAction => {
                tracing::info!("[Synthesizer] Dice result passes through unchanged");
                return Synthesis {
                    answer: fallback_answer(state),
                    mode: None,
                    error: None,
                };
            }
            TaskType::Research => GenerationMode::Polish,
            TaskType::General => GenerationMode::General,
        };

        tracing::info!("[Synthesizer] Synthesizing with mode '{}'", mode);
        let request = GenerateRequest::new(synthesis_prompt(state), mode, self.max_tokens);

        match self.registry.invoke_with(GENERATE_TOOL, &request, cancel).await {
            Ok(text) if !text.trim().is_empty() => Synthesis {
                answer: text.trim().to_string(),
                mode: Some(mode),
                error: None,
            },
            Ok(_) => Synthesis {
                answer: fallback_answer(state),
                mode: None,
                error: Some("Synthesis failed: empty reply".to_string()),
            },
            Err(e) => {
                tracing::warn!("[Synthesizer] Falling back to prior answer: {}", e);
                Synthesis {
                    answer: fallback_answer(state),
                    mode: None,
                    error: Some(format!("Synthesis failed: {}", e)),
                }
            }
        }
    }
}

/// Shown when nothing at all could be produced.
pub fn unable_message(query: &str) -> String {
    format!("Unable to generate an answer for: {}", query)
}

/// Best prior text, or the explicit unable-to-generate message.
pub fn fallback_answer(state: &RunState) -> String {
    state
        .best_available_answer()
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| unable_message(&state.query))
}

fn synthesis_prompt(state: &RunState) -> String {
    let mut sections = Vec::new();
    if let Some(search) = &state.search_results {
        sections.push(format!("Search Results:\n{}", search));
    }
    if let Some(analysis) = &state.analysis {
        sections.push(format!("Analysis:\n{}", analysis));
    }
    if sections.is_empty() {
        if let Some(raw) = &state.raw_answer {
            sections.push(format!("Tool Results:\n{}", raw));
        }
    }

    let mut prompt = if sections.is_empty() {
        state.query.clone()
    } else {
        format!(
            "Question: {}\n\n{}\n\n\
             Using the information above, write a clear, complete and accurate \
             answer to the question.",
            state.query,
            sections.join("\n\n")
        )
    };

    if let Some(feedback) = state.latest_feedback() {
        prompt.push_str("\n\n");
        prompt.push_str(feedback);
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::tools::Tool;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct Writer {
        reply: Result<&'static str, &'static str>,
        prompts: Mutex<Vec<serde_json::Value>>,
    }

    #[async_trait]
    impl Tool for Writer {
        fn name(&self) -> &str {
            GENERATE_TOOL
        }

        fn description(&self) -> &str {
            "scripted writer"
        }

        async fn invoke(&self, params: serde_json::Value) -> Result<String, ToolError> {
            self.prompts.lock().unwrap().push(params);
            self.reply
                .map(|s| s.to_string())
                .map_err(|e| ToolError::invocation(GENERATE_TOOL, e))
        }
    }

    fn synthesizer(reply: Result<&'static str, &'static str>) -> (Synthesizer, Arc<Writer>) {
        let writer = Arc::new(Writer {
            reply,
            prompts: Mutex::new(Vec::new()),
        });
        let registry = ToolRegistry::new(Duration::from_secs(5)).with_tool(writer.clone());
        (Synthesizer::new(Arc::new(registry), 300), writer)
    }

    fn state(task_type: TaskType) -> RunState {
        let mut state = RunState::new("latest AI research 2025");
        state.task_type = Some(task_type);
        state
    }

    #[tokio::test]
    async fn test_dice_passes_through() {
        let (synth, writer) = synthesizer(Ok("unused"));
        let mut state = state(TaskType::DiceAction);
        state.raw_answer = Some("Rolled 2d20k1: [4, 17] -> 17".to_string());
        let out = synth.synthesize(&state, &CancellationToken::new()).await;
        assert_eq!(out.answer, "Rolled 2d20k1: [4, 17] -> 17");
        assert!(out.mode.is_none());
        assert!(writer.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_research_uses_polish_and_embeds_analysis() {
        let (synth, writer) = synthesizer(Ok("  Polished answer.  "));
        let mut state = state(TaskType::Research);
        state.analysis = Some("ANALYSIS-TEXT".to_string());
        state.messages.push("FEEDBACK-TEXT".to_string());
        let out = synth.synthesize(&state, &CancellationToken::new()).await;
        assert_eq!(out.answer, "Polished answer.");
        assert_eq!(out.mode, Some(GenerationMode::Polish));

        let params = writer.prompts.lock().unwrap()[0].clone();
        assert_eq!(params["mode"], "polish");
        assert_eq!(params["max_tokens"], 300);
        let prompt = params["prompt"].as_str().unwrap();
        assert!(prompt.contains("ANALYSIS-TEXT"));
        assert!(prompt.ends_with("FEEDBACK-TEXT"));
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_prior_answer() {
        let (synth, _) = synthesizer(Err("overloaded"));
        let mut state = state(TaskType::General);
        state.raw_answer = Some("raw answer".to_string());
        let out = synth.synthesize(&state, &CancellationToken::new()).await;
        assert_eq!(out.answer, "raw answer");
        assert!(out.error.unwrap().contains("overloaded"));
    }

    #[tokio::test]
    async fn test_failure_with_nothing_is_never_empty() {
        let (synth, writer) = synthesizer(Err("overloaded"));
        let state = state(TaskType::General);
        let out = synth.synthesize(&state, &CancellationToken::new()).await;
        assert_eq!(out.answer, unable_message("latest AI research 2025"));
        let params = writer.prompts.lock().unwrap()[0].clone();
        assert_eq!(params["prompt"], "latest AI research 2025");
        assert_eq!(params["mode"], "general");
    }
}
