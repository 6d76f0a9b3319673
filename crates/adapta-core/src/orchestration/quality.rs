//! Quality gate — asks the reviewer profile to score an answer.
//!
//! Evaluator noise never blocks the run: an unparseable reply or a failing
//! tool yields the configured threshold, which just passes. A cancelled
//! evaluation yields no score at all.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::{ScoreParseError, ToolError};
use crate::tools::{GenerateRequest, GenerationMode, ToolRegistry, GENERATE_TOOL};
use crate::workflow::TaskType;

/// Score given to dice results without asking the evaluator.
pub const DICE_SCORE: f64 = 10.0;

const MAX_SCORE: f64 = 10.0;
const REVIEW_MAX_TOKENS: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct QualityVerdict {
    /// Always within `[0, 10]`; meaningless when `cancelled`
    pub score: f64,
    /// The evaluation was interrupted and its result must be discarded
    pub cancelled: bool,
    pub error: Option<String>,
}

pub struct QualityGate {
    registry: Arc<ToolRegistry>,
    threshold: f64,
}

impl QualityGate {
    pub fn new(registry: Arc<ToolRegistry>, threshold: f64) -> Self {
        Self {
            registry,
            threshold,
        }
    }

    pub async fn score(
        &self,
        query: &str,
        answer: &str,
        task_type: TaskType,
        cancel: &CancellationToken,
    ) -> QualityVerdict {
        if task_type == TaskType::DiceAction {
            tracing::info!("[QualityGate] Dice result, skipping evaluation");
            return QualityVerdict {
                score: DICE_SCORE,
                cancelled: false,
                error: None,
            };
        }

        let request = GenerateRequest::new(
            evaluation_prompt(query, answer),
            GenerationMode::Review,
            REVIEW_MAX_TOKENS,
        );

        match self.registry.invoke_with(GENERATE_TOOL, &request, cancel).await {
            Ok(reply) => match parse_score(&reply) {
                Ok(score) => {
                    tracing::info!("[QualityGate] Score: {:.1}/10", score);
                    QualityVerdict {
                        score,
                        cancelled: false,
                        error: None,
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "[QualityGate] {}, using threshold {:.1}",
                        e,
                        self.threshold
                    );
                    QualityVerdict {
                        score: self.threshold,
                        cancelled: false,
                        error: None,
                    }
                }
            },
            Err(ToolError::Cancelled { .. }) => {
                tracing::warn!("[QualityGate] Evaluation cancelled, discarding result");
                QualityVerdict {
                    score: 0.0,
                    cancelled: true,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(
                    "[QualityGate] Evaluation failed: {}, using threshold {:.1}",
                    e,
                    self.threshold
                );
                QualityVerdict {
                    score: self.threshold,
                    cancelled: false,
                    error: Some(format!("Quality check failed: {}", e)),
                }
            }
        }
    }
}

/// Parse the evaluator's bare numeric reply, clamped to `[0, 10]`.
pub fn parse_score(reply: &str) -> Result<f64, ScoreParseError> {
    let trimmed = reply.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| ScoreParseError(trimmed.to_string()))?;
    if value.is_nan() {
        return Err(ScoreParseError(trimmed.to_string()));
    }
    Ok(value.clamp(0.0, MAX_SCORE))
}

fn evaluation_prompt(query: &str, answer: &str) -> String {
    format!(
        "Rate the quality of this answer on a scale of 0 to 10.\n\n\
         Question: {}\n\n\
         Answer: {}\n\n\
         Consider relevance, completeness, accuracy and clarity.\n\
         Respond with ONLY a number between 0 and 10.",
        query, answer
    )
}
