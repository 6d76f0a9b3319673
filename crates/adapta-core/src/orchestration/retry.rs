//! Retry controller — feedback for the next attempt.

use crate::state::RunState;

pub struct RetryController {
    threshold: f64,
}

impl RetryController {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Queue feedback on the failed attempt and bump the retry counter.
    pub fn prepare(&self, state: &mut RunState) {
        let score = state.quality_score.unwrap_or(0.0);
        let feedback = build_feedback(&state.final_answer, score, &state.query, self.threshold);
        state.messages.push(feedback);
        state.retry_count += 1;
        state.record_step(format!(
            "Retry {}: quality {:.1} below {:.1}",
            state.retry_count, score, self.threshold
        ));
        tracing::info!(
            "[RetryController] Retry {} (score {:.1} < {:.1})",
            state.retry_count,
            score,
            self.threshold
        );
    }
}

pub fn build_feedback(prior_answer: &str, score: f64, query: &str, threshold: f64) -> String {
    format!(
        "Feedback from a previous attempt:\n\
         The previous answer to \"{}\" scored {:.1}/10, below the required {:.1}.\n\
         Previous answer:\n{}\n\n\
         Please provide a more specific, accurate and complete answer.",
        query, score, threshold, prior_answer
    )
}
