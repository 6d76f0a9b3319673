//! Stages of the orchestration graph and its conditional edges.
//!
//! The routing decisions are pure functions so the bound on the retry loop
//! can be tested without running any stage.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Analyze,
    Execute,
    Synthesize,
    QualityCheck,
    Retry,
    Format,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Analyze => "analyze",
            Stage::Execute => "execute",
            Stage::Synthesize => "synthesize",
            Stage::QualityCheck => "quality_check",
            Stage::Retry => "retry",
            Stage::Format => "format",
            Stage::Done => "done",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Format | Stage::Done)
    }
}

/// Edge taken out of `QualityCheck`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityRoute {
    Pass,
    Retry,
    Fail,
}

impl QualityRoute {
    pub fn label(&self) -> &'static str {
        match self {
            QualityRoute::Pass => "pass",
            QualityRoute::Retry => "retry",
            QualityRoute::Fail => "fail",
        }
    }
}

/// Edge taken out of `Retry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryRoute {
    Retry,
    GiveUp,
}

impl RetryRoute {
    pub fn label(&self) -> &'static str {
        match self {
            RetryRoute::Retry => "retry",
            RetryRoute::GiveUp => "give_up",
        }
    }
}

pub fn check_quality(score: f64, retry_count: u32, threshold: f64, max_retries: u32) -> QualityRoute {
    if score >= threshold {
        QualityRoute::Pass
    } else if retry_count < max_retries {
        QualityRoute::Retry
    } else {
        QualityRoute::Fail
    }
}

/// `retry_count` is the value after the retry controller incremented it.
pub fn should_retry(retry_count: u32, max_retries: u32) -> RetryRoute {
    if retry_count < max_retries {
        RetryRoute::Retry
    } else {
        RetryRoute::GiveUp
    }
}
