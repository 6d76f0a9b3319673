//! Error types for the Adapta engine.
//!
//! `ToolError` covers everything that can go wrong while reaching a tool.
//! None of these abort a run: the runner downgrades them to failed step
//! records and the synthesizer / quality gate replace them with fallbacks.
//! `ConfigError` is only raised while building the engine, before a run
//! starts.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Tool '{0}' not available")]
    Unavailable(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid mode '{mode}'. Must be one of: {valid}")]
    InvalidMode { mode: String, valid: String },

    #[error("max_tokens must be between 1 and 4096, got {0}")]
    TokenBudgetOutOfRange(u32),

    #[error("Invalid parameters for '{tool}': {reason}")]
    InvalidParams { tool: String, reason: String },

    #[error("Tool '{tool}' failed: {reason}")]
    Invocation { tool: String, reason: String },

    #[error("Tool '{tool}' timed out after {secs}s")]
    Timeout { tool: String, secs: u64 },

    #[error("Tool '{tool}' was cancelled")]
    Cancelled { tool: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ToolError {
    pub fn invocation(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        ToolError::Invocation {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_params(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        ToolError::InvalidParams {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Missing credentials and similar operator-facing problems.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ToolError::Configuration(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// The quality evaluator replied with something that is not a number.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Quality reply is not a number: '{0}'")]
pub struct ScoreParseError(pub String);
