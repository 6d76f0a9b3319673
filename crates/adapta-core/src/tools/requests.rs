//! Typed parameter payloads for the built-in tool ids.
//!
//! Callers serialize these into the JSON params of [`super::Tool::invoke`];
//! tool implementations parse them back with [`parse_params`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::MAX_TOKEN_BUDGET;
use crate::error::ToolError;
use crate::tools::mode::GenerationMode;

/// Parameters for `roll_dice`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRollRequest {
    /// Dice notation such as `2d20k1`
    pub notation: String,
    /// Number of times to roll
    #[serde(default = "default_num_rolls")]
    pub num_rolls: u32,
}

fn default_num_rolls() -> u32 {
    1
}

/// Parameters for `web_search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

/// Parameters for `generate_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_mode() -> String {
    GenerationMode::General.as_str().to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>, mode: GenerationMode, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            mode: mode.as_str().to_string(),
            max_tokens,
        }
    }

    /// Check mode membership and the token budget range.
    pub fn validate(&self) -> Result<GenerationMode, ToolError> {
        let mode = self.mode.parse::<GenerationMode>()?;
        if self.max_tokens == 0 || self.max_tokens > MAX_TOKEN_BUDGET {
            return Err(ToolError::TokenBudgetOutOfRange(self.max_tokens));
        }
        Ok(mode)
    }
}

/// Deserialize tool params, mapping failures to `InvalidParams`.
pub fn parse_params<T: DeserializeOwned>(
    tool: &str,
    params: serde_json::Value,
) -> Result<T, ToolError> {
    serde_json::from_value(params).map_err(|e| ToolError::invalid_params(tool, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_defaults() {
        let req: GenerateRequest =
            parse_params("generate_text", serde_json::json!({ "prompt": "hi" })).unwrap();
        assert_eq!(req.mode, "general");
        assert_eq!(req.max_tokens, 1024);
        assert_eq!(req.validate().unwrap(), GenerationMode::General);
    }

    #[test]
    fn test_generate_budget_bounds() {
        let low = GenerateRequest::new("x", GenerationMode::General, 0);
        assert!(matches!(low.validate(), Err(ToolError::TokenBudgetOutOfRange(0))));
        let high = GenerateRequest::new("x", GenerationMode::General, 4097);
        assert!(matches!(
            high.validate(),
            Err(ToolError::TokenBudgetOutOfRange(4097))
        ));
        let edge = GenerateRequest::new("x", GenerationMode::Review, 4096);
        assert_eq!(edge.validate().unwrap(), GenerationMode::Review);
    }

    #[test]
    fn test_missing_field_is_invalid_params() {
        let err = parse_params::<SearchRequest>("web_search", serde_json::json!({})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams { tool, .. } if tool == "web_search"));
    }
}
