//! Text generation through the Anthropic Messages API.
//!
//! Each [`GenerationMode`] maps to a fixed [`Profile`]: a system prompt that
//! shapes the model's behavior. The HTTP client is created on first use and
//! shared by every later call.
//!
//! POST {base_url}/v1/messages
//! Headers:
//!   x-api-key: {api_key}
//!   anthropic-version: 2023-06-01
//!   content-type: application/json

use std::sync::OnceLock;
use std::time::Duration;

use adapta_core::tools::{parse_params, GenerateRequest, GenerationMode, Tool, GENERATE_TOOL};
use adapta_core::{AgentConfig, ToolError};
use async_trait::async_trait;

pub const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// System prompt and description for one generation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub system: &'static str,
    pub description: &'static str,
}

const GENERAL: Profile = Profile {
    system: "You are a helpful, knowledgeable AI assistant. Provide clear, accurate, \
             and useful responses. Be concise but thorough.",
    description: "General-purpose reasoning and assistance.",
};

const CONDENSE: Profile = Profile {
    system: "You are a precise summarizer. Extract key insights, remove redundancy, and \
             produce clear, short summaries. Focus on the most important information and \
             maintain accuracy.",
    description: "Summarizes text accurately and briefly, preserving key insights.",
};

const SIMPLIFY: Profile = Profile {
    system: "You are an educator specializing in making complex topics simple. Explain \
             concepts for beginners using analogies, progressive explanations, and clear \
             examples. Avoid jargon unless necessary.",
    description: "Explains complex topics in simple, beginner-friendly terms.",
};

const POLISH: Profile = Profile {
    system: "You are a skilled writer. Turn the material you are given into an engaging, \
             well-structured and polished answer with vivid but precise language.",
    description: "Polished, engaging write-ups of gathered material.",
};

const REVIEW: Profile = Profile {
    system: "You are a strict reviewer. Judge answers for relevance, completeness, \
             accuracy and clarity. When asked for a score, reply with the number only.",
    description: "Scores answers for the quality gate.",
};

impl Profile {
    pub fn for_mode(mode: GenerationMode) -> &'static Profile {
        match mode {
            GenerationMode::General => &GENERAL,
            GenerationMode::Condense => &CONDENSE,
            GenerationMode::Simplify => &SIMPLIFY,
            GenerationMode::Polish => &POLISH,
            GenerationMode::Review => &REVIEW,
        }
    }
}

/// Connection settings for the generation tool.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f64,
}

impl GeneratorConfig {
    /// Model and temperature from `config`; credentials from
    /// `ANTHROPIC_API_KEY` (or `ANTHROPIC_AUTH_TOKEN`) and `ANTHROPIC_BASE_URL`.
    pub fn from_env(config: &AgentConfig) -> Self {
        let api_key = ["ANTHROPIC_API_KEY", "ANTHROPIC_AUTH_TOKEN"]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|v| !v.trim().is_empty());

        Self {
            base_url: std::env::var("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_ANTHROPIC_URL.to_string()),
            api_key,
            model: config.model_name.clone(),
            temperature: config.temperature,
        }
    }
}

/// The `generate_text` tool.
pub struct AnthropicGenerator {
    config: GeneratorConfig,
    timeout: Duration,
    client: OnceLock<reqwest::Client>,
}

impl AnthropicGenerator {
    pub fn new(config: GeneratorConfig, timeout: Duration) -> Self {
        Self {
            config,
            timeout,
            client: OnceLock::new(),
        }
    }

    fn client(&self) -> &reqwest::Client {
        self.client.get_or_init(|| {
            tracing::debug!("[AnthropicGenerator] Creating HTTP client");
            reqwest::Client::builder()
                .timeout(self.timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new())
        })
    }

    /// Request body for the Messages API.
    pub fn build_body(&self, prompt: &str, mode: GenerationMode, max_tokens: u32) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": max_tokens,
            "system": Profile::for_mode(mode).system,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        if let Some(temp) = serde_json::Number::from_f64(self.config.temperature) {
            body["temperature"] = serde_json::Value::Number(temp);
        }
        body
    }

    async fn generate(
        &self,
        prompt: &str,
        mode: GenerationMode,
        max_tokens: u32,
    ) -> Result<String, ToolError> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            ToolError::Configuration(
                "ANTHROPIC_API_KEY is not set. Add it to your .env file.".to_string(),
            )
        })?;

        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));
        let body = self.build_body(prompt, mode, max_tokens);

        tracing::info!(
            "[AnthropicGenerator] Calling {} (model: {}, mode: {})",
            url,
            self.config.model,
            mode
        );

        let response = self
            .client()
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    "timeout".to_string()
                } else {
                    e.to_string()
                };
                ToolError::invocation(GENERATE_TOOL, describe_failure(None, &message))
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            ToolError::invocation(GENERATE_TOOL, format!("Failed to read response body: {}", e))
        })?;

        if !status.is_success() {
            return Err(ToolError::invocation(
                GENERATE_TOOL,
                describe_failure(Some(status.as_u16()), &text),
            ));
        }

        let json: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            ToolError::invocation(GENERATE_TOOL, format!("Failed to parse response JSON: {}", e))
        })?;

        let content = extract_text(&json);
        if content.is_empty() {
            return Err(ToolError::invocation(GENERATE_TOOL, "No content returned"));
        }
        Ok(content)
    }
}

/// Concatenated `text` blocks of a Messages API response, trimmed.
pub fn extract_text(json: &serde_json::Value) -> String {
    json.get("content")
        .and_then(|c| c.as_array())
        .and_then(|arr| {
            arr.iter()
                .filter_map(|block| {
                    if block.get("type").and_then(|t| t.as_str()) == Some("text") {
                        block.get("text").and_then(|t| t.as_str()).map(|s| s.to_string())
                    } else {
                        None
                    }
                })
                .reduce(|a, b| format!("{}\n{}", a, b))
        })
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Human-readable reason for a failed API call.
pub fn describe_failure(status: Option<u16>, message: &str) -> String {
    let lower = message.to_lowercase();
    if status == Some(429) || lower.contains("rate_limit") {
        "Rate limit exceeded: too many requests to the generation API, try again shortly".to_string()
    } else if matches!(status, Some(401) | Some(403))
        || lower.contains("authentication")
        || lower.contains("api_key")
    {
        "Authentication failed: check ANTHROPIC_API_KEY".to_string()
    } else if status == Some(408) || lower.contains("timeout") || lower.contains("timed out") {
        "Request to the generation API timed out".to_string()
    } else {
        match status {
            Some(code) => format!("API returned {}: {}", code, message),
            None => format!("HTTP request failed: {}", message),
        }
    }
}

#[async_trait]
impl Tool for AnthropicGenerator {
    fn name(&self) -> &str {
        GENERATE_TOOL
    }

    fn description(&self) -> &str {
        "Generate text with a mode-specific profile (general, condense, simplify, polish, review)"
    }

    async fn invoke(&self, params: serde_json::Value) -> Result<String, ToolError> {
        let request: GenerateRequest = parse_params(GENERATE_TOOL, params)?;
        let mode = request.validate()?;
        self.generate(&request.prompt, mode, request.max_tokens).await
    }
}
