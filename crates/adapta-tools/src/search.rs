//! Web search through the Tavily API.
//!
//! POST {base_url}/search
//!   { api_key, query, search_depth: "basic", max_results: 5, include_answer: true }

use std::sync::OnceLock;
use std::time::Duration;

use adapta_core::tools::{parse_params, SearchRequest, Tool, SEARCH_TOOL};
use adapta_core::ToolError;
use async_trait::async_trait;
use serde::Deserialize;

pub const DEFAULT_TAVILY_URL: &str = "https://api.tavily.com";
const MAX_RESULTS: u32 = 5;

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl SearchConfig {
    /// `TAVILY_API_KEY` and optional `TAVILY_BASE_URL`.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("TAVILY_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_TAVILY_URL.to_string()),
            api_key: std::env::var("TAVILY_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

/// The `web_search` tool.
pub struct TavilySearch {
    config: SearchConfig,
    timeout: Duration,
    client: OnceLock<reqwest::Client>,
}

impl TavilySearch {
    pub fn new(config: SearchConfig, timeout: Duration) -> Self {
        Self {
            config,
            timeout,
            client: OnceLock::new(),
        }
    }

    fn client(&self) -> &reqwest::Client {
        self.client.get_or_init(|| {
            reqwest::Client::builder()
                .timeout(self.timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new())
        })
    }

    async fn search(&self, query: &str) -> Result<String, ToolError> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            ToolError::Configuration(
                "TAVILY_API_KEY is not set. Add it to your .env file.".to_string(),
            )
        })?;

        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "api_key": api_key,
            "query": query,
            "search_depth": "basic",
            "max_results": MAX_RESULTS,
            "include_answer": true,
        });

        tracing::info!("[TavilySearch] Searching: {}", query);

        let response = self
            .client()
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ToolError::invocation(SEARCH_TOOL, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            ToolError::invocation(SEARCH_TOOL, format!("Failed to read response body: {}", e))
        })?;

        if !status.is_success() {
            return Err(ToolError::invocation(
                SEARCH_TOOL,
                format!("API returned {}: {}", status, text),
            ));
        }

        render_results(&text)
    }
}

/// Render a Tavily JSON response as plain text for the next step's prompt.
pub fn render_results(body: &str) -> Result<String, ToolError> {
    let parsed: TavilyResponse = serde_json::from_str(body).map_err(|e| {
        ToolError::invocation(SEARCH_TOOL, format!("Failed to parse response JSON: {}", e))
    })?;

    let mut out = String::new();
    if let Some(answer) = parsed.answer.filter(|a| !a.trim().is_empty()) {
        out.push_str(&format!("Answer: {}\n", answer.trim()));
    }
    for (i, result) in parsed.results.iter().enumerate() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("{}. {}\n", i + 1, result.title.trim()));
        if !result.content.trim().is_empty() {
            out.push_str(&format!("   {}\n", result.content.trim()));
        }
        if !result.url.is_empty() {
            out.push_str(&format!("   Source: {}\n", result.url));
        }
    }

    if out.is_empty() {
        return Ok("No search results found.".to_string());
    }
    Ok(out.trim_end().to_string())
}

#[async_trait]
impl Tool for TavilySearch {
    fn name(&self) -> &str {
        SEARCH_TOOL
    }

    fn description(&self) -> &str {
        "Search the web for current information (Tavily)"
    }

    async fn invoke(&self, params: serde_json::Value) -> Result<String, ToolError> {
        let request: SearchRequest = parse_params(SEARCH_TOOL, params)?;
        if request.query.trim().is_empty() {
            return Err(ToolError::invalid_params(SEARCH_TOOL, "query is empty"));
        }
        self.search(&request.query).await
    }
}
