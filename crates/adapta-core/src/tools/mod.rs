//! Tool registry — the engine's only door to the outside world.
//!
//! A tool is an async capability `invoke(params) -> text`. The registry is
//! built once at startup, wrapped in an `Arc`, and shared read-only by every
//! run. Each invocation is bounded by the registry deadline and raced against
//! the run's cancellation token.
//!
//! Required tools:
//!   1. `roll_dice`      - `{notation, num_rolls}`
//!   2. `web_search`     - `{query}`
//!   3. `generate_text`  - `{prompt, mode, max_tokens}`

pub mod log;
pub mod mode;
pub mod requests;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::ToolError;

pub use mode::GenerationMode;
pub use requests::{parse_params, DiceRollRequest, GenerateRequest, SearchRequest};

pub const DICE_TOOL: &str = "roll_dice";
pub const SEARCH_TOOL: &str = "web_search";
pub const GENERATE_TOOL: &str = "generate_text";

/// An invokable capability.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Registry key (must be unique)
    fn name(&self) -> &str;

    /// Human-readable description, shown by `adapta tools`
    fn description(&self) -> &str;

    /// Run the tool with JSON parameters and return its text output.
    async fn invoke(&self, params: serde_json::Value) -> Result<String, ToolError>;
}

/// Name and description of a registered tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
}

/// Maps tool names to capabilities.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    timeout: Duration,
}

impl ToolRegistry {
    pub fn new(timeout: Duration) -> Self {
        Self {
            tools: HashMap::new(),
            timeout,
        }
    }

    /// Register a tool, replacing any previous tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Option<Arc<dyn Tool>> {
        let name = tool.name().to_string();
        tracing::debug!("[ToolRegistry] Registered tool: {}", name);
        self.tools.insert(name, tool)
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Registered tools sorted by name.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        let mut list: Vec<ToolDescriptor> = self
            .tools
            .values()
            .map(|t| ToolDescriptor {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }

    /// Invoke a tool by name with a deadline and cancellation.
    pub async fn invoke(
        &self,
        name: &str,
        params: serde_json::Value,
        cancel: &CancellationToken,
    ) -> Result<String, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::Unavailable(name.to_string()))?;

        log::log_tool_call(name, &params);

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ToolError::Cancelled { tool: name.to_string() }),
            timed = tokio::time::timeout(self.timeout, tool.invoke(params)) => match timed {
                Ok(result) => result,
                Err(_) => Err(ToolError::Timeout {
                    tool: name.to_string(),
                    secs: self.timeout.as_secs(),
                }),
            },
        };

        match &outcome {
            Ok(text) => log::log_tool_result(name, text),
            Err(e) => log::log_tool_error(name, e),
        }
        outcome
    }

    /// Serialize a typed request and invoke the tool with it.
    pub async fn invoke_with<T: Serialize>(
        &self,
        name: &str,
        request: &T,
        cancel: &CancellationToken,
    ) -> Result<String, ToolError> {
        let params = serde_json::to_value(request)
            .map_err(|e| ToolError::invalid_params(name, e.to_string()))?;
        self.invoke(name, params, cancel).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes the `text` parameter"
        }
        async fn invoke(&self, params: serde_json::Value) -> Result<String, ToolError> {
            Ok(params["text"].as_str().unwrap_or_default().to_string())
        }
    }

    struct Sleepy;

    #[async_trait]
    impl Tool for Sleepy {
        fn name(&self) -> &str {
            "sleepy"
        }
        fn description(&self) -> &str {
            "Never answers in time"
        }
        async fn invoke(&self, _params: serde_json::Value) -> Result<String, ToolError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("late".to_string())
        }
    }

    #[tokio::test]
    async fn test_invoke_registered_tool() {
        let registry = ToolRegistry::default().with_tool(Arc::new(Echo));
        let out = registry
            .invoke(
                "echo",
                serde_json::json!({ "text": "hi" }),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(out, "hi");
    }

    #[tokio::test]
    async fn test_missing_tool_is_unavailable() {
        let registry = ToolRegistry::default();
        let err = registry
            .invoke("nope", serde_json::Value::Null, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Unavailable(name) if name == "nope"));
    }

    #[tokio::test]
    async fn test_timeout_is_a_tool_failure() {
        let registry = ToolRegistry::new(Duration::from_millis(20)).with_tool(Arc::new(Sleepy));
        let err = registry
            .invoke("sleepy", serde_json::Value::Null, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_cancelled_before_call() {
        let registry = ToolRegistry::default().with_tool(Arc::new(Sleepy));
        let token = CancellationToken::new();
        token.cancel();
        let err = registry
            .invoke("sleepy", serde_json::Value::Null, &token)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Cancelled { .. }));
    }

    #[test]
    fn test_descriptors_sorted() {
        let registry = ToolRegistry::default()
            .with_tool(Arc::new(Sleepy))
            .with_tool(Arc::new(Echo));
        let names: Vec<_> = registry.descriptors().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["echo", "sleepy"]);
    }
}
