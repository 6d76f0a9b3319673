//! Consistent logging for tool calls.

use crate::error::ToolError;

const PREVIEW_CHARS: usize = 100;

pub fn log_tool_call(tool: &str, params: &serde_json::Value) {
    tracing::info!("[Tool] Calling tool: {}", tool);
    tracing::debug!("[Tool]    Parameters: {}", preview(&params.to_string(), 300));
}

pub fn log_tool_result(tool: &str, result: &str) {
    tracing::info!(
        "[Tool] {} returned: {}",
        tool,
        preview(result, PREVIEW_CHARS)
    );
    tracing::debug!("[Tool]    Total length: {} characters", result.chars().count());
}

pub fn log_tool_error(tool: &str, error: &ToolError) {
    tracing::error!("[Tool] {} failed: {}", tool, error);
}

/// First `max` characters of `s`, with an ellipsis when cut.
pub fn preview(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
