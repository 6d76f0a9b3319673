//! Adapta Tools — the concrete capabilities behind the engine's tool ids.
//!
//!   - `roll_dice`      → [`DiceRoller`]          (local, `rand`)
//!   - `web_search`     → [`TavilySearch`]        (Tavily REST API)
//!   - `generate_text`  → [`AnthropicGenerator`]  (Anthropic Messages API)
//!
//! Credentials are read from the environment once, when the registry is
//! built. A missing credential does not prevent registration; the tool
//! reports `ToolError::Configuration` when it is called.

pub mod dice;
pub mod generation;
pub mod search;

use std::sync::Arc;

use adapta_core::{AgentConfig, ToolRegistry};

pub use dice::{DiceNotation, DiceRoller};
pub use generation::{AnthropicGenerator, GeneratorConfig, Profile};
pub use search::{SearchConfig, TavilySearch};

/// Registry with every built-in tool, configured from `config` and the
/// environment.
pub fn default_registry(config: &AgentConfig) -> ToolRegistry {
    let timeout = config.tool_timeout();
    ToolRegistry::new(timeout)
        .with_tool(Arc::new(DiceRoller::new()))
        .with_tool(Arc::new(TavilySearch::new(SearchConfig::from_env(), timeout)))
        .with_tool(Arc::new(AnthropicGenerator::new(
            GeneratorConfig::from_env(config),
            timeout,
        )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use adapta_core::tools::{DICE_TOOL, GENERATE_TOOL, SEARCH_TOOL};

    #[test]
    fn test_default_registry_has_required_tools() {
        let registry = default_registry(&AgentConfig::default());
        assert_eq!(registry.len(), 3);
        for name in [DICE_TOOL, SEARCH_TOOL, GENERATE_TOOL] {
            assert!(registry.contains(name), "missing {}", name);
        }
        assert_eq!(registry.timeout().as_secs(), 60);
    }
}
