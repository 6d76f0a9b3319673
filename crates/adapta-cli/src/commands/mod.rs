//! CLI command implementations.
//!
//! Each submodule corresponds to a top-level CLI command and reuses the
//! adapta-core engine with the adapta-tools registry.

pub mod ask;
pub mod classify;
pub mod plan;
pub mod rules;
pub mod tools;

use std::path::PathBuf;
use std::sync::Arc;

use adapta_core::workflow::{ClassifierRules, Planner};
use adapta_core::{AgentConfig, Orchestrator};

/// Resolve the configuration: YAML file (or defaults), then `AGENT_*`
/// environment overrides, then the `--rules` flag.
pub fn load_config(
    config_file: Option<&str>,
    rules_file: Option<&str>,
) -> Result<AgentConfig, String> {
    let base = match config_file {
        Some(path) => AgentConfig::from_file(path).map_err(|e| e.to_string())?,
        None => AgentConfig::default(),
    };
    let mut config = base.with_env_overrides().map_err(|e| e.to_string())?;
    if let Some(rules) = rules_file {
        config.rules_file = Some(PathBuf::from(rules));
    }
    Ok(config)
}

/// Build an orchestrator over the built-in tools.
pub fn build_orchestrator(config: AgentConfig) -> Result<Orchestrator, String> {
    let registry = Arc::new(adapta_tools::default_registry(&config));
    Orchestrator::new(config, registry).map_err(|e| e.to_string())
}

/// Planner for `config`, without building any tools.
pub fn build_planner(config: &AgentConfig) -> Result<Planner, String> {
    let rules = match &config.rules_file {
        Some(path) => ClassifierRules::from_file(path).map_err(|e| e.to_string())?,
        None => ClassifierRules::default(),
    };
    Planner::from_rules(&rules).map_err(|e| e.to_string())
}

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    );
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
