//! Agent configuration.
//!
//! Every setting has a default and can be overridden from the environment
//! with the `AGENT_` prefix (e.g. `AGENT_MAX_RETRIES=3`). A YAML file can
//! supply a base layer; environment variables always win over it.
//!
//! ```yaml
//! model_name: "claude-sonnet-4-20250514"
//! quality_threshold: 7.5
//! max_retries: 1
//! rules_file: "./classifier-rules.yaml"
//! ```

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bound accepted by the text-generation tool for `max_tokens`.
pub const MAX_TOKEN_BUDGET: u32 = 4096;

/// Runtime settings for the orchestrator and the tools it drives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Model used by the text-generation tool
    pub model_name: String,

    /// Sampling temperature for text generation
    pub temperature: f64,

    /// Token budget for generation steps and synthesis
    pub max_tokens: u32,

    /// Cap on orchestration attempts (entries into the analyze stage)
    pub max_iterations: u32,

    /// Minimum quality score (0-10) for an answer to pass
    pub quality_threshold: f64,

    /// Maximum number of retries after a failed quality check
    pub max_retries: u32,

    /// Default log verbosity when `RUST_LOG` is not set
    pub log_level: String,

    /// Deadline for every single tool invocation
    pub tool_timeout_secs: u64,

    /// Optional YAML file replacing the built-in classifier rules
    pub rules_file: Option<PathBuf>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model_name: "claude-sonnet-4-20250514".to_string(),
            temperature: 0.7,
            max_tokens: 2048,
            max_iterations: 10,
            quality_threshold: 7.0,
            max_retries: 2,
            log_level: "info".to_string(),
            tool_timeout_secs: 60,
            rules_file: None,
        }
    }
}

impl AgentConfig {
    pub const ENV_PREFIX: &'static str = "AGENT_";

    /// Defaults overlaid with `AGENT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Parse a configuration from a YAML string. Missing keys keep defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Apply `AGENT_*` environment variables on top of this configuration.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary `AGENT_*` lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", Self::ENV_PREFIX, name));

        if let Some(raw) = var("MODEL_NAME") {
            self.model_name = raw;
        }
        if let Some(raw) = var("TEMPERATURE") {
            self.temperature = parse_var("AGENT_TEMPERATURE", &raw)?;
        }
        if let Some(raw) = var("MAX_TOKENS") {
            self.max_tokens = parse_var("AGENT_MAX_TOKENS", &raw)?;
        }
        if let Some(raw) = var("MAX_ITERATIONS") {
            self.max_iterations = parse_var("AGENT_MAX_ITERATIONS", &raw)?;
        }
        if let Some(raw) = var("QUALITY_THRESHOLD") {
            self.quality_threshold = parse_var("AGENT_QUALITY_THRESHOLD", &raw)?;
        }
        if let Some(raw) = var("MAX_RETRIES") {
            self.max_retries = parse_var("AGENT_MAX_RETRIES", &raw)?;
        }
        if let Some(raw) = var("LOG_LEVEL") {
            self.log_level = raw.to_lowercase();
        }
        if let Some(raw) = var("TOOL_TIMEOUT_SECS") {
            self.tool_timeout_secs = parse_var("AGENT_TOOL_TIMEOUT_SECS", &raw)?;
        }
        if let Some(raw) = var("RULES_FILE") {
            self.rules_file = (!raw.trim().is_empty()).then(|| PathBuf::from(raw));
        }

        self.validate()?;
        Ok(self)
    }

    /// Check value ranges that the rest of the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=10.0).contains(&self.quality_threshold) {
            return Err(invalid(
                "quality_threshold",
                self.quality_threshold,
                "must be within 0-10",
            ));
        }
        if self.max_tokens == 0 || self.max_tokens > MAX_TOKEN_BUDGET {
            return Err(invalid(
                "max_tokens",
                self.max_tokens,
                "must be within 1-4096",
            ));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(invalid("temperature", self.temperature, "must be within 0-1"));
        }
        if self.max_iterations == 0 {
            return Err(invalid("max_iterations", self.max_iterations, "must be at least 1"));
        }
        if self.tool_timeout_secs == 0 {
            return Err(invalid(
                "tool_timeout_secs",
                self.tool_timeout_secs,
                "must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn invalid(key: &str, value: impl Display, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Load `.env.local` then `.env` from the working directory.
///
/// Variables already present in the environment are never overwritten.
pub fn load_dotenv() {
    for filename in &[".env.local", ".env"] {
        let path = Path::new(filename);
        if !path.exists() {
            continue;
        }
        if let Ok(content) = std::fs::read_to_string(path) {
            for (key, value) in parse_dotenv(&content) {
                if std::env::var(&key).is_err() {
                    std::env::set_var(&key, &value);
                }
            }
            tracing::info!("[Config] Loaded environment from '{}'", filename);
        }
    }
}

/// Parse `KEY=VALUE` lines, skipping blanks and `#` comments.
pub fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        if let Some(eq_idx) = line.find('=') {
            let key = line[..eq_idx].trim();
            if key.is_empty() {
                continue;
            }
            let mut value = line[eq_idx + 1..].trim().to_string();
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = value[1..value.len() - 1].to_string();
            }
            pairs.push((key.to_string(), value));
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.quality_threshold, 7.0);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.max_iterations, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = AgentConfig::default()
            .with_overrides(lookup(&[
                ("AGENT_MAX_RETRIES", "3"),
                ("AGENT_QUALITY_THRESHOLD", "8.5"),
                ("AGENT_LOG_LEVEL", "DEBUG"),
                ("AGENT_RULES_FILE", "rules.yaml"),
            ]))
            .unwrap();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.quality_threshold, 8.5);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.rules_file, Some(PathBuf::from("rules.yaml")));
    }

    #[test]
    fn test_invalid_env_value() {
        let err = AgentConfig::default()
            .with_overrides(lookup(&[("AGENT_MAX_RETRIES", "many")]))
            .unwrap_err();
        match err {
            ConfigError::InvalidValue { key, value, .. } => {
                assert_eq!(key, "AGENT_MAX_RETRIES");
                assert_eq!(value, "many");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_threshold_out_of_range() {
        let result =
            AgentConfig::default().with_overrides(lookup(&[("AGENT_QUALITY_THRESHOLD", "12")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_yaml_keeps_defaults() {
        let config = AgentConfig::from_yaml("max_retries: 1\nquality_threshold: 6.0\n").unwrap();
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.quality_threshold, 6.0);
        assert_eq!(config.max_tokens, 2048);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.yaml");
        std::fs::write(&path, "tool_timeout_secs: 5\n").unwrap();
        let config = AgentConfig::from_file(&path).unwrap();
        assert_eq!(config.tool_timeout(), Duration::from_secs(5));

        let missing = AgentConfig::from_file(dir.path().join("missing.yaml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_parse_dotenv() {
        let pairs = parse_dotenv(
            "# comment\n\nANTHROPIC_API_KEY=\"sk-test\"\nexport TAVILY_API_KEY='tv'\nBROKEN\n",
        );
        assert_eq!(
            pairs,
            vec![
                ("ANTHROPIC_API_KEY".to_string(), "sk-test".to_string()),
                ("TAVILY_API_KEY".to_string(), "tv".to_string()),
            ]
        );
    }
}
