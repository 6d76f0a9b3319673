//! Integration tests for the adapta-cli commands.
//!
//! These exercise the same code paths as the binary. Nothing here calls a
//! network tool: `ask` is only driven to its validation error.

use std::io::Write;

use adapta_cli::commands;
use adapta_core::TaskType;

fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write temp file");
    file
}

const COIN_RULES: &str = r#"
rule_sets:
  - task_type: dice_action
    patterns: ['\bflip\b.*\bcoin\b', '\d+d\d+']
  - task_type: research
    patterns: ['\bsurvey\b']
live_info_keywords: [breaking]
"#;

#[test]
fn test_load_config_defaults() {
    let config = commands::load_config(None, None).expect("default config");
    assert_eq!(config.max_retries, 2);
    assert_eq!(config.quality_threshold, 7.0);
    assert!(config.rules_file.is_none());
}

#[test]
fn test_load_config_from_yaml_file() {
    let file = write_temp("quality_threshold: 8.5\nmax_retries: 1\nlog_level: debug\n");
    let path = file.path().to_str().unwrap().to_string();

    let config = commands::load_config(Some(&path), Some("rules.yaml")).expect("config file");
    assert_eq!(config.quality_threshold, 8.5);
    assert_eq!(config.max_retries, 1);
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.max_tokens, 2048);
    assert_eq!(
        config.rules_file.as_deref(),
        Some(std::path::Path::new("rules.yaml"))
    );
}

#[test]
fn test_load_config_rejects_out_of_range_values() {
    let file = write_temp("quality_threshold: 12\n");
    let path = file.path().to_str().unwrap().to_string();

    let err = commands::load_config(Some(&path), None).unwrap_err();
    assert!(err.contains("quality_threshold"), "unexpected error: {}", err);
}

#[test]
fn test_load_config_missing_file() {
    let err = commands::load_config(Some("/nonexistent/adapta.yaml"), None).unwrap_err();
    assert!(err.contains("/nonexistent/adapta.yaml"));
}

#[test]
fn test_rules_validate() {
    let file = write_temp(COIN_RULES);
    let path = file.path().to_str().unwrap().to_string();
    assert!(commands::rules::validate(&path).is_ok());
}

#[test]
fn test_rules_validate_rejects_bad_pattern() {
    let file = write_temp("rule_sets:\n  - task_type: research\n    patterns: ['(unclosed']\n");
    let path = file.path().to_str().unwrap().to_string();

    let err = commands::rules::validate(&path).unwrap_err();
    assert!(err.contains("(unclosed"), "unexpected error: {}", err);
}

#[test]
fn test_rules_validate_rejects_unknown_task_type() {
    let file = write_temp("rule_sets:\n  - task_type: poetry\n    patterns: ['poem']\n");
    let path = file.path().to_str().unwrap().to_string();
    assert!(commands::rules::validate(&path).is_err());
}

#[test]
fn test_planner_uses_custom_rules() {
    let file = write_temp(COIN_RULES);
    let path = file.path().to_str().unwrap().to_string();
    let config = commands::load_config(None, Some(&path)).unwrap();

    let planner = commands::build_planner(&config).unwrap();
    assert_eq!(
        planner.analyze("flip a coin for me").task_type,
        TaskType::DiceAction
    );
    assert_eq!(planner.analyze("a survey of tea").task_type, TaskType::Research);

    let general = planner.analyze("breaking stories about tea");
    assert_eq!(general.task_type, TaskType::General);
    assert!(general.live_search_injected);
}

#[test]
fn test_classify_and_plan_commands() {
    let config = commands::load_config(None, None).unwrap();
    assert!(commands::classify::run(&config, "roll 2d20").is_ok());
    assert!(commands::plan::run(&config, "Research the history of Rust").is_ok());
    assert!(commands::tools::list(&config).is_ok());
}

#[test]
fn test_orchestrator_rejects_missing_rules_file() {
    let config = commands::load_config(None, Some("/nonexistent/rules.yaml")).unwrap();
    assert!(commands::build_orchestrator(config).is_err());
}

#[tokio::test]
async fn test_ask_rejects_empty_query() {
    let config = commands::load_config(None, None).unwrap();
    let err = commands::ask::run(config, "   ", false).await.unwrap_err();
    assert_eq!(err, "Query must not be empty");
}
