//! Rule-based query classification.
//!
//! Rules are data: an ordered list of `(task type, patterns)` sets plus the
//! keywords that signal a need for live information. The default rules can
//! be replaced at startup from a YAML file:
//!
//! ```yaml
//! rule_sets:
//!   - task_type: dice_action
//!     patterns: ['\broll\b.*\bdice\b', '\d+d\d+']
//!   - task_type: research
//!     patterns: ['research|study', 'compare|versus']
//! live_info_keywords: [latest, current, today]
//! ```
//!
//! Rule sets are checked in order and the first set with a matching pattern
//! wins; queries matching nothing are `general`. All matching is done on the
//! lowercased query.

use std::path::Path;

use chrono::Datelike;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::workflow::schema::TaskType;

/// Patterns that select one task type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub task_type: TaskType,
    pub patterns: Vec<String>,
}

/// Classification rules in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierRules {
    pub rule_sets: Vec<RuleSet>,

    #[serde(default = "default_live_info_keywords")]
    pub live_info_keywords: Vec<String>,
}

fn default_live_info_keywords() -> Vec<String> {
    strings(&["latest", "current", "recent", "today", "now", "news", "update", "this year"])
}

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            rule_sets: vec![
                RuleSet {
                    task_type: TaskType::DiceAction,
                    patterns: strings(&[r"\broll\b.*\bdice\b", r"\bdice\b.*\broll\b", r"\d+d\d+"]),
                },
                RuleSet {
                    task_type: TaskType::Research,
                    patterns: strings(&[
                        r"research|study|analyze|investigate|survey",
                        r"latest|recent|current|today|news|update",
                        r"history of|background on|timeline of",
                        r"compare|contrast|difference between|versus",
                        r"comprehensive|detailed|in-depth",
                        r"what is.*\b(latest|current|comprehensive|detailed)",
                        r"tell me about.*\b(latest|recent|news)",
                        r"\b20\d{2}\b",
                    ]),
                },
            ],
            live_info_keywords: default_live_info_keywords(),
        }
    }
}

impl ClassifierRules {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn pattern_count(&self) -> usize {
        self.rule_sets.iter().map(|r| r.patterns.len()).sum()
    }
}

/// Compiled [`ClassifierRules`].
#[derive(Debug, Clone)]
pub struct Classifier {
    rule_sets: Vec<(TaskType, Vec<Regex>)>,
    /// Lowercased keywords and near-term years, matched as substrings
    live_info: Vec<String>,
}

impl Classifier {
    /// Compile rules; any invalid pattern is a configuration error.
    pub fn new(rules: &ClassifierRules) -> Result<Self, ConfigError> {
        let rule_sets = rules
            .rule_sets
            .iter()
            .map(|set| {
                let compiled = set
                    .patterns
                    .iter()
                    .map(|p| compile(p))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((set.task_type, compiled))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let mut live_info: Vec<String> = rules
            .live_info_keywords
            .iter()
            .map(|k| k.to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        live_info.extend(near_term_years());

        Ok(Self {
            rule_sets,
            live_info,
        })
    }

    /// Task type for a query. Never fails; unmatched queries are `general`.
    pub fn classify(&self, query: &str) -> TaskType {
        self.matched_rule(query)
            .map(|(task_type, _)| task_type)
            .unwrap_or_default()
    }

    /// The task type and the first pattern that matched, if any.
    pub fn matched_rule(&self, query: &str) -> Option<(TaskType, &str)> {
        let lowered = query.to_lowercase();
        self.rule_sets.iter().find_map(|(task_type, patterns)| {
            patterns
                .iter()
                .find(|re| re.is_match(&lowered))
                .map(|re| (*task_type, re.as_str()))
        })
    }

    /// Whether the query asks about something time-sensitive.
    pub fn needs_live_info(&self, query: &str) -> bool {
        let lowered = query.to_lowercase();
        self.live_info.iter().any(|k| lowered.contains(k.as_str()))
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&ClassifierRules::default()).expect("built-in classifier rules compile")
    }
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Last year, this year and next year.
fn near_term_years() -> Vec<String> {
    let year = chrono::Utc::now().year();
    (year - 1..=year + 1).map(|y| y.to_string()).collect()
}
