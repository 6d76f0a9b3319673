//! Generation modes understood by the text-generation tool.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// A named sub-behavior of the text-generation tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    General,
    Condense,
    Simplify,
    Polish,
    Review,
}

impl GenerationMode {
    pub const ALL: [GenerationMode; 5] = [
        GenerationMode::General,
        GenerationMode::Condense,
        GenerationMode::Simplify,
        GenerationMode::Polish,
        GenerationMode::Review,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::General => "general",
            GenerationMode::Condense => "condense",
            GenerationMode::Simplify => "simplify",
            GenerationMode::Polish => "polish",
            GenerationMode::Review => "review",
        }
    }

    /// Comma-separated list of every valid mode name.
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for GenerationMode {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ToolError::InvalidMode {
                mode: s.to_string(),
                valid: Self::valid_names(),
            })
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_modes_parse() {
        for mode in GenerationMode::ALL {
            assert_eq!(mode.as_str().parse::<GenerationMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let err = "code_review".parse::<GenerationMode>().unwrap_err();
        match err {
            ToolError::InvalidMode { mode, valid } => {
                assert_eq!(mode, "code_review");
                assert!(valid.contains("condense"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
