//! Dice roller for `NdM[kK]` notation.
//!
//! `2d20` rolls two twenty-sided dice and sums them; `4d6k3` rolls four
//! six-sided dice and keeps the highest three.

use std::fmt;
use std::str::FromStr;

use adapta_core::tools::{parse_params, DiceRollRequest, Tool, DICE_TOOL};
use adapta_core::ToolError;
use async_trait::async_trait;
use rand::Rng;

pub const MAX_DICE: u32 = 100;
pub const MAX_SIDES: u32 = 1000;
pub const MAX_ROLLS: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    #[error("'{0}' is not dice notation (expected NdM or NdMkK, e.g. 2d20k1)")]
    Malformed(String),

    #[error("number of dice must be between 1 and 100, got {0}")]
    DiceCount(u32),

    #[error("number of sides must be between 2 and 1000, got {0}")]
    Sides(u32),

    #[error("cannot keep {keep} of {count} dice")]
    Keep { keep: u32, count: u32 },
}

/// Parsed `NdM[kK]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceNotation {
    pub count: u32,
    pub sides: u32,
    /// Keep the highest `keep` dice
    pub keep: Option<u32>,
}

impl FromStr for DiceNotation {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let re = regex::Regex::new(r"^(\d+)d(\d+)(?:k(\d+))?$").unwrap();
        let normalized = s.trim().to_lowercase();
        let caps = re
            .captures(&normalized)
            .ok_or_else(|| NotationError::Malformed(s.to_string()))?;

        let number = |i: usize| -> Result<Option<u32>, NotationError> {
            caps.get(i)
                .map(|m| m.as_str().parse::<u32>())
                .transpose()
                .map_err(|_| NotationError::Malformed(s.to_string()))
        };
        let count = number(1)?.unwrap_or_default();
        let sides = number(2)?.unwrap_or_default();
        let keep = number(3)?;

        if !(1..=MAX_DICE).contains(&count) {
            return Err(NotationError::DiceCount(count));
        }
        if !(2..=MAX_SIDES).contains(&sides) {
            return Err(NotationError::Sides(sides));
        }
        if let Some(k) = keep {
            if k == 0 || k > count {
                return Err(NotationError::Keep { keep: k, count });
            }
        }

        Ok(Self { count, sides, keep })
    }
}

impl fmt::Display for DiceNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        if let Some(k) = self.keep {
            write!(f, "k{}", k)?;
        }
        Ok(())
    }
}

/// One roll of a notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceRoll {
    pub dice: Vec<u32>,
    pub kept: Vec<u32>,
    pub total: u32,
}

impl DiceNotation {
    pub fn roll<R: Rng>(&self, rng: &mut R) -> DiceRoll {
        let dice: Vec<u32> = (0..self.count)
            .map(|_| rng.gen_range(1..=self.sides))
            .collect();

        let kept = match self.keep {
            Some(k) => {
                let mut sorted = dice.clone();
                sorted.sort_unstable_by(|a, b| b.cmp(a));
                sorted.truncate(k as usize);
                sorted
            }
            None => dice.clone(),
        };
        let total = kept.iter().sum();

        DiceRoll { dice, kept, total }
    }
}

/// Roll `notation` `num_rolls` times and render the results.
pub fn roll_dice<R: Rng>(
    notation: &str,
    num_rolls: u32,
    rng: &mut R,
) -> Result<String, ToolError> {
    let parsed: DiceNotation = notation
        .parse()
        .map_err(|e: NotationError| ToolError::invalid_params(DICE_TOOL, e.to_string()))?;
    if !(1..=MAX_ROLLS).contains(&num_rolls) {
        return Err(ToolError::invalid_params(
            DICE_TOOL,
            format!("num_rolls must be between 1 and {}, got {}", MAX_ROLLS, num_rolls),
        ));
    }

    let rolls: Vec<DiceRoll> = (0..num_rolls).map(|_| parsed.roll(&mut *rng)).collect();

    let mut out = format!("🎲 Rolling {}", parsed);
    if num_rolls > 1 {
        out.push_str(&format!(" ({} times)", num_rolls));
    }
    out.push('\n');

    for (i, roll) in rolls.iter().enumerate() {
        out.push_str(&format!("Roll {}: {:?}", i + 1, roll.dice));
        if parsed.keep.is_some() {
            out.push_str(&format!(" → kept {:?}", roll.kept));
        }
        out.push_str(&format!(" = {}\n", roll.total));
    }

    if num_rolls > 1 {
        let grand: u32 = rolls.iter().map(|r| r.total).sum();
        out.push_str(&format!("Sum of all rolls: {}\n", grand));
    }

    Ok(out.trim_end().to_string())
}

/// The `roll_dice` tool.
#[derive(Debug, Default)]
pub struct DiceRoller;

impl DiceRoller {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for DiceRoller {
    fn name(&self) -> &str {
        DICE_TOOL
    }

    fn description(&self) -> &str {
        "Roll dice in NdM[kK] notation (e.g. 2d20k1 keeps the highest of two d20s)"
    }

    async fn invoke(&self, params: serde_json::Value) -> Result<String, ToolError> {
        let request: DiceRollRequest = parse_params(DICE_TOOL, params)?;
        let mut rng = rand::thread_rng();
        roll_dice(&request.notation, request.num_rolls, &mut rng)
    }
}
