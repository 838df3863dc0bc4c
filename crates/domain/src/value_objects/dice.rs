//! Dice rolling value objects
//!
//! Supports the standard polyhedral set (d4 through d100), a dice count,
//! a flat modifier, and d20 advantage/disadvantage.
//! Randomness is injected as a closure so callers decide where rolls come from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Largest dice count accepted in one roll.
pub const MAX_DICE_COUNT: u32 = 100;

/// Largest flat modifier, either sign, accepted in one roll.
pub const MAX_MODIFIER: i32 = 1_000;

/// A standard polyhedral die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiceKind {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
    D100,
}

impl DiceKind {
    pub fn sides(self) -> i32 {
        match self {
            Self::D4 => 4,
            Self::D6 => 6,
            Self::D8 => 8,
            Self::D10 => 10,
            Self::D12 => 12,
            Self::D20 => 20,
            Self::D100 => 100,
        }
    }
}

impl fmt::Display for DiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

impl FromStr for DiceKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "d4" => Ok(Self::D4),
            "d6" => Ok(Self::D6),
            "d8" => Ok(Self::D8),
            "d10" => Ok(Self::D10),
            "d12" => Ok(Self::D12),
            "d20" => Ok(Self::D20),
            "d100" => Ok(Self::D100),
            other => Err(DomainError::validation(format!(
                "invalid dice type '{}', expected one of d4, d6, d8, d10, d12, d20, d100",
                other
            ))),
        }
    }
}

/// How many d20s to throw and which one to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollMode {
    Normal,
    Advantage,
    Disadvantage,
}

/// A validated roll request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceSpec {
    kind: DiceKind,
    count: u32,
    modifier: i32,
    mode: RollMode,
}

/// Result of rolling a [`DiceSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceOutcome {
    pub spec: DiceSpec,
    /// Every die thrown, in throw order
    pub results: Vec<i32>,
    pub total: i32,
}

impl DiceSpec {
    /// Validate a roll request.
    ///
    /// Advantage and disadvantage are d20-only and mutually exclusive.
    pub fn new(
        kind: DiceKind,
        count: i64,
        modifier: i32,
        advantage: bool,
        disadvantage: bool,
    ) -> Result<Self, DomainError> {
        if count < 1 || count > i64::from(MAX_DICE_COUNT) {
            return Err(DomainError::validation(format!(
                "dice count must be between 1 and {}",
                MAX_DICE_COUNT
            )));
        }

        if !(-MAX_MODIFIER..=MAX_MODIFIER).contains(&modifier) {
            return Err(DomainError::validation(format!(
                "modifier must be between -{} and {}",
                MAX_MODIFIER, MAX_MODIFIER
            )));
        }

        let mode = match (advantage, disadvantage) {
            (true, true) => {
                return Err(DomainError::validation(
                    "advantage and disadvantage cannot be combined",
                ))
            }
            (true, false) => RollMode::Advantage,
            (false, true) => RollMode::Disadvantage,
            (false, false) => RollMode::Normal,
        };

        if mode != RollMode::Normal && kind != DiceKind::D20 {
            return Err(DomainError::validation(
                "advantage and disadvantage can only be used with d20",
            ));
        }

        Ok(Self {
            kind,
            count: count as u32,
            modifier,
            mode,
        })
    }

    #[inline]
    pub fn kind(&self) -> DiceKind {
        self.kind
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    #[inline]
    pub fn modifier(&self) -> i32 {
        self.modifier
    }

    #[inline]
    pub fn mode(&self) -> RollMode {
        self.mode
    }

    /// Roll using `die(min, max)`, which must return a value in `min..=max`.
    pub fn roll(&self, mut die: impl FnMut(i32, i32) -> i32) -> DiceOutcome {
        let sides = self.kind.sides();
        let (results, kept) = match self.mode {
            RollMode::Normal => {
                let results: Vec<i32> = (0..self.count).map(|_| die(1, sides)).collect();
                let sum = results.iter().sum();
                (results, sum)
            }
            RollMode::Advantage | RollMode::Disadvantage => {
                let first = die(1, sides);
                let second = die(1, sides);
                let kept = if self.mode == RollMode::Advantage {
                    first.max(second)
                } else {
                    first.min(second)
                };
                (vec![first, second], kept)
            }
        };

        DiceOutcome {
            spec: *self,
            results,
            total: kept.saturating_add(self.modifier),
        }
    }
}

impl fmt::Display for DiceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.kind)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{}", m),
            m => write!(f, "{}", m),
        }
    }
}
