//! Two-layer hit point pool.
//!
//! Temporary hit points are a buffer consumed before permanent ones and are not
//! additive to the maximum. Permanent hit points never drop below zero.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitPoints {
    #[serde(rename = "maxHitPoints")]
    max: u32,
    #[serde(rename = "currentHitPoints")]
    current: u32,
    #[serde(rename = "temporaryHitPoints")]
    temporary: u32,
}

/// What a single application of damage did to the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageOutcome {
    pub amount: u32,
    pub absorbed_by_temporary: u32,
    pub dealt_to_current: u32,
    pub current_hit_points: u32,
    pub temporary_hit_points: u32,
}

impl HitPoints {
    /// Build a pool, rejecting `current > max`.
    pub fn new(max: u32, current: u32, temporary: u32) -> Result<Self, DomainError> {
        if current > max {
            return Err(DomainError::validation(format!(
                "current hit points ({}) cannot exceed maximum ({})",
                current, max
            )));
        }
        Ok(Self {
            max,
            current,
            temporary,
        })
    }

    /// Full health, no buffer.
    pub fn full(max: u32) -> Self {
        Self {
            max,
            current: max,
            temporary: 0,
        }
    }

    #[inline]
    pub fn max(&self) -> u32 {
        self.max
    }

    #[inline]
    pub fn current(&self) -> u32 {
        self.current
    }

    #[inline]
    pub fn temporary(&self) -> u32 {
        self.temporary
    }

    pub fn is_down(&self) -> bool {
        self.current == 0
    }

    /// Absorb `amount` with temporary hit points first, the shortfall with
    /// current hit points, flooring current at zero.
    pub fn apply_damage(&mut self, amount: u32) -> DamageOutcome {
        let absorbed = self.temporary.min(amount);
        let shortfall = amount - absorbed;
        let dealt = self.current.min(shortfall);

        self.temporary -= absorbed;
        self.current -= dealt;

        DamageOutcome {
            amount,
            absorbed_by_temporary: absorbed,
            dealt_to_current: dealt,
            current_hit_points: self.current,
            temporary_hit_points: self.temporary,
        }
    }
}
