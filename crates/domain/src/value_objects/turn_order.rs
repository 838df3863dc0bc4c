//! Turn-order arithmetic.
//!
//! Initiative fixes the order once, at combat start. After that the scheduler
//! only walks the live active set by its stored `order`, so deactivating a
//! participant shortens the cycle without renumbering anyone.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Rank entries by initiative, highest first. Ties keep their input order.
///
/// Returns the input indices in turn order; position in the result is the
/// participant's new 0-based `order`.
pub fn rank_by_initiative(initiatives: &[i32]) -> Vec<usize> {
    let mut ranked: Vec<usize> = (0..initiatives.len()).collect();
    // sort_by is stable
    ranked.sort_by(|a, b| initiatives[*b].cmp(&initiatives[*a]));
    ranked
}

/// Where the session stands within combat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnCursor {
    pub round: u32,
    pub current_turn_index: usize,
}

/// Result of advancing the cursor by one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnAdvance {
    pub round: u32,
    pub current_turn_index: usize,
    pub new_round: bool,
}

impl TurnCursor {
    /// Round 0, turn 0: nothing has started.
    pub fn not_started() -> Self {
        Self {
            round: 0,
            current_turn_index: 0,
        }
    }

    /// Round 1, turn 0.
    pub fn first_turn() -> Self {
        Self {
            round: 1,
            current_turn_index: 0,
        }
    }

    /// Step to the next turn against `active_count` live participants,
    /// wrapping into a new round when the index runs off the end.
    pub fn advance(&mut self, active_count: usize) -> Result<TurnAdvance, DomainError> {
        if active_count == 0 {
            return Err(DomainError::invalid_state_transition(
                "no active participants to take a turn",
            ));
        }

        let next = self.current_turn_index + 1;
        let new_round = next >= active_count;
        if new_round {
            self.current_turn_index = 0;
            self.round += 1;
        } else {
            self.current_turn_index = next;
        }

        Ok(TurnAdvance {
            round: self.round,
            current_turn_index: self.current_turn_index,
            new_round,
        })
    }
}
