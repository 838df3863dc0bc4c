//! Combat-related mutation outcomes
//!
//! Returned by `CombatSession` mutations so callers can report and announce
//! what changed without re-reading the aggregate.

use crate::entities::{CombatAction, Participant};
use crate::value_objects::CombatStatus;
use crate::ParticipantId;

/// Turn order fixed by `start_combat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatStarted {
    /// Active participants, first to act first
    pub turn_order: Vec<ParticipantId>,
    /// Whether this start resumed a paused fight
    pub restarted: bool,
}

/// Result of advancing one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnAdvanced {
    pub round: u32,
    pub current_turn_index: usize,
    pub new_round: bool,
    pub current_participant_id: Option<ParticipantId>,
}

/// A lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChanged {
    pub from: CombatStatus,
    pub to: CombatStatus,
}

/// A recorded action and, when damage landed, the target afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRecorded {
    pub action: CombatAction,
    pub damaged_target: Option<Participant>,
}
