//! Skirmish domain: the combat session aggregate and everything it owns.
//!
//! No I/O lives here. Time and randomness are passed in by callers.

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod events;
pub mod ids;
pub mod value_objects;

pub use aggregates::{CombatSession, CombatSnapshot};

pub use entities::{
    ActionKind, ActionLedger, CharacterDefaults, CombatAction, DiceRoll, NewCombatAction,
    Participant, ParticipantDraft, ParticipantKind, ParticipantPatch, ParticipantRoster,
    PatchScope,
};

pub use error::DomainError;
pub use events::{
    ActionRecorded, CombatStarted, DomainEvent, EventTopic, StatusChanged, TurnAdvanced,
};

// Re-export ID types
pub use ids::{
    ActionId, CampaignId, CharacterId, CombatSessionId, DiceRollId, ParticipantId, UserId,
};

pub use value_objects::{
    rank_by_initiative, CombatOperation, CombatStatus, DamageOutcome, DiceKind, DiceOutcome,
    DiceSpec, HitPoints, RollMode, StatusToggle, TurnAdvance, TurnCursor, MAX_DICE_COUNT,
    MAX_MODIFIER,
};
