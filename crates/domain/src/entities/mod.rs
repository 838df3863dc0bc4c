//! Domain entities - Core business objects with identity

mod combat_action;
mod dice_roll;
mod participant;

pub use combat_action::{ActionKind, ActionLedger, CombatAction, NewCombatAction};
pub use dice_roll::DiceRoll;
pub use participant::{
    CharacterDefaults, Participant, ParticipantDraft, ParticipantKind, ParticipantPatch,
    ParticipantRoster, PatchScope,
};
