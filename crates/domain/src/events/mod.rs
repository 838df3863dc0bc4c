//! Domain Events
//!
//! Coarse-grained events representing significant state changes in the domain.
//! These are the domain's internal events - they get mapped to wire messages
//! at the adapter boundary before being broadcast.
//!
//! ## Aggregate Mutation Events
//!
//! The `combat_events` submodule contains return types from aggregate
//! mutations, communicating what happened when state was modified.

pub mod combat_events;

pub use combat_events::*;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::aggregates::CombatSnapshot;
use crate::entities::{CombatAction, DiceRoll, Participant};
use crate::value_objects::CombatStatus;
use crate::{CampaignId, CombatSessionId};

/// Broadcast room an event is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTopic {
    Combat(CombatSessionId),
    Campaign(CampaignId),
}

impl fmt::Display for EventTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Combat(id) => write!(f, "combat-{}", id),
            Self::Campaign(id) => write!(f, "campaign-{}", id),
        }
    }
}

/// Domain event for significant state changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DomainEvent {
    // Participant Registry
    ParticipantAdded {
        session_id: CombatSessionId,
        participant: Participant,
    },
    ParticipantUpdated {
        session_id: CombatSessionId,
        participant: Participant,
    },

    // Turn-Order Scheduler
    CombatStarted {
        session: CombatSnapshot,
    },
    TurnAdvanced {
        session: CombatSnapshot,
        new_round: bool,
    },

    // Session State Machine
    CombatStatusChanged {
        session_id: CombatSessionId,
        status: CombatStatus,
    },
    CombatEnded {
        session_id: CombatSessionId,
    },

    // Action Ledger
    ActionRecorded {
        session_id: CombatSessionId,
        action: CombatAction,
        target: Option<Participant>,
    },

    // Dice
    DiceRolled {
        campaign_id: CampaignId,
        roll: DiceRoll,
    },
}

impl DomainEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ParticipantAdded { .. } => "participantAdded",
            Self::ParticipantUpdated { .. } => "participantUpdated",
            Self::CombatStarted { .. } => "combatStarted",
            Self::TurnAdvanced { .. } => "turnAdvanced",
            Self::CombatStatusChanged { .. } => "combatStatusChanged",
            Self::CombatEnded { .. } => "combatEnded",
            Self::ActionRecorded { .. } => "actionRecorded",
            Self::DiceRolled { .. } => "diceRoll",
        }
    }

    pub fn topic(&self) -> EventTopic {
        match self {
            Self::ParticipantAdded { session_id, .. }
            | Self::ParticipantUpdated { session_id, .. }
            | Self::CombatStatusChanged { session_id, .. }
            | Self::CombatEnded { session_id }
            | Self::ActionRecorded { session_id, .. } => EventTopic::Combat(*session_id),
            Self::CombatStarted { session } | Self::TurnAdvanced { session, .. } => {
                EventTopic::Combat(session.id)
            }
            Self::DiceRolled { campaign_id, .. } => EventTopic::Campaign(*campaign_id),
        }
    }
}
