//! WebSocket message types
//!
//! Clients join rooms (`combat-<id>`, `campaign-<id>`) and then receive every
//! event broadcast to them. Mutations go through the REST API; the socket is
//! a read-only feed plus room management.
//!
//! ## Versioning Policy
//!
//! - New variants can be added at the end (forward compatible)
//! - Renaming variants is a breaking change
//! - Unknown client messages deserialize to `Unknown`

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use skirmish_domain::{CombatStatus, DomainEvent};

use crate::responses::{
    CombatActionData, CombatSessionData, DiceRollData, ErrorCode, ParticipantData,
};

// =============================================================================
// Client Messages
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Subscribe to a combat session's events
    JoinSession { session_id: Uuid },
    /// Unsubscribe from a combat session
    LeaveSession { session_id: Uuid },
    /// Subscribe to a campaign's dice rolls
    JoinCampaign { campaign_id: Uuid },
    /// Keep-alive; answered with `Pong`
    Heartbeat,
    #[serde(other)]
    Unknown,
}

// =============================================================================
// Server Messages
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    Pong,
    Joined {
        room: String,
    },
    Left {
        room: String,
    },
    Error {
        code: ErrorCode,
        message: String,
    },

    // Combat events
    ParticipantAdded {
        combat_session_id: Uuid,
        participant: ParticipantData,
    },
    ParticipantUpdated {
        combat_session_id: Uuid,
        participant: ParticipantData,
    },
    CombatStarted {
        combat_session: CombatSessionData,
    },
    TurnAdvanced {
        combat_session: CombatSessionData,
        new_round: bool,
    },
    CombatStatusChanged {
        combat_session_id: Uuid,
        status: CombatStatus,
    },
    CombatEnded {
        combat_session_id: Uuid,
    },
    ActionRecorded {
        combat_session_id: Uuid,
        action: CombatActionData,
        target: Option<ParticipantData>,
    },

    // Campaign events
    #[serde(rename = "diceRoll")]
    DiceRolled {
        dice_roll: DiceRollData,
    },
}

impl ServerMessage {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }
}

impl From<&DomainEvent> for ServerMessage {
    fn from(event: &DomainEvent) -> Self {
        match event {
            DomainEvent::ParticipantAdded {
                session_id,
                participant,
            } => Self::ParticipantAdded {
                combat_session_id: session_id.to_uuid(),
                participant: participant.into(),
            },
            DomainEvent::ParticipantUpdated {
                session_id,
                participant,
            } => Self::ParticipantUpdated {
                combat_session_id: session_id.to_uuid(),
                participant: participant.into(),
            },
            DomainEvent::CombatStarted { session } => Self::CombatStarted {
                combat_session: session.into(),
            },
            DomainEvent::TurnAdvanced { session, new_round } => Self::TurnAdvanced {
                combat_session: session.into(),
                new_round: *new_round,
            },
            DomainEvent::CombatStatusChanged { session_id, status } => {
                Self::CombatStatusChanged {
                    combat_session_id: session_id.to_uuid(),
                    status: *status,
                }
            }
            DomainEvent::CombatEnded { session_id } => Self::CombatEnded {
                combat_session_id: session_id.to_uuid(),
            },
            DomainEvent::ActionRecorded {
                session_id,
                action,
                target,
            } => Self::ActionRecorded {
                combat_session_id: session_id.to_uuid(),
                action: action.into(),
                target: target.as_ref().map(ParticipantData::from),
            },
            DomainEvent::DiceRolled { roll, .. } => Self::DiceRolled {
                dice_roll: roll.into(),
            },
        }
    }
}
