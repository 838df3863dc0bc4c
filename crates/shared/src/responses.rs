//! Response types for the REST API and broadcast payloads
//!
//! Successful responses are wrapped in [`ApiResponse`]; failures use
//! [`ErrorResponse`]. Entity DTOs keep the field names clients already use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use skirmish_domain::{
    ActionKind, CombatAction, CombatSnapshot, CombatStatus, DamageOutcome, DiceKind, DiceRoll,
    Participant, ParticipantKind, RollMode,
};

// =============================================================================
// Envelope
// =============================================================================

/// `{ "success": true, "data": ..., "count": n }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            count: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// List response carrying its length in `count`.
    pub fn list(data: Vec<T>) -> Self {
        let count = data.len();
        Self {
            success: true,
            data,
            count: Some(count),
        }
    }
}

/// `{ "success": false, "code": ..., "message": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code,
            message: message.into(),
        }
    }
}

// =============================================================================
// Error Codes
// =============================================================================

/// Error classification codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // === Client Errors (4xx) ===
    /// Request was malformed
    BadRequest,
    /// Caller identity missing or unreadable
    Unauthorized,
    /// User lacks permission for this operation
    Forbidden,
    /// Requested resource not found
    NotFound,
    /// Operation illegal in the session's current state
    InvalidState,
    /// Request data failed validation
    ValidationError,

    // === Server Errors (5xx) ===
    /// Internal server error
    InternalError,

    /// Unknown variant for forward compatibility
    #[serde(other)]
    Unknown,
}

// =============================================================================
// Health
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthData {
    pub status: String,
    pub version: String,
}

// =============================================================================
// Combat
// =============================================================================

/// Read-only character fields joined into participant responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterInfo {
    pub id: Uuid,
    pub name: String,
    pub class: Option<String>,
    pub level: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantData {
    pub id: Uuid,
    pub combat_session_id: Uuid,
    pub character_id: Option<Uuid>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParticipantKind,
    pub initiative: i32,
    pub armor_class: u32,
    pub max_hit_points: u32,
    pub current_hit_points: u32,
    pub temporary_hit_points: u32,
    pub conditions: Vec<String>,
    pub stats: Option<serde_json::Value>,
    pub is_visible: bool,
    pub order: u32,
    pub is_active: bool,
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<CharacterInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Participant> for ParticipantData {
    fn from(p: &Participant) -> Self {
        Self {
            id: p.id.to_uuid(),
            combat_session_id: p.session_id.to_uuid(),
            character_id: p.character_id.map(|c| c.to_uuid()),
            name: p.name.clone(),
            kind: p.kind,
            initiative: p.initiative,
            armor_class: p.armor_class,
            max_hit_points: p.hit_points.max(),
            current_hit_points: p.hit_points.current(),
            temporary_hit_points: p.hit_points.temporary(),
            conditions: p.conditions.iter().cloned().collect(),
            stats: p.stats.clone(),
            is_visible: p.visible,
            order: p.order,
            is_active: p.is_active,
            notes: p.notes.clone(),
            character: None,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl ParticipantData {
    pub fn with_character(mut self, character: Option<CharacterInfo>) -> Self {
        self.character = character;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatSessionData {
    pub id: Uuid,
    pub campaign_id: Option<Uuid>,
    pub dungeon_master_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub status: CombatStatus,
    pub round: u32,
    pub current_turn_index: usize,
    pub current_participant_id: Option<Uuid>,
    /// Sorted by `order`
    pub participants: Vec<ParticipantData>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&CombatSnapshot> for CombatSessionData {
    fn from(s: &CombatSnapshot) -> Self {
        Self {
            id: s.id.to_uuid(),
            campaign_id: s.campaign_id.map(|c| c.to_uuid()),
            dungeon_master_id: s.owner_id.to_uuid(),
            name: s.name.clone(),
            description: s.description.clone(),
            notes: s.notes.clone(),
            status: s.status,
            round: s.round,
            current_turn_index: s.current_turn_index,
            current_participant_id: s.current_participant_id.map(|p| p.to_uuid()),
            participants: s.participants.iter().map(ParticipantData::from).collect(),
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Result of advancing a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnAdvancedData {
    pub session: CombatSessionData,
    pub new_round: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatActionData {
    pub id: Uuid,
    pub combat_session_id: Uuid,
    pub round: u32,
    pub actor_id: Uuid,
    pub target_id: Option<Uuid>,
    pub action_type: ActionKind,
    pub action_name: String,
    pub description: Option<String>,
    pub roll_data: Option<serde_json::Value>,
    pub damage: Option<u32>,
    pub damage_type: Option<String>,
    pub success: Option<bool>,
    pub save_type: Option<String>,
    #[serde(rename = "saveDC")]
    pub save_dc: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<DamageOutcome>,
    pub created_at: DateTime<Utc>,
}

impl From<&CombatAction> for CombatActionData {
    fn from(a: &CombatAction) -> Self {
        Self {
            id: a.id.to_uuid(),
            combat_session_id: a.session_id.to_uuid(),
            round: a.round,
            actor_id: a.actor_id.to_uuid(),
            target_id: a.target_id.map(|t| t.to_uuid()),
            action_type: a.kind,
            action_name: a.name.clone(),
            description: a.description.clone(),
            roll_data: a.roll_data.clone(),
            damage: a.damage,
            damage_type: a.damage_type.clone(),
            success: a.success,
            save_type: a.save_type.clone(),
            save_dc: a.save_dc,
            resolution: a.resolution,
            created_at: a.created_at,
        }
    }
}

/// A recorded action and the target's state after any damage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecordedData {
    pub action: CombatActionData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ParticipantData>,
}

// =============================================================================
// Dice
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceRollData {
    pub id: Uuid,
    pub user_id: Uuid,
    pub campaign_id: Option<Uuid>,
    pub character_name: Option<String>,
    pub dice_type: DiceKind,
    pub dice_count: u32,
    pub modifier: i32,
    pub advantage: bool,
    pub disadvantage: bool,
    pub results: Vec<i32>,
    pub total: i32,
    pub roll_type: Option<String>,
    pub roll_label: Option<String>,
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&DiceRoll> for DiceRollData {
    fn from(r: &DiceRoll) -> Self {
        let spec = r.spec();
        Self {
            id: r.id.to_uuid(),
            user_id: r.user_id.to_uuid(),
            campaign_id: r.campaign_id.map(|c| c.to_uuid()),
            character_name: r.character_name.clone(),
            dice_type: spec.kind(),
            dice_count: spec.count(),
            modifier: spec.modifier(),
            advantage: spec.mode() == RollMode::Advantage,
            disadvantage: spec.mode() == RollMode::Disadvantage,
            results: r.outcome.results.clone(),
            total: r.total(),
            roll_type: r.roll_type.clone(),
            roll_label: r.roll_label.clone(),
            is_private: r.is_private,
            created_at: r.rolled_at,
        }
    }
}
