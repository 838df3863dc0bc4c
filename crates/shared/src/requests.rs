//! REST request bodies
//!
//! Enum-like fields (`type`, `actionType`, `diceType`, `action`) stay as raw
//! strings here so an unknown value reaches the engine and is reported as a
//! validation error instead of a body rejection.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCombatSessionRequest {
    pub name: String,
    #[serde(default)]
    pub campaign_id: Option<Uuid>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCombatSessionsQuery {
    #[serde(default)]
    pub campaign_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddParticipantRequest {
    #[serde(default)]
    pub character_id: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub initiative: Option<i32>,
    #[serde(default)]
    pub armor_class: Option<i32>,
    #[serde(default)]
    pub max_hit_points: Option<i32>,
    #[serde(default)]
    pub is_visible: Option<bool>,
    #[serde(default)]
    pub stats: Option<serde_json::Value>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParticipantRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub initiative: Option<i32>,
    #[serde(default)]
    pub armor_class: Option<i32>,
    #[serde(default)]
    pub max_hit_points: Option<i32>,
    #[serde(default)]
    pub current_hit_points: Option<i32>,
    #[serde(default)]
    pub temporary_hit_points: Option<i32>,
    #[serde(default)]
    pub conditions: Option<Vec<String>>,
    #[serde(default)]
    pub is_visible: Option<bool>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub stats: Option<serde_json::Value>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleStatusRequest {
    /// `pause` or `resume`
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordActionRequest {
    pub actor_id: Uuid,
    #[serde(default)]
    pub target_id: Option<Uuid>,
    pub action_type: String,
    pub action_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub roll_data: Option<serde_json::Value>,
    #[serde(default)]
    pub damage: Option<i32>,
    #[serde(default)]
    pub damage_type: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub save_type: Option<String>,
    #[serde(default, rename = "saveDC")]
    pub save_dc: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListActionsQuery {
    #[serde(default)]
    pub round: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceRollRequest {
    pub dice_type: String,
    #[serde(default = "default_dice_count")]
    pub dice_count: i64,
    #[serde(default)]
    pub modifier: i32,
    #[serde(default)]
    pub advantage: bool,
    #[serde(default)]
    pub disadvantage: bool,
    #[serde(default)]
    pub roll_type: Option<String>,
    #[serde(default)]
    pub roll_label: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub campaign_id: Option<Uuid>,
    #[serde(default)]
    pub character_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickRollRequest {
    pub dice_type: String,
    #[serde(default = "default_dice_count")]
    pub dice_count: i64,
    #[serde(default)]
    pub modifier: i32,
}

/// `limit` falls back to the listing's own default when absent or zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceHistoryQuery {
    #[serde(default)]
    pub limit: Option<u32>,
}

fn default_dice_count() -> i64 {
    1
}
