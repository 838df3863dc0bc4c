//! Action ledger entries.
//!
//! Actions are append-only. Each one is stamped with the round in which it was
//! recorded and, when damage was applied, the resulting hit point change.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::DamageOutcome;
use crate::{ActionId, CombatSessionId, ParticipantId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Attack,
    Spell,
    Ability,
    Movement,
    Item,
    Other,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::Spell => "spell",
            Self::Ability => "ability",
            Self::Movement => "movement",
            Self::Item => "item",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attack" => Ok(Self::Attack),
            "spell" => Ok(Self::Spell),
            "ability" => Ok(Self::Ability),
            "movement" => Ok(Self::Movement),
            "item" => Ok(Self::Item),
            "other" => Ok(Self::Other),
            other => Err(DomainError::validation(format!(
                "unknown action type '{}'",
                other
            ))),
        }
    }
}

/// One recorded action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatAction {
    pub id: ActionId,
    pub session_id: CombatSessionId,
    pub round: u32,
    pub actor_id: ParticipantId,
    pub target_id: Option<ParticipantId>,
    pub kind: ActionKind,
    pub name: String,
    pub description: Option<String>,
    /// Opaque dice data supplied by the client
    pub roll_data: Option<serde_json::Value>,
    pub damage: Option<u32>,
    pub damage_type: Option<String>,
    pub success: Option<bool>,
    pub save_type: Option<String>,
    pub save_dc: Option<u32>,
    /// Set when damage was applied to the target
    pub resolution: Option<DamageOutcome>,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields of an action; the session fills in the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCombatAction {
    pub actor_id: ParticipantId,
    pub target_id: Option<ParticipantId>,
    pub kind: ActionKind,
    pub name: String,
    pub description: Option<String>,
    pub roll_data: Option<serde_json::Value>,
    pub damage: Option<i32>,
    pub damage_type: Option<String>,
    pub success: Option<bool>,
    pub save_type: Option<String>,
    pub save_dc: Option<i32>,
}

impl NewCombatAction {
    pub fn new(actor_id: ParticipantId, kind: ActionKind, name: impl Into<String>) -> Self {
        Self {
            actor_id,
            target_id: None,
            kind,
            name: name.into(),
            description: None,
            roll_data: None,
            damage: None,
            damage_type: None,
            success: None,
            save_type: None,
            save_dc: None,
        }
    }

    pub fn with_target(mut self, target_id: ParticipantId) -> Self {
        self.target_id = Some(target_id);
        self
    }

    pub fn with_damage(mut self, damage: i32) -> Self {
        self.damage = Some(damage);
        self
    }

    /// Check field-level rules that need no session context.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("action name cannot be empty"));
        }
        if matches!(self.damage, Some(d) if d < 0) {
            return Err(DomainError::validation("damage cannot be negative"));
        }
        if matches!(self.save_dc, Some(dc) if dc < 0) {
            return Err(DomainError::validation("saveDC cannot be negative"));
        }
        Ok(())
    }
}

/// Append-only history of one session's actions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionLedger {
    entries: Vec<CombatAction>,
}

impl ActionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, action: CombatAction) -> &CombatAction {
        self.entries.push(action);
        let last = self.entries.len() - 1;
        &self.entries[last]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in recording order, optionally limited to one round.
    pub fn list(&self, round: Option<u32>) -> Vec<&CombatAction> {
        self.entries
            .iter()
            .filter(|a| round.map_or(true, |r| a.round == r))
            .collect()
    }
}
