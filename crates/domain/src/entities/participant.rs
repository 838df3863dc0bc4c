//! Combat participants and the per-session roster.
//!
//! A participant belongs to exactly one combat session. It is never removed:
//! defeated or retreating combatants are deactivated and the scheduler skips
//! them, but they stay on the roster as a historical record.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{rank_by_initiative, DamageOutcome, HitPoints};
use crate::{CharacterId, CombatSessionId, ParticipantId};

const DEFAULT_CREATURE_NAME: &str = "Creature";
const DEFAULT_ARMOR_CLASS: u32 = 10;
const DEFAULT_MAX_HIT_POINTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantKind {
    Player,
    Npc,
    Monster,
}

impl fmt::Display for ParticipantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Player => "player",
            Self::Npc => "npc",
            Self::Monster => "monster",
        })
    }
}

impl FromStr for ParticipantKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "player" => Ok(Self::Player),
            "npc" => Ok(Self::Npc),
            "monster" => Ok(Self::Monster),
            other => Err(DomainError::validation(format!(
                "unknown participant kind '{}'",
                other
            ))),
        }
    }
}

/// A combatant tracked within one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub session_id: CombatSessionId,
    pub character_id: Option<CharacterId>,
    pub name: String,
    pub kind: ParticipantKind,
    pub armor_class: u32,
    #[serde(flatten)]
    pub hit_points: HitPoints,
    pub initiative: i32,
    /// Position in the active turn sequence, assigned by the scheduler
    pub order: u32,
    pub conditions: BTreeSet<String>,
    pub is_active: bool,
    pub visible: bool,
    /// Opaque stat block, not interpreted
    pub stats: Option<serde_json::Value>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Participant {
    pub fn apply_damage(&mut self, amount: u32, now: DateTime<Utc>) -> DamageOutcome {
        let outcome = self.hit_points.apply_damage(amount);
        self.updated_at = now;
        outcome
    }

    /// Apply `patch` as a whole or not at all.
    ///
    /// A controller patch is first narrowed to the fields a player may touch;
    /// everything else in it is dropped without error.
    pub fn apply_patch(
        &mut self,
        patch: ParticipantPatch,
        scope: PatchScope,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let patch = match scope {
            PatchScope::Owner => patch,
            PatchScope::Controller => patch.controller_subset(),
        };

        let mut next = self.clone();

        if let Some(name) = patch.name {
            next.name = non_empty_name(name)?;
        }
        if let Some(kind) = patch.kind {
            next.kind = kind;
        }
        if let Some(ac) = patch.armor_class {
            next.armor_class = non_negative("armorClass", ac)?;
        }
        if let Some(initiative) = patch.initiative {
            next.initiative = initiative;
        }
        if let Some(conditions) = patch.conditions {
            next.conditions = conditions.into_iter().collect();
        }
        if let Some(visible) = patch.visible {
            next.visible = visible;
        }
        if let Some(is_active) = patch.is_active {
            next.is_active = is_active;
        }
        if let Some(stats) = patch.stats {
            next.stats = Some(stats);
        }
        if let Some(notes) = patch.notes {
            next.notes = Some(notes);
        }

        let max = match patch.max_hit_points {
            Some(v) => non_negative("maxHitPoints", v)?,
            None => self.hit_points.max(),
        };
        let current = match patch.current_hit_points {
            Some(v) => non_negative("currentHitPoints", v)?,
            None => self.hit_points.current(),
        };
        let temporary = match patch.temporary_hit_points {
            Some(v) => non_negative("temporaryHitPoints", v)?,
            None => self.hit_points.temporary(),
        };
        next.hit_points = HitPoints::new(max, current, temporary)?;
        next.updated_at = now;

        *self = next;
        Ok(())
    }
}

/// Who is patching a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchScope {
    /// Session owner: every field
    Owner,
    /// Player controlling the linked character: hit points and conditions only
    Controller,
}

/// Partial update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticipantPatch {
    pub name: Option<String>,
    pub kind: Option<ParticipantKind>,
    pub armor_class: Option<i32>,
    pub max_hit_points: Option<i32>,
    pub current_hit_points: Option<i32>,
    pub temporary_hit_points: Option<i32>,
    pub initiative: Option<i32>,
    pub conditions: Option<Vec<String>>,
    pub visible: Option<bool>,
    pub is_active: Option<bool>,
    pub stats: Option<serde_json::Value>,
    pub notes: Option<String>,
}

impl ParticipantPatch {
    /// Keep only `currentHitPoints`, `temporaryHitPoints` and `conditions`.
    pub fn controller_subset(self) -> Self {
        Self {
            current_hit_points: self.current_hit_points,
            temporary_hit_points: self.temporary_hit_points,
            conditions: self.conditions,
            ..Self::default()
        }
    }
}

/// Values a linked character contributes when a participant is created from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterDefaults {
    pub character_id: CharacterId,
    pub name: String,
    pub armor_class: i32,
    pub max_hit_points: i32,
    pub current_hit_points: i32,
}

/// Caller-supplied fields for a new participant; unset fields take defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticipantDraft {
    pub name: Option<String>,
    pub kind: Option<ParticipantKind>,
    pub armor_class: Option<i32>,
    pub max_hit_points: Option<i32>,
    pub initiative: Option<i32>,
    pub visible: Option<bool>,
    pub stats: Option<serde_json::Value>,
    pub notes: Option<String>,
}

impl ParticipantDraft {
    /// Resolve defaults (from `character` when linked) and validate.
    pub fn into_participant(
        self,
        session_id: CombatSessionId,
        character: Option<CharacterDefaults>,
        order: u32,
        now: DateTime<Utc>,
    ) -> Result<Participant, DomainError> {
        let name = match (self.name, &character) {
            (Some(name), _) => name,
            (None, Some(c)) => c.name.clone(),
            (None, None) => DEFAULT_CREATURE_NAME.to_string(),
        };
        let kind = self.kind.unwrap_or(if character.is_some() {
            ParticipantKind::Player
        } else {
            ParticipantKind::Monster
        });

        let armor_class = match (self.armor_class, &character) {
            (Some(ac), _) => non_negative("armorClass", ac)?,
            (None, Some(c)) => non_negative("armorClass", c.armor_class)?,
            (None, None) => DEFAULT_ARMOR_CLASS,
        };

        // An explicit maximum also sets current; otherwise a character keeps
        // whatever damage it already carries.
        let hit_points = match (self.max_hit_points, &character) {
            (Some(max), _) => HitPoints::full(non_negative("maxHitPoints", max)?),
            (None, Some(c)) => HitPoints::new(
                non_negative("maxHitPoints", c.max_hit_points)?,
                non_negative("currentHitPoints", c.current_hit_points)?,
                0,
            )?,
            (None, None) => HitPoints::full(DEFAULT_MAX_HIT_POINTS),
        };

        Ok(Participant {
            id: ParticipantId::new(),
            session_id,
            character_id: character.map(|c| c.character_id),
            name: non_empty_name(name)?,
            kind,
            armor_class,
            hit_points,
            initiative: self.initiative.unwrap_or(0),
            order,
            conditions: BTreeSet::new(),
            is_active: true,
            visible: self.visible.unwrap_or(true),
            stats: self.stats,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        })
    }
}

/// The roster of one session, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantRoster {
    participants: Vec<Participant>,
}

impl ParticipantRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Order a newly appended participant receives.
    pub fn next_order(&self) -> u32 {
        self.participants.len() as u32
    }

    pub fn push(&mut self, participant: Participant) -> &Participant {
        self.participants.push(participant);
        let last = self.participants.len() - 1;
        &self.participants[last]
    }

    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    pub fn active_count(&self) -> usize {
        self.participants.iter().filter(|p| p.is_active).count()
    }

    /// Live active participants sorted by `order` ascending.
    ///
    /// Equal orders (late arrivals while paused) keep insertion order.
    pub fn active_in_turn_order(&self) -> Vec<&Participant> {
        let mut active: Vec<&Participant> =
            self.participants.iter().filter(|p| p.is_active).collect();
        active.sort_by_key(|p| p.order);
        active
    }

    /// Rewrite every active participant's `order` to its initiative rank.
    /// Returns the ids in the new turn order.
    pub fn assign_initiative_order(&mut self) -> Vec<ParticipantId> {
        let active: Vec<usize> = self
            .participants
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_active)
            .map(|(i, _)| i)
            .collect();
        let initiatives: Vec<i32> = active
            .iter()
            .map(|i| self.participants[*i].initiative)
            .collect();

        rank_by_initiative(&initiatives)
            .into_iter()
            .enumerate()
            .map(|(rank, idx)| {
                let participant = &mut self.participants[active[idx]];
                participant.order = rank as u32;
                participant.id
            })
            .collect()
    }
}

fn non_negative(field: &str, value: i32) -> Result<u32, DomainError> {
    u32::try_from(value)
        .map_err(|_| DomainError::validation(format!("{} cannot be negative", field)))
}

fn non_empty_name(name: String) -> Result<String, DomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("participant name cannot be empty"));
    }
    Ok(trimmed.to_string())
}
