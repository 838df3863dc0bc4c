//! Helper types for port operations.

use std::fmt;
use std::str::FromStr;

use skirmish_domain::{CampaignId, CharacterDefaults, CharacterId, DomainError, UserId};

// =============================================================================
// Identity
// =============================================================================

/// Account role as asserted by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserRole {
    #[default]
    Player,
    DungeonMaster,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::DungeonMaster => "dungeon_master",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "player" => Ok(Self::Player),
            "dungeon_master" | "dm" => Ok(Self::DungeonMaster),
            "admin" => Ok(Self::Admin),
            other => Err(DomainError::parse(format!("unknown role '{}'", other))),
        }
    }
}

/// The authenticated caller of an operation. Trusted as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub role: UserRole,
}

impl Caller {
    pub fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn player(user_id: UserId) -> Self {
        Self::new(user_id, UserRole::Player)
    }

    /// Admins may read every session; they gain no write rights.
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

// =============================================================================
// Character Catalog
// =============================================================================

/// Character values the combat engine reads from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterSnapshot {
    pub id: CharacterId,
    /// Player who owns (controls) the character
    pub user_id: UserId,
    pub name: String,
    pub class: Option<String>,
    pub level: Option<u32>,
    pub armor_class: i32,
    pub max_hit_points: i32,
    pub current_hit_points: i32,
}

impl CharacterSnapshot {
    pub fn defaults(&self) -> CharacterDefaults {
        CharacterDefaults {
            character_id: self.id,
            name: self.name.clone(),
            armor_class: self.armor_class,
            max_hit_points: self.max_hit_points,
            current_hit_points: self.current_hit_points,
        }
    }
}

// =============================================================================
// Campaign Membership
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignSummary {
    pub id: CampaignId,
    pub name: String,
    pub dungeon_master_id: UserId,
}
