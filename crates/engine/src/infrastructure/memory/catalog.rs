//! In-memory character catalog and campaign membership
//!
//! Stands in for the account/campaign backend. Optionally seeded from a JSON
//! file at startup:
//!
//! ```json
//! {
//!   "campaigns": [{ "id": "...", "name": "...", "dungeonMasterId": "...", "playerIds": ["..."] }],
//!   "characters": [{ "id": "...", "userId": "...", "name": "...", "armorClass": 14,
//!                    "maxHitPoints": 22, "currentHitPoints": 22 }]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use skirmish_domain::{CampaignId, CharacterId, UserId};

use crate::infrastructure::ports::{
    CampaignRepo, CampaignSummary, CharacterRepo, CharacterSnapshot, RepoError,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSeed {
    #[serde(default)]
    pub campaigns: Vec<CampaignSeed>,
    #[serde(default)]
    pub characters: Vec<CharacterSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSeed {
    pub id: CampaignId,
    pub name: String,
    pub dungeon_master_id: UserId,
    #[serde(default)]
    pub player_ids: Vec<UserId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSeed {
    pub id: CharacterId,
    pub user_id: UserId,
    pub name: String,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default = "default_armor_class")]
    pub armor_class: i32,
    pub max_hit_points: i32,
    #[serde(default)]
    pub current_hit_points: Option<i32>,
}

fn default_armor_class() -> i32 {
    10
}

struct CampaignRecord {
    summary: CampaignSummary,
    players: HashSet<UserId>,
}

#[derive(Default)]
pub struct InMemoryCatalog {
    campaigns: DashMap<CampaignId, CampaignRecord>,
    characters: DashMap<CharacterId, CharacterSnapshot>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: CatalogSeed) -> Self {
        let catalog = Self::new();
        for campaign in seed.campaigns {
            catalog.insert_campaign(campaign);
        }
        for character in seed.characters {
            catalog.insert_character(character);
        }
        catalog
    }

    pub async fn load(path: &Path) -> Result<Self, RepoError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RepoError::database("load_catalog_seed", e))?;
        let seed: CatalogSeed =
            serde_json::from_str(&raw).map_err(|e| RepoError::serialization(e))?;
        tracing::info!(
            path = %path.display(),
            campaigns = seed.campaigns.len(),
            characters = seed.characters.len(),
            "Loaded catalog seed"
        );
        Ok(Self::from_seed(seed))
    }

    pub fn insert_campaign(&self, seed: CampaignSeed) {
        let record = CampaignRecord {
            summary: CampaignSummary {
                id: seed.id,
                name: seed.name,
                dungeon_master_id: seed.dungeon_master_id,
            },
            players: seed.player_ids.into_iter().collect(),
        };
        self.campaigns.insert(seed.id, record);
    }

    pub fn insert_character(&self, seed: CharacterSeed) {
        let snapshot = CharacterSnapshot {
            id: seed.id,
            user_id: seed.user_id,
            name: seed.name,
            class: seed.class,
            level: seed.level,
            armor_class: seed.armor_class,
            max_hit_points: seed.max_hit_points,
            current_hit_points: seed.current_hit_points.unwrap_or(seed.max_hit_points),
        };
        self.characters.insert(seed.id, snapshot);
    }
}

#[async_trait]
impl CharacterRepo for InMemoryCatalog {
    async fn get(&self, id: CharacterId) -> Result<Option<CharacterSnapshot>, RepoError> {
        Ok(self.characters.get(&id).map(|entry| entry.value().clone()))
    }
}

#[async_trait]
impl CampaignRepo for InMemoryCatalog {
    async fn get(&self, id: CampaignId) -> Result<Option<CampaignSummary>, RepoError> {
        Ok(self.campaigns.get(&id).map(|entry| entry.summary.clone()))
    }

    async fn is_player(&self, campaign_id: CampaignId, user_id: UserId) -> Result<bool, RepoError> {
        Ok(self
            .campaigns
            .get(&campaign_id)
            .map_or(false, |entry| entry.players.contains(&user_id)))
    }
}
