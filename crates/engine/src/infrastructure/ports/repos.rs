//! Repository port traits.

use async_trait::async_trait;

use skirmish_domain::{
    CampaignId, CharacterId, CombatSession, CombatSessionId, DiceRoll, UserId,
};

use super::error::RepoError;
use super::types::{CampaignSummary, CharacterSnapshot};

// =============================================================================
// Combat Sessions
// =============================================================================

/// Persists whole combat aggregates: session header, roster and ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CombatSessionRepo: Send + Sync {
    async fn get(&self, id: CombatSessionId) -> Result<Option<CombatSession>, RepoError>;
    async fn save(&self, session: &CombatSession) -> Result<(), RepoError>;

    /// Newest first
    async fn list_by_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<CombatSession>, RepoError>;
    /// Newest first
    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<CombatSession>, RepoError>;
}

// =============================================================================
// Character Catalog
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterRepo: Send + Sync {
    async fn get(&self, id: CharacterId) -> Result<Option<CharacterSnapshot>, RepoError>;
}

// =============================================================================
// Campaign Membership
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CampaignRepo: Send + Sync {
    async fn get(&self, id: CampaignId) -> Result<Option<CampaignSummary>, RepoError>;
    async fn is_player(&self, campaign_id: CampaignId, user_id: UserId) -> Result<bool, RepoError>;
}

// =============================================================================
// Dice Roll History
// =============================================================================

/// Append-only record of labelled rolls. Quick rolls are never stored.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiceRollRepo: Send + Sync {
    async fn save(&self, roll: &DiceRoll) -> Result<(), RepoError>;

    /// Newest first
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<DiceRoll>, RepoError>;
    /// Newest first, private rolls included
    async fn list_by_campaign(&self, campaign_id: CampaignId)
        -> Result<Vec<DiceRoll>, RepoError>;
}
