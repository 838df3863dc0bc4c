//! Campaign membership lookups shared by the combat and dice use cases.

use std::sync::Arc;

use skirmish_domain::{CampaignId, UserId};

use crate::infrastructure::ports::{CampaignRepo, RepoError};

/// A user's standing in one campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    DungeonMaster,
    Player,
    Outsider,
}

impl Membership {
    pub fn is_member(self) -> bool {
        !matches!(self, Self::Outsider)
    }
}

pub struct CampaignAccess {
    campaigns: Arc<dyn CampaignRepo>,
}

impl CampaignAccess {
    pub fn new(campaigns: Arc<dyn CampaignRepo>) -> Self {
        Self { campaigns }
    }

    /// `None` when the campaign does not exist.
    pub async fn membership(
        &self,
        campaign_id: CampaignId,
        user_id: UserId,
    ) -> Result<Option<Membership>, RepoError> {
        let Some(campaign) = self.campaigns.get(campaign_id).await? else {
            return Ok(None);
        };

        if campaign.dungeon_master_id == user_id {
            return Ok(Some(Membership::DungeonMaster));
        }
        if self.campaigns.is_player(campaign_id, user_id).await? {
            return Ok(Some(Membership::Player));
        }
        Ok(Some(Membership::Outsider))
    }
}
