//! In-memory dice roll history

use async_trait::async_trait;
use dashmap::DashMap;

use skirmish_domain::{CampaignId, DiceRoll, DiceRollId, UserId};

use crate::infrastructure::ports::{DiceRollRepo, RepoError};

#[derive(Default)]
pub struct InMemoryDiceRollRepo {
    rolls: DashMap<DiceRollId, DiceRoll>,
}

impl InMemoryDiceRollRepo {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_newest_first(&self, keep: impl Fn(&DiceRoll) -> bool) -> Vec<DiceRoll> {
        let mut rolls: Vec<DiceRoll> = self
            .rolls
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        rolls.sort_by_key(|r| std::cmp::Reverse(r.rolled_at));
        rolls
    }
}

#[async_trait]
impl DiceRollRepo for InMemoryDiceRollRepo {
    async fn save(&self, roll: &DiceRoll) -> Result<(), RepoError> {
        self.rolls.insert(roll.id, roll.clone());
        Ok(())
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<DiceRoll>, RepoError> {
        Ok(self.collect_newest_first(|r| r.user_id == user_id))
    }

    async fn list_by_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<DiceRoll>, RepoError> {
        Ok(self.collect_newest_first(|r| r.campaign_id == Some(campaign_id)))
    }
}
