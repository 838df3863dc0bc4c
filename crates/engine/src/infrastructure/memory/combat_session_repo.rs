//! In-memory combat session storage
//!
//! Stores whole aggregates by id. `get` hands out clones, so a caller mutates
//! its own copy and nothing changes here until `save`.

use async_trait::async_trait;
use dashmap::DashMap;

use skirmish_domain::{CampaignId, CombatSession, CombatSessionId, UserId};

use crate::infrastructure::ports::{CombatSessionRepo, RepoError};

#[derive(Default)]
pub struct InMemoryCombatSessionRepo {
    sessions: DashMap<CombatSessionId, CombatSession>,
}

impl InMemoryCombatSessionRepo {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_newest_first(&self, keep: impl Fn(&CombatSession) -> bool) -> Vec<CombatSession> {
        let mut sessions: Vec<CombatSession> = self
            .sessions
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        sessions.sort_by_key(|s| std::cmp::Reverse(s.created_at()));
        sessions
    }
}

#[async_trait]
impl CombatSessionRepo for InMemoryCombatSessionRepo {
    async fn get(&self, id: CombatSessionId) -> Result<Option<CombatSession>, RepoError> {
        Ok(self.sessions.get(&id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, session: &CombatSession) -> Result<(), RepoError> {
        self.sessions.insert(session.id(), session.clone());
        Ok(())
    }

    async fn list_by_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<CombatSession>, RepoError> {
        Ok(self.collect_newest_first(|s| s.campaign_id() == Some(campaign_id)))
    }

    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<CombatSession>, RepoError> {
        Ok(self.collect_newest_first(|s| s.owner_id() == owner_id))
    }
}
