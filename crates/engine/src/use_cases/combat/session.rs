//! Session creation and read use cases.

use std::sync::Arc;

use skirmish_domain::{CampaignId, CombatSession, CombatSessionId, Participant};
use skirmish_shared::CreateCombatSessionRequest;

use crate::infrastructure::ports::{Caller, ClockPort, CombatSessionRepo};
use crate::use_cases::access::{CampaignAccess, Membership};

use super::{load_session, CombatAccess, CombatError, SessionDetails};

// =============================================================================
// Create
// =============================================================================

/// Create a session in `Preparing`, owned by the caller.
///
/// A campaign-linked session may only be created by that campaign's
/// dungeon master.
pub struct CreateSession {
    sessions: Arc<dyn CombatSessionRepo>,
    campaigns: Arc<CampaignAccess>,
    clock: Arc<dyn ClockPort>,
}

impl CreateSession {
    pub fn new(
        sessions: Arc<dyn CombatSessionRepo>,
        campaigns: Arc<CampaignAccess>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            sessions,
            campaigns,
            clock,
        }
    }

    pub async fn execute(
        &self,
        caller: &Caller,
        input: CreateCombatSessionRequest,
    ) -> Result<CombatSession, CombatError> {
        let campaign_id = input.campaign_id.map(CampaignId::from_uuid);
        if let Some(campaign_id) = campaign_id {
            let membership = self
                .campaigns
                .membership(campaign_id, caller.user_id)
                .await?
                .ok_or_else(|| CombatError::not_found("Campaign", campaign_id))?;
            if membership != Membership::DungeonMaster {
                return Err(CombatError::forbidden(
                    "only the campaign's dungeon master can create combat sessions",
                ));
            }
        }

        let mut session =
            CombatSession::new(caller.user_id, campaign_id, input.name, self.clock.now())?;
        if let Some(description) = input.description {
            session = session.with_description(description);
        }
        if let Some(notes) = input.notes {
            session = session.with_notes(notes);
        }

        self.sessions.save(&session).await?;
        tracing::info!(
            session_id = %session.id(),
            owner_id = %caller.user_id,
            "Combat session created"
        );
        Ok(session)
    }
}

// =============================================================================
// Reads
// =============================================================================

pub struct GetSession {
    sessions: Arc<dyn CombatSessionRepo>,
    access: Arc<CombatAccess>,
}

impl GetSession {
    pub fn new(sessions: Arc<dyn CombatSessionRepo>, access: Arc<CombatAccess>) -> Self {
        Self { sessions, access }
    }

    /// Session header, roster and the catalog characters it links to.
    pub async fn execute(
        &self,
        caller: &Caller,
        id: CombatSessionId,
    ) -> Result<SessionDetails, CombatError> {
        let session = load_session(self.sessions.as_ref(), id).await?;
        self.access.ensure_can_read(&session, caller).await?;

        let characters = self.access.characters_for(session.participants()).await?;
        tracing::debug!(session_id = %id, "Combat session read");
        Ok(SessionDetails {
            session: session.snapshot(),
            characters,
        })
    }
}

pub struct ListSessions {
    sessions: Arc<dyn CombatSessionRepo>,
    access: Arc<CombatAccess>,
}

impl ListSessions {
    pub fn new(sessions: Arc<dyn CombatSessionRepo>, access: Arc<CombatAccess>) -> Self {
        Self { sessions, access }
    }

    /// Sessions of one campaign, or the caller's own sessions when no
    /// campaign is given. Newest first.
    pub async fn execute(
        &self,
        caller: &Caller,
        campaign_id: Option<CampaignId>,
    ) -> Result<Vec<CombatSession>, CombatError> {
        let sessions = match campaign_id {
            Some(campaign_id) => {
                self.access
                    .ensure_can_view_campaign(campaign_id, caller)
                    .await?;
                self.sessions.list_by_campaign(campaign_id).await?
            }
            None => self.sessions.list_by_owner(caller.user_id).await?,
        };
        Ok(sessions)
    }
}

/// Active participants in the order turns are taken.
pub struct GetTurnOrder {
    sessions: Arc<dyn CombatSessionRepo>,
    access: Arc<CombatAccess>,
}

impl GetTurnOrder {
    pub fn new(sessions: Arc<dyn CombatSessionRepo>, access: Arc<CombatAccess>) -> Self {
        Self { sessions, access }
    }

    pub async fn execute(
        &self,
        caller: &Caller,
        id: CombatSessionId,
    ) -> Result<Vec<Participant>, CombatError> {
        let session = load_session(self.sessions.as_ref(), id).await?;
        self.access.ensure_can_read(&session, caller).await?;
        Ok(session.list_active().into_iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::{
        CampaignSummary, MockCampaignRepo, MockCharacterRepo, MockCombatSessionRepo, RepoError,
    };
    use crate::use_cases::combat::test_support::{
        access, active_session, active_session_with_character, character, characters_holding,
        repo_holding, t0,
    };
    use skirmish_domain::{CharacterId, CombatStatus, UserId};

    fn campaigns_with(campaign_id: CampaignId, dm: UserId, players: Vec<UserId>) -> MockCampaignRepo {
        let mut campaigns = MockCampaignRepo::new();
        campaigns
            .expect_get()
            .withf(move |id| *id == campaign_id)
            .returning(move |id| {
                Ok(Some(CampaignSummary {
                    id,
                    name: "Tomb of Horrors".to_string(),
                    dungeon_master_id: dm,
                }))
            });
        campaigns
            .expect_is_player()
            .returning(move |_, user| Ok(players.contains(&user)));
        campaigns
    }

    fn create_use_case(
        sessions: MockCombatSessionRepo,
        campaigns: MockCampaignRepo,
    ) -> CreateSession {
        CreateSession::new(
            Arc::new(sessions),
            Arc::new(CampaignAccess::new(Arc::new(campaigns))),
            Arc::new(FixedClock(t0())),
        )
    }

    fn request(name: &str, campaign_id: Option<CampaignId>) -> CreateCombatSessionRequest {
        CreateCombatSessionRequest {
            name: name.to_string(),
            campaign_id: campaign_id.map(CampaignId::to_uuid),
            description: Some("Ambush at the ford".to_string()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn create_starts_in_preparing_at_round_zero() {
        let owner = UserId::new();
        let mut sessions = MockCombatSessionRepo::new();
        sessions
            .expect_save()
            .withf(|s| s.status() == CombatStatus::Preparing && s.round() == 0)
            .times(1)
            .returning(|_| Ok(()));

        let use_case = create_use_case(sessions, MockCampaignRepo::new());
        let session = use_case
            .execute(&Caller::player(owner), request("Ford", None))
            .await
            .unwrap();

        assert_eq!(session.owner_id(), owner);
        assert_eq!(session.description(), Some("Ambush at the ford"));
        assert_eq!(session.created_at(), t0());
    }

    #[tokio::test]
    async fn create_for_campaign_requires_its_dungeon_master() {
        let campaign_id = CampaignId::new();
        let dm = UserId::new();
        let player = UserId::new();
        let mut sessions = MockCombatSessionRepo::new();
        sessions.expect_save().never();

        let use_case = create_use_case(sessions, campaigns_with(campaign_id, dm, vec![player]));
        let result = use_case
            .execute(&Caller::player(player), request("Ford", Some(campaign_id)))
            .await;

        assert!(matches!(result, Err(CombatError::Forbidden(_))));
    }

    #[tokio::test]
    async fn create_for_unknown_campaign_is_not_found() {
        let mut campaigns = MockCampaignRepo::new();
        campaigns.expect_get().returning(|_| Ok(None));
        let mut sessions = MockCombatSessionRepo::new();
        sessions.expect_save().never();

        let use_case = create_use_case(sessions, campaigns);
        let result = use_case
            .execute(
                &Caller::player(UserId::new()),
                request("Ford", Some(CampaignId::new())),
            )
            .await;

        assert!(matches!(
            result,
            Err(CombatError::NotFound {
                entity_type: "Campaign",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn create_rejects_blank_name() {
        let mut sessions = MockCombatSessionRepo::new();
        sessions.expect_save().never();

        let use_case = create_use_case(sessions, MockCampaignRepo::new());
        let result = use_case
            .execute(&Caller::player(UserId::new()), request("   ", None))
            .await;

        assert!(matches!(result, Err(CombatError::Validation(_))));
    }

    #[tokio::test]
    async fn get_session_joins_linked_characters() {
        let owner = UserId::new();
        let player = UserId::new();
        let snapshot = character(CharacterId::new(), player);
        let (session, _) = active_session_with_character(owner, &snapshot);

        let use_case = GetSession::new(
            Arc::new(repo_holding(&session)),
            access(MockCampaignRepo::new(), characters_holding(snapshot.clone())),
        );
        let details = use_case.execute(&Caller::player(owner), session.id()).await.unwrap();

        assert_eq!(details.session.participants.len(), 4);
        assert_eq!(details.characters.get(&snapshot.id), Some(&snapshot));
    }

    #[tokio::test]
    async fn get_session_allows_campaign_players() {
        let owner = UserId::new();
        let player = UserId::new();
        let campaign_id = CampaignId::new();
        let mut session = CombatSession::new(owner, Some(campaign_id), "Ford", t0()).unwrap();
        session = session.with_notes("hidden cache behind the mill");

        let use_case = GetSession::new(
            Arc::new(repo_holding(&session)),
            access(campaigns_with(campaign_id, owner, vec![player]), MockCharacterRepo::new()),
        );

        assert!(use_case.execute(&Caller::player(player), session.id()).await.is_ok());
        let outsider = use_case
            .execute(&Caller::player(UserId::new()), session.id())
            .await;
        assert!(matches!(outsider, Err(CombatError::Forbidden(_))));
    }

    #[tokio::test]
    async fn get_session_forbids_strangers_without_campaign() {
        let session = active_session(UserId::new());
        let use_case = GetSession::new(
            Arc::new(repo_holding(&session)),
            access(MockCampaignRepo::new(), MockCharacterRepo::new()),
        );

        let result = use_case
            .execute(&Caller::player(UserId::new()), session.id())
            .await;
        assert!(matches!(result, Err(CombatError::Forbidden(_))));
    }

    #[tokio::test]
    async fn get_unknown_session_is_not_found() {
        let mut sessions = MockCombatSessionRepo::new();
        sessions.expect_get().returning(|_| Ok(None));

        let use_case = GetSession::new(
            Arc::new(sessions),
            access(MockCampaignRepo::new(), MockCharacterRepo::new()),
        );
        let result = use_case
            .execute(&Caller::player(UserId::new()), CombatSessionId::new())
            .await;

        assert!(matches!(
            result,
            Err(CombatError::NotFound {
                entity_type: "CombatSession",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn repo_errors_propagate() {
        let mut sessions = MockCombatSessionRepo::new();
        sessions
            .expect_get()
            .returning(|_| Err(RepoError::database("get", "connection reset")));

        let use_case = GetSession::new(
            Arc::new(sessions),
            access(MockCampaignRepo::new(), MockCharacterRepo::new()),
        );
        let result = use_case
            .execute(&Caller::player(UserId::new()), CombatSessionId::new())
            .await;

        assert!(matches!(result, Err(CombatError::Repo(_))));
    }

    #[tokio::test]
    async fn list_without_campaign_returns_own_sessions() {
        let owner = UserId::new();
        let session = active_session(owner);
        let listed = session.clone();
        let mut sessions = MockCombatSessionRepo::new();
        sessions
            .expect_list_by_owner()
            .withf(move |id| *id == owner)
            .returning(move |_| Ok(vec![listed.clone()]));

        let use_case = ListSessions::new(
            Arc::new(sessions),
            access(MockCampaignRepo::new(), MockCharacterRepo::new()),
        );
        let result = use_case.execute(&Caller::player(owner), None).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id(), session.id());
    }

    #[tokio::test]
    async fn list_by_campaign_checks_membership() {
        let campaign_id = CampaignId::new();
        let dm = UserId::new();
        let mut sessions = MockCombatSessionRepo::new();
        sessions.expect_list_by_campaign().never();

        let use_case = ListSessions::new(
            Arc::new(sessions),
            access(campaigns_with(campaign_id, dm, vec![]), MockCharacterRepo::new()),
        );
        let result = use_case
            .execute(&Caller::player(UserId::new()), Some(campaign_id))
            .await;
        assert!(matches!(result, Err(CombatError::Forbidden(_))));
    }

    #[tokio::test]
    async fn turn_order_lists_active_participants_by_order() {
        let owner = UserId::new();
        let session = active_session(owner);

        let use_case = GetTurnOrder::new(
            Arc::new(repo_holding(&session)),
            access(MockCampaignRepo::new(), MockCharacterRepo::new()),
        );
        let order = use_case.execute(&Caller::player(owner), session.id()).await.unwrap();

        let names: Vec<&str> = order.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Goblin", "Wolf", "Bugbear"]);
    }
}
