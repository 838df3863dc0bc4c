//! Participant registry use cases.

use std::sync::Arc;

use skirmish_domain::{
    CharacterId, CombatOperation, CombatSessionId, DomainEvent, ParticipantDraft, ParticipantId,
    ParticipantKind, ParticipantPatch, PatchScope,
};
use skirmish_shared::{AddParticipantRequest, UpdateParticipantRequest};

use crate::infrastructure::ports::{Caller, CharacterSnapshot};

use super::{CombatAccess, CombatError, ParticipantDetails, SessionWriter};

// =============================================================================
// Add
// =============================================================================

/// Append a participant, optionally created from a catalog character.
///
/// Owner only, while `Preparing` or `Paused`.
pub struct AddParticipant {
    writer: Arc<SessionWriter>,
    access: Arc<CombatAccess>,
}

impl AddParticipant {
    pub fn new(writer: Arc<SessionWriter>, access: Arc<CombatAccess>) -> Self {
        Self { writer, access }
    }

    pub async fn execute(
        &self,
        caller: &Caller,
        session_id: CombatSessionId,
        input: AddParticipantRequest,
    ) -> Result<ParticipantDetails, CombatError> {
        let guard = self.writer.lock(session_id).await;
        let mut session = self.writer.load(session_id).await?;
        CombatAccess::ensure_owner(&session, caller)?;
        session.status().require(CombatOperation::AddParticipant)?;

        let character = match input.character_id.map(CharacterId::from_uuid) {
            Some(id) => Some(
                self.access
                    .character(id)
                    .await?
                    .ok_or_else(|| CombatError::not_found("Character", id))?,
            ),
            None => None,
        };

        let draft = ParticipantDraft {
            name: input.name,
            kind: parse_kind(input.kind.as_deref())?,
            armor_class: input.armor_class,
            max_hit_points: input.max_hit_points,
            initiative: input.initiative,
            visible: input.is_visible,
            stats: input.stats,
            notes: input.notes,
        };
        let participant = session
            .add_participant(
                draft,
                character.as_ref().map(CharacterSnapshot::defaults),
                self.writer.now(),
            )?
            .clone();

        self.writer
            .commit(
                guard,
                &session,
                DomainEvent::ParticipantAdded {
                    session_id,
                    participant: participant.clone(),
                },
            )
            .await?;

        tracing::info!(
            session_id = %session_id,
            participant_id = %participant.id,
            order = participant.order,
            "Participant added"
        );
        Ok(ParticipantDetails {
            participant,
            character,
        })
    }
}

// =============================================================================
// Update
// =============================================================================

/// Patch a participant.
///
/// The owner may change any field. The player controlling the linked
/// character may change hit points and conditions; anything else in their
/// patch is dropped without error.
pub struct UpdateParticipant {
    writer: Arc<SessionWriter>,
    access: Arc<CombatAccess>,
}

impl UpdateParticipant {
    pub fn new(writer: Arc<SessionWriter>, access: Arc<CombatAccess>) -> Self {
        Self { writer, access }
    }

    pub async fn execute(
        &self,
        caller: &Caller,
        session_id: CombatSessionId,
        participant_id: ParticipantId,
        input: UpdateParticipantRequest,
    ) -> Result<ParticipantDetails, CombatError> {
        let guard = self.writer.lock(session_id).await;
        let mut session = self.writer.load(session_id).await?;
        session.status().require(CombatOperation::UpdateParticipant)?;

        let target = session
            .participant(participant_id)
            .ok_or_else(|| CombatError::not_found("Participant", participant_id))?;
        let character = self.access.linked_character(target).await?;
        let scope = CombatAccess::patch_scope(&session, character.as_ref(), caller)?;

        let patch = ParticipantPatch {
            name: input.name,
            kind: match scope {
                PatchScope::Owner => parse_kind(input.kind.as_deref())?,
                PatchScope::Controller => None,
            },
            armor_class: input.armor_class,
            max_hit_points: input.max_hit_points,
            current_hit_points: input.current_hit_points,
            temporary_hit_points: input.temporary_hit_points,
            initiative: input.initiative,
            conditions: input.conditions,
            visible: input.is_visible,
            is_active: input.is_active,
            stats: input.stats,
            notes: input.notes,
        };
        let participant = session
            .update_participant(participant_id, patch, scope, self.writer.now())?
            .clone();

        self.writer
            .commit(
                guard,
                &session,
                DomainEvent::ParticipantUpdated {
                    session_id,
                    participant: participant.clone(),
                },
            )
            .await?;

        tracing::info!(
            session_id = %session_id,
            participant_id = %participant_id,
            controller = scope == PatchScope::Controller,
            "Participant updated"
        );
        Ok(ParticipantDetails {
            participant,
            character,
        })
    }
}

fn parse_kind(raw: Option<&str>) -> Result<Option<ParticipantKind>, CombatError> {
    Ok(raw.map(str::parse::<ParticipantKind>).transpose()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockCampaignRepo, MockCharacterRepo, MockEventPublisher};
    use crate::use_cases::combat::test_support::{
        access, active_session, active_session_with_character, character, characters_holding,
        monster, no_events, preparing_session, repo_holding, writer,
    };
    use skirmish_domain::{CombatSession, CombatStatus, UserId};

    fn saving(session: &CombatSession) -> crate::infrastructure::ports::MockCombatSessionRepo {
        let mut repo = repo_holding(session);
        repo.expect_save().times(1).returning(|_| Ok(()));
        repo
    }

    fn not_saving(session: &CombatSession) -> crate::infrastructure::ports::MockCombatSessionRepo {
        let mut repo = repo_holding(session);
        repo.expect_save().never();
        repo
    }

    fn expect_event(name: &'static str) -> MockEventPublisher {
        let mut publisher = MockEventPublisher::new();
        publisher
            .expect_publish()
            .withf(move |event| event.event_type() == name)
            .times(1)
            .return_const(());
        publisher
    }

    #[tokio::test]
    async fn add_appends_with_next_order_and_announces() {
        let owner = UserId::new();
        let session = preparing_session(owner, vec![monster("Goblin", 12)]);

        let use_case = AddParticipant::new(
            writer(saving(&session), expect_event("participantAdded")),
            access(MockCampaignRepo::new(), MockCharacterRepo::new()),
        );
        let input = AddParticipantRequest {
            name: Some("Hobgoblin".to_string()),
            kind: Some("npc".to_string()),
            max_hit_points: Some(18),
            ..AddParticipantRequest::default()
        };
        let added = use_case
            .execute(&Caller::player(owner), session.id(), input)
            .await
            .unwrap();

        assert_eq!(added.participant.order, 1);
        assert_eq!(added.participant.kind, ParticipantKind::Npc);
        assert_eq!(added.participant.hit_points.current(), 18);
        assert!(added.character.is_none());
    }

    #[tokio::test]
    async fn add_from_character_takes_its_defaults() {
        let owner = UserId::new();
        let player = UserId::new();
        let snapshot = character(CharacterId::new(), player);
        let session = preparing_session(owner, vec![]);

        let use_case = AddParticipant::new(
            writer(saving(&session), expect_event("participantAdded")),
            access(MockCampaignRepo::new(), characters_holding(snapshot.clone())),
        );
        let input = AddParticipantRequest {
            character_id: Some(snapshot.id.to_uuid()),
            initiative: Some(17),
            ..AddParticipantRequest::default()
        };
        let added = use_case
            .execute(&Caller::player(owner), session.id(), input)
            .await
            .unwrap();

        let p = &added.participant;
        assert_eq!(p.name, "Ilsa");
        assert_eq!(p.kind, ParticipantKind::Player);
        assert_eq!(p.armor_class, 15);
        assert_eq!(p.hit_points.max(), 24);
        assert_eq!(p.hit_points.current(), 20);
        assert_eq!(p.character_id, Some(snapshot.id));
        assert_eq!(added.character, Some(snapshot));
    }

    #[tokio::test]
    async fn add_with_unknown_character_is_not_found() {
        let owner = UserId::new();
        let session = preparing_session(owner, vec![]);
        let mut characters = MockCharacterRepo::new();
        characters.expect_get().returning(|_| Ok(None));

        let use_case = AddParticipant::new(
            writer(not_saving(&session), no_events()),
            access(MockCampaignRepo::new(), characters),
        );
        let input = AddParticipantRequest {
            character_id: Some(uuid::Uuid::new_v4()),
            ..AddParticipantRequest::default()
        };
        let result = use_case
            .execute(&Caller::player(owner), session.id(), input)
            .await;

        assert!(matches!(
            result,
            Err(CombatError::NotFound {
                entity_type: "Character",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn add_while_active_is_invalid_state() {
        let owner = UserId::new();
        let session = active_session(owner);

        let use_case = AddParticipant::new(
            writer(not_saving(&session), no_events()),
            access(MockCampaignRepo::new(), MockCharacterRepo::new()),
        );
        let result = use_case
            .execute(
                &Caller::player(owner),
                session.id(),
                AddParticipantRequest::default(),
            )
            .await;

        assert!(matches!(result, Err(CombatError::InvalidState(_))));
    }

    #[tokio::test]
    async fn add_by_non_owner_is_forbidden() {
        let session = preparing_session(UserId::new(), vec![]);

        let use_case = AddParticipant::new(
            writer(not_saving(&session), no_events()),
            access(MockCampaignRepo::new(), MockCharacterRepo::new()),
        );
        let result = use_case
            .execute(
                &Caller::player(UserId::new()),
                session.id(),
                AddParticipantRequest::default(),
            )
            .await;

        assert!(matches!(result, Err(CombatError::Forbidden(_))));
    }

    #[tokio::test]
    async fn add_with_unknown_kind_is_validation_error() {
        let owner = UserId::new();
        let session = preparing_session(owner, vec![]);

        let use_case = AddParticipant::new(
            writer(not_saving(&session), no_events()),
            access(MockCampaignRepo::new(), MockCharacterRepo::new()),
        );
        let input = AddParticipantRequest {
            kind: Some("dragon-god".to_string()),
            ..AddParticipantRequest::default()
        };
        let result = use_case
            .execute(&Caller::player(owner), session.id(), input)
            .await;

        assert!(matches!(result, Err(CombatError::Validation(_))));
    }

    #[tokio::test]
    async fn controller_patch_keeps_only_whitelisted_fields() {
        let owner = UserId::new();
        let player = UserId::new();
        let snapshot = character(CharacterId::new(), player);
        let (session, linked) = active_session_with_character(owner, &snapshot);

        let use_case = UpdateParticipant::new(
            writer(saving(&session), expect_event("participantUpdated")),
            access(MockCampaignRepo::new(), characters_holding(snapshot)),
        );
        let input = UpdateParticipantRequest {
            current_hit_points: Some(5),
            armor_class: Some(99),
            kind: Some("not-a-kind".to_string()),
            conditions: Some(vec!["prone".to_string()]),
            ..UpdateParticipantRequest::default()
        };
        let updated = use_case
            .execute(&Caller::player(player), session.id(), linked, input)
            .await
            .unwrap();

        let p = &updated.participant;
        assert_eq!(p.hit_points.current(), 5);
        assert_eq!(p.armor_class, 15);
        assert_eq!(p.kind, ParticipantKind::Player);
        assert!(p.conditions.contains("prone"));
    }

    #[tokio::test]
    async fn owner_patch_changes_any_field() {
        let owner = UserId::new();
        let session = active_session(owner);
        let wolf = session
            .participants()
            .find(|p| p.name == "Wolf")
            .map(|p| p.id)
            .unwrap();

        let use_case = UpdateParticipant::new(
            writer(saving(&session), expect_event("participantUpdated")),
            access(MockCampaignRepo::new(), MockCharacterRepo::new()),
        );
        let input = UpdateParticipantRequest {
            armor_class: Some(13),
            is_active: Some(false),
            is_visible: Some(false),
            ..UpdateParticipantRequest::default()
        };
        let updated = use_case
            .execute(&Caller::player(owner), session.id(), wolf, input)
            .await
            .unwrap();

        assert_eq!(updated.participant.armor_class, 13);
        assert!(!updated.participant.is_active);
        assert!(!updated.participant.visible);
    }

    #[tokio::test]
    async fn stranger_patch_is_forbidden() {
        let owner = UserId::new();
        let snapshot = character(CharacterId::new(), UserId::new());
        let (session, linked) = active_session_with_character(owner, &snapshot);

        let use_case = UpdateParticipant::new(
            writer(not_saving(&session), no_events()),
            access(MockCampaignRepo::new(), characters_holding(snapshot)),
        );
        let result = use_case
            .execute(
                &Caller::player(UserId::new()),
                session.id(),
                linked,
                UpdateParticipantRequest::default(),
            )
            .await;

        assert!(matches!(result, Err(CombatError::Forbidden(_))));
    }

    #[tokio::test]
    async fn patch_of_unknown_participant_is_not_found() {
        let owner = UserId::new();
        let session = active_session(owner);

        let use_case = UpdateParticipant::new(
            writer(not_saving(&session), no_events()),
            access(MockCampaignRepo::new(), MockCharacterRepo::new()),
        );
        let result = use_case
            .execute(
                &Caller::player(owner),
                session.id(),
                ParticipantId::new(),
                UpdateParticipantRequest::default(),
            )
            .await;

        assert!(matches!(
            result,
            Err(CombatError::NotFound {
                entity_type: "Participant",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn patch_after_conclusion_is_invalid_state() {
        let owner = UserId::new();
        let mut session = active_session(owner);
        session.conclude(session.updated_at()).unwrap();
        assert_eq!(session.status(), CombatStatus::Concluded);
        let goblin = session.participants().next().map(|p| p.id).unwrap();

        let use_case = UpdateParticipant::new(
            writer(not_saving(&session), no_events()),
            access(MockCampaignRepo::new(), MockCharacterRepo::new()),
        );
        let input = UpdateParticipantRequest {
            current_hit_points: Some(1),
            ..UpdateParticipantRequest::default()
        };
        let result = use_case
            .execute(&Caller::player(owner), session.id(), goblin, input)
            .await;

        assert!(matches!(result, Err(CombatError::InvalidState(_))));
    }

    #[tokio::test]
    async fn patch_over_max_is_rejected_without_saving() {
        let owner = UserId::new();
        let session = active_session(owner);
        let goblin = session.participants().next().map(|p| p.id).unwrap();

        let use_case = UpdateParticipant::new(
            writer(not_saving(&session), no_events()),
            access(MockCampaignRepo::new(), MockCharacterRepo::new()),
        );
        let input = UpdateParticipantRequest {
            current_hit_points: Some(500),
            ..UpdateParticipantRequest::default()
        };
        let result = use_case
            .execute(&Caller::player(owner), session.id(), goblin, input)
            .await;

        assert!(matches!(result, Err(CombatError::Validation(_))));
    }
}
