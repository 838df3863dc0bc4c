//! Fixtures shared by the combat use case tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use skirmish_domain::{
    CharacterId, CombatSession, ParticipantDraft, ParticipantId, UserId,
};

use crate::infrastructure::clock::FixedClock;
use crate::infrastructure::ports::{
    CharacterSnapshot, MockCampaignRepo, MockCharacterRepo, MockCombatSessionRepo,
    MockEventPublisher,
};
use crate::stores::SessionLocks;
use crate::use_cases::access::CampaignAccess;

use super::{CombatAccess, SessionWriter};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 19, 0, 0).unwrap()
}

pub fn monster(name: &str, initiative: i32) -> ParticipantDraft {
    ParticipantDraft {
        name: Some(name.to_string()),
        initiative: Some(initiative),
        ..ParticipantDraft::default()
    }
}

pub fn character(id: CharacterId, user_id: UserId) -> CharacterSnapshot {
    CharacterSnapshot {
        id,
        user_id,
        name: "Ilsa".to_string(),
        class: Some("Ranger".to_string()),
        level: Some(3),
        armor_class: 15,
        max_hit_points: 24,
        current_hit_points: 20,
    }
}

/// Preparing session with the given monsters.
pub fn preparing_session(owner: UserId, drafts: Vec<ParticipantDraft>) -> CombatSession {
    let mut session = CombatSession::new(owner, None, "Goblin Ambush", t0()).unwrap();
    for draft in drafts {
        session.add_participant(draft, None, t0()).unwrap();
    }
    session
}

/// Active session, round 1, with three monsters and one participant linked
/// to `character`. Returns the linked participant's id.
pub fn active_session_with_character(
    owner: UserId,
    character: &CharacterSnapshot,
) -> (CombatSession, ParticipantId) {
    let mut session = preparing_session(
        owner,
        vec![monster("Goblin", 12), monster("Wolf", 8), monster("Bugbear", 3)],
    );
    let linked = session
        .add_participant(
            ParticipantDraft {
                initiative: Some(15),
                ..ParticipantDraft::default()
            },
            Some(character.defaults()),
            t0(),
        )
        .unwrap()
        .id;
    session.start_combat(t0()).unwrap();
    (session, linked)
}

pub fn active_session(owner: UserId) -> CombatSession {
    let mut session = preparing_session(
        owner,
        vec![monster("Goblin", 12), monster("Wolf", 8), monster("Bugbear", 3)],
    );
    session.start_combat(t0()).unwrap();
    session
}

pub fn repo_holding(session: &CombatSession) -> MockCombatSessionRepo {
    let stored = session.clone();
    let id = session.id();
    let mut repo = MockCombatSessionRepo::new();
    repo.expect_get()
        .withf(move |requested| *requested == id)
        .returning(move |_| Ok(Some(stored.clone())));
    repo
}

pub fn no_events() -> MockEventPublisher {
    let mut publisher = MockEventPublisher::new();
    publisher.expect_publish().never();
    publisher
}

pub fn writer(sessions: MockCombatSessionRepo, publisher: MockEventPublisher) -> Arc<SessionWriter> {
    Arc::new(SessionWriter::new(
        Arc::new(sessions),
        Arc::new(SessionLocks::new()),
        Arc::new(publisher),
        Arc::new(FixedClock(t0())),
    ))
}

pub fn access(campaigns: MockCampaignRepo, characters: MockCharacterRepo) -> Arc<CombatAccess> {
    Arc::new(CombatAccess::new(
        Arc::new(CampaignAccess::new(Arc::new(campaigns))),
        Arc::new(characters),
    ))
}

pub fn characters_holding(snapshot: CharacterSnapshot) -> MockCharacterRepo {
    let id = snapshot.id;
    let mut characters = MockCharacterRepo::new();
    characters
        .expect_get()
        .withf(move |requested| *requested == id)
        .returning(move |_| Ok(Some(snapshot.clone())));
    characters
}
