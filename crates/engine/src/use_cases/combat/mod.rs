//! Combat session use cases.
//!
//! Every mutation runs the same sequence: take the session's lock, load the
//! aggregate, check authority, mutate, save, announce the change and only then
//! release the lock, so subscribers see events in commit order. A failure at
//! any step before the save leaves storage untouched because the aggregate is
//! a detached copy.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::OwnedMutexGuard;

use skirmish_domain::{
    CharacterId, CombatAction, CombatSession, CombatSessionId, CombatSnapshot, DomainEvent,
    Participant,
};

use crate::infrastructure::ports::{
    CharacterRepo, CharacterSnapshot, ClockPort, CombatSessionRepo, EventPublisher,
};
use crate::stores::SessionLocks;

use super::access::CampaignAccess;

mod access;
mod actions;
mod error;
mod roster;
mod session;
mod turns;

#[cfg(test)]
pub(crate) mod test_support;

pub use access::CombatAccess;
pub use actions::{ListActions, RecordAction};
pub use error::CombatError;
pub use roster::{AddParticipant, UpdateParticipant};
pub use session::{CreateSession, GetSession, GetTurnOrder, ListSessions};
pub use turns::{AdvanceTurn, ConcludeCombat, StartCombat, ToggleStatus};

// =============================================================================
// Results
// =============================================================================

/// A session with the catalog characters its participants link to.
#[derive(Debug, Clone)]
pub struct SessionDetails {
    pub session: CombatSnapshot,
    pub characters: HashMap<CharacterId, CharacterSnapshot>,
}

#[derive(Debug, Clone)]
pub struct ParticipantDetails {
    pub participant: Participant,
    pub character: Option<CharacterSnapshot>,
}

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub session: CombatSnapshot,
    pub new_round: bool,
}

#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub action: CombatAction,
    /// The target after damage, when damage was applied
    pub target: Option<Participant>,
}

// =============================================================================
// Container
// =============================================================================

/// Container for combat use cases.
pub struct CombatUseCases {
    pub create_session: Arc<CreateSession>,
    pub get_session: Arc<GetSession>,
    pub list_sessions: Arc<ListSessions>,
    pub turn_order: Arc<GetTurnOrder>,
    pub add_participant: Arc<AddParticipant>,
    pub update_participant: Arc<UpdateParticipant>,
    pub start_combat: Arc<StartCombat>,
    pub advance_turn: Arc<AdvanceTurn>,
    pub toggle_status: Arc<ToggleStatus>,
    pub conclude_combat: Arc<ConcludeCombat>,
    pub record_action: Arc<RecordAction>,
    pub list_actions: Arc<ListActions>,
}

impl CombatUseCases {
    pub fn new(
        sessions: Arc<dyn CombatSessionRepo>,
        characters: Arc<dyn CharacterRepo>,
        campaigns: Arc<CampaignAccess>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let access = Arc::new(CombatAccess::new(campaigns.clone(), characters));
        let writer = Arc::new(SessionWriter::new(
            sessions.clone(),
            Arc::new(SessionLocks::new()),
            publisher,
            clock.clone(),
        ));

        Self {
            create_session: Arc::new(CreateSession::new(sessions.clone(), campaigns, clock)),
            get_session: Arc::new(GetSession::new(sessions.clone(), access.clone())),
            list_sessions: Arc::new(ListSessions::new(sessions.clone(), access.clone())),
            turn_order: Arc::new(GetTurnOrder::new(sessions.clone(), access.clone())),
            add_participant: Arc::new(AddParticipant::new(writer.clone(), access.clone())),
            update_participant: Arc::new(UpdateParticipant::new(writer.clone(), access.clone())),
            start_combat: Arc::new(StartCombat::new(writer.clone())),
            advance_turn: Arc::new(AdvanceTurn::new(writer.clone())),
            toggle_status: Arc::new(ToggleStatus::new(writer.clone())),
            conclude_combat: Arc::new(ConcludeCombat::new(writer.clone())),
            record_action: Arc::new(RecordAction::new(writer, access.clone())),
            list_actions: Arc::new(ListActions::new(sessions, access)),
        }
    }
}

// =============================================================================
// Shared plumbing
// =============================================================================

pub(crate) async fn load_session(
    sessions: &dyn CombatSessionRepo,
    id: CombatSessionId,
) -> Result<CombatSession, CombatError> {
    sessions
        .get(id)
        .await?
        .ok_or_else(|| CombatError::not_found("CombatSession", id))
}

/// Lock, load and commit steps shared by the mutating use cases.
pub struct SessionWriter {
    sessions: Arc<dyn CombatSessionRepo>,
    locks: Arc<SessionLocks>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn ClockPort>,
}

impl SessionWriter {
    pub fn new(
        sessions: Arc<dyn CombatSessionRepo>,
        locks: Arc<SessionLocks>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            sessions,
            locks,
            publisher,
            clock,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub async fn lock(&self, id: CombatSessionId) -> OwnedMutexGuard<()> {
        self.locks.acquire(id).await
    }

    pub async fn load(&self, id: CombatSessionId) -> Result<CombatSession, CombatError> {
        load_session(self.sessions.as_ref(), id).await
    }

    /// Save and announce while still holding the lock.
    ///
    /// The event is published only once the save has succeeded. Publishing
    /// before the guard drops keeps events in the order the commits happened.
    pub async fn commit(
        &self,
        guard: OwnedMutexGuard<()>,
        session: &CombatSession,
        event: DomainEvent,
    ) -> Result<(), CombatError> {
        self.sessions.save(session).await?;
        self.publisher.publish(event);
        drop(guard);
        Ok(())
    }
}
