//! Turn-order and lifecycle use cases. Owner only.

use std::sync::Arc;

use skirmish_domain::{CombatSessionId, CombatSnapshot, DomainEvent, StatusToggle};
use skirmish_shared::ToggleStatusRequest;

use crate::infrastructure::ports::Caller;

use super::{CombatAccess, CombatError, SessionWriter, TurnOutcome};

/// Fix turn order by initiative and begin round 1.
pub struct StartCombat {
    writer: Arc<SessionWriter>,
}

impl StartCombat {
    pub fn new(writer: Arc<SessionWriter>) -> Self {
        Self { writer }
    }

    pub async fn execute(
        &self,
        caller: &Caller,
        session_id: CombatSessionId,
    ) -> Result<CombatSnapshot, CombatError> {
        let guard = self.writer.lock(session_id).await;
        let mut session = self.writer.load(session_id).await?;
        CombatAccess::ensure_owner(&session, caller)?;

        let started = session.start_combat(self.writer.now())?;
        let snapshot = session.snapshot();
        self.writer
            .commit(
                guard,
                &session,
                DomainEvent::CombatStarted {
                    session: snapshot.clone(),
                },
            )
            .await?;

        tracing::info!(
            session_id = %session_id,
            participants = started.turn_order.len(),
            restarted = started.restarted,
            "Combat started"
        );
        Ok(snapshot)
    }
}

/// Hand the turn to the next active participant.
pub struct AdvanceTurn {
    writer: Arc<SessionWriter>,
}

impl AdvanceTurn {
    pub fn new(writer: Arc<SessionWriter>) -> Self {
        Self { writer }
    }

    pub async fn execute(
        &self,
        caller: &Caller,
        session_id: CombatSessionId,
    ) -> Result<TurnOutcome, CombatError> {
        let guard = self.writer.lock(session_id).await;
        let mut session = self.writer.load(session_id).await?;
        CombatAccess::ensure_owner(&session, caller)?;

        let advanced = session.advance_turn(self.writer.now())?;
        let snapshot = session.snapshot();
        self.writer
            .commit(
                guard,
                &session,
                DomainEvent::TurnAdvanced {
                    session: snapshot.clone(),
                    new_round: advanced.new_round,
                },
            )
            .await?;

        tracing::debug!(
            session_id = %session_id,
            round = advanced.round,
            turn = advanced.current_turn_index,
            new_round = advanced.new_round,
            "Turn advanced"
        );
        Ok(TurnOutcome {
            session: snapshot,
            new_round: advanced.new_round,
        })
    }
}

/// Pause an active fight or resume a paused one.
pub struct ToggleStatus {
    writer: Arc<SessionWriter>,
}

impl ToggleStatus {
    pub fn new(writer: Arc<SessionWriter>) -> Self {
        Self { writer }
    }

    pub async fn execute(
        &self,
        caller: &Caller,
        session_id: CombatSessionId,
        input: ToggleStatusRequest,
    ) -> Result<CombatSnapshot, CombatError> {
        let guard = self.writer.lock(session_id).await;
        let mut session = self.writer.load(session_id).await?;
        CombatAccess::ensure_owner(&session, caller)?;

        let toggle: StatusToggle = input.action.parse()?;
        let changed = session.toggle_status(toggle, self.writer.now())?;
        self.writer
            .commit(
                guard,
                &session,
                DomainEvent::CombatStatusChanged {
                    session_id,
                    status: changed.to,
                },
            )
            .await?;

        tracing::info!(
            session_id = %session_id,
            from = %changed.from,
            to = %changed.to,
            "Combat status changed"
        );
        Ok(session.snapshot())
    }
}

/// End the session for good.
pub struct ConcludeCombat {
    writer: Arc<SessionWriter>,
}

impl ConcludeCombat {
    pub fn new(writer: Arc<SessionWriter>) -> Self {
        Self { writer }
    }

    pub async fn execute(
        &self,
        caller: &Caller,
        session_id: CombatSessionId,
    ) -> Result<CombatSnapshot, CombatError> {
        let guard = self.writer.lock(session_id).await;
        let mut session = self.writer.load(session_id).await?;
        CombatAccess::ensure_owner(&session, caller)?;

        let changed = session.conclude(self.writer.now())?;
        self.writer
            .commit(guard, &session, DomainEvent::CombatEnded { session_id })
            .await?;

        tracing::info!(
            session_id = %session_id,
            from = %changed.from,
            round = session.round(),
            "Combat concluded"
        );
        Ok(session.snapshot())
    }
}
