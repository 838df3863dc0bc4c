//! Action ledger use cases.

use std::sync::Arc;

use skirmish_domain::{
    ActionKind, CombatAction, CombatOperation, CombatSessionId, DomainEvent, NewCombatAction,
    ParticipantId,
};
use skirmish_shared::RecordActionRequest;

use crate::infrastructure::ports::{Caller, CombatSessionRepo};

use super::{load_session, ActionOutcome, CombatAccess, CombatError, SessionWriter};

/// Record an action in the current round.
///
/// When the action names a target and positive damage, the damage is applied
/// to the target in the same commit.
pub struct RecordAction {
    writer: Arc<SessionWriter>,
    access: Arc<CombatAccess>,
}

impl RecordAction {
    pub fn new(writer: Arc<SessionWriter>, access: Arc<CombatAccess>) -> Self {
        Self { writer, access }
    }

    pub async fn execute(
        &self,
        caller: &Caller,
        session_id: CombatSessionId,
        input: RecordActionRequest,
    ) -> Result<ActionOutcome, CombatError> {
        let guard = self.writer.lock(session_id).await;
        let mut session = self.writer.load(session_id).await?;
        session.status().require(CombatOperation::RecordAction)?;

        let actor_id = ParticipantId::from_uuid(input.actor_id);
        let actor = session
            .participant(actor_id)
            .ok_or_else(|| CombatError::not_found("Participant", actor_id))?;
        self.access
            .ensure_can_act_for(&session, actor, caller)
            .await?;

        let kind: ActionKind = input.action_type.parse()?;
        let new = NewCombatAction {
            actor_id,
            target_id: input.target_id.map(ParticipantId::from_uuid),
            kind,
            name: input.action_name,
            description: input.description,
            roll_data: input.roll_data,
            damage: input.damage,
            damage_type: input.damage_type,
            success: input.success,
            save_type: input.save_type,
            save_dc: input.save_dc,
        };
        let recorded = session.record_action(new, self.writer.now())?;

        self.writer
            .commit(
                guard,
                &session,
                DomainEvent::ActionRecorded {
                    session_id,
                    action: recorded.action.clone(),
                    target: recorded.damaged_target.clone(),
                },
            )
            .await?;

        tracing::info!(
            session_id = %session_id,
            action_id = %recorded.action.id,
            kind = %recorded.action.kind,
            round = recorded.action.round,
            damage = recorded.action.damage.unwrap_or(0),
            "Combat action recorded"
        );
        Ok(ActionOutcome {
            action: recorded.action,
            target: recorded.damaged_target,
        })
    }
}

/// Ledger entries in recording order, optionally for one round.
pub struct ListActions {
    sessions: Arc<dyn CombatSessionRepo>,
    access: Arc<CombatAccess>,
}

impl ListActions {
    pub fn new(sessions: Arc<dyn CombatSessionRepo>, access: Arc<CombatAccess>) -> Self {
        Self { sessions, access }
    }

    pub async fn execute(
        &self,
        caller: &Caller,
        session_id: CombatSessionId,
        round: Option<u32>,
    ) -> Result<Vec<CombatAction>, CombatError> {
        let session = load_session(self.sessions.as_ref(), session_id).await?;
        self.access.ensure_can_read(&session, caller).await?;
        Ok(session.actions(round).into_iter().cloned().collect())
    }
}
