//! Combat session aggregate
//!
//! One session owns its participant roster, its turn cursor and its action
//! ledger, and its lifecycle status gates every mutation.
//!
//! # Rustic DDD Design
//!
//! - **Private fields**: roster, ledger and cursor are reachable only through methods
//! - **Check-then-act**: every mutation validates fully before writing, so a
//!   failed call leaves the session exactly as it was
//! - **Domain events**: mutations return outcome structs (`TurnAdvanced`, etc.)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{
    ActionLedger, CharacterDefaults, CombatAction, NewCombatAction, Participant,
    ParticipantDraft, ParticipantPatch, ParticipantRoster, PatchScope,
};
use crate::error::DomainError;
use crate::events::{ActionRecorded, CombatStarted, StatusChanged, TurnAdvanced};
use crate::value_objects::{CombatOperation, CombatStatus, StatusToggle, TurnCursor};
use crate::{ActionId, CampaignId, CombatSessionId, ParticipantId, UserId};

/// A combat encounter run by its owner.
///
/// # Invariants
///
/// - `round == 0` exactly while `Preparing`; `round >= 1` while `Active` or `Paused`
/// - `Concluded` is terminal
/// - participants are never removed, only deactivated
#[derive(Debug, Clone, PartialEq)]
pub struct CombatSession {
    // Identity
    id: CombatSessionId,
    campaign_id: Option<CampaignId>,
    owner_id: UserId,

    // Descriptive
    name: String,
    description: Option<String>,
    notes: Option<String>,

    // Lifecycle
    status: CombatStatus,
    cursor: TurnCursor,

    // Owned parts
    roster: ParticipantRoster,
    ledger: ActionLedger,

    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Serializable session header plus roster, used in responses and events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatSnapshot {
    pub id: CombatSessionId,
    pub campaign_id: Option<CampaignId>,
    pub owner_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub status: CombatStatus,
    pub round: u32,
    pub current_turn_index: usize,
    pub current_participant_id: Option<ParticipantId>,
    /// Roster sorted by `order`
    pub participants: Vec<Participant>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CombatSession {
    // =========================================================================
    // Constructor
    // =========================================================================

    /// Create a session in `Preparing`, round 0.
    pub fn new(
        owner_id: UserId,
        campaign_id: Option<CampaignId>,
        name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("session name cannot be empty"));
        }

        Ok(Self {
            id: CombatSessionId::new(),
            campaign_id,
            owner_id,
            name: name.to_string(),
            description: None,
            notes: None,
            status: CombatStatus::Preparing,
            cursor: TurnCursor::not_started(),
            roster: ParticipantRoster::new(),
            ledger: ActionLedger::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> CombatSessionId {
        self.id
    }

    #[inline]
    pub fn campaign_id(&self) -> Option<CampaignId> {
        self.campaign_id
    }

    #[inline]
    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[inline]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    #[inline]
    pub fn status(&self) -> CombatStatus {
        self.status
    }

    #[inline]
    pub fn round(&self) -> u32 {
        self.cursor.round
    }

    #[inline]
    pub fn current_turn_index(&self) -> usize {
        self.cursor.current_turn_index
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.roster.get(id)
    }

    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.roster.iter()
    }

    /// Active participants in turn order.
    pub fn list_active(&self) -> Vec<&Participant> {
        self.roster.active_in_turn_order()
    }

    /// Whose turn it is, if combat is running and the index is still in range.
    pub fn current_participant(&self) -> Option<&Participant> {
        if !matches!(self.status, CombatStatus::Active | CombatStatus::Paused) {
            return None;
        }
        self.list_active()
            .get(self.cursor.current_turn_index)
            .copied()
    }

    /// Ledger entries in recording order, optionally for one round.
    pub fn actions(&self, round: Option<u32>) -> Vec<&CombatAction> {
        self.ledger.list(round)
    }

    pub fn snapshot(&self) -> CombatSnapshot {
        let mut participants: Vec<Participant> = self.roster.iter().cloned().collect();
        participants.sort_by_key(|p| p.order);

        CombatSnapshot {
            id: self.id,
            campaign_id: self.campaign_id,
            owner_id: self.owner_id,
            name: self.name.clone(),
            description: self.description.clone(),
            notes: self.notes.clone(),
            status: self.status,
            round: self.cursor.round,
            current_turn_index: self.cursor.current_turn_index,
            current_participant_id: self.current_participant().map(|p| p.id),
            participants,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    // =========================================================================
    // Participant Registry
    // =========================================================================

    /// Append a participant at the end of the roster.
    ///
    /// Legal while `Preparing` or `Paused`.
    pub fn add_participant(
        &mut self,
        draft: ParticipantDraft,
        character: Option<CharacterDefaults>,
        now: DateTime<Utc>,
    ) -> Result<&Participant, DomainError> {
        self.status.require(CombatOperation::AddParticipant)?;

        let participant =
            draft.into_participant(self.id, character, self.roster.next_order(), now)?;
        self.updated_at = now;
        Ok(self.roster.push(participant))
    }

    /// Patch a participant. `scope` decides which fields survive.
    pub fn update_participant(
        &mut self,
        id: ParticipantId,
        patch: ParticipantPatch,
        scope: PatchScope,
        now: DateTime<Utc>,
    ) -> Result<&Participant, DomainError> {
        self.status.require(CombatOperation::UpdateParticipant)?;

        self.roster
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("Participant", id))?
            .apply_patch(patch, scope, now)?;
        self.updated_at = now;
        self.roster
            .get(id)
            .ok_or_else(|| DomainError::not_found("Participant", id))
    }

    // =========================================================================
    // Turn-Order Scheduler
    // =========================================================================

    /// Fix turn order by initiative and begin round 1.
    ///
    /// Legal from `Preparing` or `Paused` with at least one active participant.
    pub fn start_combat(&mut self, now: DateTime<Utc>) -> Result<CombatStarted, DomainError> {
        self.status.require(CombatOperation::StartCombat)?;
        if self.roster.active_count() == 0 {
            return Err(DomainError::invalid_state_transition(
                "cannot start combat without active participants",
            ));
        }

        let restarted = self.status == CombatStatus::Paused;
        let turn_order = self.roster.assign_initiative_order();
        self.status = CombatStatus::Active;
        self.cursor = TurnCursor::first_turn();
        self.updated_at = now;

        Ok(CombatStarted {
            turn_order,
            restarted,
        })
    }

    /// Move to the next active participant, wrapping into a new round.
    pub fn advance_turn(&mut self, now: DateTime<Utc>) -> Result<TurnAdvanced, DomainError> {
        self.status.require(CombatOperation::AdvanceTurn)?;

        let advance = self.cursor.advance(self.roster.active_count())?;
        self.updated_at = now;

        Ok(TurnAdvanced {
            round: advance.round,
            current_turn_index: advance.current_turn_index,
            new_round: advance.new_round,
            current_participant_id: self.current_participant().map(|p| p.id),
        })
    }

    // =========================================================================
    // Session State Machine
    // =========================================================================

    pub fn toggle_status(
        &mut self,
        toggle: StatusToggle,
        now: DateTime<Utc>,
    ) -> Result<StatusChanged, DomainError> {
        self.status.require(toggle.operation())?;
        Ok(self.transition(toggle.target_status(), now))
    }

    /// End the session. Legal from every non-terminal status.
    pub fn conclude(&mut self, now: DateTime<Utc>) -> Result<StatusChanged, DomainError> {
        self.status.require(CombatOperation::Conclude)?;
        Ok(self.transition(CombatStatus::Concluded, now))
    }

    fn transition(&mut self, to: CombatStatus, now: DateTime<Utc>) -> StatusChanged {
        let from = self.status;
        self.status = to;
        self.updated_at = now;
        StatusChanged { from, to }
    }

    // =========================================================================
    // Action Ledger
    // =========================================================================

    /// Record an action in the current round, applying damage to the target
    /// when both are present.
    pub fn record_action(
        &mut self,
        new: NewCombatAction,
        now: DateTime<Utc>,
    ) -> Result<ActionRecorded, DomainError> {
        self.status.require(CombatOperation::RecordAction)?;

        let actor = self
            .roster
            .get(new.actor_id)
            .ok_or_else(|| DomainError::not_found("Participant", new.actor_id))?;
        if !actor.is_active {
            return Err(DomainError::invalid_state_transition(format!(
                "participant {} is not active",
                actor.name
            )));
        }
        if let Some(target_id) = new.target_id {
            if self.roster.get(target_id).is_none() {
                return Err(DomainError::not_found("Participant", target_id));
            }
        }
        new.validate()?;

        // validate() rejected negatives
        let damage = new.damage.map(|d| d.unsigned_abs());
        let save_dc = new.save_dc.map(|dc| dc.unsigned_abs());

        let mut damaged_target = None;
        let mut resolution = None;
        if let (Some(target_id), Some(amount)) = (new.target_id, damage) {
            if amount > 0 {
                if let Some(target) = self.roster.get_mut(target_id) {
                    resolution = Some(target.apply_damage(amount, now));
                    damaged_target = Some(target.clone());
                }
            }
        }

        let action = CombatAction {
            id: ActionId::new(),
            session_id: self.id,
            round: self.cursor.round,
            actor_id: new.actor_id,
            target_id: new.target_id,
            kind: new.kind,
            name: new.name.trim().to_string(),
            description: new.description,
            roll_data: new.roll_data,
            damage,
            damage_type: new.damage_type,
            success: new.success,
            save_type: new.save_type,
            save_dc,
            resolution,
            created_at: now,
        };
        let action = self.ledger.append(action).clone();
        self.updated_at = now;

        Ok(ActionRecorded {
            action,
            damaged_target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ActionKind;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn session() -> CombatSession {
        CombatSession::new(UserId::new(), None, "Goblin ambush", now()).unwrap()
    }

    fn add(session: &mut CombatSession, name: &str, initiative: i32) -> ParticipantId {
        let draft = ParticipantDraft {
            name: Some(name.to_string()),
            initiative: Some(initiative),
            ..Default::default()
        };
        session.add_participant(draft, None, now()).unwrap().id
    }

    fn started(initiatives: &[i32]) -> (CombatSession, Vec<ParticipantId>) {
        let mut s = session();
        let ids = initiatives
            .iter()
            .enumerate()
            .map(|(i, init)| add(&mut s, &format!("P{}", i + 1), *init))
            .collect();
        s.start_combat(now()).unwrap();
        (s, ids)
    }

    #[test]
    fn new_session_is_preparing_at_round_zero() {
        let s = session();
        assert_eq!(s.status(), CombatStatus::Preparing);
        assert_eq!((s.round(), s.current_turn_index()), (0, 0));
        assert!(s.current_participant().is_none());
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(matches!(
            CombatSession::new(UserId::new(), None, "   ", now()),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn start_sorts_by_initiative_with_stable_ties() {
        let (s, ids) = started(&[10, 15, 15, 3]);
        let order: Vec<ParticipantId> = s.list_active().iter().map(|p| p.id).collect();
        assert_eq!(order, vec![ids[1], ids[2], ids[0], ids[3]]);
        assert_eq!(s.status(), CombatStatus::Active);
        assert_eq!((s.round(), s.current_turn_index()), (1, 0));
        assert_eq!(s.current_participant().map(|p| p.id), Some(ids[1]));
    }

    #[test]
    fn start_requires_an_active_participant() {
        let mut s = session();
        let id = add(&mut s, "Lonely", 1);
        let patch = ParticipantPatch {
            is_active: Some(false),
            ..Default::default()
        };
        s.update_participant(id, patch, PatchScope::Owner, now()).unwrap();

        assert!(matches!(
            s.start_combat(now()),
            Err(DomainError::InvalidStateTransition(_))
        ));
        assert_eq!(s.status(), CombatStatus::Preparing);
    }

    #[test]
    fn a_full_cycle_starts_exactly_one_new_round() {
        let (mut s, _) = started(&[1, 2, 3]);
        let flags: Vec<bool> = (0..3).map(|_| s.advance_turn(now()).unwrap().new_round).collect();
        assert_eq!(flags, vec![false, false, true]);
        assert_eq!((s.round(), s.current_turn_index()), (2, 0));
    }

    #[test]
    fn deactivation_shortens_the_cycle() {
        let (mut s, ids) = started(&[30, 20, 10]);
        s.advance_turn(now()).unwrap();
        let patch = ParticipantPatch {
            is_active: Some(false),
            ..Default::default()
        };
        s.update_participant(ids[2], patch, PatchScope::Owner, now())
            .unwrap();

        let advance = s.advance_turn(now()).unwrap();
        assert!(advance.new_round);
        assert_eq!(advance.current_participant_id, Some(ids[0]));
    }

    #[test]
    fn adding_is_blocked_while_active_but_allowed_while_paused() {
        let (mut s, _) = started(&[5]);
        assert!(matches!(
            s.add_participant(ParticipantDraft::default(), None, now()),
            Err(DomainError::InvalidStateTransition(_))
        ));

        s.toggle_status(StatusToggle::Pause, now()).unwrap();
        let late = s
            .add_participant(ParticipantDraft::default(), None, now())
            .unwrap();
        assert_eq!(late.order, 1);
    }

    #[test]
    fn pause_blocks_advancing_and_resume_restores_it() {
        let (mut s, _) = started(&[5, 4]);
        let change = s.toggle_status(StatusToggle::Pause, now()).unwrap();
        assert_eq!((change.from, change.to), (CombatStatus::Active, CombatStatus::Paused));
        assert!(s.advance_turn(now()).is_err());
        assert!(s.toggle_status(StatusToggle::Pause, now()).is_err());

        s.toggle_status(StatusToggle::Resume, now()).unwrap();
        assert!(s.advance_turn(now()).is_ok());
    }

    #[test]
    fn restart_from_paused_resets_to_round_one() {
        let (mut s, _) = started(&[5, 4]);
        s.advance_turn(now()).unwrap();
        s.advance_turn(now()).unwrap();
        s.toggle_status(StatusToggle::Pause, now()).unwrap();

        let start = s.start_combat(now()).unwrap();
        assert!(start.restarted);
        assert_eq!((s.round(), s.current_turn_index()), (1, 0));
    }

    #[test]
    fn preparing_can_conclude_directly() {
        let mut s = session();
        let change = s.conclude(now()).unwrap();
        assert_eq!(change.to, CombatStatus::Concluded);
    }

    #[test]
    fn concluded_session_rejects_everything_without_change() {
        let (mut s, ids) = started(&[5, 4]);
        s.advance_turn(now()).unwrap();
        s.conclude(now()).unwrap();
        let before = s.clone();

        assert!(s.advance_turn(now()).is_err());
        assert!(s.start_combat(now()).is_err());
        assert!(s.conclude(now()).is_err());
        assert!(s.toggle_status(StatusToggle::Resume, now()).is_err());
        assert!(s
            .add_participant(ParticipantDraft::default(), None, now())
            .is_err());
        assert!(s
            .update_participant(ids[0], ParticipantPatch::default(), PatchScope::Owner, now())
            .is_err());
        let action = NewCombatAction::new(ids[0], ActionKind::Attack, "Slash")
            .with_target(ids[1])
            .with_damage(3);
        assert!(matches!(
            s.record_action(action, now()),
            Err(DomainError::InvalidStateTransition(_))
        ));

        assert_eq!(s, before);
    }

    #[test]
    fn damaging_action_resolves_against_target() {
        let (mut s, ids) = started(&[5, 4]);
        let patch = ParticipantPatch {
            temporary_hit_points: Some(2),
            ..Default::default()
        };
        s.update_participant(ids[1], patch, PatchScope::Owner, now())
            .unwrap();

        let action = NewCombatAction::new(ids[0], ActionKind::Attack, "Longsword")
            .with_target(ids[1])
            .with_damage(5);
        let recorded = s.record_action(action, now()).unwrap();

        let outcome = recorded.action.resolution.unwrap();
        assert_eq!(outcome.absorbed_by_temporary, 2);
        assert_eq!(outcome.current_hit_points, 7);
        assert_eq!(recorded.action.round, 1);
        let target = s.participant(ids[1]).unwrap();
        assert_eq!((target.hit_points.current(), target.hit_points.temporary()), (7, 0));
        assert_eq!(recorded.damaged_target.as_ref(), Some(target));
    }

    #[test]
    fn zero_damage_or_no_target_leaves_hit_points_alone() {
        let (mut s, ids) = started(&[5, 4]);
        let miss = NewCombatAction::new(ids[0], ActionKind::Attack, "Miss")
            .with_target(ids[1])
            .with_damage(0);
        let recorded = s.record_action(miss, now()).unwrap();
        assert!(recorded.action.resolution.is_none());

        let shout = NewCombatAction::new(ids[0], ActionKind::Ability, "Shout").with_damage(9);
        assert!(s.record_action(shout, now()).unwrap().damaged_target.is_none());
        assert_eq!(s.participant(ids[1]).unwrap().hit_points.current(), 10);
    }

    #[test]
    fn inactive_actor_is_rejected_but_inactive_target_is_fine() {
        let (mut s, ids) = started(&[5, 4]);
        let down = ParticipantPatch {
            is_active: Some(false),
            ..Default::default()
        };
        s.update_participant(ids[1], down, PatchScope::Owner, now())
            .unwrap();

        let from_inactive = NewCombatAction::new(ids[1], ActionKind::Attack, "Bite");
        assert!(matches!(
            s.record_action(from_inactive, now()),
            Err(DomainError::InvalidStateTransition(_))
        ));

        let at_inactive = NewCombatAction::new(ids[0], ActionKind::Attack, "Finish")
            .with_target(ids[1])
            .with_damage(1);
        assert!(s.record_action(at_inactive, now()).is_ok());
    }

    #[test]
    fn unknown_target_is_not_found_and_nothing_is_recorded() {
        let (mut s, ids) = started(&[5]);
        let action = NewCombatAction::new(ids[0], ActionKind::Spell, "Fireball")
            .with_target(ParticipantId::new())
            .with_damage(20);
        assert!(matches!(
            s.record_action(action, now()),
            Err(DomainError::NotFound { .. })
        ));
        assert!(s.actions(None).is_empty());
    }

    #[test]
    fn actions_are_stamped_with_the_current_round() {
        let (mut s, ids) = started(&[5]);
        s.record_action(NewCombatAction::new(ids[0], ActionKind::Movement, "Dash"), now())
            .unwrap();
        s.advance_turn(now()).unwrap();
        s.record_action(NewCombatAction::new(ids[0], ActionKind::Item, "Potion"), now())
            .unwrap();

        assert_eq!(s.actions(Some(1)).len(), 1);
        assert_eq!(s.actions(Some(2))[0].name, "Potion");
        assert_eq!(s.actions(None).len(), 2);
    }

    #[test]
    fn snapshot_lists_participants_by_order() {
        let (s, ids) = started(&[1, 9]);
        let snapshot = s.snapshot();
        let listed: Vec<ParticipantId> = snapshot.participants.iter().map(|p| p.id).collect();
        assert_eq!(listed, vec![ids[1], ids[0]]);
        assert_eq!(snapshot.current_participant_id, Some(ids[1]));
    }
}
