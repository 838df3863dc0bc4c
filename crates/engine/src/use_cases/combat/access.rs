//! Who may read or change a combat session.
//!
//! - The owner reads and changes everything.
//! - Campaign members (dungeon master or player) read sessions linked to
//!   their campaign. Admins read everything.
//! - The player whose character a participant links to may patch that
//!   participant's hit points and conditions, and record actions for it.

use std::collections::HashMap;
use std::sync::Arc;

use skirmish_domain::{CampaignId, CharacterId, CombatSession, Participant, PatchScope};

use crate::infrastructure::ports::{Caller, CharacterRepo, CharacterSnapshot};
use crate::use_cases::access::CampaignAccess;

use super::CombatError;

pub struct CombatAccess {
    campaigns: Arc<CampaignAccess>,
    characters: Arc<dyn CharacterRepo>,
}

impl CombatAccess {
    pub fn new(campaigns: Arc<CampaignAccess>, characters: Arc<dyn CharacterRepo>) -> Self {
        Self {
            campaigns,
            characters,
        }
    }

    pub fn ensure_owner(session: &CombatSession, caller: &Caller) -> Result<(), CombatError> {
        if session.is_owned_by(caller.user_id) {
            Ok(())
        } else {
            Err(CombatError::forbidden(
                "only the dungeon master can manage this combat session",
            ))
        }
    }

    pub async fn ensure_can_read(
        &self,
        session: &CombatSession,
        caller: &Caller,
    ) -> Result<(), CombatError> {
        if session.is_owned_by(caller.user_id) || caller.is_admin() {
            return Ok(());
        }
        if let Some(campaign_id) = session.campaign_id() {
            let membership = self
                .campaigns
                .membership(campaign_id, caller.user_id)
                .await?;
            if membership.is_some_and(|m| m.is_member()) {
                return Ok(());
            }
        }
        Err(CombatError::forbidden(
            "not allowed to view this combat session",
        ))
    }

    /// Campaign-wide listing: the campaign must exist and the caller must
    /// belong to it.
    pub async fn ensure_can_view_campaign(
        &self,
        campaign_id: CampaignId,
        caller: &Caller,
    ) -> Result<(), CombatError> {
        let membership = self
            .campaigns
            .membership(campaign_id, caller.user_id)
            .await?
            .ok_or_else(|| CombatError::not_found("Campaign", campaign_id))?;
        if membership.is_member() || caller.is_admin() {
            Ok(())
        } else {
            Err(CombatError::forbidden(
                "not allowed to view this campaign's combat sessions",
            ))
        }
    }

    /// Which fields `caller` may patch on a participant linked to `character`.
    pub fn patch_scope(
        session: &CombatSession,
        character: Option<&CharacterSnapshot>,
        caller: &Caller,
    ) -> Result<PatchScope, CombatError> {
        if session.is_owned_by(caller.user_id) {
            return Ok(PatchScope::Owner);
        }
        if character.is_some_and(|c| c.user_id == caller.user_id) {
            return Ok(PatchScope::Controller);
        }
        Err(CombatError::forbidden(
            "not allowed to update this participant",
        ))
    }

    /// The owner acts for anyone; a player only for the participant they control.
    pub async fn ensure_can_act_for(
        &self,
        session: &CombatSession,
        actor: &Participant,
        caller: &Caller,
    ) -> Result<(), CombatError> {
        if session.is_owned_by(caller.user_id) {
            return Ok(());
        }
        let character = self.linked_character(actor).await?;
        if character.is_some_and(|c| c.user_id == caller.user_id) {
            return Ok(());
        }
        Err(CombatError::forbidden(
            "can only record actions for your own character",
        ))
    }

    pub async fn character(
        &self,
        id: CharacterId,
    ) -> Result<Option<CharacterSnapshot>, CombatError> {
        Ok(self.characters.get(id).await?)
    }

    pub async fn linked_character(
        &self,
        participant: &Participant,
    ) -> Result<Option<CharacterSnapshot>, CombatError> {
        match participant.character_id {
            Some(id) => self.character(id).await,
            None => Ok(None),
        }
    }

    /// Catalog entries for every linked participant. Characters missing from
    /// the catalog are left out.
    pub async fn characters_for<'a>(
        &self,
        participants: impl IntoIterator<Item = &'a Participant>,
    ) -> Result<HashMap<CharacterId, CharacterSnapshot>, CombatError> {
        let mut characters = HashMap::new();
        for id in participants.into_iter().filter_map(|p| p.character_id) {
            if characters.contains_key(&id) {
                continue;
            }
            if let Some(character) = self.character(id).await? {
                characters.insert(id, character);
            }
        }
        Ok(characters)
    }
}
