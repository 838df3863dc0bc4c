//! Dice rolling use cases.
//!
//! Labelled rolls are stored before anything else sees them. A roll made
//! inside a campaign and not marked private is announced to the campaign's
//! room. Quick rolls are neither stored nor announced.

use std::sync::Arc;

use skirmish_domain::{
    CampaignId, DiceKind, DiceOutcome, DiceRoll, DiceSpec, DomainError, DomainEvent,
};
use skirmish_shared::{DiceRollRequest, QuickRollRequest};

use crate::infrastructure::ports::{
    Caller, ClockPort, DiceRollRepo, EventPublisher, RandomPort, RepoError,
};
use crate::use_cases::access::CampaignAccess;

/// Rolls returned by the caller's own history when no limit is given.
pub const USER_HISTORY_LIMIT: usize = 20;
/// Rolls returned by a campaign's history when no limit is given.
pub const CAMPAIGN_HISTORY_LIMIT: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum DiceError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Campaign not found: {0}")]
    CampaignNotFound(CampaignId),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl From<DomainError> for DiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::Parse(msg) => Self::Validation(msg),
            other => Self::Validation(other.to_string()),
        }
    }
}

/// Container for dice use cases.
pub struct DiceUseCases {
    pub roll: Arc<RollDice>,
    pub quick_roll: Arc<QuickRoll>,
    pub user_history: Arc<ListUserRolls>,
    pub campaign_history: Arc<ListCampaignRolls>,
}

impl DiceUseCases {
    pub fn new(
        roll: Arc<RollDice>,
        quick_roll: Arc<QuickRoll>,
        user_history: Arc<ListUserRolls>,
        campaign_history: Arc<ListCampaignRolls>,
    ) -> Self {
        Self {
            roll,
            quick_roll,
            user_history,
            campaign_history,
        }
    }
}

/// Callers may roll in, or read, a campaign only as one of its members.
async fn require_member(
    campaigns: &CampaignAccess,
    caller: &Caller,
    campaign_id: CampaignId,
    action: &str,
) -> Result<(), DiceError> {
    let membership = campaigns
        .membership(campaign_id, caller.user_id)
        .await?
        .ok_or(DiceError::CampaignNotFound(campaign_id))?;
    if membership.is_member() {
        Ok(())
    } else {
        Err(DiceError::Forbidden(format!(
            "only campaign members can {} in this campaign",
            action
        )))
    }
}

fn history_limit(requested: Option<u32>, default: usize) -> usize {
    match requested {
        Some(0) | None => default,
        Some(n) => n as usize,
    }
}

fn roll_spec(random: &dyn RandomPort, spec: &DiceSpec) -> DiceOutcome {
    spec.roll(|min, max| random.gen_range(min, max))
}

fn parse_spec(
    dice_type: &str,
    count: i64,
    modifier: i32,
    advantage: bool,
    disadvantage: bool,
) -> Result<DiceSpec, DiceError> {
    let kind: DiceKind = dice_type.parse()?;
    Ok(DiceSpec::new(kind, count, modifier, advantage, disadvantage)?)
}

// =============================================================================
// Roll
// =============================================================================

/// Full roll with labels, optional campaign and privacy.
pub struct RollDice {
    campaigns: Arc<CampaignAccess>,
    rolls: Arc<dyn DiceRollRepo>,
    publisher: Arc<dyn EventPublisher>,
    random: Arc<dyn RandomPort>,
    clock: Arc<dyn ClockPort>,
}

impl RollDice {
    pub fn new(
        campaigns: Arc<CampaignAccess>,
        rolls: Arc<dyn DiceRollRepo>,
        publisher: Arc<dyn EventPublisher>,
        random: Arc<dyn RandomPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            campaigns,
            rolls,
            publisher,
            random,
            clock,
        }
    }

    pub async fn execute(
        &self,
        caller: &Caller,
        input: DiceRollRequest,
    ) -> Result<DiceRoll, DiceError> {
        let spec = parse_spec(
            &input.dice_type,
            input.dice_count,
            input.modifier,
            input.advantage,
            input.disadvantage,
        )?;

        let campaign_id = input.campaign_id.map(CampaignId::from_uuid);
        if let Some(campaign_id) = campaign_id {
            require_member(&self.campaigns, caller, campaign_id, "roll").await?;
        }

        let outcome = roll_spec(self.random.as_ref(), &spec);
        let mut roll = DiceRoll::new(caller.user_id, outcome, self.clock.now());
        roll.campaign_id = campaign_id;
        roll.character_name = input.character_name;
        roll.roll_type = input.roll_type;
        roll.roll_label = input.roll_label;
        roll.is_private = input.is_private;

        tracing::debug!(
            user_id = %caller.user_id,
            dice = %spec.kind(),
            count = spec.count(),
            total = roll.total(),
            "Dice rolled"
        );

        self.rolls.save(&roll).await?;

        if let (true, Some(campaign_id)) = (roll.is_announced(), campaign_id) {
            self.publisher.publish(DomainEvent::DiceRolled {
                campaign_id,
                roll: roll.clone(),
            });
        }
        Ok(roll)
    }
}

// =============================================================================
// History
// =============================================================================

/// The caller's own rolls across every campaign, newest first.
pub struct ListUserRolls {
    rolls: Arc<dyn DiceRollRepo>,
}

impl ListUserRolls {
    pub fn new(rolls: Arc<dyn DiceRollRepo>) -> Self {
        Self { rolls }
    }

    pub async fn execute(
        &self,
        caller: &Caller,
        limit: Option<u32>,
    ) -> Result<Vec<DiceRoll>, DiceError> {
        let mut rolls = self.rolls.list_by_user(caller.user_id).await?;
        rolls.truncate(history_limit(limit, USER_HISTORY_LIMIT));
        Ok(rolls)
    }
}

/// A campaign's public rolls plus the caller's own private ones, newest first.
pub struct ListCampaignRolls {
    campaigns: Arc<CampaignAccess>,
    rolls: Arc<dyn DiceRollRepo>,
}

impl ListCampaignRolls {
    pub fn new(campaigns: Arc<CampaignAccess>, rolls: Arc<dyn DiceRollRepo>) -> Self {
        Self { campaigns, rolls }
    }

    pub async fn execute(
        &self,
        caller: &Caller,
        campaign_id: CampaignId,
        limit: Option<u32>,
    ) -> Result<Vec<DiceRoll>, DiceError> {
        if !caller.is_admin() {
            require_member(&self.campaigns, caller, campaign_id, "read rolls").await?;
        } else if self.campaigns.membership(campaign_id, caller.user_id).await?.is_none() {
            return Err(DiceError::CampaignNotFound(campaign_id));
        }

        Ok(self
            .rolls
            .list_by_campaign(campaign_id)
            .await?
            .into_iter()
            .filter(|roll| roll.is_visible_to(caller.user_id))
            .take(history_limit(limit, CAMPAIGN_HISTORY_LIMIT))
            .collect())
    }
}

// =============================================================================
// Quick roll
// =============================================================================

/// Unlabelled roll; never announced.
pub struct QuickRoll {
    random: Arc<dyn RandomPort>,
    clock: Arc<dyn ClockPort>,
}

impl QuickRoll {
    pub fn new(random: Arc<dyn RandomPort>, clock: Arc<dyn ClockPort>) -> Self {
        Self { random, clock }
    }

    pub fn execute(&self, caller: &Caller, input: QuickRollRequest) -> Result<DiceRoll, DiceError> {
        let spec = parse_spec(&input.dice_type, input.dice_count, input.modifier, false, false)?;
        let outcome = roll_spec(self.random.as_ref(), &spec);
        Ok(DiceRoll::new(caller.user_id, outcome, self.clock.now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::{FixedClock, FixedRandom, ScriptedRandom};
    use crate::infrastructure::ports::{
        CampaignSummary, MockCampaignRepo, MockDiceRollRepo, MockEventPublisher, UserRole,
    };
    use chrono::{Duration, Utc};
    use mockall::Sequence;
    use skirmish_domain::UserId;

    fn roll_request(dice_type: &str) -> DiceRollRequest {
        DiceRollRequest {
            dice_type: dice_type.to_string(),
            dice_count: 1,
            modifier: 0,
            advantage: false,
            disadvantage: false,
            roll_type: None,
            roll_label: None,
            is_private: false,
            campaign_id: None,
            character_name: None,
        }
    }

    fn campaign_with_player(campaign_id: CampaignId, player: UserId) -> MockCampaignRepo {
        let mut campaigns = MockCampaignRepo::new();
        campaigns.expect_get().returning(move |id| {
            Ok((id == campaign_id).then(|| CampaignSummary {
                id,
                name: "Saltmarsh".to_string(),
                dungeon_master_id: UserId::new(),
            }))
        });
        campaigns
            .expect_is_player()
            .returning(move |_, user| Ok(user == player));
        campaigns
    }

    fn accepting_saves() -> MockDiceRollRepo {
        let mut rolls = MockDiceRollRepo::new();
        rolls.expect_save().returning(|_| Ok(()));
        rolls
    }

    fn roller(
        campaigns: MockCampaignRepo,
        publisher: MockEventPublisher,
        random: impl RandomPort + 'static,
    ) -> RollDice {
        roller_storing_in(campaigns, accepting_saves(), publisher, random)
    }

    fn roller_storing_in(
        campaigns: MockCampaignRepo,
        rolls: MockDiceRollRepo,
        publisher: MockEventPublisher,
        random: impl RandomPort + 'static,
    ) -> RollDice {
        RollDice::new(
            Arc::new(CampaignAccess::new(Arc::new(campaigns))),
            Arc::new(rolls),
            Arc::new(publisher),
            Arc::new(random),
            Arc::new(FixedClock(Utc::now())),
        )
    }

    #[tokio::test]
    async fn advantage_keeps_the_higher_d20() {
        let mut publisher = MockEventPublisher::new();
        publisher.expect_publish().never();
        let use_case = roller(
            MockCampaignRepo::new(),
            publisher,
            ScriptedRandom::new(vec![4, 17]),
        );

        let mut input = roll_request("d20");
        input.advantage = true;
        input.modifier = 3;
        let roll = use_case
            .execute(&Caller::player(UserId::new()), input)
            .await
            .unwrap();

        assert_eq!(roll.outcome.results, vec![4, 17]);
        assert_eq!(roll.total(), 20);
    }

    #[tokio::test]
    async fn campaign_roll_is_announced_unless_private() {
        let campaign_id = CampaignId::new();
        let player = UserId::new();

        let mut publisher = MockEventPublisher::new();
        publisher
            .expect_publish()
            .withf(move |e| {
                matches!(e, DomainEvent::DiceRolled { campaign_id: c, .. } if *c == campaign_id)
            })
            .times(1)
            .return_const(());
        let use_case = roller(
            campaign_with_player(campaign_id, player),
            publisher,
            FixedRandom(6),
        );

        let mut input = roll_request("d6");
        input.dice_count = 3;
        input.campaign_id = Some(campaign_id.to_uuid());
        input.roll_label = Some("Fireball".to_string());
        let roll = use_case.execute(&Caller::player(player), input.clone()).await.unwrap();
        assert_eq!(roll.total(), 18);
        assert_eq!(roll.campaign_id, Some(campaign_id));

        input.is_private = true;
        let private = use_case.execute(&Caller::player(player), input).await.unwrap();
        assert!(!private.is_announced());
    }

    #[tokio::test]
    async fn outsiders_cannot_roll_in_a_campaign() {
        let campaign_id = CampaignId::new();
        let mut publisher = MockEventPublisher::new();
        publisher.expect_publish().never();
        let use_case = roller(
            campaign_with_player(campaign_id, UserId::new()),
            publisher,
            FixedRandom(1),
        );

        let mut input = roll_request("d20");
        input.campaign_id = Some(campaign_id.to_uuid());
        let result = use_case.execute(&Caller::player(UserId::new()), input).await;
        assert!(matches!(result, Err(DiceError::Forbidden(_))));

        let mut input = roll_request("d20");
        input.campaign_id = Some(uuid::Uuid::new_v4());
        let result = use_case.execute(&Caller::player(UserId::new()), input).await;
        assert!(matches!(result, Err(DiceError::CampaignNotFound(_))));
    }

    #[tokio::test]
    async fn invalid_requests_are_validation_errors() {
        let mut publisher = MockEventPublisher::new();
        publisher.expect_publish().never();
        let use_case = roller(MockCampaignRepo::new(), publisher, FixedRandom(1));
        let caller = Caller::player(UserId::new());

        let result = use_case.execute(&caller, roll_request("d7")).await;
        assert!(matches!(result, Err(DiceError::Validation(_))));

        let mut input = roll_request("d6");
        input.advantage = true;
        let result = use_case.execute(&caller, input).await;
        assert!(matches!(result, Err(DiceError::Validation(_))));

        let mut input = roll_request("d20");
        input.dice_count = 101;
        let result = use_case.execute(&caller, input).await;
        assert!(matches!(result, Err(DiceError::Validation(_))));
    }

    #[tokio::test]
    async fn roll_is_saved_before_it_is_announced() {
        let campaign_id = CampaignId::new();
        let player = UserId::new();
        let mut seq = Sequence::new();

        let mut rolls = MockDiceRollRepo::new();
        rolls
            .expect_save()
            .withf(move |r| r.user_id == player && r.roll_label.as_deref() == Some("Stealth"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        let mut publisher = MockEventPublisher::new();
        publisher
            .expect_publish()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        let use_case = roller_storing_in(
            campaign_with_player(campaign_id, player),
            rolls,
            publisher,
            FixedRandom(11),
        );

        let mut input = roll_request("d20");
        input.campaign_id = Some(campaign_id.to_uuid());
        input.roll_label = Some("Stealth".to_string());
        use_case.execute(&Caller::player(player), input).await.unwrap();
    }

    #[tokio::test]
    async fn failed_save_announces_nothing() {
        let campaign_id = CampaignId::new();
        let player = UserId::new();

        let mut rolls = MockDiceRollRepo::new();
        rolls
            .expect_save()
            .returning(|_| Err(RepoError::database("save", "disk full")));
        let mut publisher = MockEventPublisher::new();
        publisher.expect_publish().never();
        let use_case = roller_storing_in(
            campaign_with_player(campaign_id, player),
            rolls,
            publisher,
            FixedRandom(11),
        );

        let mut input = roll_request("d20");
        input.campaign_id = Some(campaign_id.to_uuid());
        let result = use_case.execute(&Caller::player(player), input).await;
        assert!(matches!(result, Err(DiceError::Repo(_))));
    }

    fn history(entries: &[(UserId, bool)]) -> Vec<DiceRoll> {
        let start = Utc::now();
        entries
            .iter()
            .enumerate()
            .map(|(i, (user_id, is_private))| {
                let outcome = DiceSpec::new(DiceKind::D20, 1, 0, false, false)
                    .unwrap()
                    .roll(|_, max| max);
                let mut roll = DiceRoll::new(*user_id, outcome, start - Duration::minutes(i as i64));
                roll.is_private = *is_private;
                roll
            })
            .collect()
    }

    #[tokio::test]
    async fn user_history_defaults_to_twenty() {
        let caller = UserId::new();
        let stored = history(&[(caller, false); 25]);
        let newest = stored[0].id;

        let mut rolls = MockDiceRollRepo::new();
        rolls
            .expect_list_by_user()
            .withf(move |user| *user == caller)
            .returning(move |_| Ok(stored.clone()));
        let use_case = ListUserRolls::new(Arc::new(rolls));

        let all = use_case.execute(&Caller::player(caller), None).await.unwrap();
        assert_eq!(all.len(), USER_HISTORY_LIMIT);
        assert_eq!(all[0].id, newest);

        let few = use_case.execute(&Caller::player(caller), Some(3)).await.unwrap();
        assert_eq!(few.len(), 3);

        let zero = use_case.execute(&Caller::player(caller), Some(0)).await.unwrap();
        assert_eq!(zero.len(), USER_HISTORY_LIMIT);
    }

    #[tokio::test]
    async fn campaign_history_hides_other_players_private_rolls() {
        let campaign_id = CampaignId::new();
        let player = UserId::new();
        let other = UserId::new();
        let stored = history(&[
            (other, true),
            (player, true),
            (other, false),
            (player, false),
            (other, false),
        ]);
        let visible: Vec<_> = stored[1..].iter().map(|r| r.id).collect();

        let mut rolls = MockDiceRollRepo::new();
        rolls
            .expect_list_by_campaign()
            .withf(move |id| *id == campaign_id)
            .returning(move |_| Ok(stored.clone()));
        let use_case = ListCampaignRolls::new(
            Arc::new(CampaignAccess::new(Arc::new(campaign_with_player(
                campaign_id,
                player,
            )))),
            Arc::new(rolls),
        );

        let seen = use_case
            .execute(&Caller::player(player), campaign_id, None)
            .await
            .unwrap();
        let ids: Vec<_> = seen.iter().map(|r| r.id).collect();
        assert_eq!(ids, visible);

        let limited = use_case
            .execute(&Caller::player(player), campaign_id, Some(2))
            .await
            .unwrap();
        let ids: Vec<_> = limited.iter().map(|r| r.id).collect();
        assert_eq!(ids, visible[..2].to_vec());
    }

    #[tokio::test]
    async fn campaign_history_is_for_members_and_admins() {
        let campaign_id = CampaignId::new();
        let mut rolls = MockDiceRollRepo::new();
        rolls.expect_list_by_campaign().returning(|_| Ok(Vec::new()));
        let use_case = ListCampaignRolls::new(
            Arc::new(CampaignAccess::new(Arc::new(campaign_with_player(
                campaign_id,
                UserId::new(),
            )))),
            Arc::new(rolls),
        );

        let outsider = Caller::player(UserId::new());
        let result = use_case.execute(&outsider, campaign_id, None).await;
        assert!(matches!(result, Err(DiceError::Forbidden(_))));

        let result = use_case.execute(&outsider, CampaignId::new(), None).await;
        assert!(matches!(result, Err(DiceError::CampaignNotFound(_))));

        let admin = Caller::new(UserId::new(), UserRole::Admin);
        assert!(use_case.execute(&admin, campaign_id, None).await.unwrap().is_empty());
        let result = use_case.execute(&admin, CampaignId::new(), None).await;
        assert!(matches!(result, Err(DiceError::CampaignNotFound(_))));
    }

    #[test]
    fn quick_roll_sums_dice_and_modifier() {
        let use_case = QuickRoll::new(
            Arc::new(ScriptedRandom::new(vec![2, 5])),
            Arc::new(FixedClock(Utc::now())),
        );
        let roll = use_case
            .execute(
                &Caller::player(UserId::new()),
                QuickRollRequest {
                    dice_type: "d8".to_string(),
                    dice_count: 2,
                    modifier: -1,
                },
            )
            .unwrap();
        assert_eq!(roll.outcome.results, vec![2, 5]);
        assert_eq!(roll.total(), 6);
        assert!(!roll.is_announced());
    }
}
