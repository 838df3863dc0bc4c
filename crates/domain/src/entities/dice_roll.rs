//! A rolled set of dice together with who rolled it and where it was shown.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{DiceOutcome, DiceSpec};
use crate::{CampaignId, DiceRollId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceRoll {
    pub id: DiceRollId,
    pub user_id: UserId,
    pub campaign_id: Option<CampaignId>,
    pub character_name: Option<String>,
    pub roll_type: Option<String>,
    pub roll_label: Option<String>,
    pub is_private: bool,
    #[serde(flatten)]
    pub outcome: DiceOutcome,
    pub rolled_at: DateTime<Utc>,
}

impl DiceRoll {
    pub fn new(user_id: UserId, outcome: DiceOutcome, rolled_at: DateTime<Utc>) -> Self {
        Self {
            id: DiceRollId::new(),
            user_id,
            campaign_id: None,
            character_name: None,
            roll_type: None,
            roll_label: None,
            is_private: false,
            outcome,
            rolled_at,
        }
    }

    pub fn spec(&self) -> &DiceSpec {
        &self.outcome.spec
    }

    pub fn total(&self) -> i32 {
        self.outcome.total
    }

    /// Whether the roll should be announced to the rest of the campaign.
    pub fn is_announced(&self) -> bool {
        self.campaign_id.is_some() && !self.is_private
    }

    /// Private rolls show up only in their roller's history.
    pub fn is_visible_to(&self, viewer: UserId) -> bool {
        !self.is_private || self.user_id == viewer
    }
}
