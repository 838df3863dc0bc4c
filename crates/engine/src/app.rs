//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::ports::{
    CampaignRepo, CharacterRepo, ClockPort, CombatSessionRepo, DiceRollRepo, EventPublisher,
    RandomPort,
};
use crate::use_cases;
use crate::use_cases::access::CampaignAccess;

/// Main application state.
///
/// Passed to HTTP/WebSocket handlers via Axum state.
pub struct App {
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub combat: use_cases::CombatUseCases,
    pub dice: use_cases::DiceUseCases,
    /// Campaign membership checks shared with the WebSocket room joins
    pub campaigns: Arc<CampaignAccess>,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        sessions: Arc<dyn CombatSessionRepo>,
        characters: Arc<dyn CharacterRepo>,
        campaigns: Arc<dyn CampaignRepo>,
        rolls: Arc<dyn DiceRollRepo>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        let campaign_access = Arc::new(CampaignAccess::new(campaigns));

        let combat = use_cases::CombatUseCases::new(
            sessions,
            characters,
            campaign_access.clone(),
            publisher.clone(),
            clock.clone(),
        );

        let dice = use_cases::DiceUseCases::new(
            Arc::new(use_cases::dice::RollDice::new(
                campaign_access.clone(),
                rolls.clone(),
                publisher,
                random.clone(),
                clock.clone(),
            )),
            Arc::new(use_cases::dice::QuickRoll::new(random, clock)),
            Arc::new(use_cases::dice::ListUserRolls::new(rolls.clone())),
            Arc::new(use_cases::dice::ListCampaignRolls::new(
                campaign_access.clone(),
                rolls,
            )),
        );

        Self {
            use_cases: UseCases {
                combat,
                dice,
                campaigns: campaign_access,
            },
        }
    }
}
