//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Combat session and dice roll storage (in-memory today)
//! - The character catalog and campaign membership collaborators
//! - Event fan-out to WebSocket subscribers
//! - Clock/Random (for testing)

mod error;
mod external;
mod repos;
mod testing;
pub mod types;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::{CampaignRepo, CharacterRepo, CombatSessionRepo, DiceRollRepo};

pub use types::{CampaignSummary, Caller, CharacterSnapshot, UserRole};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::EventPublisher;

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::{
    MockCampaignRepo, MockCharacterRepo, MockCombatSessionRepo, MockDiceRollRepo,
};

#[cfg(test)]
pub use external::MockEventPublisher;

#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::{ClockPort, RandomPort};

// =============================================================================
// Error Types
// =============================================================================
pub use error::RepoError;
