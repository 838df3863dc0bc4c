//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific domain area.
//! Use cases orchestrate ports and aggregates to fulfill user stories.

pub mod access;
pub mod combat;
pub mod dice;

pub use access::{CampaignAccess, Membership};
pub use combat::{CombatError, CombatUseCases};
pub use dice::{DiceError, DiceUseCases};
