//! In-memory adapters for development and testing
//!
//! Nothing here persists across restarts.

mod catalog;
mod combat_session_repo;
mod dice_roll_repo;

pub use catalog::{CampaignSeed, CatalogSeed, CharacterSeed, InMemoryCatalog};
pub use combat_session_repo::InMemoryCombatSessionRepo;
pub use dice_roll_repo::InMemoryDiceRollRepo;
