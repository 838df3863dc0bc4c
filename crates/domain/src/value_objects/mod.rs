//! Value objects - immutable rules and arithmetic shared by the combat aggregate.

pub mod combat_status;
pub mod dice;
pub mod hit_points;
pub mod turn_order;

pub use combat_status::{CombatOperation, CombatStatus, StatusToggle};
pub use dice::{DiceKind, DiceOutcome, DiceSpec, RollMode, MAX_DICE_COUNT, MAX_MODIFIER};
pub use hit_points::{DamageOutcome, HitPoints};
pub use turn_order::{rank_by_initiative, TurnAdvance, TurnCursor};
