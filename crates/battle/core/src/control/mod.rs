//! Decision interface and reference decision makers.
//!
//! The battles never decide anything on a combatant's behalf. They stop at
//! each decision point and wait for a call; controllers are the narrow seam
//! through which a caller answers. The runners here loop a battle against a
//! pair of controllers until it ends.

mod parry;
mod windup;

pub use parry::{ParryController, RandomParryController, run_parry_battle, should_parry};
pub use windup::{StrategyController, WindUpController, run_windup_battle};
