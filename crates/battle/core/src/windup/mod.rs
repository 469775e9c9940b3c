//! Wind-up battles with move attributes and stacks.
//!
//! Each combatant picks a move that lands after its delay. While it winds up,
//! the move's defense protects its user. Attributes add healing, piercing,
//! reflection, stuns and lingering stacks on top of plain damage.

mod battle;
mod event;
mod moves;
mod rules;
mod state;

pub use battle::{WindUpBattle, WindUpPhase};
pub use event::{WindUpEvent, WindUpEventKind};
pub use moves::{Attribute, AttributeKind, BattleStats, Move, Stack};
pub use rules::{compute_damage, compute_reflect, will_hit_before_move_change};
pub use state::{MoveStrategy, WindUpAttributes, WindUpState, WindUpStateBuilder};
