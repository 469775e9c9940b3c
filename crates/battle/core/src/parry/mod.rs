//! Dice combat with parries.
//!
//! Turn order is driven by a per-entity turn delay: every move costs one
//! turn-delay token and the lowest delay acts next. Plain attacks give the
//! defender a chance to parry; critical hits and charges do not.

mod battle;
mod event;
mod state;

pub use battle::{ParryBattle, ParryPhase, PendingAttack};
pub use event::{ParryEvent, ParryEventKind};
pub use state::{
    AttackSummary, NoParryReason, ParryAttributes, ParryMove, ParryState, ParryStateBuilder,
};
