//! Deterministic two-combatant turn-based battle engines.
//!
//! `battle-core` owns the rules and nothing else: no I/O, no clock and no
//! ambient randomness. A battle is advanced only by explicit calls, every
//! state change produces an [`engine::Event`] carrying snapshots of all
//! entities, and all randomness flows through an injected
//! [`random::RandomSource`].
//!
//! Two variants share the [`engine::BattleCore`]:
//! - [`parry`]: dice rolls, parries, charges and critical hits.
//! - [`windup`]: moves that land after a delay, with attributes and stacks.
//!
//! [`control`] provides the decision interface plus reference controllers and
//! runners for headless simulation.
pub mod config;
pub mod control;
pub mod dice;
pub mod engine;
pub mod entity;
pub mod error;
pub mod parry;
pub mod queue;
pub mod random;
pub mod windup;

pub use config::BattleConfig;
pub use control::{
    ParryController, RandomParryController, StrategyController, WindUpController,
    run_parry_battle, run_windup_battle, should_parry,
};
pub use dice::{Dice, DiceParseError, DiceResult};
pub use engine::{
    Battle, BattleCore, BattleListener, BattleOutcome, Event, EventRecorder, ListenerHandle,
};
pub use entity::{Entity, EntityId, Schedulable, Snapshot, StateBuilder};
pub use error::{BattleError, ErrorSeverity};
pub use parry::{
    AttackSummary, NoParryReason, ParryAttributes, ParryBattle, ParryEvent, ParryEventKind,
    ParryMove, ParryPhase, ParryState, PendingAttack,
};
pub use queue::{BattleQueue, QueuePriority};
pub use random::{PcgRandom, RandomSource, ScriptedRandom, StdRandom};
pub use windup::{
    Attribute, AttributeKind, BattleStats, Move, MoveStrategy, Stack, WindUpAttributes,
    WindUpBattle, WindUpEvent, WindUpEventKind, WindUpPhase, WindUpState,
};
