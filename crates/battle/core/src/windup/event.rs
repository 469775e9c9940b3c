use std::sync::Arc;

use crate::engine::{BattleOutcome, Event};
use crate::entity::EntityId;

use super::moves::Move;
use super::state::WindUpState;

/// A wind-up log entry.
pub type WindUpEvent = Event<WindUpState, WindUpEventKind>;

/// Payload of a wind-up event.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum WindUpEventKind {
    BattleStarted,

    /// Emitted at the start of every turn, possibly with zero ticks.
    TicksPassed {
        ticks: u32,
    },

    /// The battle is suspended until `entity` schedules a move.
    AwaitingMove {
        entity: EntityId,
    },

    MoveChosen {
        entity: EntityId,
        chosen: Arc<Move>,
    },

    Healed {
        entity: EntityId,
        source: Arc<Move>,
        amount: u32,
    },

    /// `count` is the new stack count; zero means the stack is gone.
    StackModified {
        entity: EntityId,
        applied: Arc<Move>,
        count: u32,
    },

    MoveOccurred {
        attacker: EntityId,
        defender: EntityId,
        attack: Arc<Move>,
        defense: Option<Arc<Move>>,
        damage: u32,
    },

    DelayChanged {
        entity: EntityId,
        delay_remaining: u32,
        delta: u32,
    },

    /// Damage outside a normal hit: reflect, bleed, forfeit.
    BonusDamage {
        entity: EntityId,
        damage: u32,
    },

    BattleEnded(BattleOutcome),
}

impl WindUpEventKind {
    pub fn awaiting(&self) -> Option<EntityId> {
        match self {
            Self::AwaitingMove { entity } => Some(*entity),
            _ => None,
        }
    }
}
