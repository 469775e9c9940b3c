use crate::dice::DiceResult;
use crate::engine::{BattleOutcome, Event};
use crate::entity::EntityId;

use super::state::{AttackSummary, NoParryReason, ParryMove, ParryState};

/// A dice/parry log entry.
pub type ParryEvent = Event<ParryState, ParryEventKind>;

/// Payload of a dice/parry event.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum ParryEventKind {
    BattleStarted,

    /// Both combatants rolled agility; `rolls` is indexed by entity id.
    InitiativeRolled {
        attempt: u32,
        rolls: Vec<DiceResult>,
    },

    InitiativeDecided {
        first: EntityId,
        by_coin_flip: bool,
    },

    /// The battle is suspended until `entity` makes a move.
    AwaitingMove {
        entity: EntityId,
        valid_moves: Vec<ParryMove>,
    },

    /// `requested` differs from `used` when an illegal move was coerced.
    MoveUsed {
        entity: EntityId,
        requested: ParryMove,
        used: ParryMove,
    },

    AttackRolled {
        attacker: EntityId,
        defender: EntityId,
        summary: AttackSummary,
    },

    Missed {
        attacker: EntityId,
        defender: EntityId,
        summary: AttackSummary,
    },

    NoParryOpportunity {
        attacker: EntityId,
        defender: EntityId,
        reason: NoParryReason,
    },

    /// The battle is suspended until `defender` decides whether to parry.
    ParryOpportunity {
        attacker: EntityId,
        defender: EntityId,
        number_to_hit: u32,
        could_parry: bool,
    },

    ParryResolved {
        defender: EntityId,
        roll: DiceResult,
        success: bool,
    },

    Hit {
        attacker: EntityId,
        defender: EntityId,
        summary: AttackSummary,
        hp_lost: u32,
    },

    ChargeBegan {
        entity: EntityId,
        defense_lost: u32,
    },

    DefenseRaised {
        entity: EntityId,
        roll: DiceResult,
    },

    BattleOver(BattleOutcome),
}

impl ParryEventKind {
    /// The entity whose decision this event waits for, if any.
    pub fn awaiting(&self) -> Option<EntityId> {
        match self {
            Self::AwaitingMove { entity, .. } => Some(*entity),
            Self::ParryOpportunity { defender, .. } => Some(*defender),
            _ => None,
        }
    }
}
