//! Error infrastructure for battle-core.
//!
//! Nothing in the engine uses errors for control flow. A rejected decision
//! call is logged and leaves the battle untouched; the returned
//! [`BattleError`] only tells the caller why. The one exception is
//! [`BattleError::NoSchedulableEntity`], which means the engine's own
//! invariants were broken and the turn loop stopped.

use crate::entity::EntityId;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the caller can retry with a different decision
/// - **Validation**: the call was not valid in the current battle phase
/// - **Internal**: unexpected state inconsistency
/// - **Fatal**: engine invariants violated, the battle cannot continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an engine bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Errors surfaced by the battle engines and runners.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BattleError {
    #[error("battle has already started")]
    AlreadyStarted,

    #[error("battle has not started yet")]
    NotStarted,

    #[error("battle is over")]
    BattleOver,

    #[error("entity {actor} is not the active entity ({expected:?})")]
    NotCurrentActor {
        actor: EntityId,
        expected: Option<EntityId>,
    },

    #[error("battle is not waiting for a move")]
    NotAwaitingMove,

    #[error("battle is not waiting for a parry decision")]
    NotAwaitingParry,

    #[error("no attack is pending a parry decision")]
    NoPendingAttack,

    #[error("no entity with id {0} in this battle")]
    UnknownEntity(EntityId),

    #[error("entity {0} has no move usable in battle")]
    NoUsableMove(EntityId),

    #[error("no entity is able to act")]
    NoSchedulableEntity,

    #[error("battle did not finish within {limit} decisions")]
    DecisionLimit { limit: u32 },

    #[error("battle stopped on an event that does not await a decision")]
    UnexpectedEvent,
}

impl BattleError {
    pub fn not_current_actor(actor: EntityId, expected: Option<EntityId>) -> Self {
        Self::NotCurrentActor { actor, expected }
    }

    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotCurrentActor { .. } | Self::NoUsableMove(_) => ErrorSeverity::Recoverable,
            Self::AlreadyStarted
            | Self::NotStarted
            | Self::BattleOver
            | Self::NotAwaitingMove
            | Self::NotAwaitingParry
            | Self::NoPendingAttack
            | Self::UnknownEntity(_) => ErrorSeverity::Validation,
            Self::DecisionLimit { .. } | Self::UnexpectedEvent => ErrorSeverity::Internal,
            Self::NoSchedulableEntity => ErrorSeverity::Fatal,
        }
    }

    /// Static identifier for this error variant, for logs and tests.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyStarted => "already_started",
            Self::NotStarted => "not_started",
            Self::BattleOver => "battle_over",
            Self::NotCurrentActor { .. } => "not_current_actor",
            Self::NotAwaitingMove => "not_awaiting_move",
            Self::NotAwaitingParry => "not_awaiting_parry",
            Self::NoPendingAttack => "no_pending_attack",
            Self::UnknownEntity(_) => "unknown_entity",
            Self::NoUsableMove(_) => "no_usable_move",
            Self::NoSchedulableEntity => "no_schedulable_entity",
            Self::DecisionLimit { .. } => "decision_limit",
            Self::UnexpectedEvent => "unexpected_event",
        }
    }
}
