use std::sync::Arc;

use tracing::{debug, warn};

use crate::engine::{Battle, BattleOutcome};
use crate::entity::EntityId;
use crate::error::BattleError;
use crate::windup::{Move, MoveStrategy, WindUpBattle, WindUpEvent, WindUpPhase, WindUpState};

/// Decides moves for one wind-up combatant.
pub trait WindUpController {
    /// Answers an awaiting-move event. `None` concedes the battle.
    fn choose_move(&mut self, actor: &WindUpState, event: &WindUpEvent) -> Option<Arc<Move>>;
}

impl<C: WindUpController + ?Sized> WindUpController for Box<C> {
    fn choose_move(&mut self, actor: &WindUpState, event: &WindUpEvent) -> Option<Arc<Move>> {
        (**self).choose_move(actor, event)
    }
}

/// Plays the combatant's moves by a fixed [`MoveStrategy`].
#[derive(Clone, Debug, Default)]
pub struct StrategyController {
    strategy: MoveStrategy,
    next: usize,
}

impl StrategyController {
    pub fn new(strategy: MoveStrategy) -> Self {
        Self { strategy, next: 0 }
    }

    pub fn strategy(&self) -> MoveStrategy {
        self.strategy
    }

    /// Restarts a cycle from the first move.
    pub fn reset(&mut self) {
        self.next = 0;
    }
}

impl WindUpController for StrategyController {
    fn choose_move(&mut self, actor: &WindUpState, _event: &WindUpEvent) -> Option<Arc<Move>> {
        let moves: Vec<&Arc<Move>> = actor.attributes().usable_moves().collect();
        if moves.is_empty() {
            return None;
        }
        let index = match self.strategy {
            MoveStrategy::UseFirst => 0,
            MoveStrategy::Cycle => {
                let index = self.next % moves.len();
                self.next = (index + 1) % moves.len();
                index
            }
        };
        moves.get(index).map(|mv| Arc::clone(mv))
    }
}

/// Drives a wind-up battle to its end.
///
/// `controllers` is indexed by entity id. A controller that returns no move
/// forfeits for its combatant.
pub fn run_windup_battle(
    battle: &mut WindUpBattle,
    controllers: &mut [&mut dyn WindUpController],
) -> Result<BattleOutcome, BattleError> {
    if battle.phase() == WindUpPhase::WaitingForStart {
        battle.start()?;
    }

    let limit = battle.config().max_decisions;
    for decisions in 0..limit {
        if let Some(outcome) = battle.outcome() {
            debug!(decisions, winner = %outcome.winner, "wind-up battle finished");
            return Ok(outcome);
        }

        let (actor, choice) = {
            let event = battle.events().last().ok_or(BattleError::UnexpectedEvent)?;
            let entity = event.kind().awaiting().ok_or(BattleError::UnexpectedEvent)?;
            let actor = battle.state(entity)?.clone();
            let controller = controller_for(controllers, entity)?;
            let choice = controller.choose_move(&actor, event);
            (actor, choice)
        };

        match choice {
            Some(mv) => battle.schedule_move(&actor, &mv)?,
            None => {
                warn!(actor = %actor.attributes().id, "controller has no move; forfeiting");
                battle.forfeit(&actor)?;
            }
        }
    }

    battle
        .outcome()
        .ok_or(BattleError::DecisionLimit { limit })
}

fn controller_for<'a>(
    controllers: &'a mut [&mut dyn WindUpController],
    entity: EntityId,
) -> Result<&'a mut dyn WindUpController, BattleError> {
    match controllers.get_mut(entity.index()) {
        Some(controller) => Ok(&mut **controller),
        None => Err(BattleError::UnknownEntity(entity)),
    }
}
