use tracing::debug;

use crate::engine::{Battle, BattleOutcome};
use crate::entity::EntityId;
use crate::error::BattleError;
use crate::parry::{ParryBattle, ParryEvent, ParryEventKind, ParryMove, ParryPhase, ParryState};
use crate::random::RandomSource;

/// Decides moves and parries for one dice/parry combatant.
pub trait ParryController {
    /// Answers an [`ParryEventKind::AwaitingMove`] event.
    fn choose_move(&mut self, actor: &ParryState, event: &ParryEvent) -> ParryMove;

    /// Answers a [`ParryEventKind::ParryOpportunity`] event.
    fn choose_parry(&mut self, defender: &ParryState, event: &ParryEvent) -> bool;
}

impl<C: ParryController + ?Sized> ParryController for Box<C> {
    fn choose_move(&mut self, actor: &ParryState, event: &ParryEvent) -> ParryMove {
        (**self).choose_move(actor, event)
    }

    fn choose_parry(&mut self, defender: &ParryState, event: &ParryEvent) -> bool {
        (**self).choose_parry(defender, event)
    }
}

/// Picks a random legal move and parries by a fixed odds rule.
pub struct RandomParryController {
    rng: Box<dyn RandomSource>,
    threshold: f32,
}

impl RandomParryController {
    pub const DEFAULT_THRESHOLD: f32 = 0.3;

    pub fn new(rng: impl RandomSource + 'static) -> Self {
        Self {
            rng: Box::new(rng),
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }
}

impl ParryController for RandomParryController {
    fn choose_move(&mut self, actor: &ParryState, _event: &ParryEvent) -> ParryMove {
        let moves = actor.valid_moves();
        if moves.is_empty() {
            return ParryMove::Attack;
        }
        let index = self.rng.range(0, moves.len() as i32 - 1) as usize;
        moves.get(index).copied().unwrap_or(ParryMove::Attack)
    }

    fn choose_parry(&mut self, defender: &ParryState, event: &ParryEvent) -> bool {
        match *event.kind() {
            ParryEventKind::ParryOpportunity {
                number_to_hit,
                could_parry,
                ..
            } => should_parry(defender, number_to_hit, could_parry, self.threshold),
            _ => false,
        }
    }
}

/// Parry rule used by [`RandomParryController`].
///
/// Always parries when any roll succeeds or when the hit would be lethal,
/// never when no roll can succeed, and otherwise only when the roll needed
/// sits in the bottom `threshold` of the parry die's range.
pub fn should_parry(defender: &ParryState, number_to_hit: u32, could_parry: bool, threshold: f32) -> bool {
    let parry = defender.attributes().parry;
    let needed = number_to_hit as i32;
    if needed <= parry.min_roll() {
        return true;
    }
    if !could_parry {
        return false;
    }
    if number_to_hit >= defender.hp().saturating_add(defender.defense()) {
        return true;
    }
    let range = parry.max_roll() - parry.min_roll();
    if range <= 0 {
        return false;
    }
    ((needed - parry.min_roll()) as f32 / range as f32) < threshold
}

enum Decision {
    Move(ParryMove),
    Parry(bool),
}

/// Drives a dice/parry battle to its end.
///
/// `controllers` is indexed by entity id. Starts the battle if needed, then
/// answers every decision point until a winner is known.
pub fn run_parry_battle(
    battle: &mut ParryBattle,
    controllers: &mut [&mut dyn ParryController],
) -> Result<BattleOutcome, BattleError> {
    if battle.phase() == ParryPhase::WaitingForStart {
        battle.start()?;
    }

    let limit = battle.config().max_decisions;
    for decisions in 0..limit {
        if let Some(outcome) = battle.outcome() {
            debug!(decisions, winner = %outcome.winner, "parry battle finished");
            return Ok(outcome);
        }

        let (actor, decision) = {
            let event = battle.events().last().ok_or(BattleError::UnexpectedEvent)?;
            let entity = event.kind().awaiting().ok_or(BattleError::UnexpectedEvent)?;
            let actor = battle.state(entity)?.clone();
            let controller = controller_for(controllers, entity)?;
            let decision = match event.kind() {
                ParryEventKind::AwaitingMove { .. } => {
                    Decision::Move(controller.choose_move(&actor, event))
                }
                _ => Decision::Parry(controller.choose_parry(&actor, event)),
            };
            (actor, decision)
        };

        match decision {
            Decision::Move(mv) => battle.make_move(&actor, mv)?,
            Decision::Parry(attempt) => battle.make_parry_choice(&actor, attempt)?,
        }
    }

    battle
        .outcome()
        .ok_or(BattleError::DecisionLimit { limit })
}

fn controller_for<'a>(
    controllers: &'a mut [&mut dyn ParryController],
    entity: EntityId,
) -> Result<&'a mut dyn ParryController, BattleError> {
    match controllers.get_mut(entity.index()) {
        Some(controller) => Ok(&mut **controller),
        None => Err(BattleError::UnknownEntity(entity)),
    }
}
