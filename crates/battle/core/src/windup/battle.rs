use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::config::BattleConfig;
use crate::engine::{Battle, BattleCore, BattleOutcome};
use crate::entity::{Entity, EntityId, Snapshot};
use crate::error::BattleError;
use crate::queue::{BattleQueue, QueuePriority};
use crate::random::RandomSource;

use super::event::WindUpEventKind;
use super::moves::{Attribute, AttributeKind, Move};
use super::rules::{compute_damage, compute_reflect};
use super::state::{WindUpAttributes, WindUpState};

/// Where a wind-up battle is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WindUpPhase {
    WaitingForStart,
    WaitingForMove,
    BattleOver,
    /// The turn loop found nobody able to act and stopped.
    Halted,
}

/// Two-combatant battle where every move winds up for a number of ticks.
///
/// After [`Battle::start`], answer each [`WindUpEventKind::AwaitingMove`] with
/// [`WindUpBattle::schedule_move`]. The chosen move's defense protects its
/// user until the move lands.
pub struct WindUpBattle {
    core: BattleCore<WindUpState, WindUpEventKind>,
    queue: BattleQueue,
    config: BattleConfig,
    phase: WindUpPhase,
    awaiting: Option<EntityId>,
    outcome: Option<BattleOutcome>,
}

impl WindUpBattle {
    pub fn new(
        first: impl Into<Arc<WindUpAttributes>>,
        second: impl Into<Arc<WindUpAttributes>>,
        rng: impl RandomSource + 'static,
    ) -> Self {
        let (first, second): (Arc<WindUpAttributes>, Arc<WindUpAttributes>) =
            (first.into(), second.into());
        let states = [first, second].map(WindUpState::from_attributes);
        let core = BattleCore::new(states, Box::new(rng));
        let queue = BattleQueue::new(core.entities().iter().map(Entity::id), QueuePriority::Low);

        Self {
            core,
            queue,
            config: BattleConfig::default(),
            phase: WindUpPhase::WaitingForStart,
            awaiting: None,
            outcome: None,
        }
    }

    pub fn with_config(mut self, config: BattleConfig) -> Self {
        let offset = config.follower_tie_break;
        self.core
            .transition_all(|b| b.set_follower_offset(offset));
        self.config = config;
        self
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn phase(&self) -> WindUpPhase {
        self.phase
    }

    /// The entity that must schedule a move next.
    pub fn awaiting(&self) -> Option<EntityId> {
        self.awaiting
    }

    /// Schedulable entities from next to act onwards, with their time to
    /// next turn.
    pub fn turn_order(&self) -> Vec<(EntityId, f32)> {
        self.queue.order(self.core.entities())
    }

    pub fn state(&self, id: EntityId) -> Result<&WindUpState, BattleError> {
        self.core
            .entity(id)
            .map(Entity::state)
            .ok_or(BattleError::UnknownEntity(id))
    }

    /// Winds up a move for the awaiting entity.
    ///
    /// A move the entity does not know, or cannot use in battle, is replaced
    /// by its first usable move.
    pub fn schedule_move(&mut self, actor: &WindUpState, chosen: &Move) -> Result<(), BattleError> {
        let actor = actor.id();
        self.ensure_awaiting(actor)?;

        let attributes = Arc::clone(self.state(actor)?.attributes());
        let mv = match attributes.usable_move(&chosen.id) {
            Some(mv) => Arc::clone(mv),
            None => {
                let Some(fallback) = attributes.usable_moves().next() else {
                    warn!(%actor, requested = %chosen.id, "entity has no usable move");
                    return Err(BattleError::NoUsableMove(actor));
                };
                warn!(%actor, requested = %chosen.id, fallback = %fallback.id, "unusable move; using first usable move");
                Arc::clone(fallback)
            }
        };

        let delay = mv.delay().max(self.config.min_move_delay);
        debug!(%actor, chosen = %mv.id, delay, "move scheduled");
        self.core
            .transition(actor, |b| b.schedule(Arc::clone(&mv), delay))?;
        self.core.send_event(WindUpEventKind::MoveChosen {
            entity: actor,
            chosen: mv,
        });

        self.advance()
    }

    /// Concedes the battle: `actor` takes lethal damage and the opponent wins.
    pub fn forfeit(&mut self, actor: &WindUpState) -> Result<(), BattleError> {
        let actor = actor.id();
        let rejection = match self.phase {
            WindUpPhase::WaitingForStart => Some(BattleError::NotStarted),
            WindUpPhase::BattleOver => Some(BattleError::BattleOver),
            WindUpPhase::Halted => Some(BattleError::NoSchedulableEntity),
            WindUpPhase::WaitingForMove => None,
        };
        if let Some(error) = rejection {
            warn!(%actor, phase = %self.phase, %error, "forfeit rejected");
            return Err(error);
        }
        let winner = self
            .core
            .opponent(actor)
            .ok_or(BattleError::UnknownEntity(actor))?;

        let damage = self.state(actor)?.hp();
        self.core.transition(actor, |b| b.take_damage(damage))?;
        self.core.send_event(WindUpEventKind::BonusDamage {
            entity: actor,
            damage,
        });
        self.end(winner, actor);
        Ok(())
    }

    fn ensure_awaiting(&self, actor: EntityId) -> Result<(), BattleError> {
        let rejection = match self.phase {
            WindUpPhase::WaitingForStart => Some(BattleError::NotStarted),
            WindUpPhase::BattleOver => Some(BattleError::BattleOver),
            WindUpPhase::Halted => Some(BattleError::NoSchedulableEntity),
            WindUpPhase::WaitingForMove if self.awaiting != Some(actor) => {
                Some(BattleError::not_current_actor(actor, self.awaiting))
            }
            WindUpPhase::WaitingForMove => None,
        };

        match rejection {
            Some(error) => {
                warn!(%actor, expected = ?self.awaiting, phase = %self.phase, %error, "move rejected");
                Err(error)
            }
            None => Ok(()),
        }
    }

    /// Runs one turn: time passes, the next entity's move lands (if any),
    /// then that entity is asked for a new move.
    fn advance(&mut self) -> Result<(), BattleError> {
        self.awaiting = None;

        let Some(mover) = self.queue.next_entity(self.core.entities()) else {
            error!("no entity is able to act; halting battle");
            self.phase = WindUpPhase::Halted;
            return Err(BattleError::NoSchedulableEntity);
        };
        let other = self
            .core
            .opponent(mover)
            .ok_or(BattleError::UnknownEntity(mover))?;

        let ticks = self.state(mover)?.delay_remaining();
        self.core.transition_all(|b| b.time_passed(ticks));
        self.core.send_event(WindUpEventKind::TicksPassed { ticks });

        if let Some(active) = self.state(mover)?.active_move().cloned() {
            debug!(entity = %mover, active = %active.id, ticks, "move lands");
            if self.resolve(mover, other, active)? {
                return Ok(());
            }
        }

        self.awaiting = Some(mover);
        self.phase = WindUpPhase::WaitingForMove;
        self.core
            .send_event(WindUpEventKind::AwaitingMove { entity: mover });
        Ok(())
    }

    /// Lands `mv` from `attacker` on `defender`. Returns true if the battle
    /// ended.
    fn resolve(
        &mut self,
        attacker: EntityId,
        defender: EntityId,
        mv: Arc<Move>,
    ) -> Result<bool, BattleError> {
        if mv.kind() == AttributeKind::Heal {
            self.heal(attacker, &mv, mv.effect())?;
        } else {
            let defense = self.state(defender)?.active_move().cloned();
            let damage = compute_damage(&mv, defense.as_deref());

            if damage > 0 && mv.attribute.applies_stacks() {
                let count = self
                    .core
                    .transition(defender, |b| b.top_up_stack(&mv))?
                    .stack_for(&mv.id)
                    .map_or(0, |stack| stack.count);
                self.core.send_event(WindUpEventKind::StackModified {
                    entity: defender,
                    applied: Arc::clone(&mv),
                    count,
                });
            }

            self.core
                .transition(defender, |b| b.take_damage(damage))?;
            self.core.send_event(WindUpEventKind::MoveOccurred {
                attacker,
                defender,
                attack: Arc::clone(&mv),
                defense: defense.clone(),
                damage,
            });

            if let Attribute::Stun { ticks } = mv.attribute {
                let delay_remaining = self
                    .core
                    .transition(defender, |b| b.add_delay(ticks))?
                    .delay_remaining();
                self.core.send_event(WindUpEventKind::DelayChanged {
                    entity: defender,
                    delay_remaining,
                    delta: ticks,
                });
            }

            // A dead defender has nothing left to reflect with.
            let deflected = compute_reflect(&mv, defense.as_deref());
            if deflected > 0 && !self.state(defender)?.is_defeated() {
                self.core
                    .transition(attacker, |b| b.take_damage(deflected))?;
                self.core.send_event(WindUpEventKind::BonusDamage {
                    entity: attacker,
                    damage: deflected,
                });
            }

            if mv.kind() == AttributeKind::Vampiric && damage > 0 {
                self.heal(attacker, &mv, damage / 2)?;
            }
        }

        self.core
            .transition(attacker, |b| b.clear_active_move())?;

        if self.state(defender)?.is_defeated() {
            self.end(attacker, defender);
            return Ok(true);
        }

        if let Some(stack) = self.state(attacker)?.stack_of(AttributeKind::Bleed).cloned() {
            let applied = stack.applied;
            let remaining = stack.count.saturating_sub(1);
            self.core
                .transition(attacker, |b| b.decrement_stack(&applied.id))?;
            let damage = applied.attribute.damage_on_apply();
            self.core.send_event(WindUpEventKind::StackModified {
                entity: attacker,
                applied,
                count: remaining,
            });
            self.core
                .transition(attacker, |b| b.take_damage(damage))?;
            self.core.send_event(WindUpEventKind::BonusDamage {
                entity: attacker,
                damage,
            });
        }

        if self.state(attacker)?.is_defeated() {
            self.end(defender, attacker);
            return Ok(true);
        }

        Ok(false)
    }

    /// Heals up to max HP and reports the amount actually restored.
    fn heal(&mut self, entity: EntityId, source: &Arc<Move>, amount: u32) -> Result<(), BattleError> {
        let state = self.state(entity)?;
        if state.is_defeated() {
            return Ok(());
        }
        let before = state.hp();
        let after = self.core.transition(entity, |b| b.heal(amount))?.hp();
        self.core.send_event(WindUpEventKind::Healed {
            entity,
            source: Arc::clone(source),
            amount: after - before,
        });
        Ok(())
    }

    fn end(&mut self, winner: EntityId, loser: EntityId) {
        let outcome = BattleOutcome { winner, loser };
        self.phase = WindUpPhase::BattleOver;
        self.awaiting = None;
        self.outcome = Some(outcome);
        debug!(%winner, %loser, "battle ended");
        self.core.send_event(WindUpEventKind::BattleEnded(outcome));
    }
}

impl Battle for WindUpBattle {
    type State = WindUpState;
    type EventKind = WindUpEventKind;

    fn core(&self) -> &BattleCore<WindUpState, WindUpEventKind> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BattleCore<WindUpState, WindUpEventKind> {
        &mut self.core
    }

    fn start(&mut self) -> Result<(), BattleError> {
        if self.phase != WindUpPhase::WaitingForStart {
            warn!(phase = %self.phase, "battle already started");
            return Err(BattleError::AlreadyStarted);
        }
        if let Some(leader) = self.core.entities().first().map(Entity::id) {
            self.core
                .transition(leader, |b| b.set_first_to_act(true))?;
        }
        self.phase = WindUpPhase::WaitingForMove;
        self.core.send_event(WindUpEventKind::BattleStarted);
        self.advance()
    }

    fn is_over(&self) -> bool {
        self.phase == WindUpPhase::BattleOver
    }

    fn outcome(&self) -> Option<BattleOutcome> {
        self.outcome
    }
}
