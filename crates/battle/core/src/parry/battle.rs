use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::config::BattleConfig;
use crate::engine::{Battle, BattleCore, BattleOutcome};
use crate::entity::{Entity, EntityId, Snapshot};
use crate::error::BattleError;
use crate::queue::{BattleQueue, QueuePriority};
use crate::random::RandomSource;

use super::event::ParryEventKind;
use super::state::{AttackSummary, NoParryReason, ParryAttributes, ParryMove, ParryState};

/// Where a dice/parry battle is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParryPhase {
    WaitingForStart,
    WaitingForMove,
    WaitingForParryChoice,
    BattleOver,
    /// The turn loop found nobody able to act and stopped.
    Halted,
}

/// An attack waiting on the defender's parry decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingAttack {
    pub attacker: EntityId,
    pub defender: EntityId,
    pub summary: AttackSummary,
}

/// Two-combatant dice battle with parries.
///
/// Drive it with [`Battle::start`], then answer every
/// [`ParryEventKind::AwaitingMove`] with [`ParryBattle::make_move`] and every
/// [`ParryEventKind::ParryOpportunity`] with [`ParryBattle::make_parry_choice`].
pub struct ParryBattle {
    core: BattleCore<ParryState, ParryEventKind>,
    queue: BattleQueue,
    config: BattleConfig,
    phase: ParryPhase,
    current: Option<EntityId>,
    pending: Option<PendingAttack>,
    outcome: Option<BattleOutcome>,
}

impl ParryBattle {
    pub fn new(
        first: impl Into<Arc<ParryAttributes>>,
        second: impl Into<Arc<ParryAttributes>>,
        rng: impl RandomSource + 'static,
    ) -> Self {
        let (first, second): (Arc<ParryAttributes>, Arc<ParryAttributes>) =
            (first.into(), second.into());
        let states = [first, second].map(ParryState::from_attributes);
        let core = BattleCore::new(states, Box::new(rng));
        let queue = BattleQueue::new(core.entities().iter().map(Entity::id), QueuePriority::Low);

        Self {
            core,
            queue,
            config: BattleConfig::default(),
            phase: ParryPhase::WaitingForStart,
            current: None,
            pending: None,
            outcome: None,
        }
    }

    pub fn with_config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn phase(&self) -> ParryPhase {
        self.phase
    }

    /// The entity whose decision the battle is waiting on.
    pub fn current(&self) -> Option<EntityId> {
        self.current
    }

    pub fn pending(&self) -> Option<&PendingAttack> {
        self.pending.as_ref()
    }

    /// Schedulable entities from next to act onwards, with their time to
    /// next turn.
    pub fn turn_order(&self) -> Vec<(EntityId, f32)> {
        self.queue.order(self.core.entities())
    }

    pub fn state(&self, id: EntityId) -> Result<&ParryState, BattleError> {
        self.core
            .entity(id)
            .map(Entity::state)
            .ok_or(BattleError::UnknownEntity(id))
    }

    /// Plays a move for the entity on turn.
    ///
    /// Illegal moves are replaced by [`ParryMove::Attack`]. Calls from any
    /// other entity, or outside the move phase, change nothing.
    pub fn make_move(&mut self, actor: &ParryState, requested: ParryMove) -> Result<(), BattleError> {
        let actor = actor.id();
        self.ensure_turn(actor, ParryPhase::WaitingForMove)?;

        let state = self.state(actor)?;
        let used = if state.can_use(requested) {
            requested
        } else {
            warn!(%actor, %requested, "illegal move; attacking instead");
            ParryMove::Attack
        };
        let defense_lost = state.defense();
        let defend_dice = state.attributes().defend;

        let turn_delay = self.config.turn_delay;
        self.core
            .transition(actor, |b| b.add_turn_delay(turn_delay))?;
        self.core.send_event(ParryEventKind::MoveUsed {
            entity: actor,
            requested,
            used,
        });

        match used {
            ParryMove::Attack => {
                if !self.resolve_attack(actor, ParryMove::Attack)? {
                    return Ok(());
                }
            }
            ParryMove::Defend => {
                let roll = defend_dice.roll_detailed(self.core.rng());
                let amount = roll.final_result.max(0) as u32;
                self.core.transition(actor, |b| b.add_defense(amount))?;
                self.core.send_event(ParryEventKind::DefenseRaised {
                    entity: actor,
                    roll,
                });
            }
            ParryMove::Charge => {
                self.core.transition(actor, |b| b.set_charging())?;
                self.core.send_event(ParryEventKind::ChargeBegan {
                    entity: actor,
                    defense_lost,
                });
            }
        }

        self.advance()
    }

    /// Answers a parry opportunity for the defending entity.
    pub fn make_parry_choice(&mut self, defender: &ParryState, attempt: bool) -> Result<(), BattleError> {
        let defender = defender.id();
        self.ensure_turn(defender, ParryPhase::WaitingForParryChoice)?;
        let Some(pending) = self.pending.take() else {
            warn!(%defender, "no attack to parry");
            return Err(BattleError::NoPendingAttack);
        };

        if attempt {
            let parry_dice = self.state(defender)?.attributes().parry;
            let roll = parry_dice.roll_detailed(self.core.rng());
            let success = pending.summary.is_parried_by(&roll);
            self.core.send_event(ParryEventKind::ParryResolved {
                defender,
                roll,
                success,
            });
            if !success {
                // A failed parry costs the defender a turn.
                let penalty = self.config.turn_delay;
                self.apply_hit(pending.attacker, defender, pending.summary, penalty)?;
            }
        } else {
            self.apply_hit(pending.attacker, defender, pending.summary, 0)?;
        }

        self.advance()
    }

    fn ensure_turn(&self, actor: EntityId, phase: ParryPhase) -> Result<(), BattleError> {
        let rejection = match self.phase {
            ParryPhase::WaitingForStart => Some(BattleError::NotStarted),
            ParryPhase::BattleOver => Some(BattleError::BattleOver),
            ParryPhase::Halted => Some(BattleError::NoSchedulableEntity),
            current if current != phase => Some(match phase {
                ParryPhase::WaitingForParryChoice => BattleError::NotAwaitingParry,
                _ => BattleError::NotAwaitingMove,
            }),
            _ if self.current != Some(actor) => {
                Some(BattleError::not_current_actor(actor, self.current))
            }
            _ => None,
        };

        match rejection {
            Some(error) => {
                warn!(%actor, expected = ?self.current, phase = %self.phase, %error, "decision rejected");
                Err(error)
            }
            None => Ok(()),
        }
    }

    fn roll_initiative(&mut self) -> Result<(), BattleError> {
        let ids: Vec<EntityId> = self.core.entities().iter().map(Entity::id).collect();
        let [first, second] = ids[..] else {
            return Err(BattleError::NoSchedulableEntity);
        };

        let mut decided = false;
        for attempt in 1..=self.config.max_initiative_rolls {
            let mut rolls = Vec::with_capacity(ids.len());
            for &id in &ids {
                let agility = self.state(id)?.attributes().agility;
                let roll = agility.roll_detailed(self.core.rng());
                let initiative = roll.final_result;
                self.core.transition(id, |b| b.set_initiative(initiative))?;
                rolls.push(roll);
            }
            self.core
                .send_event(ParryEventKind::InitiativeRolled { attempt, rolls });

            if self.state(first)?.initiative() != self.state(second)?.initiative() {
                decided = true;
                break;
            }
        }

        if !decided {
            warn!(
                attempts = self.config.max_initiative_rolls,
                "initiative still tied; deciding by coin flip"
            );
            let first_wins = self.core.rng().coin_flip();
            let (a, b) = if first_wins { (2, 1) } else { (1, 2) };
            self.core.transition(first, |s| s.set_initiative(a))?;
            self.core.transition(second, |s| s.set_initiative(b))?;
        }

        let leader = if self.state(first)?.initiative() > self.state(second)?.initiative() {
            first
        } else {
            second
        };
        for &id in &ids {
            let delay = u32::from(id != leader);
            self.core.transition(id, |b| b.set_turn_delay(delay))?;
        }
        debug!(%leader, by_coin_flip = !decided, "initiative decided");
        self.core.send_event(ParryEventKind::InitiativeDecided {
            first: leader,
            by_coin_flip: !decided,
        });
        Ok(())
    }

    /// Runs turns until the battle needs a decision or ends.
    fn advance(&mut self) -> Result<(), BattleError> {
        loop {
            if self.check_battle_over() {
                return Ok(());
            }

            let Some(next) = self.queue.next_entity(self.core.entities()) else {
                error!("no entity is able to act; halting battle");
                self.phase = ParryPhase::Halted;
                self.current = None;
                return Err(BattleError::NoSchedulableEntity);
            };

            let elapsed = self.state(next)?.turn_delay();
            self.core.transition_all(|b| b.time_passed(elapsed));
            self.current = Some(next);
            self.phase = ParryPhase::WaitingForMove;

            let state = self.state(next)?;
            if state.next_move_is_charge() {
                debug!(entity = %next, elapsed, "charge lands");
                let turn_delay = self.config.turn_delay;
                self.core
                    .transition(next, |b| b.clear_charging().add_turn_delay(turn_delay))?;
                if self.resolve_attack(next, ParryMove::Charge)? {
                    continue;
                }
                return Ok(());
            }

            debug!(entity = %next, elapsed, "awaiting move");
            let valid_moves = state.valid_moves();
            self.core.send_event(ParryEventKind::AwaitingMove {
                entity: next,
                valid_moves,
            });
            return Ok(());
        }
    }

    /// Rolls and applies an attack. Returns false when the battle is now
    /// waiting on a parry decision.
    fn resolve_attack(&mut self, attacker: EntityId, kind: ParryMove) -> Result<bool, BattleError> {
        let defender = self
            .core
            .opponent(attacker)
            .ok_or(BattleError::UnknownEntity(attacker))?;
        let attributes = Arc::clone(self.state(attacker)?.attributes());

        let rng = self.core.rng();
        let agility = attributes.agility.roll_detailed(&mut *rng);
        let damage = attributes.attack.roll_detailed(&mut *rng);
        let charge_bonus = if kind == ParryMove::Charge {
            Some(attributes.defend.roll_detailed(&mut *rng))
        } else {
            None
        };
        let summary = AttackSummary {
            kind,
            agility,
            damage,
            charge_bonus,
        };

        self.core.send_event(ParryEventKind::AttackRolled {
            attacker,
            defender,
            summary: summary.clone(),
        });

        if summary.is_miss() {
            self.core.send_event(ParryEventKind::Missed {
                attacker,
                defender,
                summary,
            });
            return Ok(true);
        }

        let defender_state = self.state(defender)?;
        let reason = if kind == ParryMove::Charge {
            Some(NoParryReason::AttackWasCharge)
        } else if defender_state.next_move_is_charge() {
            Some(NoParryReason::DefenderIsCharging)
        } else if summary.is_critical() {
            Some(NoParryReason::AttackWasCritical)
        } else {
            None
        };

        if let Some(reason) = reason {
            self.core.send_event(ParryEventKind::NoParryOpportunity {
                attacker,
                defender,
                reason,
            });
            self.apply_hit(attacker, defender, summary, 0)?;
            return Ok(true);
        }

        let number_to_hit = summary.total_damage();
        let could_parry = defender_state.attributes().parry.max_roll() >= number_to_hit as i32;
        self.phase = ParryPhase::WaitingForParryChoice;
        self.current = Some(defender);
        self.pending = Some(PendingAttack {
            attacker,
            defender,
            summary,
        });
        debug!(%attacker, %defender, number_to_hit, could_parry, "awaiting parry decision");
        self.core.send_event(ParryEventKind::ParryOpportunity {
            attacker,
            defender,
            number_to_hit,
            could_parry,
        });
        Ok(false)
    }

    fn apply_hit(
        &mut self,
        attacker: EntityId,
        defender: EntityId,
        summary: AttackSummary,
        penalty: u32,
    ) -> Result<(), BattleError> {
        let damage = summary.total_damage();
        let bypass_defense = summary.is_critical();
        let hp_before = self.state(defender)?.hp();
        let hp_after = self
            .core
            .transition(defender, |b| {
                b.take_damage(damage, bypass_defense).add_turn_delay(penalty)
            })?
            .hp();
        self.core.send_event(ParryEventKind::Hit {
            attacker,
            defender,
            summary,
            hp_lost: hp_before - hp_after,
        });
        Ok(())
    }

    fn check_battle_over(&mut self) -> bool {
        if self.phase == ParryPhase::BattleOver {
            return true;
        }
        let Some(loser) = self
            .core
            .entities()
            .iter()
            .find(|entity| entity.state().is_defeated())
            .map(Entity::id)
        else {
            return false;
        };
        let Some(winner) = self.core.opponent(loser) else {
            return false;
        };

        let outcome = BattleOutcome { winner, loser };
        self.phase = ParryPhase::BattleOver;
        self.current = None;
        self.pending = None;
        self.outcome = Some(outcome);
        debug!(%winner, %loser, "battle over");
        self.core.send_event(ParryEventKind::BattleOver(outcome));
        true
    }
}

impl Battle for ParryBattle {
    type State = ParryState;
    type EventKind = ParryEventKind;

    fn core(&self) -> &BattleCore<ParryState, ParryEventKind> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BattleCore<ParryState, ParryEventKind> {
        &mut self.core
    }

    fn start(&mut self) -> Result<(), BattleError> {
        if self.phase != ParryPhase::WaitingForStart {
            warn!(phase = %self.phase, "battle already started");
            return Err(BattleError::AlreadyStarted);
        }
        self.core.send_event(ParryEventKind::BattleStarted);
        self.roll_initiative()?;
        self.advance()
    }

    fn is_over(&self) -> bool {
        self.phase == ParryPhase::BattleOver
    }

    fn outcome(&self) -> Option<BattleOutcome> {
        self.outcome
    }
}
