//! Combatant data for dice/parry battles.

use std::sync::Arc;

use strum::IntoEnumIterator;

use crate::dice::{Dice, DiceResult};
use crate::entity::{EntityId, Schedulable, Snapshot, StateBuilder};

/// Moves available on a combatant's turn.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParryMove {
    Attack,
    /// Roll the defend die and add it to defense. Only allowed at zero defense.
    Defend,
    /// Drop all defense now; attack with a bonus roll on the next turn.
    Charge,
}

/// Static description of a combatant. Never changes during a battle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParryAttributes {
    pub id: String,
    pub name: String,
    pub max_hp: u32,
    pub attack: Dice,
    pub defend: Dice,
    pub agility: Dice,
    pub parry: Dice,
}

impl ParryAttributes {
    /// A combatant with the standard dice set: attack 1d6, defend 1d8,
    /// agility 1d10, parry 1d4.
    pub fn new(id: impl Into<String>, name: impl Into<String>, max_hp: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            max_hp,
            attack: Dice::new(1, 6),
            defend: Dice::new(1, 8),
            agility: Dice::new(1, 10),
            parry: Dice::new(1, 4),
        }
    }

    pub fn with_attack(mut self, dice: Dice) -> Self {
        self.attack = dice;
        self
    }

    pub fn with_defend(mut self, dice: Dice) -> Self {
        self.defend = dice;
        self
    }

    pub fn with_agility(mut self, dice: Dice) -> Self {
        self.agility = dice;
        self
    }

    pub fn with_parry(mut self, dice: Dice) -> Self {
        self.parry = dice;
        self
    }
}

/// Snapshot of one dice/parry combatant.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParryState {
    id: EntityId,
    hp: u32,
    defense: u32,
    attributes: Arc<ParryAttributes>,
    initiative: i32,
    turn_delay: u32,
    next_move_is_charge: bool,
}

impl ParryState {
    /// Fresh state at full health with no defense.
    pub fn from_attributes(attributes: Arc<ParryAttributes>) -> Self {
        Self {
            id: EntityId::default(),
            hp: attributes.max_hp,
            defense: 0,
            attributes,
            initiative: 0,
            turn_delay: 0,
            next_move_is_charge: false,
        }
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn defense(&self) -> u32 {
        self.defense
    }

    pub fn attributes(&self) -> &Arc<ParryAttributes> {
        &self.attributes
    }

    pub fn initiative(&self) -> i32 {
        self.initiative
    }

    pub fn turn_delay(&self) -> u32 {
        self.turn_delay
    }

    pub fn next_move_is_charge(&self) -> bool {
        self.next_move_is_charge
    }

    pub fn is_defeated(&self) -> bool {
        self.hp == 0
    }

    pub fn can_use(&self, mv: ParryMove) -> bool {
        match mv {
            ParryMove::Attack | ParryMove::Charge => true,
            ParryMove::Defend => self.defense == 0,
        }
    }

    pub fn valid_moves(&self) -> Vec<ParryMove> {
        ParryMove::iter().filter(|mv| self.can_use(*mv)).collect()
    }
}

impl Snapshot for ParryState {
    type Builder = ParryStateBuilder;

    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.attributes.name
    }

    fn to_builder(&self) -> ParryStateBuilder {
        ParryStateBuilder {
            state: self.clone(),
        }
    }
}

impl Schedulable for ParryState {
    fn can_act(&self) -> bool {
        !self.is_defeated()
    }

    fn time_to_next_turn(&self) -> f32 {
        self.turn_delay as f32
    }
}

/// Produces the next [`ParryState`].
#[derive(Clone, Debug)]
pub struct ParryStateBuilder {
    state: ParryState,
}

impl ParryStateBuilder {
    pub fn set_hp(mut self, hp: u32) -> Self {
        self.state.hp = hp;
        self
    }

    /// Defense soaks damage first unless bypassed; HP stops at zero.
    pub fn take_damage(mut self, amount: u32, bypass_defense: bool) -> Self {
        let mut amount = amount;
        if !bypass_defense {
            let absorbed = amount.min(self.state.defense);
            self.state.defense -= absorbed;
            amount -= absorbed;
        }
        self.state.hp = self.state.hp.saturating_sub(amount);
        self
    }

    pub fn add_defense(mut self, amount: u32) -> Self {
        self.state.defense = self.state.defense.saturating_add(amount);
        self
    }

    pub fn set_initiative(mut self, initiative: i32) -> Self {
        self.state.initiative = initiative;
        self
    }

    pub fn set_turn_delay(mut self, delay: u32) -> Self {
        self.state.turn_delay = delay;
        self
    }

    pub fn add_turn_delay(mut self, delay: u32) -> Self {
        self.state.turn_delay = self.state.turn_delay.saturating_add(delay);
        self
    }

    pub fn time_passed(mut self, elapsed: u32) -> Self {
        self.state.turn_delay = self.state.turn_delay.saturating_sub(elapsed);
        self
    }

    /// Drops all defense and queues a charge attack.
    pub fn set_charging(mut self) -> Self {
        self.state.defense = 0;
        self.state.next_move_is_charge = true;
        self
    }

    pub fn clear_charging(mut self) -> Self {
        self.state.next_move_is_charge = false;
        self
    }
}

impl StateBuilder for ParryStateBuilder {
    type State = ParryState;

    fn set_id(mut self, id: EntityId) -> Self {
        self.state.id = id;
        self
    }

    fn build(self) -> ParryState {
        self.state
    }
}

/// Dice rolled for one attack.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackSummary {
    /// `Attack` for a plain attack, `Charge` for a landing charge.
    pub kind: ParryMove,
    pub agility: DiceResult,
    pub damage: DiceResult,
    pub charge_bonus: Option<DiceResult>,
}

impl AttackSummary {
    pub fn is_miss(&self) -> bool {
        self.agility.final_result == 1
    }

    pub fn is_critical(&self) -> bool {
        self.agility.final_result == self.agility.dice.max_roll()
    }

    pub fn total_damage(&self) -> u32 {
        let bonus = self
            .charge_bonus
            .as_ref()
            .map_or(0, |bonus| bonus.final_result);
        self.damage.final_result.saturating_add(bonus).max(0) as u32
    }

    /// Only plain attacks can be parried, and only by a roll that matches
    /// the full damage.
    pub fn is_parried_by(&self, parry: &DiceResult) -> bool {
        self.kind == ParryMove::Attack && parry.final_result >= self.total_damage() as i32
    }
}

/// Why the defender got no chance to parry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoParryReason {
    AttackWasCharge,
    DefenderIsCharging,
    AttackWasCritical,
}
