use std::sync::Arc;

use crate::config::BattleConfig;
use crate::entity::{EntityId, Schedulable, Snapshot, StateBuilder};

use super::moves::{AttributeKind, Move, Stack};

/// How a reference controller picks moves for a combatant.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveStrategy {
    #[default]
    UseFirst,
    Cycle,
}

/// Static description of a wind-up combatant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindUpAttributes {
    pub id: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    pub max_hp: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub strategy: MoveStrategy,
    pub moves: Vec<Arc<Move>>,
}

impl WindUpAttributes {
    pub fn new(id: impl Into<String>, name: impl Into<String>, max_hp: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            max_hp,
            strategy: MoveStrategy::default(),
            moves: Vec::new(),
        }
    }

    pub fn with_move(mut self, mv: impl Into<Arc<Move>>) -> Self {
        self.moves.push(mv.into());
        self
    }

    pub fn with_strategy(mut self, strategy: MoveStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Moves that can be chosen in battle, in catalog order.
    pub fn usable_moves(&self) -> impl Iterator<Item = &Arc<Move>> {
        self.moves.iter().filter(|mv| mv.is_usable())
    }

    pub fn usable_move(&self, id: &str) -> Option<&Arc<Move>> {
        self.usable_moves().find(|mv| mv.id == id)
    }

    /// Base max HP plus every passive boost.
    pub fn effective_max_hp(&self) -> u32 {
        self.moves
            .iter()
            .fold(self.max_hp, |hp, mv| hp.saturating_add(mv.max_hp_boost()))
    }
}

/// Snapshot of one wind-up combatant.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindUpState {
    id: EntityId,
    hp: u32,
    /// Defense of the move currently winding up.
    defense: u32,
    attributes: Arc<WindUpAttributes>,
    delay_remaining: u32,
    active_move: Option<Arc<Move>>,
    first_to_act: bool,
    follower_offset: f32,
    stacks: Vec<Stack>,
}

impl WindUpState {
    /// Fresh state at full (boosted) health with nothing scheduled.
    pub fn from_attributes(attributes: Arc<WindUpAttributes>) -> Self {
        Self {
            id: EntityId::default(),
            hp: attributes.effective_max_hp(),
            defense: 0,
            attributes,
            delay_remaining: 0,
            active_move: None,
            first_to_act: false,
            follower_offset: BattleConfig::DEFAULT_FOLLOWER_TIE_BREAK,
            stacks: Vec::new(),
        }
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.attributes.effective_max_hp()
    }

    pub fn defense(&self) -> u32 {
        self.defense
    }

    pub fn attributes(&self) -> &Arc<WindUpAttributes> {
        &self.attributes
    }

    pub fn delay_remaining(&self) -> u32 {
        self.delay_remaining
    }

    pub fn active_move(&self) -> Option<&Arc<Move>> {
        self.active_move.as_ref()
    }

    pub fn first_to_act(&self) -> bool {
        self.first_to_act
    }

    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    /// The stack left by a specific move.
    pub fn stack_for(&self, move_id: &str) -> Option<&Stack> {
        self.stacks.iter().find(|stack| stack.applied.id == move_id)
    }

    /// The first stack of the given attribute kind.
    pub fn stack_of(&self, kind: AttributeKind) -> Option<&Stack> {
        self.stacks.iter().find(|stack| stack.kind() == kind)
    }

    pub fn is_defeated(&self) -> bool {
        self.hp == 0
    }
}

impl Snapshot for WindUpState {
    type Builder = WindUpStateBuilder;

    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.attributes.name
    }

    fn to_builder(&self) -> WindUpStateBuilder {
        WindUpStateBuilder {
            state: self.clone(),
        }
    }
}

impl Schedulable for WindUpState {
    fn can_act(&self) -> bool {
        !self.is_defeated()
    }

    fn time_to_next_turn(&self) -> f32 {
        let offset = if self.first_to_act {
            0.0
        } else {
            self.follower_offset
        };
        self.delay_remaining as f32 + offset
    }
}

/// Produces the next [`WindUpState`].
#[derive(Clone, Debug)]
pub struct WindUpStateBuilder {
    state: WindUpState,
}

impl WindUpStateBuilder {
    pub fn set_hp(mut self, hp: u32) -> Self {
        self.state.hp = hp;
        self
    }

    pub fn take_damage(mut self, amount: u32) -> Self {
        self.state.hp = self.state.hp.saturating_sub(amount);
        self
    }

    /// Restores HP up to the effective max.
    pub fn heal(mut self, amount: u32) -> Self {
        let max_hp = self.state.max_hp();
        self.state.hp = self.state.hp.saturating_add(amount).min(max_hp);
        self
    }

    /// Winds up `mv`: it becomes the active move, its defense applies and it
    /// lands after `delay` ticks.
    pub fn schedule(mut self, mv: Arc<Move>, delay: u32) -> Self {
        self.state.defense = mv.defense();
        self.state.delay_remaining = delay;
        self.state.active_move = Some(mv);
        self
    }

    pub fn clear_active_move(mut self) -> Self {
        self.state.active_move = None;
        self.state.defense = 0;
        self
    }

    pub fn time_passed(mut self, elapsed: u32) -> Self {
        self.state.delay_remaining = self.state.delay_remaining.saturating_sub(elapsed);
        self
    }

    pub fn add_delay(mut self, ticks: u32) -> Self {
        self.state.delay_remaining = self.state.delay_remaining.saturating_add(ticks);
        self
    }

    pub fn set_first_to_act(mut self, first: bool) -> Self {
        self.state.first_to_act = first;
        self
    }

    pub fn set_follower_offset(mut self, offset: f32) -> Self {
        self.state.follower_offset = offset;
        self
    }

    /// Adds or refreshes the stack for `mv`. Moves that apply no stacks are
    /// ignored.
    pub fn top_up_stack(mut self, mv: &Arc<Move>) -> Self {
        let stacks = mv.attribute.stacks_to_apply();
        if stacks == 0 {
            return self;
        }
        match self
            .state
            .stacks
            .iter_mut()
            .find(|stack| stack.applied.id == mv.id)
        {
            Some(stack) => *stack = stack.topped_up(stacks),
            None => self.state.stacks.push(Stack {
                applied: Arc::clone(mv),
                count: stacks,
            }),
        }
        self
    }

    /// Uses up one stack of `move_id`, dropping the stack when it runs out.
    pub fn decrement_stack(mut self, move_id: &str) -> Self {
        if let Some(index) = self
            .state
            .stacks
            .iter()
            .position(|stack| stack.applied.id == move_id)
        {
            let stack = &mut self.state.stacks[index];
            stack.count = stack.count.saturating_sub(1);
            if stack.count == 0 {
                self.state.stacks.remove(index);
            }
        }
        self
    }
}

impl StateBuilder for WindUpStateBuilder {
    type State = WindUpState;

    fn set_id(mut self, id: EntityId) -> Self {
        self.state.id = id;
        self
    }

    fn build(self) -> WindUpState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::windup::moves::Attribute;

    fn bleed() -> Arc<Move> {
        Arc::new(
            Move::new("cut", "Cut")
                .with_stats(3, 0, 2)
                .with_attribute(Attribute::Bleed {
                    stacks: 2,
                    damage: 5,
                }),
        )
    }

    fn fighter() -> WindUpState {
        let attributes = WindUpAttributes::new("fighter", "Fighter", 30)
            .with_move(Move::new("jab", "Jab").with_stats(4, 1, 2))
            .with_move(Move::new("vigor", "Vigor").with_attribute(Attribute::MaxHpBoost { amount: 10 }));
        WindUpState::from_attributes(Arc::new(attributes))
    }

    #[test]
    fn max_hp_boost_raises_starting_hp() {
        let state = fighter();
        assert_eq!(state.max_hp(), 40);
        assert_eq!(state.hp(), 40);
        assert_eq!(state.attributes().usable_moves().count(), 1);
    }

    #[test]
    fn heal_is_capped_at_max() {
        let hurt = fighter().to_builder().take_damage(15).build();
        assert_eq!(hurt.hp(), 25);
        let healed = hurt.to_builder().heal(100).build();
        assert_eq!(healed.hp(), 40);
    }

    #[test]
    fn stacks_top_up_and_drain() {
        let cut = bleed();
        let state = fighter().to_builder().top_up_stack(&cut).build();
        assert_eq!(state.stack_for("cut").map(|s| s.count), Some(2));

        let drained = state.to_builder().decrement_stack("cut").build();
        assert_eq!(drained.stack_for("cut").map(|s| s.count), Some(1));

        let refreshed = drained.to_builder().top_up_stack(&cut).top_up_stack(&cut).build();
        assert_eq!(refreshed.stacks().len(), 1);
        assert_eq!(refreshed.stack_of(AttributeKind::Bleed).map(|s| s.count), Some(2));

        let gone = refreshed
            .to_builder()
            .decrement_stack("cut")
            .decrement_stack("cut")
            .build();
        assert!(gone.stacks().is_empty());
    }

    #[test]
    fn zero_count_moves_leave_no_stack() {
        let empty = Arc::new(Move::new("nick", "Nick").with_attribute(Attribute::Bleed {
            stacks: 0,
            damage: 1,
        }));
        let state = fighter().to_builder().top_up_stack(&empty).build();
        assert!(state.stacks().is_empty());
    }

    #[test]
    fn scheduling_sets_defense_and_delay() {
        let guard = Arc::new(Move::new("guard", "Guard").with_stats(1, 6, 3));
        let state = fighter().to_builder().schedule(guard, 3).build();
        assert_eq!(state.defense(), 6);
        assert_eq!(state.delay_remaining(), 3);
        assert_eq!(state.time_to_next_turn(), 3.5);

        let cleared = state.to_builder().clear_active_move().set_first_to_act(true).build();
        assert_eq!(cleared.defense(), 0);
        assert!(cleared.active_move().is_none());
        assert_eq!(cleared.time_to_next_turn(), 3.0);
    }
}
