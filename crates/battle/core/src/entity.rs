//! Entities and their immutable state snapshots.
//!
//! An [`Entity`] owns exactly one current snapshot. Snapshots are never
//! mutated: every change goes through the snapshot's [`StateBuilder`] and
//! the resulting value replaces the old one wholesale. Old snapshots live on
//! only inside the events that captured them.

use std::fmt;

/// Identifier of a combatant within one battle.
///
/// Assigned once at battle construction from the entity's position in the
/// entity list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl EntityId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An immutable point-in-time view of one combatant.
pub trait Snapshot: Clone {
    type Builder: StateBuilder<State = Self>;

    fn id(&self) -> EntityId;

    /// Display name of the combatant.
    fn name(&self) -> &str;

    fn to_builder(&self) -> Self::Builder;
}

/// Collects changes to a snapshot and produces the next one.
pub trait StateBuilder: Sized {
    type State;

    fn set_id(self, id: EntityId) -> Self;

    fn build(self) -> Self::State;
}

/// Scheduling view used by the battle queue.
pub trait Schedulable {
    fn can_act(&self) -> bool;

    fn time_to_next_turn(&self) -> f32;
}

/// A live combatant holding its current snapshot.
#[derive(Clone, Debug)]
pub struct Entity<S> {
    state: S,
}

impl<S: Snapshot> Entity<S> {
    pub fn new(state: S) -> Self {
        Self { state }
    }

    pub fn id(&self) -> EntityId {
        self.state.id()
    }

    pub fn name(&self) -> &str {
        self.state.name()
    }

    /// The current snapshot.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Derives the next snapshot from the current one and swaps it in.
    pub(crate) fn transition(&mut self, change: impl FnOnce(S::Builder) -> S::Builder) {
        self.state = change(self.state.to_builder()).build();
    }

    pub(crate) fn set_id(&mut self, id: EntityId) {
        self.transition(|builder| builder.set_id(id));
    }
}

impl<S: Schedulable> Schedulable for Entity<S> {
    fn can_act(&self) -> bool {
        self.state.can_act()
    }

    fn time_to_next_turn(&self) -> f32 {
        self.state.time_to_next_turn()
    }
}
