//! Generic battle engine core.
//!
//! [`BattleCore`] owns the entities, the append-only event log, the listener
//! registry and the injected random source. The two resolution variants wrap a
//! core and drive it; they share everything here and differ only in their
//! state and event payload types.
//!
//! # Dispatch
//!
//! [`BattleCore::send_event`] snapshots every entity, appends the event to the
//! log and then calls each listener synchronously, in registration order,
//! with the full log and the new event. Listeners only ever see shared
//! references, so they cannot mutate the battle or the registry mid-dispatch.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::entity::{Entity, EntityId, Snapshot};
use crate::error::BattleError;
use crate::random::RandomSource;

/// One entry in the battle log.
///
/// Carries the state of every entity at the moment of emission (indexed by
/// entity id) plus the variant-specific payload.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event<S, K> {
    snapshots: Vec<S>,
    kind: K,
}

impl<S: Snapshot, K> Event<S, K> {
    pub fn snapshots(&self) -> &[S] {
        &self.snapshots
    }

    pub fn snapshot(&self, id: EntityId) -> Option<&S> {
        self.snapshots.get(id.index())
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }
}

/// Observer of a battle's event stream.
pub trait BattleListener<E> {
    /// Called once per event, after it has been appended to `log`.
    fn on_event(&mut self, log: &[E], event: &E);
}

/// Shared handle to a registered listener.
///
/// Registration identity is the allocation the handle points to, so the same
/// handle (or a clone of it) registers at most once.
pub type ListenerHandle<E> = Rc<RefCell<dyn BattleListener<E>>>;

/// Result of a finished battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleOutcome {
    pub winner: EntityId,
    pub loser: EntityId,
}

/// State shared by every battle variant.
pub struct BattleCore<S, K> {
    entities: Vec<Entity<S>>,
    events: Vec<Event<S, K>>,
    listeners: Vec<ListenerHandle<Event<S, K>>>,
    rng: Box<dyn RandomSource>,
}

impl<S, K> BattleCore<S, K>
where
    S: Snapshot,
{
    /// Wraps the given states in entities, assigning ids by position.
    pub fn new(states: impl IntoIterator<Item = S>, rng: Box<dyn RandomSource>) -> Self {
        let entities = states
            .into_iter()
            .enumerate()
            .map(|(index, state)| {
                let mut entity = Entity::new(state);
                entity.set_id(EntityId(index as u32));
                entity
            })
            .collect();

        Self {
            entities,
            events: Vec::new(),
            listeners: Vec::new(),
            rng,
        }
    }

    /// Adds a listener, replacing any earlier registration of the same handle.
    pub fn register_listener(&mut self, listener: ListenerHandle<Event<S, K>>) {
        self.unregister_listener(&listener);
        self.listeners.push(listener);
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn unregister_listener(&mut self, listener: &ListenerHandle<Event<S, K>>) -> bool {
        let target = listener_key(listener);
        let before = self.listeners.len();
        self.listeners
            .retain(|registered| listener_key(registered) != target);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn entities(&self) -> &[Entity<S>] {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity<S>> {
        self.entities.get(id.index())
    }

    /// Resolves a snapshot to the live entity it was taken from.
    pub fn get_player(&self, snapshot: &S) -> Option<&Entity<S>> {
        self.entity(snapshot.id())
    }

    /// The other combatant of a two-entity battle.
    pub fn opponent(&self, id: EntityId) -> Option<EntityId> {
        self.entities
            .iter()
            .map(Entity::id)
            .find(|other| *other != id)
    }

    /// Current snapshot of every entity, in id order.
    pub fn snapshots(&self) -> Vec<S> {
        self.entities
            .iter()
            .map(|entity| entity.state().clone())
            .collect()
    }

    pub fn events(&self) -> &[Event<S, K>] {
        &self.events
    }

    /// Applies one builder transition to an entity.
    pub(crate) fn transition(
        &mut self,
        id: EntityId,
        change: impl FnOnce(S::Builder) -> S::Builder,
    ) -> Result<&S, BattleError> {
        let entity = self
            .entities
            .get_mut(id.index())
            .ok_or(BattleError::UnknownEntity(id))?;
        entity.transition(change);
        Ok(entity.state())
    }

    /// Applies the same transition to every entity.
    pub(crate) fn transition_all(&mut self, change: impl Fn(S::Builder) -> S::Builder) {
        for entity in &mut self.entities {
            entity.transition(&change);
        }
    }

    pub(crate) fn rng(&mut self) -> &mut dyn RandomSource {
        self.rng.as_mut()
    }
}

impl<S, K> BattleCore<S, K>
where
    S: Snapshot,
    K: fmt::Debug,
{
    /// Appends an event and notifies every listener.
    pub(crate) fn send_event(&mut self, kind: K) {
        let event = Event {
            snapshots: self.snapshots(),
            kind,
        };
        self.events.push(event);

        let log = self.events.as_slice();
        let Some(latest) = log.last() else {
            return;
        };
        tracing::trace!(index = log.len() - 1, event = ?latest.kind, "battle event");

        for listener in &self.listeners {
            match listener.try_borrow_mut() {
                Ok(mut listener) => listener.on_event(log, latest),
                Err(_) => tracing::warn!("listener is already borrowed; event not delivered"),
            }
        }
    }
}

impl<S: Snapshot + fmt::Debug, K> fmt::Debug for BattleCore<S, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BattleCore")
            .field("entities", &self.entities)
            .field("events", &self.events.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn listener_key<E>(listener: &ListenerHandle<E>) -> *const () {
    Rc::as_ptr(listener) as *const ()
}

/// Operations common to every battle variant.
///
/// Implementors only provide access to their [`BattleCore`] plus the variant
/// lifecycle; listener management and inspection come for free.
pub trait Battle {
    type State: Snapshot;
    type EventKind: fmt::Debug;

    fn core(&self) -> &BattleCore<Self::State, Self::EventKind>;

    fn core_mut(&mut self) -> &mut BattleCore<Self::State, Self::EventKind>;

    /// Runs the opening sequence and advances to the first decision point.
    fn start(&mut self) -> Result<(), BattleError>;

    fn is_over(&self) -> bool;

    fn outcome(&self) -> Option<BattleOutcome>;

    fn register_listener(&mut self, listener: ListenerHandle<Event<Self::State, Self::EventKind>>) {
        self.core_mut().register_listener(listener);
    }

    fn unregister_listener(
        &mut self,
        listener: &ListenerHandle<Event<Self::State, Self::EventKind>>,
    ) -> bool {
        self.core_mut().unregister_listener(listener)
    }

    fn events(&self) -> &[Event<Self::State, Self::EventKind>] {
        self.core().events()
    }

    fn entities(&self) -> &[Entity<Self::State>] {
        self.core().entities()
    }

    fn get_player(&self, snapshot: &Self::State) -> Option<&Entity<Self::State>> {
        self.core().get_player(snapshot)
    }
}

/// Listener that keeps a copy of every event it receives.
#[derive(Debug)]
pub struct EventRecorder<E> {
    events: Vec<E>,
}

impl<E> EventRecorder<E> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn events(&self) -> &[E] {
        &self.events
    }

    pub fn into_events(self) -> Vec<E> {
        self.events
    }
}

impl<E> Default for EventRecorder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone> BattleListener<E> for EventRecorder<E> {
    fn on_event(&mut self, _log: &[E], event: &E) {
        self.events.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::StateBuilder;
    use crate::random::ScriptedRandom;

    #[derive(Clone, Debug, PartialEq)]
    struct Marker {
        id: EntityId,
        hp: u32,
    }

    struct MarkerBuilder(Marker);

    impl MarkerBuilder {
        fn hp(mut self, hp: u32) -> Self {
            self.0.hp = hp;
            self
        }
    }

    impl StateBuilder for MarkerBuilder {
        type State = Marker;

        fn set_id(mut self, id: EntityId) -> Self {
            self.0.id = id;
            self
        }

        fn build(self) -> Marker {
            self.0
        }
    }

    impl Snapshot for Marker {
        type Builder = MarkerBuilder;

        fn id(&self) -> EntityId {
            self.id
        }

        fn name(&self) -> &str {
            "marker"
        }

        fn to_builder(&self) -> MarkerBuilder {
            MarkerBuilder(self.clone())
        }
    }

    type TestCore = BattleCore<Marker, &'static str>;
    type TestEvent = Event<Marker, &'static str>;

    fn core() -> TestCore {
        let states = (0..2).map(|_| Marker {
            id: EntityId(99),
            hp: 10,
        });
        BattleCore::new(states, Box::new(ScriptedRandom::default()))
    }

    struct Tagger {
        tag: &'static str,
        seen: Rc<RefCell<Vec<(&'static str, usize)>>>,
    }

    impl BattleListener<TestEvent> for Tagger {
        fn on_event(&mut self, log: &[TestEvent], _event: &TestEvent) {
            self.seen.borrow_mut().push((self.tag, log.len()));
        }
    }

    #[test]
    fn ids_follow_entity_order() {
        let core = core();
        let ids: Vec<EntityId> = core.entities().iter().map(Entity::id).collect();
        assert_eq!(ids, vec![EntityId(0), EntityId(1)]);
        assert_eq!(core.opponent(EntityId(0)), Some(EntityId(1)));
        assert_eq!(core.opponent(EntityId(1)), Some(EntityId(0)));
    }

    #[test]
    fn events_capture_snapshots_at_emission() {
        let mut core = core();
        core.send_event("before");
        core.transition(EntityId(1), |b| b.hp(3)).unwrap();
        core.send_event("after");

        let events = core.events();
        assert_eq!(events[0].snapshot(EntityId(1)).unwrap().hp, 10);
        assert_eq!(events[1].snapshot(EntityId(1)).unwrap().hp, 3);
        assert_eq!(*events[1].kind(), "after");
    }

    #[test]
    fn listeners_run_in_registration_order_with_full_log() {
        let mut core = core();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let first: ListenerHandle<TestEvent> = Rc::new(RefCell::new(Tagger {
            tag: "first",
            seen: seen.clone(),
        }));
        let second: ListenerHandle<TestEvent> = Rc::new(RefCell::new(Tagger {
            tag: "second",
            seen: seen.clone(),
        }));
        core.register_listener(first);
        core.register_listener(second);

        core.send_event("a");
        core.send_event("b");

        assert_eq!(
            *seen.borrow(),
            vec![("first", 1), ("second", 1), ("first", 2), ("second", 2)]
        );
    }

    #[test]
    fn registration_is_idempotent() {
        let mut core = core();
        let recorder = Rc::new(RefCell::new(EventRecorder::<TestEvent>::new()));
        let handle: ListenerHandle<TestEvent> = recorder.clone();

        core.register_listener(handle.clone());
        core.register_listener(handle.clone());
        assert_eq!(core.listener_count(), 1);

        core.send_event("once");
        assert_eq!(recorder.borrow().events().len(), 1);

        assert!(core.unregister_listener(&handle));
        assert!(!core.unregister_listener(&handle));
        core.send_event("unheard");
        assert_eq!(recorder.borrow().events().len(), 1);
    }

    #[test]
    fn get_player_resolves_by_id() {
        let core = core();
        let stale = Marker {
            id: EntityId(1),
            hp: 0,
        };
        assert_eq!(core.get_player(&stale).unwrap().state().hp, 10);
        let missing = Marker {
            id: EntityId(5),
            hp: 0,
        };
        assert!(core.get_player(&missing).is_none());
    }

    #[test]
    fn unknown_entity_transition_is_rejected() {
        let mut core = core();
        assert_eq!(
            core.transition(EntityId(7), |b| b.hp(1)).unwrap_err(),
            BattleError::UnknownEntity(EntityId(7))
        );
    }
}
