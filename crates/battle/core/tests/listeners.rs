use std::cell::RefCell;
use std::rc::Rc;

use battle_core::{
    Battle, BattleListener, EventRecorder, ListenerHandle, ParryAttributes, ParryBattle,
    ParryEvent, ParryEventKind, ParryMove, ScriptedRandom,
};

/// Records the log length it observed and its own tag, so ordering across
/// listeners can be checked through a shared journal.
struct Tagged {
    tag: &'static str,
    journal: Rc<RefCell<Vec<(&'static str, usize)>>>,
}

impl BattleListener<ParryEvent> for Tagged {
    fn on_event(&mut self, log: &[ParryEvent], event: &ParryEvent) {
        assert_eq!(log.last(), Some(event));
        self.journal.borrow_mut().push((self.tag, log.len()));
    }
}

fn battle() -> ParryBattle {
    // Initiative 6 vs 2, then agility 5, damage 3, parry chance offered.
    ParryBattle::new(
        ParryAttributes::new("a", "A", 20),
        ParryAttributes::new("b", "B", 20),
        ScriptedRandom::new([6, 2, 5, 3, 1]),
    )
}

#[test]
fn listeners_see_every_event_in_registration_order() {
    let journal = Rc::new(RefCell::new(Vec::new()));
    let first: ListenerHandle<ParryEvent> = Rc::new(RefCell::new(Tagged {
        tag: "first",
        journal: Rc::clone(&journal),
    }));
    let second: ListenerHandle<ParryEvent> = Rc::new(RefCell::new(Tagged {
        tag: "second",
        journal: Rc::clone(&journal),
    }));

    let mut battle = battle();
    battle.register_listener(Rc::clone(&first));
    battle.register_listener(Rc::clone(&second));
    battle.start().unwrap();

    let journal = journal.borrow();
    assert_eq!(journal.len(), battle.events().len() * 2);
    for (index, pair) in journal.chunks(2).enumerate() {
        assert_eq!(pair[0], ("first", index + 1));
        assert_eq!(pair[1], ("second", index + 1));
    }
}

#[test]
fn registering_twice_delivers_once() {
    let recorder = Rc::new(RefCell::new(EventRecorder::<ParryEvent>::new()));
    let handle: ListenerHandle<ParryEvent> = recorder.clone();

    let mut battle = battle();
    battle.register_listener(Rc::clone(&handle));
    battle.register_listener(Rc::clone(&handle));
    battle.start().unwrap();

    assert_eq!(recorder.borrow().events(), battle.events());
}

#[test]
fn unregistered_listener_stops_receiving() {
    let recorder = Rc::new(RefCell::new(EventRecorder::<ParryEvent>::new()));
    let handle: ListenerHandle<ParryEvent> = recorder.clone();

    let mut battle = battle();
    battle.register_listener(Rc::clone(&handle));
    battle.start().unwrap();
    let seen = recorder.borrow().events().len();

    assert!(battle.unregister_listener(&handle));
    assert!(!battle.unregister_listener(&handle));

    let actor = battle.state(battle.current().unwrap()).unwrap().clone();
    battle.make_move(&actor, ParryMove::Attack).unwrap();

    assert_eq!(recorder.borrow().events().len(), seen);
    assert!(battle.events().len() > seen);
}

#[test]
fn recorded_snapshots_match_battle_state() {
    let recorder = Rc::new(RefCell::new(EventRecorder::<ParryEvent>::new()));
    let mut battle = battle();
    battle.register_listener(recorder.clone());
    battle.start().unwrap();

    let actor = battle.state(battle.current().unwrap()).unwrap().clone();
    battle.make_move(&actor, ParryMove::Attack).unwrap();

    let recorder = recorder.borrow();
    let last = recorder.events().last().unwrap();
    assert!(matches!(last.kind(), ParryEventKind::ParryOpportunity { .. }));
    for entity in battle.entities() {
        assert_eq!(last.snapshot(entity.id()), Some(entity.state()));
    }
    assert!(battle.get_player(actor_snapshot(last)).is_some());
}

fn actor_snapshot(event: &ParryEvent) -> &battle_core::ParryState {
    &event.snapshots()[0]
}
