use std::fs;

use battle_content::{ContentFactory, MoveCatalogLoader, ParryRosterLoader};
use battle_core::{
    Battle, BattleConfig, MoveStrategy, ParryBattle, PcgRandom, RandomParryController,
    ScriptedRandom, StrategyController, WindUpBattle, run_parry_battle, run_windup_battle,
};

#[test]
fn bundled_content_loads() {
    let factory = ContentFactory::bundled();
    let config = factory.load_config().unwrap();
    assert_eq!(config, BattleConfig::default());

    let parry = factory.load_parry_roster().unwrap();
    assert_eq!(parry.len(), 3);

    let moves = factory.load_moves().unwrap();
    assert!(moves.get("mirror").is_some());

    let windup = factory.load_windup_roster().unwrap();
    let pit = windup.require("pit_fighter").unwrap();
    assert_eq!(pit.effective_max_hp(), 48);
    assert_eq!(pit.strategy, MoveStrategy::Cycle);
}

#[test]
fn bundled_rosters_fight_to_completion() {
    let factory = ContentFactory::bundled();
    let config = factory.load_config().unwrap();

    let parry = factory.load_parry_roster().unwrap();
    let mut battle = ParryBattle::new(
        parry.require("knight").unwrap(),
        parry.require("brute").unwrap(),
        PcgRandom::seeded(2024),
    )
    .with_config(config.clone());
    let mut left = RandomParryController::new(PcgRandom::seeded(1));
    let mut right = RandomParryController::new(PcgRandom::seeded(2));
    run_parry_battle(&mut battle, &mut [&mut left, &mut right]).unwrap();
    assert!(battle.is_over());

    let windup = factory.load_windup_roster().unwrap();
    let first = windup.require("pit_fighter").unwrap();
    let second = windup.require("warden").unwrap();
    let mut left = StrategyController::new(first.strategy);
    let mut right = StrategyController::new(second.strategy);
    let mut battle =
        WindUpBattle::new(first, second, ScriptedRandom::default()).with_config(config);
    let outcome = run_windup_battle(&mut battle, &mut [&mut left, &mut right]).unwrap();
    assert!(battle.state(outcome.loser).unwrap().is_defeated());
}

#[test]
fn loaders_read_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(ContentFactory::MOVES_FILE),
        r#"(moves: [(id: "tap", name: "Tap", stats: Some((effect: 1, defense: 0, delay: 1)))])"#,
    )
    .unwrap();
    fs::write(
        dir.path().join(ContentFactory::WINDUP_ROSTER_FILE),
        r#"(combatants: [(id: "a", name: "A", max_hp: 3, moves: ["tap"])])"#,
    )
    .unwrap();
    fs::write(dir.path().join(ContentFactory::CONFIG_FILE), "turn_delay = 7\n").unwrap();

    let factory = ContentFactory::new(dir.path());
    assert_eq!(factory.load_config().unwrap().turn_delay, 7);
    assert_eq!(factory.load_windup_roster().unwrap().len(), 1);

    let catalog = MoveCatalogLoader::load(&dir.path().join(ContentFactory::MOVES_FILE)).unwrap();
    assert_eq!(catalog.len(), 1);
}

#[test]
fn missing_files_name_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.ron");
    let error = ParryRosterLoader::load(&path).unwrap_err();
    assert!(error.to_string().contains("absent.ron"));
}
