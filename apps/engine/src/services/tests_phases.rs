//! Integration tests: the full phase cycle driven through the engine facade
//! with in-memory collaborators.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::battle::{BattlePlan, PrescienceField};
use crate::domain::factions::Faction;
use crate::domain::state::{Game, Phase};
use crate::domain::test_state_helpers::{
    make_game_state, place_forces, start_battle, MakeGameStateArgs,
};
use crate::engine::GameEngine;
use crate::repos::GameRepo;
use crate::test_support::{InMemoryGames, JsonBoardRenderer, NotifyEvent, RecordingNotifier};

fn harness() -> (Arc<InMemoryGames>, Arc<RecordingNotifier>, GameEngine) {
    engine_test_support::logging::init();
    let repo = Arc::new(InMemoryGames::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = GameEngine::new(
        repo.clone(),
        notifier.clone(),
        Arc::new(JsonBoardRenderer),
    );
    (repo, notifier, engine)
}

fn plan(leader: &str, dial: u32) -> BattlePlan {
    BattlePlan {
        leader: leader.to_string(),
        dial,
        weapon: None,
        defense: None,
    }
}

#[tokio::test]
async fn a_full_turn_walks_the_phase_cycle() {
    let (repo, notifier, engine) = harness();
    let name = engine_test_support::unique_helpers::unique_str("arrakis");
    let game = engine.create_game(&name).await.unwrap();
    engine.register_player(game.id, 11, "Paul").await.unwrap();
    engine.register_player(game.id, 22, "Vladimir").await.unwrap();
    engine.start_game(game.id).await.unwrap();

    let loaded = repo.load(game.id).await.unwrap().unwrap();
    assert_eq!(loaded.state.phase, Phase::Storm);
    assert_eq!(loaded.state.turn, 1);
    assert_eq!(loaded.state.factions.len(), 2);
    assert!((1..=18).contains(&loaded.state.storm_location));

    assert_eq!(engine.advance_phase(game.id).await.unwrap(), Phase::SpiceBlow);
    // A worm on turn 1 never opens a nexus.
    assert_eq!(engine.advance_phase(game.id).await.unwrap(), Phase::ChoamCharity);
    assert_eq!(engine.advance_phase(game.id).await.unwrap(), Phase::Bidding);
    assert_eq!(engine.advance_phase(game.id).await.unwrap(), Phase::Revival);
    assert_eq!(
        engine.advance_phase(game.id).await.unwrap(),
        Phase::ShipmentAndMovement
    );
    // Starting garrisons never share a territory, so no battles yet.
    assert_eq!(
        engine.advance_phase(game.id).await.unwrap(),
        Phase::SpiceCollection
    );
    assert_eq!(engine.advance_phase(game.id).await.unwrap(), Phase::MentatPause);
    assert_eq!(engine.advance_phase(game.id).await.unwrap(), Phase::Storm);

    let loaded = repo.load(game.id).await.unwrap().unwrap();
    assert_eq!(loaded.state.turn, 2);

    assert!(notifier.actions_containing("Turn 1 begins") >= 1);

    // Every advance persisted and posted a board render.
    let boards = notifier
        .events()
        .iter()
        .filter(|e| **e == NotifyEvent::BoardPosted)
        .count();
    assert!(boards >= 8, "expected a board per advance, saw {boards}");
    assert!(repo.saves() >= 8);
}

#[tokio::test]
async fn victory_tears_the_game_down_without_saving() {
    let (repo, notifier, engine) = harness();
    let mut game = Game::new(Uuid::new_v4(), "endgame", 7);
    game.state = make_game_state(MakeGameStateArgs {
        phase: Phase::MentatPause,
        turn: 4,
        ..Default::default()
    });
    for stronghold in ["Arrakeen", "Carthag", "Sietch Tabr"] {
        place_forces(&mut game.state, Faction::Atreides, stronghold, 2);
    }
    repo.save(&game).await.unwrap();
    let saves_before = repo.saves();

    assert_eq!(engine.advance_phase(game.id).await.unwrap(), Phase::Ended);

    assert!(!repo.contains(game.id), "aggregate must be deleted");
    assert_eq!(repo.saves(), saves_before, "nothing persists past Ended");
    assert!(notifier.events().contains(&NotifyEvent::ChannelGroupDeleted));
}

#[tokio::test]
async fn the_game_ends_after_the_final_turn() {
    let (repo, _notifier, engine) = harness();
    let mut game = Game::new(Uuid::new_v4(), "long-haul", 9);
    game.state = make_game_state(MakeGameStateArgs {
        phase: Phase::MentatPause,
        turn: 10,
        ..Default::default()
    });
    repo.save(&game).await.unwrap();

    assert_eq!(engine.advance_phase(game.id).await.unwrap(), Phase::Ended);
    assert!(!repo.contains(game.id));
}

#[tokio::test]
async fn battles_are_served_strictly_fifo() {
    let (repo, _notifier, engine) = harness();
    let mut game = Game::new(Uuid::new_v4(), "warpath", 3);
    game.state = make_game_state(MakeGameStateArgs {
        phase: Phase::ShipmentAndMovement,
        storm_location: 5,
        ..Default::default()
    });
    // Two contested territories; detection scans the board in name order.
    for territory in ["Arrakeen", "Carthag"] {
        place_forces(&mut game.state, Faction::Atreides, territory, 4);
        place_forces(&mut game.state, Faction::Harkonnen, territory, 3);
    }
    repo.save(&game).await.unwrap();

    assert_eq!(engine.advance_phase(game.id).await.unwrap(), Phase::Battle);
    let loaded = repo.load(game.id).await.unwrap().unwrap();
    let current = loaded.state.current_battle.unwrap();
    assert_eq!(current.territory, "Arrakeen");
    assert!(current.is_active);
    assert_eq!(loaded.state.pending_battles.len(), 1);

    // make_game_state seats Atreides as user 100 and Harkonnen as 101.
    engine
        .submit_battle_plan(game.id, 100, plan("Duncan Idaho", 2))
        .await
        .unwrap();
    engine
        .submit_battle_plan(game.id, 101, plan("Feyd-Rautha", 1))
        .await
        .unwrap();

    let loaded = repo.load(game.id).await.unwrap().unwrap();
    assert!(!loaded.state.current_battle.unwrap().is_active);

    // The queue still holds Carthag, so the machine stays in Battle.
    assert_eq!(engine.advance_phase(game.id).await.unwrap(), Phase::Battle);
    let loaded = repo.load(game.id).await.unwrap().unwrap();
    assert_eq!(loaded.state.current_battle.unwrap().territory, "Carthag");

    engine
        .submit_battle_plan(game.id, 100, plan("Duncan Idaho", 2))
        .await
        .unwrap();
    engine
        .submit_battle_plan(game.id, 101, plan("Feyd-Rautha", 1))
        .await
        .unwrap();

    // Both battles settled: on to collection.
    assert_eq!(
        engine.advance_phase(game.id).await.unwrap(),
        Phase::SpiceCollection
    );
}

#[tokio::test]
async fn prescience_reveals_privately_through_the_engine() {
    let (repo, notifier, engine) = harness();
    let mut game = Game::new(Uuid::new_v4(), "whispers", 5);
    game.state = make_game_state(MakeGameStateArgs {
        phase: Phase::Battle,
        ..Default::default()
    });
    place_forces(&mut game.state, Faction::Atreides, "Funeral Plain", 4);
    place_forces(&mut game.state, Faction::Harkonnen, "Funeral Plain", 3);
    start_battle(
        &mut game.state,
        "Funeral Plain",
        Faction::Atreides,
        Faction::Harkonnen,
    );
    repo.save(&game).await.unwrap();

    // Atreides (user 100) asks after the dial; Harkonnen (101) then commits.
    engine
        .use_prescience(game.id, 100, PrescienceField::Dial)
        .await
        .unwrap();
    engine
        .submit_battle_plan(game.id, 101, plan("Feyd-Rautha", 3))
        .await
        .unwrap();

    let privates = notifier.privates_to(100);
    assert_eq!(privates.len(), 1);
    assert!(privates[0].contains("3"), "dial must be revealed: {}", privates[0]);
}

#[tokio::test]
async fn charity_tops_a_faction_up_to_the_floor() {
    let (repo, _notifier, engine) = harness();
    let mut game = Game::new(Uuid::new_v4(), "alms", 5);
    game.state = make_game_state(MakeGameStateArgs {
        phase: Phase::ChoamCharity,
        ..Default::default()
    });
    game.state.faction_state_mut(Faction::Atreides).unwrap().spice = 0;
    repo.save(&game).await.unwrap();

    engine.claim_charity(game.id, 100).await.unwrap();
    let loaded = repo.load(game.id).await.unwrap().unwrap();
    assert_eq!(loaded.state.faction_state(Faction::Atreides).unwrap().spice, 2);

    // The well-off get nothing.
    let err = engine.claim_charity(game.id, 101).await.unwrap_err();
    assert!(matches!(err, crate::error::EngineError::RuleViolation { .. }));
}
