//! Revival limits and costs.

use crate::domain::factions::Faction;
use crate::domain::state::{GameState, Phase};
use crate::domain::test_state_helpers::{make_game_state, MakeGameStateArgs};
use crate::error::EngineError;
use crate::services::revival::RevivalService;

fn revival_state(faction: Faction) -> GameState {
    let mut state = make_game_state(MakeGameStateArgs {
        phase: Phase::Revival,
        factions: vec![faction],
        ..Default::default()
    });
    state.faction_state_mut(faction).unwrap().forces_in_tanks = 8;
    state
}

#[test]
fn forces_come_back_at_two_spice_each() {
    let mut state = revival_state(Faction::Atreides);
    RevivalService::default()
        .revive_forces(&mut state, Faction::Atreides, 3)
        .unwrap();

    let fs = state.faction_state(Faction::Atreides).unwrap();
    assert_eq!(fs.spice, 4);
    assert_eq!(fs.forces_in_tanks, 5);
    assert_eq!(fs.reserves, 13);
    assert_eq!(fs.revived_troops_this_turn, 3);
}

#[test]
fn the_fremen_revive_for_free() {
    let mut state = revival_state(Faction::Fremen);
    RevivalService::default()
        .revive_forces(&mut state, Faction::Fremen, 3)
        .unwrap();
    assert_eq!(state.faction_state(Faction::Fremen).unwrap().spice, 10);
}

#[test]
fn the_cap_is_three_per_phase() {
    let mut state = revival_state(Faction::Atreides);
    let revival = RevivalService::default();

    revival.revive_forces(&mut state, Faction::Atreides, 2).unwrap();
    let err = revival
        .revive_forces(&mut state, Faction::Atreides, 2)
        .unwrap_err();
    assert!(matches!(err, EngineError::RuleViolation { .. }));

    // One more is still within the cap.
    revival.revive_forces(&mut state, Faction::Atreides, 1).unwrap();
    assert_eq!(
        state
            .faction_state(Faction::Atreides)
            .unwrap()
            .revived_troops_this_turn,
        3
    );
}

#[test]
fn revival_needs_bodies_and_spice() {
    let mut state = revival_state(Faction::Atreides);
    state.faction_state_mut(Faction::Atreides).unwrap().forces_in_tanks = 1;
    let revival = RevivalService::default();

    let err = revival
        .revive_forces(&mut state, Faction::Atreides, 2)
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientResource { .. }));

    let mut state = revival_state(Faction::Atreides);
    state.faction_state_mut(Faction::Atreides).unwrap().spice = 1;
    let err = revival
        .revive_forces(&mut state, Faction::Atreides, 1)
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientResource { .. }));
}

#[test]
fn revival_only_happens_in_its_phase() {
    let mut state = revival_state(Faction::Atreides);
    state.phase = Phase::Bidding;
    let err = RevivalService::default()
        .revive_forces(&mut state, Faction::Atreides, 1)
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidPhase { .. }));
}

#[test]
fn dead_leaders_can_be_bought_back() {
    let mut state = revival_state(Faction::Atreides);
    state
        .faction_state_mut(Faction::Atreides)
        .unwrap()
        .dead_leaders
        .push("Duncan Idaho".to_string());

    RevivalService::default()
        .revive_leader(&mut state, Faction::Atreides, "Duncan Idaho")
        .unwrap();

    let fs = state.faction_state(Faction::Atreides).unwrap();
    assert_eq!(fs.spice, 8);
    assert!(fs.dead_leaders.is_empty());
}

#[test]
fn living_leaders_cannot_be_revived() {
    let mut state = revival_state(Faction::Atreides);
    let err = RevivalService::default()
        .revive_leader(&mut state, Faction::Atreides, "Duncan Idaho")
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
}
