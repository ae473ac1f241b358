//! Spice blow resolution and collection.

use crate::domain::cards::SpiceCard;
use crate::domain::factions::Faction;
use crate::domain::state::Phase;
use crate::domain::test_state_helpers::{make_game_state, place_forces, MakeGameStateArgs};
use crate::services::spice::SpiceService;

fn territory_card(name: &str) -> SpiceCard {
    SpiceCard::Territory {
        territory: name.to_string(),
    }
}

#[test]
fn standard_territory_blow_pays_six() {
    let mut state = make_game_state(MakeGameStateArgs::default());
    state.spice_deck = vec![territory_card("Funeral Plain")];

    let result = SpiceService::default().resolve_spice_blow(&mut state).unwrap();

    assert_eq!(result.territory.as_deref(), Some("Funeral Plain"));
    assert_eq!(result.amount, 6);
    assert!(!result.worm_appeared);
    assert_eq!(result.next_phase, Phase::ChoamCharity);
    assert_eq!(state.map.territory("Funeral Plain").unwrap().spice_blow_amount, 6);
    // The territory card ends up on top of the discard.
    assert_eq!(state.spice_discard.last(), Some(&territory_card("Funeral Plain")));
}

#[test]
fn high_value_territory_blow_pays_ten() {
    let mut state = make_game_state(MakeGameStateArgs::default());
    state.spice_deck = vec![territory_card("Red Chasm")];

    let result = SpiceService::default().resolve_spice_blow(&mut state).unwrap();

    assert_eq!(result.amount, 10);
    assert_eq!(state.map.territory("Red Chasm").unwrap().spice_blow_amount, 10);
}

#[test]
fn blow_under_the_storm_is_suppressed() {
    let mut state = make_game_state(MakeGameStateArgs {
        storm_location: 14, // Funeral Plain's sector
        ..Default::default()
    });
    state.spice_deck = vec![territory_card("Funeral Plain")];

    let result = SpiceService::default().resolve_spice_blow(&mut state).unwrap();

    assert_eq!(result.territory.as_deref(), Some("Funeral Plain"));
    assert_eq!(result.amount, 0);
    assert_eq!(state.map.territory("Funeral Plain").unwrap().spice_blow_amount, 0);
}

#[test]
fn worm_devours_the_last_exposed_territory_and_triggers_nexus() {
    let mut state = make_game_state(MakeGameStateArgs {
        turn: 2,
        factions: vec![Faction::Atreides, Faction::Fremen],
        ..Default::default()
    });
    // Funeral Plain was exposed on a previous turn and still holds spice.
    state.spice_discard = vec![territory_card("Funeral Plain")];
    state.map.territory_mut("Funeral Plain").unwrap().spice_blow_amount = 6;
    place_forces(&mut state, Faction::Atreides, "Funeral Plain", 3);
    place_forces(&mut state, Faction::Fremen, "Funeral Plain", 2);
    // Draw order is worm first, then the next territory card.
    state.spice_deck = vec![territory_card("Hagga Basin"), SpiceCard::ShaiHulud];

    let result = SpiceService::default().resolve_spice_blow(&mut state).unwrap();

    assert!(result.worm_appeared);
    assert!(state.nexus_triggered);
    assert_eq!(result.next_phase, Phase::Nexus);
    assert_eq!(result.territory.as_deref(), Some("Hagga Basin"));

    let devoured = state.map.territory("Funeral Plain").unwrap();
    assert_eq!(devoured.spice_blow_amount, 0);
    assert_eq!(devoured.forces_of(Faction::Atreides), 0);
    // The Fremen ride the worm.
    assert_eq!(devoured.forces_of(Faction::Fremen), 2);
    assert_eq!(state.faction_state(Faction::Atreides).unwrap().forces_in_tanks, 3);

    // The draw continued to the territory card.
    assert_eq!(state.map.territory("Hagga Basin").unwrap().spice_blow_amount, 6);
}

#[test]
fn worm_on_turn_one_does_not_open_a_nexus() {
    let mut state = make_game_state(MakeGameStateArgs {
        turn: 1,
        ..Default::default()
    });
    state.spice_deck = vec![territory_card("Hagga Basin"), SpiceCard::ShaiHulud];

    let result = SpiceService::default().resolve_spice_blow(&mut state).unwrap();

    assert!(result.worm_appeared);
    assert!(!state.nexus_triggered);
    assert_eq!(result.next_phase, Phase::ChoamCharity);
}

#[test]
fn exhausted_spice_deck_ends_the_blow_quietly() {
    let mut state = make_game_state(MakeGameStateArgs::default());
    state.spice_deck.clear();
    state.spice_discard.clear();

    let result = SpiceService::default().resolve_spice_blow(&mut state).unwrap();

    assert_eq!(result.territory, None);
    assert_eq!(result.next_phase, Phase::ChoamCharity);
}

#[test]
fn sole_occupants_collect_up_to_twice_their_forces() {
    let mut state = make_game_state(MakeGameStateArgs::default());
    state.map.territory_mut("Red Chasm").unwrap().spice_blow_amount = 10;
    place_forces(&mut state, Faction::Atreides, "Red Chasm", 3);

    SpiceService::default().collect_spice(&mut state).unwrap();

    // min(10, 3 x 2) = 6 collected, 4 left behind.
    assert_eq!(state.faction_state(Faction::Atreides).unwrap().spice, 16);
    assert_eq!(state.map.territory("Red Chasm").unwrap().spice_blow_amount, 4);
}

#[test]
fn contested_territories_yield_nothing() {
    let mut state = make_game_state(MakeGameStateArgs::default());
    state.map.territory_mut("Red Chasm").unwrap().spice_blow_amount = 10;
    place_forces(&mut state, Faction::Atreides, "Red Chasm", 3);
    place_forces(&mut state, Faction::Harkonnen, "Red Chasm", 1);

    SpiceService::default().collect_spice(&mut state).unwrap();

    assert_eq!(state.faction_state(Faction::Atreides).unwrap().spice, 10);
    assert_eq!(state.faction_state(Faction::Harkonnen).unwrap().spice, 10);
    assert_eq!(state.map.territory("Red Chasm").unwrap().spice_blow_amount, 10);
}
