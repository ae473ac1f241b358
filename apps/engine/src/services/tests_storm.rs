//! Storm movement and damage.

use crate::domain::factions::Faction;
use crate::domain::test_state_helpers::{make_game_state, place_forces, MakeGameStateArgs};
use crate::services::battle::BattleService;
use crate::services::map::MapService;

#[test]
fn storm_from_sector_one_moving_three_lands_on_four() {
    let map_svc = MapService;
    assert_eq!(map_svc.next_storm_sector(1, 3), 4);
}

#[test]
fn storm_sweep_clears_spice_and_non_fremen_forces() {
    // Scenario: storm at sector 1 moves 3, scouring sectors 2, 3, and 4.
    let mut state = make_game_state(MakeGameStateArgs {
        factions: vec![Faction::Atreides, Faction::Fremen, Faction::Harkonnen],
        storm_location: 1,
        ..Default::default()
    });
    place_forces(&mut state, Faction::Atreides, "Cielago North", 5); // sector 2
    place_forces(&mut state, Faction::Fremen, "Cielago East", 4); // sector 3
    place_forces(&mut state, Faction::Harkonnen, "South Mesa", 2); // sector 4
    state.map.territory_mut("South Mesa").unwrap().spice_blow_amount = 8;
    // Sector 6 is beyond the sweep and must be untouched.
    place_forces(&mut state, Faction::Harkonnen, "Red Chasm", 3);

    let battle = BattleService::default();
    battle.apply_storm_damage(&mut state, 1, 3).unwrap();

    let map = &state.map;
    assert_eq!(map.territory("Cielago North").unwrap().forces_of(Faction::Atreides), 0);
    assert_eq!(map.territory("Cielago East").unwrap().forces_of(Faction::Fremen), 4);
    assert_eq!(map.territory("South Mesa").unwrap().forces_of(Faction::Harkonnen), 0);
    assert_eq!(map.territory("South Mesa").unwrap().spice_blow_amount, 0);
    assert_eq!(map.territory("Red Chasm").unwrap().forces_of(Faction::Harkonnen), 3);

    // Destroyed forces sit in the tanks.
    assert_eq!(state.faction_state(Faction::Atreides).unwrap().forces_in_tanks, 5);
    assert_eq!(state.faction_state(Faction::Harkonnen).unwrap().forces_in_tanks, 2);
    assert_eq!(state.faction_state(Faction::Fremen).unwrap().forces_in_tanks, 0);
}

#[test]
fn named_territories_shrug_off_the_storm() {
    let mut state = make_game_state(MakeGameStateArgs {
        storm_location: 7,
        ..Default::default()
    });
    place_forces(&mut state, Faction::Atreides, "Arrakeen", 6); // sector 9
    place_forces(&mut state, Faction::Harkonnen, "Imperial Basin", 3); // sector 8
    state.map.territory_mut("Imperial Basin").unwrap().spice_blow_amount = 5;

    let battle = BattleService::default();
    battle.apply_storm_damage(&mut state, 7, 2).unwrap();

    assert_eq!(state.map.territory("Arrakeen").unwrap().forces_of(Faction::Atreides), 6);
    assert_eq!(
        state.map.territory("Imperial Basin").unwrap().forces_of(Faction::Harkonnen),
        3
    );
    assert_eq!(state.map.territory("Imperial Basin").unwrap().spice_blow_amount, 5);
}

#[test]
fn storm_damage_wraps_past_sector_eighteen() {
    let mut state = make_game_state(MakeGameStateArgs {
        storm_location: 17,
        ..Default::default()
    });
    place_forces(&mut state, Faction::Harkonnen, "Cielago West", 2); // sector 1

    let battle = BattleService::default();
    battle.apply_storm_damage(&mut state, 17, 2).unwrap();

    assert_eq!(state.map.territory("Cielago West").unwrap().forces_of(Faction::Harkonnen), 0);
    assert_eq!(state.faction_state(Faction::Harkonnen).unwrap().forces_in_tanks, 2);
}
