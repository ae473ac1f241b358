//! Shipment costs, payment routing, and movement range.

use crate::domain::factions::Faction;
use crate::domain::state::{GameState, Phase};
use crate::domain::test_state_helpers::{make_game_state, place_forces, MakeGameStateArgs};
use crate::error::EngineError;
use crate::services::movement::MovementService;

fn shipping_state(factions: Vec<Faction>) -> GameState {
    make_game_state(MakeGameStateArgs {
        phase: Phase::ShipmentAndMovement,
        storm_location: 5,
        factions,
        ..Default::default()
    })
}

#[test]
fn stronghold_shipping_costs_one_per_force() {
    let mut state = shipping_state(vec![Faction::Atreides, Faction::SpacingGuild]);
    let movement = MovementService::default();

    movement
        .ship_forces(&mut state, Faction::Atreides, "Arrakeen", 4)
        .unwrap();

    let atreides = state.faction_state(Faction::Atreides).unwrap();
    assert_eq!(atreides.spice, 6);
    assert_eq!(atreides.reserves, 6);
    assert!(atreides.has_shipped);
    assert_eq!(state.map.territory("Arrakeen").unwrap().forces_of(Faction::Atreides), 4);
    // The fare goes to the Guild.
    assert_eq!(state.faction_state(Faction::SpacingGuild).unwrap().spice, 14);
}

#[test]
fn open_territory_shipping_costs_two_per_force() {
    let mut state = shipping_state(vec![Faction::Atreides]);
    MovementService::default()
        .ship_forces(&mut state, Faction::Atreides, "Funeral Plain", 4)
        .unwrap();
    assert_eq!(state.faction_state(Faction::Atreides).unwrap().spice, 2);
}

#[test]
fn guild_ships_at_half_price_rounded_up() {
    let mut state = shipping_state(vec![Faction::SpacingGuild]);
    let movement = MovementService::default();

    // 3 forces into open ground: full fare 6, Guild pays 3.
    movement
        .ship_forces(&mut state, Faction::SpacingGuild, "Funeral Plain", 3)
        .unwrap();
    assert_eq!(state.faction_state(Faction::SpacingGuild).unwrap().spice, 7);

    // 3 forces into a stronghold: full fare 3, Guild pays 2 (round up),
    // and nobody is credited.
    let mut state = shipping_state(vec![Faction::SpacingGuild]);
    movement
        .ship_forces(&mut state, Faction::SpacingGuild, "Arrakeen", 3)
        .unwrap();
    assert_eq!(state.faction_state(Faction::SpacingGuild).unwrap().spice, 8);
}

#[test]
fn shipping_into_the_storm_is_refused() {
    // Storm sits over sector 5; Red Chasm is in sector 6, Tuek's in 4.
    let mut state = make_game_state(MakeGameStateArgs {
        phase: Phase::ShipmentAndMovement,
        storm_location: 4,
        ..Default::default()
    });
    let err = MovementService::default()
        .ship_forces(&mut state, Faction::Atreides, "Tuek's Sietch", 1)
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTarget { .. }));
}

#[test]
fn one_shipment_per_faction_per_phase() {
    let mut state = shipping_state(vec![Faction::Atreides]);
    let movement = MovementService::default();
    movement
        .ship_forces(&mut state, Faction::Atreides, "Arrakeen", 1)
        .unwrap();
    let err = movement
        .ship_forces(&mut state, Faction::Atreides, "Arrakeen", 1)
        .unwrap_err();
    assert!(matches!(err, EngineError::RuleViolation { .. }));
}

#[test]
fn shipping_needs_reserves_and_spice() {
    let mut state = shipping_state(vec![Faction::Atreides]);
    let movement = MovementService::default();

    let err = movement
        .ship_forces(&mut state, Faction::Atreides, "Arrakeen", 11)
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientResource { .. }));

    // 10 forces into open ground would cost 20 against 10 held.
    let err = movement
        .ship_forces(&mut state, Faction::Atreides, "Funeral Plain", 10)
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientResource { .. }));
}

#[test]
fn base_movement_range_is_one_hop() {
    let mut state = shipping_state(vec![Faction::Atreides]);
    place_forces(&mut state, Faction::Atreides, "Old Gap", 3); // sector 9
    let movement = MovementService::default();

    // Carthag is one sector over.
    movement
        .move_forces(&mut state, Faction::Atreides, "Old Gap", "Carthag", 2)
        .unwrap();
    assert_eq!(state.map.territory("Carthag").unwrap().forces_of(Faction::Atreides), 2);
    assert_eq!(state.map.territory("Old Gap").unwrap().forces_of(Faction::Atreides), 1);
    assert!(state.faction_state(Faction::Atreides).unwrap().has_moved);
}

#[test]
fn distant_territory_is_out_of_range_without_ornithopters() {
    let mut state = shipping_state(vec![Faction::Atreides]);
    place_forces(&mut state, Faction::Atreides, "Old Gap", 3); // sector 9
    let err = MovementService::default()
        .move_forces(&mut state, Faction::Atreides, "Old Gap", "Sietch Tabr", 1)
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTarget { .. }));
}

#[test]
fn ornithopter_bases_extend_the_range_to_three() {
    let mut state = shipping_state(vec![Faction::Atreides]);
    place_forces(&mut state, Faction::Atreides, "Arrakeen", 5); // sector 9
    MovementService::default()
        .move_forces(&mut state, Faction::Atreides, "Arrakeen", "Rock Outcroppings", 2)
        .unwrap(); // sector 12, three hops
    assert_eq!(
        state.map.territory("Rock Outcroppings").unwrap().forces_of(Faction::Atreides),
        2
    );
}

#[test]
fn fremen_always_reach_two_hops() {
    let mut state = shipping_state(vec![Faction::Fremen, Faction::Atreides]);
    place_forces(&mut state, Faction::Fremen, "Sietch Tabr", 4); // sector 13
    let movement = MovementService::default();

    // The Great Flat is two sectors out: fine for Fremen...
    movement
        .move_forces(&mut state, Faction::Fremen, "Sietch Tabr", "The Great Flat", 3)
        .unwrap();

    // ...but not for a base-less Atreides force.
    place_forces(&mut state, Faction::Atreides, "Funeral Plain", 2); // sector 14
    let err = movement
        .move_forces(&mut state, Faction::Atreides, "Funeral Plain", "Habbanya Sietch", 1)
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTarget { .. }));
}

#[test]
fn movement_is_blocked_by_storm_on_either_end() {
    let mut state = make_game_state(MakeGameStateArgs {
        phase: Phase::ShipmentAndMovement,
        storm_location: 9,
        ..Default::default()
    });
    place_forces(&mut state, Faction::Atreides, "Old Gap", 2); // sector 9, under storm
    let movement = MovementService::default();

    let err = movement
        .move_forces(&mut state, Faction::Atreides, "Old Gap", "Carthag", 1)
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTarget { .. }));

    place_forces(&mut state, Faction::Atreides, "Carthag", 2); // sector 10
    let err = movement
        .move_forces(&mut state, Faction::Atreides, "Carthag", "Old Gap", 1)
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTarget { .. }));
}

#[test]
fn passing_marks_the_faction_done() {
    let mut state = shipping_state(vec![Faction::Atreides]);
    MovementService::default()
        .pass_shipment(&mut state, Faction::Atreides)
        .unwrap();
    assert!(state.faction_state(Faction::Atreides).unwrap().has_passed);
}
