//! Property tests for storm-sector arithmetic and storm immunity.

use proptest::prelude::*;

use crate::domain::factions::Faction;
use crate::domain::test_state_helpers::{make_game_state, place_forces, MakeGameStateArgs};
use crate::services::battle::BattleService;
use crate::services::map::MapService;

proptest! {
    /// next = ((s - 1 + m) mod 18) + 1 for every start sector and move.
    #[test]
    fn prop_storm_formula_holds(s in 1u8..=18, m in 0u32..=18) {
        let next = MapService.next_storm_sector(s, m);
        prop_assert!((1..=18).contains(&next));
        prop_assert_eq!(next as u32, ((s as u32 - 1 + m) % 18) + 1);
    }

    /// The path covers exactly `m` sectors and ends where the storm lands.
    #[test]
    fn prop_storm_path_matches_the_move(s in 1u8..=18, m in 0u32..=18) {
        let path = MapService.storm_path(s, m);
        prop_assert_eq!(path.len(), m as usize);
        for sector in &path {
            prop_assert!((1..=18).contains(sector));
        }
        if m > 0 {
            prop_assert_eq!(*path.last().unwrap(), MapService.next_storm_sector(s, m));
        }
    }

    /// Fremen forces and the named-immune territories survive any storm.
    #[test]
    fn prop_fremen_and_immune_territories_survive(s in 1u8..=18, m in 0u32..=18) {
        let mut state = make_game_state(MakeGameStateArgs {
            factions: vec![Faction::Fremen, Faction::Harkonnen],
            storm_location: s,
            ..Default::default()
        });
        place_forces(&mut state, Faction::Fremen, "The Great Flat", 4);
        place_forces(&mut state, Faction::Harkonnen, "Arrakeen", 3);
        place_forces(&mut state, Faction::Harkonnen, "Imperial Basin", 2);
        state.map.territory_mut("Imperial Basin").unwrap().spice_blow_amount = 5;

        BattleService::default().apply_storm_damage(&mut state, s, m).unwrap();

        prop_assert_eq!(
            state.map.territory("The Great Flat").unwrap().forces_of(Faction::Fremen),
            4
        );
        prop_assert_eq!(
            state.map.territory("Arrakeen").unwrap().forces_of(Faction::Harkonnen),
            3
        );
        prop_assert_eq!(
            state.map.territory("Imperial Basin").unwrap().forces_of(Faction::Harkonnen),
            2
        );
        prop_assert_eq!(state.map.territory("Imperial Basin").unwrap().spice_blow_amount, 5);
    }
}
