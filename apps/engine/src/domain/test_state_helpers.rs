//! Test-only game state builder for service unit tests.

use crate::domain::battle::BattleState;
use crate::domain::cards::{card_kind, CardKind, TreacheryCard};
use crate::domain::factions::Faction;
use crate::domain::state::{FactionState, GameState, Phase, PlayerRef};

pub struct MakeGameStateArgs {
    pub phase: Phase,
    pub turn: u32,
    pub storm_location: u8,
    pub factions: Vec<Faction>,
    pub seed: u64,
}

impl Default for MakeGameStateArgs {
    fn default() -> Self {
        Self {
            phase: Phase::Storm,
            turn: 1,
            storm_location: 1,
            factions: vec![Faction::Atreides, Faction::Harkonnen],
            seed: 42,
        }
    }
}

/// Build a `GameState` with seated factions and sensible defaults: each
/// faction gets a player, 10 spice, and 10 reserves.
pub fn make_game_state(args: MakeGameStateArgs) -> GameState {
    engine_test_support::logging::init();

    let mut state = GameState::new(args.seed);
    state.phase = args.phase;
    state.turn = args.turn;
    state.storm_location = args.storm_location;
    for (i, faction) in args.factions.into_iter().enumerate() {
        let mut fs = FactionState::new(faction);
        fs.spice = 10;
        fs.reserves = 10;
        fs.player = Some(PlayerRef {
            user_id: 100 + i as u64,
            display_name: format!("player-{i}"),
        });
        state.factions.push(fs);
    }
    state
}

/// Drop forces straight onto the board.
pub fn place_forces(state: &mut GameState, faction: Faction, territory: &str, count: u32) {
    state
        .map
        .territory_mut(territory)
        .unwrap_or_else(|| panic!("unknown territory {territory}"))
        .add_forces(faction, count);
}

/// Put a named treachery card into a faction's hand.
pub fn give_card(state: &mut GameState, faction: Faction, name: &str) {
    let kind = card_kind(name).unwrap_or(CardKind::Special);
    state
        .faction_state_mut(faction)
        .expect("faction seated")
        .treachery_cards
        .push(TreacheryCard::new(name, kind));
}

/// Open an active battle between two seated factions and enter the Battle
/// phase.
pub fn start_battle(state: &mut GameState, territory: &str, attacker: Faction, defender: Faction) {
    state.phase = Phase::Battle;
    state.current_battle = Some(BattleState::new(territory, attacker, defender));
}
