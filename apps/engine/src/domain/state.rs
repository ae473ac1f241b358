//! The game aggregate: `Game`, `GameState`, `FactionState`, and the phase
//! enum, plus the turn-order helpers every service shares.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::GameRules;
use crate::domain::battle::BattleState;
use crate::domain::cards::{SpiceCard, TreacheryCard};
use crate::domain::factions::Faction;
use crate::domain::map::Map;
use crate::domain::seed_derivation::derive_shuffle_seed;
use crate::error::{EngineError, NotFoundKind};

pub type GameId = Uuid;

/// Platform user id (opaque snowflake).
pub type UserId = u64;

/// Overall game progression phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Players register; nothing on the board yet.
    Setup,
    /// The storm moves and destroys what it passes over.
    Storm,
    /// The spice deck pays out (or Shai-Hulud devours).
    SpiceBlow,
    /// Alliance window after a worm.
    Nexus,
    /// CHOAM tops up the destitute.
    ChoamCharity,
    /// One treachery card goes to auction.
    Bidding,
    /// Forces and leaders return from the tanks.
    Revival,
    /// One shipment and one move per faction.
    ShipmentAndMovement,
    /// Contested territories resolve, one battle at a time.
    Battle,
    /// Sole occupants harvest spice.
    SpiceCollection,
    /// End-of-turn bookkeeping and the victory check.
    MentatPause,
    /// Game over; collaborators tear the game down.
    Ended,
}

/// A registered player waiting for (or holding) a faction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRef {
    pub user_id: UserId,
    pub display_name: String,
}

/// Channel references owned by the chat platform, not the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRefs {
    pub category_id: Option<u64>,
    pub board_channel_id: Option<u64>,
    pub action_channel_id: Option<u64>,
}

/// Per-faction slice of the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionState {
    pub faction: Faction,
    pub player: Option<PlayerRef>,
    pub spice: u32,
    pub reserves: u32,
    pub forces_in_tanks: u32,
    pub has_shipped: bool,
    pub has_moved: bool,
    pub has_passed: bool,
    pub revived_troops_this_turn: u32,
    pub treachery_cards: Vec<TreacheryCard>,
    /// Opposing leader names this faction holds traitor cards for.
    pub traitors: Vec<String>,
    pub dead_leaders: Vec<String>,
    /// Leaders taken from other factions (Harkonnen capture).
    pub captured_leaders: Vec<String>,
    pub start_sector: u8,
}

impl FactionState {
    pub fn new(faction: Faction) -> Self {
        Self {
            faction,
            player: None,
            spice: 0,
            reserves: 0,
            forces_in_tanks: 0,
            has_shipped: false,
            has_moved: false,
            has_passed: false,
            revived_troops_this_turn: 0,
            treachery_cards: Vec::new(),
            traitors: Vec::new(),
            dead_leaders: Vec::new(),
            captured_leaders: Vec::new(),
            start_sector: 0,
        }
    }

    pub fn holds_card(&self, name: &str) -> bool {
        self.treachery_cards.iter().any(|c| c.name == name)
    }

    /// Reset the once-per-turn action flags.
    pub fn reset_turn_flags(&mut self) {
        self.has_shipped = false;
        self.has_moved = false;
        self.has_passed = false;
    }
}

/// Entire game state, sufficient for every rule operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub turn: u32,
    pub phase: Phase,
    /// Faction order is turn order.
    pub factions: Vec<FactionState>,
    pub map: Map,
    /// Storm sector, 1..=18.
    pub storm_location: u8,
    pub treachery_deck: Vec<TreacheryCard>,
    pub treachery_discard: Vec<TreacheryCard>,
    pub spice_deck: Vec<SpiceCard>,
    pub spice_discard: Vec<SpiceCard>,
    pub current_card: Option<TreacheryCard>,
    pub current_bid: u32,
    pub high_bidder: Option<Faction>,
    pub current_bidder: Option<Faction>,
    pub is_bidding_round_active: bool,
    pub pending_battles: VecDeque<BattleState>,
    pub current_battle: Option<BattleState>,
    /// Set by the spice blow when a worm surfaced on turn > 1.
    pub nexus_triggered: bool,
    /// Append-only trace of everything that happened.
    pub action_log: Vec<String>,
    /// Players registered during Setup, before factions are dealt.
    pub registered: Vec<PlayerRef>,
    pub rng_seed: u64,
    pub shuffle_nonce: u32,
    pub rules: GameRules,
}

impl GameState {
    pub fn new(rng_seed: u64) -> Self {
        Self {
            turn: 0,
            phase: Phase::Setup,
            factions: Vec::new(),
            map: Map::standard(),
            storm_location: 1,
            treachery_deck: Vec::new(),
            treachery_discard: Vec::new(),
            spice_deck: Vec::new(),
            spice_discard: Vec::new(),
            current_card: None,
            current_bid: 0,
            high_bidder: None,
            current_bidder: None,
            is_bidding_round_active: false,
            pending_battles: VecDeque::new(),
            current_battle: None,
            nexus_triggered: false,
            action_log: Vec::new(),
            registered: Vec::new(),
            rng_seed,
            shuffle_nonce: 0,
            rules: GameRules::default(),
        }
    }

    pub fn log_action(&mut self, line: impl Into<String>) {
        self.action_log.push(line.into());
    }

    /// A fresh seed for the next shuffle this game performs.
    pub fn next_shuffle_seed(&mut self) -> u64 {
        self.shuffle_nonce += 1;
        derive_shuffle_seed(self.rng_seed, self.shuffle_nonce)
    }

    pub fn faction_state(&self, faction: Faction) -> Result<&FactionState, EngineError> {
        self.factions
            .iter()
            .find(|f| f.faction == faction)
            .ok_or_else(|| {
                EngineError::not_found(
                    NotFoundKind::Faction,
                    format!("{} is not in this game", faction.display_name()),
                )
            })
    }

    pub fn faction_state_mut(
        &mut self,
        faction: Faction,
    ) -> Result<&mut FactionState, EngineError> {
        self.factions
            .iter_mut()
            .find(|f| f.faction == faction)
            .ok_or_else(|| {
                EngineError::not_found(
                    NotFoundKind::Faction,
                    format!("{} is not in this game", faction.display_name()),
                )
            })
    }

    /// The faction a platform user plays, once factions are dealt.
    pub fn faction_of_player(&self, user_id: UserId) -> Result<Faction, EngineError> {
        self.factions
            .iter()
            .find(|f| f.player.as_ref().is_some_and(|p| p.user_id == user_id))
            .map(|f| f.faction)
            .ok_or_else(|| {
                EngineError::not_found(
                    NotFoundKind::Player,
                    format!("user {user_id} holds no faction in this game"),
                )
            })
    }

    /// Seating index of a faction in turn order.
    pub fn seat_of(&self, faction: Faction) -> Option<usize> {
        self.factions.iter().position(|f| f.faction == faction)
    }

    /// The faction seated after `faction`, wrapping around the table.
    pub fn next_in_turn_order(&self, faction: Faction) -> Result<Faction, EngineError> {
        let seat = self.seat_of(faction).ok_or_else(|| {
            EngineError::not_found(
                NotFoundKind::Faction,
                format!("{} is not seated", faction.display_name()),
            )
        })?;
        Ok(self.factions[(seat + 1) % self.factions.len()].faction)
    }

    /// Is the named leader dead or captured by anyone?
    pub fn leader_unavailable(&self, leader: &str) -> bool {
        self.factions.iter().any(|f| {
            f.dead_leaders.iter().any(|l| l == leader)
                || f.captured_leaders.iter().any(|l| l == leader)
        })
    }

    /// Recompute territory control: a territory is controlled by its sole
    /// occupant, and by nobody when contested or empty.
    pub fn refresh_control(&mut self) {
        for territory in self.map.territories.values_mut() {
            territory.controlling_faction = if territory.forces.len() == 1 {
                territory.forces.keys().next().copied()
            } else {
                None
            };
        }
    }

    /// The faction solely controlling at least `rules.strongholds_to_win`
    /// strongholds, if any.
    pub fn stronghold_winner(&self) -> Option<Faction> {
        self.factions
            .iter()
            .map(|f| f.faction)
            .find(|&faction| self.strongholds_held(faction) >= self.rules.strongholds_to_win)
    }

    /// Strongholds occupied by `faction` alone.
    pub fn strongholds_held(&self, faction: Faction) -> usize {
        self.map
            .territories
            .values()
            .filter(|t| {
                t.is_stronghold && t.forces.len() == 1 && t.forces.contains_key(&faction)
            })
            .count()
    }
}

/// Aggregate root: identity, externally owned channel references, and state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub name: String,
    pub channels: ChannelRefs,
    pub state: GameState,
}

impl Game {
    pub fn new(id: GameId, name: impl Into<String>, rng_seed: u64) -> Self {
        Self {
            id,
            name: name.into(),
            channels: ChannelRefs::default(),
            state: GameState::new(rng_seed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seated(factions: &[Faction]) -> GameState {
        let mut state = GameState::new(1);
        for faction in factions {
            state.factions.push(FactionState::new(*faction));
        }
        state
    }

    #[test]
    fn turn_order_wraps_around_the_table() {
        let state = seated(&[Faction::Atreides, Faction::Fremen, Faction::Emperor]);
        assert_eq!(
            state.next_in_turn_order(Faction::Atreides).unwrap(),
            Faction::Fremen
        );
        assert_eq!(
            state.next_in_turn_order(Faction::Emperor).unwrap(),
            Faction::Atreides
        );
    }

    #[test]
    fn control_follows_sole_occupancy() {
        let mut state = seated(&[Faction::Atreides, Faction::Harkonnen]);
        state
            .map
            .territory_mut("Arrakeen")
            .unwrap()
            .add_forces(Faction::Atreides, 4);
        state
            .map
            .territory_mut("Carthag")
            .unwrap()
            .add_forces(Faction::Atreides, 2);
        state
            .map
            .territory_mut("Carthag")
            .unwrap()
            .add_forces(Faction::Harkonnen, 2);

        state.refresh_control();

        assert_eq!(
            state.map.territory("Arrakeen").unwrap().controlling_faction,
            Some(Faction::Atreides)
        );
        assert_eq!(state.map.territory("Carthag").unwrap().controlling_faction, None);
        assert_eq!(state.strongholds_held(Faction::Atreides), 1);
        assert_eq!(state.stronghold_winner(), None);
    }

    #[test]
    fn three_sole_strongholds_win_the_game() {
        let mut state = seated(&[Faction::Atreides, Faction::Harkonnen]);
        for stronghold in ["Arrakeen", "Carthag", "Habbanya Sietch"] {
            state
                .map
                .territory_mut(stronghold)
                .unwrap()
                .add_forces(Faction::Atreides, 1);
        }
        assert_eq!(state.stronghold_winner(), Some(Faction::Atreides));
    }

    #[test]
    fn leaders_captured_by_anyone_are_unavailable() {
        let mut state = seated(&[Faction::Atreides, Faction::Harkonnen]);
        state
            .faction_state_mut(Faction::Harkonnen)
            .unwrap()
            .captured_leaders
            .push("Duncan Idaho".to_string());
        assert!(state.leader_unavailable("Duncan Idaho"));
        assert!(!state.leader_unavailable("Gurney Halleck"));
    }
}
