//! Game setup: player registration, faction assignment, and the initial deal.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::domain::cards::{SPICE_DECK, TREACHERY_DECK};
use crate::domain::factions::{Faction, ALL_FACTIONS};
use crate::domain::seed_derivation::derive_assignment_seed;
use crate::domain::state::{FactionState, GameState, Phase, PlayerRef, UserId};
use crate::error::EngineError;
use crate::services::deck::DeckService;

#[derive(Default)]
pub struct GameSetupService {
    deck: DeckService,
}

impl GameSetupService {
    /// Register a player while the game is still in Setup.
    pub fn register_player(
        &self,
        state: &mut GameState,
        user_id: UserId,
        display_name: &str,
    ) -> Result<(), EngineError> {
        if state.phase != Phase::Setup {
            return Err(EngineError::invalid_phase(
                "registration closed once the game has started",
            ));
        }
        if state.registered.iter().any(|p| p.user_id == user_id) {
            return Err(EngineError::rule_violation(format!(
                "{display_name} is already registered"
            )));
        }
        if state.registered.len() >= ALL_FACTIONS.len() {
            return Err(EngineError::rule_violation("the game is full"));
        }

        state.registered.push(PlayerRef {
            user_id,
            display_name: display_name.to_string(),
        });
        state.log_action(format!("{display_name} joins the game."));
        info!(user_id, display_name, "Player registered");
        Ok(())
    }

    /// Deal the game: assign factions to registered players in a seeded
    /// random order, place starting garrisons, shuffle the decks, and hand
    /// out traitors.
    pub fn start_game(&self, state: &mut GameState) -> Result<(), EngineError> {
        if state.phase != Phase::Setup {
            return Err(EngineError::invalid_phase("the game has already started"));
        }
        if state.registered.len() < 2 {
            return Err(EngineError::rule_violation(
                "at least two players are needed to start",
            ));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(derive_assignment_seed(state.rng_seed));
        let mut pool = ALL_FACTIONS.to_vec();
        pool.shuffle(&mut rng);
        pool.truncate(state.registered.len());

        let players = std::mem::take(&mut state.registered);
        for (faction, player) in pool.into_iter().zip(players) {
            let mut fs = FactionState::new(faction);
            fs.spice = faction.starting_spice();
            fs.reserves = faction.starting_reserves();
            fs.player = Some(player.clone());
            if let Some((territory, count)) = faction.starting_garrison() {
                let t = state.map.territory_mut(territory).ok_or_else(|| {
                    EngineError::not_found(
                        crate::error::NotFoundKind::Territory,
                        format!("starting garrison names unknown territory {territory}"),
                    )
                })?;
                t.add_forces(faction, count);
                fs.start_sector = t.sector;
            }
            state.log_action(format!(
                "{} takes the {}.",
                player.display_name,
                faction.display_name()
            ));
            state.factions.push(fs);
        }

        let seed = state.next_shuffle_seed();
        state.treachery_deck = TREACHERY_DECK.clone();
        self.deck.shuffle(&mut state.treachery_deck, seed);

        let seed = state.next_shuffle_seed();
        state.spice_deck = SPICE_DECK.clone();
        self.deck.shuffle(&mut state.spice_deck, seed);

        self.deal_traitors(state, &mut rng);

        info!(
            factions = state.factions.len(),
            "Game started, factions assigned"
        );
        Ok(())
    }

    /// Every faction draws traitor candidates from the shared leader pool.
    /// Harkonnen keeps four, everyone else one; a faction's own leaders are
    /// skipped.
    fn deal_traitors(&self, state: &mut GameState, rng: &mut ChaCha8Rng) {
        let mut pool: Vec<(&'static str, Faction)> = ALL_FACTIONS
            .into_iter()
            .flat_map(|f| f.leader_roster().iter().map(move |l| (*l, f)))
            .collect();
        pool.shuffle(rng);

        let seats: Vec<Faction> = state.factions.iter().map(|f| f.faction).collect();
        for faction in seats {
            let wanted = if faction == Faction::Harkonnen { 4 } else { 1 };
            let mut taken = Vec::new();
            pool.retain(|(leader, owner)| {
                if taken.len() < wanted && *owner != faction {
                    taken.push((*leader).to_string());
                    false
                } else {
                    true
                }
            });
            if let Ok(fs) = state.faction_state_mut(faction) {
                fs.traitors = taken;
            }
        }
    }
}
