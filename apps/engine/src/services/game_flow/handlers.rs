//! One handler per phase: entry side effects, the pure transition rule, and
//! status text. Handlers are registered in a flat list scanned by phase tag.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::domain::seed_derivation::derive_storm_seed;
use crate::domain::state::{Game, GameState, Phase};
use crate::error::EngineError;
use crate::notify::{ActionButton, Notifier};
use crate::services::battle::BattleService;
use crate::services::bidding::BiddingService;
use crate::services::map::MapService;
use crate::services::spice::SpiceService;

#[async_trait]
pub trait PhaseHandler: Send + Sync {
    /// The phase this handler owns.
    fn phase(&self) -> Phase;

    /// Entry side effects, run once on transition into the phase.
    async fn run_phase(&self, game: &mut Game, notifier: &dyn Notifier)
        -> Result<(), EngineError>;

    /// Pure transition rule: where the machine goes when advanced out of
    /// this phase.
    fn next_phase(&self, state: &GameState) -> Phase;

    /// Status text for the phase announcement.
    fn description(&self) -> &'static str;
}

static HANDLERS: Lazy<Vec<Box<dyn PhaseHandler>>> = Lazy::new(|| {
    vec![
        Box::new(SetupHandler),
        Box::new(StormHandler::default()),
        Box::new(SpiceBlowHandler::default()),
        Box::new(NexusHandler),
        Box::new(ChoamCharityHandler),
        Box::new(BiddingHandler::default()),
        Box::new(RevivalHandler),
        Box::new(ShipmentAndMovementHandler),
        Box::new(BattleHandler::default()),
        Box::new(SpiceCollectionHandler::default()),
        Box::new(MentatPauseHandler),
    ]
});

/// Look up the handler for a phase. `Ended` has none: a finished game can
/// only be torn down.
pub fn handler_for(phase: Phase) -> Result<&'static dyn PhaseHandler, EngineError> {
    HANDLERS
        .iter()
        .find(|h| h.phase() == phase)
        .map(|h| h.as_ref())
        .ok_or_else(|| EngineError::invalid_phase(format!("no handler for phase {phase:?}")))
}

struct SetupHandler;

#[async_trait]
impl PhaseHandler for SetupHandler {
    fn phase(&self) -> Phase {
        Phase::Setup
    }

    async fn run_phase(
        &self,
        game: &mut Game,
        notifier: &dyn Notifier,
    ) -> Result<(), EngineError> {
        notifier
            .post_action(game, "Waiting for players to register.", &[])
            .await
    }

    fn next_phase(&self, _state: &GameState) -> Phase {
        Phase::Storm
    }

    fn description(&self) -> &'static str {
        "Setup: players register and the game is dealt."
    }
}

#[derive(Default)]
struct StormHandler {
    map: MapService,
    battle: BattleService,
}

#[async_trait]
impl PhaseHandler for StormHandler {
    fn phase(&self) -> Phase {
        Phase::Storm
    }

    async fn run_phase(
        &self,
        game: &mut Game,
        notifier: &dyn Notifier,
    ) -> Result<(), EngineError> {
        let state = &mut game.state;
        state.turn += 1;

        let mut rng = ChaCha8Rng::seed_from_u64(derive_storm_seed(state.rng_seed, state.turn));
        let amount = rng.random_range(1..=state.rules.storm_die);
        let start = state.storm_location;

        self.battle.apply_storm_damage(state, start, amount)?;
        state.storm_location = self.map.next_storm_sector(start, amount);
        state.log_action(format!(
            "Turn {}: the storm moves {amount} sectors to sector {}.",
            state.turn, state.storm_location
        ));
        info!(
            game_id = %game.id,
            turn = game.state.turn,
            amount,
            sector = game.state.storm_location,
            "Storm moved"
        );

        let text = format!(
            "Turn {} begins. The storm now rages over sector {}.",
            game.state.turn, game.state.storm_location
        );
        notifier.post_action(game, &text, &[]).await
    }

    fn next_phase(&self, _state: &GameState) -> Phase {
        Phase::SpiceBlow
    }

    fn description(&self) -> &'static str {
        "Storm: the storm moves and destroys what it passes over."
    }
}

#[derive(Default)]
struct SpiceBlowHandler {
    spice: SpiceService,
}

#[async_trait]
impl PhaseHandler for SpiceBlowHandler {
    fn phase(&self) -> Phase {
        Phase::SpiceBlow
    }

    async fn run_phase(
        &self,
        game: &mut Game,
        notifier: &dyn Notifier,
    ) -> Result<(), EngineError> {
        let result = self.spice.resolve_spice_blow(&mut game.state)?;
        let text = match (&result.territory, result.worm_appeared) {
            (Some(t), true) => format!("Shai-Hulud! Then spice surfaces in {t}."),
            (Some(t), false) => format!("Spice surfaces in {t}."),
            (None, true) => "Shai-Hulud, and the spice deck runs dry.".to_string(),
            (None, false) => "The spice deck is exhausted.".to_string(),
        };
        notifier.post_action(game, &text, &[]).await
    }

    fn next_phase(&self, state: &GameState) -> Phase {
        if state.nexus_triggered {
            Phase::Nexus
        } else {
            Phase::ChoamCharity
        }
    }

    fn description(&self) -> &'static str {
        "Spice Blow: the spice deck pays out."
    }
}

struct NexusHandler;

#[async_trait]
impl PhaseHandler for NexusHandler {
    fn phase(&self) -> Phase {
        Phase::Nexus
    }

    async fn run_phase(
        &self,
        game: &mut Game,
        notifier: &dyn Notifier,
    ) -> Result<(), EngineError> {
        game.state
            .log_action("Nexus! Alliances may form or break.");
        notifier
            .post_action(game, "Nexus! Alliances may be formed or broken.", &[])
            .await
    }

    fn next_phase(&self, _state: &GameState) -> Phase {
        Phase::ChoamCharity
    }

    fn description(&self) -> &'static str {
        "Nexus: an alliance window, opened by Shai-Hulud."
    }
}

struct ChoamCharityHandler;

#[async_trait]
impl PhaseHandler for ChoamCharityHandler {
    fn phase(&self) -> Phase {
        Phase::ChoamCharity
    }

    async fn run_phase(
        &self,
        game: &mut Game,
        notifier: &dyn Notifier,
    ) -> Result<(), EngineError> {
        let floor = game.state.rules.charity_floor;
        let eligible: Vec<&'static str> = game
            .state
            .factions
            .iter()
            .filter(|f| f.spice < floor)
            .map(|f| f.faction.display_name())
            .collect();
        let text = if eligible.is_empty() {
            "No faction qualifies for CHOAM charity.".to_string()
        } else {
            format!("CHOAM charity is available to: {}.", eligible.join(", "))
        };
        game.state.log_action(text.clone());
        let buttons = [ActionButton::new("Claim Charity", "claim-charity")];
        notifier.post_action(game, &text, &buttons).await
    }

    fn next_phase(&self, _state: &GameState) -> Phase {
        Phase::Bidding
    }

    fn description(&self) -> &'static str {
        "CHOAM Charity: the destitute are topped up."
    }
}

#[derive(Default)]
struct BiddingHandler {
    bidding: BiddingService,
}

#[async_trait]
impl PhaseHandler for BiddingHandler {
    fn phase(&self) -> Phase {
        Phase::Bidding
    }

    async fn run_phase(
        &self,
        game: &mut Game,
        notifier: &dyn Notifier,
    ) -> Result<(), EngineError> {
        notifier
            .create_bidding_thread(game, "Treachery card auction")
            .await?;
        self.bidding.expire_auction(&mut game.state)?;
        match self.bidding.start_auction(&mut game.state)? {
            Some(_) => {
                let opener = game
                    .state
                    .current_bidder
                    .map(|f| f.display_name())
                    .unwrap_or("nobody");
                let text =
                    format!("A treachery card is up for auction. {opener} opens the bidding.");
                let buttons = [
                    ActionButton::new("Bid", "place-bid"),
                    ActionButton::new("Pass", "pass-bid"),
                ];
                notifier.post_action(game, &text, &buttons).await
            }
            None => {
                notifier
                    .post_action(game, "No treachery cards remain to auction.", &[])
                    .await
            }
        }
    }

    fn next_phase(&self, _state: &GameState) -> Phase {
        Phase::Revival
    }

    fn description(&self) -> &'static str {
        "Bidding: one treachery card goes under the hammer."
    }
}

struct RevivalHandler;

#[async_trait]
impl PhaseHandler for RevivalHandler {
    fn phase(&self) -> Phase {
        Phase::Revival
    }

    async fn run_phase(
        &self,
        game: &mut Game,
        notifier: &dyn Notifier,
    ) -> Result<(), EngineError> {
        for faction in &mut game.state.factions {
            faction.revived_troops_this_turn = 0;
        }
        notifier
            .post_action(
                game,
                "Revival: forces and leaders may be reclaimed from the tanks.",
                &[],
            )
            .await
    }

    fn next_phase(&self, _state: &GameState) -> Phase {
        Phase::ShipmentAndMovement
    }

    fn description(&self) -> &'static str {
        "Revival: the tanks give up their dead, for a price."
    }
}

struct ShipmentAndMovementHandler;

#[async_trait]
impl PhaseHandler for ShipmentAndMovementHandler {
    fn phase(&self) -> Phase {
        Phase::ShipmentAndMovement
    }

    async fn run_phase(
        &self,
        game: &mut Game,
        notifier: &dyn Notifier,
    ) -> Result<(), EngineError> {
        for faction in &mut game.state.factions {
            faction.reset_turn_flags();
        }
        let buttons = [ActionButton::new("Pass", "pass-shipment")];
        notifier
            .post_action(
                game,
                "Shipment and Movement: one shipment and one move per faction.",
                &buttons,
            )
            .await
    }

    fn next_phase(&self, state: &GameState) -> Phase {
        if BattleService::default().battles_exist(state) {
            Phase::Battle
        } else {
            Phase::SpiceCollection
        }
    }

    fn description(&self) -> &'static str {
        "Shipment and Movement: reserves land and armies march."
    }
}

#[derive(Default)]
struct BattleHandler {
    battle: BattleService,
}

#[async_trait]
impl PhaseHandler for BattleHandler {
    fn phase(&self) -> Phase {
        Phase::Battle
    }

    async fn run_phase(
        &self,
        game: &mut Game,
        notifier: &dyn Notifier,
    ) -> Result<(), EngineError> {
        let state = &mut game.state;
        let current_resolved = state
            .current_battle
            .as_ref()
            .is_none_or(|b| !b.is_active);
        if current_resolved {
            if state.current_battle.is_none() && state.pending_battles.is_empty() {
                self.battle.detect_battles(state);
            }
            state.current_battle = state.pending_battles.pop_front();
        }

        match &game.state.current_battle {
            Some(battle) => {
                let text = format!(
                    "Battle for {}: {} against {}. Submit your battle plans.",
                    battle.territory,
                    battle.attacker.display_name(),
                    battle.defender.display_name()
                );
                debug!(game_id = %game.id, territory = %battle.territory, "Battle announced");
                notifier.post_action(game, &text, &[]).await
            }
            None => Ok(()),
        }
    }

    fn next_phase(&self, state: &GameState) -> Phase {
        let active = state
            .current_battle
            .as_ref()
            .is_some_and(|b| b.is_active);
        if active || !state.pending_battles.is_empty() {
            Phase::Battle
        } else {
            Phase::SpiceCollection
        }
    }

    fn description(&self) -> &'static str {
        "Battle: contested territories are settled, one at a time."
    }
}

#[derive(Default)]
struct SpiceCollectionHandler {
    spice: SpiceService,
}

#[async_trait]
impl PhaseHandler for SpiceCollectionHandler {
    fn phase(&self) -> Phase {
        Phase::SpiceCollection
    }

    async fn run_phase(
        &self,
        game: &mut Game,
        notifier: &dyn Notifier,
    ) -> Result<(), EngineError> {
        self.spice.collect_spice(&mut game.state)?;
        notifier
            .post_action(game, "Spice collection: sole occupants harvest.", &[])
            .await
    }

    fn next_phase(&self, _state: &GameState) -> Phase {
        Phase::MentatPause
    }

    fn description(&self) -> &'static str {
        "Spice Collection: the harvesters come out."
    }
}

struct MentatPauseHandler;

#[async_trait]
impl PhaseHandler for MentatPauseHandler {
    fn phase(&self) -> Phase {
        Phase::MentatPause
    }

    async fn run_phase(
        &self,
        game: &mut Game,
        notifier: &dyn Notifier,
    ) -> Result<(), EngineError> {
        game.state.refresh_control();
        let text = match game.state.stronghold_winner() {
            Some(winner) => {
                let line = format!(
                    "{} controls the strongholds of Arrakis and wins the game!",
                    winner.display_name()
                );
                game.state.log_action(line.clone());
                line
            }
            None => format!(
                "Mentat Pause: turn {} of {} is complete.",
                game.state.turn, game.state.rules.max_turns
            ),
        };
        notifier.post_action(game, &text, &[]).await
    }

    fn next_phase(&self, state: &GameState) -> Phase {
        if state.stronghold_winner().is_some() || state.turn >= state.rules.max_turns {
            Phase::Ended
        } else {
            Phase::Storm
        }
    }

    fn description(&self) -> &'static str {
        "Mentat Pause: the turn ends and victory is weighed."
    }
}
