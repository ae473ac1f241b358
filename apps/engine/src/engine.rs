//! The command facade: loads the aggregate, routes to the right service,
//! persists on success, and notifies the platform.
//!
//! The host serializes command dispatch per game id; exactly one logical
//! command runs against an aggregate at a time.

use std::sync::Arc;

use rand::Rng;
use tracing::info;
use uuid::Uuid;

use crate::domain::battle::{BattlePlan, PrescienceField};
use crate::domain::cards::CardKind;
use crate::domain::factions::Faction;
use crate::domain::state::{Game, GameId, Phase, UserId};
use crate::error::EngineError;
use crate::notify::Notifier;
use crate::render::BoardRenderer;
use crate::repos::games::require_game;
use crate::repos::GameRepo;
use crate::services::battle::BattleService;
use crate::services::bidding::{AuctionEvent, BiddingService};
use crate::services::game_flow::PhaseManager;
use crate::services::movement::MovementService;
use crate::services::revival::RevivalService;
use crate::services::setup::GameSetupService;

pub struct GameEngine {
    repo: Arc<dyn GameRepo>,
    notifier: Arc<dyn Notifier>,
    phase_manager: PhaseManager,
    setup: GameSetupService,
    bidding: BiddingService,
    movement: MovementService,
    revival: RevivalService,
    battle: BattleService,
}

impl GameEngine {
    pub fn new(
        repo: Arc<dyn GameRepo>,
        notifier: Arc<dyn Notifier>,
        renderer: Arc<dyn BoardRenderer>,
    ) -> Self {
        Self {
            phase_manager: PhaseManager::new(repo.clone(), notifier.clone(), renderer),
            repo,
            notifier,
            setup: GameSetupService::default(),
            bidding: BiddingService::default(),
            movement: MovementService::default(),
            revival: RevivalService::default(),
            battle: BattleService::default(),
        }
    }

    /// Create a new game aggregate and its channel group.
    pub async fn create_game(&self, name: &str) -> Result<Game, EngineError> {
        let game = Game::new(Uuid::new_v4(), name, rand::rng().random());
        self.notifier.create_channel_group(&game).await?;
        self.repo.save(&game).await?;
        info!(game_id = %game.id, name, "Game created");
        Ok(game)
    }

    pub async fn register_player(
        &self,
        game_id: GameId,
        user_id: UserId,
        display_name: &str,
    ) -> Result<(), EngineError> {
        let mut game = require_game(self.repo.as_ref(), game_id).await?;
        self.setup
            .register_player(&mut game.state, user_id, display_name)?;
        self.repo.save(&game).await?;
        self.notifier
            .post_action(&game, &format!("{display_name} has joined the game."), &[])
            .await
    }

    /// Deal the game and advance out of Setup into the first storm.
    pub async fn start_game(&self, game_id: GameId) -> Result<(), EngineError> {
        let mut game = require_game(self.repo.as_ref(), game_id).await?;
        self.setup.start_game(&mut game.state)?;
        self.phase_manager.advance_phase(&mut game).await?;
        Ok(())
    }

    pub async fn advance_phase(&self, game_id: GameId) -> Result<Phase, EngineError> {
        let mut game = require_game(self.repo.as_ref(), game_id).await?;
        self.phase_manager.advance_phase(&mut game).await
    }

    /// Top a destitute faction up to the charity floor.
    pub async fn claim_charity(
        &self,
        game_id: GameId,
        user_id: UserId,
    ) -> Result<(), EngineError> {
        let mut game = require_game(self.repo.as_ref(), game_id).await?;
        let faction = game.state.faction_of_player(user_id)?;
        if game.state.phase != Phase::ChoamCharity {
            return Err(EngineError::invalid_phase(
                "charity is only handed out during CHOAM Charity",
            ));
        }
        let floor = game.state.rules.charity_floor;
        let granted = {
            let fs = game.state.faction_state_mut(faction)?;
            if fs.spice >= floor {
                return Err(EngineError::rule_violation(format!(
                    "{} holds {} spice and does not qualify for charity",
                    faction.display_name(),
                    fs.spice
                )));
            }
            let granted = floor - fs.spice;
            fs.spice = floor;
            granted
        };
        game.state.log_action(format!(
            "CHOAM grants {granted} charity to {}.",
            faction.display_name()
        ));
        self.repo.save(&game).await?;
        self.notifier
            .post_action(
                &game,
                &format!("{} claims {granted} spice in charity.", faction.display_name()),
                &[],
            )
            .await
    }

    pub async fn place_bid(
        &self,
        game_id: GameId,
        user_id: UserId,
        amount: u32,
    ) -> Result<(), EngineError> {
        let mut game = require_game(self.repo.as_ref(), game_id).await?;
        let faction = game.state.faction_of_player(user_id)?;
        let event = self.bidding.place_bid(&mut game.state, faction, amount)?;
        self.repo.save(&game).await?;
        self.announce_auction_event(&game, &event).await
    }

    pub async fn pass_bid(&self, game_id: GameId, user_id: UserId) -> Result<(), EngineError> {
        let mut game = require_game(self.repo.as_ref(), game_id).await?;
        let faction = game.state.faction_of_player(user_id)?;
        let event = self.bidding.pass_bid(&mut game.state, faction)?;
        self.repo.save(&game).await?;
        self.announce_auction_event(&game, &event).await
    }

    async fn announce_auction_event(
        &self,
        game: &Game,
        event: &AuctionEvent,
    ) -> Result<(), EngineError> {
        match event {
            AuctionEvent::BidPlaced { bidder, amount } => {
                self.notifier
                    .post_bidding_thread(
                        game,
                        &format!("{} bids {amount}.", bidder.display_name()),
                    )
                    .await
            }
            AuctionEvent::Passed { bidder } => {
                self.notifier
                    .post_bidding_thread(game, &format!("{} passes.", bidder.display_name()))
                    .await
            }
            AuctionEvent::Won {
                winner,
                card,
                price,
            } => {
                self.notifier
                    .post_action(
                        game,
                        &format!(
                            "{} wins {} for {price} spice.",
                            winner.display_name(),
                            card.name
                        ),
                        &[],
                    )
                    .await?;
                self.notifier.archive_bidding_thread(game).await
            }
            AuctionEvent::AllPassed => {
                self.notifier
                    .post_action(game, "All factions pass; the card returns to the deck.", &[])
                    .await?;
                self.notifier.archive_bidding_thread(game).await
            }
        }
    }

    pub async fn ship_forces(
        &self,
        game_id: GameId,
        user_id: UserId,
        territory: &str,
        count: u32,
    ) -> Result<(), EngineError> {
        let mut game = require_game(self.repo.as_ref(), game_id).await?;
        let faction = game.state.faction_of_player(user_id)?;
        self.movement
            .ship_forces(&mut game.state, faction, territory, count)?;
        self.repo.save(&game).await?;
        self.notifier
            .post_action(
                &game,
                &format!(
                    "{} ships {count} forces to {territory}.",
                    faction.display_name()
                ),
                &[],
            )
            .await
    }

    pub async fn move_forces(
        &self,
        game_id: GameId,
        user_id: UserId,
        from: &str,
        to: &str,
        count: u32,
    ) -> Result<(), EngineError> {
        let mut game = require_game(self.repo.as_ref(), game_id).await?;
        let faction = game.state.faction_of_player(user_id)?;
        self.movement
            .move_forces(&mut game.state, faction, from, to, count)?;
        self.repo.save(&game).await?;
        self.notifier
            .post_action(
                &game,
                &format!(
                    "{} moves {count} forces from {from} to {to}.",
                    faction.display_name()
                ),
                &[],
            )
            .await
    }

    pub async fn pass_shipment(
        &self,
        game_id: GameId,
        user_id: UserId,
    ) -> Result<(), EngineError> {
        let mut game = require_game(self.repo.as_ref(), game_id).await?;
        let faction = game.state.faction_of_player(user_id)?;
        self.movement.pass_shipment(&mut game.state, faction)?;
        self.repo.save(&game).await?;
        self.notifier
            .post_action(
                &game,
                &format!("{} passes on shipment and movement.", faction.display_name()),
                &[],
            )
            .await
    }

    pub async fn revive_forces(
        &self,
        game_id: GameId,
        user_id: UserId,
        count: u32,
    ) -> Result<(), EngineError> {
        let mut game = require_game(self.repo.as_ref(), game_id).await?;
        let faction = game.state.faction_of_player(user_id)?;
        self.revival.revive_forces(&mut game.state, faction, count)?;
        self.repo.save(&game).await?;
        self.notifier
            .post_action(
                &game,
                &format!("{} revives {count} forces.", faction.display_name()),
                &[],
            )
            .await
    }

    pub async fn revive_leader(
        &self,
        game_id: GameId,
        user_id: UserId,
        leader: &str,
    ) -> Result<(), EngineError> {
        let mut game = require_game(self.repo.as_ref(), game_id).await?;
        let faction = game.state.faction_of_player(user_id)?;
        self.revival.revive_leader(&mut game.state, faction, leader)?;
        self.repo.save(&game).await?;
        self.notifier
            .post_action(
                &game,
                &format!("{} revives {leader}.", faction.display_name()),
                &[],
            )
            .await
    }

    pub async fn submit_battle_plan(
        &self,
        game_id: GameId,
        user_id: UserId,
        plan: BattlePlan,
    ) -> Result<(), EngineError> {
        let mut game = require_game(self.repo.as_ref(), game_id).await?;
        let faction = game.state.faction_of_player(user_id)?;
        let outcome = self.battle.submit_battle_plan(&mut game.state, faction, plan)?;
        self.repo.save(&game).await?;

        if let Some(disclosure) = &outcome.disclosure {
            self.send_disclosure(&game, disclosure).await?;
        }
        match &outcome.resolution {
            Some(resolution) => {
                let text = match resolution.winner {
                    Some(winner) => format!(
                        "The battle for {} is over: {} wins!",
                        resolution.territory,
                        winner.display_name()
                    ),
                    None => format!("The battle for {} ends in a tie.", resolution.territory),
                };
                self.notifier.post_action(&game, &text, &[]).await
            }
            None => {
                self.notifier
                    .post_action(
                        &game,
                        &format!("{} has committed a battle plan.", faction.display_name()),
                        &[],
                    )
                    .await
            }
        }
    }

    pub async fn use_voice(
        &self,
        game_id: GameId,
        user_id: UserId,
        kind: CardKind,
        must_play: bool,
    ) -> Result<(), EngineError> {
        let mut game = require_game(self.repo.as_ref(), game_id).await?;
        let faction = game.state.faction_of_player(user_id)?;
        self.battle
            .use_voice(&mut game.state, faction, kind, must_play)?;
        self.repo.save(&game).await?;
        let demand = if must_play { "must play" } else { "may not play" };
        let target = game
            .state
            .current_battle
            .as_ref()
            .and_then(|b| b.voice.as_ref())
            .map(|v| v.target.display_name())
            .unwrap_or("the opponent");
        self.notifier
            .post_action(
                &game,
                &format!("The Voice speaks: {target} {demand} a {kind:?} card."),
                &[],
            )
            .await
    }

    pub async fn use_prescience(
        &self,
        game_id: GameId,
        user_id: UserId,
        field: PrescienceField,
    ) -> Result<(), EngineError> {
        let mut game = require_game(self.repo.as_ref(), game_id).await?;
        let faction = game.state.faction_of_player(user_id)?;
        let disclosure = self.battle.use_prescience(&mut game.state, faction, field)?;
        self.repo.save(&game).await?;
        if let Some(disclosure) = &disclosure {
            self.send_disclosure(&game, disclosure).await?;
        }
        self.notifier
            .post_action(
                &game,
                &format!("{} gazes into the future.", faction.display_name()),
                &[],
            )
            .await
    }

    async fn send_disclosure(
        &self,
        game: &Game,
        disclosure: &crate::services::battle::Disclosure,
    ) -> Result<(), EngineError> {
        let Some(user_id) = self.user_of(game, disclosure.to) else {
            return Ok(());
        };
        let text = format!(
            "Prescience reveals {}'s {:?}: {}.",
            disclosure.about.display_name(),
            disclosure.field,
            disclosure.revealed
        );
        self.notifier.send_private(game, user_id, &text).await
    }

    fn user_of(&self, game: &Game, faction: Faction) -> Option<UserId> {
        game.state
            .faction_state(faction)
            .ok()
            .and_then(|f| f.player.as_ref())
            .map(|p| p.user_id)
    }
}
