//! Treachery card auctions: strict round-robin bidding with payment routed
//! to the Emperor.

use tracing::{debug, info};

use crate::domain::cards::TreacheryCard;
use crate::domain::factions::Faction;
use crate::domain::state::{GameState, Phase};
use crate::error::EngineError;
use crate::services::deck::DeckService;

/// Outcome of a bid or pass, so the facade can announce resolutions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuctionEvent {
    BidPlaced {
        bidder: Faction,
        amount: u32,
    },
    Passed {
        bidder: Faction,
    },
    /// The rotation returned to the high bidder; the auction settled.
    Won {
        winner: Faction,
        card: TreacheryCard,
        price: u32,
    },
    /// Everyone passed with no standing bid; the card went back on the deck.
    AllPassed,
}

#[derive(Default)]
pub struct BiddingService {
    deck: DeckService,
}

impl BiddingService {
    /// Draw the next card up for auction. Returns the card, or `None` when
    /// both deck and discard are exhausted and no auction can run.
    pub fn start_auction(
        &self,
        state: &mut GameState,
    ) -> Result<Option<TreacheryCard>, EngineError> {
        if state.is_bidding_round_active {
            return Err(EngineError::rule_violation("an auction is already running"));
        }
        let first = state
            .factions
            .first()
            .map(|f| f.faction)
            .ok_or_else(|| EngineError::rule_violation("no factions seated"))?;

        let seed = state.next_shuffle_seed();
        let Some(card) = self.deck.draw(
            &mut state.treachery_deck,
            &mut state.treachery_discard,
            seed,
        ) else {
            state.log_action("The treachery deck is exhausted; no auction this turn.");
            return Ok(None);
        };

        state.current_card = Some(card.clone());
        state.current_bid = 0;
        state.high_bidder = None;
        state.current_bidder = Some(first);
        state.is_bidding_round_active = true;

        state.log_action(format!(
            "A treachery card goes to auction; {} opens the bidding.",
            first.display_name()
        ));
        debug!(opener = first.display_name(), "Auction started");
        Ok(Some(card))
    }

    /// Place a bid. Only the designated bidder may act; the bid must beat
    /// the standing bid and fit the bidder's purse.
    pub fn place_bid(
        &self,
        state: &mut GameState,
        faction: Faction,
        amount: u32,
    ) -> Result<AuctionEvent, EngineError> {
        self.require_active_auction(state)?;
        self.require_designated_bidder(state, faction)?;

        if amount <= state.current_bid {
            return Err(EngineError::rule_violation(format!(
                "bid must exceed the current bid of {}",
                state.current_bid
            )));
        }
        let spice = state.faction_state(faction)?.spice;
        if amount > spice {
            return Err(EngineError::insufficient(format!(
                "bid of {amount} exceeds {spice} spice held"
            )));
        }

        state.current_bid = amount;
        state.high_bidder = Some(faction);
        state.current_bidder = Some(state.next_in_turn_order(faction)?);

        state.log_action(format!("{} bids {amount}.", faction.display_name()));
        Ok(AuctionEvent::BidPlaced {
            bidder: faction,
            amount,
        })
    }

    /// Pass. When the rotation comes back around to the high bidder the
    /// auction resolves; when it comes back to the opening seat with no bid
    /// standing, the card returns to the deck.
    pub fn pass_bid(
        &self,
        state: &mut GameState,
        faction: Faction,
    ) -> Result<AuctionEvent, EngineError> {
        self.require_active_auction(state)?;
        self.require_designated_bidder(state, faction)?;

        let next = state.next_in_turn_order(faction)?;
        state.current_bidder = Some(next);
        state.log_action(format!("{} passes.", faction.display_name()));

        if state.high_bidder == Some(next) {
            return self.resolve_auction_win(state);
        }

        let opening_seat = state.factions[0].faction;
        if state.high_bidder.is_none() && next == opening_seat {
            // Every seat passed: the card goes back on top of the deck.
            let card = state
                .current_card
                .take()
                .ok_or_else(|| EngineError::conflict("active auction without a card"))?;
            state.treachery_deck.push(card);
            self.clear_auction_fields(state);
            state.log_action("All factions pass; the card returns to the deck.");
            info!("Auction abandoned, card returned to deck");
            return Ok(AuctionEvent::AllPassed);
        }

        Ok(AuctionEvent::Passed { bidder: faction })
    }

    /// Close out an auction left hanging from a previous turn: a standing
    /// high bid is honored, otherwise the card goes back on the deck.
    pub fn expire_auction(&self, state: &mut GameState) -> Result<(), EngineError> {
        if !state.is_bidding_round_active {
            return Ok(());
        }
        if state.high_bidder.is_some() {
            self.resolve_auction_win(state)?;
            return Ok(());
        }
        let card = state
            .current_card
            .take()
            .ok_or_else(|| EngineError::conflict("active auction without a card"))?;
        state.treachery_deck.push(card);
        self.clear_auction_fields(state);
        state.log_action("The auction lapses; the card returns to the deck.");
        Ok(())
    }

    /// Settle the auction for the standing high bidder: debit the bid, hand
    /// over the card, and route the payment to the Emperor (unless the
    /// winner *is* the Emperor).
    pub fn resolve_auction_win(&self, state: &mut GameState) -> Result<AuctionEvent, EngineError> {
        self.require_active_auction(state)?;
        let winner = state
            .high_bidder
            .ok_or_else(|| EngineError::rule_violation("no standing bid to resolve"))?;
        let price = state.current_bid;
        if state.faction_state(winner)?.spice < price {
            return Err(EngineError::insufficient(format!(
                "winning bid of {price} exceeds {} spice held",
                state.faction_state(winner)?.spice
            )));
        }
        let card = state
            .current_card
            .take()
            .ok_or_else(|| EngineError::conflict("active auction without a card"))?;

        {
            let fs = state.faction_state_mut(winner)?;
            fs.spice -= price;
            fs.treachery_cards.push(card.clone());
        }
        if winner != Faction::Emperor {
            if let Ok(emperor) = state.faction_state_mut(Faction::Emperor) {
                emperor.spice += price;
            }
        }

        self.clear_auction_fields(state);
        state.log_action(format!(
            "{} wins the auction for {price} spice.",
            winner.display_name()
        ));
        info!(winner = winner.display_name(), price, "Auction resolved");
        Ok(AuctionEvent::Won {
            winner,
            card,
            price,
        })
    }

    fn clear_auction_fields(&self, state: &mut GameState) {
        state.current_card = None;
        state.current_bid = 0;
        state.high_bidder = None;
        state.current_bidder = None;
        state.is_bidding_round_active = false;
    }

    fn require_active_auction(&self, state: &GameState) -> Result<(), EngineError> {
        if state.phase != Phase::Bidding {
            return Err(EngineError::invalid_phase("not in the Bidding phase"));
        }
        if !state.is_bidding_round_active {
            return Err(EngineError::rule_violation("no auction is running"));
        }
        Ok(())
    }

    fn require_designated_bidder(
        &self,
        state: &GameState,
        faction: Faction,
    ) -> Result<(), EngineError> {
        match state.current_bidder {
            Some(expected) if expected == faction => Ok(()),
            Some(expected) => Err(EngineError::not_your_turn(format!(
                "it is {}'s turn to bid",
                expected.display_name()
            ))),
            None => Err(EngineError::rule_violation("no bidder is designated")),
        }
    }
}
