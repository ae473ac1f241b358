//! Auction turn order, validation, and resolution.

use crate::domain::cards::{CardKind, TreacheryCard};
use crate::domain::factions::Faction;
use crate::domain::state::{GameState, Phase};
use crate::domain::test_state_helpers::{make_game_state, MakeGameStateArgs};
use crate::error::EngineError;
use crate::services::bidding::{AuctionEvent, BiddingService};

fn bidding_state() -> GameState {
    let mut state = make_game_state(MakeGameStateArgs {
        phase: Phase::Bidding,
        factions: vec![Faction::Atreides, Faction::Harkonnen, Faction::Emperor],
        ..Default::default()
    });
    state.treachery_deck = vec![TreacheryCard::new("Snooper", CardKind::Defense)];
    state
}

#[test]
fn auction_opens_at_seat_zero() {
    let mut state = bidding_state();
    let card = BiddingService::default().start_auction(&mut state).unwrap();

    assert!(card.is_some());
    assert!(state.is_bidding_round_active);
    assert!(state.current_card.is_some());
    assert_eq!(state.current_bidder, Some(Faction::Atreides));
    assert_eq!(state.current_bid, 0);
    assert_eq!(state.high_bidder, None);
}

#[test]
fn auction_resolves_when_rotation_returns_to_high_bidder() {
    // Atreides bids 3, Harkonnen bids 5, the rest pass; the rotation comes
    // back to Harkonnen, who wins and pays the Emperor.
    let mut state = bidding_state();
    let bidding = BiddingService::default();
    bidding.start_auction(&mut state).unwrap();

    bidding.place_bid(&mut state, Faction::Atreides, 3).unwrap();
    assert_eq!(state.current_bidder, Some(Faction::Harkonnen));
    bidding.place_bid(&mut state, Faction::Harkonnen, 5).unwrap();
    assert_eq!(state.current_bidder, Some(Faction::Emperor));
    bidding.pass_bid(&mut state, Faction::Emperor).unwrap();

    let event = bidding.pass_bid(&mut state, Faction::Atreides).unwrap();
    match event {
        AuctionEvent::Won { winner, price, .. } => {
            assert_eq!(winner, Faction::Harkonnen);
            assert_eq!(price, 5);
        }
        other => panic!("expected a win, got {other:?}"),
    }

    assert_eq!(state.faction_state(Faction::Harkonnen).unwrap().spice, 5);
    assert_eq!(state.faction_state(Faction::Harkonnen).unwrap().treachery_cards.len(), 1);
    // A non-Emperor winner's payment credits the Emperor.
    assert_eq!(state.faction_state(Faction::Emperor).unwrap().spice, 15);

    // Every transient auction field resets.
    assert_eq!(state.current_card, None);
    assert_eq!(state.current_bid, 0);
    assert_eq!(state.high_bidder, None);
    assert_eq!(state.current_bidder, None);
    assert!(!state.is_bidding_round_active);
}

#[test]
fn emperor_win_does_not_pay_the_emperor() {
    let mut state = bidding_state();
    let bidding = BiddingService::default();
    bidding.start_auction(&mut state).unwrap();

    bidding.pass_bid(&mut state, Faction::Atreides).unwrap();
    bidding.pass_bid(&mut state, Faction::Harkonnen).unwrap();
    bidding.place_bid(&mut state, Faction::Emperor, 4).unwrap();
    bidding.pass_bid(&mut state, Faction::Atreides).unwrap();
    let event = bidding.pass_bid(&mut state, Faction::Harkonnen).unwrap();

    assert!(matches!(event, AuctionEvent::Won { winner: Faction::Emperor, .. }));
    assert_eq!(state.faction_state(Faction::Emperor).unwrap().spice, 6);
}

#[test]
fn only_the_designated_bidder_may_act() {
    let mut state = bidding_state();
    let bidding = BiddingService::default();
    bidding.start_auction(&mut state).unwrap();

    let err = bidding.place_bid(&mut state, Faction::Emperor, 2).unwrap_err();
    assert!(matches!(err, EngineError::NotYourTurn { .. }));
    let err = bidding.pass_bid(&mut state, Faction::Harkonnen).unwrap_err();
    assert!(matches!(err, EngineError::NotYourTurn { .. }));
}

#[test]
fn bids_must_climb_and_fit_the_purse() {
    let mut state = bidding_state();
    let bidding = BiddingService::default();
    bidding.start_auction(&mut state).unwrap();
    bidding.place_bid(&mut state, Faction::Atreides, 3).unwrap();

    let err = bidding.place_bid(&mut state, Faction::Harkonnen, 3).unwrap_err();
    assert!(matches!(err, EngineError::RuleViolation { .. }));

    // Each faction starts the test with 10 spice.
    let err = bidding.place_bid(&mut state, Faction::Harkonnen, 11).unwrap_err();
    assert!(matches!(err, EngineError::InsufficientResource { .. }));

    // Failed bids leave the auction untouched.
    assert_eq!(state.current_bid, 3);
    assert_eq!(state.high_bidder, Some(Faction::Atreides));
    assert_eq!(state.current_bidder, Some(Faction::Harkonnen));
}

#[test]
fn passing_never_touches_the_standing_bid() {
    let mut state = bidding_state();
    let bidding = BiddingService::default();
    bidding.start_auction(&mut state).unwrap();
    bidding.place_bid(&mut state, Faction::Atreides, 2).unwrap();

    bidding.pass_bid(&mut state, Faction::Harkonnen).unwrap();
    assert_eq!(state.current_bid, 2);
    assert_eq!(state.high_bidder, Some(Faction::Atreides));
}

#[test]
fn all_passes_return_the_card_to_the_deck() {
    let mut state = bidding_state();
    let bidding = BiddingService::default();
    bidding.start_auction(&mut state).unwrap();
    assert!(state.treachery_deck.is_empty());

    bidding.pass_bid(&mut state, Faction::Atreides).unwrap();
    bidding.pass_bid(&mut state, Faction::Harkonnen).unwrap();
    let event = bidding.pass_bid(&mut state, Faction::Emperor).unwrap();

    assert_eq!(event, AuctionEvent::AllPassed);
    assert_eq!(state.treachery_deck.len(), 1);
    assert_eq!(state.current_card, None);
    assert!(!state.is_bidding_round_active);
    assert_eq!(state.current_bidder, None);
}

#[test]
fn a_lapsed_auction_with_a_standing_bid_resolves_on_expiry() {
    let mut state = bidding_state();
    let bidding = BiddingService::default();
    bidding.start_auction(&mut state).unwrap();
    bidding.place_bid(&mut state, Faction::Atreides, 2).unwrap();

    bidding.expire_auction(&mut state).unwrap();

    assert!(!state.is_bidding_round_active);
    assert_eq!(state.faction_state(Faction::Atreides).unwrap().spice, 8);
    assert_eq!(
        state.faction_state(Faction::Atreides).unwrap().treachery_cards.len(),
        1
    );
}

#[test]
fn a_lapsed_auction_with_no_bid_returns_the_card() {
    let mut state = bidding_state();
    let bidding = BiddingService::default();
    bidding.start_auction(&mut state).unwrap();

    bidding.expire_auction(&mut state).unwrap();

    assert!(!state.is_bidding_round_active);
    assert_eq!(state.treachery_deck.len(), 1);
    assert_eq!(state.current_card, None);
}

#[test]
fn empty_deck_and_discard_yield_no_auction() {
    let mut state = bidding_state();
    state.treachery_deck.clear();
    let card = BiddingService::default().start_auction(&mut state).unwrap();

    assert_eq!(card, None);
    assert!(!state.is_bidding_round_active);
    assert_eq!(state.current_card, None);
}

#[test]
fn empty_deck_reshuffles_the_discard_before_auction() {
    let mut state = bidding_state();
    state.treachery_deck.clear();
    state.treachery_discard = vec![TreacheryCard::new("Kulon", CardKind::Worthless)];

    let card = BiddingService::default().start_auction(&mut state).unwrap();

    assert_eq!(card.unwrap().name, "Kulon");
    assert!(state.treachery_discard.is_empty());
}
