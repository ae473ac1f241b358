//! Property tests for auction turn order.

use proptest::prelude::*;

use crate::domain::cards::{CardKind, TreacheryCard};
use crate::domain::factions::ALL_FACTIONS;
use crate::domain::state::{GameState, Phase};
use crate::domain::test_state_helpers::{make_game_state, MakeGameStateArgs};
use crate::services::bidding::BiddingService;

fn auction_state(seats: usize) -> GameState {
    let mut state = make_game_state(MakeGameStateArgs {
        phase: Phase::Bidding,
        factions: ALL_FACTIONS[..seats].to_vec(),
        ..Default::default()
    });
    state.treachery_deck = vec![TreacheryCard::new("Baliset", CardKind::Worthless)];
    state
}

proptest! {
    /// The designated bidder always advances one seat at a time, whatever
    /// mix of bids and passes arrives.
    #[test]
    fn prop_bidding_is_strict_round_robin(
        seats in 2usize..=6,
        actions in prop::collection::vec(any::<bool>(), 1..12),
    ) {
        let mut state = auction_state(seats);
        let bidding = BiddingService::default();
        bidding.start_auction(&mut state).unwrap();

        let mut expected_seat = 0usize;
        for is_bid in actions {
            if !state.is_bidding_round_active {
                break;
            }
            let actor = state.current_bidder.unwrap();
            prop_assert_eq!(actor, state.factions[expected_seat].faction);

            if is_bid {
                let amount = state.current_bid + 1;
                if amount > state.faction_state(actor).unwrap().spice {
                    break;
                }
                bidding.place_bid(&mut state, actor, amount).unwrap();
            } else {
                bidding.pass_bid(&mut state, actor).unwrap();
            }
            expected_seat = (expected_seat + 1) % seats;
        }
    }

    /// Passing never moves the standing bid or the high bidder.
    #[test]
    fn prop_passing_preserves_the_standing_bid(
        seats in 3usize..=6,
        amount in 1u32..=10,
        passes in 1usize..=4,
    ) {
        let mut state = auction_state(seats);
        let bidding = BiddingService::default();
        bidding.start_auction(&mut state).unwrap();

        let opener = state.current_bidder.unwrap();
        bidding.place_bid(&mut state, opener, amount).unwrap();

        // Stop short of the pass that would hand the card to the high bidder.
        let passes = passes.min(seats - 2);
        for _ in 0..passes {
            let actor = state.current_bidder.unwrap();
            bidding.pass_bid(&mut state, actor).unwrap();
            prop_assert_eq!(state.current_bid, amount);
            prop_assert_eq!(state.high_bidder, Some(opener));
            prop_assert!(state.is_bidding_round_active);
        }
    }
}
