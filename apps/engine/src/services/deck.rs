//! Deck handling: seeded shuffles and draw-with-reshuffle.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

#[derive(Default)]
pub struct DeckService;

impl DeckService {
    /// Shuffle a pile in place with a ChaCha stream derived from the game
    /// seed, so replays shuffle identically.
    pub fn shuffle<T>(&self, cards: &mut [T], seed: u64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        cards.shuffle(&mut rng);
    }

    /// Draw the top card. When the deck is empty the discard pile is
    /// reshuffled into it first; `None` means both piles are exhausted.
    pub fn draw<T>(
        &self,
        deck: &mut Vec<T>,
        discard: &mut Vec<T>,
        reshuffle_seed: u64,
    ) -> Option<T> {
        if deck.is_empty() && !discard.is_empty() {
            debug!(recycled = discard.len(), "Reshuffling discard into deck");
            deck.append(discard);
            self.shuffle(deck, reshuffle_seed);
        }
        deck.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuffle_is_deterministic_per_seed() {
        let deck = DeckService;
        let mut a: Vec<u32> = (0..20).collect();
        let mut b: Vec<u32> = (0..20).collect();
        deck.shuffle(&mut a, 42);
        deck.shuffle(&mut b, 42);
        assert_eq!(a, b);

        let mut c: Vec<u32> = (0..20).collect();
        deck.shuffle(&mut c, 43);
        assert_ne!(a, c);
    }

    #[test]
    fn draw_reshuffles_discard_when_deck_runs_out() {
        let deck_svc = DeckService;
        let mut deck: Vec<u32> = vec![1];
        let mut discard: Vec<u32> = vec![2, 3, 4];

        assert_eq!(deck_svc.draw(&mut deck, &mut discard, 9), Some(1));
        // Deck is now empty; next draw recycles the discard.
        let drawn = deck_svc.draw(&mut deck, &mut discard, 9).unwrap();
        assert!([2, 3, 4].contains(&drawn));
        assert!(discard.is_empty());
        assert_eq!(deck.len(), 2);
    }

    #[test]
    fn draw_returns_none_when_everything_is_gone() {
        let deck_svc = DeckService;
        let mut deck: Vec<u32> = Vec::new();
        let mut discard: Vec<u32> = Vec::new();
        assert_eq!(deck_svc.draw(&mut deck, &mut discard, 1), None);
    }
}
