//! Deck construction.

use super::card::{Card, Rank, Suit, DECK_SIZE};
use crate::core::GameRng;

/// All 52 cards in suit-major order, unshuffled.
#[must_use]
pub fn ordered_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(Card::new(suit, rank));
        }
    }
    deck
}

/// A uniformly shuffled deck: one card per (suit, rank) pair.
///
/// The draw end is the end of the vec.
#[must_use]
pub fn build_deck(rng: &mut GameRng) -> Vec<Card> {
    let mut deck = ordered_deck();
    rng.shuffle(&mut deck);
    deck
}
