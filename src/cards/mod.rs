//! Card model: suits, ranks, card identity and deck construction.
//!
//! ## Key Types
//!
//! - `Card`: immutable `Copy` value (id, suit, rank)
//! - `Rank`: Two < Three < ... < Ace, values 2-14, with wild ranks flagged
//! - `build_deck`: 52 distinct cards, Fisher-Yates shuffled

pub mod card;
pub mod deck;

pub use card::{Card, CardId, Rank, Suit, DECK_SIZE};
pub use deck::{build_deck, ordered_deck};
