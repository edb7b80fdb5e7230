//! Card values: suit, rank and identity.
//!
//! Cards are plain `Copy` values. Identity is the (suit, rank) pair encoded as
//! a `CardId` in `0..52`, so a card can never be aliased or duplicated by
//! copying it around.

use serde::{Deserialize, Serialize};

/// Number of cards in a full deck.
pub const DECK_SIZE: usize = 52;

/// Unique card identity within a deck (`0..52`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u8);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    const fn ordinal(self) -> u8 {
        match self {
            Suit::Clubs => 0,
            Suit::Diamonds => 1,
            Suit::Hearts => 2,
            Suit::Spades => 3,
        }
    }
}

/// Card rank. Ordering is by value, independent of suit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Numeric value: Two = 2 ... Ace = 14.
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten => 10,
            Rank::Jack => 11,
            Rank::Queen => 12,
            Rank::King => 13,
            Rank::Ace => 14,
        }
    }

    /// Two, Seven and Ten may be played on anything.
    #[must_use]
    pub const fn is_wild(self) -> bool {
        matches!(self, Rank::Two | Rank::Seven | Rank::Ten)
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
            other => return write!(f, "{}", other.value()),
        };
        f.write_str(label)
    }
}

/// A playing card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    /// The card for a (suit, rank) pair.
    #[must_use]
    pub const fn new(suit: Suit, rank: Rank) -> Self {
        Self {
            id: CardId(suit.ordinal() * 13 + rank.value() - 2),
            suit,
            rank,
        }
    }

    /// Numeric value of the card's rank.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.rank.value()
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let suit = match self.suit {
            Suit::Clubs => 'c',
            Suit::Diamonds => 'd',
            Suit::Hearts => 'h',
            Suit::Spades => 's',
        };
        write!(f, "{}{}", self.rank, suit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_values() {
        assert_eq!(Rank::Two.value(), 2);
        assert_eq!(Rank::Ten.value(), 10);
        assert_eq!(Rank::Ace.value(), 14);
    }

    #[test]
    fn test_rank_ordering_is_total() {
        for pair in Rank::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].value() < pair[1].value());
        }
    }

    #[test]
    fn test_wild_ranks() {
        let wild: Vec<_> = Rank::ALL.iter().filter(|r| r.is_wild()).collect();
        assert_eq!(wild, vec![&Rank::Two, &Rank::Seven, &Rank::Ten]);
    }

    #[test]
    fn test_card_ids_are_unique() {
        let mut ids: Vec<_> = Suit::ALL
            .iter()
            .flat_map(|&s| Rank::ALL.iter().map(move |&r| Card::new(s, r).id))
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), DECK_SIZE);
        assert_eq!(ids.first(), Some(&CardId(0)));
        assert_eq!(ids.last(), Some(&CardId(51)));
    }

    #[test]
    fn test_card_display() {
        assert_eq!(Card::new(Suit::Hearts, Rank::Queen).to_string(), "Qh");
        assert_eq!(Card::new(Suit::Clubs, Rank::Seven).to_string(), "7c");
    }

    #[test]
    fn test_card_serialization() {
        let card = Card::new(Suit::Spades, Rank::Ace);
        let json = serde_json::to_string(&card).unwrap();
        assert_eq!(json, r#"{"id":51,"suit":"SPADES","rank":"ACE"}"#);
        let back: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(card, back);
    }
}
