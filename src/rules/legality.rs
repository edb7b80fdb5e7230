//! Play legality.
//!
//! Everything here is a pure function of the candidate cards, the top of the
//! pile and the active constraint. Zone access is decided separately by
//! [`playable_zone`]: hand first, then stronghold, then the blind zone.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{Card, Rank};

/// Temporary restriction on the next play.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Constraint {
    #[default]
    None,
    /// Set by a Seven: the next play must rank below seven.
    BelowSeven,
}

/// The three card zones a seat owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    #[serde(rename = "HAND")]
    Hand,
    /// The stronghold.
    #[serde(rename = "FACEUP")]
    FaceUp,
    #[serde(rename = "HIDDEN")]
    Hidden,
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Zone::Hand => "hand",
            Zone::FaceUp => "stronghold",
            Zone::Hidden => "hidden",
        })
    }
}

/// The zone a seat must play from, given its zone sizes.
///
/// Returns `None` once every zone is empty.
#[must_use]
pub fn playable_zone(hand: usize, face_up: usize, hidden: usize) -> Option<Zone> {
    if hand > 0 {
        Some(Zone::Hand)
    } else if face_up > 0 {
        Some(Zone::FaceUp)
    } else if hidden > 0 {
        Some(Zone::Hidden)
    } else {
        None
    }
}

/// Source-zone precondition: the stronghold opens once the hand is empty,
/// the hidden zone once both hand and stronghold are empty.
#[must_use]
pub fn source_zone_open(zone: Zone, hand: usize, face_up: usize) -> bool {
    match zone {
        Zone::Hand => true,
        Zone::FaceUp => hand == 0,
        Zone::Hidden => hand == 0 && face_up == 0,
    }
}

/// The shared rank of a group, or `None` if empty or mixed.
#[must_use]
pub fn group_rank(group: &[Card]) -> Option<Rank> {
    let first = group.first()?.rank;
    group.iter().all(|c| c.rank == first).then_some(first)
}

/// Whether a single rank may be played onto `top` under `constraint`.
#[must_use]
pub fn rank_is_playable(rank: Rank, top: Option<Rank>, constraint: Constraint) -> bool {
    if rank.is_wild() {
        return true;
    }
    let Some(top) = top else {
        return true;
    };
    match constraint {
        Constraint::BelowSeven => rank.value() < 7,
        Constraint::None => rank.value() >= top.value(),
    }
}

/// Whether `group` is a legal play onto `top` under `constraint`.
///
/// Empty and mixed-rank groups are never legal.
///
/// ```
/// use stronghold::cards::{Card, Rank, Suit};
/// use stronghold::rules::{is_legal_play, Constraint};
///
/// let ace = Card::new(Suit::Spades, Rank::Ace);
/// let two = Card::new(Suit::Hearts, Rank::Two);
/// assert!(is_legal_play(&[two], Some(&ace), Constraint::BelowSeven));
///
/// let four = Card::new(Suit::Clubs, Rank::Four);
/// let eight = Card::new(Suit::Clubs, Rank::Eight);
/// assert!(!is_legal_play(&[four], Some(&eight), Constraint::None));
/// ```
#[must_use]
pub fn is_legal_play(group: &[Card], top: Option<&Card>, constraint: Constraint) -> bool {
    group_rank(group)
        .is_some_and(|rank| rank_is_playable(rank, top.map(|c| c.rank), constraint))
}

/// Cards of one rank taken from a zone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub rank: Rank,
    pub cards: SmallVec<[Card; 4]>,
}

impl Group {
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Split a zone into rank groups, ordered by rank.
#[must_use]
pub fn group_by_rank(cards: &[Card]) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    for &card in cards {
        match groups.iter_mut().find(|g| g.rank == card.rank) {
            Some(group) => group.cards.push(card),
            None => groups.push(Group {
                rank: card.rank,
                cards: SmallVec::from_slice(&[card]),
            }),
        }
    }
    groups.sort_by_key(|g| g.rank);
    groups
}

/// Every full rank group in `cards` that may legally be played.
#[must_use]
pub fn legal_groups(cards: &[Card], top: Option<&Card>, constraint: Constraint) -> Vec<Group> {
    let top = top.map(|c| c.rank);
    group_by_rank(cards)
        .into_iter()
        .filter(|g| rank_is_playable(g.rank, top, constraint))
        .collect()
}
