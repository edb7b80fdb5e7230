//! Per-seat card zones.

use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardId};
use crate::core::{PeerId, SeatId};
use crate::rules::{playable_zone, Zone};

/// Who controls a seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatKind {
    Human,
    Bot,
}

/// How to fill a seat when a session is dealt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeatSpec {
    pub name: String,
    pub kind: SeatKind,
    pub remote_peer: Option<PeerId>,
}

impl SeatSpec {
    pub fn human(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SeatKind::Human,
            remote_peer: None,
        }
    }

    pub fn bot(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SeatKind::Bot,
            remote_peer: None,
        }
    }

    /// A human seat played from across the network.
    pub fn remote(name: impl Into<String>, peer: PeerId) -> Self {
        Self {
            name: name.into(),
            kind: SeatKind::Human,
            remote_peer: Some(peer),
        }
    }
}

/// A seat and its three disjoint card zones.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub seat: SeatId,
    pub name: String,
    pub kind: SeatKind,
    pub hand: Vec<Card>,
    /// The stronghold.
    #[serde(rename = "faceUpCards")]
    pub face_up: Vec<Card>,
    /// Never reordered, never shown to anyone before it is flipped.
    #[serde(rename = "hiddenCards")]
    pub hidden: Vec<Card>,
    /// Setup-phase readiness.
    #[serde(rename = "readyForPlay")]
    pub ready: bool,
    pub remote_peer: Option<PeerId>,
}

impl Player {
    #[must_use]
    pub fn new(seat: SeatId, spec: SeatSpec) -> Self {
        Self {
            seat,
            name: spec.name,
            kind: spec.kind,
            hand: Vec::new(),
            face_up: Vec::new(),
            hidden: Vec::new(),
            ready: false,
            remote_peer: spec.remote_peer,
        }
    }

    #[must_use]
    pub fn is_bot(&self) -> bool {
        self.kind == SeatKind::Bot
    }

    /// Cards in a zone.
    #[must_use]
    pub fn zone(&self, zone: Zone) -> &[Card] {
        match zone {
            Zone::Hand => &self.hand,
            Zone::FaceUp => &self.face_up,
            Zone::Hidden => &self.hidden,
        }
    }

    pub(crate) fn zone_mut(&mut self, zone: Zone) -> &mut Vec<Card> {
        match zone {
            Zone::Hand => &mut self.hand,
            Zone::FaceUp => &mut self.face_up,
            Zone::Hidden => &mut self.hidden,
        }
    }

    /// The zone this seat has to play from right now.
    #[must_use]
    pub fn playable_zone(&self) -> Option<Zone> {
        playable_zone(self.hand.len(), self.face_up.len(), self.hidden.len())
    }

    /// The win predicate: all three zones empty.
    #[must_use]
    pub fn is_out(&self) -> bool {
        self.hand.is_empty() && self.face_up.is_empty() && self.hidden.is_empty()
    }

    #[must_use]
    pub fn card_count(&self) -> usize {
        self.hand.len() + self.face_up.len() + self.hidden.len()
    }

    /// Positions of `cards` in `zone`, or `None` if any is missing or repeated.
    #[must_use]
    pub fn locate(&self, zone: Zone, cards: &[Card]) -> Option<Vec<usize>> {
        locate_cards(self.zone(zone), cards)
    }

    /// Positions of `ids` in the hand, or `None` if any is missing or repeated.
    #[must_use]
    pub fn locate_in_hand(&self, ids: &[CardId]) -> Option<Vec<usize>> {
        locate_by(&self.hand, ids, |card, id| card.id == *id)
    }

    /// Remove the cards at `positions` from `zone`, preserving their order.
    pub(crate) fn take(&mut self, zone: Zone, positions: &[usize]) -> Vec<Card> {
        let mut sorted = positions.to_vec();
        sorted.sort_unstable();
        let cards = self.zone_mut(zone);
        let mut taken: Vec<Card> = sorted.iter().rev().map(|&i| cards.remove(i)).collect();
        taken.reverse();
        taken
    }
}

/// Positions of `cards` in `zone`. Cards must match exactly, not just by id.
#[must_use]
pub fn locate_cards(zone: &[Card], cards: &[Card]) -> Option<Vec<usize>> {
    locate_by(zone, cards, |card, wanted| card == wanted)
}

fn locate_by<K>(zone: &[Card], keys: &[K], matches: impl Fn(&Card, &K) -> bool) -> Option<Vec<usize>> {
    let mut positions: Vec<usize> = Vec::with_capacity(keys.len());
    for key in keys {
        let pos = zone.iter().position(|c| matches(c, key))?;
        if positions.contains(&pos) {
            return None;
        }
        positions.push(pos);
    }
    Some(positions)
}
