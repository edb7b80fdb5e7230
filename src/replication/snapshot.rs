//! Full-state snapshots shipped from host to peer.
//!
//! A snapshot is the whole session minus the deck's contents, which only the
//! authority may know. Hidden zones are shipped as counts unless the table
//! opts out of redaction. A replica never merges: each snapshot replaces the
//! previous one.

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::core::{PeerId, SeatId};
use crate::game::{GameSession, LogEntry, Phase, Player, SeatKind};
use crate::rules::Constraint;

/// How much of the hidden zones a snapshot reveals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    /// Hidden zones as counts only.
    Public,
    /// Everything except the deck's order.
    Full,
}

impl Visibility {
    #[must_use]
    pub fn from_redaction(redact_hidden: bool) -> Self {
        if redact_hidden {
            Visibility::Public
        } else {
            Visibility::Full
        }
    }
}

/// One seat as a replica sees it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatView {
    pub seat: SeatId,
    pub name: String,
    pub kind: SeatKind,
    pub hand: Vec<Card>,
    #[serde(rename = "faceUpCards")]
    pub face_up: Vec<Card>,
    /// `None` when redacted.
    #[serde(rename = "hiddenCards")]
    pub hidden: Option<Vec<Card>>,
    pub hidden_count: usize,
    #[serde(rename = "readyForPlay")]
    pub ready: bool,
    pub remote_peer: Option<PeerId>,
}

impl SeatView {
    fn capture(player: &Player, visibility: Visibility) -> Self {
        Self {
            seat: player.seat,
            name: player.name.clone(),
            kind: player.kind,
            hand: player.hand.clone(),
            face_up: player.face_up.clone(),
            hidden: (visibility == Visibility::Full).then(|| player.hidden.clone()),
            hidden_count: player.hidden.len(),
            ready: player.ready,
            remote_peer: player.remote_peer,
        }
    }

    #[must_use]
    pub fn card_count(&self) -> usize {
        self.hand.len() + self.face_up.len() + self.hidden_count
    }
}

/// `SYNC_STATE` payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub players: Vec<SeatView>,
    pub deck_count: usize,
    pub pile: Vec<Card>,
    pub burned_count: usize,
    pub turn_index: SeatId,
    pub phase: Phase,
    pub constraint: Constraint,
    pub play_again: bool,
    pub winner: Option<SeatId>,
    pub log_tail: Vec<LogEntry>,
}

impl Snapshot {
    /// Capture `session` with the last `log_tail` log entries.
    #[must_use]
    pub fn capture(session: &GameSession, visibility: Visibility, log_tail: usize) -> Self {
        Self {
            players: session
                .players
                .iter()
                .map(|p| SeatView::capture(p, visibility))
                .collect(),
            deck_count: session.deck.len(),
            pile: session.pile.clone(),
            burned_count: session.burned.len(),
            turn_index: session.turn,
            phase: session.phase,
            constraint: session.constraint,
            play_again: session.play_again,
            winner: session.winner,
            log_tail: session.log.tail(log_tail),
        }
    }

    /// The seat played by `peer`, if any.
    #[must_use]
    pub fn seat_of(&self, peer: PeerId) -> Option<&SeatView> {
        self.players.iter().find(|p| p.remote_peer == Some(peer))
    }

    #[must_use]
    pub fn top_of_pile(&self) -> Option<&Card> {
        self.pile.last()
    }

    /// Cards accounted for by this snapshot. Always 52.
    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.deck_count
            + self.pile.len()
            + self.burned_count
            + self.players.iter().map(SeatView::card_count).sum::<usize>()
    }
}

// =============================================================================
// Canonical board encoding
// =============================================================================

/// Zones, pile and turn state in a fixed layout, for byte-level comparison
/// between an authority and a replica.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Board {
    zones: Vec<(Vec<Card>, Vec<Card>, Option<Vec<Card>>, usize)>,
    deck_count: usize,
    pile: Vec<Card>,
    burned_count: usize,
    turn: SeatId,
    phase: Phase,
    constraint: Constraint,
    play_again: bool,
    winner: Option<SeatId>,
}

impl Board {
    #[must_use]
    pub fn of_session(session: &GameSession, visibility: Visibility) -> Self {
        Self::of_snapshot(&Snapshot::capture(session, visibility, 0))
    }

    #[must_use]
    pub fn of_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            zones: snapshot
                .players
                .iter()
                .map(|p| {
                    (
                        p.hand.clone(),
                        p.face_up.clone(),
                        p.hidden.clone(),
                        p.hidden_count,
                    )
                })
                .collect(),
            deck_count: snapshot.deck_count,
            pile: snapshot.pile.clone(),
            burned_count: snapshot.burned_count,
            turn: snapshot.turn_index,
            phase: snapshot.phase,
            constraint: snapshot.constraint,
            play_again: snapshot.play_again,
            winner: snapshot.winner,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }
}
