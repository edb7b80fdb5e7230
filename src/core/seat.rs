//! Seat and peer identification.
//!
//! ## SeatId
//!
//! Type-safe seat index supporting 2-4 players. The seat index is stable for
//! the whole session and doubles as turn order.
//!
//! ## PeerId
//!
//! Identifier of a network participant. A seat filled by a remote player
//! carries the peer's id so the host can map inbound intents back to a seat.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Seat index, 0-based: the first seat is `SeatId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatId(pub u8);

impl SeatId {
    /// Create a new seat ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw seat index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The seat that acts after this one at a table of `player_count` seats.
    ///
    /// ```
    /// use stronghold::core::SeatId;
    ///
    /// assert_eq!(SeatId::new(0).next(3), SeatId::new(1));
    /// assert_eq!(SeatId::new(2).next(3), SeatId::new(0));
    /// ```
    #[must_use]
    pub fn next(self, player_count: usize) -> Self {
        Self(((self.index() + 1) % player_count) as u8)
    }

    /// Iterate over all seats at a table of `player_count` seats.
    pub fn all(player_count: usize) -> impl Iterator<Item = SeatId> {
        (0..player_count as u8).map(SeatId)
    }
}

impl std::fmt::Display for SeatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Seat {}", self.0)
    }
}

/// Network participant identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(pub Uuid);

impl PeerId {
    /// Allocate a fresh random peer id.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
