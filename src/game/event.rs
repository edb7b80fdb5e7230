//! Append-only match log.
//!
//! Entries are sequence-numbered and stored in an `im::Vector`, so cloning the
//! log into a snapshot is O(1) no matter how long the match runs.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::error::Rejection;
use crate::cards::{Card, Rank};
use crate::core::SeatId;
use crate::rules::Zone;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameEvent {
    Dealt { players: usize, deck: usize },
    SetupConfirmed { seat: SeatId },
    PlayStarted { first: SeatId },
    Played { seat: SeatId, zone: Zone, rank: Rank, count: usize },
    /// A Ten cleared the pile out of play.
    Burned { seat: SeatId, cards: usize },
    /// A Two reset the pile.
    Reset { seat: SeatId },
    BlindFlip { seat: SeatId, card: Card, legal: bool },
    Drew { seat: SeatId, cards: usize },
    /// The stronghold moved into the hand.
    Promoted { seat: SeatId, cards: usize },
    PickedUp { seat: SeatId, cards: usize },
    Passed { seat: SeatId },
    TimedOut { seat: SeatId },
    Won { seat: SeatId },
    Rejected { seat: SeatId, reason: Rejection },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub seq: u64,
    pub event: GameEvent,
}

/// Ordered event log.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventLog {
    entries: Vector<LogEntry>,
    next_seq: u64,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push_back(LogEntry { seq, event });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// The most recent `n` entries, oldest first.
    #[must_use]
    pub fn tail(&self, n: usize) -> Vec<LogEntry> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }
}
