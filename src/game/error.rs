//! Move rejection taxonomy.
//!
//! A rejection is never fatal: the state machine leaves every zone untouched,
//! appends a `Rejected` log entry and hands the reason back to the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::session::Phase;
use crate::cards::Rank;
use crate::core::SeatId;
use crate::rules::Zone;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rejection {
    #[error("move not allowed during {phase:?}")]
    WrongPhase { phase: Phase },

    #[error("{seat} acted out of turn (turn belongs to {turn})")]
    NotYourTurn { seat: SeatId, turn: SeatId },

    #[error("no such seat: {seat}")]
    UnknownSeat { seat: SeatId },

    #[error("no cards played")]
    EmptyGroup,

    #[error("cards played together must share a rank")]
    MixedRanks,

    #[error("cards are not in the {zone}")]
    CardsNotInZone { zone: Zone },

    #[error("the {zone} is not playable yet")]
    ZoneLocked { zone: Zone },

    #[error("{rank} cannot be played on the current pile")]
    RankNotPlayable { rank: Rank },

    #[error("setup needs exactly {expected} stronghold cards, got {got}")]
    InvalidSetup { expected: usize, got: usize },

    #[error("{seat} already confirmed setup")]
    AlreadyReady { seat: SeatId },

    #[error("the game is over")]
    GameOver,
}
