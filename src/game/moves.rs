//! Moves a seat can make.
//!
//! The source zone is part of the variant, so a blind flip can only name a
//! slot and a visible play can only name cards.

use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardId};
use crate::rules::Zone;

/// A group play, tagged by source zone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "zone")]
pub enum PlayRequest {
    #[serde(rename = "HAND")]
    Hand { cards: Vec<Card> },
    #[serde(rename = "FACEUP")]
    FaceUp { cards: Vec<Card> },
    /// Blind flip of the hidden card at `slot`.
    #[serde(rename = "HIDDEN")]
    Hidden { slot: usize },
}

impl PlayRequest {
    /// A visible play from `zone`. Returns `None` for the hidden zone.
    #[must_use]
    pub fn visible(zone: Zone, cards: Vec<Card>) -> Option<Self> {
        match zone {
            Zone::Hand => Some(Self::Hand { cards }),
            Zone::FaceUp => Some(Self::FaceUp { cards }),
            Zone::Hidden => None,
        }
    }

    #[must_use]
    pub fn zone(&self) -> Zone {
        match self {
            Self::Hand { .. } => Zone::Hand,
            Self::FaceUp { .. } => Zone::FaceUp,
            Self::Hidden { .. } => Zone::Hidden,
        }
    }
}

/// Every mutation the state machine accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Move {
    /// Promote these hand cards to the stronghold.
    ConfirmSetup { face_up: Vec<CardId> },
    Play(PlayRequest),
    PickUp,
    /// Forced pickup when the turn countdown ran out.
    TimedOut,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Rank, Suit};

    #[test]
    fn test_play_request_wire_format() {
        let play = PlayRequest::Hand {
            cards: vec![Card::new(Suit::Clubs, Rank::Five)],
        };
        let json = serde_json::to_string(&play).unwrap();
        assert_eq!(
            json,
            r#"{"zone":"HAND","cards":[{"id":3,"suit":"CLUBS","rank":"FIVE"}]}"#
        );

        let flip: PlayRequest = serde_json::from_str(r#"{"zone":"HIDDEN","slot":2}"#).unwrap();
        assert_eq!(flip, PlayRequest::Hidden { slot: 2 });
    }

    #[test]
    fn test_visible_rejects_hidden_zone() {
        assert!(PlayRequest::visible(Zone::Hidden, vec![]).is_none());
        assert_eq!(
            PlayRequest::visible(Zone::FaceUp, vec![]).map(|p| p.zone()),
            Some(Zone::FaceUp)
        );
    }
}
