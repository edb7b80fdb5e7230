//! Application messages carried over the data channel.
//!
//! Peer intents: `REQUEST_SYNC`, `PLAY`, `PICK_UP`, `SETUP_CONFIRM`.
//! Host broadcast: `SYNC_STATE`. Every message travels in an [`Envelope`]
//! whose sender and timestamp are informational only.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::snapshot::Snapshot;
use crate::cards::Card;
use crate::core::PeerId;
use crate::game::PlayRequest;
use crate::transport::TransportError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// Ask the host for a fresh snapshot.
    RequestSync,
    Play(PlayRequest),
    PickUp,
    /// The sender's chosen stronghold and the cards it keeps in hand.
    SetupConfirm {
        #[serde(rename = "faceUpCards")]
        face_up_cards: Vec<Card>,
        hand: Vec<Card>,
    },
    SyncState(Box<Snapshot>),
}

impl Message {
    /// Whether a peer may send this message.
    #[must_use]
    pub fn is_intent(&self) -> bool {
        !matches!(self, Message::SyncState(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub sender: PeerId,
    pub sent_at_ms: u64,
    pub message: Message,
}

impl Envelope {
    /// Stamp `message` with the sender and the current wall-clock time.
    #[must_use]
    pub fn new(sender: PeerId, message: Message) -> Self {
        let sent_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self {
            sender,
            sent_at_ms,
            message,
        }
    }

    pub fn encode(&self) -> Result<String, TransportError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(frame: &str) -> Result<Self, TransportError> {
        Ok(serde_json::from_str(frame)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Rank, Suit};
    use serde_json::json;

    #[test]
    fn test_intent_wire_format() {
        let play = Message::Play(PlayRequest::FaceUp {
            cards: vec![Card::new(Suit::Hearts, Rank::Nine)],
        });
        assert_eq!(
            serde_json::to_value(&play).unwrap(),
            json!({
                "type": "PLAY",
                "zone": "FACEUP",
                "cards": [{"id": 33, "suit": "HEARTS", "rank": "NINE"}]
            })
        );
        assert_eq!(
            serde_json::to_value(&Message::PickUp).unwrap(),
            json!({"type": "PICK_UP"})
        );
        assert_eq!(
            serde_json::to_value(&Message::RequestSync).unwrap(),
            json!({"type": "REQUEST_SYNC"})
        );
    }

    #[test]
    fn test_setup_confirm_field_names() {
        let msg = Message::SetupConfirm {
            face_up_cards: vec![],
            hand: vec![],
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "SETUP_CONFIRM", "faceUpCards": [], "hand": []})
        );
    }

    #[test]
    fn test_envelope_decodes_what_it_encodes() {
        let envelope = Envelope::new(
            PeerId::random(),
            Message::Play(PlayRequest::Hidden { slot: 2 }),
        );
        let frame = envelope.encode().unwrap();
        assert!(frame.contains(r#""sentAtMs""#));
        assert_eq!(Envelope::decode(&frame).unwrap(), envelope);
    }

    #[test]
    fn test_garbage_is_a_codec_error() {
        assert!(matches!(
            Envelope::decode("{not json"),
            Err(TransportError::Codec(_))
        ));
        assert!(Message::RequestSync.is_intent());
    }
}
