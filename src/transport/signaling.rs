//! Room registration and signal relay.
//!
//! A relay only brokers setup: it maps a human-chosen code to a room of at
//! most two participants and passes opaque signaling messages between them.
//! Game traffic never goes through it.

use std::sync::Arc;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::error::{SessionError, TransportError};
use super::handshake::Negotiator;
use super::link::{MemoryLink, Transport};
use crate::core::PeerId;

const MAX_CODE_LEN: usize = 32;

// =============================================================================
// Wire types
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Host,
    Peer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Join,
}

/// `{action, code, displayName}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub action: Action,
    pub code: String,
    pub display_name: String,
}

impl RegistrationRequest {
    pub fn create(code: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            action: Action::Create,
            code: code.into(),
            display_name: display_name.into(),
        }
    }

    pub fn join(code: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            action: Action::Join,
            code: code.into(),
            display_name: display_name.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub role: Role,
}

/// Asynchronous room notifications.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionEvent {
    /// Both participants are present. Carries the other side's identity.
    PeerReady { name: String, peer: PeerId },
    Error { reason: String },
}

/// Opaque setup messages relayed between the two participants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalMessage {
    Offer { sdp: String },
    Answer { sdp: String },
    IceCandidate { candidate: String },
}

// =============================================================================
// Registration
// =============================================================================

/// This participant's end of the signal relay.
#[derive(Debug)]
pub struct SignalChannel {
    tx: UnboundedSender<SignalMessage>,
    rx: UnboundedReceiver<SignalMessage>,
}

impl SignalChannel {
    #[must_use]
    pub fn pair() -> (Self, Self) {
        let (a_tx, a_rx) = mpsc::unbounded_channel();
        let (b_tx, b_rx) = mpsc::unbounded_channel();
        (Self { tx: a_tx, rx: b_rx }, Self { tx: b_tx, rx: a_rx })
    }

    pub fn send(&self, msg: SignalMessage) -> Result<(), TransportError> {
        self.tx
            .send(msg)
            .map_err(|_| TransportError::Handshake("signaling disconnected".into()))
    }

    pub async fn recv(&mut self) -> Option<SignalMessage> {
        self.rx.recv().await
    }
}

/// A data channel that only opens once the handshake has completed.
#[derive(Debug)]
pub struct PendingLink<T> {
    link: T,
}

impl<T: Transport> PendingLink<T> {
    #[must_use]
    pub fn new(link: T) -> Self {
        Self { link }
    }

    /// Hand the channel out, provided `negotiator` reached the connected state.
    pub fn open(self, negotiator: &Negotiator) -> Result<T, TransportError> {
        if negotiator.is_connected() {
            Ok(self.link)
        } else {
            Err(TransportError::Handshake(format!(
                "channel not negotiated ({:?})",
                negotiator.state()
            )))
        }
    }
}

/// A successful create or join.
#[derive(Debug)]
pub struct Registration<T> {
    pub role: Role,
    pub code: String,
    pub peer_id: PeerId,
    pub events: UnboundedReceiver<SessionEvent>,
    pub signals: SignalChannel,
    pub link: PendingLink<T>,
}

impl<T> Registration<T> {
    #[must_use]
    pub fn response(&self) -> RegistrationResponse {
        RegistrationResponse { role: self.role }
    }
}

/// Something that can register rooms and relay signals.
#[async_trait]
pub trait SignalingRelay: Send + Sync {
    type Link: Transport;

    async fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<Registration<Self::Link>, SessionError>;

    /// Free a room's code. Unknown codes are ignored.
    async fn release(&self, code: &str);
}

// =============================================================================
// In-process relay
// =============================================================================

#[derive(Debug)]
struct Room {
    host_name: String,
    host_id: PeerId,
    host_events: UnboundedSender<SessionEvent>,
    /// The peer's half, handed out on join.
    waiting: Option<(SignalChannel, MemoryLink)>,
}

/// Relay whose rooms live in this process. Cloning shares the rooms.
#[derive(Clone, Debug, Default)]
pub struct LocalRelay {
    rooms: Arc<Mutex<FxHashMap<String, Room>>>,
}

impl LocalRelay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }
}

fn validate_code(code: &str) -> Result<String, SessionError> {
    let code = code.trim();
    let valid = !code.is_empty()
        && code.len() <= MAX_CODE_LEN
        && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if valid {
        Ok(code.to_ascii_lowercase())
    } else {
        Err(SessionError::InvalidCode)
    }
}

#[async_trait]
impl SignalingRelay for LocalRelay {
    type Link = MemoryLink;

    async fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<Registration<MemoryLink>, SessionError> {
        let code = validate_code(&request.code)?;
        let mut rooms = self.rooms.lock().await;

        match request.action {
            Action::Create => {
                if rooms.contains_key(&code) {
                    return Err(SessionError::CodeInUse { code });
                }
                let (host_signals, peer_signals) = SignalChannel::pair();
                let (host_link, peer_link) = MemoryLink::pair();
                let (events_tx, events) = mpsc::unbounded_channel();
                let host_id = PeerId::random();
                rooms.insert(
                    code.clone(),
                    Room {
                        host_name: request.display_name.clone(),
                        host_id,
                        host_events: events_tx,
                        waiting: Some((peer_signals, peer_link)),
                    },
                );
                info!(%code, host = %request.display_name, "Room created");

                Ok(Registration {
                    role: Role::Host,
                    code,
                    peer_id: host_id,
                    events,
                    signals: host_signals,
                    link: PendingLink::new(host_link),
                })
            }
            Action::Join => {
                let room = rooms
                    .get_mut(&code)
                    .ok_or_else(|| SessionError::CodeNotFound { code: code.clone() })?;
                let (signals, link) = room
                    .waiting
                    .take()
                    .ok_or_else(|| SessionError::RoomFull { code: code.clone() })?;

                let (events_tx, events) = mpsc::unbounded_channel();
                let peer_id = PeerId::random();
                let _ = room.host_events.send(SessionEvent::PeerReady {
                    name: request.display_name.clone(),
                    peer: peer_id,
                });
                let _ = events_tx.send(SessionEvent::PeerReady {
                    name: room.host_name.clone(),
                    peer: room.host_id,
                });
                info!(%code, peer = %request.display_name, "Peer joined room");

                Ok(Registration {
                    role: Role::Peer,
                    code,
                    peer_id,
                    events,
                    signals,
                    link: PendingLink::new(link),
                })
            }
        }
    }

    async fn release(&self, code: &str) {
        let Ok(code) = validate_code(code) else {
            return;
        };
        if self.rooms.lock().await.remove(&code).is_some() {
            debug!(%code, "Room released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let req = RegistrationRequest::create("oak-7", "Ada");
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"action":"create","code":"oak-7","displayName":"Ada"}"#);
    }

    #[test]
    fn test_signal_wire_format() {
        let msg = SignalMessage::IceCandidate {
            candidate: "c".into(),
        };
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"type":"ICE_CANDIDATE","candidate":"c"}"#
        );
        let event = SessionEvent::Error {
            reason: "gone".into(),
        };
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"event":"ERROR","reason":"gone"}"#
        );
    }

    #[test]
    fn test_code_validation() {
        assert_eq!(validate_code(" Oak-7 ").unwrap(), "oak-7");
        assert_eq!(validate_code(""), Err(SessionError::InvalidCode));
        assert_eq!(validate_code("no spaces"), Err(SessionError::InvalidCode));
        assert_eq!(validate_code(&"x".repeat(33)), Err(SessionError::InvalidCode));
    }

    #[tokio::test]
    async fn test_create_then_join() {
        let relay = LocalRelay::new();
        let mut host = relay
            .register(RegistrationRequest::create("oak", "Ada"))
            .await
            .unwrap();
        assert_eq!(host.response().role, Role::Host);

        let mut peer = relay
            .register(RegistrationRequest::join("oak", "Grace"))
            .await
            .unwrap();
        assert_eq!(peer.role, Role::Peer);

        assert_eq!(
            host.events.recv().await,
            Some(SessionEvent::PeerReady {
                name: "Grace".into(),
                peer: peer.peer_id,
            })
        );
        assert_eq!(
            peer.events.recv().await,
            Some(SessionEvent::PeerReady {
                name: "Ada".into(),
                peer: host.peer_id,
            })
        );
    }

    #[tokio::test]
    async fn test_registration_failures() {
        let relay = LocalRelay::new();
        relay
            .register(RegistrationRequest::create("oak", "Ada"))
            .await
            .unwrap();

        let err = relay
            .register(RegistrationRequest::create("oak", "Eve"))
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::CodeInUse { code: "oak".into() });

        let err = relay
            .register(RegistrationRequest::join("elm", "Eve"))
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::CodeNotFound { code: "elm".into() });

        relay
            .register(RegistrationRequest::join("oak", "Grace"))
            .await
            .unwrap();
        let err = relay
            .register(RegistrationRequest::join("oak", "Eve"))
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::RoomFull { code: "oak".into() });

        // Failures never disturb the existing room.
        assert_eq!(relay.room_count().await, 1);
    }

    #[tokio::test]
    async fn test_release_frees_code() {
        let relay = LocalRelay::new();
        relay
            .register(RegistrationRequest::create("oak", "Ada"))
            .await
            .unwrap();
        relay.release("oak").await;
        assert_eq!(relay.room_count().await, 0);
        assert!(relay
            .register(RegistrationRequest::create("oak", "Ada"))
            .await
            .is_ok());
    }
}
