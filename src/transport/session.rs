//! An established host/peer connection.
//!
//! Each `Session` is constructed explicitly and owns its link, so any number
//! of sessions can coexist in one process.

use tracing::{info, warn};

use super::error::TransportError;
use super::handshake::Negotiator;
use super::link::Transport;
use super::signaling::{
    Registration, RegistrationRequest, Role, SessionEvent, SignalingRelay,
};
use crate::core::PeerId;

#[derive(Debug)]
pub struct Session<T> {
    role: Role,
    code: String,
    peer_id: PeerId,
    remote_id: PeerId,
    remote_name: String,
    link: T,
}

impl<T: Transport> Session<T> {
    /// Register with `relay`, wait for the other participant, negotiate the
    /// channel and return once it is open.
    pub async fn establish<R>(relay: &R, request: RegistrationRequest) -> Result<Self, TransportError>
    where
        R: SignalingRelay<Link = T>,
    {
        let Registration {
            role,
            code,
            peer_id,
            mut events,
            mut signals,
            link,
        } = relay.register(request).await?;

        let (remote_name, remote_id) = match events.recv().await {
            Some(SessionEvent::PeerReady { name, peer }) => (name, peer),
            Some(SessionEvent::Error { reason }) => {
                warn!(%code, %reason, "Room reported an error");
                return Err(TransportError::Handshake(reason));
            }
            None => {
                return Err(TransportError::Handshake(
                    "relay closed before the other side arrived".into(),
                ))
            }
        };

        let mut negotiator = Negotiator::new(role, peer_id);
        for msg in negotiator.start() {
            signals.send(msg)?;
        }
        while !negotiator.is_connected() {
            let msg = signals.recv().await.ok_or_else(|| {
                TransportError::Handshake("signaling closed mid-handshake".into())
            })?;
            for reply in negotiator.handle(msg)? {
                signals.send(reply)?;
            }
        }

        let link = link.open(&negotiator)?;
        info!(%code, ?role, remote = %remote_name, "Channel open");
        Ok(Self {
            role,
            code,
            peer_id,
            remote_id,
            remote_name,
            link,
        })
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// This participant's identity on the wire.
    #[must_use]
    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    /// The other participant's identity.
    #[must_use]
    pub fn remote_id(&self) -> PeerId {
        self.remote_id
    }

    #[must_use]
    pub fn remote_name(&self) -> &str {
        &self.remote_name
    }

    pub fn link_mut(&mut self) -> &mut T {
        &mut self.link
    }

    /// Give up the session wrapper and keep the open link. The host's room
    /// code stays reserved until the caller releases it on the relay.
    #[must_use]
    pub fn into_link(self) -> T {
        self.link
    }

    /// Tear the link down. No goodbye is sent; the other side sees the close.
    /// The room code is not freed; see [`leave`](Self::leave).
    pub fn close(&mut self) {
        if self.link.is_open() {
            info!(code = %self.code, "Closing session");
        }
        self.link.close();
    }

    /// Close the link and, on the host side, free the room code on `relay`.
    pub async fn leave<R>(mut self, relay: &R)
    where
        R: SignalingRelay<Link = T>,
    {
        self.close();
        if self.role == Role::Host {
            relay.release(&self.code).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{LocalRelay, MemoryLink};

    #[tokio::test]
    async fn test_establish_opens_link() {
        let relay = LocalRelay::new();
        let host_relay = relay.clone();
        let host = tokio::spawn(async move {
            Session::establish(&host_relay, RegistrationRequest::create("oak", "Ada")).await
        });
        tokio::task::yield_now().await;
        while relay.room_count().await == 0 {
            tokio::task::yield_now().await;
        }

        let mut peer: Session<MemoryLink> =
            Session::establish(&relay, RegistrationRequest::join("oak", "Grace"))
                .await
                .unwrap();
        let mut host = host.await.unwrap().unwrap();

        assert_eq!(host.role(), Role::Host);
        assert_eq!(peer.role(), Role::Peer);
        assert_eq!(host.remote_name(), "Grace");
        assert_eq!(peer.remote_name(), "Ada");
        assert_eq!(host.remote_id(), peer.peer_id());
        assert_eq!(peer.remote_id(), host.peer_id());

        host.link_mut().send("hello".into()).await.unwrap();
        assert_eq!(peer.link_mut().recv().await.as_deref(), Some("hello"));

        host.leave(&relay).await;
        assert_eq!(peer.link_mut().recv().await, None);
        assert_eq!(relay.room_count().await, 0);
    }

    #[tokio::test]
    async fn test_join_unknown_code_fails() {
        let relay = LocalRelay::new();
        let err = Session::establish(&relay, RegistrationRequest::join("nope", "Grace"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Session(_)));
    }
}
