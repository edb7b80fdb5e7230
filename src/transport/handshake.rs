//! Offer/answer/candidate negotiation.
//!
//! The host offers, the peer answers, both trickle connectivity candidates.
//! Signaling is not ordered, so candidates that arrive before the remote
//! description are queued and applied once it is set.

use tracing::debug;

use super::error::TransportError;
use super::signaling::{Role, SignalMessage};
use crate::core::PeerId;

/// Candidates each side advertises.
const LOCAL_CANDIDATES: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NegotiationState {
    New,
    /// Host sent its offer, waiting for the answer.
    HaveLocalOffer,
    /// Both descriptions set, waiting for a usable remote candidate.
    Connecting,
    Connected,
}

/// One side of the handshake.
#[derive(Debug)]
pub struct Negotiator {
    role: Role,
    local_id: PeerId,
    local_description: Option<String>,
    remote_description: Option<String>,
    pending: Vec<String>,
    applied: Vec<String>,
}

impl Negotiator {
    #[must_use]
    pub fn new(role: Role, local_id: PeerId) -> Self {
        Self {
            role,
            local_id,
            local_description: None,
            remote_description: None,
            pending: Vec::new(),
            applied: Vec::new(),
        }
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn state(&self) -> NegotiationState {
        match (&self.local_description, &self.remote_description) {
            (None, _) => NegotiationState::New,
            (Some(_), None) => NegotiationState::HaveLocalOffer,
            (Some(_), Some(_)) if self.applied.is_empty() => NegotiationState::Connecting,
            (Some(_), Some(_)) => NegotiationState::Connected,
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state() == NegotiationState::Connected
    }

    /// Candidates waiting for the remote description.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.pending.len()
    }

    /// Opening messages. The host offers; the peer waits for the offer.
    pub fn start(&mut self) -> Vec<SignalMessage> {
        if self.role != Role::Host || self.local_description.is_some() {
            return Vec::new();
        }
        let sdp = format!("offer:{}", self.local_id);
        self.local_description = Some(sdp.clone());
        let mut out = vec![SignalMessage::Offer { sdp }];
        out.extend(self.local_candidates());
        out
    }

    /// Feed one signaling message; returns the replies to relay back.
    pub fn handle(&mut self, msg: SignalMessage) -> Result<Vec<SignalMessage>, TransportError> {
        match msg {
            SignalMessage::Offer { sdp } => {
                if self.role != Role::Peer || self.remote_description.is_some() {
                    return Err(TransportError::Handshake("unexpected offer".into()));
                }
                self.remote_description = Some(sdp);
                let answer = format!("answer:{}", self.local_id);
                self.local_description = Some(answer.clone());
                self.flush_pending();

                let mut out = vec![SignalMessage::Answer { sdp: answer }];
                out.extend(self.local_candidates());
                Ok(out)
            }
            SignalMessage::Answer { sdp } => {
                if self.role != Role::Host || self.state() != NegotiationState::HaveLocalOffer {
                    return Err(TransportError::Handshake("unexpected answer".into()));
                }
                self.remote_description = Some(sdp);
                self.flush_pending();
                Ok(Vec::new())
            }
            SignalMessage::IceCandidate { candidate } => {
                if self.remote_description.is_none() {
                    debug!(%candidate, "Queueing early candidate");
                    self.pending.push(candidate);
                } else {
                    self.applied.push(candidate);
                }
                Ok(Vec::new())
            }
        }
    }

    fn flush_pending(&mut self) {
        if !self.pending.is_empty() {
            debug!(count = self.pending.len(), "Replaying queued candidates");
        }
        self.applied.append(&mut self.pending);
    }

    fn local_candidates(&self) -> Vec<SignalMessage> {
        (0..LOCAL_CANDIDATES)
            .map(|i| SignalMessage::IceCandidate {
                candidate: format!("cand:{}:{i}", self.local_id),
            })
            .collect()
    }
}
