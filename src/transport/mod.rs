//! Connection bootstrap and the data channel.
//!
//! ## Key Types
//!
//! - `SignalingRelay`: room registration by code plus signal relay (`LocalRelay` in-process)
//! - `Negotiator`: offer/answer/candidate handshake with early-candidate queueing
//! - `Transport`: ordered, at-most-once frame channel (`MemoryLink` in-process)
//! - `Session`: an explicitly owned, negotiated connection

pub mod error;
pub mod handshake;
pub mod link;
pub mod session;
pub mod signaling;

pub use error::{SessionError, TransportError};
pub use handshake::{NegotiationState, Negotiator};
pub use link::{MemoryLink, Transport};
pub use session::Session;
pub use signaling::{
    Action, LocalRelay, PendingLink, Registration, RegistrationRequest, RegistrationResponse,
    Role, SessionEvent, SignalChannel, SignalMessage, SignalingRelay,
};
