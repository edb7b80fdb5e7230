//! Host-authoritative state replication.
//!
//! The host owns the only [`crate::game::GameMachine`]. Peers send intents
//! (`PLAY`, `PICK_UP`, `SETUP_CONFIRM`, `REQUEST_SYNC`) and receive complete
//! [`Snapshot`]s back, which replace their local state wholesale.
//!
//! ## Key Types
//!
//! - `Message` / `Envelope`: the JSON wire protocol
//! - `Snapshot`: full state minus the deck, with optional hidden-zone redaction
//! - `HostReplicator`: maps peers to seats and filters stale intents
//! - `PeerReplica`: read-only mirror with local intent validation
//! - `spawn_host` / `spawn_peer`: the async drivers over a `Transport`

pub mod error;
pub mod host;
pub mod message;
pub mod peer;
pub mod runtime;
pub mod snapshot;

pub use error::ReplicationError;
pub use host::{HostReplicator, Reply};
pub use message::{Envelope, Message};
pub use peer::PeerReplica;
pub use runtime::{spawn_host, spawn_peer, HostHandle, LinkEvent, PeerHandle};
pub use snapshot::{Board, SeatView, Snapshot, Visibility};
