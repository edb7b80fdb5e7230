//! # stronghold
//!
//! Engine for a 2-4 player shedding card game with three zones per seat
//! (hand, face-up stronghold, face-down hidden), plus host-authoritative
//! replication for online play.
//!
//! ## Design Principles
//!
//! 1. **Single Writer**: Only `GameMachine::apply` mutates a session. Local
//!    play, bots, the turn timer and remote intents all funnel through it.
//!
//! 2. **Rejections Are Values**: An illegal move returns a `Rejection` and
//!    leaves the session untouched, apart from a log entry.
//!
//! 3. **Replicas Never Merge**: Peers replace their state wholesale with each
//!    snapshot the host broadcasts.
//!
//! ## Modules
//!
//! - `core`: Seat and peer ids, RNG, table configuration
//! - `cards`: Suits, ranks, cards, deck construction
//! - `rules`: Pure legality and special-rank effects
//! - `game`: Session state, moves, the state machine, event log
//! - `scheduler`: Turn countdown
//! - `bot`: Heuristic bot policy
//! - `table`: Authoritative driver for local play
//! - `transport`: Room signaling, handshake and the data channel
//! - `replication`: Wire protocol, snapshots, host and peer drivers

pub mod bot;
pub mod cards;
pub mod core;
pub mod game;
pub mod replication;
pub mod rules;
pub mod scheduler;
pub mod table;
pub mod transport;

// Re-export commonly used types
pub use crate::core::{GameRng, PeerId, SeatId, TableConfig};

pub use crate::cards::{build_deck, Card, CardId, Rank, Suit};

pub use crate::rules::{is_legal_play, legal_groups, Constraint, Group, Zone};

pub use crate::game::{
    Applied, GameEvent, GameMachine, GameSession, Move, Phase, PlayRequest, Rejection, SeatSpec,
};

pub use crate::bot::{BotPolicy, HeuristicBot};

pub use crate::table::{Authority, LocalTable};

pub use crate::transport::{LocalRelay, MemoryLink, Session, SessionError, Transport, TransportError};

pub use crate::replication::{
    spawn_host, spawn_peer, HostReplicator, LinkEvent, Message, PeerReplica, ReplicationError,
    Snapshot,
};
