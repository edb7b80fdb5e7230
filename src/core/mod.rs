//! Core types shared by every layer: seats, peers, RNG, table configuration.

pub mod config;
pub mod rng;
pub mod seat;

pub use config::{TableConfig, MAX_PLAYERS, MIN_PLAYERS};
pub use rng::GameRng;
pub use seat::{PeerId, SeatId};
