//! Match state and the state machine that owns it.
//!
//! ## Key Types
//!
//! - `GameSession`: players, deck, pile, burned cards, turn and phase
//! - `GameMachine`: the only writer; every move goes through `apply`
//! - `Move` / `PlayRequest`: what a seat can ask for
//! - `Rejection`: why a move was refused (state left untouched)
//! - `EventLog`: append-only record of what happened

pub mod error;
pub mod event;
pub mod machine;
pub mod moves;
pub mod player;
pub mod session;

pub use error::Rejection;
pub use event::{EventLog, GameEvent, LogEntry};
pub use machine::{check_play, Applied, GameMachine};
pub use moves::{Move, PlayRequest};
pub use player::{locate_cards, Player, SeatKind, SeatSpec};
pub use session::{GameSession, Phase};
