//! Turn countdown: forces a pickup when the active seat stalls.
//!
//! Only the authoritative side runs a timer. A replica never times out a seat
//! against its own snapshot.

pub mod clock;
pub mod timer;

pub use clock::TurnClock;
pub use timer::TurnTimer;
