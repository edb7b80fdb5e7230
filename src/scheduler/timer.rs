//! Logical turn countdown.
//!
//! The timer counts abstract units and knows nothing about wall time, so the
//! authority can drive it from a tokio interval and tests can drive it by hand.

use crate::core::SeatId;
use crate::game::{Applied, Phase};

/// Per-turn countdown for the active seat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnTimer {
    budget: u32,
    remaining: u32,
    seat: Option<SeatId>,
}

impl TurnTimer {
    /// A stopped timer that grants `budget` units per turn.
    #[must_use]
    pub fn new(budget: u32) -> Self {
        Self {
            budget,
            remaining: 0,
            seat: None,
        }
    }

    /// Start a fresh countdown for `seat`.
    pub fn restart(&mut self, seat: SeatId) {
        self.seat = Some(seat);
        self.remaining = self.budget;
    }

    pub fn stop(&mut self) {
        self.seat = None;
        self.remaining = 0;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.seat.is_some()
    }

    /// The seat being timed.
    #[must_use]
    pub fn seat(&self) -> Option<SeatId> {
        self.seat
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// Count down `units`. Returns the stalled seat when the countdown hits
    /// zero; the timer stops until the next [`restart`](Self::restart).
    pub fn tick(&mut self, units: u32) -> Option<SeatId> {
        let seat = self.seat?;
        self.remaining = self.remaining.saturating_sub(units);
        if self.remaining > 0 {
            return None;
        }
        self.stop();
        Some(seat)
    }

    /// Follow the state machine: restart on every fresh turn, stop at game over.
    pub fn observe(&mut self, applied: &Applied) {
        match applied.phase {
            Phase::Playing if applied.turn_started => self.restart(applied.turn),
            Phase::Playing | Phase::Setup => {}
            Phase::GameOver => self.stop(),
        }
    }
}
