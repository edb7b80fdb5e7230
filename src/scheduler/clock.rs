//! Wall-clock driver for [`TurnTimer`](super::TurnTimer).

use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Emits one tick per countdown unit.
#[derive(Debug)]
pub struct TurnClock {
    interval: Interval,
}

impl TurnClock {
    /// A clock ticking every `unit`. The first tick lands one unit from now.
    #[must_use]
    pub fn new(unit: Duration) -> Self {
        let unit = unit.max(Duration::from_millis(1));
        let mut interval = time::interval_at(Instant::now() + unit, unit);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    /// Wait for the next unit boundary.
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }

    /// Realign the clock so the next tick is a full unit away.
    pub fn reset(&mut self) {
        self.interval.reset();
    }
}
