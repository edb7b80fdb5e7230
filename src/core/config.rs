//! Table configuration.
//!
//! One `TableConfig` describes a match: seat count, zone sizes, the turn
//! countdown and the pacing knobs used by bots and the replication layer.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Smallest supported table.
pub const MIN_PLAYERS: usize = 2;

/// Largest supported table.
pub const MAX_PLAYERS: usize = 4;

/// Table configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Number of seats (2-4).
    pub player_count: usize,

    /// Cards dealt face-down to each seat.
    pub hidden_size: usize,

    /// Cards each seat promotes to its stronghold during setup.
    pub stronghold_size: usize,

    /// Cards dealt to each hand before setup.
    pub initial_hand: usize,

    /// Hand size restored by drawing after every play.
    pub hand_size: usize,

    /// Countdown length per turn, in units.
    pub turn_timeout_units: u32,

    /// Wall-clock length of one countdown unit.
    pub unit: Duration,

    /// Minimum bot think delay.
    pub bot_delay_min: Duration,

    /// Maximum bot think delay.
    pub bot_delay_max: Duration,

    /// How often a peer without a snapshot asks the host for one.
    pub sync_poll_interval: Duration,

    /// Log entries shipped with every snapshot.
    pub log_tail: usize,

    /// Withhold hidden-zone contents from snapshots.
    pub redact_hidden: bool,

    /// Fixed seed for the table RNG. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            player_count: 2,
            hidden_size: 3,
            stronghold_size: 3,
            initial_hand: 6,
            hand_size: 3,
            turn_timeout_units: 20,
            unit: Duration::from_secs(1),
            bot_delay_min: Duration::from_millis(600),
            bot_delay_max: Duration::from_millis(1400),
            sync_poll_interval: Duration::from_millis(500),
            log_tail: 20,
            redact_hidden: true,
            seed: None,
        }
    }
}

impl TableConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of seats.
    pub fn with_players(mut self, count: usize) -> Self {
        assert!(
            (MIN_PLAYERS..=MAX_PLAYERS).contains(&count),
            "Player count must be 2-4"
        );
        self.player_count = count;
        self
    }

    /// Set a fixed seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the countdown length in units.
    pub fn with_turn_timeout(mut self, units: u32) -> Self {
        self.turn_timeout_units = units;
        self
    }

    /// Set the wall-clock length of one countdown unit.
    pub fn with_unit(mut self, unit: Duration) -> Self {
        self.unit = unit;
        self
    }

    /// Set the bot think delay range. Zero for headless play.
    pub fn with_bot_delay(mut self, min: Duration, max: Duration) -> Self {
        self.bot_delay_min = min;
        self.bot_delay_max = max.max(min);
        self
    }

    /// Set the peer sync poll interval.
    pub fn with_sync_poll_interval(mut self, interval: Duration) -> Self {
        self.sync_poll_interval = interval;
        self
    }

    /// Set the number of log entries shipped per snapshot.
    pub fn with_log_tail(mut self, entries: usize) -> Self {
        self.log_tail = entries;
        self
    }

    /// Toggle hidden-zone redaction in snapshots.
    pub fn with_redact_hidden(mut self, redact: bool) -> Self {
        self.redact_hidden = redact;
        self
    }

    /// Cards dealt per seat before setup.
    #[must_use]
    pub fn dealt_per_seat(&self) -> usize {
        self.hidden_size + self.initial_hand
    }
}
