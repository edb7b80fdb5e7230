//! The authoritative side of a table: state machine, turn timer and bots.
//!
//! Both the local table and the replication host own exactly one `Authority`.
//! Every mutation it performs, whatever triggered it, is one synchronous call
//! into [`GameMachine::apply`].

use std::time::Duration;

use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::bot::{BotPolicy, HeuristicBot};
use crate::core::{GameRng, SeatId, TableConfig};
use crate::game::{Applied, GameMachine, GameSession, Move, Phase, Rejection, SeatSpec};
use crate::scheduler::TurnTimer;

/// Single owner of an authoritative session.
pub struct Authority {
    machine: GameMachine,
    timer: TurnTimer,
    bots: FxHashMap<SeatId, Box<dyn BotPolicy>>,
}

impl Authority {
    /// Deal a match. Bot seats get a [`HeuristicBot`] each.
    #[must_use]
    pub fn new(config: TableConfig, seats: Vec<SeatSpec>) -> Self {
        let rng = GameRng::from_seed_or_entropy(config.seed);
        info!(seed = rng.seed(), "Opening table");
        let machine = GameMachine::new(config, seats, &mut rng.for_context("deck"));

        let bots = machine
            .session()
            .players
            .iter()
            .filter(|p| p.is_bot())
            .map(|p| {
                let bot = HeuristicBot::new(rng.for_context(&format!("bot:{}", p.seat.0)));
                (p.seat, Box::new(bot) as Box<dyn BotPolicy>)
            })
            .collect();

        Self::from_parts(machine, bots)
    }

    /// Take over an existing machine with an explicit bot roster.
    #[must_use]
    pub fn from_parts(machine: GameMachine, bots: FxHashMap<SeatId, Box<dyn BotPolicy>>) -> Self {
        let mut timer = TurnTimer::new(machine.config().turn_timeout_units);
        if machine.phase() == Phase::Playing {
            timer.restart(machine.session().turn);
        }
        Self {
            machine,
            timer,
            bots,
        }
    }

    /// Replace the policy driving `seat`.
    pub fn set_bot(&mut self, seat: SeatId, policy: Box<dyn BotPolicy>) {
        self.bots.insert(seat, policy);
    }

    #[must_use]
    pub fn session(&self) -> &GameSession {
        self.machine.session()
    }

    #[must_use]
    pub fn config(&self) -> &TableConfig {
        self.machine.config()
    }

    #[must_use]
    pub fn timer(&self) -> &TurnTimer {
        &self.timer
    }

    #[must_use]
    pub fn is_bot(&self, seat: SeatId) -> bool {
        self.bots.contains_key(&seat)
    }

    /// Apply a move and keep the timer in step with the turn.
    pub fn apply(&mut self, seat: SeatId, mv: Move) -> Result<Applied, Rejection> {
        let applied = self.machine.apply(seat, mv)?;
        self.timer.observe(&applied);
        Ok(applied)
    }

    /// Count down `units`; force a pickup if the active seat ran out of time.
    pub fn tick(&mut self, units: u32) -> Option<Result<Applied, Rejection>> {
        let seat = self.timer.tick(units)?;
        info!(%seat, "Turn timed out, forcing pickup");
        Some(self.apply(seat, Move::TimedOut))
    }

    /// The bot seat that should act next, if any.
    ///
    /// During setup that is the first bot still choosing its stronghold.
    #[must_use]
    pub fn pending_bot(&self) -> Option<SeatId> {
        let session = self.session();
        match session.phase {
            Phase::Setup => session
                .players
                .iter()
                .find(|p| !p.ready && self.bots.contains_key(&p.seat))
                .map(|p| p.seat),
            Phase::Playing => Some(session.turn).filter(|s| self.bots.contains_key(s)),
            Phase::GameOver => None,
        }
    }

    /// Think delay for the pending bot.
    pub fn bot_delay(&mut self) -> Duration {
        let (min, max) = (self.config().bot_delay_min, self.config().bot_delay_max);
        match self.pending_bot().and_then(|s| self.bots.get_mut(&s)) {
            Some(bot) => bot.think_delay(min, max),
            None => Duration::ZERO,
        }
    }

    /// Let the pending bot make one move.
    pub fn bot_step(&mut self) -> Option<Result<Applied, Rejection>> {
        let seat = self.pending_bot()?;
        let session = self.machine.session();
        let bot = self.bots.get_mut(&seat)?;

        let mv = match session.phase {
            Phase::Setup => {
                let hand = &session.players[seat.index()].hand;
                Move::ConfirmSetup {
                    face_up: bot.choose_setup(hand, self.machine.config().stronghold_size),
                }
            }
            _ => bot.choose_move(session, seat),
        };
        debug!(%seat, ?mv, "Bot move");
        Some(self.apply(seat, mv))
    }
}

impl std::fmt::Debug for Authority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authority")
            .field("phase", &self.machine.phase())
            .field("turn", &self.session().turn)
            .field("timer", &self.timer)
            .field("bots", &self.bots.keys().collect::<Vec<_>>())
            .finish()
    }
}
