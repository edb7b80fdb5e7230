//! Single-device play: local bots and pass-and-play humans.

use tracing::{debug, info};

use super::authority::Authority;
use crate::core::{SeatId, TableConfig};
use crate::game::{Applied, GameSession, Move, Phase, Rejection, SeatKind, SeatSpec};

/// Upper bound on consecutive bot moves per call, so a stuck all-bot table
/// cannot spin forever.
const MAX_BOT_RUN: usize = 10_000;

/// A table where every seat lives in this process.
///
/// Human moves come in through [`submit`](Self::submit); bots answer
/// immediately after every human move and every timer tick.
#[derive(Debug)]
pub struct LocalTable {
    authority: Authority,
}

impl LocalTable {
    #[must_use]
    pub fn new(config: TableConfig, seats: Vec<SeatSpec>) -> Self {
        let mut table = Self {
            authority: Authority::new(config, seats),
        };
        table.run_bots(MAX_BOT_RUN);
        table
    }

    /// Convenience: one human at seat 0, bots everywhere else.
    #[must_use]
    pub fn against_bots(config: TableConfig, name: impl Into<String>) -> Self {
        let count = config.player_count;
        let mut seats = vec![SeatSpec::human(name)];
        seats.extend((1..count).map(|i| SeatSpec::bot(format!("Bot {i}"))));
        Self::new(config, seats)
    }

    #[must_use]
    pub fn session(&self) -> &GameSession {
        self.authority.session()
    }

    #[must_use]
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// The human seat the device should be handed to, if any.
    ///
    /// During setup that is the first human who has not confirmed yet.
    #[must_use]
    pub fn awaiting_seat(&self) -> Option<SeatId> {
        let session = self.session();
        match session.phase {
            Phase::Setup => session
                .players
                .iter()
                .find(|p| !p.ready && p.kind == SeatKind::Human)
                .map(|p| p.seat),
            Phase::Playing => Some(session.turn).filter(|s| !self.authority.is_bot(*s)),
            Phase::GameOver => None,
        }
    }

    /// Apply a human move, then let bots respond.
    pub fn submit(&mut self, seat: SeatId, mv: Move) -> Result<Applied, Rejection> {
        if self.authority.is_bot(seat) {
            debug!(%seat, "Ignoring human input for a bot seat");
            return Err(Rejection::NotYourTurn {
                seat,
                turn: self.session().turn,
            });
        }
        let applied = self.authority.apply(seat, mv)?;
        self.run_bots(MAX_BOT_RUN);
        Ok(applied)
    }

    /// Advance the turn countdown by `units`, then let bots respond.
    pub fn tick(&mut self, units: u32) -> Option<Result<Applied, Rejection>> {
        let outcome = self.authority.tick(units);
        if outcome.is_some() {
            self.run_bots(MAX_BOT_RUN);
        }
        outcome
    }

    /// Run bot moves until a human has to act or `limit` is reached.
    /// Returns the number of bot moves applied.
    pub fn run_bots(&mut self, limit: usize) -> usize {
        let mut moves = 0;
        while moves < limit {
            match self.authority.bot_step() {
                Some(Ok(_)) => moves += 1,
                Some(Err(reason)) => {
                    debug!(%reason, "Bot move rejected");
                    break;
                }
                None => break,
            }
        }
        if self.session().phase == Phase::GameOver {
            info!(winner = ?self.session().winner, "Local match finished");
        }
        moves
    }
}
