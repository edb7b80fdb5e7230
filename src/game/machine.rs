//! The game state machine.
//!
//! `SETUP -> PLAYING -> GAME_OVER`. Every mutation enters through
//! [`GameMachine::apply`], which checks phase and turn ownership once, before
//! any zone is touched. A rejected move changes nothing except the log.

use tracing::{debug, info};

use super::error::Rejection;
use super::event::GameEvent;
use super::moves::{Move, PlayRequest};
use super::player::{locate_cards, SeatSpec};
use super::session::{GameSession, Phase};
use crate::cards::{Card, CardId, Rank};
use crate::core::{GameRng, SeatId, TableConfig};
use crate::rules::{
    group_rank, rank_is_playable, resolve_play, source_zone_open, Constraint, Zone,
};

/// Result of an accepted move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Applied {
    /// The seat that moved.
    pub seat: SeatId,
    /// Phase after the move.
    pub phase: Phase,
    /// Seat to act next.
    pub turn: SeatId,
    /// A fresh turn began (new seat, same seat again, or play just started).
    pub turn_started: bool,
}

/// Single writer for a [`GameSession`].
#[derive(Clone, Debug)]
pub struct GameMachine {
    config: TableConfig,
    session: GameSession,
}

impl GameMachine {
    /// Deal a new match.
    #[must_use]
    pub fn new(config: TableConfig, seats: Vec<SeatSpec>, rng: &mut GameRng) -> Self {
        let session = GameSession::deal(&config, seats, rng);
        info!(
            players = session.player_count(),
            deck = session.deck.len(),
            "Dealt new match"
        );
        Self { config, session }
    }

    /// Take over an existing session (scenario setups, tests).
    #[must_use]
    pub fn from_session(config: TableConfig, session: GameSession) -> Self {
        Self { config, session }
    }

    #[must_use]
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    #[must_use]
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    /// Consume the machine, returning the final session.
    #[must_use]
    pub fn into_session(self) -> GameSession {
        self.session
    }

    pub fn confirm_setup(&mut self, seat: SeatId, face_up: &[CardId]) -> Result<Applied, Rejection> {
        self.apply(
            seat,
            Move::ConfirmSetup {
                face_up: face_up.to_vec(),
            },
        )
    }

    pub fn apply_play(&mut self, seat: SeatId, play: PlayRequest) -> Result<Applied, Rejection> {
        self.apply(seat, Move::Play(play))
    }

    pub fn apply_pickup(&mut self, seat: SeatId) -> Result<Applied, Rejection> {
        self.apply(seat, Move::PickUp)
    }

    /// Forced pickup for a seat whose countdown expired.
    pub fn force_timeout(&mut self, seat: SeatId) -> Result<Applied, Rejection> {
        self.apply(seat, Move::TimedOut)
    }

    /// The single mutation entry point.
    pub fn apply(&mut self, seat: SeatId, mv: Move) -> Result<Applied, Rejection> {
        let result = self.authorize(seat, &mv).and_then(|()| match mv {
            Move::ConfirmSetup { face_up } => self.setup(seat, &face_up),
            Move::Play(play) => self.play(seat, play),
            Move::PickUp => Ok(self.pick_up(seat)),
            Move::TimedOut => {
                self.session.log.push(GameEvent::TimedOut { seat });
                Ok(self.pick_up(seat))
            }
        });

        if let Err(reason) = &result {
            debug!(%seat, %reason, "Move rejected");
            self.session.log.push(GameEvent::Rejected {
                seat,
                reason: reason.clone(),
            });
        }
        result
    }

    /// Phase and turn-ownership check shared by every move.
    fn authorize(&self, seat: SeatId, mv: &Move) -> Result<(), Rejection> {
        let player = self
            .session
            .player(seat)
            .ok_or(Rejection::UnknownSeat { seat })?;
        let phase = self.session.phase;
        if phase == Phase::GameOver {
            return Err(Rejection::GameOver);
        }

        match mv {
            Move::ConfirmSetup { .. } => {
                if phase != Phase::Setup {
                    return Err(Rejection::WrongPhase { phase });
                }
                if player.ready {
                    return Err(Rejection::AlreadyReady { seat });
                }
            }
            Move::Play(_) | Move::PickUp | Move::TimedOut => {
                if phase != Phase::Playing {
                    return Err(Rejection::WrongPhase { phase });
                }
                if seat != self.session.turn {
                    return Err(Rejection::NotYourTurn {
                        seat,
                        turn: self.session.turn,
                    });
                }
            }
        }
        Ok(())
    }

    fn setup(&mut self, seat: SeatId, face_up: &[CardId]) -> Result<Applied, Rejection> {
        let expected = self.config.stronghold_size;
        if face_up.len() != expected {
            return Err(Rejection::InvalidSetup {
                expected,
                got: face_up.len(),
            });
        }

        let player = self.session.player_mut(seat);
        let positions = player
            .locate_in_hand(face_up)
            .ok_or(Rejection::CardsNotInZone { zone: Zone::Hand })?;
        let promoted = player.take(Zone::Hand, &positions);
        player.face_up.extend(promoted);
        player.ready = true;
        self.session.log.push(GameEvent::SetupConfirmed { seat });
        info!(%seat, "Setup confirmed");

        let all_ready = self.session.players.iter().all(|p| p.ready);
        if all_ready {
            self.session.phase = Phase::Playing;
            self.session.turn = SeatId::new(0);
            self.session.log.push(GameEvent::PlayStarted {
                first: self.session.turn,
            });
            info!("All seats ready, starting play");
        }

        Ok(Applied {
            seat,
            phase: self.session.phase,
            turn: self.session.turn,
            turn_started: all_ready,
        })
    }

    fn play(&mut self, seat: SeatId, play: PlayRequest) -> Result<Applied, Rejection> {
        let player = &self.session.players[seat.index()];
        let positions = check_play(
            &player.hand,
            &player.face_up,
            player.hidden.len(),
            &play,
            self.session.top_of_pile().map(|c| c.rank),
            self.session.constraint,
        )?;

        match play {
            PlayRequest::Hidden { slot } => Ok(self.blind_flip(seat, slot)),
            PlayRequest::Hand { .. } | PlayRequest::FaceUp { .. } => {
                let zone = play.zone();
                let played = self.session.player_mut(seat).take(zone, &positions);
                Ok(self.resolve(seat, zone, played))
            }
        }
    }

    /// Flip a hidden card. An illegal flip is a forced pickup, not a rejection.
    fn blind_flip(&mut self, seat: SeatId, slot: usize) -> Applied {
        let card = self.session.player_mut(seat).hidden.remove(slot);
        let top = self.session.top_of_pile().map(|c| c.rank);
        let legal = rank_is_playable(card.rank, top, self.session.constraint);
        self.session.log.push(GameEvent::BlindFlip { seat, card, legal });
        debug!(%seat, %card, legal, "Blind flip");

        if legal {
            return self.resolve(seat, Zone::Hidden, vec![card]);
        }

        self.session.player_mut(seat).hand.push(card);
        self.absorb_pile(seat);
        self.advance_turn();
        self.applied(seat)
    }

    /// Apply a legal group: pile effect, refill, promotion, win check, turn.
    fn resolve(&mut self, seat: SeatId, zone: Zone, played: Vec<Card>) -> Applied {
        let rank = played[0].rank;
        let count = played.len();
        self.session.pile.extend(played);
        self.session.log.push(GameEvent::Played { seat, zone, rank, count });

        let effect = resolve_play(rank);
        if effect.burn {
            let burned: Vec<Card> = self.session.pile.drain(..).collect();
            self.session.log.push(GameEvent::Burned {
                seat,
                cards: burned.len(),
            });
            self.session.burned.extend(burned);
        } else if effect.play_again {
            self.session.log.push(GameEvent::Reset { seat });
        }
        self.session.constraint = effect.constraint;

        self.refill(seat);
        self.promote(seat);

        if self.session.players[seat.index()].is_out() {
            self.session.phase = Phase::GameOver;
            self.session.winner = Some(seat);
            self.session.play_again = false;
            self.session.log.push(GameEvent::Won { seat });
            info!(%seat, "Seat has no cards left, game over");
            return Applied {
                seat,
                phase: Phase::GameOver,
                turn: self.session.turn,
                turn_started: false,
            };
        }

        if effect.play_again {
            self.session.play_again = true;
        } else {
            self.advance_turn();
        }
        self.applied(seat)
    }

    /// Draw back up to the hand size while the deck lasts.
    fn refill(&mut self, seat: SeatId) {
        let target = self.config.hand_size;
        let session = &mut self.session;
        let player = &mut session.players[seat.index()];
        let mut drawn = 0;
        while player.hand.len() < target {
            let Some(card) = session.deck.pop() else {
                break;
            };
            player.hand.push(card);
            drawn += 1;
        }
        if drawn > 0 {
            session.log.push(GameEvent::Drew { seat, cards: drawn });
        }
    }

    /// Move the whole stronghold into the hand once the hand is nearly empty.
    fn promote(&mut self, seat: SeatId) {
        let player = self.session.player_mut(seat);
        if player.hand.len() > 1 || player.face_up.is_empty() {
            return;
        }
        let stronghold = std::mem::take(&mut player.face_up);
        let cards = stronghold.len();
        player.hand.extend(stronghold);
        self.session.log.push(GameEvent::Promoted { seat, cards });
    }

    fn pick_up(&mut self, seat: SeatId) -> Applied {
        if self.session.pile.is_empty() {
            self.session.log.push(GameEvent::Passed { seat });
        } else {
            self.absorb_pile(seat);
        }
        self.advance_turn();
        self.applied(seat)
    }

    fn absorb_pile(&mut self, seat: SeatId) {
        let pile = std::mem::take(&mut self.session.pile);
        let cards = pile.len();
        self.session.player_mut(seat).hand.extend(pile);
        self.session.constraint = Constraint::None;
        self.session.log.push(GameEvent::PickedUp { seat, cards });
    }

    fn advance_turn(&mut self) {
        self.session.play_again = false;
        self.session.turn = self.session.turn.next(self.session.player_count());
    }

    fn applied(&self, seat: SeatId) -> Applied {
        Applied {
            seat,
            phase: self.session.phase,
            turn: self.session.turn,
            turn_started: true,
        }
    }
}

/// Zone, group and rank checks for a play against one seat's zones.
///
/// Returns the positions of the played cards in their zone, or nothing for a
/// blind flip, whose legality is only known once the card is turned over.
pub fn check_play(
    hand: &[Card],
    face_up: &[Card],
    hidden: usize,
    play: &PlayRequest,
    top: Option<Rank>,
    constraint: Constraint,
) -> Result<Vec<usize>, Rejection> {
    let zone = play.zone();
    if !source_zone_open(zone, hand.len(), face_up.len()) {
        return Err(Rejection::ZoneLocked { zone });
    }

    let (source, cards) = match play {
        PlayRequest::Hidden { slot } if *slot < hidden => return Ok(Vec::new()),
        PlayRequest::Hidden { .. } => return Err(Rejection::CardsNotInZone { zone }),
        PlayRequest::Hand { cards } => (hand, cards),
        PlayRequest::FaceUp { cards } => (face_up, cards),
    };

    let rank = match group_rank(cards) {
        Some(rank) => rank,
        None if cards.is_empty() => return Err(Rejection::EmptyGroup),
        None => return Err(Rejection::MixedRanks),
    };
    let positions = locate_cards(source, cards).ok_or(Rejection::CardsNotInZone { zone })?;
    if !rank_is_playable(rank, top, constraint) {
        return Err(Rejection::RankNotPlayable { rank });
    }
    Ok(positions)
}
