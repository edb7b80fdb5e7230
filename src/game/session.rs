//! The authoritative match aggregate.

use serde::{Deserialize, Serialize};

use super::event::{EventLog, GameEvent};
use super::player::{Player, SeatSpec};
use crate::cards::{build_deck, Card, DECK_SIZE};
use crate::core::{GameRng, SeatId, TableConfig};
use crate::rules::Constraint;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Setup,
    Playing,
    GameOver,
}

/// Full match state. Only [`GameMachine`](super::GameMachine) mutates it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSession {
    /// Index = seat = turn order.
    pub players: Vec<Player>,
    /// Draw pile; the draw end is the end of the vec.
    pub deck: Vec<Card>,
    /// Discard pile; the top is the end of the vec.
    pub pile: Vec<Card>,
    /// Cards a Ten removed from play.
    pub burned: Vec<Card>,
    pub constraint: Constraint,
    pub turn: SeatId,
    pub play_again: bool,
    pub phase: Phase,
    pub winner: Option<SeatId>,
    pub log: EventLog,
}

impl GameSession {
    /// Shuffle a fresh deck and deal hidden cards then hands to every seat.
    ///
    /// Panics if `seats` does not match `config.player_count`.
    #[must_use]
    pub fn deal(config: &TableConfig, seats: Vec<SeatSpec>, rng: &mut GameRng) -> Self {
        assert_eq!(
            seats.len(),
            config.player_count,
            "Seat list must match player count"
        );
        assert!(
            config.dealt_per_seat() * seats.len() <= DECK_SIZE,
            "Not enough cards to deal"
        );

        let mut deck = build_deck(rng);
        let mut players: Vec<Player> = seats
            .into_iter()
            .enumerate()
            .map(|(i, spec)| Player::new(SeatId::new(i as u8), spec))
            .collect();

        for player in &mut players {
            let at = deck.len() - config.hidden_size;
            player.hidden = deck.split_off(at);
        }
        for player in &mut players {
            let at = deck.len() - config.initial_hand;
            player.hand = deck.split_off(at);
        }

        let mut log = EventLog::new();
        log.push(GameEvent::Dealt {
            players: players.len(),
            deck: deck.len(),
        });

        Self {
            players,
            deck,
            pile: Vec::new(),
            burned: Vec::new(),
            constraint: Constraint::None,
            turn: SeatId::new(0),
            play_again: false,
            phase: Phase::Setup,
            winner: None,
            log,
        }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn player(&self, seat: SeatId) -> Option<&Player> {
        self.players.get(seat.index())
    }

    pub(crate) fn player_mut(&mut self, seat: SeatId) -> &mut Player {
        &mut self.players[seat.index()]
    }

    /// The seat whose turn it is.
    #[must_use]
    pub fn active_player(&self) -> &Player {
        &self.players[self.turn.index()]
    }

    #[must_use]
    pub fn top_of_pile(&self) -> Option<&Card> {
        self.pile.last()
    }

    /// Cards across deck, pile, burned and every zone. Always 52.
    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.deck.len()
            + self.pile.len()
            + self.burned.len()
            + self.players.iter().map(Player::card_count).sum::<usize>()
    }

    /// Every card in the session, in a fixed traversal order.
    pub fn all_cards(&self) -> impl Iterator<Item = &Card> {
        self.deck
            .iter()
            .chain(self.pile.iter())
            .chain(self.burned.iter())
            .chain(
                self.players
                    .iter()
                    .flat_map(|p| p.hand.iter().chain(p.face_up.iter()).chain(p.hidden.iter())),
            )
    }
}
