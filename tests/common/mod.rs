//! Shared helpers for integration tests.

#![allow(dead_code)]

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

use stronghold::cards::ordered_deck;
use stronghold::{Card, CardId, GameMachine, GameRng, GameSession, Phase, Rank, SeatId, SeatSpec, Suit, TableConfig};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Install a test subscriber once. Level from `TEST_LOG`, then `RUST_LOG`,
/// then `warn`.
pub fn init_logging() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}

pub fn card(rank: Rank, suit: Suit) -> Card {
    Card::new(suit, rank)
}

pub fn seat(i: u8) -> SeatId {
    SeatId::new(i)
}

/// Seat and zone layout for a hand-built position.
#[derive(Default)]
pub struct Layout {
    pub hand: Vec<Card>,
    pub face_up: Option<Vec<Card>>,
    pub hidden: Option<Vec<Card>>,
}

impl Layout {
    pub fn hand(cards: Vec<Card>) -> Self {
        Self {
            hand: cards,
            ..Self::default()
        }
    }
}

/// A two-seat game in `PLAYING`, seat 0 to move. Zones not given in a layout
/// are filled from the remaining cards so all 52 stay accounted for.
pub fn position(layouts: [Layout; 2], pile: Vec<Card>, deck_size: Option<usize>) -> GameMachine {
    let config = TableConfig::default().with_seed(1);
    let mut session = GameSession::deal(
        &config,
        vec![SeatSpec::human("A"), SeatSpec::human("B")],
        &mut GameRng::new(1),
    );

    let mut used: Vec<CardId> = pile.iter().map(|c| c.id).collect();
    for layout in &layouts {
        used.extend(layout.hand.iter().map(|c| c.id));
        for zone in [&layout.face_up, &layout.hidden].into_iter().flatten() {
            used.extend(zone.iter().map(|c| c.id));
        }
    }
    let mut rest: Vec<Card> = ordered_deck()
        .into_iter()
        .filter(|c| !used.contains(&c.id))
        .collect();

    for (player, layout) in session.players.iter_mut().zip(layouts) {
        player.hand = layout.hand;
        player.face_up = layout
            .face_up
            .unwrap_or_else(|| rest.split_off(rest.len() - 3));
        player.hidden = layout
            .hidden
            .unwrap_or_else(|| rest.split_off(rest.len() - 3));
        player.ready = true;
    }
    session.burned.clear();
    if let Some(size) = deck_size {
        let keep = rest.len().saturating_sub(size);
        session.burned = rest.drain(..keep).collect();
    }
    session.deck = rest;
    session.pile = pile;
    session.phase = Phase::Playing;
    session.turn = SeatId::new(0);
    assert_eq!(session.total_cards(), 52);
    GameMachine::from_session(config, session)
}
