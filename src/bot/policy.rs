//! Bot move selection.
//!
//! Policies are trait-based so a table can seat different strategies:
//! - `BotPolicy`: picks the stronghold during setup and a move on its turn
//! - `HeuristicBot`: greedy rank-group play, blind flips at random

use std::time::Duration;

use tracing::debug;

use crate::cards::{Card, CardId, Rank};
use crate::core::{GameRng, SeatId};
use crate::game::{GameSession, Move, PlayRequest};
use crate::rules::{legal_groups, Group, Zone};

// =============================================================================
// Policy trait
// =============================================================================

/// Strategy for a seat without a human behind it.
///
/// Policies only read the session; they hand a [`Move`] back to whoever owns
/// the state machine, so a bot goes through exactly the same checks as a human.
pub trait BotPolicy: Send + Sync {
    /// Choose `count` hand cards to promote to the stronghold.
    fn choose_setup(&mut self, hand: &[Card], count: usize) -> Vec<CardId>;

    /// Choose a move for `seat`, which is the active seat.
    fn choose_move(&mut self, session: &GameSession, seat: SeatId) -> Move;

    /// Pause before acting. Purely cosmetic.
    fn think_delay(&mut self, _min: Duration, _max: Duration) -> Duration {
        Duration::ZERO
    }
}

// =============================================================================
// Heuristic bot
// =============================================================================

/// Greedy bot: plays the biggest cheap group it can, saves Twos and Tens.
#[derive(Clone, Debug)]
pub struct HeuristicBot {
    rng: GameRng,
}

impl HeuristicBot {
    #[must_use]
    pub fn new(rng: GameRng) -> Self {
        Self { rng }
    }
}

impl BotPolicy for HeuristicBot {
    fn choose_setup(&mut self, hand: &[Card], count: usize) -> Vec<CardId> {
        stronghold_picks(hand, count)
    }

    fn choose_move(&mut self, session: &GameSession, seat: SeatId) -> Move {
        let Some(player) = session.player(seat) else {
            return Move::PickUp;
        };
        let Some(zone) = player.playable_zone() else {
            return Move::PickUp;
        };

        if zone == Zone::Hidden {
            // The bot cannot see its hidden cards either.
            let slot = self.rng.gen_range_usize(0..player.hidden.len());
            debug!(%seat, slot, "Bot flips blind");
            return Move::Play(PlayRequest::Hidden { slot });
        }

        let groups = legal_groups(
            player.zone(zone),
            session.top_of_pile(),
            session.constraint,
        );
        match best_group(groups) {
            Some(group) => {
                debug!(%seat, rank = %group.rank, count = group.len(), %zone, "Bot plays");
                PlayRequest::visible(zone, group.cards.to_vec())
                    .map_or(Move::PickUp, Move::Play)
            }
            None => {
                debug!(%seat, "Bot has no legal group, picking up");
                Move::PickUp
            }
        }
    }

    fn think_delay(&mut self, min: Duration, max: Duration) -> Duration {
        self.rng.gen_duration(min, max)
    }
}

/// Twos and Tens are saved for when nothing else fits.
fn is_reserved(rank: Rank) -> bool {
    matches!(rank, Rank::Two | Rank::Ten)
}

/// Pick a group to play, in priority order:
///
/// 1. Twos and Tens are set aside while any other group is legal, whatever
///    its size. `[2, 2, 2, 5]` on an empty pile plays the five.
/// 2. Among what remains, the largest group wins.
/// 3. Ties go to the lower rank.
#[must_use]
pub fn best_group(mut groups: Vec<Group>) -> Option<Group> {
    if groups.iter().any(|g| !is_reserved(g.rank)) {
        groups.retain(|g| !is_reserved(g.rank));
    }
    groups
        .into_iter()
        .max_by(|a, b| a.len().cmp(&b.len()).then(b.rank.cmp(&a.rank)))
}

/// The `count` highest non-wild cards; wild cards are only promoted when the
/// hand runs short of anything else.
#[must_use]
pub fn stronghold_picks(hand: &[Card], count: usize) -> Vec<CardId> {
    let mut ranked: Vec<&Card> = hand.iter().collect();
    ranked.sort_by(|a, b| {
        a.rank
            .is_wild()
            .cmp(&b.rank.is_wild())
            .then(b.rank.cmp(&a.rank))
            .then(a.id.cmp(&b.id))
    });
    ranked.into_iter().take(count).map(|c| c.id).collect()
}
