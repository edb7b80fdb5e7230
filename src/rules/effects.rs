//! Power-card resolution.
//!
//! | Rank  | Pile          | Constraint after | Turn            |
//! |-------|---------------|------------------|-----------------|
//! | Two   | cards added   | `None`           | same seat again |
//! | Seven | cards added   | `BelowSeven`     | advances        |
//! | Ten   | pile burned   | `None`           | same seat again |
//! | other | cards added   | `None`           | advances        |

use serde::{Deserialize, Serialize};

use super::legality::Constraint;
use crate::cards::Rank;

/// What a legal play of a rank does to the pile, constraint and turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Remove the whole pile (including the cards just played) from play.
    pub burn: bool,
    /// Constraint in force after the play.
    pub constraint: Constraint,
    /// The same seat plays again.
    pub play_again: bool,
}

/// Resolve the effect of a legal play of `rank`.
#[must_use]
pub fn resolve_play(rank: Rank) -> Resolution {
    match rank {
        Rank::Two => Resolution {
            burn: false,
            constraint: Constraint::None,
            play_again: true,
        },
        Rank::Seven => Resolution {
            burn: false,
            constraint: Constraint::BelowSeven,
            play_again: false,
        },
        Rank::Ten => Resolution {
            burn: true,
            constraint: Constraint::None,
            play_again: true,
        },
        _ => Resolution {
            burn: false,
            constraint: Constraint::None,
            play_again: false,
        },
    }
}
