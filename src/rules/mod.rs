//! Rule engine: pure legality and effect decisions.
//!
//! The state machine in [`crate::game`] calls into these functions but this
//! module never touches a session. That keeps the exact same rules usable by
//! the authority, by bots, and by a replica validating its own outgoing intent.

pub mod effects;
pub mod legality;

pub use effects::{resolve_play, Resolution};
pub use legality::{
    group_by_rank, group_rank, is_legal_play, legal_groups, playable_zone, rank_is_playable,
    source_zone_open, Constraint, Group, Zone,
};
