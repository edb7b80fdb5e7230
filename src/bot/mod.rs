//! Bot seats. Bots only run on the authoritative side.

pub mod policy;

pub use policy::{best_group, stronghold_picks, BotPolicy, HeuristicBot};
