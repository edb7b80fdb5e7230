//! Authoritative drivers.
//!
//! [`Authority`] is the single writer used by every topology; [`LocalTable`]
//! runs it for bots and pass-and-play on one device. The networked host in
//! [`crate::replication`] wraps the same `Authority`.

pub mod authority;
pub mod local;

pub use authority::Authority;
pub use local::LocalTable;
