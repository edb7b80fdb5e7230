//! Session and transport failures.
//!
//! Both are terminal for the match they belong to; nothing in this crate
//! retries. Registration failures leave every other room untouched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Room registration failures, reported once to the requester.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionError {
    #[error("session code {code:?} is already in use")]
    CodeInUse { code: String },

    #[error("no session with code {code:?}")]
    CodeNotFound { code: String },

    #[error("session {code:?} already has two participants")]
    RoomFull { code: String },

    #[error("session codes must be 1-32 letters, digits or dashes")]
    InvalidCode,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("channel closed")]
    Closed,

    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("malformed message: {0}")]
    Codec(#[from] serde_json::Error),

    #[error(transparent)]
    Session(#[from] SessionError),
}
