use thiserror::Error;

use crate::game::Rejection;
use crate::transport::TransportError;

/// Why an intent could not be sent, or why a replicated session ended.
#[derive(Debug, Error)]
pub enum ReplicationError {
    #[error("no snapshot received yet")]
    NotSynced,

    #[error("this peer has no seat at the table")]
    NotSeated,

    #[error("move rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("connection lost")]
    ConnectionLost,
}
