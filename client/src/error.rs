use shared::{MoveError, ProtocolError};
use thiserror::Error;

/// Errors that end a client session.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("server sent an invalid placement: {0}")]
    InvalidPlacement(#[from] MoveError),

    #[error("server sent a client-only {0} message")]
    UnexpectedPacket(&'static str),

    #[error("could not connect to {addr}: {reason}")]
    Connect { addr: String, reason: String },

    #[error("not connected to a server")]
    NotConnected,
}
