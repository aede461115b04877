//! Unified error type for the chessclock server.

use chessclock_protocol::ProtocolError;
use chessclock_room::RoomError;
use chessclock_session::SessionError;
use chessclock_transport::TransportError;

/// Top-level error that wraps every layer's error.
///
/// `#[from]` on each variant lets `?` lift layer errors into this one.
#[derive(Debug, thiserror::Error)]
pub enum ChessClockError {
    /// Connection, send, recv or accept failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Encode or decode failure.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Action from a connection that hasn't joined a room.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Rejected room operation.
    #[error(transparent)]
    Room(#[from] RoomError),
}

impl ChessClockError {
    /// Text for an `error` reply to the offending connection, or `None`
    /// if this error is not the client's to hear about.
    pub fn client_message(&self) -> Option<String> {
        match self {
            Self::Session(SessionError::NotJoined(_)) => Some("join a room first".to_owned()),
            Self::Room(e) => Some(e.to_string()),
            Self::Transport(_) | Self::Protocol(_) => None,
        }
    }
}
