//! Error types for the session layer.

use chessclock_transport::ConnectionId;

/// Errors that can occur while resolving a connection's session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The connection sent a room action before any `joinRoom`.
    #[error("{0} has not joined a room")]
    NotJoined(ConnectionId),
}
