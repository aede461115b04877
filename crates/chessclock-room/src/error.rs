//! Error types for the room layer.
//!
//! `Display` text doubles as the `error` message sent back to the client,
//! so keep it short and free of internal ids where the client gave none.

use chessclock_protocol::RoomId;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// `create` was called for an id that is already in use.
    #[error("room {0} already exists")]
    AlreadyExists(RoomId),

    /// `joinRoom` carried an empty room id.
    #[error("room id must not be empty")]
    EmptyRoomId,

    /// `joinRoom` carried an empty username.
    #[error("username must not be empty")]
    EmptyUsername,

    /// `changeTime` asked for a zero time limit.
    #[error("time limit must be positive, got {0}")]
    InvalidTimeLimit(i64),
}
