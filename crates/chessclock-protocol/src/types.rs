//! Core protocol types for chessclock's wire format.
//!
//! Every inbound and outbound message is a JSON object with a `"type"`
//! tag. Tags and field names are camelCase because the clients are
//! browsers.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Opaque identifier for a player's current connection binding.
///
/// Reassigned every time the player (re)joins; the stable key across
/// reconnects is the player's name, not this id.
///
/// `#[serde(transparent)]` keeps it a bare string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller-supplied identifier for a room.
///
/// Any non-empty string works; the first `joinRoom` naming it creates it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Actions a client can send.
///
/// Only `JoinRoom` carries identity. Everything else acts on whatever room
/// and player the connection is currently bound to.
///
/// ```text
/// { "type": "joinRoom", "roomId": "lobby", "username": "alice" }
/// { "type": "tap" }
/// { "type": "reset" }
/// { "type": "changeTime", "time": 60000 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Join (or create) a room under a display name. Rejoining with a
    /// name already in the room takes that player's seat back.
    JoinRoom {
        #[serde(rename = "roomId")]
        room_id: RoomId,
        username: String,
    },

    /// End the bound player's turn, or start the clock if it is stopped.
    Tap,

    /// Stop the clock and refill every player's time.
    Reset,

    /// Stop the clock and set a new per-player time limit (milliseconds).
    ///
    /// Signed so a negative value reaches validation and earns an `error`
    /// reply instead of being dropped as undecodable.
    ChangeTime { time: i64 },

    /// Any `type` the server doesn't recognise. Logged and ignored.
    #[serde(other)]
    Unknown,
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Messages the server sends.
///
/// Generic over the snapshot type so this crate stays independent of the
/// clock model.
///
/// ```text
/// { "type": "gameState", "state": { ... } }
/// { "type": "error", "message": "join a room first" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage<S> {
    /// Full snapshot of a room's clock. Sent on every change and every tick.
    GameState { state: S },

    /// Human-readable complaint, sent only to the offending connection.
    Error { message: String },
}

impl<S> ServerMessage<S> {
    /// Shorthand for an [`Error`](Self::Error) message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
