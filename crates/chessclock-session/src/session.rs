//! Session types: what a connection is currently bound to.

use chessclock_protocol::{PlayerId, RoomId};
use chessclock_transport::ConnectionId;

use crate::{SessionError, generate_player_id};

// ---------------------------------------------------------------------------
// SessionContext
// ---------------------------------------------------------------------------

/// The room and seat identity a connection acts as.
///
/// Passed by value alongside every inbound action; never a pointer into
/// the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Room the connection joined.
    pub room_id: RoomId,
    /// Id minted for this join. Matches the seat's `id` until someone
    /// rejoins that seat from another connection.
    pub player_id: PlayerId,
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Whether a connection has joined a room yet.
///
/// ```text
///   Unbound ──(joinRoom)──→ Bound ──(joinRoom)──→ Bound (new room/id)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, no `joinRoom` yet. Room actions are rejected.
    Unbound,
    /// Joined; actions go to this room as this player.
    Bound(SessionContext),
}

/// Result of [`Session::bind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// The context now in effect.
    pub context: SessionContext,
    /// The context it replaced, if the connection was already in a room.
    pub previous: Option<SessionContext>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One connection's session, owned by that connection's handler task.
#[derive(Debug, Clone)]
pub struct Session {
    connection_id: ConnectionId,
    state: SessionState,
}

impl Session {
    /// A fresh, unbound session for `connection_id`.
    pub fn new(connection_id: ConnectionId) -> Self {
        Self {
            connection_id,
            state: SessionState::Unbound,
        }
    }

    /// Binds the connection to `room_id` under a freshly minted player id.
    pub fn bind(&mut self, room_id: RoomId) -> Binding {
        let context = SessionContext {
            room_id,
            player_id: generate_player_id(),
        };
        let previous = match std::mem::replace(&mut self.state, SessionState::Bound(context.clone())) {
            SessionState::Bound(previous) => Some(previous),
            SessionState::Unbound => None,
        };
        tracing::debug!(
            conn_id = %self.connection_id,
            room_id = %context.room_id,
            player_id = %context.player_id,
            rebound = previous.is_some(),
            "session bound"
        );
        Binding { context, previous }
    }

    /// The current binding.
    ///
    /// # Errors
    /// [`SessionError::NotJoined`] if the connection never joined a room.
    pub fn context(&self) -> Result<&SessionContext, SessionError> {
        match &self.state {
            SessionState::Bound(context) => Ok(context),
            SessionState::Unbound => Err(SessionError::NotJoined(self.connection_id)),
        }
    }

    /// Drops the binding, returning it. Used when the connection closes.
    pub fn unbind(&mut self) -> Option<SessionContext> {
        match std::mem::replace(&mut self.state, SessionState::Unbound) {
            SessionState::Bound(context) => Some(context),
            SessionState::Unbound => None,
        }
    }

    /// The connection this session belongs to.
    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }
}
