//! Broadcast gateway: encode a room's state once, fan it out to every
//! subscribed connection.

use std::sync::Arc;

use chessclock_game::GameState;
use chessclock_protocol::{Codec, ProtocolError, ServerMessage};
use tokio::sync::mpsc;

/// One encoded outbound message, shared by every recipient.
pub type Frame = Arc<[u8]>;

/// Frames queued per connection before broadcasts to it are skipped.
pub const SUBSCRIBER_CAPACITY: usize = 32;

/// Channel to one connection's writer task.
///
/// Bounded at [`SUBSCRIBER_CAPACITY`]. Fan-out uses `try_send`, so a
/// stalled client loses snapshots instead of holding up the registry lock;
/// every frame is a full state, so the next one it does get is current.
pub type Subscriber = mpsc::Sender<Frame>;

/// Creates a subscriber and the receiving end for its writer task.
pub fn subscriber_channel() -> (Subscriber, mpsc::Receiver<Frame>) {
    mpsc::channel(SUBSCRIBER_CAPACITY)
}

/// Encodes a full `gameState` snapshot.
///
/// # Errors
/// Returns `ProtocolError::Encode` if the codec fails.
pub fn encode_snapshot<C: Codec>(codec: &C, state: &GameState) -> Result<Frame, ProtocolError> {
    let msg = ServerMessage::GameState { state };
    codec.encode(&msg).map(Frame::from)
}

/// Encodes an `error` message for a single connection.
///
/// # Errors
/// Returns `ProtocolError::Encode` if the codec fails.
pub fn encode_error<C: Codec>(codec: &C, message: impl Into<String>) -> Result<Frame, ProtocolError> {
    let msg: ServerMessage<()> = ServerMessage::error(message);
    codec.encode(&msg).map(Frame::from)
}
