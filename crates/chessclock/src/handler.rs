//! Per-connection handler: decode actions and apply them to the bound room.
//!
//! Each accepted connection gets its own Tokio task running this handler,
//! plus a writer task that owns the outbound side:
//!   1. Spawn the writer, draining this connection's channel into the socket
//!   2. Loop: receive → decode → dispatch against the session's room
//!   3. On close, the guard unsubscribes the connection from its room
//!
//! Everything the connection receives (room broadcasts and its own error
//! replies) goes through the one channel, so frames are never interleaved.

use std::sync::Arc;

use chessclock_protocol::{ClientMessage, Codec};
use chessclock_room::{Frame, RoomError, Subscriber, encode_error, subscriber_channel};
use chessclock_session::Session;
use chessclock_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::ChessClockError;
use crate::server::ServerState;

/// Owns the connection's session; unsubscribes it from its room on drop.
///
/// Runs even if the handler unwinds. `Drop` is synchronous, so the
/// registry lock is taken in a spawned task.
struct SessionGuard<C: Codec> {
    session: Session,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for SessionGuard<C> {
    fn drop(&mut self) {
        let conn_id = self.session.connection_id();
        let Some(context) = self.session.unbind() else {
            return;
        };
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut registry = state.registry.lock().await;
            if let Ok(room) = registry.get_mut(&context.room_id) {
                room.unsubscribe(conn_id);
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), ChessClockError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::info!(%conn_id, peer = %conn.peer_addr(), "connection opened");

    let (tx, rx) = subscriber_channel();
    let writer = tokio::spawn(write_loop(Arc::clone(&conn), rx));

    let mut guard = SessionGuard {
        session: Session::new(conn_id),
        state: Arc::clone(&state),
    };

    let result = loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, "connection closed");
                break Ok(());
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break Err(ChessClockError::Transport(e));
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "dropping undecodable message");
                continue;
            }
        };

        if let Err(e) = dispatch(&state, &mut guard.session, &tx, msg).await {
            match e.client_message() {
                Some(message) => {
                    tracing::debug!(%conn_id, %message, "rejecting action");
                    send_error(&state.codec, &tx, message);
                }
                None => {
                    tracing::warn!(%conn_id, error = %e, "action failed");
                }
            }
        }
    };

    // Unsubscribe first so the room drops its sender; then the writer
    // drains whatever is queued and exits once every sender is gone.
    drop(guard);
    drop(tx);
    if let Err(e) = writer.await {
        tracing::debug!(%conn_id, error = %e, "writer task ended abnormally");
    }
    if let Err(e) = conn.close().await {
        tracing::debug!(%conn_id, error = %e, "close handshake failed");
    }
    result
}

/// Applies one inbound action.
async fn dispatch<C: Codec>(
    state: &ServerState<C>,
    session: &mut Session,
    tx: &Subscriber,
    msg: ClientMessage,
) -> Result<(), ChessClockError> {
    let conn_id = session.connection_id();

    match msg {
        ClientMessage::JoinRoom { room_id, username } => {
            // Checked before get_or_create so a rejected join leaves no room behind.
            if username.trim().is_empty() {
                return Err(RoomError::EmptyUsername.into());
            }
            let mut registry = state.registry.lock().await;
            registry.get_or_create(&room_id)?;

            let binding = session.bind(room_id.clone());
            if let Some(previous) = binding.previous {
                if let Ok(old) = registry.get_mut(&previous.room_id) {
                    old.unsubscribe(conn_id);
                }
            }

            let room = registry.get_mut(&room_id)?;
            room.subscribe(conn_id, tx.clone());
            room.join(&username, binding.context.player_id, state.clock.now_millis());
            room.broadcast(&state.codec)?;
        }

        ClientMessage::Tap => {
            let context = session.context()?;
            let mut registry = state.registry.lock().await;
            let room = registry.get_mut(&context.room_id)?;
            room.tap(&context.player_id, state.clock.now_millis());
            room.broadcast(&state.codec)?;
        }

        ClientMessage::Reset => {
            let context = session.context()?;
            let mut registry = state.registry.lock().await;
            let room = registry.get_mut(&context.room_id)?;
            room.reset(state.clock.now_millis());
            room.broadcast(&state.codec)?;
        }

        ClientMessage::ChangeTime { time } => {
            let context = session.context()?;
            let mut registry = state.registry.lock().await;
            let room = registry.get_mut(&context.room_id)?;
            room.change_time_limit(time, state.clock.now_millis())?;
            room.broadcast(&state.codec)?;
        }

        ClientMessage::Unknown => {
            tracing::debug!(%conn_id, "ignoring unknown message type");
        }
    }

    Ok(())
}

/// Queues an `error` reply for this connection only.
fn send_error<C: Codec>(codec: &C, tx: &Subscriber, message: String) {
    match encode_error(codec, message) {
        Ok(frame) => {
            if let Err(e) = tx.try_send(frame) {
                tracing::debug!(error = %e, "error reply not queued");
            }
        }
        Err(e) => tracing::warn!(error = %e, "failed to encode error reply"),
    }
}

/// Drains the connection's outbound channel into the socket.
async fn write_loop(conn: Arc<WebSocketConnection>, mut rx: mpsc::Receiver<Frame>) {
    while let Some(frame) = rx.recv().await {
        if let Err(e) = conn.send(&frame).await {
            tracing::debug!(conn_id = %conn.id(), error = %e, "send failed, stopping writer");
            break;
        }
    }
}
