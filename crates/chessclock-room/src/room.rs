//! A single room: one clock model plus the connections watching it.

use std::collections::HashMap;

use tokio::sync::mpsc::error::TrySendError;

use chessclock_game::{GameState, JoinOutcome, TapOutcome};
use chessclock_protocol::{Codec, PlayerId, ProtocolError, RoomId};
use chessclock_transport::ConnectionId;

use crate::{RoomConfig, RoomError, Subscriber, encode_snapshot};

/// One chess-clock session.
///
/// Every turn action settles owed time, applies the rule, and then ends the
/// game if it is over, so a broadcast that follows never shows a running
/// clock with at most one player left.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    game: GameState,
    subscribers: HashMap<ConnectionId, Subscriber>,
}

impl Room {
    /// Creates an empty, stopped room.
    pub fn new(id: RoomId, config: &RoomConfig) -> Self {
        Self {
            id,
            game: GameState::new(config.time_limit_ms),
            subscribers: HashMap::new(),
        }
    }

    // -- Subscribers ------------------------------------------------------

    /// Adds (or replaces) the outbound channel for `conn_id`.
    pub fn subscribe(&mut self, conn_id: ConnectionId, subscriber: Subscriber) {
        self.subscribers.insert(conn_id, subscriber);
        tracing::debug!(
            room_id = %self.id,
            %conn_id,
            subscribers = self.subscribers.len(),
            "connection subscribed"
        );
    }

    /// Removes `conn_id`. The player's seat stays so the name can rejoin.
    ///
    /// Returns `true` if the connection was subscribed.
    pub fn unsubscribe(&mut self, conn_id: ConnectionId) -> bool {
        let removed = self.subscribers.remove(&conn_id).is_some();
        if removed {
            tracing::debug!(
                room_id = %self.id,
                %conn_id,
                subscribers = self.subscribers.len(),
                "connection unsubscribed"
            );
        }
        removed
    }

    /// Number of connections currently subscribed.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Whether `conn_id` is subscribed.
    pub fn is_subscribed(&self, conn_id: ConnectionId) -> bool {
        self.subscribers.contains_key(&conn_id)
    }

    // -- Turn actions -----------------------------------------------------

    /// Seats `name` under `player_id`, or hands its existing seat over.
    ///
    /// `name` is taken as given; callers reject blank names.
    pub fn join(&mut self, name: &str, player_id: PlayerId, now: u64) -> JoinOutcome {
        let outcome = self.game.join(name, player_id.clone(), now);
        match outcome {
            JoinOutcome::Joined { index } => tracing::info!(
                room_id = %self.id,
                %player_id,
                username = name,
                index,
                players = self.game.players().len(),
                "player joined"
            ),
            JoinOutcome::Rejoined { index } => tracing::info!(
                room_id = %self.id,
                %player_id,
                username = name,
                index,
                "player rejoined"
            ),
        }
        self.settle();
        outcome
    }

    /// Applies a tap from `player_id`. Out-of-turn taps are no-ops.
    pub fn tap(&mut self, player_id: &PlayerId, now: u64) -> TapOutcome {
        let outcome = self.game.tap(player_id, now);
        match outcome {
            TapOutcome::Started { current } => {
                tracing::info!(room_id = %self.id, %player_id, current, "clock started");
            }
            TapOutcome::Passed { current } => {
                tracing::debug!(room_id = %self.id, %player_id, current, "turn passed");
            }
            TapOutcome::Ignored => {
                tracing::debug!(room_id = %self.id, %player_id, "tap ignored");
            }
        }
        self.settle();
        outcome
    }

    /// Stops the clock and refills every player.
    pub fn reset(&mut self, now: u64) {
        self.game.reset(now);
        tracing::debug!(room_id = %self.id, "room reset");
    }

    /// Stops the clock and sets a new per-player limit.
    ///
    /// # Errors
    /// [`RoomError::InvalidTimeLimit`] if `time_limit` is not positive.
    pub fn change_time_limit(&mut self, time_limit: i64, now: u64) -> Result<(), RoomError> {
        let limit = u64::try_from(time_limit)
            .ok()
            .filter(|limit| *limit > 0)
            .ok_or(RoomError::InvalidTimeLimit(time_limit))?;
        self.game.change_time_limit(limit, now);
        tracing::debug!(room_id = %self.id, time_limit = limit, "time limit changed");
        Ok(())
    }

    /// One scheduler tick: settle elapsed time and end the game if over.
    ///
    /// Returns `true` if this tick finished the game. No-op while stopped.
    pub fn tick(&mut self, now: u64) -> bool {
        if !self.game.is_running() {
            return false;
        }
        self.game.advance(now);
        self.settle()
    }

    fn settle(&mut self) -> bool {
        let finished = self.game.finish_if_over();
        if finished {
            tracing::info!(
                room_id = %self.id,
                winner_index = ?self.game.winner_index(),
                "game finished"
            );
        }
        finished
    }

    // -- Broadcast --------------------------------------------------------

    /// Sends the full state to every subscriber.
    ///
    /// A subscriber whose queue is full is skipped for this frame and
    /// stays subscribed. One whose connection is gone is dropped from the
    /// set. Returns how many were handed the frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the snapshot can't be encoded;
    /// nothing is sent in that case.
    pub fn broadcast<C: Codec>(&mut self, codec: &C) -> Result<usize, ProtocolError> {
        let frame = encode_snapshot(codec, &self.game)?;
        let room_id = &self.id;
        let mut delivered = 0;
        self.subscribers.retain(|conn_id, subscriber| {
            match subscriber.try_send(frame.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(TrySendError::Full(_)) => {
                    tracing::trace!(%room_id, %conn_id, "subscriber backed up, skipping frame");
                    true
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(%room_id, %conn_id, "dropping closed subscriber");
                    false
                }
            }
        });
        Ok(delivered)
    }

    // -- Accessors --------------------------------------------------------

    /// The room's id.
    pub fn id(&self) -> &RoomId {
        &self.id
    }

    /// The clock model.
    pub fn game(&self) -> &GameState {
        &self.game
    }

    /// Whether the countdown is running.
    pub fn is_running(&self) -> bool {
        self.game.is_running()
    }
}
