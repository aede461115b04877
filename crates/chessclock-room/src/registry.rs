//! Room registry: creates, tracks and sweeps rooms.

use std::collections::HashMap;

use chessclock_protocol::{Codec, RoomId};

use crate::{Room, RoomConfig, RoomError};

/// What one [`RoomRegistry::sweep`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Running rooms that were advanced and broadcast.
    pub rooms_swept: usize,
    /// Games that ended on this sweep.
    pub games_finished: usize,
    /// Snapshot frames handed to subscribers.
    pub frames_sent: usize,
}

/// Process-wide map from room id to [`Room`].
///
/// Rooms are created lazily on first reference and stay until someone
/// calls [`remove`](Self::remove). There is no capacity limit.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
    config: RoomConfig,
}

impl RoomRegistry {
    /// Creates an empty registry whose rooms use `config`.
    pub fn new(config: RoomConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            config: config.validated(),
        }
    }

    /// Creates a new room.
    ///
    /// # Errors
    /// [`RoomError::EmptyRoomId`] for a blank id,
    /// [`RoomError::AlreadyExists`] if the id is taken.
    pub fn create(&mut self, room_id: RoomId) -> Result<&mut Room, RoomError> {
        validate_id(&room_id)?;
        if self.rooms.contains_key(&room_id) {
            return Err(RoomError::AlreadyExists(room_id));
        }
        let config = &self.config;
        Ok(self
            .rooms
            .entry(room_id.clone())
            .or_insert_with(|| new_room(room_id, config)))
    }

    /// Returns the room, creating it on first reference.
    ///
    /// # Errors
    /// [`RoomError::EmptyRoomId`] for a blank id.
    pub fn get_or_create(&mut self, room_id: &RoomId) -> Result<&mut Room, RoomError> {
        validate_id(room_id)?;
        let config = &self.config;
        Ok(self
            .rooms
            .entry(room_id.clone())
            .or_insert_with(|| new_room(room_id.clone(), config)))
    }

    /// Looks up a room.
    pub fn get(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    /// Looks up a room for mutation.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if no such room exists.
    pub fn get_mut(&mut self, room_id: &RoomId) -> Result<&mut Room, RoomError> {
        self.rooms
            .get_mut(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))
    }

    /// Removes a room and returns it. Its subscribers get nothing further.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if no such room exists.
    pub fn remove(&mut self, room_id: &RoomId) -> Result<Room, RoomError> {
        let room = self
            .rooms
            .remove(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        tracing::info!(%room_id, "room removed");
        Ok(room)
    }

    /// One tick over every running room.
    ///
    /// Each running room settles elapsed time, finishes if over, and
    /// broadcasts its state whether or not anything changed. Stopped rooms
    /// are skipped. An encode failure in one room is logged and the sweep
    /// moves on.
    pub fn sweep<C: Codec>(&mut self, now: u64, codec: &C) -> SweepReport {
        let mut report = SweepReport::default();
        for room in self.rooms.values_mut().filter(|room| room.is_running()) {
            report.rooms_swept += 1;
            if room.tick(now) {
                report.games_finished += 1;
            }
            match room.broadcast(codec) {
                Ok(sent) => report.frames_sent += sent,
                Err(e) => {
                    tracing::warn!(room_id = %room.id(), error = %e, "tick broadcast failed");
                }
            }
        }
        report
    }

    // -- Introspection ----------------------------------------------------

    /// Number of rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// All room ids, sorted.
    pub fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<_> = self.rooms.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Ids of rooms whose clock is running, sorted.
    pub fn running_room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<_> = self
            .rooms
            .values()
            .filter(|room| room.is_running())
            .map(|room| room.id().clone())
            .collect();
        ids.sort();
        ids
    }

    /// Settings new rooms are created with.
    pub fn config(&self) -> &RoomConfig {
        &self.config
    }
}

fn new_room(room_id: RoomId, config: &RoomConfig) -> Room {
    tracing::info!(%room_id, time_limit = config.time_limit_ms, "room created");
    Room::new(room_id, config)
}

fn validate_id(room_id: &RoomId) -> Result<(), RoomError> {
    if room_id.as_str().trim().is_empty() {
        return Err(RoomError::EmptyRoomId);
    }
    Ok(())
}
