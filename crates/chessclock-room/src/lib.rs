//! Room management for chessclock.
//!
//! All rooms live in one [`RoomRegistry`], owned by the server behind a
//! single lock. A [`Room`] owns its clock model and the set of connections
//! subscribed to it; connections reference a room only by id.
//!
//! There are no per-room tasks. Client actions and the global tick both go
//! through `&mut Room`, so two mutations of the same room never interleave.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: id → room map with explicit create/get/remove
//! - [`Room`]: clock model + subscribers, turn actions with logging
//! - [`Subscriber`] / [`Frame`]: outbound channel to one connection
//! - [`SweepReport`]: what one tick did across all rooms

mod config;
mod error;
mod gateway;
mod registry;
mod room;

pub use config::RoomConfig;
pub use error::RoomError;
pub use gateway::{
    Frame, SUBSCRIBER_CAPACITY, Subscriber, encode_error, encode_snapshot, subscriber_channel,
};
pub use registry::{RoomRegistry, SweepReport};
pub use room::Room;
