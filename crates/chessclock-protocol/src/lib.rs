//! Wire protocol for chessclock.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Identifiers** ([`RoomId`], [`PlayerId`]): plain strings on the wire.
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]): JSON records
//!   tagged by a `"type"` field.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): bytes in, messages out.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage) → Room (clock model)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{ClientMessage, PlayerId, RoomId, ServerMessage};
