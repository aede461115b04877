//! # chessclock
//!
//! A server-authoritative multiplayer chess clock. Players in a room share
//! one round-robin countdown; the server owns the clock, applies taps, and
//! pushes the full state to every client in the room on each change and on
//! every tick.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chessclock::prelude::*;
//!
//! # async fn start() -> Result<(), ChessClockError> {
//! let server = ChessClockServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .room_config(RoomConfig { time_limit_ms: 180_000 })
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::ChessClockError;
pub use server::{ChessClockServer, ChessClockServerBuilder, ServerHandle};

pub mod prelude {
    //! Everything needed to configure and run a server.

    pub use crate::{ChessClockError, ChessClockServer, ChessClockServerBuilder, ServerHandle};
    pub use chessclock_game::{Clock, GameState, ManualClock, Player, SystemClock};
    pub use chessclock_protocol::{ClientMessage, PlayerId, RoomId, ServerMessage};
    pub use chessclock_room::RoomConfig;
    pub use chessclock_tick::{TickConfig, TickPolicy};
}
