//! The clock model for one chessclock room.
//!
//! A room's players share one round-robin countdown. Exactly one player's
//! time runs at a time; tapping hands the countdown to the next player;
//! running out hands it on automatically. The game is over once at most
//! one player has time left.
//!
//! Nothing here does I/O or reads the time. Every operation takes `now`
//! (milliseconds since the Unix epoch) from the caller, usually from a
//! [`Clock`].
//!
//! # Key types
//!
//! - [`GameState`]: players, whose turn it is, and the running flag
//! - [`Player`]: one seat: id, name, remaining time
//! - [`TapOutcome`] / [`JoinOutcome`]: what a turn action actually did
//! - [`Clock`]: where `now` comes from ([`SystemClock`], [`ManualClock`])

mod clock;
mod model;
mod turn;

pub use clock::{Clock, ManualClock, SystemClock};
pub use model::{GameState, Player, WINNER_THRESHOLD_MS};
pub use turn::{JoinOutcome, TapOutcome};
