//! Turn rules: the player actions that mutate a [`GameState`].
//!
//! Every action settles owed time with [`GameState::advance`] before doing
//! anything else, so the periodic tick and client actions share one
//! settlement path and never double-count.
//!
//! Room state machine:
//!
//! ```text
//!            tap                      game over (tick)
//!   Idle ──────────→ Running ─────────────────────────→ Finished
//!     ↑               │  ↺ tap (turn rotates)               │
//!     └───────────────┴──── reset / change_time_limit ──────┘
//! ```
//!
//! No state refuses input; `join`, `reset` and `change_time_limit` are
//! accepted everywhere.

use chessclock_protocol::PlayerId;

use crate::{GameState, Player};

/// What [`GameState::join`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A new seat was appended at `index` with a full clock.
    Joined { index: usize },
    /// The name already had a seat; its id was rebound, time untouched.
    Rejoined { index: usize },
}

impl JoinOutcome {
    /// Seat index of the joining player.
    pub fn index(self) -> usize {
        match self {
            Self::Joined { index } | Self::Rejoined { index } => index,
        }
    }
}

/// What [`GameState::tap`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// The stopped clock started; `current` is whose countdown now runs.
    Started { current: usize },
    /// The current player ended their turn; `current` is the next seat.
    Passed { current: usize },
    /// Not the tapper's turn, or the tapper has no seat. Nothing changed.
    Ignored,
}

impl GameState {
    /// Seats `name`, or hands an existing seat with that name to `id`.
    ///
    /// Rejoining keeps the seat's remaining time and turn position. There
    /// is no seat limit.
    pub fn join(&mut self, name: &str, id: PlayerId, now: u64) -> JoinOutcome {
        self.advance(now);

        if let Some(index) = self.position_by_name(name) {
            self.players[index].id = id;
            return JoinOutcome::Rejoined { index };
        }

        self.players.push(Player {
            id,
            name: name.to_owned(),
            remaining_time: self.time_limit,
        });
        JoinOutcome::Joined {
            index: self.players.len() - 1,
        }
    }

    /// Ends the tapper's turn, or starts the clock if it is stopped.
    ///
    /// Starting clears any previous winner and starts the countdown at
    /// `now` without moving the turn; if the starter is also the current
    /// player, the same tap then hands the turn on, as on a physical chess
    /// clock. While running, only the current player's tap counts; anyone
    /// else's is silently ignored.
    pub fn tap(&mut self, id: &PlayerId, now: u64) -> TapOutcome {
        self.advance(now);

        let Some(tapper) = self.players.iter().position(|p| &p.id == id) else {
            return TapOutcome::Ignored;
        };

        if !self.running {
            self.running = true;
            self.last_tick_timestamp = now;
            self.winner_index = None;
            if tapper == self.current_player_index {
                self.pass_turn(now);
            }
            return TapOutcome::Started {
                current: self.current_player_index,
            };
        }

        if tapper != self.current_player_index {
            return TapOutcome::Ignored;
        }
        self.pass_turn(now);
        TapOutcome::Passed {
            current: self.current_player_index,
        }
    }

    /// Stops the clock and refills everyone to the time limit.
    ///
    /// Turn order and the current seat are kept, and the winner marker is
    /// set to the current seat.
    pub fn reset(&mut self, now: u64) {
        self.advance(now);
        self.running = false;
        self.refill();
        self.winner_index = if self.players.is_empty() {
            None
        } else {
            Some(self.current_player_index)
        };
    }

    /// Stops the clock, sets a new per-player limit and refills everyone
    /// to it. Clears the winner marker.
    pub fn change_time_limit(&mut self, time_limit: u64, now: u64) {
        self.advance(now);
        self.running = false;
        self.time_limit = time_limit;
        self.refill();
        self.winner_index = None;
    }
}
