//! Clock model: elapsed-time settlement and game-over detection.

use chessclock_protocol::PlayerId;
use serde::{Deserialize, Serialize};

/// Minimum remaining time (ms) a player needs to be declared winner.
pub const WINNER_THRESHOLD_MS: u64 = 1;

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// One seat at the clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Id of the connection currently holding this seat.
    pub id: PlayerId,
    /// Display name. Stable across reconnects; used to find the seat again.
    pub name: String,
    /// Milliseconds left. Only shrinks while it is this player's turn and
    /// the clock is running.
    pub remaining_time: u64,
}

impl Player {
    /// Returns `true` while the player still has time on the clock.
    pub fn is_alive(&self) -> bool {
        self.remaining_time > 0
    }
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// Timing and turn-order state of one room.
///
/// Serialized as-is for `gameState` broadcasts:
///
/// ```text
/// {
///   "players": [{ "id": "…", "name": "alice", "remainingTime": 60000 }],
///   "currentPlayerIndex": 0,
///   "lastTickTimestamp": 1700000000000,
///   "running": false,
///   "timeLimit": 60000,
///   "winnerIndex": null
/// }
/// ```
///
/// Invariants:
/// - `current_player_index < players.len()` whenever there are players.
/// - Players are only ever appended; turn order is insertion order.
/// - At most one countdown (the current player's) runs at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub(crate) players: Vec<Player>,
    pub(crate) current_player_index: usize,
    pub(crate) last_tick_timestamp: u64,
    pub(crate) running: bool,
    pub(crate) time_limit: u64,
    pub(crate) winner_index: Option<usize>,
}

impl GameState {
    /// Creates an empty, stopped clock giving each player `time_limit` ms.
    pub fn new(time_limit: u64) -> Self {
        Self {
            players: Vec::new(),
            current_player_index: 0,
            last_tick_timestamp: 0,
            running: false,
            time_limit,
            winner_index: None,
        }
    }

    /// Charges the current player for time elapsed since the last
    /// settlement.
    ///
    /// No-op while stopped. Remaining time floors at zero; a player who
    /// hits zero loses the turn to the next seat with time left, whose
    /// countdown starts fresh at `now`. Calling twice with the same `now` deducts nothing
    /// the second time.
    pub fn advance(&mut self, now: u64) {
        if !self.running {
            return;
        }
        let Some(player) = self.players.get_mut(self.current_player_index) else {
            return;
        };

        let elapsed = now.saturating_sub(self.last_tick_timestamp);
        player.remaining_time = player.remaining_time.saturating_sub(elapsed);
        self.last_tick_timestamp = now;

        if player.remaining_time == 0 {
            self.pass_turn(now);
        }
    }

    /// `true` once at most one player has time left. Also `true` when
    /// everyone timed out at once, or the room is empty.
    pub fn is_over(&self) -> bool {
        self.players.iter().filter(|p| p.is_alive()).count() <= 1
    }

    /// Index of the first player, in turn order, with at least
    /// [`WINNER_THRESHOLD_MS`] left.
    pub fn find_winner(&self) -> Option<usize> {
        self.players
            .iter()
            .position(|p| p.remaining_time >= WINNER_THRESHOLD_MS)
    }

    /// Stops a running clock whose game is over and records the winner.
    ///
    /// Returns `true` only on the call that actually finishes the game.
    pub fn finish_if_over(&mut self) -> bool {
        if !self.running || !self.is_over() {
            return false;
        }
        self.running = false;
        self.winner_index = self.find_winner();
        true
    }

    /// Hands the turn to the next seat in round-robin order that still
    /// has time, starting its countdown at `now`.
    ///
    /// Seats already at zero are passed over so the turn never rests on a
    /// flagged player. If nobody has time left the turn moves one seat on.
    pub(crate) fn pass_turn(&mut self, now: u64) {
        let n = self.players.len();
        if n == 0 {
            return;
        }
        let from = self.current_player_index;
        self.current_player_index = (1..=n)
            .map(|step| (from + step) % n)
            .find(|&i| self.players[i].is_alive())
            .unwrap_or((from + 1) % n);
        self.last_tick_timestamp = now;
    }

    pub(crate) fn refill(&mut self) {
        for player in &mut self.players {
            player.remaining_time = self.time_limit;
        }
    }

    // -- Accessors --------------------------------------------------------

    /// Players in turn order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Index of the player whose countdown is active.
    pub fn current_player_index(&self) -> usize {
        self.current_player_index
    }

    /// The player whose countdown is active, if there are any players.
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player_index)
    }

    /// When elapsed time was last settled (ms since the Unix epoch).
    pub fn last_tick_timestamp(&self) -> u64 {
        self.last_tick_timestamp
    }

    /// Whether the countdown is running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Time (ms) each player gets on reset.
    pub fn time_limit(&self) -> u64 {
        self.time_limit
    }

    /// Winner marker; `None` while no winner is recorded.
    pub fn winner_index(&self) -> Option<usize> {
        self.winner_index
    }

    /// Looks up a seat by display name.
    pub fn position_by_name(&self, name: &str) -> Option<usize> {
        self.players.iter().position(|p| p.name == name)
    }
}
