//! Player id generation.

use chessclock_protocol::PlayerId;
use rand::Rng;

/// Generates a fresh opaque player id: 16 random bytes as 32 hex chars.
///
/// A new id is minted on every join, so an id leaked from an old
/// connection stops matching once its owner rejoins.
pub fn generate_player_id() -> PlayerId {
    let bytes: [u8; 16] = rand::rng().random();
    PlayerId(bytes.iter().map(|b| format!("{b:02x}")).collect())
}
