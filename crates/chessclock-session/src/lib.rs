//! Session context for chessclock connections.
//!
//! A connection doesn't own anything in the room it plays in. It carries a
//! [`SessionContext`] (room id + player id) that the handler passes along
//! with every action, and the room looks the player up by that id.
//!
//! ```text
//! Room Layer (above)      ← resolves SessionContext to a room and a seat
//!     ↕
//! Session Layer (this)    ← which room/player a connection is bound to
//!     ↕
//! Transport (below)       ← ConnectionId
//! ```

mod error;
mod id;
mod session;

pub use error::SessionError;
pub use id::generate_player_id;
pub use session::{Binding, Session, SessionContext, SessionState};
