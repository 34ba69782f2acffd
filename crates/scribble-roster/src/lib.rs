//! Player registry for a Scribble room.
//!
//! The registry knows which connections have joined as players, under
//! which usernames, whether they are ready, and how many points they have.
//! It is a plain data structure with no locking; the room actor owns it.
//!
//! ```text
//! Room Layer (above)     ← asks the registry who is playing
//!     ↕
//! Roster Layer (this crate)
//!     ↕
//! Protocol Layer (below) ← provides PlayerId, PlayerSummary, Readiness
//! ```

mod error;
mod player;
mod registry;

pub use error::RosterError;
pub use player::Player;
pub use registry::{MAX_USERNAME_LEN, Registry};
