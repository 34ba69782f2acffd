//! Error types for the roster layer.

use scribble_protocol::PlayerId;

/// Reasons a join is rejected. A rejected join changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    /// This connection already joined.
    #[error("connection {0} has already joined")]
    DuplicateIdentity(PlayerId),

    /// Another player is using this name (compared case-insensitively).
    #[error("username {0:?} is already taken")]
    DuplicateUsername(String),

    /// The name is blank or too long.
    #[error("invalid username {0:?}")]
    InvalidUsername(String),
}
