//! A single seated player.

use scribble_protocol::{PlayerId, PlayerSummary, Readiness};

/// A player in the room. Exists from `join` until the connection closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,

    /// Display name, already trimmed.
    pub username: String,

    pub score: u32,
    pub readiness: Readiness,
}

impl Player {
    pub(crate) fn new(id: PlayerId, username: String) -> Self {
        Self {
            id,
            username,
            score: 0,
            readiness: Readiness::NotReady,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.readiness == Readiness::Ready
    }

    /// The roster entry clients see.
    pub fn summary(&self) -> PlayerSummary {
        PlayerSummary {
            id: self.id,
            username: self.username.clone(),
            score: self.score,
            status: self.readiness,
        }
    }
}
