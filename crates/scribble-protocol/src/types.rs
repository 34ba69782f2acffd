//! Identity and roster types shared by the room and the wire format.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A player's identity: the id of the connection they joined from.
///
/// It stays the same for the lifetime of the connection and is never
/// reused, so the room can hold it as a weak reference (for example the
/// current drawer) without worrying about it pointing at someone else
/// later. Serialized as a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who an outbound event is addressed to.
///
/// Room logic returns `(Recipient, ServerEvent)` pairs and leaves the
/// actual delivery to the broadcast port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every attached connection.
    All,

    /// One connection only.
    Player(PlayerId),

    /// Every attached connection except this one (usually the author).
    AllExcept(PlayerId),
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The round phase of the room.
///
/// ```text
/// Waiting ──(all ready, ≥ 2 players)──→ Countdown ──(reaches 0)──→ Playing
///    ↑                                      │                        │
///    └──────────(roster too small)──────────┘                        │
///    └────────────(timer, correct guess, drawer left)────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Waiting,
    Countdown,
    Playing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Countdown => write!(f, "countdown"),
            Self::Playing => write!(f, "playing"),
        }
    }
}

// ---------------------------------------------------------------------------
// Roster view
// ---------------------------------------------------------------------------

/// Whether a player has signalled they want the next round to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Readiness {
    #[default]
    NotReady,
    Ready,
}

/// One roster entry as clients see it in `roster-update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub username: String,
    pub score: u32,
    pub status: Readiness,
}
