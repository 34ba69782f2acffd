//! Inbound and outbound game events.
//!
//! Both directions use adjacently tagged JSON:
//!
//! ```text
//! { "event": "draw", "data": { "index": 120, "color": "#FF0000" } }
//! { "event": "ready" }
//! ```
//!
//! Event names are kebab-case; field names are snake_case.

use serde::{Deserialize, Serialize};

use crate::{Color, Phase, PlayerId, PlayerSummary, ProtocolError};

/// Longest guess or chat line the room accepts, in characters.
pub const MAX_GUESS_LEN: usize = 200;

// ---------------------------------------------------------------------------
// ClientEvent
// ---------------------------------------------------------------------------

/// Everything a connection can ask the room to do.
///
/// Leaving is not an event: a player leaves when their connection closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Take a seat in the room under `username`.
    Join { username: String },

    /// Mark yourself ready for the next round.
    Ready,

    /// Withdraw readiness.
    Unready,

    /// Paint one canvas cell. Only the drawer's strokes are applied.
    Draw { index: usize, color: Color },

    /// Submit a guess. Anything that is not the word is chat.
    Guess { text: String },
}

impl ClientEvent {
    /// Checks the parts of an event that do not depend on room state.
    ///
    /// Canvas bounds and username rules are enforced by the room and the
    /// roster because they depend on configuration.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            Self::Guess { text } => {
                if text.trim().is_empty() {
                    return Err(ProtocolError::InvalidMessage("guess must not be blank".into()));
                }
                if text.chars().count() > MAX_GUESS_LEN {
                    return Err(ProtocolError::InvalidMessage(format!(
                        "guess longer than {MAX_GUESS_LEN} characters"
                    )));
                }
                Ok(())
            }
            Self::Join { .. } | Self::Ready | Self::Unready | Self::Draw { .. } => Ok(()),
        }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Ready => "ready",
            Self::Unready => "unready",
            Self::Draw { .. } => "draw",
            Self::Guess { .. } => "guess",
        }
    }
}

// ---------------------------------------------------------------------------
// ServerEvent
// ---------------------------------------------------------------------------

/// Everything the room tells its connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// The full roster, in join order.
    RosterUpdate { players: Vec<PlayerSummary> },

    /// Where the room is right now. Sent to a connection when it attaches.
    RoomState {
        phase: Phase,
        drawer: Option<PlayerId>,
        remaining: u32,
    },

    /// Seconds (ticks) left before the round starts.
    CountdownTick { remaining: u32 },

    /// The countdown stopped because too few players are left.
    CountdownCancelled,

    /// A round began. The word itself goes only to the drawer.
    RoundStart {
        drawer: PlayerId,
        drawer_name: String,
        duration: u32,
    },

    /// The secret word. Unicast to the drawer.
    SecretWord { word: String },

    /// Ticks left in the running round.
    TimeUpdate { remaining: u32 },

    /// The whole canvas, row-major.
    CanvasSnapshot {
        width: u16,
        height: u16,
        cells: Vec<Color>,
    },

    /// Every cell was reset to `color`.
    CanvasReset { color: Color },

    /// One cell changed.
    DrawUpdate { index: usize, color: Color },

    /// Someone guessed the word.
    CorrectGuess { winner: String, word: String },

    /// The round is over; the word and drawer are revealed.
    RoundEnd {
        word: String,
        drawer: PlayerId,
        drawer_name: String,
    },

    /// A chat line (or a wrong guess).
    ChatMessage { user: String, text: String },

    /// A request from this connection was rejected.
    Error { message: String },
}

impl ServerEvent {
    /// Shorthand for an [`Error`](Self::Error) event.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { message: message.into() }
    }
}
