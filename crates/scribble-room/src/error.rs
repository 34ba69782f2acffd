//! Error types for the room layer.

use scribble_roster::RosterError;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// A join was rejected by the roster.
    #[error(transparent)]
    Roster(#[from] RosterError),

    /// A stroke addressed a cell outside the canvas.
    #[error("cell {index} is outside the canvas ({len} cells)")]
    StrokeOutOfBounds { index: usize, len: usize },

    /// The room's command channel is closed.
    #[error("room is unavailable")]
    Unavailable,
}
