//! Error types for the protocol layer.

/// Errors that can occur while encoding, decoding, or validating events.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The frame is not a well-formed event: malformed JSON, an unknown
    /// event name, a missing field, or a field of the wrong type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The event decoded but its content breaks a protocol rule,
    /// such as a blank guess.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// A color string that is not `#RGB` or `#RRGGBB`.
    #[error("invalid color {0:?}: expected #RGB or #RRGGBB")]
    InvalidColor(String),
}
