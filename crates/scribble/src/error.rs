//! Unified error type for the Scribble server.

use scribble_protocol::ProtocolError;
use scribble_room::RoomError;
use scribble_roster::RosterError;
use scribble_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum ScribbleError {
    /// Connection, send, or receive failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Encode, decode, or validation failure.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Rejected join.
    #[error(transparent)]
    Roster(#[from] RosterError),

    /// The room actor is gone, or a room operation failed.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A startup dependency is unreachable. Fatal: the server never binds.
    #[error("dependency {name} unavailable: {reason}")]
    Dependency { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribble_protocol::PlayerId;

    #[test]
    fn test_from_transport_error() {
        let err: ScribbleError = TransportError::Accept(std::io::Error::other("gone")).into();
        assert!(matches!(err, ScribbleError::Transport(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err: ScribbleError = ProtocolError::InvalidMessage("bad".into()).into();
        assert!(matches!(err, ScribbleError::Protocol(_)));
    }

    #[test]
    fn test_from_roster_error() {
        let err: ScribbleError = RosterError::DuplicateIdentity(PlayerId(1)).into();
        assert!(matches!(err, ScribbleError::Roster(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err: ScribbleError = RoomError::Unavailable.into();
        assert!(matches!(err, ScribbleError::Room(_)));
    }

    #[test]
    fn test_dependency_error_names_the_dependency() {
        let err = ScribbleError::Dependency {
            name: "profile-store".into(),
            reason: "connection refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "dependency profile-store unavailable: connection refused"
        );
    }
}
