//! Unified error type for the Plaza server.

use plaza_protocol::ProtocolError;
use plaza_room::RoomError;
use plaza_session::SessionError;
use plaza_transport::TransportError;

/// Top-level error that wraps all layer-specific errors.
///
/// Embedders of the `plaza` crate deal with this single type; the
/// `#[from]` attributes let `?` convert layer errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (invalid credential, verifier failure).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room-level error (unknown space, lookup failure).
    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let server_err: ServerError = err.into();
        assert!(matches!(server_err, ServerError::Transport(_)));
        assert!(server_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let server_err: ServerError = err.into();
        assert!(matches!(server_err, ServerError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::InvalidCredential("nope".into());
        let server_err: ServerError = err.into();
        assert!(matches!(server_err, ServerError::Session(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err =
            RoomError::SpaceNotFound(plaza_protocol::SpaceId::from("s"));
        let server_err: ServerError = err.into();
        assert!(matches!(server_err, ServerError::Room(_)));
    }
}
