//! Error types for the session layer.

use crate::SessionId;

/// Errors that can occur during session authentication and lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The credential presented in `join` was expired, malformed, or
    /// forged. The connection is terminated with no error frame.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// The identity verifier backend could not answer (network failure,
    /// timeout). Treated identically to an explicit rejection.
    #[error("identity verifier unavailable: {0}")]
    VerifierUnavailable(String),

    /// A `join` arrived on a session that already completed its handshake.
    /// A session binds to a space exactly once; callers ignore this as a
    /// silent no-op.
    #[error("session {0} already joined a space")]
    AlreadyJoined(SessionId),
}
