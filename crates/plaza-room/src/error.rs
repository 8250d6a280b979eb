//! Error types for the room layer.

use plaza_protocol::SpaceId;

/// Errors that can occur resolving spaces or operating on rooms.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The space identifier is unknown to the directory. The joining
    /// connection is terminated with no error frame.
    #[error("space {0} not found")]
    SpaceNotFound(SpaceId),

    /// The directory backend failed or timed out; treated identically to
    /// an unknown space.
    #[error("space lookup failed: {0}")]
    LookupFailed(String),

    /// The room actor's command channel is closed — the room is gone.
    #[error("room for space {0} is unavailable")]
    Unavailable(SpaceId),
}
