//! The space directory hook: resolving a space id to its dimensions.
//!
//! Spaces are created, mapped, and stored by the surrounding CRUD system;
//! the real-time core only needs their bounds at join time. That lookup is
//! the [`SpaceDirectory`] trait — backed by a database in production and by
//! [`MemorySpaceDirectory`] in demos and tests.

use std::collections::HashMap;

use plaza_protocol::SpaceId;

use crate::RoomError;

/// The dimensions of a space, cached per room at the first member's join.
///
/// Spawn positions are chosen strictly within `[0, width) × [0, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpaceBounds {
    pub width: u32,
    pub height: u32,
}

impl SpaceBounds {
    /// Creates bounds from a width and height.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Resolves a space identifier to its bounds.
///
/// Consulted once per session, during the join handshake, under a bounded
/// timeout. A failed or timed-out lookup terminates the joining connection
/// the same way an unknown space does.
pub trait SpaceDirectory: Send + Sync + 'static {
    /// Looks up the bounds of `space_id`.
    ///
    /// # Errors
    /// - [`RoomError::SpaceNotFound`] — no such space exists.
    /// - [`RoomError::LookupFailed`] — the backing store misbehaved.
    fn lookup(
        &self,
        space_id: &SpaceId,
    ) -> impl std::future::Future<Output = Result<SpaceBounds, RoomError>> + Send;
}

/// An in-memory [`SpaceDirectory`] with a fixed set of spaces.
///
/// ## Example
///
/// ```rust
/// use plaza_room::MemorySpaceDirectory;
///
/// let directory = MemorySpaceDirectory::new()
///     .with_space("plaza-1", 100, 200)
///     .with_space("plaza-2", 40, 40);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySpaceDirectory {
    spaces: HashMap<SpaceId, SpaceBounds>,
}

impl MemorySpaceDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a space, builder-style.
    pub fn with_space(
        mut self,
        space_id: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        self.spaces.insert(
            SpaceId(space_id.into()),
            SpaceBounds::new(width, height),
        );
        self
    }
}

impl SpaceDirectory for MemorySpaceDirectory {
    async fn lookup(
        &self,
        space_id: &SpaceId,
    ) -> Result<SpaceBounds, RoomError> {
        self.spaces
            .get(space_id)
            .copied()
            .ok_or_else(|| RoomError::SpaceNotFound(space_id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_known_space_returns_bounds() {
        let dir = MemorySpaceDirectory::new().with_space("s1", 100, 200);
        let bounds = dir.lookup(&SpaceId::from("s1")).await.unwrap();
        assert_eq!(bounds, SpaceBounds::new(100, 200));
    }

    #[tokio::test]
    async fn test_lookup_unknown_space_is_not_found() {
        let dir = MemorySpaceDirectory::new();
        let err = dir.lookup(&SpaceId::from("nope")).await.unwrap_err();
        assert!(matches!(err, RoomError::SpaceNotFound(_)));
    }
}
