//! Room registry: tracks which sessions are present in which space.
//!
//! The registry is the only shared mutable state in the real-time core.
//! It is explicitly constructed at startup and handed to every connection
//! handler (no global singleton), which also means tests can build a fresh
//! registry each.
//!
//! Internally it is a map of space id → [`RoomHandle`] behind a short-held
//! lock; the per-room state itself lives in room actors
//! ([`room`](crate::room) module). The lock guards only the map — it is
//! never held across an await on a room, so a slow room cannot stall
//! unrelated spaces.

use std::collections::HashMap;

use plaza_protocol::{ServerMessage, SpaceId, UserId};
use plaza_session::SessionId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;

use crate::room::{JoinedRoom, MemberSender, RoomHandle, spawn_room};
use crate::{RoomError, SpaceBounds};

/// Command channel size for room actors.
const ROOM_CHANNEL_SIZE: usize = 64;

/// Process-wide registry of occupied spaces.
pub struct RoomRegistry {
    /// Active rooms, created lazily on first join. Empty rooms are
    /// retained: tearing down an idle actor would race a concurrent join
    /// grabbing its handle, and retention is not observable to clients.
    rooms: Mutex<HashMap<SpaceId, RoomHandle>>,

    /// Source of per-room spawn seeds.
    seeder: Mutex<StdRng>,
}

impl RoomRegistry {
    /// Creates a registry with OS-entropy spawn randomness.
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            seeder: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Creates a registry whose spawn positions are reproducible.
    ///
    /// Two registries built with the same seed hand out the same spawn
    /// sequence per space, which is what movement tests want.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            seeder: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Adds a session to the room for `space_id`, creating the room on
    /// first join (caching `bounds` from the caller's directory lookup).
    ///
    /// Returns the spawn position and the other members as one atomic
    /// snapshot, taken by the room actor before the insert — the joiner is
    /// never in its own listing.
    pub async fn join(
        &self,
        space_id: &SpaceId,
        bounds: SpaceBounds,
        session_id: SessionId,
        user_id: UserId,
        sender: MemberSender,
    ) -> Result<JoinedRoom, RoomError> {
        let handle = self.room_or_spawn(space_id, bounds).await;
        handle.join(session_id, user_id, sender).await
    }

    /// Removes a session from the room for `space_id`.
    ///
    /// A no-op if the room doesn't exist or the session already left.
    pub async fn leave(
        &self,
        space_id: &SpaceId,
        session_id: SessionId,
    ) -> Result<(), RoomError> {
        let handle = self.room(space_id).await;
        match handle {
            Some(h) => h.leave(session_id).await,
            None => Ok(()),
        }
    }

    /// Delivers `event` to every member of `space_id` except `exclude`.
    ///
    /// Delivery runs off the registry lock: membership is snapshotted by
    /// the room actor, and each member gets the event over its own
    /// channel. One dead recipient never affects the others. Broadcasting
    /// to a space with no room is a no-op.
    pub async fn broadcast(
        &self,
        space_id: &SpaceId,
        event: ServerMessage,
        exclude: SessionId,
    ) -> Result<(), RoomError> {
        match self.room(space_id).await {
            Some(h) => h.broadcast(event, exclude).await,
            None => Ok(()),
        }
    }

    /// Returns the user ids currently present in `space_id`.
    pub async fn members_of(&self, space_id: &SpaceId) -> Vec<UserId> {
        match self.room(space_id).await {
            Some(h) => h.members().await.unwrap_or_default(),
            None => Vec::new(),
        }
    }

    /// Returns the number of rooms ever occupied (empty rooms included).
    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }

    /// Clones the handle for `space_id`, if a room exists.
    async fn room(&self, space_id: &SpaceId) -> Option<RoomHandle> {
        self.rooms.lock().await.get(space_id).cloned()
    }

    /// Clones the handle for `space_id`, spawning the room actor first if
    /// this is the space's first join.
    async fn room_or_spawn(
        &self,
        space_id: &SpaceId,
        bounds: SpaceBounds,
    ) -> RoomHandle {
        let mut rooms = self.rooms.lock().await;
        if let Some(handle) = rooms.get(space_id) {
            return handle.clone();
        }

        let seed = self.seeder.lock().await.random();
        let handle = spawn_room(
            space_id.clone(),
            bounds,
            seed,
            ROOM_CHANNEL_SIZE,
        );
        rooms.insert(space_id.clone(), handle.clone());
        tracing::info!(%space_id, width = bounds.width, height = bounds.height, "room created");
        handle
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
