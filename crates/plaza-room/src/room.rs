//! Room actor: an isolated Tokio task that owns one space's live state.
//!
//! Each occupied space runs as its own task holding the membership map,
//! the cached bounds, and the spawn RNG. All mutations arrive through an
//! mpsc channel and are processed one at a time, so a concurrent join and
//! leave can neither corrupt the membership set nor be lost — the actor IS
//! the room's critical section. Delivery to members goes over unbounded
//! per-member channels, so handling a command never blocks on a slow
//! recipient.

use std::collections::HashMap;

use plaza_protocol::{Position, ServerMessage, SpaceId, UserId};
use plaza_session::SessionId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{mpsc, oneshot};

use crate::{RoomError, SpaceBounds};

/// Channel sender used to deliver events to one member's connection task.
pub type MemberSender = mpsc::UnboundedSender<ServerMessage>;

/// Reply to a successful join: the spawn position and a snapshot of who
/// else was in the room at that instant (never including the joiner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRoom {
    pub spawn: Position,
    pub others: Vec<UserId>,
}

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in some variants is the reply channel — the
/// caller sends a command and awaits the response on it.
pub(crate) enum RoomCommand {
    /// Add a member, pick its spawn, and report the other members.
    Join {
        session_id: SessionId,
        user_id: UserId,
        sender: MemberSender,
        reply: oneshot::Sender<JoinedRoom>,
    },

    /// Remove a member. No-op if the session is not a member.
    Leave { session_id: SessionId },

    /// Deliver an event to every member except `exclude`.
    Broadcast {
        event: ServerMessage,
        exclude: SessionId,
    },

    /// Report the current members' user ids.
    Members {
        reply: oneshot::Sender<Vec<UserId>>,
    },
}

/// Handle to a running room actor. Cheap to clone — just an `mpsc::Sender`.
///
/// The [`RoomRegistry`](crate::RoomRegistry) holds one per occupied space.
#[derive(Clone)]
pub struct RoomHandle {
    space_id: SpaceId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the space this room serves.
    pub fn space_id(&self) -> &SpaceId {
        &self.space_id
    }

    /// Adds a member and returns its spawn plus the other members.
    pub async fn join(
        &self,
        session_id: SessionId,
        user_id: UserId,
        sender: MemberSender,
    ) -> Result<JoinedRoom, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                session_id,
                user_id,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.space_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.space_id.clone()))
    }

    /// Removes a member (fire-and-forget; absent members are a no-op).
    pub async fn leave(
        &self,
        session_id: SessionId,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Leave { session_id })
            .await
            .map_err(|_| RoomError::Unavailable(self.space_id.clone()))
    }

    /// Delivers `event` to every member except `exclude`.
    ///
    /// The actor snapshots membership when it processes the command, so a
    /// join or leave racing with the broadcast can neither duplicate nor
    /// skip delivery for members present at that point in time.
    pub async fn broadcast(
        &self,
        event: ServerMessage,
        exclude: SessionId,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Broadcast { event, exclude })
            .await
            .map_err(|_| RoomError::Unavailable(self.space_id.clone()))
    }

    /// Returns the current members' user ids.
    pub async fn members(&self) -> Result<Vec<UserId>, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Members { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.space_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.space_id.clone()))
    }
}

/// One member's record inside the actor.
struct Member {
    user_id: UserId,
    sender: MemberSender,
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    space_id: SpaceId,
    bounds: SpaceBounds,
    members: HashMap<SessionId, Member>,
    rng: StdRng,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop until every handle is dropped.
    async fn run(mut self) {
        tracing::debug!(space_id = %self.space_id, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    session_id,
                    user_id,
                    sender,
                    reply,
                } => {
                    let joined =
                        self.handle_join(session_id, user_id, sender);
                    let _ = reply.send(joined);
                }
                RoomCommand::Leave { session_id } => {
                    self.handle_leave(session_id);
                }
                RoomCommand::Broadcast { event, exclude } => {
                    self.handle_broadcast(event, exclude);
                }
                RoomCommand::Members { reply } => {
                    let ids = self
                        .members
                        .values()
                        .map(|m| m.user_id.clone())
                        .collect();
                    let _ = reply.send(ids);
                }
            }
        }

        tracing::debug!(space_id = %self.space_id, "room actor stopped");
    }

    fn handle_join(
        &mut self,
        session_id: SessionId,
        user_id: UserId,
        sender: MemberSender,
    ) -> JoinedRoom {
        // Snapshot the other members before inserting, so the joiner never
        // lists itself.
        let others: Vec<UserId> = self
            .members
            .values()
            .map(|m| m.user_id.clone())
            .collect();

        let spawn = self.pick_spawn();
        self.members
            .insert(session_id, Member { user_id: user_id.clone(), sender });

        tracing::info!(
            space_id = %self.space_id,
            %session_id,
            %user_id,
            %spawn,
            members = self.members.len(),
            "member joined"
        );

        JoinedRoom { spawn, others }
    }

    fn handle_leave(&mut self, session_id: SessionId) {
        if self.members.remove(&session_id).is_some() {
            tracing::info!(
                space_id = %self.space_id,
                %session_id,
                members = self.members.len(),
                "member left"
            );
        }
    }

    fn handle_broadcast(&mut self, event: ServerMessage, exclude: SessionId) {
        for (session_id, member) in &self.members {
            if *session_id == exclude {
                continue;
            }
            // Unbounded send never blocks; a closed receiver means that
            // member's connection is already going away, which must not
            // affect delivery to the rest.
            let _ = member.sender.send(event.clone());
        }
    }

    /// Picks a uniform-random spawn strictly within the bounds.
    ///
    /// Not collision-free: two members can legitimately spawn on the same
    /// cell. Degenerate bounds are clamped: zero-sized spaces spawn at the
    /// origin, and dimensions past `i32::MAX` are capped so the cast to
    /// signed coordinates can't wrap negative.
    fn pick_spawn(&mut self) -> Position {
        let width = self.bounds.width.clamp(1, i32::MAX as u32);
        let height = self.bounds.height.clamp(1, i32::MAX as u32);
        let x = self.rng.random_range(0..width) as i32;
        let y = self.rng.random_range(0..height) as i32;
        Position::new(x, y)
    }
}

/// Spawns a room actor for `space_id` and returns a handle to it.
///
/// `bounds` come from the first member's directory lookup and are cached
/// for the room's lifetime. `seed` makes the spawn sequence reproducible;
/// the registry derives one per room from its own RNG.
pub(crate) fn spawn_room(
    space_id: SpaceId,
    bounds: SpaceBounds,
    seed: u64,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        space_id: space_id.clone(),
        bounds,
        members: HashMap::new(),
        rng: StdRng::seed_from_u64(seed),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        space_id,
        sender: tx,
    }
}
