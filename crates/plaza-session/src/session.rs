//! Session types: the server-side record of one live connection.
//!
//! A session tracks WHO the connection belongs to (once authenticated),
//! WHERE they are (space and position), and what they're still allowed to
//! do. It is owned exclusively by that connection's handler task — no other
//! component mutates it — so none of this needs locking.

use std::sync::atomic::{AtomicU64, Ordering};

use plaza_protocol::{Position, SpaceId, UserId};

use crate::is_cardinal_step;

/// Counter for generating process-unique session IDs.
static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

// ---------------------------------------------------------------------------
// SessionId
// ---------------------------------------------------------------------------

/// Opaque, process-unique identifier for a session.
///
/// Allocated once when the connection opens and never reused for the
/// lifetime of the process. Distinct from [`UserId`]: the same user
/// connecting twice gets two sessions. Session IDs never appear on the
/// wire — they key room membership and broadcast exclusion internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    /// Allocates the next session ID.
    pub fn next() -> Self {
        Self(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sess-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The session's lifecycle state.
///
/// ```text
///   Unauthenticated ──(join ok)──→ Joined ──(connection close)──→ gone
/// ```
///
/// There is no path back to `Unauthenticated`, and a session never changes
/// spaces: re-joining means reconnecting. Modeling this as a tagged variant
/// (rather than optional fields on one struct) makes "moved before joining"
/// unrepresentable as a state, not just a runtime check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Connection is open but the join handshake has not completed.
    Unauthenticated,

    /// Join handshake completed; the session occupies a space.
    Joined {
        user_id: UserId,
        space_id: SpaceId,
        position: Position,
    },
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Outcome of a move request, decided before any mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The step was a valid cardinal single-step; the session's position
    /// has been updated to `position`.
    Accepted { user_id: UserId, position: Position },

    /// The step was invalid; `position` is the current, unchanged position
    /// to echo back in `movement-rejected`.
    Rejected { position: Position },

    /// The session has not joined a space — there is nothing to move
    /// within. Callers treat this as a silent no-op.
    NotJoined,
}

/// One live connection's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    state: SessionState,
}

impl Session {
    /// Creates a fresh, unauthenticated session with a new ID.
    pub fn new() -> Self {
        Self {
            id: SessionId::next(),
            state: SessionState::Unauthenticated,
        }
    }

    /// Returns this session's ID.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns `true` once the join handshake has completed.
    pub fn is_joined(&self) -> bool {
        matches!(self.state, SessionState::Joined { .. })
    }

    /// Returns the authenticated user ID, if joined.
    pub fn user_id(&self) -> Option<&UserId> {
        match &self.state {
            SessionState::Joined { user_id, .. } => Some(user_id),
            SessionState::Unauthenticated => None,
        }
    }

    /// Returns the occupied space, if joined.
    pub fn space_id(&self) -> Option<&SpaceId> {
        match &self.state {
            SessionState::Joined { space_id, .. } => Some(space_id),
            SessionState::Unauthenticated => None,
        }
    }

    /// Returns the current position, if joined.
    pub fn position(&self) -> Option<Position> {
        match &self.state {
            SessionState::Joined { position, .. } => Some(*position),
            SessionState::Unauthenticated => None,
        }
    }

    /// Transitions `Unauthenticated → Joined` after a successful handshake.
    ///
    /// `user_id` and `space_id` are set exactly once per session; a second
    /// join on an already-joined session is an invalid-state command and
    /// returns `Err` without touching the state. The caller ignores it
    /// silently, matching the protocol's permissive default.
    pub fn complete_join(
        &mut self,
        user_id: UserId,
        space_id: SpaceId,
        spawn: Position,
    ) -> Result<(), crate::SessionError> {
        match self.state {
            SessionState::Unauthenticated => {
                self.state = SessionState::Joined {
                    user_id,
                    space_id,
                    position: spawn,
                };
                Ok(())
            }
            SessionState::Joined { .. } => {
                Err(crate::SessionError::AlreadyJoined(self.id))
            }
        }
    }

    /// Validates and, if valid, applies a move to an absolute target.
    ///
    /// Rejection is side-effect-free: validation happens before any
    /// mutation, so a rejected move leaves the position exactly as it was.
    pub fn try_move(&mut self, target: Position) -> MoveOutcome {
        match &mut self.state {
            SessionState::Unauthenticated => MoveOutcome::NotJoined,
            SessionState::Joined {
                user_id, position, ..
            } => {
                if is_cardinal_step(*position, target) {
                    *position = target;
                    MoveOutcome::Accepted {
                        user_id: user_id.clone(),
                        position: target,
                    }
                } else {
                    MoveOutcome::Rejected {
                        position: *position,
                    }
                }
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
