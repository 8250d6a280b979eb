//! Session lifecycle for Plaza.
//!
//! This crate owns the per-connection state machine:
//!
//! 1. **Identity** — validating who a user is ([`Authenticator`] trait).
//! 2. **State** — `Unauthenticated → Joined` ([`Session`], [`SessionState`]),
//!    with the session's current space and position.
//! 3. **Movement** — the cardinal single-step rule ([`is_cardinal_step`])
//!    applied through [`Session::try_move`].
//!
//! # How it fits in the stack
//!
//! ```text
//! Room layer (above)  ← membership and broadcast, keyed by SessionId
//!     ↕
//! Session layer (this crate)  ← identity, join state, position
//!     ↕
//! Protocol layer (below)  ← UserId, SpaceId, Position wire types
//! ```
//!
//! A [`Session`] is owned by exactly one connection handler task and
//! mutated only there, in frame-arrival order; nothing here is shared.

mod auth;
mod error;
mod motion;
mod session;

pub use auth::Authenticator;
pub use error::SessionError;
pub use motion::is_cardinal_step;
pub use session::{MoveOutcome, Session, SessionId, SessionState};
