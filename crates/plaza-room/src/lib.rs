//! Room membership and broadcast fan-out for Plaza.
//!
//! Each occupied space runs as an isolated Tokio task (actor model) owning
//! its membership set, cached bounds, and spawn RNG. The [`RoomRegistry`]
//! is the front door: it maps space ids to room handles and exposes the
//! four operations the session layer needs — `join`, `leave`, `broadcast`,
//! and `members_of`.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — dependency-injected registry of occupied spaces
//! - [`RoomHandle`] — send commands to one running room actor
//! - [`SpaceDirectory`] — resolve a space id to its [`SpaceBounds`]
//! - [`MemberSender`] — per-member delivery channel for server events

mod directory;
mod error;
mod registry;
mod room;

pub use directory::{MemorySpaceDirectory, SpaceBounds, SpaceDirectory};
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{JoinedRoom, MemberSender, RoomHandle};
