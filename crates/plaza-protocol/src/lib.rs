//! Wire protocol for Plaza.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`Position`],
//!   identifier newtypes) — the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to/from frame bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while doing so.
//!
//! The protocol layer sits between the transport (raw frames) and the
//! session layer (who is in which space). It knows nothing about
//! connections, rooms, or authentication.
//!
//! ```text
//! Transport (bytes) → Protocol (commands/events) → Session (state machine)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientMessage, Position, ServerMessage, SpaceId, UserId, UserSummary,
};
