//! # Plaza
//!
//! Real-time presence and movement server for shared virtual spaces.
//!
//! Plaza keeps live position state for users occupying 2D "spaces" and
//! synchronizes joins, moves, and departures across every participant
//! over persistent WebSocket connections. Embedders supply two hooks —
//! an [`Authenticator`](plaza_session::Authenticator) that validates
//! credentials and a [`SpaceDirectory`](plaza_room::SpaceDirectory) that
//! resolves space dimensions — and the server handles sessions, rooms,
//! and broadcast fan-out.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use plaza::prelude::*;
//!
//! # struct MyAuth;
//! # impl Authenticator for MyAuth {
//! #     async fn verify(&self, t: &str) -> Result<UserId, SessionError> {
//! #         Ok(UserId::from(t))
//! #     }
//! # }
//! # async fn run() -> Result<(), ServerError> {
//! let directory = MemorySpaceDirectory::new().with_space("plaza-1", 100, 200);
//!
//! let server = PlazaServerBuilder::new()
//!     .bind("0.0.0.0:8080")
//!     .build(MyAuth, directory)
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::ServerError;
pub use server::{PlazaServer, PlazaServerBuilder};

/// The common imports for embedding a Plaza server.
pub mod prelude {
    pub use crate::{PlazaServer, PlazaServerBuilder, ServerError};
    pub use plaza_protocol::{
        ClientMessage, Codec, JsonCodec, Position, ServerMessage, SpaceId,
        UserId, UserSummary,
    };
    pub use plaza_room::{
        MemorySpaceDirectory, RoomError, RoomRegistry, SpaceBounds,
        SpaceDirectory,
    };
    pub use plaza_session::{
        Authenticator, MoveOutcome, Session, SessionError, SessionId,
        SessionState,
    };
}
