//! `PlazaServer` builder and accept loop.
//!
//! This is the entry point for running a Plaza presence server. It ties
//! together all the layers: transport → protocol → session → room.

use std::sync::Arc;
use std::time::Duration;

use plaza_protocol::{Codec, JsonCodec};
use plaza_room::{RoomRegistry, SpaceDirectory};
use plaza_session::Authenticator;
use plaza_transport::{Transport, WebSocketTransport};

use crate::ServerError;
use crate::handler::handle_connection;

/// Default bound on identity-verifier and space-directory calls during the
/// join handshake. Hitting it is treated as a rejection.
const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared server state handed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The registry
/// is itself an `Arc` because departure cleanup outlives the handler (it
/// runs from a drop guard).
pub(crate) struct ServerState<A, D, C> {
    pub(crate) registry: Arc<RoomRegistry>,
    pub(crate) auth: A,
    pub(crate) directory: D,
    pub(crate) codec: C,
    pub(crate) handshake_timeout: Duration,
}

/// Builder for configuring and starting a Plaza server.
///
/// # Example
///
/// ```rust,no_run
/// use plaza::prelude::*;
///
/// # struct MyAuth;
/// # impl Authenticator for MyAuth {
/// #     async fn verify(&self, t: &str) -> Result<UserId, SessionError> {
/// #         Ok(UserId::from(t))
/// #     }
/// # }
/// # async fn run() -> Result<(), ServerError> {
/// let directory = MemorySpaceDirectory::new().with_space("plaza-1", 100, 200);
/// let server = PlazaServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build(MyAuth, directory)
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct PlazaServerBuilder {
    bind_addr: String,
    handshake_timeout: Duration,
    spawn_seed: Option<u64>,
}

impl PlazaServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            spawn_seed: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the bound on verifier/directory calls during the handshake.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Fixes the spawn-position randomness, making spawns reproducible.
    /// Meant for tests; production servers should leave this unset.
    pub fn spawn_seed(mut self, seed: u64) -> Self {
        self.spawn_seed = Some(seed);
        self
    }

    /// Builds and binds the server with the given identity verifier and
    /// space directory.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build<A, D>(
        self,
        auth: A,
        directory: D,
    ) -> Result<PlazaServer<A, D, JsonCodec>, ServerError>
    where
        A: Authenticator,
        D: SpaceDirectory,
    {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let registry = match self.spawn_seed {
            Some(seed) => RoomRegistry::with_seed(seed),
            None => RoomRegistry::new(),
        };

        let state = Arc::new(ServerState {
            registry: Arc::new(registry),
            auth,
            directory,
            codec: JsonCodec,
            handshake_timeout: self.handshake_timeout,
        });

        Ok(PlazaServer { transport, state })
    }
}

impl Default for PlazaServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Plaza server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct PlazaServer<A, D, C> {
    transport: WebSocketTransport,
    state: Arc<ServerState<A, D, C>>,
}

impl<A, D, C> PlazaServer<A, D, C>
where
    A: Authenticator,
    D: SpaceDirectory,
    C: Codec,
{
    /// Creates a new builder.
    pub fn builder() -> PlazaServerBuilder {
        PlazaServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns one handler task per
    /// connection. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), ServerError> {
        tracing::info!("Plaza server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
