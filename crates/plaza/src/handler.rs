//! Per-connection handler: the session's command loop.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Create an `Unauthenticated` session and an outbound mailbox
//!   2. Loop: receive frames → decode → drive the session state machine
//!   3. `join` registers with the room registry; `move` validates and
//!      broadcasts; anything else is silently ignored
//!   4. On close (or panic), a drop guard announces `user-left` and
//!      deregisters from the room
//!
//! The handler processes the session's commands strictly in arrival
//! order; all per-session state lives here and is never shared.

use std::sync::Arc;

use plaza_protocol::{
    ClientMessage, Codec, Position, ServerMessage, SpaceId, UserId,
    UserSummary,
};
use plaza_room::{RoomError, RoomRegistry, SpaceDirectory};
use plaza_session::{
    Authenticator, MoveOutcome, Session, SessionError, SessionId,
};
use plaza_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::ServerError;
use crate::server::ServerState;

/// Drop guard that announces a joined session's departure when its
/// handler exits, on every path — clean close, error, or panic.
///
/// `Drop` is synchronous, so the guard spawns a fire-and-forget task for
/// the async registry calls: broadcast `user-left` to the rest of the
/// room, then deregister.
struct DepartureGuard {
    registry: Arc<RoomRegistry>,
    space_id: SpaceId,
    session_id: SessionId,
    user_id: UserId,
}

impl Drop for DepartureGuard {
    fn drop(&mut self) {
        let registry = Arc::clone(&self.registry);
        let space_id = self.space_id.clone();
        let session_id = self.session_id;
        let user_id = self.user_id.clone();
        tokio::spawn(async move {
            let _ = registry
                .broadcast(
                    &space_id,
                    ServerMessage::UserLeft {
                        user_id: user_id.clone(),
                    },
                    session_id,
                )
                .await;
            let _ = registry.leave(&space_id, session_id).await;
            tracing::info!(%session_id, %user_id, %space_id, "session left space");
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<A, D, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<A, D, C>>,
) -> Result<(), ServerError>
where
    A: Authenticator,
    D: SpaceDirectory,
    C: Codec,
{
    let conn_id = conn.id();
    let mut session = Session::new();
    tracing::debug!(%conn_id, session_id = %session.id(), "handling new connection");

    // Outbound mailbox. Direct replies and room broadcasts both land
    // here and a writer task drains them to the socket in queue order,
    // so delivering to this session never blocks a room actor.
    let (outbound_tx, mut outbound_rx) =
        mpsc::unbounded_channel::<ServerMessage>();
    let writer = {
        let conn = conn.clone();
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(event) = outbound_rx.recv().await {
                let bytes = match state.codec.encode(&event) {
                    Ok(b) => b,
                    Err(e) => {
                        tracing::error!(error = %e, "failed to encode event");
                        continue;
                    }
                };
                if conn.send(&bytes).await.is_err() {
                    // Peer is gone; the rest of the queue is moot.
                    break;
                }
            }
        })
    };

    // Held while Joined; dropping it fires the departure broadcast.
    let mut departure: Option<DepartureGuard> = None;

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(session_id = %session.id(), "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(session_id = %session.id(), error = %e, "recv error");
                break;
            }
        };

        let command: ClientMessage = match state.codec.decode(&data) {
            Ok(cmd) => cmd,
            Err(e) => {
                // A frame that isn't a well-formed command is a protocol
                // violation. Close this connection; other sessions are
                // unaffected.
                tracing::warn!(
                    session_id = %session.id(),
                    error = %e,
                    "malformed frame, closing connection"
                );
                break;
            }
        };

        match command {
            ClientMessage::Join { space_id, token } => {
                if session.is_joined() {
                    // A session binds to a space exactly once.
                    tracing::debug!(
                        session_id = %session.id(),
                        "join on already-joined session ignored"
                    );
                    continue;
                }
                match perform_join(
                    &state,
                    &mut session,
                    space_id,
                    &token,
                    &outbound_tx,
                )
                .await
                {
                    Ok(guard) => departure = Some(guard),
                    Err(e) => {
                        // No error frame — the close itself is the signal.
                        tracing::info!(
                            session_id = %session.id(),
                            error = %e,
                            "join rejected, closing connection"
                        );
                        break;
                    }
                }
            }

            ClientMessage::Move { x, y } => {
                handle_move(
                    &state,
                    &mut session,
                    Position::new(x, y),
                    &outbound_tx,
                )
                .await;
            }

            ClientMessage::Unknown => {
                tracing::debug!(
                    session_id = %session.id(),
                    "ignoring unrecognized command"
                );
            }
        }
    }

    // Departure fires here (user-left broadcast + deregistration), then
    // the writer drains what's already queued and exits.
    drop(departure);
    drop(outbound_tx);
    let _ = writer.await;
    let _ = conn.close().await;
    Ok(())
}

/// Performs the join handshake: verify the credential, resolve the space,
/// register with the room, reply `space-joined`, broadcast `user-joined`.
///
/// Verifier and directory calls run under the configured handshake
/// timeout; a timeout is treated identically to an explicit rejection.
async fn perform_join<A, D, C>(
    state: &Arc<ServerState<A, D, C>>,
    session: &mut Session,
    space_id: SpaceId,
    token: &str,
    outbound: &mpsc::UnboundedSender<ServerMessage>,
) -> Result<DepartureGuard, ServerError>
where
    A: Authenticator,
    D: SpaceDirectory,
    C: Codec,
{
    let user_id = match tokio::time::timeout(
        state.handshake_timeout,
        state.auth.verify(token),
    )
    .await
    {
        Ok(Ok(user_id)) => user_id,
        Ok(Err(e)) => return Err(ServerError::Session(e)),
        Err(_) => {
            return Err(ServerError::Session(
                SessionError::VerifierUnavailable(
                    "verification timed out".into(),
                ),
            ));
        }
    };

    let bounds = match tokio::time::timeout(
        state.handshake_timeout,
        state.directory.lookup(&space_id),
    )
    .await
    {
        Ok(Ok(bounds)) => bounds,
        Ok(Err(e)) => return Err(ServerError::Room(e)),
        Err(_) => {
            return Err(ServerError::Room(RoomError::LookupFailed(
                "space lookup timed out".into(),
            )));
        }
    };

    // Register; the room picks the spawn and snapshots the other members.
    let joined = state
        .registry
        .join(
            &space_id,
            bounds,
            session.id(),
            user_id.clone(),
            outbound.clone(),
        )
        .await?;

    // Guard the registration before anything else can fail: if a later
    // step errors out, dropping the guard deregisters the member instead
    // of leaving a ghost in the room.
    let guard = DepartureGuard {
        registry: Arc::clone(&state.registry),
        space_id: space_id.clone(),
        session_id: session.id(),
        user_id: user_id.clone(),
    };

    session.complete_join(user_id.clone(), space_id.clone(), joined.spawn)?;

    // Reply to the joiner first, then announce it to the rest.
    let users = joined
        .others
        .into_iter()
        .map(|id| UserSummary { id })
        .collect();
    let _ = outbound.send(ServerMessage::SpaceJoined {
        spawn: joined.spawn,
        users,
    });
    state
        .registry
        .broadcast(
            &space_id,
            ServerMessage::UserJoined {
                user_id: user_id.clone(),
                x: joined.spawn.x,
                y: joined.spawn.y,
            },
            session.id(),
        )
        .await?;

    tracing::info!(
        session_id = %session.id(),
        %user_id,
        %space_id,
        spawn = %joined.spawn,
        "session joined space"
    );

    Ok(guard)
}

/// Applies a move command to the session.
///
/// Accepted moves are broadcast to the rest of the room; rejected moves
/// answer only the originator with its unchanged position; a move before
/// the join handshake is a silent no-op.
async fn handle_move<A, D, C>(
    state: &Arc<ServerState<A, D, C>>,
    session: &mut Session,
    target: Position,
    outbound: &mpsc::UnboundedSender<ServerMessage>,
) where
    A: Authenticator,
    D: SpaceDirectory,
    C: Codec,
{
    match session.try_move(target) {
        MoveOutcome::Accepted { user_id, position } => {
            if let Some(space_id) = session.space_id() {
                let _ = state
                    .registry
                    .broadcast(
                        space_id,
                        ServerMessage::Movement {
                            user_id,
                            x: position.x,
                            y: position.y,
                        },
                        session.id(),
                    )
                    .await;
            }
        }
        MoveOutcome::Rejected { position } => {
            let _ = outbound.send(ServerMessage::MovementRejected {
                x: position.x,
                y: position.y,
            });
        }
        MoveOutcome::NotJoined => {
            // No room to move within yet; nothing to answer.
            tracing::debug!(
                session_id = %session.id(),
                "move before join ignored"
            );
        }
    }
}
