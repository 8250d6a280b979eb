//! Integration tests for the Plaza server: full join/move/leave flows
//! over real WebSocket connections.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use plaza::prelude::*;
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Mock identity verifier
// =========================================================================

/// Accepts tokens of the form `valid-<user>`; rejects everything else.
struct TestAuth;

impl Authenticator for TestAuth {
    async fn verify(&self, token: &str) -> Result<UserId, SessionError> {
        match token.strip_prefix("valid-") {
            Some(user) => Ok(UserId::from(user)),
            None => Err(SessionError::InvalidCredential(
                "unknown token".into(),
            )),
        }
    }
}

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server with two known spaces and returns its address.
async fn start_server() -> String {
    let directory = MemorySpaceDirectory::new()
        .with_space("plaza-1", 100, 200)
        .with_space("closet", 1, 1);

    let server = PlazaServerBuilder::new()
        .bind("127.0.0.1:0")
        .build(TestAuth, directory)
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

fn encode_command(cmd: &ClientMessage) -> Message {
    let bytes = serde_json::to_vec(cmd).expect("encode");
    Message::Binary(bytes.into())
}

async fn send_command(ws: &mut ClientWs, cmd: &ClientMessage) {
    ws.send(encode_command(cmd)).await.expect("send command");
}

/// Receives and decodes the next server event, with a timeout.
async fn recv_event(ws: &mut ClientWs) -> ServerMessage {
    let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("timed out waiting for event")
        .expect("stream ended unexpectedly")
        .expect("recv error");
    serde_json::from_slice(&msg.into_data()).expect("decode event")
}

/// Asserts the server sends nothing within a short window.
async fn assert_silent(ws: &mut ClientWs) {
    let result =
        tokio::time::timeout(Duration::from_millis(150), ws.next()).await;
    assert!(result.is_err(), "expected no event, got {result:?}");
}

/// Asserts the server closes the connection without sending any event.
async fn assert_closed_without_event(ws: &mut ClientWs) {
    let result =
        tokio::time::timeout(Duration::from_secs(2), ws.next()).await;
    match result {
        Ok(Some(Ok(Message::Close(_)))) | Ok(None) => {}
        Ok(Some(Err(_))) => {} // reset before close frame — also a close
        other => panic!("expected close with no event, got {other:?}"),
    }
}

/// Joins `space` as `user` and returns the spawn and member listing.
async fn join(
    ws: &mut ClientWs,
    space: &str,
    user: &str,
) -> (Position, Vec<UserSummary>) {
    send_command(
        ws,
        &ClientMessage::Join {
            space_id: SpaceId::from(space),
            token: format!("valid-{user}"),
        },
    )
    .await;
    match recv_event(ws).await {
        ServerMessage::SpaceJoined { spawn, users } => (spawn, users),
        other => panic!("expected space-joined, got {other:?}"),
    }
}

// =========================================================================
// Join
// =========================================================================

#[tokio::test]
async fn test_first_joiner_gets_empty_user_list_and_in_bounds_spawn() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let (spawn, users) = join(&mut ws, "plaza-1", "alice").await;
    assert!(users.is_empty());
    assert!(spawn.x >= 0 && spawn.x < 100);
    assert!(spawn.y >= 0 && spawn.y < 200);
}

#[tokio::test]
async fn test_second_joiner_sees_first_and_first_is_notified() {
    let addr = start_server().await;
    let mut ws_a = connect(&addr).await;
    let mut ws_b = connect(&addr).await;

    join(&mut ws_a, "plaza-1", "alice").await;
    let (spawn_b, users_b) = join(&mut ws_b, "plaza-1", "bob").await;

    // B's listing is exactly [alice], never including bob itself.
    assert_eq!(
        users_b,
        vec![UserSummary {
            id: UserId::from("alice")
        }]
    );

    // A hears about B, at B's spawn coordinates.
    match recv_event(&mut ws_a).await {
        ServerMessage::UserJoined { user_id, x, y } => {
            assert_eq!(user_id, UserId::from("bob"));
            assert_eq!(x, spawn_b.x);
            assert_eq!(y, spawn_b.y);
        }
        other => panic!("expected user-joined, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_credential_closes_connection_without_event() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send_command(
        &mut ws,
        &ClientMessage::Join {
            space_id: SpaceId::from("plaza-1"),
            token: "forged".into(),
        },
    )
    .await;

    assert_closed_without_event(&mut ws).await;
}

#[tokio::test]
async fn test_unknown_space_closes_connection_without_event() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send_command(
        &mut ws,
        &ClientMessage::Join {
            space_id: SpaceId::from("atlantis"),
            token: "valid-alice".into(),
        },
    )
    .await;

    assert_closed_without_event(&mut ws).await;
}

#[tokio::test]
async fn test_one_by_one_space_always_spawns_at_origin() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let (spawn, _) = join(&mut ws, "closet", "alice").await;
    assert_eq!(spawn, Position::new(0, 0));
}

#[tokio::test]
async fn test_spaces_are_isolated() {
    let addr = start_server().await;
    let mut ws_a = connect(&addr).await;
    let mut ws_b = connect(&addr).await;

    join(&mut ws_a, "plaza-1", "alice").await;
    let (_, users) = join(&mut ws_b, "closet", "bob").await;

    // bob is alone in his space; alice hears nothing.
    assert!(users.is_empty());
    assert_silent(&mut ws_a).await;
}

// =========================================================================
// Movement
// =========================================================================

#[tokio::test]
async fn test_valid_move_is_broadcast_to_the_other_member() {
    let addr = start_server().await;
    let mut ws_a = connect(&addr).await;
    let mut ws_b = connect(&addr).await;

    let (spawn_a, _) = join(&mut ws_a, "plaza-1", "alice").await;
    join(&mut ws_b, "plaza-1", "bob").await;
    let _ = recv_event(&mut ws_a).await; // user-joined for bob

    // One step east from wherever alice spawned.
    let target = Position::new(spawn_a.x + 1, spawn_a.y);
    send_command(
        &mut ws_a,
        &ClientMessage::Move {
            x: target.x,
            y: target.y,
        },
    )
    .await;

    match recv_event(&mut ws_b).await {
        ServerMessage::Movement { user_id, x, y } => {
            assert_eq!(user_id, UserId::from("alice"));
            assert_eq!(Position::new(x, y), target);
        }
        other => panic!("expected movement, got {other:?}"),
    }
    // The mover itself gets no echo.
    assert_silent(&mut ws_a).await;
}

#[tokio::test]
async fn test_jump_is_rejected_with_unchanged_position() {
    let addr = start_server().await;
    let mut ws_a = connect(&addr).await;
    let mut ws_b = connect(&addr).await;

    let (spawn_a, _) = join(&mut ws_a, "plaza-1", "alice").await;
    join(&mut ws_b, "plaza-1", "bob").await;
    let _ = recv_event(&mut ws_a).await; // user-joined for bob

    send_command(
        &mut ws_a,
        &ClientMessage::Move {
            x: spawn_a.x + 2,
            y: spawn_a.y,
        },
    )
    .await;

    match recv_event(&mut ws_a).await {
        ServerMessage::MovementRejected { x, y } => {
            assert_eq!(Position::new(x, y), spawn_a);
        }
        other => panic!("expected movement-rejected, got {other:?}"),
    }
    // No broadcast for a rejected move.
    assert_silent(&mut ws_b).await;
}

#[tokio::test]
async fn test_diagonal_move_is_rejected() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let (spawn, _) = join(&mut ws, "plaza-1", "alice").await;
    send_command(
        &mut ws,
        &ClientMessage::Move {
            x: spawn.x + 1,
            y: spawn.y + 1,
        },
    )
    .await;

    match recv_event(&mut ws).await {
        ServerMessage::MovementRejected { x, y } => {
            assert_eq!(Position::new(x, y), spawn);
        }
        other => panic!("expected movement-rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rejected_move_does_not_corrupt_position() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let (spawn, _) = join(&mut ws, "plaza-1", "alice").await;

    // Reject a jump, then verify a single step from the ORIGINAL
    // position is still accepted (position was never mutated).
    send_command(
        &mut ws,
        &ClientMessage::Move {
            x: spawn.x + 5,
            y: spawn.y,
        },
    )
    .await;
    let _ = recv_event(&mut ws).await; // movement-rejected

    send_command(
        &mut ws,
        &ClientMessage::Move {
            x: spawn.x,
            y: spawn.y + 1,
        },
    )
    .await;
    // Accepted moves produce no reply to the mover.
    assert_silent(&mut ws).await;
}

#[tokio::test]
async fn test_move_before_join_is_silently_ignored() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send_command(&mut ws, &ClientMessage::Move { x: 1, y: 0 }).await;
    assert_silent(&mut ws).await;

    // The connection is still healthy; a join still works.
    let (_, users) = join(&mut ws, "plaza-1", "alice").await;
    assert!(users.is_empty());
}

// =========================================================================
// Permissive defaults and protocol errors
// =========================================================================

#[tokio::test]
async fn test_unrecognized_command_is_ignored() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    join(&mut ws, "plaza-1", "alice").await;

    // Well-formed frame, unknown type: silently ignored.
    ws.send(Message::Text(
        r#"{"type":"wave","payload":{"emoji":"👋"}}"#.into(),
    ))
    .await
    .expect("send");
    assert_silent(&mut ws).await;

    // And the session still processes commands afterwards.
    send_command(&mut ws, &ClientMessage::Move { x: 9999, y: 9999 }).await;
    match recv_event(&mut ws).await {
        ServerMessage::MovementRejected { .. } => {}
        other => panic!("expected movement-rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_frame_closes_only_that_connection() {
    let addr = start_server().await;
    let mut ws_bad = connect(&addr).await;
    let mut ws_good = connect(&addr).await;

    ws_bad
        .send(Message::Text("not json at all".into()))
        .await
        .expect("send");
    assert_closed_without_event(&mut ws_bad).await;

    // A parallel connection is unaffected.
    let (_, users) = join(&mut ws_good, "plaza-1", "bob").await;
    assert!(users.is_empty());
}

#[tokio::test]
async fn test_repeat_join_is_ignored() {
    let addr = start_server().await;
    let mut ws_a = connect(&addr).await;
    let mut ws_b = connect(&addr).await;

    join(&mut ws_a, "plaza-1", "alice").await;
    join(&mut ws_b, "plaza-1", "bob").await;
    let _ = recv_event(&mut ws_a).await; // user-joined for bob

    // A second join on an already-joined session: no reply, no rebind.
    send_command(
        &mut ws_a,
        &ClientMessage::Join {
            space_id: SpaceId::from("closet"),
            token: "valid-alice".into(),
        },
    )
    .await;
    assert_silent(&mut ws_a).await;
    assert_silent(&mut ws_b).await;
}

// =========================================================================
// Departure
// =========================================================================

#[tokio::test]
async fn test_close_broadcasts_user_left_to_remaining_members() {
    let addr = start_server().await;
    let mut ws_a = connect(&addr).await;
    let mut ws_b = connect(&addr).await;

    join(&mut ws_a, "plaza-1", "alice").await;
    join(&mut ws_b, "plaza-1", "bob").await;
    let _ = recv_event(&mut ws_a).await; // user-joined for bob

    ws_a.close(None).await.expect("close");

    match recv_event(&mut ws_b).await {
        ServerMessage::UserLeft { user_id } => {
            assert_eq!(user_id, UserId::from("alice"));
        }
        other => panic!("expected user-left, got {other:?}"),
    }
    // Exactly one user-left, nothing more.
    assert_silent(&mut ws_b).await;
}

#[tokio::test]
async fn test_departed_member_is_gone_from_subsequent_listings() {
    let addr = start_server().await;
    let mut ws_a = connect(&addr).await;
    let mut ws_b = connect(&addr).await;

    join(&mut ws_a, "plaza-1", "alice").await;
    join(&mut ws_b, "plaza-1", "bob").await;
    let _ = recv_event(&mut ws_a).await; // user-joined for bob

    ws_a.close(None).await.expect("close");
    let _ = recv_event(&mut ws_b).await; // user-left for alice

    // Let the deregistration settle, then query via a fresh joiner.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let mut ws_c = connect(&addr).await;
    let (_, users) = join(&mut ws_c, "plaza-1", "carol").await;
    assert_eq!(
        users,
        vec![UserSummary {
            id: UserId::from("bob")
        }]
    );
}

#[tokio::test]
async fn test_unauthenticated_close_announces_nothing() {
    let addr = start_server().await;
    let mut ws_a = connect(&addr).await;
    let mut ws_b = connect(&addr).await;

    join(&mut ws_a, "plaza-1", "alice").await;

    // B connects but never joins, then disappears.
    ws_b.close(None).await.expect("close");

    assert_silent(&mut ws_a).await;
}
