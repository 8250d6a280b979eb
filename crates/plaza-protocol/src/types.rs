//! Core protocol types for Plaza's wire format.
//!
//! Everything in this module travels "on the wire": these structures are
//! serialized to JSON, sent over the WebSocket, and deserialized on the
//! other side. The exact JSON shapes are part of the public protocol and
//! are pinned by the tests at the bottom of this file.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A stable identifier for an authenticated user.
///
/// Issued by the identity verifier (JWT subject, account id, ...). Plaza
/// treats it as opaque — it is never parsed, only compared and forwarded.
///
/// `#[serde(transparent)]` serializes the wrapper as the bare inner string,
/// so `UserId("u-7")` becomes `"u-7"` in JSON, not `{"0":"u-7"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of a space (a bounded 2D area users can occupy).
///
/// Spaces are created and stored outside the real-time core; the core only
/// resolves them through the space directory and uses the id as a room key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpaceId(pub String);

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SpaceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// An integer grid position inside (or, after enough moves, outside) a space.
///
/// Coordinates are signed: spawn positions are always within
/// `[0, width) × [0, height)`, but movement is only validated as a cardinal
/// single-step — the bounds are not re-checked on each move, so a long walk
/// can legitimately produce coordinates past the edges.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a position from raw coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One entry of the `space-joined` member listing.
///
/// Deliberately just the id — the protocol does not reveal other members'
/// positions at join time; clients learn them from subsequent `movement`
/// events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
}

// ---------------------------------------------------------------------------
// Client → server commands
// ---------------------------------------------------------------------------

/// A command sent by a client.
///
/// The wire shape is `{"type": "<tag>", "payload": {...}}` — serde's
/// "adjacently tagged" representation. Tags are kebab-case and payload
/// fields camelCase, matching what browser clients send:
///
/// ```json
/// { "type": "join", "payload": { "spaceId": "plaza-1", "token": "..." } }
/// { "type": "move", "payload": { "x": 5, "y": 6 } }
/// ```
///
/// Any well-formed frame with an unrecognized tag decodes to [`Unknown`],
/// payload or not, and is silently ignored by the session — a permissive
/// default so newer clients don't break older servers. A frame that is not
/// well formed at all is a decode error, which the connection handler
/// treats as a protocol violation.
///
/// Decoding is two-stage: the `type`/`payload` envelope first, then the
/// payload only for tags we know. (`#[serde(other)]` can't do this — in an
/// adjacently tagged enum a unit fallback variant rejects any frame that
/// carries a payload.)
///
/// [`Unknown`]: ClientMessage::Unknown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    /// Authenticate and enter a space. Valid only as the first command of
    /// a session.
    Join { space_id: SpaceId, token: String },

    /// Request a move to an absolute target position. Valid only after a
    /// successful join.
    Move { x: i32, y: i32 },

    /// Anything with a tag we don't recognize.
    Unknown,
}

impl<'de> Deserialize<'de> for ClientMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Envelope {
            #[serde(rename = "type")]
            tag: String,
            #[serde(default)]
            payload: serde_json::Value,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct JoinPayload {
            space_id: SpaceId,
            token: String,
        }

        #[derive(Deserialize)]
        struct MovePayload {
            x: i32,
            y: i32,
        }

        let envelope = Envelope::deserialize(deserializer)?;
        match envelope.tag.as_str() {
            "join" => {
                let p: JoinPayload =
                    serde_json::from_value(envelope.payload)
                        .map_err(serde::de::Error::custom)?;
                Ok(Self::Join {
                    space_id: p.space_id,
                    token: p.token,
                })
            }
            "move" => {
                let p: MovePayload =
                    serde_json::from_value(envelope.payload)
                        .map_err(serde::de::Error::custom)?;
                Ok(Self::Move { x: p.x, y: p.y })
            }
            _ => Ok(Self::Unknown),
        }
    }
}

// ---------------------------------------------------------------------------
// Server → client events
// ---------------------------------------------------------------------------

/// An event sent by the server, same envelope shape as [`ClientMessage`]:
///
/// ```json
/// { "type": "space-joined",
///   "payload": { "spawn": { "x": 3, "y": 7 }, "users": [{ "id": "u-1" }] } }
/// { "type": "user-joined", "payload": { "userId": "u-2", "x": 3, "y": 7 } }
/// { "type": "movement", "payload": { "userId": "u-2", "x": 3, "y": 8 } }
/// { "type": "movement-rejected", "payload": { "x": 3, "y": 7 } }
/// { "type": "user-left", "payload": { "userId": "u-2" } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    /// To the joining session only: its spawn position and who else is
    /// already in the space.
    SpaceJoined {
        spawn: Position,
        users: Vec<UserSummary>,
    },

    /// To every other member: a new user appeared at the given position.
    UserJoined { user_id: UserId, x: i32, y: i32 },

    /// To every other member: a user moved to the given position.
    Movement { user_id: UserId, x: i32, y: i32 },

    /// To the originating session only: the requested move was invalid;
    /// the coordinates are the session's current, unchanged position.
    MovementRejected { x: i32, y: i32 },

    /// To the remaining members: a user's connection closed.
    UserLeft { user_id: UserId },
}

// =========================================================================
// Tests
// =========================================================================
