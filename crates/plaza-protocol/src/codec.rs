//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A codec converts between the protocol types and raw frame bytes. The
//! rest of the server doesn't care how frames are serialized — it only
//! talks to the [`Codec`] trait, so the format can be swapped (JSON today,
//! a binary codec later) without touching handler or room code.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes protocol values to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` because the codec is stored in the shared server
/// state and used concurrently from every connection task. The methods are
/// generic so one codec instance serves both [`ClientMessage`] decoding and
/// [`ServerMessage`] encoding.
///
/// [`ClientMessage`]: crate::ClientMessage
/// [`ServerMessage`]: crate::ServerMessage
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into frame bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes frame bytes into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed,
    /// truncated, or don't match the expected shape. The connection
    /// handler treats a decode failure on an inbound frame as a protocol
    /// violation and closes the connection.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] using JSON via `serde_json`.
///
/// JSON is what the browser clients speak, and it keeps frames readable in
/// DevTools and logs. Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use plaza_protocol::{Codec, JsonCodec, ServerMessage, UserId};
///
/// let codec = JsonCodec;
/// let event = ServerMessage::UserLeft { user_id: UserId::from("u-1") };
///
/// let bytes = codec.encode(&event).unwrap();
/// let decoded: ServerMessage = codec.decode(&bytes).unwrap();
/// assert_eq!(event, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
