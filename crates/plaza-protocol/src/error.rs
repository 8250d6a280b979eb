//! Error types for the protocol layer.

/// Errors that can occur encoding or decoding wire messages.
///
/// `Decode` is the "malformed frame" case from the protocol's error
/// taxonomy: the inbound bytes were not a well-formed command. Decode
/// failures are caught per frame by the connection handler — one bad
/// frame terminates that connection and nothing else.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization of an outbound event failed.
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// An inbound frame could not be parsed as a command.
    ///
    /// Common causes: invalid JSON, a missing `type`/`payload` envelope,
    /// or wrong payload field types.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message parsed but violates protocol rules.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
