//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Failed to serialize a message.
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    /// Failed to deserialize a message.
    #[error("failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),

    /// The message was structurally valid but semantically unusable.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
