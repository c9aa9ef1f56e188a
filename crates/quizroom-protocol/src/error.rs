//! Error types for the protocol layer.
//!
//! Each crate in Quizroom defines its own error enum. When you see a
//! `ProtocolError`, the problem is in decoding a record or a channel
//! frame, not in the network or in the session state machine.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, an unknown channel event tag,
    /// or a question row missing its id or text.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The record decoded but violates a protocol rule, e.g. a
    /// question type the client cannot render.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
