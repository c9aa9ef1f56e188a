//! Error types for the gateway layer.

use quizroom_protocol::{ProtocolError, QuestionId, RoomId};

/// Errors returned by [`Gateway`](crate::Gateway) operations.
///
/// A `GatewayError` means the call itself failed (network, unknown
/// record, broken channel). A backend that *answers* "no" (a refused
/// join, a wrong answer) returns `Ok(false)` instead.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request did not complete: network failure, backend error,
    /// or an injected failure in tests.
    #[error("request failed: {0}")]
    Request(String),

    /// The room does not exist on the backend.
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    /// The question does not exist on the backend.
    #[error("question {0} not found")]
    QuestionNotFound(QuestionId),

    /// Opening the realtime channel failed.
    #[error("realtime connect failed: {0}")]
    Connect(#[source] std::io::Error),

    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
