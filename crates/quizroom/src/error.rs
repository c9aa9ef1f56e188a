//! Unified error type for Quizroom.

use quizroom_gateway::GatewayError;
use quizroom_protocol::ProtocolError;
use quizroom_room::RoomError;
use quizroom_session::SessionError;
use tracing_subscriber::util::TryInitError;

/// Top-level error that wraps every crate-specific error.
///
/// Applications using the `quizroom` crate handle this one type; `?`
/// converts the sub-crate errors through the generated `From` impls.
#[derive(Debug, thiserror::Error)]
pub enum QuizroomError {
    /// A record or channel frame could not be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A backend call or the realtime channel failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The session rejected an action or a step of it failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The session actor is gone, or leaving failed.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A global tracing subscriber was already installed.
    #[error("could not install the log subscriber: {0}")]
    Telemetry(#[from] TryInitError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizroom_protocol::RoomId;

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let quizroom_err: QuizroomError = err.into();
        assert!(matches!(quizroom_err, QuizroomError::Protocol(_)));
        assert!(quizroom_err.to_string().contains("bad"));
    }

    #[test]
    fn test_from_gateway_error() {
        let err = GatewayError::RoomNotFound(RoomId::new("r-9"));
        let quizroom_err: QuizroomError = err.into();
        assert!(matches!(quizroom_err, QuizroomError::Gateway(_)));
        assert!(quizroom_err.to_string().contains("r-9"));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::JoinFailed("offline".into());
        let quizroom_err: QuizroomError = err.into();
        assert!(matches!(quizroom_err, QuizroomError::Session(_)));
        assert!(quizroom_err.to_string().contains("offline"));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::Unavailable(RoomId::new("r-1"));
        let quizroom_err: QuizroomError = err.into();
        assert!(matches!(quizroom_err, QuizroomError::Room(_)));
    }
}
