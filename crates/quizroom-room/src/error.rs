//! Error types for the room driver.

use quizroom_gateway::GatewayError;
use quizroom_protocol::RoomId;

/// Errors returned by [`spawn_room`](crate::spawn_room) and
/// [`RoomHandle`](crate::RoomHandle) calls.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The session actor has stopped (kicked, left, shut down) and no
    /// longer accepts commands.
    #[error("session for room {0} is not running")]
    Unavailable(RoomId),

    /// The room's channel could not be opened at startup.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The backend refused the leave, or could not be reached.
    /// The session carries on where it was.
    #[error("could not leave the room: {0}")]
    LeaveFailed(String),

    /// The student was kicked while a leave was pending.
    #[error("removed from the room")]
    Kicked,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_gateway_error() {
        let err: RoomError = GatewayError::RoomNotFound(RoomId::new("r")).into();
        assert!(matches!(err, RoomError::Gateway(_)));
        assert!(err.to_string().contains('r'));
    }

    #[test]
    fn test_unavailable_names_room() {
        let err = RoomError::Unavailable(RoomId::new("class-3"));
        assert_eq!(err.to_string(), "session for room class-3 is not running");
    }
}
