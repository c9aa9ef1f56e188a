//! Error types for the session layer.

/// Problems a student session reports to its user.
///
/// None of these end the session; the engine stays in a state from
/// which the user can retry. A kick is not an error: it arrives as
/// `Feedback::Kicked` and the `Kicked` phase.
/// Gateway failures are carried as their message so the error stays
/// `Clone` and can be fanned out to several listeners.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The submitted display name was blank.
    #[error("display name must not be empty")]
    InvalidName,

    /// The backend refused the join or could not be reached.
    /// The session is back on the name form.
    #[error("could not join the room: {0}")]
    JoinFailed(String),

    /// The question list could not be fetched after the game started.
    /// The session stays in the lobby.
    #[error("could not load the quiz questions: {0}")]
    QuestionsUnavailable(String),

    /// An answer never reached the backend, even after retrying.
    /// It was counted neither right nor wrong.
    #[error("answer to question {} was not confirmed: {reason}", question + 1)]
    SubmissionFailed { question: usize, reason: String },

    /// Pushing or fetching the leaderboard failed.
    #[error("leaderboard unavailable: {0}")]
    Leaderboard(String),

    /// The backend refused to let the student leave. Nothing changed.
    #[error("could not leave the room: {0}")]
    LeaveFailed(String),

    /// The display name could not be saved locally.
    #[error("could not save display name: {0}")]
    Persist(String),

    /// The room's realtime channel went away. Game start and kick
    /// notices no longer arrive; rejoin to get them back.
    #[error("lost the connection to the room")]
    ChannelLost,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_failed_message_is_one_based() {
        let err = SessionError::SubmissionFailed {
            question: 0,
            reason: "timeout".into(),
        };
        assert_eq!(
            err.to_string(),
            "answer to question 1 was not confirmed: timeout"
        );
    }

    #[test]
    fn test_join_failed_includes_reason() {
        let err = SessionError::JoinFailed("room closed".into());
        assert!(err.to_string().contains("room closed"));
    }

    #[test]
    fn test_channel_lost_message() {
        assert_eq!(
            SessionError::ChannelLost.to_string(),
            "lost the connection to the room"
        );
    }
}
