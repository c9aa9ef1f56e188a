//! Session timing and retry settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for one student session.
///
/// Every field has a default, so a JSON config only needs the values it
/// wants to change:
///
/// ```rust
/// use quizroom_session::SessionConfig;
///
/// let cfg: SessionConfig =
///     serde_json::from_str(r#"{ "submit_attempts": 3 }"#).unwrap();
/// assert_eq!(cfg.submit_attempts, 3);
/// assert_eq!(cfg.default_time_limit_secs, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long the leaderboard stays up between questions.
    pub leaderboard_delay: Duration,

    /// Time limit for questions whose row has none.
    pub default_time_limit_secs: u32,

    /// How many times an answer submission is tried before the session
    /// gives up and reports it unconfirmed.
    pub submit_attempts: u32,

    /// Length of one countdown step.
    pub countdown_period: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            leaderboard_delay: Duration::from_secs(5),
            default_time_limit_secs: 30,
            submit_attempts: 2,
            countdown_period: Duration::from_secs(1),
        }
    }
}

impl SessionConfig {
    /// Raises zero values to the smallest usable setting.
    pub fn validated(mut self) -> Self {
        if self.default_time_limit_secs == 0 {
            tracing::debug!("default time limit of zero, using 1s");
            self.default_time_limit_secs = 1;
        }
        if self.submit_attempts == 0 {
            tracing::debug!("submit_attempts of zero, using 1");
            self.submit_attempts = 1;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_classroom_timing() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.leaderboard_delay, Duration::from_secs(5));
        assert_eq!(cfg.default_time_limit_secs, 30);
        assert_eq!(cfg.submit_attempts, 2);
        assert_eq!(cfg.countdown_period, Duration::from_secs(1));
    }

    #[test]
    fn test_validated_raises_zero_values() {
        let cfg = SessionConfig {
            default_time_limit_secs: 0,
            submit_attempts: 0,
            ..SessionConfig::default()
        }
        .validated();

        assert_eq!(cfg.default_time_limit_secs, 1);
        assert_eq!(cfg.submit_attempts, 1);
    }

    #[test]
    fn test_deserialize_partial_json_keeps_defaults() {
        let cfg: SessionConfig = serde_json::from_str(
            r#"{ "leaderboard_delay": { "secs": 2, "nanos": 0 } }"#,
        )
        .unwrap();

        assert_eq!(cfg.leaderboard_delay, Duration::from_secs(2));
        assert_eq!(cfg.submit_attempts, 2);
    }
}
