//! Log output for applications embedding Quizroom.
//!
//! Every crate in the workspace logs through `tracing` with structured
//! fields (`room_id`, `student_id`, `question`). Nothing is printed
//! until a subscriber is installed; [`init`] installs a formatting one.

use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Installs a global `fmt` subscriber filtered by `RUST_LOG`, falling
/// back to [`DEFAULT_FILTER`].
///
/// # Errors
/// Fails if a global subscriber is already set.
pub fn init() -> Result<(), crate::QuizroomError> {
    init_with(DEFAULT_FILTER)
}

/// Like [`init`], with a different fallback filter, e.g.
/// `"quizroom_room=debug,info"`.
pub fn init_with(default_filter: &str) -> Result<(), crate::QuizroomError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish()
        .try_init()?;
    Ok(())
}
