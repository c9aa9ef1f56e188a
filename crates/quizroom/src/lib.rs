//! # Quizroom
//!
//! The student side of a live classroom quiz.
//!
//! A professor opens a room and starts a game; each student joins under a
//! display name, waits in the lobby, answers timed questions, sees the
//! leaderboard between questions, and can leave at any time or be kicked.
//! Quizroom runs that session for one student against a hosted backend
//! reached through a [`Gateway`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use quizroom::prelude::*;
//!
//! # async fn run() -> Result<(), QuizroomError> {
//! quizroom::telemetry::init()?;
//!
//! let gateway = Arc::new(InMemoryGateway::new());
//! let client = QuizroomClient::builder(gateway)
//!     .name_file("quizroom-name.json")
//!     .build();
//!
//! let (room, mut updates) = client
//!     .join(Identity::new(StudentId::new("s-1")), RoomId::new("class-1"))
//!     .await?;
//! room.submit_name("Ada").await?;
//!
//! while let Some(update) = updates.recv().await {
//!     if let RoomUpdate::Snapshot(snapshot) = update {
//!         println!("{:?}", render(&snapshot));
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crates
//!
//! - `quizroom-protocol`: questions, leaderboard rows, channel events
//! - `quizroom-gateway`: the backend contract and its implementations
//! - `quizroom-countdown`: the per-question timer
//! - `quizroom-session`: the session state machine and its screens
//! - `quizroom-room`: the Tokio actor running a session

mod client;
mod error;
pub mod telemetry;

pub use client::{QuizroomClient, QuizroomClientBuilder};
pub use error::QuizroomError;

pub use quizroom_gateway::Gateway;

/// Everything a UI needs to drive a session.
pub mod prelude {
    pub use crate::{QuizroomClient, QuizroomClientBuilder, QuizroomError};

    pub use quizroom_gateway::{
        Gateway, GatewayError, InMemoryGateway, RealtimeChannel,
        RealtimeGateway, Subscription,
    };
    pub use quizroom_protocol::{
        ChannelEvent, Identity, LeaderboardEntry, Question, QuestionId,
        QuestionKind, RoomId, StudentId,
    };
    pub use quizroom_room::{RoomError, RoomHandle, RoomUpdate};
    pub use quizroom_session::view::{
        ChoiceButton, FillInView, LeaderboardRow, LeaderboardScreen,
        QuestionBody, QuestionScreen, Status, Tone,
    };
    pub use quizroom_session::{
        render, Feedback, FileNameStore, MemoryNameStore, NameStore, Outcome,
        Phase, Screen, SessionConfig, SessionError, SessionSnapshot,
    };
}
