//! The student side of a live quiz room.
//!
//! This crate holds everything about a student's session that doesn't
//! touch the network:
//!
//! 1. **Engine**: [`RoomSession`], a sans-IO state machine. Feed it
//!    [`Input`]s (user actions, timer ticks, channel events, gateway
//!    results) and it returns [`Output`]s (commands for a driver plus
//!    [`Feedback`] effects).
//! 2. **Screens**: [`view::render`] turns a [`SessionSnapshot`] into a
//!    [`Screen`] a UI can draw without further logic.
//! 3. **Fill-in assembly**: [`BlankInput`] collects one character per
//!    slot for short-answer questions.
//! 4. **Name cache**: [`NameStore`] remembers the display name between
//!    runs so rejoining skips the name form.
//!
//! # How it fits in the stack
//!
//! ```text
//! Room driver (above)      ← runs the engine on a task, executes commands
//!     ↕
//! Session engine (this crate)  ← decides what happens next
//!     ↕
//! Protocol / Gateway (below)   ← Question, ChannelEvent, GatewayError
//! ```

mod blank;
mod config;
mod engine;
mod error;
mod names;
mod state;
pub mod view;

pub use blank::BlankInput;
pub use config::SessionConfig;
pub use engine::{Command, Feedback, Input, Output, RoomSession};
pub use error::SessionError;
pub use names::{FileNameStore, MemoryNameStore, NameStore};
pub use state::{
    Outcome, Phase, QuestionProgress, ScoreState, Session, SessionSnapshot,
};
pub use view::{render, Screen};
