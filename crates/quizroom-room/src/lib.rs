//! The session driver for Quizroom.
//!
//! A student's [`RoomSession`](quizroom_session::RoomSession) is pure
//! logic. This crate gives it a home: one Tokio task per session (actor
//! model) that owns the engine, the per-question countdown, the
//! leaderboard timer and the room's channel subscription, and runs every
//! gateway call the engine asks for.
//!
//! # Key types
//!
//! - [`spawn_room`]: subscribe to a room and start its session actor
//! - [`RoomHandle`]: send user actions to a running session
//! - [`RoomUpdate`]: what the session publishes for the UI
//! - [`RoomError`]: what a handle call can fail with

mod actor;
mod error;
mod room;

pub use error::RoomError;
pub use room::{spawn_room, RoomHandle, RoomUpdate};
