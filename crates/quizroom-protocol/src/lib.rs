//! Shared data types for Quizroom.
//!
//! This crate defines the "language" spoken between a student's client
//! and the hosted backend:
//!
//! - **Types** ([`Question`], [`LeaderboardEntry`], [`ChannelEvent`], ids):
//!   the records fetched from the backend and the events pushed over the
//!   room's realtime channel.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those records are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong while decoding.
//!
//! # Architecture
//!
//! ```text
//! Gateway (backend calls, channel frames) → Protocol (typed records) → Session engine
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ChannelEvent, ChannelRequest, Identity, LeaderboardEntry, Question,
    QuestionId, QuestionKind, RoomId, StudentId,
};
