//! Core data types for Quizroom.
//!
//! Everything here is either fetched from the backend (questions,
//! leaderboard rows) or pushed over a room's realtime channel (events).
//! Field names follow the backend's row and payload shapes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a student account.
///
/// Newtype wrapper so a `RoomId` can never be passed where a student is
/// expected. The backend hands out opaque string ids (UUIDs), so the
/// inner value is a `String`.
///
/// `#[serde(transparent)]` keeps the JSON shape a plain string:
/// `StudentId("abc")` becomes `"abc"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub String);

impl StudentId {
    /// Wraps any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A unique identifier for a room (one live quiz for one class).
///
/// The same id names the room's realtime channel topic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Wraps any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A unique identifier for a quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub String);

impl QuestionId {
    /// Wraps any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The authenticated user a session acts for.
///
/// Produced by whatever login flow the host application uses; the
/// session only reads it. `account_name` is used as the display name
/// when nothing is cached locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub student_id: StudentId,
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    /// An identity with no profile data beyond the id.
    pub fn new(student_id: StudentId) -> Self {
        Self {
            student_id,
            account_name: None,
            email: None,
        }
    }

    /// Sets the account's profile name.
    pub fn with_account_name(mut self, name: impl Into<String>) -> Self {
        self.account_name = Some(name.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// How a question is answered.
///
/// On the wire this is the `question_type` column: `"mcq"`, `"boolean"`
/// or `"short"`. Matching is case-insensitive because rows authored by
/// hand sometimes arrive as `"MCQ"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum QuestionKind {
    /// Pick one of several distractors.
    MultipleChoice,
    /// Pick "True" or "False".
    Boolean,
    /// Type the answer one character per slot.
    ShortAnswer,
}

impl QuestionKind {
    /// The wire tag for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MultipleChoice => "mcq",
            Self::Boolean => "boolean",
            Self::ShortAnswer => "short",
        }
    }
}

impl FromStr for QuestionKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mcq" => Ok(Self::MultipleChoice),
            "boolean" => Ok(Self::Boolean),
            "short" => Ok(Self::ShortAnswer),
            other => Err(ProtocolError::InvalidMessage(format!(
                "unknown question type {other:?}"
            ))),
        }
    }
}

impl TryFrom<String> for QuestionKind {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QuestionKind> for String {
    fn from(kind: QuestionKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One question of a room's quiz. Immutable once fetched for the round.
///
/// Serde renames map the backend's column names onto readable field
/// names. Nullable columns (`points`, `time`, ...) decode to their
/// defaults; a zero `time` means "use the configured default".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "quiz_question_id")]
    pub id: QuestionId,

    #[serde(default, deserialize_with = "null_as_default")]
    pub quiz_id: String,

    #[serde(rename = "question")]
    pub text: String,

    #[serde(rename = "question_type")]
    pub kind: QuestionKind,

    /// Answer options for multiple choice (the correct one included).
    #[serde(
        rename = "distractor",
        default,
        deserialize_with = "null_as_default"
    )]
    pub choices: Vec<String>,

    /// The literal expected answer. Only its length is used client side
    /// (to size the fill-in slots); correctness is decided by the backend.
    #[serde(
        rename = "right_answer",
        default,
        deserialize_with = "null_as_default"
    )]
    pub correct_answer: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub points: u32,

    #[serde(rename = "time", default, deserialize_with = "null_as_default")]
    pub time_limit_secs: u32,
}

impl Question {
    /// Time allowed for this question, falling back to `default_secs`
    /// when the row has no usable limit.
    pub fn time_limit(&self, default_secs: u32) -> u32 {
        if self.time_limit_secs == 0 {
            default_secs
        } else {
            self.time_limit_secs
        }
    }

    /// Number of character slots a fill-in answer needs.
    pub fn answer_len(&self) -> usize {
        self.correct_answer.chars().count()
    }
}

/// Decodes `null` the same way as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

/// One row of a room's leaderboard. The backend holds the authoritative
/// copy; clients push their own row and fetch the whole table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub student_id: StudentId,
    pub name: String,
    pub score: u32,
    pub correct_count: u32,
    pub wrong_count: u32,
}

// ---------------------------------------------------------------------------
// Realtime channel
// ---------------------------------------------------------------------------

/// An event broadcast on a room's realtime channel.
///
/// Adjacently tagged to match the backend's broadcast envelope:
///
/// ```text
/// { "event": "game_started" }
/// { "event": "student_kicked", "payload": { "student_id": "…" } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum ChannelEvent {
    /// The professor started the quiz.
    GameStarted,

    /// The professor removed a student from the room.
    StudentKicked { student_id: StudentId },
}

impl ChannelEvent {
    /// Returns `true` if this event removes the given student.
    pub fn kicks(&self, student: &StudentId) -> bool {
        matches!(self, Self::StudentKicked { student_id } if student_id == student)
    }
}

/// Frames a client sends to the realtime service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChannelRequest {
    /// Start receiving broadcasts for `topic`.
    Join { topic: RoomId },
    /// Stop receiving broadcasts for `topic`.
    Leave { topic: RoomId },
}

// =========================================================================
// Tests
// =========================================================================
