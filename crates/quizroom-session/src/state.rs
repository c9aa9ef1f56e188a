//! Session state: the records the engine mutates and the snapshot it
//! hands out.

use std::fmt;

use quizroom_protocol::{
    LeaderboardEntry, Question, QuestionKind, RoomId, StudentId,
};

use crate::BlankInput;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where a student is in the room's lifecycle.
///
/// ```text
/// AwaitingName → Joining → Lobby → InQuestion → ShowingLeaderboard ─┐
///      ↑            │                  ↑                            │
///      └──(failed)──┘                  └────────(more questions)────┤
///                                                                   ▼
///                                                                 Ended
///
/// any non-terminal phase ──(kick)──→ Kicked
/// any non-terminal phase ──(leave confirmed)──→ Left
/// ```
///
/// `Kicked` and `Left` are terminal: the engine ignores every input
/// once it reaches them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    AwaitingName,
    Joining,
    Lobby,
    InQuestion,
    ShowingLeaderboard,
    Ended,
    Kicked,
    Left,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Kicked | Self::Left)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AwaitingName => "awaiting_name",
            Self::Joining => "joining",
            Self::Lobby => "lobby",
            Self::InQuestion => "in_question",
            Self::ShowingLeaderboard => "showing_leaderboard",
            Self::Ended => "ended",
            Self::Kicked => "kicked",
            Self::Left => "left",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Who is in which room, and how far the join got.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub student_id: StudentId,
    pub room_id: RoomId,
    /// The name in use (or last tried). `None` until one is known.
    pub display_name: Option<String>,
    /// The backend acknowledged the join.
    pub joined: bool,
    /// A `game_started` broadcast was seen.
    pub game_started: bool,
    pub kicked: bool,
}

impl Session {
    pub(crate) fn new(student_id: StudentId, room_id: RoomId) -> Self {
        Self {
            student_id,
            room_id,
            display_name: None,
            joined: false,
            game_started: false,
            kicked: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-question progress
// ---------------------------------------------------------------------------

/// How a question was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The backend confirmed the answer was right.
    Correct,
    /// The backend said the answer was wrong.
    Wrong,
    /// Time ran out before an answer was given.
    NoAnswer,
    /// The answer was given but never confirmed by the backend.
    Unconfirmed,
}

impl Outcome {
    /// The verdict line shown to the student.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Correct => "Correct!",
            Self::Wrong => "Wrong!",
            Self::NoAnswer => "Time's up!",
            Self::Unconfirmed => "Answer not confirmed",
        }
    }
}

/// State of the question currently on screen. Replaced wholesale on
/// every question transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionProgress {
    /// Zero-based position in the quiz.
    pub index: usize,
    /// The question's full time limit, in countdown steps.
    pub time_limit: u32,
    pub time_left: u32,
    /// Set once, by an answer or by time-up.
    pub has_answered: bool,
    pub selected_answer: Option<String>,
    /// `None` while unanswered or awaiting confirmation.
    pub outcome: Option<Outcome>,
    /// Slot entry for short-answer questions.
    pub blank: Option<BlankInput>,
}

impl QuestionProgress {
    pub(crate) fn new(index: usize, question: &Question, time_limit: u32) -> Self {
        let blank = (question.kind == QuestionKind::ShortAnswer)
            .then(|| BlankInput::for_answer(&question.correct_answer));
        Self {
            index,
            time_limit,
            time_left: time_limit,
            has_answered: false,
            selected_answer: None,
            outcome: None,
            blank,
        }
    }

    /// `true` after the answer was sent but before the verdict arrived.
    pub fn is_awaiting_verdict(&self) -> bool {
        self.has_answered && self.outcome.is_none()
    }

    /// Share of the time limit still left, 0..=100.
    pub fn percent_left(&self) -> u8 {
        if self.time_limit == 0 {
            return 0;
        }
        let pct = u64::from(self.time_left) * 100 / u64::from(self.time_limit);
        pct.min(100) as u8
    }
}

// ---------------------------------------------------------------------------
// Score
// ---------------------------------------------------------------------------

/// The student's running totals. Only ever increases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreState {
    pub score: u32,
    pub correct_count: u32,
    pub wrong_count: u32,
}

impl ScoreState {
    pub(crate) fn record_correct(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
        self.correct_count += 1;
    }

    pub(crate) fn record_wrong(&mut self) {
        self.wrong_count += 1;
    }

    /// Questions resolved either way.
    pub fn answered(&self) -> u32 {
        self.correct_count + self.wrong_count
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Everything a UI needs to draw the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub session: Session,
    /// The question being asked (or whose verdict is showing).
    pub question: Option<Question>,
    pub question_count: usize,
    pub progress: Option<QuestionProgress>,
    pub score: ScoreState,
    /// Latest leaderboard fetched from the backend.
    pub leaderboard: Vec<LeaderboardEntry>,
}
