//! The room session engine.
//!
//! [`RoomSession`] is a plain state machine: it never awaits, spawns or
//! sleeps. Whoever drives it (see the `quizroom-room` crate) turns
//! [`Command`]s into gateway calls and timers, and feeds their results
//! back in as [`Input`]s. That keeps every transition testable with
//! ordinary `#[test]` functions.
//!
//! # Ordering guarantees
//!
//! - One countdown at a time: entering a question always emits
//!   [`Command::StartCountdown`], which replaces any running one.
//! - One answer per question: `has_answered` gates both user answers
//!   and time-up, so whichever comes first wins.
//! - Ticks, answer verdicts and advance timers carry the question index
//!   they belong to; anything addressed to another question is dropped.

use std::time::Duration;

use quizroom_gateway::GatewayError;
use quizroom_protocol::{
    ChannelEvent, Identity, LeaderboardEntry, Question, QuestionId, RoomId,
};
use tracing::{debug, info, warn};

use crate::{
    Outcome, Phase, QuestionProgress, ScoreState, Session, SessionConfig,
    SessionError, SessionSnapshot,
};

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// Everything that can happen to a session.
#[derive(Debug)]
pub enum Input {
    /// The student typed a display name into the name form.
    SubmitName(String),
    /// The backend answered a [`Command::Join`].
    JoinResult(Result<bool, GatewayError>),
    /// A broadcast arrived on the room channel.
    Channel(ChannelEvent),
    /// The backend answered a [`Command::FetchQuestions`].
    QuestionsLoaded(Result<Vec<Question>, GatewayError>),
    /// One countdown step elapsed for question `question`.
    Tick { question: usize },
    /// The student picked or typed an answer.
    Answer(String),
    /// The student typed into one fill-in slot.
    FillSlot { slot: usize, text: String },
    /// The backend's verdict on a [`Command::SubmitAnswer`].
    AnswerResult {
        question: usize,
        result: Result<bool, GatewayError>,
    },
    /// A [`Command::UpdateLeaderboard`] finished.
    LeaderboardPushed(Result<(), GatewayError>),
    /// The leaderboard display delay for `question` elapsed.
    AdvanceDue { question: usize },
    /// The backend answered a [`Command::FetchLeaderboard`].
    LeaderboardLoaded(Result<Vec<LeaderboardEntry>, GatewayError>),
    /// The student asked to leave the room.
    Leave,
    /// The backend answered a [`Command::Leave`].
    LeaveResult(Result<bool, GatewayError>),
}

impl Input {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SubmitName(_) => "submit_name",
            Self::JoinResult(_) => "join_result",
            Self::Channel(_) => "channel",
            Self::QuestionsLoaded(_) => "questions_loaded",
            Self::Tick { .. } => "tick",
            Self::Answer(_) => "answer",
            Self::FillSlot { .. } => "fill_slot",
            Self::AnswerResult { .. } => "answer_result",
            Self::LeaderboardPushed(_) => "leaderboard_pushed",
            Self::AdvanceDue { .. } => "advance_due",
            Self::LeaderboardLoaded(_) => "leaderboard_loaded",
            Self::Leave => "leave",
            Self::LeaveResult(_) => "leave_result",
        }
    }
}

/// Work the engine asks its driver to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Call `join_room` with this name.
    Join { display_name: String },
    /// Save the name locally for the next visit.
    PersistName(String),
    /// Call `get_quiz_questions`.
    FetchQuestions,
    /// Start (or restart) the countdown: `ticks` steps tagged `question`.
    StartCountdown { question: usize, ticks: u32 },
    StopCountdown,
    /// Call `submit_answer`. An empty answer records a time-up.
    SubmitAnswer {
        question: usize,
        question_id: QuestionId,
        answer: String,
    },
    /// Call `update_leaderboard` with these totals.
    UpdateLeaderboard { name: String, score: ScoreState },
    /// Deliver [`Input::AdvanceDue`] for `question` after `delay`.
    ScheduleAdvance { question: usize, delay: Duration },
    CancelAdvance,
    /// Call `get_exit_leaderboard`.
    FetchLeaderboard,
    /// Call `leave_room`.
    Leave,
    /// Drop the room channel subscription.
    Unsubscribe,
}

/// Sound/visual cues that accompany a transition. The engine only
/// names them; playing them is up to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    LobbyMusic { playing: bool },
    Correct { points: u32 },
    Wrong,
    NoAnswer,
    Unconfirmed,
    Kicked,
}

/// One effect of handling an input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Command(Command),
    Feedback(Feedback),
    /// Something to tell the student about. The session keeps going.
    Error(SessionError),
    /// No display name is known; the UI should show the name form.
    NameRequired,
}

// ---------------------------------------------------------------------------
// RoomSession
// ---------------------------------------------------------------------------

/// One student's session in one room.
///
/// ```rust
/// use quizroom_protocol::{Identity, RoomId, StudentId};
/// use quizroom_session::{Command, Output, Phase, RoomSession, SessionConfig};
///
/// let identity = Identity::new(StudentId::new("s-1"));
/// let mut session = RoomSession::new(
///     identity,
///     RoomId::new("class-1"),
///     SessionConfig::default(),
///     Some("Ada".into()),
/// );
///
/// let out = session.begin();
/// assert_eq!(session.phase(), Phase::Joining);
/// assert_eq!(
///     out,
///     vec![Output::Command(Command::Join { display_name: "Ada".into() })]
/// );
/// ```
#[derive(Debug)]
pub struct RoomSession {
    identity: Identity,
    config: SessionConfig,
    phase: Phase,
    session: Session,
    questions: Vec<Question>,
    progress: Option<QuestionProgress>,
    score: ScoreState,
    leaderboard: Vec<LeaderboardEntry>,
    cached_name: Option<String>,
    /// Save the name once the join succeeds (it came from the form).
    persist_on_join: bool,
    fetching_questions: bool,
    leaving: bool,
    /// Leave was asked for while a join was in flight; settled by the
    /// join result.
    leave_after_join: bool,
}

impl RoomSession {
    /// Creates a session waiting to be started with [`begin`](Self::begin).
    ///
    /// `cached_name` is the display name remembered from a previous
    /// visit, if any.
    pub fn new(
        identity: Identity,
        room_id: RoomId,
        config: SessionConfig,
        cached_name: Option<String>,
    ) -> Self {
        let session = Session::new(identity.student_id.clone(), room_id);
        Self {
            identity,
            config: config.validated(),
            phase: Phase::AwaitingName,
            session,
            questions: Vec::new(),
            progress: None,
            score: ScoreState::default(),
            leaderboard: Vec::new(),
            cached_name: cached_name.and_then(non_blank),
            persist_on_join: false,
            fetching_questions: false,
            leaving: false,
            leave_after_join: false,
        }
    }

    /// Joins straight away if a display name is known (cached first,
    /// then the account's own name); otherwise asks for one.
    pub fn begin(&mut self) -> Vec<Output> {
        let mut out = Vec::new();
        if self.phase != Phase::AwaitingName {
            debug!(phase = %self.phase, "begin called twice, ignoring");
            return out;
        }

        let name = self
            .cached_name
            .clone()
            .or_else(|| self.identity.account_name.clone().and_then(non_blank));
        match name {
            Some(name) => self.start_join(name, &mut out),
            None => {
                debug!(room_id = %self.session.room_id, "no display name known");
                out.push(Output::NameRequired);
            }
        }
        out
    }

    /// Applies one input and returns what should happen because of it.
    pub fn handle(&mut self, input: Input) -> Vec<Output> {
        let mut out = Vec::new();
        if self.phase.is_terminal() {
            debug!(input = input.kind(), phase = %self.phase, "session over, ignoring input");
            return out;
        }

        match input {
            Input::SubmitName(name) => self.on_submit_name(name, &mut out),
            Input::JoinResult(result) => self.on_join_result(result, &mut out),
            Input::Channel(event) => self.on_channel(event, &mut out),
            Input::QuestionsLoaded(result) => self.on_questions(result, &mut out),
            Input::Tick { question } => self.on_tick(question, &mut out),
            Input::Answer(answer) => self.on_answer(answer, &mut out),
            Input::FillSlot { slot, text } => self.on_fill_slot(slot, &text, &mut out),
            Input::AnswerResult { question, result } => {
                self.on_answer_result(question, result, &mut out)
            }
            Input::LeaderboardPushed(result) => {
                self.on_leaderboard_pushed(result, &mut out)
            }
            Input::AdvanceDue { question } => self.on_advance(question, &mut out),
            Input::LeaderboardLoaded(result) => {
                self.on_leaderboard_loaded(result, &mut out)
            }
            Input::Leave => self.on_leave(&mut out),
            Input::LeaveResult(result) => self.on_leave_result(result, &mut out),
        }
        out
    }

    // -- Accessors --------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn score(&self) -> ScoreState {
        self.score
    }

    pub fn progress(&self) -> Option<&QuestionProgress> {
        self.progress.as_ref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// The question on screen (or whose verdict is showing).
    pub fn current_question(&self) -> Option<&Question> {
        self.progress
            .as_ref()
            .and_then(|p| self.questions.get(p.index))
    }

    pub fn leaderboard(&self) -> &[LeaderboardEntry] {
        &self.leaderboard
    }

    /// `true` while a leave request is waiting on the backend.
    pub fn is_leaving(&self) -> bool {
        self.leaving
    }

    /// A copy of everything the UI needs.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            session: self.session.clone(),
            question: self.current_question().cloned(),
            question_count: self.questions.len(),
            progress: self.progress.clone(),
            score: self.score,
            leaderboard: self.leaderboard.clone(),
        }
    }

    // -- Joining ----------------------------------------------------------

    fn on_submit_name(&mut self, name: String, out: &mut Vec<Output>) {
        if self.phase != Phase::AwaitingName {
            debug!(phase = %self.phase, "name submitted outside the name form, ignoring");
            return;
        }
        match non_blank(name) {
            Some(name) => {
                self.persist_on_join = true;
                self.start_join(name, out);
            }
            None => out.push(Output::Error(SessionError::InvalidName)),
        }
    }

    fn start_join(&mut self, name: String, out: &mut Vec<Output>) {
        self.session.display_name = Some(name.clone());
        self.set_phase(Phase::Joining);
        out.push(Output::Command(Command::Join { display_name: name }));
    }

    fn on_join_result(
        &mut self,
        result: Result<bool, GatewayError>,
        out: &mut Vec<Output>,
    ) {
        if self.phase != Phase::Joining {
            debug!(phase = %self.phase, "join result outside joining, ignoring");
            return;
        }

        if self.leave_after_join {
            self.leave_after_join = false;
            if matches!(result, Ok(true)) {
                info!(room_id = %self.session.room_id, "joined while leaving, leaving now");
                self.joined(out);
                out.push(Output::Command(Command::Leave));
            } else {
                info!(room_id = %self.session.room_id, "join did not go through, nothing to leave");
                self.finish(Phase::Left, out);
            }
            return;
        }

        let reason = match result {
            Ok(true) => {
                self.joined(out);
                out.push(Output::Feedback(Feedback::LobbyMusic { playing: true }));
                return;
            }
            Ok(false) => "the room refused the join".to_string(),
            Err(e) => e.to_string(),
        };

        warn!(
            room_id = %self.session.room_id,
            student_id = %self.session.student_id,
            %reason,
            "join failed"
        );
        self.set_phase(Phase::AwaitingName);
        out.push(Output::Error(SessionError::JoinFailed(reason)));
    }

    fn joined(&mut self, out: &mut Vec<Output>) {
        self.session.joined = true;
        self.set_phase(Phase::Lobby);
        if self.persist_on_join {
            self.persist_on_join = false;
            if let Some(name) = self.session.display_name.clone() {
                self.cached_name = Some(name.clone());
                out.push(Output::Command(Command::PersistName(name)));
            }
        }
    }

    // -- Channel ----------------------------------------------------------

    fn on_channel(&mut self, event: ChannelEvent, out: &mut Vec<Output>) {
        match event {
            ChannelEvent::StudentKicked { ref student_id }
                if event.kicks(&self.session.student_id) =>
            {
                info!(
                    room_id = %self.session.room_id,
                    %student_id,
                    phase = %self.phase,
                    "kicked from room"
                );
                self.session.kicked = true;
                self.finish(Phase::Kicked, out);
                out.push(Output::Feedback(Feedback::Kicked));
            }
            ChannelEvent::StudentKicked { student_id } => {
                debug!(%student_id, "another student was kicked");
            }
            ChannelEvent::GameStarted => self.on_game_started(out),
        }
    }

    fn on_game_started(&mut self, out: &mut Vec<Output>) {
        if self.phase != Phase::Lobby || self.session.game_started {
            debug!(phase = %self.phase, "game_started outside the lobby, ignoring");
            return;
        }
        info!(room_id = %self.session.room_id, "game started");
        self.session.game_started = true;
        self.fetching_questions = true;
        out.push(Output::Feedback(Feedback::LobbyMusic { playing: false }));
        out.push(Output::Command(Command::FetchQuestions));
    }

    fn on_questions(
        &mut self,
        result: Result<Vec<Question>, GatewayError>,
        out: &mut Vec<Output>,
    ) {
        if self.phase != Phase::Lobby || !self.fetching_questions {
            debug!(phase = %self.phase, "unexpected question list, ignoring");
            return;
        }
        self.fetching_questions = false;

        match result {
            Ok(questions) if questions.is_empty() => {
                info!(room_id = %self.session.room_id, "quiz has no questions");
                self.set_phase(Phase::Ended);
            }
            Ok(questions) => {
                info!(
                    room_id = %self.session.room_id,
                    count = questions.len(),
                    "questions loaded"
                );
                self.questions = questions;
                self.enter_question(0, out);
            }
            Err(e) => {
                warn!(room_id = %self.session.room_id, error = %e, "could not load questions");
                // Another game_started broadcast may retry the fetch.
                self.session.game_started = false;
                out.push(Output::Error(SessionError::QuestionsUnavailable(
                    e.to_string(),
                )));
            }
        }
    }

    // -- Questions --------------------------------------------------------

    fn enter_question(&mut self, index: usize, out: &mut Vec<Output>) {
        let Some(question) = self.questions.get(index) else {
            self.progress = None;
            self.set_phase(Phase::Ended);
            return;
        };
        let limit = question.time_limit(self.config.default_time_limit_secs);
        self.progress = Some(QuestionProgress::new(index, question, limit));
        self.set_phase(Phase::InQuestion);
        debug!(question = index, time_limit = limit, "question shown");
        out.push(Output::Command(Command::StartCountdown {
            question: index,
            ticks: limit,
        }));
    }

    fn on_tick(&mut self, question: usize, out: &mut Vec<Output>) {
        if self.phase != Phase::InQuestion {
            return;
        }
        let Some(progress) = self.progress.as_mut() else {
            return;
        };
        if progress.index != question {
            debug!(tick_for = question, current = progress.index, "stale tick, ignoring");
            return;
        }
        if progress.has_answered || progress.time_left == 0 {
            return;
        }

        progress.time_left -= 1;
        if progress.time_left == 0 {
            self.time_up(out);
        }
    }

    fn on_answer(&mut self, answer: String, out: &mut Vec<Output>) {
        if answer.trim().is_empty() {
            debug!("blank answer, ignoring");
            return;
        }
        self.accept_answer(answer, out);
    }

    fn on_fill_slot(&mut self, slot: usize, text: &str, out: &mut Vec<Output>) {
        if self.phase != Phase::InQuestion {
            return;
        }
        let completed = match self.progress.as_mut() {
            Some(p) if !p.has_answered => match p.blank.as_mut() {
                Some(blank) => blank.set(slot, text),
                None => {
                    debug!("fill-in input on a question without slots, ignoring");
                    None
                }
            },
            _ => None,
        };
        if let Some(answer) = completed {
            self.accept_answer(answer, out);
        }
    }

    /// The single gate every answer goes through.
    fn accept_answer(&mut self, answer: String, out: &mut Vec<Output>) {
        if self.phase != Phase::InQuestion {
            debug!(phase = %self.phase, "answer outside a question, ignoring");
            return;
        }
        let Some(progress) = self.progress.as_mut() else {
            return;
        };
        if progress.has_answered {
            debug!(question = progress.index, "already answered, ignoring");
            return;
        }
        let Some(question) = self.questions.get(progress.index) else {
            return;
        };

        progress.has_answered = true;
        progress.selected_answer = Some(answer.clone());
        if let Some(blank) = progress.blank.as_mut() {
            blank.lock();
        }
        debug!(question = progress.index, time_left = progress.time_left, "answer given");

        out.push(Output::Command(Command::StopCountdown));
        out.push(Output::Command(Command::SubmitAnswer {
            question: progress.index,
            question_id: question.id.clone(),
            answer,
        }));
    }

    fn on_answer_result(
        &mut self,
        question: usize,
        result: Result<bool, GatewayError>,
        out: &mut Vec<Output>,
    ) {
        let awaiting = self.phase == Phase::InQuestion
            && self
                .progress
                .as_ref()
                .is_some_and(|p| p.index == question && p.is_awaiting_verdict());
        if !awaiting {
            // Time-up bookkeeping submissions land here too.
            if let Err(e) = result {
                warn!(question, error = %e, "unanswered submission failed");
            }
            return;
        }

        let points = self.current_question().map_or(0, |q| q.points);
        let (outcome, feedback) = match result {
            Ok(true) => {
                self.score.record_correct(points);
                (Outcome::Correct, Feedback::Correct { points })
            }
            Ok(false) => {
                self.score.record_wrong();
                (Outcome::Wrong, Feedback::Wrong)
            }
            Err(e) => {
                warn!(question, error = %e, "answer not confirmed");
                out.push(Output::Error(SessionError::SubmissionFailed {
                    question,
                    reason: e.to_string(),
                }));
                (Outcome::Unconfirmed, Feedback::Unconfirmed)
            }
        };

        if let Some(progress) = self.progress.as_mut() {
            progress.outcome = Some(outcome);
        }
        info!(question, ?outcome, score = self.score.score, "answer resolved");
        out.push(Output::Feedback(feedback));
        self.show_leaderboard(out);
    }

    fn time_up(&mut self, out: &mut Vec<Output>) {
        let Some(progress) = self.progress.as_mut() else {
            return;
        };
        let Some(question) = self.questions.get(progress.index) else {
            return;
        };

        progress.has_answered = true;
        progress.outcome = Some(Outcome::NoAnswer);
        if let Some(blank) = progress.blank.as_mut() {
            blank.lock();
        }
        self.score.record_wrong();
        info!(question = progress.index, "time is up");

        out.push(Output::Command(Command::StopCountdown));
        out.push(Output::Command(Command::SubmitAnswer {
            question: progress.index,
            question_id: question.id.clone(),
            answer: String::new(),
        }));
        out.push(Output::Feedback(Feedback::NoAnswer));
        self.show_leaderboard(out);
    }

    fn show_leaderboard(&mut self, out: &mut Vec<Output>) {
        let Some(index) = self.progress.as_ref().map(|p| p.index) else {
            return;
        };
        out.push(Output::Command(Command::UpdateLeaderboard {
            name: self.session.display_name.clone().unwrap_or_default(),
            score: self.score,
        }));
        self.set_phase(Phase::ShowingLeaderboard);
        out.push(Output::Command(Command::ScheduleAdvance {
            question: index,
            delay: self.config.leaderboard_delay,
        }));
    }

    fn on_advance(&mut self, question: usize, out: &mut Vec<Output>) {
        let current = self.progress.as_ref().map(|p| p.index);
        if self.phase != Phase::ShowingLeaderboard || current != Some(question) {
            debug!(question, ?current, phase = %self.phase, "stale advance, ignoring");
            return;
        }

        out.push(Output::Command(Command::FetchLeaderboard));
        let next = question + 1;
        if next < self.questions.len() {
            self.enter_question(next, out);
        } else {
            info!(
                room_id = %self.session.room_id,
                score = self.score.score,
                correct = self.score.correct_count,
                wrong = self.score.wrong_count,
                "quiz finished"
            );
            self.progress = None;
            self.set_phase(Phase::Ended);
        }
    }

    // -- Leaderboard ------------------------------------------------------

    fn on_leaderboard_pushed(
        &mut self,
        result: Result<(), GatewayError>,
        out: &mut Vec<Output>,
    ) {
        if let Err(e) = result {
            warn!(error = %e, "leaderboard update failed");
            out.push(Output::Error(SessionError::Leaderboard(e.to_string())));
        }
        out.push(Output::Command(Command::FetchLeaderboard));
    }

    fn on_leaderboard_loaded(
        &mut self,
        result: Result<Vec<LeaderboardEntry>, GatewayError>,
        out: &mut Vec<Output>,
    ) {
        match result {
            Ok(entries) => self.leaderboard = entries,
            Err(e) => {
                warn!(error = %e, "leaderboard fetch failed");
                out.push(Output::Error(SessionError::Leaderboard(e.to_string())));
            }
        }
    }

    // -- Leaving ----------------------------------------------------------

    fn on_leave(&mut self, out: &mut Vec<Output>) {
        if self.leaving {
            debug!("leave already in progress");
            return;
        }
        match self.phase {
            Phase::AwaitingName => {
                // No join was sent; nothing to undo on the backend.
                self.finish(Phase::Left, out);
                return;
            }
            Phase::Joining => {
                debug!("leave requested mid-join, waiting for the join result");
                self.leaving = true;
                self.leave_after_join = true;
                return;
            }
            _ => {}
        }
        self.leaving = true;
        out.push(Output::Command(Command::Leave));
    }

    fn on_leave_result(
        &mut self,
        result: Result<bool, GatewayError>,
        out: &mut Vec<Output>,
    ) {
        if !self.leaving || self.leave_after_join {
            debug!("unexpected leave result, ignoring");
            return;
        }
        self.leaving = false;

        let reason = match result {
            Ok(true) => {
                info!(room_id = %self.session.room_id, "left room");
                self.finish(Phase::Left, out);
                return;
            }
            Ok(false) => "the room refused the request".to_string(),
            Err(e) => e.to_string(),
        };
        warn!(room_id = %self.session.room_id, %reason, "leave failed");
        out.push(Output::Error(SessionError::LeaveFailed(reason)));
    }

    /// Moves to a terminal phase and releases timers and the channel.
    fn finish(&mut self, phase: Phase, out: &mut Vec<Output>) {
        if self.phase == Phase::Lobby && !self.session.game_started {
            out.push(Output::Feedback(Feedback::LobbyMusic { playing: false }));
        }
        self.leaving = false;
        self.leave_after_join = false;
        self.set_phase(phase);
        out.push(Output::Command(Command::StopCountdown));
        out.push(Output::Command(Command::CancelAdvance));
        out.push(Output::Command(Command::Unsubscribe));
    }

    fn set_phase(&mut self, next: Phase) {
        if self.phase != next {
            info!(
                room_id = %self.session.room_id,
                student_id = %self.session.student_id,
                from = %self.phase,
                to = %next,
                "phase changed"
            );
            self.phase = next;
        }
    }
}

fn non_blank(name: String) -> Option<String> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizroom_protocol::{QuestionKind, StudentId};

    fn session_with(name: Option<&str>) -> RoomSession {
        RoomSession::new(
            Identity::new(StudentId::new("me")),
            RoomId::new("room"),
            SessionConfig::default(),
            name.map(str::to_string),
        )
    }

    #[test]
    fn test_begin_without_any_name_requires_one() {
        let mut s = session_with(None);
        assert_eq!(s.begin(), vec![Output::NameRequired]);
        assert_eq!(s.phase(), Phase::AwaitingName);
    }

    #[test]
    fn test_begin_falls_back_to_account_name() {
        let identity = Identity::new(StudentId::new("me")).with_account_name(" Grace ");
        let mut s = RoomSession::new(identity, RoomId::new("room"), SessionConfig::default(), None);

        let out = s.begin();

        assert_eq!(
            out,
            vec![Output::Command(Command::Join { display_name: "Grace".into() })]
        );
    }

    #[test]
    fn test_blank_cached_name_is_treated_as_missing() {
        let mut s = session_with(Some("   "));
        assert_eq!(s.begin(), vec![Output::NameRequired]);
    }

    #[test]
    fn test_submit_name_blank_returns_invalid_name() {
        let mut s = session_with(None);
        s.begin();
        let out = s.handle(Input::SubmitName("  ".into()));
        assert_eq!(out, vec![Output::Error(SessionError::InvalidName)]);
        assert_eq!(s.phase(), Phase::AwaitingName);
    }

    #[test]
    fn test_account_name_join_is_not_persisted() {
        let identity = Identity::new(StudentId::new("me")).with_account_name("Grace");
        let mut s = RoomSession::new(identity, RoomId::new("room"), SessionConfig::default(), None);
        s.begin();

        let out = s.handle(Input::JoinResult(Ok(true)));

        assert!(!out
            .iter()
            .any(|o| matches!(o, Output::Command(Command::PersistName(_)))));
    }

    #[test]
    fn test_time_up_and_answer_cannot_both_resolve() {
        let mut s = session_with(Some("Ada"));
        s.begin();
        s.handle(Input::JoinResult(Ok(true)));
        s.handle(Input::Channel(ChannelEvent::GameStarted));
        s.handle(Input::QuestionsLoaded(Ok(vec![Question {
            id: QuestionId::new("q"),
            quiz_id: String::new(),
            text: "?".into(),
            kind: QuestionKind::Boolean,
            choices: Vec::new(),
            correct_answer: String::new(),
            points: 5,
            time_limit_secs: 1,
        }])));

        s.handle(Input::Tick { question: 0 });
        let late = s.handle(Input::Answer("True".into()));

        assert!(late.is_empty());
        assert_eq!(s.score().wrong_count, 1);
        assert_eq!(s.phase(), Phase::ShowingLeaderboard);
    }
}
