//! An in-process backend implementing [`Gateway`].
//!
//! `InMemoryGateway` plays the hosted service's part: it stores rooms,
//! their question sets, participants and leaderboards, checks answers,
//! and broadcasts channel events to subscribers. The professor-side
//! calls ([`create_room`](InMemoryGateway::create_room),
//! [`start_game`](InMemoryGateway::start_game),
//! [`kick`](InMemoryGateway::kick)) let tests and the demo drive a room.
//!
//! Failure injection ([`fail`](InMemoryGateway::fail)) and artificial
//! latency ([`set_latency`](InMemoryGateway::set_latency)) make the
//! error paths and network races reproducible.
//!
//! # Concurrency note
//!
//! State lives behind a `tokio::sync::Mutex` inside an `Arc`, so clones
//! of the gateway share one backend. The lock is never held across the
//! artificial latency sleep.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use quizroom_protocol::{
    ChannelEvent, Identity, LeaderboardEntry, Question, QuestionId, RoomId,
    StudentId,
};
use tokio::sync::{mpsc, Mutex};

use crate::{Gateway, GatewayError, Subscription};

/// Names a gateway operation, for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    JoinRoom,
    GetQuizQuestions,
    SubmitAnswer,
    UpdateLeaderboard,
    GetExitLeaderboard,
    LeaveRoom,
    Subscribe,
}

/// One recorded answer submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub question_id: QuestionId,
    pub student_id: StudentId,
    pub answer: String,
    pub correct: bool,
}

/// A shared, in-process quiz backend.
///
/// Cheap to clone; every clone points at the same state.
#[derive(Clone, Default)]
pub struct InMemoryGateway {
    inner: Arc<Mutex<Backend>>,
}

#[derive(Default)]
struct Backend {
    rooms: HashMap<RoomId, RoomRecord>,
    /// Expected answer per question, across all rooms.
    answers: HashMap<QuestionId, String>,
    failing: HashSet<Operation>,
    latency: Duration,
    submissions: Vec<Submission>,
}

#[derive(Default)]
struct RoomRecord {
    questions: Vec<Question>,
    /// Display name per joined student.
    participants: HashMap<StudentId, String>,
    leaderboard: HashMap<StudentId, LeaderboardEntry>,
    subscribers: Vec<mpsc::UnboundedSender<ChannelEvent>>,
}

impl RoomRecord {
    /// Delivers `event` to every live subscriber and forgets the closed
    /// ones. Returns how many received it.
    fn publish(&mut self, event: &ChannelEvent) -> usize {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        self.subscribers.len()
    }
}

impl InMemoryGateway {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    // -- Professor side ---------------------------------------------------

    /// Creates (or replaces) a room with its quiz.
    pub async fn create_room(&self, room_id: RoomId, questions: Vec<Question>) {
        let mut backend = self.inner.lock().await;
        for q in &questions {
            backend.answers.insert(q.id.clone(), q.correct_answer.clone());
        }
        tracing::info!(%room_id, questions = questions.len(), "room created");
        backend.rooms.insert(
            room_id,
            RoomRecord {
                questions,
                ..RoomRecord::default()
            },
        );
    }

    /// Broadcasts `game_started`. Returns the number of subscribers reached.
    pub async fn start_game(&self, room_id: &RoomId) -> usize {
        self.publish(room_id, ChannelEvent::GameStarted).await
    }

    /// Removes a student and broadcasts `student_kicked` naming them.
    pub async fn kick(&self, room_id: &RoomId, student_id: &StudentId) -> usize {
        let mut backend = self.inner.lock().await;
        let Some(room) = backend.rooms.get_mut(room_id) else {
            return 0;
        };
        room.participants.remove(student_id);
        tracing::info!(%room_id, %student_id, "student kicked");
        room.publish(&ChannelEvent::StudentKicked {
            student_id: student_id.clone(),
        })
    }

    /// Broadcasts an arbitrary event on the room's channel.
    pub async fn publish(&self, room_id: &RoomId, event: ChannelEvent) -> usize {
        let mut backend = self.inner.lock().await;
        match backend.rooms.get_mut(room_id) {
            Some(room) => room.publish(&event),
            None => 0,
        }
    }

    /// Drops every subscription sender for the room, as a realtime
    /// service does when it loses the connection. Subscribers see the
    /// end of their event stream. Returns how many were cut off.
    pub async fn close_channel(&self, room_id: &RoomId) -> usize {
        let mut backend = self.inner.lock().await;
        let Some(room) = backend.rooms.get_mut(room_id) else {
            return 0;
        };
        let closed = room.subscribers.drain(..).filter(|tx| !tx.is_closed()).count();
        tracing::info!(%room_id, closed, "room channel closed");
        closed
    }

    // -- Test controls ----------------------------------------------------

    /// Makes every subsequent call to `op` fail with `GatewayError::Request`.
    pub async fn fail(&self, op: Operation) {
        self.inner.lock().await.failing.insert(op);
    }

    /// Undoes [`fail`](Self::fail).
    pub async fn recover(&self, op: Operation) {
        self.inner.lock().await.failing.remove(&op);
    }

    /// Delays every call by `latency` before it touches the backend.
    pub async fn set_latency(&self, latency: Duration) {
        self.inner.lock().await.latency = latency;
    }

    // -- Inspection -------------------------------------------------------

    /// Every submission recorded so far, oldest first.
    pub async fn submissions(&self) -> Vec<Submission> {
        self.inner.lock().await.submissions.clone()
    }

    /// Students currently in the room.
    pub async fn participants(&self, room_id: &RoomId) -> Vec<StudentId> {
        let backend = self.inner.lock().await;
        backend
            .rooms
            .get(room_id)
            .map(|r| r.participants.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of open subscriptions on the room's channel.
    pub async fn subscriber_count(&self, room_id: &RoomId) -> usize {
        let mut backend = self.inner.lock().await;
        match backend.rooms.get_mut(room_id) {
            Some(room) => {
                room.subscribers.retain(|tx| !tx.is_closed());
                room.subscribers.len()
            }
            None => 0,
        }
    }

    /// Applies latency and failure injection for `op`.
    async fn enter(&self, op: Operation) -> Result<(), GatewayError> {
        let (latency, failing) = {
            let backend = self.inner.lock().await;
            (backend.latency, backend.failing.contains(&op))
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if failing {
            tracing::debug!(?op, "injected gateway failure");
            return Err(GatewayError::Request(format!("{op:?} unavailable")));
        }
        Ok(())
    }
}

/// Backend answer check: trimmed, ASCII case-insensitive, empty is wrong.
fn is_correct(expected: &str, answer: &str) -> bool {
    let answer = answer.trim();
    !answer.is_empty() && answer.eq_ignore_ascii_case(expected.trim())
}

/// Best score first; ties broken by correct answers, then name.
fn ranked(entries: impl Iterator<Item = LeaderboardEntry>) -> Vec<LeaderboardEntry> {
    let mut rows: Vec<_> = entries.collect();
    rows.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(b.correct_count.cmp(&a.correct_count))
            .then_with(|| a.name.cmp(&b.name))
    });
    rows
}

impl Gateway for InMemoryGateway {
    async fn join_room(
        &self,
        room_id: &RoomId,
        student_id: &StudentId,
        _identity: &Identity,
        display_name: &str,
    ) -> Result<bool, GatewayError> {
        self.enter(Operation::JoinRoom).await?;
        let name = display_name.trim();
        if name.is_empty() {
            return Ok(false);
        }

        let mut backend = self.inner.lock().await;
        let room = backend
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| GatewayError::RoomNotFound(room_id.clone()))?;
        room.participants.insert(student_id.clone(), name.to_string());
        room.leaderboard
            .entry(student_id.clone())
            .or_insert_with(|| LeaderboardEntry {
                student_id: student_id.clone(),
                name: name.to_string(),
                score: 0,
                correct_count: 0,
                wrong_count: 0,
            });
        tracing::info!(%room_id, %student_id, name, "student joined");
        Ok(true)
    }

    async fn get_quiz_questions(
        &self,
        room_id: &RoomId,
    ) -> Result<Vec<Question>, GatewayError> {
        self.enter(Operation::GetQuizQuestions).await?;
        let backend = self.inner.lock().await;
        backend
            .rooms
            .get(room_id)
            .map(|r| r.questions.clone())
            .ok_or_else(|| GatewayError::RoomNotFound(room_id.clone()))
    }

    async fn submit_answer(
        &self,
        question_id: &QuestionId,
        student_id: &StudentId,
        answer: &str,
    ) -> Result<bool, GatewayError> {
        self.enter(Operation::SubmitAnswer).await?;
        let mut backend = self.inner.lock().await;
        let expected = backend
            .answers
            .get(question_id)
            .ok_or_else(|| GatewayError::QuestionNotFound(question_id.clone()))?;
        let correct = is_correct(expected, answer);
        backend.submissions.push(Submission {
            question_id: question_id.clone(),
            student_id: student_id.clone(),
            answer: answer.to_string(),
            correct,
        });
        tracing::debug!(%question_id, %student_id, correct, "answer recorded");
        Ok(correct)
    }

    async fn update_leaderboard(
        &self,
        room_id: &RoomId,
        student_id: &StudentId,
        name: &str,
        score: u32,
        correct_count: u32,
        wrong_count: u32,
    ) -> Result<(), GatewayError> {
        self.enter(Operation::UpdateLeaderboard).await?;
        let mut backend = self.inner.lock().await;
        let room = backend
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| GatewayError::RoomNotFound(room_id.clone()))?;
        room.leaderboard.insert(
            student_id.clone(),
            LeaderboardEntry {
                student_id: student_id.clone(),
                name: name.to_string(),
                score,
                correct_count,
                wrong_count,
            },
        );
        Ok(())
    }

    async fn get_exit_leaderboard(
        &self,
        room_id: &RoomId,
    ) -> Result<Vec<LeaderboardEntry>, GatewayError> {
        self.enter(Operation::GetExitLeaderboard).await?;
        let backend = self.inner.lock().await;
        let room = backend
            .rooms
            .get(room_id)
            .ok_or_else(|| GatewayError::RoomNotFound(room_id.clone()))?;
        Ok(ranked(room.leaderboard.values().cloned()))
    }

    async fn leave_room(
        &self,
        room_id: &RoomId,
        student_id: &StudentId,
    ) -> Result<bool, GatewayError> {
        self.enter(Operation::LeaveRoom).await?;
        let mut backend = self.inner.lock().await;
        let room = backend
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| GatewayError::RoomNotFound(room_id.clone()))?;
        let was_present = room.participants.remove(student_id).is_some();
        tracing::info!(%room_id, %student_id, was_present, "student left");
        Ok(was_present)
    }

    async fn subscribe(
        &self,
        room_id: &RoomId,
    ) -> Result<Subscription, GatewayError> {
        self.enter(Operation::Subscribe).await?;
        let mut backend = self.inner.lock().await;
        let room = backend
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| GatewayError::RoomNotFound(room_id.clone()))?;
        let (tx, rx) = mpsc::unbounded_channel();
        room.subscribers.push(tx);
        tracing::debug!(%room_id, "channel subscribed");
        Ok(Subscription::new(room_id.clone(), rx))
    }
}
