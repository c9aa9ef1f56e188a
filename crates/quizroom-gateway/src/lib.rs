//! Backend gateway abstraction for Quizroom.
//!
//! Quizroom doesn't implement a backend; authentication, persistence
//! and realtime broadcast live in a hosted service. This crate defines
//! the [`Gateway`] trait: the handful of calls a student's session makes
//! against that service, plus the [`Subscription`] handle for the
//! room's realtime channel.
//!
//! # Implementations
//!
//! - [`InMemoryGateway`]: a complete in-process backend for tests,
//!   demos and local development.
//! - [`RealtimeGateway`] (feature `realtime`, default): pairs any data
//!   gateway with a WebSocket [`RealtimeChannel`] for subscriptions.
//!
//! # Feature Flags
//!
//! - `realtime` (default): WebSocket channel via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
mod memory;
#[cfg(feature = "realtime")]
mod realtime;

pub use error::GatewayError;
pub use memory::{InMemoryGateway, Operation, Submission};
#[cfg(feature = "realtime")]
pub use realtime::{RealtimeChannel, RealtimeGateway};

use std::future::Future;

use quizroom_protocol::{
    ChannelEvent, Identity, LeaderboardEntry, Question, QuestionId, RoomId,
    StudentId,
};
use tokio::sync::mpsc;

/// The operations a student session needs from the backend.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → one gateway is shared (behind an `Arc`)
///   by every task a session spawns.
/// - Every method returns a `Send` future so calls can be spawned onto
///   the Tokio runtime while the session keeps processing timer ticks.
///
/// # Example
///
/// ```rust
/// use quizroom_gateway::{Gateway, InMemoryGateway};
/// use quizroom_protocol::{Identity, RoomId, StudentId};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let gateway = InMemoryGateway::new();
/// let room = RoomId::new("class-1");
/// gateway.create_room(room.clone(), Vec::new()).await;
///
/// let student = StudentId::new("s-1");
/// let identity = Identity::new(student.clone());
/// let joined = gateway.join_room(&room, &student, &identity, "Ada").await;
/// assert!(matches!(joined, Ok(true)));
/// # }
/// ```
pub trait Gateway: Send + Sync + 'static {
    /// Registers the student in the room under `display_name`.
    ///
    /// Returns `Ok(false)` if the backend refuses the join.
    fn join_room(
        &self,
        room_id: &RoomId,
        student_id: &StudentId,
        identity: &Identity,
        display_name: &str,
    ) -> impl Future<Output = Result<bool, GatewayError>> + Send;

    /// Fetches the room's questions in play order.
    fn get_quiz_questions(
        &self,
        room_id: &RoomId,
    ) -> impl Future<Output = Result<Vec<Question>, GatewayError>> + Send;

    /// Submits an answer. The backend decides correctness; an empty
    /// answer records a time-up.
    fn submit_answer(
        &self,
        question_id: &QuestionId,
        student_id: &StudentId,
        answer: &str,
    ) -> impl Future<Output = Result<bool, GatewayError>> + Send;

    /// Pushes the student's running totals to the shared leaderboard.
    fn update_leaderboard(
        &self,
        room_id: &RoomId,
        student_id: &StudentId,
        name: &str,
        score: u32,
        correct_count: u32,
        wrong_count: u32,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Fetches the room's leaderboard, best score first.
    fn get_exit_leaderboard(
        &self,
        room_id: &RoomId,
    ) -> impl Future<Output = Result<Vec<LeaderboardEntry>, GatewayError>> + Send;

    /// Removes the student from the room.
    ///
    /// Returns `Ok(false)` if the backend refuses.
    fn leave_room(
        &self,
        room_id: &RoomId,
        student_id: &StudentId,
    ) -> impl Future<Output = Result<bool, GatewayError>> + Send;

    /// Opens the room's realtime channel.
    fn subscribe(
        &self,
        room_id: &RoomId,
    ) -> impl Future<Output = Result<Subscription, GatewayError>> + Send;
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// A live subscription to one room's realtime channel.
///
/// Events arrive through an unbounded channel fed by the gateway.
/// Dropping the subscription (or calling [`unsubscribe`](Self::unsubscribe))
/// closes the receiving side; publishers notice via
/// `UnboundedSender::is_closed` and stop delivering.
pub struct Subscription {
    room_id: RoomId,
    events: mpsc::UnboundedReceiver<ChannelEvent>,
}

impl Subscription {
    /// Wraps the receiving half of an event channel.
    ///
    /// Gateways create the channel, keep the sender, and hand this out.
    pub fn new(
        room_id: RoomId,
        events: mpsc::UnboundedReceiver<ChannelEvent>,
    ) -> Self {
        Self { room_id, events }
    }

    /// The room this subscription listens to.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Waits for the next event.
    ///
    /// Returns `None` once the gateway side has gone away.
    pub async fn recv(&mut self) -> Option<ChannelEvent> {
        self.events.recv().await
    }

    /// Stops delivery and releases the subscription.
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.events.close();
        tracing::debug!(room_id = %self.room_id, "channel unsubscribed");
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("room_id", &self.room_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscription_recv_delivers_in_order() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut sub = Subscription::new(RoomId::new("r"), rx);

        tx.send(ChannelEvent::GameStarted).unwrap();
        tx.send(ChannelEvent::StudentKicked {
            student_id: StudentId::new("s"),
        })
        .unwrap();

        assert_eq!(sub.recv().await, Some(ChannelEvent::GameStarted));
        assert!(matches!(
            sub.recv().await,
            Some(ChannelEvent::StudentKicked { .. })
        ));
    }

    #[tokio::test]
    async fn test_subscription_unsubscribe_closes_sender() {
        let (tx, rx) = mpsc::unbounded_channel();
        let sub = Subscription::new(RoomId::new("r"), rx);

        sub.unsubscribe();

        assert!(tx.is_closed());
        assert!(tx.send(ChannelEvent::GameStarted).is_err());
    }

    #[tokio::test]
    async fn test_subscription_recv_returns_none_when_gateway_drops() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut sub = Subscription::new(RoomId::new("r"), rx);
        drop(tx);

        assert_eq!(sub.recv().await, None);
    }
}
