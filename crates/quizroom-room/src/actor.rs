//! The session actor: one Tokio task per student session.
//!
//! The actor owns the engine and everything with a clock or a socket
//! attached to it. Its loop waits on five sources at once:
//!
//! ```text
//!   handle commands ──┐
//!   channel events  ──┤
//!   countdown ticks ──┼──→ RoomSession::handle ──→ outputs ──→ commands run here,
//!   gateway results ──┤                                       feedback/errors to UI
//!   advance timer   ──┘
//! ```
//!
//! Gateway calls are spawned so the countdown keeps ticking while they
//! are in flight; each spawned call reports back on `results` as an
//! engine [`Input`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use quizroom_countdown::Countdown;
use quizroom_gateway::{Gateway, GatewayError, Subscription};
use quizroom_protocol::{ChannelEvent, QuestionId, RoomId, StudentId};
use quizroom_session::{
    Command, Input, NameStore, Output, Phase, RoomSession, SessionError,
    SessionSnapshot,
};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::room::{RoomCommand, RoomUpdate};
use crate::RoomError;

/// Pause between answer submission attempts.
const SUBMIT_RETRY_DELAY: Duration = Duration::from_millis(250);

type LeaveReply = oneshot::Sender<Result<(), RoomError>>;

pub(crate) struct RoomActor<G: Gateway> {
    room_id: RoomId,
    student_id: StudentId,
    gateway: Arc<G>,
    engine: RoomSession,
    name_store: Arc<dyn NameStore>,
    /// `None` after unsubscribing or once the channel closed.
    subscription: Option<Subscription>,
    countdown: Countdown,
    /// Question index and deadline of the pending leaderboard advance.
    advance: Option<(usize, Instant)>,
    commands: mpsc::Receiver<RoomCommand>,
    results_tx: mpsc::UnboundedSender<Input>,
    results_rx: mpsc::UnboundedReceiver<Input>,
    updates: mpsc::UnboundedSender<RoomUpdate>,
    last_snapshot: Option<SessionSnapshot>,
    pending_leaves: Vec<LeaveReply>,
}

impl<G: Gateway> RoomActor<G> {
    pub(crate) fn new(
        gateway: Arc<G>,
        engine: RoomSession,
        name_store: Arc<dyn NameStore>,
        subscription: Subscription,
        commands: mpsc::Receiver<RoomCommand>,
        updates: mpsc::UnboundedSender<RoomUpdate>,
    ) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let countdown = Countdown::with_period(engine.config().countdown_period);
        Self {
            room_id: engine.session().room_id.clone(),
            student_id: engine.session().student_id.clone(),
            gateway,
            engine,
            name_store,
            subscription: Some(subscription),
            countdown,
            advance: None,
            commands,
            results_tx,
            results_rx,
            updates,
            last_snapshot: None,
            pending_leaves: Vec::new(),
        }
    }

    /// Runs the actor loop until the session ends or is shut down.
    pub(crate) async fn run(mut self) {
        info!(room_id = %self.room_id, student_id = %self.student_id, "session actor started");

        let outputs = self.engine.begin();
        self.execute_all(outputs);
        self.publish_snapshot();

        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(RoomCommand::Shutdown) => {
                        info!(room_id = %self.room_id, "session shutting down");
                        break;
                    }
                    Some(cmd) => self.on_command(cmd),
                    None => {
                        debug!(room_id = %self.room_id, "all handles dropped");
                        break;
                    }
                },
                Some(input) = self.results_rx.recv() => self.apply(input),
                event = next_event(&mut self.subscription) => match event {
                    Some(event) => self.apply(Input::Channel(event)),
                    None => {
                        warn!(room_id = %self.room_id, phase = %self.engine.phase(), "room channel closed");
                        self.subscription = None;
                        self.emit(RoomUpdate::Error(SessionError::ChannelLost));
                    }
                },
                tick = self.countdown.wait_for_tick() => {
                    self.apply(Input::Tick { question: tick.generation as usize });
                }
                question = advance_due(self.advance) => {
                    self.advance = None;
                    self.apply(Input::AdvanceDue { question });
                }
            }

            if self.engine.phase().is_terminal() {
                break;
            }
        }

        self.countdown.stop();
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        info!(
            room_id = %self.room_id,
            student_id = %self.student_id,
            phase = %self.engine.phase(),
            "session actor stopped"
        );
    }

    fn on_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::SubmitName(name) => self.apply(Input::SubmitName(name)),
            RoomCommand::Answer(answer) => self.apply(Input::Answer(answer)),
            RoomCommand::FillSlot { slot, text } => {
                self.apply(Input::FillSlot { slot, text })
            }
            RoomCommand::Leave { reply } => {
                self.pending_leaves.push(reply);
                self.apply(Input::Leave);
            }
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(self.engine.snapshot());
            }
            RoomCommand::Shutdown => {}
        }
    }

    /// Feeds one input to the engine and carries out what it asks.
    fn apply(&mut self, input: Input) {
        let leaderboard_loaded = matches!(input, Input::LeaderboardLoaded(Ok(_)));
        let outputs = self.engine.handle(input);
        self.execute_all(outputs);

        if leaderboard_loaded {
            self.emit(RoomUpdate::Leaderboard(self.engine.leaderboard().to_vec()));
        }
        self.publish_snapshot();
        self.settle_leaves();
    }

    fn execute_all(&mut self, outputs: Vec<Output>) {
        for output in outputs {
            match output {
                Output::Command(cmd) => self.run_command(cmd),
                Output::Feedback(feedback) => self.emit(RoomUpdate::Feedback(feedback)),
                Output::Error(err) => {
                    if let SessionError::LeaveFailed(reason) = &err {
                        for reply in self.pending_leaves.drain(..) {
                            let _ = reply.send(Err(RoomError::LeaveFailed(reason.clone())));
                        }
                    }
                    self.emit(RoomUpdate::Error(err));
                }
                Output::NameRequired => {
                    debug!(room_id = %self.room_id, "waiting for a display name");
                }
            }
        }
    }

    fn run_command(&mut self, cmd: Command) {
        match cmd {
            Command::Join { display_name } => {
                let gateway = Arc::clone(&self.gateway);
                let room_id = self.room_id.clone();
                let student_id = self.student_id.clone();
                let identity = self.engine.identity().clone();
                self.spawn_call(async move {
                    let result = gateway
                        .join_room(&room_id, &student_id, &identity, &display_name)
                        .await;
                    Input::JoinResult(result)
                });
            }
            Command::PersistName(name) => {
                if let Err(e) = self.name_store.save(&name) {
                    warn!(error = %e, "could not cache display name");
                    self.emit(RoomUpdate::Error(e));
                }
            }
            Command::FetchQuestions => {
                let gateway = Arc::clone(&self.gateway);
                let room_id = self.room_id.clone();
                self.spawn_call(async move {
                    Input::QuestionsLoaded(gateway.get_quiz_questions(&room_id).await)
                });
            }
            Command::StartCountdown { question, ticks } => {
                self.countdown.start(question as u64, ticks);
            }
            Command::StopCountdown => self.countdown.stop(),
            Command::SubmitAnswer {
                question,
                question_id,
                answer,
            } => {
                let gateway = Arc::clone(&self.gateway);
                let student_id = self.student_id.clone();
                let attempts = self.engine.config().submit_attempts;
                self.spawn_call(async move {
                    let result =
                        submit_with_retry(&*gateway, &question_id, &student_id, &answer, attempts)
                            .await;
                    Input::AnswerResult { question, result }
                });
            }
            Command::UpdateLeaderboard { name, score } => {
                let gateway = Arc::clone(&self.gateway);
                let room_id = self.room_id.clone();
                let student_id = self.student_id.clone();
                self.spawn_call(async move {
                    let result = gateway
                        .update_leaderboard(
                            &room_id,
                            &student_id,
                            &name,
                            score.score,
                            score.correct_count,
                            score.wrong_count,
                        )
                        .await;
                    Input::LeaderboardPushed(result)
                });
            }
            Command::ScheduleAdvance { question, delay } => {
                self.advance = Some((question, Instant::now() + delay));
            }
            Command::CancelAdvance => self.advance = None,
            Command::FetchLeaderboard => {
                let gateway = Arc::clone(&self.gateway);
                let room_id = self.room_id.clone();
                self.spawn_call(async move {
                    Input::LeaderboardLoaded(gateway.get_exit_leaderboard(&room_id).await)
                });
            }
            Command::Leave => {
                let gateway = Arc::clone(&self.gateway);
                let room_id = self.room_id.clone();
                let student_id = self.student_id.clone();
                self.spawn_call(async move {
                    Input::LeaveResult(gateway.leave_room(&room_id, &student_id).await)
                });
            }
            Command::Unsubscribe => {
                if let Some(subscription) = self.subscription.take() {
                    subscription.unsubscribe();
                }
            }
        }
    }

    /// Runs a gateway call on its own task and routes its result back
    /// into the loop.
    fn spawn_call<F>(&self, call: F)
    where
        F: Future<Output = Input> + Send + 'static,
    {
        let results = self.results_tx.clone();
        tokio::spawn(async move {
            let input = call.await;
            // The actor may have stopped meanwhile; the result is moot.
            let _ = results.send(input);
        });
    }

    /// Answers pending `leave` calls once the session has ended.
    fn settle_leaves(&mut self) {
        let outcome = match self.engine.phase() {
            Phase::Left => Ok(()),
            Phase::Kicked => Err(()),
            _ => return,
        };
        for reply in self.pending_leaves.drain(..) {
            let _ = reply.send(outcome.map_err(|_| RoomError::Kicked));
        }
    }

    fn publish_snapshot(&mut self) {
        let snapshot = self.engine.snapshot();
        if self.last_snapshot.as_ref() != Some(&snapshot) {
            self.emit(RoomUpdate::Snapshot(snapshot.clone()));
            self.last_snapshot = Some(snapshot);
        }
    }

    fn emit(&self, update: RoomUpdate) {
        // A UI that stopped listening doesn't stop the session.
        let _ = self.updates.send(update);
    }
}

/// Next channel event, or pending forever without a subscription.
async fn next_event(subscription: &mut Option<Subscription>) -> Option<ChannelEvent> {
    match subscription {
        Some(subscription) => subscription.recv().await,
        None => std::future::pending().await,
    }
}

/// Resolves with the question index once the advance deadline passes.
async fn advance_due(advance: Option<(usize, Instant)>) -> usize {
    match advance {
        Some((question, deadline)) => {
            time::sleep_until(deadline).await;
            question
        }
        None => std::future::pending().await,
    }
}

/// Tries a submission up to `attempts` times, returning the first
/// verdict or the last error.
async fn submit_with_retry<G: Gateway>(
    gateway: &G,
    question_id: &QuestionId,
    student_id: &StudentId,
    answer: &str,
    attempts: u32,
) -> Result<bool, GatewayError> {
    let mut attempt = 1;
    loop {
        match gateway.submit_answer(question_id, student_id, answer).await {
            Ok(correct) => return Ok(correct),
            Err(e) if attempt < attempts => {
                warn!(%question_id, attempt, error = %e, "submission failed, retrying");
                attempt += 1;
                time::sleep(SUBMIT_RETRY_DELAY).await;
            }
            Err(e) => return Err(e),
        }
    }
}
