//! Public side of the session actor: the handle, the update stream and
//! the spawn function.
//!
//! Everything the UI does goes through a [`RoomHandle`]; everything the
//! session wants the UI to know comes back as a [`RoomUpdate`] on a
//! single channel, in the order it happened.

use std::sync::Arc;

use quizroom_gateway::Gateway;
use quizroom_protocol::{Identity, LeaderboardEntry, RoomId};
use quizroom_session::{
    Feedback, NameStore, RoomSession, SessionConfig, SessionError,
    SessionSnapshot,
};
use tokio::sync::{mpsc, oneshot};

use crate::actor::RoomActor;
use crate::RoomError;

/// Capacity of the handle → actor command channel.
const COMMAND_CHANNEL_SIZE: usize = 32;

/// What a running session tells its UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomUpdate {
    /// The session changed. Sent after every input that changed it,
    /// including each countdown step.
    Snapshot(SessionSnapshot),
    /// A sound or visual cue to play.
    Feedback(Feedback),
    /// A fresh leaderboard arrived from the backend.
    Leaderboard(Vec<LeaderboardEntry>),
    /// Something went wrong that the student should hear about. The
    /// session keeps running.
    Error(SessionError),
}

/// Commands sent to a session actor through its channel.
///
/// Variants carrying a `oneshot::Sender` expect a reply; the rest are
/// fire-and-forget.
pub(crate) enum RoomCommand {
    SubmitName(String),
    Answer(String),
    FillSlot {
        slot: usize,
        text: String,
    },
    Leave {
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Shutdown,
}

/// Handle to a running session actor.
///
/// Cheap to clone: it's an `mpsc::Sender` wrapper. Once the actor stops
/// every call returns [`RoomError::Unavailable`].
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Submits the name typed into the name form.
    pub async fn submit_name(
        &self,
        name: impl Into<String>,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::SubmitName(name.into())).await
    }

    /// Answers the current question (a choice, "True"/"False", or typed
    /// text). Ignored if the question was already answered.
    pub async fn answer(&self, answer: impl Into<String>) -> Result<(), RoomError> {
        self.send(RoomCommand::Answer(answer.into())).await
    }

    /// Types into one fill-in slot. Filling the last empty slot submits
    /// the answer.
    pub async fn fill_slot(
        &self,
        slot: usize,
        text: impl Into<String>,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::FillSlot {
            slot,
            text: text.into(),
        })
        .await
    }

    /// Leaves the room and waits for the backend to confirm.
    ///
    /// On success the actor stops. On [`RoomError::LeaveFailed`] the
    /// session carries on exactly where it was.
    pub async fn leave(&self) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Leave { reply: reply_tx }).await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?
    }

    /// The session as it is right now.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Snapshot { reply: reply_tx }).await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    /// Stops the actor without telling the backend.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }
}

/// Starts a student's session in `room_id`.
///
/// Subscribes to the room's channel first, so a kick is honoured in any
/// phase, then spawns the actor, which joins straight away if a display
/// name is cached in `name_store` (or the identity has an account name)
/// and otherwise waits for [`RoomHandle::submit_name`].
///
/// The returned receiver yields every [`RoomUpdate`] in order and ends
/// when the actor stops.
///
/// # Errors
/// Returns [`RoomError::Gateway`] if the channel subscription fails.
pub async fn spawn_room<G: Gateway>(
    gateway: Arc<G>,
    identity: Identity,
    room_id: RoomId,
    config: SessionConfig,
    name_store: Arc<dyn NameStore>,
) -> Result<(RoomHandle, mpsc::UnboundedReceiver<RoomUpdate>), RoomError> {
    let subscription = gateway.subscribe(&room_id).await?;
    let (updates_tx, updates_rx) = mpsc::unbounded_channel();

    let cached_name = match name_store.load() {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!(%room_id, error = %e, "could not read cached name");
            let _ = updates_tx.send(RoomUpdate::Error(e));
            None
        }
    };

    let engine = RoomSession::new(identity, room_id.clone(), config, cached_name);
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
    let actor = RoomActor::new(
        gateway,
        engine,
        name_store,
        subscription,
        cmd_rx,
        updates_tx,
    );
    tokio::spawn(actor.run());

    Ok((
        RoomHandle {
            room_id,
            sender: cmd_tx,
        },
        updates_rx,
    ))
}
