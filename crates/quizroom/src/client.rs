//! `QuizroomClient` builder and entry point.
//!
//! The client ties the layers together: a gateway to the backend, the
//! session settings, and where the display name is remembered. Each
//! [`join`](QuizroomClient::join) starts one session actor.

use std::path::PathBuf;
use std::sync::Arc;

use quizroom_gateway::Gateway;
use quizroom_protocol::{Identity, RoomId};
use quizroom_room::{spawn_room, RoomHandle, RoomUpdate};
use quizroom_session::{FileNameStore, MemoryNameStore, NameStore, SessionConfig};
use tokio::sync::mpsc;

use crate::QuizroomError;

/// Builder for a [`QuizroomClient`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use quizroom::prelude::*;
///
/// let config = SessionConfig {
///     leaderboard_delay: Duration::from_secs(3),
///     ..SessionConfig::default()
/// };
/// let client = QuizroomClient::builder(Arc::new(InMemoryGateway::new()))
///     .config(config)
///     .build();
/// assert_eq!(client.config().leaderboard_delay, Duration::from_secs(3));
/// ```
pub struct QuizroomClientBuilder<G: Gateway> {
    gateway: Arc<G>,
    config: SessionConfig,
    name_store: Arc<dyn NameStore>,
}

impl<G: Gateway> QuizroomClientBuilder<G> {
    /// Creates a builder with default settings and an in-memory name
    /// cache.
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            config: SessionConfig::default(),
            name_store: Arc::new(MemoryNameStore::new()),
        }
    }

    /// Sets the session configuration.
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets where the display name is remembered.
    pub fn name_store(mut self, store: impl NameStore) -> Self {
        self.name_store = Arc::new(store);
        self
    }

    /// Remembers the display name in a JSON file at `path`.
    pub fn name_file(self, path: impl Into<PathBuf>) -> Self {
        self.name_store(FileNameStore::new(path))
    }

    pub fn build(self) -> QuizroomClient<G> {
        QuizroomClient {
            gateway: self.gateway,
            config: self.config.validated(),
            name_store: self.name_store,
        }
    }
}

/// A configured client. Cheap to share; every session it starts runs on
/// its own task.
pub struct QuizroomClient<G: Gateway> {
    gateway: Arc<G>,
    config: SessionConfig,
    name_store: Arc<dyn NameStore>,
}

impl<G: Gateway> QuizroomClient<G> {
    /// Creates a new builder around `gateway`.
    pub fn builder(gateway: Arc<G>) -> QuizroomClientBuilder<G> {
        QuizroomClientBuilder::new(gateway)
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The remembered display name, if there is one.
    pub fn cached_name(&self) -> Result<Option<String>, QuizroomError> {
        Ok(self.name_store.load()?)
    }

    /// Starts a session for `identity` in `room_id`.
    ///
    /// With a remembered name (or an account name on `identity`) the
    /// session joins straight away; otherwise the first snapshot shows
    /// the name form and the session waits for
    /// [`RoomHandle::submit_name`].
    ///
    /// # Errors
    /// Fails if the room's realtime channel cannot be opened.
    pub async fn join(
        &self,
        identity: Identity,
        room_id: RoomId,
    ) -> Result<(RoomHandle, mpsc::UnboundedReceiver<RoomUpdate>), QuizroomError>
    {
        tracing::info!(%room_id, student_id = %identity.student_id, "joining room");
        let session = spawn_room(
            Arc::clone(&self.gateway),
            identity,
            room_id,
            self.config.clone(),
            Arc::clone(&self.name_store),
        )
        .await?;
        Ok(session)
    }
}

impl<G: Gateway> Clone for QuizroomClient<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            config: self.config.clone(),
            name_store: Arc::clone(&self.name_store),
        }
    }
}
