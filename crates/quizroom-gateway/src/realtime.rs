//! Realtime channel over WebSocket using `tokio-tungstenite`.
//!
//! The hosted backend pushes room broadcasts (`game_started`,
//! `student_kicked`) over a WebSocket. [`RealtimeChannel`] opens one
//! connection per subscription, joins the room's topic, and pumps
//! decoded [`ChannelEvent`]s into a [`Subscription`]. Frames that fail
//! to decode are logged and skipped; they never end the subscription.

use std::future::Future;

use futures_util::{SinkExt, StreamExt};
use quizroom_protocol::{
    ChannelEvent, ChannelRequest, Codec, Identity, JsonCodec,
    LeaderboardEntry, ProtocolError, Question, QuestionId, RoomId, StudentId,
};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::{Gateway, GatewayError, Subscription};

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Subscribes to room channels on a WebSocket realtime service.
#[derive(Debug, Clone)]
pub struct RealtimeChannel {
    url: String,
    codec: JsonCodec,
}

impl RealtimeChannel {
    /// Creates a channel client for the service at `url` (`ws://…`).
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            codec: JsonCodec,
        }
    }

    /// The service URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Connects, joins `room_id`'s topic, and starts delivering events.
    ///
    /// The connection lives in a background task that ends when the
    /// returned [`Subscription`] is dropped (sending a `leave` frame
    /// first) or when the server closes the socket.
    pub async fn subscribe(
        &self,
        room_id: &RoomId,
    ) -> Result<Subscription, GatewayError> {
        let (mut ws, _) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(|e| {
                GatewayError::Connect(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    e,
                ))
            })?;

        let join = self.frame(&ChannelRequest::Join {
            topic: room_id.clone(),
        })?;
        ws.send(join).await.map_err(|e| {
            GatewayError::Connect(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })?;
        tracing::debug!(%room_id, url = %self.url, "realtime channel joined");

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(pump(ws, room_id.clone(), tx, self.codec));
        Ok(Subscription::new(room_id.clone(), rx))
    }

    fn frame(&self, request: &ChannelRequest) -> Result<Message, GatewayError> {
        let bytes = self.codec.encode(request)?;
        let text = String::from_utf8(bytes)
            .map_err(|e| ProtocolError::InvalidMessage(e.to_string()))?;
        Ok(Message::Text(text.into()))
    }
}

/// Forwards decoded frames until either side goes away.
async fn pump(
    mut ws: WsStream,
    room_id: RoomId,
    tx: mpsc::UnboundedSender<ChannelEvent>,
    codec: JsonCodec,
) {
    loop {
        tokio::select! {
            _ = tx.closed() => {
                // Subscriber dropped: leave the topic politely.
                let leave = ChannelRequest::Leave { topic: room_id.clone() };
                if let Ok(bytes) = codec.encode(&leave) {
                    if let Ok(text) = String::from_utf8(bytes) {
                        let _ = ws.send(Message::Text(text.into())).await;
                    }
                }
                let _ = ws.close(None).await;
                break;
            }
            msg = ws.next() => {
                let data = match msg {
                    Some(Ok(Message::Text(text))) => text.as_bytes().to_vec(),
                    Some(Ok(Message::Binary(data))) => data.to_vec(),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue, // ping/pong/frame
                    Some(Err(e)) => {
                        tracing::warn!(%room_id, error = %e, "realtime channel failed");
                        break;
                    }
                };
                match codec.decode::<ChannelEvent>(&data) {
                    Ok(event) => {
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::debug!(%room_id, error = %e, "skipping undecodable frame");
                    }
                }
            }
        }
    }
    tracing::debug!(%room_id, "realtime channel closed");
}

// ---------------------------------------------------------------------------
// RealtimeGateway
// ---------------------------------------------------------------------------

/// A [`Gateway`] whose data calls go to `D` and whose subscriptions go
/// to a WebSocket [`RealtimeChannel`].
pub struct RealtimeGateway<D> {
    data: D,
    channel: RealtimeChannel,
}

impl<D: Gateway> RealtimeGateway<D> {
    pub fn new(data: D, channel: RealtimeChannel) -> Self {
        Self { data, channel }
    }

    /// The gateway serving data calls.
    pub fn data(&self) -> &D {
        &self.data
    }
}

impl<D: Gateway> Gateway for RealtimeGateway<D> {
    fn join_room(
        &self,
        room_id: &RoomId,
        student_id: &StudentId,
        identity: &Identity,
        display_name: &str,
    ) -> impl Future<Output = Result<bool, GatewayError>> + Send {
        self.data
            .join_room(room_id, student_id, identity, display_name)
    }

    fn get_quiz_questions(
        &self,
        room_id: &RoomId,
    ) -> impl Future<Output = Result<Vec<Question>, GatewayError>> + Send {
        self.data.get_quiz_questions(room_id)
    }

    fn submit_answer(
        &self,
        question_id: &QuestionId,
        student_id: &StudentId,
        answer: &str,
    ) -> impl Future<Output = Result<bool, GatewayError>> + Send {
        self.data.submit_answer(question_id, student_id, answer)
    }

    fn update_leaderboard(
        &self,
        room_id: &RoomId,
        student_id: &StudentId,
        name: &str,
        score: u32,
        correct_count: u32,
        wrong_count: u32,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        self.data.update_leaderboard(
            room_id,
            student_id,
            name,
            score,
            correct_count,
            wrong_count,
        )
    }

    fn get_exit_leaderboard(
        &self,
        room_id: &RoomId,
    ) -> impl Future<Output = Result<Vec<LeaderboardEntry>, GatewayError>> + Send
    {
        self.data.get_exit_leaderboard(room_id)
    }

    fn leave_room(
        &self,
        room_id: &RoomId,
        student_id: &StudentId,
    ) -> impl Future<Output = Result<bool, GatewayError>> + Send {
        self.data.leave_room(room_id, student_id)
    }

    async fn subscribe(
        &self,
        room_id: &RoomId,
    ) -> Result<Subscription, GatewayError> {
        self.channel.subscribe(room_id).await
    }
}
