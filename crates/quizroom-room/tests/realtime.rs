//! End-to-end: a session whose channel is a real WebSocket.
//!
//! Data calls go to an `InMemoryGateway`; broadcasts come from a
//! `tokio-tungstenite` server standing in for the realtime service.
//! Real time (not paused) because real sockets are involved.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use quizroom_gateway::{InMemoryGateway, RealtimeChannel, RealtimeGateway};
use quizroom_protocol::{Identity, RoomId, StudentId};
use quizroom_room::{spawn_room, RoomUpdate};
use quizroom_session::{MemoryNameStore, Phase, SessionConfig};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;

async fn next_json(
    ws: &mut tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>,
) -> serde_json::Value {
    loop {
        match ws.next().await.unwrap().unwrap() {
            Message::Text(text) => return serde_json::from_str(text.as_str()).unwrap(),
            Message::Binary(data) => return serde_json::from_slice(&data).unwrap(),
            _ => continue,
        }
    }
}

#[tokio::test]
async fn test_kick_over_websocket_ends_session_and_leaves_topic() {
    let room = RoomId::new("class-ws");
    let student = StudentId::new("student-ws");

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    let (kick_tx, kick_rx) = oneshot::channel::<()>();

    let server = tokio::spawn({
        let student = student.clone();
        async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            let join = next_json(&mut ws).await;

            kick_rx.await.unwrap();
            let kicked = serde_json::json!({
                "event": "student_kicked",
                "payload": { "student_id": student.as_str() },
            });
            ws.send(Message::Text(kicked.to_string().into())).await.unwrap();

            let leave = next_json(&mut ws).await;
            (join, leave)
        }
    });

    let data = InMemoryGateway::new();
    data.create_room(room.clone(), Vec::new()).await;
    let gateway = Arc::new(RealtimeGateway::new(data, RealtimeChannel::new(url)));

    let (_handle, mut updates) = spawn_room(
        Arc::clone(&gateway),
        Identity::new(student.clone()),
        room.clone(),
        SessionConfig::default(),
        Arc::new(MemoryNameStore::with_name("Ada")),
    )
    .await
    .unwrap();

    let wait = async {
        loop {
            match updates.recv().await {
                Some(RoomUpdate::Snapshot(s)) if s.phase == Phase::Lobby => break,
                Some(_) => continue,
                None => panic!("session ended before reaching the lobby"),
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(5), wait).await.unwrap();

    kick_tx.send(()).unwrap();

    let mut final_phase = None;
    let drain = async {
        while let Some(update) = updates.recv().await {
            if let RoomUpdate::Snapshot(s) = update {
                final_phase = Some(s.phase);
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(5), drain).await.unwrap();
    assert_eq!(final_phase, Some(Phase::Kicked));

    let (join, leave) = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(join["type"], "join");
    assert_eq!(join["topic"], "class-ws");
    assert_eq!(leave["type"], "leave");
    assert_eq!(leave["topic"], "class-ws");
}
