//! Integration tests for `InMemoryGateway` through the `Gateway` trait.

use std::time::Duration;

use quizroom_gateway::{Gateway, GatewayError, InMemoryGateway, Operation};
use quizroom_protocol::{
    ChannelEvent, Identity, Question, QuestionId, QuestionKind, RoomId,
    StudentId,
};

// =========================================================================
// Helpers
// =========================================================================

fn question(id: &str, answer: &str) -> Question {
    Question {
        id: QuestionId::new(id),
        quiz_id: "quiz-1".into(),
        text: format!("question {id}"),
        kind: QuestionKind::ShortAnswer,
        choices: Vec::new(),
        correct_answer: answer.into(),
        points: 100,
        time_limit_secs: 30,
    }
}

fn sid(id: &str) -> StudentId {
    StudentId::new(id)
}

async fn gateway_with_room() -> (InMemoryGateway, RoomId) {
    let gateway = InMemoryGateway::new();
    let room = RoomId::new("class-1");
    gateway
        .create_room(room.clone(), vec![question("q1", "rust"), question("q2", "tokio")])
        .await;
    (gateway, room)
}

async fn join(gateway: &InMemoryGateway, room: &RoomId, id: &str, name: &str) -> bool {
    let student = sid(id);
    gateway
        .join_room(room, &student, &Identity::new(student.clone()), name)
        .await
        .unwrap()
}

// =========================================================================
// join / leave
// =========================================================================

#[tokio::test]
async fn test_join_room_registers_participant() {
    let (gateway, room) = gateway_with_room().await;

    assert!(join(&gateway, &room, "s1", "Ada").await);

    assert_eq!(gateway.participants(&room).await, vec![sid("s1")]);
}

#[tokio::test]
async fn test_join_room_blank_name_is_refused() {
    let (gateway, room) = gateway_with_room().await;

    assert!(!join(&gateway, &room, "s1", "   ").await);
    assert!(gateway.participants(&room).await.is_empty());
}

#[tokio::test]
async fn test_join_room_unknown_room_returns_not_found() {
    let gateway = InMemoryGateway::new();
    let student = sid("s1");

    let result = gateway
        .join_room(&RoomId::new("nope"), &student, &Identity::new(student.clone()), "Ada")
        .await;

    assert!(matches!(result, Err(GatewayError::RoomNotFound(_))));
}

#[tokio::test]
async fn test_leave_room_reports_whether_student_was_present() {
    let (gateway, room) = gateway_with_room().await;
    join(&gateway, &room, "s1", "Ada").await;

    assert!(gateway.leave_room(&room, &sid("s1")).await.unwrap());
    assert!(!gateway.leave_room(&room, &sid("s1")).await.unwrap());
}

// =========================================================================
// answers and leaderboard
// =========================================================================

#[tokio::test]
async fn test_submit_answer_checks_and_records() {
    let (gateway, _room) = gateway_with_room().await;

    let right = gateway
        .submit_answer(&QuestionId::new("q1"), &sid("s1"), "Rust")
        .await
        .unwrap();
    let wrong = gateway
        .submit_answer(&QuestionId::new("q2"), &sid("s1"), "")
        .await
        .unwrap();

    assert!(right);
    assert!(!wrong);
    let log = gateway.submissions().await;
    assert_eq!(log.len(), 2);
    assert_eq!(log[1].answer, "");
}

#[tokio::test]
async fn test_submit_answer_unknown_question_returns_error() {
    let (gateway, _room) = gateway_with_room().await;

    let result = gateway
        .submit_answer(&QuestionId::new("q404"), &sid("s1"), "x")
        .await;

    assert!(matches!(result, Err(GatewayError::QuestionNotFound(_))));
}

#[tokio::test]
async fn test_exit_leaderboard_is_ranked_by_score() {
    let (gateway, room) = gateway_with_room().await;
    join(&gateway, &room, "s1", "Ada").await;
    join(&gateway, &room, "s2", "Bob").await;

    gateway
        .update_leaderboard(&room, &sid("s1"), "Ada", 100, 1, 1)
        .await
        .unwrap();
    gateway
        .update_leaderboard(&room, &sid("s2"), "Bob", 200, 2, 0)
        .await
        .unwrap();

    let board = gateway.get_exit_leaderboard(&room).await.unwrap();
    assert_eq!(board[0].name, "Bob");
    assert_eq!(board[1].score, 100);
}

// =========================================================================
// channel
// =========================================================================

#[tokio::test]
async fn test_start_game_reaches_every_subscriber() {
    let (gateway, room) = gateway_with_room().await;
    let mut a = gateway.subscribe(&room).await.unwrap();
    let mut b = gateway.subscribe(&room).await.unwrap();

    assert_eq!(gateway.start_game(&room).await, 2);

    assert_eq!(a.recv().await, Some(ChannelEvent::GameStarted));
    assert_eq!(b.recv().await, Some(ChannelEvent::GameStarted));
}

#[tokio::test]
async fn test_kick_removes_participant_and_broadcasts() {
    let (gateway, room) = gateway_with_room().await;
    join(&gateway, &room, "s1", "Ada").await;
    let mut sub = gateway.subscribe(&room).await.unwrap();

    gateway.kick(&room, &sid("s1")).await;

    assert!(gateway.participants(&room).await.is_empty());
    assert_eq!(
        sub.recv().await,
        Some(ChannelEvent::StudentKicked { student_id: sid("s1") })
    );
}

#[tokio::test]
async fn test_unsubscribe_drops_subscriber() {
    let (gateway, room) = gateway_with_room().await;
    let sub = gateway.subscribe(&room).await.unwrap();
    assert_eq!(gateway.subscriber_count(&room).await, 1);

    sub.unsubscribe();

    assert_eq!(gateway.subscriber_count(&room).await, 0);
    assert_eq!(gateway.start_game(&room).await, 0);
}

#[tokio::test]
async fn test_close_channel_ends_every_subscription() {
    let (gateway, room) = gateway_with_room().await;
    let mut sub = gateway.subscribe(&room).await.unwrap();

    assert_eq!(gateway.close_channel(&room).await, 1);

    assert_eq!(sub.recv().await, None);
    assert_eq!(gateway.subscriber_count(&room).await, 0);
}

// =========================================================================
// failure injection and latency
// =========================================================================

#[tokio::test]
async fn test_fail_makes_operation_error_until_recovered() {
    let (gateway, room) = gateway_with_room().await;

    gateway.fail(Operation::GetQuizQuestions).await;
    assert!(matches!(
        gateway.get_quiz_questions(&room).await,
        Err(GatewayError::Request(_))
    ));

    gateway.recover(Operation::GetQuizQuestions).await;
    assert_eq!(gateway.get_quiz_questions(&room).await.unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_set_latency_delays_calls() {
    let (gateway, room) = gateway_with_room().await;
    gateway.set_latency(Duration::from_secs(2)).await;

    let start = tokio::time::Instant::now();
    gateway.get_quiz_questions(&room).await.unwrap();

    assert!(start.elapsed() >= Duration::from_secs(2));
}
