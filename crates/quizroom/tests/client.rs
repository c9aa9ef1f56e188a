//! Integration tests for the client facade: building a client, joining,
//! and the screens a UI would draw along the way.

use std::sync::Arc;
use std::time::Duration;

use quizroom::prelude::*;
use tokio::sync::mpsc;

type Updates = mpsc::UnboundedReceiver<RoomUpdate>;

fn room() -> RoomId {
    RoomId::new("class-7")
}

fn me() -> Identity {
    Identity::new(StudentId::new("student-7"))
}

fn name_file(test: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir()
        .join("quizroom-client-tests")
        .join(format!("{test}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir.join("name.json")
}

async fn next_screen(updates: &mut Updates, mut pred: impl FnMut(&Screen) -> bool) -> Screen {
    loop {
        let update = tokio::time::timeout(Duration::from_secs(600), updates.recv())
            .await
            .expect("no update within 10 minutes")
            .expect("update stream ended");
        if let RoomUpdate::Snapshot(snapshot) = update {
            let screen = render(&snapshot);
            if pred(&screen) {
                return screen;
            }
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_join_without_name_shows_form_then_remembers_name() {
    let gateway = Arc::new(InMemoryGateway::new());
    gateway.create_room(room(), Vec::new()).await;
    let path = name_file("remember");

    let client = QuizroomClient::builder(Arc::clone(&gateway))
        .name_file(&path)
        .build();
    assert_eq!(client.cached_name().unwrap(), None);

    let (handle, mut updates) = client.join(me(), room()).await.unwrap();
    let form = next_screen(&mut updates, |_| true).await;
    assert_eq!(form, Screen::NameForm { prefill: None });

    handle.submit_name("Grace").await.unwrap();
    next_screen(&mut updates, |s| matches!(s, Screen::Lobby { .. })).await;
    assert_eq!(client.cached_name().unwrap(), Some("Grace".into()));

    handle.leave().await.unwrap();

    // A fresh client over the same file skips the form.
    let again = QuizroomClient::builder(gateway).name_file(&path).build();
    let (_handle, mut updates) = again.join(me(), room()).await.unwrap();
    let first = next_screen(&mut updates, |_| true).await;
    assert!(matches!(first, Screen::Joining { ref display_name } if display_name == "Grace"));
}

#[tokio::test(start_paused = true)]
async fn test_join_fails_when_channel_unavailable() {
    let gateway = Arc::new(InMemoryGateway::new());
    let client = QuizroomClient::builder(gateway).build();

    let err = client
        .join(me(), RoomId::new("no-such-room"))
        .await
        .unwrap_err();
    assert!(matches!(err, QuizroomError::Room(RoomError::Gateway(_))));
}

#[tokio::test(start_paused = true)]
async fn test_single_question_game_ends_on_final_leaderboard() {
    let gateway = Arc::new(InMemoryGateway::new());
    gateway
        .create_room(
            room(),
            vec![Question {
                id: QuestionId::new("q1"),
                quiz_id: "quiz-7".into(),
                text: "Capital of Italy?".into(),
                kind: QuestionKind::MultipleChoice,
                choices: vec!["paris".into(), "rome".into()],
                correct_answer: "rome".into(),
                points: 5,
                time_limit_secs: 10,
            }],
        )
        .await;

    let client = QuizroomClient::builder(Arc::clone(&gateway))
        .name_store(MemoryNameStore::with_name("Ada"))
        .config(SessionConfig {
            leaderboard_delay: Duration::from_secs(2),
            ..SessionConfig::default()
        })
        .build();
    let (handle, mut updates) = client.join(me(), room()).await.unwrap();
    next_screen(&mut updates, |s| matches!(s, Screen::Lobby { .. })).await;

    gateway.start_game(&room()).await;
    let screen = next_screen(&mut updates, |s| matches!(s, Screen::Question(_))).await;
    let Screen::Question(question) = screen else {
        unreachable!()
    };
    assert_eq!(question.number, 1);
    assert_eq!(question.points_label, "5 points");
    let QuestionBody::Choices(buttons) = &question.body else {
        panic!("expected choice buttons, got {:?}", question.body);
    };
    let labels: Vec<_> = buttons.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, ["Paris", "Rome"]);

    handle.answer("rome").await.unwrap();
    let between = next_screen(&mut updates, |s| matches!(s, Screen::Leaderboard(_))).await;
    let Screen::Leaderboard(board) = between else {
        unreachable!()
    };
    assert_eq!(board.verdict, Some(Outcome::Correct));
    assert_eq!(board.score.score, 5);

    let ended = next_screen(&mut updates, |s| matches!(s, Screen::Ended(_))).await;
    let Screen::Ended(board) = ended else {
        unreachable!()
    };
    assert_eq!(board.rows.len(), 1);
    assert!(board.rows[0].is_you);
    assert_eq!(board.rows[0].score, 5);
}
