//! Terminal classroom: one real student (you), a scripted professor and a
//! few bot classmates, all talking to an in-memory backend.
//!
//! ```text
//! cargo run -p classroom                 # answer from the keyboard
//! cargo run -p classroom -- --auto       # let the demo answer for you
//! cargo run -p classroom -- --kick       # the professor kicks you mid-quiz
//! cargo run -p classroom -- cfg.json     # SessionConfig overrides
//! ```
//!
//! While a question is up, type the number of a choice, `true`/`false`,
//! or the fill-in answer. `leave` leaves the room.

use std::sync::Arc;
use std::time::Duration;

use quizroom::prelude::*;
use rand::seq::IndexedRandom;
use rand::Rng;
use tokio::io::{AsyncBufReadExt, BufReader};

// ---------------------------------------------------------------------------
// Quiz content
// ---------------------------------------------------------------------------

fn room() -> RoomId {
    RoomId::new("geo-101")
}

fn question(id: &str, kind: QuestionKind, text: &str, choices: &[&str], answer: &str, points: u32) -> Question {
    Question {
        id: QuestionId::new(id),
        quiz_id: "geography".into(),
        text: text.into(),
        kind,
        choices: choices.iter().map(|c| c.to_string()).collect(),
        correct_answer: answer.into(),
        points,
        time_limit_secs: 15,
    }
}

fn quiz() -> Vec<Question> {
    vec![
        question("q1", QuestionKind::MultipleChoice, "Capital of Norway?", &["oslo", "bergen", "tromsø"], "oslo", 10),
        question("q2", QuestionKind::Boolean, "The Danube flows into the Black Sea.", &[], "True", 5),
        question("q3", QuestionKind::ShortAnswer, "Longest river in Italy?", &[], "Po", 20),
        question("q4", QuestionKind::MultipleChoice, "Highest peak in the Alps?", &["matterhorn", "mont blanc", "eiger"], "mont blanc", 10),
    ]
}

// ---------------------------------------------------------------------------
// Classmates
// ---------------------------------------------------------------------------

/// A guess that is right with probability `skill`.
fn guess(question: &Question, skill: f64) -> String {
    let mut rng = rand::rng();
    if rng.random_bool(skill) {
        return question.correct_answer.clone();
    }
    match question.kind {
        QuestionKind::MultipleChoice => question
            .choices
            .choose(&mut rng)
            .cloned()
            .unwrap_or_default(),
        QuestionKind::Boolean => ["True", "False"]
            .choose(&mut rng)
            .map(|s| s.to_string())
            .unwrap_or_default(),
        QuestionKind::ShortAnswer => "??".into(),
    }
}

fn think_time(limit_secs: u32) -> Duration {
    let ms = rand::rng().random_range(1_000..=u64::from(limit_secs.max(2)) * 1_000 - 500);
    Duration::from_millis(ms)
}

/// Joins, waits for the game, then answers every question and keeps its
/// leaderboard row current.
async fn classmate(
    gateway: Arc<InMemoryGateway>,
    name: &'static str,
    skill: f64,
    pace: Duration,
) -> Result<(), GatewayError> {
    let room = room();
    let id = StudentId::new(format!("bot-{}", name.to_lowercase()));
    let mut channel = gateway.subscribe(&room).await?;
    gateway
        .join_room(&room, &id, &Identity::new(id.clone()), name)
        .await?;

    loop {
        match channel.recv().await {
            Some(ChannelEvent::GameStarted) => break,
            Some(_) => continue,
            None => return Ok(()),
        }
    }

    let (mut score, mut correct, mut wrong) = (0, 0, 0);
    for question in gateway.get_quiz_questions(&room).await? {
        let limit = question.time_limit_secs;
        let think = think_time(limit);
        tokio::time::sleep(think).await;

        let answer = guess(&question, skill);
        if gateway.submit_answer(&question.id, &id, &answer).await? {
            score += question.points;
            correct += 1;
        } else {
            wrong += 1;
        }
        gateway
            .update_leaderboard(&room, &id, name, score, correct, wrong)
            .await?;
        tracing::debug!(classmate = name, %answer, score, "classmate answered");

        let rest = Duration::from_secs(u64::from(limit)).saturating_sub(think);
        tokio::time::sleep(rest + pace).await;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Professor
// ---------------------------------------------------------------------------

async fn professor(gateway: Arc<InMemoryGateway>, me: StudentId, kick: bool) {
    tokio::time::sleep(Duration::from_secs(3)).await;
    println!("\n[professor] Let's begin!");
    gateway.start_game(&room()).await;

    if kick {
        tokio::time::sleep(Duration::from_secs(20)).await;
        println!("\n[professor] removes you from the room");
        gateway.kick(&room(), &me).await;
    }
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

fn draw(screen: &Screen, previous: Option<&Screen>) {
    match screen {
        Screen::NameForm { prefill } => match prefill {
            Some(name) => println!("Display name (last tried: {name}):"),
            None => println!("Display name:"),
        },
        Screen::Joining { display_name } => println!("Joining as {display_name}..."),
        Screen::Lobby { display_name, starting } => {
            if *starting {
                println!("Game starting...");
            } else {
                println!("Hi {display_name}! Waiting for the professor.");
            }
        }
        Screen::Question(q) => {
            let same = matches!(previous, Some(Screen::Question(p)) if p.number == q.number);
            if same {
                draw_status(q);
            } else {
                draw_question(q);
            }
        }
        Screen::Leaderboard(board) => {
            println!("\n-- Leaderboard --");
            draw_rows(board);
        }
        Screen::Ended(board) => {
            println!("\n== Final standings ==");
            draw_rows(board);
            println!(
                "You scored {} ({} right, {} wrong).",
                board.score.score, board.score.correct_count, board.score.wrong_count
            );
        }
        Screen::Kicked => println!("You were removed from the room."),
        Screen::Left => println!("You left the room."),
    }
}

fn draw_question(q: &QuestionScreen) {
    println!("\nQuestion {}/{} ({})", q.number, q.total, q.points_label);
    println!("{}", q.text);
    match &q.body {
        QuestionBody::Choices(buttons) | QuestionBody::TrueFalse(buttons) => {
            for (i, button) in buttons.iter().enumerate() {
                println!("  {}) {}", i + 1, button.label);
            }
        }
        QuestionBody::FillIn(view) => {
            println!("  {}", "_ ".repeat(view.slots.len()).trim_end());
        }
    }
    draw_status(q);
}

fn draw_status(q: &QuestionScreen) {
    match q.status {
        Status::TimeLeft(secs) if secs % 5 != 0 && secs > 3 => {}
        ref status => println!("  [{}]", status.text()),
    }
}

fn draw_rows(board: &LeaderboardScreen) {
    for row in &board.rows {
        let you = if row.is_you { "  <- you" } else { "" };
        println!("{:>2}. {:<10} {:>4}{you}", row.rank, row.name, row.score);
    }
}

fn feedback_line(feedback: &Feedback) -> Option<String> {
    match feedback {
        Feedback::LobbyMusic { playing: true } => Some("♪ lobby music ♪".into()),
        Feedback::LobbyMusic { playing: false } => None,
        Feedback::Correct { points } => Some(format!("+{points}!")),
        Feedback::Wrong => Some("Buzz.".into()),
        Feedback::NoAnswer => Some("Too slow.".into()),
        Feedback::Unconfirmed => Some("Your answer could not be confirmed.".into()),
        Feedback::Kicked => Some("*door slams*".into()),
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Sends what a typed line means on the current screen.
async fn act(room: &RoomHandle, screen: Option<&Screen>, line: &str) -> Result<(), QuizroomError> {
    if line.eq_ignore_ascii_case("leave") {
        return match room.leave().await {
            Err(RoomError::LeaveFailed(reason)) => {
                println!("Could not leave: {reason}");
                Ok(())
            }
            other => Ok(other?),
        };
    }
    match screen {
        Some(Screen::NameForm { .. }) => room.submit_name(line).await?,
        Some(Screen::Question(q)) => match &q.body {
            QuestionBody::Choices(buttons) | QuestionBody::TrueFalse(buttons) => {
                let picked = line
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| buttons.get(n.wrapping_sub(1)))
                    .or_else(|| buttons.iter().find(|b| b.label.eq_ignore_ascii_case(line)))
                    .map(|b| b.value.clone());
                room.answer(picked.unwrap_or_else(|| line.to_string())).await?;
            }
            QuestionBody::FillIn(_) => {
                for (slot, c) in line.chars().enumerate() {
                    room.fill_slot(slot, c.to_string()).await?;
                }
            }
        },
        _ => println!("(nothing to answer right now)"),
    }
    Ok(())
}

/// Answers the question on `screen` after a short pause.
fn auto_answer(room: RoomHandle, screen: &QuestionScreen) {
    let answer = match &screen.body {
        QuestionBody::Choices(buttons) | QuestionBody::TrueFalse(buttons) => buttons
            .choose(&mut rand::rng())
            .map(|b| b.value.clone())
            .unwrap_or_default(),
        QuestionBody::FillIn(view) => "x".repeat(view.slots.len()),
    };
    let fill_in = matches!(screen.body, QuestionBody::FillIn(_));
    let delay = Duration::from_millis(rand::rng().random_range(1_500..6_000));
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        println!("> {answer}");
        let sent = if fill_in {
            let mut result = Ok(());
            for (slot, c) in answer.chars().enumerate() {
                result = room.fill_slot(slot, c.to_string()).await;
            }
            result
        } else {
            room.answer(answer).await
        };
        if let Err(e) = sent {
            tracing::debug!(error = %e, "auto answer dropped");
        }
    });
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

struct Options {
    auto: bool,
    kick: bool,
    config: SessionConfig,
}

fn options(args: impl Iterator<Item = String>) -> Result<Options, Box<dyn std::error::Error>> {
    let mut opts = Options {
        auto: false,
        kick: false,
        config: SessionConfig::default(),
    };
    for arg in args {
        match arg.as_str() {
            "--auto" => opts.auto = true,
            "--kick" => opts.kick = true,
            path => {
                let text = std::fs::read_to_string(path)?;
                opts.config = serde_json::from_str(&text)?;
            }
        }
    }
    Ok(opts)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    quizroom::telemetry::init_with("warn")?;
    let opts = options(std::env::args().skip(1))?;

    let gateway = Arc::new(InMemoryGateway::new());
    gateway.create_room(room(), quiz()).await;
    let pace = opts.config.leaderboard_delay;
    for (name, skill) in [("Ada", 0.9), ("Linus", 0.6), ("Grace", 0.75)] {
        let gateway = Arc::clone(&gateway);
        tokio::spawn(async move {
            if let Err(e) = classmate(gateway, name, skill, pace).await {
                tracing::warn!(classmate = name, error = %e, "classmate gave up");
            }
        });
    }

    let me = StudentId::new("you");
    let client = QuizroomClient::builder(Arc::clone(&gateway))
        .config(opts.config)
        .build();
    let (room, mut updates) = client.join(Identity::new(me.clone()), room()).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut screen: Option<Screen> = None;
    let mut professor_started = false;
    let mut leaving = false;
    let mut stdin_open = true;

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Some(RoomUpdate::Snapshot(snapshot)) => {
                    let next = render(&snapshot);
                    if screen.as_ref() == Some(&next) {
                        continue;
                    }
                    draw(&next, screen.as_ref());

                    match &next {
                        Screen::NameForm { .. } if opts.auto => room.submit_name("Student").await?,
                        Screen::Lobby { .. } if !professor_started => {
                            professor_started = true;
                            tokio::spawn(professor(Arc::clone(&gateway), me.clone(), opts.kick));
                        }
                        Screen::Question(q) if opts.auto => {
                            let fresh = !matches!(&screen, Some(Screen::Question(p)) if p.number == q.number);
                            if fresh {
                                auto_answer(room.clone(), q);
                            }
                        }
                        Screen::Ended(_) if !leaving => {
                            leaving = true;
                            room.leave().await?;
                        }
                        _ => {}
                    }
                    screen = Some(next);
                }
                Some(RoomUpdate::Feedback(feedback)) => {
                    if let Some(line) = feedback_line(&feedback) {
                        println!("{line}");
                    }
                }
                Some(RoomUpdate::Leaderboard(_)) => {}
                Some(RoomUpdate::Error(e)) => println!("! {e}"),
                None => break,
            },
            line = lines.next_line(), if !opts.auto && stdin_open => match line? {
                Some(line) if !line.trim().is_empty() => act(&room, screen.as_ref(), line.trim()).await?,
                Some(_) => {}
                None => {
                    stdin_open = false;
                    if !leaving {
                        leaving = true;
                        room.leave().await?;
                    }
                }
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_always_right_with_full_skill() {
        for q in quiz() {
            assert_eq!(guess(&q, 1.0), q.correct_answer);
        }
    }

    #[test]
    fn test_guess_picks_a_valid_option_with_no_skill() {
        let q = &quiz()[0];
        let answer = guess(q, 0.0);
        assert!(q.choices.contains(&answer));

        let tf = &quiz()[1];
        assert!(["True", "False"].contains(&guess(tf, 0.0).as_str()));
    }

    #[test]
    fn test_think_time_stays_inside_limit() {
        for _ in 0..50 {
            let t = think_time(15);
            assert!(t >= Duration::from_secs(1));
            assert!(t < Duration::from_secs(15));
        }
    }

    #[test]
    fn test_options_reads_flags_and_config_file() {
        let path = std::env::temp_dir().join(format!("classroom-cfg-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "submit_attempts": 4 }"#).unwrap();

        let opts = options(
            ["--auto".to_string(), path.display().to_string()].into_iter(),
        )
        .unwrap();
        assert!(opts.auto);
        assert!(!opts.kick);
        assert_eq!(opts.config.submit_attempts, 4);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_feedback_line_silent_when_music_stops() {
        assert_eq!(feedback_line(&Feedback::LobbyMusic { playing: false }), None);
        assert_eq!(feedback_line(&Feedback::Correct { points: 5 }), Some("+5!".into()));
    }
}
