//! Screens derived from a session snapshot.
//!
//! Rendering is a pure function of [`SessionSnapshot`]: no state lives
//! here, so a UI can redraw from any snapshot at any time. Labels and
//! flags are computed here so the UI layer only has to lay them out.

use quizroom_protocol::{Question, QuestionKind, StudentId};

use crate::{Outcome, Phase, QuestionProgress, ScoreState, SessionSnapshot};

/// Fill-in slots per row before wrapping.
pub const MAX_SLOT_COLUMNS: usize = 10;

/// What to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Ask for a display name. `prefill` is the last name tried, if any.
    NameForm { prefill: Option<String> },
    /// Waiting for the join to be acknowledged.
    Joining { display_name: String },
    /// Waiting for the professor. `starting` once the game has begun
    /// and questions are loading.
    Lobby { display_name: String, starting: bool },
    Question(QuestionScreen),
    Leaderboard(LeaderboardScreen),
    Ended(LeaderboardScreen),
    Kicked,
    Left,
}

/// A question being asked (or just answered).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionScreen {
    /// 1-based.
    pub number: usize,
    pub total: usize,
    /// "1 point", "20 points".
    pub points_label: String,
    /// Timer bar fill, 0..=100.
    pub percent_left: u8,
    pub text: String,
    pub status: Status,
    pub body: QuestionBody,
}

/// The line under the timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    TimeLeft(u32),
    /// Answer sent, verdict pending.
    Submitted,
    Verdict(Outcome),
}

impl Status {
    pub fn text(&self) -> String {
        match self {
            Self::TimeLeft(secs) => format!("Time Left: {secs} seconds"),
            Self::Submitted => "Answer sent".to_string(),
            Self::Verdict(outcome) => outcome.label().to_string(),
        }
    }
}

/// Answer controls for each question kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionBody {
    Choices(Vec<ChoiceButton>),
    TrueFalse(Vec<ChoiceButton>),
    FillIn(FillInView),
}

/// Colouring of an answer control after the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Correct,
    Wrong,
    /// Not picked, after something else was.
    Dimmed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceButton {
    /// Display text, first letter capitalised.
    pub label: String,
    /// What to send as the answer.
    pub value: String,
    pub selected: bool,
    pub disabled: bool,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillInView {
    pub slots: Vec<Option<char>>,
    pub focus: Option<usize>,
    pub columns: usize,
    pub disabled: bool,
    pub tone: Tone,
}

/// The between-questions (or final) standings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardScreen {
    /// How the last question went, if one was asked.
    pub verdict: Option<Outcome>,
    pub score: ScoreState,
    pub rows: Vec<LeaderboardRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    /// 1-based.
    pub rank: usize,
    pub name: String,
    pub score: u32,
    pub correct_count: u32,
    pub wrong_count: u32,
    /// This row belongs to the viewing student.
    pub is_you: bool,
}

/// Picks the screen for a snapshot.
pub fn render(snapshot: &SessionSnapshot) -> Screen {
    let name = snapshot.session.display_name.clone().unwrap_or_default();
    match snapshot.phase {
        Phase::AwaitingName => Screen::NameForm {
            prefill: snapshot.session.display_name.clone(),
        },
        Phase::Joining => Screen::Joining { display_name: name },
        Phase::Lobby => Screen::Lobby {
            display_name: name,
            starting: snapshot.session.game_started,
        },
        Phase::InQuestion => match (&snapshot.question, &snapshot.progress) {
            (Some(question), Some(progress)) => Screen::Question(question_screen(
                question,
                progress,
                snapshot.question_count,
            )),
            _ => Screen::Lobby {
                display_name: name,
                starting: true,
            },
        },
        Phase::ShowingLeaderboard => Screen::Leaderboard(leaderboard_screen(snapshot)),
        Phase::Ended => Screen::Ended(leaderboard_screen(snapshot)),
        Phase::Kicked => Screen::Kicked,
        Phase::Left => Screen::Left,
    }
}

/// Builds the question screen on its own, e.g. to overlay the verdict.
pub fn question_screen(
    question: &Question,
    progress: &QuestionProgress,
    total: usize,
) -> QuestionScreen {
    let status = match progress.outcome {
        Some(outcome) => Status::Verdict(outcome),
        None if progress.has_answered => Status::Submitted,
        None => Status::TimeLeft(progress.time_left),
    };

    let body = match question.kind {
        QuestionKind::MultipleChoice => {
            QuestionBody::Choices(buttons(&question.choices, progress))
        }
        QuestionKind::Boolean => {
            let options = ["True".to_string(), "False".to_string()];
            QuestionBody::TrueFalse(buttons(&options, progress))
        }
        QuestionKind::ShortAnswer => {
            let (slots, focus) = match &progress.blank {
                Some(blank) => (blank.slots().to_vec(), blank.focus()),
                None => (Vec::new(), None),
            };
            QuestionBody::FillIn(FillInView {
                columns: slots.len().min(MAX_SLOT_COLUMNS),
                slots,
                focus,
                disabled: progress.has_answered,
                tone: verdict_tone(progress.outcome),
            })
        }
    };

    QuestionScreen {
        number: progress.index + 1,
        total,
        points_label: points_label(question.points),
        percent_left: progress.percent_left(),
        text: question.text.clone(),
        status,
        body,
    }
}

fn buttons(options: &[String], progress: &QuestionProgress) -> Vec<ChoiceButton> {
    options
        .iter()
        .map(|option| {
            let selected = progress.selected_answer.as_deref() == Some(option.as_str());
            let tone = if selected {
                verdict_tone(progress.outcome)
            } else if progress.has_answered {
                Tone::Dimmed
            } else {
                Tone::Neutral
            };
            ChoiceButton {
                label: capitalize_first(option),
                value: option.clone(),
                selected,
                disabled: progress.has_answered && !selected,
                tone,
            }
        })
        .collect()
}

fn verdict_tone(outcome: Option<Outcome>) -> Tone {
    match outcome {
        Some(Outcome::Correct) => Tone::Correct,
        Some(Outcome::Wrong) => Tone::Wrong,
        _ => Tone::Neutral,
    }
}

fn leaderboard_screen(snapshot: &SessionSnapshot) -> LeaderboardScreen {
    let me: &StudentId = &snapshot.session.student_id;
    let rows = snapshot
        .leaderboard
        .iter()
        .enumerate()
        .map(|(i, entry)| LeaderboardRow {
            rank: i + 1,
            name: entry.name.clone(),
            score: entry.score,
            correct_count: entry.correct_count,
            wrong_count: entry.wrong_count,
            is_you: &entry.student_id == me,
        })
        .collect();

    LeaderboardScreen {
        verdict: snapshot.progress.as_ref().and_then(|p| p.outcome),
        score: snapshot.score,
        rows,
    }
}

/// "1 point" / "N points". Zero reads "0 point", as on the classroom
/// screens.
pub fn points_label(points: u32) -> String {
    if points > 1 {
        format!("{points} points")
    } else {
        format!("{points} point")
    }
}

/// Upper-cases the first character, leaving the rest alone.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizroom_protocol::{LeaderboardEntry, QuestionId, RoomId};

    use crate::Session;

    fn question(kind: QuestionKind) -> Question {
        Question {
            id: QuestionId::new("q"),
            quiz_id: String::new(),
            text: "Pick one".into(),
            kind,
            choices: vec!["paris".into(), "rome".into()],
            correct_answer: "paris".into(),
            points: 20,
            time_limit_secs: 10,
        }
    }

    fn snapshot(phase: Phase) -> SessionSnapshot {
        let mut session = Session::new(StudentId::new("me"), RoomId::new("r"));
        session.display_name = Some("Ada".into());
        SessionSnapshot {
            phase,
            session,
            question: None,
            question_count: 0,
            progress: None,
            score: ScoreState::default(),
            leaderboard: Vec::new(),
        }
    }

    #[test]
    fn test_points_label_pluralizes() {
        assert_eq!(points_label(1), "1 point");
        assert_eq!(points_label(20), "20 points");
        assert_eq!(points_label(0), "0 point");
    }

    #[test]
    fn test_capitalize_first_only_touches_first_char() {
        assert_eq!(capitalize_first("paris"), "Paris");
        assert_eq!(capitalize_first("éclair au café"), "Éclair au café");
        assert_eq!(capitalize_first(""), "");
    }

    #[test]
    fn test_render_name_form_prefills_last_name() {
        let screen = render(&snapshot(Phase::AwaitingName));
        assert_eq!(screen, Screen::NameForm { prefill: Some("Ada".into()) });
    }

    #[test]
    fn test_unanswered_choice_buttons_are_neutral_and_enabled() {
        let q = question(QuestionKind::MultipleChoice);
        let progress = QuestionProgress::new(0, &q, 10);

        let screen = question_screen(&q, &progress, 3);

        let QuestionBody::Choices(buttons) = screen.body else {
            panic!("expected choices");
        };
        assert_eq!(buttons[0].label, "Paris");
        assert!(buttons.iter().all(|b| !b.disabled && b.tone == Tone::Neutral));
        assert_eq!(screen.status, Status::TimeLeft(10));
        assert_eq!(screen.status.text(), "Time Left: 10 seconds");
        assert_eq!(screen.percent_left, 100);
        assert_eq!(screen.number, 1);
    }

    #[test]
    fn test_answered_choice_highlights_selection_and_disables_rest() {
        let q = question(QuestionKind::MultipleChoice);
        let mut progress = QuestionProgress::new(0, &q, 10);
        progress.has_answered = true;
        progress.selected_answer = Some("rome".into());
        progress.outcome = Some(Outcome::Wrong);

        let screen = question_screen(&q, &progress, 1);

        let QuestionBody::Choices(buttons) = screen.body else {
            panic!("expected choices");
        };
        assert_eq!(buttons[0].tone, Tone::Dimmed);
        assert!(buttons[0].disabled);
        assert_eq!(buttons[1].tone, Tone::Wrong);
        assert!(buttons[1].selected && !buttons[1].disabled);
        assert_eq!(screen.status.text(), "Wrong!");
    }

    #[test]
    fn test_boolean_question_offers_true_false() {
        let q = question(QuestionKind::Boolean);
        let progress = QuestionProgress::new(0, &q, 10);

        let QuestionBody::TrueFalse(buttons) = question_screen(&q, &progress, 1).body else {
            panic!("expected true/false");
        };
        let labels: Vec<_> = buttons.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["True", "False"]);
    }

    #[test]
    fn test_fill_in_has_one_slot_per_char() {
        let q = question(QuestionKind::ShortAnswer);
        let progress = QuestionProgress::new(0, &q, 10);

        let QuestionBody::FillIn(view) = question_screen(&q, &progress, 1).body else {
            panic!("expected fill-in");
        };
        assert_eq!(view.slots.len(), 5);
        assert_eq!(view.columns, 5);
        assert_eq!(view.focus, Some(0));
    }

    #[test]
    fn test_time_up_status_reads_times_up() {
        let q = question(QuestionKind::Boolean);
        let mut progress = QuestionProgress::new(0, &q, 10);
        progress.has_answered = true;
        progress.time_left = 0;
        progress.outcome = Some(Outcome::NoAnswer);

        assert_eq!(question_screen(&q, &progress, 1).status.text(), "Time's up!");
    }

    #[test]
    fn test_leaderboard_marks_own_row() {
        let mut snap = snapshot(Phase::Ended);
        snap.leaderboard = vec![
            LeaderboardEntry {
                student_id: StudentId::new("other"),
                name: "Bo".into(),
                score: 30,
                correct_count: 1,
                wrong_count: 0,
            },
            LeaderboardEntry {
                student_id: StudentId::new("me"),
                name: "Ada".into(),
                score: 10,
                correct_count: 1,
                wrong_count: 1,
            },
        ];

        let Screen::Ended(board) = render(&snap) else {
            panic!("expected ended screen");
        };
        assert_eq!(board.rows[1].rank, 2);
        assert!(board.rows[1].is_you);
        assert!(!board.rows[0].is_you);
    }
}
