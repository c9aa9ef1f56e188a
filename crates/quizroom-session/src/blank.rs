//! Character-by-character answer entry for short-answer questions.

/// An ordered row of single-character slots, one per character of the
/// expected answer.
///
/// The answer is produced exactly once: [`set`](Self::set) returns the
/// concatenated text on the call that fills the last empty slot, and
/// `None` on every call before or after.
///
/// ```rust
/// use quizroom_session::BlankInput;
///
/// let mut blank = BlankInput::for_answer("cat");
/// assert_eq!(blank.set(0, "c"), None);
/// assert_eq!(blank.focus(), Some(1));
/// assert_eq!(blank.set(2, "t"), None);
/// assert_eq!(blank.set(1, "a"), Some("cat".to_string()));
/// assert_eq!(blank.set(1, "x"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlankInput {
    slots: Vec<Option<char>>,
    focus: usize,
    submitted: bool,
}

impl BlankInput {
    /// `len` empty slots, focus on the first.
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![None; len],
            focus: 0,
            submitted: false,
        }
    }

    /// Slots sized to `answer`'s character count (not its byte length).
    pub fn for_answer(answer: &str) -> Self {
        Self::new(answer.chars().count())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Option<char>] {
        &self.slots
    }

    /// The slot that should have keyboard focus, if there are any.
    pub fn focus(&self) -> Option<usize> {
        (!self.slots.is_empty()).then_some(self.focus)
    }

    /// Number of non-empty slots.
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        !self.slots.is_empty() && self.slots.iter().all(Option::is_some)
    }

    /// `true` once the answer has been handed out (or the input locked).
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Current contents with empty slots skipped.
    pub fn text(&self) -> String {
        self.slots.iter().flatten().collect()
    }

    /// Writes `text` into `slot`.
    ///
    /// Only the first character is kept; an empty string clears the
    /// slot. A non-empty entry moves focus to the next slot. Returns the
    /// full answer when this entry completes the row for the first time.
    /// Out-of-range slots and writes after submission are ignored.
    pub fn set(&mut self, slot: usize, text: &str) -> Option<String> {
        if self.submitted || slot >= self.slots.len() {
            return None;
        }

        let ch = text.chars().next();
        self.slots[slot] = ch;
        self.focus = slot;
        if ch.is_some() && slot + 1 < self.slots.len() {
            self.focus = slot + 1;
        }

        if self.is_complete() {
            self.submitted = true;
            return Some(self.text());
        }
        None
    }

    /// Disables further entry without producing an answer.
    pub fn lock(&mut self) {
        self.submitted = true;
    }
}
