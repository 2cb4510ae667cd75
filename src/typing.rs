use crate::error::{Error, Result};
use crate::finger::{FingerGuide, Highlight};
use crate::timer::Timer;
use crate::typing_policy::{char_len, truncate_chars, InputPolicy};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Pause between finishing a word and showing the next one.
pub const ADVANCE_DELAY: Duration = Duration::from_millis(300);

/// What a change of the input field did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Extra input while a mistake is uncorrected; nothing was judged.
    Blocked,
    /// The field got shorter; position follows it and the error is cleared.
    Shrunk,
    Correct,
    /// The last character of the word was confirmed; the advance is scheduled.
    WordComplete,
    Mismatch,
    /// Nothing new to judge.
    Unchanged,
    /// The word is complete and the advance has not fired yet.
    Waiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingEvent {
    NextWord { index: usize },
    /// Every word was typed; the session starts over at the first word.
    PracticeComplete { rounds: usize },
}

/// The active word split around the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordView<'a> {
    pub completed: &'a str,
    pub current: Option<char>,
    pub remaining: &'a str,
    pub has_error: bool,
}

/// Practice state: which word is active and how much of it is confirmed.
#[derive(Debug, Clone)]
pub struct TypingSession {
    words: Vec<String>,
    word_index: usize,
    position: usize,
    has_error: bool,
    input: String,
    policy: InputPolicy,
    guide: FingerGuide,
    advance: Timer,
    rounds_completed: usize,
}

impl TypingSession {
    pub fn new(words: Vec<String>, guide: FingerGuide, policy: InputPolicy) -> Result<Self> {
        if words.is_empty() {
            return Err(Error::EmptyWordList);
        }
        if let Some(index) = words.iter().position(|w| w.is_empty()) {
            return Err(Error::EmptyWord { index });
        }

        Ok(Self {
            words,
            word_index: 0,
            position: 0,
            has_error: false,
            input: String::new(),
            policy,
            guide,
            advance: Timer::new(ADVANCE_DELAY),
            rounds_completed: 0,
        })
    }

    /// Feeds the full current contents of the input field.
    pub fn handle_input(&mut self, raw: &str, now: Instant) -> InputOutcome {
        if self.advance.is_pending() {
            return InputOutcome::Waiting;
        }

        let prev_len = self.position;
        let raw_len = char_len(raw);

        if self.has_error && raw_len > prev_len {
            self.input = self.policy.constrain(raw, prev_len + 1);
            return InputOutcome::Blocked;
        }

        let shrink_below = if self.has_error { prev_len + 1 } else { prev_len };
        if raw_len < shrink_below {
            self.position = raw_len;
            self.has_error = false;
            self.input = raw.to_string();
            if self.position == char_len(&self.words[self.word_index]) {
                self.advance.schedule(now);
                return InputOutcome::WordComplete;
            }
            return InputOutcome::Shrunk;
        }

        if raw_len == prev_len {
            self.input = raw.to_string();
            return InputOutcome::Unchanged;
        }

        let word = &self.words[self.word_index];
        let mut expected = word.chars().skip(prev_len);
        for typed in raw.chars().skip(prev_len) {
            match expected.next() {
                Some(e) if e == typed => self.position += 1,
                Some(e) => {
                    debug!(expected = %e, typed = %typed, position = self.position, "mismatch");
                    self.has_error = true;
                    break;
                }
                // past the end of the word: extra input, not a mistake
                None => break,
            }
        }

        if self.has_error {
            self.input = self.policy.constrain(raw, self.position + 1);
            return InputOutcome::Mismatch;
        }

        self.input = raw.to_string();
        if self.position == char_len(word) {
            self.advance.schedule(now);
            debug!(word = %word, "word complete");
            InputOutcome::WordComplete
        } else {
            InputOutcome::Correct
        }
    }

    pub fn type_char(&mut self, c: char, now: Instant) -> InputOutcome {
        let mut raw = self.input.clone();
        raw.push(c);
        self.handle_input(&raw, now)
    }

    pub fn backspace(&mut self, now: Instant) -> InputOutcome {
        let mut raw = self.input.clone();
        raw.pop();
        self.handle_input(&raw, now)
    }

    /// Polls the pending advance. Returns the transition it caused, if any.
    pub fn tick(&mut self, now: Instant) -> Option<TypingEvent> {
        if self.advance.fire(now) {
            Some(self.next_word())
        } else {
            None
        }
    }

    pub fn next_word(&mut self) -> TypingEvent {
        self.advance.cancel();
        self.word_index += 1;
        self.position = 0;
        self.has_error = false;
        self.input.clear();

        if self.word_index >= self.words.len() {
            self.word_index = 0;
            self.rounds_completed += 1;
            info!(rounds = self.rounds_completed, "practice set complete");
            TypingEvent::PracticeComplete {
                rounds: self.rounds_completed,
            }
        } else {
            TypingEvent::NextWord {
                index: self.word_index,
            }
        }
    }

    pub fn current_word(&self) -> &str {
        &self.words[self.word_index]
    }

    pub fn view(&self) -> WordView<'_> {
        let word = self.current_word();
        let completed = truncate_chars(word, self.position);
        let rest = &word[completed.len()..];
        let mut chars = rest.chars();
        let current = chars.next();

        WordView {
            completed,
            current,
            remaining: chars.as_str(),
            has_error: self.has_error,
        }
    }

    pub fn progress_label(&self) -> String {
        format!("{} / {}", self.word_index + 1, self.words.len())
    }

    pub fn next_char(&self) -> Option<char> {
        self.current_word().chars().nth(self.position)
    }

    pub fn highlight(&self) -> Option<Highlight> {
        self.guide.highlight(self.next_char())
    }

    pub fn word_index(&self) -> usize {
        self.word_index
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn has_error(&self) -> bool {
        self.has_error
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn guide(&self) -> &FingerGuide {
        &self.guide
    }

    pub fn is_advancing(&self) -> bool {
        self.advance.is_pending()
    }

    pub fn rounds_completed(&self) -> usize {
        self.rounds_completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finger::Finger;
    use assert_matches::assert_matches;

    fn session(words: &[&str]) -> TypingSession {
        TypingSession::new(
            words.iter().map(|w| w.to_string()).collect(),
            FingerGuide::qwerty(),
            InputPolicy::Locked,
        )
        .unwrap()
    }

    fn type_str(s: &mut TypingSession, text: &str, now: Instant) {
        for c in text.chars() {
            s.type_char(c, now);
        }
    }

    #[test]
    fn rejects_empty_word_list() {
        let err = TypingSession::new(vec![], FingerGuide::qwerty(), InputPolicy::Locked);
        assert_matches!(err, Err(Error::EmptyWordList));
    }

    #[test]
    fn rejects_empty_word() {
        let err = TypingSession::new(
            vec!["cat".into(), "".into()],
            FingerGuide::qwerty(),
            InputPolicy::Locked,
        );
        assert_matches!(err, Err(Error::EmptyWord { index: 1 }));
    }

    #[test]
    fn correct_prefix_advances_position() {
        let now = Instant::now();
        let mut s = session(&["typing"]);

        for (i, c) in "typi".chars().enumerate() {
            assert_eq!(s.type_char(c, now), InputOutcome::Correct);
            assert_eq!(s.position(), i + 1);
            assert!(!s.has_error());
        }
        assert_eq!(s.input(), "typi");
    }

    #[test]
    fn mismatch_sets_error_and_keeps_position() {
        let now = Instant::now();
        let mut s = session(&["cat", "dog"]);

        s.type_char('c', now);
        assert_eq!(s.type_char('x', now), InputOutcome::Mismatch);

        assert!(s.has_error());
        assert_eq!(s.position(), 1);
        assert_eq!(s.input(), "cx");
        let view = s.view();
        assert_eq!(view.completed, "c");
        assert_eq!(view.current, Some('a'));
        assert_eq!(view.remaining, "t");
        assert!(view.has_error);
    }

    #[test]
    fn locked_error_drops_extra_keystrokes() {
        let now = Instant::now();
        let mut s = session(&["cat"]);

        type_str(&mut s, "cx", now);
        assert_eq!(s.type_char('a', now), InputOutcome::Blocked);
        assert_eq!(s.type_char('t', now), InputOutcome::Blocked);

        assert_eq!(s.input(), "cx");
        assert_eq!(s.position(), 1);
        assert!(s.has_error());
    }

    #[test]
    fn backspace_clears_error_on_same_word() {
        let now = Instant::now();
        let mut s = session(&["cat", "dog"]);

        type_str(&mut s, "cx", now);
        assert_eq!(s.backspace(now), InputOutcome::Shrunk);

        assert!(!s.has_error());
        assert_eq!(s.position(), 1);
        assert_eq!(s.word_index(), 0);
        assert_eq!(s.input(), "c");

        type_str(&mut s, "at", now);
        assert!(s.is_advancing());
    }

    #[test]
    fn backspace_over_confirmed_chars_moves_back() {
        let now = Instant::now();
        let mut s = session(&["cat"]);

        type_str(&mut s, "ca", now);
        s.backspace(now);
        assert_eq!(s.position(), 1);
        s.backspace(now);
        assert_eq!(s.position(), 0);
        assert_eq!(s.backspace(now), InputOutcome::Unchanged);
    }

    #[test]
    fn unlocked_keeps_extra_input_until_backspaced() {
        let now = Instant::now();
        let mut s = TypingSession::new(
            vec!["cat".into()],
            FingerGuide::qwerty(),
            InputPolicy::Unlocked,
        )
        .unwrap();

        type_str(&mut s, "cxy", now);
        assert_eq!(s.input(), "cxy");
        assert_eq!(s.position(), 1);

        assert_eq!(s.backspace(now), InputOutcome::Blocked);
        assert!(s.has_error());
        assert_eq!(s.backspace(now), InputOutcome::Shrunk);
        assert!(!s.has_error());
        assert_eq!(s.input(), "c");
    }

    #[test]
    fn completed_word_advances_after_delay() {
        let start = Instant::now();
        let mut s = session(&["cat", "dog"]);

        type_str(&mut s, "ca", start);
        assert_eq!(s.type_char('t', start), InputOutcome::WordComplete);
        assert_eq!(s.tick(start + Duration::from_millis(299)), None);
        assert_eq!(s.word_index(), 0);

        assert_eq!(
            s.tick(start + ADVANCE_DELAY),
            Some(TypingEvent::NextWord { index: 1 })
        );
        assert_eq!(s.word_index(), 1);
        assert_eq!(s.position(), 0);
        assert_eq!(s.input(), "");
        assert_eq!(s.view().current, Some('d'));
        assert_eq!(s.view().remaining, "og");
    }

    #[test]
    fn input_waits_while_advance_pending() {
        let start = Instant::now();
        let mut s = session(&["hi", "yo"]);

        type_str(&mut s, "hi", start);
        assert_eq!(s.type_char('y', start), InputOutcome::Waiting);
        assert_eq!(s.backspace(start), InputOutcome::Waiting);
        assert_eq!(s.input(), "hi");

        s.tick(start + ADVANCE_DELAY);
        assert_eq!(s.type_char('y', start + ADVANCE_DELAY), InputOutcome::Correct);
    }

    #[test]
    fn last_word_wraps_and_signals_completion() {
        let start = Instant::now();
        let mut s = session(&["a", "b"]);

        s.type_char('a', start);
        s.tick(start + ADVANCE_DELAY);
        s.type_char('b', start + ADVANCE_DELAY);
        let event = s.tick(start + ADVANCE_DELAY * 2);

        assert_eq!(event, Some(TypingEvent::PracticeComplete { rounds: 1 }));
        assert_eq!(s.word_index(), 0);
        assert_eq!(s.position(), 0);
        assert_eq!(s.rounds_completed(), 1);
    }

    #[test]
    fn progress_label_is_one_based() {
        let mut s = session(&["a", "b", "c"]);
        assert_eq!(s.progress_label(), "1 / 3");
        s.next_word();
        assert_eq!(s.progress_label(), "2 / 3");
    }

    #[test]
    fn highlight_follows_next_char() {
        let now = Instant::now();
        let mut s = session(&["dog"]);

        assert_eq!(s.highlight().unwrap().finger, Finger::LeftMiddle);
        s.type_char('d', now);
        let h = s.highlight().unwrap();
        assert_eq!(h.key_label, "O");
        assert_eq!(h.finger, Finger::RightRing);

        s.type_char('x', now);
        assert_eq!(s.highlight().unwrap().key_label, "O");
    }

    #[test]
    fn nothing_highlighted_at_end_of_word_or_unmapped() {
        let now = Instant::now();
        let mut s = session(&["go", "ねこ"]);

        s.type_char('g', now);
        s.type_char('o', now);
        assert_eq!(s.highlight(), None);

        s.next_word();
        assert_eq!(s.highlight(), None);
    }

    #[test]
    fn multibyte_words_split_on_chars() {
        let now = Instant::now();
        let mut s = session(&["ねこ"]);

        s.type_char('ね', now);
        let view = s.view();
        assert_eq!(view.completed, "ね");
        assert_eq!(view.current, Some('こ'));
        assert_eq!(view.remaining, "");
    }

    #[test]
    fn pasted_text_is_judged_char_by_char() {
        let now = Instant::now();
        let mut s = session(&["hello"]);

        assert_eq!(s.handle_input("hexlo", now), InputOutcome::Mismatch);
        assert_eq!(s.position(), 2);
        assert_eq!(s.input(), "hex");
        assert!(s.has_error());
    }

    #[test]
    fn overrun_completes_the_word() {
        let now = Instant::now();
        let mut s = session(&["cat", "dog"]);

        assert_eq!(s.handle_input("cats", now), InputOutcome::WordComplete);
        assert!(!s.has_error());
        assert_eq!(s.position(), 3);
        assert!(s.is_advancing());

        assert_eq!(s.backspace(now), InputOutcome::Waiting);
        assert_eq!(
            s.tick(now + ADVANCE_DELAY),
            Some(TypingEvent::NextWord { index: 1 })
        );
        assert_eq!(s.word_index(), 1);
        assert_eq!(s.input(), "");
    }

    #[test]
    fn overrun_after_partial_word_still_judges_the_rest() {
        let now = Instant::now();
        let mut s = session(&["cat"]);

        s.type_char('c', now);
        assert_eq!(s.handle_input("catxyz", now), InputOutcome::WordComplete);
        assert!(s.is_advancing());
    }

    #[test]
    fn manual_next_word_cancels_pending_advance() {
        let start = Instant::now();
        let mut s = session(&["a", "b", "c"]);

        s.type_char('a', start);
        assert!(s.is_advancing());
        s.next_word();
        assert!(!s.is_advancing());
        assert_eq!(s.tick(start + ADVANCE_DELAY), None);
        assert_eq!(s.word_index(), 1);
    }
}
