use serde::{Deserialize, Serialize};

/// How the input field behaves while a mistake is still uncorrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputPolicy {
    /// Keystrokes past the mistake are dropped from the field.
    #[default]
    Locked,
    /// Keystrokes past the mistake stay in the field but are not judged;
    /// the user has to backspace down to the mistake.
    Unlocked,
}

impl InputPolicy {
    pub fn from_lock_flag(lock: bool) -> Self {
        if lock {
            InputPolicy::Locked
        } else {
            InputPolicy::Unlocked
        }
    }

    /// Field contents after an extra keystroke made while in error, where
    /// `keep` is the confirmed prefix plus the mistyped character.
    pub fn constrain(self, raw: &str, keep: usize) -> String {
        match self {
            InputPolicy::Locked => truncate_chars(raw, keep).to_string(),
            InputPolicy::Unlocked => raw.to_string(),
        }
    }
}

/// Length in characters rather than bytes.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// The first `n` characters of `s`.
pub fn truncate_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}
