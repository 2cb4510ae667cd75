use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Hand {
    Left,
    Right,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Finger {
    LeftPinky,
    LeftRing,
    LeftMiddle,
    LeftIndex,
    RightIndex,
    RightMiddle,
    RightRing,
    RightPinky,
}

impl Finger {
    /// Left to right, the order fingers appear in the on-screen guide.
    pub const ALL: [Finger; 8] = [
        Finger::LeftPinky,
        Finger::LeftRing,
        Finger::LeftMiddle,
        Finger::LeftIndex,
        Finger::RightIndex,
        Finger::RightMiddle,
        Finger::RightRing,
        Finger::RightPinky,
    ];

    pub fn hand(self) -> Hand {
        match self {
            Finger::LeftPinky | Finger::LeftRing | Finger::LeftMiddle | Finger::LeftIndex => {
                Hand::Left
            }
            _ => Hand::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Resting (light) and emphasized (dark) shade for one finger's keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPair {
    pub light: Rgb,
    pub dark: Rgb,
}

const RED: ColorPair = ColorPair {
    light: Rgb(254, 226, 226),
    dark: Rgb(252, 165, 165),
};
const YELLOW: ColorPair = ColorPair {
    light: Rgb(254, 249, 195),
    dark: Rgb(253, 224, 71),
};
const BLUE: ColorPair = ColorPair {
    light: Rgb(219, 234, 254),
    dark: Rgb(147, 197, 253),
};
const GREEN: ColorPair = ColorPair {
    light: Rgb(220, 252, 231),
    dark: Rgb(134, 239, 172),
};

/// What to emphasize for the next expected character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub key_label: String,
    pub finger: Finger,
    pub colors: ColorPair,
}

/// Static character → key legend → finger → colors table.
#[derive(Debug, Clone)]
pub struct FingerGuide {
    key_labels: HashMap<char, String>,
    fingers: HashMap<String, Finger>,
    colors: HashMap<Finger, ColorPair>,
}

impl FingerGuide {
    /// Builds a guide from explicit tables. Characters are looked up lowercased.
    pub fn new(
        key_labels: impl IntoIterator<Item = (char, String)>,
        finger_keys: impl IntoIterator<Item = (Finger, Vec<String>)>,
        colors: impl IntoIterator<Item = (Finger, ColorPair)>,
    ) -> Self {
        let fingers = finger_keys
            .into_iter()
            .flat_map(|(finger, labels)| labels.into_iter().map(move |l| (l, finger)))
            .collect();

        Self {
            key_labels: key_labels.into_iter().collect(),
            fingers,
            colors: colors.into_iter().collect(),
        }
    }

    /// Touch-typing assignment for a row-staggered QWERTY board.
    pub fn qwerty() -> Self {
        let letters = ('a'..='z').map(|c| (c, c.to_ascii_uppercase().to_string()));
        let punctuation = [',', '.', '-', '/'].into_iter().map(|c| (c, c.to_string()));

        let table: [(Finger, &[&str]); 8] = [
            (Finger::LeftPinky, &["Q", "A", "Z", "Tab", "Caps", "Shift"]),
            (Finger::LeftRing, &["W", "S", "X"]),
            (Finger::LeftMiddle, &["E", "D", "C"]),
            (Finger::LeftIndex, &["R", "F", "V", "T", "G", "B"]),
            (Finger::RightIndex, &["Y", "H", "N", "U", "J", "M"]),
            (Finger::RightMiddle, &["I", "K", ","]),
            (Finger::RightRing, &["O", "L", "."]),
            (Finger::RightPinky, &["P", "-", "Up", "BS", "Ent", "/"]),
        ];
        let finger_keys = table.into_iter().map(|(finger, labels)| {
            (finger, labels.iter().map(|l| l.to_string()).collect())
        });

        let colors = [
            (Finger::LeftPinky, RED),
            (Finger::LeftRing, YELLOW),
            (Finger::LeftMiddle, BLUE),
            (Finger::LeftIndex, GREEN),
            (Finger::RightIndex, GREEN),
            (Finger::RightMiddle, BLUE),
            (Finger::RightRing, YELLOW),
            (Finger::RightPinky, RED),
        ];

        Self::new(letters.chain(punctuation), finger_keys, colors)
    }

    pub fn key_label_for(&self, c: char) -> Option<&str> {
        let lower = c.to_lowercase().next().unwrap_or(c);
        self.key_labels.get(&lower).map(String::as_str)
    }

    pub fn finger_for_label(&self, label: &str) -> Option<Finger> {
        self.fingers.get(label).copied()
    }

    pub fn colors(&self, finger: Finger) -> Option<ColorPair> {
        self.colors.get(&finger).copied()
    }

    /// Resting colors for a key legend, if the key belongs to a finger.
    pub fn resting_colors(&self, label: &str) -> Option<ColorPair> {
        self.finger_for_label(label).and_then(|f| self.colors(f))
    }

    /// Key and finger to emphasize for `next`. Anything missing from the
    /// tables highlights nothing.
    pub fn highlight(&self, next: Option<char>) -> Option<Highlight> {
        let label = self.key_label_for(next?)?;
        let finger = self.finger_for_label(label)?;
        let colors = self.colors(finger)?;

        Some(Highlight {
            key_label: label.to_string(),
            finger,
            colors,
        })
    }
}

impl Default for FingerGuide {
    fn default() -> Self {
        Self::qwerty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_map_to_home_fingers() {
        let guide = FingerGuide::qwerty();

        let h = guide.highlight(Some('f')).unwrap();
        assert_eq!(h.key_label, "F");
        assert_eq!(h.finger, Finger::LeftIndex);
        assert_eq!(h.colors, GREEN);

        assert_eq!(guide.highlight(Some('p')).unwrap().finger, Finger::RightPinky);
        assert_eq!(guide.highlight(Some('k')).unwrap().finger, Finger::RightMiddle);
    }

    #[test]
    fn uppercase_uses_same_key() {
        let guide = FingerGuide::qwerty();
        assert_eq!(guide.highlight(Some('Q')).unwrap().key_label, "Q");
    }

    #[test]
    fn unmapped_characters_highlight_nothing() {
        let guide = FingerGuide::qwerty();
        assert_eq!(guide.highlight(Some('あ')), None);
        assert_eq!(guide.highlight(Some('7')), None);
        assert_eq!(guide.highlight(None), None);
    }

    #[test]
    fn label_without_finger_highlights_nothing() {
        let guide = FingerGuide::new(
            [('q', "Q".to_string())],
            Vec::<(Finger, Vec<String>)>::new(),
            [(Finger::LeftPinky, RED)],
        );
        assert_eq!(guide.key_label_for('q'), Some("Q"));
        assert_eq!(guide.highlight(Some('q')), None);
    }

    #[test]
    fn fingers_know_their_hand() {
        assert_eq!(Finger::LeftIndex.hand(), Hand::Left);
        assert_eq!(Finger::RightIndex.hand(), Hand::Right);
        assert_eq!(Finger::ALL.iter().filter(|f| f.hand() == Hand::Left).count(), 4);
    }

    #[test]
    fn finger_display_is_kebab_case() {
        assert_eq!(Finger::LeftPinky.to_string(), "left-pinky");
        assert_eq!(Finger::RightMiddle.to_string(), "right-middle");
    }

    #[test]
    fn mirrored_fingers_share_colors() {
        let guide = FingerGuide::qwerty();
        assert_eq!(
            guide.colors(Finger::LeftPinky),
            guide.colors(Finger::RightPinky)
        );
        assert_eq!(guide.resting_colors("Shift"), Some(RED));
        assert_eq!(guide.resting_colors("Space"), None);
    }
}
