//! Label templates and prompt parsing
//!
//! Templates provide the label sequence a clip is illustrated with: the alphabet, the
//! numbers 1-20 or ten named colors, each repeated to the wanted number of events.

use serde::Serialize;

/// Named colors of the colors template with their swatches
const COLORS: [(&str, [u8; 3]); 10] = [
    ("RED", [0xFF, 0x3B, 0x30]),
    ("ORANGE", [0xFF, 0x95, 0x00]),
    ("YELLOW", [0xFF, 0xCC, 0x00]),
    ("GREEN", [0x34, 0xC7, 0x59]),
    ("BLUE", [0x00, 0x7A, 0xFF]),
    ("PURPLE", [0xAF, 0x52, 0xDE]),
    ("PINK", [0xFF, 0x2D, 0x55]),
    ("BROWN", [0xA2, 0x84, 0x5E]),
    ("BLACK", [0x11, 0x11, 0x11]),
    ("WHITE", [0xFF, 0xFF, 0xFF]),
];

/// Animal captions of the alphabet placeholders
const ALPHABET_ANIMALS: [(&str, &str); 3] = [("A", "Alligator"), ("B", "Bear"), ("C", "Cat")];

/// Labels of the default three-event alphabet clip
pub const DEFAULT_LABELS: [&str; 3] = ["A", "B", "C"];

/// A label sequence to illustrate a clip with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongTemplate {
    /// Short identifier (`abc`, `numbers`, `colors`)
    pub key: &'static str,
    /// Human readable title
    pub title: &'static str,
    /// Labels in display order
    pub tokens: Vec<String>,
    /// Swatch per token, same length as `tokens` (colors template only)
    pub token_colors: Option<Vec<[u8; 3]>>,
}

/// Repeat `base` cyclically until it is `target_len` long
pub fn repeat_to_length<T: Clone>(base: &[T], target_len: usize) -> Vec<T> {
    if base.is_empty() {
        return Vec::new();
    }
    base.iter().cycle().take(target_len).cloned().collect()
}

/// All built-in templates, each `target_events` tokens long
pub fn templates(target_events: usize) -> Vec<SongTemplate> {
    let alphabet: Vec<String> = ('A'..='Z').map(String::from).collect();
    let numbers: Vec<String> = (1..=20).map(|n| n.to_string()).collect();
    let colors: Vec<String> = COLORS.iter().map(|(name, _)| name.to_string()).collect();
    let swatches: Vec<[u8; 3]> = COLORS.iter().map(|(_, rgb)| *rgb).collect();

    vec![
        SongTemplate {
            key: "abc",
            title: "ABC Song",
            tokens: repeat_to_length(&alphabet, target_events),
            token_colors: None,
        },
        SongTemplate {
            key: "numbers",
            title: "Numbers Song",
            tokens: repeat_to_length(&numbers, target_events),
            token_colors: None,
        },
        SongTemplate {
            key: "colors",
            title: "Colors Song",
            tokens: repeat_to_length(&colors, target_events),
            token_colors: Some(repeat_to_length(&swatches, target_events)),
        },
    ]
}

/// Template with the given key, falling back to the alphabet template
pub fn template_by_key(key: &str, target_events: usize) -> SongTemplate {
    let mut all = templates(target_events);
    match all.iter().position(|t| t.key == key) {
        Some(idx) => all.swap_remove(idx),
        None => {
            log::warn!("Unknown template {:?}, using abc", key);
            all.swap_remove(0)
        }
    }
}

/// Swatch of a named color label (case-insensitive)
pub fn color_swatch(label: &str) -> Option<[u8; 3]> {
    COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(label.trim()))
        .map(|(_, rgb)| *rgb)
}

/// Caption shown under a label's placeholder card, if the label has one
pub fn caption_for(label: &str) -> Option<&'static str> {
    ALPHABET_ANIMALS
        .iter()
        .find(|(letter, _)| letter.eq_ignore_ascii_case(label.trim()))
        .map(|(_, animal)| *animal)
}

/// Kind of a parsed prompt unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelKind {
    /// A single alphabetic character
    Letter,
    /// Digits only
    Number,
    /// Anything else
    Word,
}

/// One label parsed from a prompt line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelUnit {
    /// Normalized text (letters and words upper-cased)
    pub text: String,
    /// What the text is
    pub kind: LabelKind,
}

/// Turn free-form prompt lines into labels
///
/// Blank lines are skipped; surrounding whitespace is trimmed.
pub fn parse_prompt_lines<S: AsRef<str>>(lines: &[S]) -> Vec<LabelUnit> {
    lines
        .iter()
        .filter_map(|line| {
            let text = line.as_ref().trim();
            if text.is_empty() {
                return None;
            }
            let mut chars = text.chars();
            let single_letter = matches!(
                (chars.next(), chars.next()),
                (Some(c), None) if c.is_alphabetic()
            );
            let unit = if single_letter {
                LabelUnit {
                    text: text.to_uppercase(),
                    kind: LabelKind::Letter,
                }
            } else if text.chars().all(|c| c.is_ascii_digit()) {
                LabelUnit {
                    text: text.to_string(),
                    kind: LabelKind::Number,
                }
            } else {
                LabelUnit {
                    text: text.to_uppercase(),
                    kind: LabelKind::Word,
                }
            };
            Some(unit)
        })
        .collect()
}
