//! Read-mode configurations
//!
//! Every read mode runs the same [`InputSession`](super::InputSession); the
//! modes only differ in the [`ReadConfig`] they build.

use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};

use super::{ReadError, Result};

/// Fixed-width input field at a screen position (1-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub line: u8,
    pub column: u8,
    pub length: u8,
}

/// What to do with a key outside the allow-list during key capture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrayKeyPolicy {
    /// Erase the echoed key, beep, keep reading
    #[default]
    Beep,
    /// Erase the echoed key, beep, end the read with an error
    Reject,
}

/// Configuration of one read call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadConfig {
    /// Bounded field; `None` reads free-form at the cursor
    pub field: Option<Field>,
    /// Bytes that end the read immediately
    pub quick: Vec<u8>,
    /// Only quick characters are acceptable printable input
    pub allow_only: bool,
    pub stray: StrayKeyPolicy,
}

impl ReadConfig {
    /// Bounded line input at a fixed position
    pub fn line(line: u8, column: u8, length: u8) -> Self {
        Self {
            field: Some(Field { line, column, length }),
            ..Self::default()
        }
    }

    /// Unbounded input at the current cursor
    pub fn free() -> Self {
        Self::default()
    }

    /// Single-keystroke capture
    pub fn keys(allowed: &[u8], stray: StrayKeyPolicy) -> Self {
        Self {
            field: None,
            quick: allowed.to_vec(),
            allow_only: true,
            stray,
        }
    }

    pub fn with_quick(mut self, quick: &[u8]) -> Self {
        self.quick = quick.to_vec();
        self
    }
}

/// An option of a multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// How a multiple-choice answer is captured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceInput {
    /// Free-form line; single-digit indices also work as quick characters
    Free,
    /// Single keystroke among the option indices
    Key,
}

/// Option indices that can be typed as a single key ('1'..='9').
pub fn index_keys(count: usize) -> Vec<u8> {
    (1..=count.min(9)).map(|i| b'0' + i as u8).collect()
}

/// Quick characters for a free-form answer.
///
/// With ten options or more a leading digit may start a longer index, so
/// every answer has to be confirmed.
pub fn quick_keys(count: usize) -> Vec<u8> {
    if count <= 9 {
        index_keys(count)
    } else {
        Vec::new()
    }
}

/// Resolve a captured answer against the option list.
///
/// A 1-based index selects that option. Text that is not a number becomes a
/// synthetic choice when the answer was typed free-form.
pub fn resolve_choice(options: &[Choice], text: &str, input: ChoiceInput) -> Result<Choice> {
    let trimmed = text.trim();
    match trimmed.parse::<i64>() {
        Ok(index) if index >= 1 && (index as u64) <= options.len() as u64 => {
            Ok(options[(index - 1) as usize].clone())
        }
        // Too large for i64 is still a number, just out of range
        Err(e)
            if input == ChoiceInput::Free
                && !matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) =>
        {
            Ok(Choice::new(text, text))
        }
        _ => Err(ReadError::InvalidChoice {
            input: text.to_string(),
            count: options.len(),
        }),
    }
}
