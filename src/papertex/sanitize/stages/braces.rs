//! Advisory brace balance check
//!
//! Counts unescaped `{` and `}` outside comment lines. A mismatch is reported
//! as a warning; the text is never repaired, since guessing where a brace was
//! meant to go does more harm than the compiler's own error.

use crate::papertex::diagnostics::Warning;
use crate::papertex::sanitize::Draft;
use crate::papertex::transforms::{Runnable, TransformError};

/// Warn when braces do not balance.
pub struct CheckBraces;

impl CheckBraces {
    pub fn new() -> Self {
        CheckBraces
    }
}

impl Default for CheckBraces {
    fn default() -> Self {
        Self::new()
    }
}

impl Runnable<Draft, Draft> for CheckBraces {
    fn run(&self, mut draft: Draft) -> Result<Draft, TransformError> {
        let (opens, closes) = count_braces(&draft.text);
        if opens != closes {
            draft.warn(Warning::UnbalancedBraces { opens, closes });
        }
        Ok(draft)
    }
}

/// Unescaped `(opening, closing)` brace counts, skipping comment lines.
pub fn count_braces(text: &str) -> (usize, usize) {
    let mut opens = 0;
    let mut closes = 0;
    for line in text.lines() {
        if line.trim_start().starts_with('%') {
            continue;
        }
        let bytes = line.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 1,
                b'{' => opens += 1,
                b'}' => closes += 1,
                _ => {}
            }
            i += 1;
        }
    }
    (opens, closes)
}
