//! Reserved character escaping
//!
//! Outside protected spans the characters `_ & % # ^` are prose, not markup:
//!
//! | input | output     |
//! |-------|------------|
//! | `_`   | `\_`       |
//! | `&`   | `\&`       |
//! | `#`   | `\#`       |
//! | `^`   | `\^{}`     |
//! | `%`   | `\%`       |
//! | `% `  | `\%\ `     |
//!
//! A character is already escaped when an odd number of backslashes precedes
//! it. `&` is left alone inside alignment environments, where it separates
//! columns.

use crate::papertex::sanitize::Draft;
use crate::papertex::scan::{is_escaped, Finder};
use crate::papertex::transforms::{Runnable, TransformError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static ALIGNMENT_ENV: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\begin\{(tabular\*?|tabularx|longtable|array)\}").unwrap()
});

/// Escape reserved characters in unprotected text.
pub struct EscapeReserved;

impl EscapeReserved {
    pub fn new() -> Self {
        EscapeReserved
    }
}

impl Default for EscapeReserved {
    fn default() -> Self {
        Self::new()
    }
}

impl Runnable<Draft, Draft> for EscapeReserved {
    fn run(&self, mut draft: Draft) -> Result<Draft, TransformError> {
        draft.text = escape_reserved(&draft.text);
        Ok(draft)
    }
}

/// Escape every unescaped reserved character in `text`.
pub fn escape_reserved(text: &str) -> String {
    let bytes = text.as_bytes();
    let columns = alignment_ranges(text);
    let mut cursor = 0;
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    let mut last = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if !matches!(b, b'_' | b'&' | b'%' | b'#' | b'^') || is_escaped(bytes, i) {
            i += 1;
            continue;
        }
        if b == b'&' {
            while cursor < columns.len() && columns[cursor].end <= i {
                cursor += 1;
            }
            if cursor < columns.len() && columns[cursor].start <= i {
                i += 1;
                continue;
            }
        }
        out.push_str(&text[last..i]);
        match b {
            b'^' => out.push_str("\\^{}"),
            b'%' if bytes.get(i + 1) == Some(&b' ') => {
                out.push_str("\\%\\ ");
                i += 2;
                last = i;
                continue;
            }
            _ => {
                out.push('\\');
                out.push(b as char);
            }
        }
        i += 1;
        last = i;
    }
    out.push_str(&text[last..]);
    out
}

/// Byte ranges of terminated alignment environments, sorted by start.
fn alignment_ranges(text: &str) -> Vec<Range<usize>> {
    let mut finder = Finder::new(text);
    ALIGNMENT_ENV
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let (_, end) = finder.env_end(&caps[1], whole.end())?;
            Some(whole.start()..end)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_each_reserved_character() {
        assert_eq!(escape_reserved("a_b"), r"a\_b");
        assert_eq!(escape_reserved("R&D"), r"R\&D");
        assert_eq!(escape_reserved("#1"), r"\#1");
        assert_eq!(escape_reserved("x^2"), r"x\^{}2");
        assert_eq!(escape_reserved("50%"), r"50\%");
        assert_eq!(escape_reserved("5% off"), r"5\%\ off");
    }

    #[test]
    fn test_already_escaped_is_untouched() {
        let escaped = r"a\_b \& c \%\ d \#e \^{}f";
        assert_eq!(escape_reserved(escaped), escaped);
    }

    #[test]
    fn test_line_break_does_not_escape() {
        // `\\` is a line break, so the underscore after it is bare
        assert_eq!(escape_reserved(r"a\\_b"), r"a\\\_b");
    }

    #[test]
    fn test_alignment_ampersands_survive() {
        let src = "\\begin{tabular}{ll}\na & b \\\\\n\\end{tabular} R&D";
        assert_eq!(
            escape_reserved(src),
            "\\begin{tabular}{ll}\na & b \\\\\n\\end{tabular} R\\&D"
        );
    }

    #[test]
    fn test_unterminated_table_is_escaped() {
        assert_eq!(escape_reserved(r"\begin{tabular}{l} a & b"), r"\begin{tabular}{l} a \& b");
    }

    #[test]
    fn test_multibyte_text_is_preserved() {
        assert_eq!(escape_reserved("café_au_lait"), r"café\_au\_lait");
    }
}
