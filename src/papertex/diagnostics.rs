//! Non-fatal warnings and compiler-log hints
//!
//! Two unrelated kinds of diagnostics live here:
//!
//! - [`Warning`]: problems the sanitizer noticed in its input but worked around
//!   (it never fails, it only warns).
//! - [`CompileHint`]: a user-facing explanation picked from the log of the
//!   external compiler after a failed run. The compiler is authoritative on
//!   correctness; we only recognize a few well-known failure signatures.

use crate::papertex::config::PapertexConfig;
use crate::papertex::sanitize::SpanKind;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// A problem found in the input that did not stop processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Unescaped `{` and `}` counts differ.
    UnbalancedBraces { opens: usize, closes: usize },
    /// A protected span could not be put back and was lost.
    UnrestoredSpan { kind: SpanKind },
    /// Every placeholder marker already occurs in the input, so nothing could be protected.
    PlaceholderUnavailable,
    /// A sanitizer stage failed and the input was returned unchanged.
    StageFailed(String),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnbalancedBraces { opens, closes } => write!(
                f,
                "unbalanced braces: {} opening vs {} closing",
                opens, closes
            ),
            Warning::UnrestoredSpan { kind } => {
                write!(f, "a protected {} span could not be restored", kind)
            }
            Warning::PlaceholderUnavailable => {
                write!(f, "no free placeholder marker; spans left unprotected")
            }
            Warning::StageFailed(message) => write!(f, "sanitizer stage failed: {}", message),
        }
    }
}

/// Known compiler failure signatures, in the order they are documented.
const SIGNATURES: &[(&str, HintKind)] = &[
    ("Missing $ inserted", HintKind::MathMode),
    ("Undefined control sequence", HintKind::UndefinedCommand),
    ("! Package", HintKind::MissingPackage),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HintKind {
    MathMode,
    UndefinedCommand,
    MissingPackage,
}

static LINE_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^l\.(\d{1,9})").unwrap());

/// What most likely went wrong in a failed compile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompileHint {
    /// Math-only syntax outside math mode (or the reverse).
    MathMode,
    /// A command the compiler does not know.
    UndefinedCommand,
    /// A package failed to load or is not installed.
    MissingPackage,
    /// Anything else, with the tail of the log.
    Generic { excerpt: String },
}

impl CompileHint {
    /// The message shown to the user.
    pub fn message(&self) -> String {
        match self {
            CompileHint::MathMode => {
                "A math expression is malformed or a math symbol was used outside math mode."
                    .to_string()
            }
            CompileHint::UndefinedCommand => {
                "The document uses a command that does not exist.".to_string()
            }
            CompileHint::MissingPackage => {
                "A required package is missing or failed to load.".to_string()
            }
            CompileHint::Generic { excerpt } => format!("Compilation failed:\n{}", excerpt),
        }
    }
}

/// A hint plus the first `l.<n>` line reference found in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileDiagnosis {
    pub hint: CompileHint,
    pub line: Option<u32>,
}

/// Options for [`diagnose_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnoseOptions {
    /// How many trailing characters of the log a generic hint keeps.
    pub max_log_chars: usize,
}

impl Default for DiagnoseOptions {
    fn default() -> Self {
        Self { max_log_chars: 500 }
    }
}

impl From<&PapertexConfig> for DiagnoseOptions {
    fn from(config: &PapertexConfig) -> Self {
        Self {
            max_log_chars: config.diagnostics.max_log_chars,
        }
    }
}

/// Pick a hint for a compiler log using the default options.
pub fn diagnose(log: &str) -> CompileDiagnosis {
    diagnose_with(log, DiagnoseOptions::default())
}

/// Pick a hint for a compiler log.
///
/// When several signatures occur, the one appearing first in the log wins:
/// later errors are usually knock-on effects of the first.
pub fn diagnose_with(log: &str, options: DiagnoseOptions) -> CompileDiagnosis {
    let found = SIGNATURES
        .iter()
        .filter_map(|(needle, kind)| log.find(needle).map(|at| (at, *kind)))
        .min_by_key(|(at, _)| *at)
        .map(|(_, kind)| kind);

    let hint = match found {
        Some(HintKind::MathMode) => CompileHint::MathMode,
        Some(HintKind::UndefinedCommand) => CompileHint::UndefinedCommand,
        Some(HintKind::MissingPackage) => CompileHint::MissingPackage,
        None => CompileHint::Generic {
            excerpt: tail(log, options.max_log_chars),
        },
    };
    let line = LINE_REF
        .captures(log)
        .and_then(|caps| caps[1].parse().ok());

    CompileDiagnosis { hint, line }
}

/// The last `max` characters of `log`, marked when something was cut.
fn tail(log: &str, max: usize) -> String {
    let log = log.trim_end();
    let count = log.chars().count();
    if count <= max {
        return log.to_string();
    }
    let kept: String = log.chars().skip(count - max).collect();
    format!("…{}", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_signatures() {
        assert_eq!(
            diagnose("! Missing $ inserted.\n<inserted text>").hint,
            CompileHint::MathMode
        );
        assert_eq!(
            diagnose("! Undefined control sequence.\nl.12 \\foo").hint,
            CompileHint::UndefinedCommand
        );
        assert_eq!(
            diagnose("! Package inputenc Error: bad").hint,
            CompileHint::MissingPackage
        );
    }

    #[test]
    fn unlisted_errors_are_generic() {
        let log = "! LaTeX Error: File `tikzz.sty' not found.\n";
        assert_eq!(
            diagnose(log).hint,
            CompileHint::Generic {
                excerpt: "! LaTeX Error: File `tikzz.sty' not found.".to_string()
            }
        );
    }

    #[test]
    fn earliest_signature_wins() {
        let log = "! Undefined control sequence.\n...\n! Missing $ inserted.";
        assert_eq!(diagnose(log).hint, CompileHint::UndefinedCommand);
    }

    #[test]
    fn reports_line_reference() {
        let log = "! Undefined control sequence.\nl.42 \\badmacro\n";
        assert_eq!(diagnose(log).line, Some(42));
        assert_eq!(diagnose("nothing useful").line, None);
    }

    #[test]
    fn generic_hint_keeps_the_tail() {
        let log = format!("{}END", "x".repeat(1000));
        let diagnosis = diagnose_with(&log, DiagnoseOptions { max_log_chars: 10 });
        match diagnosis.hint {
            CompileHint::Generic { excerpt } => {
                assert_eq!(excerpt, "…xxxxxxxEND");
            }
            other => panic!("expected generic hint, got {:?}", other),
        }
    }

    #[test]
    fn generic_hint_is_char_boundary_safe() {
        let log = "é".repeat(20);
        let diagnosis = diagnose_with(&log, DiagnoseOptions { max_log_chars: 3 });
        assert_eq!(
            diagnosis.hint,
            CompileHint::Generic {
                excerpt: "…ééé".to_string()
            }
        );
    }

    #[test]
    fn messages_are_user_facing() {
        assert!(CompileHint::MathMode.message().contains("math"));
        let generic = CompileHint::Generic {
            excerpt: "boom".to_string(),
        };
        assert!(generic.message().ends_with("boom"));
    }

    #[test]
    fn warnings_display() {
        let warning = Warning::UnbalancedBraces { opens: 3, closes: 2 };
        assert_eq!(
            warning.to_string(),
            "unbalanced braces: 3 opening vs 2 closing"
        );
    }
}
