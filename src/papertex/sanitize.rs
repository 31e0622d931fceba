//! Sanitizer: make generated markup safe to hand to the compiler
//!
//! Generated papers mix real markup with prose that was never meant to be
//! typeset: `5%` silently comments out the rest of a line, `Q1_2024` fails
//! outside math mode, `______` is a fill-in blank. The sanitizer rewrites
//! those without touching anything the author meant literally.
//!
//! The work is a [`Transform`] chain over a [`Draft`]:
//!
//! 1. [`ProtectSpans`]: math, verbatim, comment lines, reference arguments and
//!    macro definitions are swapped for placeholder tokens.
//! 2. [`RewriteListOptions`]: legacy `\begin{enumerate}[(a)]` shorthand.
//! 3. [`EscapeReserved`]: `_ & % # ^` outside protected spans.
//! 4. [`CollapseBlankRuns`]: `__`, `\_\_\_` … become one sized blank.
//! 5. [`RestoreSpans`]: placeholders are replaced by their originals.
//! 6. [`EnsurePackages`]: `enumitem` is loaded when `label=` options are used.
//! 7. [`CheckBraces`]: advisory brace count, never repaired.
//!
//! No stage fails on any input. The result is idempotent: sanitizing already
//! sanitized text returns it unchanged.

pub mod stages;

use crate::papertex::config::PapertexConfig;
use crate::papertex::diagnostics::Warning;
use crate::papertex::observe::{null_observer, Event, Observer};
use crate::papertex::scan::MathKind;
use crate::papertex::transforms::Transform;
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::Arc;

pub use stages::{
    CheckBraces, CollapseBlankRuns, EnsurePackages, EscapeReserved, ProtectSpans,
    RestoreSpans, RewriteListOptions,
};

/// What a protected span contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    InlineMath,
    DisplayMath,
    Verbatim,
    CommentLine,
    /// Argument of `\label`, `\ref`, `\url`, `\includegraphics` and friends.
    Reference,
    /// A `\newcommand`/`\def` line.
    MacroDefinition,
}

impl fmt::Display for SpanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpanKind::InlineMath => "inline-math",
            SpanKind::DisplayMath => "display-math",
            SpanKind::Verbatim => "verbatim",
            SpanKind::CommentLine => "comment-line",
            SpanKind::Reference => "reference",
            SpanKind::MacroDefinition => "macro-definition",
        };
        f.write_str(name)
    }
}

impl From<MathKind> for SpanKind {
    fn from(kind: MathKind) -> Self {
        match kind {
            MathKind::Inline => SpanKind::InlineMath,
            MathKind::Display => SpanKind::DisplayMath,
        }
    }
}

/// One entry of the placeholder association list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedSpan {
    pub token: String,
    pub kind: SpanKind,
    pub original: String,
}

/// The value threaded through the sanitizer stages.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    pub text: String,
    /// Placeholder → original, in discovery order.
    pub spans: Vec<ProtectedSpan>,
    /// The private-use character placeholders are built from.
    pub marker: Option<char>,
    pub events: Vec<Event>,
    pub warnings: Vec<Warning>,
}

impl Draft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Record a warning both as a result and as an event.
    pub fn warn(&mut self, warning: Warning) {
        self.events.push(Event::Warning(warning.clone()));
        self.warnings.push(warning);
    }
}

/// Knobs for the sanitizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeOptions {
    /// Widest blank construct, in em.
    pub max_blank_em: usize,
    /// Load `enumitem` when `label=` list options are present.
    pub ensure_enumitem: bool,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            max_blank_em: 12,
            ensure_enumitem: true,
        }
    }
}

impl From<&PapertexConfig> for SanitizeOptions {
    fn from(config: &PapertexConfig) -> Self {
        Self {
            max_blank_em: config.sanitize.max_blank_em,
            ensure_enumitem: config.sanitize.ensure_enumitem,
        }
    }
}

/// Build the sanitizer stage chain for the given options.
pub fn pipeline(options: SanitizeOptions) -> Transform<String, Draft> {
    let chain = Transform::from_fn(|raw: String| Ok(Draft::new(raw)))
        .then(ProtectSpans::new())
        .then(RewriteListOptions::new())
        .then(EscapeReserved::new())
        .then(CollapseBlankRuns::new(options.max_blank_em))
        .then(RestoreSpans::new());
    let chain = if options.ensure_enumitem {
        chain.then(EnsurePackages::new())
    } else {
        chain
    };
    chain.then(CheckBraces::new())
}

/// The sanitizer chain with default options.
pub static STANDARD: Lazy<Transform<String, Draft>> =
    Lazy::new(|| pipeline(SanitizeOptions::default()));

/// Output of a sanitizer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    pub text: String,
    pub warnings: Vec<Warning>,
    /// How many spans were protected from rewriting.
    pub protected: usize,
}

/// Sanitizer with options and an observer.
pub struct Sanitizer {
    options: SanitizeOptions,
    custom: Option<Transform<String, Draft>>,
    observer: Arc<dyn Observer>,
}

impl Sanitizer {
    pub fn new() -> Self {
        Self {
            options: SanitizeOptions::default(),
            custom: None,
            observer: null_observer(),
        }
    }

    pub fn with_options(mut self, options: SanitizeOptions) -> Self {
        self.custom = (options != SanitizeOptions::default()).then(|| pipeline(options));
        self.options = options;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub fn options(&self) -> SanitizeOptions {
        self.options
    }

    /// Sanitize `raw`. Never fails; problems are reported as warnings.
    pub fn run(&self, raw: &str) -> Sanitized {
        let transform = self.custom.as_ref().unwrap_or(&*STANDARD);
        let draft = match transform.run(raw.to_string()) {
            Ok(draft) => draft,
            Err(err) => {
                let warning = Warning::StageFailed(err.to_string());
                self.observer.on_event(&Event::Warning(warning.clone()));
                return Sanitized {
                    text: raw.to_string(),
                    warnings: vec![warning],
                    protected: 0,
                };
            }
        };
        for event in &draft.events {
            self.observer.on_event(event);
        }
        Sanitized {
            text: draft.text,
            warnings: draft.warnings,
            protected: draft.spans.len(),
        }
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Sanitize with default options, discarding warnings.
pub fn sanitize(raw: &str) -> String {
    STANDARD
        .run(raw.to_string())
        .map(|draft| draft.text)
        .unwrap_or_else(|_| raw.to_string())
}
