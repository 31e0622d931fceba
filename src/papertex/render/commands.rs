//! Command and environment tables for the renderer
//!
//! Everything the renderer knows about a command by name lives here, so the
//! scanner only decides *how* a construct is shaped (argument, declaration,
//! environment) and looks up *what* it becomes.

use once_cell::sync::Lazy;
use regex::Regex;

/// One argument slot of a command that is dropped from the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    /// `[...]`, consumed when present.
    Optional,
    /// `{...}`, consumed when present; a missing one ends the command.
    Required,
}

use Arg::{Optional, Required};

/// Preamble and page-layout commands, removed with their arguments.
pub const REMOVED: &[(&str, &[Arg])] = &[
    ("documentclass", &[Optional, Required]),
    ("usepackage", &[Optional, Required]),
    ("pagestyle", &[Required]),
    ("thispagestyle", &[Required]),
    ("geometry", &[Required]),
    ("setlength", &[Required, Required]),
    ("maketitle", &[]),
    ("title", &[Optional, Required]),
    ("author", &[Optional, Required]),
    ("date", &[Required]),
    ("newpage", &[]),
    ("clearpage", &[]),
    ("noindent", &[]),
    ("centering", &[]),
    ("label", &[Required]),
];

/// Commands taking one argument that becomes an inline element.
pub const INLINE_STYLES: &[(&str, &str)] = &[
    ("textbf", "strong"),
    ("textit", "em"),
    ("emph", "em"),
    ("underline", "u"),
    ("texttt", "code"),
];

/// Old-style declarations that apply to the rest of the enclosing group.
pub const DECLARATIONS: &[(&str, &str)] = &[
    ("bf", "strong"),
    ("bfseries", "strong"),
    ("it", "em"),
    ("itshape", "em"),
    ("em", "em"),
    ("tt", "code"),
    ("ttfamily", "code"),
];

/// Font size commands and their relative CSS size.
pub const SIZES: &[(&str, &str)] = &[
    ("tiny", "0.5em"),
    ("scriptsize", "0.7em"),
    ("footnotesize", "0.8em"),
    ("small", "0.9em"),
    ("normalsize", "1em"),
    ("large", "1.2em"),
    ("Large", "1.44em"),
    ("LARGE", "1.728em"),
    ("huge", "2.074em"),
    ("Huge", "2.488em"),
];

pub const SECTIONS: &[(&str, &str)] = &[
    ("section", "h3"),
    ("subsection", "h4"),
    ("subsubsection", "h5"),
    ("paragraph", "h6"),
];

/// Vertical skips and their height.
pub const SKIPS: &[(&str, &str)] = &[
    ("bigskip", "1em"),
    ("medskip", "0.5em"),
    ("smallskip", "0.25em"),
];

/// Horizontal quads and their width.
pub const QUADS: &[(&str, &str)] = &[("quad", "1em"), ("qquad", "2em")];

/// Alignment environments and their `text-align` value.
pub const ALIGNMENTS: &[(&str, &str)] = &[
    ("center", "center"),
    ("flushleft", "left"),
    ("flushright", "right"),
];

/// Environments drawn as a bordered box.
pub const BOXED_ENVS: &[&str] = &["tcolorbox", "mdframed", "framed"];

/// Environments rendered as preformatted text.
pub const PREFORMATTED_ENVS: &[&str] = &["verbatim", "verbatim*", "lstlisting", "minted"];

/// Look `name` up in a two-column table.
pub fn lookup(table: &[(&'static str, &'static str)], name: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| *value)
}

/// Argument shape of a removed command.
pub fn removed_args(name: &str) -> Option<&'static [Arg]> {
    REMOVED
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, args)| *args)
}

/// Width used when a length cannot be translated.
const DEFAULT_LENGTH: &str = "1em";

static LENGTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-?(?:\d{1,6}(?:\.\d{0,4})?|\.\d{1,4}))[ \t]*(em|ex|pt|px|cm|mm|in|pc|%)$").unwrap()
});

static WIDTH_FRACTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{0,3}(?:\.\d{1,4})?)[ \t]*\\(?:text|line|column)width$").unwrap()
});

/// Translate a TeX length into a CSS length.
///
/// Absolute units pass through; a fraction of `\textwidth` or `\linewidth`
/// becomes a percentage. Anything else (glue, macros) falls back to `1em`,
/// which also keeps arbitrary text out of `style` attributes.
pub fn css_length(raw: &str) -> String {
    let raw = raw.trim();
    if let Some(caps) = LENGTH.captures(raw) {
        return format!("{}{}", &caps[1], &caps[2]);
    }
    if let Some(caps) = WIDTH_FRACTION.captures(raw) {
        let fraction = match &caps[1] {
            "" => 1.0,
            digits => digits.parse::<f64>().unwrap_or(1.0),
        };
        return format!("{}%", (fraction * 100.0).clamp(0.0, 100.0).round());
    }
    DEFAULT_LENGTH.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup(INLINE_STYLES, "emph"), Some("em"));
        assert_eq!(lookup(SIZES, "Large"), Some("1.44em"));
        assert_eq!(lookup(SIZES, "enormous"), None);
        assert_eq!(removed_args("setlength"), Some(&[Required, Required][..]));
    }

    #[test]
    fn test_css_length() {
        assert_eq!(css_length("2cm"), "2cm");
        assert_eq!(css_length(" 1.5em "), "1.5em");
        assert_eq!(css_length("-3pt"), "-3pt");
        assert_eq!(css_length(r"0.5\textwidth"), "50%");
        assert_eq!(css_length(r"\linewidth"), "100%");
        assert_eq!(css_length(r"\fill"), "1em");
        assert_eq!(css_length("1em\" onload=\"x"), "1em");
    }
}
