//! Byte-level scanning helpers shared by the sanitizer, extractor and renderer.
//!
//! Every delimiter these helpers look for is ASCII, and ASCII bytes never occur
//! inside a multi-byte UTF-8 sequence, so slicing the source at any index they
//! return always lands on a char boundary.
//!
//! Nothing here recurses and nothing rescans the same input twice: closing
//! delimiters are found through [`Finder`], which remembers its last answer per
//! pattern, and brace pairs come from a single pass in [`BraceMap`]. That keeps
//! adversarial input (thousands of unterminated `\[` or `{`) linear.

use std::collections::HashMap;

/// Environments whose body is display math and must never be rewritten.
pub const DISPLAY_MATH_ENVS: &[&str] = &[
    "equation",
    "equation*",
    "align",
    "align*",
    "alignat",
    "alignat*",
    "flalign",
    "flalign*",
    "gather",
    "gather*",
    "multline",
    "multline*",
    "eqnarray",
    "eqnarray*",
    "displaymath",
    "math",
];

/// Environments whose body is taken literally by the compiler.
pub const VERBATIM_ENVS: &[&str] = &["verbatim", "verbatim*", "lstlisting", "minted", "comment"];

/// Longest environment name we are willing to read after `\begin{`.
const MAX_ENV_NAME: usize = 32;

/// Longest optional `[...]` argument we are willing to scan for.
pub const MAX_OPTION_LEN: usize = 200;

/// Number of consecutive backslashes immediately before `idx`.
pub fn preceding_backslashes(bytes: &[u8], idx: usize) -> usize {
    bytes[..idx.min(bytes.len())]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count()
}

/// True when the byte at `idx` is escaped by an odd run of backslashes.
pub fn is_escaped(bytes: &[u8], idx: usize) -> bool {
    preceding_backslashes(bytes, idx) % 2 == 1
}

/// Read the control word or control symbol whose backslash sits at `idx`.
///
/// Returns the name (without the backslash) and the index just past it. A
/// trailing lone backslash yields an empty name.
pub fn command_name(src: &str, idx: usize) -> (&str, usize) {
    let bytes = src.as_bytes();
    let start = idx + 1;
    if start >= bytes.len() {
        return ("", bytes.len());
    }
    let letters = bytes[start..]
        .iter()
        .take_while(|b| b.is_ascii_alphabetic())
        .count();
    if letters > 0 {
        return (&src[start..start + letters], start + letters);
    }
    match src[start..].chars().next() {
        Some(ch) => (&src[start..start + ch.len_utf8()], start + ch.len_utf8()),
        None => ("", bytes.len()),
    }
}

/// Skip spaces and tabs starting at `idx`.
pub fn skip_blanks(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() && matches!(bytes[idx], b' ' | b'\t') {
        idx += 1;
    }
    idx
}

/// Skip spaces, tabs and at most one newline, the way TeX looks for an argument.
pub fn skip_arg_space(bytes: &[u8], idx: usize) -> usize {
    let idx = skip_blanks(bytes, idx);
    if bytes.get(idx) == Some(&b'\n') {
        skip_blanks(bytes, idx + 1)
    } else {
        idx
    }
}

/// Read `{name}` at `idx` (as after `\begin`), returning the name and the index past `}`.
pub fn env_name(src: &str, idx: usize) -> Option<(&str, usize)> {
    let bytes = src.as_bytes();
    if bytes.get(idx) != Some(&b'{') {
        return None;
    }
    let len = bytes[idx + 1..]
        .iter()
        .take(MAX_ENV_NAME + 1)
        .take_while(|b| b.is_ascii_alphabetic() || **b == b'*')
        .count();
    if len == 0 || len > MAX_ENV_NAME || bytes.get(idx + 1 + len) != Some(&b'}') {
        return None;
    }
    Some((&src[idx + 1..idx + 1 + len], idx + len + 2))
}

/// Find the `]` closing the optional argument opened at `open`.
///
/// Brackets inside braces do not count. Gives up after [`MAX_OPTION_LEN`] bytes.
pub fn matching_bracket(bytes: &[u8], open: usize) -> Option<usize> {
    if bytes.get(open) != Some(&b'[') {
        return None;
    }
    let limit = (open + MAX_OPTION_LEN).min(bytes.len());
    let mut braces = 0usize;
    let mut i = open + 1;
    while i < limit {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'{' => braces += 1,
            b'}' => braces = braces.saturating_sub(1),
            b']' if braces == 0 => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Positions of matching unescaped brace pairs, computed in one pass.
#[derive(Debug, Default, Clone)]
pub struct BraceMap {
    close_of: HashMap<usize, usize>,
}

impl BraceMap {
    pub fn new(src: &str) -> Self {
        let bytes = src.as_bytes();
        let mut close_of = HashMap::new();
        let mut stack = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => {
                    i += 2;
                    continue;
                }
                b'{' => stack.push(i),
                b'}' => {
                    if let Some(open) = stack.pop() {
                        close_of.insert(open, i);
                    }
                }
                _ => {}
            }
            i += 1;
        }
        Self { close_of }
    }

    /// Index of the `}` matching the `{` at `open`, if any.
    pub fn close(&self, open: usize) -> Option<usize> {
        self.close_of.get(&open).copied()
    }
}

/// Forward search for unescaped delimiters with a per-pattern memo.
///
/// A search from `from` for `pat` returns the first unescaped occurrence at or
/// after `from`. The last answer per pattern is remembered, so repeated
/// searches for a delimiter that never appears cost one scan in total.
#[derive(Debug)]
pub struct Finder<'a> {
    src: &'a str,
    memo: HashMap<String, (usize, Option<usize>)>,
}

impl<'a> Finder<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            memo: HashMap::new(),
        }
    }

    pub fn next(&mut self, pat: &str, from: usize) -> Option<usize> {
        if let Some(&(searched_from, found)) = self.memo.get(pat) {
            if searched_from <= from {
                match found {
                    None => return None,
                    Some(at) if at >= from => return Some(at),
                    Some(_) => {}
                }
            }
        }
        let found = find_unescaped(self.src, from, pat);
        self.memo.insert(pat.to_string(), (from, found));
        found
    }

    /// Find `\end{name}`, returning the start of the tag and the index past it.
    pub fn env_end(&mut self, name: &str, from: usize) -> Option<(usize, usize)> {
        let tag = format!("\\end{{{name}}}");
        let at = self.next(&tag, from)?;
        Some((at, at + tag.len()))
    }
}

/// First occurrence of `pat` at or after `from` whose first byte is not escaped.
pub fn find_unescaped(src: &str, from: usize, pat: &str) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut start = from;
    while start < src.len() {
        let at = start + src.get(start..)?.find(pat)?;
        if !is_escaped(bytes, at) {
            return Some(at);
        }
        start = at + 1;
    }
    None
}

/// True when `text` contains an empty (or whitespace-only) line.
pub fn has_blank_line(text: &str) -> bool {
    let lines: Vec<&str> = text.split('\n').collect();
    // only lines strictly between two newlines count
    lines.len() > 2 && lines[1..lines.len() - 1].iter().any(|l| l.trim().is_empty())
}

/// The kind of math span opening at `idx`, and the index just past its end.
///
/// Recognizes `$..$`, `$$..$$`, `\(..\)`, `\[..\]` and the display
/// environments in [`DISPLAY_MATH_ENVS`]. Inline `$..$` may not cross a blank
/// line. The opener at `idx` is assumed unescaped.
pub fn math_span_at(src: &str, idx: usize, finder: &mut Finder<'_>) -> Option<(MathKind, usize)> {
    let bytes = src.as_bytes();
    match bytes.get(idx)? {
        b'$' if bytes.get(idx + 1) == Some(&b'$') => {
            let close = finder.next("$$", idx + 2)?;
            Some((MathKind::Display, close + 2))
        }
        b'$' => {
            let close = finder.next("$", idx + 1)?;
            if has_blank_line(&src[idx + 1..close]) {
                return None;
            }
            Some((MathKind::Inline, close + 1))
        }
        b'\\' => match bytes.get(idx + 1)? {
            b'[' => {
                let close = finder.next("\\]", idx + 2)?;
                Some((MathKind::Display, close + 2))
            }
            b'(' => {
                let close = finder.next("\\)", idx + 2)?;
                Some((MathKind::Inline, close + 2))
            }
            _ => {
                let (name, after) = command_name(src, idx);
                if name != "begin" {
                    return None;
                }
                let (env, body) = env_name(src, after)?;
                if !DISPLAY_MATH_ENVS.contains(&env) {
                    return None;
                }
                let (_, end) = finder.env_end(env, body)?;
                Some((MathKind::Display, end))
            }
        },
        _ => None,
    }
}

/// Inline versus display math.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathKind {
    Inline,
    Display,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_escape_parity() {
        let bytes = br"a\_b\\_c";
        assert!(is_escaped(bytes, 2));
        assert!(!is_escaped(bytes, 6));
    }

    #[test]
    fn reads_command_names() {
        assert_eq!(command_name(r"\textbf{x}", 0), ("textbf", 7));
        assert_eq!(command_name(r"\_", 0), ("_", 2));
        assert_eq!(command_name(r"\\[2pt]", 0), ("\\", 2));
        assert_eq!(command_name("\\", 0), ("", 1));
        assert_eq!(command_name("\\é", 0), ("é", 3));
    }

    #[test]
    fn reads_environment_names() {
        let src = r"\begin{align*}x\end{align*}";
        assert_eq!(env_name(src, 6), Some(("align*", 14)));
        assert_eq!(env_name(r"\begin{}", 6), None);
        assert_eq!(env_name(r"\begin{a b}", 6), None);
    }

    #[test]
    fn matches_braces_in_one_pass() {
        let src = r"\textbf{a {b} \} c}{";
        let map = BraceMap::new(src);
        assert_eq!(map.close(7), Some(18));
        assert_eq!(map.close(10), Some(12));
        assert_eq!(map.close(19), None);
    }

    #[test]
    fn brackets_ignore_nested_braces() {
        let bytes = b"[label={]}]x";
        assert_eq!(matching_bracket(bytes, 0), Some(10));
        assert_eq!(matching_bracket(b"[never closed", 0), None);
    }

    #[test]
    fn finder_skips_escaped_delimiters() {
        let src = r"a \$ b $ c";
        let mut finder = Finder::new(src);
        assert_eq!(finder.next("$", 0), Some(7));
        assert_eq!(finder.next("$", 8), None);
        // memoized miss stays a miss
        assert_eq!(finder.next("$", 9), None);
    }

    #[test]
    fn detects_blank_lines() {
        assert!(has_blank_line("a\n\nb"));
        assert!(has_blank_line("a\n  \nb"));
        assert!(!has_blank_line("a\nb"));
        assert!(!has_blank_line("a b"));
    }

    #[test]
    fn recognizes_math_openers() {
        let src = r"$x$ $$y$$ \[z\] \(w\) \begin{align}a\end{align}";
        let mut finder = Finder::new(src);
        assert_eq!(math_span_at(src, 0, &mut finder), Some((MathKind::Inline, 3)));
        assert_eq!(math_span_at(src, 4, &mut finder), Some((MathKind::Display, 9)));
        assert_eq!(math_span_at(src, 10, &mut finder), Some((MathKind::Display, 15)));
        assert_eq!(math_span_at(src, 16, &mut finder), Some((MathKind::Inline, 21)));
        assert_eq!(
            math_span_at(src, 22, &mut finder),
            Some((MathKind::Display, src.len()))
        );
    }

    #[test]
    fn inline_math_does_not_cross_paragraphs() {
        let src = "costs $5\n\nand $";
        let mut finder = Finder::new(src);
        assert_eq!(math_span_at(src, 6, &mut finder), None);
    }
}
