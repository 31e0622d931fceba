//! Placeholder protection and restoration
//!
//! [`ProtectSpans`] swaps every region that must survive rewriting untouched
//! for a token `⟨m⟩N⟨m⟩`, where `⟨m⟩` is a private-use character that does not
//! occur anywhere in the input and `N` is the span's index. [`RestoreSpans`]
//! puts the originals back once the rewriting stages are done.
//!
//! Protected regions, found in one left-to-right scan:
//!
//! - inline math `$..$`, `\(..\)`; display math `$$..$$`, `\[..\]` and the
//!   display environments
//! - verbatim environments and `\verb|..|`
//! - comment lines (first non-blank character `%`)
//! - the argument of reference-like commands (`\label`, `\ref`, `\url`, …)
//! - macro-definition lines (`\newcommand`, `\def`, …)

use crate::papertex::diagnostics::Warning;
use crate::papertex::observe::Event;
use crate::papertex::sanitize::{Draft, ProtectedSpan, SpanKind};
use crate::papertex::scan::{
    command_name, env_name, math_span_at, matching_bracket, skip_blanks, BraceMap, Finder,
    VERBATIM_ENVS,
};
use crate::papertex::transforms::{Runnable, TransformError};
use std::collections::HashSet;
use std::ops::Range;

/// Commands whose (first) braced argument is an identifier, path or URL.
const REFERENCE_COMMANDS: &[&str] = &[
    "label",
    "ref",
    "eqref",
    "pageref",
    "autoref",
    "cref",
    "Cref",
    "cite",
    "citep",
    "citet",
    "url",
    "href",
    "hyperref",
    "includegraphics",
    "input",
    "include",
    "usepackage",
    "documentclass",
    "bibliography",
    "bibliographystyle",
];

/// Commands that start a macro-definition line.
const DEFINITION_COMMANDS: &[&str] = &[
    "newcommand",
    "renewcommand",
    "providecommand",
    "newenvironment",
    "renewenvironment",
    "DeclareMathOperator",
    "def",
    "gdef",
    "edef",
    "xdef",
    "let",
];

/// Longest macro definition that may span several lines.
const MAX_DEFINITION_LEN: usize = 4096;

/// Replace protected regions with placeholder tokens.
pub struct ProtectSpans;

impl ProtectSpans {
    pub fn new() -> Self {
        ProtectSpans
    }
}

impl Default for ProtectSpans {
    fn default() -> Self {
        Self::new()
    }
}

impl Runnable<Draft, Draft> for ProtectSpans {
    fn run(&self, mut draft: Draft) -> Result<Draft, TransformError> {
        let Some(marker) = free_marker(&draft.text) else {
            draft.warn(Warning::PlaceholderUnavailable);
            return Ok(draft);
        };
        draft.marker = Some(marker);

        let found = find_spans(&draft.text);
        if found.is_empty() {
            return Ok(draft);
        }

        let mut out = String::with_capacity(draft.text.len());
        let mut last = 0;
        for (range, kind) in found {
            out.push_str(&draft.text[last..range.start]);
            let token = format!("{marker}{}{marker}", draft.spans.len());
            out.push_str(&token);
            draft.events.push(Event::SpanProtected {
                kind,
                len: range.len(),
            });
            draft.spans.push(ProtectedSpan {
                token,
                kind,
                original: draft.text[range.clone()].to_string(),
            });
            last = range.end;
        }
        out.push_str(&draft.text[last..]);
        draft.text = out;
        Ok(draft)
    }
}

/// Put protected originals back in place of their tokens.
pub struct RestoreSpans;

impl RestoreSpans {
    pub fn new() -> Self {
        RestoreSpans
    }
}

impl Default for RestoreSpans {
    fn default() -> Self {
        Self::new()
    }
}

impl Runnable<Draft, Draft> for RestoreSpans {
    fn run(&self, mut draft: Draft) -> Result<Draft, TransformError> {
        let Some(marker) = draft.marker else {
            return Ok(draft);
        };
        if draft.spans.is_empty() {
            return Ok(draft);
        }

        let located = locate_tokens(&draft.text, marker, draft.spans.len());
        let mut restored = vec![false; draft.spans.len()];

        // splice back to front so earlier offsets stay valid
        let mut pieces: Vec<&str> = Vec::with_capacity(located.len() * 2 + 1);
        let mut tail = draft.text.len();
        for &(start, end, idx) in located.iter().rev() {
            pieces.push(&draft.text[end..tail]);
            pieces.push(&draft.spans[idx].original);
            restored[idx] = true;
            tail = start;
        }
        pieces.push(&draft.text[..tail]);
        pieces.reverse();
        let text = pieces.concat();

        let lost: Vec<SpanKind> = draft
            .spans
            .iter()
            .zip(&restored)
            .filter(|(_, done)| !**done)
            .map(|(span, _)| span.kind)
            .collect();
        draft.text = text;
        for kind in lost {
            draft.warn(Warning::UnrestoredSpan { kind });
        }
        Ok(draft)
    }
}

/// First private-use character absent from `text`.
fn free_marker(text: &str) -> Option<char> {
    let private = '\u{E000}'..='\u{F8FF}';
    let used: HashSet<char> = text.chars().filter(|c| private.contains(c)).collect();
    private.clone().find(|c| !used.contains(c))
}

/// `(start, end, index)` of every well-formed token, in text order.
fn locate_tokens(text: &str, marker: char, count: usize) -> Vec<(usize, usize, usize)> {
    let marks: Vec<usize> = text.match_indices(marker).map(|(at, _)| at).collect();
    let width = marker.len_utf8();
    let mut located = Vec::new();
    let mut k = 0;
    while k + 1 < marks.len() {
        let (open, close) = (marks[k], marks[k + 1]);
        match text[open + width..close].parse::<usize>() {
            Ok(idx) if idx < count => {
                located.push((open, close + width, idx));
                k += 2;
            }
            _ => k += 1,
        }
    }
    located
}

/// Every protected region of `src`, in order and non-overlapping.
fn find_spans(src: &str) -> Vec<(Range<usize>, SpanKind)> {
    let bytes = src.as_bytes();
    let braces = BraceMap::new(src);
    let mut finder = Finder::new(src);
    let mut spans = Vec::new();
    let mut line_start = true;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if line_start && b == b'%' {
            let end = line_end(bytes, i);
            spans.push((i..end, SpanKind::CommentLine));
            i = end;
            continue;
        }
        match b {
            b'\n' => {
                line_start = true;
                i += 1;
                continue;
            }
            b' ' | b'\t' => {
                i += 1;
                continue;
            }
            _ => {}
        }
        let at_line_start = line_start;
        line_start = false;

        match b {
            b'$' => match math_span_at(src, i, &mut finder) {
                Some((kind, end)) => {
                    spans.push((i..end, kind.into()));
                    i = end;
                }
                None if bytes.get(i + 1) == Some(&b'$') => i += 2,
                None => i += 1,
            },
            b'\\' => {
                i = protect_command(src, i, at_line_start, &braces, &mut finder, &mut spans);
            }
            _ => i += 1,
        }
    }
    spans
}

/// Handle the command at `i`, pushing a span if it opens one. Returns where to continue.
fn protect_command(
    src: &str,
    i: usize,
    at_line_start: bool,
    braces: &BraceMap,
    finder: &mut Finder<'_>,
    spans: &mut Vec<(Range<usize>, SpanKind)>,
) -> usize {
    let bytes = src.as_bytes();
    let (name, after) = command_name(src, i);
    let found = match name {
        "[" | "(" => math_span_at(src, i, finder).map(|(kind, end)| (end, kind.into())),
        "begin" => {
            if let Some((kind, end)) = math_span_at(src, i, finder) {
                Some((end, kind.into()))
            } else {
                match env_name(src, after) {
                    Some((env, body)) if VERBATIM_ENVS.contains(&env) => finder
                        .env_end(env, body)
                        .map(|(_, end)| (end, SpanKind::Verbatim)),
                    Some((_, body)) => return body,
                    None => None,
                }
            }
        }
        "verb" => verb_span(bytes, after).map(|end| (end, SpanKind::Verbatim)),
        name if REFERENCE_COMMANDS.contains(&name) => {
            reference_span(bytes, braces, after).map(|end| (end, SpanKind::Reference))
        }
        name if at_line_start && DEFINITION_COMMANDS.contains(&name) => {
            Some((definition_span(bytes, i), SpanKind::MacroDefinition))
        }
        _ => None,
    };
    match found {
        Some((end, kind)) => {
            spans.push((i..end, kind));
            end
        }
        None => after,
    }
}

/// End of `\verb|..|` (or `\verb*|..|`) whose name ends at `after`.
///
/// Backslashes and braces are not delimiters, so nothing escaping inserts can
/// close a `\verb` left open.
fn verb_span(bytes: &[u8], after: usize) -> Option<usize> {
    let mut j = after;
    if bytes.get(j) == Some(&b'*') {
        j += 1;
    }
    let delim = *bytes.get(j)?;
    if delim.is_ascii_alphabetic()
        || delim.is_ascii_whitespace()
        || !delim.is_ascii()
        || matches!(delim, b'\\' | b'{' | b'}')
    {
        return None;
    }
    let close = bytes[j + 1..]
        .iter()
        .position(|&b| b == delim || b == b'\n')?;
    (bytes[j + 1 + close] == delim).then_some(j + 2 + close)
}

/// End of the command, its optional arguments and its first braced argument.
fn reference_span(bytes: &[u8], braces: &BraceMap, after: usize) -> Option<usize> {
    let mut j = skip_blanks(bytes, after);
    while bytes.get(j) == Some(&b'[') {
        j = skip_blanks(bytes, matching_bracket(bytes, j)? + 1);
    }
    if bytes.get(j) != Some(&b'{') {
        return None;
    }
    Some(braces.close(j)? + 1)
}

/// End of a definition: the first line end outside braces, capped in length.
fn definition_span(bytes: &[u8], start: usize) -> usize {
    let limit = (start + MAX_DEFINITION_LEN).min(bytes.len());
    let mut depth = 0usize;
    let mut j = start;
    while j < limit {
        match bytes[j] {
            b'\\' => {
                j += 2;
                continue;
            }
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b'\n' if depth == 0 => return j,
            _ => {}
        }
        j += 1;
    }
    if j >= bytes.len() {
        bytes.len()
    } else {
        line_end(bytes, start)
    }
}

fn line_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |p| from + p)
}
