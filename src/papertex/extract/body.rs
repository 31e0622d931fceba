//! Body narrowing
//!
//! Only the document body can hold questions. The preamble, the title block
//! and the instructions box at the top of a paper routinely contain numbered
//! lines ("1. Answer all questions") that the permissive strategies would
//! otherwise take for headers.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

const BEGIN_DOCUMENT: &str = r"\begin{document}";
const END_DOCUMENT: &str = r"\end{document}";
const MAKETITLE: &str = r"\maketitle";

/// How far past an "instructions" mention its closing boundary may be.
const INSTRUCTIONS_WINDOW: usize = 1500;

static INSTRUCTIONS_BOUNDARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\\maketitle|\\end\{(?:tcolorbox|mdframed|framed|center|minipage)\}|\\hrule|\\rule\{\\(?:line|text)width\}(?:\{[^{}\n]{0,16}\})?",
    )
    .unwrap()
});

/// The byte range between `\begin{document}` and `\end{document}`. The
/// whole text when there are no such markers.
pub fn document_range(text: &str) -> Range<usize> {
    let start = text
        .find(BEGIN_DOCUMENT)
        .map_or(0, |at| at + BEGIN_DOCUMENT.len());
    let end = text[start..]
        .find(END_DOCUMENT)
        .map_or(text.len(), |at| start + at);
    start..end
}

/// Where the title block of `body` ends: just past a `\maketitle` that comes
/// before `first_header`, the first header any strategy recognizes.
pub fn title_end(body: &str, first_header: Option<usize>) -> Option<usize> {
    let at = body.find(MAKETITLE)?;
    if first_header.is_some_and(|header| at >= header) {
        return None;
    }
    Some(at + MAKETITLE.len())
}

/// Where an instructions block at the top of `body` ends, if there is one.
///
/// `first_strong` is the first unambiguous (sectioned, bold or labelled)
/// header and `first_any` the first header of any strategy, bare numbered
/// lines included. The mention of "instructions" must come before
/// `first_any`, so a question that talks about instructions is never cut.
/// The boundary closing the block must follow within a short window and not
/// run past `first_strong`; numbered lines inside the box itself may come
/// before it.
pub fn instructions_end(
    body: &str,
    first_strong: Option<usize>,
    first_any: Option<usize>,
) -> Option<usize> {
    let lower = body.to_ascii_lowercase();
    let mention = lower.find("instructions")?;
    if first_any.is_some_and(|header| mention >= header) {
        return None;
    }
    let boundary = INSTRUCTIONS_BOUNDARY.find_at(body, mention)?;
    if boundary.start() > mention + INSTRUCTIONS_WINDOW {
        return None;
    }
    if first_strong.is_some_and(|header| boundary.end() > header) {
        return None;
    }
    Some(boundary.end())
}
