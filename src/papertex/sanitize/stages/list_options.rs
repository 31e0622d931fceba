//! Legacy list option rewriting
//!
//! `\begin{enumerate}[(a)]` is the pre-`enumitem` shorthand for a lettered
//! list. Current class files reject it; the parametrized form
//! `\begin{enumerate}[label=(\alph*)]` is what they expect. Options that are
//! not in the shorthand table are left alone.

use crate::papertex::observe::Event;
use crate::papertex::options::{legacy_style, modern_option};
use crate::papertex::sanitize::Draft;
use crate::papertex::transforms::{Runnable, TransformError};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ENUMERATE_OPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\begin\{enumerate\}([ \t]*)\[([^\[\]\n]{1,12})\]").unwrap());

/// Rewrite legacy `enumerate` shorthand options.
pub struct RewriteListOptions;

impl RewriteListOptions {
    pub fn new() -> Self {
        RewriteListOptions
    }
}

impl Default for RewriteListOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl Runnable<Draft, Draft> for RewriteListOptions {
    fn run(&self, mut draft: Draft) -> Result<Draft, TransformError> {
        let events = &mut draft.events;
        let rewritten = ENUMERATE_OPTION.replace_all(&draft.text, |caps: &Captures| {
            match legacy_style(&caps[2]) {
                Some(style) => {
                    let to = modern_option(style);
                    events.push(Event::ListOptionRewritten {
                        from: caps[2].to_string(),
                        to: to.clone(),
                    });
                    format!("\\begin{{enumerate}}{}[{}]", &caps[1], to)
                }
                None => caps[0].to_string(),
            }
        });
        let text = rewritten.into_owned();
        draft.text = text;
        Ok(draft)
    }
}
