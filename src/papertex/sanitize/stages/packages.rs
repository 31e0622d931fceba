//! Preamble package insertion
//!
//! `label=` list options need `enumitem`. When the document uses them and no
//! `\usepackage` line loads it, one is added right after `\documentclass`.
//! Fragments without a `\documentclass` line are left unchanged.

use crate::papertex::observe::Event;
use crate::papertex::sanitize::Draft;
use crate::papertex::transforms::{Runnable, TransformError};
use once_cell::sync::Lazy;
use regex::Regex;

static LABELLED_LIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\begin\{(?:enumerate|itemize|description)\}[ \t]*\[[^\[\]\n]{0,80}\blabel[ \t]*=")
        .unwrap()
});

static DOCUMENT_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*\\documentclass(?:\[[^\]\n]{0,200}\])?\{[^}\n]{0,64}\}[^\n]*").unwrap()
});

static LOADS_ENUMITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\usepackage(?:\[[^\]\n]{0,200}\])?\{[^}\n]*\benumitem\b[^}\n]*\}").unwrap()
});

/// Add `\usepackage{enumitem}` when `label=` options need it.
pub struct EnsurePackages;

impl EnsurePackages {
    pub fn new() -> Self {
        EnsurePackages
    }
}

impl Default for EnsurePackages {
    fn default() -> Self {
        Self::new()
    }
}

impl Runnable<Draft, Draft> for EnsurePackages {
    fn run(&self, mut draft: Draft) -> Result<Draft, TransformError> {
        if !LABELLED_LIST.is_match(&draft.text) || LOADS_ENUMITEM.is_match(&draft.text) {
            return Ok(draft);
        }
        let Some(at) = DOCUMENT_CLASS.find(&draft.text).map(|m| m.end()) else {
            return Ok(draft);
        };
        draft.text.insert_str(at, "\n\\usepackage{enumitem}");
        draft.events.push(Event::PackageAdded {
            package: "enumitem",
        });
        Ok(draft)
    }
}
