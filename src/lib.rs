//! # papertex
//!
//! Processing for generated question papers: make the markup safe to compile,
//! recover the list of questions from whatever layout the generator chose, and
//! render fragments to HTML for a preview pane.
//!
//! The entry points live in [`papertex`]: [`papertex::sanitize::sanitize`],
//! [`papertex::extract::extract`], [`papertex::render::render`] and the
//! combined [`papertex::pipeline::Pipeline`].

pub mod papertex;
