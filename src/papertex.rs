//! Main module for papertex library functionality

pub mod config;
pub mod diagnostics;
pub mod extract;
pub mod observe;
pub mod options;
pub mod pipeline;
pub mod render;
pub mod sanitize;
pub mod scan;
pub mod transforms;

pub use extract::{extract, Question};
pub use pipeline::{Pipeline, Preview, PreviewItem};
pub use render::render;
pub use sanitize::{sanitize, Sanitized};
