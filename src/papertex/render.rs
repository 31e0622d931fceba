//! HTML preview rendering
//!
//! Converts one prompt or solution fragment into HTML for a preview pane. The
//! output is for reading, not for fidelity: the supported subset covers what
//! generated papers actually use (text styles, sections, lists, boxes,
//! spacing, blanks) and everything else passes through as text.
//!
//! Math is left byte-identical for a client-side typesetter; `<` and `>`
//! outside math are escaped. Unknown commands and environments keep their
//! markup.
//!
//! ```rust,ignore
//! assert_eq!(
//!     render(r"\textbf{Hello} \& \textit{World}"),
//!     "<strong>Hello</strong> & <em>World</em>"
//! );
//! ```

pub mod commands;
pub mod scanner;

use crate::papertex::config::PapertexConfig;
use scanner::Scanner;

/// Tags that make a paragraph block-level already.
const BLOCK_TAGS: &[&str] = &[
    "<div", "<h3", "<h4", "<h5", "<h6", "<ol", "<ul", "<dl", "<pre", "<hr", "<p>",
];

/// Knobs for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Deepest group nesting rendered; deeper groups are emitted as text.
    pub max_depth: usize,
    /// Wrap paragraphs in `<p>` when a fragment has more than one.
    pub wrap_paragraphs: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_depth: 32,
            wrap_paragraphs: true,
        }
    }
}

impl From<&PapertexConfig> for RenderOptions {
    fn from(config: &PapertexConfig) -> Self {
        Self {
            max_depth: config.render.max_depth,
            wrap_paragraphs: config.render.wrap_paragraphs,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Render one fragment to HTML.
    pub fn render(&self, fragment: &str) -> String {
        let paragraphs = Scanner::new(fragment, self.options.max_depth).paragraphs();
        let chunks: Vec<&str> = paragraphs
            .iter()
            .map(|chunk| chunk.trim())
            .filter(|chunk| !chunk.is_empty())
            .collect();

        let wrap = self.options.wrap_paragraphs && chunks.len() > 1;
        chunks
            .iter()
            .map(|chunk| {
                if wrap && !is_block(chunk) {
                    format!("<p>{}</p>", chunk)
                } else {
                    chunk.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn is_block(chunk: &str) -> bool {
    BLOCK_TAGS.iter().any(|tag| chunk.starts_with(tag))
}

/// Render with default options.
pub fn render(fragment: &str) -> String {
    Renderer::new().render(fragment)
}
