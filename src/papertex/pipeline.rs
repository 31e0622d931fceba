//! End-to-end processing of one generated document
//!
//! [`Pipeline`] owns one configured instance of each component and exposes
//! the three flows a front end needs:
//!
//! - [`Pipeline::sanitize`]: text safe to hand to the compiler;
//! - [`Pipeline::extract`]: the question list of the sanitized text;
//! - [`Pipeline::preview`]: the question list with every prompt and solution
//!   rendered to HTML, falling back to the whole rendered document when no
//!   structure is detected.
//!
//! Nothing is cached between calls.

use crate::papertex::config::PapertexConfig;
use crate::papertex::diagnostics::{diagnose_with, CompileDiagnosis, DiagnoseOptions};
use crate::papertex::extract::{ExtractOptions, Extractor, Question};
use crate::papertex::observe::Observer;
use crate::papertex::render::{RenderOptions, Renderer};
use crate::papertex::sanitize::{SanitizeOptions, Sanitized, Sanitizer};
use serde::Serialize;
use std::sync::Arc;

/// One question ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewItem {
    pub number: u32,
    pub marks_label: Option<String>,
    pub prompt_html: String,
    /// Empty when the question has no solution.
    pub solution_html: String,
}

/// What a preview pane shows for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub questions: Vec<PreviewItem>,
    /// The whole document rendered, when no question structure was found.
    pub raw_fallback: Option<String>,
}

pub struct Pipeline {
    sanitizer: Sanitizer,
    extractor: Extractor,
    renderer: Renderer,
    diagnose: DiagnoseOptions,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            sanitizer: Sanitizer::new(),
            extractor: Extractor::new(),
            renderer: Renderer::new(),
            diagnose: DiagnoseOptions::default(),
        }
    }

    pub fn from_config(config: &PapertexConfig) -> Self {
        Self {
            sanitizer: Sanitizer::new().with_options(SanitizeOptions::from(config)),
            extractor: Extractor::new().with_options(ExtractOptions::from(config)),
            renderer: Renderer::new().with_options(RenderOptions::from(config)),
            diagnose: DiagnoseOptions::from(config),
        }
    }

    /// Route events of every component to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.sanitizer = self.sanitizer.with_observer(Arc::clone(&observer));
        self.extractor = self.extractor.with_observer(observer);
        self
    }

    pub fn sanitize(&self, raw: &str) -> Sanitized {
        self.sanitizer.run(raw)
    }

    /// Sanitize, then extract questions from the sanitized text.
    pub fn extract(&self, raw: &str) -> Vec<Question> {
        let sanitized = self.sanitizer.run(raw);
        self.extractor.extract(&sanitized.text)
    }

    pub fn render(&self, fragment: &str) -> String {
        self.renderer.render(fragment)
    }

    /// Sanitize, extract and render every question.
    pub fn preview(&self, raw: &str) -> Preview {
        let sanitized = self.sanitizer.run(raw);
        let questions = self.extractor.extract(&sanitized.text);
        if questions.is_empty() {
            return Preview {
                questions: Vec::new(),
                raw_fallback: Some(self.renderer.render(&sanitized.text)),
            };
        }
        let questions = questions
            .into_iter()
            .map(|question| PreviewItem {
                prompt_html: self.renderer.render(&question.prompt),
                solution_html: self.renderer.render(&question.solution),
                number: question.number,
                marks_label: question.marks_label,
            })
            .collect();
        Preview {
            questions,
            raw_fallback: None,
        }
    }

    /// Explain a failed compile of the sanitized text.
    pub fn diagnose(&self, log: &str) -> CompileDiagnosis {
        diagnose_with(log, self.diagnose)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
