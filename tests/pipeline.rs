//! End-to-end tests: raw generated paper in, sanitized text, questions and
//! preview out.

use papertex::papertex::config::Loader;
use papertex::papertex::diagnostics::CompileHint;
use papertex::papertex::observe::{Event, RecordingObserver};
use papertex::papertex::pipeline::Pipeline;
use std::sync::Arc;

const PAPER: &str = r"\documentclass[12pt]{article}
\usepackage{amsmath}
\begin{document}
\begin{center}
\textbf{General Instructions}
1. All questions are compulsory.
2. Marks are indicated against each question.
\end{center}
\section*{Question 1 [4 marks]}
A shop offers 20% off. Compute the price of item_A.
\begin{enumerate}[(a)]
\item Before tax
\item After tax
\end{enumerate}
\begin{solution}
Price is $0.8 \times p$.
\end{solution}
\section*{Question 2 [2 marks]}
Fill in the blank: water boils at ____ degrees.
\end{document}
";

#[test]
fn test_sanitized_paper_is_compilable_text() {
    let sanitized = Pipeline::new().sanitize(PAPER);
    let text = &sanitized.text;

    assert!(sanitized.warnings.is_empty());
    assert!(text.starts_with("\\documentclass[12pt]{article}\n\\usepackage{enumitem}\n"));
    assert!(text.contains(r"20\%\ off"));
    assert!(text.contains(r"item\_A"));
    assert!(text.contains(r"\begin{enumerate}[label=(\alph*)]"));
    assert!(text.contains(r"$0.8 \times p$"));
    assert!(text.contains(r"water boils at \underline{\hspace{2em}} degrees"));
}

#[test]
fn test_questions_skip_the_instructions_box() {
    let questions = Pipeline::new().extract(PAPER);
    assert_eq!(questions.len(), 2);

    assert_eq!(questions[0].number, 1);
    assert_eq!(questions[0].marks(), Some(4));
    assert!(questions[0].prompt.starts_with(r"A shop offers 20\%\ off."));
    assert!(questions[0].prompt.ends_with(r"\end{enumerate}"));
    assert_eq!(questions[0].solution, r"Price is $0.8 \times p$.");

    assert_eq!(questions[1].number, 2);
    assert_eq!(questions[1].marks_label.as_deref(), Some("2 marks"));
    assert!(!questions[1].has_solution());
}

#[test]
fn test_preview_renders_html() {
    let preview = Pipeline::new().preview(PAPER);
    assert!(preview.raw_fallback.is_none());
    assert_eq!(preview.questions.len(), 2);

    let first = &preview.questions[0];
    assert!(first
        .prompt_html
        .starts_with("A shop offers 20% off. Compute the price of item_A."));
    assert!(first
        .prompt_html
        .ends_with("<ol type=\"a\"><li>Before tax</li><li>After tax</li></ol>"));
    assert_eq!(first.solution_html, r"Price is $0.8 \times p$.");

    let second = &preview.questions[1];
    assert_eq!(
        second.prompt_html,
        "Fill in the blank: water boils at <span class=\"blank\" style=\"display:inline-block;width:2em;border-bottom:1px solid\"></span> degrees."
    );

    let json = serde_json::to_value(&preview).unwrap();
    assert_eq!(json["questions"][1]["number"], 2);
    assert_eq!(json["raw_fallback"], serde_json::Value::Null);
}

#[test]
fn test_events_cover_the_whole_run() {
    let recorder = RecordingObserver::new();
    let pipeline = Pipeline::new().with_observer(recorder.clone());
    pipeline.preview(PAPER);

    let events = recorder.events();
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::ListOptionRewritten { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::PackageAdded { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::BodyNarrowed { .. })));
    assert!(!events
        .iter()
        .any(|e| matches!(e, Event::NoStructureDetected)));
}

#[test]
fn test_configuration_is_applied() {
    let config = Loader::new()
        .with_toml("[sanitize]\nmax_blank_em = 1\n\n[render]\nwrap_paragraphs = false\n")
        .build()
        .unwrap();
    let pipeline = Pipeline::from_config(&config);

    assert!(pipeline
        .sanitize("Name: ________")
        .text
        .ends_with(r"\underline{\hspace{1em}}"));
    assert_eq!(pipeline.render("one\n\ntwo"), "one\n\ntwo");
}

#[test]
fn test_closure_observer() {
    let seen = Arc::new(std::sync::Mutex::new(0usize));
    let counter = Arc::clone(&seen);
    let pipeline = Pipeline::new().with_observer(Arc::new(move |_: &Event| {
        if let Ok(mut count) = counter.lock() {
            *count += 1;
        }
    }));
    pipeline.extract("1. What is the boiling point of water?");
    assert!(*seen.lock().unwrap() > 0);
}

#[test]
fn test_diagnose_compile_log() {
    let log = "! Missing $ inserted.\n<inserted text>\n                $\nl.12 The value x_1";
    let diagnosis = Pipeline::new().diagnose(log);
    assert_eq!(diagnosis.hint, CompileHint::MathMode);
    assert_eq!(diagnosis.line, Some(12));
}
