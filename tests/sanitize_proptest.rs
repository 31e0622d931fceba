//! Property-based tests for the sanitizer
//!
//! Documents are assembled from fragments that generated papers actually
//! contain (prose with reserved characters, math, blanks, comments, list
//! options) so the properties are checked against realistic mixtures rather
//! than uniform noise. One test also throws arbitrary unicode at it.

use papertex::papertex::sanitize::{sanitize, Sanitizer};
use proptest::prelude::*;

const FRAGMENTS: &[&str] = &[
    "Revenue rose 50% ",
    "in Q1_2024 ",
    "profit & loss ",
    "item #3 ",
    "x^2 grows ",
    "$x_1^2$ ",
    r"\(a_b\) ",
    "\\[\\frac{a}{b}&c\\] ",
    r"\textbf{bold} ",
    "Name: ______ ",
    r"\_\_\_ ",
    "\n",
    "\n\n",
    "\n% note_to_self 5%\n",
    r"\label{sec_1} ",
    r"\ref{fig_2} ",
    "plain words ",
    "\n\\begin{enumerate}[(a)]\n\\item first\n\\end{enumerate}\n",
    r"costs \$5 ",
];

const MATH: &[&str] = &["$x_1^2$", r"\(a_b\)", "\\[\\frac{a}{b}&c\\]"];

/// A document built from realistic fragments
fn document_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..24)
        .prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn test_sanitize_is_idempotent(input in document_strategy()) {
        let once = sanitize(&input);
        prop_assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn test_math_is_preserved_verbatim(input in document_strategy()) {
        let output = sanitize(&input);
        for span in MATH {
            prop_assert_eq!(
                output.matches(span).count(),
                input.matches(span).count(),
                "math span {} changed", span
            );
        }
    }

    #[test]
    fn test_nothing_is_left_unescaped(input in document_strategy()) {
        let output = sanitize(&input);
        prop_assert!(!output.contains("Q1_2024"));
        prop_assert!(!output.contains(" & "));
        prop_assert!(!output.contains("50% "));
        prop_assert!(!output.contains("______"));
    }

    #[test]
    fn test_sanitize_never_panics(input in "\\PC{0,200}") {
        let result = Sanitizer::new().run(&input);
        prop_assert!(result.warnings.len() <= 2 + input.len());
    }

    #[test]
    fn test_placeholders_never_leak(input in document_strategy()) {
        let output = sanitize(&input);
        prop_assert!(!output.chars().any(|c| ('\u{E000}'..='\u{F8FF}').contains(&c)), "output contains private-use character");
    }
}
