//! The header-detection cascade
//!
//! Each strategy is a header pattern plus the separator that splits a
//! question's content into prompt and solution. Strategies are data: the
//! patterns live in [`STRATEGY_PATTERNS`] in the order they are tried, most
//! specific first, and are compiled once into [`CASCADE`].
//!
//! Every header pattern captures `num` and may capture the marks label as
//! `marks` (inside the header) or `trail` (right after it). A marks label is
//! bracketed text containing at least one digit. Repetition is bounded
//! everywhere, and the `regex` crate never backtracks.

use once_cell::sync::Lazy;
use regex::Regex;

/// Separators written as markup: a `solution` environment, a Solution/Answer
/// section heading, or a bold/italic "Solution:" label.
const MARKUP_SEPARATOR: &str = r"(?i:\\begin\{solution\}|\\(?:sub){0,2}section\*?\{[ \t]*(?:solution|answer)s?[^{}\n]{0,30}\}|\\(?:textbf|textit|emph|underline)\{[ \t]*(?:solution|answer|ans\.?)s?[ \t]*:?[ \t]*\}:?)";

/// A plain-text "Solution:" / "Answer -" / "Ans." at the start of a line.
const PLAIN_SEPARATOR: &str = r"(?im:^[ \t]*(?:solution|answer|ans\.?)s?[ \t]*[:.\-])";

/// Which separators a strategy splits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Separators {
    Markup,
    Any,
}

/// `(name, header pattern, separators)`, in cascade order.
const STRATEGY_PATTERNS: &[(&str, &str, Separators)] = &[
    // \section*{Question 3 [5 marks]}, \subsection{Q3 (5)}
    (
        "sectioned",
        r"(?i)\\(?:sub){0,2}section\*?[ \t]*\{[ \t]*(?:question|q\.?)[ \t]*(?P<num>\d{1,4})[^{}\[(\n]{0,40}(?:[\[(](?P<marks>[^\])\n]{0,24}\d[^\])\n]{0,24})[\])])?[^{}\n]{0,40}\}(?:[ \t]*[\[(](?P<trail>[^\])\n]{0,24}\d[^\])\n]{0,24})[\])])?",
        Separators::Markup,
    ),
    // \textbf{Question 3.} (5 marks), \textbf{Q3} \hfill [5]
    (
        "bold",
        r"(?i)\\textbf\{[ \t]*(?:question|q\.?)[ \t]*(?P<num>\d{1,4})[^{}\[(\n]{0,40}(?:[\[(](?P<marks>[^\])\n]{0,24}\d[^\])\n]{0,24})[\])])?[^{}\n]{0,40}\}(?:[ \t]*(?:\\hfill[ \t]*)?[\[(](?P<trail>[^\])\n]{0,24}\d[^\])\n]{0,24})[\])])?",
        Separators::Any,
    ),
    // Question 3. / Q. 3) / Q3: at the start of a line
    (
        "labelled",
        r"(?im)^[ \t]*(?:\\item[ \t]*)?(?:question|q\.?)[ \t]*(?P<num>\d{1,4})[ \t]*[.:)\-]?(?:[ \t]*[\[(](?P<marks>[^\])\n]{0,24}\d[^\])\n]{0,24})[\])])?",
        Separators::Any,
    ),
    // 3. / 3) at the start of a line
    (
        "numbered",
        r"(?m)^[ \t]*(?P<num>\d{1,3})[.)][ \t]+(?:[\[(](?P<marks>[^\])\n]{0,24}\d[^\])\n]{0,24})[\])])?",
        Separators::Any,
    ),
];

/// How many leading strategies recognize a header unambiguously.
pub const STRONG_STRATEGIES: usize = 3;

/// One way of recognizing question headers.
#[derive(Debug)]
pub struct Strategy {
    pub name: &'static str,
    pub header: Regex,
    pub separator: Regex,
}

/// A header found by a strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header<'t> {
    /// The digits as written.
    pub number: &'t str,
    pub marks_label: Option<String>,
    pub start: usize,
    pub end: usize,
}

impl Strategy {
    /// Every header in `body`, in order.
    pub fn headers<'t>(&self, body: &'t str) -> Vec<Header<'t>> {
        self.header
            .captures_iter(body)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let number = caps.name("num")?.as_str();
                let marks_label = caps
                    .name("marks")
                    .or_else(|| caps.name("trail"))
                    .map(|m| m.as_str().trim().to_string());
                Some(Header {
                    number,
                    marks_label,
                    start: whole.start(),
                    end: whole.end(),
                })
            })
            .collect()
    }

    /// Split question content into `(prompt, solution)`, both trimmed.
    pub fn split<'t>(&self, content: &'t str) -> (&'t str, &'t str) {
        match self.separator.find(content) {
            Some(m) => {
                let prompt = content[..m.start()].trim();
                let solution = content[m.end()..].trim();
                let solution = solution
                    .strip_suffix(r"\end{solution}")
                    .map_or(solution, str::trim_end);
                (prompt, solution)
            }
            None => (content.trim(), ""),
        }
    }
}

/// The compiled cascade, in the order strategies are tried.
pub static CASCADE: Lazy<Vec<Strategy>> = Lazy::new(|| {
    let markup = Regex::new(MARKUP_SEPARATOR).unwrap();
    let any = Regex::new(&format!("{}|{}", MARKUP_SEPARATOR, PLAIN_SEPARATOR)).unwrap();
    STRATEGY_PATTERNS
        .iter()
        .map(|&(name, header, separators)| Strategy {
            name,
            header: Regex::new(header).unwrap(),
            separator: match separators {
                Separators::Markup => markup.clone(),
                Separators::Any => any.clone(),
            },
        })
        .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy(name: &str) -> &'static Strategy {
        CASCADE.iter().find(|s| s.name == name).unwrap()
    }

    fn numbers(name: &str, body: &str) -> Vec<(String, Option<String>)> {
        strategy(name)
            .headers(body)
            .into_iter()
            .map(|h| (h.number.to_string(), h.marks_label))
            .collect()
    }

    #[test]
    fn test_cascade_order() {
        let names: Vec<_> = CASCADE.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["sectioned", "bold", "labelled", "numbered"]);
    }

    #[test]
    fn test_sectioned_headers() {
        let body = "\\section*{Question 3 [5 marks]}\nA\n\\subsection{Q4 (2)}\nB\n\\section{Question 5: Algebra} (10 marks)\nC";
        assert_eq!(
            numbers("sectioned", body),
            vec![
                ("3".to_string(), Some("5 marks".to_string())),
                ("4".to_string(), Some("2".to_string())),
                ("5".to_string(), Some("10 marks".to_string())),
            ]
        );
    }

    #[test]
    fn test_bold_headers() {
        let body = "\\textbf{Question 1.} (5 marks) Define.\n\\textbf{Q2} \\hfill [3]\n\\textbf{Q3}";
        assert_eq!(
            numbers("bold", body),
            vec![
                ("1".to_string(), Some("5 marks".to_string())),
                ("2".to_string(), Some("3".to_string())),
                ("3".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_labelled_headers() {
        let body = "Question 1. First\nQ. 2) Second\n  Q3: Third\nQuick 4 is not one";
        assert_eq!(
            numbers("labelled", body)
                .into_iter()
                .map(|(n, _)| n)
                .collect::<Vec<_>>(),
            vec!["1", "2", "3"]
        );
    }

    #[test]
    fn test_numbered_headers() {
        let body = "1. One\n2) Two [4 marks]\nnot 3. inline\n2024 is a year";
        assert_eq!(
            numbers("numbered", body),
            vec![
                ("1".to_string(), None),
                ("2".to_string(), Some("4 marks".to_string())),
            ]
        );
    }

    #[test]
    fn test_marks_need_a_digit() {
        let body = "\\textbf{Question 1} (see figure) text";
        assert_eq!(numbers("bold", body), vec![("1".to_string(), None)]);
    }

    #[test]
    fn test_split_on_markup_and_plain_separators() {
        let bold = strategy("bold");
        assert_eq!(
            bold.split(" What is 2+2?\n\\begin{solution}\n4\n\\end{solution}\n"),
            ("What is 2+2?", "4")
        );
        assert_eq!(
            bold.split("Name a prime.\nAnswer: 7"),
            ("Name a prime.", "7")
        );
        assert_eq!(
            bold.split("State it. \\textbf{Solution:} It holds."),
            ("State it.", "It holds.")
        );
    }

    #[test]
    fn test_sectioned_ignores_plain_separators() {
        let sectioned = strategy("sectioned");
        assert_eq!(
            sectioned.split("Explain.\nAnswer: no"),
            ("Explain.\nAnswer: no", "")
        );
        assert_eq!(
            sectioned.split("Explain.\n\\subsection*{Solution}\nBecause."),
            ("Explain.", "Because.")
        );
    }
}
