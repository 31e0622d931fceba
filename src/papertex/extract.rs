//! Question extraction
//!
//! Turns a generated paper into an ordered list of [`Question`]s without
//! assuming any one layout. The body is narrowed first (see [`body`]), then
//! the strategies of [`strategies::CASCADE`] are tried in order. The first
//! strategy that yields at least one accepted question wins; results from
//! different strategies are never merged.
//!
//! A candidate is accepted when its number is positive, its content is long
//! enough and it is not boilerplate (instructions, time allowed, …). Duplicate
//! numbers keep their first occurrence, and the list is sorted ascending.
//!
//! Extraction never fails: a document without recognizable structure gives
//! an empty list and a [`Event::NoStructureDetected`] event.

pub mod body;
pub mod strategies;

use crate::papertex::config::PapertexConfig;
use crate::papertex::observe::{null_observer, Event, Observer};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use strategies::{Strategy, CASCADE, STRONG_STRATEGIES};

/// Phrases that mark a block as instructions rather than a question.
pub const BOILERPLATE: &[&str] = &[
    "general instructions",
    "instructions to candidates",
    "read the following instructions",
    "time allowed",
    "maximum marks",
    "all questions are compulsory",
    "this question paper contains",
    "do not write anything",
];

/// One extracted question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub number: u32,
    pub marks_label: Option<String>,
    pub prompt: String,
    /// Empty when the question has no solution section.
    pub solution: String,
}

impl Question {
    /// The first integer in the marks label, e.g. `5` for `"5 marks"`.
    pub fn marks(&self) -> Option<u32> {
        self.marks_label
            .as_deref()?
            .split(|c: char| !c.is_ascii_digit())
            .find(|digits| !digits.is_empty())?
            .parse()
            .ok()
    }

    pub fn has_solution(&self) -> bool {
        !self.solution.is_empty()
    }
}

/// Why a header match was not accepted as a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    NotPositive,
    TooShort { len: usize },
    Boilerplate { phrase: String },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotPositive => write!(f, "number is not a positive integer"),
            Rejection::TooShort { len } => write!(f, "content too short ({} chars)", len),
            Rejection::Boilerplate { phrase } => write!(f, "boilerplate: \"{}\"", phrase),
        }
    }
}

/// Knobs for the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Minimum trimmed content length, in chars.
    pub min_content_len: usize,
    /// How many strategies of the cascade may be tried.
    pub max_strategies: usize,
    /// Phrases rejected in addition to [`BOILERPLATE`].
    pub extra_boilerplate: Vec<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            min_content_len: 10,
            max_strategies: 4,
            extra_boilerplate: Vec::new(),
        }
    }
}

impl From<&PapertexConfig> for ExtractOptions {
    fn from(config: &PapertexConfig) -> Self {
        Self {
            min_content_len: config.extract.min_content_len,
            max_strategies: config.extract.max_strategies,
            extra_boilerplate: config.extract.extra_boilerplate.clone(),
        }
    }
}

/// Extractor with options and an observer.
pub struct Extractor {
    options: ExtractOptions,
    boilerplate: Vec<String>,
    observer: Arc<dyn Observer>,
}

impl Extractor {
    pub fn new() -> Self {
        Self::default().with_options(ExtractOptions::default())
    }

    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.boilerplate = BOILERPLATE
            .iter()
            .map(|phrase| phrase.to_string())
            .chain(
                options
                    .extra_boilerplate
                    .iter()
                    .map(|phrase| phrase.trim().to_lowercase())
                    .filter(|phrase| !phrase.is_empty()),
            )
            .collect();
        self.options = options;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract the questions of `text`, deduplicated and sorted by number.
    pub fn extract(&self, text: &str) -> Vec<Question> {
        let body = self.narrow(text);

        for strategy in CASCADE.iter().take(self.options.max_strategies) {
            let (candidates, accepted) = self.apply(strategy, body);
            self.observer.on_event(&Event::StrategyTried {
                strategy: strategy.name,
                candidates,
                accepted: accepted.len(),
            });
            if !accepted.is_empty() {
                return self.dedup(accepted);
            }
        }

        self.observer.on_event(&Event::NoStructureDetected);
        Vec::new()
    }

    /// The part of `text` questions are searched in.
    fn narrow<'t>(&self, text: &'t str) -> &'t str {
        let range = body::document_range(text);
        let doc = &text[range.clone()];
        let first_any = self.first_header(doc, self.options.max_strategies);
        let title = body::title_end(doc, first_any).unwrap_or(0);

        let rest = &doc[title..];
        let first_strong = self.first_header(rest, STRONG_STRATEGIES);
        let first_any = self.first_header(rest, self.options.max_strategies);
        let skip = body::instructions_end(rest, first_strong, first_any).unwrap_or(0);

        let (start, end) = (range.start + title + skip, range.end);
        if start != 0 || end != text.len() {
            self.observer.on_event(&Event::BodyNarrowed { start, end });
        }
        &text[start..end]
    }

    /// Start of the first header found by the first `count` usable strategies.
    fn first_header(&self, doc: &str, count: usize) -> Option<usize> {
        CASCADE
            .iter()
            .take(count.min(self.options.max_strategies))
            .filter_map(|strategy| strategy.header.find(doc))
            .map(|m| m.start())
            .min()
    }

    /// Run one strategy: `(header matches, accepted questions)`.
    fn apply(&self, strategy: &Strategy, body: &str) -> (usize, Vec<Question>) {
        let headers = strategy.headers(body);
        let mut accepted = Vec::new();

        for (k, header) in headers.iter().enumerate() {
            let end = headers.get(k + 1).map_or(body.len(), |next| next.start);
            let content = &body[header.end..end];
            match self.accept(header.number, content) {
                Ok(number) => {
                    let (prompt, solution) = strategy.split(content);
                    accepted.push(Question {
                        number,
                        marks_label: header.marks_label.clone(),
                        prompt: prompt.to_string(),
                        solution: solution.to_string(),
                    });
                }
                Err(reason) => self.observer.on_event(&Event::CandidateRejected {
                    strategy: strategy.name,
                    number: header.number.to_string(),
                    reason,
                }),
            }
        }
        (headers.len(), accepted)
    }

    fn accept(&self, number: &str, content: &str) -> Result<u32, Rejection> {
        let number = match number.parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => return Err(Rejection::NotPositive),
        };
        let len = content.trim().chars().count();
        if len < self.options.min_content_len {
            return Err(Rejection::TooShort { len });
        }
        let lower = content.to_lowercase();
        if let Some(phrase) = self.boilerplate.iter().find(|p| lower.contains(p.as_str())) {
            return Err(Rejection::Boilerplate {
                phrase: phrase.clone(),
            });
        }
        Ok(number)
    }

    /// First occurrence of each number wins; ascending order.
    fn dedup(&self, questions: Vec<Question>) -> Vec<Question> {
        let mut by_number = BTreeMap::new();
        for question in questions {
            match by_number.entry(question.number) {
                Entry::Vacant(slot) => {
                    slot.insert(question);
                }
                Entry::Occupied(_) => self.observer.on_event(&Event::DuplicateDropped {
                    number: question.number,
                }),
            }
        }
        by_number.into_values().collect()
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self {
            options: ExtractOptions::default(),
            boilerplate: BOILERPLATE.iter().map(|p| p.to_string()).collect(),
            observer: null_observer(),
        }
    }
}

/// Extract with default options.
pub fn extract(text: &str) -> Vec<Question> {
    Extractor::new().extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::papertex::observe::RecordingObserver;

    fn numbers(questions: &[Question]) -> Vec<u32> {
        questions.iter().map(|q| q.number).collect()
    }

    #[test]
    fn test_sectioned_paper() {
        let doc = "\\documentclass{article}\n\\begin{document}\n\\section*{Question 1 [5 marks]}\nDefine a prime number precisely.\n\\begin{solution}\nA number with exactly two divisors.\n\\end{solution}\n\\section*{Question 2 [3 marks]}\nState the Pythagorean theorem.\n\\end{document}\n";
        let questions = extract(doc);
        assert_eq!(numbers(&questions), vec![1, 2]);
        assert_eq!(questions[0].marks_label.as_deref(), Some("5 marks"));
        assert_eq!(questions[0].marks(), Some(5));
        assert_eq!(questions[0].prompt, "Define a prime number precisely.");
        assert_eq!(questions[0].solution, "A number with exactly two divisors.");
        assert!(!questions[1].has_solution());
        assert_eq!(questions[1].prompt, "State the Pythagorean theorem.");
    }

    #[test]
    fn test_first_successful_strategy_wins() {
        // the numbered sub-steps must not be merged into the sectioned result
        let doc = "\\section*{Question 1}\nSolve both parts below.\n1. first part here\n2. second part here\n";
        let questions = extract(doc);
        assert_eq!(numbers(&questions), vec![1]);
        assert!(questions[0].prompt.contains("1. first part here"));
    }

    #[test]
    fn test_falls_through_to_numbered() {
        let doc = "1. What is the boiling point of water?\n2. What is the freezing point of water?\n";
        assert_eq!(numbers(&extract(doc)), vec![1, 2]);
    }

    #[test]
    fn test_duplicates_keep_first_and_sort() {
        let recorder = RecordingObserver::new();
        let extractor = Extractor::new().with_observer(recorder.clone());
        let doc = "Question 3. Third question text\nQuestion 1. First question text\nQuestion 2. Second question text\nQuestion 1. Repeated question text\n";
        let questions = extractor.extract(doc);
        assert_eq!(numbers(&questions), vec![1, 2, 3]);
        assert_eq!(questions[0].prompt, "First question text");
        assert!(recorder
            .events()
            .contains(&Event::DuplicateDropped { number: 1 }));
    }

    #[test]
    fn test_rejections_are_reported() {
        let recorder = RecordingObserver::new();
        let extractor = Extractor::new().with_observer(recorder.clone());
        let doc = "Question 0. Zero is not a number here\nQuestion 1. Short\nQuestion 2. General Instructions apply to all.\nQuestion 3. A proper question with content\n";
        let questions = extractor.extract(doc);
        assert_eq!(numbers(&questions), vec![3]);

        let reasons: Vec<Rejection> = recorder
            .events()
            .into_iter()
            .filter_map(|event| match event {
                Event::CandidateRejected { reason, .. } => Some(reason),
                _ => None,
            })
            .collect();
        assert_eq!(
            reasons,
            vec![
                Rejection::NotPositive,
                Rejection::TooShort { len: 5 },
                Rejection::Boilerplate {
                    phrase: "general instructions".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_extra_boilerplate_from_options() {
        let extractor = Extractor::new().with_options(ExtractOptions {
            extra_boilerplate: vec!["Rough Work".to_string()],
            ..ExtractOptions::default()
        });
        let doc = "1. Use this space for rough work only.\n2. Compute the area of a circle.\n";
        assert_eq!(numbers(&extractor.extract(doc)), vec![2]);
    }

    #[test]
    fn test_strategy_cap() {
        let extractor = Extractor::new().with_options(ExtractOptions {
            max_strategies: 3,
            ..ExtractOptions::default()
        });
        let doc = "1. What is the boiling point of water?\n";
        assert!(extractor.extract(doc).is_empty());
    }

    #[test]
    fn test_no_structure() {
        let recorder = RecordingObserver::new();
        let extractor = Extractor::new().with_observer(recorder.clone());
        assert!(extractor.extract("Just a paragraph of prose.").is_empty());
        assert_eq!(
            recorder.events().last(),
            Some(&Event::NoStructureDetected)
        );
    }

    #[test]
    fn test_instructions_box_is_not_a_question() {
        let doc = "\\begin{document}\n\\begin{center}\nGeneral Instructions\n1. Attempt every question in this paper.\n\\end{center}\n1. What is the capital of France?\n2. What is the capital of Spain?\n\\end{document}";
        let questions = extract(doc);
        assert_eq!(numbers(&questions), vec![1, 2]);
        assert_eq!(questions[0].prompt, "What is the capital of France?");
    }

    #[test]
    fn test_question_mentioning_instructions_is_kept() {
        let doc = "1. Read the instructions on the bottle and explain them.\n\\begin{center}\nDosage table\n\\end{center}\n2. What is the active ingredient?\n3. Why take it with food?\n";
        assert_eq!(numbers(&extract(doc)), vec![1, 2, 3]);
    }

    #[test]
    fn test_maketitle_after_questions_keeps_them() {
        let doc = "\\begin{document}\n1. What is a prime number?\n\\maketitle\n2. What is a composite number?\n\\end{document}";
        assert_eq!(numbers(&extract(doc)), vec![1, 2]);
    }

    #[test]
    fn test_question_serializes() {
        let question = Question {
            number: 1,
            marks_label: None,
            prompt: "p".to_string(),
            solution: String::new(),
        };
        let json = serde_json::to_string(&question).unwrap();
        assert_eq!(
            json,
            r#"{"number":1,"marks_label":null,"prompt":"p","solution":""}"#
        );
    }
}
