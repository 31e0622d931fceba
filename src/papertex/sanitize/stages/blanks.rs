//! Fill-in blank collapsing
//!
//! Question papers draw answer blanks as runs of underscores. After escaping,
//! a run is a sequence of `\_`; two or more become a single
//! `\underline{\hspace{Nem}}` whose width grows with the run.

use crate::papertex::observe::Event;
use crate::papertex::sanitize::Draft;
use crate::papertex::transforms::{Runnable, TransformError};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:\\_|_){2,}").unwrap());

/// Replace underscore runs with a sized blank.
pub struct CollapseBlankRuns {
    max_em: usize,
}

impl CollapseBlankRuns {
    pub fn new(max_em: usize) -> Self {
        CollapseBlankRuns {
            max_em: max_em.max(1),
        }
    }

    /// Width in em for a run of `run` underscores.
    pub fn width_em(&self, run: usize) -> usize {
        run.div_ceil(2).clamp(1, self.max_em)
    }
}

impl Default for CollapseBlankRuns {
    fn default() -> Self {
        Self::new(12)
    }
}

impl Runnable<Draft, Draft> for CollapseBlankRuns {
    fn run(&self, mut draft: Draft) -> Result<Draft, TransformError> {
        let events = &mut draft.events;
        let collapsed = BLANK_RUN.replace_all(&draft.text, |caps: &Captures| {
            let run = caps[0].bytes().filter(|&b| b == b'_').count();
            let width_em = self.width_em(run);
            events.push(Event::BlankRunCollapsed { run, width_em });
            format!("\\underline{{\\hspace{{{}em}}}}", width_em)
        });
        let text = collapsed.into_owned();
        draft.text = text;
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collapse(src: &str) -> String {
        CollapseBlankRuns::default()
            .run(Draft::new(src))
            .unwrap()
            .text
    }

    #[test]
    fn test_escaped_runs_collapse() {
        assert_eq!(collapse(r"Name: \_\_\_\_\_\_"), r"Name: \underline{\hspace{3em}}");
        assert_eq!(collapse(r"a \_\_\_ b"), r"a \underline{\hspace{2em}} b");
    }

    #[test]
    fn test_single_underscore_is_kept() {
        assert_eq!(collapse(r"x\_1"), r"x\_1");
    }

    #[test]
    fn test_width_is_capped() {
        let stage = CollapseBlankRuns::new(12);
        assert_eq!(stage.width_em(2), 1);
        assert_eq!(stage.width_em(7), 4);
        assert_eq!(stage.width_em(500), 12);
    }

    #[test]
    fn test_reports_each_run() {
        let draft = CollapseBlankRuns::default()
            .run(Draft::new(r"\_\_ and \_\_\_\_"))
            .unwrap();
        assert_eq!(
            draft.events,
            vec![
                Event::BlankRunCollapsed { run: 2, width_em: 1 },
                Event::BlankRunCollapsed { run: 4, width_em: 2 },
            ]
        );
    }
}
