//! Enumerated-list numbering styles
//!
//! Generated papers routinely use the pre-`enumitem` shorthand
//! `\begin{enumerate}[(a)]`, which modern class files reject. This table maps
//! every shorthand we accept onto a [`ListStyle`]; the sanitizer turns a style
//! back into the parametrized `label=` form and the renderer turns it into an
//! HTML `type` attribute.

/// The counter a list label is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Alph,
    UpperAlph,
    Roman,
    UpperRoman,
    Arabic,
}

impl Counter {
    /// The `enumitem` counter command.
    pub fn latex(self) -> &'static str {
        match self {
            Counter::Alph => "\\alph*",
            Counter::UpperAlph => "\\Alph*",
            Counter::Roman => "\\roman*",
            Counter::UpperRoman => "\\Roman*",
            Counter::Arabic => "\\arabic*",
        }
    }

    /// The HTML `<ol type>` value.
    pub fn html_type(self) -> &'static str {
        match self {
            Counter::Alph => "a",
            Counter::UpperAlph => "A",
            Counter::Roman => "i",
            Counter::UpperRoman => "I",
            Counter::Arabic => "1",
        }
    }
}

/// A list label: counter plus the literal text around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListStyle {
    pub counter: Counter,
    pub prefix: &'static str,
    pub suffix: &'static str,
}

const fn style(counter: Counter, prefix: &'static str, suffix: &'static str) -> ListStyle {
    ListStyle {
        counter,
        prefix,
        suffix,
    }
}

/// Legacy shorthand options, in the order they are documented.
const LEGACY_OPTIONS: &[(&str, ListStyle)] = &[
    // lettered
    ("(a)", style(Counter::Alph, "(", ")")),
    ("a)", style(Counter::Alph, "", ")")),
    ("a.", style(Counter::Alph, "", ".")),
    ("(A)", style(Counter::UpperAlph, "(", ")")),
    ("A)", style(Counter::UpperAlph, "", ")")),
    ("A.", style(Counter::UpperAlph, "", ".")),
    // roman
    ("(i)", style(Counter::Roman, "(", ")")),
    ("i)", style(Counter::Roman, "", ")")),
    ("i.", style(Counter::Roman, "", ".")),
    ("(I)", style(Counter::UpperRoman, "(", ")")),
    ("I)", style(Counter::UpperRoman, "", ")")),
    ("I.", style(Counter::UpperRoman, "", ".")),
    // numeric
    ("(1)", style(Counter::Arabic, "(", ")")),
    ("1)", style(Counter::Arabic, "", ")")),
    ("1.", style(Counter::Arabic, "", ".")),
    // bare letter / roman
    ("a", style(Counter::Alph, "", "")),
    ("A", style(Counter::UpperAlph, "", "")),
    ("i", style(Counter::Roman, "", "")),
    ("I", style(Counter::UpperRoman, "", "")),
    // bare numeric
    ("1", style(Counter::Arabic, "", "")),
];

/// Look up a legacy shorthand option such as `(a)` or `i.`.
pub fn legacy_style(option: &str) -> Option<ListStyle> {
    let option = option.trim();
    LEGACY_OPTIONS
        .iter()
        .find(|(legacy, _)| *legacy == option)
        .map(|(_, style)| *style)
}

/// The parametrized `enumitem` option for a style, e.g. `label=(\alph*)`.
pub fn modern_option(style: ListStyle) -> String {
    format!(
        "label={}{}{}",
        style.prefix,
        style.counter.latex(),
        style.suffix
    )
}

/// Style of a list option in either legacy or `label=` form.
pub fn parse_style(option: &str) -> Option<ListStyle> {
    if let Some(style) = legacy_style(option) {
        return Some(style);
    }
    let label = option
        .split(',')
        .map(str::trim)
        .find_map(|kv| kv.strip_prefix("label")?.trim_start().strip_prefix('='))?;
    let counter = [
        Counter::UpperAlph,
        Counter::Alph,
        Counter::UpperRoman,
        Counter::Roman,
        Counter::Arabic,
    ]
    .into_iter()
    .find(|c| label.contains(c.latex()))?;
    Some(style(counter, "", ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roman_shorthand_is_not_lettered() {
        assert_eq!(legacy_style("(i)").map(|s| s.counter), Some(Counter::Roman));
        assert_eq!(legacy_style("(a)").map(|s| s.counter), Some(Counter::Alph));
    }

    #[test]
    fn renders_modern_option() {
        let style = legacy_style(" (a) ").unwrap();
        assert_eq!(modern_option(style), r"label=(\alph*)");
        assert_eq!(modern_option(legacy_style("I.").unwrap()), r"label=\Roman*.");
        assert_eq!(modern_option(legacy_style("1").unwrap()), r"label=\arabic*");
    }

    #[test]
    fn unknown_options_are_not_styles() {
        assert_eq!(legacy_style("noitemsep"), None);
        assert_eq!(legacy_style("(aa)"), None);
        assert_eq!(parse_style("leftmargin=*"), None);
    }

    #[test]
    fn parses_modern_labels() {
        let parsed = parse_style(r"label=(\roman*), leftmargin=2em").unwrap();
        assert_eq!(parsed.counter, Counter::Roman);
        assert_eq!(parse_style(r"label=\Alph*.").unwrap().counter, Counter::UpperAlph);
    }
}
