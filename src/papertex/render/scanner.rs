//! Fragment scanner
//!
//! A single forward pass over the fragment, recursing only into brace groups,
//! command arguments and environment bodies. Group and environment ends are
//! looked up in maps built once up front ([`BraceMap`], [`EnvMap`]), so no
//! range is scanned more than once. Recursion is bounded by `max_depth`;
//! anything nested deeper is emitted as text.
//!
//! Math is recognized only to be skipped over: its bytes reach the output
//! untouched.

use crate::papertex::options::parse_style;
use crate::papertex::render::commands::{
    css_length, lookup, removed_args, Arg, ALIGNMENTS, BOXED_ENVS, DECLARATIONS,
    INLINE_STYLES, PREFORMATTED_ENVS, QUADS, SECTIONS, SIZES, SKIPS,
};
use crate::papertex::scan::{
    command_name, env_name, is_escaped, math_span_at, matching_bracket, skip_arg_space,
    skip_blanks, BraceMap, Finder,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static ENV_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\(begin|end)\{([A-Za-z*]{1,32})\}").unwrap());

static BLANK_ARG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\\hspace\*?\{([^{}]{0,32})\}$").unwrap());

/// Matching `\begin{x}` / `\end{x}` pairs, computed in one pass.
#[derive(Debug, Default)]
pub struct EnvMap {
    end_of: HashMap<usize, (usize, usize)>,
}

impl EnvMap {
    pub fn new(src: &str) -> Self {
        let bytes = src.as_bytes();
        let mut open: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut end_of = HashMap::new();
        for caps in ENV_TAG.captures_iter(src) {
            let (Some(whole), Some(kind), Some(name)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            if is_escaped(bytes, whole.start()) {
                continue;
            }
            if kind.as_str() == "begin" {
                open.entry(name.as_str()).or_default().push(whole.start());
            } else if let Some(start) = open.get_mut(name.as_str()).and_then(Vec::pop) {
                end_of.insert(start, (whole.start(), whole.end()));
            }
        }
        Self { end_of }
    }

    /// For the `\begin` at `begin`: start of its `\end{..}` tag and the index past it.
    pub fn end(&self, begin: usize) -> Option<(usize, usize)> {
        self.end_of.get(&begin).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Ordered,
    Unordered,
    Description,
}

impl ListKind {
    fn close_item(self) -> &'static str {
        match self {
            ListKind::Description => "</dd>",
            ListKind::Ordered | ListKind::Unordered => "</li>",
        }
    }
}

/// Renders one fragment into HTML paragraphs.
pub struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    braces: BraceMap,
    envs: EnvMap,
    finder: Finder<'a>,
    /// Index of the first non-blank byte of every line, ascending.
    line_leads: Vec<usize>,
    max_depth: usize,
    paragraphs: Vec<String>,
    /// At top level: nothing but comment lines since the last newline.
    fresh_line: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str, max_depth: usize) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            braces: BraceMap::new(src),
            envs: EnvMap::new(src),
            finder: Finder::new(src),
            line_leads: line_leads(src.as_bytes()),
            max_depth,
            paragraphs: Vec::new(),
            fresh_line: true,
        }
    }

    /// Render the whole fragment, split at top-level blank lines.
    pub fn paragraphs(mut self) -> Vec<String> {
        let mut out = String::new();
        self.range(0, self.src.len(), 0, None, &mut out);
        self.paragraphs.push(out);
        self.paragraphs
    }

    fn range(
        &mut self,
        start: usize,
        end: usize,
        depth: usize,
        list: Option<ListKind>,
        out: &mut String,
    ) {
        let top = depth == 0 && list.is_none();
        let mut item_open = false;
        let mut i = start;
        while i < end {
            let b = self.bytes[i];
            if top && b == b'\n' {
                i = self.newline(i, end, out);
                continue;
            }
            if b == b'%' {
                i = self.comment(i, end, out);
                continue;
            }
            if !matches!(b, b' ' | b'\t' | b'\n') {
                self.fresh_line = false;
            }
            i = match b {
                b'\\' => self.command(i, end, depth, list, &mut item_open, out),
                b'$' => self.dollar(i, end, out),
                b'{' => self.group(i, end, depth, out),
                b'~' => {
                    out.push_str("&nbsp;");
                    i + 1
                }
                b'<' => {
                    out.push_str("&lt;");
                    i + 1
                }
                b'>' => {
                    out.push_str("&gt;");
                    i + 1
                }
                _ => {
                    let stop = self.plain_end(i, end);
                    let run = &self.src[i..stop];
                    if !run.trim().is_empty() {
                        self.fresh_line = false;
                    }
                    out.push_str(run);
                    stop
                }
            };
        }
        if let (true, Some(kind)) = (item_open, list) {
            trim_end_in_place(out);
            out.push_str(kind.close_item());
        }
    }

    /// Render `start..end` one level deeper, or as text past the depth limit.
    fn nested(
        &mut self,
        start: usize,
        end: usize,
        depth: usize,
        list: Option<ListKind>,
        out: &mut String,
    ) {
        if depth >= self.max_depth {
            push_text(out, &self.src[start..end]);
        } else {
            self.range(start, end, depth + 1, list, out);
        }
    }

    /// First byte after `i` that needs attention.
    fn plain_end(&self, i: usize, end: usize) -> usize {
        self.bytes[i + 1..end]
            .iter()
            .position(|b| matches!(b, b'\\' | b'$' | b'{' | b'%' | b'~' | b'<' | b'>' | b'\n'))
            .map_or(end, |p| i + 1 + p)
    }

    /// A top-level newline: paragraph break when a blank line follows.
    fn newline(&mut self, i: usize, end: usize, out: &mut String) -> usize {
        let mut blank = self.fresh_line;
        let mut j = i + 1;
        loop {
            let k = skip_blanks(self.bytes, j).min(end);
            if k < end && self.bytes[k] == b'\n' {
                blank = true;
                j = k + 1;
            } else {
                break;
            }
        }
        if blank {
            trim_end_in_place(out);
            self.paragraphs.push(std::mem::take(out));
            self.fresh_line = true;
            j
        } else {
            out.push('\n');
            self.fresh_line = true;
            i + 1
        }
    }

    /// Drop a comment. A comment filling its whole line takes the newline too.
    fn comment(&mut self, i: usize, end: usize, out: &mut String) -> usize {
        let line_end = self.bytes[i..end]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(end, |p| i + p);
        let whole_line = self.line_leads.binary_search(&i).is_ok();
        if whole_line && line_end < end {
            while out.ends_with(|c: char| c == ' ' || c == '\t') {
                out.pop();
            }
            line_end + 1
        } else {
            self.fresh_line = false;
            line_end
        }
    }

    fn dollar(&mut self, i: usize, end: usize, out: &mut String) -> usize {
        match math_span_at(self.src, i, &mut self.finder) {
            Some((_, close)) if close <= end => {
                out.push_str(&self.src[i..close]);
                close
            }
            _ => {
                let width = if i + 1 < end && self.bytes[i + 1] == b'$' { 2 } else { 1 };
                out.push_str(&self.src[i..i + width]);
                i + width
            }
        }
    }

    /// A bare `{...}` group is transparent.
    fn group(&mut self, i: usize, end: usize, depth: usize, out: &mut String) -> usize {
        match self.braces.close(i) {
            Some(close) if close < end => {
                self.nested(i + 1, close, depth, None, out);
                close + 1
            }
            _ => {
                out.push('{');
                i + 1
            }
        }
    }

    /// `(open, close)` of a required `{...}` argument starting at or after `from`.
    fn arg(&self, from: usize, end: usize) -> Option<(usize, usize)> {
        let j = skip_arg_space(self.bytes, from);
        if j >= end || self.bytes[j] != b'{' {
            return None;
        }
        let close = self.braces.close(j)?;
        (close < end).then_some((j, close))
    }

    /// `(open, close)` of an optional `[...]` argument at `from`.
    fn opt(&self, from: usize, end: usize) -> Option<(usize, usize)> {
        let j = skip_blanks(self.bytes, from);
        if j >= end || self.bytes[j] != b'[' {
            return None;
        }
        let close = matching_bracket(self.bytes, j)?;
        (close < end).then_some((j, close))
    }

    fn skip_opts(&self, mut from: usize, end: usize) -> usize {
        while let Some((_, close)) = self.opt(from, end) {
            from = close + 1;
        }
        from
    }

    fn skip_star(&self, from: usize, end: usize) -> usize {
        if from < end && self.bytes[from] == b'*' {
            from + 1
        } else {
            from
        }
    }

    /// Skip a `{}` that only terminates a command name, as in `\ldots{}`.
    fn skip_empty_group(&self, from: usize, end: usize) -> usize {
        if from + 1 < end && &self.bytes[from..from + 2] == b"{}" {
            from + 2
        } else {
            from
        }
    }

    /// Wrap the required argument at `from` in `open`/`close`; literal when missing.
    fn wrap_arg(
        &mut self,
        i: usize,
        from: usize,
        end: usize,
        depth: usize,
        (open, close): (&str, &str),
        out: &mut String,
    ) -> usize {
        match self.arg(from, end) {
            Some((lbrace, rbrace)) => {
                out.push_str(open);
                self.nested(lbrace + 1, rbrace, depth, None, out);
                out.push_str(close);
                rbrace + 1
            }
            None => {
                out.push_str(&self.src[i..from]);
                from
            }
        }
    }

    fn command(
        &mut self,
        i: usize,
        end: usize,
        depth: usize,
        list: Option<ListKind>,
        item_open: &mut bool,
        out: &mut String,
    ) -> usize {
        let (name, after) = command_name(self.src, i);
        if after > end {
            push_text(out, &self.src[i..end]);
            return end;
        }
        match name {
            "" => {
                out.push('\\');
                after
            }
            "\\" => {
                out.push_str("<br>");
                let next = self.skip_star(after, end);
                self.opt(next, end).map_or(next, |(_, close)| close + 1)
            }
            "newline" | "linebreak" => {
                out.push_str("<br>");
                self.opt(after, end).map_or(after, |(_, close)| close + 1)
            }
            "_" | "&" | "%" | "#" | "$" | "{" | "}" => {
                out.push_str(name);
                after
            }
            "^" => {
                out.push('^');
                self.skip_empty_group(after, end)
            }
            " " | "\n" | "\t" => {
                out.push(' ');
                after
            }
            "," => {
                out.push_str("&thinsp;");
                after
            }
            "[" | "(" => match math_span_at(self.src, i, &mut self.finder) {
                Some((_, close)) if close <= end => {
                    out.push_str(&self.src[i..close]);
                    close
                }
                _ => {
                    out.push_str(&self.src[i..after]);
                    after
                }
            },
            "ldots" | "dots" | "textellipsis" => {
                out.push('…');
                self.skip_empty_group(after, end)
            }
            "begin" => self.environment(i, after, end, depth, out),
            "end" => match env_name(self.src, after) {
                Some((_, past)) if past <= end => {
                    push_text(out, &self.src[i..past]);
                    past
                }
                _ => {
                    out.push_str("\\end");
                    after
                }
            },
            "item" => match list {
                Some(kind) => self.item(after, end, depth, kind, item_open, out),
                None => {
                    out.push_str("\\item");
                    after
                }
            },
            "underline" => self.underline(i, after, end, depth, out),
            "hrule" => {
                out.push_str("<hr>");
                after
            }
            "rule" => {
                let mut next = self.skip_opts(after, end);
                for _ in 0..2 {
                    if let Some((_, close)) = self.arg(next, end) {
                        next = close + 1;
                    }
                }
                out.push_str("<hr>");
                next
            }
            "fbox" | "framebox" => {
                let from = self.skip_opts(after, end);
                self.wrap_arg(i, from, end, depth, ("<div class=\"boxed\">", "</div>"), out)
            }
            "mbox" | "makebox" => {
                let from = self.skip_opts(after, end);
                self.wrap_arg(i, from, end, depth, ("", ""), out)
            }
            "parbox" => {
                let from = self.skip_opts(after, end);
                match self.arg(from, end) {
                    Some((_, width_close)) => {
                        self.wrap_arg(i, width_close + 1, end, depth, ("", ""), out)
                    }
                    None => {
                        out.push_str(&self.src[i..from]);
                        from
                    }
                }
            }
            "vspace" | "hspace" => {
                let from = self.skip_star(after, end);
                match self.arg(from, end) {
                    Some((open, close)) => {
                        let length = css_length(&self.src[open + 1..close]);
                        out.push_str(&spacer(name == "vspace", &length));
                        close + 1
                    }
                    None => {
                        out.push_str(&self.src[i..from]);
                        from
                    }
                }
            }
            "hfill" => {
                out.push_str("<span class=\"hfill\" style=\"display:inline-block;min-width:2em\"></span>");
                after
            }
            _ => self.table_command(i, name, after, end, depth, list, out),
        }
    }

    /// Commands described by the tables in [`crate::papertex::render::commands`].
    #[allow(clippy::too_many_arguments)]
    fn table_command(
        &mut self,
        i: usize,
        name: &str,
        after: usize,
        end: usize,
        depth: usize,
        list: Option<ListKind>,
        out: &mut String,
    ) -> usize {
        if let Some(tag) = lookup(INLINE_STYLES, name) {
            let (open, close) = (format!("<{}>", tag), format!("</{}>", tag));
            return self.wrap_arg(i, after, end, depth, (open.as_str(), close.as_str()), out);
        }
        if let Some(tag) = lookup(SECTIONS, name) {
            let from = self.skip_opts(self.skip_star(after, end), end);
            let (open, close) = (format!("<{}>", tag), format!("</{}>", tag));
            return self.wrap_arg(i, from, end, depth, (open.as_str(), close.as_str()), out);
        }
        if let Some(size) = lookup(SIZES, name) {
            let (open, close) = (format!("<span style=\"font-size:{}\">", size), "</span>");
            if self.arg(after, end).is_some() {
                return self.wrap_arg(i, after, end, depth, (open.as_str(), close), out);
            }
            return self.declaration(after, end, depth, list, (open.as_str(), close), out);
        }
        if let Some(tag) = lookup(DECLARATIONS, name) {
            let (open, close) = (format!("<{}>", tag), format!("</{}>", tag));
            return self.declaration(after, end, depth, list, (open.as_str(), close.as_str()), out);
        }
        if let Some(height) = lookup(SKIPS, name) {
            out.push_str(&spacer(true, height));
            return after;
        }
        if let Some(width) = lookup(QUADS, name) {
            out.push_str(&spacer(false, width));
            return after;
        }
        if let Some(args) = removed_args(name) {
            return self.skip_args(after, end, args);
        }

        // unknown: keep the command and its braces, render inside them
        out.push_str(&self.src[i..after]);
        self.literal_groups(after, end, depth, out)
    }

    /// Render brace groups directly at `from` with their braces kept.
    fn literal_groups(&mut self, from: usize, end: usize, depth: usize, out: &mut String) -> usize {
        let mut next = from;
        while let Some(close) = self.braces.close(next).filter(|&close| close < end) {
            out.push('{');
            self.nested(next + 1, close, depth, None, out);
            out.push('}');
            next = close + 1;
        }
        next
    }

    /// A declaration applies to everything after it in the current range.
    fn declaration(
        &mut self,
        after: usize,
        end: usize,
        depth: usize,
        list: Option<ListKind>,
        (open, close): (&str, &str),
        out: &mut String,
    ) -> usize {
        let from = skip_blanks(self.bytes, after).min(end);
        out.push_str(open);
        self.nested(from, end, depth, list, out);
        out.push_str(close);
        end
    }

    fn skip_args(&self, after: usize, end: usize, args: &[Arg]) -> usize {
        let mut next = after;
        for arg in args {
            let found = match arg {
                Arg::Optional => self.opt(next, end),
                Arg::Required => self.arg(next, end),
            };
            match (found, arg) {
                (Some((_, close)), _) => next = close + 1,
                (None, Arg::Optional) => {}
                (None, Arg::Required) => break,
            }
        }
        next
    }

    /// `\underline{\hspace{..}}` is a fill-in blank; anything else is `<u>`.
    fn underline(
        &mut self,
        i: usize,
        after: usize,
        end: usize,
        depth: usize,
        out: &mut String,
    ) -> usize {
        if let Some((open, close)) = self.arg(after, end) {
            let inner = self.src[open + 1..close].trim();
            if let Some(caps) = BLANK_ARG.captures(inner) {
                out.push_str(&format!(
                    "<span class=\"blank\" style=\"display:inline-block;width:{};border-bottom:1px solid\"></span>",
                    css_length(&caps[1])
                ));
                return close + 1;
            }
        }
        self.wrap_arg(i, after, end, depth, ("<u>", "</u>"), out)
    }

    fn item(
        &mut self,
        after: usize,
        end: usize,
        depth: usize,
        kind: ListKind,
        item_open: &mut bool,
        out: &mut String,
    ) -> usize {
        trim_end_in_place(out);
        if *item_open {
            out.push_str(kind.close_item());
        }
        let label = self.opt(after, end);
        let next = label.map_or(after, |(_, close)| close + 1);
        match kind {
            ListKind::Description => {
                out.push_str("<dt>");
                if let Some((open, close)) = label {
                    self.nested(open + 1, close, depth, None, out);
                }
                out.push_str("</dt><dd>");
            }
            ListKind::Ordered | ListKind::Unordered => {
                out.push_str("<li>");
                if let Some((open, close)) = label {
                    self.nested(open + 1, close, depth, None, out);
                    out.push(' ');
                }
            }
        }
        *item_open = true;
        skip_arg_space(self.bytes, next).min(end)
    }

    fn environment(
        &mut self,
        i: usize,
        after: usize,
        end: usize,
        depth: usize,
        out: &mut String,
    ) -> usize {
        if let Some((_, close)) = math_span_at(self.src, i, &mut self.finder) {
            if close <= end {
                out.push_str(&self.src[i..close]);
                return close;
            }
        }
        let Some((name, body)) = env_name(self.src, after).filter(|(_, body)| *body <= end) else {
            out.push_str("\\begin");
            return after;
        };
        let Some((tag_start, tag_end)) = self.envs.end(i).filter(|(_, tag_end)| *tag_end <= end)
        else {
            push_text(out, &self.src[i..body]);
            return body;
        };

        if name == "document" {
            self.nested(body, tag_start, depth, None, out);
        } else if name == "comment" {
            // dropped
        } else if let Some(align) = lookup(ALIGNMENTS, name) {
            out.push_str(&format!("<div style=\"text-align:{}\">", align));
            self.nested(body, tag_start, depth, None, out);
            out.push_str("</div>");
        } else if BOXED_ENVS.contains(&name) {
            let from = self.skip_opts(body, tag_start);
            out.push_str("<div class=\"boxed\">");
            self.nested(from, tag_start, depth, None, out);
            out.push_str("</div>");
        } else if PREFORMATTED_ENVS.contains(&name) {
            let mut from = self.skip_opts(body, tag_start);
            if name == "minted" {
                from = self.arg(from, tag_start).map_or(from, |(_, close)| close + 1);
            }
            let content = &self.src[from..tag_start];
            let content = content
                .strip_prefix("\r\n")
                .or_else(|| content.strip_prefix('\n'))
                .unwrap_or(content);
            out.push_str("<pre>");
            out.push_str(&escape_html(content));
            out.push_str("</pre>");
        } else if let Some(kind) = list_kind(name) {
            let option = self.opt(body, tag_start);
            let from = option.map_or(body, |(_, close)| close + 1);
            let open = match kind {
                ListKind::Ordered => option
                    .and_then(|(open, close)| parse_style(&self.src[open + 1..close]))
                    .map_or_else(
                        || "<ol>".to_string(),
                        |style| format!("<ol type=\"{}\">", style.counter.html_type()),
                    ),
                ListKind::Unordered => "<ul>".to_string(),
                ListKind::Description => "<dl>".to_string(),
            };
            out.push_str(&open);
            self.nested(from, tag_start, depth, Some(kind), out);
            trim_end_in_place(out);
            out.push_str(match kind {
                ListKind::Ordered => "</ol>",
                ListKind::Unordered => "</ul>",
                ListKind::Description => "</dl>",
            });
        } else {
            // unknown environment: keep the tags, render the body
            push_text(out, &self.src[i..body]);
            return self.literal_groups(body, tag_start, depth, out);
        }
        tag_end
    }
}

/// First non-blank byte of each line that has one.
fn line_leads(bytes: &[u8]) -> Vec<usize> {
    let mut leads = Vec::new();
    let mut at_start = true;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'\n' => at_start = true,
            b' ' | b'\t' => {}
            _ if at_start => {
                leads.push(i);
                at_start = false;
            }
            _ => {}
        }
    }
    leads
}

fn list_kind(name: &str) -> Option<ListKind> {
    match name {
        "enumerate" => Some(ListKind::Ordered),
        "itemize" => Some(ListKind::Unordered),
        "description" => Some(ListKind::Description),
        _ => None,
    }
}

fn spacer(vertical: bool, length: &str) -> String {
    if vertical {
        format!("<div style=\"height:{}\"></div>", length)
    } else {
        format!("<span style=\"display:inline-block;width:{}\"></span>", length)
    }
}

fn trim_end_in_place(out: &mut String) {
    let kept = out.trim_end().len();
    out.truncate(kept);
}

/// Append source text with `<` and `>` escaped.
fn push_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

/// Full HTML escaping for preformatted text.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(src: &str) -> Vec<String> {
        Scanner::new(src, 32).paragraphs()
    }

    #[test]
    fn test_env_map_handles_nesting() {
        let src = r"\begin{enumerate}\begin{enumerate}\end{enumerate}\end{enumerate}";
        let map = EnvMap::new(src);
        assert_eq!(map.end(0), Some((49, src.len())));
        assert_eq!(map.end(17), Some((34, 49)));
    }

    #[test]
    fn test_blank_lines_split_paragraphs() {
        assert_eq!(scan("one\n\n  \ntwo\nthree"), vec!["one", "two\nthree"]);
    }

    #[test]
    fn test_comment_lines_vanish() {
        assert_eq!(scan("a\n% hidden\nb"), vec!["a\nb"]);
        assert_eq!(scan("a\n% hidden\n\nb"), vec!["a", "b"]);
        assert_eq!(scan("a % trailing\nb"), vec!["a \nb"]);
    }

    #[test]
    fn test_blank_lines_inside_groups_do_not_split() {
        assert_eq!(scan("\\textbf{a\n\nb}"), vec!["<strong>a\n\nb</strong>"]);
    }

    #[test]
    fn test_line_leads() {
        assert_eq!(line_leads(b"ab\n  %c\n\n\t{%}{%}"), vec![0, 5, 10]);
    }

    #[test]
    fn test_comments_in_groups_on_one_line() {
        assert_eq!(scan("{%}{%}x"), vec!["x"]);
        assert_eq!(scan("a\n  {%}\nb"), vec!["a\n  \nb"]);
    }

    #[test]
    fn test_many_comment_groups_stay_linear() {
        let src = "{%}".repeat(100_000);
        let started = std::time::Instant::now();
        assert_eq!(scan(&src), vec![""]);
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
    }

    #[test]
    fn test_math_is_copied_verbatim() {
        assert_eq!(scan(r"$a<b$ and \(x_1\)"), vec![r"$a<b$ and \(x_1\)"]);
    }

    #[test]
    fn test_unclosed_math_is_literal() {
        assert_eq!(scan("cost $5"), vec!["cost $5"]);
    }

    #[test]
    fn test_depth_limit_emits_text() {
        let out = Scanner::new("{{{<b>}}}", 2).paragraphs();
        assert_eq!(out, vec!["&lt;b&gt;"]);
        let out = Scanner::new(r"\textbf{\textbf{\textbf{\emph{x}}}}", 2).paragraphs();
        assert_eq!(
            out,
            vec![r"<strong><strong><strong>\emph{x}</strong></strong></strong>"]
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&"#), "&lt;a href=&quot;x&quot;&gt;&amp;");
    }
}
