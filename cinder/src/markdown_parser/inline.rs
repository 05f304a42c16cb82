//! Inline parsing: links, code spans and the fixed formatting grammar
//!
//! Rules are tried left to right at each cursor position in this order:
//! link, inline code, strikethrough, bold+italic, bold, italic. Only these
//! compositions are recognised:
//!
//! * `~~x~~` where `x` may be `***y***`, `**y**` or `*y*`
//! * `***y***`
//! * `**x**` and `*x*` where `x` may be `~~y~~`
//!
//! and the innermost `y` may be a whole code span. Anything else is literal
//! text.

use crate::document_model::{Inline, Link, TextFormat, TextRun};

/// Characters that may start an inline construct
const SPECIAL: [char; 4] = ['[', '`', '*', '~'];

/// Parse inline markdown into a sequence of inline nodes
///
/// # Parameters
/// * `text` - Content of a single line (heading/quote/list markers removed)
///
/// # Returns
/// * `Vec<Inline>` - Text runs and links; empty for empty input
pub fn parse_inline(text: &str) -> Vec<Inline> {
    InlineScanner::new(text, true).run()
}

struct InlineScanner<'a> {
    text: &'a str,
    pos: usize,
    allow_links: bool,
    nodes: Vec<Inline>,
    plain: String,
}

impl<'a> InlineScanner<'a> {
    fn new(text: &'a str, allow_links: bool) -> Self {
        Self {
            text,
            pos: 0,
            allow_links,
            nodes: Vec::new(),
            plain: String::new(),
        }
    }

    fn run(mut self) -> Vec<Inline> {
        while self.pos < self.text.len() {
            let rest = &self.text[self.pos..];

            let matched = self
                .link(rest)
                .or_else(|| code_span(rest))
                .or_else(|| formatted(rest));

            if let Some((node, consumed)) = matched {
                self.flush_plain();
                self.nodes.push(node);
                self.pos += consumed;
                continue;
            }

            // Take the current character literally, then everything up to the
            // next character that could start a construct
            let first = rest.chars().next().map_or(1, char::len_utf8);
            let end = rest[first..]
                .find(SPECIAL)
                .map_or(rest.len(), |offset| first + offset);
            self.plain.push_str(&rest[..end]);
            self.pos += end;
        }

        self.flush_plain();
        self.nodes
    }

    fn flush_plain(&mut self) {
        if !self.plain.is_empty() {
            let text = std::mem::take(&mut self.plain);
            self.nodes.push(Inline::Text(TextRun::new(text)));
        }
    }

    /// `[text](url)`; link text is parsed for formatting but not for links
    fn link(&self, rest: &str) -> Option<(Inline, usize)> {
        if !self.allow_links {
            return None;
        }
        let after_open = rest.strip_prefix('[')?;
        let close = after_open.find(']')?;
        let label = &after_open[..close];
        if label.is_empty() || label.contains('[') {
            return None;
        }

        let target = after_open[close + 1..].strip_prefix('(')?;
        let end = target.find(')')?;
        let url = &target[..end];
        if url.is_empty() || url.contains(char::is_whitespace) {
            return None;
        }

        let children = InlineScanner::new(label, false).run();
        // '[' + label + "](" + url + ')'
        let consumed = 1 + close + 2 + end + 1;
        Some((Inline::Link(Link::new(url, children)), consumed))
    }
}

/// `` `code` ``; content is never parsed further
fn code_span(rest: &str) -> Option<(Inline, usize)> {
    let (content, consumed) = delimited(rest, "`")?;
    Some((
        Inline::Text(TextRun::with_format(content, TextFormat::new().code())),
        consumed,
    ))
}

/// Strikethrough, bold+italic, bold and italic spans, in that precedence
fn formatted(rest: &str) -> Option<(Inline, usize)> {
    strikethrough(rest)
        .or_else(|| bold_italic(rest))
        .or_else(|| emphasis(rest, "**", TextFormat::new().bold()))
        .or_else(|| emphasis(rest, "*", TextFormat::new().italic()))
        .map(|((text, format), consumed)| {
            (Inline::Text(TextRun::with_format(text, format)), consumed)
        })
}

type Span<'a> = ((&'a str, TextFormat), usize);

fn strikethrough(rest: &str) -> Option<Span<'_>> {
    let (content, consumed) = delimited(rest, "~~")?;
    let (text, format) = wrapped(content, "***")
        .map(|inner| core(inner, TextFormat::new().bold().italic()))
        .or_else(|| wrapped(content, "**").map(|inner| core(inner, TextFormat::new().bold())))
        .or_else(|| wrapped(content, "*").map(|inner| core(inner, TextFormat::new().italic())))
        .unwrap_or_else(|| core(content, TextFormat::PLAIN));
    Some(((text, format.strikethrough()), consumed))
}

fn bold_italic(rest: &str) -> Option<Span<'_>> {
    let (content, consumed) = delimited(rest, "***")?;
    Some((core(content, TextFormat::new().bold().italic()), consumed))
}

/// Bold or italic, optionally wrapping a strikethrough
fn emphasis<'a>(rest: &'a str, marker: &str, format: TextFormat) -> Option<Span<'a>> {
    let (content, consumed) = delimited(rest, marker)?;
    let span = match wrapped(content, "~~") {
        Some(inner) => core(inner, format.strikethrough()),
        None => core(content, format),
    };
    Some((span, consumed))
}

/// Innermost content: a whole code span adds `Code`, anything else is literal
fn core(content: &str, format: TextFormat) -> (&str, TextFormat) {
    match wrapped(content, "`") {
        Some(code) => (code, format.code()),
        None => (content, format),
    }
}

/// Match `marker content marker` at the start of `rest`, closing at the first
/// occurrence of `marker`
///
/// # Returns
/// * `Some((content, consumed))` - Non-empty content and the bytes consumed
/// * `None` - No opening marker, no closing marker, or empty content
fn delimited<'a>(rest: &'a str, marker: &str) -> Option<(&'a str, usize)> {
    let after_open = rest.strip_prefix(marker)?;
    let close = after_open.find(marker)?;
    if close == 0 {
        return None;
    }
    Some((&after_open[..close], marker.len() * 2 + close))
}

/// Match content that is entirely `marker inner marker` with no further
/// marker inside
fn wrapped<'a>(content: &'a str, marker: &str) -> Option<&'a str> {
    let inner = content.strip_prefix(marker)?.strip_suffix(marker)?;
    (!inner.is_empty() && !inner.contains(marker)).then_some(inner)
}
