//! Markdown text parser
//!
//! Converts note text into a [`Document`] in a single forward pass over the
//! input lines. The parser never fails: anything it cannot classify becomes a
//! paragraph holding the literal characters.

mod inline;
mod list;

use crate::document_model::{Block, Document};
use regex::Regex;
use std::sync::LazyLock;

pub use inline::parse_inline;
use list::ListLine;

/// `# heading` through `###### heading`
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6}) (.*)$").expect("heading pattern is valid"));

const FENCE: &str = "```";

/// Parse markdown text into a document tree
///
/// # Parameters
/// * `text` - Note content, possibly malformed
///
/// # Returns
/// * `Document` - The parsed tree; never empty
pub fn parse(text: &str) -> Document {
    MarkdownParser::new(text).run()
}

/// Parser state: the input split into lines and a cursor into them
pub struct MarkdownParser<'a> {
    /// Input lines with line terminators removed
    lines: Vec<&'a str>,

    /// Index of the next line to consume
    cursor: usize,
}

impl<'a> MarkdownParser<'a> {
    /// Create a parser over `text`
    pub fn new(text: &'a str) -> Self {
        let lines = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        Self { lines, cursor: 0 }
    }

    /// Consume all lines and build the document
    pub fn run(mut self) -> Document {
        let mut blocks: Vec<Block> = Vec::new();
        while let Some(block) = self.next_block() {
            // A list that started deeper than the one after it is the same list
            let continues_list = matches!(
                (blocks.last(), &block),
                (Some(Block::List(prev)), Block::List(next)) if prev.kind() == next.kind()
            );
            if !continues_list {
                blocks.push(block);
            } else if let (Some(Block::List(prev)), Block::List(next)) = (blocks.last_mut(), block) {
                prev.append(next);
            }
        }
        log::debug!(
            "Parsed {} lines into {} blocks",
            self.lines.len(),
            blocks.len()
        );
        Document::from_blocks(blocks)
    }

    /// The line under the cursor, if any input is left
    fn current_line(&self) -> Option<&'a str> {
        self.lines.get(self.cursor).copied()
    }

    /// Classify the line under the cursor and consume one block
    fn next_block(&mut self) -> Option<Block> {
        let line = self.current_line()?;

        if let Some(info) = line.strip_prefix(FENCE) {
            return Some(self.code_block(info));
        }

        if let Some(item) = ListLine::parse(line) {
            return Some(Block::List(self.list(item.indent, item.kind)));
        }

        self.cursor += 1;

        if let Some(caps) = HEADING.captures(line) {
            let level = caps[1].len();
            let content = parse_inline(caps.get(2).map_or("", |m| m.as_str()));
            return Some(Block::Heading { level, content });
        }

        if let Some(rest) = line.strip_prefix("> ") {
            return Some(Block::Quote(parse_inline(rest)));
        }

        Some(Block::Paragraph(parse_inline(line)))
    }

    /// Consume a fenced code block starting at the cursor
    ///
    /// Runs to the closing fence, or to the end of input when the fence is
    /// never closed.
    fn code_block(&mut self, info: &str) -> Block {
        let language = Some(info.trim())
            .filter(|lang| !lang.is_empty())
            .map(str::to_string);

        self.cursor += 1;
        let start = self.cursor;
        while let Some(line) = self.current_line() {
            if line.trim() == FENCE {
                break;
            }
            self.cursor += 1;
        }
        let code = self.lines[start..self.cursor].join("\n");

        // Step over the closing fence if there was one
        if self.cursor < self.lines.len() {
            self.cursor += 1;
        }

        Block::CodeBlock { language, code }
    }
}
