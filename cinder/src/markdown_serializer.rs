//! Markdown serializer for document trees
//!
//! Writes a [`Document`] back to the markdown subset understood by
//! [`crate::markdown_parser`]. Serialization is total: every tree shape
//! produces text, and output of the parser round-trips unchanged.

use crate::document_model::{Block, Document, Inline, List, ListItemContent, ListKind, TextRun};
use itertools::Itertools;

/// Serialize a document to markdown
///
/// # Parameters
/// * `doc` - The document to serialize
///
/// # Returns
/// * `String` - One line per paragraph, heading, quote and list item, with
///   code blocks spanning several lines; lines joined with `\n`
pub fn serialize(doc: &Document) -> String {
    let mut lines = Vec::new();
    for block in doc.blocks() {
        write_block(&mut lines, block);
    }
    lines.iter().join("\n")
}

/// Write a single block to the output lines
fn write_block(lines: &mut Vec<String>, block: &Block) {
    match block {
        Block::Heading { level, content } => {
            let prefix = "#".repeat((*level).clamp(1, 6));
            lines.push(format!("{} {}", prefix, inlines_to_markdown(content)));
        }

        Block::Paragraph(content) => {
            lines.push(inlines_to_markdown(content));
        }

        Block::Quote(content) => {
            lines.push(format!("> {}", inlines_to_markdown(content)));
        }

        Block::CodeBlock { language, code } => {
            let lang = language.as_deref().unwrap_or("");
            lines.push(format!("```{}", lang));
            lines.push(code.clone());
            lines.push("```".to_string());
        }

        Block::List(list) => {
            write_list(lines, list, 0);
        }
    }
}

/// Write a list, one line per item, indented two spaces per depth
///
/// Numbered items use a running index that skips wrapper items, so a
/// nested list does not consume a number of its parent.
fn write_list(lines: &mut Vec<String>, list: &List, depth: usize) {
    let indent = "  ".repeat(depth);
    let mut index = 1;

    for item in list.items() {
        match item.content() {
            ListItemContent::Nested(nested) => {
                write_list(lines, nested, depth + 1);
            }
            ListItemContent::Inline(content) => {
                let marker = get_list_marker(list.kind(), item.checked(), index);
                lines.push(format!(
                    "{}{}{}",
                    indent,
                    marker,
                    inlines_to_markdown(content)
                ));
                index += 1;
            }
        }
    }
}

/// Get the marker string for a list item
fn get_list_marker(kind: ListKind, checked: Option<bool>, index: usize) -> String {
    match kind {
        ListKind::Numbered => format!("{}. ", index),
        ListKind::Checklist if checked == Some(true) => "- [x] ".to_string(),
        ListKind::Checklist => "- [ ] ".to_string(),
        ListKind::Bullet => "- ".to_string(),
    }
}

/// Convert inline nodes to a markdown string
fn inlines_to_markdown(inlines: &[Inline]) -> String {
    let mut result = String::new();

    for inline in inlines {
        match inline {
            Inline::Text(run) => result.push_str(&run_to_markdown(run)),
            Inline::Link(link) => {
                result.push_str(&format!(
                    "[{}]({})",
                    inlines_to_markdown(&link.children),
                    link.url
                ));
            }
            Inline::Raw(text) => result.push_str(text),
        }
    }

    result
}

/// Convert a text run to markdown
///
/// Formats are applied in a fixed order, innermost first: code, then bold
/// and italic (jointly as `***` when both are set), then strikethrough.
fn run_to_markdown(run: &TextRun) -> String {
    if run.text.is_empty() {
        return String::new();
    }

    let format = run.format;
    let mut text = run.text.clone();
    if !format.has_formatting() {
        return text;
    }

    if format.code {
        text = format!("`{}`", text);
    }
    if format.bold && format.italic {
        text = format!("***{}***", text);
    } else if format.bold {
        text = format!("**{}**", text);
    } else if format.italic {
        text = format!("*{}*", text);
    }
    if format.strikethrough {
        text = format!("~~{}~~", text);
    }

    text
}
