//! List parsing: bullet, numbered and checklist items with indentation nesting

use super::{parse_inline, MarkdownParser};
use crate::document_model::{List, ListItem, ListKind};
use regex::Regex;
use std::sync::LazyLock;

/// `- item`, `* item`, `+ item`, `12. item`, `- [ ] item`, `- [x] item`
static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([ \t]*)(?:([-*+]) (?:\[([ xX])\] )?|(\d{1,9})\. )(.*)$")
        .expect("list item pattern is valid")
});

/// Columns a tab advances the indent by
const TAB_WIDTH: usize = 4;

/// A single line recognised as a list item
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ListLine<'a> {
    /// Leading whitespace width in columns
    pub indent: usize,
    /// List flavour implied by the marker
    pub kind: ListKind,
    /// Checked state for checklist items
    pub checked: Option<bool>,
    /// Text after the marker
    pub content: &'a str,
}

impl<'a> ListLine<'a> {
    /// Match `line` against the list item patterns
    ///
    /// # Returns
    /// * `Some(ListLine)` - The line is a list item
    /// * `None` - Any other line, including blank ones
    pub fn parse(line: &'a str) -> Option<Self> {
        let caps = LIST_ITEM.captures(line)?;

        let indent = caps[1]
            .chars()
            .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
            .sum();

        let (kind, checked) = match caps.get(3) {
            Some(mark) => (ListKind::Checklist, Some(mark.as_str() != " ")),
            None if caps.get(2).is_some() => (ListKind::Bullet, None),
            None => (ListKind::Numbered, None),
        };

        let content = caps.get(5).map_or("", |m| m.as_str());

        Some(Self {
            indent,
            kind,
            checked,
            content,
        })
    }

    fn into_item(self) -> ListItem {
        let content = parse_inline(self.content);
        match self.checked {
            Some(checked) => ListItem::checklist(checked, content),
            None => ListItem::new(content),
        }
    }
}

impl MarkdownParser<'_> {
    /// Consume a run of list lines sharing `base_indent` and `kind`
    ///
    /// Deeper-indented items become a nested list attached as a wrapper item
    /// after the preceding sibling; consecutive nested runs of one kind share
    /// a wrapper. A shallower item, a blank line, a non-item line, or an item
    /// of another kind at this indent ends the list without being consumed.
    pub(super) fn list(&mut self, base_indent: usize, kind: ListKind) -> List {
        let mut list = List::new(kind);

        while let Some(line) = self.current_line() {
            let Some(item) = ListLine::parse(line) else {
                break;
            };

            if item.indent < base_indent {
                break;
            }

            if item.indent > base_indent {
                let nested = self.list(item.indent, item.kind);
                list.push_nested(nested);
                continue;
            }

            if item.kind != kind {
                break;
            }

            list.push_parsed(item.into_item());
            self.cursor += 1;
        }

        list
    }
}
