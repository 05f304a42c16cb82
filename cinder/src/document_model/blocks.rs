//! Block-level note elements
//!
//! This module defines the structured representation of note content at the
//! block level (paragraphs, headings, quotes, code blocks and lists).

use super::error::TreeError;
use super::text_run::{inline_plain_text, Inline};

/// Block-level note element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A heading with level and inline content
    Heading {
        /// Heading level (1 = h1 ... 6 = h6)
        level: usize,
        /// Inline content of the heading
        content: Vec<Inline>,
    },

    /// A paragraph of inline content
    ///
    /// An empty paragraph stands for a blank line in the markdown text.
    Paragraph(Vec<Inline>),

    /// A block quote, holding a single run of inline content
    Quote(Vec<Inline>),

    /// A fenced code block
    CodeBlock {
        /// Language tag written after the opening fence
        language: Option<String>,
        /// Verbatim code content, never inline-parsed
        code: String,
    },

    /// A bullet, numbered or checklist list
    List(List),
}

impl Block {
    /// Create a heading, rejecting levels outside 1..=6
    pub fn heading(level: usize, content: Vec<Inline>) -> Result<Self, TreeError> {
        if !(1..=6).contains(&level) {
            return Err(TreeError::InvalidHeadingLevel { level });
        }
        Ok(Block::Heading { level, content })
    }

    /// Create an empty paragraph
    pub fn empty_paragraph() -> Self {
        Block::Paragraph(Vec::new())
    }

    /// Check the invariants of this block and everything below it
    pub fn validate(&self) -> Result<(), TreeError> {
        match self {
            Block::Heading { level, .. } if !(1..=6).contains(level) => {
                Err(TreeError::InvalidHeadingLevel { level: *level })
            }
            Block::List(list) => list.validate(),
            _ => Ok(()),
        }
    }

    /// Unformatted text of this block; list items are separated by newlines
    pub fn plain_text(&self) -> String {
        match self {
            Block::Heading { content, .. } | Block::Paragraph(content) | Block::Quote(content) => {
                inline_plain_text(content)
            }
            Block::CodeBlock { code, .. } => code.clone(),
            Block::List(list) => list.plain_text(),
        }
    }
}

/// List flavour, shared by all direct items of a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    /// `- item`
    Bullet,
    /// `1. item`
    Numbered,
    /// `- [ ] item` / `- [x] item`
    Checklist,
}

/// An ordered sequence of items of one kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    kind: ListKind,
    items: Vec<ListItem>,
}

impl List {
    /// Create an empty list
    pub fn new(kind: ListKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }

    pub fn kind(&self) -> ListKind {
        self.kind
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Append an item
    ///
    /// # Returns
    /// * `Ok(())` - The item was attached
    /// * `Err(TreeError)` - The item's checked state does not fit this list's kind
    pub fn push_item(&mut self, item: ListItem) -> Result<(), TreeError> {
        self.check_item(&item)?;
        self.items.push(item);
        Ok(())
    }

    /// Append an item the parser built for this list's own kind
    pub(crate) fn push_parsed(&mut self, item: ListItem) {
        debug_assert!(self.check_item(&item).is_ok(), "parser built a mismatched item");
        self.items.push(item);
    }

    /// Attach a parsed sub-list, continuing the preceding sub-list when it
    /// has the same kind
    pub(crate) fn push_nested(&mut self, nested: List) {
        if let Some(ListItemContent::Nested(last)) = self.items.last_mut().map(|item| &mut item.content) {
            if last.kind == nested.kind {
                last.append(nested);
                return;
            }
        }
        self.items.push(ListItem::wrapper(nested));
    }

    /// Move all items of `other`, a list of the same kind, to the end of this one
    pub(crate) fn append(&mut self, other: List) {
        debug_assert_eq!(self.kind, other.kind, "appended list of another kind");
        self.items.extend(other.items);
    }

    /// Insert an item at `index`
    pub fn insert_item(&mut self, index: usize, item: ListItem) -> Result<(), TreeError> {
        if index > self.items.len() {
            return Err(TreeError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        self.check_item(&item)?;
        self.items.insert(index, item);
        Ok(())
    }

    /// Detach and return the item at `index`
    pub fn remove_item(&mut self, index: usize) -> Option<ListItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Mutable access to an item; the checked state can only be flipped, not
    /// added or removed, so the list invariants hold
    pub fn item_mut(&mut self, index: usize) -> Option<&mut ListItem> {
        self.items.get_mut(index)
    }

    /// Check the invariants of this list and all nested lists
    pub fn validate(&self) -> Result<(), TreeError> {
        for item in &self.items {
            self.check_item(item)?;
            if let ListItemContent::Nested(nested) = &item.content {
                nested.validate()?;
            }
        }
        Ok(())
    }

    fn check_item(&self, item: &ListItem) -> Result<(), TreeError> {
        if item.is_wrapper() {
            // Constructors never give wrappers a checked state
            return Ok(());
        }
        match (self.kind, item.checked) {
            (ListKind::Checklist, None) => Err(TreeError::MissingCheckedState),
            (ListKind::Bullet | ListKind::Numbered, Some(_)) => {
                Err(TreeError::UnexpectedCheckedState { kind: self.kind })
            }
            _ => Ok(()),
        }
    }

    fn plain_text(&self) -> String {
        self.items
            .iter()
            .map(|item| match &item.content {
                ListItemContent::Inline(content) => inline_plain_text(content),
                ListItemContent::Nested(nested) => nested.plain_text(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Content of a list item: inline spans, or a single nested list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListItemContent {
    /// Ordinary item text
    Inline(Vec<Inline>),

    /// Wrapper item holding an indented sub-list
    Nested(List),
}

/// A single list item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    checked: Option<bool>,
    content: ListItemContent,
}

impl ListItem {
    /// Create a bullet or numbered item
    pub fn new(content: Vec<Inline>) -> Self {
        Self {
            checked: None,
            content: ListItemContent::Inline(content),
        }
    }

    /// Create a checklist item
    pub fn checklist(checked: bool, content: Vec<Inline>) -> Self {
        Self {
            checked: Some(checked),
            content: ListItemContent::Inline(content),
        }
    }

    /// Create a wrapper item holding a nested list
    pub fn wrapper(nested: List) -> Self {
        Self {
            checked: None,
            content: ListItemContent::Nested(nested),
        }
    }

    pub fn checked(&self) -> Option<bool> {
        self.checked
    }

    /// Set the checked state of a checklist item
    ///
    /// # Returns
    /// * `true` - The state was updated
    /// * `false` - This is not a checklist item; nothing changed
    pub fn set_checked(&mut self, checked: bool) -> bool {
        match self.checked.as_mut() {
            Some(state) => {
                *state = checked;
                true
            }
            None => false,
        }
    }

    pub fn content(&self) -> &ListItemContent {
        &self.content
    }

    /// Mutable access to the inline content; `None` for wrapper items
    pub fn inline_mut(&mut self) -> Option<&mut Vec<Inline>> {
        match &mut self.content {
            ListItemContent::Inline(content) => Some(content),
            ListItemContent::Nested(_) => None,
        }
    }

    /// Mutable access to the nested list; `None` for ordinary items
    pub fn nested_mut(&mut self) -> Option<&mut List> {
        match &mut self.content {
            ListItemContent::Nested(list) => Some(list),
            ListItemContent::Inline(_) => None,
        }
    }

    /// Whether this item only exists to hold a nested list
    pub fn is_wrapper(&self) -> bool {
        matches!(self.content, ListItemContent::Nested(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checklist_rejects_unchecked_item() {
        let mut list = List::new(ListKind::Checklist);
        let result = list.push_item(ListItem::new(vec![Inline::plain("a")]));
        assert_eq!(result, Err(TreeError::MissingCheckedState));
        assert!(list.is_empty());
    }

    #[test]
    fn test_bullet_rejects_checked_item() {
        let mut list = List::new(ListKind::Bullet);
        let result = list.push_item(ListItem::checklist(true, vec![]));
        assert_eq!(
            result,
            Err(TreeError::UnexpectedCheckedState {
                kind: ListKind::Bullet
            })
        );
    }

    #[test]
    fn test_wrapper_accepted_in_any_kind() {
        let mut nested = List::new(ListKind::Bullet);
        nested.push_item(ListItem::new(vec![Inline::plain("b")])).unwrap();

        let mut list = List::new(ListKind::Checklist);
        list.push_item(ListItem::checklist(false, vec![Inline::plain("a")]))
            .unwrap();
        list.push_item(ListItem::wrapper(nested)).unwrap();

        assert_eq!(list.len(), 2);
        assert!(list.items()[1].is_wrapper());
        assert!(list.validate().is_ok());
    }

    #[test]
    fn test_set_checked_only_on_checklist_items() {
        let mut item = ListItem::checklist(false, vec![]);
        assert!(item.set_checked(true));
        assert_eq!(item.checked(), Some(true));

        let mut bullet = ListItem::new(vec![]);
        assert!(!bullet.set_checked(true));
        assert_eq!(bullet.checked(), None);
    }

    #[test]
    fn test_insert_and_remove_item() {
        let mut list = List::new(ListKind::Numbered);
        list.push_item(ListItem::new(vec![Inline::plain("b")])).unwrap();
        list.insert_item(0, ListItem::new(vec![Inline::plain("a")]))
            .unwrap();
        assert!(list
            .insert_item(5, ListItem::new(vec![]))
            .is_err());

        let removed = list.remove_item(0).unwrap();
        assert_eq!(removed.content(), &ListItemContent::Inline(vec![Inline::plain("a")]));
        assert!(list.remove_item(3).is_none());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_edit_items_in_place() {
        // Arrange: Bullet list a, [ ] b nested, c
        let mut nested = List::new(ListKind::Checklist);
        nested
            .push_item(ListItem::checklist(false, vec![Inline::plain("b")]))
            .unwrap();
        let mut list = List::new(ListKind::Bullet);
        list.push_item(ListItem::new(vec![Inline::plain("a")])).unwrap();
        list.push_item(ListItem::wrapper(nested)).unwrap();
        list.push_item(ListItem::new(vec![Inline::plain("c")])).unwrap();

        // Act: Append to the first item and tick the nested one
        list.item_mut(0)
            .and_then(ListItem::inline_mut)
            .unwrap()
            .push(Inline::plain("!"));
        let wrapper = list.item_mut(1).unwrap();
        assert!(wrapper.inline_mut().is_none());
        assert!(wrapper
            .nested_mut()
            .and_then(|nested| nested.item_mut(0))
            .unwrap()
            .set_checked(true));

        // Assert: Accessors reject the wrong item shape, tree stays valid
        assert!(list.item_mut(0).unwrap().nested_mut().is_none());
        assert!(list.item_mut(3).is_none());
        assert!(list.validate().is_ok());
        let doc = crate::document_model::Document::from_blocks(vec![Block::List(list)]);
        assert_eq!(
            crate::markdown_serializer::serialize(&doc),
            "- a!\n  - [x] b\n- c"
        );
    }

    #[test]
    fn test_heading_level_bounds() {
        assert!(Block::heading(1, vec![]).is_ok());
        assert!(Block::heading(6, vec![]).is_ok());
        assert_eq!(
            Block::heading(7, vec![]),
            Err(TreeError::InvalidHeadingLevel { level: 7 })
        );
        assert!(Block::Heading {
            level: 0,
            content: vec![]
        }
        .validate()
        .is_err());
    }
}
