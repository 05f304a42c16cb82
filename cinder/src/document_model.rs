//! Document model for an open note
//!
//! The tree is built once per open by the markdown parser (or by edits from
//! the editing surface), read by the serializer, and dropped on close. A
//! document always holds at least one block.

mod blocks;
mod error;
mod text_run;

pub use blocks::{Block, List, ListItem, ListItemContent, ListKind};
pub use error::TreeError;
pub use text_run::{inline_plain_text, Inline, Link, TextFormat, TextRun};

/// Root of the document tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    /// Create a document holding a single empty paragraph
    ///
    /// # Returns
    /// * `Document` - A document that is never fully empty
    pub fn new_empty() -> Self {
        Self {
            blocks: vec![Block::empty_paragraph()],
        }
    }

    /// Create a document from a list of blocks
    ///
    /// An empty list yields the same result as [`Document::new_empty`].
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        if blocks.is_empty() {
            return Self::new_empty();
        }
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of top-level blocks (always at least one)
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn block_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.blocks.get_mut(index)
    }

    /// Append a block at the end of the document
    pub fn push_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Insert a block at `index`
    ///
    /// # Returns
    /// * `Ok(())` - The block was attached
    /// * `Err(TreeError)` - `index` is past the end of the document
    pub fn insert_block(&mut self, index: usize, block: Block) -> Result<(), TreeError> {
        if index > self.blocks.len() {
            return Err(TreeError::IndexOutOfRange {
                index,
                len: self.blocks.len(),
            });
        }
        self.blocks.insert(index, block);
        Ok(())
    }

    /// Detach and return the block at `index`
    ///
    /// Removing the last remaining block leaves an empty paragraph behind.
    pub fn remove_block(&mut self, index: usize) -> Option<Block> {
        if index >= self.blocks.len() {
            return None;
        }
        let removed = self.blocks.remove(index);
        if self.blocks.is_empty() {
            self.blocks.push(Block::empty_paragraph());
        }
        Some(removed)
    }

    /// Swap the whole content for another document's blocks
    pub fn replace_with(&mut self, other: Document) {
        self.blocks = other.blocks;
    }

    /// Check every tree invariant
    ///
    /// # Returns
    /// * `Ok(())` - The tree is well formed
    /// * `Err(TreeError)` - The first violation found, in document order
    pub fn validate(&self) -> Result<(), TreeError> {
        self.blocks.iter().try_for_each(Block::validate)
    }

    /// Unformatted text of the whole document, one block per line
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Count whitespace-separated words in the unformatted text
    pub fn word_count(&self) -> usize {
        self.plain_text().split_whitespace().count()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_empty_has_one_paragraph() {
        let doc = Document::new_empty();
        assert_eq!(doc.blocks(), &[Block::Paragraph(vec![])]);
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_from_empty_blocks_is_never_empty() {
        let doc = Document::from_blocks(Vec::new());
        assert_eq!(doc.block_count(), 1);
    }

    #[test]
    fn test_remove_last_block_keeps_paragraph() {
        let mut doc = Document::from_blocks(vec![Block::Quote(vec![Inline::plain("q")])]);
        let removed = doc.remove_block(0);
        assert_eq!(removed, Some(Block::Quote(vec![Inline::plain("q")])));
        assert_eq!(doc.blocks(), &[Block::empty_paragraph()]);
        assert!(doc.remove_block(4).is_none());
    }

    #[test]
    fn test_insert_block_bounds() {
        let mut doc = Document::new_empty();
        assert!(doc.insert_block(1, Block::empty_paragraph()).is_ok());
        assert_eq!(
            doc.insert_block(5, Block::empty_paragraph()),
            Err(TreeError::IndexOutOfRange { index: 5, len: 2 })
        );
    }

    #[test]
    fn test_word_count_spans_blocks() {
        let mut list = List::new(ListKind::Bullet);
        list.push_item(ListItem::new(vec![Inline::plain("three four")]))
            .unwrap();
        let doc = Document::from_blocks(vec![
            Block::heading(1, vec![Inline::plain("one two")]).unwrap(),
            Block::List(list),
            Block::CodeBlock {
                language: None,
                code: "five".to_string(),
            },
        ]);
        assert_eq!(doc.word_count(), 5);
        assert_eq!(doc.plain_text(), "one two\nthree four\nfive");
    }

    #[test]
    fn test_validate_reports_bad_heading() {
        let mut doc = Document::new_empty();
        *doc.block_mut(0).unwrap() = Block::Heading {
            level: 9,
            content: vec![],
        };
        assert_eq!(
            doc.validate(),
            Err(TreeError::InvalidHeadingLevel { level: 9 })
        );
    }
}
