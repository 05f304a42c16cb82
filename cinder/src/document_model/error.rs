//! Error types for structural changes to the document tree

use super::blocks::ListKind;
use thiserror::Error;

/// Errors raised when a mutation would break a tree invariant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Checklist item without a checked state
    #[error("checklist items must carry a checked state")]
    MissingCheckedState,

    /// Bullet or numbered item carrying a checked state
    #[error("{kind:?} list items must not carry a checked state")]
    UnexpectedCheckedState {
        /// Kind of the list the item was added to
        kind: ListKind,
    },

    /// Heading level outside 1..=6
    #[error("heading level must be between 1 and 6, got {level}")]
    InvalidHeadingLevel {
        /// The rejected level
        level: usize,
    },

    /// Insertion index past the end of a document or list
    #[error("index {index} out of range for {len} entries")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Current number of entries
        len: usize,
    },
}
