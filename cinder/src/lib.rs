//! cinder - markdown note engine
//!
//! A structured document tree for notes, a tolerant markdown parser, a
//! canonical serializer, and an autosave coordinator that keeps edits safe
//! with frequent local drafts and slower saves to the note store.
//!
//! ```
//! use cinder::{markdown_parser, markdown_serializer};
//!
//! let doc = markdown_parser::parse("# Groceries\n- [ ] **milk**\n- [x] eggs");
//! assert_eq!(
//!     markdown_serializer::serialize(&doc),
//!     "# Groceries\n- [ ] **milk**\n- [x] eggs"
//! );
//! ```

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![allow(clippy::module_name_repetitions)]

pub mod autosave;
pub mod config;
pub mod document_model;
pub mod markdown_parser;
pub mod markdown_serializer;
