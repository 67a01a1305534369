//! Parsing of tree listings and their materialization on disk.
//!
//! A listing uses one notation: every nesting level adds `│` or space
//! characters, entries are prefixed with `├── ` or, for the last sibling,
//! `└── `, and directory names end with `/`.

mod line;
mod materializer;

pub use line::{EntryKind, TreeLine, parse_tree};
pub use materializer::{DirectoryFailurePolicy, EntryCreationError, Materializer};

/// Listing used when no input is given.
pub const EXAMPLE_TREE: &str = include_str!("example_tree.txt");
