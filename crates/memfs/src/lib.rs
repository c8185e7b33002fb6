//! A hierarchical file namespace emulated on a flat key-value store.
//!
//! Paths such as `/memories/projects/plan.md` map to keys such as
//! `memory:/memories/projects/plan.md`. Directories are never stored; a
//! path is a directory when some key lives below it. The [`FS`] type offers
//! the path-oriented commands an agent tool layer needs: view, create,
//! str_replace, insert, delete and rename.

mod command;
mod edit;
mod error;
mod fs;
mod memory;
mod mutate;
mod resolve;
mod tree;

pub mod config;
pub mod path;
pub mod pattern;
pub mod store;

pub use command::{Command, CommandOutcome};
pub use config::Config;
pub use edit::{format_listing, format_numbered};
pub use error::{Error, ErrorKind, Result};
pub use fs::{FS, Ownership};
pub use memory::{MemoryStore, SnapshotEntry};
pub use path::PathCodec;
pub use resolve::{Child, PathKind};
pub use store::{KeyValueStore, ScanPage};
pub use tree::{TreeNode, format_tree};

#[cfg(test)]
mod tests;
