//! rstree: in-memory hierarchy of labeled items
//!
//! Architecture:
//! - `domain`: items, the arena-backed `TreeStore`, domain errors (no I/O)
//! - `application`: edit session with undo/redo, row projection, item loading
//! - `infrastructure`: I/O boundary traits
//! - `cli`: command-line interface
//! - `config`: layered settings

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;

pub use domain::{ItemId, TreeItem, TreeNode, TreeStore};
