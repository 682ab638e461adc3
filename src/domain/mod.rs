//! Domain layer: entities and tree logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod error;
pub mod item;
pub mod store;

pub use error::{DomainError, DomainResult};
pub use item::{ItemId, TreeItem, TreeNode, EXPANDED_FIELD};
pub use store::{AncestorChain, ChainEnd, TreeStore};
