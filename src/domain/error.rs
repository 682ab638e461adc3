//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::item::ItemId;

/// Domain errors represent violations of the tree's well-formedness.
/// Store queries never produce them; they come from explicit checks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("duplicate item id: {0}")]
    DuplicateId(ItemId),

    #[error("dangling parent reference: item {item} references missing parent {parent}")]
    DanglingParent { item: ItemId, parent: ItemId },

    #[error("cycle detected in hierarchy at item: {0}")]
    CycleDetected(ItemId),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
