//! Item document loading
//!
//! Reads a JSON item document and builds a [`TreeStore`] from it.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{TreeItem, TreeStore};
use crate::infrastructure::traits::FileSystem;

/// Accepted document layouts: a bare array or `{ "items": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ItemDocument {
    List(Vec<TreeItem>),
    Wrapped { items: Vec<TreeItem> },
}

impl ItemDocument {
    fn into_items(self) -> Vec<TreeItem> {
        match self {
            ItemDocument::List(items) | ItemDocument::Wrapped { items } => items,
        }
    }
}

/// Service for loading item documents into a store.
pub struct ItemService {
    fs: Arc<dyn FileSystem>,
}

impl ItemService {
    /// Create a new item service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Load a store from an item document on disk.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<TreeStore> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("item file not found: {}", path.display()),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "file does not exist",
                )),
            });
        }
        if !self.fs.is_file(path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("not a file: {}", path.display()),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "expected a JSON item document",
                )),
            });
        }

        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read item file", path)?;
        let items = parse_items(&content).map_err(|e| ApplicationError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!("load: {} items from {}", items.len(), path.display());

        Ok(TreeStore::new(items))
    }
}

/// Parse an item document from a string.
pub fn parse_items(content: &str) -> Result<Vec<TreeItem>, serde_json::Error> {
    serde_json::from_str::<ItemDocument>(content).map(ItemDocument::into_items)
}
