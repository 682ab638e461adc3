//! Editing session with whole-state undo/redo
//!
//! Every structural edit first pushes a snapshot of the store onto the undo
//! stack. Undo and redo swap the current state with the top of the opposite
//! stack.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, info};

use crate::domain::{ItemId, TreeItem, TreeStore, EXPANDED_FIELD};

/// Label given to items created by [`EditSession::add_child`].
pub const NEW_ITEM_LABEL: &str = "New item";

type Snapshot = Vec<TreeItem>;

/// A store plus its undo and redo history.
#[derive(Debug)]
pub struct EditSession {
    store: TreeStore,
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    /// Maximum undo depth, 0 for unlimited
    history_limit: usize,
}

impl EditSession {
    pub fn new(store: TreeStore, history_limit: usize) -> Self {
        Self {
            store,
            undo: VecDeque::new(),
            redo: Vec::new(),
            history_limit,
        }
    }

    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    pub fn into_store(self) -> TreeStore {
        self.store
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    fn checkpoint(&mut self) {
        self.undo.push_back(self.store.get_snapshot());
        if self.history_limit > 0 && self.undo.len() > self.history_limit {
            self.undo.pop_front();
        }
        self.redo.clear();
    }

    /// Next free integer id: one above the largest integer id in the store,
    /// or the smallest unused positive id once `i64::MAX` is taken.
    fn next_id(&self) -> ItemId {
        let max = self
            .store
            .iter()
            .filter_map(|item| item.id.as_int())
            .max()
            .unwrap_or(0);
        if let Some(next) = max.checked_add(1) {
            return ItemId::Int(next);
        }

        let used: HashSet<i64> = self
            .store
            .iter()
            .filter_map(|item| item.id.as_int())
            .collect();
        // at most len() ids are taken, so a gap exists within len() + 1 steps
        let free = (1..=i64::MAX)
            .find(|n| !used.contains(n))
            .unwrap_or(i64::MIN);
        ItemId::Int(free)
    }

    /// Create a new item under `parent` (or as a root) and expand the parent.
    pub fn add_child(&mut self, parent: Option<ItemId>) -> ItemId {
        self.checkpoint();
        let id = self.next_id();

        if let Some(parent_id) = &parent {
            if let Some(parent_item) = self.store.get_item(parent_id) {
                if !parent_item.is_expanded() {
                    let expanded = parent_item.clone().with_field(EXPANDED_FIELD, true);
                    self.store.update_item(expanded);
                }
            }
        }

        self.store
            .add_item(TreeItem::new(id.clone(), parent, NEW_ITEM_LABEL));
        info!(id = %id, "added child");
        id
    }

    pub fn add_item(&mut self, item: TreeItem) {
        self.checkpoint();
        self.store.add_item(item);
    }

    /// Delete an item with its subtree. Unknown ids leave the history untouched.
    pub fn remove(&mut self, id: &ItemId) -> bool {
        if !self.store.contains(id) {
            return false;
        }
        self.checkpoint();
        let removed = self.store.remove_item(id);
        info!(id = %id, removed, "removed subtree");
        true
    }

    /// Change an item's label. A blank label is treated as a cancelled rename.
    pub fn rename(&mut self, id: &ItemId, label: &str) -> bool {
        let label = label.trim();
        if label.is_empty() {
            debug!(id = %id, "rename cancelled");
            return false;
        }
        let Some(item) = self.store.get_item(id) else {
            return false;
        };
        let mut renamed = item.clone();
        renamed.label = label.to_string();

        self.checkpoint();
        self.store.update_item(renamed)
    }

    pub fn update(&mut self, item: TreeItem) -> bool {
        if !self.store.contains(&item.id) {
            return false;
        }
        self.checkpoint();
        self.store.update_item(item)
    }

    /// Expansion is view state and is not recorded in the history.
    pub fn toggle_expanded(&mut self, id: &ItemId) -> bool {
        self.store.toggle_expanded(id)
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo.pop_back() else {
            return false;
        };
        self.redo.push(self.store.get_snapshot());
        self.store.restore_from_snapshot(&previous);
        debug!(undo = self.undo.len(), redo = self.redo.len(), "undo");
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        self.undo.push_back(self.store.get_snapshot());
        self.store.restore_from_snapshot(&next);
        debug!(undo = self.undo.len(), redo = self.redo.len(), "redo");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> EditSession {
        EditSession::new(
            TreeStore::new(vec![
                TreeItem::new(1, None, "A"),
                TreeItem::new("x", Some(ItemId::Int(1)), "B"),
            ]),
            0,
        )
    }

    #[test]
    fn given_string_ids_when_allocating_then_only_integers_count() {
        let mut s = session();
        assert_eq!(s.add_child(None), ItemId::Int(2));
        assert_eq!(s.add_child(None), ItemId::Int(3));
    }

    #[test]
    fn given_history_limit_when_exceeded_then_oldest_is_dropped() {
        let mut s = EditSession::new(TreeStore::empty(), 2);
        s.add_child(None);
        s.add_child(None);
        s.add_child(None);

        assert_eq!(s.undo_depth(), 2);
        assert!(s.undo());
        assert!(s.undo());
        assert!(!s.undo());
        assert_eq!(s.store().len(), 1);
    }
}
