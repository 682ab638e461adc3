//! Arena-backed store for a flat hierarchy of items.
//!
//! Items live in a generational arena. A separate index vector keeps load and
//! insertion order, and a hash map resolves ids to arena slots in O(1).
//! Parent/child relations are derived on demand from each item's `parent`
//! field, so there are no node-to-node references to keep consistent.

use std::collections::{HashMap, HashSet};

use generational_arena::{Arena, Index};
use serde_json::Value;
use tracing::{debug, instrument, trace};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::item::{ItemId, TreeItem, TreeNode, CHILDREN_FIELD, EXPANDED_FIELD};

/// How an ancestor walk ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainEnd {
    /// Reached an item without a parent
    Root,
    /// The last item names a parent that is not in the store
    Broken(ItemId),
    /// The walk came back to an id it had already visited
    Cycle(ItemId),
}

/// Ancestor chain of an item, self first.
#[derive(Debug, Clone, PartialEq)]
pub struct AncestorChain<'a> {
    pub items: Vec<&'a TreeItem>,
    pub end: ChainEnd,
}

impl AncestorChain<'_> {
    /// True when the chain ends at a real root.
    pub fn is_complete(&self) -> bool {
        self.end == ChainEnd::Root
    }

    pub fn ids(&self) -> Vec<&ItemId> {
        self.items.iter().map(|item| &item.id).collect()
    }
}

/// In-memory hierarchy of [`TreeItem`]s.
///
/// Queries are tolerant: unknown ids give empty results, dangling parents
/// truncate walks, and every traversal terminates even on cyclic data.
#[derive(Debug, Clone)]
pub struct TreeStore {
    /// Item storage
    arena: Arena<TreeItem>,
    /// Slots in insertion order; defines the order of every listing
    order: Vec<Index>,
    /// Id lookup, last writer wins on duplicate ids
    lookup: HashMap<ItemId, Index>,
}

impl Default for TreeStore {
    fn default() -> Self {
        Self::empty()
    }
}

impl TreeStore {
    pub fn empty() -> Self {
        Self {
            arena: Arena::new(),
            order: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// Bulk-load items, keeping their order.
    pub fn new(items: impl IntoIterator<Item = TreeItem>) -> Self {
        let mut store = Self::empty();
        for item in items {
            store.push(item);
        }
        debug!(items = store.len(), "loaded tree store");
        store
    }

    fn push(&mut self, item: TreeItem) -> Index {
        let id = item.id.clone();
        let idx = self.arena.insert(item);
        self.order.push(idx);
        self.lookup.insert(id, idx);
        idx
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.lookup.contains_key(id)
    }

    /// Items in store order.
    pub fn iter(&self) -> Items<'_> {
        Items {
            store: self,
            pos: 0,
        }
    }

    /// All items in store order.
    pub fn get_all(&self) -> Vec<&TreeItem> {
        self.iter().collect()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_item(&self, id: &ItemId) -> Option<&TreeItem> {
        self.lookup.get(id).and_then(|&idx| self.arena.get(idx))
    }

    /// Direct children of `parent`, in store order.
    ///
    /// `None` selects the root items. Matching is exact: `Int(1)` does not
    /// match a parent written as `Str("1")`.
    pub fn get_children(&self, parent: Option<&ItemId>) -> Vec<&TreeItem> {
        self.iter()
            .filter(|item| item.parent.as_ref() == parent)
            .collect()
    }

    pub fn roots(&self) -> Vec<&TreeItem> {
        self.get_children(None)
    }

    /// Every transitive descendant of `id`, never including `id` itself.
    ///
    /// The order is an implementation detail; treat the result as a set.
    #[instrument(level = "trace", skip(self))]
    pub fn get_all_children(&self, id: &ItemId) -> Vec<&TreeItem> {
        let mut result = Vec::new();
        let mut expanded: HashSet<&ItemId> = HashSet::new();
        expanded.insert(id);
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            for child in self.get_children(Some(current)) {
                if child.id == *id {
                    continue;
                }
                result.push(child);
                if expanded.insert(&child.id) {
                    stack.push(&child.id);
                }
            }
        }

        result
    }

    /// Item followed by its ancestors up to the root.
    ///
    /// Empty for an unknown id. A parent id that does not resolve ends the
    /// chain early without an error.
    pub fn get_all_parents(&self, id: &ItemId) -> Vec<&TreeItem> {
        self.ancestor_chain(id)
            .map(|chain| chain.items)
            .unwrap_or_default()
    }

    /// Like [`get_all_parents`](Self::get_all_parents), but reports why the walk stopped.
    #[instrument(level = "trace", skip(self))]
    pub fn ancestor_chain(&self, id: &ItemId) -> Option<AncestorChain<'_>> {
        let mut current = self.get_item(id)?;
        let mut items = vec![current];
        let mut seen: HashSet<&ItemId> = HashSet::new();
        seen.insert(&current.id);

        let end = loop {
            let Some(parent_id) = &current.parent else {
                break ChainEnd::Root;
            };
            let Some(parent) = self.get_item(parent_id) else {
                trace!(item = %current.id, parent = %parent_id, "ancestor chain broken");
                break ChainEnd::Broken(parent_id.clone());
            };
            if !seen.insert(&parent.id) {
                break ChainEnd::Cycle(parent.id.clone());
            }
            items.push(parent);
            current = parent;
        };

        Some(AncestorChain { items, end })
    }

    /// Number of ancestors above the item; roots have depth 0.
    pub fn depth(&self, id: &ItemId) -> Option<usize> {
        self.ancestor_chain(id).map(|chain| chain.items.len() - 1)
    }

    /// Append an item. Neither the parent nor id uniqueness is checked.
    pub fn add_item(&mut self, item: TreeItem) {
        if self.contains(&item.id) {
            debug!(id = %item.id, "add_item shadows existing id");
        }
        debug!(id = %item.id, "added item");
        self.push(item);
    }

    /// Append an item, rejecting an id that is already present.
    pub fn try_add_item(&mut self, item: TreeItem) -> DomainResult<()> {
        if self.contains(&item.id) {
            return Err(DomainError::DuplicateId(item.id));
        }
        self.add_item(item);
        Ok(())
    }

    /// Remove `id` and all of its descendants. Returns the number of removed items.
    pub fn remove_item(&mut self, id: &ItemId) -> usize {
        let mut doomed: HashSet<ItemId> = self
            .get_all_children(id)
            .into_iter()
            .map(|item| item.id.clone())
            .collect();
        doomed.insert(id.clone());

        let before = self.order.len();
        let arena = &mut self.arena;
        self.order.retain(|&idx| {
            let keep = arena
                .get(idx)
                .is_some_and(|item| !doomed.contains(&item.id));
            if !keep {
                arena.remove(idx);
            }
            keep
        });
        for gone in &doomed {
            self.lookup.remove(gone);
        }

        let removed = before - self.order.len();
        debug!(id = %id, removed, "removed subtree");
        removed
    }

    /// Replace the item with the same id in place.
    ///
    /// Returns false and changes nothing when no item has that id; update
    /// never inserts.
    pub fn update_item(&mut self, item: TreeItem) -> bool {
        let found = self
            .order
            .iter()
            .copied()
            .find(|&idx| self.arena.get(idx).is_some_and(|e| e.id == item.id));

        let Some(idx) = found else {
            debug!(id = %item.id, "update ignored, unknown id");
            return false;
        };
        let Some(slot) = self.arena.get_mut(idx) else {
            return false;
        };

        let id = item.id.clone();
        *slot = item;
        self.lookup.insert(id.clone(), idx);
        debug!(id = %id, "updated item");
        true
    }

    /// Nested copy of the hierarchy, roots in store order.
    pub fn build_tree(&self) -> Vec<TreeNode> {
        let mut path = HashSet::new();
        self.roots()
            .into_iter()
            .map(|root| self.build_node(root, &mut path))
            .collect()
    }

    fn build_node(&self, item: &TreeItem, path: &mut HashSet<ItemId>) -> TreeNode {
        // an id already on the current path would recurse forever
        let children = if path.insert(item.id.clone()) {
            let children = self
                .get_children(Some(&item.id))
                .into_iter()
                .map(|child| self.build_node(child, path))
                .collect();
            path.remove(&item.id);
            children
        } else {
            Vec::new()
        };

        // computed children replace a stored field of the same name
        let mut item = item.clone();
        item.extra.remove(CHILDREN_FIELD);

        TreeNode { item, children }
    }

    /// Flip the `expanded` field of an item. Returns false for an unknown id.
    pub fn toggle_expanded(&mut self, id: &ItemId) -> bool {
        let Some(item) = self.get_item(id) else {
            return false;
        };
        let mut updated = item.clone();
        let expanded = !updated.is_expanded();
        updated
            .extra
            .insert(EXPANDED_FIELD.to_string(), Value::Bool(expanded));
        self.update_item(updated)
    }

    /// Owned copy of all items in store order.
    pub fn get_snapshot(&self) -> Vec<TreeItem> {
        self.iter().cloned().collect()
    }

    /// Replace the whole state with a copy of `snapshot`.
    pub fn restore_from_snapshot(&mut self, snapshot: &[TreeItem]) {
        self.arena.clear();
        self.order.clear();
        self.lookup.clear();
        for item in snapshot {
            self.push(item.clone());
        }
        debug!(items = self.len(), "restored snapshot");
    }

    /// Check that ids are unique, parents resolve and no parent chain loops.
    pub fn validate(&self) -> DomainResult<()> {
        let mut ids = HashSet::new();
        for item in self.iter() {
            if !ids.insert(&item.id) {
                return Err(DomainError::DuplicateId(item.id.clone()));
            }
        }

        for item in self.iter() {
            if let Some(parent) = &item.parent {
                if !self.contains(parent) {
                    return Err(DomainError::DanglingParent {
                        item: item.id.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }

        for item in self.iter() {
            if let Some(AncestorChain {
                end: ChainEnd::Cycle(at),
                ..
            }) = self.ancestor_chain(&item.id)
            {
                return Err(DomainError::CycleDetected(at));
            }
        }

        Ok(())
    }

    /// Pre-order walk from the roots, yielding `(depth, item)`.
    pub fn iter_depth_first(&self) -> DepthFirst<'_> {
        DepthFirst::new(self, true)
    }

    /// Pre-order walk that does not descend into collapsed items.
    pub fn iter_visible(&self) -> DepthFirst<'_> {
        DepthFirst::new(self, false)
    }
}

/// Iterator over items in store order.
pub struct Items<'a> {
    store: &'a TreeStore,
    pos: usize,
}

impl<'a> Iterator for Items<'a> {
    type Item = &'a TreeItem;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&idx) = self.store.order.get(self.pos) {
            self.pos += 1;
            if let Some(item) = self.store.arena.get(idx) {
                return Some(item);
            }
        }
        None
    }
}

pub struct DepthFirst<'a> {
    store: &'a TreeStore,
    stack: Vec<(&'a TreeItem, usize)>,
    expanded: HashSet<&'a ItemId>,
    descend_collapsed: bool,
}

impl<'a> DepthFirst<'a> {
    fn new(store: &'a TreeStore, descend_collapsed: bool) -> Self {
        // Push roots in reverse order for left-to-right traversal
        let stack = store.roots().into_iter().rev().map(|r| (r, 0)).collect();
        Self {
            store,
            stack,
            expanded: HashSet::new(),
            descend_collapsed,
        }
    }
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = (usize, &'a TreeItem);

    fn next(&mut self) -> Option<Self::Item> {
        let (item, depth) = self.stack.pop()?;
        let descend = self.descend_collapsed || item.is_expanded();
        if descend && self.expanded.insert(&item.id) {
            for child in self.store.get_children(Some(&item.id)).into_iter().rev() {
                self.stack.push((child, depth + 1));
            }
        }
        Some((depth, item))
    }
}
