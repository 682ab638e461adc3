//! Flat row projection of the hierarchy, one row per displayed item

use serde::Serialize;

use crate::domain::{ItemId, TreeStore};

/// Which items `flatten_rows` emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlattenMode {
    /// Every item reachable from a root
    #[default]
    All,
    /// Skip descendants of collapsed items
    Visible,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub id: ItemId,
    pub parent: Option<ItemId>,
    pub label: String,
    /// 0 for roots
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
    /// Labels from the root down to this item
    pub path: Vec<String>,
}

/// Pre-order rows starting at the roots, in store order.
pub fn flatten_rows(store: &TreeStore, mode: FlattenMode) -> Vec<Row> {
    let walk = match mode {
        FlattenMode::All => store.iter_depth_first(),
        FlattenMode::Visible => store.iter_visible(),
    };

    let mut rows = Vec::new();
    let mut path: Vec<String> = Vec::new();
    for (depth, item) in walk {
        path.truncate(depth);
        path.push(item.label.clone());
        rows.push(Row {
            id: item.id.clone(),
            parent: item.parent.clone(),
            label: item.label.clone(),
            depth,
            has_children: !store.get_children(Some(&item.id)).is_empty(),
            expanded: item.is_expanded(),
            path: path.clone(),
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TreeItem;

    #[test]
    fn given_nested_items_when_flattening_then_paths_follow_ancestors() {
        let store = TreeStore::new(vec![
            TreeItem::new(1, None, "A"),
            TreeItem::new(2, Some(ItemId::Int(1)), "B"),
            TreeItem::new(3, Some(ItemId::Int(2)), "C"),
            TreeItem::new(4, None, "D"),
        ]);

        let rows = flatten_rows(&store, FlattenMode::All);

        let labels: Vec<_> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", "C", "D"]);
        assert_eq!(rows[2].path, vec!["A", "B", "C"]);
        assert_eq!(rows[3].path, vec!["D"]);
        assert_eq!(rows[3].depth, 0);
        assert!(rows[1].has_children);
        assert!(!rows[2].has_children);
    }
}
