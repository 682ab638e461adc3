//! Conversion of the nested projection into `termtree` for display.

use termtree::Tree;
use tracing::instrument;

use crate::domain::{TreeNode, TreeStore};

pub trait TreeNodeConvert {
    /// Render with `label [id]` nodes, or bare labels when `show_ids` is false.
    fn to_tree_string(&self, show_ids: bool) -> Tree<String>;
}

fn node_label(node: &TreeNode, show_ids: bool) -> String {
    if show_ids {
        node.item.to_string()
    } else {
        node.item.label.clone()
    }
}

impl TreeNodeConvert for TreeNode {
    fn to_tree_string(&self, show_ids: bool) -> Tree<String> {
        let leaves: Vec<_> = self
            .children
            .iter()
            .map(|c| c.to_tree_string(show_ids))
            .collect();

        Tree::new(node_label(self, show_ids)).with_leaves(leaves)
    }
}

// All roots hang under a single synthetic node
impl TreeNodeConvert for TreeStore {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self, show_ids: bool) -> Tree<String> {
        if self.is_empty() {
            return Tree::new("Empty tree".to_string());
        }
        // items caught in a parent cycle have no root and add no leaves
        let roots = self.build_tree();
        let label = format!("{} items", self.len());
        Tree::new(label).with_leaves(roots.iter().map(|r| r.to_tree_string(show_ids)))
    }
}
