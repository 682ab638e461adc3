//! Domain entities: tree items and the nested tree projection

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the extra field flipped by `toggle_expanded`.
pub const EXPANDED_FIELD: &str = "expanded";

/// Key under which [`TreeNode`] serializes its nested children.
pub const CHILDREN_FIELD: &str = "children";

/// Identifier of a tree item.
///
/// Integer and string ids never compare equal: `Int(2)` and `Str("2")`
/// are different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Int(i64),
    Str(String),
}

impl ItemId {
    /// Parse a command-line token into an id.
    ///
    /// Tokens that parse as `i64` become `Int`; a leading `s:` forces a
    /// string id (`s:42` is `Str("42")`); everything else is `Str`.
    pub fn parse_token(token: &str) -> Self {
        if let Some(forced) = token.strip_prefix("s:") {
            return ItemId::Str(forced.to_string());
        }
        match token.parse::<i64>() {
            Ok(n) => ItemId::Int(n),
            Err(_) => ItemId::Str(token.to_string()),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ItemId::Int(n) => Some(*n),
            ItemId::Str(_) => None,
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Int(n) => write!(f, "{}", n),
            ItemId::Str(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        ItemId::Int(n)
    }
}

impl From<i32> for ItemId {
    fn from(n: i32) -> Self {
        ItemId::Int(i64::from(n))
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId::Str(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId::Str(s)
    }
}

/// A labeled record in the hierarchy.
///
/// Fields other than `id`, `parent` and `label` are kept in `extra` and
/// written back unchanged on serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeItem {
    pub id: ItemId,
    /// Parent id, `None` for root items
    #[serde(default)]
    pub parent: Option<ItemId>,
    pub label: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TreeItem {
    pub fn new(id: impl Into<ItemId>, parent: Option<ItemId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent,
            label: label.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Builder-style helper for attaching an extra field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Expansion state; absent or falsy values count as collapsed.
    pub fn is_expanded(&self) -> bool {
        self.extra.get(EXPANDED_FIELD).is_some_and(is_truthy)
    }
}

impl fmt::Display for TreeItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.label, self.id)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Nested copy of an item with its children, as produced by `TreeStore::build_tree`.
///
/// Serializes as the item's own object with an added `children` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(flatten)]
    pub item: TreeItem,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Number of nodes in this subtree, including self.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }

    /// Height of this subtree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(TreeNode::depth)
            .max()
            .unwrap_or(0)
    }
}
