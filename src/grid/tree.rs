//! Hierarchical rows: expansion state and flattening to display order.

use std::collections::HashSet;

use serde_json::Value;

/// Expanded rows, keyed by their index path (`"0/2/1"`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeExpansion {
    expanded: HashSet<String>,
}

impl TreeExpansion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, key: &str) -> bool {
        self.expanded.contains(key)
    }

    /// Flip `key`, returning whether it is now expanded.
    pub fn toggle(&mut self, key: &str) -> bool {
        if self.expanded.remove(key) {
            false
        } else {
            self.expanded.insert(key.to_string());
            true
        }
    }

    pub fn expand(&mut self, key: &str) {
        self.expanded.insert(key.to_string());
    }

    pub fn collapse(&mut self, key: &str) {
        self.expanded.remove(key);
    }

    pub fn clear(&mut self) {
        self.expanded.clear();
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

/// One displayed row.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow<'a> {
    /// Index path from the top level, `/`-separated.
    pub key: String,
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
    pub row: &'a Value,
}

fn children<'a>(row: &'a Value, children_key: Option<&str>) -> &'a [Value] {
    children_key
        .and_then(|key| row.get(key))
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice)
}

/// Visible rows of `rows` in order, descending into children of expanded
/// rows. Without a `children_key` every row is a top-level leaf.
pub fn flatten_tree<'a>(
    rows: &'a [Value],
    children_key: Option<&str>,
    expansion: &TreeExpansion,
) -> Vec<FlatRow<'a>> {
    let order: Vec<usize> = (0..rows.len()).collect();
    flatten_in_order(rows, &order, children_key, expansion)
}

/// Like [`flatten_tree`], with top-level rows visited in `order`.
/// Children keep their own order.
pub fn flatten_in_order<'a>(
    rows: &'a [Value],
    order: &[usize],
    children_key: Option<&str>,
    expansion: &TreeExpansion,
) -> Vec<FlatRow<'a>> {
    let mut out = Vec::with_capacity(order.len());
    for &index in order {
        if let Some(row) = rows.get(index) {
            push_row(row, index.to_string(), 0, children_key, expansion, &mut out);
        }
    }
    out
}

fn push_row<'a>(
    row: &'a Value,
    key: String,
    depth: usize,
    children_key: Option<&str>,
    expansion: &TreeExpansion,
    out: &mut Vec<FlatRow<'a>>,
) {
    let kids = children(row, children_key);
    let expanded = !kids.is_empty() && expansion.is_expanded(&key);
    out.push(FlatRow {
        key: key.clone(),
        depth,
        has_children: !kids.is_empty(),
        expanded,
        row,
    });
    if expanded {
        for (i, child) in kids.iter().enumerate() {
            push_row(child, format!("{key}/{i}"), depth + 1, children_key, expansion, out);
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> Vec<Value> {
        vec![
            json!({"name": "root", "children": [
                {"name": "a", "children": [{"name": "a1"}]},
                {"name": "b"}
            ]}),
            json!({"name": "other"}),
        ]
    }

    fn names(flat: &[FlatRow<'_>]) -> Vec<String> {
        flat.iter()
            .map(|r| format!("{}@{}", r.row["name"].as_str().unwrap(), r.depth))
            .collect()
    }

    #[test]
    fn test_collapsed_shows_top_level() {
        let rows = rows();
        let flat = flatten_tree(&rows, Some("children"), &TreeExpansion::new());
        assert_eq!(names(&flat), ["root@0", "other@0"]);
        assert!(flat[0].has_children);
        assert!(!flat[0].expanded);
    }

    #[test]
    fn test_expanded_descends() {
        let rows = rows();
        let mut expansion = TreeExpansion::new();
        assert!(expansion.toggle("0"));
        expansion.expand("0/0");
        let flat = flatten_tree(&rows, Some("children"), &expansion);
        assert_eq!(names(&flat), ["root@0", "a@1", "a1@2", "b@1", "other@0"]);
        assert_eq!(flat[2].key, "0/0/0");
    }

    #[test]
    fn test_without_children_key() {
        let rows = rows();
        let mut expansion = TreeExpansion::new();
        expansion.expand("0");
        let flat = flatten_tree(&rows, None, &expansion);
        assert_eq!(flat.len(), 2);
        assert!(!flat[0].has_children);
    }

    #[test]
    fn test_custom_order() {
        let rows = rows();
        let flat = flatten_in_order(&rows, &[1, 0, 9], Some("children"), &TreeExpansion::new());
        assert_eq!(names(&flat), ["other@0", "root@0"]);
    }
}
