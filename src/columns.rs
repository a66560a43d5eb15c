//! Column tree resolution and column ordering.
//!
//! Turns the host's nested [`ColumnDef`] tree into the flat list of
//! [`LeafColumn`]s the header composer and the grid work with.

use std::collections::HashMap;

use crate::signal::{Signal, Subscription};
use crate::types::{
    ColumnDef, FormatAccessor, HeaderSegment, LeafColumn, ValueAccessor, DEFAULT_COLUMN_WIDTH,
    DEFAULT_MIN_COLUMN_WIDTH,
};

/// Resolve a column-definition tree into leaf columns, depth-first.
///
/// A leaf with neither a value accessor nor a self-rendering kind has nothing
/// to draw and is dropped. Groups whose children are all dropped vanish.
pub fn resolve_columns(defs: &[ColumnDef]) -> Vec<LeafColumn> {
    let mut leaves = Vec::new();
    let mut path = Vec::new();
    for def in defs {
        collect_leaves(def, &mut path, &mut leaves);
    }
    leaves
}

fn collect_leaves(def: &ColumnDef, path: &mut Vec<HeaderSegment>, out: &mut Vec<LeafColumn>) {
    path.push(HeaderSegment {
        title: def.title.clone(),
        content: def.header_content.clone(),
    });

    if def.is_group() {
        for child in &def.children {
            collect_leaves(child, path, out);
        }
    } else if let Some(leaf) = resolve_leaf(def, path, out.len()) {
        out.push(leaf);
    } else {
        tracing::debug!(title = %def.title, "dropping column without a renderable source");
    }

    path.pop();
}

fn resolve_leaf(def: &ColumnDef, path: &[HeaderSegment], index: usize) -> Option<LeafColumn> {
    let value = match (&def.value, &def.id) {
        (Some(accessor), _) => accessor.clone(),
        (None, Some(id)) => ValueAccessor::field(id),
        (None, None) if def.kind.is_self_rendering() => ValueAccessor::empty(),
        (None, None) => return None,
    };

    let id = def
        .id
        .clone()
        .unwrap_or_else(|| format!("__{}_{index}", def.title));
    let min_width = def.min_width.unwrap_or(DEFAULT_MIN_COLUMN_WIDTH).max(0.0);
    let base_width = def.width.unwrap_or(DEFAULT_COLUMN_WIDTH).max(min_width);

    Some(LeafColumn {
        id,
        title: def.title.clone(),
        header_path: path.to_vec(),
        kind: def.kind,
        min_width,
        base_width,
        grow: def.grow.unwrap_or(0.0).max(0.0),
        sortable: def.sortable,
        sort_by: def.sort_by.clone().unwrap_or_else(|| value.clone()),
        format: def.format.clone().unwrap_or_else(FormatAccessor::display),
        value,
    })
}

/// Notification sent when the column order changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderChange {
    pub order: Vec<String>,
}

/// Current column order (list of leaf ids) with change notification.
#[derive(Default)]
pub struct ColumnOrder {
    ids: Vec<String>,
    changed: Signal<OrderChange>,
}

impl ColumnOrder {
    pub fn new(ids: Vec<String>) -> Self {
        Self {
            ids,
            changed: Signal::new(),
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Arrange `leaves` by this order: listed ids first, in list order; ids
    /// that match no leaf are ignored; unlisted leaves follow in their
    /// original order.
    pub fn apply(&self, leaves: &[LeafColumn]) -> Vec<LeafColumn> {
        let by_id: HashMap<&str, &LeafColumn> =
            leaves.iter().map(|leaf| (leaf.id.as_str(), leaf)).collect();
        let mut placed = std::collections::HashSet::new();
        let mut out = Vec::with_capacity(leaves.len());

        for id in &self.ids {
            if let Some(leaf) = by_id.get(id.as_str()) {
                if placed.insert(id.as_str()) {
                    out.push((*leaf).clone());
                }
            }
        }
        for leaf in leaves {
            if !placed.contains(leaf.id.as_str()) {
                out.push(leaf.clone());
            }
        }
        out
    }

    /// Replace the order and notify listeners if it changed.
    pub fn set(&mut self, ids: Vec<String>) {
        if self.ids != ids {
            self.ids = ids;
            self.notify();
        }
    }

    /// Move the column at `from` to position `to` within `current` (the ids of
    /// the currently displayed leaves), store the result and notify.
    ///
    /// Returns `false` when either index is out of range or nothing moves.
    pub fn move_column(&mut self, current: &[String], from: usize, to: usize) -> bool {
        if from == to || from >= current.len() || to >= current.len() {
            return false;
        }
        let mut ids = current.to_vec();
        let id = ids.remove(from);
        ids.insert(to, id);
        self.ids = ids;
        self.notify();
        true
    }

    pub fn subscribe(&self, f: impl Fn(&OrderChange) + 'static) -> Subscription {
        self.changed.subscribe(f)
    }

    fn notify(&self) {
        self.changed.emit(&OrderChange {
            order: self.ids.clone(),
        });
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
    use crate::types::ColumnKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ids(leaves: &[LeafColumn]) -> Vec<&str> {
        leaves.iter().map(|l| l.id.as_str()).collect()
    }

    #[test]
    fn test_header_paths() {
        let leaves = resolve_columns(&[
            ColumnDef::group(
                "Person",
                vec![
                    ColumnDef::leaf("first", "First"),
                    ColumnDef::group("Contact", vec![ColumnDef::leaf("email", "Email")]),
                ],
            ),
            ColumnDef::leaf("age", "Age"),
        ]);
        assert_eq!(ids(&leaves), ["first", "email", "age"]);
        let titles: Vec<&str> = leaves[1]
            .header_path
            .iter()
            .map(|s| s.title.as_str())
            .collect();
        assert_eq!(titles, ["Person", "Contact", "Email"]);
        assert_eq!(leaves[2].depth(), 1);
    }

    #[test]
    fn test_drops_columns_without_source() {
        let leaves = resolve_columns(&[
            ColumnDef {
                title: "Nothing".into(),
                ..ColumnDef::default()
            },
            ColumnDef {
                title: "Action".into(),
                kind: ColumnKind::Button,
                ..ColumnDef::default()
            },
            ColumnDef::group(
                "Empty group",
                vec![ColumnDef {
                    title: "Also nothing".into(),
                    ..ColumnDef::default()
                }],
            ),
        ]);
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].title, "Action");
        assert!(leaves[0].id.starts_with("__Action"));
    }

    #[test]
    fn test_width_defaults_and_min_clamp() {
        let leaves = resolve_columns(&[
            ColumnDef::leaf("a", "A"),
            ColumnDef::leaf("b", "B").with_width(10.0).with_min_width(50.0),
        ]);
        assert_eq!(leaves[0].base_width, DEFAULT_COLUMN_WIDTH);
        assert_eq!(leaves[0].min_width, DEFAULT_MIN_COLUMN_WIDTH);
        assert_eq!(leaves[1].base_width, 50.0);
    }

    #[test]
    fn test_order_apply() {
        let leaves = resolve_columns(&[
            ColumnDef::leaf("a", "A"),
            ColumnDef::leaf("b", "B"),
            ColumnDef::leaf("c", "C"),
        ]);
        let order = ColumnOrder::new(vec!["c".into(), "zzz".into(), "a".into()]);
        assert_eq!(ids(&order.apply(&leaves)), ["c", "a", "b"]);
    }

    #[test]
    fn test_move_column_notifies() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let mut order = ColumnOrder::default();
        let _sub = order.subscribe(move |change| s.borrow_mut().push(change.order.clone()));

        let current: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        assert!(order.move_column(&current, 0, 2));
        assert!(!order.move_column(&current, 1, 1));
        assert!(!order.move_column(&current, 5, 0));
        assert_eq!(order.ids(), ["b", "c", "a"]);
        assert_eq!(seen.borrow().len(), 1);

        order.set(vec!["b".into(), "c".into(), "a".into()]);
        assert_eq!(seen.borrow().len(), 1);
    }
}
