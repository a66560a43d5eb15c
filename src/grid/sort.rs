//! Single-column sort state.

use serde_json::Value;

use crate::types::{LeafColumn, SortDirection};

/// Sorted column, tracked by id so it survives reordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    active: Option<(String, SortDirection)>,
}

impl SortState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance `leaf` through none, ascending, descending and back to none.
    /// Sorting another column starts it at ascending. Returns false for a
    /// column that is not sortable.
    pub fn toggle(&mut self, leaf: &LeafColumn) -> bool {
        if !leaf.sortable {
            return false;
        }
        self.active = match self.active.take() {
            Some((id, SortDirection::Ascending)) if id == leaf.id => {
                Some((id, SortDirection::Descending))
            }
            Some((id, SortDirection::Descending)) if id == leaf.id => None,
            _ => Some((leaf.id.clone(), SortDirection::Ascending)),
        };
        true
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn column_id(&self) -> Option<&str> {
        self.active.as_ref().map(|(id, _)| id.as_str())
    }

    pub fn direction(&self) -> Option<SortDirection> {
        self.active.as_ref().map(|&(_, dir)| dir)
    }

    /// Position of the sorted column within `leaves`.
    pub fn active_index(&self, leaves: &[LeafColumn]) -> Option<(usize, SortDirection)> {
        let (id, dir) = self.active.as_ref()?;
        leaves
            .iter()
            .position(|leaf| &leaf.id == id)
            .map(|index| (index, *dir))
    }

    /// Row indices in display order. Equal keys keep their original order;
    /// with no active sort, or a sorted column no longer present, the order
    /// is unchanged.
    pub fn sorted_indices(&self, leaves: &[LeafColumn], rows: &[Value]) -> Vec<usize> {
        let Some(leaf) = self
            .active_index(leaves)
            .and_then(|(index, _)| leaves.get(index))
        else {
            return (0..rows.len()).collect();
        };
        let descending = self.direction() == Some(SortDirection::Descending);

        let mut keyed: Vec<(usize, _)> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| (i, leaf.sort_key(row)))
            .collect();
        keyed.sort_by(|a, b| {
            if descending {
                b.1.total_cmp(&a.1)
            } else {
                a.1.total_cmp(&b.1)
            }
        });
        keyed.into_iter().map(|(i, _)| i).collect()
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
    use crate::columns::resolve_columns;
    use crate::types::ColumnDef;
    use serde_json::json;

    fn leaves() -> Vec<LeafColumn> {
        resolve_columns(&[
            ColumnDef::leaf("name", "Name").sortable(),
            ColumnDef::leaf("age", "Age").sortable(),
            ColumnDef::leaf("note", "Note"),
        ])
    }

    #[test]
    fn test_toggle_cycle() {
        let leaves = leaves();
        let mut sort = SortState::new();
        assert!(sort.toggle(&leaves[1]));
        assert_eq!(sort.active_index(&leaves), Some((1, SortDirection::Ascending)));
        sort.toggle(&leaves[1]);
        assert_eq!(sort.direction(), Some(SortDirection::Descending));
        sort.toggle(&leaves[1]);
        assert_eq!(sort.column_id(), None);
    }

    #[test]
    fn test_other_column_restarts_ascending() {
        let leaves = leaves();
        let mut sort = SortState::new();
        sort.toggle(&leaves[0]);
        sort.toggle(&leaves[0]);
        sort.toggle(&leaves[1]);
        assert_eq!(sort.column_id(), Some("age"));
        assert_eq!(sort.direction(), Some(SortDirection::Ascending));
    }

    #[test]
    fn test_unsortable_column_ignored() {
        let leaves = leaves();
        let mut sort = SortState::new();
        assert!(!sort.toggle(&leaves[2]));
        assert_eq!(sort.column_id(), None);
    }

    #[test]
    fn test_sorted_indices_stable() {
        let leaves = leaves();
        let rows = vec![
            json!({"name": "b", "age": 30}),
            json!({"name": "a", "age": 20}),
            json!({"name": "c", "age": 30}),
            json!({"name": "d"}),
        ];
        let mut sort = SortState::new();
        assert_eq!(sort.sorted_indices(&leaves, &rows), vec![0, 1, 2, 3]);

        sort.toggle(&leaves[1]);
        assert_eq!(sort.sorted_indices(&leaves, &rows), vec![3, 1, 0, 2]);
        sort.toggle(&leaves[1]);
        assert_eq!(sort.sorted_indices(&leaves, &rows), vec![0, 2, 1, 3]);
    }
}
