//! Header cell types produced by the header composer.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::HeaderContent;

/// Stable identity of a header cell: its level and the leaf index where it
/// starts. Used to key pooled scene subtrees and hover state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellKey {
    pub level: usize,
    pub start_index: usize,
}

impl CellKey {
    pub const fn new(level: usize, start_index: usize) -> Self {
        Self { level, start_index }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.level, self.start_index)
    }
}

/// One merged header cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderCell {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<HeaderContent>,
    pub level: usize,
    pub row_span: usize,
    pub col_span: usize,
    /// Leaf-column index where the cell begins.
    pub start_index: usize,
    /// Set only for leaf cells.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_index: Option<usize>,
    pub is_leaf: bool,
}

impl HeaderCell {
    pub fn key(&self) -> CellKey {
        CellKey::new(self.level, self.start_index)
    }

    /// One past the last leaf index covered.
    pub fn end_index(&self) -> usize {
        self.start_index + self.col_span
    }
}

/// Result of composing a column tree into header rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderLayout {
    pub level_count: usize,
    /// Level-major, then by `start_index`.
    pub cells: Vec<HeaderCell>,
}

impl HeaderLayout {
    pub fn cells_at_level(&self, level: usize) -> impl Iterator<Item = &HeaderCell> {
        self.cells.iter().filter(move |c| c.level == level)
    }

    /// Cells grouped per level, each group sorted by `start_index`.
    pub fn by_level(&self) -> Vec<Vec<HeaderCell>> {
        let mut levels: Vec<Vec<HeaderCell>> = vec![Vec::new(); self.level_count];
        for cell in &self.cells {
            if let Some(level) = levels.get_mut(cell.level) {
                level.push(cell.clone());
            }
        }
        for level in &mut levels {
            level.sort_by_key(|c| c.start_index);
        }
        levels
    }

    pub fn leaf_cell(&self, column_index: usize) -> Option<&HeaderCell> {
        self.cells
            .iter()
            .find(|c| c.column_index == Some(column_index))
    }
}

/// Direction of the active sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    Ascending,
    Descending,
}
