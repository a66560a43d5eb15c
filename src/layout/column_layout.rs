//! Resolved column widths and cumulative positions.
//!
//! Positions are computed once per width change so lookups by x are
//! O(log n).

use std::collections::HashMap;
use std::ops::Range;

use crate::types::LeafColumn;

/// Pre-computed horizontal geometry of the leaf columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnLayout {
    /// `positions[i]` = x of column i's left edge; one extra trailing entry
    /// holds the total width.
    pub positions: Vec<f32>,
    pub widths: Vec<f32>,
}

impl ColumnLayout {
    /// Resolve widths for `leaves`.
    ///
    /// A width is `max(override or base width, min width)`. When the columns
    /// do not fill `available_width`, the remainder is shared by `grow`.
    pub fn new(leaves: &[LeafColumn], overrides: &HashMap<String, f32>, available_width: f32) -> Self {
        let mut widths: Vec<f32> = leaves
            .iter()
            .map(|leaf| {
                overrides
                    .get(&leaf.id)
                    .copied()
                    .unwrap_or(leaf.base_width)
                    .max(leaf.min_width)
            })
            .collect();

        let natural: f32 = widths.iter().sum();
        let slack = available_width - natural;
        let total_grow: f32 = leaves.iter().map(|l| l.grow.max(0.0)).sum();
        if slack > 0.0 && total_grow > 0.0 {
            for (w, leaf) in widths.iter_mut().zip(leaves) {
                *w += slack * leaf.grow.max(0.0) / total_grow;
            }
        }

        Self::from_widths(widths)
    }

    pub fn from_widths(widths: Vec<f32>) -> Self {
        let mut positions = Vec::with_capacity(widths.len() + 1);
        let mut x = 0.0f32;
        for w in &widths {
            positions.push(x);
            x += w.max(0.0);
        }
        positions.push(x);
        Self { positions, widths }
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    pub fn total_width(&self) -> f32 {
        self.positions.last().copied().unwrap_or(0.0)
    }

    pub fn x(&self, index: usize) -> f32 {
        self.positions.get(index).copied().unwrap_or_else(|| self.total_width())
    }

    pub fn width(&self, index: usize) -> f32 {
        self.widths.get(index).copied().unwrap_or(0.0)
    }

    /// Left edge and width of `span` columns starting at `start`.
    pub fn span(&self, start: usize, span: usize) -> (f32, f32) {
        let x = self.x(start);
        (x, self.x(start + span) - x)
    }

    /// Set one column's width and shift every column to its right.
    pub fn set_width(&mut self, index: usize, width: f32) {
        let Some(w) = self.widths.get_mut(index) else {
            return;
        };
        *w = width.max(0.0);
        let widths = std::mem::take(&mut self.widths);
        *self = Self::from_widths(widths);
    }

    /// Find column at x position (binary search)
    pub fn col_at_x(&self, x: f32) -> Option<usize> {
        if self.is_empty() || x < 0.0 || x >= self.total_width() {
            return None;
        }
        let i = self.positions.partition_point(|&pos| pos <= x);
        let col = i.saturating_sub(1);
        Some(col.min(self.len() - 1))
    }

    /// Columns intersecting `[scroll_x, scroll_x + width)`.
    pub fn visible_range(&self, scroll_x: f32, width: f32) -> Range<usize> {
        if self.is_empty() || width <= 0.0 {
            return 0..0;
        }
        let right = scroll_x + width;
        let start = self
            .positions
            .partition_point(|&pos| pos <= scroll_x)
            .saturating_sub(1)
            .min(self.len());
        let end = self.positions.partition_point(|&pos| pos < right).min(self.len());
        start..end.max(start)
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

    fn layout(widths: &[f32]) -> ColumnLayout {
        ColumnLayout::from_widths(widths.to_vec())
    }

    #[test]
    fn test_positions_are_cumulative() {
        let l = layout(&[10.0, 20.0, 30.0]);
        assert_eq!(l.positions, vec![0.0, 10.0, 30.0, 60.0]);
        assert_eq!(l.total_width(), 60.0);
        assert_eq!(l.span(1, 2), (10.0, 50.0));
    }

    #[test]
    fn test_col_at_x() {
        let l = layout(&[10.0, 20.0, 30.0]);
        assert_eq!(l.col_at_x(0.0), Some(0));
        assert_eq!(l.col_at_x(9.9), Some(0));
        assert_eq!(l.col_at_x(10.0), Some(1));
        assert_eq!(l.col_at_x(59.0), Some(2));
        assert_eq!(l.col_at_x(60.0), None);
        assert_eq!(l.col_at_x(-1.0), None);
    }

    #[test]
    fn test_visible_range() {
        let l = layout(&[10.0; 10]);
        assert_eq!(l.visible_range(0.0, 25.0), 0..3);
        assert_eq!(l.visible_range(15.0, 10.0), 1..3);
        assert_eq!(l.visible_range(200.0, 10.0), 10..10);
        assert_eq!(l.visible_range(0.0, 0.0), 0..0);
    }

    #[test]
    fn test_grow_fills_available() {
        let defs = vec![
            ColumnDef::leaf("a", "A").with_width(100.0),
            ColumnDef::leaf("b", "B").with_width(100.0).with_grow(1.0),
        ];
        let leaves = resolve_columns(&defs);
        let l = ColumnLayout::new(&leaves, &HashMap::new(), 300.0);
        assert_eq!(l.widths, vec![100.0, 200.0]);
    }

    #[test]
    fn test_override_respects_min_width() {
        let defs = vec![ColumnDef::leaf("a", "A").with_min_width(50.0)];
        let leaves = resolve_columns(&defs);
        let overrides = HashMap::from([("a".to_string(), 10.0)]);
        let l = ColumnLayout::new(&leaves, &overrides, 0.0);
        assert_eq!(l.widths, vec![50.0]);
    }

    #[test]
    fn test_set_width_shifts_positions() {
        let mut l = layout(&[10.0, 10.0, 10.0]);
        l.set_width(0, 30.0);
        assert_eq!(l.positions, vec![0.0, 30.0, 40.0, 50.0]);
    }
}
