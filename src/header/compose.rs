//! Spreadsheet-style merged header composition.

use crate::types::{HeaderCell, HeaderLayout, LeafColumn};

/// Compose the header cells for `leaves`.
///
/// Runs in O(levels × leaves). Leaf cells always extend to the bottom level,
/// so a column with a shorter header path has no cells below its own leaf.
pub fn compose_header(leaves: &[LeafColumn]) -> HeaderLayout {
    let level_count = leaves.iter().map(LeafColumn::depth).max().unwrap_or(0);

    // Scratch matrix [level][leaf]; `None` where a shallower leaf's row span
    // already covers the slot.
    let mut matrix: Vec<Vec<Option<HeaderCell>>> = vec![vec![None; leaves.len()]; level_count];

    for (index, leaf) in leaves.iter().enumerate() {
        let depth = leaf.depth();
        for (level, segment) in leaf.header_path.iter().enumerate() {
            let is_leaf = level + 1 == depth;
            let slot = matrix.get_mut(level).and_then(|row| row.get_mut(index));
            if let Some(slot) = slot {
                *slot = Some(HeaderCell {
                    title: segment.title.clone(),
                    content: segment.content.clone(),
                    level,
                    row_span: if is_leaf { level_count - level } else { 1 },
                    col_span: 1,
                    start_index: index,
                    column_index: is_leaf.then_some(index),
                    is_leaf,
                });
            }
        }
    }

    let mut cells = Vec::new();
    for row in matrix {
        let mut run: Option<HeaderCell> = None;
        for slot in row {
            let Some(cell) = slot else {
                cells.extend(run.take());
                continue;
            };
            match run.as_mut() {
                Some(current) if extends_run(current, &cell) => current.col_span += 1,
                _ => {
                    cells.extend(run.take());
                    run = Some(cell);
                }
            }
        }
        cells.extend(run);
    }

    HeaderLayout { level_count, cells }
}

/// Group cells merge when both are groups with the same title and depth and
/// the next one starts exactly where the current run ends.
fn extends_run(current: &HeaderCell, next: &HeaderCell) -> bool {
    !current.is_leaf
        && !next.is_leaf
        && current.title == next.title
        && current.row_span == next.row_span
        && current.end_index() == next.start_index
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

    fn spans(layout: &HeaderLayout, level: usize) -> Vec<(String, usize, usize)> {
        layout
            .cells_at_level(level)
            .map(|c| (c.title.clone(), c.col_span, c.row_span))
            .collect()
    }

    #[test]
    fn test_empty_columns() {
        let layout = compose_header(&[]);
        assert_eq!(layout.level_count, 0);
        assert!(layout.cells.is_empty());
    }

    #[test]
    fn test_shallow_leaf_spans_down() {
        let leaves = resolve_columns(&[
            ColumnDef::leaf("id", "Id"),
            ColumnDef::group(
                "Name",
                vec![ColumnDef::leaf("first", "First"), ColumnDef::leaf("last", "Last")],
            ),
        ]);
        let layout = compose_header(&leaves);
        assert_eq!(layout.level_count, 2);
        assert_eq!(
            spans(&layout, 0),
            vec![("Id".into(), 1, 2), ("Name".into(), 2, 1)]
        );
        assert_eq!(
            spans(&layout, 1),
            vec![("First".into(), 1, 1), ("Last".into(), 1, 1)]
        );
        let id = layout.leaf_cell(0).unwrap();
        assert_eq!(id.level, 0);
        assert!(id.is_leaf);
    }

    #[test]
    fn test_leaf_titles_never_merge() {
        let leaves = resolve_columns(&[ColumnDef::leaf("a", "Same"), ColumnDef::leaf("b", "Same")]);
        let layout = compose_header(&leaves);
        assert_eq!(layout.cells.len(), 2);
        assert!(layout.cells.iter().all(|c| c.col_span == 1));
    }

    #[test]
    fn test_different_depth_groups_stay_separate() {
        // Same title, but one group has a nested subgroup so its leaf sits
        // deeper; the level-0 cells still merge because both are 1-row groups.
        // At level 1 the "X" group (non-leaf, row_span 1) and the "X" leaf
        // (row_span 2) do not merge.
        let leaves = resolve_columns(&[
            ColumnDef::group(
                "G",
                vec![ColumnDef::group("X", vec![ColumnDef::leaf("a", "A")])],
            ),
            ColumnDef::group("G", vec![ColumnDef::leaf("x", "X")]),
        ]);
        let layout = compose_header(&leaves);
        assert_eq!(layout.level_count, 3);
        assert_eq!(spans(&layout, 0), vec![("G".into(), 2, 1)]);
        assert_eq!(
            spans(&layout, 1),
            vec![("X".into(), 1, 1), ("X".into(), 1, 2)]
        );
    }
}
