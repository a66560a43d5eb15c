//! Header composition tests: merged spans over column trees.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]

mod common;

use common::{compose, flat_columns, level_summary};
use gridview::{resolve_columns, ColumnDef, ColumnKind, ColumnOrder, HeaderContent};
use test_case::test_case;

fn two_groups() -> Vec<ColumnDef> {
    vec![
        ColumnDef::group(
            "A",
            vec![ColumnDef::leaf("a1", "a1"), ColumnDef::leaf("a2", "a2")],
        ),
        ColumnDef::group("B", vec![ColumnDef::leaf("b1", "b1")]),
    ]
}

fn mixed_depths() -> Vec<ColumnDef> {
    vec![
        ColumnDef::leaf("id", "Id"),
        ColumnDef::group(
            "Person",
            vec![
                ColumnDef::group(
                    "Name",
                    vec![ColumnDef::leaf("first", "First"), ColumnDef::leaf("last", "Last")],
                ),
                ColumnDef::leaf("age", "Age"),
            ],
        ),
        ColumnDef::group("Address", vec![ColumnDef::leaf("city", "City")]),
    ]
}

fn repeated_titles() -> Vec<ColumnDef> {
    vec![
        ColumnDef::group("Q1", vec![ColumnDef::leaf("jan", "Jan")]),
        ColumnDef::group("Q1", vec![ColumnDef::leaf("feb", "Feb")]),
        ColumnDef::leaf("total", "Total"),
        ColumnDef::group("Q1", vec![ColumnDef::leaf("mar", "Mar")]),
    ]
}

fn wide() -> Vec<ColumnDef> {
    (0..40)
        .map(|g| {
            let leaves = (0..(g % 4 + 1))
                .map(|i| ColumnDef::leaf(&format!("g{g}_{i}"), &format!("c{i}")))
                .collect();
            if g % 3 == 0 {
                ColumnDef::group(&format!("G{}", g / 2), leaves)
            } else {
                ColumnDef::group(
                    "Outer",
                    vec![ColumnDef::group(&format!("G{}", g / 2), leaves)],
                )
            }
        })
        .collect()
}

#[test]
fn test_two_groups_scenario() {
    let layout = compose(&two_groups());
    assert_eq!(layout.level_count, 2);
    assert_eq!(
        level_summary(&layout, 0),
        vec![("A".to_string(), 2, 1), ("B".to_string(), 1, 1)]
    );
    assert_eq!(
        level_summary(&layout, 1),
        vec![
            ("a1".to_string(), 1, 1),
            ("a2".to_string(), 1, 1),
            ("b1".to_string(), 1, 1)
        ]
    );
}

#[test]
fn test_flat_columns_scenario() {
    let layout = compose(&flat_columns(&["a", "b", "c"]));
    assert_eq!(layout.level_count, 1);
    assert_eq!(layout.cells.len(), 3);
    for cell in &layout.cells {
        assert_eq!((cell.col_span, cell.row_span), (1, 1));
        assert!(cell.is_leaf);
        assert_eq!(cell.column_index, Some(cell.start_index));
    }
}

#[test]
fn test_single_child_group_is_kept() {
    let layout = compose(&[ColumnDef::group("Only", vec![ColumnDef::leaf("x", "X")])]);
    assert_eq!(layout.level_count, 2);
    assert_eq!(level_summary(&layout, 0), vec![("Only".to_string(), 1, 1)]);
    assert_eq!(level_summary(&layout, 1), vec![("X".to_string(), 1, 1)]);
}

#[test]
fn test_mixed_depths() {
    let layout = compose(&mixed_depths());
    assert_eq!(layout.level_count, 3);
    assert_eq!(
        level_summary(&layout, 0),
        vec![
            ("Id".to_string(), 1, 3),
            ("Person".to_string(), 3, 1),
            ("Address".to_string(), 1, 1)
        ]
    );
    assert_eq!(
        level_summary(&layout, 1),
        vec![
            ("Name".to_string(), 2, 1),
            ("Age".to_string(), 1, 2),
            ("City".to_string(), 1, 2)
        ]
    );
    assert_eq!(
        level_summary(&layout, 2),
        vec![("First".to_string(), 1, 1), ("Last".to_string(), 1, 1)]
    );
}

#[test]
fn test_adjacent_groups_with_equal_titles_merge() {
    let layout = compose(&repeated_titles());
    let level0 = level_summary(&layout, 0);
    // Jan and Feb share a "Q1" run; Total breaks it, so Mar's "Q1" stands alone.
    assert_eq!(
        level0,
        vec![
            ("Q1".to_string(), 2, 1),
            ("Total".to_string(), 1, 2),
            ("Q1".to_string(), 1, 1)
        ]
    );
}

#[test]
fn test_column_without_source_is_dropped() {
    let defs = vec![
        ColumnDef::leaf("a", "A"),
        ColumnDef {
            title: "Nothing".to_string(),
            ..ColumnDef::default()
        },
        ColumnDef {
            title: "Action".to_string(),
            kind: ColumnKind::Button,
            ..ColumnDef::default()
        },
    ];
    let layout = compose(&defs);
    let titles: Vec<String> = layout.cells.iter().map(|c| c.title.clone()).collect();
    assert_eq!(titles, vec!["A", "Action"]);
}

#[test]
fn test_header_content_carried_to_cells() {
    let layout = compose(&[ColumnDef::group(
        "Metrics",
        vec![ColumnDef::leaf("cpu", "CPU").with_header_content(HeaderContent::Badge("%".into()))],
    )
    .with_header_content(HeaderContent::Icon("info".into()))]);
    assert_eq!(
        layout.cells[0].content,
        Some(HeaderContent::Icon("info".into()))
    );
    assert_eq!(
        layout.leaf_cell(0).unwrap().content,
        Some(HeaderContent::Badge("%".into()))
    );
}

#[test]
fn test_reorder_splits_groups() {
    let leaves = resolve_columns(&two_groups());
    let order = ColumnOrder::new(vec!["a1".into(), "b1".into(), "a2".into()]);
    let layout = gridview::compose_header(&order.apply(&leaves));
    assert_eq!(
        level_summary(&layout, 0),
        vec![
            ("A".to_string(), 1, 1),
            ("B".to_string(), 1, 1),
            ("A".to_string(), 1, 1)
        ]
    );
}

#[test]
fn test_layout_serializes_camel_case() {
    let layout = compose(&two_groups());
    let json = serde_json::to_value(&layout).unwrap();
    assert_eq!(json["levelCount"], 2);
    assert_eq!(json["cells"][0]["colSpan"], 2);
    assert_eq!(json["cells"][0]["startIndex"], 0);
    assert!(json["cells"][0].get("columnIndex").is_none());
    assert_eq!(json["cells"][2]["columnIndex"], 0);
}

#[test_case(two_groups() ; "two groups")]
#[test_case(mixed_depths() ; "mixed depths")]
#[test_case(repeated_titles() ; "repeated titles")]
#[test_case(flat_columns(&["a", "b", "c", "d"]) ; "flat")]
#[test_case(wide() ; "wide nested")]
fn test_span_invariants(defs: Vec<ColumnDef>) {
    let leaves = resolve_columns(&defs);
    let layout = gridview::compose_header(&leaves);
    let levels = layout.level_count;

    let top: usize = layout.cells_at_level(0).map(|c| c.col_span).sum();
    assert_eq!(top, leaves.len());

    for cell in &layout.cells {
        assert!(cell.row_span >= 1 && cell.col_span >= 1);
        assert!(cell.level + cell.row_span <= levels);
        if cell.is_leaf {
            assert_eq!(cell.row_span, levels - cell.level);
            assert_eq!(cell.col_span, 1);
        }
    }

    // Every leaf index is covered exactly once per level, counting cells
    // from shallower levels that span down into it.
    for level in 0..levels {
        let mut covered = vec![0usize; leaves.len()];
        for cell in layout
            .cells
            .iter()
            .filter(|c| c.level <= level && level < c.level + c.row_span)
        {
            for slot in &mut covered[cell.start_index..cell.end_index()] {
                *slot += 1;
            }
        }
        assert!(covered.iter().all(|&n| n == 1), "level {level}: {covered:?}");
    }
}
