//! End-to-end grid tests: rendering, header interactions and body clicks,
//! driven through a recording surface.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use common::{
    center, click, header_node, node_rect, people_grid, rerender, send, send_with, SURFACE_HEIGHT,
    SURFACE_WIDTH,
};
use gridview::grid::{
    CellDrawContext, CellDrawOutput, CellRenderer, Drag, HitRegion, LazyRows, SceneCellRenderer,
};
use gridview::layout::BoxStyle;
use gridview::render::icons::names;
use gridview::render::RecordingSurface;
use gridview::scene::{ButtonNode, EventKind, Modifiers, NodeKind, PointerEvent};
use gridview::{CellKey, ColumnDef, DataGrid, Edges, GridConfig, Rect, SortDirection};
use serde_json::json;

const NAMES: [&str; 3] = ["Grace", "Ada", "Linus"];

/// Body names in paint order.
fn painted_names(surface: &RecordingSurface) -> Vec<&str> {
    surface
        .texts()
        .into_iter()
        .filter(|t| NAMES.contains(t))
        .collect()
}

const SHIFT: Modifiers = Modifiers {
    shift: true,
    ctrl: false,
    alt: false,
    meta: false,
};

#[test]
fn test_render_paints_header_and_rows() {
    let (mut grid, surface) = people_grid();
    let texts = surface.texts();
    for title in ["Name", "Age", "City"] {
        assert!(texts.contains(&title), "missing header {title}");
    }
    assert_eq!(painted_names(&surface), vec!["Grace", "Ada", "Linus"]);
    assert!(texts.contains(&"Helsinki"));
    assert_eq!(grid.header_height(), 28.0);
    assert_eq!(grid.pool().active().len(), 3);
}

#[test]
fn test_sort_button_cycles_direction() {
    let (mut grid, mut surface) = people_grid();
    let button = header_node(&grid, 0, 0, |e| e.sort_button);
    let (x, y) = center(node_rect(&grid, button));

    click(&mut grid, x, y);
    assert_eq!(grid.sort().column_id(), Some("name"));
    assert_eq!(grid.sort().direction(), Some(SortDirection::Ascending));
    // The sort button swallows the click, so no column gets selected.
    assert!(grid.column_selection().is_empty());

    rerender(&mut grid, &mut surface);
    assert_eq!(painted_names(&surface), vec!["Ada", "Grace", "Linus"]);
    match grid.scene().tree.kind(button) {
        Some(NodeKind::IconButton(b)) => assert_eq!(b.icon, names::SORT_ASC),
        other => panic!("unexpected sort node {other:?}"),
    }

    click(&mut grid, x, y);
    assert_eq!(grid.sort().direction(), Some(SortDirection::Descending));
    rerender(&mut grid, &mut surface);
    assert_eq!(painted_names(&surface), vec!["Linus", "Grace", "Ada"]);

    click(&mut grid, x, y);
    assert_eq!(grid.sort().direction(), None);
}

#[test]
fn test_sorting_clears_row_selection() {
    let (mut grid, mut surface) = people_grid();
    click(&mut grid, 50.0, 41.0);
    assert!(grid.row_selection().is_selected(0));

    let button = header_node(&grid, 0, 0, |e| e.sort_button);
    let (x, y) = center(node_rect(&grid, button));
    click(&mut grid, x, y);
    assert!(grid.row_selection().is_empty());

    // No row is highlighted after the rows move.
    rerender(&mut grid, &mut surface);
    let selected = grid.config().theme.selected_bg_color.clone();
    assert!(!surface.fills().iter().any(|(_, color)| *color == selected));
}

#[test]
fn test_header_click_selects_columns() {
    let (mut grid, _) = people_grid();
    let label = header_node(&grid, 0, 1, |e| e.label);
    let (x, y) = center(node_rect(&grid, label));
    click(&mut grid, x, y);
    assert!(grid.column_selection().is_selected(1));
    assert_eq!(grid.column_selection().len(), 1);

    let label = header_node(&grid, 0, 2, |e| e.label);
    let (x, y) = center(node_rect(&grid, label));
    send_with(&mut grid, EventKind::Click, x, y, SHIFT);
    assert_eq!(
        grid.column_selection().selected().iter().copied().collect::<Vec<_>>(),
        vec![1, 2]
    );
}

#[test]
fn test_drag_grip_reorders_and_notifies() {
    let (mut grid, mut surface) = people_grid();
    let seen: Rc<RefCell<Vec<Vec<String>>>> = Rc::default();
    let _subscription = {
        let seen = Rc::clone(&seen);
        grid.on_order_change(move |change| seen.borrow_mut().push(change.order.clone()))
    };
    let button = header_node(&grid, 0, 0, |e| e.sort_button);
    let (sx, sy) = center(node_rect(&grid, button));
    click(&mut grid, sx, sy);

    let grip = header_node(&grid, 0, 0, |e| e.grip);
    let (x, y) = center(node_rect(&grid, grip));
    send(&mut grid, EventKind::MouseDown, x, y);
    assert_eq!(grid.drag(), Some(Drag::Reorder { column: 0, target: 0 }));

    // Past the middle of the last column: insert at the end.
    send(&mut grid, EventKind::MouseMove, 260.0, y);
    assert_eq!(grid.drag(), Some(Drag::Reorder { column: 0, target: 3 }));

    rerender(&mut grid, &mut surface);
    let header = grid.pool().parent();
    assert_eq!(grid.scene().tree.children(header).len(), 4, "drop marker shown");

    send(&mut grid, EventKind::MouseUp, 260.0, y);
    assert_eq!(grid.drag(), None);
    let expected = vec!["age".to_string(), "city".to_string(), "name".to_string()];
    assert_eq!(grid.column_ids(), expected);
    assert_eq!(*seen.borrow(), vec![expected]);
    // Sort follows the column, not the position.
    assert_eq!(grid.sort().column_id(), Some("name"));
    let leaves = grid.leaves();
    assert_eq!(
        grid.sort().active_index(&leaves),
        Some((2, SortDirection::Ascending))
    );

    rerender(&mut grid, &mut surface);
    assert_eq!(grid.scene().tree.children(header).len(), 3);
}

#[test]
fn test_drop_in_place_keeps_order() {
    let (mut grid, _) = people_grid();
    let calls = Rc::new(Cell::new(0));
    let _subscription = {
        let calls = Rc::clone(&calls);
        grid.on_order_change(move |_| calls.set(calls.get() + 1))
    };
    let grip = header_node(&grid, 0, 1, |e| e.grip);
    let (x, y) = center(node_rect(&grid, grip));
    send(&mut grid, EventKind::MouseDown, x, y);
    send(&mut grid, EventKind::MouseMove, 130.0, y);
    send(&mut grid, EventKind::MouseUp, 130.0, y);
    assert_eq!(grid.column_ids(), vec!["name", "age", "city"]);
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_resize_handle_drag_sets_width() {
    let (mut grid, mut surface) = people_grid();
    let handle = header_node(&grid, 0, 0, |e| e.resize_handle);
    let rect = node_rect(&grid, handle);
    assert_eq!(rect, Rect::new(94.0, 0.0, 6.0, 28.0));
    let (x, y) = center(rect);

    send(&mut grid, EventKind::MouseDown, x, y);
    assert!(matches!(grid.drag(), Some(Drag::Resize { column: 0, .. })));
    send(&mut grid, EventKind::MouseMove, x + 40.0, y);
    send(&mut grid, EventKind::MouseUp, x + 40.0, y);

    assert_eq!(grid.column_widths().get("name"), Some(&140.0));
    rerender(&mut grid, &mut surface);
    assert_eq!(grid.column_layout().width(0), 140.0);
    let age = header_node(&grid, 0, 1, |e| e.container);
    assert_eq!(node_rect(&grid, age).x, 140.0);
}

#[test]
fn test_resize_respects_min_width() {
    let (mut grid, _) = people_grid();
    let handle = header_node(&grid, 0, 0, |e| e.resize_handle);
    let (x, y) = center(node_rect(&grid, handle));
    send(&mut grid, EventKind::MouseDown, x, y);
    send(&mut grid, EventKind::MouseMove, 0.0, y);
    send(&mut grid, EventKind::MouseUp, 0.0, y);
    // Leaf columns default to a 40px minimum.
    assert_eq!(grid.column_widths().get("name"), Some(&40.0));
}

#[test]
fn test_body_click_selects_rows() {
    let (mut grid, mut surface) = people_grid();
    // Header 28, rows 26: y = 64 is the second row.
    click(&mut grid, 50.0, 64.0);
    assert!(grid.row_selection().is_selected(1));

    send_with(&mut grid, EventKind::Click, 50.0, 90.0, SHIFT);
    assert_eq!(
        grid.row_selection().selected().iter().copied().collect::<Vec<_>>(),
        vec![1, 2]
    );

    rerender(&mut grid, &mut surface);
    let selected = grid.config().theme.selected_bg_color.clone();
    assert!(surface
        .fills()
        .contains(&(Rect::new(0.0, 54.0, SURFACE_WIDTH, 26.0), selected.as_str())));

    // Below the last row nothing changes.
    click(&mut grid, 50.0, 300.0);
    assert_eq!(grid.row_selection().len(), 2);
}

#[test]
fn test_device_pointer_uses_pixel_ratio() {
    let (mut grid, _) = people_grid();
    let mut surface = RecordingSurface::new(SURFACE_WIDTH, SURFACE_HEIGHT).with_dpr(2.0);
    grid.render(&mut surface).unwrap();
    grid.pointer_device(PointerEvent::new(EventKind::Click, 100.0, 128.0))
        .unwrap();
    assert!(grid.row_selection().is_selected(1));
}

#[test]
fn test_tree_rows_expand_from_chevron() {
    let mut grid = DataGrid::new(GridConfig::default()).unwrap();
    grid.set_columns(vec![ColumnDef::leaf("name", "Name").with_width(150.0)]);
    grid.set_rows(vec![
        json!({ "name": "parent", "children": [{ "name": "kid1" }, { "name": "kid2" }] }),
        json!({ "name": "solo" }),
    ]);
    grid.set_children_key(Some("children".into()));
    let mut surface = RecordingSurface::new(SURFACE_WIDTH, SURFACE_HEIGHT);
    grid.render(&mut surface).unwrap();
    assert_eq!(grid.row_count(), 2);
    assert!(!surface.texts().contains(&"kid1"));

    click(&mut grid, 8.0, 41.0);
    assert!(grid.expansion().is_expanded("0"));
    assert_eq!(grid.row_count(), 4);
    assert!(grid.row_selection().is_empty());

    rerender(&mut grid, &mut surface);
    let texts = surface.texts();
    assert!(texts.contains(&"kid1") && texts.contains(&"kid2"));

    // Clicking the row text selects instead of toggling.
    click(&mut grid, 100.0, 41.0);
    assert!(grid.row_selection().is_selected(0));
    assert_eq!(grid.row_count(), 4);

    click(&mut grid, 8.0, 41.0);
    assert_eq!(grid.row_count(), 2);
}

#[test]
fn test_scroll_clamps_and_virtualizes_rows() {
    let mut grid = DataGrid::new(GridConfig::default()).unwrap();
    grid.set_columns(vec![ColumnDef::leaf("name", "Name").with_width(100.0)]);
    let mut rows = LazyRows::new(100, |i| json!({ "name": format!("row{i}") }));
    grid.set_rows(rows.materialize(0..rows.len()));
    let mut surface = RecordingSurface::new(SURFACE_WIDTH, SURFACE_HEIGHT);
    grid.render(&mut surface).unwrap();

    grid.scroll_to(500.0, 5000.0);
    // 28 header + 100 * 26 rows, minus a 400px viewport.
    assert_eq!(grid.viewport().scroll_y, 2228.0);
    assert_eq!(grid.viewport().scroll_x, 0.0);

    rerender(&mut grid, &mut surface);
    let texts = surface.texts();
    assert!(texts.contains(&"row99"));
    assert!(texts.contains(&"row90"));
    assert!(!texts.contains(&"row10"));

    grid.scroll_by(0.0, -10_000.0);
    assert_eq!(grid.viewport().scroll_y, 0.0);
}

struct CountingRenderer {
    clicks: Rc<Cell<u32>>,
}

impl CellRenderer for CountingRenderer {
    fn draw(&mut self, ctx: &mut CellDrawContext<'_, '_>) -> CellDrawOutput {
        let clicks = Rc::clone(&self.clicks);
        CellDrawOutput {
            regions: vec![HitRegion {
                rect: ctx.rect,
                on_click: Some(Rc::new(move |_, _| clicks.set(clicks.get() + 1))),
            }],
        }
    }
}

#[test]
fn test_cell_renderer_regions_receive_clicks() {
    let (mut grid, mut surface) = people_grid();
    let clicks = Rc::new(Cell::new(0));
    grid.set_cell_renderer(
        "age",
        Box::new(CountingRenderer {
            clicks: Rc::clone(&clicks),
        }),
    );
    rerender(&mut grid, &mut surface);
    assert!(!surface.texts().contains(&"45"));

    click(&mut grid, 150.0, 64.0);
    assert_eq!(clicks.get(), 1);
    assert!(grid.row_selection().is_empty());

    click(&mut grid, 50.0, 64.0);
    assert_eq!(clicks.get(), 1);
    assert!(grid.row_selection().is_selected(1));
}

#[test]
fn test_set_column_order_notifies_on_change_only() {
    let (mut grid, _) = people_grid();
    let calls = Rc::new(Cell::new(0));
    let subscription = {
        let calls = Rc::clone(&calls);
        grid.on_order_change(move |_| calls.set(calls.get() + 1))
    };
    grid.set_column_order(vec!["city".into(), "name".into()]);
    grid.set_column_order(vec!["city".into(), "name".into()]);
    assert_eq!(calls.get(), 1);
    assert_eq!(grid.column_ids(), vec!["city", "name", "age"]);

    subscription.unsubscribe();
    grid.set_column_order(vec!["age".into()]);
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_grouped_header_height_and_hover() {
    let mut grid = DataGrid::new(GridConfig::default()).unwrap();
    grid.set_columns(vec![
        ColumnDef::group(
            "Person",
            vec![
                ColumnDef::leaf("first", "First").with_width(100.0),
                ColumnDef::leaf("last", "Last").with_width(100.0),
            ],
        ),
        ColumnDef::leaf("age", "Age").with_width(100.0),
    ]);
    let mut surface = RecordingSurface::new(SURFACE_WIDTH, SURFACE_HEIGHT);
    grid.render(&mut surface).unwrap();
    assert_eq!(grid.header_height(), 56.0);

    let person = header_node(&grid, 0, 0, |e| e.container);
    assert_eq!(node_rect(&grid, person), Rect::new(0.0, 0.0, 200.0, 28.0));
    let age = header_node(&grid, 0, 2, |e| e.container);
    assert_eq!(node_rect(&grid, age), Rect::new(200.0, 0.0, 100.0, 56.0));

    send(&mut grid, EventKind::MouseMove, 150.0, 10.0);
    assert!(grid.pool().hover().contains(CellKey::new(0, 0)));
    send(&mut grid, EventKind::MouseMove, 250.0, 10.0);
    assert!(!grid.pool().hover().contains(CellKey::new(0, 0)));
    assert!(grid.pool().hover().contains(CellKey::new(0, 2)));

    // Clicking the group selects every leaf under it.
    click(&mut grid, 150.0, 10.0);
    assert_eq!(
        grid.column_selection().selected().iter().copied().collect::<Vec<_>>(),
        vec![0, 1]
    );
}

#[test]
fn test_scene_cell_renderer_buttons_are_clickable() {
    let (mut grid, mut surface) = people_grid();
    let clicks = Rc::new(Cell::new(0));
    let counter = Rc::clone(&clicks);
    let renderer = SceneCellRenderer::new(BoxStyle::default(), move |tree, root, _row, _column| {
        if tree.children(root).is_empty() {
            let button = tree.create(NodeKind::Button(ButtonNode {
                label: "Open".into(),
                font: "12px sans-serif".into(),
                line_height: 14.0,
                color: "#000000".into(),
                background: None,
                hover_background: None,
                padding: Edges::symmetric(8.0, 2.0),
            }));
            tree.add_child(root, button)?;
            let counter = Rc::clone(&counter);
            tree.handlers_mut(button)?
                .set(EventKind::Click, move |_| counter.set(counter.get() + 1));
        }
        Ok(())
    });
    grid.set_cell_renderer("city", Box::new(renderer));
    rerender(&mut grid, &mut surface);
    assert_eq!(
        surface.texts().into_iter().filter(|t| *t == "Open").count(),
        3
    );

    // "Open" is 28px plus 16px of padding, starting at the city column.
    click(&mut grid, 210.0, 64.0);
    assert_eq!(clicks.get(), 1);
    assert!(grid.row_selection().is_empty());

    // Past the button the cell behaves like any other.
    click(&mut grid, 280.0, 64.0);
    assert_eq!(clicks.get(), 1);
    assert!(grid.row_selection().is_selected(1));
}

#[test]
fn test_hover_returns_after_cell_scrolls_back() {
    let mut grid = DataGrid::new(GridConfig::default()).unwrap();
    grid.set_columns(
        (0..20)
            .map(|i| ColumnDef::leaf(&format!("c{i}"), &format!("C{i}")).with_width(100.0))
            .collect(),
    );
    let mut surface = RecordingSurface::new(SURFACE_WIDTH, SURFACE_HEIGHT);
    grid.render(&mut surface).unwrap();
    let first = CellKey::new(0, 0);
    let container = header_node(&grid, 0, 0, |e| e.container);

    send(&mut grid, EventKind::MouseMove, 50.0, 10.0);
    assert!(grid.pool().hover().contains(first));

    // Scrolled out of view without the pointer moving.
    grid.scroll_to(1000.0, 0.0);
    rerender(&mut grid, &mut surface);
    assert!(!grid.pool().hover().contains(first));
    assert!(!grid.scene().hovered().contains(&container));

    grid.scroll_to(0.0, 0.0);
    rerender(&mut grid, &mut surface);
    assert_eq!(header_node(&grid, 0, 0, |e| e.container), container);
    send(&mut grid, EventKind::MouseMove, 50.0, 10.0);
    assert!(grid.pool().hover().contains(first));
}
