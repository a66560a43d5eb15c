//! Shared builders for the integration tests.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]

use gridview::render::RecordingSurface;
use gridview::scene::{EventKind, Modifiers, NodeId, PointerEvent};
use gridview::{
    compose_header, resolve_columns, CellKey, ColumnDef, DataGrid, GridConfig, HeaderCell,
    HeaderLayout, Rect,
};
use serde_json::{json, Value};

pub const SURFACE_WIDTH: f32 = 800.0;
pub const SURFACE_HEIGHT: f32 = 400.0;

/// Leaf columns named by id, each 100px wide.
pub fn flat_columns(ids: &[&str]) -> Vec<ColumnDef> {
    ids.iter()
        .map(|id| ColumnDef::leaf(id, &id.to_uppercase()).with_width(100.0))
        .collect()
}

/// Compose the header for a column tree.
pub fn compose(defs: &[ColumnDef]) -> HeaderLayout {
    compose_header(&resolve_columns(defs))
}

/// Cells of one level as `(title, col_span, row_span)`.
pub fn level_summary(layout: &HeaderLayout, level: usize) -> Vec<(String, usize, usize)> {
    let mut cells: Vec<&HeaderCell> = layout.cells_at_level(level).collect();
    cells.sort_by_key(|c| c.start_index);
    cells
        .into_iter()
        .map(|c| (c.title.clone(), c.col_span, c.row_span))
        .collect()
}

pub fn people() -> Vec<Value> {
    vec![
        json!({ "name": "Grace", "age": 45, "city": "Arlington" }),
        json!({ "name": "Ada", "age": 36, "city": "London" }),
        json!({ "name": "Linus", "age": 28, "city": "Helsinki" }),
    ]
}

/// A grid over `people()` with sortable name/age/city columns, rendered once.
pub fn people_grid() -> (DataGrid, RecordingSurface) {
    let mut grid = DataGrid::new(GridConfig::default()).unwrap();
    grid.set_columns(vec![
        ColumnDef::leaf("name", "Name").with_width(100.0).sortable(),
        ColumnDef::leaf("age", "Age").with_width(100.0).sortable(),
        ColumnDef::leaf("city", "City").with_width(100.0).sortable(),
    ]);
    grid.set_rows(people());
    let mut surface = RecordingSurface::new(SURFACE_WIDTH, SURFACE_HEIGHT);
    grid.render(&mut surface).unwrap();
    (grid, surface)
}

/// Redraw into a cleared surface.
pub fn rerender(grid: &mut DataGrid, surface: &mut RecordingSurface) {
    surface.clear();
    grid.render(surface).unwrap();
}

pub fn center(rect: Rect) -> (f32, f32) {
    (rect.x + rect.w / 2.0, rect.y + rect.h / 2.0)
}

pub fn node_rect(grid: &DataGrid, id: NodeId) -> Rect {
    grid.scene().tree.rect(id).expect("node is live")
}

/// Pooled node of the header cell at `(level, start)`, chosen by `pick`.
pub fn header_node(
    grid: &DataGrid,
    level: usize,
    start: usize,
    pick: impl Fn(&gridview::pool::PoolEntry) -> NodeId,
) -> NodeId {
    let entry = grid
        .pool()
        .entry(CellKey::new(level, start))
        .expect("cell is pooled");
    pick(entry)
}

pub fn send(grid: &mut DataGrid, kind: EventKind, x: f32, y: f32) {
    grid.pointer(PointerEvent::new(kind, x, y)).unwrap();
}

pub fn send_with(grid: &mut DataGrid, kind: EventKind, x: f32, y: f32, modifiers: Modifiers) {
    grid.pointer(PointerEvent::new(kind, x, y).with_modifiers(modifiers))
        .unwrap();
}

/// Mouse down, up and click at one point.
pub fn click(grid: &mut DataGrid, x: f32, y: f32) {
    send(grid, EventKind::MouseDown, x, y);
    send(grid, EventKind::MouseUp, x, y);
    send(grid, EventKind::Click, x, y);
}
