//! Browser tests for the canvas surface. Run with `wasm-pack test --headless --chrome`.
#![cfg(target_arch = "wasm32")]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use gridview::render::{Canvas2dSurface, Surface};
use gridview::{ColumnDef, DataGrid, GridConfig};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlCanvasElement;

wasm_bindgen_test_configure!(run_in_browser);

fn canvas() -> HtmlCanvasElement {
    web_sys::window()
        .unwrap()
        .document()
        .unwrap()
        .create_element("canvas")
        .unwrap()
        .dyn_into()
        .unwrap()
}

#[wasm_bindgen_test]
fn test_resize_scales_backing_store() {
    let mut surface = Canvas2dSurface::new(canvas(), 1.0);
    surface.resize(300.0, 150.0, 2.0);
    assert_eq!(surface.canvas().width(), 600);
    assert_eq!(surface.canvas().height(), 300);
    let size = surface.size();
    assert_eq!((size.width, size.height), (300.0, 150.0));
}

#[wasm_bindgen_test]
fn test_measures_text() {
    let mut surface = Canvas2dSurface::new(canvas(), 1.0);
    assert!(surface.has_context());
    let narrow = surface.measure_text("i", "12px sans-serif");
    let wide = surface.measure_text("WWWW", "12px sans-serif");
    assert!(wide > narrow);
}

#[wasm_bindgen_test]
fn test_grid_renders_to_canvas() {
    let mut surface = Canvas2dSurface::new(canvas(), 1.0);
    surface.resize(400.0, 200.0, 1.0);
    let mut grid = DataGrid::new(GridConfig::default()).unwrap();
    grid.set_columns(vec![ColumnDef::leaf("name", "Name")]);
    grid.set_rows(vec![serde_json::json!({ "name": "Ada" })]);
    surface.begin_frame();
    grid.render(&mut surface).unwrap();
    assert_eq!(grid.pool().active().len(), 1);
}
