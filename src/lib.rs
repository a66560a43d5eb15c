//! gridview - data grid with grouped, merged column headers for the web
//!
//! Renders large tables onto a Canvas 2D surface via WebAssembly:
//! - Multi-level column groups composed into merged header cells
//! - Retained scene graph with a flexbox-style layout engine
//! - Pooled header subtrees, so wide headers scroll without allocating
//! - Column reorder, resize, sort, tree rows and row selection
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { GridView } from 'gridview';
//! await init();
//! const view = new GridView(canvas, window.devicePixelRatio);
//! view.setColumns(columns);
//! view.setRows(rows);
//! view.start();
//! ```
//!
//! # Usage (Rust)
//!
//! ```
//! use gridview::{compose_header, resolve_columns, ColumnDef};
//!
//! let leaves = resolve_columns(&[
//!     ColumnDef::group("Person", vec![ColumnDef::leaf("first", "First"), ColumnDef::leaf("last", "Last")]),
//!     ColumnDef::leaf("age", "Age"),
//! ]);
//! let header = compose_header(&leaves);
//! assert_eq!(header.level_count, 2);
//! ```

pub mod columns;
pub mod error;
pub mod grid;
pub mod header;
pub mod layout;
pub mod pool;
pub mod render;
pub mod scene;
pub mod signal;
pub mod types;

#[cfg(target_arch = "wasm32")]
pub mod viewer;

use wasm_bindgen::prelude::*;

pub use columns::{resolve_columns, ColumnOrder, OrderChange};
pub use error::{GridError, Result};
pub use grid::DataGrid;
pub use header::compose_header;
pub use pool::HeaderPool;
pub use scene::SceneRoot;
pub use types::*;

#[cfg(target_arch = "wasm32")]
pub use viewer::GridView;

/// Compose the header for a column-definition tree given as JSON and return
/// the result as JSON.
///
/// # Errors
/// Returns an error if the JSON is not a column-definition array.
#[wasm_bindgen(js_name = "composeHeader")]
pub fn compose_header_json(columns: &str) -> std::result::Result<String, JsValue> {
    let defs: Vec<ColumnDef> =
        serde_json::from_str(columns).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let layout = compose_header(&resolve_columns(&defs));
    serde_json::to_string(&layout)
        .map_err(|e| JsValue::from_str(&format!("JSON serialization error: {e}")))
}

/// Crate version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
