//! Data-grid controller and the state it drives.
//!
//! The controller ties the column configuration, the header composer, the
//! header pool and the scene together, and keeps the UI state the header
//! and body react to.

mod cell;
mod controller;
mod lazy;
mod memo;
mod selection;
mod sort;
mod tree;

pub use cell::{
    CellDrawContext, CellDrawOutput, CellRenderer, ClickHandler, HitRegion, SceneCellRenderer,
    TextCellRenderer, CELL_PADDING,
};
pub use controller::{DataGrid, Drag};
pub use lazy::LazyRows;
pub use memo::{Memo, Shared};
pub use selection::{ColumnSelection, IndexSelection, RowSelection};
pub use sort::SortState;
pub use tree::{flatten_in_order, flatten_tree, FlatRow, TreeExpansion};
