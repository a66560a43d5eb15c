//! Header scene pool.
//!
//! Projects the header cells currently scrolled into view onto a bounded
//! set of retained scene subtrees. Cells keep their subtree across frames
//! (keyed by [`CellKey`](crate::types::CellKey)), so panning a wide header
//! mutates existing nodes instead of allocating new ones.

mod actions;
mod header_pool;
mod hover;

pub use actions::{ActionQueue, HeaderAction};
pub use header_pool::{HeaderFrame, HeaderPool, PoolEntry, DEFAULT_POOL_SLACK};
pub use hover::HoverTable;
