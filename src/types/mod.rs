//! Data types for the grid.

mod column;
mod config;
mod geometry;
mod header;

pub use column::*;
pub use config::*;
pub use geometry::*;
pub use header::*;
