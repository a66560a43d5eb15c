//! Multi-level header layout.
//!
//! Turns the ordered leaf columns into rows of merged header cells, the way a
//! spreadsheet merges cells: adjacent group labels with the same title collapse
//! into one wider cell, and a leaf that is shallower than its neighbours
//! stretches down to the bottom header row.

mod compose;

pub use compose::compose_header;
