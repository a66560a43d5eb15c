//! Geometry: the flex layout engine used by scene containers, resolved
//! column positions and the scroll viewport.

mod column_layout;
pub mod flex;
mod viewport;

pub use column_layout::ColumnLayout;
pub use flex::{
    compute_layout, AlignItems, BoxStyle, Dimension, FlexDirection, FlexKind, FlexNode, ItemStyle,
    JustifyContent, Position,
};
pub use viewport::Viewport;
