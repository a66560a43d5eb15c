//! Retained-mode scene graph.
//!
//! Nodes live in a [`SceneTree`] arena. Containers own their children and
//! lay them out with the flex engine; leaves (text, icon, button,
//! icon-button) measure and draw themselves. [`SceneRoot`] drives one
//! layout+paint pass per frame and routes pointer events along hit-test
//! paths.

mod context;
mod events;
mod node;
mod root;
mod tree;

pub use context::PaintContext;
pub use events::{EventContext, EventKind, Handler, Handlers, Modifiers, PointerEvent};
pub(crate) use node::{paint_icon, paint_text};
pub use node::{
    ButtonNode, ContainerNode, IconButtonNode, IconNode, Node, NodeId, NodeKind, TextAlign,
    TextNode,
};
pub use root::{Dispatched, SceneRoot};
pub use tree::SceneTree;
