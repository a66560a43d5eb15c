//! Structured error types for gridview.
//!
//! Most failure modes in the grid degrade rendering instead of surfacing an
//! error. The variants here cover what is left: structural misuse of the scene
//! tree and configuration that cannot be decoded at all.

use crate::scene::NodeId;

/// All errors that can occur while configuring, laying out or rendering a grid.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A child was added to a leaf node. Leaves cannot own children.
    #[error("node {0} is a leaf and cannot have children")]
    LeafChild(NodeId),

    /// The node id refers to a node that has been destroyed.
    #[error("node {0} no longer exists")]
    StaleNode(NodeId),

    /// A node was attached beneath itself.
    #[error("attaching node {child} under {parent} would create a cycle")]
    Cycle {
        /// Node being attached.
        child: NodeId,
        /// Intended parent.
        parent: NodeId,
    },

    /// Column or grid configuration could not be decoded.
    #[error("Configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Rendering error.
    #[error("Render error: {0}")]
    Render(String),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

impl From<String> for GridError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for GridError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
