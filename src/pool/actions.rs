use std::cell::RefCell;
use std::rc::Rc;

use crate::scene::Modifiers;

/// Header interaction recorded by a scene handler and applied by the grid
/// once dispatch has finished.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeaderAction {
    /// Sort button clicked on a leaf column.
    ToggleSort { column: usize },
    /// Header cell clicked; selects the leaf columns it spans.
    SelectColumns {
        start: usize,
        span: usize,
        modifiers: Modifiers,
    },
    /// Grip pressed on a leaf column; `x` is in root coordinates.
    BeginReorder { column: usize, x: f32 },
    /// Resize handle pressed on a leaf column.
    BeginResize { column: usize, x: f32 },
}

/// Shared FIFO of pending header actions.
#[derive(Debug, Clone, Default)]
pub struct ActionQueue(Rc<RefCell<Vec<HeaderAction>>>);

impl ActionQueue {
    pub fn push(&self, action: HeaderAction) {
        self.0.borrow_mut().push(action);
    }

    /// Take every pending action in the order they were pushed.
    pub fn drain(&self) -> Vec<HeaderAction> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}
