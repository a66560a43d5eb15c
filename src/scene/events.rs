//! Pointer events and their dispatch along a hit-test path.

use std::fmt;
use std::rc::Rc;

use super::NodeId;
use crate::types::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    MouseDown,
    MouseUp,
    DoubleClick,
    MouseMove,
    MouseEnter,
    MouseLeave,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn toggle(self) -> bool {
        self.ctrl || self.meta
    }
}

/// A pointer event in logical root coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: EventKind,
    pub x: f32,
    pub y: f32,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(kind: EventKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            x,
            y,
            modifiers: Modifiers::default(),
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// State handed to each handler while an event bubbles.
#[derive(Debug)]
pub struct EventContext {
    pub event: PointerEvent,
    /// Deepest node under the pointer.
    pub target: NodeId,
    /// Node whose handler is running.
    pub current: NodeId,
    /// Bounds of `current` in root coordinates.
    pub current_rect: Rect,
    stopped: bool,
}

impl EventContext {
    pub(crate) fn new(event: PointerEvent, target: NodeId) -> Self {
        Self {
            event,
            target,
            current: target,
            current_rect: Rect::ZERO,
            stopped: false,
        }
    }

    pub fn stop_propagation(&mut self) {
        self.stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.stopped
    }

    /// Pointer position relative to the current node.
    pub fn local(&self) -> (f32, f32) {
        (
            self.event.x - self.current_rect.x,
            self.event.y - self.current_rect.y,
        )
    }
}

pub type Handler = Rc<dyn Fn(&mut EventContext)>;

/// Per-node event hooks. A missing hook is a no-op.
#[derive(Clone, Default)]
pub struct Handlers {
    hooks: Vec<(EventKind, Handler)>,
}

impl Handlers {
    /// Install or replace the hook for `kind`.
    pub fn set(&mut self, kind: EventKind, handler: impl Fn(&mut EventContext) + 'static) {
        self.set_rc(kind, Rc::new(handler));
    }

    pub fn set_rc(&mut self, kind: EventKind, handler: Handler) {
        self.hooks.retain(|(k, _)| *k != kind);
        self.hooks.push((kind, handler));
    }

    pub fn get(&self, kind: EventKind) -> Option<Handler> {
        self.hooks
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, h)| Rc::clone(h))
    }

    pub fn remove(&mut self, kind: EventKind) {
        self.hooks.retain(|(k, _)| *k != kind);
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.hooks.iter().map(|(k, _)| k))
            .finish()
    }
}
