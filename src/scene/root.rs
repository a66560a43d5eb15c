//! Scene root: per-frame layout and paint, pointer routing and hover
//! transitions.

use super::context::PaintContext;
use super::events::{EventKind, Modifiers, PointerEvent};
use super::node::{ContainerNode, NodeId, NodeKind};
use super::tree::SceneTree;
use crate::error::Result;
use crate::render::{CacheManager, IconSet, Surface};
use crate::types::Rect;

/// Result of routing one pointer event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    /// Hit-test path the event bubbled through, deepest first.
    pub path: Vec<NodeId>,
    pub stopped: bool,
}

pub struct SceneRoot {
    pub tree: SceneTree,
    root: NodeId,
    pub caches: CacheManager,
    pub icons: IconSet,
    pub debug_bounds: bool,
    dpr: f32,
    hover_path: Vec<NodeId>,
}

impl SceneRoot {
    /// A root owning a fresh container node.
    pub fn new(caches: CacheManager) -> Self {
        let mut tree = SceneTree::new();
        let root = tree.create(NodeKind::Container(ContainerNode::default()));
        Self::with_tree(tree, root, caches)
    }

    /// A root over an existing tree; `root` may be a container or a single
    /// leaf.
    pub fn with_tree(tree: SceneTree, root: NodeId, caches: CacheManager) -> Self {
        Self {
            tree,
            root,
            caches,
            icons: IconSet::builtin(),
            debug_bounds: false,
            dpr: 1.0,
            hover_path: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Size the root to the surface and resolve layout.
    pub fn layout(&mut self, surface: &mut dyn Surface) -> Result<()> {
        self.prune_hover();
        self.dpr = surface.dpr();
        let size = surface.size();
        self.tree
            .set_rect(self.root, Rect::new(0.0, 0.0, size.width, size.height))?;
        let mut ctx = PaintContext {
            surface,
            caches: &mut self.caches,
            icons: &self.icons,
            debug_bounds: self.debug_bounds,
        };
        self.tree.perform_layout(self.root, &mut ctx)
    }

    /// One display refresh: layout then paint, unconditionally.
    pub fn frame(&mut self, surface: &mut dyn Surface) -> Result<()> {
        self.layout(surface)?;
        let mut ctx = PaintContext {
            surface,
            caches: &mut self.caches,
            icons: &self.icons,
            debug_bounds: self.debug_bounds,
        };
        self.tree.paint(self.root, &mut ctx);
        Ok(())
    }

    /// Route a pointer event given in device pixels.
    pub fn pointer_device(
        &mut self,
        kind: EventKind,
        device_x: f32,
        device_y: f32,
        modifiers: Modifiers,
    ) -> Dispatched {
        let event = PointerEvent::new(kind, device_x / self.dpr, device_y / self.dpr)
            .with_modifiers(modifiers);
        self.pointer(event)
    }

    /// Hit-test and bubble an event given in logical pixels. Moves also run
    /// hover transitions before bubbling.
    pub fn pointer(&mut self, event: PointerEvent) -> Dispatched {
        let path = self.tree.hit_test(self.root, event.x, event.y);
        if event.kind == EventKind::MouseMove {
            self.update_hover(&path, event);
        }
        let stopped = self.tree.dispatch(&path, event);
        Dispatched { path, stopped }
    }

    /// The pointer left the surface: every hovered node gets a leave.
    pub fn pointer_leave(&mut self) {
        let event = PointerEvent::new(EventKind::MouseMove, f32::NAN, f32::NAN);
        self.update_hover(&[], event);
    }

    pub fn hovered(&self) -> &[NodeId] {
        &self.hover_path
    }

    /// Whether `id` still hangs under the root.
    fn is_attached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root {
                return true;
            }
            current = self.tree.parent(node);
        }
        false
    }

    /// Unhover nodes detached since the last pointer move, so they get a
    /// fresh enter when the pointer next reaches them.
    fn prune_hover(&mut self) {
        let (kept, dropped): (Vec<NodeId>, Vec<NodeId>) = std::mem::take(&mut self.hover_path)
            .into_iter()
            .partition(|&id| self.is_attached(id));
        self.hover_path = kept;
        for id in dropped {
            if self.tree.set_hovered(id, false) {
                let leave = PointerEvent::new(EventKind::MouseLeave, f32::NAN, f32::NAN);
                self.tree.dispatch(&[id], leave);
            }
        }
    }

    /// Diff the hovered set against `path`, sending one non-bubbling leave
    /// or enter per changed node.
    fn update_hover(&mut self, path: &[NodeId], event: PointerEvent) {
        let previous = std::mem::take(&mut self.hover_path);
        for &id in previous.iter().filter(|id| !path.contains(id)) {
            if self.tree.set_hovered(id, false) {
                let leave = PointerEvent {
                    kind: EventKind::MouseLeave,
                    ..event
                };
                self.tree.dispatch(&[id], leave);
            }
        }
        for &id in path.iter().filter(|id| !previous.contains(id)) {
            if self.tree.set_hovered(id, true) {
                let enter = PointerEvent {
                    kind: EventKind::MouseEnter,
                    ..event
                };
                self.tree.dispatch(&[id], enter);
            }
        }
        self.hover_path = path.iter().copied().filter(|&id| self.tree.contains(id)).collect();
    }
}
