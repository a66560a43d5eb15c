//! Arena-backed scene tree: structure, layout, paint, hit testing and
//! event dispatch.

use std::collections::HashSet;

use super::context::PaintContext;
use super::events::{EventContext, PointerEvent};
use super::node::{Node, NodeId, NodeKind};
use crate::error::{GridError, Result};
use crate::layout::{compute_layout, FlexKind, FlexNode, ItemStyle};
use crate::render::palette;
use crate::types::Rect;

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Owner of every scene node. Ids are generational, so an id kept after its
/// node was destroyed is detected instead of aliasing a new node.
#[derive(Default)]
pub struct SceneTree {
    slots: Vec<Slot>,
    free: Vec<usize>,
    len: usize,
}

impl SceneTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        self.create_with_style(kind, ItemStyle::default())
    }

    pub fn create_with_style(&mut self, kind: NodeKind, style: ItemStyle) -> NodeId {
        let node = Node::new(kind, style);
        self.len += 1;
        if let Some(index) = self.free.pop() {
            if let Some(slot) = self.slots.get_mut(index) {
                slot.node = Some(node);
                return NodeId {
                    index,
                    generation: slot.generation,
                };
            }
        }
        let index = self.slots.len();
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.node.as_mut())
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.get(id).ok_or(GridError::StaleNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.get_mut(id).ok_or(GridError::StaleNode(id))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    pub fn rect(&self, id: NodeId) -> Option<Rect> {
        self.get(id).map(|n| n.rect)
    }

    /// Set the rect of a node no container positions (a root).
    pub fn set_rect(&mut self, id: NodeId, rect: Rect) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.rect != rect {
            node.rect = rect;
            node.layout_dirty = true;
        }
        Ok(())
    }

    /// Flag `id` and every ancestor for layout, and for re-measure when
    /// `measure` is set.
    fn mark_dirty(&mut self, id: NodeId, measure: bool) {
        let mut current = Some(id);
        while let Some(cid) = current {
            let Some(node) = self.get_mut(cid) else {
                return;
            };
            node.layout_dirty = true;
            node.measure_dirty |= measure;
            current = node.parent;
        }
    }

    pub fn style(&self, id: NodeId) -> Option<&ItemStyle> {
        self.get(id).map(|n| &n.style)
    }

    pub fn set_style(&mut self, id: NodeId, style: ItemStyle) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.style != style {
            node.style = style;
            self.mark_dirty(id, false);
        }
        Ok(())
    }

    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.style.hidden != hidden {
            node.style.hidden = hidden;
            self.mark_dirty(id, false);
        }
        Ok(())
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.get(id).map(|n| &n.kind)
    }

    /// Mutable access to a node's content. Marks it for re-measure.
    pub fn kind_mut(&mut self, id: NodeId) -> Result<&mut NodeKind> {
        self.node(id)?;
        self.mark_dirty(id, true);
        Ok(&mut self.node_mut(id)?.kind)
    }

    /// Replace the content of a node only when it differs, so unchanged
    /// nodes keep their cached measurement.
    pub fn update_kind(&mut self, id: NodeId, kind: NodeKind) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.kind != kind {
            node.kind = kind;
            self.mark_dirty(id, true);
        }
        Ok(())
    }

    pub fn handlers_mut(&mut self, id: NodeId) -> Result<&mut super::Handlers> {
        Ok(&mut self.node_mut(id)?.handlers)
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.parent(id) {
                Some(p) => id = p,
                None => return false,
            }
        }
    }

    fn check_attach(&self, parent: NodeId, child: NodeId) -> Result<()> {
        if !self.node(parent)?.kind.is_container() {
            return Err(GridError::LeafChild(parent));
        }
        self.node(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(GridError::Cycle { child, parent });
        }
        Ok(())
    }

    /// Append `child` to `parent`, detaching it from any previous parent.
    ///
    /// Fails with [`GridError::LeafChild`] when `parent` is not a container.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_attach(parent, child)?;
        self.detach(child);
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        self.mark_dirty(parent, true);
        Ok(())
    }

    /// Replace `parent`'s child list. Children no longer listed are
    /// detached but stay alive; their owner decides when to destroy them.
    pub fn set_children(&mut self, parent: NodeId, children: &[NodeId]) -> Result<()> {
        for &child in children {
            self.check_attach(parent, child)?;
        }
        let old = std::mem::take(&mut self.node_mut(parent)?.children);
        for id in old {
            if let Some(node) = self.get_mut(id) {
                node.parent = None;
            }
        }
        for &child in children {
            if self.parent(child).is_some() {
                self.detach(child);
            }
            if let Some(node) = self.get_mut(child) {
                node.parent = Some(parent);
            }
        }
        let mut seen = HashSet::with_capacity(children.len());
        let list = self.node_mut(parent)?;
        list.children.clear();
        list.children
            .extend(children.iter().copied().filter(|&id| seen.insert(id)));
        self.mark_dirty(parent, true);
        Ok(())
    }

    /// Remove `id` from its parent's child list.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(p) = self.get_mut(parent) {
            p.children.retain(|&c| c != id);
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = None;
        }
        self.mark_dirty(parent, false);
    }

    /// Detach and free `id` and its whole subtree. Returns false for a stale id.
    pub fn destroy(&mut self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.detach(id);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(slot) = self
                .slots
                .get_mut(current.index)
                .filter(|s| s.generation == current.generation)
            else {
                continue;
            };
            if let Some(node) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
                self.len -= 1;
                stack.extend(node.children);
            }
        }
        true
    }

    /// Compute intrinsic sizes under `id`. Clean subtrees are skipped.
    pub fn measure(&mut self, id: NodeId, ctx: &mut PaintContext<'_>) {
        match self.get(id) {
            Some(node) if node.measure_dirty => {}
            _ => return,
        }
        let children = self.children(id).to_vec();
        for child in children {
            self.measure(child, ctx);
        }
        if let Some(node) = self.get_mut(id) {
            node.measured = node.kind.measure(ctx);
            node.measure_dirty = false;
        }
    }

    /// Measure the subtree, resolve it with the flex engine inside `id`'s
    /// current rect and write every descendant's rect in root coordinates.
    pub fn perform_layout(&mut self, id: NodeId, ctx: &mut PaintContext<'_>) -> Result<()> {
        let origin = self.node(id)?.rect;
        if !self.node(id)?.kind.is_container() {
            return Ok(());
        }
        self.measure(id, ctx);

        let mut ids = Vec::new();
        let mut flex = self.build_flex(id, &mut ids)?;
        compute_layout(&mut flex, origin.size());
        for child in flex.children() {
            self.apply_layout(child, &ids, origin.x, origin.y);
        }
        if let Some(node) = self.get_mut(id) {
            node.layout_dirty = false;
        }
        Ok(())
    }

    fn build_flex(&self, id: NodeId, ids: &mut Vec<NodeId>) -> Result<FlexNode> {
        let node = self.node(id)?;
        let tag = ids.len();
        ids.push(id);
        Ok(match &node.kind {
            NodeKind::Container(c) => {
                let mut children = Vec::with_capacity(node.children.len());
                for &child in &node.children {
                    children.push(self.build_flex(child, ids)?);
                }
                FlexNode::boxed(tag, node.style, c.layout, children)
            }
            _ => FlexNode::leaf(tag, node.style, node.measured),
        })
    }

    fn apply_layout(&mut self, flex: &FlexNode, ids: &[NodeId], ox: f32, oy: f32) {
        let rect = flex.layout.translate(ox, oy);
        if let Some(node) = ids.get(flex.tag).and_then(|&id| self.get_mut(id)) {
            node.rect = rect;
            node.layout_dirty = false;
        }
        if let FlexKind::Box { children, .. } = &flex.kind {
            for child in children {
                self.apply_layout(child, ids, rect.x, rect.y);
            }
        }
    }

    /// Paint `id` and its subtree. Later children draw over earlier ones.
    pub fn paint(&self, id: NodeId, ctx: &mut PaintContext<'_>) {
        let Some(node) = self.get(id) else {
            return;
        };
        if node.style.hidden {
            return;
        }
        node.kind.paint(node.rect, node.hovered, ctx);
        if let NodeKind::Container(c) = &node.kind {
            if c.clip {
                ctx.surface.save();
                ctx.surface.clip_rect(node.rect);
            }
            for &child in &node.children {
                self.paint(child, ctx);
            }
            if c.clip {
                ctx.surface.restore();
            }
            if let Some(border) = &c.border {
                ctx.surface.stroke_rect(node.rect, border, 1.0);
            }
        }
        if ctx.debug_bounds {
            ctx.surface.stroke_rect(node.rect, palette::DEBUG_BOUNDS, 1.0);
        }
    }

    /// Nodes under `(x, y)`: the deepest first, then its ancestors, `id`
    /// last. Later siblings win, matching paint order.
    pub fn hit_test(&self, id: NodeId, x: f32, y: f32) -> Vec<NodeId> {
        let mut path = Vec::new();
        self.hit_test_into(id, x, y, &mut path);
        path
    }

    fn hit_test_into(&self, id: NodeId, x: f32, y: f32, path: &mut Vec<NodeId>) -> bool {
        let Some(node) = self.get(id) else {
            return false;
        };
        if node.style.hidden || !node.rect.contains(x, y) {
            return false;
        }
        for &child in node.children.iter().rev() {
            if self.hit_test_into(child, x, y, path) {
                break;
            }
        }
        path.push(id);
        true
    }

    /// Invoke the matching hook on each node of `path` in order until one
    /// stops propagation. Returns whether propagation was stopped.
    pub fn dispatch(&self, path: &[NodeId], event: PointerEvent) -> bool {
        let Some(&target) = path.first() else {
            return false;
        };
        let mut ctx = EventContext::new(event, target);
        for &id in path {
            let Some(node) = self.get(id) else {
                continue;
            };
            let Some(handler) = node.handlers.get(event.kind) else {
                continue;
            };
            ctx.current = id;
            ctx.current_rect = node.rect;
            handler(&mut ctx);
            if ctx.is_propagation_stopped() {
                return true;
            }
        }
        false
    }

    /// Set the hover flag, returning whether it changed.
    pub(crate) fn set_hovered(&mut self, id: NodeId, hovered: bool) -> bool {
        match self.get_mut(id) {
            Some(node) if node.hovered != hovered => {
                node.hovered = hovered;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;
    use crate::scene::{ContainerNode, IconNode};

    fn container() -> NodeKind {
        NodeKind::Container(ContainerNode::default())
    }

    fn icon() -> NodeKind {
        NodeKind::Icon(IconNode {
            icon: "grip".into(),
            size: 10.0,
            color: "#000".into(),
        })
    }

    #[test]
    fn test_add_child_to_leaf_fails() {
        let mut tree = SceneTree::new();
        let leaf = tree.create(icon());
        let other = tree.create(icon());
        assert!(matches!(
            tree.add_child(leaf, other),
            Err(GridError::LeafChild(id)) if id == leaf
        ));
    }

    #[test]
    fn test_reparent_detaches_first() {
        let mut tree = SceneTree::new();
        let a = tree.create(container());
        let b = tree.create(container());
        let leaf = tree.create(icon());
        tree.add_child(a, leaf).unwrap();
        tree.add_child(b, leaf).unwrap();
        assert!(tree.children(a).is_empty());
        assert_eq!(tree.children(b), &[leaf]);
        assert_eq!(tree.parent(leaf), Some(b));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut tree = SceneTree::new();
        let a = tree.create(container());
        let b = tree.create(container());
        tree.add_child(a, b).unwrap();
        assert!(matches!(tree.add_child(b, a), Err(GridError::Cycle { .. })));
        assert!(matches!(tree.add_child(a, a), Err(GridError::Cycle { .. })));
    }

    #[test]
    fn test_destroy_frees_subtree_and_stales_ids() {
        let mut tree = SceneTree::new();
        let root = tree.create(container());
        let mid = tree.create(container());
        let leaf = tree.create(icon());
        tree.add_child(root, mid).unwrap();
        tree.add_child(mid, leaf).unwrap();
        assert!(tree.destroy(mid));
        assert_eq!(tree.len(), 1);
        assert!(!tree.contains(leaf));
        assert!(tree.children(root).is_empty());

        // Slot reuse gets a new generation.
        let fresh = tree.create(icon());
        assert!(!tree.contains(mid) || fresh != mid);
        assert!(matches!(tree.set_hidden(leaf, true), Err(GridError::StaleNode(_))));
    }

    #[test]
    fn test_set_children_detaches_dropped() {
        let mut tree = SceneTree::new();
        let root = tree.create(container());
        let a = tree.create(icon());
        let b = tree.create(icon());
        tree.set_children(root, &[a, b]).unwrap();
        tree.set_children(root, &[b]).unwrap();
        assert_eq!(tree.children(root), &[b]);
        assert_eq!(tree.parent(a), None);
        assert!(tree.contains(a));
    }
}
