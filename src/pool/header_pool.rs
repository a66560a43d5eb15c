//! Pooled scene subtrees for the visible header cells.

use std::cell::Cell;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;

use super::actions::{ActionQueue, HeaderAction};
use super::hover::HoverTable;
use crate::error::Result;
use crate::layout::{AlignItems, BoxStyle, ColumnLayout, Dimension, FlexDirection, ItemStyle, Position};
use crate::render::icons::names;
use crate::render::{palette, ColorCache};
use crate::scene::{
    ContainerNode, EventKind, IconButtonNode, IconNode, NodeId, NodeKind, SceneTree, TextAlign,
    TextNode,
};
use crate::types::{
    CellKey, Edges, GridConfig, HeaderCell, HeaderContent, LeafColumn, SortDirection,
};

/// Entries kept beyond the active set before eviction starts.
pub const DEFAULT_POOL_SLACK: usize = 20;

const CELL_PADDING: f32 = 6.0;
const CELL_GAP: f32 = 4.0;
const ICON_SIZE: f32 = 12.0;
const RESIZE_HANDLE_WIDTH: f32 = 6.0;
const DROP_MARKER_WIDTH: f32 = 2.0;

/// What a cell's handlers act on. Updated every pass since the same key
/// can cover a different column after a reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct CellTarget {
    column: Option<usize>,
    start: usize,
    span: usize,
}

/// Retained nodes of one header cell. The container owns the rest.
#[derive(Debug)]
pub struct PoolEntry {
    pub container: NodeId,
    pub grip: NodeId,
    pub label: NodeId,
    pub content_icon: NodeId,
    pub badge: NodeId,
    pub sort_button: NodeId,
    pub resize_handle: NodeId,
    target: Rc<Cell<CellTarget>>,
}

impl PoolEntry {
    pub fn column_index(&self) -> Option<usize> {
        self.target.get().column
    }
}

/// Everything one header pass reads.
pub struct HeaderFrame<'a> {
    /// Header cells per level, each sorted by start index.
    pub levels: &'a [Vec<HeaderCell>],
    pub columns: &'a ColumnLayout,
    pub leaves: &'a [LeafColumn],
    pub config: &'a GridConfig,
    pub scroll_x: f32,
    pub viewport_width: f32,
    /// Sorted leaf column and direction.
    pub sort: Option<(usize, SortDirection)>,
    pub selected: &'a BTreeSet<usize>,
    /// Leaf column being dragged.
    pub dragging: Option<usize>,
    /// Insertion marker x in viewport coordinates.
    pub drop_x: Option<f32>,
}

pub struct HeaderPool {
    /// Container the active cell subtrees are attached to.
    parent: NodeId,
    entries: HashMap<CellKey, PoolEntry>,
    /// Insertion order; eviction walks it front to back.
    order: VecDeque<CellKey>,
    active: Vec<CellKey>,
    hover: HoverTable,
    actions: ActionQueue,
    slack: usize,
    drop_marker: Option<NodeId>,
}

impl HeaderPool {
    pub fn new(parent: NodeId, actions: ActionQueue) -> Self {
        Self {
            parent,
            entries: HashMap::new(),
            order: VecDeque::new(),
            active: Vec::new(),
            hover: HoverTable::default(),
            actions,
            slack: DEFAULT_POOL_SLACK,
            drop_marker: None,
        }
    }

    #[must_use]
    pub fn with_slack(mut self, slack: usize) -> Self {
        self.slack = slack;
        self
    }

    pub fn set_slack(&mut self, slack: usize) {
        self.slack = slack;
    }

    pub fn parent(&self) -> NodeId {
        self.parent
    }

    /// Number of pooled cell subtrees.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, key: CellKey) -> Option<&PoolEntry> {
        self.entries.get(&key)
    }

    /// Keys rendered by the last pass, in paint order.
    pub fn active(&self) -> &[CellKey] {
        &self.active
    }

    pub fn hover(&self) -> &HoverTable {
        &self.hover
    }

    /// Cells intersecting `[scroll_x, scroll_x + width)`, found per level by
    /// binary search over the cumulative column positions.
    pub fn visible_cells<'c>(
        levels: &'c [Vec<HeaderCell>],
        columns: &ColumnLayout,
        scroll_x: f32,
        width: f32,
    ) -> Vec<&'c HeaderCell> {
        let mut out = Vec::new();
        if width <= 0.0 {
            return out;
        }
        let right = scroll_x + width;
        for level in levels {
            let first = level.partition_point(|c| columns.x(c.end_index()) <= scroll_x);
            out.extend(
                level
                    .iter()
                    .skip(first)
                    .take_while(|c| columns.x(c.start_index) < right),
            );
        }
        out
    }

    /// Sync the pool with the visible header region and rebuild the parent's
    /// child list.
    pub fn update(
        &mut self,
        tree: &mut SceneTree,
        colors: &mut ColorCache,
        frame: &HeaderFrame<'_>,
    ) -> Result<()> {
        let mut cells =
            Self::visible_cells(frame.levels, frame.columns, frame.scroll_x, frame.viewport_width);
        if cells.is_empty() {
            cells = frame.levels.iter().flatten().collect();
        }

        let mut active = Vec::with_capacity(cells.len());
        let mut children = Vec::with_capacity(cells.len() + 1);
        for cell in cells {
            let key = cell.key();
            if !self.entries.contains_key(&key) {
                let entry = self.build_entry(tree, key)?;
                self.entries.insert(key, entry);
                self.order.push_back(key);
                tracing::trace!(%key, pooled = self.entries.len(), "header cell pooled");
            }
            let Some(entry) = self.entries.get(&key) else {
                continue;
            };
            sync_entry(tree, colors, entry, cell, frame, &self.hover)?;
            active.push(key);
            children.push(entry.container);
        }

        if let Some(marker) = self.sync_drop_marker(tree, frame)? {
            children.push(marker);
        }
        tree.set_children(self.parent, &children)?;

        let active_set: HashSet<CellKey> = active.iter().copied().collect();
        self.active = active;
        self.evict(tree, &active_set);
        self.hover.retain(|key| active_set.contains(key));
        Ok(())
    }

    /// Destroy non-active entries in insertion order until the pool is
    /// within `active + slack`.
    fn evict(&mut self, tree: &mut SceneTree, active: &HashSet<CellKey>) {
        let limit = active.len() + self.slack;
        let mut excess = self.entries.len().saturating_sub(limit);
        if excess == 0 {
            return;
        }
        let evicting = excess;
        let entries = &mut self.entries;
        self.order.retain(|key| {
            if excess == 0 || active.contains(key) {
                return true;
            }
            if let Some(entry) = entries.remove(key) {
                tree.destroy(entry.container);
            }
            excess -= 1;
            false
        });
        tracing::debug!(
            evicted = evicting,
            pooled = self.entries.len(),
            "header pool evicted entries"
        );
    }

    /// Destroy every pooled subtree.
    pub fn clear(&mut self, tree: &mut SceneTree) {
        for (_, entry) in self.entries.drain() {
            tree.destroy(entry.container);
        }
        if let Some(marker) = self.drop_marker.take() {
            tree.destroy(marker);
        }
        self.order.clear();
        self.active.clear();
        self.hover.retain(|_| false);
    }

    fn sync_drop_marker(
        &mut self,
        tree: &mut SceneTree,
        frame: &HeaderFrame<'_>,
    ) -> Result<Option<NodeId>> {
        let Some(x) = frame.drop_x else {
            return Ok(None);
        };
        let marker = match self.drop_marker.filter(|&m| tree.contains(m)) {
            Some(m) => m,
            None => {
                let m = tree.create(NodeKind::Container(ContainerNode {
                    background: Some(palette::DROP_MARKER.to_string()),
                    ..ContainerNode::default()
                }));
                self.drop_marker = Some(m);
                m
            }
        };
        let height = frame.config.header_height(frame.levels.len());
        tree.set_style(
            marker,
            ItemStyle {
                position: Position::Absolute {
                    x: x - DROP_MARKER_WIDTH / 2.0,
                    y: 0.0,
                },
                width: Dimension::Points(DROP_MARKER_WIDTH),
                height: Dimension::Points(height),
                ..ItemStyle::default()
            },
        )?;
        Ok(Some(marker))
    }

    fn build_entry(&self, tree: &mut SceneTree, key: CellKey) -> Result<PoolEntry> {
        let target = Rc::new(Cell::new(CellTarget::default()));
        let container = tree.create(NodeKind::Container(ContainerNode::default()));

        let icon = |name: &str| {
            NodeKind::Icon(IconNode {
                icon: name.to_string(),
                size: ICON_SIZE,
                color: String::new(),
            })
        };
        let text = || NodeKind::Text(TextNode::new("", "", 0.0, ""));

        let grip = tree.create(icon(names::GRIP));
        let label = tree.create_with_style(
            text(),
            ItemStyle {
                flex_grow: 1.0,
                flex_shrink: 1.0,
                flex_basis: Some(0.0),
                ..ItemStyle::default()
            },
        );
        let content_icon = tree.create(icon(""));
        let badge = tree.create(text());
        let sort_button = tree.create(NodeKind::IconButton(IconButtonNode {
            icon: names::SORT_NONE.to_string(),
            size: ICON_SIZE,
            color: String::new(),
            hover_background: None,
            padding: 2.0,
        }));
        let resize_handle = tree.create(NodeKind::Container(ContainerNode::default()));
        for child in [grip, label, content_icon, badge, sort_button, resize_handle] {
            tree.add_child(container, child)?;
        }

        let handlers = tree.handlers_mut(container)?;
        {
            let (actions, target) = (self.actions.clone(), Rc::clone(&target));
            handlers.set(EventKind::Click, move |ctx| {
                let t = target.get();
                actions.push(HeaderAction::SelectColumns {
                    start: t.start,
                    span: t.span,
                    modifiers: ctx.event.modifiers,
                });
            });
        }
        {
            let hover = self.hover.clone();
            handlers.set(EventKind::MouseEnter, move |_| hover.enter(key));
        }
        {
            let hover = self.hover.clone();
            handlers.set(EventKind::MouseLeave, move |_| hover.leave(key));
        }

        {
            let (actions, target) = (self.actions.clone(), Rc::clone(&target));
            tree.handlers_mut(sort_button)?
                .set(EventKind::Click, move |ctx| {
                    if let Some(column) = target.get().column {
                        actions.push(HeaderAction::ToggleSort { column });
                        ctx.stop_propagation();
                    }
                });
        }
        {
            let (actions, target) = (self.actions.clone(), Rc::clone(&target));
            let grip_handlers = tree.handlers_mut(grip)?;
            grip_handlers.set(EventKind::MouseDown, move |ctx| {
                if let Some(column) = target.get().column {
                    actions.push(HeaderAction::BeginReorder {
                        column,
                        x: ctx.event.x,
                    });
                    ctx.stop_propagation();
                }
            });
            grip_handlers.set(EventKind::Click, |ctx| ctx.stop_propagation());
        }
        {
            let (actions, target) = (self.actions.clone(), Rc::clone(&target));
            let resize_handlers = tree.handlers_mut(resize_handle)?;
            resize_handlers.set(EventKind::MouseDown, move |ctx| {
                if let Some(column) = target.get().column {
                    actions.push(HeaderAction::BeginResize {
                        column,
                        x: ctx.event.x,
                    });
                    ctx.stop_propagation();
                }
            });
            resize_handlers.set(EventKind::Click, |ctx| ctx.stop_propagation());
        }

        Ok(PoolEntry {
            container,
            grip,
            label,
            content_icon,
            badge,
            sort_button,
            resize_handle,
            target,
        })
    }
}

/// Mutate one entry's nodes in place to show `cell`.
fn sync_entry(
    tree: &mut SceneTree,
    colors: &mut ColorCache,
    entry: &PoolEntry,
    cell: &HeaderCell,
    frame: &HeaderFrame<'_>,
    hover: &HoverTable,
) -> Result<()> {
    let config = frame.config;
    let theme = &config.theme;
    entry.target.set(CellTarget {
        column: cell.column_index,
        start: cell.start_index,
        span: cell.col_span,
    });

    let (x, w) = frame.columns.span(cell.start_index, cell.col_span);
    #[allow(clippy::cast_precision_loss)]
    let (y, h) = (
        cell.level as f32 * config.header_row_height,
        cell.row_span as f32 * config.header_row_height,
    );
    tree.set_style(
        entry.container,
        ItemStyle {
            position: Position::Absolute {
                x: x - frame.scroll_x,
                y,
            },
            width: Dimension::Points(w),
            height: Dimension::Points(h),
            ..ItemStyle::default()
        },
    )?;

    let dragged = frame.dragging.is_some() && frame.dragging == cell.column_index;
    let selected = !frame.selected.is_empty()
        && (cell.start_index..cell.end_index()).all(|i| frame.selected.contains(&i));
    let base = if dragged {
        &theme.drag_bg_color
    } else if selected {
        &theme.selected_bg_color
    } else {
        &theme.background_color
    };
    let background = if hover.contains(cell.key()) {
        colors.lighten(base, theme.hover_lighten)
    } else {
        base.clone()
    };
    tree.update_kind(
        entry.container,
        NodeKind::Container(ContainerNode {
            layout: BoxStyle {
                direction: FlexDirection::Row,
                align_items: AlignItems::Center,
                main_gap: CELL_GAP,
                padding: Edges::symmetric(CELL_PADDING, 0.0),
                ..BoxStyle::default()
            },
            background: Some(background),
            border: Some(theme.border_color.clone()),
            clip: true,
        }),
    )?;

    let line_height = config.font_size * 1.4;
    tree.update_kind(
        entry.label,
        NodeKind::Text(TextNode {
            text: cell.title.clone(),
            font: config.font(if cell.is_leaf { 500 } else { 600 }),
            line_height,
            color: theme.text_color.clone(),
            align: if cell.is_leaf {
                TextAlign::Start
            } else {
                TextAlign::Center
            },
            padding: 0.0,
        }),
    )?;

    let leaf = cell.column_index.and_then(|i| frame.leaves.get(i));

    tree.update_kind(
        entry.grip,
        NodeKind::Icon(IconNode {
            icon: names::GRIP.to_string(),
            size: ICON_SIZE,
            color: theme.icon_color.clone(),
        }),
    )?;
    tree.set_hidden(entry.grip, !(leaf.is_some() && config.reorderable))?;

    let (icon, badge) = match &cell.content {
        Some(HeaderContent::Icon(name)) => (Some(name.as_str()), None),
        Some(HeaderContent::Badge(text)) => (None, Some(text.as_str())),
        None => (None, None),
    };
    tree.update_kind(
        entry.content_icon,
        NodeKind::Icon(IconNode {
            icon: icon.unwrap_or_default().to_string(),
            size: ICON_SIZE,
            color: theme.icon_color.clone(),
        }),
    )?;
    tree.set_hidden(entry.content_icon, icon.is_none())?;
    tree.update_kind(
        entry.badge,
        NodeKind::Text(TextNode::new(
            badge.unwrap_or_default(),
            &config.font(400),
            line_height,
            &theme.icon_color,
        )),
    )?;
    tree.set_hidden(entry.badge, badge.is_none())?;

    let sort_icon = match (frame.sort, cell.column_index) {
        (Some((sorted, SortDirection::Ascending)), Some(c)) if sorted == c => names::SORT_ASC,
        (Some((sorted, SortDirection::Descending)), Some(c)) if sorted == c => names::SORT_DESC,
        _ => names::SORT_NONE,
    };
    tree.update_kind(
        entry.sort_button,
        NodeKind::IconButton(IconButtonNode {
            icon: sort_icon.to_string(),
            size: ICON_SIZE,
            color: theme.icon_color.clone(),
            hover_background: Some(colors.lighten(&theme.icon_color, 0.8)),
            padding: 2.0,
        }),
    )?;
    tree.set_hidden(entry.sort_button, !leaf.is_some_and(|l| l.sortable))?;

    tree.set_style(
        entry.resize_handle,
        ItemStyle {
            position: Position::Absolute {
                x: (w - RESIZE_HANDLE_WIDTH).max(0.0),
                y: 0.0,
            },
            width: Dimension::Points(RESIZE_HANDLE_WIDTH),
            height: Dimension::Points(h),
            hidden: !(leaf.is_some() && config.resizable),
            ..ItemStyle::default()
        },
    )?;
    Ok(())
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
    use crate::columns::resolve_columns;
    use crate::header::compose_header;
    use crate::types::ColumnDef;

    struct Fixture {
        leaves: Vec<LeafColumn>,
        levels: Vec<Vec<HeaderCell>>,
        columns: ColumnLayout,
        config: GridConfig,
        selected: BTreeSet<usize>,
    }

    fn fixture(count: usize) -> Fixture {
        let defs: Vec<ColumnDef> = (0..count)
            .map(|i| ColumnDef::leaf(&format!("c{i}"), &format!("C{i}")).with_width(100.0))
            .collect();
        let leaves = resolve_columns(&defs);
        let levels = compose_header(&leaves).by_level();
        let columns = ColumnLayout::new(&leaves, &HashMap::new(), 0.0);
        Fixture {
            leaves,
            levels,
            columns,
            config: GridConfig::default(),
            selected: BTreeSet::new(),
        }
    }

    fn frame(f: &Fixture, scroll_x: f32, width: f32) -> HeaderFrame<'_> {
        HeaderFrame {
            levels: &f.levels,
            columns: &f.columns,
            leaves: &f.leaves,
            config: &f.config,
            scroll_x,
            viewport_width: width,
            sort: None,
            selected: &f.selected,
            dragging: None,
            drop_x: None,
        }
    }

    fn setup() -> (SceneTree, NodeId, ColorCache) {
        let mut tree = SceneTree::new();
        let parent = tree.create(NodeKind::Container(ContainerNode::default()));
        (tree, parent, ColorCache::new(16))
    }

    #[test]
    fn test_visible_cells_binary_search() {
        let f = fixture(100);
        let cells = HeaderPool::visible_cells(&f.levels, &f.columns, 250.0, 300.0);
        let starts: Vec<usize> = cells.iter().map(|c| c.start_index).collect();
        assert_eq!(starts, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_fallback_renders_everything() {
        let f = fixture(5);
        let (mut tree, parent, mut colors) = setup();
        let mut pool = HeaderPool::new(parent, ActionQueue::default());
        pool.update(&mut tree, &mut colors, &frame(&f, 0.0, 0.0)).unwrap();
        assert_eq!(pool.active().len(), 5);
        assert_eq!(tree.children(parent).len(), 5);
    }

    #[test]
    fn test_entries_reused_in_place() {
        let f = fixture(10);
        let (mut tree, parent, mut colors) = setup();
        let mut pool = HeaderPool::new(parent, ActionQueue::default());
        pool.update(&mut tree, &mut colors, &frame(&f, 0.0, 250.0)).unwrap();
        let first = pool.entry(CellKey::new(0, 1)).unwrap().container;
        let nodes = tree.len();
        pool.update(&mut tree, &mut colors, &frame(&f, 100.0, 250.0)).unwrap();
        assert_eq!(pool.entry(CellKey::new(0, 1)).unwrap().container, first);
        // Only column 3 became visible.
        assert_eq!(tree.len(), nodes + 7);
    }

    #[test]
    fn test_pool_bounded_by_active_plus_slack() {
        let f = fixture(200);
        let (mut tree, parent, mut colors) = setup();
        let mut pool = HeaderPool::new(parent, ActionQueue::default()).with_slack(3);
        for step in 0..150 {
            #[allow(clippy::cast_precision_loss)]
            let scroll = step as f32 * 100.0;
            pool.update(&mut tree, &mut colors, &frame(&f, scroll, 300.0)).unwrap();
            assert!(pool.len() <= pool.active().len() + 3);
        }
    }

    #[test]
    fn test_hover_pruned_when_cell_leaves() {
        let f = fixture(10);
        let (mut tree, parent, mut colors) = setup();
        let mut pool = HeaderPool::new(parent, ActionQueue::default());
        pool.update(&mut tree, &mut colors, &frame(&f, 0.0, 200.0)).unwrap();
        pool.hover().enter(CellKey::new(0, 0));
        pool.update(&mut tree, &mut colors, &frame(&f, 500.0, 200.0)).unwrap();
        assert!(pool.hover().is_empty());
    }
}
