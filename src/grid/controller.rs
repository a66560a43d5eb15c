//! The data-grid controller.
//!
//! [`DataGrid`] owns the column configuration, the rows and every piece of
//! live UI state (scroll, widths, sort, selection, expansion, drag). Each
//! frame it re-derives the header through memoised steps, syncs the header
//! pool into the scene, paints the visible body cells and then the scene.

use std::collections::HashMap;
use std::ops::Range;
use std::rc::Rc;

use serde_json::Value;

use super::cell::{CellDrawContext, CellDrawOutput, CellRenderer, TextCellRenderer};
use super::memo::{Memo, Shared};
use super::selection::{ColumnSelection, RowSelection};
use super::sort::SortState;
use super::tree::{flatten_in_order, FlatRow, TreeExpansion};
use crate::columns::{resolve_columns, ColumnOrder, OrderChange};
use crate::error::Result;
use crate::header::compose_header;
use crate::layout::{BoxStyle, ColumnLayout, Dimension, FlexDirection, ItemStyle, Viewport};
use crate::pool::{ActionQueue, HeaderAction, HeaderFrame, HeaderPool};
use crate::render::icons::{names, ICON_BOX};
use crate::render::{CacheManager, Surface};
use crate::scene::{
    paint_icon, ContainerNode, EventKind, NodeId, NodeKind, PaintContext, PointerEvent, SceneRoot,
};
use crate::signal::Subscription;
use crate::types::{
    ColumnDef, GridConfig, HeaderCell, HeaderLayout, LeafColumn, Rect, Size,
};

/// Indent per tree depth in the first column.
const TREE_INDENT: f32 = 16.0;

/// A header drag in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Drag {
    /// Moving leaf `column`; `target` is the insertion index.
    Reorder { column: usize, target: usize },
    Resize {
        column: usize,
        start_x: f32,
        start_width: f32,
    },
}

/// Header derivations for the current inputs.
struct Derived {
    leaves: Rc<Vec<LeafColumn>>,
    levels: Rc<Vec<Vec<HeaderCell>>>,
    header: Rc<HeaderLayout>,
    columns: Rc<ColumnLayout>,
    row_order: Rc<Vec<usize>>,
}

type ColumnsInput = (Shared<Vec<LeafColumn>>, Vec<(String, u32)>, u32);
type RowOrderInput = (u64, SortState, Shared<Vec<LeafColumn>>);

pub struct DataGrid {
    config: GridConfig,
    defs: Vec<ColumnDef>,
    /// Bumped whenever `defs` is replaced.
    columns_revision: u64,
    order: ColumnOrder,
    rows: Vec<Value>,
    rows_revision: u64,
    children_key: Option<String>,
    expansion: TreeExpansion,
    sort: SortState,
    row_selection: RowSelection,
    column_selection: ColumnSelection,
    width_overrides: HashMap<String, f32>,
    viewport: Viewport,
    scene: SceneRoot,
    header: NodeId,
    pool: HeaderPool,
    actions: ActionQueue,
    drag: Option<Drag>,
    /// Last pointer position, for body hover.
    pointer: Option<(f32, f32)>,
    renderers: HashMap<String, Box<dyn CellRenderer>>,
    /// Pointer-sensitive body regions from the last frame.
    hit_regions: CellDrawOutput,
    leaves_memo: Memo<(u64, Vec<String>), Rc<Vec<LeafColumn>>>,
    header_memo: Memo<Shared<Vec<LeafColumn>>, Rc<HeaderLayout>>,
    levels_memo: Memo<Shared<HeaderLayout>, Rc<Vec<Vec<HeaderCell>>>>,
    columns_memo: Memo<ColumnsInput, Rc<ColumnLayout>>,
    row_order_memo: Memo<RowOrderInput, Rc<Vec<usize>>>,
}

fn header_container(config: &GridConfig) -> NodeKind {
    NodeKind::Container(ContainerNode {
        background: Some(config.theme.background_color.clone()),
        clip: true,
        ..ContainerNode::default()
    })
}

impl DataGrid {
    pub fn new(config: GridConfig) -> Result<Self> {
        let mut scene = SceneRoot::new(CacheManager::new(&config.cache_limits));
        scene.debug_bounds = config.debug_bounds;
        let root = scene.root();
        scene.tree.update_kind(
            root,
            NodeKind::Container(ContainerNode {
                layout: BoxStyle {
                    direction: FlexDirection::Column,
                    ..BoxStyle::default()
                },
                ..ContainerNode::default()
            }),
        )?;
        let header = scene.tree.create(header_container(&config));
        scene.tree.add_child(root, header)?;

        let actions = ActionQueue::default();
        let pool = HeaderPool::new(header, actions.clone()).with_slack(config.pool_slack);

        Ok(Self {
            config,
            defs: Vec::new(),
            columns_revision: 0,
            order: ColumnOrder::default(),
            rows: Vec::new(),
            rows_revision: 0,
            children_key: None,
            expansion: TreeExpansion::new(),
            sort: SortState::new(),
            row_selection: RowSelection::new(),
            column_selection: ColumnSelection::new(),
            width_overrides: HashMap::new(),
            viewport: Viewport::new(),
            scene,
            header,
            pool,
            actions,
            drag: None,
            pointer: None,
            renderers: HashMap::new(),
            hit_regions: CellDrawOutput::default(),
            leaves_memo: Memo::new(),
            header_memo: Memo::new(),
            levels_memo: Memo::new(),
            columns_memo: Memo::new(),
            row_order_memo: Memo::new(),
        })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: GridConfig) -> Result<()> {
        self.scene.caches.set_limits(&config.cache_limits);
        self.scene.debug_bounds = config.debug_bounds;
        self.pool.set_slack(config.pool_slack);
        self.scene
            .tree
            .update_kind(self.header, header_container(&config))?;
        self.config = config;
        Ok(())
    }

    /// Replace the column-definition tree.
    pub fn set_columns(&mut self, defs: Vec<ColumnDef>) {
        self.defs = defs;
        self.columns_revision += 1;
        self.column_selection.clear();
    }

    /// Replace the column order without notifying when it is unchanged.
    pub fn set_column_order(&mut self, ids: Vec<String>) {
        self.order.set(ids);
    }

    pub fn column_order(&self) -> &ColumnOrder {
        &self.order
    }

    /// Listen for column order changes, including those made by dragging.
    pub fn on_order_change(&self, f: impl Fn(&OrderChange) + 'static) -> Subscription {
        self.order.subscribe(f)
    }

    pub fn set_rows(&mut self, rows: Vec<Value>) {
        self.rows = rows;
        self.rows_revision += 1;
        self.row_selection.clear();
    }

    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    /// Treat `key` as the array of child rows, or disable tree rows.
    pub fn set_children_key(&mut self, key: Option<String>) {
        self.children_key = key;
        self.expansion.clear();
        self.row_selection.clear();
    }

    /// Draw the cells of `column_id` with `renderer` instead of as text.
    pub fn set_cell_renderer(&mut self, column_id: &str, renderer: Box<dyn CellRenderer>) {
        self.renderers.insert(column_id.to_string(), renderer);
    }

    /// Override a column's width. Non-finite or negative widths are ignored.
    pub fn set_column_width(&mut self, column_id: &str, width: f32) {
        if width.is_finite() && width >= 0.0 {
            self.width_overrides.insert(column_id.to_string(), width);
        }
    }

    pub fn column_widths(&self) -> &HashMap<String, f32> {
        &self.width_overrides
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn row_selection(&self) -> &RowSelection {
        &self.row_selection
    }

    pub fn column_selection(&self) -> &ColumnSelection {
        &self.column_selection
    }

    pub fn expansion(&self) -> &TreeExpansion {
        &self.expansion
    }

    pub fn expansion_mut(&mut self) -> &mut TreeExpansion {
        &mut self.expansion
    }

    pub fn drag(&self) -> Option<Drag> {
        self.drag
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn scene(&self) -> &SceneRoot {
        &self.scene
    }

    pub fn pool(&self) -> &HeaderPool {
        &self.pool
    }

    pub fn leaves(&mut self) -> Rc<Vec<LeafColumn>> {
        self.derive().leaves
    }

    pub fn header_layout(&mut self) -> Rc<HeaderLayout> {
        self.derive().header
    }

    pub fn column_layout(&mut self) -> Rc<ColumnLayout> {
        self.derive().columns
    }

    pub fn header_height(&mut self) -> f32 {
        let levels = self.derive().header.level_count;
        self.config.header_height(levels)
    }

    /// Ids of the displayed leaf columns, in display order.
    pub fn column_ids(&mut self) -> Vec<String> {
        self.derive().leaves.iter().map(|l| l.id.clone()).collect()
    }

    /// Number of displayed rows after tree flattening.
    pub fn row_count(&mut self) -> usize {
        let order = self.derive().row_order;
        flatten_in_order(
            &self.rows,
            &order,
            self.children_key.as_deref(),
            &self.expansion,
        )
        .len()
    }

    pub fn content_size(&mut self) -> Size {
        let d = self.derive();
        let rows = self.row_count();
        #[allow(clippy::cast_precision_loss)]
        let body = rows as f32 * self.config.row_height;
        Size::new(
            d.columns.total_width(),
            self.config.header_height(d.header.level_count) + body,
        )
    }

    pub fn scroll_to(&mut self, x: f32, y: f32) {
        let content = self.content_size();
        self.viewport.set_scroll(x, y, content);
    }

    pub fn scroll_by(&mut self, dx: f32, dy: f32) {
        let content = self.content_size();
        self.viewport.scroll_by(dx, dy, content);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport.resize(width, height);
        let content = self.content_size();
        self.viewport.clamp_scroll(content);
    }

    fn derive(&mut self) -> Derived {
        let key = (self.columns_revision, self.order.ids().to_vec());
        let (defs, order) = (&self.defs, &self.order);
        let leaves = Rc::clone(
            self.leaves_memo
                .get_or_compute(key, |_| Rc::new(order.apply(&resolve_columns(defs)))),
        );

        let header = Rc::clone(
            self.header_memo
                .get_or_compute(Shared(Rc::clone(&leaves)), |l| Rc::new(compose_header(&l.0))),
        );
        let levels = Rc::clone(
            self.levels_memo
                .get_or_compute(Shared(Rc::clone(&header)), |h| Rc::new(h.0.by_level())),
        );

        let mut overrides: Vec<(String, u32)> = self
            .width_overrides
            .iter()
            .map(|(id, w)| (id.clone(), w.to_bits()))
            .collect();
        overrides.sort();
        let width = self.viewport.width;
        let min_width = self.config.min_column_width;
        let widths = &self.width_overrides;
        let columns = Rc::clone(self.columns_memo.get_or_compute(
            (Shared(Rc::clone(&leaves)), overrides, width.to_bits()),
            |input| {
                let mut layout = ColumnLayout::new(&input.0 .0, widths, width);
                for i in 0..layout.len() {
                    if layout.width(i) < min_width {
                        layout.set_width(i, min_width);
                    }
                }
                Rc::new(layout)
            },
        ));

        let rows = &self.rows;
        let row_order = Rc::clone(self.row_order_memo.get_or_compute(
            (
                self.rows_revision,
                self.sort.clone(),
                Shared(Rc::clone(&leaves)),
            ),
            |(_, sort, leaves)| Rc::new(sort.sorted_indices(&leaves.0, rows)),
        ));

        Derived {
            leaves,
            levels,
            header,
            columns,
            row_order,
        }
    }

    /// Re-derive the header and sync the pool into the scene.
    fn sync_header(&mut self, d: &Derived) -> Result<f32> {
        let header_height = self.config.header_height(d.header.level_count);
        self.scene.tree.set_style(
            self.header,
            ItemStyle {
                height: Dimension::Points(header_height),
                flex_shrink: 0.0,
                ..ItemStyle::default()
            },
        )?;

        let scroll_x = self.viewport.scroll_x;
        let (dragging, drop_x) = match self.drag {
            Some(Drag::Reorder { column, target }) => {
                (Some(column), Some(d.columns.x(target) - scroll_x))
            }
            _ => (None, None),
        };
        let frame = HeaderFrame {
            levels: &d.levels,
            columns: &d.columns,
            leaves: &d.leaves,
            config: &self.config,
            scroll_x,
            viewport_width: self.viewport.width,
            sort: self.sort.active_index(&d.leaves),
            selected: self.column_selection.selected(),
            dragging,
            drop_x,
        };
        self.pool
            .update(&mut self.scene.tree, &mut self.scene.caches.colors, &frame)?;
        Ok(header_height)
    }

    /// One frame: derive, sync the header pool, paint the body and the scene.
    pub fn render(&mut self, surface: &mut dyn Surface) -> Result<()> {
        let size = surface.size();
        self.viewport.dpr = surface.dpr();
        if self.viewport.size() != size {
            self.resize(size.width, size.height);
        }
        let d = self.derive();
        let header_height = self.sync_header(&d)?;
        self.paint_body(surface, &d, header_height);
        self.scene.frame(surface)
    }

    fn paint_body(&mut self, surface: &mut dyn Surface, d: &Derived, header_height: f32) {
        self.hit_regions.regions.clear();
        let flat = flatten_in_order(
            &self.rows,
            &d.row_order,
            self.children_key.as_deref(),
            &self.expansion,
        );
        let body = Rect::new(
            0.0,
            header_height,
            self.viewport.width,
            (self.viewport.height - header_height).max(0.0),
        );
        let row_h = self.config.row_height;
        let (scroll_x, scroll_y) = (self.viewport.scroll_x, self.viewport.scroll_y);
        let rows = row_range(scroll_y, body.h, row_h, flat.len());
        let cols = d.columns.visible_range(scroll_x, body.w);
        let tree_rows = self.children_key.is_some();
        let theme = &self.config.theme;
        let mut fallback = TextCellRenderer;

        surface.save();
        surface.clip_rect(body);
        let mut paint = PaintContext::new(surface, &mut self.scene.caches, &self.scene.icons);
        for (pos, flat_row) in flat.iter().enumerate().skip(rows.start).take(rows.len()) {
            #[allow(clippy::cast_precision_loss)]
            let y = body.y + pos as f32 * row_h - scroll_y;
            let selected = self.row_selection.is_selected(pos);
            if selected {
                paint
                    .surface
                    .fill_rect(Rect::new(0.0, y, body.w, row_h), &theme.selected_bg_color);
            }
            for c in cols.clone() {
                let Some(leaf) = d.leaves.get(c) else {
                    continue;
                };
                let mut rect = Rect::new(d.columns.x(c) - scroll_x, y, d.columns.width(c), row_h);
                if c == 0 && tree_rows {
                    let indent = tree_indent(flat_row);
                    if flat_row.has_children {
                        let icon = if flat_row.expanded {
                            names::CHEVRON_DOWN
                        } else {
                            names::CHEVRON_RIGHT
                        };
                        let size = ICON_BOX.min(row_h);
                        let chevron = Rect::new(
                            rect.x + indent + (TREE_INDENT - size) / 2.0,
                            y + (row_h - size) / 2.0,
                            size,
                            size,
                        );
                        paint_icon(&mut paint, icon, &theme.icon_color, chevron);
                    }
                    let offset = (indent + TREE_INDENT).min(rect.w);
                    rect.x += offset;
                    rect.w -= offset;
                }
                let hover = self.pointer.filter(|&(px, py)| rect.contains(px, py));
                let renderer: &mut dyn CellRenderer = match self.renderers.get_mut(&leaf.id) {
                    Some(r) => r.as_mut(),
                    None => &mut fallback,
                };
                let mut ctx = CellDrawContext {
                    paint: &mut paint,
                    rect,
                    hover,
                    row: flat_row.row,
                    column: leaf,
                    selected,
                    config: &self.config,
                };
                let output = renderer.draw(&mut ctx);
                self.hit_regions.regions.extend(output.regions);
            }
            paint
                .surface
                .line((0.0, y + row_h), (body.w, y + row_h), &theme.border_color, 1.0);
        }
        paint.surface.restore();
    }

    /// Route a pointer event in logical coordinates.
    pub fn pointer(&mut self, event: PointerEvent) -> Result<()> {
        if event.kind == EventKind::MouseMove {
            self.pointer = Some((event.x, event.y));
        }
        if self.drag.is_some() {
            match event.kind {
                EventKind::MouseMove => {
                    self.update_drag(event.x);
                    return Ok(());
                }
                EventKind::MouseUp => {
                    self.finish_drag();
                    return Ok(());
                }
                _ => {}
            }
        }

        self.scene.pointer(event);
        self.apply_actions();

        if event.y >= self.header_height() {
            self.body_pointer(event);
        }
        Ok(())
    }

    /// Pointer in device pixels, as delivered by the browser.
    pub fn pointer_device(&mut self, event: PointerEvent) -> Result<()> {
        let (x, y) = self.viewport.to_logical(event.x, event.y);
        self.pointer(PointerEvent { x, y, ..event })
    }

    pub fn pointer_leave(&mut self) {
        self.pointer = None;
        self.scene.pointer_leave();
    }

    /// Apply header actions queued by scene handlers during dispatch.
    fn apply_actions(&mut self) {
        let actions = self.actions.drain();
        if actions.is_empty() {
            return;
        }
        let d = self.derive();
        for action in actions {
            match action {
                HeaderAction::ToggleSort { column } => {
                    if let Some(leaf) = d.leaves.get(column) {
                        if self.sort.toggle(leaf) {
                            // Selection holds display positions, which a new order invalidates.
                            self.row_selection.clear();
                            tracing::debug!(column = %leaf.id, direction = ?self.sort.direction(), "sort changed");
                        }
                    }
                }
                HeaderAction::SelectColumns {
                    start,
                    span,
                    modifiers,
                } => self.column_selection.click_span(start, span, modifiers),
                HeaderAction::BeginReorder { column, .. } => {
                    self.drag = Some(Drag::Reorder {
                        column,
                        target: column,
                    });
                }
                HeaderAction::BeginResize { column, x } => {
                    self.drag = Some(Drag::Resize {
                        column,
                        start_x: x,
                        start_width: d.columns.width(column),
                    });
                }
            }
        }
    }

    fn update_drag(&mut self, x: f32) {
        let d = self.derive();
        match self.drag {
            Some(Drag::Reorder { column, .. }) => {
                let content_x = x + self.viewport.scroll_x;
                let target = match d.columns.col_at_x(content_x) {
                    Some(c) if content_x > d.columns.x(c) + d.columns.width(c) / 2.0 => c + 1,
                    Some(c) => c,
                    None if content_x < 0.0 => 0,
                    None => d.columns.len(),
                };
                self.drag = Some(Drag::Reorder { column, target });
            }
            Some(Drag::Resize {
                column,
                start_x,
                start_width,
            }) => {
                if let Some(leaf) = d.leaves.get(column) {
                    let width = (start_width + x - start_x)
                        .max(leaf.min_width)
                        .max(self.config.min_column_width);
                    self.width_overrides.insert(leaf.id.clone(), width);
                }
            }
            None => {}
        }
    }

    fn finish_drag(&mut self) {
        match self.drag.take() {
            Some(Drag::Reorder { column, target }) => {
                if target == column || target == column + 1 {
                    return;
                }
                let to = if target > column { target - 1 } else { target };
                let ids = self.column_ids();
                if self.order.move_column(&ids, column, to) {
                    tracing::debug!(from = column, to, "column reordered");
                    self.column_selection.clear();
                }
            }
            Some(Drag::Resize { column, .. }) => {
                tracing::debug!(column, "column resized");
            }
            None => {}
        }
    }

    fn body_pointer(&mut self, event: PointerEvent) {
        if event.kind != EventKind::Click {
            return;
        }
        if self.hit_regions.click(event.x, event.y) {
            return;
        }

        let d = self.derive();
        let header_height = self.config.header_height(d.header.level_count);
        let Some(pos) = row_at(
            event.y - header_height + self.viewport.scroll_y,
            self.config.row_height,
        ) else {
            return;
        };
        let flat = flatten_in_order(
            &self.rows,
            &d.row_order,
            self.children_key.as_deref(),
            &self.expansion,
        );
        let Some(row) = flat.get(pos) else {
            return;
        };

        let content_x = event.x + self.viewport.scroll_x;
        let toggle_start = d.columns.x(0) + tree_indent(row);
        let on_chevron = self.children_key.is_some()
            && row.has_children
            && !d.columns.is_empty()
            && content_x >= toggle_start
            && content_x < toggle_start + TREE_INDENT;
        if on_chevron {
            let key = row.key.clone();
            let expanded = self.expansion.toggle(&key);
            tracing::debug!(row = %key, expanded, "row toggled");
            self.row_selection.clear();
        } else {
            self.row_selection.click(pos, event.modifiers);
        }
    }
}

fn tree_indent(row: &FlatRow<'_>) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let depth = row.depth as f32;
    depth * TREE_INDENT
}

/// Displayed row positions intersecting a body of height `height`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn row_range(scroll_y: f32, height: f32, row_h: f32, len: usize) -> Range<usize> {
    if row_h <= 0.0 || len == 0 {
        return 0..0;
    }
    let first = (scroll_y / row_h).floor().max(0.0) as usize;
    let count = (height / row_h).ceil().max(0.0) as usize + 1;
    first.min(len)..first.saturating_add(count).min(len)
}

/// Row position at body content offset `y`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn row_at(y: f32, row_h: f32) -> Option<usize> {
    if row_h <= 0.0 || y < 0.0 || !y.is_finite() {
        return None;
    }
    Some((y / row_h).floor() as usize)
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

    #[test]
    fn test_row_range() {
        assert_eq!(row_range(0.0, 100.0, 25.0, 100), 0..5);
        assert_eq!(row_range(60.0, 100.0, 25.0, 100), 2..7);
        assert_eq!(row_range(0.0, 100.0, 25.0, 3), 0..3);
        assert_eq!(row_range(0.0, 100.0, 0.0, 3), 0..0);
    }

    #[test]
    fn test_row_at() {
        assert_eq!(row_at(0.0, 25.0), Some(0));
        assert_eq!(row_at(49.9, 25.0), Some(1));
        assert_eq!(row_at(-1.0, 25.0), None);
    }
}
