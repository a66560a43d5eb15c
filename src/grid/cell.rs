//! Per-cell draw boundary for body cells.
//!
//! A [`CellRenderer`] paints one cell into its rectangle and reports the
//! sub-rectangles that react to the pointer. The grid keeps those regions
//! until the next frame and routes clicks into them.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::error::Result;
use crate::layout::BoxStyle;
use crate::scene::{
    paint_text, ContainerNode, EventContext, EventKind, NodeId, NodeKind, PaintContext,
    PointerEvent, SceneTree, TextAlign,
};
use crate::types::{ColumnKind, GridConfig, LeafColumn, Rect};

/// Horizontal text inset inside a body cell.
pub const CELL_PADDING: f32 = 8.0;

pub type ClickHandler = Rc<dyn Fn(f32, f32)>;

/// A pointer-sensitive area of a drawn cell, in root coordinates.
#[derive(Clone)]
pub struct HitRegion {
    pub rect: Rect,
    pub on_click: Option<ClickHandler>,
}

impl fmt::Debug for HitRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HitRegion")
            .field("rect", &self.rect)
            .field("clickable", &self.on_click.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CellDrawOutput {
    pub regions: Vec<HitRegion>,
}

impl CellDrawOutput {
    pub fn is_hovering(&self, x: f32, y: f32) -> bool {
        self.regions.iter().any(|r| r.rect.contains(x, y))
    }

    /// Run the click handler of the topmost region under the point.
    pub fn click(&self, x: f32, y: f32) -> bool {
        let hit = self
            .regions
            .iter()
            .rev()
            .filter(|r| r.rect.contains(x, y))
            .find_map(|r| r.on_click.as_ref());
        match hit {
            Some(handler) => {
                handler(x, y);
                true
            }
            None => false,
        }
    }
}

/// What a renderer gets to draw one cell.
pub struct CellDrawContext<'c, 'p> {
    pub paint: &'c mut PaintContext<'p>,
    pub rect: Rect,
    /// Pointer position in root coordinates when it is over this cell.
    pub hover: Option<(f32, f32)>,
    pub row: &'c Value,
    pub column: &'c LeafColumn,
    pub selected: bool,
    pub config: &'c GridConfig,
}

pub trait CellRenderer {
    fn draw(&mut self, ctx: &mut CellDrawContext<'_, '_>) -> CellDrawOutput;
}

/// Formatted value as a single truncated line. Numbers align right.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCellRenderer;

impl CellRenderer for TextCellRenderer {
    fn draw(&mut self, ctx: &mut CellDrawContext<'_, '_>) -> CellDrawOutput {
        let text = ctx.column.display(ctx.row);
        let align = match ctx.column.kind {
            ColumnKind::Number => TextAlign::End,
            ColumnKind::Button => TextAlign::Center,
            _ => TextAlign::Start,
        };
        let font = ctx.config.font(400);
        paint_text(
            ctx.paint,
            &text,
            &font,
            &ctx.config.theme.text_color,
            align,
            ctx.rect,
            CELL_PADDING,
        );
        CellDrawOutput::default()
    }
}

type Populate = Box<dyn FnMut(&mut SceneTree, NodeId, &Value, &LeafColumn) -> Result<()>>;

/// Lays out and paints a scene subtree inside each cell.
///
/// `populate` rebuilds or updates the subtree under the root container for
/// the row being drawn. Nodes with a click hook become hit regions.
pub struct SceneCellRenderer {
    tree: SceneTree,
    root: NodeId,
    populate: Populate,
}

impl SceneCellRenderer {
    pub fn new(
        layout: BoxStyle,
        populate: impl FnMut(&mut SceneTree, NodeId, &Value, &LeafColumn) -> Result<()> + 'static,
    ) -> Self {
        let mut tree = SceneTree::new();
        let root = tree.create(NodeKind::Container(ContainerNode {
            layout,
            ..ContainerNode::default()
        }));
        Self {
            tree,
            root,
            populate: Box::new(populate),
        }
    }

    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn render(&mut self, ctx: &mut CellDrawContext<'_, '_>) -> Result<CellDrawOutput> {
        (self.populate)(&mut self.tree, self.root, ctx.row, ctx.column)?;
        self.tree.set_rect(self.root, ctx.rect)?;
        self.tree.perform_layout(self.root, ctx.paint)?;

        let mut nodes = Vec::new();
        collect(&self.tree, self.root, &mut nodes);
        let hovered = ctx
            .hover
            .map(|(x, y)| self.tree.hit_test(self.root, x, y))
            .unwrap_or_default();
        for &id in &nodes {
            self.tree.set_hovered(id, hovered.contains(&id));
        }
        self.tree.paint(self.root, ctx.paint);

        let regions = nodes
            .iter()
            .filter_map(|&id| {
                let node = self.tree.get(id)?;
                let handler = node.handlers.get(EventKind::Click)?;
                let rect = node.rect;
                let on_click: ClickHandler = Rc::new(move |x, y| {
                    let mut event = EventContext::new(PointerEvent::new(EventKind::Click, x, y), id);
                    event.current_rect = rect;
                    handler(&mut event);
                });
                Some(HitRegion {
                    rect,
                    on_click: Some(on_click),
                })
            })
            .collect();
        Ok(CellDrawOutput { regions })
    }
}

/// Visible nodes under `id` in paint order.
fn collect(tree: &SceneTree, id: NodeId, out: &mut Vec<NodeId>) {
    let Some(node) = tree.get(id) else {
        return;
    };
    if node.style.hidden {
        return;
    }
    out.push(id);
    for &child in node.children() {
        collect(tree, child, out);
    }
}

impl CellRenderer for SceneCellRenderer {
    fn draw(&mut self, ctx: &mut CellDrawContext<'_, '_>) -> CellDrawOutput {
        match self.render(ctx) {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(column = %ctx.column.id, %err, "scene cell failed to render");
                CellDrawOutput::default()
            }
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
    use crate::columns::resolve_columns;
    use crate::layout::{AlignItems, FlexDirection};
    use crate::render::{CacheManager, DrawCommand, IconSet, RecordingSurface};
    use crate::scene::ButtonNode;
    use crate::types::{ColumnDef, Edges};
    use serde_json::json;
    use std::cell::Cell;

    fn draw(
        renderer: &mut dyn CellRenderer,
        surface: &mut RecordingSurface,
        column: &LeafColumn,
        row: &Value,
        hover: Option<(f32, f32)>,
    ) -> CellDrawOutput {
        let mut caches = CacheManager::default();
        let icons = IconSet::builtin();
        let config = GridConfig::default();
        let mut paint = PaintContext::new(surface, &mut caches, &icons);
        let mut ctx = CellDrawContext {
            paint: &mut paint,
            rect: Rect::new(0.0, 0.0, 200.0, 26.0),
            hover,
            row,
            column,
            selected: false,
            config: &config,
        };
        renderer.draw(&mut ctx)
    }

    #[test]
    fn test_text_cell_draws_formatted_value() {
        let leaves = resolve_columns(&[ColumnDef::leaf("name", "Name")]);
        let mut surface = RecordingSurface::new(400.0, 100.0);
        let output = draw(
            &mut TextCellRenderer,
            &mut surface,
            &leaves[0],
            &json!({"name": "Ada"}),
            None,
        );
        assert_eq!(surface.texts(), vec!["Ada"]);
        assert!(output.regions.is_empty());
    }

    #[test]
    fn test_scene_cell_reports_clickable_regions() {
        let leaves = resolve_columns(&[ColumnDef::leaf("name", "Name")]);
        let clicked = Rc::new(Cell::new(0));
        let seen = Rc::clone(&clicked);
        let mut renderer = SceneCellRenderer::new(
            BoxStyle {
                direction: FlexDirection::Row,
                align_items: AlignItems::Center,
                ..BoxStyle::default()
            },
            move |tree, root, row, _column| {
                if !tree.children(root).is_empty() {
                    return Ok(());
                }
                let label = row["name"].as_str().unwrap_or_default();
                let button = tree.create(NodeKind::Button(ButtonNode {
                    label: label.to_string(),
                    font: "12px sans".into(),
                    line_height: 16.0,
                    color: "#000".into(),
                    background: Some("#EEE".into()),
                    hover_background: Some("#DDD".into()),
                    padding: Edges::all(2.0),
                }));
                let seen = Rc::clone(&seen);
                tree.handlers_mut(button)?
                    .set(EventKind::Click, move |_| seen.set(seen.get() + 1));
                tree.add_child(root, button)
            },
        );
        let mut surface = RecordingSurface::new(400.0, 100.0);
        let row = json!({"name": "Open"});
        let output = draw(&mut renderer, &mut surface, &leaves[0], &row, Some((5.0, 13.0)));

        assert_eq!(output.regions.len(), 1);
        // "Open" is 4 chars at 7px plus 2px padding either side.
        assert_eq!(output.regions[0].rect.w, 32.0);
        assert!(output.click(5.0, 13.0));
        assert!(!output.click(150.0, 13.0));
        assert_eq!(clicked.get(), 1);
        // Hovered button paints its hover background.
        assert!(surface
            .commands
            .iter()
            .any(|c| matches!(c, DrawCommand::FillRect { color, .. } if color == "#DDD")));
    }
}
