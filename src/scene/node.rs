//! Scene node data and the leaf primitives' measure and paint routines.

use std::borrow::Cow;
use std::fmt;

use super::context::PaintContext;
use super::events::Handlers;
use crate::layout::{BoxStyle, ItemStyle};
use crate::types::{Edges, Rect, Size};

/// Generational handle to a node in a [`SceneTree`](super::SceneTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Start,
    Center,
    End,
}

/// Single-line text, truncated with an ellipsis to its rect.
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub text: String,
    pub font: String,
    pub line_height: f32,
    pub color: String,
    pub align: TextAlign,
    /// Horizontal inset on both sides.
    pub padding: f32,
}

impl TextNode {
    pub fn new(text: &str, font: &str, line_height: f32, color: &str) -> Self {
        Self {
            text: text.to_string(),
            font: font.to_string(),
            line_height,
            color: color.to_string(),
            align: TextAlign::Start,
            padding: 0.0,
        }
    }
}

/// A named built-in icon or an image source.
#[derive(Debug, Clone, PartialEq)]
pub struct IconNode {
    pub icon: String,
    pub size: f32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonNode {
    pub label: String,
    pub font: String,
    pub line_height: f32,
    pub color: String,
    pub background: Option<String>,
    pub hover_background: Option<String>,
    pub padding: Edges,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IconButtonNode {
    pub icon: String,
    pub size: f32,
    pub color: String,
    pub hover_background: Option<String>,
    pub padding: f32,
}

/// Box laying out its children with the flex engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContainerNode {
    pub layout: BoxStyle,
    pub background: Option<String>,
    /// Stroked after the children.
    pub border: Option<String>,
    /// Clip children to the container's rect.
    pub clip: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Text(TextNode),
    Icon(IconNode),
    Button(ButtonNode),
    IconButton(IconButtonNode),
    Container(ContainerNode),
}

impl NodeKind {
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Container(_))
    }

    /// Intrinsic size from content. Containers are sized by layout alone.
    pub(crate) fn measure(&self, ctx: &mut PaintContext<'_>) -> Size {
        match self {
            Self::Text(t) => {
                let w = ctx.measure_text(&t.text, &t.font);
                Size::new(w + t.padding * 2.0, t.line_height)
            }
            Self::Icon(i) => Size::new(i.size, i.size),
            Self::Button(b) => {
                let w = ctx.measure_text(&b.label, &b.font);
                Size::new(
                    w + b.padding.horizontal(),
                    b.line_height + b.padding.vertical(),
                )
            }
            Self::IconButton(b) => {
                let side = b.size + b.padding * 2.0;
                Size::new(side, side)
            }
            Self::Container(_) => Size::ZERO,
        }
    }

    /// Draw a leaf, or a container's background. Children and the border
    /// are handled by the tree.
    pub(crate) fn paint(&self, rect: Rect, hovered: bool, ctx: &mut PaintContext<'_>) {
        match self {
            Self::Text(t) => paint_text(ctx, &t.text, &t.font, &t.color, t.align, rect, t.padding),
            Self::Icon(i) => paint_icon(ctx, &i.icon, &i.color, centered(rect, i.size)),
            Self::Button(b) => {
                let bg = if hovered {
                    b.hover_background.as_ref().or(b.background.as_ref())
                } else {
                    b.background.as_ref()
                };
                if let Some(bg) = bg {
                    ctx.surface.fill_rect(rect, bg);
                }
                let inner = rect.inset(b.padding);
                paint_text(ctx, &b.label, &b.font, &b.color, TextAlign::Center, inner, 0.0);
            }
            Self::IconButton(b) => {
                if hovered {
                    if let Some(bg) = &b.hover_background {
                        ctx.surface.fill_rect(rect, bg);
                    }
                }
                paint_icon(ctx, &b.icon, &b.color, centered(rect, b.size));
            }
            Self::Container(c) => {
                if let Some(bg) = &c.background {
                    ctx.surface.fill_rect(rect, bg);
                }
            }
        }
    }
}

fn centered(rect: Rect, size: f32) -> Rect {
    Rect::new(
        rect.x + (rect.w - size) / 2.0,
        rect.y + (rect.h - size) / 2.0,
        size,
        size,
    )
}

pub(crate) fn paint_icon(ctx: &mut PaintContext<'_>, icon: &str, color: &str, rect: Rect) {
    if let Some(shape) = ctx.icons.get(icon) {
        shape.paint(ctx.surface, rect, color);
    } else if let Some(sprite) = ctx.caches.sprites.lookup(icon) {
        ctx.surface.draw_sprite(sprite, rect);
    }
}

pub(crate) fn paint_text(
    ctx: &mut PaintContext<'_>,
    text: &str,
    font: &str,
    color: &str,
    align: TextAlign,
    rect: Rect,
    padding: f32,
) {
    let available = rect.w - padding * 2.0;
    if text.is_empty() || available <= 0.0 {
        return;
    }
    let shown = truncate_text(ctx, text, available, font);
    let width = ctx.measure_text(&shown, font);
    let x = match align {
        TextAlign::Start => rect.x + padding,
        TextAlign::Center => rect.x + (rect.w - width) / 2.0,
        TextAlign::End => rect.right() - padding - width,
    };
    ctx.surface
        .fill_text(&shown, x, rect.y + rect.h / 2.0, font, color);
}

/// Truncate text with ellipsis if it exceeds max width
pub(crate) fn truncate_text<'t>(
    ctx: &mut PaintContext<'_>,
    text: &'t str,
    max_width: f32,
    font: &str,
) -> Cow<'t, str> {
    if ctx.measure_text(text, font) <= max_width {
        return Cow::Borrowed(text);
    }

    const ELLIPSIS: &str = "\u{2026}";
    let available = max_width - ctx.measure_text(ELLIPSIS, font);
    if available <= 0.0 {
        return Cow::Borrowed(ELLIPSIS);
    }

    // Largest prefix (in chars) that fits.
    let chars: Vec<char> = text.chars().collect();
    let mut low = 0;
    let mut high = chars.len();
    let mut candidate = String::new();
    while low < high {
        let mid = (low + high).div_ceil(2);
        candidate.clear();
        candidate.extend(chars.iter().take(mid));
        if ctx.measure_text(&candidate, font) <= available {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    let mut truncated: String = chars.iter().take(low).collect();
    truncated.push_str(ELLIPSIS);
    Cow::Owned(truncated)
}

/// A scene node. `rect` is in root coordinates and written only by the
/// layout pass of the enclosing container.
#[derive(Debug)]
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub rect: Rect,
    pub style: ItemStyle,
    pub kind: NodeKind,
    /// Maintained by the scene root's hover transitions.
    pub hovered: bool,
    pub handlers: Handlers,
    pub(crate) measured: Size,
    /// Some node in this subtree changed content and must be re-measured.
    pub(crate) measure_dirty: bool,
    /// Some node in this subtree changed since the last layout pass.
    pub(crate) layout_dirty: bool,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, style: ItemStyle) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            rect: Rect::ZERO,
            style,
            kind,
            hovered: false,
            handlers: Handlers::default(),
            measured: Size::ZERO,
            measure_dirty: true,
            layout_dirty: true,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn measured(&self) -> Size {
        self.measured
    }

    pub fn is_layout_dirty(&self) -> bool {
        self.layout_dirty
    }

    pub fn is_measure_dirty(&self) -> bool {
        self.measure_dirty
    }
}
