//! Single-pass flexbox layout.
//!
//! Steps per box:
//! 1. Measure intrinsic sizes bottom-up (leaves report their own size, boxes
//!    sum their in-flow children along the main axis).
//! 2. Place absolutely positioned children at their offsets.
//! 3. Collect in-flow items with their flex basis and break them into lines
//!    (a single line unless the box wraps).
//! 4. Distribute free space with `flex_grow` / `flex_shrink`.
//! 5. Position items along the main axis (justify-content, gap).
//! 6. Size and align items on the cross axis (align-items / align-self).
//! 7. Recurse into child boxes with their resolved size.
//!
//! Resulting rectangles are relative to the parent box's top-left corner.

use crate::types::{Edges, Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexDirection {
    #[default]
    Row,
    RowReverse,
    Column,
    ColumnReverse,
}

impl FlexDirection {
    pub fn is_row(self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }

    pub fn is_reverse(self) -> bool {
        matches!(self, Self::RowReverse | Self::ColumnReverse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JustifyContent {
    #[default]
    Start,
    End,
    Center,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignItems {
    Start,
    End,
    Center,
    #[default]
    Stretch,
}

/// Explicit size along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    /// Use the measured size (or stretch on the cross axis).
    #[default]
    Auto,
    Points(f32),
    /// Take all the space the parent box offers on this axis.
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Position {
    #[default]
    Relative,
    /// Out of flow, placed at this offset from the parent box's corner.
    Absolute { x: f32, y: f32 },
}

/// Per-item layout properties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemStyle {
    pub flex_grow: f32,
    pub flex_shrink: f32,
    /// `None` means "auto": the explicit main size or the measured size.
    pub flex_basis: Option<f32>,
    pub width: Dimension,
    pub height: Dimension,
    pub align_self: Option<AlignItems>,
    pub position: Position,
    /// Excluded from layout entirely.
    pub hidden: bool,
}

impl Default for ItemStyle {
    fn default() -> Self {
        Self {
            flex_grow: 0.0,
            flex_shrink: 1.0,
            flex_basis: None,
            width: Dimension::Auto,
            height: Dimension::Auto,
            align_self: None,
            position: Position::Relative,
            hidden: false,
        }
    }
}

impl ItemStyle {
    fn main_dim(&self, is_row: bool) -> Dimension {
        if is_row {
            self.width
        } else {
            self.height
        }
    }

    fn cross_dim(&self, is_row: bool) -> Dimension {
        if is_row {
            self.height
        } else {
            self.width
        }
    }

    fn in_flow(&self) -> bool {
        !self.hidden && self.position == Position::Relative
    }
}

/// Properties of a box laying out its children.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxStyle {
    pub direction: FlexDirection,
    pub justify: JustifyContent,
    pub align_items: AlignItems,
    pub main_gap: f32,
    /// Space between lines; only used when `wrap` is set.
    pub cross_gap: f32,
    pub padding: Edges,
    pub wrap: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlexKind {
    Leaf,
    Box {
        style: BoxStyle,
        children: Vec<FlexNode>,
    },
}

/// A node of the ephemeral layout tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FlexNode {
    /// Caller-defined tag used to map results back to the caller's tree.
    pub tag: usize,
    pub style: ItemStyle,
    /// For leaves: their intrinsic size. For boxes: filled in by the
    /// intrinsic pass.
    pub measured: Size,
    pub kind: FlexKind,
    /// Output rectangle relative to the parent box.
    pub layout: Rect,
}

impl FlexNode {
    pub fn leaf(tag: usize, style: ItemStyle, measured: Size) -> Self {
        Self {
            tag,
            style,
            measured,
            kind: FlexKind::Leaf,
            layout: Rect::ZERO,
        }
    }

    pub fn boxed(tag: usize, style: ItemStyle, box_style: BoxStyle, children: Vec<FlexNode>) -> Self {
        Self {
            tag,
            style,
            measured: Size::ZERO,
            kind: FlexKind::Box {
                style: box_style,
                children,
            },
            layout: Rect::ZERO,
        }
    }

    pub fn children(&self) -> &[FlexNode] {
        match &self.kind {
            FlexKind::Leaf => &[],
            FlexKind::Box { children, .. } => children,
        }
    }
}

/// Lay out `root` into a box of `available` size. The root is placed at the
/// origin and sized to `available` regardless of its own style.
pub fn compute_layout(root: &mut FlexNode, available: Size) {
    measure_intrinsic(root);
    root.layout = Rect::new(0.0, 0.0, available.width.max(0.0), available.height.max(0.0));
    layout_box(root);
}

fn points_or(dim: Dimension, fallback: f32) -> f32 {
    match dim {
        Dimension::Points(v) => v.max(0.0),
        Dimension::Auto | Dimension::Fill => fallback,
    }
}

/// Hypothetical outer size of `node` ignoring flexing, with explicit point
/// sizes applied. Stores a box's content-derived size in `measured`.
fn measure_intrinsic(node: &mut FlexNode) -> Size {
    if let FlexKind::Box { style, children } = &mut node.kind {
        let is_row = style.direction.is_row();
        let mut main = 0.0f32;
        let mut cross = 0.0f32;
        let mut count = 0usize;
        for child in children.iter_mut() {
            let size = measure_intrinsic(child);
            if !child.style.in_flow() {
                continue;
            }
            let (m, c) = if is_row {
                (size.width, size.height)
            } else {
                (size.height, size.width)
            };
            main += child.style.flex_basis.unwrap_or(m);
            cross = cross.max(c);
            count += 1;
        }
        #[allow(clippy::cast_precision_loss)]
        let gaps = style.main_gap * count.saturating_sub(1) as f32;
        main += gaps;
        let (w, h) = if is_row { (main, cross) } else { (cross, main) };
        node.measured = Size::new(
            w + style.padding.horizontal(),
            h + style.padding.vertical(),
        );
    }
    Size::new(
        points_or(node.style.width, node.measured.width),
        points_or(node.style.height, node.measured.height),
    )
}

struct Item {
    index: usize,
    basis: f32,
    grow: f32,
    shrink: f32,
    main: f32,
    cross: f32,
    /// Cross size follows the line.
    stretch: bool,
    align: AlignItems,
}

fn layout_box(node: &mut FlexNode) {
    let outer = node.layout;
    let FlexKind::Box { style, children } = &mut node.kind else {
        return;
    };
    let style = *style;
    let is_row = style.direction.is_row();
    let inner = Rect::new(0.0, 0.0, outer.w, outer.h).inset(style.padding);
    let (main_size, cross_size) = if is_row {
        (inner.w, inner.h)
    } else {
        (inner.h, inner.w)
    };

    let mut items = Vec::with_capacity(children.len());
    for (index, child) in children.iter_mut().enumerate() {
        let hypothetical = Size::new(
            points_or(child.style.width, child.measured.width),
            points_or(child.style.height, child.measured.height),
        );
        match child.style.position {
            _ if child.style.hidden => child.layout = Rect::ZERO,
            Position::Absolute { x, y } => {
                let w = match child.style.width {
                    Dimension::Fill => (inner.w - x).max(0.0),
                    _ => hypothetical.width,
                };
                let h = match child.style.height {
                    Dimension::Fill => (inner.h - y).max(0.0),
                    _ => hypothetical.height,
                };
                child.layout = Rect::new(x, y, w, h);
            }
            Position::Relative => {
                let (hyp_main, hyp_cross) = if is_row {
                    (hypothetical.width, hypothetical.height)
                } else {
                    (hypothetical.height, hypothetical.width)
                };
                let basis = match (child.style.flex_basis, child.style.main_dim(is_row)) {
                    (Some(basis), _) => basis.max(0.0),
                    (None, Dimension::Fill) => main_size,
                    (None, _) => hyp_main,
                };
                let align = child.style.align_self.unwrap_or(style.align_items);
                let cross_dim = child.style.cross_dim(is_row);
                let stretch = matches!(cross_dim, Dimension::Fill)
                    || (align == AlignItems::Stretch && cross_dim == Dimension::Auto);
                items.push(Item {
                    index,
                    basis,
                    grow: child.style.flex_grow.max(0.0),
                    shrink: child.style.flex_shrink.max(0.0),
                    main: basis,
                    cross: hyp_cross,
                    stretch,
                    align,
                });
            }
        }
    }

    let lines = break_lines(&items, main_size, style.main_gap, style.wrap);
    let single_line = lines.len() <= 1;
    let mut line_offset = 0.0f32;

    for line in lines {
        let Some(line_items) = items.get_mut(line.clone()) else {
            continue;
        };
        resolve_flexible_lengths(line_items, main_size, style.main_gap);

        let line_cross = if single_line && !style.wrap {
            cross_size
        } else {
            line_items.iter().map(|i| i.cross).fold(0.0f32, f32::max)
        };

        let (mut pos, spacing) = justify_offsets(line_items, main_size, style.main_gap, style.justify);
        for item in line_items.iter_mut() {
            if item.stretch {
                item.cross = line_cross;
            }
            let cross_pos = line_offset
                + match item.align {
                    AlignItems::Start | AlignItems::Stretch => 0.0,
                    AlignItems::End => line_cross - item.cross,
                    AlignItems::Center => (line_cross - item.cross) / 2.0,
                };
            let main_pos = if style.direction.is_reverse() {
                main_size - pos - item.main
            } else {
                pos
            };
            pos += item.main + spacing;

            let rect = if is_row {
                Rect::new(main_pos, cross_pos, item.main, item.cross)
            } else {
                Rect::new(cross_pos, main_pos, item.cross, item.main)
            };
            if let Some(child) = children.get_mut(item.index) {
                child.layout = rect.translate(inner.x, inner.y);
            }
        }
        line_offset += line_cross + style.cross_gap;
    }

    for child in children.iter_mut() {
        if !child.style.hidden {
            layout_box(child);
        }
    }
}

/// Ranges into `items`, one per line.
fn break_lines(items: &[Item], main_size: f32, gap: f32, wrap: bool) -> Vec<std::ops::Range<usize>> {
    if !wrap || items.is_empty() {
        return vec![0..items.len()];
    }
    let mut lines = Vec::new();
    let mut start = 0;
    let mut used = 0.0f32;
    for (i, item) in items.iter().enumerate() {
        let extra = if i == start { item.basis } else { gap + item.basis };
        if i > start && used + extra > main_size {
            lines.push(start..i);
            start = i;
            used = item.basis;
        } else {
            used += extra;
        }
    }
    lines.push(start..items.len());
    lines
}

fn total_gap(count: usize, gap: f32) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let gaps = count.saturating_sub(1) as f32;
    gap * gaps
}

fn resolve_flexible_lengths(items: &mut [Item], main_size: f32, gap: f32) {
    let used: f32 = items.iter().map(|i| i.basis).sum::<f32>() + total_gap(items.len(), gap);
    let free = main_size - used;

    if free > 0.0 {
        let total_grow: f32 = items.iter().map(|i| i.grow).sum();
        if total_grow > 0.0 {
            for item in items.iter_mut() {
                item.main = item.basis + free * (item.grow / total_grow);
            }
        }
    } else if free < 0.0 {
        shrink_to_fit(items, main_size - total_gap(items.len(), gap));
    }
}

/// Absorb a deficit by `shrink * basis`. Items that would go below zero are
/// frozen at zero and the rest of the deficit is split again over the
/// others.
fn shrink_to_fit(items: &mut [Item], available: f32) {
    let mut frozen = vec![false; items.len()];
    loop {
        let (mut basis, mut weighted) = (0.0_f32, 0.0_f32);
        for (item, _) in items.iter().zip(&frozen).filter(|(_, &f)| !f) {
            basis += item.basis;
            weighted += item.shrink * item.basis;
        }
        let free = available - basis;

        let mut clamped = false;
        for (item, frozen) in items.iter_mut().zip(frozen.iter_mut()) {
            if *frozen {
                item.main = 0.0;
                continue;
            }
            let share = if free < 0.0 && weighted > 0.0 {
                free * item.shrink * item.basis / weighted
            } else {
                0.0
            };
            item.main = item.basis + share;
            if item.main < 0.0 {
                item.main = 0.0;
                *frozen = true;
                clamped = true;
            }
        }
        if !clamped {
            break;
        }
    }
}

/// Starting offset and the spacing added after each item.
fn justify_offsets(items: &[Item], main_size: f32, gap: f32, justify: JustifyContent) -> (f32, f32) {
    let count = items.len();
    let used: f32 = items.iter().map(|i| i.main).sum::<f32>() + total_gap(count, gap);
    let remaining = main_size - used;
    let free = remaining.max(0.0);
    #[allow(clippy::cast_precision_loss)]
    let n = count as f32;

    match justify {
        JustifyContent::Start => (0.0, gap),
        JustifyContent::End => (remaining, gap),
        JustifyContent::Center => (remaining / 2.0, gap),
        JustifyContent::SpaceBetween if count > 1 => (0.0, gap + free / (n - 1.0)),
        JustifyContent::SpaceBetween => (0.0, gap),
        JustifyContent::SpaceAround if count > 0 => {
            let g = free / n;
            (g / 2.0, gap + g)
        }
        JustifyContent::SpaceEvenly if count > 0 => {
            let g = free / (n + 1.0);
            (g, gap + g)
        }
        JustifyContent::SpaceAround | JustifyContent::SpaceEvenly => (0.0, gap),
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

    fn item(w: f32, h: f32) -> FlexNode {
        FlexNode::leaf(0, ItemStyle::default(), Size::new(w, h))
    }

    fn row(children: Vec<FlexNode>, style: BoxStyle) -> FlexNode {
        FlexNode::boxed(0, ItemStyle::default(), style, children)
    }

    fn rects(node: &FlexNode) -> Vec<Rect> {
        node.children().iter().map(|c| c.layout).collect()
    }

    #[test]
    fn test_row_sequential_with_gap() {
        let mut root = row(
            vec![item(10.0, 5.0), item(20.0, 5.0)],
            BoxStyle {
                main_gap: 4.0,
                align_items: AlignItems::Start,
                ..BoxStyle::default()
            },
        );
        compute_layout(&mut root, Size::new(100.0, 20.0));
        assert_eq!(
            rects(&root),
            vec![Rect::new(0.0, 0.0, 10.0, 5.0), Rect::new(14.0, 0.0, 20.0, 5.0)]
        );
    }

    #[test]
    fn test_stretch_takes_container_cross() {
        let mut root = row(vec![item(10.0, 5.0)], BoxStyle::default());
        compute_layout(&mut root, Size::new(100.0, 30.0));
        assert_eq!(root.children()[0].layout.h, 30.0);
    }

    #[test]
    fn test_row_reverse_mirrors() {
        let mut root = row(
            vec![item(10.0, 5.0), item(20.0, 5.0)],
            BoxStyle {
                direction: FlexDirection::RowReverse,
                ..BoxStyle::default()
            },
        );
        compute_layout(&mut root, Size::new(100.0, 10.0));
        let r = rects(&root);
        assert_eq!(r[0].x, 90.0);
        assert_eq!(r[1].x, 70.0);
    }

    #[test]
    fn test_shrink_never_negative() {
        let mut a = item(50.0, 5.0);
        a.style.flex_shrink = 1.0;
        let mut b = item(10.0, 5.0);
        b.style.flex_shrink = 100.0;
        let mut root = row(vec![a, b], BoxStyle::default());
        compute_layout(&mut root, Size::new(20.0, 10.0));
        assert!(rects(&root).iter().all(|r| r.w >= 0.0));
        assert_eq!(root.children()[1].layout.w, 0.0);
    }

    #[test]
    fn test_wrap_breaks_lines() {
        let mut root = row(
            vec![item(40.0, 10.0), item(40.0, 12.0), item(40.0, 10.0)],
            BoxStyle {
                wrap: true,
                cross_gap: 2.0,
                align_items: AlignItems::Start,
                ..BoxStyle::default()
            },
        );
        compute_layout(&mut root, Size::new(90.0, 100.0));
        let r = rects(&root);
        assert_eq!((r[0].x, r[0].y), (0.0, 0.0));
        assert_eq!((r[1].x, r[1].y), (40.0, 0.0));
        assert_eq!((r[2].x, r[2].y), (0.0, 14.0));
    }

    #[test]
    fn test_absolute_child_out_of_flow() {
        let mut abs = item(30.0, 10.0);
        abs.style.position = Position::Absolute { x: 5.0, y: 7.0 };
        let mut root = row(
            vec![abs, item(10.0, 10.0)],
            BoxStyle {
                padding: Edges::all(2.0),
                ..BoxStyle::default()
            },
        );
        compute_layout(&mut root, Size::new(100.0, 20.0));
        let r = rects(&root);
        assert_eq!(r[0], Rect::new(5.0, 7.0, 30.0, 10.0));
        assert_eq!(r[1].x, 2.0);
    }
}
