//! Scene graph tests: layout, paint order, hit testing and event routing.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]

use std::cell::RefCell;
use std::rc::Rc;

use gridview::layout::{AlignItems, BoxStyle, Dimension, ItemStyle};
use gridview::render::{palette, CacheManager, DrawCommand, NullSurface, RecordingSurface};
use gridview::scene::{
    ButtonNode, ContainerNode, EventKind, NodeId, NodeKind, PointerEvent, SceneRoot, SceneTree,
    TextNode,
};
use gridview::{Edges, GridError, Rect, Size};

const FONT: &str = "12px sans-serif";

struct Scene {
    root: SceneRoot,
    cell: NodeId,
    label: NodeId,
    button: NodeId,
}

/// root (400x100) > cell (200 wide) > [label "Hi", button "Go"]
fn scene() -> Scene {
    let mut tree = SceneTree::new();
    let root = tree.create(NodeKind::Container(ContainerNode::default()));
    let cell = tree.create_with_style(
        NodeKind::Container(ContainerNode {
            layout: BoxStyle {
                align_items: AlignItems::Center,
                main_gap: 4.0,
                ..BoxStyle::default()
            },
            background: Some("#FFFFFF".into()),
            ..ContainerNode::default()
        }),
        ItemStyle {
            width: Dimension::Points(200.0),
            ..ItemStyle::default()
        },
    );
    let label = tree.create(NodeKind::Text(TextNode::new("Hi", FONT, 14.0, "#000")));
    let button = tree.create(NodeKind::Button(ButtonNode {
        label: "Go".into(),
        font: FONT.into(),
        line_height: 14.0,
        color: "#000".into(),
        background: Some("#EEEEEE".into()),
        hover_background: Some("#DDDDDD".into()),
        padding: Edges::symmetric(8.0, 2.0),
    }));
    tree.add_child(root, cell).unwrap();
    tree.add_child(cell, label).unwrap();
    tree.add_child(cell, button).unwrap();
    Scene {
        root: SceneRoot::with_tree(tree, root, CacheManager::default()),
        cell,
        label,
        button,
    }
}

fn surface() -> RecordingSurface {
    RecordingSurface::new(400.0, 100.0)
}

fn rect(s: &Scene, id: NodeId) -> Rect {
    s.root.tree.rect(id).unwrap()
}

/// Records `name` into `log` whenever `kind` reaches `id`.
fn record(
    root: &mut SceneRoot,
    id: NodeId,
    kind: EventKind,
    name: &'static str,
    log: &Rc<RefCell<Vec<&'static str>>>,
) {
    let log = Rc::clone(log);
    root.tree
        .handlers_mut(id)
        .unwrap()
        .set(kind, move |_| log.borrow_mut().push(name));
}

#[test]
fn test_layout_writes_absolute_rects() {
    let mut s = scene();
    s.root.frame(&mut surface()).unwrap();
    assert_eq!(rect(&s, s.root.root()), Rect::new(0.0, 0.0, 400.0, 100.0));
    assert_eq!(rect(&s, s.cell), Rect::new(0.0, 0.0, 200.0, 100.0));
    // "Hi" measures 14 wide, "Go" 14 plus 16 of padding.
    assert_eq!(rect(&s, s.label), Rect::new(0.0, 43.0, 14.0, 14.0));
    assert_eq!(rect(&s, s.button), Rect::new(18.0, 41.0, 30.0, 18.0));
}

#[test]
fn test_perform_layout_is_idempotent() {
    let mut s = scene();
    let mut surface = surface();
    s.root.layout(&mut surface).unwrap();
    let first: Vec<Rect> = [s.cell, s.label, s.button].iter().map(|&id| rect(&s, id)).collect();
    s.root.layout(&mut surface).unwrap();
    let second: Vec<Rect> = [s.cell, s.label, s.button].iter().map(|&id| rect(&s, id)).collect();
    assert_eq!(first, second);
    assert!(!s.root.tree.get(s.cell).unwrap().is_layout_dirty());
}

#[test]
fn test_mutation_marks_ancestors_dirty() {
    let mut s = scene();
    s.root.frame(&mut surface()).unwrap();
    s.root
        .tree
        .update_kind(s.label, NodeKind::Text(TextNode::new("Hello", FONT, 14.0, "#000")))
        .unwrap();
    assert!(s.root.tree.get(s.cell).unwrap().is_measure_dirty());
    assert!(s.root.tree.get(s.root.root()).unwrap().is_layout_dirty());

    s.root.frame(&mut surface()).unwrap();
    assert_eq!(rect(&s, s.label).w, 35.0);
    assert_eq!(rect(&s, s.button).x, 39.0);
}

#[test]
fn test_hit_test_deepest_first() {
    let mut s = scene();
    s.root.frame(&mut surface()).unwrap();
    let root = s.root.root();
    assert_eq!(s.root.tree.hit_test(root, 33.0, 50.0), vec![s.button, s.cell, root]);
    assert_eq!(s.root.tree.hit_test(root, 150.0, 5.0), vec![s.cell, root]);
    assert_eq!(s.root.tree.hit_test(root, 300.0, 50.0), vec![root]);
    assert!(s.root.tree.hit_test(root, 500.0, 50.0).is_empty());
}

#[test]
fn test_click_bubbles_in_hit_order() {
    let mut s = scene();
    s.root.frame(&mut surface()).unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));
    let root = s.root.root();
    record(&mut s.root, s.button, EventKind::Click, "button", &log);
    record(&mut s.root, s.cell, EventKind::Click, "cell", &log);
    record(&mut s.root, root, EventKind::Click, "root", &log);

    let dispatched = s.root.pointer(PointerEvent::new(EventKind::Click, 33.0, 50.0));
    assert!(!dispatched.stopped);
    assert_eq!(*log.borrow(), vec!["button", "cell", "root"]);
}

#[test]
fn test_stop_propagation_halts_bubbling() {
    let mut s = scene();
    s.root.frame(&mut surface()).unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));
    record(&mut s.root, s.cell, EventKind::Click, "cell", &log);
    {
        let log = Rc::clone(&log);
        s.root
            .tree
            .handlers_mut(s.button)
            .unwrap()
            .set(EventKind::Click, move |ctx| {
                log.borrow_mut().push("button");
                ctx.stop_propagation();
            });
    }

    let dispatched = s.root.pointer(PointerEvent::new(EventKind::Click, 33.0, 50.0));
    assert!(dispatched.stopped);
    assert_eq!(*log.borrow(), vec!["button"]);
}

#[test]
fn test_handler_sees_local_coordinates() {
    let mut s = scene();
    s.root.frame(&mut surface()).unwrap();
    let seen = Rc::new(RefCell::new(None));
    {
        let seen = Rc::clone(&seen);
        s.root
            .tree
            .handlers_mut(s.button)
            .unwrap()
            .set(EventKind::MouseDown, move |ctx| {
                *seen.borrow_mut() = Some(ctx.local());
            });
    }
    s.root.pointer(PointerEvent::new(EventKind::MouseDown, 20.0, 45.0));
    assert_eq!(*seen.borrow(), Some((2.0, 4.0)));
}

#[test]
fn test_hover_transitions_fire_once() {
    let mut s = scene();
    s.root.frame(&mut surface()).unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));
    record(&mut s.root, s.button, EventKind::MouseEnter, "enter", &log);
    record(&mut s.root, s.button, EventKind::MouseLeave, "leave", &log);
    record(&mut s.root, s.cell, EventKind::MouseLeave, "cell-leave", &log);

    for x in [25.0, 30.0, 40.0] {
        s.root.pointer(PointerEvent::new(EventKind::MouseMove, x, 50.0));
    }
    assert_eq!(*log.borrow(), vec!["enter"]);
    assert_eq!(s.root.hovered(), &[s.button, s.cell, s.root.root()]);

    // Off the button but still inside the cell.
    s.root.pointer(PointerEvent::new(EventKind::MouseMove, 150.0, 50.0));
    s.root.pointer(PointerEvent::new(EventKind::MouseMove, 160.0, 50.0));
    assert_eq!(*log.borrow(), vec!["enter", "leave"]);

    s.root.pointer_leave();
    assert_eq!(*log.borrow(), vec!["enter", "leave", "cell-leave"]);
    assert!(s.root.hovered().is_empty());
}

#[test]
fn test_hovered_button_paints_hover_background() {
    let mut s = scene();
    let mut surface = surface();
    s.root.frame(&mut surface).unwrap();
    s.root.pointer(PointerEvent::new(EventKind::MouseMove, 33.0, 50.0));
    surface.clear();
    s.root.frame(&mut surface).unwrap();
    let fills = surface.fills();
    assert!(fills.contains(&(Rect::new(18.0, 41.0, 30.0, 18.0), "#DDDDDD")));
}

#[test]
fn test_paint_order_follows_children() {
    let mut s = scene();
    let mut surface = surface();
    s.root.frame(&mut surface).unwrap();
    let colors: Vec<&str> = surface.fills().into_iter().map(|(_, c)| c).collect();
    assert_eq!(colors, vec!["#FFFFFF", "#EEEEEE"]);
    assert_eq!(surface.texts(), vec!["Hi", "Go"]);
}

#[test]
fn test_debug_bounds_outline_every_node() {
    let mut s = scene();
    s.root.debug_bounds = true;
    let mut surface = surface();
    s.root.frame(&mut surface).unwrap();
    let outlines = surface
        .commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::StrokeRect { color, .. } if color == palette::DEBUG_BOUNDS))
        .count();
    assert_eq!(outlines, 4);
}

#[test]
fn test_text_metrics_are_cached_across_frames() {
    let mut s = scene();
    let mut surface = surface();
    s.root.frame(&mut surface).unwrap();
    let calls = surface.measure_calls;
    s.root.frame(&mut surface).unwrap();
    assert_eq!(surface.measure_calls, calls);
}

#[test]
fn test_device_pointer_is_scaled() {
    let mut s = scene();
    let mut surface = surface().with_dpr(2.0);
    s.root.frame(&mut surface).unwrap();
    let dispatched = s.root.pointer_device(EventKind::Click, 66.0, 100.0, Default::default());
    assert_eq!(dispatched.path.first(), Some(&s.button));
}

#[test]
fn test_null_surface_degrades_silently() {
    let mut s = scene();
    let mut surface = NullSurface::new(Size::new(400.0, 100.0));
    s.root.frame(&mut surface).unwrap();
    // Text measures as zero, so only padding is left.
    assert_eq!(rect(&s, s.label).w, 0.0);
    assert_eq!(rect(&s, s.button).w, 16.0);
}

#[test]
fn test_add_child_to_leaf_is_an_error() {
    let mut s = scene();
    let orphan = s.root.tree.create(NodeKind::Text(TextNode::new("x", FONT, 14.0, "#000")));
    let err = s.root.tree.add_child(s.label, orphan).unwrap_err();
    assert!(matches!(err, GridError::LeafChild(id) if id == s.label));
    assert!(s.root.tree.parent(orphan).is_none());
}

#[test]
fn test_reparent_moves_between_containers() {
    let mut s = scene();
    let root = s.root.root();
    s.root.tree.add_child(root, s.button).unwrap();
    assert_eq!(s.root.tree.children(s.cell), &[s.label]);
    assert_eq!(s.root.tree.children(root), &[s.cell, s.button]);
    assert_eq!(s.root.tree.parent(s.button), Some(root));
}

#[test]
fn test_set_children_drops_repeated_ids() {
    let mut s = scene();
    s.root
        .tree
        .set_children(s.cell, &[s.label, s.button, s.label])
        .unwrap();
    assert_eq!(s.root.tree.children(s.cell), &[s.label, s.button]);

    let mut surface = surface();
    s.root.frame(&mut surface).unwrap();
    assert_eq!(surface.texts().iter().filter(|t| **t == "Hi").count(), 1);
}
