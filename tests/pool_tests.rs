//! Header pool tests: bounded reuse across scrolling and resizing.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_precision_loss
)]

use std::collections::{BTreeSet, HashMap};

use gridview::layout::ColumnLayout;
use gridview::pool::{ActionQueue, HeaderFrame, HeaderPool, DEFAULT_POOL_SLACK};
use gridview::render::ColorCache;
use gridview::scene::{ContainerNode, NodeId, NodeKind, SceneTree};
use gridview::{
    compose_header, resolve_columns, CellKey, ColumnDef, ColumnOrder, GridConfig, HeaderCell,
    LeafColumn,
};

/// Nodes in one pooled cell subtree: the container and its six children.
const NODES_PER_ENTRY: usize = 7;

struct Fixture {
    leaves: Vec<LeafColumn>,
    levels: Vec<Vec<HeaderCell>>,
    columns: ColumnLayout,
    config: GridConfig,
    selected: BTreeSet<usize>,
}

impl Fixture {
    fn new(defs: &[ColumnDef]) -> Self {
        Self::from_leaves(resolve_columns(defs))
    }

    fn from_leaves(leaves: Vec<LeafColumn>) -> Self {
        let levels = compose_header(&leaves).by_level();
        let columns = ColumnLayout::new(&leaves, &HashMap::new(), 0.0);
        Self {
            leaves,
            levels,
            columns,
            config: GridConfig::default(),
            selected: BTreeSet::new(),
        }
    }

    fn frame(&self, scroll_x: f32, width: f32) -> HeaderFrame<'_> {
        HeaderFrame {
            levels: &self.levels,
            columns: &self.columns,
            leaves: &self.leaves,
            config: &self.config,
            scroll_x,
            viewport_width: width,
            sort: None,
            selected: &self.selected,
            dragging: None,
            drop_x: None,
        }
    }
}

/// `count` groups of two 80px leaves, every third group nested one level
/// deeper.
fn grouped(count: usize) -> Vec<ColumnDef> {
    (0..count)
        .map(|g| {
            let leaves = vec![
                ColumnDef::leaf(&format!("g{g}a"), "a").with_width(80.0),
                ColumnDef::leaf(&format!("g{g}b"), "b").with_width(80.0).sortable(),
            ];
            if g % 3 == 0 {
                ColumnDef::group("Outer", vec![ColumnDef::group(&format!("G{g}"), leaves)])
            } else {
                ColumnDef::group(&format!("G{g}"), leaves)
            }
        })
        .collect()
}

fn setup() -> (SceneTree, NodeId, ColorCache) {
    let mut tree = SceneTree::new();
    let parent = tree.create(NodeKind::Container(ContainerNode::default()));
    (tree, parent, ColorCache::new(32))
}

/// Deterministic pseudo-random sequence in `[0, 1)`.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 40) as f32 / (1u64 << 24) as f32
    }
}

#[test]
fn test_pool_bounded_under_scroll_and_resize() {
    let f = Fixture::new(&grouped(60));
    let (mut tree, parent, mut colors) = setup();
    let mut pool = HeaderPool::new(parent, ActionQueue::default());
    let total = f.columns.total_width();
    let mut rng = Lcg(7);
    let mut max_active = 0;

    for _ in 0..400 {
        let width = 100.0 + rng.next() * 1400.0;
        let scroll = rng.next() * (total - width).max(0.0);
        pool.update(&mut tree, &mut colors, &f.frame(scroll, width)).unwrap();

        let active = pool.active().len();
        max_active = max_active.max(active);
        assert!(pool.len() <= active + DEFAULT_POOL_SLACK);
        assert_eq!(tree.len(), 1 + pool.len() * NODES_PER_ENTRY);
        assert_eq!(tree.children(parent).len(), active);
    }
    assert!(pool.len() <= max_active + DEFAULT_POOL_SLACK);
}

#[test]
fn test_visible_cells_cover_every_level() {
    let f = Fixture::new(&grouped(10));
    // Columns 4..=7 (groups 2 and 3) intersect [330, 620).
    let cells = HeaderPool::visible_cells(&f.levels, &f.columns, 330.0, 290.0);
    let keys: Vec<CellKey> = cells.iter().map(|c| c.key()).collect();
    assert!(keys.contains(&CellKey::new(0, 4)));
    assert!(keys.contains(&CellKey::new(1, 6)));
    assert!(keys.contains(&CellKey::new(2, 7)));
    assert!(!keys.iter().any(|k| k.start_index < 4 && k.level == 1));
    assert!(!keys.iter().any(|k| k.start_index > 7));
}

#[test]
fn test_first_pass_without_width_renders_all_cells() {
    let f = Fixture::new(&grouped(4));
    let (mut tree, parent, mut colors) = setup();
    let mut pool = HeaderPool::new(parent, ActionQueue::default());
    pool.update(&mut tree, &mut colors, &f.frame(0.0, 0.0)).unwrap();
    let all: usize = f.levels.iter().map(Vec::len).sum();
    assert_eq!(pool.active().len(), all);
}

#[test]
fn test_entries_keep_nodes_while_visible() {
    let f = Fixture::new(&grouped(20));
    let (mut tree, parent, mut colors) = setup();
    let mut pool = HeaderPool::new(parent, ActionQueue::default());
    pool.update(&mut tree, &mut colors, &f.frame(0.0, 400.0)).unwrap();
    let before = pool.entry(CellKey::new(1, 2)).unwrap().container;

    for step in 1..=5 {
        pool.update(&mut tree, &mut colors, &f.frame(step as f32 * 10.0, 400.0))
            .unwrap();
        assert_eq!(pool.entry(CellKey::new(1, 2)).unwrap().container, before);
    }
}

#[test]
fn test_reused_entry_follows_reorder() {
    let defs: Vec<ColumnDef> = ["x", "y", "z"]
        .iter()
        .map(|id| ColumnDef::leaf(id, &id.to_uppercase()).with_width(80.0))
        .collect();
    let leaves = resolve_columns(&defs);
    let f = Fixture::from_leaves(leaves.clone());
    let (mut tree, parent, mut colors) = setup();
    let mut pool = HeaderPool::new(parent, ActionQueue::default());
    pool.update(&mut tree, &mut colors, &f.frame(0.0, 300.0)).unwrap();
    let label = pool.entry(CellKey::new(0, 0)).unwrap().label;

    let order = ColumnOrder::new(vec!["z".into()]);
    let reordered = Fixture::from_leaves(order.apply(&leaves));
    pool.update(&mut tree, &mut colors, &reordered.frame(0.0, 300.0))
        .unwrap();

    assert_eq!(pool.entry(CellKey::new(0, 0)).unwrap().label, label);
    match tree.kind(label) {
        Some(NodeKind::Text(text)) => assert_eq!(text.text, "Z"),
        other => panic!("unexpected label node {other:?}"),
    }
}

#[test]
fn test_zero_slack_keeps_only_active() {
    let f = Fixture::new(&grouped(30));
    let (mut tree, parent, mut colors) = setup();
    let mut pool = HeaderPool::new(parent, ActionQueue::default()).with_slack(0);
    for step in 0..20 {
        pool.update(&mut tree, &mut colors, &f.frame(step as f32 * 120.0, 500.0))
            .unwrap();
        assert_eq!(pool.len(), pool.active().len());
    }
}

#[test]
fn test_clear_destroys_subtrees() {
    let f = Fixture::new(&grouped(5));
    let (mut tree, parent, mut colors) = setup();
    let mut pool = HeaderPool::new(parent, ActionQueue::default());
    pool.update(&mut tree, &mut colors, &f.frame(0.0, 800.0)).unwrap();
    assert!(!pool.is_empty());
    pool.clear(&mut tree);
    assert!(pool.is_empty());
    assert_eq!(tree.len(), 1);
}

#[test]
fn test_controls_follow_column_flags() {
    let mut f = Fixture::new(&grouped(1));
    f.config.reorderable = false;
    let (mut tree, parent, mut colors) = setup();
    let mut pool = HeaderPool::new(parent, ActionQueue::default());
    pool.update(&mut tree, &mut colors, &f.frame(0.0, 400.0)).unwrap();

    let hidden = |id| tree.style(id).unwrap().hidden;
    // Group 0 is nested: Outer > G0 > [a, b], so leaves sit on level 2.
    let a = pool.entry(CellKey::new(2, 0)).unwrap();
    let b = pool.entry(CellKey::new(2, 1)).unwrap();
    let group = pool.entry(CellKey::new(0, 0)).unwrap();
    assert!(hidden(a.sort_button));
    assert!(!hidden(b.sort_button));
    assert!(hidden(a.grip));
    assert!(!hidden(a.resize_handle));
    assert!(hidden(group.sort_button));
    assert!(hidden(group.resize_handle));
}
