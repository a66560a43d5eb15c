//! Grid configuration parsing and its effect on a live grid.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]

mod common;

use common::{click, header_node, node_rect, people_grid, rerender};
use gridview::{GridConfig, GridError};

#[test]
fn test_defaults() {
    let config = GridConfig::default();
    assert_eq!(config.header_row_height, 28.0);
    assert_eq!(config.row_height, 26.0);
    assert_eq!(config.pool_slack, 20);
    assert!(config.reorderable && config.resizable);
    assert_eq!(config.theme.selected_bg_color, "#CFD8E8");
    assert_eq!(config.header_height(0), 28.0);
    assert_eq!(config.header_height(3), 84.0);
}

#[test]
fn test_partial_json_keeps_defaults() {
    let config =
        GridConfig::from_json(r##"{ "rowHeight": 30, "theme": { "textColor": "#111" } }"##)
            .unwrap();
    let defaults = GridConfig::default();
    assert_eq!(config.row_height, 30.0);
    assert_eq!(config.theme.text_color, "#111");
    assert_eq!(config.theme.background_color, defaults.theme.background_color);
    assert_eq!(config.header_row_height, defaults.header_row_height);
    assert_eq!(config.cache_limits, defaults.cache_limits);
}

#[test]
fn test_invalid_json_is_a_config_error() {
    let err = GridConfig::from_json("{ rowHeight: }").unwrap_err();
    assert!(matches!(err, GridError::Config(_)));
    assert!(matches!(
        GridConfig::from_json(r#"{ "rowHeight": "tall" }"#),
        Err(GridError::Config(_))
    ));
}

#[test]
fn test_row_height_applies_to_hit_testing() {
    let (mut grid, mut surface) = people_grid();
    let mut config = grid.config().clone();
    config.row_height = 40.0;
    grid.set_config(config).unwrap();
    rerender(&mut grid, &mut surface);

    // 28 + 40 = 68: y = 60 is still the first row.
    click(&mut grid, 50.0, 60.0);
    assert!(grid.row_selection().is_selected(0));
}

#[test]
fn test_disabled_resize_hides_handles() {
    let (mut grid, mut surface) = people_grid();
    let mut config = grid.config().clone();
    config.resizable = false;
    grid.set_config(config).unwrap();
    rerender(&mut grid, &mut surface);

    let handle = header_node(&grid, 0, 0, |e| e.resize_handle);
    let node = grid.scene().tree.get(handle).unwrap();
    assert!(node.style.hidden);
    // The label takes the freed space; the cell keeps its width.
    let cell = header_node(&grid, 0, 0, |e| e.container);
    assert_eq!(node_rect(&grid, cell).w, 100.0);
}
