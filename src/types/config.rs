//! Grid configuration. Every field has a default so a partial JSON object
//! (or JS object via `serde-wasm-bindgen`) is enough to configure a grid.

use serde::{Deserialize, Serialize};

/// Header color palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeaderTheme {
    pub background_color: String,
    pub text_color: String,
    pub border_color: String,
    /// Background for columns that are part of the selection
    pub selected_bg_color: String,
    /// Background for the column being dragged
    pub drag_bg_color: String,
    pub icon_color: String,
    /// Blend toward white applied to the background of a hovered cell
    pub hover_lighten: f32,
}

impl Default for HeaderTheme {
    fn default() -> Self {
        Self {
            background_color: "#E8EAED".to_string(),
            text_color: "#3C4043".to_string(),
            border_color: "#CCCCCC".to_string(),
            selected_bg_color: "#CFD8E8".to_string(),
            drag_bg_color: "#A8C7FA".to_string(),
            icon_color: "#5F6368".to_string(),
            hover_lighten: 0.4,
        }
    }
}

/// Capacities for the bounded render caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheLimits {
    pub text_metrics: usize,
    pub colors: usize,
    pub sprites: usize,
}

impl Default for CacheLimits {
    fn default() -> Self {
        Self {
            text_metrics: 4096,
            colors: 256,
            sprites: 128,
        }
    }
}

/// Top-level grid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    /// Height of one header level in pixels
    pub header_row_height: f32,
    /// Height of one body row in pixels
    pub row_height: f32,
    pub font_family: String,
    pub font_size: f32,
    pub theme: HeaderTheme,
    /// Pool entries kept beyond the visible set before eviction starts
    pub pool_slack: usize,
    pub cache_limits: CacheLimits,
    /// Outline every scene node's bounds
    pub debug_bounds: bool,
    pub reorderable: bool,
    pub resizable: bool,
    /// Floor applied to every column width, on top of per-column minimums
    pub min_column_width: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            header_row_height: 28.0,
            row_height: 26.0,
            font_family: "-apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif"
                .to_string(),
            font_size: 12.0,
            theme: HeaderTheme::default(),
            pool_slack: 20,
            cache_limits: CacheLimits::default(),
            debug_bounds: false,
            reorderable: true,
            resizable: true,
            min_column_width: 24.0,
        }
    }
}

impl GridConfig {
    /// Parse from JSON, filling in defaults for anything omitted.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// CSS font string for header labels.
    pub fn font(&self, weight: u16) -> String {
        format!("{} {}px {}", weight, self.font_size, self.font_family)
    }

    pub fn header_height(&self, level_count: usize) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let levels = level_count.max(1) as f32;
        self.header_row_height * levels
    }
}
