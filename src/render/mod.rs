//! Drawing abstraction and render-side resources.
//!
//! This module provides:
//! - The `Surface` trait scene nodes draw through
//! - Canvas 2D surface (wasm32), plus null and recording surfaces
//! - Bounded caches for text metrics, colors and sprites
//! - Built-in vector icons and color utilities

pub mod cache;
#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod colors;
pub mod icons;
pub mod sprites;
mod surface;

pub use cache::{CacheManager, ColorCache, LruCache, TextMetricsCache};
#[cfg(target_arch = "wasm32")]
pub use canvas::Canvas2dSurface;
pub use colors::{lighten_css, palette, CssColor, Rgba};
pub use icons::{IconSet, IconShape};
pub use sprites::{CompletionSink, Sprite, SpriteCache, SpriteDecoder, SpriteState};
pub use surface::{crisp, DrawCommand, NullSurface, RecordingSurface, Surface};
