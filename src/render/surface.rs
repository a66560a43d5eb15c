//! Immediate-mode drawing target for the scene graph.
//!
//! All coordinates are logical pixels; implementations apply the device
//! pixel ratio themselves.

use super::sprites::Sprite;
use crate::types::{Rect, Size};

/// Drawing primitives consumed by scene nodes.
pub trait Surface {
    /// Logical size of the drawable area.
    fn size(&self) -> Size;

    /// Device pixels per logical pixel.
    fn dpr(&self) -> f32;

    fn save(&mut self);
    fn restore(&mut self);
    fn clip_rect(&mut self, rect: Rect);

    fn fill_rect(&mut self, rect: Rect, color: &str);
    fn stroke_rect(&mut self, rect: Rect, color: &str, line_width: f32);
    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: &str, line_width: f32);
    fn fill_polygon(&mut self, points: &[(f32, f32)], color: &str);

    /// Draw `text` with its left edge at `x` and vertically centred on `y`.
    fn fill_text(&mut self, text: &str, x: f32, y: f32, font: &str, color: &str);

    /// Uncached width of `text` in `font`.
    fn measure_text(&mut self, text: &str, font: &str) -> f32;

    fn draw_sprite(&mut self, sprite: &Sprite, rect: Rect);
}

/// A surface with no backing context. Every call is a no-op and text
/// measures as zero width.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface {
    pub size: Size,
}

impl NullSurface {
    pub fn new(size: Size) -> Self {
        Self { size }
    }
}

impl Surface for NullSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn dpr(&self) -> f32 {
        1.0
    }

    fn save(&mut self) {}
    fn restore(&mut self) {}
    fn clip_rect(&mut self, _rect: Rect) {}
    fn fill_rect(&mut self, _rect: Rect, _color: &str) {}
    fn stroke_rect(&mut self, _rect: Rect, _color: &str, _line_width: f32) {}
    fn line(&mut self, _from: (f32, f32), _to: (f32, f32), _color: &str, _line_width: f32) {}
    fn fill_polygon(&mut self, _points: &[(f32, f32)], _color: &str) {}
    fn fill_text(&mut self, _text: &str, _x: f32, _y: f32, _font: &str, _color: &str) {}

    fn measure_text(&mut self, _text: &str, _font: &str) -> f32 {
        0.0
    }

    fn draw_sprite(&mut self, _sprite: &Sprite, _rect: Rect) {}
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Save,
    Restore,
    Clip(Rect),
    FillRect { rect: Rect, color: String },
    StrokeRect { rect: Rect, color: String },
    Line { from: (f32, f32), to: (f32, f32), color: String },
    Polygon { points: Vec<(f32, f32)>, color: String },
    Text { text: String, x: f32, y: f32, color: String },
    Sprite { rect: Rect },
}

/// Records draw calls instead of rasterising them. Text measures at a fixed
/// advance per character so layout is deterministic off-browser.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pub size: Size,
    pub dpr: f32,
    pub char_width: f32,
    pub commands: Vec<DrawCommand>,
    /// Number of `measure_text` calls, for cache tests.
    pub measure_calls: usize,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Size::new(width, height),
            dpr: 1.0,
            char_width: 7.0,
            commands: Vec::new(),
            measure_calls: 0,
        }
    }

    #[must_use]
    pub fn with_dpr(mut self, dpr: f32) -> Self {
        self.dpr = dpr;
        self
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Text drawn since the last clear, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn fills(&self) -> Vec<(Rect, &str)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillRect { rect, color } => Some((*rect, color.as_str())),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn dpr(&self) -> f32 {
        self.dpr
    }

    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::Clip(rect));
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        self.commands.push(DrawCommand::FillRect {
            rect,
            color: color.to_string(),
        });
    }

    fn stroke_rect(&mut self, rect: Rect, color: &str, _line_width: f32) {
        self.commands.push(DrawCommand::StrokeRect {
            rect,
            color: color.to_string(),
        });
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: &str, _line_width: f32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color: color.to_string(),
        });
    }

    fn fill_polygon(&mut self, points: &[(f32, f32)], color: &str) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            color: color.to_string(),
        });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, _font: &str, color: &str) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            color: color.to_string(),
        });
    }

    #[allow(clippy::cast_precision_loss)]
    fn measure_text(&mut self, text: &str, _font: &str) -> f32 {
        self.measure_calls += 1;
        text.chars().count() as f32 * self.char_width
    }

    fn draw_sprite(&mut self, _sprite: &Sprite, rect: Rect) {
        self.commands.push(DrawCommand::Sprite { rect });
    }
}

/// Crisp pixel position for 1px lines
pub fn crisp(x: f32) -> f32 {
    x.floor() + 0.5
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_measures_fixed_advance() {
        let mut s = RecordingSurface::new(100.0, 50.0);
        assert_eq!(s.measure_text("abcd", "12px x"), 28.0);
        assert_eq!(s.measure_calls, 1);
    }

    #[test]
    fn test_null_surface_is_silent() {
        let mut s = NullSurface::new(Size::new(10.0, 10.0));
        s.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), "#000");
        assert_eq!(s.measure_text("abc", "12px x"), 0.0);
    }
}
