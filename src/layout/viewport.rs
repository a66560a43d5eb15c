//! Scroll offset and surface size in logical pixels.

use crate::types::Size;

/// Viewport state - represents the visible area of the grid
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Horizontal scroll position in content coordinates
    pub scroll_x: f32,
    /// Vertical scroll position in content coordinates
    pub scroll_y: f32,
    /// Logical width in CSS pixels
    pub width: f32,
    /// Logical height in CSS pixels
    pub height: f32,
    /// Device pixels per logical pixel
    pub dpr: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            width: 800.0,
            height: 600.0,
            dpr: 1.0,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Resize from device pixels.
    pub fn resize_device(&mut self, device_width: f32, device_height: f32, dpr: f32) {
        self.dpr = if dpr > 0.0 { dpr } else { 1.0 };
        self.width = device_width / self.dpr;
        self.height = device_height / self.dpr;
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Convert device coordinates to logical coordinates
    pub fn to_logical(&self, device_x: f32, device_y: f32) -> (f32, f32) {
        (device_x / self.dpr, device_y / self.dpr)
    }

    /// Clamp scroll so the viewport never runs past `content`.
    pub fn clamp_scroll(&mut self, content: Size) {
        let max_x = (content.width - self.width).max(0.0);
        let max_y = (content.height - self.height).max(0.0);
        self.scroll_x = self.scroll_x.clamp(0.0, max_x);
        self.scroll_y = self.scroll_y.clamp(0.0, max_y);
    }

    pub fn scroll_by(&mut self, delta_x: f32, delta_y: f32, content: Size) {
        self.scroll_x += delta_x;
        self.scroll_y += delta_y;
        self.clamp_scroll(content);
    }

    pub fn set_scroll(&mut self, x: f32, y: f32, content: Size) {
        self.scroll_x = x;
        self.scroll_y = y;
        self.clamp_scroll(content);
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_to_content() {
        let mut vp = Viewport::new();
        vp.resize(100.0, 50.0);
        vp.set_scroll(500.0, -10.0, Size::new(300.0, 40.0));
        assert_eq!(vp.scroll_x, 200.0);
        assert_eq!(vp.scroll_y, 0.0);
    }

    #[test]
    fn test_device_to_logical() {
        let mut vp = Viewport::new();
        vp.resize_device(400.0, 200.0, 2.0);
        assert_eq!(vp.size(), Size::new(200.0, 100.0));
        assert_eq!(vp.to_logical(40.0, 20.0), (20.0, 10.0));
    }
}
