use crate::render::{CacheManager, IconSet, Surface};

/// Everything a node needs to measure and draw itself during one pass.
pub struct PaintContext<'a> {
    pub surface: &'a mut dyn Surface,
    pub caches: &'a mut CacheManager,
    pub icons: &'a IconSet,
    /// Outline every node's bounds.
    pub debug_bounds: bool,
}

impl<'a> PaintContext<'a> {
    pub fn new(surface: &'a mut dyn Surface, caches: &'a mut CacheManager, icons: &'a IconSet) -> Self {
        Self {
            surface,
            caches,
            icons,
            debug_bounds: false,
        }
    }

    /// Text width through the metrics cache.
    pub fn measure_text(&mut self, text: &str, font: &str) -> f32 {
        let surface = &mut *self.surface;
        self.caches
            .text
            .width_with(font, text, || surface.measure_text(text, font))
    }
}
