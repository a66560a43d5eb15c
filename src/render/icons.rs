//! Built-in vector icons, drawn as filled polygons in a 16x16 design box.

use std::collections::HashMap;

use super::surface::Surface;
use crate::types::Rect;

/// Side of the square design box icon points are expressed in.
pub const ICON_BOX: f32 = 16.0;

pub mod names {
    pub const GRIP: &str = "grip";
    pub const SORT_ASC: &str = "sort-asc";
    pub const SORT_DESC: &str = "sort-desc";
    pub const SORT_NONE: &str = "sort-none";
    pub const CHEVRON_RIGHT: &str = "chevron-right";
    pub const CHEVRON_DOWN: &str = "chevron-down";
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IconShape {
    pub polygons: Vec<Vec<(f32, f32)>>,
}

impl IconShape {
    fn square(x: f32, y: f32, side: f32) -> Vec<(f32, f32)> {
        vec![(x, y), (x + side, y), (x + side, y + side), (x, y + side)]
    }

    /// Draw scaled to fit `rect`, centred.
    pub fn paint(&self, surface: &mut dyn Surface, rect: Rect, color: &str) {
        let scale = rect.w.min(rect.h) / ICON_BOX;
        let ox = rect.x + (rect.w - ICON_BOX * scale) / 2.0;
        let oy = rect.y + (rect.h - ICON_BOX * scale) / 2.0;
        let mut scratch = Vec::new();
        for polygon in &self.polygons {
            scratch.clear();
            scratch.extend(polygon.iter().map(|&(x, y)| (ox + x * scale, oy + y * scale)));
            surface.fill_polygon(&scratch, color);
        }
    }
}

/// Named icon shapes. Header content naming an icon not in the set is
/// treated as an image source instead.
#[derive(Debug, Clone, Default)]
pub struct IconSet {
    icons: HashMap<String, IconShape>,
}

impl IconSet {
    pub fn builtin() -> Self {
        let mut set = Self::default();

        let mut grip = Vec::new();
        for row in 0..3u8 {
            for col in 0..2u8 {
                grip.push(IconShape::square(
                    5.0 + f32::from(col) * 4.0,
                    3.0 + f32::from(row) * 4.0,
                    2.0,
                ));
            }
        }
        set.insert(names::GRIP, IconShape { polygons: grip });

        let up = vec![(8.0, 4.0), (12.0, 9.0), (4.0, 9.0)];
        let down = vec![(4.0, 7.0), (12.0, 7.0), (8.0, 12.0)];
        set.insert(
            names::SORT_ASC,
            IconShape {
                polygons: vec![up],
            },
        );
        set.insert(
            names::SORT_DESC,
            IconShape {
                polygons: vec![down],
            },
        );
        set.insert(
            names::SORT_NONE,
            IconShape {
                polygons: vec![
                    vec![(8.0, 2.0), (11.0, 6.0), (5.0, 6.0)],
                    vec![(5.0, 10.0), (11.0, 10.0), (8.0, 14.0)],
                ],
            },
        );
        set.insert(
            names::CHEVRON_RIGHT,
            IconShape {
                polygons: vec![vec![(6.0, 4.0), (11.0, 8.0), (6.0, 12.0)]],
            },
        );
        set.insert(
            names::CHEVRON_DOWN,
            IconShape {
                polygons: vec![vec![(4.0, 6.0), (12.0, 6.0), (8.0, 11.0)]],
            },
        );
        set
    }

    pub fn insert(&mut self, name: &str, shape: IconShape) {
        self.icons.insert(name.to_string(), shape);
    }

    pub fn get(&self, name: &str) -> Option<&IconShape> {
        self.icons.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.icons.contains_key(name)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::render::{DrawCommand, RecordingSurface};

    #[test]
    fn test_builtin_names() {
        let set = IconSet::builtin();
        for name in [
            names::GRIP,
            names::SORT_ASC,
            names::SORT_DESC,
            names::SORT_NONE,
            names::CHEVRON_RIGHT,
            names::CHEVRON_DOWN,
        ] {
            assert!(set.contains(name), "{name}");
        }
        assert_eq!(set.get(names::GRIP).unwrap().polygons.len(), 6);
    }

    #[test]
    fn test_paint_scales_into_rect() {
        let set = IconSet::builtin();
        let mut surface = RecordingSurface::new(100.0, 100.0);
        set.get(names::SORT_ASC)
            .unwrap()
            .paint(&mut surface, Rect::new(10.0, 20.0, 32.0, 32.0), "#000");
        let DrawCommand::Polygon { points, .. } = &surface.commands[0] else {
            panic!("expected polygon");
        };
        assert_eq!(points[0], (26.0, 28.0));
    }
}
