//! CSS color parsing and the blend math used for hover/selection shading.

/// A CSS color string (e.g., "#FF0000", "rgba(255, 0, 0, 0.5)")
pub type CssColor = String;

/// RGBA color with u8 channels and a unit alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parse `#RGB`, `#RRGGBB`, `#RRGGBBAA`, `rgb(r, g, b)` or
    /// `rgba(r, g, b, a)`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            Self::from_hex(hex)
        } else if let Some(inner) = s.strip_prefix("rgba(").and_then(|r| r.strip_suffix(')')) {
            Self::from_channels(inner, true)
        } else if let Some(inner) = s.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
            Self::from_channels(inner, false)
        } else {
            None
        }
    }

    fn from_hex(hex: &str) -> Option<Self> {
        let channel = |range: std::ops::Range<usize>| -> Option<u8> {
            u8::from_str_radix(hex.get(range)?, 16).ok()
        };
        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (slot, i) in out.iter_mut().zip(0..3) {
                    let v = channel(i..i + 1)?;
                    *slot = v * 17;
                }
                let [r, g, b] = out;
                Some(Self::new(r, g, b))
            }
            6 => Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => {
                let a = f32::from(channel(6..8)?) / 255.0;
                Some(Self {
                    a,
                    ..Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?)
                })
            }
            _ => None,
        }
    }

    fn from_channels(inner: &str, with_alpha: bool) -> Option<Self> {
        let mut parts = inner.split(',').map(str::trim);
        let r: u8 = parts.next()?.parse().ok()?;
        let g: u8 = parts.next()?.parse().ok()?;
        let b: u8 = parts.next()?.parse().ok()?;
        let a: f32 = if with_alpha {
            parts.next()?.parse().ok()?
        } else {
            1.0
        };
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            r,
            g,
            b,
            a: a.clamp(0.0, 1.0),
        })
    }

    /// `#RRGGBB` when opaque, `rgba(...)` otherwise.
    pub fn to_css(self) -> CssColor {
        if self.a >= 1.0 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {:.2})", self.r, self.g, self.b, self.a)
        }
    }

    /// Blend toward white. Factor of 0.0 = no change, 1.0 = pure white.
    #[must_use]
    pub fn lighten(self, factor: f32) -> Self {
        self.blend(255, factor)
    }

    /// Blend toward black. Factor of 0.0 = no change, 1.0 = pure black.
    #[must_use]
    pub fn darken(self, factor: f32) -> Self {
        self.blend(0, factor)
    }

    fn blend(self, to: u8, factor: f32) -> Self {
        Self {
            r: blend_channel(self.r, to, factor),
            g: blend_channel(self.g, to, factor),
            b: blend_channel(self.b, to, factor),
            a: self.a,
        }
    }

    /// Relative luminance (0.0 to 1.0), simplified 0.299/0.587/0.114 weights.
    pub fn luminance(self) -> f32 {
        (0.299 * f32::from(self.r) + 0.587 * f32::from(self.g) + 0.114 * f32::from(self.b)) / 255.0
    }

    pub fn is_light(self) -> bool {
        self.luminance() > 0.5
    }
}

/// The cast is safe because the value is clamped to [0, 255] first.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend_channel(from: u8, to: u8, factor: f32) -> u8 {
    let from = f32::from(from);
    let to = f32::from(to);
    let blended = from + (to - from) * factor.clamp(0.0, 1.0);
    blended.clamp(0.0, 255.0).round() as u8
}

/// Lighten a CSS color string; unparseable input is returned unchanged.
pub fn lighten_css(color: &str, factor: f32) -> CssColor {
    Rgba::parse(color).map_or_else(|| color.to_string(), |c| c.lighten(factor).to_css())
}

/// Fixed colors not covered by the theme.
pub mod palette {
    pub const WHITE: &str = "#FFFFFF";
    pub const BLACK: &str = "#000000";
    /// Outline drawn around every node when debug bounds are on.
    pub const DEBUG_BOUNDS: &str = "rgba(255, 0, 0, 0.6)";
    /// Insertion marker while reordering columns.
    pub const DROP_MARKER: &str = "#1A73E8";
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(Rgba::parse("#FF8040"), Some(Rgba::new(255, 128, 64)));
        assert_eq!(Rgba::parse("#f00"), Some(Rgba::new(255, 0, 0)));
        assert_eq!(Rgba::parse("rgb(1, 2, 3)"), Some(Rgba::new(1, 2, 3)));
        let c = Rgba::parse("rgba(1, 2, 3, 0.5)").unwrap();
        assert_eq!(c.a, 0.5);
        assert_eq!(Rgba::parse("blue"), None);
        assert_eq!(Rgba::parse("#12345"), None);
    }

    #[test]
    fn test_lighten() {
        assert_eq!(Rgba::new(0, 0, 0).lighten(1.0), Rgba::new(255, 255, 255));
        assert_eq!(Rgba::new(100, 100, 100).lighten(0.0), Rgba::new(100, 100, 100));
        assert_eq!(lighten_css("#000000", 0.5), "#808080");
        assert_eq!(lighten_css("transparent", 0.5), "transparent");
    }

    #[test]
    fn test_to_css_alpha() {
        let c = Rgba::parse("#FF000080").unwrap();
        assert!(c.to_css().starts_with("rgba(255, 0, 0,"));
    }
}
