//! Canvas 2D surface.
//!
//! When the canvas yields no 2d context every drawing call is a no-op and
//! text measures as zero width.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::sprites::Sprite;
use super::surface::{crisp, Surface};
use crate::types::{Rect, Size};

pub struct Canvas2dSurface {
    canvas: HtmlCanvasElement,
    ctx: Option<CanvasRenderingContext2d>,
    dpr: f32,
}

impl Canvas2dSurface {
    pub fn new(canvas: HtmlCanvasElement, dpr: f32) -> Self {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok());
        if ctx.is_none() {
            tracing::warn!("canvas has no 2d context; drawing disabled");
        }
        Self {
            canvas,
            ctx,
            dpr: if dpr > 0.0 { dpr } else { 1.0 },
        }
    }

    pub fn has_context(&self) -> bool {
        self.ctx.is_some()
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Resize the backing store to `css_w x css_h` logical pixels.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn resize(&mut self, css_w: f32, css_h: f32, dpr: f32) {
        self.dpr = if dpr > 0.0 { dpr } else { 1.0 };
        self.canvas.set_width((css_w * self.dpr).round().max(0.0) as u32);
        self.canvas.set_height((css_h * self.dpr).round().max(0.0) as u32);
        let style = self.canvas.style();
        let _ = style.set_property("width", &format!("{css_w}px"));
        let _ = style.set_property("height", &format!("{css_h}px"));
    }

    /// Reset the transform to the device scale and clear the canvas.
    pub fn begin_frame(&self) {
        let Some(ctx) = &self.ctx else {
            return;
        };
        let dpr = f64::from(self.dpr);
        let _ = ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
        let size = self.size();
        ctx.clear_rect(0.0, 0.0, f64::from(size.width), f64::from(size.height));
    }
}

impl Surface for Canvas2dSurface {
    #[allow(clippy::cast_precision_loss)]
    fn size(&self) -> Size {
        Size::new(
            self.canvas.width() as f32 / self.dpr,
            self.canvas.height() as f32 / self.dpr,
        )
    }

    fn dpr(&self) -> f32 {
        self.dpr
    }

    fn save(&mut self) {
        if let Some(ctx) = &self.ctx {
            ctx.save();
        }
    }

    fn restore(&mut self) {
        if let Some(ctx) = &self.ctx {
            ctx.restore();
        }
    }

    fn clip_rect(&mut self, rect: Rect) {
        if let Some(ctx) = &self.ctx {
            ctx.begin_path();
            ctx.rect(
                f64::from(rect.x),
                f64::from(rect.y),
                f64::from(rect.w),
                f64::from(rect.h),
            );
            ctx.clip();
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        if let Some(ctx) = &self.ctx {
            ctx.set_fill_style_str(color);
            ctx.fill_rect(
                f64::from(rect.x),
                f64::from(rect.y),
                f64::from(rect.w),
                f64::from(rect.h),
            );
        }
    }

    fn stroke_rect(&mut self, rect: Rect, color: &str, line_width: f32) {
        if let Some(ctx) = &self.ctx {
            ctx.set_stroke_style_str(color);
            ctx.set_line_width(f64::from(line_width));
            ctx.stroke_rect(
                f64::from(crisp(rect.x)),
                f64::from(crisp(rect.y)),
                f64::from(rect.w - 1.0).max(0.0),
                f64::from(rect.h - 1.0).max(0.0),
            );
        }
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: &str, line_width: f32) {
        if let Some(ctx) = &self.ctx {
            ctx.begin_path();
            ctx.set_stroke_style_str(color);
            ctx.set_line_width(f64::from(line_width));
            ctx.move_to(f64::from(crisp(from.0)), f64::from(crisp(from.1)));
            ctx.line_to(f64::from(crisp(to.0)), f64::from(crisp(to.1)));
            ctx.stroke();
        }
    }

    fn fill_polygon(&mut self, points: &[(f32, f32)], color: &str) {
        let (Some(ctx), Some((&first, rest))) = (&self.ctx, points.split_first()) else {
            return;
        };
        ctx.begin_path();
        ctx.move_to(f64::from(first.0), f64::from(first.1));
        for &(x, y) in rest {
            ctx.line_to(f64::from(x), f64::from(y));
        }
        ctx.close_path();
        ctx.set_fill_style_str(color);
        ctx.fill();
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, font: &str, color: &str) {
        if let Some(ctx) = &self.ctx {
            ctx.set_font(font);
            ctx.set_text_baseline("middle");
            ctx.set_fill_style_str(color);
            let _ = ctx.fill_text(text, f64::from(x), f64::from(y));
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn measure_text(&mut self, text: &str, font: &str) -> f32 {
        let Some(ctx) = &self.ctx else {
            return 0.0;
        };
        ctx.set_font(font);
        ctx.measure_text(text).map(|m| m.width() as f32).unwrap_or(0.0)
    }

    fn draw_sprite(&mut self, sprite: &Sprite, rect: Rect) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                &sprite.image,
                f64::from(rect.x),
                f64::from(rect.y),
                f64::from(rect.w),
                f64::from(rect.h),
            );
        }
    }
}
