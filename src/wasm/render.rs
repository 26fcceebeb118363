use std::f64::consts::TAU;

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d as Ctx2d, HtmlCanvasElement};

use super::host::js_error;
use crate::error::{FxError, Result};
use crate::surface::{Rgba, Surface};

/// [`Surface`] backed by a canvas 2D context.
///
/// Drawing calls that throw are dropped; a half-drawn frame is preferable to
/// stopping the loop.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: Ctx2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let ctx: Ctx2d = canvas
            .get_context("2d")
            .map_err(js_error)?
            .ok_or(FxError::NoContext)?
            .dyn_into()
            .map_err(|_| FxError::NoContext)?;
        Ok(Self { canvas, ctx })
    }

    /// Match the backing store to the canvas' laid-out size.
    pub fn fit(&self) -> Vec2 {
        let rect = self.canvas.get_bounding_client_rect();
        let (w, h) = (rect.width().max(0.0), rect.height().max(0.0));
        self.canvas.set_width(w as u32);
        self.canvas.set_height(h as u32);
        Vec2::new(w as f32, h as f32)
    }

    fn circle(&self, center: Vec2, radius: f32) {
        self.ctx.begin_path();
        self.ctx
            .arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, TAU)
            .ok();
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> Vec2 {
        Vec2::new(self.canvas.width() as f32, self.canvas.height() as f32)
    }

    fn clear(&mut self) {
        let size = self.size();
        self.ctx.clear_rect(0.0, 0.0, size.x as f64, size.y as f64);
    }

    fn fill_rect(&mut self, color: Rgba) {
        let size = self.size();
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.fill_rect(0.0, 0.0, size.x as f64, size.y as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.circle(center, radius);
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.fill();
    }

    fn glow_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        let (x, y) = (center.x as f64, center.y as f64);
        let Ok(gradient) = self.ctx.create_radial_gradient(x, y, 0.0, x, y, radius.max(0.0) as f64) else {
            return;
        };
        gradient.add_color_stop(0.0, &color.css()).ok();
        gradient.add_color_stop(1.0, &color.with_alpha(0.0).css()).ok();
        self.ctx.set_global_composite_operation("lighter").ok();
        self.circle(center, radius);
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx.fill();
        self.ctx.set_global_composite_operation("source-over").ok();
    }

    fn stroke_path(&mut self, points: &[Vec2], closed: bool, color: Rgba, width: f32) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.ctx.begin_path();
        self.ctx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            self.ctx.line_to(p.x as f64, p.y as f64);
        }
        if closed {
            self.ctx.close_path();
        }
        self.ctx.set_stroke_style_str(&color.css());
        self.ctx.set_line_width(width as f64);
        self.ctx.stroke();
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Rgba, width: f32) {
        self.circle(center, radius);
        self.ctx.set_stroke_style_str(&color.css());
        self.ctx.set_line_width(width as f64);
        self.ctx.stroke();
    }

    fn fill_text(&mut self, text: &str, at: Vec2, color: Rgba, font: &str) {
        self.ctx.set_font(font);
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.fill_text(text, at.x as f64, at.y as f64).ok();
    }
}
