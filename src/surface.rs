//! Drawing target for effects.
//!
//! Effects render through [`Surface`] so the same code paints a real
//! `CanvasRenderingContext2d` in the browser and a [`RecordingSurface`] in
//! host tests.

use glam::Vec2;
use serde::Deserialize;

/// RGBA colour with straight alpha in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// CSS `rgba(...)` string for the canvas API.
    pub fn css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

pub trait Surface {
    /// Current backing size in CSS pixels.
    fn size(&self) -> Vec2;
    fn clear(&mut self);
    /// Fill the whole surface, used for fading trails instead of a hard clear.
    fn fill_rect(&mut self, color: Rgba);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);
    /// Radial-gradient disc drawn with additive blending.
    fn glow_circle(&mut self, center: Vec2, radius: f32, color: Rgba);
    fn stroke_path(&mut self, points: &[Vec2], closed: bool, color: Rgba, width: f32);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Rgba, width: f32);
    fn fill_text(&mut self, text: &str, at: Vec2, color: Rgba, font: &str);
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear,
    FillRect(Rgba),
    FillCircle { center: Vec2, radius: f32, color: Rgba },
    GlowCircle { center: Vec2, radius: f32, color: Rgba },
    StrokePath { points: Vec<Vec2>, closed: bool, color: Rgba },
    StrokeCircle { center: Vec2, radius: f32, color: Rgba },
    FillText { text: String, at: Vec2, color: Rgba },
}

/// In-memory surface that records every call.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub width: f32,
    pub height: f32,
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height, ops: Vec::new() }
    }

    /// Drop everything recorded so far.
    pub fn reset(&mut self) {
        self.ops.clear();
    }

    /// Number of primitives drawn after the last clear.
    pub fn primitives(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| !matches!(op, DrawOp::Clear | DrawOp::FillRect(_)))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn fill_rect(&mut self, color: Rgba) {
        self.ops.push(DrawOp::FillRect(color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.ops.push(DrawOp::FillCircle { center, radius, color });
    }

    fn glow_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.ops.push(DrawOp::GlowCircle { center, radius, color });
    }

    fn stroke_path(&mut self, points: &[Vec2], closed: bool, color: Rgba, _width: f32) {
        self.ops.push(DrawOp::StrokePath { points: points.to_vec(), closed, color });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Rgba, _width: f32) {
        self.ops.push(DrawOp::StrokeCircle { center, radius, color });
    }

    fn fill_text(&mut self, text: &str, at: Vec2, color: Rgba, _font: &str) {
        self.ops.push(DrawOp::FillText { text: text.to_owned(), at, color });
    }
}
