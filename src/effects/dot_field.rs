use glam::Vec2;

use super::{grid, Effect, FxRng};
use crate::config::DotFieldConfig;
use crate::falloff::{direction, ease_vec, linear_falloff};
use crate::input::{Binding, EventKind, InputEvent, InputState, Target};
use crate::surface::Surface;

const BINDINGS: &[Binding] = &[
    Binding::new(Target::Window, EventKind::Resize),
    Binding::new(Target::Window, EventKind::MouseMove),
    Binding::new(Target::Document, EventKind::MouseLeave),
    Binding::new(Target::Window, EventKind::TouchMove),
    Binding::new(Target::Window, EventKind::TouchEnd),
];

#[derive(Debug, Clone, Copy)]
struct Dot {
    pos: Vec2,
    rest: Vec2,
    /// Falloff at the last tick, drives opacity.
    force: f32,
}

/// Grid of dots pushed away from the pointer and eased back to rest.
pub struct DotField {
    config: DotFieldConfig,
    input: InputState,
    bounds: Vec2,
    dots: Vec<Dot>,
}

impl DotField {
    pub fn new(config: DotFieldConfig) -> Self {
        Self { config, input: InputState::new(true), bounds: Vec2::ZERO, dots: Vec::new() }
    }

    /// Offset from rest a dot at `pos` is pushed toward by a source at `source`.
    pub fn offset_target(&self, pos: Vec2, source: Vec2) -> Vec2 {
        let (dir, distance) = direction(pos, source);
        let force = linear_falloff(distance, self.config.radius);
        -dir * force * self.config.max_offset
    }
}

impl Effect for DotField {
    fn name(&self) -> &'static str {
        "dot-field"
    }

    fn bindings(&self) -> &'static [Binding] {
        BINDINGS
    }

    fn resize(&mut self, bounds: Vec2, _rng: &mut FxRng) {
        self.bounds = bounds;
        self.dots = grid(bounds, self.config.spacing, false, self.config.max_dots)
            .into_iter()
            .map(|p| Dot { pos: p, rest: p, force: 0.0 })
            .collect();
    }

    fn input(&mut self, event: &InputEvent) {
        self.input.apply(event);
    }

    fn tick(&mut self, _dt_ms: f32, _rng: &mut FxRng) {
        self.input.tick();
        let source = self.input.point();
        let k = self.config.easing;
        let (radius, max_offset) = (self.config.radius, self.config.max_offset);
        let upper = self.bounds.max(Vec2::ZERO);
        for dot in &mut self.dots {
            let (offset, force) = match source {
                Some(source) => {
                    let (dir, distance) = direction(dot.pos, source);
                    let force = linear_falloff(distance, radius);
                    (-dir * force * max_offset, force)
                }
                None => (Vec2::ZERO, 0.0),
            };
            let target = (dot.rest + offset).clamp(Vec2::ZERO, upper);
            dot.pos = ease_vec(dot.pos, target, k);
            dot.force = force;
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        surface.clear();
        let base = self.config.color;
        for dot in &self.dots {
            let alpha = base.a + (1.0 - base.a) * dot.force;
            surface.fill_circle(dot.pos, self.config.dot_size, base.with_alpha(alpha));
        }
    }

    fn bounds(&self) -> Vec2 {
        self.bounds
    }

    fn positions(&self) -> Vec<Vec2> {
        self.dots.iter().map(|d| d.pos).collect()
    }

    fn len(&self) -> usize {
        self.dots.len()
    }
}
