use glam::Vec2;
use rand::Rng;

use super::{Effect, FxRng};
use crate::config::GravityConfig;
use crate::input::{Binding, EventKind, InputEvent, InputState, InputVector, Target};
use crate::surface::{Rgba, Surface};

const BINDINGS: &[Binding] = &[
    Binding::new(Target::Window, EventKind::Resize),
    Binding::new(Target::Window, EventKind::MouseMove),
    Binding::new(Target::Window, EventKind::TouchMove),
    Binding::new(Target::Window, EventKind::TouchEnd),
    Binding::new(Target::Window, EventKind::DeviceOrientation),
];

#[derive(Debug, Clone, Copy)]
struct Ball {
    pos: Vec2,
    vel: Vec2,
    size: f32,
    color: Rgba,
}

/// A few balls falling under a gravity vector steered by tilt, touch or pointer.
pub struct GravityField {
    config: GravityConfig,
    input: InputState,
    bounds: Vec2,
    gravity: Vec2,
    balls: Vec<Ball>,
}

impl GravityField {
    pub fn new(config: GravityConfig, pointer_available: bool) -> Self {
        let gravity = Vec2::from_array(config.gravity);
        Self { config, input: InputState::new(pointer_available), bounds: Vec2::ZERO, gravity, balls: Vec::new() }
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    /// Gravity implied by the current input, or `None` to keep the last one.
    fn steer(&self) -> Option<Vec2> {
        match self.input.vector() {
            InputVector::Tilt(tilt) => {
                Some((tilt / self.config.tilt_divisor).clamp(Vec2::NEG_ONE, Vec2::ONE))
            }
            InputVector::Point(point) => {
                let half = (self.bounds / 2.0).max(Vec2::ONE);
                let scale = if self.input.touch().is_some() {
                    self.config.touch_scale
                } else {
                    self.config.pointer_scale
                };
                Some((point - half) / half * scale)
            }
            InputVector::None => None,
        }
    }
}

impl Effect for GravityField {
    fn name(&self) -> &'static str {
        "gravity"
    }

    fn bindings(&self) -> &'static [Binding] {
        BINDINGS
    }

    fn resize(&mut self, bounds: Vec2, rng: &mut FxRng) {
        self.bounds = bounds;
        if bounds.x <= 0.0 || bounds.y <= 0.0 {
            self.balls.clear();
            return;
        }
        let c = &self.config;
        self.balls = (0..c.count)
            .map(|_| {
                let size = rng.gen_range(c.min_size..=c.max_size);
                let r = size / 2.0;
                let lo = Vec2::splat(r).min(bounds / 2.0);
                let hi = (bounds - r).max(lo);
                Ball {
                    pos: Vec2::new(rng.gen_range(lo.x..=hi.x), rng.gen_range(lo.y..=hi.y)),
                    vel: Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0)),
                    size,
                    color: c.palette[rng.gen_range(0..c.palette.len())],
                }
            })
            .collect();
    }

    fn input(&mut self, event: &InputEvent) {
        self.input.apply(event);
    }

    fn tick(&mut self, _dt_ms: f32, _rng: &mut FxRng) {
        self.input.tick();
        if let Some(gravity) = self.steer() {
            self.gravity = gravity;
        }
        let (gravity, bounds) = (self.gravity, self.bounds);
        let (friction, restitution) = (self.config.friction, self.config.restitution);
        for ball in &mut self.balls {
            ball.vel = (ball.vel + gravity) * friction;
            ball.pos += ball.vel;

            let r = ball.size / 2.0;
            let lo = Vec2::splat(r).min(bounds / 2.0);
            let hi = (bounds - r).max(lo);
            if ball.pos.x <= lo.x || ball.pos.x >= hi.x {
                ball.vel.x *= -restitution;
                ball.pos.x = ball.pos.x.clamp(lo.x, hi.x);
            }
            if ball.pos.y <= lo.y || ball.pos.y >= hi.y {
                ball.vel.y *= -restitution;
                ball.pos.y = ball.pos.y.clamp(lo.y, hi.y);
            }
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        surface.clear();
        for ball in &self.balls {
            surface.glow_circle(ball.pos, ball.size, ball.color.with_alpha(ball.color.a * 0.25));
            surface.fill_circle(ball.pos, ball.size / 2.0, ball.color);
        }
    }

    fn bounds(&self) -> Vec2 {
        self.bounds
    }

    fn positions(&self) -> Vec<Vec2> {
        self.balls.iter().map(|b| b.pos).collect()
    }

    fn len(&self) -> usize {
        self.balls.len()
    }
}
