use glam::Vec2;
use rand::Rng;

use super::{Effect, FxRng};
use crate::config::TrailConfig;
use crate::input::{Binding, EventKind, InputEvent, Target};
use crate::surface::Surface;

const BINDINGS: &[Binding] = &[
    Binding::new(Target::Window, EventKind::Resize),
    Binding::new(Target::Window, EventKind::MouseMove),
    Binding::new(Target::Window, EventKind::TouchMove),
    Binding::new(Target::Document, EventKind::MouseLeave),
    Binding::new(Target::Document, EventKind::TouchEnd),
];

#[derive(Debug, Clone, Copy)]
struct Spark {
    pos: Vec2,
    vel: Vec2,
    size: f32,
    alpha: f32,
    life: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Mouse,
    Touch,
}

/// Glowing sparks shed along the pointer path, fading out by age.
pub struct MagicTrail {
    config: TrailConfig,
    bounds: Vec2,
    sparks: Vec<Spark>,
    /// Latest pointer sample not yet turned into sparks.
    pending: Option<(Vec2, Source)>,
    last: Option<Vec2>,
    since_emit_ms: f32,
    active: bool,
}

impl MagicTrail {
    pub fn new(config: TrailConfig) -> Self {
        Self {
            config,
            bounds: Vec2::ZERO,
            sparks: Vec::new(),
            pending: None,
            last: None,
            since_emit_ms: f32::INFINITY,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn emit(&mut self, at: Vec2, amount: usize, rng: &mut FxRng) {
        let drag = match self.last {
            Some(last) => (at - last) * self.config.inherit,
            None => Vec2::ZERO,
        };
        let upper = self.bounds.max(Vec2::ZERO);
        for _ in 0..amount {
            let jitter = Vec2::new(rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0));
            let wobble = Vec2::new(rng.gen_range(-0.2..0.2), rng.gen_range(-0.2..0.2));
            self.sparks.push(Spark {
                pos: (at + jitter).clamp(Vec2::ZERO, upper),
                vel: drag * rng.gen_range(0.5..1.0) + wobble,
                size: rng.gen_range(2.0..5.0),
                alpha: rng.gen_range(0.1..0.4),
                life: rng.gen_range(self.config.min_life..=self.config.max_life),
            });
        }
        let overflow = self.sparks.len().saturating_sub(self.config.max_particles);
        if overflow > 0 {
            self.sparks.drain(..overflow);
        }
    }
}

impl Effect for MagicTrail {
    fn name(&self) -> &'static str {
        "magic-trail"
    }

    fn bindings(&self) -> &'static [Binding] {
        BINDINGS
    }

    fn resize(&mut self, bounds: Vec2, _rng: &mut FxRng) {
        self.bounds = bounds;
        self.sparks.clear();
        self.pending = None;
        self.last = None;
    }

    fn input(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerMove { x, y } => {
                self.active = true;
                self.pending = Some((Vec2::new(x, y), Source::Mouse));
            }
            InputEvent::TouchMove { x, y } => {
                self.active = true;
                self.pending = Some((Vec2::new(x, y), Source::Touch));
            }
            InputEvent::PointerLeave | InputEvent::TouchEnd => {
                self.active = false;
                self.pending = None;
                self.last = None;
            }
            _ => {}
        }
    }

    fn tick(&mut self, dt_ms: f32, rng: &mut FxRng) {
        self.since_emit_ms += dt_ms;
        if let Some((at, source)) = self.pending {
            let (interval, burst) = match source {
                Source::Mouse => (self.config.mouse_interval_ms, self.config.mouse_burst),
                Source::Touch => (self.config.touch_interval_ms, self.config.touch_burst),
            };
            if self.since_emit_ms > interval {
                self.emit(at, burst, rng);
                self.since_emit_ms = 0.0;
                self.last = Some(at);
                self.pending = None;
            }
        }

        let decay = self.config.alpha_decay;
        let bounds = self.bounds;
        self.sparks.retain_mut(|s| {
            s.pos += s.vel;
            s.life -= 1.0;
            s.alpha *= decay;
            let inside = s.pos.x >= 0.0 && s.pos.y >= 0.0 && s.pos.x <= bounds.x && s.pos.y <= bounds.y;
            s.life > 0.0 && s.alpha >= 0.01 && inside
        });

        if !self.active
            && self.sparks.len() < self.config.ambient_cap
            && rng.gen::<f32>() < self.config.ambient_chance
        {
            let at = Vec2::new(rng.gen::<f32>() * bounds.x, rng.gen::<f32>() * bounds.y);
            let last = self.last.take();
            self.emit(at, 1, rng);
            self.last = last;
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        surface.fill_rect(self.config.fade);
        for spark in &self.sparks {
            surface.glow_circle(spark.pos, spark.size * 2.0, self.config.color.with_alpha(spark.alpha));
        }
    }

    fn bounds(&self) -> Vec2 {
        self.bounds
    }

    fn positions(&self) -> Vec<Vec2> {
        self.sparks.iter().map(|s| s.pos).collect()
    }

    fn len(&self) -> usize {
        self.sparks.len()
    }
}
