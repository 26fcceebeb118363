use std::f32::consts::{FRAC_PI_3, TAU};

use glam::Vec2;
use rand::Rng;

use super::{Effect, FxRng};
use crate::config::GeometricConfig;
use crate::falloff::ease_vec;
use crate::input::{Binding, EventKind, InputEvent, InputMode, InputState, Target};
use crate::surface::{Rgba, Surface};

const BINDINGS: &[Binding] = &[
    Binding::new(Target::Window, EventKind::Resize),
    Binding::new(Target::Window, EventKind::MouseMove),
    Binding::new(Target::Document, EventKind::MouseLeave),
    Binding::new(Target::Window, EventKind::DeviceOrientation),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Triangle,
    Circle,
    Square,
    Diamond,
    Hexagon,
}

impl ShapeKind {
    const ALL: [ShapeKind; 5] =
        [ShapeKind::Triangle, ShapeKind::Circle, ShapeKind::Square, ShapeKind::Diamond, ShapeKind::Hexagon];

    /// Outline in local coordinates, unrotated, for a shape of `size`.
    /// Circles have no vertices.
    fn outline(self, size: f32) -> Vec<Vec2> {
        let h = size / 2.0;
        match self {
            ShapeKind::Triangle => vec![Vec2::new(0.0, -h), Vec2::new(-h, h), Vec2::new(h, h)],
            ShapeKind::Square => {
                vec![Vec2::new(-h, -h), Vec2::new(h, -h), Vec2::new(h, h), Vec2::new(-h, h)]
            }
            ShapeKind::Diamond => {
                vec![Vec2::new(0.0, -h), Vec2::new(h, 0.0), Vec2::new(0.0, h), Vec2::new(-h, 0.0)]
            }
            ShapeKind::Hexagon => (0..6)
                .map(|i| Vec2::from_angle(i as f32 * FRAC_PI_3) * h)
                .collect(),
            ShapeKind::Circle => Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct Shape {
    pos: Vec2,
    origin: Vec2,
    size: f32,
    rotation: f32,
    spin: f32,
    kind: ShapeKind,
    color: Rgba,
    opacity: f32,
    drift: Vec2,
    parallax: Vec2,
}

/// Hollow polygons drifting across the viewport with pointer or tilt parallax.
pub struct GeometricField {
    config: GeometricConfig,
    input: InputState,
    bounds: Vec2,
    shapes: Vec<Shape>,
}

impl GeometricField {
    pub fn new(config: GeometricConfig, pointer_available: bool) -> Self {
        Self { config, input: InputState::new(pointer_available), bounds: Vec2::ZERO, shapes: Vec::new() }
    }

    /// Shapes seeded for a viewport of `bounds`.
    pub fn shape_count(&self, bounds: Vec2) -> usize {
        let area = (bounds.x * bounds.y).max(0.0);
        ((area / self.config.area_per_shape).floor() as usize).min(self.config.max_shapes)
    }

    fn follows_tilt(&self) -> bool {
        self.input.mode() == InputMode::Tilt && self.bounds.x <= self.config.wide_breakpoint
    }

    /// Where a shape's parallax offset is heading this frame.
    fn parallax_target(&self, origin: Vec2) -> Vec2 {
        let center = self.bounds / 2.0;
        let max_distance = center.length().max(1.0);
        let strength = (origin.distance(center) / max_distance) * 0.5 + 0.2;

        if self.follows_tilt() {
            let clamp = self.config.tilt_clamp;
            let tilt = self.input.tilt().unwrap_or(Vec2::ZERO).clamp(Vec2::splat(-clamp), Vec2::splat(clamp));
            tilt * self.config.tilt_influence * strength
        } else {
            match self.input.pointer() {
                Some(pointer) => (pointer - center) * self.config.pointer_influence * strength,
                None => Vec2::ZERO,
            }
        }
    }

    pub fn kinds(&self) -> Vec<ShapeKind> {
        self.shapes.iter().map(|s| s.kind).collect()
    }
}

/// Wrap one axis once the shape is fully past an edge.
fn wrap(v: f32, size: f32, extent: f32) -> f32 {
    if v < -size {
        extent + size
    } else if v > extent + size {
        -size
    } else {
        v
    }
}

impl Effect for GeometricField {
    fn name(&self) -> &'static str {
        "geometric"
    }

    fn bindings(&self) -> &'static [Binding] {
        BINDINGS
    }

    fn resize(&mut self, bounds: Vec2, rng: &mut FxRng) {
        self.bounds = bounds;
        let count = self.shape_count(bounds);
        let c = &self.config;
        self.shapes = (0..count)
            .map(|_| {
                let pos = Vec2::new(rng.gen::<f32>() * bounds.x, rng.gen::<f32>() * bounds.y);
                Shape {
                    pos,
                    origin: pos,
                    size: rng.gen_range(c.min_size..=c.max_size),
                    rotation: rng.gen::<f32>() * TAU,
                    spin: rng.gen_range(-c.max_rotation_speed..=c.max_rotation_speed),
                    kind: ShapeKind::ALL[rng.gen_range(0..ShapeKind::ALL.len())],
                    color: c.palette[rng.gen_range(0..c.palette.len())],
                    opacity: rng.gen_range(0.2..0.5),
                    drift: Vec2::new(
                        rng.gen_range(-c.max_drift..=c.max_drift),
                        rng.gen_range(-c.max_drift..=c.max_drift),
                    ),
                    parallax: Vec2::ZERO,
                }
            })
            .collect();
    }

    fn input(&mut self, event: &InputEvent) {
        self.input.apply(event);
    }

    fn tick(&mut self, _dt_ms: f32, _rng: &mut FxRng) {
        self.input.tick();
        let targets: Vec<Vec2> = self.shapes.iter().map(|s| self.parallax_target(s.origin)).collect();
        let (w, h) = (self.bounds.x, self.bounds.y);
        let k = self.config.easing;
        for (shape, target) in self.shapes.iter_mut().zip(targets) {
            shape.pos += shape.drift;
            shape.rotation = (shape.rotation + shape.spin) % TAU;
            shape.pos.x = wrap(shape.pos.x, shape.size, w);
            shape.pos.y = wrap(shape.pos.y, shape.size, h);
            shape.parallax = ease_vec(shape.parallax, target, k);
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        surface.clear();
        for shape in &self.shapes {
            let at = shape.pos + shape.parallax;
            let color = shape.color.with_alpha(shape.color.a * shape.opacity);
            if shape.kind == ShapeKind::Circle {
                surface.stroke_circle(at, shape.size / 2.0, color, self.config.line_width);
                continue;
            }
            let rot = Vec2::from_angle(shape.rotation);
            let points: Vec<Vec2> = shape.kind.outline(shape.size).into_iter().map(|p| at + rot.rotate(p)).collect();
            surface.stroke_path(&points, true, color, self.config.line_width);
        }
    }

    fn bounds(&self) -> Vec2 {
        self.bounds
    }

    /// Drift positions; parallax is a render-time offset on top.
    fn positions(&self) -> Vec<Vec2> {
        self.shapes.iter().map(|s| s.pos).collect()
    }

    fn len(&self) -> usize {
        self.shapes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::OrientationPermission;
    use rand::SeedableRng;

    fn seeded(bounds: Vec2, pointer: bool) -> (GeometricField, FxRng) {
        let mut rng = FxRng::seed_from_u64(11);
        let mut field = GeometricField::new(GeometricConfig::default(), pointer);
        field.resize(bounds, &mut rng);
        (field, rng)
    }

    #[test]
    fn density_is_capped() {
        let field = GeometricField::new(GeometricConfig::default(), true);
        assert_eq!(field.shape_count(Vec2::new(500.0, 500.0)), 5);
        assert_eq!(field.shape_count(Vec2::new(3840.0, 2160.0)), 20);
        assert_eq!(field.shape_count(Vec2::ZERO), 0);
    }

    #[test]
    fn shapes_wrap_at_edges() {
        assert_eq!(wrap(-51.0, 50.0, 800.0), 850.0);
        assert_eq!(wrap(851.0, 50.0, 800.0), -50.0);
        assert_eq!(wrap(400.0, 50.0, 800.0), 400.0);
    }

    #[test]
    fn pointer_parallax_pulls_toward_pointer() {
        let (mut field, mut rng) = seeded(Vec2::new(1200.0, 800.0), true);
        field.input(&InputEvent::PointerMove { x: 1200.0, y: 400.0 });
        for _ in 0..60 {
            field.tick(16.0, &mut rng);
        }
        assert!(field.shapes.iter().all(|s| s.parallax.x > 0.0));
    }

    #[test]
    fn narrow_viewport_with_tilt_follows_tilt() {
        let (mut field, mut rng) = seeded(Vec2::new(400.0, 800.0), false);
        field.input(&InputEvent::Permission(OrientationPermission::Granted));
        field.input(&InputEvent::Orientation { gamma: -90.0, beta: 0.0 });
        field.tick(16.0, &mut rng);
        let target = field.parallax_target(Vec2::new(200.0, 400.0));
        // Centre shape: strength 0.2, gamma clamped to -30.
        assert!((target.x - (-30.0 * 8.0 * 0.2)).abs() < 1e-4);
        assert_eq!(target.y, 0.0);
    }

    #[test]
    fn hexagon_has_six_vertices() {
        assert_eq!(ShapeKind::Hexagon.outline(10.0).len(), 6);
        assert!(ShapeKind::Circle.outline(10.0).is_empty());
    }
}
