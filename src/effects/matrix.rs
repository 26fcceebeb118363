use glam::Vec2;
use rand::Rng;

use super::{grid, Effect, FxRng};
use crate::config::MatrixConfig;
use crate::falloff::{linear_falloff, safe_distance};
use crate::input::{Binding, EventKind, InputEvent, InputState, Target};
use crate::surface::Surface;

const BINDINGS: &[Binding] = &[
    Binding::new(Target::Window, EventKind::Resize),
    Binding::new(Target::Element, EventKind::MouseMove),
    Binding::new(Target::Element, EventKind::MouseLeave),
];

#[derive(Debug, Clone, Copy)]
struct Glyph {
    pos: Vec2,
    home: Vec2,
    vel: Vec2,
    ch: char,
    /// Opacity used while no pointer is over the canvas.
    flicker: f32,
}

/// Character grid scattered by the pointer and pulled back home.
pub struct MatrixField {
    config: MatrixConfig,
    alphabet: Vec<char>,
    input: InputState,
    bounds: Vec2,
    glyphs: Vec<Glyph>,
}

impl MatrixField {
    pub fn new(config: MatrixConfig) -> Self {
        let alphabet = config.glyphs.chars().collect();
        Self { config, alphabet, input: InputState::new(true), bounds: Vec2::ZERO, glyphs: Vec::new() }
    }

    fn pick(&self, rng: &mut FxRng) -> char {
        self.alphabet[rng.gen_range(0..self.alphabet.len())]
    }

    pub fn text(&self) -> String {
        self.glyphs.iter().map(|g| g.ch).collect()
    }
}

impl Effect for MatrixField {
    fn name(&self) -> &'static str {
        "matrix"
    }

    fn bindings(&self) -> &'static [Binding] {
        BINDINGS
    }

    fn resize(&mut self, bounds: Vec2, rng: &mut FxRng) {
        self.bounds = bounds;
        let homes = grid(bounds, self.config.spacing, true, self.config.max_glyphs);
        self.glyphs = homes
            .into_iter()
            .map(|home| Glyph { pos: home, home, vel: Vec2::ZERO, ch: self.pick(rng), flicker: 0.2 })
            .collect();
    }

    fn input(&mut self, event: &InputEvent) {
        self.input.apply(event);
    }

    fn tick(&mut self, _dt_ms: f32, rng: &mut FxRng) {
        self.input.tick();
        let c = &self.config;
        let pointer = self.input.pointer();
        let upper = self.bounds.max(Vec2::ZERO);
        for glyph in &mut self.glyphs {
            if let Some(pointer) = pointer {
                let away = glyph.pos - pointer;
                let distance = away.length();
                let strength = linear_falloff(distance, c.radius) * c.repulsion;
                if strength > 0.0 {
                    glyph.vel += away / safe_distance(distance) * strength;
                    glyph.vel = glyph.vel.clamp_length_max(c.max_velocity);
                }
            }

            let home = glyph.home - glyph.pos;
            if home.length() > 0.1 {
                glyph.vel += home * c.return_force;
            }
            glyph.vel *= c.friction;
            glyph.pos = (glyph.pos + glyph.vel).clamp(Vec2::ZERO, upper);
            glyph.flicker = rng.gen_range(0.2..0.35);
        }

        let chance = self.config.mutation_chance;
        for i in 0..self.glyphs.len() {
            if rng.gen::<f32>() < chance {
                self.glyphs[i].ch = self.pick(rng);
            }
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        surface.clear();
        let pointer = self.input.pointer();
        let mut buf = [0u8; 4];
        for glyph in &self.glyphs {
            let alpha = match pointer {
                Some(p) => 0.3 + 0.7 * linear_falloff(glyph.pos.distance(p), self.config.radius),
                None => glyph.flicker,
            };
            let text = glyph.ch.encode_utf8(&mut buf);
            surface.fill_text(text, glyph.pos, self.config.color.with_alpha(alpha), &self.config.font);
        }
    }

    fn bounds(&self) -> Vec2 {
        self.bounds
    }

    fn positions(&self) -> Vec<Vec2> {
        self.glyphs.iter().map(|g| g.pos).collect()
    }

    fn len(&self) -> usize {
        self.glyphs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawOp, RecordingSurface};
    use rand::SeedableRng;

    fn seeded(config: MatrixConfig) -> (MatrixField, FxRng) {
        let mut rng = FxRng::seed_from_u64(9);
        let mut field = MatrixField::new(config);
        field.resize(Vec2::new(500.0, 250.0), &mut rng);
        (field, rng)
    }

    #[test]
    fn grid_is_centered_in_cells() {
        let (field, _) = seeded(MatrixConfig::default());
        assert_eq!(field.len(), 20 * 10);
        assert_eq!(field.glyphs[0].home, Vec2::new(12.5, 12.5));
    }

    #[test]
    fn pointer_repels_then_glyphs_return() {
        let (mut field, mut rng) = seeded(MatrixConfig::default());
        let i = field.glyphs.iter().position(|g| g.home == Vec2::new(262.5, 112.5)).unwrap();
        field.input(&InputEvent::PointerMove { x: 250.0, y: 112.5 });
        for _ in 0..10 {
            field.tick(16.0, &mut rng);
        }
        assert!(field.glyphs[i].pos.x > 262.5);

        field.input(&InputEvent::PointerLeave);
        for _ in 0..600 {
            field.tick(16.0, &mut rng);
        }
        assert!(field.glyphs[i].pos.distance(field.glyphs[i].home) < 0.5);
    }

    #[test]
    fn mutation_rewrites_glyphs() {
        let config = MatrixConfig { mutation_chance: 1.0, glyphs: "ab".to_owned(), ..MatrixConfig::default() };
        let (mut field, mut rng) = seeded(config);
        let before = field.text();
        field.tick(16.0, &mut rng);
        assert_ne!(field.text(), before);
    }

    #[test]
    fn idle_flicker_stays_dim() {
        let (mut field, mut rng) = seeded(MatrixConfig::default());
        field.tick(16.0, &mut rng);
        let mut surface = RecordingSurface::new(500.0, 250.0);
        field.render(&mut surface);
        for op in &surface.ops {
            if let DrawOp::FillText { color, .. } = op {
                assert!((0.2..0.35).contains(&color.a));
            }
        }
    }
}
