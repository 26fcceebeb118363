//! Canvas background effects.
//!
//! Every effect follows the same loop: `resize` seeds a fresh particle
//! array for the new bounds, `input` stores the latest sample, `tick`
//! advances one frame and `render` paints the current state. A [`Scene`]
//! bundles one effect with its random source and is what the browser glue
//! drives from `requestAnimationFrame`.

mod dot_field;
mod geometric;
mod gravity;
mod matrix;
mod trail;

pub use dot_field::DotField;
pub use geometric::{GeometricField, ShapeKind};
pub use gravity::GravityField;
pub use matrix::MatrixField;
pub use trail::MagicTrail;

use std::str::FromStr;

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config;
use crate::error::{FxError, Result};
use crate::input::{Binding, InputEvent};
use crate::surface::Surface;

pub type FxRng = SmallRng;

pub trait Effect {
    fn name(&self) -> &'static str;

    /// DOM listeners this effect needs while running.
    fn bindings(&self) -> &'static [Binding];

    /// Rebuild all particles for new bounds. Nothing survives a resize.
    fn resize(&mut self, bounds: Vec2, rng: &mut FxRng);

    fn input(&mut self, event: &InputEvent);

    /// Advance one frame; `dt_ms` is the time since the previous frame.
    fn tick(&mut self, dt_ms: f32, rng: &mut FxRng);

    fn render(&self, surface: &mut dyn Surface);

    fn bounds(&self) -> Vec2;

    /// Rendered particle positions, in particle order.
    fn positions(&self) -> Vec<Vec2>;

    fn len(&self) -> usize {
        self.positions().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Names accepted in `data-fx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    DotField,
    Geometric,
    Gravity,
    MagicTrail,
    Matrix,
}

impl FromStr for EffectKind {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "dot-field" | "dots" => Ok(EffectKind::DotField),
            "geometric" => Ok(EffectKind::Geometric),
            "gravity" => Ok(EffectKind::Gravity),
            "magic-trail" | "trail" => Ok(EffectKind::MagicTrail),
            "matrix" => Ok(EffectKind::Matrix),
            other => Err(FxError::UnknownEffect(other.to_owned())),
        }
    }
}

impl EffectKind {
    /// Build the effect, applying an optional JSON config override.
    pub fn build(self, config_json: Option<&str>, pointer_available: bool) -> Result<Box<dyn Effect>> {
        Ok(match self {
            EffectKind::DotField => Box::new(DotField::new(config::parse(config_json)?)),
            EffectKind::Geometric => {
                Box::new(GeometricField::new(config::parse(config_json)?, pointer_available))
            }
            EffectKind::Gravity => {
                Box::new(GravityField::new(config::parse(config_json)?, pointer_available))
            }
            EffectKind::MagicTrail => Box::new(MagicTrail::new(config::parse(config_json)?)),
            EffectKind::Matrix => Box::new(MatrixField::new(config::parse(config_json)?)),
        })
    }
}

/// Points of a regular grid covering `bounds`.
///
/// When the grid would exceed `cap` points the spacing is widened so the
/// count stays under it; denser viewports never cost more than `cap`.
pub fn grid(bounds: Vec2, spacing: f32, centered: bool, cap: usize) -> Vec<Vec2> {
    if bounds.x <= 0.0 || bounds.y <= 0.0 || spacing <= 0.0 || cap == 0 {
        return Vec::new();
    }
    let count = |s: f32| {
        if centered {
            ((bounds.x / s).floor() * (bounds.y / s).floor()) as usize
        } else {
            ((bounds.x / s).ceil() * (bounds.y / s).ceil()) as usize
        }
    };
    let mut spacing = spacing;
    let n = count(spacing);
    if n > cap {
        spacing *= (n as f32 / cap as f32).sqrt();
        while count(spacing) > cap {
            spacing *= 1.05;
        }
    }

    let offset = if centered { spacing / 2.0 } else { 0.0 };
    let (cols, rows) = if centered {
        ((bounds.x / spacing).floor() as usize, (bounds.y / spacing).floor() as usize)
    } else {
        ((bounds.x / spacing).ceil() as usize, (bounds.y / spacing).ceil() as usize)
    };
    let mut points = Vec::with_capacity(cols * rows);
    for col in 0..cols {
        for row in 0..rows {
            points.push(Vec2::new(col as f32 * spacing + offset, row as f32 * spacing + offset));
        }
    }
    points
}

/// One mounted effect plus the random source feeding it.
pub struct Scene {
    effect: Box<dyn Effect>,
    rng: FxRng,
}

impl Scene {
    pub fn new(effect: Box<dyn Effect>, seed: u64) -> Self {
        Self { effect, rng: FxRng::seed_from_u64(seed) }
    }

    pub fn effect(&self) -> &dyn Effect {
        self.effect.as_ref()
    }

    pub fn resize(&mut self, bounds: Vec2) {
        log::debug!("{}: resize to {}x{}", self.effect.name(), bounds.x, bounds.y);
        self.effect.resize(bounds, &mut self.rng);
        log::debug!("{}: seeded {} particles", self.effect.name(), self.effect.len());
    }

    /// Route one input event; resizes rebuild the particle arrays.
    pub fn dispatch(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::Resize { width, height } => self.resize(Vec2::new(width, height)),
            _ => self.effect.input(event),
        }
    }

    pub fn frame(&mut self, dt_ms: f32, surface: &mut dyn Surface) {
        self.effect.tick(dt_ms, &mut self.rng);
        self.effect.render(surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names() {
        assert_eq!("dot-field".parse::<EffectKind>().unwrap(), EffectKind::DotField);
        assert_eq!(" matrix ".parse::<EffectKind>().unwrap(), EffectKind::Matrix);
        assert!(matches!("sparkles".parse::<EffectKind>(), Err(FxError::UnknownEffect(_))));
    }

    #[test]
    fn grid_matches_spacing() {
        let points = grid(Vec2::new(90.0, 60.0), 30.0, false, 1000);
        assert_eq!(points.len(), 3 * 2);
        assert_eq!(points[0], Vec2::ZERO);

        let centered = grid(Vec2::new(100.0, 50.0), 25.0, true, 1000);
        assert_eq!(centered.len(), 4 * 2);
        assert_eq!(centered[0], Vec2::new(12.5, 12.5));
    }

    #[test]
    fn grid_respects_cap() {
        let points = grid(Vec2::new(4000.0, 3000.0), 10.0, false, 500);
        assert!(points.len() <= 500);
        assert!(points.len() > 300);
        assert!(grid(Vec2::ZERO, 10.0, false, 500).is_empty());
    }

    #[test]
    fn build_rejects_bad_config() {
        assert!(EffectKind::DotField.build(Some(r#"{"radius": -1}"#), true).is_err());
        let effect = EffectKind::Gravity.build(None, true).unwrap();
        assert_eq!(effect.name(), "gravity");
    }
}
