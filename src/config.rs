//! Tunable knobs for every effect and the scroll gate.
//!
//! Defaults reproduce the look of the live site. A page can override any
//! subset through a JSON object in `data-fx-config`.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{FxError, Result};
use crate::surface::Rgba;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Parse an optional JSON override on top of the defaults.
pub fn parse<C>(json: Option<&str>) -> Result<C>
where
    C: DeserializeOwned + Default + Validate,
{
    let config: C = match json.map(str::trim) {
        None | Some("") => C::default(),
        Some(raw) => serde_json::from_str(raw)?,
    };
    config.validate()?;
    Ok(config)
}

/// Log level named by `data-fx-log`; unknown or missing values mean `info`.
pub fn log_level(attr: Option<&str>) -> log::Level {
    attr.and_then(|s| s.trim().parse().ok()).unwrap_or(log::Level::Info)
}

fn positive(name: &str, v: f32) -> Result<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(FxError::config(format!("{name} must be positive, got {v}")))
    }
}

fn unit(name: &str, v: f32) -> Result<()> {
    if v > 0.0 && v <= 1.0 {
        Ok(())
    } else {
        Err(FxError::config(format!("{name} must be in (0, 1], got {v}")))
    }
}

fn probability(name: &str, v: f32) -> Result<()> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(FxError::config(format!("{name} must be in [0, 1], got {v}")))
    }
}

fn range(name: &str, min: f32, max: f32) -> Result<()> {
    positive(name, min)?;
    if max >= min {
        Ok(())
    } else {
        Err(FxError::config(format!("{name}: max {max} below min {min}")))
    }
}

fn non_empty<T>(name: &str, items: &[T]) -> Result<()> {
    if items.is_empty() {
        Err(FxError::config(format!("{name} must not be empty")))
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DotFieldConfig {
    pub spacing: f32,
    pub radius: f32,
    pub max_offset: f32,
    pub easing: f32,
    pub dot_size: f32,
    pub max_dots: usize,
    pub color: Rgba,
}

impl Default for DotFieldConfig {
    fn default() -> Self {
        Self {
            spacing: 30.0,
            radius: 120.0,
            max_offset: 15.0,
            easing: 0.2,
            dot_size: 2.0,
            max_dots: 8_000,
            color: Rgba::new(42, 42, 42, 0.8),
        }
    }
}

impl Validate for DotFieldConfig {
    fn validate(&self) -> Result<()> {
        positive("spacing", self.spacing)?;
        positive("radius", self.radius)?;
        positive("dot_size", self.dot_size)?;
        unit("easing", self.easing)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeometricConfig {
    /// Viewport area (px²) per shape.
    pub area_per_shape: f32,
    pub max_shapes: usize,
    pub min_size: f32,
    pub max_size: f32,
    /// Drift speed is uniform in `[-max_drift, max_drift]` per axis.
    pub max_drift: f32,
    pub max_rotation_speed: f32,
    pub pointer_influence: f32,
    pub tilt_influence: f32,
    /// Tilt angles are clamped to `±tilt_clamp` degrees.
    pub tilt_clamp: f32,
    /// Viewports at most this wide follow tilt when it is available.
    pub wide_breakpoint: f32,
    pub easing: f32,
    pub line_width: f32,
    pub palette: Vec<Rgba>,
}

impl Default for GeometricConfig {
    fn default() -> Self {
        Self {
            area_per_shape: 50_000.0,
            max_shapes: 20,
            min_size: 30.0,
            max_size: 90.0,
            max_drift: 0.4,
            max_rotation_speed: 0.005,
            pointer_influence: 0.15,
            tilt_influence: 8.0,
            tilt_clamp: 30.0,
            wide_breakpoint: 768.0,
            easing: 0.1,
            line_width: 2.0,
            palette: vec![
                Rgba::new(59, 130, 246, 0.3),
                Rgba::new(99, 102, 241, 0.3),
                Rgba::new(139, 92, 246, 0.3),
                Rgba::new(168, 85, 247, 0.3),
                Rgba::new(192, 192, 192, 0.2),
                Rgba::new(255, 255, 255, 0.2),
            ],
        }
    }
}

impl Validate for GeometricConfig {
    fn validate(&self) -> Result<()> {
        positive("area_per_shape", self.area_per_shape)?;
        range("size", self.min_size, self.max_size)?;
        positive("tilt_clamp", self.tilt_clamp)?;
        if self.max_drift < 0.0 || self.max_rotation_speed < 0.0 {
            return Err(FxError::config("drift and rotation speed must not be negative"));
        }
        unit("easing", self.easing)?;
        non_empty("palette", &self.palette)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GravityConfig {
    pub count: usize,
    pub min_size: f32,
    pub max_size: f32,
    /// Resting gravity `[x, y]` before any input arrives.
    pub gravity: [f32; 2],
    pub friction: f32,
    pub restitution: f32,
    /// Degrees of tilt that map to full gravity.
    pub tilt_divisor: f32,
    pub pointer_scale: f32,
    pub touch_scale: f32,
    pub palette: Vec<Rgba>,
}

impl Default for GravityConfig {
    fn default() -> Self {
        Self {
            count: 8,
            min_size: 10.0,
            max_size: 30.0,
            gravity: [0.0, 0.3],
            friction: 0.99,
            restitution: 0.8,
            tilt_divisor: 45.0,
            pointer_scale: 0.4,
            touch_scale: 0.6,
            palette: vec![
                Rgba::new(96, 165, 250, 0.7),
                Rgba::new(52, 211, 153, 0.7),
                Rgba::new(248, 113, 113, 0.7),
                Rgba::new(251, 191, 36, 0.7),
                Rgba::new(167, 139, 250, 0.7),
            ],
        }
    }
}

impl Validate for GravityConfig {
    fn validate(&self) -> Result<()> {
        range("size", self.min_size, self.max_size)?;
        unit("friction", self.friction)?;
        probability("restitution", self.restitution)?;
        positive("tilt_divisor", self.tilt_divisor)?;
        non_empty("palette", &self.palette)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrailConfig {
    pub mouse_burst: usize,
    pub touch_burst: usize,
    pub mouse_interval_ms: f32,
    pub touch_interval_ms: f32,
    /// Share of the pointer delta inherited as velocity.
    pub inherit: f32,
    pub alpha_decay: f32,
    pub min_life: f32,
    pub max_life: f32,
    pub ambient_chance: f32,
    pub ambient_cap: usize,
    pub max_particles: usize,
    /// Colour painted over the previous frame each tick.
    pub fade: Rgba,
    pub color: Rgba,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            mouse_burst: 3,
            touch_burst: 2,
            mouse_interval_ms: 16.0,
            touch_interval_ms: 32.0,
            inherit: 0.05,
            alpha_decay: 0.96,
            min_life: 30.0,
            max_life: 60.0,
            ambient_chance: 0.03,
            ambient_cap: 50,
            max_particles: 600,
            fade: Rgba::new(15, 15, 15, 0.92),
            color: Rgba::new(255, 255, 255, 1.0),
        }
    }
}

impl Validate for TrailConfig {
    fn validate(&self) -> Result<()> {
        range("life", self.min_life, self.max_life)?;
        unit("alpha_decay", self.alpha_decay)?;
        probability("ambient_chance", self.ambient_chance)?;
        if self.max_particles == 0 {
            return Err(FxError::config("max_particles must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatrixConfig {
    pub spacing: f32,
    pub radius: f32,
    pub repulsion: f32,
    pub max_velocity: f32,
    pub return_force: f32,
    pub friction: f32,
    pub mutation_chance: f32,
    pub glyphs: String,
    pub font: String,
    pub color: Rgba,
    pub max_glyphs: usize,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            spacing: 25.0,
            radius: 150.0,
            repulsion: 0.5,
            max_velocity: 2.0,
            return_force: 0.05,
            friction: 0.95,
            mutation_chance: 0.005,
            glyphs: "01010101אבגדהוזחטיכלמנסעפצקרשת{}[]=><-+*/&|!@#$%^&*".to_owned(),
            font: "12px \"IBM Plex Mono\", monospace".to_owned(),
            color: Rgba::new(242, 242, 242, 1.0),
            max_glyphs: 6_000,
        }
    }
}

impl Validate for MatrixConfig {
    fn validate(&self) -> Result<()> {
        positive("spacing", self.spacing)?;
        positive("radius", self.radius)?;
        positive("max_velocity", self.max_velocity)?;
        unit("friction", self.friction)?;
        probability("mutation_chance", self.mutation_chance)?;
        if self.glyphs.is_empty() {
            return Err(FxError::config("glyphs must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateConfig {
    /// Accumulated wheel delta needed for one step.
    pub sensitivity: f32,
    /// Swipe distance needed for one step.
    pub touch_threshold: f32,
    /// Delay between reaching the last step and releasing the page.
    pub release_delay_ms: f32,
    /// Reveal step 1 this long after mount unless the reader already moved.
    /// `null` disables it.
    pub first_reveal_ms: Option<f32>,
    /// On touch-first devices show every step this long after mount.
    /// `null` disables it.
    pub touch_show_all_ms: Option<f32>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            sensitivity: 120.0,
            touch_threshold: 50.0,
            release_delay_ms: 1000.0,
            first_reveal_ms: Some(500.0),
            touch_show_all_ms: Some(1000.0),
        }
    }
}

impl Validate for GateConfig {
    fn validate(&self) -> Result<()> {
        positive("sensitivity", self.sensitivity)?;
        positive("touch_threshold", self.touch_threshold)?;
        let delays = [Some(self.release_delay_ms), self.first_reveal_ms, self.touch_show_all_ms];
        if delays.into_iter().flatten().any(|ms| ms.is_nan() || ms < 0.0) {
            return Err(FxError::config("gate delays must not be negative"));
        }
        Ok(())
    }
}
