//! Distance falloff and per-frame easing shared by every effect.

use glam::Vec2;

/// Linear falloff: 1 at the source, 0 at or beyond `radius`.
pub fn linear_falloff(distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 || !distance.is_finite() {
        return 0.0;
    }
    ((radius - distance) / radius).clamp(0.0, 1.0)
}

/// One step of exponential smoothing toward `target`.
#[inline]
pub fn ease(value: f32, target: f32, k: f32) -> f32 {
    value + (target - value) * k
}

#[inline]
pub fn ease_vec(value: Vec2, target: Vec2, k: f32) -> Vec2 {
    value + (target - value) * k
}

/// Distance used as a divisor; zero becomes 1.
#[inline]
pub fn safe_distance(d: f32) -> f32 {
    if d == 0.0 {
        1.0
    } else {
        d
    }
}

/// Unit vector from `from` toward `to` plus the raw distance between them.
///
/// Coincident points yield a zero direction instead of NaN.
pub fn direction(from: Vec2, to: Vec2) -> (Vec2, f32) {
    let delta = to - from;
    let distance = delta.length();
    (delta / safe_distance(distance), distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falloff_edges() {
        assert_eq!(linear_falloff(0.0, 120.0), 1.0);
        assert_eq!(linear_falloff(60.0, 120.0), 0.5);
        assert_eq!(linear_falloff(120.0, 120.0), 0.0);
        assert_eq!(linear_falloff(500.0, 120.0), 0.0);
        assert_eq!(linear_falloff(10.0, 0.0), 0.0);
        assert_eq!(linear_falloff(f32::INFINITY, 120.0), 0.0);
    }

    #[test]
    fn zero_distance_direction_is_finite() {
        let (dir, dist) = direction(Vec2::new(3.0, 4.0), Vec2::new(3.0, 4.0));
        assert_eq!(dist, 0.0);
        assert!(dir.x.is_finite() && dir.y.is_finite());
        assert_eq!(dir, Vec2::ZERO);
    }

    #[test]
    fn ease_decays_geometrically() {
        let mut v = 0.0;
        v = ease(v, 10.0, 0.2);
        assert!((v - 2.0).abs() < 1e-6);
        v = ease(v, 10.0, 0.2);
        assert!((v - 3.6).abs() < 1e-6);
    }
}
