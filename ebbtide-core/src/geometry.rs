//! 2D geometry in the normalized `[0,1] x [0,1]` simulation space.

use serde::Serialize;

/// A point or displacement in normalized coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    /// Center of the simulation space; nodes spawn here.
    pub const CENTER: Vec2 = Vec2 { x: 0.5, y: 0.5 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(self, other: Vec2) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Moves a fraction of the remaining distance toward `target`.
    ///
    /// Applied once per tick this gives exponential smoothing toward a
    /// (possibly moving) target.
    pub fn approach(&mut self, target: Vec2, factor: f64) {
        self.x += (target.x - self.x) * factor;
        self.y += (target.y - self.y) * factor;
    }

    /// Advances a fixed distance along the straight line toward `target`.
    ///
    /// Overshoots when `step` exceeds the remaining distance; callers gate
    /// on distance before stepping. A zero-length direction is a no-op.
    pub fn step_toward(&mut self, target: Vec2, step: f64) {
        let dx = target.x - self.x;
        let dy = target.y - self.y;
        let length = (dx * dx + dy * dy).sqrt();
        if length < f64::EPSILON {
            return;
        }
        let scale = step / length;
        self.x += dx * scale;
        self.y += dy * scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert!((a.distance_to(b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_approach_converges() {
        let mut p = Vec2::new(0.0, 0.0);
        let target = Vec2::new(1.0, 1.0);
        for _ in 0..1000 {
            p.approach(target, 0.02);
        }
        assert!(p.distance_to(target) < 1e-6);
    }

    #[test]
    fn test_step_toward_fixed_magnitude() {
        let mut p = Vec2::new(0.0, 0.0);
        let start = p;
        p.step_toward(Vec2::new(1.0, 0.0), 0.005);
        assert!((start.distance_to(p) - 0.005).abs() < 1e-12);
    }

    #[test]
    fn test_step_toward_self_is_noop() {
        let mut p = Vec2::new(0.3, 0.7);
        p.step_toward(p, 0.005);
        assert_eq!(p, Vec2::new(0.3, 0.7));
    }
}
