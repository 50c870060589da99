//! Point-mass bodies shared by every mini-game

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::damp_factor;

/// A circular body with position, velocity and a speed cap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Speed cap enforced after every integration
    pub max_speed: f32,
}

impl Body {
    pub fn new(pos: Vec2, radius: f32, max_speed: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
            max_speed,
        }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Scale velocity down to `max_speed` if it is faster
    pub fn cap_speed(&mut self) {
        let speed = self.speed();
        if speed > self.max_speed && speed > 0.0 {
            self.vel *= self.max_speed / speed;
        }
    }

    /// Add `accel * dt` along `dir`
    #[inline]
    pub fn accelerate(&mut self, dir: Vec2, accel: f32, dt: f32) {
        self.vel += dir * accel * dt;
    }

    /// Apply a per-frame-at-60fps damping constant over `dt`
    #[inline]
    pub fn apply_damping(&mut self, base: f32, dt: f32) {
        self.vel *= damp_factor(base, dt);
    }

    /// Accelerate toward `target`; no-op within 1 unit to avoid jitter
    pub fn steer_toward(&mut self, target: Vec2, accel: f32, dt: f32) {
        let delta = target - self.pos;
        let dist = delta.length();
        if dist < 1.0 {
            return;
        }
        self.vel += delta / dist * accel * dt;
    }

    #[inline]
    pub fn distance_to(&self, other: Vec2) -> f32 {
        self.pos.distance(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_speed_keeps_direction() {
        let mut body = Body::new(Vec2::ZERO, 10.0, 100.0);
        body.vel = Vec2::new(300.0, 400.0);
        body.cap_speed();
        assert!((body.speed() - 100.0).abs() < 1e-3);
        assert!((body.vel.x / body.vel.y - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_cap_speed_leaves_slow_bodies() {
        let mut body = Body::new(Vec2::ZERO, 10.0, 100.0);
        body.vel = Vec2::new(30.0, 40.0);
        body.cap_speed();
        assert_eq!(body.vel, Vec2::new(30.0, 40.0));
    }

    #[test]
    fn test_steer_toward_target() {
        let mut body = Body::new(Vec2::ZERO, 10.0, 1000.0);
        body.steer_toward(Vec2::new(100.0, 0.0), 600.0, 0.5);
        assert!((body.vel.x - 300.0).abs() < 1e-3);
        assert!(body.vel.y.abs() < 1e-6);
    }

    #[test]
    fn test_steer_toward_noop_at_destination() {
        let mut body = Body::new(Vec2::new(5.0, 5.0), 10.0, 1000.0);
        body.steer_toward(Vec2::new(5.5, 5.0), 600.0, 0.5);
        assert_eq!(body.vel, Vec2::ZERO);
    }
}
