//! Moving obstacles: rectangular hazards and circular buoys

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::Body;
use super::collision::{Collider, Rect, resolve_circle_circle, resolve_circle_rect};
use crate::tuning::{HazardEdges, PhysicsTuning};

/// Horizontal slack on each side of the wrap range
const WRAP_SLACK: f32 = 10.0;

/// A rectangle sliding horizontally across the play area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RectObstacle {
    pub rect: Rect,
    pub vel: Vec2,
    pub edges: HazardEdges,
}

impl RectObstacle {
    pub fn new(rect: Rect, vel: Vec2, edges: HazardEdges) -> Self {
        Self { rect, vel, edges }
    }

    /// Move by `vel * dt` inside a play area `width` wide
    ///
    /// Wrapping uses the range `width + rect.w + 20` measured from one
    /// rect-width left of the play area, so the same obstacle re-enters at the
    /// same offset no matter how the viewport was resized in between.
    pub fn advance(&mut self, dt: f32, width: f32) {
        self.rect.min += self.vel * dt;

        match self.edges {
            HazardEdges::Wrap => {
                let w = self.rect.size.x;
                let range = width + w + WRAP_SLACK * 2.0;
                if range > 0.0 {
                    let shifted = (self.rect.min.x + w + WRAP_SLACK).rem_euclid(range);
                    self.rect.min.x = shifted - (w + WRAP_SLACK);
                }
            }
            HazardEdges::Bounce { margin } => {
                let right = width - margin;
                if self.rect.min.x < margin {
                    self.rect.min.x = margin;
                    self.vel.x = self.vel.x.abs();
                } else if self.rect.max().x > right {
                    self.rect.min.x = (right - self.rect.size.x).max(margin);
                    self.vel.x = -self.vel.x.abs();
                }
            }
        }
    }
}

impl Collider for RectObstacle {
    fn resolve(&self, body: &mut Body, physics: &PhysicsTuning) -> bool {
        resolve_circle_rect(body, &self.rect, physics)
    }
}

/// A drifting circle that bounces around inside a region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircleObstacle {
    pub pos: Vec2,
    pub radius: f32,
    pub vel: Vec2,
    pub max_speed: f32,
}

impl CircleObstacle {
    pub fn new(pos: Vec2, radius: f32, vel: Vec2, max_speed: f32) -> Self {
        Self {
            pos,
            radius,
            vel,
            max_speed,
        }
    }

    /// Move by `vel * dt`, bouncing off `region` inset by `pad`
    pub fn advance(&mut self, dt: f32, region: &Rect, pad: f32) {
        self.pos += self.vel * dt;

        let lo = region.min + Vec2::splat(pad);
        let hi = (region.max() - Vec2::splat(pad)).max(lo);
        if self.pos.x < lo.x {
            self.pos.x = lo.x;
            self.vel.x = self.vel.x.abs();
        }
        if self.pos.x > hi.x {
            self.pos.x = hi.x;
            self.vel.x = -self.vel.x.abs();
        }
        if self.pos.y < lo.y {
            self.pos.y = lo.y;
            self.vel.y = self.vel.y.abs();
        }
        if self.pos.y > hi.y {
            self.pos.y = hi.y;
            self.vel.y = -self.vel.y.abs();
        }

        let speed = self.vel.length();
        if speed > self.max_speed && speed > 0.0 {
            self.vel *= self.max_speed / speed;
        }
    }
}

impl Collider for CircleObstacle {
    fn resolve(&self, body: &mut Body, physics: &PhysicsTuning) -> bool {
        resolve_circle_circle(body, self.pos, self.radius, physics)
    }
}
