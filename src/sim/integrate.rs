//! Sub-stepped position integration with boundary and obstacle resolution
//!
//! Fast bodies are split into several short moves so that a body covering
//! more than an obstacle's thickness in one frame still meets it.

use glam::Vec2;

use super::body::Body;
use super::collision::{Collider, Rect};
use crate::consts::{MAX_SUBSTEPS, SUBSTEP_DISTANCE};
use crate::tuning::PhysicsTuning;

/// Play-area boundary for one body
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub rect: Rect,
    /// Extra inset on top of the body radius
    pub padding: f32,
}

impl Bounds {
    pub fn new(rect: Rect) -> Self {
        Self { rect, padding: 0.0 }
    }

    pub fn with_padding(rect: Rect, padding: f32) -> Self {
        Self { rect, padding }
    }

    /// Allowed range for a body center of `radius`
    fn inset_range(&self, radius: f32) -> (Vec2, Vec2) {
        let inset = Vec2::splat(radius + self.padding);
        let lo = self.rect.min + inset;
        // A bounds rect thinner than the body pins it to the middle
        let hi = (self.rect.max() - inset).max(lo);
        let mid = (lo + hi) * 0.5;
        (lo.min(mid), hi.max(mid))
    }
}

/// What a body touched during one integration call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contact {
    /// Touched at least one obstacle
    pub obstacle: bool,
    /// Touched the boundary
    pub wall: bool,
}

/// Number of sub-steps for a body moving at `speed` over `dt`
#[inline]
pub fn substep_count(speed: f32, dt: f32) -> u32 {
    let steps = (speed * dt / SUBSTEP_DISTANCE).ceil();
    if steps.is_finite() {
        (steps as u32).clamp(1, MAX_SUBSTEPS)
    } else {
        MAX_SUBSTEPS
    }
}

/// Advance `body` by `dt`, bouncing off `bounds` and resolving `obstacles`
///
/// Obstacles are not moved here; callers advance them once per frame before
/// integrating the bodies that share them. The body's speed is capped to its
/// `max_speed` once all sub-steps are done.
pub fn integrate<C: Collider>(
    body: &mut Body,
    dt: f32,
    bounds: &Bounds,
    obstacles: &[C],
    physics: &PhysicsTuning,
) -> Contact {
    let mut contact = Contact::default();
    if dt <= 0.0 {
        body.cap_speed();
        return contact;
    }

    let steps = substep_count(body.speed(), dt);
    let step_dt = dt / steps as f32;
    let (lo, hi) = bounds.inset_range(body.radius);
    let bounce = physics.wall_restitution;

    for _ in 0..steps {
        body.pos += body.vel * step_dt;

        if body.pos.x < lo.x {
            body.pos.x = lo.x;
            body.vel.x = body.vel.x.abs() * bounce;
            contact.wall = true;
        }
        if body.pos.x > hi.x {
            body.pos.x = hi.x;
            body.vel.x = -body.vel.x.abs() * bounce;
            contact.wall = true;
        }
        if body.pos.y < lo.y {
            body.pos.y = lo.y;
            body.vel.y = body.vel.y.abs() * bounce;
            contact.wall = true;
        }
        if body.pos.y > hi.y {
            body.pos.y = hi.y;
            body.vel.y = -body.vel.y.abs() * bounce;
            contact.wall = true;
        }

        for obstacle in obstacles {
            if obstacle.resolve(body, physics) {
                contact.obstacle = true;
            }
        }
    }

    body.cap_speed();
    contact
}
