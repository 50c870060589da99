//! Collision detection and response for circles against rectangles and circles
//!
//! Only the moving body is ever changed. Obstacles are immovable from the
//! resolver's point of view even when they carry their own velocity; their
//! motion is advanced separately by the mini-game that owns them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::Body;
use crate::tuning::PhysicsTuning;

/// Axis-aligned rectangle (top-left corner + size, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w.max(0.0), h.max(0.0)),
        }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Closest point on (or in) the rectangle to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.max(self.min).min(self.max())
    }

    pub fn contains(&self, p: Vec2) -> bool {
        let max = self.max();
        p.x >= self.min.x && p.x <= max.x && p.y >= self.min.y && p.y <= max.y
    }

    /// Grow the rectangle by `by` on every side
    pub fn inflate(&self, by: f32) -> Self {
        Rect::new(
            self.min.x - by,
            self.min.y - by,
            self.size.x + by * 2.0,
            self.size.y + by * 2.0,
        )
    }

    /// Strict overlap test against a circle
    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        center.distance_squared(self.closest_point(center)) < radius * radius
    }

    /// Distance from `p` to the nearest edge, for points inside the rectangle
    pub fn nearest_edge_distance(&self, p: Vec2) -> f32 {
        let max = self.max();
        (p.x - self.min.x)
            .min(max.x - p.x)
            .min(p.y - self.min.y)
            .min(max.y - p.y)
    }
}

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point on the obstacle surface
    pub point: Vec2,
    /// Unit normal pointing from the obstacle toward the circle
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check a circle against an axis-aligned rectangle
///
/// When the circle center lies on or inside the rectangle the closest point
/// coincides with the center and no normal exists; the contact is then
/// reported against whichever face is nearest.
pub fn circle_rect_contact(center: Vec2, radius: f32, rect: &Rect) -> CollisionResult {
    circle_rect_contact_heading(center, radius, rect, Vec2::ZERO)
}

/// Like [`circle_rect_contact`], but a center inside the rectangle leaves
/// through the nearest face it could have entered by while moving along
/// `heading`, so a deep sub-step never pops out the far side
pub fn circle_rect_contact_heading(
    center: Vec2,
    radius: f32,
    rect: &Rect,
    heading: Vec2,
) -> CollisionResult {
    let closest = rect.closest_point(center);
    let delta = center - closest;
    let dist_sq = delta.length_squared();

    if dist_sq >= radius * radius {
        return CollisionResult::miss();
    }

    if dist_sq > 0.0 {
        let dist = dist_sq.sqrt();
        return CollisionResult {
            hit: true,
            point: closest,
            normal: delta / dist,
            penetration: radius - dist,
        };
    }

    // Degenerate: center on or inside the rectangle. Top and bottom win ties.
    let max = rect.max();
    let faces = [
        (center.y - rect.min.y, Vec2::NEG_Y),
        (max.y - center.y, Vec2::Y),
        (center.x - rect.min.x, Vec2::NEG_X),
        (max.x - center.x, Vec2::X),
    ];
    let nearest = |entry_only: bool| {
        faces
            .into_iter()
            .filter(|(_, n)| !entry_only || n.dot(heading) < 0.0)
            .reduce(|best, face| if face.0 < best.0 { face } else { best })
    };
    let (depth, normal) = nearest(true).or_else(|| nearest(false)).unwrap_or(faces[0]);

    CollisionResult {
        hit: true,
        point: center + normal * depth,
        normal,
        penetration: depth + radius,
    }
}

/// Check a circle against another circle
///
/// Exactly coincident centers have no separating direction; the contact is
/// then reported with an upward normal.
pub fn circle_circle_contact(
    center: Vec2,
    radius: f32,
    other_center: Vec2,
    other_radius: f32,
) -> CollisionResult {
    let delta = center - other_center;
    let dist = delta.length();
    let reach = radius + other_radius;

    if dist >= reach {
        return CollisionResult::miss();
    }

    let normal = if dist > 0.0 { delta / dist } else { Vec2::NEG_Y };
    CollisionResult {
        hit: true,
        point: other_center + normal * other_radius,
        normal,
        penetration: reach - dist,
    }
}

/// Reflect the normal component of `velocity` with restitution
///
/// Only velocity heading into the surface is reflected, so a body already
/// separating from a moving obstacle is not pulled back into it.
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2, restitution: f32) -> Vec2 {
    let vn = velocity.dot(normal);
    if vn < 0.0 {
        velocity - (1.0 + restitution) * vn * normal
    } else {
        velocity
    }
}

/// Push a body out of a rectangle and bounce it; returns whether it touched
pub fn resolve_circle_rect(body: &mut Body, rect: &Rect, physics: &PhysicsTuning) -> bool {
    let result = circle_rect_contact_heading(body.pos, body.radius, rect, body.vel);
    if !result.hit {
        return false;
    }

    body.pos += result.normal * result.penetration;
    body.vel = reflect_velocity(body.vel, result.normal, physics.rect_restitution);
    body.vel *= physics.rect_damping;
    true
}

/// Push a body out of a circle and bounce it; returns whether it touched
pub fn resolve_circle_circle(
    body: &mut Body,
    other_center: Vec2,
    other_radius: f32,
    physics: &PhysicsTuning,
) -> bool {
    let result = circle_circle_contact(body.pos, body.radius, other_center, other_radius);
    if !result.hit {
        return false;
    }

    body.pos += result.normal * result.penetration;
    body.vel = reflect_velocity(body.vel, result.normal, physics.circle_restitution);
    body.vel *= physics.circle_damping;
    true
}

/// Anything a body can collide with during integration
pub trait Collider {
    /// Separate `body` from this obstacle, returning whether they touched
    fn resolve(&self, body: &mut Body, physics: &PhysicsTuning) -> bool;
}

impl Collider for Rect {
    fn resolve(&self, body: &mut Body, physics: &PhysicsTuning) -> bool {
        resolve_circle_rect(body, self, physics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_at(x: f32, y: f32, r: f32) -> Body {
        Body::new(Vec2::new(x, y), r, 10_000.0)
    }

    #[test]
    fn test_circle_rect_contact_side() {
        let rect = Rect::new(0.0, 0.0, 100.0, 20.0);
        let result = circle_rect_contact(Vec2::new(50.0, 28.0), 10.0, &rect);
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::Y);
        assert!((result.penetration - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_circle_rect_miss_at_corner() {
        let rect = Rect::new(0.0, 0.0, 100.0, 20.0);
        // 8,8 away from the corner diagonally: ~11.3 > 10
        let result = circle_rect_contact(Vec2::new(108.0, 28.0), 10.0, &rect);
        assert!(!result.hit);
    }

    #[test]
    fn test_resolve_circle_rect_bounces() {
        let physics = PhysicsTuning::default();
        let rect = Rect::new(0.0, 100.0, 200.0, 20.0);
        let mut body = body_at(50.0, 95.0, 10.0);
        body.vel = Vec2::new(40.0, 200.0);

        assert!(resolve_circle_rect(&mut body, &rect, &physics));
        // Pushed back above the top face
        assert!((body.pos.y - 90.0).abs() < 1e-4);
        // Moving away now, with energy lost
        assert!(body.vel.y < 0.0);
        let expected_vy = -200.0 * physics.rect_restitution * physics.rect_damping;
        assert!((body.vel.y - expected_vy).abs() < 1e-3);
        assert!((body.vel.x - 40.0 * physics.rect_damping).abs() < 1e-3);
    }

    #[test]
    fn test_resolve_circle_rect_degenerate_center_inside() {
        let physics = PhysicsTuning::default();
        let rect = Rect::new(0.0, 100.0, 200.0, 20.0);
        // Center inside, nearer the bottom face
        let mut body = body_at(50.0, 115.0, 10.0);
        body.vel = Vec2::new(0.0, -50.0);

        assert!(resolve_circle_rect(&mut body, &rect, &physics));
        assert!((body.pos.y - 130.0).abs() < 1e-4);
        assert!(body.vel.y > 0.0);
        assert!(!rect.overlaps_circle(body.pos, body.radius));
    }

    #[test]
    fn test_deep_entry_into_thin_wall_exits_sideways() {
        let physics = PhysicsTuning::default();
        let wall = Rect::new(50.0, -500.0, 20.0, 1000.0);
        let mut body = body_at(53.0, 0.0, 5.0);
        body.vel = Vec2::new(900.0, 0.0);

        assert!(resolve_circle_rect(&mut body, &wall, &physics));
        assert!((body.pos.x - 45.0).abs() < 1e-4);
        assert_eq!(body.pos.y, 0.0);
        assert!(body.vel.x < 0.0);
    }

    #[test]
    fn test_deep_entry_leaves_by_entry_face() {
        let physics = PhysicsTuning::default();
        let wall = Rect::new(50.0, -500.0, 20.0, 1000.0);
        // Nearer the right face, but arrived moving right
        let mut body = body_at(62.0, 0.0, 5.0);
        body.vel = Vec2::new(900.0, 0.0);

        assert!(resolve_circle_rect(&mut body, &wall, &physics));
        assert!((body.pos.x - 45.0).abs() < 1e-4);
        assert!(body.vel.x < 0.0);
    }

    #[test]
    fn test_resolve_circle_circle_separates() {
        let physics = PhysicsTuning::default();
        let mut body = body_at(30.0, 0.0, 20.0);
        body.vel = Vec2::new(-100.0, 0.0);

        assert!(resolve_circle_circle(&mut body, Vec2::ZERO, 20.0, &physics));
        assert!((body.pos.distance(Vec2::ZERO) - 40.0).abs() < 1e-3);
        assert!(body.vel.x > 0.0);
    }

    #[test]
    fn test_resolve_circle_circle_coincident() {
        let physics = PhysicsTuning::default();
        let mut body = body_at(10.0, 10.0, 5.0);
        assert!(resolve_circle_circle(&mut body, Vec2::new(10.0, 10.0), 5.0, &physics));
        assert!((body.pos.distance(Vec2::new(10.0, 10.0)) - 10.0).abs() < 1e-4);
        assert!(body.pos.x.is_finite() && body.pos.y.is_finite());
    }

    #[test]
    fn test_reflect_ignores_separating_velocity() {
        let v = Vec2::new(0.0, 50.0);
        assert_eq!(reflect_velocity(v, Vec2::Y, 0.8), v);
        let r = reflect_velocity(Vec2::new(10.0, -50.0), Vec2::Y, 0.8);
        assert!((r.y - 40.0).abs() < 1e-4);
        assert!((r.x - 10.0).abs() < 1e-6);
    }
}
