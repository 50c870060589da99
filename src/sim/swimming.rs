//! Pursuit mini-game: chase a steering AI around a pool with drifting buoys
//!
//! The evader's steering is a weighted sum of five forces (seek an escape
//! target, flee the chaser, dodge sideways, push off walls, avoid buoys),
//! normalized and scaled by a panic-dependent acceleration. A stuck monitor
//! kicks it back toward the middle of the pool when it stops making progress.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::body::Body;
use super::collision::Rect;
use super::event::{Cue, GameEvent, Progress};
use super::input::FrameInput;
use super::integrate::{Bounds, integrate};
use super::obstacle::CircleObstacle;
use super::placement::place_with_rejection;
use super::scene::Viewport;
use crate::tuning::{PhysicsTuning, SwimmingTuning};
use crate::{damp_factor, normalize_or_fallback, rand_between};

/// Tracks how long a body has been barely moving
#[derive(Debug, Clone, Default)]
pub struct StuckMonitor {
    last: Option<Vec2>,
    stuck_for: f32,
}

impl StuckMonitor {
    /// Record this frame's position; true when the body has moved less than
    /// `threshold` per frame for longer than `timeout`
    pub fn observe(&mut self, pos: Vec2, dt: f32, threshold: f32, timeout: f32) -> bool {
        let moved = self.last.map_or(f32::INFINITY, |last| last.distance(pos));
        self.last = Some(pos);

        if moved < threshold {
            self.stuck_for += dt;
        } else {
            self.stuck_for = 0.0;
        }

        if self.stuck_for > timeout {
            self.stuck_for = 0.0;
            true
        } else {
            false
        }
    }

    pub fn stuck_for(&self) -> f32 {
        self.stuck_for
    }
}

#[derive(Debug, Clone)]
pub struct Swimming {
    pub pool: Rect,
    pub chaser: Body,
    pub evader: Body,
    pub buoys: Vec<CircleObstacle>,
    /// Current escape target of the evader
    pub target: Vec2,
    pub target_timer: f32,
    /// Side the evader dodges to, +1 or -1
    pub handedness: f32,
    /// Time spent continuously within catch range
    pub tag_hold: f32,
    pub caught: bool,
    /// Time since the catch
    pub dwell: f32,
    pub stuck: StuckMonitor,
    done: bool,
    rng: Pcg32,
    tuning: SwimmingTuning,
    physics: PhysicsTuning,
}

fn pool_rect(viewport: Viewport, tuning: &SwimmingTuning) -> Rect {
    let (x, y, w, h) = tuning.pool_frac;
    Rect::new(
        viewport.width * x,
        viewport.height * y,
        viewport.width * w,
        viewport.height * h,
    )
}

impl Swimming {
    pub fn new(
        viewport: Viewport,
        tuning: &SwimmingTuning,
        physics: &PhysicsTuning,
        mut rng: Pcg32,
    ) -> Self {
        let pool = pool_rect(viewport, tuning);
        let at = |frac: (f32, f32)| Vec2::new(viewport.width * frac.0, viewport.height * frac.1);
        let chaser = Body::new(at(tuning.chaser_start_frac), tuning.chaser_radius, tuning.chaser_max_speed);
        let evader = Body::new(at(tuning.evader_start_frac), tuning.evader_radius, tuning.evader_max_speed);
        let buoys = place_buoys(&mut rng, &pool, chaser.pos, evader.pos, tuning);

        let mut swimming = Self {
            pool,
            chaser,
            evader,
            buoys,
            target: pool.center(),
            target_timer: 0.0,
            handedness: 1.0,
            tag_hold: 0.0,
            caught: false,
            dwell: 0.0,
            stuck: StuckMonitor::default(),
            done: false,
            rng,
            tuning: tuning.clone(),
            physics: physics.clone(),
        };
        swimming.choose_target();
        swimming
    }

    pub fn is_complete(&self) -> bool {
        self.done
    }

    pub fn catch_radius(&self) -> f32 {
        self.tuning.catch_radius
    }

    /// 0 when the chaser is beyond the panic radius, 1 when on top of the evader
    pub fn panic(&self) -> f32 {
        let d = self.chaser.distance_to(self.evader.pos);
        ((self.tuning.panic_radius - d) / self.tuning.panic_radius).clamp(0.0, 1.0)
    }

    /// Pick the best-scoring escape point among random candidates
    ///
    /// Candidates far from the chaser score well; candidates near a wall are
    /// penalized so the evader does not run itself into a corner.
    pub fn choose_target(&mut self) {
        let t = &self.tuning;
        let area = self.pool.inflate(-t.target_inset);
        let mut best = area.center();
        let mut best_score = f32::NEG_INFINITY;

        for _ in 0..t.target_candidates {
            let p = Vec2::new(
                rand_between(&mut self.rng, area.min.x, area.max().x),
                rand_between(&mut self.rng, area.min.y, area.max().y),
            );
            let wall = self.pool.nearest_edge_distance(p).max(12.0);
            let score = p.distance(self.chaser.pos) - t.target_edge_penalty / wall;
            if score > best_score {
                best_score = score;
                best = p;
            }
        }

        self.target = best;
        self.target_timer = rand_between(&mut self.rng, t.target_interval.0, t.target_interval.1);
        if self.rng.random_bool(t.handedness_flip_chance.clamp(0.0, 1.0)) {
            self.handedness = -self.handedness;
        }
    }

    /// Unit steering direction for the evader this frame
    pub fn evader_steering(&self) -> Vec2 {
        let t = &self.tuning;
        let pos = self.evader.pos;
        let panic = self.panic();

        let away = normalize_or_fallback(pos - self.chaser.pos);
        let seek = normalize_or_fallback(self.target - pos) * t.seek_weight;
        let flee = away * (t.flee_weight + panic);

        let dodge = if self.chaser.distance_to(pos) < t.dodge_range {
            away.perp() * self.handedness * (t.dodge_weight + t.dodge_panic_weight * panic)
        } else {
            Vec2::ZERO
        };

        let walls = wall_repulsion(&self.pool, pos, t.wall_margin, t.wall_strength) * t.wall_weight;

        let mut buoys = Vec2::ZERO;
        for buoy in &self.buoys {
            let reach = buoy.radius + t.buoy_avoid_extra;
            let delta = pos - buoy.pos;
            let dist = delta.length();
            if dist < reach {
                buoys += normalize_or_fallback(delta) * ((reach - dist) / reach) * t.buoy_avoid_weight;
            }
        }

        normalize_or_fallback(seek + flee + dodge + walls + buoys)
    }

    fn unstick(&mut self) {
        let t = &self.tuning;
        let to_center = self.pool.center() - self.evader.pos;
        let dir = if to_center.length() < 1.0 {
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            Vec2::from_angle(angle)
        } else {
            to_center.normalize()
        };
        let jitter = Vec2::new(
            rand_between(&mut self.rng, -t.unstick_jitter, t.unstick_jitter),
            rand_between(&mut self.rng, -t.unstick_jitter, t.unstick_jitter),
        );
        self.evader.vel += dir * t.unstick_impulse + jitter;
        self.evader.cap_speed();
        log::debug!("swimming: evader stuck at {:?}, kicking toward center", self.evader.pos);
    }

    fn update_evader(&mut self, dt: f32) {
        self.target_timer -= dt;
        if self.target_timer <= 0.0 || self.evader.distance_to(self.target) < self.tuning.target_reached {
            self.choose_target();
        }

        let panic = self.panic();
        let steer = self.evader_steering();
        let t = &self.tuning;
        self.evader
            .accelerate(steer, t.evader_accel * (0.7 + 0.7 * panic), dt);
        self.evader.apply_damping(t.evader_damping, dt);
        self.evader.max_speed = t.evader_max_speed * (0.85 + 0.35 * panic);

        let bounds = Bounds::new(self.pool);
        integrate(&mut self.evader, dt, &bounds, &self.buoys, &self.physics);

        let (threshold, timeout) = (self.tuning.stuck_threshold, self.tuning.stuck_timeout);
        if self.stuck.observe(self.evader.pos, dt, threshold, timeout) {
            self.unstick();
        }
    }

    fn update_chaser(&mut self, dt: f32, input: &FrameInput) {
        let t = &self.tuning;
        self.chaser
            .accelerate(input.keys.direction(), t.chaser_accel, dt);
        if let Some(target) = input.steer_target() {
            self.chaser.steer_toward(target, t.chaser_pointer_accel, dt);
        }
        self.chaser.apply_damping(t.chaser_damping, dt);

        let bounds = Bounds::new(self.pool);
        let contact = integrate(&mut self.chaser, dt, &bounds, &self.buoys, &self.physics);
        if contact.obstacle {
            self.chaser.vel *= self.tuning.chaser_buoy_penalty;
        }
    }

    /// After the catch both swimmers glide to a stop and drift together
    fn update_caught(&mut self, dt: f32, events: &mut Vec<GameEvent>) -> Progress {
        let t = &self.tuning;
        self.chaser.apply_damping(t.post_catch_damping, dt);
        self.evader.apply_damping(t.post_catch_damping, dt);
        integrate(&mut self.chaser, dt, &Bounds::new(self.pool), &self.buoys, &self.physics);

        let pull = 1.0 - damp_factor(1.0 - t.post_catch_pull, dt);
        self.evader.pos += (self.chaser.pos - self.evader.pos) * pull;
        let inset = Vec2::splat(self.evader.radius);
        let lo = self.pool.min + inset;
        self.evader.pos = self.evader.pos.clamp(lo, (self.pool.max() - inset).max(lo));

        self.dwell += dt;
        if self.dwell >= t.dwell_time {
            self.done = true;
            events.push(GameEvent::Cue(Cue::SceneClear));
            return Progress::Complete;
        }
        Progress::Continue
    }

    pub fn update(
        &mut self,
        dt: f32,
        viewport: Viewport,
        input: &FrameInput,
        events: &mut Vec<GameEvent>,
    ) -> Progress {
        if self.done {
            return Progress::Continue;
        }

        self.pool = pool_rect(viewport, &self.tuning);
        let pad = self.tuning.buoy_padding;
        for buoy in &mut self.buoys {
            buoy.advance(dt, &self.pool, buoy.radius + pad);
        }

        if self.caught {
            return self.update_caught(dt, events);
        }

        self.update_chaser(dt, input);
        self.update_evader(dt);

        if self.chaser.distance_to(self.evader.pos) < self.tuning.catch_radius {
            self.tag_hold += dt;
            if self.tag_hold > self.tuning.tag_hold {
                self.caught = true;
                events.push(GameEvent::Points(self.tuning.catch_points));
                events.push(GameEvent::Cue(Cue::Catch));
                events.push(GameEvent::Message("Tagged!"));
            }
        } else {
            self.tag_hold = 0.0;
        }

        Progress::Continue
    }
}

/// Push away from pool edges closer than `margin`, growing quadratically
fn wall_repulsion(pool: &Rect, pos: Vec2, margin: f32, strength: f32) -> Vec2 {
    let max = pool.max();
    let push = |gap: f32| {
        if gap < margin {
            let t = 1.0 - gap.max(0.0) / margin;
            strength * t * t
        } else {
            0.0
        }
    };

    Vec2::new(
        push(pos.x - pool.min.x) - push(max.x - pos.x),
        push(pos.y - pool.min.y) - push(max.y - pos.y),
    )
}

fn place_buoys(
    rng: &mut Pcg32,
    pool: &Rect,
    chaser: Vec2,
    evader: Vec2,
    tuning: &SwimmingTuning,
) -> Vec<CircleObstacle> {
    let area = pool.inflate(-(tuning.buoy_radius + tuning.buoy_padding));
    let (sx, sy) = tuning.buoy_speed;

    (0..tuning.buoy_count)
        .map(|_| {
            place_with_rejection(
                &mut *rng,
                tuning.buoy_attempts,
                |r: &mut Pcg32| {
                    let pos = Vec2::new(
                        rand_between(r, area.min.x, area.max().x),
                        rand_between(r, area.min.y, area.max().y),
                    );
                    let vel = Vec2::new(rand_between(r, -sx, sx), rand_between(r, -sy, sy));
                    CircleObstacle::new(pos, tuning.buoy_radius, vel, tuning.buoy_max_speed)
                },
                |buoy| {
                    buoy.pos.distance(chaser) >= tuning.buoy_start_clearance
                        && buoy.pos.distance(evader) >= tuning.buoy_start_clearance
                },
            )
            .value
        })
        .collect()
}
