//! Collection/hazard mini-game: pick up every token while dodging sliding hazards

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::Body;
use super::collision::Rect;
use super::event::{Cue, GameEvent, Progress};
use super::input::FrameInput;
use super::integrate::{Bounds, integrate};
use super::obstacle::RectObstacle;
use super::placement::place_with_rejection;
use super::scene::Viewport;
use crate::rand_between;
use crate::tuning::{PhysicsTuning, SkatingTuning};

/// A collectible token
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub pos: Vec2,
    pub alive: bool,
}

#[derive(Debug, Clone)]
pub struct Skating {
    pub player: Body,
    /// Respawn point, re-derived from the viewport every frame
    pub spawn: Vec2,
    pub hazards: Vec<RectObstacle>,
    pub tokens: Vec<Token>,
    pub collected: u32,
    /// Remaining invulnerability time
    pub shield: f32,
    /// Remaining freeze time before snapping back to spawn (0 = not frozen)
    pub freeze: f32,
    /// Viewport the current positions are laid out for
    viewport: Viewport,
    done: bool,
    tuning: SkatingTuning,
    physics: PhysicsTuning,
}

fn spawn_point(viewport: Viewport, tuning: &SkatingTuning) -> Vec2 {
    Vec2::new(
        viewport.width * tuning.spawn_frac.0,
        viewport.height * tuning.spawn_frac.1,
    )
}

impl Skating {
    pub fn new(
        viewport: Viewport,
        tuning: &SkatingTuning,
        physics: &PhysicsTuning,
        mut rng: Pcg32,
    ) -> Self {
        let spawn = spawn_point(viewport, tuning);
        let hazards = place_hazards(&mut rng, viewport, spawn, tuning);
        let tokens = place_tokens(&mut rng, viewport, &hazards, tuning);

        Self {
            player: Body::new(spawn, tuning.player_radius, tuning.max_speed),
            spawn,
            hazards,
            tokens,
            collected: 0,
            shield: tuning.start_shield,
            freeze: 0.0,
            viewport,
            done: false,
            tuning: tuning.clone(),
            physics: physics.clone(),
        }
    }

    pub fn token_goal(&self) -> u32 {
        self.tuning.token_goal
    }

    pub fn safe_radius(&self) -> f32 {
        self.tuning.safe_radius
    }

    pub fn is_complete(&self) -> bool {
        self.done
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze > 0.0
    }

    /// Nearest token still on the ice
    pub fn nearest_token(&self) -> Option<&Token> {
        self.tokens
            .iter()
            .filter(|t| t.alive)
            .min_by(|a, b| {
                let da = a.pos.distance_squared(self.player.pos);
                let db = b.pos.distance_squared(self.player.pos);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// Rescale the layout to a resized viewport so every token stays reachable
    fn fit(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        let scale = Vec2::new(
            viewport.width / self.viewport.width,
            viewport.height / self.viewport.height,
        );
        for token in &mut self.tokens {
            token.pos *= scale;
        }
        for hazard in &mut self.hazards {
            hazard.rect.min *= scale;
            hazard.rect.size.x *= scale.x;
        }
        self.player.pos *= scale;
        log::debug!("skating: rescaled rink by {:?}", scale);
        self.viewport = viewport;
    }

    fn respawn(&mut self, events: &mut Vec<GameEvent>) {
        self.player.pos = self.spawn;
        self.player.vel = Vec2::ZERO;
        self.freeze = 0.0;
        self.shield = self.tuning.reset_shield;
        events.push(GameEvent::Cue(Cue::Reset));
        events.push(GameEvent::Message("Reset!"));
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

        self.fit(viewport);
        for hazard in &mut self.hazards {
            hazard.advance(dt, viewport.width);
        }
        self.spawn = spawn_point(viewport, &self.tuning);
        self.shield = (self.shield - dt).max(0.0);
        let bounds = Bounds::new(Rect::new(0.0, 0.0, viewport.width, viewport.height));

        if self.is_frozen() {
            self.freeze -= dt;
            self.player.apply_damping(self.tuning.freeze_damping, dt);
            integrate(&mut self.player, dt, &bounds, &self.hazards, &self.physics);
            if self.freeze <= 0.0 {
                self.respawn(events);
            }
            return Progress::Continue;
        }

        self.player
            .accelerate(input.keys.direction(), self.tuning.key_accel, dt);
        if let Some(target) = input.steer_target() {
            self.player
                .steer_toward(target, self.tuning.pointer_accel, dt);
        }
        self.player.apply_damping(self.tuning.damping, dt);
        self.player.cap_speed();

        let contact = integrate(&mut self.player, dt, &bounds, &self.hazards, &self.physics);
        if contact.obstacle {
            let in_safe_zone = self.player.distance_to(self.spawn) < self.tuning.safe_radius;
            if self.shield <= 0.0 && !in_safe_zone {
                self.player.vel *= self.tuning.contact_slowdown;
                self.freeze = self.tuning.freeze_time;
                events.push(GameEvent::Cue(Cue::Collision));
                events.push(GameEvent::Message("Bonk!"));
                return Progress::Continue;
            }
        }

        let reach = self.tuning.pickup_radius;
        for token in self.tokens.iter_mut().filter(|t| t.alive) {
            if token.pos.distance(self.player.pos) < reach {
                token.alive = false;
                self.collected += 1;
                events.push(GameEvent::Points(self.tuning.points_per_token));
                events.push(GameEvent::Cue(Cue::Pickup));
                events.push(GameEvent::Message("Nice pickup!"));
            }
        }

        if self.collected >= self.tuning.token_goal {
            self.done = true;
            events.push(GameEvent::Cue(Cue::SceneClear));
            events.push(GameEvent::Message("Rink cleared!"));
            return Progress::Complete;
        }

        Progress::Continue
    }
}

fn place_hazards(
    rng: &mut Pcg32,
    viewport: Viewport,
    spawn: Vec2,
    tuning: &SkatingTuning,
) -> Vec<RectObstacle> {
    let (w, h) = (viewport.width, viewport.height);
    (0..tuning.hazard_count)
        .map(|_| {
            place_with_rejection(
                &mut *rng,
                tuning.placement_attempts,
                |r: &mut Pcg32| {
                    let hw = rand_between(r, w * tuning.hazard_width_frac.0, w * tuning.hazard_width_frac.1);
                    let hh = rand_between(r, tuning.hazard_height.0, tuning.hazard_height.1);
                    let x = rand_between(r, -hw, w);
                    let y = rand_between(
                        r,
                        h * tuning.hazard_band_frac.0,
                        h * tuning.hazard_band_frac.1 - hh,
                    );
                    let speed = rand_between(r, tuning.hazard_speed.0, tuning.hazard_speed.1);
                    let sign = if r.random_bool(0.5) { 1.0 } else { -1.0 };
                    RectObstacle::new(
                        Rect::new(x, y, hw, hh),
                        Vec2::new(speed * sign, 0.0),
                        tuning.hazard_edges,
                    )
                },
                |hazard| !hazard.rect.overlaps_circle(spawn, tuning.hazard_avoid_radius),
            )
            .value
        })
        .collect()
}

fn place_tokens(
    rng: &mut Pcg32,
    viewport: Viewport,
    hazards: &[RectObstacle],
    tuning: &SkatingTuning,
) -> Vec<Token> {
    let (mx, my) = tuning.token_margin;
    let mut tokens: Vec<Token> = Vec::with_capacity(tuning.token_goal as usize);

    for _ in 0..tuning.token_goal {
        let placed = place_with_rejection(
            &mut *rng,
            tuning.token_attempts,
            |r: &mut Pcg32| {
                Vec2::new(
                    rand_between(r, mx, viewport.width - mx),
                    rand_between(r, my, viewport.height - my),
                )
            },
            |p| {
                let clear_of_hazards = hazards
                    .iter()
                    .all(|hz| !hz.rect.inflate(tuning.token_hazard_clearance).contains(*p));
                let spaced = tokens
                    .iter()
                    .all(|t| t.pos.distance(*p) >= tuning.token_min_separation);
                clear_of_hazards && spaced
            },
        );
        tokens.push(Token {
            pos: placed.value,
            alive: true,
        });
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::HazardEdges;
    use rand::SeedableRng;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    fn fresh(seed: u64) -> Skating {
        Skating::new(
            viewport(),
            &SkatingTuning::default(),
            &PhysicsTuning::default(),
            Pcg32::seed_from_u64(seed),
        )
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    #[test]
    fn test_layout_respects_spawn_zone_and_spacing() {
        let tuning = SkatingTuning::default();
        for seed in 0..20 {
            let skating = fresh(seed);
            assert_eq!(skating.spawn, Vec2::new(400.0, 330.0));
            assert_eq!(skating.hazards.len(), 2);
            assert_eq!(skating.tokens.len(), 6);
            for hazard in &skating.hazards {
                assert!(!hazard.rect.overlaps_circle(skating.spawn, tuning.hazard_avoid_radius));
            }
            for token in &skating.tokens {
                assert!((70.0..=730.0).contains(&token.pos.x));
                assert!((80.0..=520.0).contains(&token.pos.y));
            }
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = fresh(42);
        let b = fresh(42);
        assert_eq!(a.tokens, b.tokens);
        assert_eq!(a.hazards[0].rect, b.hazards[0].rect);
    }

    #[test]
    fn test_pickup_awards_points() {
        let mut skating = fresh(3);
        skating.hazards.clear();
        skating.tokens = vec![Token {
            pos: skating.player.pos + Vec2::new(10.0, 0.0),
            alive: true,
        }];
        let mut events = Vec::new();
        skating.update(0.016, viewport(), &idle(), &mut events);
        assert_eq!(skating.collected, 1);
        assert!(events.contains(&GameEvent::Points(12)));
        assert!(events.contains(&GameEvent::Cue(Cue::Pickup)));
    }

    #[test]
    fn test_key_input_accelerates_player() {
        let mut skating = fresh(4);
        skating.hazards.clear();
        let mut input = idle();
        input.keys.right = true;
        let start = skating.player.pos.x;
        let mut events = Vec::new();
        for _ in 0..10 {
            skating.update(0.016, viewport(), &input, &mut events);
        }
        assert!(skating.player.pos.x > start);
        assert!(skating.player.speed() <= 620.0 + 1e-3);
    }

    fn bonk_setup() -> Skating {
        let mut skating = fresh(5);
        skating.tokens.clear();
        skating.shield = 0.0;
        skating.player.pos = Vec2::new(100.0, 100.0);
        skating.hazards = vec![RectObstacle::new(
            Rect::new(110.0, 80.0, 40.0, 40.0),
            Vec2::ZERO,
            HazardEdges::Wrap,
        )];
        skating
    }

    #[test]
    fn test_contact_freezes_then_resets_to_spawn() {
        let mut skating = bonk_setup();
        let mut events = Vec::new();
        skating.update(0.016, viewport(), &idle(), &mut events);
        assert!(events.contains(&GameEvent::Message("Bonk!")));
        assert!(skating.is_frozen());

        events.clear();
        for _ in 0..5 {
            skating.update(0.05, viewport(), &idle(), &mut events);
        }
        assert!(events.contains(&GameEvent::Message("Reset!")));
        assert!(!skating.is_frozen());
        assert_eq!(skating.player.pos, skating.spawn);
        assert_eq!(skating.player.vel, Vec2::ZERO);
        assert!(skating.shield > 1.0);
    }

    #[test]
    fn test_shield_forgives_contact() {
        let mut skating = bonk_setup();
        skating.shield = 1.0;
        let mut events = Vec::new();
        skating.update(0.016, viewport(), &idle(), &mut events);
        assert!(!skating.is_frozen());
        assert!(!events.contains(&GameEvent::Message("Bonk!")));
    }

    #[test]
    fn test_completion_fires_once() {
        let mut skating = fresh(6);
        skating.hazards.clear();
        let mut completions = 0;
        let mut events = Vec::new();
        for i in 0..skating.tokens.len() {
            skating.player.pos = skating.tokens[i].pos;
            skating.player.vel = Vec2::ZERO;
            if skating.update(0.016, viewport(), &idle(), &mut events) == Progress::Complete {
                completions += 1;
            }
        }
        for _ in 0..3 {
            if skating.update(0.016, viewport(), &idle(), &mut events) == Progress::Complete {
                completions += 1;
            }
        }
        assert_eq!(skating.collected, 6);
        assert_eq!(completions, 1);
        assert!(skating.is_complete());
    }

    #[test]
    fn test_shrunk_rink_can_still_be_cleared() {
        let large = Viewport::new(1200.0, 800.0);
        let small = Viewport::new(600.0, 400.0);
        let mut skating = Skating::new(
            large,
            &SkatingTuning::default(),
            &PhysicsTuning::default(),
            Pcg32::seed_from_u64(1),
        );
        skating.hazards.clear();
        let mut events = Vec::new();

        skating.update(0.016, small, &idle(), &mut events);
        for token in &skating.tokens {
            assert!(token.pos.x > 0.0 && token.pos.x < small.width);
            assert!(token.pos.y > 0.0 && token.pos.y < small.height);
        }

        let mut complete = false;
        for _ in 0..(120 * 60) {
            let Some(target) = skating.nearest_token().map(|t| t.pos) else {
                break;
            };
            let input = FrameInput {
                pointer_down: true,
                pointer: target,
                ..Default::default()
            };
            if skating.update(1.0 / 60.0, small, &input, &mut events) == Progress::Complete {
                complete = true;
                break;
            }
        }
        assert!(complete);
        assert_eq!(skating.collected, 6);
    }

    #[test]
    fn test_tiny_viewport_does_not_panic() {
        let tiny = Viewport::new(40.0, 30.0);
        let mut skating = Skating::new(
            tiny,
            &SkatingTuning::default(),
            &PhysicsTuning::default(),
            Pcg32::seed_from_u64(9),
        );
        let mut events = Vec::new();
        skating.update(0.016, tiny, &idle(), &mut events);
    }
}
