//! Data-driven game balance
//!
//! Every gameplay constant lives here so difficulty can be tuned without
//! touching the simulation. Sections deserialize with `#[serde(default)]`,
//! so an override only needs the fields it changes.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_FRAME_DT;

/// Restitution and damping used by the integrator and collision resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Velocity kept (reflected) when a body hits the play-area boundary
    pub wall_restitution: f32,
    /// Normal restitution for circle vs. rectangle contacts
    pub rect_restitution: f32,
    /// Uniform velocity multiplier after a circle vs. rectangle contact
    pub rect_damping: f32,
    /// Normal restitution for circle vs. circle contacts
    pub circle_restitution: f32,
    /// Uniform velocity multiplier after a circle vs. circle contact
    pub circle_damping: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            wall_restitution: 0.85,
            rect_restitution: 0.76,
            rect_damping: 0.92,
            circle_restitution: 0.78,
            circle_damping: 0.94,
        }
    }
}

/// Rhythm mini-game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KaraokeTuning {
    /// Hit line height as a fraction of viewport height
    pub line_y_frac: f32,
    /// Seconds between note spawns
    pub spawn_every: f32,
    /// Notes spawned over the whole round
    pub total_notes: u32,
    /// Hits needed to clear the round
    pub hits_to_win: u32,
    /// Maximum |note - line| for a hit
    pub hit_tolerance: f32,
    /// Maximum |note - line| for a perfect hit
    pub perfect_tolerance: f32,
    /// Distance past the line after which a note counts as missed
    pub late_tolerance: f32,
    /// Minimum fall speed (units/s)
    pub min_fall_speed: f32,
    /// Fall speed as a fraction of viewport height per second
    pub fall_speed_frac: f32,
    /// Spawn height of new notes
    pub spawn_y: f32,
    pub note_radius: f32,
    pub points_per_hit: u32,
}

impl Default for KaraokeTuning {
    fn default() -> Self {
        Self {
            line_y_frac: 0.80,
            spawn_every: 0.70,
            total_notes: 14,
            hits_to_win: 8,
            hit_tolerance: 30.0,
            perfect_tolerance: 13.0,
            late_tolerance: 70.0,
            min_fall_speed: 260.0,
            fall_speed_frac: 0.65,
            spawn_y: -30.0,
            note_radius: 16.0,
            points_per_hit: 10,
        }
    }
}

/// How skating hazards behave at the rink edges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HazardEdges {
    /// Leave one side, re-enter from the other
    Wrap,
    /// Reverse direction inside a horizontal margin
    Bounce { margin: f32 },
}

/// Collection/hazard mini-game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkatingTuning {
    pub player_radius: f32,
    /// Spawn point as fractions of the viewport
    pub spawn_frac: (f32, f32),
    /// Radius around spawn where hazard contact is forgiven
    pub safe_radius: f32,
    /// Radius around spawn that hazards must not overlap when placed
    pub hazard_avoid_radius: f32,
    pub hazard_count: u32,
    pub hazard_width_frac: (f32, f32),
    pub hazard_height: (f32, f32),
    pub hazard_speed: (f32, f32),
    /// Vertical placement band as fractions of the viewport height
    pub hazard_band_frac: (f32, f32),
    pub hazard_edges: HazardEdges,
    pub placement_attempts: u32,
    pub token_goal: u32,
    pub token_margin: (f32, f32),
    /// Clearance between a token and any hazard at placement time
    pub token_hazard_clearance: f32,
    pub token_min_separation: f32,
    pub token_attempts: u32,
    pub pickup_radius: f32,
    pub points_per_token: u32,
    pub key_accel: f32,
    pub pointer_accel: f32,
    pub damping: f32,
    pub max_speed: f32,
    /// Invulnerability after the round starts
    pub start_shield: f32,
    /// Invulnerability after a reset
    pub reset_shield: f32,
    /// Velocity multiplier applied on contact
    pub contact_slowdown: f32,
    /// Damping base while frozen before the reset
    pub freeze_damping: f32,
    /// Seconds frozen before snapping back to spawn
    pub freeze_time: f32,
}

impl Default for SkatingTuning {
    fn default() -> Self {
        Self {
            player_radius: 14.0,
            spawn_frac: (0.5, 0.55),
            safe_radius: 150.0,
            hazard_avoid_radius: 140.0,
            hazard_count: 2,
            hazard_width_frac: (0.18, 0.26),
            hazard_height: (22.0, 34.0),
            hazard_speed: (120.0, 190.0),
            hazard_band_frac: (0.22, 0.84),
            hazard_edges: HazardEdges::Wrap,
            placement_attempts: 80,
            token_goal: 6,
            token_margin: (70.0, 80.0),
            token_hazard_clearance: 56.0,
            token_min_separation: 66.0,
            token_attempts: 90,
            pickup_radius: 32.0,
            points_per_token: 12,
            key_accel: 1750.0,
            pointer_accel: 1350.0,
            damping: 0.90,
            max_speed: 620.0,
            start_shield: 1.4,
            reset_shield: 1.2,
            contact_slowdown: 0.18,
            freeze_damping: 0.55,
            freeze_time: 0.22,
        }
    }
}

/// Pursuit mini-game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwimmingTuning {
    /// Pool rectangle as fractions of the viewport (x, y, w, h)
    pub pool_frac: (f32, f32, f32, f32),
    pub chaser_start_frac: (f32, f32),
    pub evader_start_frac: (f32, f32),
    pub chaser_radius: f32,
    pub evader_radius: f32,

    pub buoy_count: u32,
    pub buoy_radius: f32,
    pub buoy_speed: (f32, f32),
    pub buoy_max_speed: f32,
    pub buoy_padding: f32,
    pub buoy_start_clearance: f32,
    pub buoy_attempts: u32,

    pub chaser_accel: f32,
    pub chaser_pointer_accel: f32,
    pub chaser_damping: f32,
    pub chaser_max_speed: f32,
    /// Velocity multiplier when the chaser touches a buoy
    pub chaser_buoy_penalty: f32,

    /// Distance at which panic starts rising from 0
    pub panic_radius: f32,
    pub evader_accel: f32,
    pub evader_damping: f32,
    pub evader_max_speed: f32,
    pub seek_weight: f32,
    pub flee_weight: f32,
    pub dodge_weight: f32,
    pub dodge_panic_weight: f32,
    pub dodge_range: f32,
    pub wall_margin: f32,
    pub wall_strength: f32,
    pub wall_weight: f32,
    pub buoy_avoid_extra: f32,
    pub buoy_avoid_weight: f32,

    pub target_candidates: u32,
    pub target_inset: f32,
    pub target_edge_penalty: f32,
    pub target_reached: f32,
    pub target_interval: (f32, f32),
    pub handedness_flip_chance: f64,

    pub stuck_threshold: f32,
    pub stuck_timeout: f32,
    pub unstick_impulse: f32,
    pub unstick_jitter: f32,

    pub catch_radius: f32,
    pub tag_hold: f32,
    pub catch_points: u32,
    pub post_catch_damping: f32,
    /// Per-frame (60 fps) fraction of the gap the evader closes after a catch
    pub post_catch_pull: f32,
    pub dwell_time: f32,
}

impl Default for SwimmingTuning {
    fn default() -> Self {
        Self {
            pool_frac: (0.08, 0.10, 0.84, 0.82),
            chaser_start_frac: (0.30, 0.55),
            evader_start_frac: (0.70, 0.40),
            chaser_radius: 26.0,
            evader_radius: 26.0,

            buoy_count: 2,
            buoy_radius: 22.0,
            buoy_speed: (70.0, 65.0),
            buoy_max_speed: 190.0,
            buoy_padding: 18.0,
            buoy_start_clearance: 180.0,
            buoy_attempts: 80,

            chaser_accel: 1350.0,
            chaser_pointer_accel: 1300.0,
            chaser_damping: 0.93,
            chaser_max_speed: 470.0,
            chaser_buoy_penalty: 0.88,

            panic_radius: 380.0,
            evader_accel: 1500.0,
            evader_damping: 0.945,
            evader_max_speed: 380.0,
            seek_weight: 0.55,
            flee_weight: 0.55,
            dodge_weight: 0.30,
            dodge_panic_weight: 0.35,
            dodge_range: 210.0,
            wall_margin: 92.0,
            wall_strength: 1.35,
            wall_weight: 0.95,
            buoy_avoid_extra: 85.0,
            buoy_avoid_weight: 1.1,

            target_candidates: 14,
            target_inset: 40.0,
            target_edge_penalty: 520.0,
            target_reached: 70.0,
            target_interval: (0.35, 0.8),
            handedness_flip_chance: 0.55,

            stuck_threshold: 0.30,
            stuck_timeout: 0.35,
            unstick_impulse: 260.0,
            unstick_jitter: 80.0,

            catch_radius: 42.0,
            tag_hold: 0.35,
            catch_points: 25,
            post_catch_damping: 0.85,
            post_catch_pull: 0.10,
            dwell_time: 1.35,
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Largest frame delta fed to the simulation
    pub max_frame_dt: f32,
    pub physics: PhysicsTuning,
    pub karaoke: KaraokeTuning,
    pub skating: SkatingTuning,
    pub swimming: SwimmingTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_frame_dt: MAX_FRAME_DT,
            physics: PhysicsTuning::default(),
            karaoke: KaraokeTuning::default(),
            skating: SkatingTuning::default(),
            swimming: SwimmingTuning::default(),
        }
    }
}

/// Clamp `value` into `[lo, hi]`, logging when it had to move
fn clamp_logged(name: &str, value: &mut f32, lo: f32, hi: f32) {
    let clamped = if value.is_nan() { lo } else { value.clamp(lo, hi) };
    if clamped != *value {
        log::warn!("tuning: {} = {} out of range, using {}", name, value, clamped);
        *value = clamped;
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override and sanitize it
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut tuning: Tuning = serde_json::from_str(json)?;
        tuning.sanitize();
        Ok(tuning)
    }

    /// Parse an override, falling back to defaults on malformed input
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("tuning: ignoring malformed override ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Pull coefficients back into ranges the simulation can handle
    pub fn sanitize(&mut self) {
        clamp_logged("max_frame_dt", &mut self.max_frame_dt, 0.001, 0.25);

        let p = &mut self.physics;
        clamp_logged("physics.wall_restitution", &mut p.wall_restitution, 0.0, 1.0);
        clamp_logged("physics.rect_restitution", &mut p.rect_restitution, 0.0, 1.0);
        clamp_logged("physics.rect_damping", &mut p.rect_damping, 0.0, 1.0);
        clamp_logged("physics.circle_restitution", &mut p.circle_restitution, 0.0, 1.0);
        clamp_logged("physics.circle_damping", &mut p.circle_damping, 0.0, 1.0);

        let k = &mut self.karaoke;
        clamp_logged("karaoke.spawn_every", &mut k.spawn_every, 0.05, 10.0);
        clamp_logged("karaoke.hit_tolerance", &mut k.hit_tolerance, 1.0, 500.0);
        clamp_logged(
            "karaoke.perfect_tolerance",
            &mut k.perfect_tolerance,
            0.0,
            k.hit_tolerance,
        );
        if k.hits_to_win > k.total_notes {
            log::warn!(
                "tuning: karaoke.hits_to_win {} exceeds total_notes {}, clamping",
                k.hits_to_win,
                k.total_notes
            );
            k.hits_to_win = k.total_notes;
        }

        let s = &mut self.skating;
        clamp_logged("skating.damping", &mut s.damping, 0.0, 1.0);
        clamp_logged("skating.freeze_damping", &mut s.freeze_damping, 0.0, 1.0);
        clamp_logged("skating.contact_slowdown", &mut s.contact_slowdown, 0.0, 1.0);
        clamp_logged("skating.player_radius", &mut s.player_radius, 1.0, 200.0);

        let w = &mut self.swimming;
        clamp_logged("swimming.chaser_damping", &mut w.chaser_damping, 0.0, 1.0);
        clamp_logged("swimming.evader_damping", &mut w.evader_damping, 0.0, 1.0);
        clamp_logged("swimming.post_catch_damping", &mut w.post_catch_damping, 0.0, 1.0);
        clamp_logged("swimming.post_catch_pull", &mut w.post_catch_pull, 0.0, 1.0);
        clamp_logged("swimming.panic_radius", &mut w.panic_radius, 1.0, 10_000.0);
        clamp_logged("swimming.wall_margin", &mut w.wall_margin, 1.0, 10_000.0);
        if w.target_candidates == 0 {
            log::warn!("tuning: swimming.target_candidates must be at least 1");
            w.target_candidates = 1;
        }
    }

    /// LocalStorage key for a developer override
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "proposal_quest_tuning";

    /// Load a tuning override from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                log::info!("Loaded tuning override from LocalStorage");
                return Self::from_json_or_default(&json);
            }
        }

        log::info!("Using default tuning");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "karaoke": { "hits_to_win": 5 } }"#).unwrap();
        assert_eq!(tuning.karaoke.hits_to_win, 5);
        assert_eq!(tuning.karaoke.total_notes, 14);
        assert_eq!(tuning.skating, SkatingTuning::default());
    }

    #[test]
    fn test_sanitize_clamps_coefficients() {
        let tuning =
            Tuning::from_json(r#"{ "physics": { "wall_restitution": 3.0 }, "max_frame_dt": 9.0 }"#)
                .unwrap();
        assert_eq!(tuning.physics.wall_restitution, 1.0);
        assert_eq!(tuning.max_frame_dt, 0.25);
    }

    #[test]
    fn test_hits_to_win_never_exceeds_total() {
        let tuning =
            Tuning::from_json(r#"{ "karaoke": { "hits_to_win": 40, "total_notes": 10 } }"#)
                .unwrap();
        assert_eq!(tuning.karaoke.hits_to_win, 10);
    }

    #[test]
    fn test_malformed_override_falls_back() {
        assert_eq!(Tuning::from_json_or_default("{ not json"), Tuning::default());
    }

    #[test]
    fn test_hazard_edges_round_trip_variant() {
        let tuning = Tuning::from_json(
            r#"{ "skating": { "hazard_edges": { "Bounce": { "margin": 16.0 } } } }"#,
        )
        .unwrap();
        assert_eq!(tuning.skating.hazard_edges, HazardEdges::Bounce { margin: 16.0 });
    }
}
