//! Proposal Quest - three mini-games and a question
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, mini-games, scene flow)
//! - `tuning`: Data-driven game balance
//! - `audio`: Feedback cues as Web Audio beeps (wasm only)
//! - `view`: Canvas2D/DOM presentation (wasm only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod sim;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod view;

pub use tuning::Tuning;

use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Largest frame delta the simulation will ever integrate (a stalled or
    /// backgrounded tab resumes with one small step, not a huge one)
    pub const MAX_FRAME_DT: f32 = 0.05;
    /// Nominal frame delta used when no previous timestamp exists
    pub const NOMINAL_DT: f32 = 1.0 / 60.0;

    /// Distance a body may travel per integration sub-step
    pub const SUBSTEP_DISTANCE: f32 = 18.0;
    /// Maximum sub-steps per integration call
    pub const MAX_SUBSTEPS: u32 = 7;

    /// Reference frame rate for per-frame damping constants
    pub const DAMPING_REFERENCE_FPS: f32 = 60.0;
}

/// Convert a "per frame at 60 fps" multiplier into the multiplier for `dt`
#[inline]
pub fn damp_factor(base: f32, dt: f32) -> f32 {
    base.powf(dt * consts::DAMPING_REFERENCE_FPS)
}

/// Uniform sample in `[a, b)`; collapses to `a` for empty or inverted ranges
#[inline]
pub fn rand_between<R: Rng + ?Sized>(rng: &mut R, a: f32, b: f32) -> f32 {
    if b > a { rng.random_range(a..b) } else { a }
}

/// Normalize `v`, treating a zero length as 1 so the result is zero, not NaN
#[inline]
pub fn normalize_or_fallback(v: glam::Vec2) -> glam::Vec2 {
    let len = v.length();
    if len > 0.0 { v / len } else { v }
}
