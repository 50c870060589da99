//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied frame delta, clamped by the orchestrator
//! - Seeded RNG only (one `Pcg32` per mini-game, drawn from the run seed)
//! - Input sampled once per frame from a `FrameInput` snapshot
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod body;
pub mod collision;
pub mod event;
pub mod input;
pub mod integrate;
pub mod karaoke;
pub mod obstacle;
pub mod placement;
pub mod scene;
pub mod skating;
pub mod swimming;

pub use body::Body;
pub use collision::{
    Collider, CollisionResult, Rect, circle_circle_contact, circle_rect_contact,
    circle_rect_contact_heading, resolve_circle_circle, resolve_circle_rect,
};
pub use event::{Cue, FrameReport, GameEvent, Progress, StepOutcome};
pub use input::{DirectionKeys, FrameInput};
pub use integrate::{Bounds, Contact, integrate, substep_count};
pub use karaoke::{HitQuality, Karaoke, Note};
pub use obstacle::{CircleObstacle, RectObstacle};
pub use placement::{Placement, place_with_rejection};
pub use scene::{ActiveGame, Orchestrator, Scene, Viewport};
pub use skating::{Skating, Token};
pub use swimming::{StuckMonitor, Swimming};
