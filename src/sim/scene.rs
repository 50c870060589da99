//! Scene flow: Karaoke -> Skating -> Swimming -> Proposal
//!
//! The orchestrator owns exactly one live mini-game. Completion pauses the
//! flow and reports the next scene; the host shows its overlay and calls
//! [`Orchestrator::advance`] to build that scene from the current viewport.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::event::{FrameReport, Progress, StepOutcome};
use super::input::FrameInput;
use super::karaoke::Karaoke;
use super::skating::Skating;
use super::swimming::Swimming;
use crate::tuning::Tuning;

/// Which part of the experience is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scene {
    Karaoke,
    Skating,
    Swimming,
    /// Terminal: the final question
    Proposal,
}

impl Scene {
    /// Successor in the fixed scene order
    pub fn next(self) -> Scene {
        match self {
            Scene::Karaoke => Scene::Skating,
            Scene::Skating => Scene::Swimming,
            Scene::Swimming => Scene::Proposal,
            Scene::Proposal => {
                debug_assert!(false, "Proposal has no successor");
                Scene::Proposal
            }
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Scene::Karaoke => "Karaoke",
            Scene::Skating => "Skating",
            Scene::Swimming => "Swimming",
            Scene::Proposal => "Proposal",
        }
    }
}

/// Play-area size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }
}

/// The live mini-game
#[derive(Debug, Clone)]
pub enum ActiveGame {
    Karaoke(Karaoke),
    Skating(Skating),
    Swimming(Swimming),
    Proposal,
}

/// Owns the scene state, score and the active mini-game
#[derive(Debug, Clone)]
pub struct Orchestrator {
    tuning: Tuning,
    viewport: Viewport,
    rng: Pcg32,
    scene: Scene,
    game: ActiveGame,
    /// Updates run only while true (false under any overlay)
    running: bool,
    score: u32,
    /// Scene reported complete but not yet advanced to
    pending: Option<Scene>,
}

impl Orchestrator {
    /// A fresh run at Karaoke, paused behind the intro overlay
    pub fn new(tuning: Tuning, viewport: Viewport, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let game = build_game(Scene::Karaoke, &tuning, viewport, &mut rng);
        Self {
            tuning,
            viewport,
            rng,
            scene: Scene::Karaoke,
            game,
            running: false,
            score: 0,
            pending: None,
        }
    }

    pub fn scene(&self) -> Scene {
        self.scene
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn pending(&self) -> Option<Scene> {
        self.pending
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn game(&self) -> &ActiveGame {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut ActiveGame {
        &mut self.game
    }

    fn rebuild(&mut self) {
        self.game = build_game(self.scene, &self.tuning, self.viewport, &mut self.rng);
    }

    /// Dismiss the intro overlay: rebuild the current scene at `viewport` and run
    ///
    /// Ignored while a cleared scene waits for [`Orchestrator::advance`].
    pub fn start(&mut self, viewport: Viewport) {
        if self.scene == Scene::Proposal {
            log::warn!("start: already at the proposal");
            return;
        }
        if let Some(next) = self.pending {
            log::warn!("start: {} is waiting to be advanced to", next.title());
            return;
        }
        self.viewport = viewport;
        self.rebuild();
        self.running = true;
        log::info!("Started {} ({}x{})", self.scene.title(), viewport.width, viewport.height);
    }

    /// Advance the active mini-game by one frame
    pub fn tick(&mut self, dt: f32, input: &FrameInput) -> FrameReport {
        if !self.running {
            return FrameReport::idle();
        }
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.tuning.max_frame_dt)
        } else {
            0.0
        };

        let mut events = Vec::new();
        let viewport = self.viewport;
        let progress = match &mut self.game {
            ActiveGame::Karaoke(game) => game.update(dt, viewport, input, &mut events),
            ActiveGame::Skating(game) => game.update(dt, viewport, input, &mut events),
            ActiveGame::Swimming(game) => game.update(dt, viewport, input, &mut events),
            ActiveGame::Proposal => Progress::Continue,
        };

        let mut report = FrameReport {
            outcome: StepOutcome::Continue,
            events,
        };
        self.score = self.score.saturating_add(report.points());

        if progress == Progress::Complete {
            self.running = false;
            let next = self.scene.next();
            if next == Scene::Proposal {
                self.scene = Scene::Proposal;
                self.game = ActiveGame::Proposal;
                report.outcome = StepOutcome::TerminalReached;
                log::info!("Proposal reached with score {}", self.score);
            } else {
                self.pending = Some(next);
                report.outcome = StepOutcome::SceneComplete(next);
                log::info!("{} complete, next up {}", self.scene.title(), next.title());
            }
        }

        report
    }

    /// Build the pending scene from `viewport` and resume
    ///
    /// Returns the scene now active, or `None` when nothing was pending.
    pub fn advance(&mut self, viewport: Viewport) -> Option<Scene> {
        let Some(next) = self.pending.take() else {
            log::warn!("advance: no scene transition pending");
            return None;
        };
        self.viewport = viewport;
        self.scene = next;
        self.rebuild();
        self.running = true;
        log::info!("Entering {}", next.title());
        Some(next)
    }

    /// Remember the latest viewport for subsequent frames and scene builds
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport != self.viewport {
            log::debug!("resize: {}x{}", viewport.width, viewport.height);
            self.viewport = viewport;
        }
    }

    /// Throw away all progress and return to the paused intro
    pub fn reset(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.scene = Scene::Karaoke;
        self.score = 0;
        self.pending = None;
        self.running = false;
        self.rebuild();
        log::info!("Reset to {}", self.scene.title());
    }
}

/// Construct `scene` with its own RNG drawn from the run's seeded stream
fn build_game(scene: Scene, tuning: &Tuning, viewport: Viewport, rng: &mut Pcg32) -> ActiveGame {
    let child = Pcg32::seed_from_u64(rng.random::<u64>());
    match scene {
        Scene::Karaoke => ActiveGame::Karaoke(Karaoke::new(viewport, &tuning.karaoke)),
        Scene::Skating => {
            ActiveGame::Skating(Skating::new(viewport, &tuning.skating, &tuning.physics, child))
        }
        Scene::Swimming => {
            ActiveGame::Swimming(Swimming::new(viewport, &tuning.swimming, &tuning.physics, child))
        }
        Scene::Proposal => ActiveGame::Proposal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::event::GameEvent;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    #[test]
    fn test_scene_order() {
        assert_eq!(Scene::Karaoke.next(), Scene::Skating);
        assert_eq!(Scene::Skating.next(), Scene::Swimming);
        assert_eq!(Scene::Swimming.next(), Scene::Proposal);
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn test_proposal_has_no_successor() {
        Scene::Proposal.next();
    }

    #[test]
    fn test_new_run_is_paused_at_karaoke() {
        let mut orch = Orchestrator::new(Tuning::default(), viewport(), 1);
        assert_eq!(orch.scene(), Scene::Karaoke);
        assert!(!orch.running());
        assert_eq!(orch.tick(0.016, &FrameInput::default()), FrameReport::idle());
        orch.start(viewport());
        assert!(orch.running());
    }

    #[test]
    fn test_points_accumulate_into_score() {
        let mut orch = Orchestrator::new(Tuning::default(), viewport(), 2);
        orch.start(viewport());
        if let ActiveGame::Karaoke(k) = orch.game_mut() {
            k.notes[0].y = k.line_y;
            k.notes[0].speed = 0.0;
        }
        let tap = FrameInput {
            tap: true,
            ..Default::default()
        };
        let report = orch.tick(0.016, &tap);
        assert!(report.events.contains(&GameEvent::Points(10)));
        assert_eq!(orch.score(), 10);
    }

    #[test]
    fn test_completion_pauses_and_advance_builds_next() {
        let mut orch = Orchestrator::new(Tuning::default(), viewport(), 3);
        orch.start(viewport());
        if let ActiveGame::Karaoke(k) = orch.game_mut() {
            k.hits = 7;
            k.notes[0].y = k.line_y;
            k.notes[0].speed = 0.0;
        }
        let tap = FrameInput {
            tap: true,
            ..Default::default()
        };
        let report = orch.tick(0.016, &tap);
        assert_eq!(report.outcome, StepOutcome::SceneComplete(Scene::Skating));
        assert!(!orch.running());
        assert_eq!(orch.tick(0.016, &tap).outcome, StepOutcome::Continue);

        let wide = Viewport::new(1000.0, 700.0);
        assert_eq!(orch.advance(wide), Some(Scene::Skating));
        assert!(orch.running());
        match orch.game() {
            ActiveGame::Skating(s) => assert_eq!(s.spawn.x, 500.0),
            other => panic!("expected skating, got {:?}", other),
        }
        assert_eq!(orch.advance(wide), None);
    }

    #[test]
    fn test_reset_returns_to_intro() {
        let mut orch = Orchestrator::new(Tuning::default(), viewport(), 4);
        orch.start(viewport());
        if let ActiveGame::Karaoke(k) = orch.game_mut() {
            k.hits = 7;
            k.notes[0].y = k.line_y;
        }
        orch.tick(0.0, &FrameInput { tap: true, ..Default::default() });
        assert!(orch.pending().is_some());

        orch.reset(viewport());
        assert_eq!(orch.scene(), Scene::Karaoke);
        assert_eq!(orch.score(), 0);
        assert_eq!(orch.pending(), None);
        assert!(!orch.running());
        assert!(matches!(orch.game(), ActiveGame::Karaoke(k) if k.hits == 0));
    }

    #[test]
    fn test_bad_dt_is_clamped() {
        let mut orch = Orchestrator::new(Tuning::default(), viewport(), 5);
        orch.start(viewport());
        let before = match orch.game() {
            ActiveGame::Karaoke(k) => k.notes[0].y,
            _ => unreachable!(),
        };
        orch.tick(f32::NAN, &FrameInput::default());
        orch.tick(-1.0, &FrameInput::default());
        let after = match orch.game() {
            ActiveGame::Karaoke(k) => k.notes[0].y,
            _ => unreachable!(),
        };
        assert_eq!(before, after);

        orch.tick(10.0, &FrameInput::default());
        let stepped = match orch.game() {
            ActiveGame::Karaoke(k) => k.notes[0].y,
            _ => unreachable!(),
        };
        // At most one 0.05s step of a 390/s fall
        assert!(stepped - after <= 390.0 * 0.05 + 1e-3);
    }

    #[test]
    fn test_start_does_not_replay_a_cleared_scene() {
        let mut orch = Orchestrator::new(Tuning::default(), viewport(), 6);
        orch.start(viewport());
        if let ActiveGame::Karaoke(k) = orch.game_mut() {
            k.hits = 7;
            k.notes[0].y = k.line_y;
        }
        orch.tick(0.0, &FrameInput { tap: true, ..Default::default() });
        assert_eq!(orch.pending(), Some(Scene::Skating));

        orch.start(viewport());
        assert!(!orch.running());
        assert_eq!(orch.pending(), Some(Scene::Skating));
        assert!(matches!(orch.game(), ActiveGame::Karaoke(k) if k.is_complete()));

        assert_eq!(orch.advance(viewport()), Some(Scene::Skating));
        assert!(orch.running());
    }

    #[test]
    fn test_resize_relayouts_running_karaoke() {
        let mut orch = Orchestrator::new(Tuning::default(), viewport(), 7);
        orch.start(viewport());
        let small = Viewport::new(400.0, 300.0);
        orch.resize(small);
        orch.tick(0.016, &FrameInput::default());
        match orch.game() {
            ActiveGame::Karaoke(k) => {
                assert_eq!(k.lane_x, 200.0);
                assert!((k.line_y - 240.0).abs() < 1e-3);
            }
            other => panic!("expected karaoke, got {:?}", other),
        }
    }
}
