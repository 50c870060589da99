//! Events and outcomes flowing from the simulation to the presentation layer

use serde::{Deserialize, Serialize};

use super::scene::Scene;

/// Kinds of audible/visual feedback the presentation layer may render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cue {
    Perfect,
    Good,
    Miss,
    Pickup,
    Collision,
    Reset,
    Catch,
    SceneClear,
}

/// A discrete feedback event emitted during a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Show a transient toast
    Message(&'static str),
    /// Add to the cumulative score
    Points(u32),
    /// Play a feedback cue
    Cue(Cue),
}

/// Result of one mini-game update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Continue,
    /// Reported exactly once, on the frame the win condition is first met
    Complete,
}

/// Result of one orchestrator tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    Continue,
    /// The active mini-game was cleared; `advance` will start this scene
    SceneComplete(Scene),
    /// The pursuit mini-game finished its catch; the proposal is up
    TerminalReached,
}

/// Everything a single tick produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReport {
    pub outcome: StepOutcome,
    pub events: Vec<GameEvent>,
}

impl FrameReport {
    pub fn idle() -> Self {
        Self {
            outcome: StepOutcome::Continue,
            events: Vec::new(),
        }
    }

    /// Messages emitted this frame, in order
    pub fn messages(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.events.iter().filter_map(|e| match e {
            GameEvent::Message(text) => Some(*text),
            _ => None,
        })
    }

    /// Points awarded this frame
    pub fn points(&self) -> u32 {
        self.events
            .iter()
            .map(|e| match e {
                GameEvent::Points(n) => *n,
                _ => 0,
            })
            .sum()
    }
}
