//! Scripted input that plays whichever mini-game is active
//!
//! Drives the native demo run and the progression tests.

use super::input::FrameInput;
use super::scene::{ActiveGame, Orchestrator};

/// Seconds of evader motion the chaser aims ahead by
const CHASE_LEAD: f32 = 0.25;

/// Input for the next tick of `orch`
pub fn drive(orch: &Orchestrator) -> FrameInput {
    let mut input = FrameInput::default();

    match orch.game() {
        ActiveGame::Karaoke(karaoke) => {
            input.tap = karaoke
                .nearest_live_note()
                .is_some_and(|(_, dist)| dist <= karaoke.perfect_tolerance());
        }
        ActiveGame::Skating(skating) => {
            if let Some(token) = skating.nearest_token() {
                input.pointer_down = true;
                input.pointer = token.pos;
            }
        }
        ActiveGame::Swimming(swimming) => {
            if !swimming.caught {
                let evader = &swimming.evader;
                input.pointer_down = true;
                input.pointer = evader.pos + evader.vel * CHASE_LEAD;
            }
        }
        ActiveGame::Proposal => {}
    }

    input
}
