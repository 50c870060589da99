//! Per-frame input snapshot
//!
//! The host records pointer and keyboard events into a `FrameInput` as they
//! arrive; the simulation only reads it, once per frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::normalize_or_fallback;

/// Currently held direction keys (WASD / arrows)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl DirectionKeys {
    /// Unit direction of the held keys (zero when idle or cancelled out)
    pub fn direction(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.left {
            dir.x -= 1.0;
        }
        if self.right {
            dir.x += 1.0;
        }
        if self.up {
            dir.y -= 1.0;
        }
        if self.down {
            dir.y += 1.0;
        }
        normalize_or_fallback(dir)
    }

    /// Update from a `KeyboardEvent.code` value; returns whether it was a direction key
    pub fn set_from_code(&mut self, code: &str, held: bool) -> bool {
        match code {
            "KeyW" | "ArrowUp" => self.up = held,
            "KeyS" | "ArrowDown" => self.down = held,
            "KeyA" | "ArrowLeft" => self.left = held,
            "KeyD" | "ArrowRight" => self.right = held,
            _ => return false,
        }
        true
    }
}

/// Input state sampled by the simulation each frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameInput {
    /// Primary pointer is held
    pub pointer_down: bool,
    /// Last known pointer position in play-area coordinates
    pub pointer: Vec2,
    /// A tap (pointer press or Space) happened since the last frame
    pub tap: bool,
    pub keys: DirectionKeys,
}

impl FrameInput {
    pub fn press_pointer(&mut self, at: Vec2) {
        self.pointer_down = true;
        self.tap = true;
        self.pointer = at;
    }

    /// Pointer moves only matter while held
    pub fn move_pointer(&mut self, at: Vec2) {
        if self.pointer_down {
            self.pointer = at;
        }
    }

    pub fn release_pointer(&mut self) {
        self.pointer_down = false;
    }

    /// Clear one-shot inputs after a frame has been simulated
    pub fn end_frame(&mut self) {
        self.tap = false;
    }

    /// Steering target while the pointer is held
    pub fn steer_target(&self) -> Option<Vec2> {
        self.pointer_down.then_some(self.pointer)
    }
}
