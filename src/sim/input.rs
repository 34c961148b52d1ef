//! Single-button input edges
//!
//! The game has exactly one action. Keyboard, pointer and touch all feed the
//! same raw "pressed" level, which the tracker turns into per-tick edges.

use serde::{Deserialize, Serialize};

/// What the mode layer sees of the button on one tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InputState {
    pub just_pressed: bool,
    pub is_held: bool,
    pub just_released: bool,
    /// Seconds the button has been held, including this tick
    pub hold_duration: f32,
}

impl InputState {
    /// A tap that starts this tick
    pub fn pressed() -> Self {
        Self {
            just_pressed: true,
            is_held: true,
            just_released: false,
            hold_duration: 0.0,
        }
    }

    pub fn held(hold_duration: f32) -> Self {
        Self {
            just_pressed: false,
            is_held: true,
            just_released: false,
            hold_duration,
        }
    }

    pub fn released(hold_duration: f32) -> Self {
        Self {
            just_pressed: false,
            is_held: false,
            just_released: true,
            hold_duration,
        }
    }
}

/// Edge detector over the raw pressed level
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    was_pressed: bool,
    hold_duration: f32,
}

impl InputTracker {
    pub fn update(&mut self, pressed: bool, dt: f32) -> InputState {
        let just_pressed = pressed && !self.was_pressed;
        let just_released = !pressed && self.was_pressed;

        if just_pressed {
            self.hold_duration = 0.0;
        } else if pressed {
            self.hold_duration += dt;
        }

        let state = InputState {
            just_pressed,
            is_held: pressed,
            just_released,
            hold_duration: self.hold_duration,
        };

        if just_released {
            self.hold_duration = 0.0;
        }
        self.was_pressed = pressed;
        state
    }

    /// Forget the held button (restart, respawn)
    pub fn reset(&mut self) {
        self.was_pressed = false;
        self.hold_duration = 0.0;
    }
}
