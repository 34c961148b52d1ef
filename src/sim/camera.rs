//! Play-field boundaries and the follow camera

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::BLOCK_SIZE;
use crate::lerp;
use crate::tuning::Tuning;

/// Ground and ceiling lines for the current viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub ground_y: f32,
    pub ceiling_y: f32,
}

impl Arena {
    /// Ground at 75% of the viewport height, ceiling at 10%
    pub fn from_viewport_height(height: f32) -> Self {
        Self {
            ground_y: (height * 0.75).floor(),
            ceiling_y: (height * 0.1).floor(),
        }
    }

    pub fn height(&self) -> f32 {
        self.ground_y - self.ceiling_y
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::from_viewport_height(600.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// World position of the view's top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub zoom: f32,
    pub target_zoom: f32,
    pub offset: Vec2,
    pub target_offset: Vec2,
    pub shake: f32,
    pub follow_player: bool,
    pub follow_y: bool,
    pub mirrored: bool,
}

impl Camera {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::ZERO,
            width,
            height,
            zoom: 1.0,
            target_zoom: 1.0,
            offset: Vec2::ZERO,
            target_offset: Vec2::ZERO,
            shake: 0.0,
            follow_player: true,
            follow_y: false,
            mirrored: false,
        }
    }

    pub fn update(&mut self, player_pos: Vec2, dt: f32, tuning: &Tuning) {
        let smoothing = tuning.camera_smoothing;

        if self.follow_player {
            self.pos.x = player_pos.x - self.width * tuning.camera_lead / self.zoom;
        }
        if self.follow_y {
            let target_y = player_pos.y - self.height / 2.0 / self.zoom;
            self.pos.y = lerp(self.pos.y, target_y, smoothing);
        }

        if (self.zoom - self.target_zoom).abs() > 0.001 {
            self.zoom = lerp(self.zoom, self.target_zoom, smoothing);
        }
        self.offset = self.offset.lerp(self.target_offset, smoothing);

        if self.shake > 0.0 {
            self.shake = (self.shake - tuning.camera_shake_decay * dt).max(0.0);
        }
    }

    pub fn start_shake(&mut self, amount: f32) {
        self.shake = amount;
    }

    /// Random jitter for the current shake amount
    pub fn shake_offset(&self, rng: &mut impl Rng) -> Vec2 {
        if self.shake <= 0.0 {
            return Vec2::ZERO;
        }
        let jitter = |r: f32| (r - 0.5) * self.shake * 2.0;
        Vec2::new(jitter(rng.random()), jitter(rng.random()))
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.pos) * self.zoom + self.offset
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.offset) / self.zoom + self.pos
    }

    /// Inside the view plus a two-block margin
    pub fn is_visible(&self, pos: Vec2, size: Vec2) -> bool {
        let margin = BLOCK_SIZE * 2.0;
        pos.x + size.x > self.pos.x - margin
            && pos.x < self.pos.x + self.width / self.zoom + margin
            && pos.y + size.y > self.pos.y - margin
            && pos.y < self.pos.y + self.height / self.zoom + margin
    }

    pub fn reset(&mut self) {
        *self = Camera::new(self.width, self.height);
    }
}
