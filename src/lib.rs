//! Beatdash - runtime core of a side-scrolling rhythm platformer
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (modes, physics, collision, triggers, game state)
//! - `level`: Level declaration loading, validation and parsing
//! - `tuning`: Data-driven game balance
//! - `audio`: Audio collaborator contract (safe to no-op)
//! - `progress`: Progression contract (stars, coins, attempts)

pub mod audio;
pub mod level;
pub mod progress;
pub mod sim;
pub mod tuning;

pub use progress::Progression;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Base unit every piece of level geometry is expressed in (pixels)
    pub const BLOCK_SIZE: f32 = 30.0;
    /// Collision grid cell edge, in blocks
    pub const GRID_CELL_BLOCKS: f32 = 4.0;
    /// Upper bound on elapsed time fed into a single tick (seconds)
    pub const MAX_FRAME_DT: f32 = 0.05;

    /// Number of discrete horizontal speeds
    pub const SPEED_COUNT: usize = 5;
    /// Speed index a level starts with when it declares none
    pub const DEFAULT_SPEED_INDEX: usize = 1;

    /// Default level tempo
    pub const DEFAULT_BPM: f32 = 120.0;
    pub const MIN_BPM: f32 = 30.0;
    pub const MAX_BPM: f32 = 400.0;

    /// Level length limits, in blocks
    pub const MIN_LEVEL_BLOCKS: f32 = 5.0;
    pub const MAX_LEVEL_BLOCKS: f32 = 10_000.0;

    /// Number of coin slots tracked per attempt
    pub const COIN_SLOTS: usize = 3;

    pub const BG_DEFAULT: &str = "#0a0a2e";
    pub const GROUND_DEFAULT: &str = "#1a1a5e";
    pub const BLOCK_COLOR_DEFAULT: &str = "#4444aa";
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Inverse of [`lerp`]; returns 0 for a degenerate range
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if a == b {
        return 0.0;
    }
    (value - a) / (b - a)
}

/// Rotate `point` around `center` by `angle` radians
#[inline]
pub fn rotate_point(point: Vec2, center: Vec2, angle: f32) -> Vec2 {
    center + Vec2::from_angle(angle).rotate(point - center)
}

/// Snap a value to the nearest multiple of `grid`
#[inline]
pub fn snap_to_grid(value: f32, grid: f32) -> f32 {
    (value / grid).round() * grid
}
