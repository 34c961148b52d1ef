//! Data-driven game balance
//!
//! One canonical, immutable table of physics and gameplay constants. A
//! `Tuning` is built once (defaults or JSON overrides) and handed by
//! reference to whatever needs it; nothing writes to it during play.

use serde::{Deserialize, Serialize};

use crate::consts::{BLOCK_SIZE, MAX_FRAME_DT, SPEED_COUNT};

/// Vertical motion constants for every mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Downward gravity (pixels/s²)
    pub gravity: f32,
    /// Cube jump impulse (pixels/s, negative is up)
    pub jump_impulse: f32,
    /// Maximum vertical speed
    pub terminal_velocity: f32,

    pub ship_gravity: f32,
    pub ship_thrust: f32,
    pub ship_terminal: f32,

    pub ufo_gravity: f32,
    pub ufo_boost: f32,

    /// tan(45°)
    pub wave_slope: f32,

    pub robot_min_jump: f32,
    pub robot_max_jump: f32,
    /// Seconds of hold needed to reach the max robot jump
    pub robot_charge_time: f32,

    pub swing_gravity: f32,
    pub swing_impulse: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: 2600.0,
            jump_impulse: -780.0,
            terminal_velocity: 1200.0,

            ship_gravity: 1800.0,
            ship_thrust: -3200.0,
            ship_terminal: 800.0,

            ufo_gravity: 2400.0,
            ufo_boost: -500.0,

            wave_slope: 1.0,

            robot_min_jump: -600.0,
            robot_max_jump: -1000.0,
            robot_charge_time: 0.25,

            swing_gravity: 2200.0,
            swing_impulse: -650.0,
        }
    }
}

/// Complete gameplay tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub physics: PhysicsTuning,

    /// Horizontal speed (pixels/s) per speed index
    pub speeds: [f32; SPEED_COUNT],

    pub player_size: f32,
    pub player_mini_size: f32,
    /// Fraction of player width trimmed from each side of its hitbox
    pub player_hitbox_shrink: f32,
    /// Fraction of hazard width trimmed from each side of its hitbox
    pub hazard_shrink: f32,

    pub orb_cooldown: f32,
    pub pad_cooldown: f32,

    /// Orbs/pads/portals/coins farther than this many blocks are skipped
    pub activation_range_blocks: f32,
    /// Solids/hazards farther than this many blocks are skipped
    pub collision_range_blocks: f32,
    /// Slack (pixels) beyond ground/ceiling before the player dies
    pub bounds_margin: f32,

    pub trail_length: usize,
    pub trail_interval: f32,

    /// Delay before a practice respawn after death
    pub practice_respawn_delay: f32,
    /// Vertical gap between the two players in dual mode (blocks)
    pub dual_offset_blocks: f32,

    /// Player position from the left edge of the view (fraction of width)
    pub camera_lead: f32,
    /// Per-tick smoothing factor for camera zoom/offset/vertical follow
    pub camera_smoothing: f32,
    pub camera_shake_decay: f32,

    /// Largest dt a single tick will integrate
    pub max_frame_dt: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            physics: PhysicsTuning::default(),
            speeds: [311.58, 623.16, 829.38, 1035.60, 1243.28],
            player_size: 30.0,
            player_mini_size: 18.0,
            player_hitbox_shrink: 0.1,
            hazard_shrink: 0.15,
            orb_cooldown: 0.1,
            pad_cooldown: 0.15,
            activation_range_blocks: 3.0,
            collision_range_blocks: 5.0,
            bounds_margin: 50.0,
            trail_length: 20,
            trail_interval: 0.02,
            practice_respawn_delay: 0.5,
            dual_offset_blocks: 4.0,
            camera_lead: 0.3,
            camera_smoothing: 0.05,
            camera_shake_decay: 5.0,
            max_frame_dt: MAX_FRAME_DT,
        }
    }
}

impl Tuning {
    /// Parse tuning overrides from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        log::info!("Loaded tuning overrides (gravity {})", tuning.physics.gravity);
        Ok(tuning)
    }

    /// Horizontal speed for a speed index (clamped into range)
    pub fn speed(&self, index: usize) -> f32 {
        self.speeds[index.min(SPEED_COUNT - 1)]
    }

    pub fn activation_range(&self) -> f32 {
        self.activation_range_blocks * BLOCK_SIZE
    }

    pub fn collision_range(&self) -> f32 {
        self.collision_range_blocks * BLOCK_SIZE
    }

    pub fn dual_offset(&self) -> f32 {
        self.dual_offset_blocks * BLOCK_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_index_clamped() {
        let tuning = Tuning::default();
        assert_eq!(tuning.speed(0), 311.58);
        assert_eq!(tuning.speed(1), 623.16);
        assert_eq!(tuning.speed(99), 1243.28);
    }

    #[test]
    fn test_from_json_partial_override() {
        let tuning = Tuning::from_json(r#"{ "physics": { "gravity": 1000.0 }, "bounds_margin": 10.0 }"#)
            .expect("valid tuning json");
        assert_eq!(tuning.physics.gravity, 1000.0);
        assert_eq!(tuning.physics.jump_impulse, -780.0);
        assert_eq!(tuning.bounds_margin, 10.0);
        assert_eq!(tuning.player_size, 30.0);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(Tuning::from_json("not json").is_err());
    }

    #[test]
    fn test_ranges_in_pixels() {
        let tuning = Tuning::default();
        assert_eq!(tuning.activation_range(), 90.0);
        assert_eq!(tuning.collision_range(), 150.0);
        assert_eq!(tuning.dual_offset(), 120.0);
    }
}
