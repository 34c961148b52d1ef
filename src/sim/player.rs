//! The player entity and its checkpoint snapshot

use std::collections::VecDeque;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::modes::Mode;
use super::physics::Body;
use crate::consts::{DEFAULT_SPEED_INDEX, SPEED_COUNT};
use crate::lerp;
use crate::tuning::Tuning;

/// Dash orb/pad state
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dash {
    pub active: bool,
    /// Unit direction of travel while dashing
    pub direction: Vec2,
    /// Seconds left
    pub timer: f32,
}

/// Practice-mode snapshot of everything needed to resume a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub x: f32,
    pub y: f32,
    pub velocity_y: f32,
    pub gravity_direction: f32,
    pub mode: Mode,
    pub mini: bool,
    pub speed_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub mode: Mode,
    pub mini: bool,
    pub speed_index: usize,
    /// Visual rotation (radians)
    pub rotation: f32,
    pub dash: Dash,
    /// Recent center points, oldest first
    #[serde(skip)]
    pub trail: VecDeque<Vec2>,
    trail_timer: f32,
    pub robot_hold_time: f32,
    pub robot_jumping: bool,
    /// Set while overlapping a usable orb this tick
    pub can_activate_orb: bool,
    pub dead: bool,
    pub death_pos: Vec2,
}

impl Player {
    pub fn new(start: Vec2, tuning: &Tuning) -> Self {
        let mut player = Self {
            body: Body::new(start, Vec2::splat(tuning.player_size)),
            mode: Mode::Cube,
            mini: false,
            speed_index: DEFAULT_SPEED_INDEX,
            rotation: 0.0,
            dash: Dash::default(),
            trail: VecDeque::with_capacity(tuning.trail_length),
            trail_timer: 0.0,
            robot_hold_time: 0.0,
            robot_jumping: false,
            can_activate_orb: false,
            dead: false,
            death_pos: Vec2::ZERO,
        };
        player.set_speed(DEFAULT_SPEED_INDEX, tuning);
        player
    }

    /// Back to a fresh cube at `start`
    pub fn reset(&mut self, start: Vec2, speed_index: usize, tuning: &Tuning) {
        *self = Player::new(start, tuning);
        self.set_speed(speed_index, tuning);
    }

    pub fn set_speed(&mut self, index: usize, tuning: &Tuning) {
        self.speed_index = index.min(SPEED_COUNT - 1);
        self.body.vel.x = tuning.speed(self.speed_index);
    }

    pub fn set_mini(&mut self, mini: bool, tuning: &Tuning) {
        self.mini = mini;
        let size = if mini {
            tuning.player_mini_size
        } else {
            tuning.player_size
        };
        self.body.size = Vec2::splat(size);
    }

    /// Switch mode and clear per-mode counters
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.rotation = 0.0;
        self.robot_hold_time = 0.0;
        self.robot_jumping = false;
    }

    pub fn rect(&self) -> Rect {
        self.body.rect()
    }

    /// Collision box, trimmed by a fraction of width on every side
    pub fn hitbox(&self, shrink_fraction: f32) -> Rect {
        self.rect().shrink(self.body.size.x * shrink_fraction)
    }

    pub fn center(&self) -> Vec2 {
        self.body.center()
    }

    pub fn start_dash(&mut self, direction: Vec2, duration: f32) {
        self.dash = Dash {
            active: true,
            direction,
            timer: duration,
        };
    }

    pub fn update_dash(&mut self, dt: f32) {
        if self.dash.active {
            self.dash.timer -= dt;
            if self.dash.timer <= 0.0 {
                self.dash.active = false;
            }
        }
    }

    pub fn update_trail(&mut self, dt: f32, tuning: &Tuning) {
        self.trail_timer += dt;
        if self.trail_timer >= tuning.trail_interval {
            self.trail_timer = 0.0;
            self.trail.push_back(self.center());
            while self.trail.len() > tuning.trail_length {
                self.trail.pop_front();
            }
        }
    }

    /// Per-mode visual rotation
    pub fn update_rotation(&mut self, dt: f32, normal_speed: f32) {
        let body = &self.body;
        match self.mode {
            Mode::Cube => {
                if body.on_ground {
                    let target = (self.rotation / FRAC_PI_2).round() * FRAC_PI_2;
                    self.rotation = lerp(self.rotation, target, 0.3);
                } else {
                    let spin = body.gravity_dir * TAU * (body.vel.x / normal_speed);
                    self.rotation += spin * dt;
                }
            }
            Mode::Ship | Mode::Ufo | Mode::Swing => {
                let max_tilt = 30f32.to_radians();
                let tilt = (body.vel.y / 500.0).clamp(-1.0, 1.0) * max_tilt;
                self.rotation = lerp(self.rotation, tilt, 0.1);
            }
            Mode::Ball => self.rotation += body.gravity_dir * PI * 3.0 * dt,
            Mode::Robot => {
                self.rotation = if body.on_ground {
                    0.0
                } else {
                    lerp(self.rotation, 0.0, 0.1)
                };
            }
            Mode::Wave | Mode::Spider => self.rotation = 0.0,
        }
    }

    pub fn die(&mut self) {
        self.dead = true;
        self.death_pos = self.center();
        self.dash.active = false;
        self.robot_hold_time = 0.0;
        self.robot_jumping = false;
    }

    /// Snapshot for practice mode. Vertical velocity is not carried over.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            x: self.body.pos.x,
            y: self.body.pos.y,
            velocity_y: 0.0,
            gravity_direction: self.body.gravity_dir,
            mode: self.mode,
            mini: self.mini,
            speed_index: self.speed_index,
        }
    }

    /// Resume from a snapshot; mode enter/exit hooks are the caller's job
    pub fn load_checkpoint(&mut self, cp: &Checkpoint, tuning: &Tuning) {
        self.body.pos = Vec2::new(cp.x, cp.y);
        self.body.vel.y = cp.velocity_y;
        self.body.gravity_dir = cp.gravity_direction;
        self.set_mode(cp.mode);
        self.set_mini(cp.mini, tuning);
        self.set_speed(cp.speed_index, tuning);
        self.dead = false;
        self.body.on_ground = false;
        self.trail.clear();
        self.dash.active = false;
    }
}

/// Second player spawned by a dual portal
///
/// Falls the other way and tracks the primary's horizontal position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DualPlayer {
    pub secondary: Player,
}

impl DualPlayer {
    pub fn spawn(primary: &Player, tuning: &Tuning) -> Self {
        let mut secondary = Player::new(primary.body.pos, tuning);
        secondary.body.pos.y -= tuning.dual_offset();
        secondary.body.vel = primary.body.vel;
        secondary.body.gravity_dir = -primary.body.gravity_dir;
        secondary.set_mode(primary.mode);
        secondary.set_mini(primary.mini, tuning);
        secondary.speed_index = primary.speed_index;
        Self { secondary }
    }

    /// Lock horizontal position and speed to the primary
    pub fn follow(&mut self, primary: &Player) {
        self.secondary.body.pos.x = primary.body.pos.x;
        self.secondary.body.vel.x = primary.body.vel.x;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(Vec2::new(60.0, 420.0), &Tuning::default())
    }

    #[test]
    fn test_speed_index_clamped() {
        let tuning = Tuning::default();
        let mut p = player();
        assert_eq!(p.body.vel.x, 623.16);
        p.set_speed(42, &tuning);
        assert_eq!(p.speed_index, 4);
        assert_eq!(p.body.vel.x, 1243.28);
    }

    #[test]
    fn test_hitbox_is_forgiving() {
        let p = player();
        let hb = p.hitbox(0.1);
        assert_eq!(hb.width, 24.0);
        assert_eq!(hb.x, 63.0);
    }

    #[test]
    fn test_mini_resizes() {
        let tuning = Tuning::default();
        let mut p = player();
        p.set_mini(true, &tuning);
        assert_eq!(p.body.size, Vec2::splat(18.0));
        p.set_mini(false, &tuning);
        assert_eq!(p.body.size, Vec2::splat(30.0));
    }

    #[test]
    fn test_trail_is_bounded() {
        let tuning = Tuning::default();
        let mut p = player();
        for _ in 0..100 {
            p.update_trail(0.025, &tuning);
        }
        assert_eq!(p.trail.len(), tuning.trail_length);
    }

    #[test]
    fn test_cube_rotation_snaps_on_ground() {
        let mut p = player();
        p.body.on_ground = true;
        p.rotation = 1.4;
        for _ in 0..60 {
            p.update_rotation(1.0 / 60.0, 623.16);
        }
        assert!((p.rotation - FRAC_PI_2).abs() < 1e-3);
    }

    #[test]
    fn test_checkpoint_round_trip() {
        let tuning = Tuning::default();
        let mut p = player();
        p.set_mode(Mode::Ship);
        p.set_mini(true, &tuning);
        p.body.gravity_dir = -1.0;
        p.body.vel.y = 300.0;
        let cp = p.checkpoint();

        let mut fresh = player();
        fresh.dash.active = true;
        fresh.load_checkpoint(&cp, &tuning);
        assert_eq!(fresh.mode, Mode::Ship);
        assert!(fresh.mini);
        assert_eq!(fresh.body.gravity_dir, -1.0);
        assert_eq!(fresh.body.vel.y, 0.0);
        assert!(!fresh.body.on_ground);
        assert!(!fresh.dash.active);
    }

    #[test]
    fn test_checkpoint_json_shape() {
        let cp = player().checkpoint();
        let json = serde_json::to_value(cp).expect("serialize checkpoint");
        for key in ["x", "y", "velocityY", "gravityDirection", "mode", "mini", "speedIndex"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_dual_spawns_with_opposite_gravity() {
        let tuning = Tuning::default();
        let p = player();
        let mut dual = DualPlayer::spawn(&p, &tuning);
        assert_eq!(dual.secondary.body.gravity_dir, -1.0);
        assert_eq!(dual.secondary.body.pos.y, 420.0 - 120.0);

        let mut moved = p.clone();
        moved.body.pos.x = 500.0;
        dual.follow(&moved);
        assert_eq!(dual.secondary.body.pos.x, 500.0);
    }
}
