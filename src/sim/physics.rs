//! Kinematics for the player body
//!
//! Every function here mutates a [`Body`] from elapsed time and the tuning
//! table only. Level geometry enters as a ground and ceiling line supplied by
//! the caller. Integration is explicit Euler; level timing depends on it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use crate::lerp;
use crate::tuning::{PhysicsTuning, Tuning};

/// Position, size and velocity of a moving entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    /// +1 falls toward the ground line, -1 toward the ceiling
    pub gravity_dir: f32,
    pub on_ground: bool,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            size,
            vel: Vec2::ZERO,
            gravity_dir: 1.0,
            on_ground: false,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn gravity_flipped(&self) -> bool {
        self.gravity_dir < 0.0
    }
}

/// Physics integrator bound to one tuning table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Physics {
    pub params: PhysicsTuning,
}

impl Physics {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            params: tuning.physics,
        }
    }

    /// Accelerate along the gravity direction, clamped to terminal velocity
    pub fn apply_gravity(&self, body: &mut Body, dt: f32, multiplier: f32) {
        let p = &self.params;
        body.vel.y += p.gravity * body.gravity_dir * multiplier * dt;
        body.vel.y = body.vel.y.clamp(-p.terminal_velocity, p.terminal_velocity);
    }

    pub fn apply_velocity(&self, body: &mut Body, dt: f32) {
        body.pos += body.vel * dt;
    }

    /// Set vertical velocity to `impulse` relative to the current gravity
    pub fn apply_impulse(&self, body: &mut Body, impulse: f32) {
        body.vel.y = impulse * body.gravity_dir;
        body.on_ground = false;
    }

    pub fn apply_jump(&self, body: &mut Body) {
        self.apply_impulse(body, self.params.jump_impulse);
    }

    pub fn flip_gravity(&self, body: &mut Body) {
        body.gravity_dir = -body.gravity_dir;
        body.on_ground = false;
    }

    /// Ship gravity plus optional thrust, clamped to the ship terminal
    pub fn apply_ship_physics(&self, body: &mut Body, dt: f32, thrusting: bool) {
        let p = &self.params;
        if thrusting {
            body.vel.y += p.ship_thrust * body.gravity_dir * dt;
        }
        body.vel.y += p.ship_gravity * body.gravity_dir * dt;
        body.vel.y = body.vel.y.clamp(-p.ship_terminal, p.ship_terminal);
    }

    pub fn apply_ufo_boost(&self, body: &mut Body) {
        self.apply_impulse(body, self.params.ufo_boost);
    }

    /// Gravity multiplier that turns the base gravity into the UFO gravity
    pub fn ufo_gravity_scale(&self) -> f32 {
        self.params.ufo_gravity / self.params.gravity
    }

    /// Wave vertical speed is set outright from the hold state
    pub fn apply_wave(&self, body: &mut Body, held: bool, horizontal_speed: f32) {
        let slope_speed = horizontal_speed * self.params.wave_slope * body.gravity_dir;
        body.vel.y = if held { -slope_speed } else { slope_speed };
    }

    /// Robot jump strength after holding for `hold_time` seconds
    pub fn robot_jump_impulse(&self, hold_time: f32) -> f32 {
        let p = &self.params;
        let charge = (hold_time / p.robot_charge_time).clamp(0.0, 1.0);
        lerp(p.robot_min_jump, p.robot_max_jump, charge)
    }

    pub fn apply_robot_jump(&self, body: &mut Body, hold_time: f32) {
        self.apply_impulse(body, self.robot_jump_impulse(hold_time));
    }

    /// Flip gravity and snap to the opposite surface without an arc
    pub fn spider_teleport(&self, body: &mut Body, ground_y: f32, ceiling_y: f32) {
        body.gravity_dir = -body.gravity_dir;
        body.pos.y = if body.gravity_dir > 0.0 {
            ground_y - body.size.y
        } else {
            ceiling_y
        };
        body.vel.y = 0.0;
        body.on_ground = true;
    }

    pub fn apply_swing_gravity(&self, body: &mut Body, dt: f32) {
        let scale = self.params.swing_gravity / self.params.gravity;
        self.apply_gravity(body, dt, scale);
    }

    /// Flip gravity and kick toward the new floor-side
    pub fn swing_flip(&self, body: &mut Body) {
        body.gravity_dir = -body.gravity_dir;
        body.vel.y = self.params.swing_impulse * body.gravity_dir;
        body.on_ground = false;
    }

    /// Stop the body on whichever boundary its gravity pulls it toward.
    /// Returns true when the body landed this call.
    pub fn resolve_ground_collision(&self, body: &mut Body, ground_y: f32, ceiling_y: f32) -> bool {
        if body.gravity_dir > 0.0 {
            if body.bottom() >= ground_y {
                body.pos.y = ground_y - body.size.y;
                body.vel.y = 0.0;
                body.on_ground = true;
                return true;
            }
        } else if body.pos.y <= ceiling_y {
            body.pos.y = ceiling_y;
            body.vel.y = 0.0;
            body.on_ground = true;
            return true;
        }
        false
    }

    /// Keep the body between both boundaries, zeroing velocity into them
    pub fn clamp_to_bounds(&self, body: &mut Body, ground_y: f32, ceiling_y: f32) {
        if body.bottom() > ground_y {
            body.pos.y = ground_y - body.size.y;
            body.vel.y = body.vel.y.min(0.0);
        }
        if body.pos.y < ceiling_y {
            body.pos.y = ceiling_y;
            body.vel.y = body.vel.y.max(0.0);
        }
    }
}

/// True while the body lies within `[min_y, max_y]`, edges inclusive
pub fn check_bounds(body: &Body, min_y: f32, max_y: f32) -> bool {
    body.pos.y >= min_y && body.bottom() <= max_y
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const GROUND: f32 = 450.0;
    const CEILING: f32 = 60.0;

    fn physics() -> Physics {
        Physics::new(&Tuning::default())
    }

    fn body_at(y: f32) -> Body {
        Body::new(Vec2::new(0.0, y), Vec2::splat(30.0))
    }

    #[test]
    fn test_gravity_clamped_to_terminal() {
        let p = physics();
        let mut body = body_at(0.0);
        for _ in 0..200 {
            p.apply_gravity(&mut body, 0.05, 1.0);
        }
        assert_eq!(body.vel.y, 1200.0);

        body.gravity_dir = -1.0;
        for _ in 0..200 {
            p.apply_gravity(&mut body, 0.05, 1.0);
        }
        assert_eq!(body.vel.y, -1200.0);
    }

    #[test]
    fn test_jump_respects_gravity_direction() {
        let p = physics();
        let mut body = body_at(0.0);
        body.on_ground = true;
        p.apply_jump(&mut body);
        assert_eq!(body.vel.y, -780.0);
        assert!(!body.on_ground);

        body.gravity_dir = -1.0;
        p.apply_jump(&mut body);
        assert_eq!(body.vel.y, 780.0);
    }

    #[test]
    fn test_wave_velocity_is_set() {
        let p = physics();
        let mut body = body_at(200.0);
        body.vel.y = 9999.0;
        p.apply_wave(&mut body, true, 600.0);
        assert_eq!(body.vel.y, -600.0);
        p.apply_wave(&mut body, false, 600.0);
        assert_eq!(body.vel.y, 600.0);
        body.gravity_dir = -1.0;
        p.apply_wave(&mut body, true, 600.0);
        assert_eq!(body.vel.y, 600.0);
    }

    #[test]
    fn test_robot_impulse_endpoints() {
        let p = physics();
        assert_eq!(p.robot_jump_impulse(0.0), -600.0);
        assert_eq!(p.robot_jump_impulse(0.25), -1000.0);
        assert_eq!(p.robot_jump_impulse(3.0), -1000.0);
    }

    #[test]
    fn test_spider_teleport_snaps_to_opposite_surface() {
        let p = physics();
        let mut body = body_at(GROUND - 30.0);
        body.vel.y = 50.0;
        p.spider_teleport(&mut body, GROUND, CEILING);
        assert_eq!(body.gravity_dir, -1.0);
        assert_eq!(body.pos.y, CEILING);
        assert_eq!(body.vel.y, 0.0);
        assert!(body.on_ground);

        p.spider_teleport(&mut body, GROUND, CEILING);
        assert_eq!(body.pos.y, GROUND - 30.0);
    }

    #[test]
    fn test_swing_flip_kicks_toward_new_direction() {
        let p = physics();
        let mut body = body_at(200.0);
        p.swing_flip(&mut body);
        assert_eq!(body.gravity_dir, -1.0);
        assert_eq!(body.vel.y, 650.0);
    }

    #[test]
    fn test_ship_thrust_overcomes_gravity() {
        let p = physics();
        let mut body = body_at(200.0);
        p.apply_ship_physics(&mut body, 0.1, true);
        assert!(body.vel.y < 0.0);
        let mut falling = body_at(200.0);
        p.apply_ship_physics(&mut falling, 0.1, false);
        assert!(falling.vel.y > 0.0);
    }

    #[test]
    fn test_check_bounds_inclusive() {
        let mut body = Body::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        assert!(check_bounds(&body, 0.0, 100.0));
        body.pos.y = 90.0;
        assert!(check_bounds(&body, 0.0, 100.0));
        body.pos.y = 91.0;
        assert!(!check_bounds(&body, 0.0, 100.0));
        body.pos.y = -0.5;
        assert!(!check_bounds(&body, 0.0, 100.0));
    }

    #[test]
    fn test_clamp_to_bounds_keeps_body_inside() {
        let p = physics();
        let mut body = body_at(GROUND);
        body.vel.y = 300.0;
        p.clamp_to_bounds(&mut body, GROUND, CEILING);
        assert_eq!(body.bottom(), GROUND);
        assert_eq!(body.vel.y, 0.0);
        assert!(!body.on_ground);
    }

    proptest! {
        #[test]
        fn prop_robot_charge_monotonic(a in 0.0f32..1.0, b in 0.0f32..1.0) {
            let p = physics();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(p.robot_jump_impulse(lo).abs() <= p.robot_jump_impulse(hi).abs());
        }

        #[test]
        fn prop_ground_resolution_symmetric(depth in 0.0f32..40.0, v in 1.0f32..1200.0) {
            let p = physics();

            let mut down = body_at(GROUND - 30.0 + depth);
            down.vel.y = v;
            prop_assert!(p.resolve_ground_collision(&mut down, GROUND, CEILING));

            let mut up = body_at(CEILING - depth);
            up.gravity_dir = -1.0;
            up.vel.y = -v;
            prop_assert!(p.resolve_ground_collision(&mut up, GROUND, CEILING));

            prop_assert_eq!(down.vel.y, 0.0);
            prop_assert_eq!(up.vel.y, 0.0);
            prop_assert!(down.on_ground && up.on_ground);
            prop_assert_eq!(down.bottom(), GROUND);
            prop_assert_eq!(up.pos.y, CEILING);
        }
    }
}
