//! Movement modes
//!
//! Eight closed variants share one four-operation contract. Dispatch goes
//! through a fixed table of stateless behaviours indexed by [`Mode`]; all
//! mutable data lives on the [`Player`].

mod ball;
mod cube;
mod robot;
mod ship;
mod spider;
mod swing;
mod ufo;
mod wave;

use serde::{Deserialize, Serialize};

use super::input::InputState;
use super::physics::Physics;
use super::player::Player;

pub use ball::Ball;
pub use cube::Cube;
pub use robot::Robot;
pub use ship::Ship;
pub use spider::Spider;
pub use swing::Swing;
pub use ufo::Ufo;
pub use wave::Wave;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Cube,
    Ship,
    Ball,
    Ufo,
    Wave,
    Robot,
    Spider,
    Swing,
}

impl Mode {
    pub const ALL: [Mode; 8] = [
        Mode::Cube,
        Mode::Ship,
        Mode::Ball,
        Mode::Ufo,
        Mode::Wave,
        Mode::Robot,
        Mode::Spider,
        Mode::Swing,
    ];

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_lowercase().as_str() {
            "cube" => Some(Mode::Cube),
            "ship" => Some(Mode::Ship),
            "ball" => Some(Mode::Ball),
            "ufo" => Some(Mode::Ufo),
            "wave" => Some(Mode::Wave),
            "robot" => Some(Mode::Robot),
            "spider" => Some(Mode::Spider),
            "swing" => Some(Mode::Swing),
            _ => None,
        }
    }

    pub fn behavior(self) -> &'static dyn ModeBehavior {
        match self {
            Mode::Cube => &Cube,
            Mode::Ship => &Ship,
            Mode::Ball => &Ball,
            Mode::Ufo => &Ufo,
            Mode::Wave => &Wave,
            Mode::Robot => &Robot,
            Mode::Spider => &Spider,
            Mode::Swing => &Swing,
        }
    }
}

/// What a mode did with the input this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeAction {
    Jump,
    Flip,
    Thrust,
    Boost,
    WaveUp,
    WaveDown,
    /// Spider: the session performs the teleport against the arena
    Teleport,
    SwingFlip,
}

/// Contract every movement mode implements
pub trait ModeBehavior: Sync {
    fn handle_input(
        &self,
        player: &mut Player,
        input: &InputState,
        physics: &Physics,
        dt: f32,
    ) -> Option<ModeAction>;

    fn update(&self, player: &mut Player, physics: &Physics, dt: f32, ground_y: f32, ceiling_y: f32);

    fn on_enter(&self, _player: &mut Player) {}

    fn on_exit(&self, _player: &mut Player) {}
}

/// Gravity, integration and floor landing shared by the grounded modes.
/// Returns true when the player touched its floor this tick.
fn fall_and_land(
    player: &mut Player,
    physics: &Physics,
    dt: f32,
    gravity_scale: f32,
    ground_y: f32,
    ceiling_y: f32,
) -> bool {
    let body = &mut player.body;
    // Solids and the floor re-establish grounding every tick
    body.on_ground = false;
    if gravity_scale != 0.0 {
        physics.apply_gravity(body, dt, gravity_scale);
    }
    physics.apply_velocity(body, dt);
    physics.resolve_ground_collision(body, ground_y, ceiling_y)
}

/// Integration for the free-flying modes: clamp to both lines, never grounded
fn fly_clamped(player: &mut Player, physics: &Physics, dt: f32, ground_y: f32, ceiling_y: f32) {
    let body = &mut player.body;
    physics.apply_velocity(body, dt);
    physics.clamp_to_bounds(body, ground_y, ceiling_y);
    body.on_ground = false;
}
