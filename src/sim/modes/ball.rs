use super::{ModeAction, ModeBehavior, fall_and_land};
use crate::sim::input::InputState;
use crate::sim::physics::Physics;
use crate::sim::player::Player;

/// Tap on a surface to flip gravity
pub struct Ball;

impl ModeBehavior for Ball {
    fn handle_input(
        &self,
        player: &mut Player,
        input: &InputState,
        physics: &Physics,
        _dt: f32,
    ) -> Option<ModeAction> {
        if input.just_pressed && player.body.on_ground {
            physics.flip_gravity(&mut player.body);
            return Some(ModeAction::Flip);
        }
        None
    }

    fn update(&self, player: &mut Player, physics: &Physics, dt: f32, ground_y: f32, ceiling_y: f32) {
        fall_and_land(player, physics, dt, 1.0, ground_y, ceiling_y);
    }
}
