use super::{ModeAction, ModeBehavior, fly_clamped};
use crate::sim::input::InputState;
use crate::sim::physics::Physics;
use crate::sim::player::Player;

/// Hold for continuous thrust against a lighter gravity
pub struct Ship;

impl ModeBehavior for Ship {
    fn handle_input(
        &self,
        player: &mut Player,
        input: &InputState,
        physics: &Physics,
        dt: f32,
    ) -> Option<ModeAction> {
        physics.apply_ship_physics(&mut player.body, dt, input.is_held);
        input.is_held.then_some(ModeAction::Thrust)
    }

    fn update(&self, player: &mut Player, physics: &Physics, dt: f32, ground_y: f32, ceiling_y: f32) {
        fly_clamped(player, physics, dt, ground_y, ceiling_y);
    }

    fn on_enter(&self, player: &mut Player) {
        player.body.on_ground = false;
    }
}
