use super::{ModeAction, ModeBehavior, fall_and_land};
use crate::sim::input::InputState;
use crate::sim::physics::Physics;
use crate::sim::player::Player;

/// Tap to jump from the floor
pub struct Cube;

impl ModeBehavior for Cube {
    fn handle_input(
        &self,
        player: &mut Player,
        input: &InputState,
        physics: &Physics,
        _dt: f32,
    ) -> Option<ModeAction> {
        if input.just_pressed && player.body.on_ground && !player.dash.active {
            physics.apply_jump(&mut player.body);
            return Some(ModeAction::Jump);
        }
        None
    }

    fn update(&self, player: &mut Player, physics: &Physics, dt: f32, ground_y: f32, ceiling_y: f32) {
        // No gravity during a dash
        let scale = if player.dash.active { 0.0 } else { 1.0 };
        fall_and_land(player, physics, dt, scale, ground_y, ceiling_y);
    }

    fn on_enter(&self, player: &mut Player) {
        player.rotation = 0.0;
    }
}
