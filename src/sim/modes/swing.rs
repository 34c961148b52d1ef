use super::{ModeAction, ModeBehavior, fly_clamped};
use crate::sim::input::InputState;
use crate::sim::physics::Physics;
use crate::sim::player::Player;

/// Tap anywhere to flip gravity with a kick
pub struct Swing;

impl ModeBehavior for Swing {
    fn handle_input(
        &self,
        player: &mut Player,
        input: &InputState,
        physics: &Physics,
        _dt: f32,
    ) -> Option<ModeAction> {
        if input.just_pressed {
            physics.swing_flip(&mut player.body);
            return Some(ModeAction::SwingFlip);
        }
        None
    }

    fn update(&self, player: &mut Player, physics: &Physics, dt: f32, ground_y: f32, ceiling_y: f32) {
        physics.apply_swing_gravity(&mut player.body, dt);
        fly_clamped(player, physics, dt, ground_y, ceiling_y);
    }

    fn on_enter(&self, player: &mut Player) {
        player.body.on_ground = false;
    }
}
