use super::{ModeAction, ModeBehavior, fly_clamped};
use crate::sim::input::InputState;
use crate::sim::physics::Physics;
use crate::sim::player::Player;

/// Diagonal travel: up-slope while held, down-slope otherwise
pub struct Wave;

impl ModeBehavior for Wave {
    fn handle_input(
        &self,
        player: &mut Player,
        input: &InputState,
        physics: &Physics,
        _dt: f32,
    ) -> Option<ModeAction> {
        let speed = player.body.vel.x;
        physics.apply_wave(&mut player.body, input.is_held, speed);
        Some(if input.is_held {
            ModeAction::WaveUp
        } else {
            ModeAction::WaveDown
        })
    }

    fn update(&self, player: &mut Player, physics: &Physics, dt: f32, ground_y: f32, ceiling_y: f32) {
        fly_clamped(player, physics, dt, ground_y, ceiling_y);
    }

    fn on_enter(&self, player: &mut Player) {
        player.body.on_ground = false;
    }
}
