use super::{ModeAction, ModeBehavior, fall_and_land};
use crate::sim::input::InputState;
use crate::sim::physics::Physics;
use crate::sim::player::Player;

/// Tap on a surface to teleport to the opposite one
pub struct Spider;

impl ModeBehavior for Spider {
    fn handle_input(
        &self,
        player: &mut Player,
        input: &InputState,
        _physics: &Physics,
        _dt: f32,
    ) -> Option<ModeAction> {
        (input.just_pressed && player.body.on_ground).then_some(ModeAction::Teleport)
    }

    fn update(&self, player: &mut Player, physics: &Physics, dt: f32, ground_y: f32, ceiling_y: f32) {
        fall_and_land(player, physics, dt, 1.0, ground_y, ceiling_y);
    }

    fn on_enter(&self, player: &mut Player) {
        player.rotation = 0.0;
    }
}
