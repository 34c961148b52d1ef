use super::{ModeAction, ModeBehavior, fall_and_land};
use crate::sim::input::InputState;
use crate::sim::physics::Physics;
use crate::sim::player::Player;

/// Hold to charge, release to jump
pub struct Robot;

impl ModeBehavior for Robot {
    fn handle_input(
        &self,
        player: &mut Player,
        input: &InputState,
        physics: &Physics,
        dt: f32,
    ) -> Option<ModeAction> {
        let can_charge = player.body.on_ground && !player.robot_jumping;

        if input.just_pressed && can_charge {
            player.robot_hold_time = 0.0;
        }
        if input.is_held && can_charge {
            let cap = physics.params.robot_charge_time;
            player.robot_hold_time = (player.robot_hold_time + dt).min(cap);
        }
        if input.just_released && player.body.on_ground && player.robot_hold_time > 0.0 {
            physics.apply_robot_jump(&mut player.body, player.robot_hold_time);
            player.robot_jumping = true;
            player.robot_hold_time = 0.0;
            return Some(ModeAction::Jump);
        }
        None
    }

    fn update(&self, player: &mut Player, physics: &Physics, dt: f32, ground_y: f32, ceiling_y: f32) {
        if fall_and_land(player, physics, dt, 1.0, ground_y, ceiling_y) {
            player.robot_jumping = false;
        }
    }

    fn on_enter(&self, player: &mut Player) {
        player.robot_hold_time = 0.0;
        player.robot_jumping = false;
    }

    fn on_exit(&self, player: &mut Player) {
        player.robot_hold_time = 0.0;
    }
}
