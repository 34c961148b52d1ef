use super::{ModeAction, ModeBehavior, fall_and_land};
use crate::sim::input::InputState;
use crate::sim::physics::Physics;
use crate::sim::player::Player;

/// Every tap is a boost, grounded or not
pub struct Ufo;

impl ModeBehavior for Ufo {
    fn handle_input(
        &self,
        player: &mut Player,
        input: &InputState,
        physics: &Physics,
        _dt: f32,
    ) -> Option<ModeAction> {
        if input.just_pressed {
            physics.apply_ufo_boost(&mut player.body);
            return Some(ModeAction::Boost);
        }
        None
    }

    fn update(&self, player: &mut Player, physics: &Physics, dt: f32, ground_y: f32, ceiling_y: f32) {
        fall_and_land(player, physics, dt, physics.ufo_gravity_scale(), ground_y, ceiling_y);

        // The far boundary only stops the ufo
        let body = &mut player.body;
        if body.gravity_dir > 0.0 && body.pos.y <= ceiling_y {
            body.pos.y = ceiling_y;
            body.vel.y = 0.0;
        } else if body.gravity_dir < 0.0 && body.bottom() >= ground_y {
            body.pos.y = ground_y - body.size.y;
            body.vel.y = 0.0;
        }
    }

    fn on_enter(&self, player: &mut Player) {
        player.body.on_ground = false;
    }
}
