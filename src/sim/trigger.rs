//! Trigger objects and their parameters

use serde::{Deserialize, Serialize};

use super::color::{ChannelId, Rgb};
use super::easing::Easing;
use super::object::GroupId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TriggerType {
    #[default]
    Move,
    Rotate,
    Alpha,
    Color,
    Pulse,
    Toggle,
    Spawn,
    Camera,
    Song,
    Random,
}

impl TriggerType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_lowercase().as_str() {
            "move" => Some(TriggerType::Move),
            "rotate" => Some(TriggerType::Rotate),
            "alpha" => Some(TriggerType::Alpha),
            "color" => Some(TriggerType::Color),
            "pulse" => Some(TriggerType::Pulse),
            "toggle" => Some(TriggerType::Toggle),
            "spawn" => Some(TriggerType::Spawn),
            "camera" => Some(TriggerType::Camera),
            "song" => Some(TriggerType::Song),
            "random" => Some(TriggerType::Random),
            _ => None,
        }
    }

    /// Kinds that do all their work the moment they start
    pub fn is_instant(self) -> bool {
        matches!(
            self,
            TriggerType::Toggle | TriggerType::Spawn | TriggerType::Song | TriggerType::Random
        )
    }
}

/// Pulse envelope timings (seconds)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PulseEnvelope {
    pub fade_in: f32,
    pub hold: f32,
    pub fade_out: f32,
}

impl PulseEnvelope {
    pub fn total(&self) -> f32 {
        self.fade_in + self.hold + self.fade_out
    }

    /// Blend intensity in [0, 1] after `elapsed` seconds
    pub fn intensity(&self, elapsed: f32) -> f32 {
        if elapsed < self.fade_in {
            elapsed / self.fade_in
        } else if elapsed < self.fade_in + self.hold {
            1.0
        } else if self.fade_out <= 0.0 {
            0.0
        } else {
            let fading = elapsed - self.fade_in - self.hold;
            1.0 - (fading / self.fade_out).clamp(0.0, 1.0)
        }
    }
}

/// Everything a trigger invocation needs, detached from the object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerParams {
    pub trigger_type: TriggerType,
    pub target_group: Option<GroupId>,
    pub duration: f32,
    pub delay: f32,
    pub easing: Easing,

    pub move_x: f32,
    pub move_y: f32,
    pub rotate_degrees: f32,
    pub target_alpha: f32,

    pub target_color: Rgb,
    pub color_channel: Option<ChannelId>,

    pub pulse_color: Rgb,
    pub pulse: PulseEnvelope,

    pub toggle_on: bool,

    pub spawn_group: Option<GroupId>,
    /// Extra delay given to every trigger this one spawns
    pub spawn_delay: f32,

    pub camera_zoom: f32,
    pub camera_offset_x: f32,
    pub camera_offset_y: f32,
    pub camera_follow_y: bool,

    pub song_offset: f32,

    pub random_groups: Vec<GroupId>,
    pub random_chances: Vec<f32>,
}

impl Default for TriggerParams {
    fn default() -> Self {
        Self {
            trigger_type: TriggerType::Move,
            target_group: None,
            duration: 0.0,
            delay: 0.0,
            easing: Easing::Linear,
            move_x: 0.0,
            move_y: 0.0,
            rotate_degrees: 0.0,
            target_alpha: 1.0,
            target_color: Rgb::WHITE,
            color_channel: None,
            pulse_color: Rgb::WHITE,
            pulse: PulseEnvelope::default(),
            toggle_on: true,
            spawn_group: None,
            spawn_delay: 0.0,
            camera_zoom: 1.0,
            camera_offset_x: 0.0,
            camera_offset_y: 0.0,
            camera_follow_y: false,
            song_offset: 0.0,
            random_groups: Vec::new(),
            random_chances: Vec::new(),
        }
    }
}

impl TriggerParams {
    pub fn new(trigger_type: TriggerType) -> Self {
        Self {
            trigger_type,
            ..Default::default()
        }
    }
}

/// Invisible level object that starts an animation when passed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub params: TriggerParams,
    pub activated: bool,
    /// Fires when the player passes it; otherwise only spawn/random/orbs fire it
    pub touch_activated: bool,
}

impl Trigger {
    pub fn new(params: TriggerParams) -> Self {
        Self {
            params,
            activated: false,
            touch_activated: true,
        }
    }

    pub fn should_fire(&self, trigger_x: f32, player_x: f32) -> bool {
        !self.activated && self.touch_activated && player_x >= trigger_x
    }

    /// Mark fired and hand out a copy of the parameters to execute
    pub fn activate(&mut self) -> TriggerParams {
        self.activated = true;
        self.params.clone()
    }

    pub fn reset_state(&mut self) {
        self.activated = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_when_passed() {
        let mut trigger = Trigger::new(TriggerParams::new(TriggerType::Alpha));
        assert!(!trigger.should_fire(300.0, 299.0));
        assert!(trigger.should_fire(300.0, 300.0));
        trigger.activate();
        assert!(!trigger.should_fire(300.0, 400.0));
        trigger.reset_state();
        assert!(trigger.should_fire(300.0, 400.0));
    }

    #[test]
    fn test_spawn_only_trigger_ignores_touch() {
        let mut trigger = Trigger::new(TriggerParams::new(TriggerType::Move));
        trigger.touch_activated = false;
        assert!(!trigger.should_fire(0.0, 100.0));
    }

    #[test]
    fn test_pulse_envelope() {
        let env = PulseEnvelope {
            fade_in: 0.5,
            hold: 1.0,
            fade_out: 0.5,
        };
        assert_eq!(env.total(), 2.0);
        assert_eq!(env.intensity(0.25), 0.5);
        assert_eq!(env.intensity(1.0), 1.0);
        assert_eq!(env.intensity(1.75), 0.5);
        assert_eq!(env.intensity(3.0), 0.0);
    }

    #[test]
    fn test_pulse_envelope_without_fades() {
        let env = PulseEnvelope {
            fade_in: 0.0,
            hold: 0.5,
            fade_out: 0.0,
        };
        assert_eq!(env.intensity(0.0), 1.0);
        assert_eq!(env.intensity(0.6), 0.0);
    }

    #[test]
    fn test_tags() {
        assert_eq!(TriggerType::from_tag("pulse"), Some(TriggerType::Pulse));
        assert_eq!(TriggerType::from_tag("teleport"), None);
        assert!(TriggerType::Random.is_instant());
        assert!(!TriggerType::Camera.is_instant());
    }
}
