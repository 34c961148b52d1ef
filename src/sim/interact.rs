//! Orbs, pads and portals
//!
//! Each activation mutates the player directly where the effect is purely
//! kinematic and returns a typed result describing what happened, so the
//! session can apply the rest (mode switch, camera, sounds, particles).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::modes::Mode;
use super::object::{GroupId, ObjectId};
use super::player::Player;
use crate::audio::SoundEffect;

/// Kinematic descriptor shared by orbs and pads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchBehavior {
    pub impulse: f32,
    pub gravity_flip: bool,
    pub spider: bool,
    pub dash: bool,
    pub trigger: bool,
}

impl LaunchBehavior {
    const fn impulse(impulse: f32, gravity_flip: bool) -> Self {
        Self {
            impulse,
            gravity_flip,
            spider: false,
            dash: false,
            trigger: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrbType {
    #[default]
    Yellow,
    Pink,
    Red,
    Blue,
    Green,
    Black,
    Spider,
    Dash,
    Trigger,
}

impl OrbType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_uppercase().as_str() {
            "YELLOW" => Some(OrbType::Yellow),
            "PINK" => Some(OrbType::Pink),
            "RED" => Some(OrbType::Red),
            "BLUE" => Some(OrbType::Blue),
            "GREEN" => Some(OrbType::Green),
            "BLACK" => Some(OrbType::Black),
            "SPIDER" => Some(OrbType::Spider),
            "DASH" => Some(OrbType::Dash),
            "TRIGGER" => Some(OrbType::Trigger),
            _ => None,
        }
    }

    pub const fn behavior(self) -> LaunchBehavior {
        match self {
            OrbType::Yellow => LaunchBehavior::impulse(-780.0, false),
            OrbType::Pink => LaunchBehavior::impulse(-560.0, false),
            OrbType::Red => LaunchBehavior::impulse(-1000.0, false),
            OrbType::Blue | OrbType::Green => LaunchBehavior::impulse(-780.0, true),
            // Forces the player toward its floor
            OrbType::Black => LaunchBehavior::impulse(780.0, false),
            OrbType::Spider => LaunchBehavior {
                spider: true,
                ..LaunchBehavior::impulse(0.0, true)
            },
            OrbType::Dash => LaunchBehavior {
                dash: true,
                ..LaunchBehavior::impulse(-780.0, false)
            },
            OrbType::Trigger => LaunchBehavior {
                trigger: true,
                ..LaunchBehavior::impulse(0.0, false)
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PadType {
    #[default]
    Yellow,
    Pink,
    Red,
    Blue,
    Spider,
    Dash,
}

impl PadType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_uppercase().as_str() {
            "YELLOW" => Some(PadType::Yellow),
            "PINK" => Some(PadType::Pink),
            "RED" => Some(PadType::Red),
            "BLUE" => Some(PadType::Blue),
            "SPIDER" => Some(PadType::Spider),
            "DASH" => Some(PadType::Dash),
            _ => None,
        }
    }

    pub const fn behavior(self) -> LaunchBehavior {
        match self {
            PadType::Yellow => LaunchBehavior::impulse(-900.0, false),
            PadType::Pink => LaunchBehavior::impulse(-650.0, false),
            PadType::Red => LaunchBehavior::impulse(-1100.0, false),
            PadType::Blue => LaunchBehavior::impulse(0.0, true),
            PadType::Spider => LaunchBehavior {
                spider: true,
                ..LaunchBehavior::impulse(0.0, true)
            },
            PadType::Dash => LaunchBehavior {
                dash: true,
                ..LaunchBehavior::impulse(-900.0, false)
            },
        }
    }
}

/// What an orb or pad did to the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Launch {
    /// Vertical velocity set from the impulse (after an optional flip)
    Impulse { gravity_flipped: bool },
    /// Gravity flipped with vertical velocity zeroed
    SpiderFlip,
    /// Dash started along `direction` (pixels/s)
    Dash { direction: Vec2 },
    /// Trigger orb: the session fans out to this group's triggers
    Trigger { group: Option<GroupId> },
}

fn apply_launch(
    behavior: LaunchBehavior,
    player: &mut Player,
    dash_angle: f32,
    dash_duration: f32,
    trigger_group: Option<GroupId>,
) -> Launch {
    let body = &mut player.body;
    if behavior.trigger {
        return Launch::Trigger {
            group: trigger_group,
        };
    }
    if behavior.spider {
        body.gravity_dir = -body.gravity_dir;
        body.vel.y = 0.0;
        return Launch::SpiderFlip;
    }
    if behavior.dash {
        let direction = Vec2::from_angle(dash_angle.to_radians()) * behavior.impulse.abs();
        body.vel.y = direction.y;
        player.start_dash(direction, dash_duration);
        return Launch::Dash { direction };
    }
    if behavior.gravity_flip {
        body.gravity_dir = -body.gravity_dir;
    }
    if behavior.impulse != 0.0 {
        body.vel.y = behavior.impulse * body.gravity_dir;
        body.on_ground = false;
    }
    Launch::Impulse {
        gravity_flipped: behavior.gravity_flip,
    }
}

fn launch_sound(launch: &Launch, default: SoundEffect) -> SoundEffect {
    match launch {
        Launch::SpiderFlip
        | Launch::Impulse {
            gravity_flipped: true,
        } => SoundEffect::GravityFlip,
        _ => default,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbResult {
    pub orb_type: OrbType,
    pub sound: SoundEffect,
    pub launch: Launch,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PadResult {
    pub pad_type: PadType,
    pub sound: SoundEffect,
    pub launch: Launch,
}

/// Mid-air ring used by tapping while overlapping it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Orb {
    pub orb_type: OrbType,
    pub activated: bool,
    pub cooldown: f32,
    pub trigger_group: Option<GroupId>,
    /// Degrees; -90 points up
    pub dash_angle: f32,
    pub dash_duration: f32,
    pub multi_activate: bool,
}

impl Orb {
    pub fn new(orb_type: OrbType) -> Self {
        Self {
            orb_type,
            activated: false,
            cooldown: 0.0,
            trigger_group: None,
            dash_angle: -90.0,
            dash_duration: 0.5,
            multi_activate: false,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown <= 0.0 && (!self.activated || self.multi_activate)
    }

    pub fn can_activate(&self, player_hitbox: &Rect, orb_rect: &Rect) -> bool {
        self.is_ready() && player_hitbox.overlaps(orb_rect)
    }

    pub fn activate(&mut self, player: &mut Player, cooldown: f32) -> OrbResult {
        self.activated = true;
        self.cooldown = cooldown;
        let launch = apply_launch(
            self.orb_type.behavior(),
            player,
            self.dash_angle,
            self.dash_duration,
            self.trigger_group,
        );
        OrbResult {
            orb_type: self.orb_type,
            sound: launch_sound(&launch, SoundEffect::Orb),
            launch,
        }
    }

    pub fn tick_cooldown(&mut self, dt: f32) {
        if self.cooldown > 0.0 {
            self.cooldown -= dt;
        }
    }

    pub fn reset_state(&mut self) {
        self.activated = false;
        self.cooldown = 0.0;
    }
}

/// Floor or ceiling launcher used on contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pad {
    pub pad_type: PadType,
    pub activated: bool,
    pub cooldown: f32,
    pub dash_angle: f32,
    pub dash_duration: f32,
}

impl Pad {
    pub fn new(pad_type: PadType) -> Self {
        Self {
            pad_type,
            activated: false,
            cooldown: 0.0,
            dash_angle: -90.0,
            dash_duration: 0.5,
        }
    }

    pub fn should_activate(&self, player_hitbox: &Rect, pad_rect: &Rect) -> bool {
        self.cooldown <= 0.0 && !self.activated && player_hitbox.overlaps(pad_rect)
    }

    pub fn activate(&mut self, player: &mut Player, cooldown: f32) -> PadResult {
        self.activated = true;
        self.cooldown = cooldown;
        let launch = apply_launch(
            self.pad_type.behavior(),
            player,
            self.dash_angle,
            self.dash_duration,
            None,
        );
        PadResult {
            pad_type: self.pad_type,
            sound: launch_sound(&launch, SoundEffect::Pad),
            launch,
        }
    }

    pub fn tick_cooldown(&mut self, dt: f32) {
        if self.cooldown > 0.0 {
            self.cooldown -= dt;
        }
    }

    pub fn reset_state(&mut self) {
        self.activated = false;
        self.cooldown = 0.0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortalType {
    Mode(Mode),
    GravityFlip,
    GravityNormal,
    /// Speed index 0..=4 (half, normal, double, triple, quadruple)
    Speed(usize),
    SizeMini,
    SizeNormal,
    Mirror,
    Dual,
    DualOff,
    Teleport,
}

impl PortalType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.to_lowercase();
        if let Some(mode) = tag.strip_prefix("mode_") {
            return Mode::from_tag(mode).map(PortalType::Mode);
        }
        match tag.as_str() {
            "gravity_flip" => Some(PortalType::GravityFlip),
            "gravity_normal" => Some(PortalType::GravityNormal),
            "speed_half" => Some(PortalType::Speed(0)),
            "speed_normal" => Some(PortalType::Speed(1)),
            "speed_double" => Some(PortalType::Speed(2)),
            "speed_triple" => Some(PortalType::Speed(3)),
            "speed_quadruple" => Some(PortalType::Speed(4)),
            "size_mini" => Some(PortalType::SizeMini),
            "size_normal" => Some(PortalType::SizeNormal),
            "mirror" => Some(PortalType::Mirror),
            "dual" => Some(PortalType::Dual),
            "dual_off" => Some(PortalType::DualOff),
            "teleport" => Some(PortalType::Teleport),
            _ => None,
        }
    }
}

/// What crossing a portal asks the session to do
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PortalEffect {
    Mode(Mode),
    /// New gravity direction
    Gravity(f32),
    Speed(usize),
    Size { mini: bool },
    /// Toggle camera mirroring
    Mirror,
    Dual(bool),
    /// Destination top-left, or `None` when the link never resolved
    Teleport(Option<Vec2>),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortalResult {
    pub portal_type: PortalType,
    pub sound: SoundEffect,
    pub effect: PortalEffect,
}

/// One-shot zone changing mode, gravity, speed, size, mirroring or position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portal {
    pub portal_type: PortalType,
    pub activated: bool,
    /// Declared identifier of the paired teleport portal
    pub linked_name: Option<String>,
    /// Resolved at load time
    pub linked: Option<ObjectId>,
}

impl Portal {
    pub fn new(portal_type: PortalType) -> Self {
        Self {
            portal_type,
            activated: false,
            linked_name: None,
            linked: None,
        }
    }

    pub fn should_activate(&self, player_hitbox: &Rect, portal_rect: &Rect) -> bool {
        !self.activated && player_hitbox.overlaps(portal_rect)
    }

    /// `linked_rect` is the live rect of the paired portal, if any
    pub fn activate(&mut self, player: &Player, linked_rect: Option<Rect>) -> PortalResult {
        self.activated = true;
        let effect = match self.portal_type {
            PortalType::Mode(mode) => PortalEffect::Mode(mode),
            PortalType::GravityFlip => PortalEffect::Gravity(-1.0),
            PortalType::GravityNormal => PortalEffect::Gravity(1.0),
            PortalType::Speed(index) => PortalEffect::Speed(index),
            PortalType::SizeMini => PortalEffect::Size { mini: true },
            PortalType::SizeNormal => PortalEffect::Size { mini: false },
            PortalType::Mirror => PortalEffect::Mirror,
            PortalType::Dual => PortalEffect::Dual(true),
            PortalType::DualOff => PortalEffect::Dual(false),
            PortalType::Teleport => PortalEffect::Teleport(linked_rect.map(|r| {
                Vec2::new(r.x, r.y + (r.height - player.body.size.y) / 2.0)
            })),
        };
        PortalResult {
            portal_type: self.portal_type,
            sound: SoundEffect::Portal,
            effect,
        }
    }

    pub fn reset_state(&mut self) {
        self.activated = false;
    }
}

/// Tagged activation result handed to the session and the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivationResult {
    Orb(OrbResult),
    Pad(PadResult),
    Portal(PortalResult),
}

impl ActivationResult {
    pub fn sound(&self) -> SoundEffect {
        match self {
            ActivationResult::Orb(r) => r.sound,
            ActivationResult::Pad(r) => r.sound,
            ActivationResult::Portal(r) => r.sound,
        }
    }
}
