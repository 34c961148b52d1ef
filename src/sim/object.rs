//! Level objects
//!
//! An object's live transform is always its design-time [`BaseTransform`]
//! composed with the [`TriggerOffset`] written by the trigger engine. The base
//! is never animated, so resetting a level is just zeroing the offsets.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Facing, triangle_hitbox};
use super::color::{ChannelId, Rgb};
use super::geom::Rect;
use super::interact::{Orb, Pad, Portal};
use super::trigger::Trigger;

/// Index of an object in its level's object list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

pub type GroupId = u32;

/// Design-time placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseTransform {
    pub pos: Vec2,
    pub rotation: f32,
    pub alpha: f32,
}

impl Default for BaseTransform {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            rotation: 0.0,
            alpha: 1.0,
        }
    }
}

/// Runtime displacement owned by the trigger engine
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TriggerOffset {
    pub offset: Vec2,
    pub rotation: f32,
    pub alpha: f32,
}

/// Live transform used for collision and drawing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub pos: Vec2,
    pub rotation: f32,
    pub alpha: f32,
}

pub fn effective_transform(base: &BaseTransform, offset: &TriggerOffset) -> Transform {
    Transform {
        pos: base.pos + offset.offset,
        rotation: base.rotation + offset.rotation,
        alpha: (base.alpha + offset.alpha).clamp(0.0, 1.0),
    }
}

/// Spike or saw data
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Hazard {
    pub facing: Facing,
    pub saw: bool,
    /// Saw spin speed (radians/s)
    pub rotation_speed: f32,
    /// Spin accumulated since the last reset
    pub spin: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectKind {
    Block,
    Slope,
    Decoration,
    Hazard(Hazard),
    Orb(Orb),
    Pad(Pad),
    Portal(Portal),
    Trigger(Trigger),
    Coin { collected: bool },
}

impl ObjectKind {
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Block => "block",
            ObjectKind::Slope => "slope",
            ObjectKind::Decoration => "decoration",
            ObjectKind::Hazard(_) => "hazard",
            ObjectKind::Orb(_) => "orb",
            ObjectKind::Pad(_) => "pad",
            ObjectKind::Portal(_) => "portal",
            ObjectKind::Trigger(_) => "trigger",
            ObjectKind::Coin { .. } => "coin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelObject {
    pub id: ObjectId,
    /// Identifier from the level file (teleport links refer to it)
    pub name: Option<String>,
    pub kind: ObjectKind,
    pub size: Vec2,

    pub base: BaseTransform,
    pub offset: TriggerOffset,
    /// Live transform, refreshed by [`LevelObject::update`]
    pub pos: Vec2,
    pub rotation: f32,
    pub alpha: f32,
    /// Y as declared, relative to the ground line
    pub declared_y: f32,

    pub solid: bool,
    pub hazard: bool,
    pub active: bool,
    pub visible: bool,
    pub initially_active: bool,
    pub initially_visible: bool,

    pub group_id: Option<GroupId>,
    pub groups: Vec<GroupId>,
    pub color: Rgb,
    pub base_color: Rgb,
    pub color_channel: Option<ChannelId>,
    pub z_order: i32,
}

impl LevelObject {
    pub fn new(id: ObjectId, kind: ObjectKind, pos: Vec2, size: Vec2) -> Self {
        let hazard = matches!(kind, ObjectKind::Hazard(_));
        let solid = matches!(kind, ObjectKind::Block | ObjectKind::Slope);
        let visible = !matches!(kind, ObjectKind::Trigger(_));
        Self {
            id,
            name: None,
            kind,
            size,
            base: BaseTransform {
                pos,
                ..Default::default()
            },
            offset: TriggerOffset::default(),
            pos,
            rotation: 0.0,
            alpha: 1.0,
            declared_y: pos.y,
            solid,
            hazard,
            active: true,
            visible,
            initially_active: true,
            initially_visible: visible,
            group_id: None,
            groups: Vec::new(),
            color: Rgb::WHITE,
            base_color: Rgb::WHITE,
            color_channel: None,
            z_order: 0,
        }
    }

    /// Fold the trigger offset into the live transform
    pub fn update(&mut self, dt: f32) {
        let live = effective_transform(&self.base, &self.offset);
        self.pos = live.pos;
        self.rotation = live.rotation;
        self.alpha = live.alpha;

        match &mut self.kind {
            ObjectKind::Hazard(h) if h.saw => {
                h.spin += h.rotation_speed * dt;
                self.rotation += h.spin;
            }
            ObjectKind::Orb(orb) => orb.tick_cooldown(dt),
            ObjectKind::Pad(pad) => pad.tick_cooldown(dt),
            _ => {}
        }
    }

    /// Place the object `declared_y` below the ground line
    pub fn anchor(&mut self, ground_y: f32) {
        self.base.pos.y = ground_y + self.declared_y;
        self.pos = self.base.pos + self.offset.offset;
    }

    /// Zero the trigger offset and restore design-time appearance
    pub fn reset_trigger_state(&mut self) {
        self.offset = TriggerOffset::default();
        self.pos = self.base.pos;
        self.rotation = self.base.rotation;
        self.alpha = self.base.alpha;
        self.color = self.base_color;
        self.active = self.initially_active;
        self.visible = self.initially_visible;
    }

    /// Clear activation flags and collected state
    pub fn reset_state(&mut self) {
        match &mut self.kind {
            ObjectKind::Hazard(h) => h.spin = 0.0,
            ObjectKind::Orb(orb) => orb.reset_state(),
            ObjectKind::Pad(pad) => pad.reset_state(),
            ObjectKind::Portal(portal) => portal.reset_state(),
            ObjectKind::Trigger(trigger) => trigger.reset_state(),
            ObjectKind::Coin { collected } => *collected = false,
            ObjectKind::Block | ObjectKind::Slope | ObjectKind::Decoration => {}
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    /// Collision box: hazards are trimmed by `hazard_shrink` of their width per side
    pub fn hitbox(&self, hazard_shrink: f32) -> Rect {
        if self.hazard {
            self.rect().shrink(self.size.x * hazard_shrink)
        } else {
            self.rect()
        }
    }

    /// Spike triangle, for spikes only
    pub fn triangle(&self) -> Option<[Vec2; 3]> {
        match &self.kind {
            ObjectKind::Hazard(h) if !h.saw => Some(triangle_hitbox(&self.rect(), h.facing)),
            _ => None,
        }
    }

    pub fn in_group(&self, group: GroupId) -> bool {
        self.group_id == Some(group) || self.groups.contains(&group)
    }

    /// Every group this object belongs to, primary first, without repeats
    pub fn all_groups(&self) -> Vec<GroupId> {
        let mut out: Vec<GroupId> = self.group_id.into_iter().collect();
        for g in &self.groups {
            if !out.contains(g) {
                out.push(*g);
            }
        }
        out
    }

    pub fn as_trigger_mut(&mut self) -> Option<&mut Trigger> {
        match &mut self.kind {
            ObjectKind::Trigger(t) => Some(t),
            _ => None,
        }
    }
}
