//! Level declaration document
//!
//! Field names follow the camelCase level file format. Every field is optional
//! so a partial document still deserializes; validation reports what is
//! missing and sanitization fills it in.

use serde::{Deserialize, Serialize};

use crate::sim::{ChannelId, GroupId};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDeclaration {
    pub name: Option<String>,
    pub difficulty: Option<String>,
    pub bpm: Option<f32>,
    pub bg_color: Option<String>,
    pub ground_color: Option<String>,
    /// Starting speed index
    pub speed: Option<i32>,
    pub objects: Option<Vec<ObjectDeclaration>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDeclaration {
    #[serde(rename = "type")]
    pub object_type: Option<String>,
    pub id: Option<String>,
    pub x: Option<f32>,
    /// Offset from the ground line; negative is above it
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub rotation: Option<f32>,
    pub alpha: Option<f32>,
    pub color: Option<String>,
    pub active: Option<bool>,
    pub visible: Option<bool>,
    pub solid: Option<bool>,
    pub group_id: Option<GroupId>,
    #[serde(default)]
    pub groups: Vec<GroupId>,
    pub color_channel: Option<ChannelId>,
    pub z_order: Option<i32>,

    // Hazards
    pub direction: Option<String>,
    pub saw_blade: Option<bool>,
    pub rotation_speed: Option<f32>,

    // Orbs and pads
    pub orb_type: Option<String>,
    pub pad_type: Option<String>,
    pub trigger_group_id: Option<GroupId>,
    pub dash_angle: Option<f32>,
    pub dash_duration: Option<f32>,
    pub multi_activate: Option<bool>,

    // Portals
    pub portal_type: Option<String>,
    pub linked_portal_id: Option<String>,

    // Triggers
    pub trigger_type: Option<String>,
    pub touch_activated: Option<bool>,
    pub spawn_activated: Option<bool>,
    pub target_group_id: Option<GroupId>,
    #[serde(default)]
    pub target_groups: Vec<GroupId>,
    pub duration: Option<f32>,
    pub delay: Option<f32>,
    pub easing_type: Option<String>,
    pub move_x: Option<f32>,
    pub move_y: Option<f32>,
    pub rotate_degrees: Option<f32>,
    pub target_alpha: Option<f32>,
    pub target_color: Option<String>,
    pub color_channel_id: Option<ChannelId>,
    pub pulse_color: Option<String>,
    pub pulse_fade_in: Option<f32>,
    pub pulse_hold: Option<f32>,
    pub pulse_fade_out: Option<f32>,
    pub toggle_on: Option<bool>,
    pub spawn_group_id: Option<GroupId>,
    pub spawn_delay: Option<f32>,
    pub camera_zoom: Option<f32>,
    pub camera_offset_x: Option<f32>,
    pub camera_offset_y: Option<f32>,
    pub camera_follow_y: Option<bool>,
    pub song_offset: Option<f32>,
    #[serde(default)]
    pub random_groups: Vec<GroupId>,
    #[serde(default)]
    pub random_chances: Vec<f32>,
}

impl ObjectDeclaration {
    /// Bare declaration at a position, mostly for building levels in code
    pub fn new(object_type: &str, x: f32, y: f32) -> Self {
        Self {
            object_type: Some(object_type.to_string()),
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    pub fn type_tag(&self) -> &str {
        self.object_type.as_deref().unwrap_or("")
    }

    pub fn has_position(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }

    /// Every group this declaration joins
    pub fn declared_groups(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.group_id.into_iter().chain(self.groups.iter().copied())
    }

    pub fn is_teleport_portal(&self) -> bool {
        self.type_tag() == "portal"
            && self
                .portal_type
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case("teleport"))
    }

    pub fn is_spawn_trigger(&self) -> bool {
        self.type_tag() == "trigger"
            && self
                .trigger_type
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case("spawn"))
    }
}
