//! Conversion from sanitized declarations into runtime level objects

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::decl::{LevelDeclaration, ObjectDeclaration};
use super::validate::{LevelLoadError, ValidationWarning, sanitize, validate};
use crate::consts::{BG_DEFAULT, BLOCK_COLOR_DEFAULT, BLOCK_SIZE, DEFAULT_BPM, GROUND_DEFAULT, SPEED_COUNT};
use crate::progress::Difficulty;
use crate::sim::{
    Easing, Facing, GroupId, Hazard, LevelObject, ObjectId, ObjectKind, Orb, OrbType, Pad,
    PadType, Portal, PortalType, PulseEnvelope, Rgb, Trigger, TriggerParams, TriggerType,
};

/// Primary category of a level object. Every object sits in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    /// Blocks, slopes and anything with an unrecognized type
    Blocks,
    Hazards,
    Orbs,
    Pads,
    Portals,
    Triggers,
    Coins,
    Decorations,
}

impl Bucket {
    pub fn of(kind: &ObjectKind) -> Self {
        match kind {
            ObjectKind::Block | ObjectKind::Slope => Bucket::Blocks,
            ObjectKind::Decoration => Bucket::Decorations,
            ObjectKind::Hazard(_) => Bucket::Hazards,
            ObjectKind::Orb(_) => Bucket::Orbs,
            ObjectKind::Pad(_) => Bucket::Pads,
            ObjectKind::Portal(_) => Bucket::Portals,
            ObjectKind::Trigger(_) => Bucket::Triggers,
            ObjectKind::Coin { .. } => Bucket::Coins,
        }
    }
}

/// Object ids per primary category, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Buckets {
    pub blocks: Vec<ObjectId>,
    pub hazards: Vec<ObjectId>,
    pub orbs: Vec<ObjectId>,
    pub pads: Vec<ObjectId>,
    pub portals: Vec<ObjectId>,
    pub triggers: Vec<ObjectId>,
    pub coins: Vec<ObjectId>,
    pub decorations: Vec<ObjectId>,
}

impl Buckets {
    pub fn get(&self, bucket: Bucket) -> &[ObjectId] {
        match bucket {
            Bucket::Blocks => &self.blocks,
            Bucket::Hazards => &self.hazards,
            Bucket::Orbs => &self.orbs,
            Bucket::Pads => &self.pads,
            Bucket::Portals => &self.portals,
            Bucket::Triggers => &self.triggers,
            Bucket::Coins => &self.coins,
            Bucket::Decorations => &self.decorations,
        }
    }

    fn push(&mut self, bucket: Bucket, id: ObjectId) {
        let list = match bucket {
            Bucket::Blocks => &mut self.blocks,
            Bucket::Hazards => &mut self.hazards,
            Bucket::Orbs => &mut self.orbs,
            Bucket::Pads => &mut self.pads,
            Bucket::Portals => &mut self.portals,
            Bucket::Triggers => &mut self.triggers,
            Bucket::Coins => &mut self.coins,
            Bucket::Decorations => &mut self.decorations,
        };
        list.push(id);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelMetadata {
    pub name: String,
    pub difficulty: Difficulty,
    pub bpm: f32,
    pub bg_color: Rgb,
    pub ground_color: Rgb,
    /// Starting speed index
    pub speed: usize,
}

/// A parsed level, ready to be played
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub metadata: LevelMetadata,
    /// Indexed by [`ObjectId`]
    pub objects: Vec<LevelObject>,
    pub buckets: Buckets,
    pub groups: BTreeMap<GroupId, Vec<ObjectId>>,
    /// Furthest right edge of any object (pixels)
    pub length: f32,
    /// Findings from validation at load time
    #[serde(skip)]
    pub warnings: Vec<ValidationWarning>,
}

impl Level {
    /// Parse a level file: deserialize, validate, sanitize, then build objects
    pub fn from_json(json: &str) -> Result<Self, LevelLoadError> {
        let decl: LevelDeclaration = serde_json::from_str(json)?;
        Self::from_declaration(&decl)
    }

    pub fn from_declaration(decl: &LevelDeclaration) -> Result<Self, LevelLoadError> {
        let warnings = validate(decl)?;
        for warning in &warnings {
            log::warn!("Level validation: {}", warning);
        }

        let mut level = Self::parse(&sanitize(decl));
        level.warnings = warnings;
        log::info!(
            "Loaded level '{}' ({} objects, length {:.0}px)",
            level.metadata.name,
            level.objects.len(),
            level.length
        );
        Ok(level)
    }

    /// Build runtime objects from a declaration. Missing fields fall back to
    /// the same defaults sanitization would fill in.
    pub fn parse(decl: &LevelDeclaration) -> Self {
        let metadata = LevelMetadata {
            name: decl.name.clone().unwrap_or_else(|| "Untitled".to_string()),
            difficulty: decl
                .difficulty
                .as_deref()
                .and_then(Difficulty::from_tag)
                .unwrap_or_default(),
            bpm: decl.bpm.unwrap_or(DEFAULT_BPM),
            bg_color: color_or(decl.bg_color.as_deref(), BG_DEFAULT),
            ground_color: color_or(decl.ground_color.as_deref(), GROUND_DEFAULT),
            speed: decl
                .speed
                .map_or(1, |s| usize::try_from(s).unwrap_or(0).min(SPEED_COUNT - 1)),
        };

        let mut level = Level {
            metadata,
            objects: Vec::new(),
            buckets: Buckets::default(),
            groups: BTreeMap::new(),
            length: 0.0,
            warnings: Vec::new(),
        };

        for obj_decl in decl.objects.iter().flatten() {
            let id = ObjectId(level.objects.len() as u32);
            let Some(obj) = build_object(id, obj_decl) else {
                continue;
            };

            level.buckets.push(Bucket::of(&obj.kind), id);
            for group in obj.all_groups() {
                level.groups.entry(group).or_default().push(id);
            }
            level.length = level.length.max(obj.base.pos.x + obj.size.x);
            level.objects.push(obj);
        }

        link_teleports(&mut level.objects, &level.buckets.portals);
        level
    }

    pub fn object(&self, id: ObjectId) -> Option<&LevelObject> {
        self.objects.get(id.index())
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut LevelObject> {
        self.objects.get_mut(id.index())
    }

    pub fn bucket(&self, bucket: Bucket) -> &[ObjectId] {
        self.buckets.get(bucket)
    }

    /// Members of a group; unknown groups are empty
    pub fn group(&self, group: GroupId) -> &[ObjectId] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Place every object relative to the ground line
    pub fn anchor(&mut self, ground_y: f32) {
        for obj in &mut self.objects {
            obj.anchor(ground_y);
        }
    }

    /// Back to design-time state: offsets zeroed, activations and pickups cleared
    pub fn reset_objects(&mut self) {
        for obj in &mut self.objects {
            obj.reset_trigger_state();
            obj.reset_state();
            obj.update(0.0);
        }
    }
}

/// Load a level file
pub fn load_level(json: &str) -> Result<Level, LevelLoadError> {
    Level::from_json(json)
}

fn color_or(hex: Option<&str>, default: &str) -> Rgb {
    hex.and_then(Rgb::try_from_hex)
        .unwrap_or_else(|| Rgb::from_hex(default))
}

fn build_object(id: ObjectId, decl: &ObjectDeclaration) -> Option<LevelObject> {
    let kind = match decl.type_tag() {
        "block" => ObjectKind::Block,
        "slope" => ObjectKind::Slope,
        "decoration" => ObjectKind::Decoration,
        "spike" | "hazard" => ObjectKind::Hazard(Hazard {
            facing: decl
                .direction
                .as_deref()
                .and_then(Facing::from_tag)
                .unwrap_or_default(),
            saw: decl.saw_blade.unwrap_or(false),
            rotation_speed: decl.rotation_speed.unwrap_or(0.0),
            spin: 0.0,
        }),
        "orb" => {
            let orb_type = decl.orb_type.as_deref().and_then(OrbType::from_tag);
            if orb_type.is_none() {
                log::warn!("Object {}: unknown orb type {:?}", id.0, decl.orb_type);
            }
            let mut orb = Orb::new(orb_type.unwrap_or_default());
            orb.trigger_group = decl.trigger_group_id;
            orb.multi_activate = decl.multi_activate.unwrap_or(false);
            if let Some(angle) = decl.dash_angle {
                orb.dash_angle = angle;
            }
            if let Some(duration) = decl.dash_duration {
                orb.dash_duration = duration;
            }
            ObjectKind::Orb(orb)
        }
        "pad" => {
            let pad_type = decl.pad_type.as_deref().and_then(PadType::from_tag);
            if pad_type.is_none() {
                log::warn!("Object {}: unknown pad type {:?}", id.0, decl.pad_type);
            }
            let mut pad = Pad::new(pad_type.unwrap_or_default());
            if let Some(angle) = decl.dash_angle {
                pad.dash_angle = angle;
            }
            if let Some(duration) = decl.dash_duration {
                pad.dash_duration = duration;
            }
            ObjectKind::Pad(pad)
        }
        "portal" => {
            let Some(portal_type) = decl.portal_type.as_deref().and_then(PortalType::from_tag)
            else {
                log::warn!("Object {}: unknown portal type {:?}, skipped", id.0, decl.portal_type);
                return None;
            };
            let mut portal = Portal::new(portal_type);
            portal.linked_name = decl.linked_portal_id.clone();
            ObjectKind::Portal(portal)
        }
        "trigger" => {
            let mut trigger = Trigger::new(trigger_params(id, decl));
            let spawn_only = decl.spawn_activated.unwrap_or(false);
            trigger.touch_activated = decl.touch_activated.unwrap_or(!spawn_only);
            ObjectKind::Trigger(trigger)
        }
        "coin" => ObjectKind::Coin { collected: false },
        other => {
            log::debug!("Object {}: unknown type '{}', treated as block", id.0, other);
            ObjectKind::Block
        }
    };

    let pos = Vec2::new(decl.x.unwrap_or(0.0), decl.y.unwrap_or(0.0));
    let size = Vec2::new(
        decl.width.unwrap_or(BLOCK_SIZE),
        decl.height.unwrap_or(BLOCK_SIZE),
    );
    let generic = matches!(
        kind,
        ObjectKind::Block | ObjectKind::Slope | ObjectKind::Decoration
    );
    let default_color = if generic { BLOCK_COLOR_DEFAULT } else { "#ffffff" };

    let mut obj = LevelObject::new(id, kind, pos, size);
    obj.name = decl.id.clone();

    let rotation = decl.rotation.unwrap_or(0.0);
    let alpha = decl.alpha.unwrap_or(1.0).clamp(0.0, 1.0);
    obj.base.rotation = rotation;
    obj.base.alpha = alpha;
    obj.rotation = rotation;
    obj.alpha = alpha;

    if generic && let Some(solid) = decl.solid {
        obj.solid = solid;
    }
    obj.active = decl.active.unwrap_or(true);
    obj.initially_active = obj.active;
    if obj.visible {
        obj.visible = decl.visible.unwrap_or(true);
    }
    obj.initially_visible = obj.visible;

    obj.group_id = decl.group_id;
    obj.groups = decl.groups.clone();
    obj.base_color = color_or(decl.color.as_deref(), default_color);
    obj.color = obj.base_color;
    obj.color_channel = decl.color_channel;
    obj.z_order = decl.z_order.unwrap_or(0);

    Some(obj)
}

fn trigger_params(id: ObjectId, decl: &ObjectDeclaration) -> TriggerParams {
    let trigger_type = decl.trigger_type.as_deref().and_then(TriggerType::from_tag);
    if trigger_type.is_none() {
        log::warn!("Object {}: unknown trigger type {:?}", id.0, decl.trigger_type);
    }
    let white = |hex: &Option<String>| color_or(hex.as_deref(), "#ffffff");

    TriggerParams {
        trigger_type: trigger_type.unwrap_or_default(),
        target_group: decl
            .target_group_id
            .or_else(|| decl.target_groups.first().copied()),
        duration: decl.duration.unwrap_or(0.0).max(0.0),
        delay: decl.delay.unwrap_or(0.0).max(0.0),
        easing: decl
            .easing_type
            .as_deref()
            .map_or(Easing::Linear, Easing::from_name),
        move_x: decl.move_x.unwrap_or(0.0),
        move_y: decl.move_y.unwrap_or(0.0),
        rotate_degrees: decl.rotate_degrees.unwrap_or(0.0),
        target_alpha: decl.target_alpha.unwrap_or(1.0),
        target_color: white(&decl.target_color),
        color_channel: decl.color_channel_id,
        pulse_color: white(&decl.pulse_color),
        pulse: PulseEnvelope {
            fade_in: decl.pulse_fade_in.unwrap_or(0.0),
            hold: decl.pulse_hold.unwrap_or(0.0),
            fade_out: decl.pulse_fade_out.unwrap_or(0.0),
        },
        toggle_on: decl.toggle_on.unwrap_or(true),
        spawn_group: decl.spawn_group_id,
        spawn_delay: decl.spawn_delay.unwrap_or(0.0),
        camera_zoom: decl.camera_zoom.unwrap_or(1.0),
        camera_offset_x: decl.camera_offset_x.unwrap_or(0.0),
        camera_offset_y: decl.camera_offset_y.unwrap_or(0.0),
        camera_follow_y: decl.camera_follow_y.unwrap_or(false),
        song_offset: decl.song_offset.unwrap_or(0.0),
        random_groups: decl.random_groups.clone(),
        random_chances: decl.random_chances.clone(),
    }
}

/// Pair teleport portals by matching `linked_name` against other portals' names
fn link_teleports(objects: &mut [LevelObject], portals: &[ObjectId]) {
    let teleports: Vec<(ObjectId, Option<String>)> = portals
        .iter()
        .filter_map(|&id| match &objects[id.index()].kind {
            ObjectKind::Portal(p) if p.portal_type == PortalType::Teleport => {
                Some((id, objects[id.index()].name.clone()))
            }
            _ => None,
        })
        .collect();

    for &(id, _) in &teleports {
        let ObjectKind::Portal(portal) = &mut objects[id.index()].kind else {
            continue;
        };
        let Some(link) = portal.linked_name.as_deref() else {
            continue;
        };
        portal.linked = teleports
            .iter()
            .find(|(other, name)| *other != id && name.as_deref() == Some(link))
            .map(|(other, _)| *other);
        if portal.linked.is_none() {
            log::warn!("Teleport portal {} links to unknown portal '{}'", id.0, link);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn decl(objects: Vec<ObjectDeclaration>) -> LevelDeclaration {
        LevelDeclaration {
            name: Some("Parse".to_string()),
            objects: Some(objects),
            ..Default::default()
        }
    }

    fn teleport(name: &str, link: Option<&str>, x: f32) -> ObjectDeclaration {
        let mut d = ObjectDeclaration::new("portal", x, -60.0);
        d.portal_type = Some("teleport".to_string());
        d.id = Some(name.to_string());
        d.linked_portal_id = link.map(str::to_string);
        d
    }

    #[test]
    fn test_every_object_lands_in_one_bucket() {
        let mut orb = ObjectDeclaration::new("orb", 120.0, -60.0);
        orb.orb_type = Some("pink".to_string());
        let mut portal = ObjectDeclaration::new("portal", 150.0, -90.0);
        portal.portal_type = Some("mode_ship".to_string());
        let level = Level::parse(&decl(vec![
            ObjectDeclaration::new("block", 0.0, 0.0),
            ObjectDeclaration::new("slope", 30.0, 0.0),
            ObjectDeclaration::new("spike", 60.0, -30.0),
            ObjectDeclaration::new("pad", 90.0, -10.0),
            orb,
            portal,
            ObjectDeclaration::new("trigger", 180.0, 0.0),
            ObjectDeclaration::new("coin", 210.0, -90.0),
            ObjectDeclaration::new("decoration", 240.0, -30.0),
            ObjectDeclaration::new("mystery", 270.0, 0.0),
        ]));

        assert_eq!(level.objects.len(), 10);
        assert_eq!(level.buckets.blocks, vec![ObjectId(0), ObjectId(1), ObjectId(9)]);
        assert_eq!(level.bucket(Bucket::Hazards), &[ObjectId(2)]);
        assert_eq!(level.bucket(Bucket::Pads), &[ObjectId(3)]);
        assert_eq!(level.bucket(Bucket::Orbs), &[ObjectId(4)]);
        assert_eq!(level.bucket(Bucket::Portals), &[ObjectId(5)]);
        assert_eq!(level.bucket(Bucket::Triggers), &[ObjectId(6)]);
        assert_eq!(level.bucket(Bucket::Coins), &[ObjectId(7)]);
        assert_eq!(level.bucket(Bucket::Decorations), &[ObjectId(8)]);

        let total: usize = [
            Bucket::Blocks,
            Bucket::Hazards,
            Bucket::Orbs,
            Bucket::Pads,
            Bucket::Portals,
            Bucket::Triggers,
            Bucket::Coins,
            Bucket::Decorations,
        ]
        .iter()
        .map(|b| level.bucket(*b).len())
        .sum();
        assert_eq!(total, level.objects.len());
    }

    #[test]
    fn test_object_flags_by_kind() {
        let level = Level::parse(&decl(vec![
            ObjectDeclaration::new("block", 0.0, 0.0),
            ObjectDeclaration::new("coin", 30.0, -60.0),
            ObjectDeclaration::new("spike", 60.0, -30.0),
            ObjectDeclaration::new("decoration", 90.0, -30.0),
        ]));
        let coin = &level.objects[1];
        assert!(!coin.solid && !coin.hazard);
        assert!(matches!(coin.kind, ObjectKind::Coin { collected: false }));
        assert!(level.objects[0].solid);
        assert!(level.objects[2].hazard);
        assert!(!level.objects[3].solid);
        assert_eq!(level.objects[0].base_color, Rgb::from_hex(BLOCK_COLOR_DEFAULT));
    }

    #[test]
    fn test_metadata_defaults() {
        let level = Level::parse(&LevelDeclaration::default());
        assert_eq!(level.metadata.name, "Untitled");
        assert_eq!(level.metadata.difficulty, Difficulty::Normal);
        assert_eq!(level.metadata.bpm, DEFAULT_BPM);
        assert_eq!(level.metadata.speed, 1);
        assert!(level.objects.is_empty());
        assert_eq!(level.length, 0.0);
    }

    #[test]
    fn test_trigger_parameters() {
        let mut t = ObjectDeclaration::new("trigger", 300.0, 0.0);
        t.trigger_type = Some("move".to_string());
        t.target_groups = vec![7, 8];
        t.duration = Some(2.0);
        t.move_x = Some(300.0);
        t.easing_type = Some("easeOutQuad".to_string());
        let mut spawn = ObjectDeclaration::new("trigger", 330.0, 0.0);
        spawn.trigger_type = Some("spawn".to_string());
        spawn.spawn_activated = Some(true);
        spawn.spawn_group_id = Some(4);

        let level = Level::parse(&decl(vec![t, spawn]));
        let ObjectKind::Trigger(trigger) = &level.objects[0].kind else {
            panic!("expected trigger");
        };
        assert_eq!(trigger.params.trigger_type, TriggerType::Move);
        assert_eq!(trigger.params.target_group, Some(7));
        assert_eq!(trigger.params.duration, 2.0);
        assert_eq!(trigger.params.move_x, 300.0);
        assert_eq!(trigger.params.easing, Easing::OutQuad);
        assert_eq!(trigger.params.target_alpha, 1.0);
        assert!(trigger.touch_activated);
        assert!(!level.objects[0].visible);

        let ObjectKind::Trigger(spawn) = &level.objects[1].kind else {
            panic!("expected trigger");
        };
        assert_eq!(spawn.params.spawn_group, Some(4));
        assert!(!spawn.touch_activated);
    }

    #[test]
    fn test_teleport_links_resolve_by_name() {
        let level = Level::parse(&decl(vec![
            teleport("in", Some("out"), 300.0),
            teleport("out", None, 900.0),
            teleport("lost", Some("nowhere"), 1200.0),
        ]));
        let linked = |i: usize| match &level.objects[i].kind {
            ObjectKind::Portal(p) => p.linked,
            _ => None,
        };
        assert_eq!(linked(0), Some(ObjectId(1)));
        assert_eq!(linked(1), None);
        assert_eq!(linked(2), None);
    }

    #[test]
    fn test_unknown_portal_type_is_skipped() {
        let mut bad = ObjectDeclaration::new("portal", 60.0, -60.0);
        bad.portal_type = Some("warp".to_string());
        let level = Level::parse(&decl(vec![bad, ObjectDeclaration::new("block", 90.0, 0.0)]));
        assert_eq!(level.objects.len(), 1);
        assert_eq!(level.objects[0].id, ObjectId(0));
        assert!(level.buckets.portals.is_empty());
    }

    #[test]
    fn test_anchor_and_reset() {
        let mut grouped = ObjectDeclaration::new("block", 300.0, -60.0);
        grouped.group_id = Some(1);
        let mut level = Level::parse(&decl(vec![grouped]));
        level.anchor(450.0);
        assert_eq!(level.objects[0].pos.y, 390.0);
        assert_eq!(level.objects[0].declared_y, -60.0);

        level.objects[0].offset.offset.x = 90.0;
        level.objects[0].update(0.0);
        assert_eq!(level.objects[0].pos.x, 390.0);
        level.reset_objects();
        assert_eq!(level.objects[0].pos, Vec2::new(300.0, 390.0));
    }

    #[test]
    fn test_load_level_errors() {
        assert!(matches!(load_level("{not json"), Err(LevelLoadError::Json(_))));
        assert!(matches!(
            load_level(r#"{"name": "No objects"}"#),
            Err(LevelLoadError::MissingObjects)
        ));
    }

    #[test]
    fn test_load_level_keeps_warnings_and_drops_broken_objects() {
        let json = r#"{
            "objects": [
                {"type": "block", "x": 0, "y": 0},
                {"type": "block", "x": 600},
                {"type": "spike", "x": 300, "y": -30, "direction": "down"}
            ]
        }"#;
        let level = load_level(json).unwrap();
        assert_eq!(level.metadata.name, "Untitled");
        assert_eq!(level.objects.len(), 2);
        assert_eq!(level.length, 330.0);
        assert!(!level.warnings.is_empty());
        let ObjectKind::Hazard(h) = &level.objects[1].kind else {
            panic!("expected hazard");
        };
        assert_eq!(h.facing, Facing::Down);
    }

    fn arb_object() -> impl Strategy<Value = ObjectDeclaration> {
        (
            prop::sample::select(vec!["block", "spike", "coin", "decoration", "pad"]),
            0.0f32..5000.0,
            -300.0f32..0.0,
            1.0f32..200.0,
            prop::option::of(1u32..6),
            prop::collection::vec(1u32..6, 0..3),
        )
            .prop_map(|(tag, x, y, width, group_id, groups)| {
                let mut d = ObjectDeclaration::new(tag, x, y);
                d.width = Some(width);
                d.group_id = group_id;
                d.groups = groups;
                d
            })
    }

    proptest! {
        #[test]
        fn test_length_and_groups_match_declarations(
            objects in prop::collection::vec(arb_object(), 1..40)
        ) {
            let level = Level::parse(&decl(objects.clone()));
            prop_assert_eq!(level.objects.len(), objects.len());

            let expected = objects
                .iter()
                .map(|o| o.x.unwrap_or(0.0) + o.width.unwrap_or(BLOCK_SIZE))
                .fold(0.0f32, f32::max);
            prop_assert_eq!(level.length, expected);

            for (i, o) in objects.iter().enumerate() {
                for group in o.declared_groups() {
                    prop_assert!(level.group(group).contains(&ObjectId(i as u32)));
                }
            }
        }
    }
}
