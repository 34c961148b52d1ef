//! Structural validation and sanitization of level declarations
//!
//! Validation never rejects a playable level: findings are returned as
//! warnings and the loader carries on with sanitized defaults. The only hard
//! failures are unparseable JSON and a missing objects array.

use std::collections::BTreeSet;
use std::fmt;

use super::decl::{LevelDeclaration, ObjectDeclaration};
use crate::consts::{
    BG_DEFAULT, BLOCK_SIZE, DEFAULT_BPM, DEFAULT_SPEED_INDEX, GROUND_DEFAULT, MAX_BPM,
    MAX_LEVEL_BLOCKS, MIN_BPM, MIN_LEVEL_BLOCKS, SPEED_COUNT,
};

/// Error type for level loads that cannot produce a level at all.
#[derive(Debug)]
pub enum LevelLoadError {
    Json(serde_json::Error),
    MissingObjects,
}

impl fmt::Display for LevelLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelLoadError::Json(e) => write!(f, "Level JSON parse error: {}", e),
            LevelLoadError::MissingObjects => write!(f, "Level must have an objects array"),
        }
    }
}

impl std::error::Error for LevelLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelLoadError::Json(e) => Some(e),
            LevelLoadError::MissingObjects => None,
        }
    }
}

impl From<serde_json::Error> for LevelLoadError {
    fn from(e: serde_json::Error) -> Self {
        LevelLoadError::Json(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    MissingName,
    NoObjects,
    BpmOutOfRange,
    SpeedOutOfRange,
    MissingPosition,
    MissingType,
    TooShort,
    TooLong,
    UnknownSpawnGroup,
    UnlinkedTeleport,
}

/// A non-fatal finding about a level declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    pub kind: WarningKind,
    /// Index into the objects array, for per-object findings
    pub object: Option<usize>,
    pub message: String,
}

impl ValidationWarning {
    fn level(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            object: None,
            message: message.into(),
        }
    }

    fn object(kind: WarningKind, index: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            object: Some(index),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.object {
            Some(i) => write!(f, "Object {}: {}", i, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Check a declaration for structural problems.
/// Returns `Err` only when the objects array is absent.
pub fn validate(decl: &LevelDeclaration) -> Result<Vec<ValidationWarning>, LevelLoadError> {
    let mut warnings = Vec::new();

    if decl.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
        warnings.push(ValidationWarning::level(
            WarningKind::MissingName,
            "Level must have a name",
        ));
    }

    let Some(objects) = &decl.objects else {
        return Err(LevelLoadError::MissingObjects);
    };

    if objects.is_empty() {
        warnings.push(ValidationWarning::level(
            WarningKind::NoObjects,
            "Level must have at least one object",
        ));
    }

    if let Some(bpm) = decl.bpm
        && !(MIN_BPM..=MAX_BPM).contains(&bpm)
    {
        warnings.push(ValidationWarning::level(
            WarningKind::BpmOutOfRange,
            format!("BPM {} must be between {} and {}", bpm, MIN_BPM, MAX_BPM),
        ));
    }

    if let Some(speed) = decl.speed
        && (speed < 0 || speed as usize >= SPEED_COUNT)
    {
        warnings.push(ValidationWarning::level(
            WarningKind::SpeedOutOfRange,
            format!("Invalid speed index {}", speed),
        ));
    }

    let mut max_x: f32 = 0.0;
    for (i, obj) in objects.iter().enumerate() {
        if !obj.has_position() {
            warnings.push(ValidationWarning::object(
                WarningKind::MissingPosition,
                i,
                "missing position",
            ));
        }
        if obj.object_type.as_deref().is_none_or(str::is_empty) {
            warnings.push(ValidationWarning::object(
                WarningKind::MissingType,
                i,
                "missing type",
            ));
        }
        if let Some(x) = obj.x {
            max_x = max_x.max(x);
        }
    }

    if max_x < BLOCK_SIZE * MIN_LEVEL_BLOCKS {
        warnings.push(ValidationWarning::level(
            WarningKind::TooShort,
            format!("Level is too short (minimum {} blocks)", MIN_LEVEL_BLOCKS),
        ));
    }
    if max_x > BLOCK_SIZE * MAX_LEVEL_BLOCKS {
        warnings.push(ValidationWarning::level(
            WarningKind::TooLong,
            format!("Level is too long (maximum {} blocks)", MAX_LEVEL_BLOCKS),
        ));
    }

    let groups: BTreeSet<_> = objects
        .iter()
        .flat_map(ObjectDeclaration::declared_groups)
        .collect();

    for (i, obj) in objects.iter().enumerate() {
        if obj.is_spawn_trigger()
            && let Some(group) = obj.spawn_group_id
            && !groups.contains(&group)
        {
            warnings.push(ValidationWarning::object(
                WarningKind::UnknownSpawnGroup,
                i,
                format!("trigger references non-existent spawn group {}", group),
            ));
        }
        if obj.is_teleport_portal() && obj.linked_portal_id.is_none() {
            warnings.push(ValidationWarning::object(
                WarningKind::UnlinkedTeleport,
                i,
                "teleport portal must have a linked portal",
            ));
        }
    }

    Ok(warnings)
}

/// Copy of `decl` with every optional field filled and unusable objects removed
pub fn sanitize(decl: &LevelDeclaration) -> LevelDeclaration {
    let mut out = decl.clone();

    if out.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
        out.name = Some("Untitled".to_string());
    }
    out.bpm.get_or_insert(DEFAULT_BPM);
    out.speed.get_or_insert(DEFAULT_SPEED_INDEX as i32);
    out.bg_color.get_or_insert_with(|| BG_DEFAULT.to_string());
    out.ground_color
        .get_or_insert_with(|| GROUND_DEFAULT.to_string());

    let objects = out.objects.take().unwrap_or_default();
    let before = objects.len();
    let kept: Vec<ObjectDeclaration> = objects
        .into_iter()
        .filter(|o| o.has_position() && o.object_type.as_deref().is_some_and(|t| !t.is_empty()))
        .map(|mut o| {
            o.width.get_or_insert(BLOCK_SIZE);
            o.height.get_or_insert(BLOCK_SIZE);
            o.active.get_or_insert(true);
            o.visible.get_or_insert(true);
            o
        })
        .collect();
    if kept.len() < before {
        log::warn!("Dropped {} objects without a position or type", before - kept.len());
    }
    out.objects = Some(kept);

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(objects: Vec<ObjectDeclaration>) -> LevelDeclaration {
        LevelDeclaration {
            name: Some("Test".to_string()),
            objects: Some(objects),
            ..Default::default()
        }
    }

    fn kinds(warnings: &[ValidationWarning]) -> Vec<WarningKind> {
        warnings.iter().map(|w| w.kind).collect()
    }

    #[test]
    fn test_clean_level_has_no_warnings() {
        let decl = level(vec![
            ObjectDeclaration::new("block", 0.0, 0.0),
            ObjectDeclaration::new("spike", 300.0, -30.0),
        ]);
        assert!(validate(&decl).unwrap().is_empty());
    }

    #[test]
    fn test_missing_objects_is_hard_failure() {
        let decl = LevelDeclaration {
            name: Some("Empty".to_string()),
            ..Default::default()
        };
        assert!(matches!(validate(&decl), Err(LevelLoadError::MissingObjects)));
    }

    #[test]
    fn test_level_wide_warnings() {
        let decl = LevelDeclaration {
            name: Some("   ".to_string()),
            bpm: Some(500.0),
            speed: Some(5),
            objects: Some(Vec::new()),
            ..Default::default()
        };
        let warnings = validate(&decl).unwrap();
        assert_eq!(
            kinds(&warnings),
            vec![
                WarningKind::MissingName,
                WarningKind::NoObjects,
                WarningKind::BpmOutOfRange,
                WarningKind::SpeedOutOfRange,
                WarningKind::TooShort,
            ]
        );
    }

    #[test]
    fn test_object_warnings_carry_index() {
        let mut no_type = ObjectDeclaration::new("", 300.0, 0.0);
        no_type.object_type = None;
        let mut no_pos = ObjectDeclaration::new("block", 0.0, 0.0);
        no_pos.y = None;
        let warnings = validate(&level(vec![no_pos, no_type])).unwrap();
        assert_eq!(warnings[0].kind, WarningKind::MissingPosition);
        assert_eq!(warnings[0].object, Some(0));
        assert_eq!(warnings[1].kind, WarningKind::MissingType);
        assert_eq!(warnings[1].to_string(), "Object 1: missing type");
    }

    #[test]
    fn test_length_bounds() {
        let short = validate(&level(vec![ObjectDeclaration::new("block", 120.0, 0.0)])).unwrap();
        assert_eq!(kinds(&short), vec![WarningKind::TooShort]);

        let far = BLOCK_SIZE * MAX_LEVEL_BLOCKS + 1.0;
        let long = validate(&level(vec![ObjectDeclaration::new("block", far, 0.0)])).unwrap();
        assert_eq!(kinds(&long), vec![WarningKind::TooLong]);
    }

    #[test]
    fn test_reference_warnings() {
        let mut spawn = ObjectDeclaration::new("trigger", 300.0, 0.0);
        spawn.trigger_type = Some("spawn".to_string());
        spawn.spawn_group_id = Some(9);
        let mut grouped = ObjectDeclaration::new("block", 0.0, 0.0);
        grouped.groups = vec![3];
        let mut portal = ObjectDeclaration::new("portal", 200.0, -60.0);
        portal.portal_type = Some("teleport".to_string());

        let warnings = validate(&level(vec![spawn.clone(), grouped.clone(), portal])).unwrap();
        assert_eq!(
            kinds(&warnings),
            vec![WarningKind::UnknownSpawnGroup, WarningKind::UnlinkedTeleport]
        );

        spawn.spawn_group_id = Some(3);
        assert!(validate(&level(vec![spawn, grouped])).unwrap().is_empty());
    }

    #[test]
    fn test_sanitize_fills_defaults_and_drops_broken_objects() {
        let mut no_type = ObjectDeclaration::new("block", 60.0, 0.0);
        no_type.object_type = None;
        let mut no_x = ObjectDeclaration::new("block", 60.0, 0.0);
        no_x.x = None;
        let decl = LevelDeclaration {
            objects: Some(vec![ObjectDeclaration::new("spike", 90.0, -30.0), no_type, no_x]),
            ..Default::default()
        };

        let clean = sanitize(&decl);
        assert_eq!(clean.name.as_deref(), Some("Untitled"));
        assert_eq!(clean.bpm, Some(DEFAULT_BPM));
        assert_eq!(clean.speed, Some(1));
        assert_eq!(clean.bg_color.as_deref(), Some(BG_DEFAULT));

        let objects = clean.objects.unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].width, Some(BLOCK_SIZE));
        assert_eq!(objects[0].height, Some(BLOCK_SIZE));
        assert_eq!(objects[0].active, Some(true));
        assert_eq!(objects[0].visible, Some(true));

        // Input is untouched
        assert_eq!(decl.objects.as_ref().map(Vec::len), Some(3));
    }
}
