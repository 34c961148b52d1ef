//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Host-supplied dt, clamped per frame
//! - Seeded RNG only
//! - Stable iteration order (by object id)
//! - No rendering, audio or platform dependencies

pub mod camera;
pub mod collision;
pub mod color;
pub mod easing;
pub mod geom;
pub mod input;
pub mod interact;
pub mod modes;
pub mod object;
pub mod physics;
pub mod player;
pub mod practice;
pub mod state;
pub mod tick;
pub mod trigger;
pub mod trigger_engine;

pub use camera::{Arena, Camera};
pub use collision::{
    Axis, CollisionGrid, Facing, Push, point_in_triangle, resolve_aabb, test_aabb_triangle,
    test_sat, triangle_hitbox,
};
pub use color::{ChannelId, ColorChannels, Rgb};
pub use easing::Easing;
pub use geom::Rect;
pub use input::{InputState, InputTracker};
pub use interact::{
    ActivationResult, Launch, Orb, OrbResult, OrbType, Pad, PadResult, PadType, Portal,
    PortalEffect, PortalResult, PortalType,
};
pub use modes::{Mode, ModeAction, ModeBehavior};
pub use object::{GroupId, Hazard, LevelObject, ObjectId, ObjectKind};
pub use physics::{Body, Physics, check_bounds};
pub use player::{Checkpoint, Dash, DualPlayer, Player};
pub use practice::PracticeCheckpoints;
pub use state::{DEFAULT_VIEWPORT, GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick};
pub use trigger::{PulseEnvelope, Trigger, TriggerParams, TriggerType};
pub use trigger_engine::{TriggerContext, TriggerEngine};
