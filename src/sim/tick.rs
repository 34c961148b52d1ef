//! Per-frame simulation step
//!
//! Ordering within a playing frame is fixed: input, mode input handling, mode
//! physics, player extras, solid/hazard collision (death ends the frame),
//! orb/pad/portal/trigger/coin activation, trigger engine, object update and
//! grid rebuild, bounds, completion, camera, then the dual player.

use super::camera::Arena;
use super::collision::test_aabb_triangle;
use super::color::Rgb;
use super::geom::Rect;
use super::input::InputState;
use super::interact::{ActivationResult, Launch, PortalEffect, PortalResult};
use super::modes::{Mode, ModeAction};
use super::object::{GroupId, LevelObject, ObjectKind};
use super::physics::{Physics, check_bounds};
use super::player::{DualPlayer, Player};
use super::state::{GameEvent, GamePhase, GameState};
use crate::audio::SoundEffect;
use crate::consts::{COIN_SLOTS, DEFAULT_SPEED_INDEX};
use crate::level::Bucket;

/// Slack when deciding a player came from above or below a solid
const SOLID_TOLERANCE: f32 = 2.0;

const COIN_COLOR: Rgb = Rgb::new(255, 221, 0);

/// Host commands for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// The one game button, as currently held
    pub pressed: bool,
    /// Pause toggle
    pub pause: bool,
    /// Practice mode: drop a checkpoint here
    pub place_checkpoint: bool,
    /// Practice mode: discard the latest checkpoint
    pub remove_checkpoint: bool,
    /// Start a new attempt
    pub restart: bool,
}

/// Advance the session by `dt` seconds (clamped to the frame cap)
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let dt = dt.clamp(0.0, state.tuning.max_frame_dt);

    if input.restart {
        state.restart();
        return;
    }
    if input.pause {
        state.toggle_pause();
    }

    match state.phase {
        GamePhase::Paused | GamePhase::Complete => return,
        GamePhase::Dead => {
            tick_dead(state, dt);
            return;
        }
        GamePhase::Playing => {}
    }

    if input.place_checkpoint {
        state.place_checkpoint();
    }
    if input.remove_checkpoint {
        state.remove_checkpoint();
    }

    state.time += dt;
    state.time_ticks += 1;

    let controls = state.input.update(input.pressed, dt);
    let prev = state.player.rect();

    if let Some(action) = drive_mode(&mut state.player, &controls, &state.physics, &state.arena, dt)
        && let Some(sound) = action_sound(action)
    {
        state.events.push(GameEvent::ModeAction(action));
        state.events.push(GameEvent::Sound(sound));
    }

    let player = &mut state.player;
    player.update_dash(dt);
    player.update_trail(dt, &state.tuning);
    player.update_rotation(dt, state.tuning.speed(DEFAULT_SPEED_INDEX));

    if collide(state, &prev) {
        state.die();
        return;
    }

    check_orbs(state, &controls);
    check_pads(state);
    check_portals(state);
    check_triggers(state);
    check_coins(state);

    advance_level(state, dt);

    let margin = state.tuning.bounds_margin;
    if !check_bounds(
        &state.player.body,
        state.arena.ceiling_y - margin,
        state.arena.ground_y + margin,
    ) {
        state.die();
        return;
    }

    if state.player.body.pos.x >= state.level.length {
        state.complete();
    }

    state
        .camera
        .update(state.player.body.pos, dt, &state.tuning);

    if let Some(dual) = &mut state.dual {
        drive_mode(&mut dual.secondary, &controls, &state.physics, &state.arena, dt);
        dual.follow(&state.player);
    }
}

/// Level keeps animating while dead; practice mode respawns after a delay
fn tick_dead(state: &mut GameState, dt: f32) {
    state.death_timer += dt;
    advance_level(state, dt);
    state
        .camera
        .update(state.player.body.pos, dt, &state.tuning);

    if state.death_timer >= state.tuning.practice_respawn_delay
        && let Some(checkpoint) = state.practice.as_ref().and_then(|p| p.last()).copied()
    {
        state.respawn_at(&checkpoint);
    }
}

/// Mode input then mode physics for one player
fn drive_mode(
    player: &mut Player,
    controls: &InputState,
    physics: &Physics,
    arena: &Arena,
    dt: f32,
) -> Option<ModeAction> {
    let behavior = player.mode.behavior();
    let action = behavior.handle_input(player, controls, physics, dt);
    if action == Some(ModeAction::Teleport) {
        physics.spider_teleport(&mut player.body, arena.ground_y, arena.ceiling_y);
    }
    behavior.update(player, physics, dt, arena.ground_y, arena.ceiling_y);
    action
}

/// Sound for discrete actions; held actions (thrust, wave) are silent
fn action_sound(action: ModeAction) -> Option<SoundEffect> {
    match action {
        ModeAction::Jump | ModeAction::Boost | ModeAction::SwingFlip => Some(SoundEffect::Jump),
        ModeAction::Flip | ModeAction::Teleport => Some(SoundEffect::GravityFlip),
        ModeAction::Thrust | ModeAction::WaveUp | ModeAction::WaveDown => None,
    }
}

/// Trigger engine, then fold offsets into live transforms, then re-index
fn advance_level(state: &mut GameState, dt: f32) {
    let (engine, mut ctx) = state.trigger_parts();
    engine.update(dt, &mut ctx);
    for obj in &mut state.level.objects {
        obj.update(dt);
    }
    state.grid.build(&state.level.objects);
}

fn in_range(obj: &LevelObject, player_x: f32, range: f32) -> bool {
    obj.active && (obj.pos.x - player_x).abs() <= range
}

/// Solids then hazards near the player. Returns true on a fatal hit.
fn collide(state: &mut GameState, prev: &Rect) -> bool {
    let query = state
        .player
        .rect()
        .expand(state.tuning.collision_range());
    let nearby = state.grid.query(&query);

    for &id in &nearby {
        let Some(obj) = state.level.objects.get(id.index()) else {
            continue;
        };
        if !obj.solid || !obj.active || !obj.visible {
            continue;
        }
        if resolve_solid(&mut state.player, prev, &obj.rect()) == Some(SolidHit::Wall) {
            log::debug!("Hit the side of object {}", id.0);
            return true;
        }
    }

    let hitbox = state.player.hitbox(state.tuning.player_hitbox_shrink);
    nearby.iter().any(|id| {
        state
            .level
            .objects
            .get(id.index())
            .is_some_and(|obj| hazard_hits(obj, &hitbox, state.tuning.hazard_shrink))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SolidHit {
    Land,
    Bonk,
    Wall,
}

/// Push the player out of a solid. Floor and ceiling swap with gravity; a
/// side hit from the left is fatal.
fn resolve_solid(player: &mut Player, prev: &Rect, solid: &Rect) -> Option<SolidHit> {
    let rect = player.rect();
    if !rect.overlaps(solid) {
        return None;
    }

    let overlap_x = rect.right().min(solid.right()) - rect.x.max(solid.x);
    let overlap_y = rect.bottom().min(solid.bottom()) - rect.y.max(solid.y);
    let from_above = prev.bottom() <= solid.y + SOLID_TOLERANCE;
    let from_below = prev.y >= solid.bottom() - SOLID_TOLERANCE;

    if overlap_x < overlap_y && !from_above && !from_below {
        return (rect.x < solid.x).then_some(SolidHit::Wall);
    }

    let above = rect.center().y < solid.center().y;
    let body = &mut player.body;
    let (floor_side, moving_to_floor) = if body.gravity_dir > 0.0 {
        (above, body.vel.y >= 0.0)
    } else {
        (!above, body.vel.y <= 0.0)
    };

    let top = solid.y - body.size.y;
    if floor_side && moving_to_floor {
        body.pos.y = if above { top } else { solid.bottom() };
        body.vel.y = 0.0;
        body.on_ground = true;
        player.robot_jumping = false;
        Some(SolidHit::Land)
    } else if !floor_side && !moving_to_floor {
        body.pos.y = if above { top } else { solid.bottom() };
        body.vel.y = 0.0;
        Some(SolidHit::Bonk)
    } else {
        None
    }
}

fn hazard_hits(obj: &LevelObject, hitbox: &Rect, hazard_shrink: f32) -> bool {
    if !obj.hazard || !obj.active || !obj.visible {
        return false;
    }
    if !hitbox.overlaps(&obj.hitbox(hazard_shrink)) {
        return false;
    }
    match obj.triangle() {
        Some(tri) => test_aabb_triangle(hitbox, &tri),
        None => true,
    }
}

/// First ready orb under the player fires on a fresh press
fn check_orbs(state: &mut GameState, controls: &InputState) {
    let range = state.tuning.activation_range();
    let hitbox = state.player.hitbox(state.tuning.player_hitbox_shrink);
    let player_x = state.player.body.pos.x;
    state.player.can_activate_orb = false;

    let mut fired: Option<GroupId> = None;
    for &id in state.level.buckets.get(Bucket::Orbs) {
        let Some(obj) = state.level.objects.get_mut(id.index()) else {
            continue;
        };
        if !in_range(obj, player_x, range) {
            continue;
        }
        let rect = obj.rect();
        let color = obj.color;
        let ObjectKind::Orb(orb) = &mut obj.kind else {
            continue;
        };
        if !orb.can_activate(&hitbox, &rect) {
            continue;
        }
        state.player.can_activate_orb = true;
        if !controls.just_pressed {
            continue;
        }

        let result = orb.activate(&mut state.player, state.tuning.orb_cooldown);
        if let Launch::Trigger { group } = result.launch {
            fired = group;
        }
        state
            .events
            .push(GameEvent::Activated(ActivationResult::Orb(result)));
        state.events.push(GameEvent::Particles {
            pos: rect.center(),
            color,
            count: 8,
            speed: 150.0,
        });
        break;
    }

    if let Some(group) = fired {
        let (engine, mut ctx) = state.trigger_parts();
        engine.fire_group(group, 0.0, &mut ctx);
    }
}

fn check_pads(state: &mut GameState) {
    let range = state.tuning.activation_range();
    let hitbox = state.player.hitbox(state.tuning.player_hitbox_shrink);
    let player_x = state.player.body.pos.x;

    for &id in state.level.buckets.get(Bucket::Pads) {
        let Some(obj) = state.level.objects.get_mut(id.index()) else {
            continue;
        };
        if !in_range(obj, player_x, range) {
            continue;
        }
        let rect = obj.rect();
        let color = obj.color;
        let ObjectKind::Pad(pad) = &mut obj.kind else {
            continue;
        };
        if !pad.should_activate(&hitbox, &rect) {
            continue;
        }

        let result = pad.activate(&mut state.player, state.tuning.pad_cooldown);
        state
            .events
            .push(GameEvent::Activated(ActivationResult::Pad(result)));
        state.events.push(GameEvent::Particles {
            pos: rect.center(),
            color,
            count: 6,
            speed: 100.0,
        });
    }
}

fn check_portals(state: &mut GameState) {
    let range = state.tuning.activation_range();
    let hitbox = state.player.hitbox(state.tuning.player_hitbox_shrink);
    let player_x = state.player.body.pos.x;

    let mut crossed = Vec::new();
    for &id in state.level.buckets.get(Bucket::Portals) {
        let objects = &mut state.level.objects;
        let Some(obj) = objects.get(id.index()) else {
            continue;
        };
        if !in_range(obj, player_x, range) {
            continue;
        }
        let rect = obj.rect();
        let linked = match &obj.kind {
            ObjectKind::Portal(portal) if portal.should_activate(&hitbox, &rect) => portal.linked,
            _ => continue,
        };
        let linked_rect = linked
            .and_then(|other| objects.get(other.index()))
            .map(LevelObject::rect);

        if let Some(ObjectKind::Portal(portal)) = objects.get_mut(id.index()).map(|o| &mut o.kind) {
            crossed.push(portal.activate(&state.player, linked_rect));
        }
    }

    for result in crossed {
        apply_portal(state, &result);
        state
            .events
            .push(GameEvent::Activated(ActivationResult::Portal(result)));
    }
}

fn apply_portal(state: &mut GameState, result: &PortalResult) {
    let tuning = &state.tuning;
    let player = &mut state.player;
    match result.effect {
        PortalEffect::Mode(mode) => {
            if mode != player.mode {
                let from = player.mode;
                switch_mode(player, mode);
                if let Some(dual) = &mut state.dual {
                    switch_mode(&mut dual.secondary, mode);
                }
                log::debug!("Mode {from:?} -> {mode:?}");
                state.events.push(GameEvent::ModeChanged { from, to: mode });
            }
        }
        PortalEffect::Gravity(dir) => {
            if player.body.gravity_dir != dir {
                player.body.gravity_dir = dir;
                player.body.on_ground = false;
            }
        }
        PortalEffect::Speed(index) => player.set_speed(index, tuning),
        PortalEffect::Size { mini } => player.set_mini(mini, tuning),
        PortalEffect::Mirror => state.camera.mirrored = !state.camera.mirrored,
        PortalEffect::Dual(true) => {
            if state.dual.is_none() {
                state.dual = Some(DualPlayer::spawn(player, tuning));
            }
        }
        PortalEffect::Dual(false) => state.dual = None,
        PortalEffect::Teleport(Some(target)) => {
            player.body.pos = target;
            player.trail.clear();
        }
        PortalEffect::Teleport(None) => {}
    }
}

fn switch_mode(player: &mut Player, mode: Mode) {
    player.mode.behavior().on_exit(player);
    player.set_mode(mode);
    mode.behavior().on_enter(player);
}

/// Touch triggers fire once the player's x passes theirs
fn check_triggers(state: &mut GameState) {
    let player_x = state.player.body.pos.x;
    let mut fired = Vec::new();
    for &id in state.level.buckets.get(Bucket::Triggers) {
        let Some(obj) = state.level.objects.get_mut(id.index()) else {
            continue;
        };
        if !obj.active {
            continue;
        }
        let x = obj.pos.x;
        if let Some(trigger) = obj.as_trigger_mut()
            && trigger.should_fire(x, player_x)
        {
            fired.push(trigger.activate());
        }
    }

    let (engine, mut ctx) = state.trigger_parts();
    for params in fired {
        engine.execute(params, &mut ctx);
    }
}

/// The first three coins in the level fill the per-attempt slots
fn check_coins(state: &mut GameState) {
    let range = state.tuning.activation_range();
    let hitbox = state.player.hitbox(state.tuning.player_hitbox_shrink);
    let player_x = state.player.body.pos.x;

    for (index, &id) in state.level.buckets.get(Bucket::Coins).iter().enumerate() {
        let Some(obj) = state.level.objects.get_mut(id.index()) else {
            continue;
        };
        if !in_range(obj, player_x, range) || !obj.visible {
            continue;
        }
        let rect = obj.rect();
        let ObjectKind::Coin { collected } = &mut obj.kind else {
            continue;
        };
        if *collected || !hitbox.overlaps(&rect) {
            continue;
        }
        *collected = true;
        obj.visible = false;

        let slot = (index < COIN_SLOTS).then_some(index);
        if let Some(slot) = slot {
            state.coins[slot] = true;
        }
        state.events.push(GameEvent::CoinCollected { slot });
        state.events.push(GameEvent::Particles {
            pos: rect.center(),
            color: COIN_COLOR,
            count: 10,
            speed: 200.0,
        });
    }
}
