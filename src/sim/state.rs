//! Session state
//!
//! One [`GameState`] owns everything an attempt touches: the parsed level,
//! player(s), trigger engine, camera, collision grid and a seeded RNG. It is
//! advanced only by [`super::tick::tick`]; hosts read it and drain the
//! [`GameEvent`] queue after each frame.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::camera::{Arena, Camera};
use super::collision::CollisionGrid;
use super::color::Rgb;
use super::input::InputTracker;
use super::interact::ActivationResult;
use super::modes::{Mode, ModeAction};
use super::physics::Physics;
use super::player::{Checkpoint, DualPlayer, Player};
use super::practice::PracticeCheckpoints;
use super::trigger_engine::{TriggerContext, TriggerEngine};
use crate::audio::SoundEffect;
use crate::consts::{BLOCK_SIZE, COIN_SLOTS};
use crate::level::Level;
use crate::tuning::Tuning;

/// Viewport used when the host does not supply one
pub const DEFAULT_VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

/// Death camera shake amount
const DEATH_SHAKE: f32 = 8.0;

/// Current phase of an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    Paused,
    /// Waiting for a restart, or a practice respawn
    Dead,
    Complete,
}

/// Something the host should react to (sound, particles, HUD)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundEffect),
    Activated(ActivationResult),
    ModeAction(ModeAction),
    ModeChanged { from: Mode, to: Mode },
    /// Coin pickup; `slot` is `None` past the tracked slots
    CoinCollected { slot: Option<usize> },
    Died { progress: f32 },
    Respawned,
    Completed { coins: [bool; COIN_SLOTS] },
    SongSeek { offset: f32 },
    Paused(bool),
    Particles { pos: Vec2, color: Rgb, count: u32, speed: f32 },
}

/// Complete state of one play session
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    pub physics: Physics,
    pub arena: Arena,
    pub level: Level,
    pub player: Player,
    pub dual: Option<DualPlayer>,
    pub engine: TriggerEngine,
    pub camera: Camera,
    pub grid: CollisionGrid,
    pub input: InputTracker,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Attempts on this level, including the current one
    pub attempts: u32,
    /// Seconds into the current attempt
    pub time: f32,
    pub time_ticks: u64,
    /// Seconds since the last death
    pub death_timer: f32,
    pub coins: [bool; COIN_SLOTS],
    /// Present while practice mode is on
    pub practice: Option<PracticeCheckpoints>,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Start the first attempt on `level`
    pub fn new(level: Level, tuning: &Tuning, viewport: Vec2, seed: u64) -> Self {
        let arena = Arena::from_viewport_height(viewport.y);
        let mut level = level;
        level.anchor(arena.ground_y);

        let mut state = Self {
            tuning: tuning.clone(),
            physics: Physics::new(tuning),
            arena,
            level,
            player: Player::new(Vec2::ZERO, tuning),
            dual: None,
            engine: TriggerEngine::new(),
            camera: Camera::new(viewport.x, viewport.y),
            grid: CollisionGrid::default(),
            input: InputTracker::default(),
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Playing,
            attempts: 1,
            time: 0.0,
            time_ticks: 0,
            death_timer: 0.0,
            coins: [false; COIN_SLOTS],
            practice: None,
            events: Vec::new(),
        };
        state.reset_level();
        log::info!("Started '{}' (seed {})", state.level.metadata.name, seed);
        state
    }

    /// Where every attempt begins: two blocks in, resting on the ground
    pub fn spawn_point(&self) -> Vec2 {
        Vec2::new(
            BLOCK_SIZE * 2.0,
            self.arena.ground_y - self.tuning.player_size,
        )
    }

    /// Re-initialize everything from level data. This is the only place
    /// in-flight trigger animations and group states are cancelled.
    pub fn reset_level(&mut self) {
        self.level.reset_objects();
        self.engine.reset();
        for (group, members) in &self.level.groups {
            self.engine.register_group(*group, members.clone());
        }
        self.grid.build(&self.level.objects);

        let start = self.spawn_point();
        self.player
            .reset(start, self.level.metadata.speed, &self.tuning);
        self.player.body.on_ground = true;
        Mode::Cube.behavior().on_enter(&mut self.player);

        self.dual = None;
        self.camera.reset();
        self.input.reset();
        self.coins = [false; COIN_SLOTS];
        self.time = 0.0;
        self.death_timer = 0.0;
        self.phase = GamePhase::Playing;
    }

    /// New attempt from the start of the level
    pub fn restart(&mut self) {
        self.attempts += 1;
        if let Some(practice) = &mut self.practice {
            practice.reset();
        }
        self.reset_level();
        log::debug!("Attempt {}", self.attempts);
    }

    pub fn set_practice(&mut self, enabled: bool) {
        self.practice = enabled.then(PracticeCheckpoints::default);
    }

    pub fn is_practice(&self) -> bool {
        self.practice.is_some()
    }

    /// Save the player's current state; only in practice mode while alive
    pub fn place_checkpoint(&mut self) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        let Some(practice) = &mut self.practice else {
            return false;
        };
        practice.add(&self.player);
        self.events.push(GameEvent::Sound(SoundEffect::Checkpoint));
        true
    }

    pub fn remove_checkpoint(&mut self) -> Option<Checkpoint> {
        self.practice.as_mut()?.remove_last()
    }

    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Playing => {
                self.phase = GamePhase::Paused;
                self.events.push(GameEvent::Paused(true));
            }
            GamePhase::Paused => {
                self.phase = GamePhase::Playing;
                self.events.push(GameEvent::Paused(false));
            }
            GamePhase::Dead | GamePhase::Complete => {}
        }
    }

    /// End the attempt. Player-local state (dash, charge) is cancelled;
    /// level animations keep running.
    pub fn die(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.player.die();
        self.phase = GamePhase::Dead;
        self.death_timer = 0.0;
        self.camera.start_shake(DEATH_SHAKE);

        let progress = self.progress();
        self.events.push(GameEvent::Particles {
            pos: self.player.death_pos,
            color: Rgb::WHITE,
            count: 15,
            speed: 300.0,
        });
        self.events.push(GameEvent::Died { progress });
        log::debug!(
            "Died at x={:.0} ({:.0}%) in {:?}",
            self.player.body.pos.x,
            progress * 100.0,
            self.player.mode
        );
    }

    /// Resume play from a practice checkpoint
    pub fn respawn_at(&mut self, checkpoint: &Checkpoint) {
        let previous = self.player.mode;
        previous.behavior().on_exit(&mut self.player);
        self.player.load_checkpoint(checkpoint, &self.tuning);
        self.player.mode.behavior().on_enter(&mut self.player);

        self.dual = None;
        self.input.reset();
        self.death_timer = 0.0;
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::Respawned);
    }

    pub fn complete(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.phase = GamePhase::Complete;
        self.events.push(GameEvent::Completed { coins: self.coins });
        log::info!(
            "Completed '{}' on attempt {} ({} coins)",
            self.level.metadata.name,
            self.attempts,
            self.coins.iter().filter(|c| **c).count()
        );
    }

    /// Fraction of the level covered, in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.level.length <= 0.0 {
            return 0.0;
        }
        (self.player.body.pos.x / self.level.length).clamp(0.0, 1.0)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Split off the trigger engine and the context it writes into
    pub fn trigger_parts(&mut self) -> (&mut TriggerEngine, TriggerContext<'_>) {
        (
            &mut self.engine,
            TriggerContext {
                objects: &mut self.level.objects,
                camera: &mut self.camera,
                rng: &mut self.rng,
                events: &mut self.events,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{LevelDeclaration, ObjectDeclaration};

    fn level() -> Level {
        let mut grouped = ObjectDeclaration::new("block", 600.0, -30.0);
        grouped.group_id = Some(1);
        Level::parse(&LevelDeclaration {
            name: Some("State".to_string()),
            speed: Some(2),
            objects: Some(vec![grouped, ObjectDeclaration::new("block", 1170.0, 0.0)]),
            ..Default::default()
        })
    }

    fn state() -> GameState {
        GameState::new(level(), &Tuning::default(), DEFAULT_VIEWPORT, 42)
    }

    #[test]
    fn test_new_anchors_and_spawns() {
        let s = state();
        assert_eq!(s.arena.ground_y, 450.0);
        assert_eq!(s.level.objects[0].pos.y, 420.0);
        assert_eq!(s.player.body.pos, Vec2::new(60.0, 420.0));
        assert!(s.player.body.on_ground);
        assert_eq!(s.player.speed_index, 2);
        assert_eq!(s.engine.group_objects(1).len(), 1);
        assert!(!s.grid.is_empty());
        assert_eq!(s.attempts, 1);
        assert_eq!(s.level.length, 1200.0);
    }

    #[test]
    fn test_die_is_a_state_transition() {
        let mut s = state();
        s.player.body.pos.x = 600.0;
        s.die();
        assert_eq!(s.phase, GamePhase::Dead);
        assert!(s.player.dead);
        assert_eq!(s.camera.shake, DEATH_SHAKE);
        let events = s.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::Died { progress } if *progress == 0.5)));

        // Dying twice does nothing
        s.die();
        assert!(s.events.is_empty());
    }

    #[test]
    fn test_restart_resets_level() {
        let mut s = state();
        s.level.objects[0].offset.offset.x = 90.0;
        s.level.objects[0].update(0.0);
        s.coins[0] = true;
        s.die();
        s.restart();
        assert_eq!(s.attempts, 2);
        assert_eq!(s.phase, GamePhase::Playing);
        assert_eq!(s.level.objects[0].pos.x, 600.0);
        assert_eq!(s.coins, [false; COIN_SLOTS]);
        assert!(!s.player.dead);
    }

    #[test]
    fn test_checkpoints_only_in_practice() {
        let mut s = state();
        assert!(!s.place_checkpoint());
        s.set_practice(true);
        s.player.body.pos.x = 300.0;
        assert!(s.place_checkpoint());
        assert_eq!(s.practice.as_ref().map(PracticeCheckpoints::len), Some(1));
        assert!(s.remove_checkpoint().is_some());
        assert!(s.remove_checkpoint().is_none());
    }

    #[test]
    fn test_respawn_restores_checkpoint() {
        let mut s = state();
        s.player.body.pos.x = 300.0;
        s.player.set_mode(Mode::Ship);
        let cp = s.player.checkpoint();
        s.player.set_mode(Mode::Cube);
        s.die();
        s.respawn_at(&cp);
        assert_eq!(s.phase, GamePhase::Playing);
        assert_eq!(s.player.mode, Mode::Ship);
        assert_eq!(s.player.body.pos.x, 300.0);
        assert!(s.events.contains(&GameEvent::Respawned));
    }

    #[test]
    fn test_pause_toggle() {
        let mut s = state();
        s.toggle_pause();
        assert_eq!(s.phase, GamePhase::Paused);
        s.toggle_pause();
        assert_eq!(s.phase, GamePhase::Playing);
        assert_eq!(
            s.drain_events(),
            vec![GameEvent::Paused(true), GameEvent::Paused(false)]
        );
    }

    #[test]
    fn test_progress_clamped() {
        let mut s = state();
        s.player.body.pos.x = 5000.0;
        assert_eq!(s.progress(), 1.0);
        s.player.body.pos.x = -10.0;
        assert_eq!(s.progress(), 0.0);
    }
}
