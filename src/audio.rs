//! Audio collaborator contract
//!
//! The simulation never plays sound itself; it queues [`GameEvent`]s and the
//! host routes them here. Backends implement [`AudioSink`]; every method has
//! a no-op default so a missing audio device never breaks the game.

use serde::{Deserialize, Serialize};

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    Jump,
    /// Orb tapped
    Orb,
    /// Pad touched
    Pad,
    /// Portal crossed
    Portal,
    GravityFlip,
    Coin,
    Death,
    Complete,
    /// Practice checkpoint placed
    Checkpoint,
}

impl SoundEffect {
    pub fn name(self) -> &'static str {
        match self {
            SoundEffect::Jump => "jump",
            SoundEffect::Orb => "orb",
            SoundEffect::Pad => "pad",
            SoundEffect::Portal => "portal",
            SoundEffect::GravityFlip => "gravity_flip",
            SoundEffect::Coin => "coin",
            SoundEffect::Death => "death",
            SoundEffect::Complete => "complete",
            SoundEffect::Checkpoint => "checkpoint",
        }
    }
}

/// Output device for effects and the level song
pub trait AudioSink {
    fn play_sfx(&mut self, _effect: SoundEffect, _volume: f32) {}
    /// Jump the song to `offset` seconds
    fn seek_music(&mut self, _offset: f32) {}
    fn pause_music(&mut self) {}
    fn resume_music(&mut self) {}
    fn stop_music(&mut self) {}
}

/// Sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {}

/// Volume and mute handling in front of a sink
pub struct AudioManager<S: AudioSink> {
    sink: S,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager<NullAudio> {
    fn default() -> Self {
        Self::new(NullAudio)
    }
}

impl<S: AudioSink> AudioManager<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.sink.play_sfx(effect, vol);
    }

    pub fn seek_music(&mut self, offset: f32) {
        self.sink.seek_music(offset);
    }

    pub fn pause_music(&mut self) {
        self.sink.pause_music();
    }

    pub fn resume_music(&mut self) {
        self.sink.resume_music();
    }

    pub fn stop_music(&mut self) {
        self.sink.stop_music();
    }

    /// Forward the audio side of a frame's events
    pub fn route(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::Sound(effect) => self.play(*effect),
                GameEvent::Activated(result) => self.play(result.sound()),
                GameEvent::CoinCollected { .. } => self.play(SoundEffect::Coin),
                GameEvent::Died { .. } => {
                    self.play(SoundEffect::Death);
                    self.pause_music();
                }
                GameEvent::Respawned => self.resume_music(),
                GameEvent::Completed { .. } => self.play(SoundEffect::Complete),
                GameEvent::SongSeek { offset } => self.seek_music(*offset),
                GameEvent::Paused(true) => self.pause_music(),
                GameEvent::Paused(false) => self.resume_music(),
                _ => {}
            }
        }
    }
}
