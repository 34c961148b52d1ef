//! Progression bookkeeping
//!
//! Tracks stars, coins, mana and attempts across levels. The core only reports
//! completion percentage and coin pickups; how this gets persisted is up to
//! the host, which can serialize [`Progression`] as JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::COIN_SLOTS;

/// Mana awarded per star on completion
const MANA_PER_STAR: u32 = 5;
/// Mana awarded per attempt
const MANA_PER_ATTEMPT: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Auto,
    Easy,
    #[default]
    Normal,
    Hard,
    Harder,
    Insane,
    EasyDemon,
    MediumDemon,
    HardDemon,
    InsaneDemon,
    ExtremeDemon,
}

impl Difficulty {
    /// Parse an upper-snake tag such as `HARD` or `EASY_DEMON`
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_uppercase().as_str() {
            "AUTO" => Some(Difficulty::Auto),
            "EASY" => Some(Difficulty::Easy),
            "NORMAL" => Some(Difficulty::Normal),
            "HARD" => Some(Difficulty::Hard),
            "HARDER" => Some(Difficulty::Harder),
            "INSANE" => Some(Difficulty::Insane),
            "EASY_DEMON" => Some(Difficulty::EasyDemon),
            "MEDIUM_DEMON" => Some(Difficulty::MediumDemon),
            "HARD_DEMON" => Some(Difficulty::HardDemon),
            "INSANE_DEMON" => Some(Difficulty::InsaneDemon),
            "EXTREME_DEMON" => Some(Difficulty::ExtremeDemon),
            _ => None,
        }
    }

    pub fn stars(self) -> u32 {
        match self {
            Difficulty::Auto => 1,
            Difficulty::Easy => 2,
            Difficulty::Normal => 3,
            Difficulty::Hard => 4,
            Difficulty::Harder => 5,
            Difficulty::Insane => 6,
            Difficulty::EasyDemon
            | Difficulty::MediumDemon
            | Difficulty::HardDemon
            | Difficulty::InsaneDemon
            | Difficulty::ExtremeDemon => 10,
        }
    }

    pub fn is_demon(self) -> bool {
        self.stars() == 10
    }
}

/// Totals shown on the stats screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerStats {
    pub stars: u32,
    pub coins: u32,
    pub mana: u32,
    pub attempts: u32,
}

/// Best result on one level
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelRecord {
    /// Best progress, 0 to 100
    pub progress_percent: f32,
    /// Zero until the first completion
    pub stars_earned: u32,
    pub coin_flags: [bool; COIN_SLOTS],
}

/// Progression across every level, keyed by level name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Progression {
    pub stats: PlayerStats,
    pub levels: BTreeMap<String, LevelRecord>,
}

impl Progression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, level: &str) -> Option<&LevelRecord> {
        self.levels.get(level)
    }

    pub fn level_progress(&self, level: &str) -> f32 {
        self.record(level).map_or(0.0, |r| r.progress_percent)
    }

    /// Keep the best progress seen; `progress` is a fraction in [0, 1]
    pub fn update_level_progress(&mut self, level: &str, progress: f32) {
        let percent = (progress * 100.0).clamp(0.0, 100.0);
        let record = self.levels.entry(level.to_string()).or_default();
        if percent > record.progress_percent {
            record.progress_percent = percent;
        }
    }

    /// Award stars (first completion only), new coins and mana.
    /// Returns the number of coins that were new for this level.
    pub fn complete_level(
        &mut self,
        level: &str,
        coins: [bool; COIN_SLOTS],
        difficulty: Difficulty,
    ) -> u32 {
        let stars = difficulty.stars();
        let record = self.levels.entry(level.to_string()).or_default();

        if record.stars_earned == 0 {
            record.stars_earned = stars;
            self.stats.stars += stars;
        }

        let mut new_coins = 0;
        for (owned, got) in record.coin_flags.iter_mut().zip(coins) {
            if got && !*owned {
                *owned = true;
                new_coins += 1;
            }
        }
        self.stats.coins += new_coins;

        self.stats.mana += stars * MANA_PER_STAR;
        record.progress_percent = 100.0;

        log::info!(
            "Completed '{}' ({} stars, {} new coins)",
            level,
            stars,
            new_coins
        );
        new_coins
    }

    pub fn record_attempt(&mut self) {
        self.stats.attempts += 1;
        self.stats.mana += MANA_PER_ATTEMPT;
    }

    pub fn stats(&self) -> PlayerStats {
        self.stats
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let progression: Progression = serde_json::from_str(json)?;
        log::info!("Loaded progression for {} levels", progression.levels.len());
        Ok(progression)
    }
}
