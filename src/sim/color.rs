//! RGB colors, hex conversion and color channels

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::lerp;

/// Color channel identifier addressed by color triggers
pub type ChannelId = u32;

/// An 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (leading `#` optional); malformed input is black
    pub fn from_hex(hex: &str) -> Self {
        Self::try_from_hex(hex).unwrap_or(Rgb::BLACK)
    }

    pub fn try_from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Lowercase `#rrggbb`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Per-channel interpolation, rounded back to 8 bits
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let mix = |a: u8, b: u8| lerp(a as f32, b as f32, t).round().clamp(0.0, 255.0) as u8;
        Rgb::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }
}

/// Live color of every channel touched by color triggers
#[derive(Debug, Clone, Default)]
pub struct ColorChannels {
    channels: BTreeMap<ChannelId, Rgb>,
}

impl ColorChannels {
    /// Current color of a channel; channels never set read as white
    pub fn get(&self, channel: ChannelId) -> Rgb {
        self.channels.get(&channel).copied().unwrap_or(Rgb::WHITE)
    }

    pub fn set(&mut self, channel: ChannelId, color: Rgb) {
        self.channels.insert(channel, color);
    }

    pub fn clear(&mut self) {
        self.channels.clear();
    }
}
