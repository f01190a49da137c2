//! Visualiser settings
//!
//! Read by the playback engine at every stage, so edits made between frames
//! take effect on the next styling or animation. Nothing here is persisted.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::consts::{MATCH_BASE_MARGIN, MATCH_BASE_WIDTH, MAX_ANIMATION_SPEED, MIN_ANIMATION_SPEED};
use crate::error::{Result, VisError};
use crate::sim::SortAlgorithm;

/// Match width presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl MatchSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchSize::Small => "Small",
            MatchSize::Medium => "Medium",
            MatchSize::Large => "Large",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "small" | "s" => Some(MatchSize::Small),
            "medium" | "med" | "m" => Some(MatchSize::Medium),
            "large" | "l" => Some(MatchSize::Large),
            _ => None,
        }
    }

    /// Width multiplier over the base match width
    pub fn scale(&self) -> f32 {
        match self {
            MatchSize::Small => 1.0,
            MatchSize::Medium => 2.0,
            MatchSize::Large => 4.0,
        }
    }

    /// Width of one match at this size
    pub fn match_width(&self) -> f32 {
        MATCH_BASE_WIDTH * self.scale()
    }

    /// How many matches fit side by side on a canvas of the given width
    pub fn match_count(&self, canvas_width: f32) -> usize {
        if canvas_width <= 0.0 {
            return 0;
        }
        (canvas_width / (self.match_width() + MATCH_BASE_MARGIN)).floor() as usize
    }
}

/// Colors used while playing a trace
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Matches outside the algorithm's current scope
    pub base: Color,
    /// Matches inside the current scope
    pub highlighted: Color,
    /// Matches being compared
    pub compared: Color,
    /// Matches being swapped
    pub swapped: Color,
    /// The key being inserted (insertion sort)
    pub key: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            highlighted: Color::from_rgb8(0x56, 0x3d, 0x7c),
            compared: Color::from_rgb8(0xe8, 0xff, 0x38),
            swapped: Color::from_rgb8(0x00, 0xd9, 0x00),
            base: Color::from_rgb8(0xa3, 0x00, 0xb5),
            key: Color::from_rgb8(0xed, 0x00, 0x00),
        }
    }
}

/// Visualiser settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Match colors
    pub palette: Palette,
    /// Speed factor (1 - 10); every duration is divided by it
    pub animation_speed: f32,
    /// Match width preset
    pub match_size: MatchSize,
    /// Algorithm whose trace is played
    pub algorithm: SortAlgorithm,
    /// Duration of color/opacity restyles (ms, 0 = immediate)
    pub style_fade_ms: f64,
    /// Seed for match heights
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            animation_speed: 3.0,
            match_size: MatchSize::Medium,
            algorithm: SortAlgorithm::Bubble,
            style_fade_ms: 0.0,
            seed: 0x5EED,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| VisError::invalid_input(format!("settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| VisError::invalid_input(format!("{}: {e}", path.display())))?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| VisError::invalid_input(format!("settings: {e}")))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.animation_speed.is_finite() {
            return Err(VisError::invalid_input("animation_speed must be finite"));
        }
        if !self.style_fade_ms.is_finite() || self.style_fade_ms < 0.0 {
            return Err(VisError::invalid_input(
                "style_fade_ms must be a non-negative number",
            ));
        }
        Ok(())
    }

    /// Speed clamped to the supported range
    pub fn effective_speed(&self) -> f32 {
        self.animation_speed
            .clamp(MIN_ANIMATION_SPEED, MAX_ANIMATION_SPEED)
    }

    /// Set the speed factor, clamping to the supported range
    pub fn set_animation_speed(&mut self, speed: f32) {
        self.animation_speed = speed.clamp(MIN_ANIMATION_SPEED, MAX_ANIMATION_SPEED);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_count() {
        // medium: 20 wide + 5 margin
        assert_eq!(MatchSize::Medium.match_count(800.0), 32);
        assert_eq!(MatchSize::Small.match_count(800.0), 53);
        assert_eq!(MatchSize::Large.match_count(800.0), 17);
        assert_eq!(MatchSize::Large.match_count(0.0), 0);
    }

    #[test]
    fn test_match_size_from_str() {
        assert_eq!(MatchSize::from_str("S"), Some(MatchSize::Small));
        assert_eq!(MatchSize::from_str("medium"), Some(MatchSize::Medium));
        assert_eq!(MatchSize::from_str("huge"), None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings =
            Settings::from_json(r#"{"animation_speed": 7, "algorithm": "merge"}"#).unwrap();
        assert_eq!(settings.animation_speed, 7.0);
        assert_eq!(settings.algorithm, SortAlgorithm::Merge);
        assert_eq!(settings.palette, Palette::default());
        assert_eq!(settings.match_size, MatchSize::Medium);
    }

    #[test]
    fn test_json_round_trip() {
        let mut settings = Settings::default();
        settings.palette.base = Color::from_rgb8(1, 2, 3);
        settings.match_size = MatchSize::Large;
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_rejects_negative_fade() {
        let err = Settings::from_json(r#"{"style_fade_ms": -1}"#).unwrap_err();
        assert!(matches!(err, VisError::InvalidInput { .. }));
    }

    #[test]
    fn test_speed_is_clamped() {
        let mut settings = Settings::default();
        settings.set_animation_speed(42.0);
        assert_eq!(settings.animation_speed, 10.0);
        settings.animation_speed = 0.0;
        assert_eq!(settings.effective_speed(), 1.0);
    }
}
