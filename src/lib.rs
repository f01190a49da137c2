//! Matchbox Sort - A sorting algorithm visualiser
//!
//! Core modules:
//! - `sim`: Step trace generation and deterministic animation playback
//! - `renderer`: Drawing contract and vertex batching for match rectangles
//! - `settings`: Palette, speed and run configuration
//! - `color`: RGB colors with hex parsing and interpolation
//! - `error`: Error taxonomy shared by the generators and the playback engine

pub mod color;
pub mod error;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use color::Color;
pub use error::{Result, VisError};
pub use settings::{MatchSize, Palette, Settings};

use glam::Vec2;

/// Visualisation constants
pub mod consts {
    /// Width of a small match (medium and large scale this)
    pub const MATCH_BASE_WIDTH: f32 = 10.0;
    /// Horizontal gap between neighbouring matches
    pub const MATCH_BASE_MARGIN: f32 = 5.0;
    /// Opacity of a match at rest
    pub const MATCH_BASE_ALPHA: f32 = 0.65;
    /// Opacity of highlighted, compared and swapping matches
    pub const MATCH_ACTIVE_ALPHA: f32 = 1.0;

    /// Duration of one swap movement phase at speed 1 (ms)
    pub const SWAP_BASE_SPEED_MS: f64 = 3500.0;
    /// Pause after comparison styling at speed 1 (ms)
    pub const SETTLE_BASE_MS: f64 = 2500.0;
    /// Vertical distance past the destination row a swapping match travels through
    pub const SWAP_CLEARANCE: f32 = 10.0;

    /// Number of timer ticks a tween is split into
    pub const TWEEN_TICKS: u32 = 100;

    /// Headroom kept between the tallest possible match and the canvas edge
    pub const CANVAS_HEIGHT_MARGIN: u32 = 30;
    /// Most matches one run may hold
    pub const MAX_MATCHES: usize = 4096;

    /// Animation speed bounds (durations scale as base / speed)
    pub const MIN_ANIMATION_SPEED: f32 = 1.0;
    pub const MAX_ANIMATION_SPEED: f32 = 10.0;

    /// Frame step used by the headless runner (60 Hz, in ms)
    pub const FRAME_DT_MS: f64 = 1000.0 / 60.0;
}

/// Duration of `base_ms` scaled by an animation speed factor
#[inline]
pub fn scaled_duration(base_ms: f64, speed: f32) -> f64 {
    let speed = speed.clamp(consts::MIN_ANIMATION_SPEED, consts::MAX_ANIMATION_SPEED);
    base_ms / f64::from(speed)
}

/// Linear interpolation between two points
#[inline]
pub fn lerp_point(from: Vec2, to: Vec2, t: f32) -> Vec2 {
    from + (to - from) * t
}
