//! Deterministic simulation module
//!
//! Everything that moves lives here. This module must be pure and deterministic:
//! - Virtual clock only, advanced by the caller
//! - Seeded RNG only
//! - Stable iteration order (collection order, timers by due time then id)
//! - No rendering or platform dependencies beyond the [`Surface`](crate::renderer::Surface) seam

pub mod entity;
pub mod scheduler;
pub mod state;
pub mod steps;
pub mod tick;

pub use entity::{Bounds, EntityId, Match, MatchSet, Property};
pub use scheduler::{Completion, Join, JoinState, Motion, Scheduler, Status, Tween};
pub use state::{
    Matchbox, PendingOperation, SwapPhase, SwapProgress, SwapRecord, Viewport, slot_x,
};
pub use steps::{SortAlgorithm, Step};
pub use tick::{Playback, PlaybackPhase};
