//! Matches: the animated bars being sorted
//!
//! A match's identifier, value and size are fixed at construction. Position,
//! color and opacity change only through retarget operations, which register
//! their timers with the owning [`Scheduler`] before the first tick.

use std::collections::HashMap;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::scheduler::{Completion, Motion, Scheduler, Tween};
use crate::color::Color;
use crate::error::{Result, VisError};

/// Stable match identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Animatable match properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Position,
    Opacity,
    Color,
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Property::Position => "position",
            Property::Opacity => "opacity",
            Property::Color => "color",
        })
    }
}

/// Axis-aligned bounds of a match (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub top: f32,
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Bounds {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// One bar
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    id: EntityId,
    value: u32,
    pos: Vec2,
    size: Vec2,
    color: Color,
    alpha: f32,
}

impl Match {
    pub fn new(id: EntityId, value: u32, pos: Vec2, size: Vec2, color: Color, alpha: f32) -> Self {
        Self {
            id,
            value,
            pos,
            size,
            color,
            alpha,
        }
    }

    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Sort key
    #[inline]
    pub fn value(&self) -> u32 {
        self.value
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            top: self.pos.y,
            left: self.pos.x,
            right: self.pos.x + self.size.x,
            bottom: self.pos.y + self.size.y,
        }
    }

    /// Move to `target` over `duration_ms` (0 = immediately)
    pub fn move_to(
        &mut self,
        scheduler: &mut Scheduler,
        target: Vec2,
        duration_ms: f64,
    ) -> Result<Completion> {
        scheduler.ensure_idle(self.id, Property::Position)?;
        if duration_ms <= 0.0 {
            self.pos = target;
            return Ok(scheduler.resolved());
        }
        let motion = Motion::Move {
            from: self.pos,
            to: target,
        };
        Ok(scheduler.start_tween(Tween::new(self.id, motion), duration_ms))
    }

    /// Fade to `target` opacity over `duration_ms` (0 = immediately)
    pub fn fade_to(
        &mut self,
        scheduler: &mut Scheduler,
        target: f32,
        duration_ms: f64,
    ) -> Result<Completion> {
        scheduler.ensure_idle(self.id, Property::Opacity)?;
        let target = target.clamp(0.0, 1.0);
        if duration_ms <= 0.0 {
            self.alpha = target;
            return Ok(scheduler.resolved());
        }
        let motion = Motion::Fade {
            from: self.alpha,
            to: target,
        };
        Ok(scheduler.start_tween(Tween::new(self.id, motion), duration_ms))
    }

    /// Blend to `target` color over `duration_ms` (0 = immediately)
    pub fn recolor_to(
        &mut self,
        scheduler: &mut Scheduler,
        target: Color,
        duration_ms: f64,
    ) -> Result<Completion> {
        scheduler.ensure_idle(self.id, Property::Color)?;
        if duration_ms <= 0.0 {
            self.color = target;
            return Ok(scheduler.resolved());
        }
        let motion = Motion::Recolor {
            from: self.color,
            to: target,
        };
        Ok(scheduler.start_tween(Tween::new(self.id, motion), duration_ms))
    }

    pub(crate) fn set_position(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    pub(crate) fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }

    pub(crate) fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

/// Ordered match collection with identifier lookup
///
/// Collection order never changes during a run; it is the draw order.
#[derive(Debug, Clone, Default)]
pub struct MatchSet {
    matches: Vec<Match>,
    index: HashMap<EntityId, usize>,
}

impl MatchSet {
    /// Build from matches; identifiers must be unique
    pub fn new(matches: Vec<Match>) -> Result<Self> {
        let mut index = HashMap::with_capacity(matches.len());
        for (slot, m) in matches.iter().enumerate() {
            if index.insert(m.id(), slot).is_some() {
                return Err(VisError::invalid_input(format!("duplicate id {}", m.id())));
            }
        }
        Ok(Self { matches, index })
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Match> {
        self.matches.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Match> {
        self.matches.iter_mut()
    }

    pub fn get(&self, id: EntityId) -> Option<&Match> {
        self.index.get(&id).map(|&slot| &self.matches[slot])
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Match> {
        self.index.get(&id).map(|&slot| &mut self.matches[slot])
    }

    pub fn require(&self, id: EntityId) -> Result<&Match> {
        self.get(id).ok_or(VisError::EntityNotFound { id })
    }

    pub(crate) fn require_mut(&mut self, id: EntityId) -> Result<&mut Match> {
        self.get_mut(id).ok_or(VisError::EntityNotFound { id })
    }

    /// Identifiers in collection order
    pub fn ids(&self) -> Vec<EntityId> {
        self.matches.iter().map(Match::id).collect()
    }

    /// Values in collection order
    pub fn values(&self) -> Vec<u32> {
        self.matches.iter().map(Match::value).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::scheduler::Status;

    fn sample() -> Match {
        Match::new(
            EntityId(1),
            42,
            Vec2::new(10.0, 0.0),
            Vec2::new(20.0, 42.0),
            Color::new(0.0, 0.0, 0.0),
            0.5,
        )
    }

    #[test]
    fn test_bounds() {
        let b = sample().bounds();
        assert_eq!(b.left, 10.0);
        assert_eq!(b.right, 30.0);
        assert_eq!(b.top, 0.0);
        assert_eq!(b.bottom, 42.0);
        assert_eq!(b.width(), 20.0);
        assert_eq!(b.height(), 42.0);
    }

    #[test]
    fn test_zero_duration_applies_immediately() {
        let mut scheduler = Scheduler::new();
        let mut m = sample();
        let done = m.move_to(&mut scheduler, Vec2::new(50.0, 5.0), 0.0).unwrap();
        assert_eq!(m.position(), Vec2::new(50.0, 5.0));
        assert_eq!(scheduler.status(done), Status::Resolved);

        let done = m.fade_to(&mut scheduler, 1.0, 0.0).unwrap();
        assert_eq!(m.alpha(), 1.0);
        assert_eq!(scheduler.status(done), Status::Resolved);

        let white = Color::new(1.0, 1.0, 1.0);
        m.recolor_to(&mut scheduler, white, 0.0).unwrap();
        assert_eq!(m.color(), white);
        assert_eq!(scheduler.live_count(), 0);
    }

    #[test]
    fn test_timed_retarget_registers_timer_before_first_tick() {
        let mut scheduler = Scheduler::new();
        let mut m = sample();
        let done = m.fade_to(&mut scheduler, 1.0, 100.0).unwrap();
        assert_eq!(scheduler.live_count(), 1);
        assert_eq!(scheduler.status(done), Status::Pending);
        // Nothing changes until the scheduler advances
        assert_eq!(m.alpha(), 0.5);
    }

    #[test]
    fn test_same_property_conflicts() {
        let mut scheduler = Scheduler::new();
        let mut m = sample();
        m.move_to(&mut scheduler, Vec2::new(0.0, 0.0), 100.0).unwrap();
        let err = m.move_to(&mut scheduler, Vec2::new(5.0, 5.0), 100.0).unwrap_err();
        assert_eq!(
            err,
            VisError::ConflictingOperation {
                id: EntityId(1),
                property: Property::Position
            }
        );
        // Zero-duration retargets of a busy property conflict too
        assert!(m.move_to(&mut scheduler, Vec2::ZERO, 0.0).is_err());
        // Other properties are independent
        assert!(m.fade_to(&mut scheduler, 1.0, 100.0).is_ok());
        assert!(m.recolor_to(&mut scheduler, Color::new(1.0, 0.0, 0.0), 100.0).is_ok());
        assert_eq!(scheduler.live_count(), 3);
    }

    #[test]
    fn test_match_set_lookup() {
        let a = sample();
        let mut b = sample();
        b.id = EntityId(2);
        let set = MatchSet::new(vec![a, b]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.ids(), vec![EntityId(1), EntityId(2)]);
        assert_eq!(set.values(), vec![42, 42]);
        assert!(set.get(EntityId(2)).is_some());
        assert_eq!(
            set.require(EntityId(9)).unwrap_err(),
            VisError::EntityNotFound { id: EntityId(9) }
        );
    }

    #[test]
    fn test_match_set_rejects_duplicates() {
        assert!(MatchSet::new(vec![sample(), sample()]).is_err());
    }
}
