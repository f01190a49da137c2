//! Timer scheduler on a virtual millisecond clock
//!
//! Owns every live timer of a run. Tweens are interval timers that tick
//! `TWEEN_TICKS` times; delays are one-shot timeouts. Each timer carries a
//! [`Completion`] that resolves when it finishes and never resolves if the
//! timer is cancelled.
//!
//! Timers fire in due-time order, ties broken by creation order, so a run is
//! fully deterministic for a given sequence of `advance` calls.

use std::collections::HashSet;

use glam::Vec2;

use super::entity::{EntityId, MatchSet, Property};
use crate::color::Color;
use crate::consts::TWEEN_TICKS;
use crate::error::{Result, VisError};
use crate::lerp_point;

/// Completion signal of one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Completion(u64);

/// State of a completion signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Pending,
    Resolved,
    /// The operation's timer was cancelled; it will never resolve
    Cancelled,
}

/// Kind of a scheduler timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Interval,
    Timeout,
}

/// What a tween drives
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Move { from: Vec2, to: Vec2 },
    Fade { from: f32, to: f32 },
    Recolor { from: Color, to: Color },
}

impl Motion {
    pub fn property(&self) -> Property {
        match self {
            Motion::Move { .. } => Property::Position,
            Motion::Fade { .. } => Property::Opacity,
            Motion::Recolor { .. } => Property::Color,
        }
    }
}

/// Linear interpolation of one match property
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    entity: EntityId,
    motion: Motion,
    ticks: u32,
}

impl Tween {
    pub fn new(entity: EntityId, motion: Motion) -> Self {
        Self {
            entity,
            motion,
            ticks: 0,
        }
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn property(&self) -> Property {
        self.motion.property()
    }

    /// Apply the next tick; returns true once the target is reached
    fn step(&mut self, matches: &mut MatchSet) -> Result<bool> {
        let m = matches.require_mut(self.entity)?;
        self.ticks += 1;
        let done = self.ticks >= TWEEN_TICKS;
        // The last tick snaps so float error never leaves a match off target
        let t = if done {
            1.0
        } else {
            self.ticks as f32 / TWEEN_TICKS as f32
        };
        match self.motion {
            Motion::Move { from, to } => {
                m.set_position(if done { to } else { lerp_point(from, to, t) });
            }
            Motion::Fade { from, to } => {
                m.set_alpha(if done { to } else { from + (to - from) * t });
            }
            Motion::Recolor { from, to } => {
                m.set_color(if done { to } else { from.lerp(to, t) });
            }
        }
        Ok(done)
    }
}

#[derive(Debug)]
enum Job {
    Tween(Tween),
    Delay,
}

#[derive(Debug)]
struct Timer {
    id: u64,
    kind: TimerKind,
    start: f64,
    period: f64,
    fired: u32,
    job: Job,
}

impl Timer {
    fn due(&self) -> f64 {
        self.start + self.period * f64::from(self.fired + 1)
    }
}

/// Live timers and resolved completions of one run
#[derive(Debug, Default)]
pub struct Scheduler {
    now: f64,
    next_id: u64,
    timers: Vec<Timer>,
    resolved: HashSet<u64>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time in ms
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Number of live timers
    pub fn live_count(&self) -> usize {
        self.timers.len()
    }

    pub fn is_idle(&self) -> bool {
        self.timers.is_empty()
    }

    /// Kinds of the live timers, in creation order
    pub fn live_kinds(&self) -> Vec<TimerKind> {
        self.timers.iter().map(|t| t.kind).collect()
    }

    /// True while a tween drives `property` of `entity`
    pub fn is_busy(&self, entity: EntityId, property: Property) -> bool {
        self.timers.iter().any(|t| match &t.job {
            Job::Tween(tween) => tween.entity == entity && tween.property() == property,
            Job::Delay => false,
        })
    }

    pub(crate) fn ensure_idle(&self, entity: EntityId, property: Property) -> Result<()> {
        if self.is_busy(entity, property) {
            return Err(VisError::ConflictingOperation {
                id: entity,
                property,
            });
        }
        Ok(())
    }

    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// A completion that is already resolved
    pub fn resolved(&mut self) -> Completion {
        let id = self.allocate();
        self.resolved.insert(id);
        Completion(id)
    }

    /// Register a tween; it ticks every `duration_ms / TWEEN_TICKS`
    pub(crate) fn start_tween(&mut self, tween: Tween, duration_ms: f64) -> Completion {
        let id = self.allocate();
        log::trace!(
            "tween {id}: {} {} over {duration_ms:.1}ms",
            tween.entity,
            tween.property()
        );
        self.timers.push(Timer {
            id,
            kind: TimerKind::Interval,
            start: self.now,
            period: duration_ms / f64::from(TWEEN_TICKS),
            fired: 0,
            job: Job::Tween(tween),
        });
        Completion(id)
    }

    /// Resolve after `duration_ms`
    pub fn delay(&mut self, duration_ms: f64) -> Completion {
        if duration_ms <= 0.0 {
            return self.resolved();
        }
        let id = self.allocate();
        self.timers.push(Timer {
            id,
            kind: TimerKind::Timeout,
            start: self.now,
            period: duration_ms,
            fired: 0,
            job: Job::Delay,
        });
        Completion(id)
    }

    pub fn status(&self, completion: Completion) -> Status {
        if self.resolved.contains(&completion.0) {
            Status::Resolved
        } else if self.timers.iter().any(|t| t.id == completion.0) {
            Status::Pending
        } else {
            Status::Cancelled
        }
    }

    /// Like `status`, but forgets a resolved completion
    fn consume(&mut self, completion: Completion) -> Status {
        if self.resolved.remove(&completion.0) {
            Status::Resolved
        } else {
            self.status(completion)
        }
    }

    /// Cancel every live timer; returns how many were cancelled
    ///
    /// Matches keep whatever values the last tick gave them. Resolved but
    /// unobserved completions are forgotten as well.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.timers.len();
        self.timers.clear();
        self.resolved.clear();
        if cancelled > 0 {
            log::debug!("cancelled {cancelled} timers");
        }
        cancelled
    }

    /// End every live tween of `property` early, resolving its completion
    ///
    /// Values stay where the last tick left them; the caller overwrites them.
    pub(crate) fn settle(&mut self, property: Property) -> usize {
        let before = self.timers.len();
        let resolved = &mut self.resolved;
        self.timers.retain(|t| match &t.job {
            Job::Tween(tween) if tween.property() == property => {
                resolved.insert(t.id);
                false
            }
            _ => true,
        });
        before - self.timers.len()
    }

    /// Advance the clock by `dt_ms`, firing every timer that comes due
    ///
    /// A tween whose match has disappeared is dropped without resolving and
    /// the error is returned after the clock has been advanced.
    pub fn advance(&mut self, dt_ms: f64, matches: &mut MatchSet) -> Result<()> {
        let target = self.now + dt_ms.max(0.0);
        let mut failure = None;

        loop {
            let next = self
                .timers
                .iter()
                .enumerate()
                .filter(|(_, t)| t.due() <= target)
                .min_by(|(_, a), (_, b)| a.due().total_cmp(&b.due()).then(a.id.cmp(&b.id)))
                .map(|(i, _)| i);
            let Some(i) = next else { break };

            let timer = &mut self.timers[i];
            self.now = self.now.max(timer.due());
            timer.fired += 1;
            let finished = match &mut timer.job {
                Job::Tween(tween) => match tween.step(matches) {
                    Ok(done) => Some(done),
                    Err(e) => {
                        failure.get_or_insert(e);
                        None
                    }
                },
                Job::Delay => Some(true),
            };

            match finished {
                Some(true) => {
                    let timer = self.timers.remove(i);
                    self.resolved.insert(timer.id);
                }
                Some(false) => {}
                None => {
                    self.timers.remove(i);
                }
            }
        }

        self.now = target;
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Join barrier over many completions
#[derive(Debug, Default)]
pub struct Join {
    pending: Vec<Completion>,
}

/// Outcome of polling a [`Join`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinState {
    Ready,
    Pending,
    Cancelled,
}

impl Join {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, completion: Completion) {
        self.pending.push(completion);
    }

    /// Take over every completion of `other`
    pub fn append(&mut self, mut other: Join) {
        self.pending.append(&mut other.pending);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Ready once every completion resolved; Cancelled if any never will
    pub fn poll(&mut self, scheduler: &mut Scheduler) -> JoinState {
        let mut cancelled = false;
        self.pending.retain(|&c| match scheduler.consume(c) {
            Status::Resolved => false,
            Status::Pending => true,
            Status::Cancelled => {
                cancelled = true;
                false
            }
        });
        if cancelled {
            JoinState::Cancelled
        } else if self.pending.is_empty() {
            JoinState::Ready
        } else {
            JoinState::Pending
        }
    }
}

impl FromIterator<Completion> for Join {
    fn from_iter<I: IntoIterator<Item = Completion>>(iter: I) -> Self {
        Self {
            pending: iter.into_iter().collect(),
        }
    }
}
