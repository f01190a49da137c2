//! Match collection and swap choreography
//!
//! A [`Matchbox`] owns the matches of one run, the scheduler driving them and
//! at most one pending operation. Nothing is shared between runs: a reset
//! builds a fresh matchbox.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{EntityId, Match, MatchSet, Property};
use super::scheduler::{Join, JoinState, Scheduler};
use crate::color::Color;
use crate::consts::*;
use crate::error::{Result, VisError};
use crate::renderer::Surface;
use crate::scaled_duration;
use crate::settings::{MatchSize, Palette};

/// Canvas the matches are laid out on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Everything needed to finish an interrupted swap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwapRecord {
    pub first: EntityId,
    pub second: EntityId,
    /// Where `first` stood when the swap began (the destination of `second`)
    pub first_origin: Vec2,
    /// Where `second` stood when the swap began (the destination of `first`)
    pub second_origin: Vec2,
    /// Animation speed in effect when the swap began
    pub speed: f32,
}

/// An in-flight multi-match operation that survives a pause
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PendingOperation {
    Swap(SwapRecord),
}

/// Legs of the swap path: down to clearance, across, back up to the row
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SwapPhase {
    Lift,
    Across,
    Lower,
}

impl SwapPhase {
    fn next(self) -> Option<Self> {
        match self {
            SwapPhase::Lift => Some(SwapPhase::Across),
            SwapPhase::Across => Some(SwapPhase::Lower),
            SwapPhase::Lower => None,
        }
    }

    /// First leg a match at `pos` still has to travel to reach `dest`
    ///
    /// Legs already satisfied geometrically are skipped, which is what lets an
    /// interrupted swap pick up where it stopped.
    pub fn remaining(pos: Vec2, dest: Vec2) -> Option<Self> {
        if pos == dest {
            None
        } else if pos.x != dest.x {
            if pos.y == dest.y + SWAP_CLEARANCE {
                Some(SwapPhase::Across)
            } else {
                Some(SwapPhase::Lift)
            }
        } else {
            Some(SwapPhase::Lower)
        }
    }

    /// Where a match at `pos` heads during this leg
    pub fn waypoint(self, pos: Vec2, dest: Vec2) -> Vec2 {
        match self {
            SwapPhase::Lift => Vec2::new(pos.x, dest.y + SWAP_CLEARANCE),
            SwapPhase::Across => Vec2::new(dest.x, dest.y + SWAP_CLEARANCE),
            SwapPhase::Lower => dest,
        }
    }
}

#[derive(Debug)]
enum SwapStage {
    Start,
    Styling(Join),
    Moving {
        phase: SwapPhase,
        first_from: Option<SwapPhase>,
        second_from: Option<SwapPhase>,
        join: Join,
    },
    Restoring(Join),
    Done,
}

/// Progress of one swap, driven by [`Matchbox::poll_swap`]
#[derive(Debug)]
pub struct SwapProgress {
    record: SwapRecord,
    stage: SwapStage,
}

impl SwapProgress {
    pub fn record(&self) -> &SwapRecord {
        &self.record
    }

    /// Current movement leg, if the matches are moving
    pub fn phase(&self) -> Option<SwapPhase> {
        match self.stage {
            SwapStage::Moving { phase, .. } => Some(phase),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.stage, SwapStage::Done)
    }
}

/// The matches of one run
#[derive(Debug)]
pub struct Matchbox {
    matches: MatchSet,
    scheduler: Scheduler,
    pending: Option<PendingOperation>,
    match_size: MatchSize,
}

impl Matchbox {
    /// Fill the viewport with matches of random height
    pub fn new(
        viewport: Viewport,
        match_size: MatchSize,
        base_color: Color,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        if !viewport.width.is_finite() || !viewport.height.is_finite() {
            return Err(VisError::invalid_input(format!(
                "canvas {}x{} is not a finite size",
                viewport.width, viewport.height
            )));
        }
        let count = match_size.match_count(viewport.width);
        if count > MAX_MATCHES {
            return Err(VisError::invalid_input(format!(
                "canvas width {} fits {count} matches, more than {MAX_MATCHES}",
                viewport.width
            )));
        }
        let max_height = (viewport.height.floor() as i64) - i64::from(CANVAS_HEIGHT_MARGIN);
        if count > 0 && max_height < 1 {
            return Err(VisError::invalid_input(format!(
                "canvas height {} leaves no room for matches",
                viewport.height
            )));
        }
        let values: Vec<u32> = (0..count)
            .map(|_| rng.random_range(1..=max_height as u32))
            .collect();
        log::info!(
            "New matchbox: {} {} matches on {}x{}",
            count,
            match_size.as_str(),
            viewport.width,
            viewport.height
        );
        Self::from_values(&values, match_size, base_color)
    }

    /// Lay out one match per value, left to right
    pub fn from_values(values: &[u32], match_size: MatchSize, base_color: Color) -> Result<Self> {
        let width = match_size.match_width();
        let matches = values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                Match::new(
                    EntityId(i as u32 + 1),
                    value,
                    Vec2::new(slot_x(i, match_size), 0.0),
                    Vec2::new(width, value as f32),
                    base_color,
                    MATCH_BASE_ALPHA,
                )
            })
            .collect();
        Ok(Self {
            matches: MatchSet::new(matches)?,
            scheduler: Scheduler::new(),
            pending: None,
            match_size,
        })
    }

    pub fn matches(&self) -> &MatchSet {
        &self.matches
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn match_size(&self) -> MatchSize {
        self.match_size
    }

    pub fn pending(&self) -> Option<&PendingOperation> {
        self.pending.as_ref()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.matches.ids()
    }

    pub fn values(&self) -> Vec<u32> {
        self.matches.values()
    }

    /// Identifiers ordered by on-screen x position
    pub fn slot_order(&self) -> Vec<EntityId> {
        let mut order: Vec<&Match> = self.matches.iter().collect();
        order.sort_by(|a, b| a.position().x.total_cmp(&b.position().x));
        order.into_iter().map(Match::id).collect()
    }

    /// Move the clock forward, firing due timers
    pub fn advance(&mut self, dt_ms: f64) -> Result<()> {
        self.scheduler.advance(dt_ms, &mut self.matches)
    }

    /// Stop every timer; the pending operation is kept for a later resume
    pub fn cancel_all(&mut self) -> usize {
        self.scheduler.cancel_all()
    }

    pub(crate) fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    /// Restyle one match; properties already at their target are left alone
    pub fn style(&mut self, id: EntityId, color: Color, alpha: f32, fade_ms: f64) -> Result<Join> {
        let m = self.matches.require_mut(id)?;
        let mut join = Join::new();
        if m.color() != color {
            join.push(m.recolor_to(&mut self.scheduler, color, fade_ms)?);
        }
        if m.alpha() != alpha {
            join.push(m.fade_to(&mut self.scheduler, alpha, fade_ms)?);
        }
        Ok(join)
    }

    /// Restyle many matches as one batch
    ///
    /// A failing match does not stop the others; the first error is returned
    /// alongside the join over everything that did start.
    pub fn style_many<'a>(
        &mut self,
        ids: impl IntoIterator<Item = &'a EntityId>,
        color: Color,
        alpha: f32,
        fade_ms: f64,
    ) -> (Join, Option<VisError>) {
        let mut join = Join::new();
        let mut first_error = None;
        for &id in ids {
            match self.style(id, color, alpha, fade_ms) {
                Ok(j) => join.append(j),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        (join, first_error)
    }

    /// Repaint every match with a new base color, immediately
    ///
    /// Color fades still running are cut short and count as finished, so
    /// whatever waits on them carries on.
    pub fn set_base_color(&mut self, color: Color) {
        let settled = self.scheduler.settle(Property::Color);
        if settled > 0 {
            log::debug!("base repaint settled {settled} color fades");
        }
        for m in self.matches.iter_mut() {
            m.set_color(color);
        }
    }

    /// Put each match of `merged` where the match at the same index of
    /// `compared` stood
    pub fn relabel(&mut self, compared: &[EntityId], merged: &[EntityId]) -> Result<()> {
        if compared.len() != merged.len() {
            return Err(VisError::invalid_input(format!(
                "merge of {} matches relabels {}",
                compared.len(),
                merged.len()
            )));
        }
        let origins = compared
            .iter()
            .map(|&id| self.matches.require(id).map(Match::position))
            .collect::<Result<Vec<_>>>()?;
        for &id in merged {
            self.matches.require(id)?;
            self.scheduler
                .ensure_idle(id, Property::Position)?;
        }
        for (&id, origin) in merged.iter().zip(origins) {
            self.matches.require_mut(id)?.set_position(origin);
        }
        Ok(())
    }

    /// Start swapping two matches; records the pending operation first
    pub fn begin_swap(&mut self, first: EntityId, second: EntityId, speed: f32) -> Result<SwapProgress> {
        let first_origin = self.matches.require(first)?.position();
        let second_origin = self.matches.require(second)?.position();
        let record = SwapRecord {
            first,
            second,
            first_origin,
            second_origin,
            speed,
        };
        self.pending = Some(PendingOperation::Swap(record));
        log::debug!("swap {first} <-> {second} started");
        Ok(SwapProgress {
            record,
            stage: SwapStage::Start,
        })
    }

    /// Replay the pending operation from the recorded origins
    pub fn resume_pending(&mut self) -> Option<SwapProgress> {
        let PendingOperation::Swap(record) = self.pending?;
        log::debug!("replaying swap {} <-> {}", record.first, record.second);
        Some(SwapProgress {
            record,
            stage: SwapStage::Start,
        })
    }

    /// Drive a swap as far as the clock allows
    ///
    /// Both matches travel the same leg at the same time and each leg waits
    /// for both, so the pair never drifts apart in phase. Styling happens
    /// before and after the motion. Returns `Ready` once the swap completed
    /// and the pending record is cleared.
    pub fn poll_swap(
        &mut self,
        progress: &mut SwapProgress,
        palette: &Palette,
        fade_ms: f64,
    ) -> Result<JoinState> {
        let record = progress.record;
        loop {
            let next = match &mut progress.stage {
                SwapStage::Start => {
                    let (join, error) = self.style_many(
                        [&record.first, &record.second],
                        palette.swapped,
                        MATCH_ACTIVE_ALPHA,
                        fade_ms,
                    );
                    if let Some(e) = error {
                        return Err(e);
                    }
                    SwapStage::Styling(join)
                }
                SwapStage::Styling(join) => match join.poll(&mut self.scheduler) {
                    JoinState::Ready => self.start_motion(&record, SwapPhase::Lift, None)?,
                    state => return Ok(state),
                },
                SwapStage::Moving {
                    phase,
                    first_from,
                    second_from,
                    join,
                } => match join.poll(&mut self.scheduler) {
                    JoinState::Ready => match phase.next() {
                        Some(next) => {
                            self.start_motion(&record, next, Some((*first_from, *second_from)))?
                        }
                        None => {
                            let (join, error) = self.style_many(
                                [&record.first, &record.second],
                                palette.base,
                                MATCH_BASE_ALPHA,
                                fade_ms,
                            );
                            if let Some(e) = error {
                                return Err(e);
                            }
                            SwapStage::Restoring(join)
                        }
                    },
                    state => return Ok(state),
                },
                SwapStage::Restoring(join) => match join.poll(&mut self.scheduler) {
                    JoinState::Ready => {
                        self.pending = None;
                        log::debug!("swap {} <-> {} done", record.first, record.second);
                        SwapStage::Done
                    }
                    state => return Ok(state),
                },
                SwapStage::Done => return Ok(JoinState::Ready),
            };
            progress.stage = next;
        }
    }

    /// Issue the moves of one leg for both matches
    ///
    /// `from` carries each match's first outstanding leg, computed once when
    /// the motion starts; `None` means the motion is starting now.
    fn start_motion(
        &mut self,
        record: &SwapRecord,
        phase: SwapPhase,
        from: Option<(Option<SwapPhase>, Option<SwapPhase>)>,
    ) -> Result<SwapStage> {
        let (first_from, second_from) = match from {
            Some(from) => from,
            None => (
                SwapPhase::remaining(
                    self.matches.require(record.first)?.position(),
                    record.second_origin,
                ),
                SwapPhase::remaining(
                    self.matches.require(record.second)?.position(),
                    record.first_origin,
                ),
            ),
        };
        let duration = scaled_duration(SWAP_BASE_SPEED_MS, record.speed);

        let mut join = Join::new();
        for (id, dest, starts_at) in [
            (record.first, record.second_origin, first_from),
            (record.second, record.first_origin, second_from),
        ] {
            if starts_at.is_some_and(|start| start <= phase) {
                let m = self.matches.require_mut(id)?;
                let waypoint = phase.waypoint(m.position(), dest);
                join.push(m.move_to(&mut self.scheduler, waypoint, duration)?);
            }
        }
        Ok(SwapStage::Moving {
            phase,
            first_from,
            second_from,
            join,
        })
    }

    /// Paint every match, back to front in collection order
    pub fn draw(&self, surface: &mut impl Surface) {
        for m in self.matches.iter() {
            surface.fill_rect(m.bounds(), m.color().with_alpha(m.alpha()));
        }
    }
}

/// Left edge of slot `i`
pub fn slot_x(i: usize, match_size: MatchSize) -> f32 {
    i as f32 * (match_size.match_width() + MATCH_BASE_MARGIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::VertexBatch;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const SPEED: f32 = 10.0;
    // one swap leg at speed 10
    const LEG_MS: f64 = 350.0;

    fn matchbox(values: &[u32]) -> Matchbox {
        Matchbox::from_values(values, MatchSize::Medium, Palette::default().base).unwrap()
    }

    fn pos(mb: &Matchbox, id: u32) -> Vec2 {
        mb.matches().get(EntityId(id)).unwrap().position()
    }

    #[test]
    fn test_new_fills_viewport() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mb = Matchbox::new(
            Viewport::new(800.0, 600.0),
            MatchSize::Medium,
            Palette::default().base,
            &mut rng,
        )
        .unwrap();
        assert_eq!(mb.matches().len(), 32);
        assert!(mb.values().iter().all(|&v| (1..=570).contains(&v)));
        assert_eq!(pos(&mb, 2), Vec2::new(25.0, 0.0));
    }

    #[test]
    fn test_new_rejects_short_canvas() {
        let mut rng = Pcg32::seed_from_u64(7);
        let err = Matchbox::new(
            Viewport::new(800.0, 30.0),
            MatchSize::Small,
            Palette::default().base,
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, VisError::InvalidInput { .. }));
    }

    #[test]
    fn test_new_rejects_unbounded_canvas() {
        let mut rng = Pcg32::seed_from_u64(7);
        for viewport in [
            Viewport::new(f32::INFINITY, 600.0),
            Viewport::new(800.0, f32::NAN),
            Viewport::new(1.0e12, 600.0),
        ] {
            let err = Matchbox::new(viewport, MatchSize::Small, Palette::default().base, &mut rng)
                .unwrap_err();
            assert!(matches!(err, VisError::InvalidInput { .. }));
        }
    }

    #[test]
    fn test_swap_phase_remaining() {
        let dest = Vec2::new(25.0, 0.0);
        assert_eq!(SwapPhase::remaining(Vec2::ZERO, dest), Some(SwapPhase::Lift));
        assert_eq!(
            SwapPhase::remaining(Vec2::new(0.0, 4.0), dest),
            Some(SwapPhase::Lift)
        );
        assert_eq!(
            SwapPhase::remaining(Vec2::new(12.0, SWAP_CLEARANCE), dest),
            Some(SwapPhase::Across)
        );
        assert_eq!(
            SwapPhase::remaining(Vec2::new(25.0, 3.0), dest),
            Some(SwapPhase::Lower)
        );
        assert_eq!(SwapPhase::remaining(dest, dest), None);
    }

    #[test]
    fn test_swap_lifecycle() {
        let palette = Palette::default();
        let mut mb = matchbox(&[2, 1]);
        let mut swap = mb.begin_swap(EntityId(1), EntityId(2), SPEED).unwrap();
        assert!(mb.pending().is_some());

        assert_eq!(mb.poll_swap(&mut swap, &palette, 0.0).unwrap(), JoinState::Pending);
        assert_eq!(swap.phase(), Some(SwapPhase::Lift));
        let first = mb.matches().get(EntityId(1)).unwrap();
        assert_eq!(first.color(), palette.swapped);
        assert_eq!(first.alpha(), MATCH_ACTIVE_ALPHA);

        mb.advance(LEG_MS).unwrap();
        assert_eq!(pos(&mb, 1), Vec2::new(0.0, SWAP_CLEARANCE));
        assert_eq!(pos(&mb, 2), Vec2::new(25.0, SWAP_CLEARANCE));
        assert_eq!(mb.poll_swap(&mut swap, &palette, 0.0).unwrap(), JoinState::Pending);
        assert_eq!(swap.phase(), Some(SwapPhase::Across));

        mb.advance(LEG_MS).unwrap();
        assert_eq!(pos(&mb, 1), Vec2::new(25.0, SWAP_CLEARANCE));
        assert_eq!(mb.poll_swap(&mut swap, &palette, 0.0).unwrap(), JoinState::Pending);
        assert_eq!(swap.phase(), Some(SwapPhase::Lower));

        mb.advance(LEG_MS).unwrap();
        assert_eq!(mb.poll_swap(&mut swap, &palette, 0.0).unwrap(), JoinState::Ready);
        assert!(swap.is_done());
        assert!(mb.pending().is_none());
        assert_eq!(pos(&mb, 1), Vec2::new(25.0, 0.0));
        assert_eq!(pos(&mb, 2), Vec2::ZERO);
        assert_eq!(mb.slot_order(), vec![EntityId(2), EntityId(1)]);
        let first = mb.matches().get(EntityId(1)).unwrap();
        assert_eq!(first.color(), palette.base);
        assert_eq!(first.alpha(), MATCH_BASE_ALPHA);
        assert!(mb.scheduler().is_idle());
    }

    #[test]
    fn test_interrupted_swap_resumes_mid_leg() {
        let palette = Palette::default();
        let mut mb = matchbox(&[2, 1]);
        let mut swap = mb.begin_swap(EntityId(1), EntityId(2), SPEED).unwrap();
        mb.poll_swap(&mut swap, &palette, 0.0).unwrap();
        mb.advance(LEG_MS).unwrap();
        mb.poll_swap(&mut swap, &palette, 0.0).unwrap();
        mb.advance(LEG_MS / 2.0).unwrap();

        let halfway = pos(&mb, 1);
        assert_eq!(halfway.y, SWAP_CLEARANCE);
        assert!(halfway.x > 0.0 && halfway.x < 25.0);

        assert!(mb.cancel_all() > 0);
        assert_eq!(
            mb.poll_swap(&mut swap, &palette, 0.0).unwrap(),
            JoinState::Cancelled
        );
        mb.advance(LEG_MS).unwrap();
        assert_eq!(pos(&mb, 1), halfway);

        let record = match mb.pending() {
            Some(PendingOperation::Swap(record)) => *record,
            None => panic!("swap record dropped by cancel"),
        };
        assert_eq!(record.first_origin, Vec2::ZERO);
        assert_eq!(record.second_origin, Vec2::new(25.0, 0.0));

        let mut resumed = mb.resume_pending().unwrap();
        assert_eq!(
            mb.poll_swap(&mut resumed, &palette, 0.0).unwrap(),
            JoinState::Pending
        );
        // the lift is already done, so the replay starts across
        mb.advance(LEG_MS).unwrap();
        assert_eq!(pos(&mb, 1), Vec2::new(25.0, SWAP_CLEARANCE));
        mb.poll_swap(&mut resumed, &palette, 0.0).unwrap();
        mb.advance(LEG_MS).unwrap();
        assert_eq!(
            mb.poll_swap(&mut resumed, &palette, 0.0).unwrap(),
            JoinState::Ready
        );
        assert_eq!(pos(&mb, 1), Vec2::new(25.0, 0.0));
        assert_eq!(pos(&mb, 2), Vec2::ZERO);
        assert!(mb.pending().is_none());
    }

    #[test]
    fn test_swap_with_missing_match() {
        let mut mb = matchbox(&[2, 1]);
        let err = mb.begin_swap(EntityId(1), EntityId(9), SPEED).unwrap_err();
        assert_eq!(err, VisError::EntityNotFound { id: EntityId(9) });
        assert!(mb.pending().is_none());
    }

    #[test]
    fn test_style_skips_settled_properties() {
        let palette = Palette::default();
        let mut mb = matchbox(&[3, 1]);
        let join = mb
            .style(EntityId(1), palette.base, MATCH_BASE_ALPHA, 500.0)
            .unwrap();
        assert!(join.is_empty());
        assert!(mb.scheduler().is_idle());

        let mut join = mb
            .style(EntityId(1), palette.compared, MATCH_ACTIVE_ALPHA, 500.0)
            .unwrap();
        assert_eq!(mb.scheduler().live_count(), 2);
        assert_eq!(join.poll(mb.scheduler_mut()), JoinState::Pending);
        mb.advance(500.0).unwrap();
        assert_eq!(join.poll(mb.scheduler_mut()), JoinState::Ready);
        assert_eq!(mb.matches().get(EntityId(1)).unwrap().color(), palette.compared);
    }

    #[test]
    fn test_style_conflict() {
        let palette = Palette::default();
        let mut mb = matchbox(&[3, 1]);
        mb.style(EntityId(1), palette.compared, MATCH_ACTIVE_ALPHA, 500.0)
            .unwrap();
        let err = mb
            .style(EntityId(1), palette.swapped, MATCH_ACTIVE_ALPHA, 0.0)
            .unwrap_err();
        assert!(matches!(err, VisError::ConflictingOperation { .. }));
    }

    #[test]
    fn test_style_many_reports_partial_failure() {
        let palette = Palette::default();
        let mut mb = matchbox(&[3, 1]);
        let (_, error) = mb.style_many(
            &[EntityId(1), EntityId(7), EntityId(2)],
            palette.compared,
            MATCH_ACTIVE_ALPHA,
            0.0,
        );
        assert_eq!(error, Some(VisError::EntityNotFound { id: EntityId(7) }));
        assert_eq!(mb.matches().get(EntityId(2)).unwrap().color(), palette.compared);
    }

    #[test]
    fn test_set_base_color() {
        let mut mb = matchbox(&[3, 1, 2]);
        let color = Color::from_rgb8(10, 20, 30);
        mb.set_base_color(color);
        assert!(mb.matches().iter().all(|m| m.color() == color));
    }

    #[test]
    fn test_set_base_color_during_fade() {
        let palette = Palette::default();
        let mut mb = matchbox(&[3, 1]);
        let mut join = mb
            .style(EntityId(1), palette.compared, MATCH_ACTIVE_ALPHA, 500.0)
            .unwrap();
        mb.advance(100.0).unwrap();

        let color = Color::from_rgb8(10, 20, 30);
        mb.set_base_color(color);
        assert!(mb.matches().iter().all(|m| m.color() == color));
        assert!(!mb.scheduler().is_busy(EntityId(1), Property::Color));

        // the opacity fade keeps going and the join still completes
        assert_eq!(join.poll(mb.scheduler_mut()), JoinState::Pending);
        mb.advance(400.0).unwrap();
        assert_eq!(join.poll(mb.scheduler_mut()), JoinState::Ready);
        assert_eq!(mb.matches().get(EntityId(1)).unwrap().color(), color);
    }

    #[test]
    fn test_relabel() {
        let mut mb = matchbox(&[3, 1, 2]);
        mb.relabel(
            &[EntityId(1), EntityId(2), EntityId(3)],
            &[EntityId(2), EntityId(3), EntityId(1)],
        )
        .unwrap();
        assert_eq!(
            mb.slot_order(),
            vec![EntityId(2), EntityId(3), EntityId(1)]
        );
        assert_eq!(pos(&mb, 1), Vec2::new(50.0, 0.0));
    }

    #[test]
    fn test_relabel_validates_first() {
        let mut mb = matchbox(&[3, 1, 2]);
        let err = mb
            .relabel(&[EntityId(1), EntityId(2)], &[EntityId(2), EntityId(8)])
            .unwrap_err();
        assert_eq!(err, VisError::EntityNotFound { id: EntityId(8) });
        assert_eq!(pos(&mb, 2), Vec2::new(25.0, 0.0));

        let err = mb.relabel(&[EntityId(1)], &[]).unwrap_err();
        assert!(matches!(err, VisError::InvalidInput { .. }));
    }

    #[test]
    fn test_draw_in_collection_order() {
        let mb = matchbox(&[30, 10]);
        let mut batch = VertexBatch::new(50.0, 60.0);
        mb.draw(&mut batch);
        assert_eq!(batch.rect_count(), 2);
        assert_eq!(batch.vertices()[0].color[3], MATCH_BASE_ALPHA);
        // second match starts at x = 25, half way across the canvas
        assert_eq!(batch.vertices()[6].position[0], 0.0);
    }
}
