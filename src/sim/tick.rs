//! Trace playback
//!
//! [`Playback`] walks a step trace one step at a time. Every suspension point
//! (a styling batch, the settle delay, each swap leg) is an explicit stage;
//! `tick` advances the clock and then moves through stages until one has to
//! wait for a timer.
//!
//! Within a step: scope styling, then comparison styling, then the settle
//! delay, then the swap or merge, then the reset to base. Step `k + 1` never
//! starts before step `k` fully finished.

use std::collections::HashSet;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::EntityId;
use super::scheduler::{Join, JoinState};
use super::state::{Matchbox, SwapProgress, Viewport, slot_x};
use super::steps::{SortAlgorithm, Step};
use crate::consts::*;
use crate::error::{Result, VisError};
use crate::renderer::Surface;
use crate::scaled_duration;
use crate::settings::Settings;

/// Playback state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackPhase {
    /// Not started, finished, or reset
    Idle,
    /// Timers are running
    Playing,
    /// Timers cancelled; resumable
    Paused,
}

#[derive(Debug)]
enum Stage {
    /// Finishing a swap interrupted by a pause
    Replaying(SwapProgress),
    BeginStep,
    Scoping(Join),
    Comparing(Join),
    Settling(Join),
    Swapping(SwapProgress),
    Finishing(Join),
    /// Final reset to base after the last step
    Closing(Join),
}

enum Flow {
    Next(Stage),
    Wait(Stage),
    Finished,
    Interrupted,
}

/// Poll a join against the matchbox clock
fn await_join(join: &mut Join, matchbox: &mut Matchbox) -> JoinState {
    join.poll(matchbox.scheduler_mut())
}

/// Playback engine for one visualisation run
#[derive(Debug)]
pub struct Playback {
    settings: Settings,
    viewport: Viewport,
    rng: Pcg32,
    matchbox: Matchbox,
    trace: Vec<Step>,
    step: usize,
    phase: PlaybackPhase,
    stage: Option<Stage>,
    finished: bool,
}

impl Playback {
    /// Start a run with random match heights filling `viewport`
    pub fn new(settings: Settings, viewport: Viewport) -> Result<Self> {
        settings.validate()?;
        let mut rng = Pcg32::seed_from_u64(settings.seed);
        let matchbox = Matchbox::new(
            viewport,
            settings.match_size,
            settings.palette.base,
            &mut rng,
        )?;
        Self::with_matchbox(settings, viewport, rng, matchbox)
    }

    /// Start a run over fixed match heights
    pub fn with_values(settings: Settings, values: &[u32]) -> Result<Self> {
        settings.validate()?;
        let rng = Pcg32::seed_from_u64(settings.seed);
        let matchbox = Matchbox::from_values(values, settings.match_size, settings.palette.base)?;
        let tallest = values.iter().copied().max().unwrap_or(0);
        let viewport = Viewport::new(
            slot_x(values.len(), settings.match_size),
            tallest.saturating_add(CANVAS_HEIGHT_MARGIN) as f32,
        );
        Self::with_matchbox(settings, viewport, rng, matchbox)
    }

    fn with_matchbox(
        settings: Settings,
        viewport: Viewport,
        rng: Pcg32,
        matchbox: Matchbox,
    ) -> Result<Self> {
        let trace = generate_trace(settings.algorithm, &matchbox)?;
        log::info!(
            "{}: {} steps for {} matches",
            settings.algorithm.as_str(),
            trace.len(),
            matchbox.matches().len()
        );
        Ok(Self {
            settings,
            viewport,
            rng,
            matchbox,
            trace,
            step: 0,
            phase: PlaybackPhase::Idle,
            stage: None,
            finished: false,
        })
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    /// Number of steps fully played
    pub fn current_step(&self) -> usize {
        self.step
    }

    pub fn step_count(&self) -> usize {
        self.trace.len()
    }

    pub fn trace(&self) -> &[Step] {
        &self.trace
    }

    pub fn matchbox(&self) -> &Matchbox {
        &self.matchbox
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// True once the whole trace played and matches returned to base
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Mutable settings; palette and speed are picked up at the next stage
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Replace the settings
    ///
    /// A new algorithm or match size starts a new run; a new base color
    /// repaints every match.
    pub fn update_settings(&mut self, settings: Settings) -> Result<()> {
        settings.validate()?;
        let restart = settings.algorithm != self.settings.algorithm
            || settings.match_size != self.settings.match_size;
        let repaint = settings.palette.base != self.settings.palette.base;
        let previous = std::mem::replace(&mut self.settings, settings);
        if restart {
            if let Err(e) = self.reset() {
                self.settings = previous;
                return Err(e);
            }
        } else if repaint {
            self.matchbox.set_base_color(self.settings.palette.base);
        }
        Ok(())
    }

    /// Swap in a different trace, resuming at `from_step`
    ///
    /// Not allowed while playing. A pending swap from an earlier pause is
    /// still replayed first on the next `play`.
    pub fn load_trace(&mut self, trace: Vec<Step>, from_step: usize) -> Result<()> {
        if self.phase == PlaybackPhase::Playing {
            return Err(VisError::invalid_input("cannot replace the trace while playing"));
        }
        if from_step > trace.len() {
            return Err(VisError::invalid_input(format!(
                "step {from_step} is past the end of a {}-step trace",
                trace.len()
            )));
        }
        self.trace = trace;
        self.step = from_step;
        self.finished = false;
        Ok(())
    }

    /// Load `trace` at `from_step` and play it
    pub fn play_from(&mut self, trace: Vec<Step>, from_step: usize) -> Result<()> {
        self.load_trace(trace, from_step)?;
        self.play()
    }

    /// Follow a canvas resize; a different match count starts a new run
    pub fn resize(&mut self, viewport: Viewport) -> Result<()> {
        let size = self.settings.match_size;
        let count_changed =
            size.match_count(viewport.width) != size.match_count(self.viewport.width);
        let previous = std::mem::replace(&mut self.viewport, viewport);
        if count_changed {
            if let Err(e) = self.reset() {
                self.viewport = previous;
                return Err(e);
            }
        }
        Ok(())
    }

    /// Start or resume playback
    pub fn play(&mut self) -> Result<()> {
        match self.phase {
            PlaybackPhase::Playing => return Ok(()),
            PlaybackPhase::Idle if self.finished => {
                log::info!("Nothing left to play");
                return Ok(());
            }
            _ => {}
        }

        self.stage = Some(match self.matchbox.resume_pending() {
            Some(progress) => Stage::Replaying(progress),
            None => Stage::BeginStep,
        });
        self.phase = PlaybackPhase::Playing;
        log::info!("Playing from step {}/{}", self.step, self.trace.len());
        self.drive()
    }

    /// Pause: stop every timer but keep the pending swap for `play`
    pub fn pause(&mut self) {
        if self.phase != PlaybackPhase::Playing {
            return;
        }
        let cancelled = self.matchbox.cancel_all();
        // the step already took effect; only its restyle was outstanding
        if matches!(self.stage, Some(Stage::Finishing(_))) {
            self.step += 1;
        }
        self.stage = None;
        self.phase = PlaybackPhase::Paused;
        log::info!(
            "Paused at step {}/{} ({cancelled} timers cancelled)",
            self.step,
            self.trace.len()
        );
    }

    /// Throw the run away and build a new one from the current settings
    ///
    /// On error the current run is left untouched.
    pub fn reset(&mut self) -> Result<()> {
        let matchbox = Matchbox::new(
            self.viewport,
            self.settings.match_size,
            self.settings.palette.base,
            &mut self.rng,
        )?;
        let trace = generate_trace(self.settings.algorithm, &matchbox)?;
        self.matchbox.cancel_all();
        self.matchbox = matchbox;
        self.trace = trace;
        self.step = 0;
        self.stage = None;
        self.phase = PlaybackPhase::Idle;
        self.finished = false;
        log::info!("Reset: {} steps", self.trace.len());
        Ok(())
    }

    /// Advance the clock by `dt_ms` and run every stage that becomes ready
    pub fn tick(&mut self, dt_ms: f64) -> Result<()> {
        if self.phase != PlaybackPhase::Playing {
            return Ok(());
        }
        if let Err(e) = self.matchbox.advance(dt_ms) {
            return Err(self.halt(e));
        }
        self.drive()
    }

    /// Paint the current frame
    pub fn draw(&self, surface: &mut impl Surface) {
        self.matchbox.draw(surface);
    }

    /// Run stages until one blocks
    fn drive(&mut self) -> Result<()> {
        while self.phase == PlaybackPhase::Playing {
            let Some(stage) = self.stage.take() else {
                break;
            };
            match self.run_stage(stage) {
                Ok(Flow::Next(next)) => self.stage = Some(next),
                Ok(Flow::Wait(stage)) => {
                    self.stage = Some(stage);
                    break;
                }
                Ok(Flow::Finished) => {
                    self.phase = PlaybackPhase::Idle;
                    self.finished = true;
                    log::info!("Finished: {} steps played", self.step);
                }
                Ok(Flow::Interrupted) => {
                    log::debug!("Timers cancelled underneath playback");
                    self.pause();
                }
                Err(e) => return Err(self.halt(e)),
            }
        }
        Ok(())
    }

    /// Stop on error without advancing the step counter
    fn halt(&mut self, error: VisError) -> VisError {
        log::warn!("Playback halted at step {}: {error}", self.step);
        self.matchbox.cancel_all();
        self.stage = None;
        self.phase = PlaybackPhase::Paused;
        error
    }

    fn run_stage(&mut self, stage: Stage) -> Result<Flow> {
        let palette = self.settings.palette;
        let fade_ms = self.settings.style_fade_ms;
        let speed = self.settings.effective_speed();

        Ok(match stage {
            Stage::Replaying(mut progress) | Stage::Swapping(mut progress) => {
                match self.matchbox.poll_swap(&mut progress, &palette, fade_ms)? {
                    JoinState::Ready => Flow::Next(self.complete_step()?),
                    JoinState::Pending => Flow::Wait(Stage::Swapping(progress)),
                    JoinState::Cancelled => Flow::Interrupted,
                }
            }
            Stage::BeginStep => {
                let Some(step) = self.trace.get(self.step) else {
                    let ids = self.matchbox.ids();
                    let (join, error) =
                        self.matchbox
                            .style_many(&ids, palette.base, MATCH_BASE_ALPHA, fade_ms);
                    return match error {
                        Some(e) => Err(e),
                        None => Ok(Flow::Next(Stage::Closing(join))),
                    };
                };
                log::debug!("step {}/{}", self.step + 1, self.trace.len());
                let highlighted = step.highlighted.clone();
                let scope: HashSet<EntityId> = highlighted.iter().copied().collect();
                let rest: Vec<EntityId> = self
                    .matchbox
                    .ids()
                    .into_iter()
                    .filter(|id| !scope.contains(id))
                    .collect();

                let (mut join, error) = self.matchbox.style_many(
                    &highlighted,
                    palette.highlighted,
                    MATCH_ACTIVE_ALPHA,
                    fade_ms,
                );
                let (rest_join, rest_error) =
                    self.matchbox
                        .style_many(&rest, palette.base, MATCH_BASE_ALPHA, fade_ms);
                join.append(rest_join);
                if let Some(e) = error.or(rest_error) {
                    return Err(e);
                }
                Flow::Next(Stage::Scoping(join))
            }
            Stage::Scoping(mut join) => match await_join(&mut join, &mut self.matchbox) {
                JoinState::Ready => Flow::Next(Stage::Comparing(self.style_compared()?)),
                JoinState::Pending => Flow::Wait(Stage::Scoping(join)),
                JoinState::Cancelled => Flow::Interrupted,
            },
            Stage::Comparing(mut join) => match await_join(&mut join, &mut self.matchbox) {
                JoinState::Ready => {
                    let settle = scaled_duration(SETTLE_BASE_MS, speed);
                    let mut join = Join::new();
                    join.push(self.matchbox.scheduler_mut().delay(settle));
                    Flow::Next(Stage::Settling(join))
                }
                JoinState::Pending => Flow::Wait(Stage::Comparing(join)),
                JoinState::Cancelled => Flow::Interrupted,
            },
            Stage::Settling(mut join) => match await_join(&mut join, &mut self.matchbox) {
                JoinState::Ready => {
                    let step = self.current()?;
                    if step.swapped {
                        let &[first, second] = step.compared.as_slice() else {
                            return Err(VisError::invalid_input(format!(
                                "swap step {} compares {} matches",
                                self.step,
                                step.compared.len()
                            )));
                        };
                        Flow::Next(Stage::Swapping(
                            self.matchbox.begin_swap(first, second, speed)?,
                        ))
                    } else {
                        Flow::Next(self.complete_step()?)
                    }
                }
                JoinState::Pending => Flow::Wait(Stage::Settling(join)),
                JoinState::Cancelled => Flow::Interrupted,
            },
            Stage::Finishing(mut join) => match await_join(&mut join, &mut self.matchbox) {
                JoinState::Ready => {
                    self.step += 1;
                    Flow::Next(Stage::BeginStep)
                }
                JoinState::Pending => Flow::Wait(Stage::Finishing(join)),
                JoinState::Cancelled => {
                    self.step += 1;
                    Flow::Interrupted
                }
            },
            Stage::Closing(mut join) => match await_join(&mut join, &mut self.matchbox) {
                JoinState::Ready => Flow::Finished,
                JoinState::Pending => Flow::Wait(Stage::Closing(join)),
                JoinState::Cancelled => Flow::Interrupted,
            },
        })
    }

    fn current(&self) -> Result<Step> {
        self.trace.get(self.step).cloned().ok_or_else(|| {
            VisError::invalid_input(format!("no step {} in the trace", self.step))
        })
    }

    /// Paint the compared matches; the insertion sort key gets its own color
    fn style_compared(&mut self) -> Result<Join> {
        let step = self.current()?;
        let palette = self.settings.palette;
        let fade_ms = self.settings.style_fade_ms;
        let mut join = Join::new();
        for (i, &id) in step.compared.iter().enumerate() {
            let color = if i == 0
                && step.compared.len() == 2
                && self.settings.algorithm == SortAlgorithm::Insertion
            {
                palette.key
            } else {
                palette.compared
            };
            join.append(self.matchbox.style(id, color, MATCH_ACTIVE_ALPHA, fade_ms)?);
        }
        Ok(join)
    }

    /// Apply the step's relabeling (if any) and return every match to base
    fn complete_step(&mut self) -> Result<Stage> {
        let step = self.current()?;
        if let Some(merged) = &step.merged {
            self.matchbox.relabel(&step.compared, merged)?;
        }
        let palette = self.settings.palette;
        let ids = self.matchbox.ids();
        let (join, error) = self.matchbox.style_many(
            &ids,
            palette.base,
            MATCH_BASE_ALPHA,
            self.settings.style_fade_ms,
        );
        match error {
            Some(e) => Err(e),
            None => Ok(Stage::Finishing(join)),
        }
    }
}

/// Sort a copy of the matchbox's values and ids, returning the trace
fn generate_trace(algorithm: SortAlgorithm, matchbox: &Matchbox) -> Result<Vec<Step>> {
    let mut values = matchbox.values();
    let mut ids = matchbox.ids();
    algorithm.generate(&mut values, &mut ids)
}
