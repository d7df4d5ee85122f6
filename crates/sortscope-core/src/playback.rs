#![forbid(unsafe_code)]

//! Host-driven, single-threaded playback of a sort run.
//!
//! [`Playback`] wraps an owned [`SortRun`] and releases at most one step per
//! elapsed step interval. No threads, no sleeping, no `Instant`: the host
//! advances a deterministic clock and calls [`Playback::step`] from its own
//! loop (an animation frame, a terminal tick, a test).
//!
//! 1. Create with [`Playback::new`].
//! 2. Advance time via [`Playback::advance_time`].
//! 3. Call [`Playback::step`]; render [`Playback::array`] and
//!    [`Playback::highlighted`] when it reports an event.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use sortscope_core::{Algorithm, ArrayModel, Playback, SortEngine};
//!
//! let run = SortEngine::new()
//!     .run_algorithm(Algorithm::Bubble, ArrayModel::from_values(vec![2, 1]));
//! let mut playback = Playback::new(run, Duration::from_millis(50));
//!
//! // The first step is released immediately.
//! assert!(playback.step()?.event.is_some());
//! // Nothing more until the interval elapses.
//! assert!(playback.step()?.event.is_none());
//! playback.advance_time(Duration::from_millis(50));
//! assert!(playback.step()?.event.is_some());
//! # Ok::<(), sortscope_core::SortError>(())
//! ```

use core::time::Duration;

use crate::algorithm::Algorithm;
use crate::array::ArrayModel;
use crate::engine::{RunState, RunStats, SortRun};
use crate::error::Result;
use crate::step::StepEvent;

/// Result of a single [`Playback::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackStep {
    /// Whether more events may follow (false after `Done` or a fault).
    pub running: bool,
    /// The event released during this step, if the interval had elapsed.
    pub event: Option<StepEvent>,
    /// Number of events released so far (monotonically increasing).
    pub frame_idx: u64,
}

/// Cooperative driver for one owned sort run.
#[derive(Debug)]
pub struct Playback {
    run: SortRun<ArrayModel>,
    step_interval: Duration,
    now: Duration,
    last_step: Option<Duration>,
    frame_idx: u64,
}

impl Playback {
    /// Wrap `run`, releasing one event per `step_interval`.
    ///
    /// A zero interval releases one event per [`step`](Self::step) call.
    #[must_use]
    pub fn new(run: SortRun<ArrayModel>, step_interval: Duration) -> Self {
        Self {
            run,
            step_interval,
            now: Duration::ZERO,
            last_step: None,
            frame_idx: 0,
        }
    }

    /// Release the next event if the step interval has elapsed.
    ///
    /// A fault is returned as `Err` once; the playback then reports
    /// `running: false` forever.
    pub fn step(&mut self) -> Result<PlaybackStep> {
        if self.run.is_finished() || !self.due() {
            return Ok(self.result(None));
        }

        let event = match self.run.next_event() {
            Some(event) => event?,
            None => return Ok(self.result(None)),
        };
        self.last_step = Some(self.now);
        self.frame_idx += 1;
        Ok(self.result(Some(event)))
    }

    /// Release every remaining event regardless of the clock.
    ///
    /// Fails with the run's fault if it faulted, now or earlier.
    pub fn finish(&mut self) -> Result<RunStats> {
        if let Some(err) = self.run.fault() {
            return Err(err.clone());
        }
        while let Some(event) = self.run.next_event() {
            event?;
            self.frame_idx += 1;
        }
        Ok(self.run.stats())
    }

    /// Advance the deterministic clock by `dt`.
    pub fn advance_time(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    /// Set the deterministic clock to an absolute time.
    pub fn set_time(&mut self, now: Duration) {
        self.now = now;
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn step_interval(&self) -> Duration {
        self.step_interval
    }

    /// Change pacing mid-run; takes effect on the next step.
    pub fn set_step_interval(&mut self, interval: Duration) {
        self.step_interval = interval;
    }

    /// Bars to highlight for the most recent event.
    pub fn highlighted(&self) -> Option<(usize, usize)> {
        self.run.last_event().and_then(|e| e.highlighted())
    }

    pub fn last_event(&self) -> Option<StepEvent> {
        self.run.last_event()
    }

    pub fn array(&self) -> &ArrayModel {
        self.run.array()
    }

    pub fn algorithm(&self) -> Algorithm {
        self.run.algorithm()
    }

    pub fn state(&self) -> RunState {
        self.run.state()
    }

    pub fn stats(&self) -> RunStats {
        self.run.stats()
    }

    pub fn is_running(&self) -> bool {
        !self.run.is_finished()
    }

    pub fn frame_idx(&self) -> u64 {
        self.frame_idx
    }

    /// Stop early and take the array back.
    ///
    /// The array reflects every step released so far and nothing else.
    pub fn into_array(self) -> ArrayModel {
        crate::debug!(
            algorithm = self.run.algorithm().name(),
            state = ?self.run.state(),
            released = self.frame_idx,
            "playback ended"
        );
        self.run.into_array()
    }

    // --- Private helpers ---

    fn due(&self) -> bool {
        match self.last_step {
            None => true,
            Some(last) => self.now.saturating_sub(last) >= self.step_interval,
        }
    }

    fn result(&self, event: Option<StepEvent>) -> PlaybackStep {
        PlaybackStep {
            running: self.is_running(),
            event,
            frame_idx: self.frame_idx,
        }
    }
}
