#![forbid(unsafe_code)]

//! The step-emitting sort engine.
//!
//! [`SortEngine::run`] returns a [`SortRun`]: an iterator that performs no
//! work until pulled and then exactly one algorithm step per pull. Pacing is
//! entirely up to the consumer.
//!
//! # Lifecycle
//!
//! `Idle -> Running -> {Completed | Faulted}`
//!
//! 1. A fresh run is `Idle`; the array has not been touched.
//! 2. The first pull moves it to `Running`.
//! 3. Yielding `Done` moves it to `Completed`; further pulls yield `None`.
//! 4. Any array error is yielded once as `Err`, the run becomes `Faulted`,
//!    and further pulls yield `None`. Nothing is retried.
//!
//! A run borrows its array exclusively (`&mut ArrayModel`) or owns it
//! (`ArrayModel`); either way nothing else can mutate it mid-run.

use std::borrow::{Borrow, BorrowMut};
use std::fmt;

use crate::algorithm::{Algorithm, Stepper};
use crate::array::ArrayModel;
use crate::error::{Result, SortError};
use crate::step::StepEvent;

/// Where a run is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Faulted,
}

impl RunState {
    /// Completed or faulted.
    #[inline]
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Faulted)
    }
}

/// Counters accumulated while a run emits events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunStats {
    pub compares: u64,
    pub swaps: u64,
}

impl RunStats {
    /// Events emitted so far, excluding the terminal `Done`.
    #[inline]
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.compares + self.swaps
    }

    pub(crate) fn record(&mut self, event: &StepEvent) {
        match event {
            StepEvent::Compare { .. } => self.compares += 1,
            StepEvent::Swap { .. } => self.swaps += 1,
            StepEvent::Done => {}
        }
    }
}

/// Entry point for starting sort runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortEngine;

impl SortEngine {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Start a run for the algorithm named `algorithm`.
    ///
    /// Unknown names fail with `UnknownAlgorithm` before the array is
    /// touched.
    pub fn run<A>(&self, algorithm: &str, array: A) -> Result<SortRun<A>>
    where
        A: BorrowMut<ArrayModel>,
    {
        let algorithm = algorithm.parse::<Algorithm>()?;
        Ok(self.run_algorithm(algorithm, array))
    }

    /// Start a run for an already-selected algorithm.
    pub fn run_algorithm<A>(&self, algorithm: Algorithm, array: A) -> SortRun<A>
    where
        A: BorrowMut<ArrayModel>,
    {
        SortRun {
            algorithm,
            stepper: algorithm.stepper(),
            array,
            state: RunState::Idle,
            stats: RunStats::default(),
            last_event: None,
            fault: None,
        }
    }
}

/// A lazy sequence of [`StepEvent`]s for one sort of one array.
pub struct SortRun<A> {
    algorithm: Algorithm,
    stepper: Box<dyn Stepper + Send>,
    array: A,
    state: RunState,
    stats: RunStats,
    last_event: Option<StepEvent>,
    fault: Option<SortError>,
}

impl<A: BorrowMut<ArrayModel>> SortRun<A> {
    /// Pull one event, or `None` once the run has finished.
    pub fn next_event(&mut self) -> Option<Result<StepEvent>> {
        match self.state {
            RunState::Completed | RunState::Faulted => return None,
            RunState::Idle => {
                crate::debug!(
                    algorithm = self.algorithm.name(),
                    len = self.array.borrow().len(),
                    "sort run started"
                );
                self.state = RunState::Running;
            }
            RunState::Running => {}
        }

        match self.stepper.step(self.array.borrow_mut()) {
            Ok(event) => {
                self.stats.record(&event);
                self.last_event = Some(event);
                crate::trace!(
                    algorithm = self.algorithm.name(),
                    step = self.stats.steps(),
                    event = %event,
                    "sort step"
                );
                if event.is_terminal() {
                    self.state = RunState::Completed;
                    crate::debug!(
                        algorithm = self.algorithm.name(),
                        compares = self.stats.compares,
                        swaps = self.stats.swaps,
                        "sort run completed"
                    );
                }
                Some(Ok(event))
            }
            Err(err) => {
                self.state = RunState::Faulted;
                crate::error!(
                    algorithm = self.algorithm.name(),
                    error = %err,
                    "sort run faulted"
                );
                self.fault = Some(err.clone());
                Some(Err(err))
            }
        }
    }

    /// Drain the remaining events, returning the final stats.
    ///
    /// A run that already faulted returns its fault again.
    pub fn run_to_end(&mut self) -> Result<RunStats> {
        if let Some(err) = &self.fault {
            return Err(err.clone());
        }
        while let Some(event) = self.next_event() {
            event?;
        }
        Ok(self.stats)
    }

    /// Read-only view of the array between pulls.
    pub fn array(&self) -> &ArrayModel {
        self.array.borrow()
    }

    /// Give the array (or the borrow) back, ending the run.
    pub fn into_array(self) -> A {
        self.array
    }
}

impl<A> SortRun<A> {
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// The most recent event, for highlighting.
    pub fn last_event(&self) -> Option<StepEvent> {
        self.last_event
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// The error that ended the run, if it faulted.
    pub fn fault(&self) -> Option<&SortError> {
        self.fault.as_ref()
    }
}

impl<A: BorrowMut<ArrayModel>> Iterator for SortRun<A> {
    type Item = Result<StepEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event()
    }
}

impl<A: BorrowMut<ArrayModel>> std::iter::FusedIterator for SortRun<A> {}

impl<A> fmt::Debug for SortRun<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortRun")
            .field("algorithm", &self.algorithm)
            .field("state", &self.state)
            .field("stats", &self.stats)
            .field("last_event", &self.last_event)
            .finish_non_exhaustive()
    }
}

/// Stepper that reaches past the end of the array; used to exercise the
/// fault path.
#[cfg(test)]
pub(crate) struct OutOfBounds;

#[cfg(test)]
impl Stepper for OutOfBounds {
    fn step(&mut self, array: &mut ArrayModel) -> Result<StepEvent> {
        let len = array.len();
        array.swap(0, len)?;
        Ok(StepEvent::Swap { i: 0, j: len })
    }
}

#[cfg(test)]
impl<A> SortRun<A> {
    pub(crate) fn with_stepper(mut self, stepper: Box<dyn Stepper + Send>) -> Self {
        self.stepper = stepper;
        self
    }
}
