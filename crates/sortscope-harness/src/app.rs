#![forbid(unsafe_code)]

//! One harness run: build the array, drive the sort, paint, trace, summarize.
//!
//! # Drivers
//!
//! - Cooperative: a [`Playback`] stepped from this thread. The loop sleeps
//!   for the step delay and advances the playback clock by the same amount.
//! - Threaded: a [`SortWorker`] feeding events through a bounded channel.
//!   The harness mirrors the array locally by replaying `Swap` events, so
//!   the chart never reads the worker's array.
//!
//! # Failure Modes
//!
//! - Bad configuration maps to `io::ErrorKind::InvalidInput`.
//! - Engine faults and a panicked worker map to `io::ErrorKind::Other`.
//! - A step cap (`max_steps`) is not a failure: the run is cancelled and the
//!   summary reports `cancelled: true`.

use std::fmt;
use std::io::{self, Write};
use std::thread;

use serde::Serialize;
use sortscope_core::{
    Algorithm, ArrayModel, DriverMode, Playback, RunConfig, RunState, RunStats, SortEngine,
    SortError, SortRun, SortWorker, StepEvent,
};
use tracing::{info, warn};

use crate::options::HarnessOptions;
use crate::render::{BarChart, TerminalChart};
use crate::trace::TraceWriter;

/// Outcome of a harness run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub algorithm: Algorithm,
    pub len: usize,
    pub state: RunState,
    /// Steps the engine performed. In threaded mode a cancelled worker may
    /// have run ahead of what the harness observed.
    pub stats: RunStats,
    /// Events the harness consumed, including `Done`.
    pub observed: u64,
    /// The step cap stopped the harness before it saw `Done`, even if the
    /// engine itself went on to finish.
    pub cancelled: bool,
    pub sorted: bool,
    pub values: Vec<i32>,
}

impl Summary {
    fn new(
        algorithm: Algorithm,
        state: RunState,
        stats: RunStats,
        observed: u64,
        cancelled: bool,
        array: ArrayModel,
    ) -> Self {
        Self {
            algorithm,
            len: array.len(),
            state,
            stats,
            observed,
            cancelled,
            sorted: array.is_sorted(),
            values: array.into_values(),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Completed => "completed",
            RunState::Faulted => "faulted",
        };
        write!(
            f,
            "{}: {} bars, {} compares, {} swaps, {}",
            self.algorithm.label(),
            self.len,
            self.stats.compares,
            self.stats.swaps,
            state
        )?;
        if self.cancelled {
            write!(f, " (cancelled after {} events)", self.observed)?;
        }
        if self.sorted {
            f.write_str(", sorted")
        } else {
            f.write_str(", not sorted")
        }
    }
}

/// Map an engine error onto the harness's `io::Result` surface.
pub fn into_io_error(err: SortError) -> io::Error {
    let kind = if err.is_caller_correctable() {
        io::ErrorKind::InvalidInput
    } else {
        io::ErrorKind::Other
    };
    io::Error::new(kind, err)
}

/// Run one sort as described by `config`.
///
/// The chart (unless headless) and the summary line go to `display`; step
/// records go to `trace` when given.
pub fn run<D, T>(
    config: &RunConfig,
    options: &HarnessOptions,
    display: D,
    trace: Option<T>,
) -> io::Result<Summary>
where
    D: Write,
    T: Write,
{
    config.validate().map_err(into_io_error)?;
    let array = config.build_array().map_err(into_io_error)?;
    info!(
        algorithm = config.algorithm.name(),
        len = array.len(),
        seed = ?config.seed,
        mode = ?config.mode,
        "starting sort"
    );

    let mut session = Session {
        display,
        chart: (!options.headless)
            .then(|| TerminalChart::new(BarChart::new(options.chart_height))),
        trace: trace.map(|writer| TraceWriter::new(writer, config.algorithm)),
        algorithm: config.algorithm,
        max_steps: config.max_steps,
        observed: 0,
    };

    let run = SortEngine::new().run_algorithm(config.algorithm, array);
    let summary = match config.mode {
        DriverMode::Cooperative => drive_cooperative(run, config, &mut session)?,
        DriverMode::Threaded => drive_threaded(run, config, &mut session)?,
    };

    if summary.cancelled {
        warn!(observed = summary.observed, "step cap reached, run cancelled");
    }
    info!(
        algorithm = summary.algorithm.name(),
        compares = summary.stats.compares,
        swaps = summary.stats.swaps,
        sorted = summary.sorted,
        "sort finished"
    );
    session.finish(&summary)?;
    Ok(summary)
}

fn drive_cooperative<D: Write, T: Write>(
    run: SortRun<ArrayModel>,
    config: &RunConfig,
    session: &mut Session<D, T>,
) -> io::Result<Summary> {
    let mut playback = Playback::new(run, config.step_delay);
    session.draw(playback.array(), None)?;

    let mut cut_short = false;
    while playback.is_running() {
        if session.cap_reached() {
            cut_short = true;
            break;
        }
        let step = playback.step().map_err(into_io_error)?;
        if let Some(event) = step.event {
            session.observe(playback.array(), event)?;
        }
        if step.running {
            if !config.step_delay.is_zero() {
                thread::sleep(config.step_delay);
            }
            playback.advance_time(config.step_delay);
        }
    }

    let (state, stats, observed) = (playback.state(), playback.stats(), session.observed);
    Ok(Summary::new(
        config.algorithm,
        state,
        stats,
        observed,
        cut_short,
        playback.into_array(),
    ))
}

fn drive_threaded<D: Write, T: Write>(
    run: SortRun<ArrayModel>,
    config: &RunConfig,
    session: &mut Session<D, T>,
) -> io::Result<Summary> {
    let mut mirror = run.array().clone();
    let worker = SortWorker::spawn(run, config.channel_capacity, config.step_delay)
        .map_err(into_io_error)?;
    session.draw(&mirror, None)?;

    let (outcome, cut_short) = loop {
        if session.cap_reached() {
            break (worker.cancel().map_err(into_io_error)?, true);
        }
        match worker.recv() {
            Some(Ok(event)) => {
                if let StepEvent::Swap { i, j } = event {
                    mirror.swap(i, j).map_err(into_io_error)?;
                }
                session.observe(&mirror, event)?;
                if event.is_terminal() {
                    break (worker.join().map_err(into_io_error)?, false);
                }
            }
            Some(Err(err)) => {
                // The worker exits right after sending an error.
                if let Err(join_err) = worker.join() {
                    warn!(error = %join_err, "sort worker failed after a fault");
                }
                return Err(into_io_error(err));
            }
            None => break (worker.join().map_err(into_io_error)?, false),
        }
    };

    Ok(Summary::new(
        outcome.algorithm,
        outcome.state,
        outcome.stats,
        session.observed,
        cut_short,
        outcome.array,
    ))
}

/// Sinks shared by both drivers.
struct Session<D: Write, T: Write> {
    display: D,
    chart: Option<TerminalChart>,
    trace: Option<TraceWriter<T>>,
    algorithm: Algorithm,
    max_steps: Option<u64>,
    observed: u64,
}

impl<D: Write, T: Write> Session<D, T> {
    fn cap_reached(&self) -> bool {
        self.max_steps.is_some_and(|max| self.observed >= max)
    }

    fn observe(&mut self, array: &ArrayModel, event: StepEvent) -> io::Result<()> {
        self.observed += 1;
        if let Some(trace) = self.trace.as_mut() {
            trace.record(event)?;
        }
        self.draw(array, Some(event))
    }

    fn draw(&mut self, array: &ArrayModel, event: Option<StepEvent>) -> io::Result<()> {
        let Some(chart) = self.chart.as_mut() else {
            return Ok(());
        };
        let status = match event {
            Some(event) => format!(
                "{}  #{:<5} {}",
                self.algorithm.label(),
                self.observed,
                event
            ),
            None => format!("{}  ready", self.algorithm.label()),
        };
        chart.draw(
            &mut self.display,
            array,
            event.and_then(|e| e.highlighted()),
            &status,
        )
    }

    fn finish(mut self, summary: &Summary) -> io::Result<()> {
        if let Some(trace) = self.trace.take() {
            trace.finish(summary)?;
        }
        writeln!(self.display, "{summary}")?;
        self.display.flush()
    }
}
