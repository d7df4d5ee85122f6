#![forbid(unsafe_code)]

//! Core: array model, step events, and the pull-based sort engine.
//!
//! A sort run is a lazy sequence of [`StepEvent`]s. Each pull performs
//! exactly one compare or swap against the [`ArrayModel`] and reports it,
//! so any renderer can highlight the bars involved without knowing the
//! algorithm's internals.
//!
//! # Drivers
//!
//! - [`SortRun`] - plain iterator; the consumer decides when to pull.
//! - [`Playback`] - cooperative driver ticked from a host event loop.
//! - [`SortWorker`] - producer thread feeding a bounded channel.
//!
//! # Example
//!
//! ```
//! use sortscope_core::{ArrayModel, SortEngine, StepEvent};
//!
//! let mut array = ArrayModel::from_values(vec![5, 3, 8, 1]);
//! let events: Vec<StepEvent> = SortEngine::new()
//!     .run("bubble", &mut array)?
//!     .collect::<Result<_, _>>()?;
//!
//! assert_eq!(events.last(), Some(&StepEvent::Done));
//! assert_eq!(array.values(), &[1, 3, 5, 8]);
//! # Ok::<(), sortscope_core::SortError>(())
//! ```

pub mod algorithm;
pub mod array;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod playback;
pub mod step;
pub mod worker;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, error, trace, warn};

pub use algorithm::Algorithm;
pub use array::ArrayModel;
pub use config::{DriverMode, RunConfig};
pub use engine::{RunState, RunStats, SortEngine, SortRun};
pub use error::{Result, SortError};
pub use playback::{Playback, PlaybackStep};
pub use step::StepEvent;
pub use worker::{SortWorker, WorkerOutcome};
