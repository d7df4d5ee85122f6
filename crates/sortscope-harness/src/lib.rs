#![forbid(unsafe_code)]

//! Terminal harness for SortScope.
//!
//! Paints a sort run as a bar chart (highlighted bars in red, the rest in
//! blue), optionally records every step as JSONL, and prints a summary.
//! The `sortscope` binary wires these pieces to environment variables; the
//! library surface exists so the pieces can be tested without a terminal.

pub mod app;
pub mod options;
pub mod render;
pub mod trace;

pub use app::{Summary, run};
pub use options::{HarnessOptions, TraceTarget};
