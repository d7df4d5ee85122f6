#![forbid(unsafe_code)]

//! Harness-only settings read from the environment.
//!
//! Run settings (algorithm, size, pacing, driver) live in
//! [`sortscope_core::RunConfig`]; these only control presentation.
//! Malformed values fall back to defaults.

use std::path::PathBuf;

use crate::render::DEFAULT_CHART_HEIGHT;

/// Where the JSONL trace goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceTarget {
    Stdout,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessOptions {
    /// Skip the bar chart; print only the summary.
    pub headless: bool,
    pub trace: Option<TraceTarget>,
    pub chart_height: u16,
    /// Emit logs as JSON instead of human-readable lines.
    pub log_json: bool,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            headless: false,
            trace: None,
            chart_height: DEFAULT_CHART_HEIGHT,
            log_json: false,
        }
    }
}

impl HarnessOptions {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let trace = env_string(&lookup, "SORTSCOPE_TRACE_JSONL").map(|value| {
            if value == "-" {
                TraceTarget::Stdout
            } else {
                TraceTarget::File(PathBuf::from(value))
            }
        });
        let chart_height = env_u64(&lookup, "SORTSCOPE_CHART_HEIGHT")
            .and_then(|h| u16::try_from(h).ok())
            .filter(|&h| h > 0)
            .unwrap_or(defaults.chart_height);

        Self {
            headless: env_flag(&lookup, "SORTSCOPE_HEADLESS").unwrap_or(defaults.headless),
            trace,
            chart_height,
            log_json: env_flag(&lookup, "SORTSCOPE_LOG_JSON").unwrap_or(defaults.log_json),
        }
    }

    /// Whether the trace shares stdout, pushing chart and summary to stderr.
    pub fn trace_on_stdout(&self) -> bool {
        matches!(self.trace, Some(TraceTarget::Stdout))
    }
}

fn env_flag(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<bool> {
    let value = lookup(name)?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let enabled = matches!(
        trimmed,
        "1" | "true" | "TRUE" | "True" | "yes" | "YES" | "on" | "ON"
    );
    Some(enabled)
}

fn env_u64(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<u64> {
    lookup(name).and_then(|value| value.trim().parse::<u64>().ok())
}

fn env_string(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
