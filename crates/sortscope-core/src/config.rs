#![forbid(unsafe_code)]

//! Run configuration parsed from environment variables.
//!
//! | var | meaning | default |
//! |-----|---------|---------|
//! | `SORTSCOPE_ALGORITHM` | algorithm name | `bubble` |
//! | `SORTSCOPE_LEN` | bar count | 20 |
//! | `SORTSCOPE_MIN` / `SORTSCOPE_MAX` | inclusive value range | 10 / 189 |
//! | `SORTSCOPE_SEED` | RNG seed (entropy when unset) | unset |
//! | `SORTSCOPE_STEP_MS` | delay per step | 50 |
//! | `SORTSCOPE_MODE` | `cooperative` or `threaded` | `cooperative` |
//! | `SORTSCOPE_CHANNEL_CAPACITY` | worker channel bound | 16 |
//! | `SORTSCOPE_MAX_STEPS` | cancel after this many steps | unset |
//!
//! Empty values count as unset. Values that are set but malformed are
//! rejected with `InvalidConfig` rather than silently defaulted.

use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::algorithm::Algorithm;
use crate::array::{ArrayModel, DEFAULT_LEN, DEFAULT_MAX_VALUE, DEFAULT_MIN_VALUE};
use crate::error::{Result, SortError};

/// Default pause between steps.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(50);

/// Default bound of the worker channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// How the consumer drives a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverMode {
    /// One step per host tick on the caller's thread.
    #[default]
    Cooperative,
    /// Worker thread feeding a bounded channel.
    Threaded,
}

impl FromStr for DriverMode {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cooperative" | "coop" | "tick" => Ok(Self::Cooperative),
            "threaded" | "thread" | "worker" => Ok(Self::Threaded),
            other => Err(SortError::invalid_config(format!(
                "unknown driver mode {other:?}"
            ))),
        }
    }
}

/// Everything needed to set up and pace one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub algorithm: Algorithm,
    pub len: usize,
    pub min_value: i32,
    pub max_value: i32,
    pub seed: Option<u64>,
    pub step_delay: Duration,
    pub mode: DriverMode,
    pub channel_capacity: usize,
    pub max_steps: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            len: DEFAULT_LEN,
            min_value: DEFAULT_MIN_VALUE,
            max_value: DEFAULT_MAX_VALUE,
            seed: None,
            step_delay: DEFAULT_STEP_DELAY,
            mode: DriverMode::default(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            max_steps: None,
        }
    }
}

impl RunConfig {
    /// Read the `SORTSCOPE_*` variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name).and_then(|value| {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
        };

        let mut config = Self::default();
        if let Some(name) = get("SORTSCOPE_ALGORITHM") {
            config.algorithm = name.parse()?;
        }
        if let Some(len) = parse_var(&get, "SORTSCOPE_LEN")? {
            config.len = len;
        }
        if let Some(min) = parse_var(&get, "SORTSCOPE_MIN")? {
            config.min_value = min;
        }
        if let Some(max) = parse_var(&get, "SORTSCOPE_MAX")? {
            config.max_value = max;
        }
        config.seed = parse_var(&get, "SORTSCOPE_SEED")?;
        if let Some(ms) = parse_var::<u64>(&get, "SORTSCOPE_STEP_MS")? {
            config.step_delay = Duration::from_millis(ms);
        }
        if let Some(mode) = get("SORTSCOPE_MODE") {
            config.mode = mode.parse()?;
        }
        if let Some(capacity) = parse_var(&get, "SORTSCOPE_CHANNEL_CAPACITY")? {
            config.channel_capacity = capacity;
        }
        config.max_steps = parse_var(&get, "SORTSCOPE_MAX_STEPS")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings no run could start with.
    pub fn validate(&self) -> Result<()> {
        if self.len == 0 {
            return Err(SortError::invalid_config("length must be at least 1"));
        }
        if self.min_value > self.max_value {
            return Err(SortError::invalid_config(format!(
                "min value {} exceeds max value {}",
                self.min_value, self.max_value
            )));
        }
        if self.channel_capacity == 0 {
            return Err(SortError::invalid_config(
                "channel capacity must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn value_range(&self) -> RangeInclusive<i32> {
        self.min_value..=self.max_value
    }

    /// Build the random array this configuration describes.
    ///
    /// Seeded configs always produce the same contents.
    pub fn build_array(&self) -> Result<ArrayModel> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        ArrayModel::random(self.len, self.value_range(), &mut rng)
    }
}

fn parse_var<T>(get: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: FromStr,
{
    let Some(raw) = get(name) else {
        return Ok(None);
    };
    raw.parse::<T>()
        .map(Some)
        .map_err(|_| SortError::invalid_config(format!("{name}={raw:?} is not a valid number")))
}
