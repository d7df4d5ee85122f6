#![forbid(unsafe_code)]

//! Step events: one record per atomic action of a sort run.

use std::fmt;

/// One observable action taken by a sort run.
///
/// Events carry the indices they touch so a renderer can highlight exactly
/// those bars. By the time a `Swap` is observed the values have already
/// been exchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum StepEvent {
    /// Values at `i` and `j` were compared. Nothing moved.
    Compare { i: usize, j: usize },
    /// Values at `i` and `j` were exchanged.
    Swap { i: usize, j: usize },
    /// The array is sorted. Always the last event of a run.
    Done,
}

impl StepEvent {
    /// Indices to highlight, if any.
    #[must_use]
    pub const fn highlighted(&self) -> Option<(usize, usize)> {
        match *self {
            Self::Compare { i, j } | Self::Swap { i, j } => Some((i, j)),
            Self::Done => None,
        }
    }

    /// Whether `index` is one of the bars this event touches.
    #[must_use]
    pub fn touches(&self, index: usize) -> bool {
        self.highlighted()
            .is_some_and(|(i, j)| i == index || j == index)
    }

    #[inline]
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    #[inline]
    #[must_use]
    pub const fn is_compare(&self) -> bool {
        matches!(self, Self::Compare { .. })
    }

    #[inline]
    #[must_use]
    pub const fn is_swap(&self) -> bool {
        matches!(self, Self::Swap { .. })
    }
}

impl fmt::Display for StepEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare { i, j } => write!(f, "compare({i}, {j})"),
            Self::Swap { i, j } => write!(f, "swap({i}, {j})"),
            Self::Done => f.write_str("done"),
        }
    }
}
