#![forbid(unsafe_code)]

//! Sort algorithms as resumable state machines.
//!
//! Each machine owns only its loop counters. One call to [`Stepper::step`]
//! performs a single compare or swap against the array and returns the
//! matching [`StepEvent`]; the machine then suspends until the next call.
//!
//! # Invariants
//!
//! 1. A `Swap` event is returned only after the swap has been applied.
//! 2. Equal values are never swapped, so every algorithm is stable.
//! 3. Once a machine returns `Done` it keeps returning `Done`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::array::ArrayModel;
use crate::error::{Result, SortError};
use crate::step::StepEvent;

/// The algorithms a run can animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Algorithm {
    #[default]
    Bubble,
    Selection,
    Insertion,
}

impl Algorithm {
    pub const ALL: [Self; 3] = [Self::Bubble, Self::Selection, Self::Insertion];

    /// Canonical lowercase name, as accepted by [`SortEngine::run`].
    ///
    /// [`SortEngine::run`]: crate::SortEngine::run
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bubble => "bubble",
            Self::Selection => "selection",
            Self::Insertion => "insertion",
        }
    }

    /// Human-facing label used by menus.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bubble => "Bubble Sort",
            Self::Selection => "Selection Sort",
            Self::Insertion => "Insertion Sort",
        }
    }

    pub(crate) fn stepper(self) -> Box<dyn Stepper + Send> {
        match self {
            Self::Bubble => Box::new(BubbleSort::default()),
            Self::Selection => Box::new(SelectionSort::default()),
            Self::Insertion => Box::new(InsertionSort::default()),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = SortError;

    /// Accepts the canonical names and the menu labels, ignoring case.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        let base = normalized
            .strip_suffix("sort")
            .map(|rest| rest.trim_end_matches([' ', '-', '_']))
            .unwrap_or(&normalized);
        match base {
            "bubble" => Ok(Self::Bubble),
            "selection" => Ok(Self::Selection),
            "insertion" => Ok(Self::Insertion),
            _ => Err(SortError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// One resumable algorithm.
pub(crate) trait Stepper {
    /// Perform one action and describe it.
    fn step(&mut self, array: &mut ArrayModel) -> Result<StepEvent>;
}

// ── Bubble sort ─────────────────────────────────────────────────────────

/// Pass `pass` compares `j, j+1` for `j` in `0..n-pass-1`.
#[derive(Debug, Default)]
struct BubbleSort {
    pass: usize,
    j: usize,
    swap_pending: bool,
}

impl BubbleSort {
    fn advance(&mut self, n: usize) {
        self.j += 1;
        if self.j + self.pass + 1 >= n {
            self.pass += 1;
            self.j = 0;
        }
    }
}

impl Stepper for BubbleSort {
    fn step(&mut self, array: &mut ArrayModel) -> Result<StepEvent> {
        let n = array.len();
        if self.swap_pending {
            self.swap_pending = false;
            let (i, j) = (self.j, self.j + 1);
            array.swap(i, j)?;
            self.advance(n);
            return Ok(StepEvent::Swap { i, j });
        }
        if self.pass + 1 >= n {
            return Ok(StepEvent::Done);
        }
        let (i, j) = (self.j, self.j + 1);
        if array.compare(i, j)? == Ordering::Greater {
            self.swap_pending = true;
        } else {
            self.advance(n);
        }
        Ok(StepEvent::Compare { i, j })
    }
}

// ── Selection sort ──────────────────────────────────────────────────────

#[derive(Debug)]
struct SelectionSort {
    i: usize,
    j: usize,
    min: usize,
}

impl Default for SelectionSort {
    fn default() -> Self {
        Self { i: 0, j: 1, min: 0 }
    }
}

impl SelectionSort {
    fn next_position(&mut self) {
        self.i += 1;
        self.min = self.i;
        self.j = self.i + 1;
    }
}

impl Stepper for SelectionSort {
    fn step(&mut self, array: &mut ArrayModel) -> Result<StepEvent> {
        let n = array.len();
        loop {
            if self.i + 1 >= n {
                return Ok(StepEvent::Done);
            }
            if self.j < n {
                let (j, min) = (self.j, self.min);
                // Strict less-than keeps the earlier index on ties.
                if array.compare(j, min)? == Ordering::Less {
                    self.min = j;
                }
                self.j += 1;
                return Ok(StepEvent::Compare { i: j, j: min });
            }
            let (min, i) = (self.min, self.i);
            self.next_position();
            if min != i {
                array.swap(min, i)?;
                return Ok(StepEvent::Swap { i: min, j: i });
            }
        }
    }
}

// ── Insertion sort ──────────────────────────────────────────────────────

/// Sinks element `i` leftward by adjacent swaps.
#[derive(Debug)]
struct InsertionSort {
    i: usize,
    j: usize,
    swap_pending: bool,
}

impl Default for InsertionSort {
    fn default() -> Self {
        Self {
            i: 1,
            j: 1,
            swap_pending: false,
        }
    }
}

impl InsertionSort {
    fn next_element(&mut self) {
        self.i += 1;
        self.j = self.i;
    }
}

impl Stepper for InsertionSort {
    fn step(&mut self, array: &mut ArrayModel) -> Result<StepEvent> {
        let n = array.len();
        if self.swap_pending {
            self.swap_pending = false;
            let (i, j) = (self.j - 1, self.j);
            array.swap(i, j)?;
            self.j -= 1;
            if self.j == 0 {
                self.next_element();
            }
            return Ok(StepEvent::Swap { i, j });
        }
        if self.i >= n {
            return Ok(StepEvent::Done);
        }
        let (i, j) = (self.j - 1, self.j);
        if array.compare(i, j)? == Ordering::Greater {
            self.swap_pending = true;
        } else {
            self.next_element();
        }
        Ok(StepEvent::Compare { i, j })
    }
}
