#![forbid(unsafe_code)]

//! Array model: the fixed-length sequence a sort run mutates.
//!
//! # Invariants
//!
//! 1. Length never changes after construction.
//! 2. Every accessor bounds-checks and reports `IndexOutOfRange` instead of
//!    panicking.
//! 3. `swap(i, i)` is a no-op once `i` is known to be in range.
//!
//! # Failure Modes
//!
//! - `random` with zero length or an empty value range: `InvalidConfig`.
//! - Any out-of-range index: `IndexOutOfRange`.

use std::cmp::Ordering;
use std::ops::RangeInclusive;

use rand::Rng;

use crate::error::{Result, SortError};

/// Bar count used by the visualizer when nothing else is configured.
pub const DEFAULT_LEN: usize = 20;

/// Smallest generated value; keeps short bars visible.
pub const DEFAULT_MIN_VALUE: i32 = 10;

/// Largest generated value (a 200-row panel minus 20 rows of headroom,
/// offset by the minimum).
pub const DEFAULT_MAX_VALUE: i32 = 189;

/// The values being sorted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArrayModel {
    values: Vec<i32>,
}

impl ArrayModel {
    /// Fill a new array with values drawn uniformly from `range`.
    ///
    /// The random source is injected so callers control seeding.
    pub fn random<R: Rng>(
        len: usize,
        range: RangeInclusive<i32>,
        rng: &mut R,
    ) -> Result<Self> {
        if len == 0 {
            return Err(SortError::invalid_config("length must be at least 1"));
        }
        if range.is_empty() {
            return Err(SortError::invalid_config(format!(
                "value range {}..={} is empty",
                range.start(),
                range.end()
            )));
        }
        let values = (0..len).map(|_| rng.gen_range(range.clone())).collect();
        Ok(Self { values })
    }

    /// Wrap caller-supplied values. Any length is accepted, including zero.
    #[must_use]
    pub fn from_values(values: Vec<i32>) -> Self {
        Self { values }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Read-only view for renderers.
    #[inline]
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    pub fn into_values(self) -> Vec<i32> {
        self.values
    }

    pub fn get(&self, index: usize) -> Result<i32> {
        self.values
            .get(index)
            .copied()
            .ok_or(SortError::IndexOutOfRange {
                index,
                len: self.len(),
            })
    }

    /// Compare the values at `i` and `j` without mutating anything.
    pub fn compare(&self, i: usize, j: usize) -> Result<Ordering> {
        let a = self.get(i)?;
        let b = self.get(j)?;
        Ok(a.cmp(&b))
    }

    /// Exchange the values at `i` and `j` in place.
    pub fn swap(&mut self, i: usize, j: usize) -> Result<()> {
        self.check(i)?;
        self.check(j)?;
        if i != j {
            self.values.swap(i, j);
        }
        Ok(())
    }

    pub fn min_value(&self) -> Option<i32> {
        self.values.iter().copied().min()
    }

    pub fn max_value(&self) -> Option<i32> {
        self.values.iter().copied().max()
    }

    /// Non-descending order check.
    pub fn is_sorted(&self) -> bool {
        self.values.windows(2).all(|w| w[0] <= w[1])
    }

    fn check(&self, index: usize) -> Result<()> {
        if index < self.len() {
            Ok(())
        } else {
            Err(SortError::IndexOutOfRange {
                index,
                len: self.len(),
            })
        }
    }
}

impl From<Vec<i32>> for ArrayModel {
    fn from(values: Vec<i32>) -> Self {
        Self::from_values(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn random_rejects_zero_length() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = ArrayModel::random(0, 1..=10, &mut rng).unwrap_err();
        assert!(matches!(err, SortError::InvalidConfig { .. }));
    }

    #[test]
    #[allow(clippy::reversed_empty_ranges)]
    fn random_rejects_empty_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = ArrayModel::random(5, 10..=1, &mut rng).unwrap_err();
        assert!(err.to_string().contains("10..=1"));
    }

    #[test]
    fn random_values_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let array = ArrayModel::random(500, -3..=3, &mut rng).unwrap();
        assert_eq!(array.len(), 500);
        assert!(array.values().iter().all(|v| (-3..=3).contains(v)));
    }

    #[test]
    fn random_single_value_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let array = ArrayModel::random(4, 9..=9, &mut rng).unwrap();
        assert_eq!(array.values(), &[9, 9, 9, 9]);
    }

    #[test]
    fn same_seed_same_contents() {
        let a = ArrayModel::random(
            DEFAULT_LEN,
            DEFAULT_MIN_VALUE..=DEFAULT_MAX_VALUE,
            &mut StdRng::seed_from_u64(99),
        )
        .unwrap();
        let b = ArrayModel::random(
            DEFAULT_LEN,
            DEFAULT_MIN_VALUE..=DEFAULT_MAX_VALUE,
            &mut StdRng::seed_from_u64(99),
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn get_out_of_range() {
        let array = ArrayModel::from_values(vec![1, 2]);
        assert_eq!(array.get(1), Ok(2));
        assert_eq!(
            array.get(2),
            Err(SortError::IndexOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn compare_orders_values() {
        let array = ArrayModel::from_values(vec![4, 2, 4]);
        assert_eq!(array.compare(0, 1), Ok(Ordering::Greater));
        assert_eq!(array.compare(1, 0), Ok(Ordering::Less));
        assert_eq!(array.compare(0, 2), Ok(Ordering::Equal));
        assert!(array.compare(0, 3).is_err());
    }

    #[test]
    fn swap_exchanges_values() {
        let mut array = ArrayModel::from_values(vec![1, 2, 3]);
        array.swap(0, 2).unwrap();
        assert_eq!(array.values(), &[3, 2, 1]);
    }

    #[test]
    fn swap_same_index_is_noop() {
        let mut array = ArrayModel::from_values(vec![1, 2, 3]);
        array.swap(1, 1).unwrap();
        assert_eq!(array.values(), &[1, 2, 3]);
    }

    #[test]
    fn swap_out_of_range_leaves_array_untouched() {
        let mut array = ArrayModel::from_values(vec![1, 2, 3]);
        let err = array.swap(0, 3).unwrap_err();
        assert_eq!(err, SortError::IndexOutOfRange { index: 3, len: 3 });
        assert_eq!(array.values(), &[1, 2, 3]);
        assert!(array.swap(5, 5).is_err());
    }

    #[test]
    fn extremes_and_sortedness() {
        let array = ArrayModel::from_values(vec![3, -1, 7]);
        assert_eq!(array.min_value(), Some(-1));
        assert_eq!(array.max_value(), Some(7));
        assert!(!array.is_sorted());
        assert!(ArrayModel::from_values(vec![1, 1, 2]).is_sorted());
        assert!(ArrayModel::default().is_sorted());
        assert_eq!(ArrayModel::default().max_value(), None);
    }
}
