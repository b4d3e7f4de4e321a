use crate::error::{Error, Result};

/// Ordering of a strictly monotonic slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Monotonic {
    /// Every value is greater than the one before
    Increasing,
    /// Every value is less than the one before
    Decreasing,
}

/// Extends functionality for slices of float arrays
pub trait SliceExt<T> {
    /// Find the minimum value in float arrays
    ///
    /// Only provides the minimum value from a collection of valid numbers. Any
    /// NAN values, infinite values, or empty slices will return an error.
    ///
    /// ```rust
    /// # use origami_utils::SliceExt;
    /// # use origami_utils::Error;
    /// // Successful cases
    /// assert_eq!([1.1, 0.5, 2.2].try_min(), Ok(0.5));
    /// assert_eq!([1.1, f64::MIN, 2.2].try_min(), Ok(f64::MIN));
    ///
    /// // Error cases
    /// assert_eq!([1.1, f64::NAN, 2.2].try_min(), Err(Error::SliceContainsUndefinedValues));
    /// assert_eq!([1.1, f64::INFINITY, 2.2].try_min(), Err(Error::SliceContainsUndefinedValues));
    /// assert_eq!(Vec::<f64>::new().try_min(), Err(Error::SliceContainsNoValues));
    /// ```
    ///
    /// The float primitives (`f32`/`f64`) do not implement `Ord`` due to `NaN`
    /// being incomparable. This extension uses `total_cmp` to always produce
    /// an ordering in accordance to the totalOrder predicate as defined in the
    /// IEEE 754 (2008 revision) floating point standard.
    fn try_min(&self) -> Result<T>;

    /// Find the maximum value in float arrays
    ///
    /// Only provides the maximum value from a collection of valid numbers. Any
    /// NAN values, infinite values, or empty slices will return an error.
    ///
    /// ```rust
    /// # use origami_utils::SliceExt;
    /// # use origami_utils::Error;
    /// // Successful cases
    /// assert_eq!([1.1, 0.5, 2.2].try_max(), Ok(2.2));
    /// assert_eq!([1.1, f64::MAX, 2.2].try_max(), Ok(f64::MAX));
    ///
    /// // Error cases
    /// assert_eq!([1.1, f64::NAN, 2.2].try_max(), Err(Error::SliceContainsUndefinedValues));
    /// assert_eq!(Vec::<f64>::new().try_max(), Err(Error::SliceContainsNoValues));
    /// ```
    fn try_max(&self) -> Result<T>;

    /// Check that every value is finite, i.e. not NAN or INFINITY
    ///
    /// ```rust
    /// # use origami_utils::SliceExt;
    /// assert!([1.0, -2.0, 0.0].all_finite());
    /// assert!(![1.0, f64::NAN].all_finite());
    /// assert!(Vec::<f64>::new().all_finite());
    /// ```
    fn all_finite(&self) -> bool;

    /// Determine the direction of a strictly monotonic slice
    ///
    /// Bin edges must be unique and either strictly increasing or strictly
    /// decreasing. At least two values are required to define a direction.
    ///
    /// ```rust
    /// # use origami_utils::{Error, Monotonic, SliceExt};
    /// assert_eq!([0.0, 0.1, 1.0].monotonic(), Ok(Monotonic::Increasing));
    /// assert_eq!([1.0, 0.0, -1.0].monotonic(), Ok(Monotonic::Decreasing));
    ///
    /// // Duplicates and changes of direction are both rejected
    /// assert_eq!(
    ///     [0.0, 1.0, 1.0].monotonic(),
    ///     Err(Error::SliceNotStrictlyMonotonic { index: 2 })
    /// );
    /// assert_eq!(
    ///     [0.0, 2.0, 1.0].monotonic(),
    ///     Err(Error::SliceNotStrictlyMonotonic { index: 2 })
    /// );
    ///
    /// // Need at least one pair of values
    /// assert!([1.0].monotonic().is_err());
    /// ```
    fn monotonic(&self) -> Result<Monotonic>;
}

impl SliceExt<f64> for [f64] {
    fn try_min(&self) -> Result<f64> {
        if !self.all_finite() {
            return Err(Error::SliceContainsUndefinedValues);
        };

        if let Some(v) = self.iter().min_by(|a, b| a.total_cmp(b)).copied() {
            Ok(v)
        } else {
            Err(Error::SliceContainsNoValues)
        }
    }

    fn try_max(&self) -> Result<f64> {
        if !self.all_finite() {
            return Err(Error::SliceContainsUndefinedValues);
        };

        if let Some(v) = self.iter().max_by(|a, b| a.total_cmp(b)).copied() {
            Ok(v)
        } else {
            Err(Error::SliceContainsNoValues)
        }
    }

    fn all_finite(&self) -> bool {
        self.iter().all(|v| v.is_finite())
    }

    fn monotonic(&self) -> Result<Monotonic> {
        let n = self.len();
        if n < 2 {
            return Err(Error::BelowMinimumSliceLength {
                length: n,
                minimum_required: 2,
            });
        }

        if !self.all_finite() {
            return Err(Error::SliceContainsUndefinedValues);
        }

        // the first pair decides which way the rest must go
        let direction = if self[1] > self[0] {
            Monotonic::Increasing
        } else if self[1] < self[0] {
            Monotonic::Decreasing
        } else {
            return Err(Error::SliceNotStrictlyMonotonic { index: 1 });
        };

        for (idx, pair) in self.windows(2).enumerate() {
            let ordered = match direction {
                Monotonic::Increasing => pair[0] < pair[1],
                Monotonic::Decreasing => pair[0] > pair[1],
            };

            if !ordered {
                return Err(Error::SliceNotStrictlyMonotonic { index: idx + 1 });
            }
        }

        Ok(direction)
    }
}
