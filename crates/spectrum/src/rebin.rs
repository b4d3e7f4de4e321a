//! Redistribution of binned values onto a different bin structure

// crate modules
use crate::error::{Error, Result};

// origami modules
use origami_utils::SliceExt;

use itertools::Itertools;
use log::{debug, trace};

/// Lower bound implied for the first bin when only upper edges are given
pub const DEFAULT_FLOOR: f64 = 0.0;

/// Complete set of `N+1` bin boundaries for `n_values` bins
///
/// Edges given as `N` values are treated as upper edges, with `floor` as the
/// lower bound of the first bin. The result is always strictly monotonic.
pub(crate) fn complete_edges(edges: &[f64], n_values: usize, floor: f64) -> Result<Vec<f64>> {
    let full = if edges.len() == n_values + 1 {
        edges.to_vec()
    } else if edges.len() == n_values {
        let mut full = Vec::with_capacity(n_values + 1);
        full.push(floor);
        full.extend_from_slice(edges);
        full
    } else {
        return Err(Error::EdgeCountMismatch {
            values: n_values,
            found: edges.len(),
        });
    };

    full.monotonic()?;
    Ok(full)
}

/// Rebin a value and error pair onto a new bin structure
///
/// The convention of the new edges follows the old ones. If `old_edges` has
/// one more entry than `values` both sets are taken as complete boundaries.
/// If it has the same number of entries both are taken as upper edges and the
/// first bin of each extends down to [DEFAULT_FLOOR].
///
/// For every pair of old and new bins the fraction of the old bin covered by
/// the new one is
///
/// ```text
/// max(0, min(old.hi, new.hi) - max(old.lo, new.lo)) / old.width
/// ```
///
/// New values are the sum of old values weighted by that fraction. New errors
/// are the root sum square of the errors of every old bin that overlaps the
/// new one at all. The overlap is not used as a weight for the errors.
///
/// ```rust
/// # use origami_spectrum::rebin;
/// let (values, errors) = rebin(
///     &[1.0, 2.0, 3.0, 4.0, 5.0],
///     &[6.0, 6.0, 6.0, 6.0, 6.0],
///     &[0.0, 0.0, 0.0, 0.0, 0.0],
///     &[1.0, 2.5, 4.5, 5.0],
/// ).unwrap();
///
/// assert_eq!(values, vec![6.0, 9.0, 12.0, 3.0]);
/// assert_eq!(values.iter().sum::<f64>(), 30.0);
/// ```
pub fn rebin(
    old_edges: &[f64],
    values: &[f64],
    errors: &[f64],
    new_edges: &[f64],
) -> Result<(Vec<f64>, Vec<f64>)> {
    rebin_with_floor(old_edges, values, errors, new_edges, DEFAULT_FLOOR)
}

/// Rebin with a custom lower bound for upper edge structures
///
/// Same as [rebin()] but the first bin of both structures extends down to
/// `floor` when upper edges are given. Needed for anything binned below zero,
/// such as cosine bins.
///
/// ```rust
/// # use origami_spectrum::rebin_with_floor;
/// let (values, _) = rebin_with_floor(
///     &[-0.5, 0.0, 0.5, 1.0],
///     &[1.0, 2.0, 3.0, 4.0],
///     &[0.0, 0.0, 0.0, 0.0],
///     &[0.0, 1.0],
///     -1.0,
/// ).unwrap();
///
/// assert_eq!(values, vec![3.0, 7.0]);
/// ```
pub fn rebin_with_floor(
    old_edges: &[f64],
    values: &[f64],
    errors: &[f64],
    new_edges: &[f64],
    floor: f64,
) -> Result<(Vec<f64>, Vec<f64>)> {
    if values.len() != errors.len() {
        return Err(Error::LengthMismatch {
            values: values.len(),
            errors: errors.len(),
        });
    }

    let old = complete_edges(old_edges, values.len(), floor)?;

    // new structure follows whatever convention the old one used
    let n_new = if old_edges.len() == values.len() {
        new_edges.len()
    } else {
        new_edges.len().saturating_sub(1)
    };
    let new = complete_edges(new_edges, n_new, floor)?;

    redistribute(&old, values, errors, &new)
}

/// Core overlap redistribution between two complete edge sets
pub(crate) fn redistribute(
    old_edges: &[f64],
    values: &[f64],
    errors: &[f64],
    new_edges: &[f64],
) -> Result<(Vec<f64>, Vec<f64>)> {
    let (old_lo, old_hi) = (old_edges.try_min()?, old_edges.try_max()?);
    let (new_lo, new_hi) = (new_edges.try_min()?, new_edges.try_max()?);
    if new_lo > old_lo || new_hi < old_hi {
        debug!(
            "New bins span [{new_lo}, {new_hi}] within old bins [{old_lo}, {old_hi}], content outside is dropped"
        );
    }

    let old_bins = bounds(old_edges);
    let n_new = new_edges.len().saturating_sub(1);

    let mut new_values = Vec::with_capacity(n_new);
    let mut new_errors = Vec::with_capacity(n_new);

    for (new_lo, new_hi) in bounds(new_edges) {
        let mut value = 0.0;
        let mut variance = 0.0;

        for ((old_lo, old_hi), (v, e)) in old_bins.iter().zip(values.iter().zip(errors)) {
            let overlap = (old_hi.min(new_hi) - old_lo.max(new_lo)).max(0.0);
            if overlap > 0.0 {
                let fraction = overlap / (old_hi - old_lo);
                value += v * fraction;
                variance += e * e;
            }
        }

        new_values.push(value);
        new_errors.push(variance.sqrt());
    }

    trace!(
        "Redistributed {} bins onto {} bins",
        values.len(),
        new_values.len()
    );

    Ok((new_values, new_errors))
}

/// (low, high) pairs for each bin regardless of the edge direction
fn bounds(edges: &[f64]) -> Vec<(f64, f64)> {
    edges
        .iter()
        .tuple_windows()
        .map(|(a, b)| (a.min(*b), a.max(*b)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_on_unchanged_structure() {
        let edges = [0.0, 0.5, 2.0, 3.0, 7.5];
        let values = [1.0, 4.0, 2.5, 0.0];
        let errors = [0.5, 0.25, 0.125, 0.0];

        let (v, e) = rebin(&edges, &values, &errors, &edges).unwrap();
        assert_eq!(v, values);
        assert_eq!(e, errors);
    }

    #[test]
    fn errors_use_binary_overlap() {
        // one old bin split evenly between two new bins
        let (v, e) = rebin(&[0.0, 2.0], &[4.0], &[3.0], &[0.0, 1.0, 2.0]).unwrap();
        assert_eq!(v, vec![2.0, 2.0]);
        // the full error lands in both halves, not half of it
        assert_eq!(e, vec![3.0, 3.0]);

        // two old bins merged into one
        let (v, e) = rebin(&[0.0, 1.0, 2.0], &[1.0, 2.0], &[3.0, 4.0], &[0.0, 2.0]).unwrap();
        assert_eq!(v, vec![3.0]);
        assert_eq!(e, vec![5.0]);
    }

    #[test]
    fn upper_edges_extend_to_floor() {
        let old = complete_edges(&[1.0, 2.0], 2, DEFAULT_FLOOR).unwrap();
        assert_eq!(old, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn custom_floor_below_zero() {
        let edges = [-0.5, 0.0, 0.5, 1.0];
        let values = [1.0, 2.0, 3.0, 4.0];
        let errors = [0.0; 4];

        // the default floor of zero sits above the first upper edge
        assert!(rebin(&edges, &values, &errors, &[1.0]).is_err());

        let (v, _) = rebin_with_floor(&edges, &values, &errors, &[0.0, 1.0], -1.0).unwrap();
        assert_eq!(v, vec![3.0, 7.0]);
    }

    #[test]
    fn decreasing_edges() {
        let edges = [1.0, 0.0, -1.0];
        let (v, _) = rebin(&edges, &[2.0, 4.0], &[0.0, 0.0], &[1.0, -1.0]).unwrap();
        assert_eq!(v, vec![6.0]);
    }

    #[test]
    fn inconsistent_lengths() {
        assert_eq!(
            rebin(&[0.0, 1.0, 2.0], &[1.0, 1.0], &[0.1], &[0.0, 2.0]),
            Err(Error::LengthMismatch {
                values: 2,
                errors: 1
            })
        );

        assert_eq!(
            rebin(&[0.0, 1.0, 2.0, 3.0, 4.0], &[1.0, 1.0], &[0.1, 0.1], &[0.0, 2.0]),
            Err(Error::EdgeCountMismatch {
                values: 2,
                found: 5
            })
        );
    }
}
