//! Percentile thresholding of distance matrices
//!
//! Each frame is compared only against its own row of distances: a pair counts as
//! similar when its distance is within the `kappa`-quantile of that row. This is
//! evaluated once from the query side and once from the reference side, since
//! row-relative thresholds are not symmetric.
//!
//! # Reference
//!
//! Serra, J., Serra, X., & Andrzejak, R. G. (2009). Cross recurrence quantification
//! for cover song identification. *New Journal of Physics*, 11.

use ndarray::Array2;

use crate::error::SimilarityError;

/// Compute a percentile with linear interpolation between closest ranks
///
/// # Arguments
///
/// * `values` - Values to rank
/// * `q` - Percentile in [0.0, 100.0], e.g. 9.5 for the 9.5th percentile
///
/// # Errors
///
/// Returns `SimilarityError` if values are empty or `q` is out of range
pub fn percentile(values: &[f32], q: f32) -> Result<f32, SimilarityError> {
    if values.is_empty() {
        return Err(SimilarityError::InvalidInput(
            "Empty values for percentile calculation".to_string(),
        ));
    }

    if !(0.0..=100.0).contains(&q) {
        return Err(SimilarityError::InvalidParameter(format!(
            "Percentile must be in [0.0, 100.0], got {}",
            q
        )));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    Ok(percentile_of_sorted(&sorted, q))
}

/// Percentile of an already sorted, non-empty slice
fn percentile_of_sorted(sorted: &[f32], q: f32) -> f32 {
    if sorted.len() == 1 {
        return sorted[0];
    }

    let k = (sorted.len() - 1) as f32 * (q / 100.0);
    let lo = (k.floor() as usize).min(sorted.len() - 1);
    let hi = (k.ceil() as usize).min(sorted.len() - 1);

    if lo == hi {
        return sorted[lo];
    }

    sorted[lo] * (hi as f32 - k) + sorted[hi] * (k - lo as f32)
}

/// Heaviside step, in place: 1.0 where the value is >= 0, else 0.0
pub fn heaviside(values: &mut Array2<f32>) {
    values.mapv_inplace(|x| if x < 0.0 { 0.0 } else { 1.0 });
}

/// Row-wise percentile thresholds of a distance matrix
fn row_thresholds(distances: &Array2<f32>, kappa: f32) -> Result<Vec<f32>, SimilarityError> {
    if !(0.0..=1.0).contains(&kappa) {
        return Err(SimilarityError::InvalidParameter(format!(
            "kappa must be in [0.0, 1.0], got {}",
            kappa
        )));
    }

    let mut sorted = Vec::with_capacity(distances.ncols());
    distances
        .rows()
        .into_iter()
        .map(|row| {
            if row.is_empty() {
                return Err(SimilarityError::EmptyResult(
                    "distance matrix row is empty".to_string(),
                ));
            }
            sorted.clear();
            sorted.extend(row.iter().copied());
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            Ok(percentile_of_sorted(&sorted, kappa * 100.0))
        })
        .collect()
}

/// Build a binary similarity mask from a distance matrix
///
/// With `skip_threshold` the mask is all ones. Otherwise entry `[r, c]` is 1.0
/// when `D[r, c]` does not exceed the `kappa * 100`-th percentile of row `r`,
/// and 0.0 otherwise (entries exactly at the threshold count as similar).
///
/// # Errors
///
/// Returns `SimilarityError::InvalidParameter` if `kappa` is outside [0, 1].
pub fn threshold_mask(
    distances: &Array2<f32>,
    kappa: f32,
    skip_threshold: bool,
) -> Result<Array2<f32>, SimilarityError> {
    if skip_threshold {
        return Ok(Array2::ones(distances.dim()));
    }

    let thresholds = row_thresholds(distances, kappa)?;
    let mut mask = distances.clone();
    for (mut row, threshold) in mask.rows_mut().into_iter().zip(thresholds) {
        row.mapv_inplace(|d| threshold - d);
    }
    heaviside(&mut mask);

    Ok(mask)
}

/// Threshold a transposed distance matrix and binarise it back into the original orientation
///
/// `transposed` has one row per frame of the second axis. The returned mask has
/// the shape of the untransposed matrix, so it can be combined directly with the
/// first axis mask without a second transpose pass.
///
/// # Errors
///
/// Returns `SimilarityError::InvalidParameter` if `kappa` is outside [0, 1].
pub fn binarize_transposed(
    transposed: &Array2<f32>,
    kappa: f32,
) -> Result<Array2<f32>, SimilarityError> {
    let (rows, cols) = transposed.dim();
    let thresholds = row_thresholds(transposed, kappa)?;

    let mut mask = Array2::<f32>::zeros((cols, rows));
    for (u, threshold) in thresholds.into_iter().enumerate() {
        for v in 0..cols {
            if threshold - transposed[[u, v]] >= 0.0 {
                mask[[v, u]] = 1.0;
            }
        }
    }

    Ok(mask)
}
