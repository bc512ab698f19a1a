//! Optimal transposition index (OTI)
//!
//! Finds the circular pitch-class shift that best aligns the averaged harmonic
//! content of two recordings, so a reference can be moved into the key of a query.
//!
//! Shifts rotate bins to the right: shifting by `s` moves bin `i` to bin `i + s`
//! (mod the block width).
//!
//! # Reference
//!
//! Serra, J., Gómez, E., & Herrera, P. (2008). Transposing chroma representations
//! to a common key. *IEEE Conference on The Use of Symbols to Represent Music and
//! Multimedia Objects*.

use crate::error::SimilarityError;

/// Compute the global averaged chroma of a sequence
///
/// Sums every bin across all frames, then divides by the largest sum so the
/// result lies in [0, 1]. An all-zero sequence yields an all-zero vector.
///
/// # Errors
///
/// Returns `SimilarityError::EmptyInput` if the sequence has no frames.
pub fn global_average_chroma(frames: &[Vec<f32>]) -> Result<Vec<f32>, SimilarityError> {
    let first = frames.first().ok_or_else(|| {
        SimilarityError::EmptyInput("cannot average an empty chroma sequence".to_string())
    })?;

    let mut global = vec![0.0f32; first.len()];
    for frame in frames {
        for (sum, &value) in global.iter_mut().zip(frame.iter()) {
            *sum += value;
        }
    }

    let max = global.iter().copied().fold(0.0f32, f32::max);
    if max > 0.0 {
        for value in global.iter_mut() {
            *value /= max;
        }
    }

    Ok(global)
}

/// Find the optimal transposition index between two global chroma vectors
///
/// Tries every shift `s` in `0..=nshifts` of `reference_global` and returns the
/// one whose dot product with `query_global` is largest. Ties go to the smallest
/// shift.
///
/// Shifts rotate bins to the right, so a result of `s` means the reference sits
/// `s` semitones below the query.
///
/// # Errors
///
/// Returns `SimilarityError::InvalidInput` if the vectors are empty or differ in length.
///
/// # Example
///
/// ```
/// use stratum_csm::features::optimal_transposition_index;
///
/// let query = [0.0, 1.0, 0.0, 0.0];
/// let reference = [1.0, 0.0, 0.0, 0.0];
/// assert_eq!(optimal_transposition_index(&query, &reference, 3)?, 1);
/// # Ok::<(), stratum_csm::SimilarityError>(())
/// ```
pub fn optimal_transposition_index(
    query_global: &[f32],
    reference_global: &[f32],
    nshifts: usize,
) -> Result<usize, SimilarityError> {
    if query_global.is_empty() || query_global.len() != reference_global.len() {
        return Err(SimilarityError::InvalidInput(format!(
            "global chroma lengths must match and be non-empty, got {} and {}",
            query_global.len(),
            reference_global.len()
        )));
    }

    let block = query_global.len();
    let mut best_shift = 0;
    let mut best_value = f32::NEG_INFINITY;
    for shift in 0..=nshifts {
        let value = shifted_dot(query_global, reference_global, shift, block);
        if value > best_value {
            best_value = value;
            best_shift = shift;
        }
    }

    Ok(best_shift)
}

/// Optimal transposition index between two full feature sequences
///
/// Convenience wrapper that averages both sequences with
/// [`global_average_chroma`] before searching.
pub fn sequence_oti(
    query: &[Vec<f32>],
    reference: &[Vec<f32>],
    nshifts: usize,
) -> Result<usize, SimilarityError> {
    let query_global = global_average_chroma(query)?;
    let reference_global = global_average_chroma(reference)?;
    let oti = optimal_transposition_index(&query_global, &reference_global, nshifts)?;
    log::debug!("Optimal transposition index: {} (of {} shifts)", oti, nshifts + 1);
    Ok(oti)
}

/// Rotate the bins of every frame of a sequence by `shift`
///
/// Returns a new sequence; the input is left untouched.
pub fn rotate_sequence(frames: &[Vec<f32>], shift: usize) -> Vec<Vec<f32>> {
    frames
        .iter()
        .map(|frame| {
            let mut rotated = frame.clone();
            if !rotated.is_empty() {
                let n = rotated.len();
                rotated.rotate_right(shift % n);
            }
            rotated
        })
        .collect()
}

/// Dot product of `a` with `b` rotated right by `shift` inside each `block`-wide chunk
///
/// Equivalent to rotating every block of `b` and then taking the dot product,
/// without materialising the rotated copy.
pub(crate) fn shifted_dot(a: &[f32], b: &[f32], shift: usize, block: usize) -> f32 {
    let s = shift % block;
    a.chunks(block)
        .zip(b.chunks(block))
        .map(|(a_block, b_block)| {
            let n = b_block.len();
            a_block
                .iter()
                .enumerate()
                .map(|(i, &x)| x * b_block[(i + n - s % n) % n])
                .sum::<f32>()
        })
        .sum()
}
