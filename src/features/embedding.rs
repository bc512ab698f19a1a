//! Time-delay embedding of feature sequences
//!
//! Stacks `m` frames spaced `tau` apart into one frame of width `num_bins * m`,
//! giving each frame a short window of temporal context.
//!
//! # Reference
//!
//! Serra, J., Serra, X., & Andrzejak, R. G. (2009). Cross recurrence quantification
//! for cover song identification. *New Journal of Physics*, 11.

use std::borrow::Cow;

use crate::error::SimilarityError;

/// Build a stacked time-delay embedding from a feature sequence
///
/// Row `i` of the output is the concatenation of input rows
/// `i, i + tau, ..., i + (m - 1) * tau`. The output has `len - m * tau` rows.
/// With `m == 1` the input is returned as-is (borrowed, no copy).
///
/// # Arguments
///
/// * `frames` - Feature frames, all of the same width
/// * `m` - Embedding dimension (number of stacked frames)
/// * `tau` - Time delay between stacked frames
///
/// # Errors
///
/// Returns `SimilarityError::InvalidParameter` if `m` or `tau` is zero, and
/// `SimilarityError::InvalidInput` if the sequence has no more than `m * tau` frames.
///
/// # Example
///
/// ```
/// use stratum_csm::features::time_embedding;
///
/// let frames = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]];
/// let embedded = time_embedding(&frames, 2, 1)?;
/// assert_eq!(embedded.len(), 1);
/// assert_eq!(embedded[0], vec![1.0, 0.0, 0.0, 1.0]);
/// # Ok::<(), stratum_csm::SimilarityError>(())
/// ```
pub fn time_embedding(
    frames: &[Vec<f32>],
    m: usize,
    tau: usize,
) -> Result<Cow<'_, [Vec<f32>]>, SimilarityError> {
    if m == 0 || tau == 0 {
        return Err(SimilarityError::InvalidParameter(format!(
            "embedding needs m >= 1 and tau >= 1, got m={}, tau={}",
            m, tau
        )));
    }

    if m == 1 {
        return Ok(Cow::Borrowed(frames));
    }

    let span = m * tau;
    if frames.len() <= span {
        return Err(SimilarityError::InvalidInput(format!(
            "{} frames cannot fit an embedding window of {} (m={}, tau={})",
            frames.len(),
            span,
            m,
            tau
        )));
    }

    let n_rows = frames.len() - span;
    let num_bins = frames[0].len();
    log::debug!(
        "Time embedding: {} frames -> {} rows of {} bins (m={}, tau={})",
        frames.len(),
        n_rows,
        num_bins * m,
        m,
        tau
    );

    let embedded = (0..n_rows)
        .map(|i| {
            let mut row = Vec::with_capacity(num_bins * m);
            for k in 0..m {
                row.extend_from_slice(&frames[i + k * tau]);
            }
            row
        })
        .collect();

    Ok(Cow::Owned(embedded))
}
