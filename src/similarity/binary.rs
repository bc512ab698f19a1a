//! OTI-based chroma binary similarity
//!
//! Two frames are considered similar when the circular shift that best aligns
//! them is 0 or 1 semitone.
//!
//! # Reference
//!
//! Serra, J., Gómez, E., Herrera, P., & Serra, X. (2008). Chroma binary similarity
//! and local alignment applied to cover song identification. *IEEE Transactions on
//! Audio, Speech, and Language Processing*, 16(6), 1138-1151.

use ndarray::Array2;

use crate::error::SimilarityError;
use crate::features::oti::shifted_dot;

/// Reusable buffer for the per-pair shift search
///
/// Holds one score per candidate shift (`nshifts + 1` values). Creating one per
/// call and reusing it across all frame pairs keeps the O(N * M) inner loop free
/// of allocations.
#[derive(Debug, Clone)]
pub struct ShiftScratch {
    values: Vec<f32>,
}

impl ShiftScratch {
    /// Create a scratch buffer for shifts `0..=nshifts`
    pub fn new(nshifts: usize) -> Self {
        Self {
            values: vec![0.0; nshifts + 1],
        }
    }

    /// Largest shift this buffer can score
    pub fn nshifts(&self) -> usize {
        self.values.len() - 1
    }
}

/// Optimal transposition index between two single frames
///
/// Scores every shift of `frame_b` in `0..=scratch.nshifts()` by its dot product
/// with `frame_a`, and returns the first shift with the highest score. Shifts are
/// applied to each `num_bins`-wide block independently, so stacked embeddings
/// are transposed block by block.
///
/// # Errors
///
/// Returns `SimilarityError::InvalidInput` if the frame widths differ, or if
/// `num_bins` is zero or does not divide the frame width.
pub fn frame_oti(
    frame_a: &[f32],
    frame_b: &[f32],
    num_bins: usize,
    scratch: &mut ShiftScratch,
) -> Result<usize, SimilarityError> {
    check_block_width(frame_a.len(), frame_b.len(), num_bins)?;
    Ok(best_shift(frame_a, frame_b, num_bins, scratch))
}

fn check_block_width(
    width_a: usize,
    width_b: usize,
    num_bins: usize,
) -> Result<(), SimilarityError> {
    if num_bins == 0 {
        return Err(SimilarityError::InvalidInput(
            "number of chroma bins must be > 0".to_string(),
        ));
    }
    if width_a != width_b {
        return Err(SimilarityError::InvalidInput(format!(
            "cannot compare frames of width {} and {}",
            width_a, width_b
        )));
    }
    if width_a % num_bins != 0 {
        return Err(SimilarityError::InvalidInput(format!(
            "frame width {} is not a multiple of {} bins",
            width_a, num_bins
        )));
    }
    Ok(())
}

// Widths must already be checked
fn best_shift(
    frame_a: &[f32],
    frame_b: &[f32],
    num_bins: usize,
    scratch: &mut ShiftScratch,
) -> usize {
    for (shift, value) in scratch.values.iter_mut().enumerate() {
        *value = shifted_dot(frame_a, frame_b, shift, num_bins);
    }

    let mut best = 0;
    for (shift, &value) in scratch.values.iter().enumerate().skip(1) {
        if value > scratch.values[best] {
            best = shift;
        }
    }
    best
}

/// Compute the chroma binary similarity matrix of two sequences
///
/// Entry `[i, j]` is `match_coef` if the optimal transposition between
/// `chroma_a[i]` and `chroma_b[j]` is 0 or 1, and `mismatch_coef` otherwise.
///
/// # Arguments
///
/// * `chroma_a` - Query frames (raw or embedded)
/// * `chroma_b` - Reference frames, same width as the query frames
/// * `nshifts` - Largest circular shift to search
/// * `num_bins` - Width of one chroma block (frame width divided by the embedding dimension)
/// * `match_coef` - Value for matching pairs
/// * `mismatch_coef` - Value for all other pairs
///
/// # Errors
///
/// Returns `SimilarityError::InvalidInput` if `num_bins` is zero, or if the
/// frame widths differ or are not a multiple of `num_bins`.
pub fn chroma_binary_similarity(
    chroma_a: &[Vec<f32>],
    chroma_b: &[Vec<f32>],
    nshifts: usize,
    num_bins: usize,
    match_coef: f32,
    mismatch_coef: f32,
) -> Result<Array2<f32>, SimilarityError> {
    log::debug!(
        "Chroma binary similarity: {}x{} frame pairs, {} shifts",
        chroma_a.len(),
        chroma_b.len(),
        nshifts + 1
    );

    if num_bins == 0 {
        return Err(SimilarityError::InvalidInput(
            "number of chroma bins must be > 0".to_string(),
        ));
    }
    if let (Some(fa), Some(fb)) = (chroma_a.first(), chroma_b.first()) {
        check_block_width(fa.len(), fb.len(), num_bins)?;
    }
    for frame in chroma_a.iter().chain(chroma_b.iter()) {
        if frame.len() % num_bins != 0 {
            return Err(SimilarityError::InvalidInput(format!(
                "frame width {} is not a multiple of {} bins",
                frame.len(),
                num_bins
            )));
        }
    }

    let mut scratch = ShiftScratch::new(nshifts);
    let mut sim = Array2::<f32>::from_elem((chroma_a.len(), chroma_b.len()), mismatch_coef);

    for (i, frame_a) in chroma_a.iter().enumerate() {
        for (j, frame_b) in chroma_b.iter().enumerate() {
            let oti = best_shift(frame_a, frame_b, num_bins, &mut scratch);
            if oti <= 1 {
                sim[[i, j]] = match_coef;
            }
        }
    }

    Ok(sim)
}
