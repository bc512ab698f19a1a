//! Feature sequence transforms
//!
//! Operations on chroma feature sequences that run before scoring:
//! - Time-delay embedding (stacked frames)
//! - Optimal transposition index (key alignment)

pub mod embedding;
pub mod oti;

pub use embedding::time_embedding;
pub use oti::{
    global_average_chroma, optimal_transposition_index, rotate_sequence, sequence_oti,
};

use crate::error::SimilarityError;

/// Check that a feature sequence is non-empty and every frame has the same width
///
/// Returns the common frame width (number of bins).
///
/// # Errors
///
/// Returns `SimilarityError::EmptyInput` for an empty sequence and
/// `SimilarityError::InvalidInput` for ragged or zero-width frames.
pub fn validate_frames(frames: &[Vec<f32>], name: &str) -> Result<usize, SimilarityError> {
    let first = frames.first().ok_or_else(|| {
        SimilarityError::EmptyInput(format!("input {} array is empty", name))
    })?;

    let num_bins = first.len();
    if num_bins == 0 {
        return Err(SimilarityError::InvalidInput(format!(
            "{} frames have zero bins",
            name
        )));
    }

    for (i, frame) in frames.iter().enumerate() {
        if frame.len() != num_bins {
            return Err(SimilarityError::InvalidInput(format!(
                "{} frame at index {} has {} bins, expected {}",
                name,
                i,
                frame.len(),
                num_bins
            )));
        }
    }

    Ok(num_bins)
}
