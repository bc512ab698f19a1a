//! Cross-similarity engines
//!
//! - [`batch::CrossSimilarityMatrix`]: one call per pair of complete sequences
//! - [`streaming::StreamingCrossSimilarity`]: query arrives as a token stream
//!   with bounded lookback, reference held in memory

pub mod batch;
pub mod port;
pub mod streaming;

pub use batch::CrossSimilarityMatrix;
pub use port::{Acquire, InputPort, OutputPort};
pub use streaming::{ProcessStatus, StreamingCrossSimilarity};

use std::borrow::Cow;

use ndarray::Array2;

use crate::config::CrossSimilarityConfig;
use crate::error::SimilarityError;
use crate::features::time_embedding;

/// Embed a sequence with the configured dimension and delay
///
/// A sequence too short for the embedding window is reported as `EmptyResult`,
/// since it leaves nothing to compare.
pub(crate) fn embed_or_empty<'a>(
    frames: &'a [Vec<f32>],
    config: &CrossSimilarityConfig,
    name: &str,
) -> Result<Cow<'a, [Vec<f32>]>, SimilarityError> {
    match time_embedding(frames, config.embed_dimension, config.tau) {
        Ok(embedded) if embedded.is_empty() => Err(SimilarityError::EmptyResult(format!(
            "{} time embedding is empty",
            name
        ))),
        Ok(embedded) => Ok(embedded),
        Err(SimilarityError::InvalidInput(msg)) => Err(SimilarityError::EmptyResult(format!(
            "{} time embedding is empty: {}",
            name, msg
        ))),
        Err(e) => Err(e),
    }
}

/// Combine the query-axis and reference-axis masks into the cross-similarity matrix
///
/// Element-wise product of two equally shaped real matrices. With 0/1 masks this
/// is a logical AND; weighted masks give weighted scores.
pub(crate) fn combine_masks(
    query_mask: &Array2<f32>,
    reference_mask: &Array2<f32>,
) -> Result<Array2<f32>, SimilarityError> {
    if query_mask.dim() != reference_mask.dim() {
        return Err(SimilarityError::InvalidInput(format!(
            "mask shapes differ: {:?} vs {:?}",
            query_mask.dim(),
            reference_mask.dim()
        )));
    }

    Ok(query_mask * reference_mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_combine_masks_is_and_for_binary() {
        let a: Array2<f32> = array![[1.0, 0.0], [1.0, 1.0]];
        let b: Array2<f32> = array![[1.0, 1.0], [0.0, 1.0]];
        assert_eq!(combine_masks(&a, &b).unwrap(), array![[1.0, 0.0], [0.0, 1.0]]);
    }

    #[test]
    fn test_combine_masks_shape_mismatch() {
        let a = Array2::<f32>::ones((2, 3));
        let b = Array2::<f32>::ones((3, 2));
        assert!(combine_masks(&a, &b).is_err());
    }

    #[test]
    fn test_embed_or_empty_reports_empty_result() {
        let config = CrossSimilarityConfig {
            embed_dimension: 4,
            ..Default::default()
        };
        let frames = vec![vec![0.0; 12]; 3];
        assert!(matches!(
            embed_or_empty(&frames, &config, "query"),
            Err(SimilarityError::EmptyResult(_))
        ));
    }
}
