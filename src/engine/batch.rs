//! Batch cross-similarity computation
//!
//! Consumes two complete chroma sequences and returns one cross-similarity
//! matrix with one row per (embedded) query frame and one column per
//! (embedded) reference frame.
//!
//! # Algorithm
//!
//! 1. Validate both sequences
//! 2. OTI-binary mode: score (optionally embedded) frames with the chroma binary similarity
//! 3. Distance mode:
//!    - optionally rotate the reference into the query key
//!    - embed both sequences and compute pairwise Euclidean distances
//!    - threshold each axis by its own row percentile
//!    - combine the two masks with an element-wise product
//!
//! # Reference
//!
//! Serra, J., Serra, X., & Andrzejak, R. G. (2009). Cross recurrence quantification
//! for cover song identification. *New Journal of Physics*, 11.

use std::borrow::Cow;

use ndarray::Array2;

use super::{combine_masks, embed_or_empty};
use crate::config::{CrossSimilarityConfig, MATCH_COEF, MISMATCH_COEF};
use crate::error::SimilarityError;
use crate::features::{rotate_sequence, sequence_oti, validate_frames};
use crate::similarity::{
    binarize_transposed, chroma_binary_similarity, pairwise_distance, threshold_mask,
};

/// Batch cross-similarity engine
///
/// Holds a validated configuration; every call to [`CrossSimilarityMatrix::compute`]
/// is independent.
#[derive(Debug, Clone)]
pub struct CrossSimilarityMatrix {
    config: CrossSimilarityConfig,
}

impl CrossSimilarityMatrix {
    /// Create an engine from a configuration
    ///
    /// # Errors
    ///
    /// Returns `SimilarityError::InvalidParameter` if the configuration is out of range.
    pub fn new(config: CrossSimilarityConfig) -> Result<Self, SimilarityError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use
    pub fn config(&self) -> &CrossSimilarityConfig {
        &self.config
    }

    /// Compute the cross-similarity matrix of a query and a reference
    ///
    /// # Arguments
    ///
    /// * `query` - Query chroma frames (`n_frames x num_bins`)
    /// * `reference` - Reference chroma frames with the same `num_bins`
    ///
    /// # Returns
    ///
    /// Matrix of shape `(query_rows, reference_rows)`, where the row counts are
    /// the embedded frame counts (`len - embed_dimension * tau`, or `len` when
    /// `embed_dimension == 1`).
    ///
    /// # Errors
    ///
    /// - `EmptyInput` if either sequence has no frames
    /// - `InvalidInput` for ragged frames or mismatched bin counts
    /// - `EmptyResult` if a sequence is too short for the embedding window
    ///
    /// # Example
    ///
    /// ```
    /// use stratum_csm::{CrossSimilarityConfig, CrossSimilarityMatrix};
    ///
    /// let config = CrossSimilarityConfig {
    ///     embed_dimension: 1,
    ///     oti: false,
    ///     ..Default::default()
    /// };
    /// let engine = CrossSimilarityMatrix::new(config)?;
    ///
    /// let chroma = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]];
    /// let csm = engine.compute(&chroma, &chroma)?;
    /// assert_eq!(csm.dim(), (3, 3));
    /// # Ok::<(), stratum_csm::SimilarityError>(())
    /// ```
    pub fn compute(
        &self,
        query: &[Vec<f32>],
        reference: &[Vec<f32>],
    ) -> Result<Array2<f32>, SimilarityError> {
        log::debug!(
            "Computing cross-similarity: {} query frames, {} reference frames",
            query.len(),
            reference.len()
        );

        let query_bins = validate_frames(query, "queryFeature")?;
        let reference_bins = validate_frames(reference, "referenceFeature")?;
        if query_bins != reference_bins {
            return Err(SimilarityError::InvalidInput(format!(
                "query has {} bins per frame, reference has {}",
                query_bins, reference_bins
            )));
        }

        let csm = if self.config.oti_binary {
            self.compute_oti_binary(query, reference, query_bins)?
        } else {
            self.compute_thresholded(query, reference)?
        };

        if csm.is_empty() {
            return Err(SimilarityError::EmptyResult(
                "cross-similarity matrix is empty".to_string(),
            ));
        }

        log::debug!("Cross-similarity matrix: {}x{}", csm.nrows(), csm.ncols());
        Ok(csm)
    }

    fn compute_oti_binary(
        &self,
        query: &[Vec<f32>],
        reference: &[Vec<f32>],
        num_bins: usize,
    ) -> Result<Array2<f32>, SimilarityError> {
        let cfg = &self.config;

        let (query_frames, reference_frames) = if cfg.to_blocked {
            (
                embed_or_empty(query, cfg, "query")?,
                embed_or_empty(reference, cfg, "reference")?,
            )
        } else {
            (Cow::Borrowed(query), Cow::Borrowed(reference))
        };

        chroma_binary_similarity(
            &query_frames,
            &reference_frames,
            cfg.noti,
            num_bins,
            MATCH_COEF,
            MISMATCH_COEF,
        )
    }

    fn compute_thresholded(
        &self,
        query: &[Vec<f32>],
        reference: &[Vec<f32>],
    ) -> Result<Array2<f32>, SimilarityError> {
        let cfg = &self.config;

        let reference: Cow<'_, [Vec<f32>]> = if cfg.oti {
            let oti = sequence_oti(query, reference, cfg.noti)?;
            Cow::Owned(rotate_sequence(reference, oti))
        } else {
            Cow::Borrowed(reference)
        };

        let query_embed = embed_or_empty(query, cfg, "query")?;
        let reference_embed = embed_or_empty(&reference, cfg, "reference")?;

        let distances = pairwise_distance(&query_embed, &reference_embed)?;
        if distances.is_empty() {
            return Err(SimilarityError::EmptyResult(
                "empty array found inside euclidean cross similarity matrix".to_string(),
            ));
        }
        let transposed = distances.t().to_owned();

        let query_mask = threshold_mask(&distances, cfg.kappa, cfg.optimise_threshold)?;
        let reference_mask = binarize_transposed(&transposed, cfg.kappa)?;

        combine_masks(&query_mask, &reference_mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_pattern() -> Vec<Vec<f32>> {
        vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
            vec![1.0, 0.0, 0.0],
        ]
    }

    fn chroma_sequence(n_frames: usize, offset: usize) -> Vec<Vec<f32>> {
        (0..n_frames)
            .map(|t| {
                let mut frame = vec![0.1f32; 12];
                frame[(t + offset) % 12] = 1.0;
                frame[(t * 5 + offset + 4) % 12] = 0.7;
                frame
            })
            .collect()
    }

    /// Deterministic non-periodic chroma frames
    fn pseudo_chroma(n_frames: usize, seed: u32) -> Vec<Vec<f32>> {
        let mut state = seed;
        (0..n_frames)
            .map(|_| {
                (0..12)
                    .map(|_| {
                        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                        (state >> 8) as f32 / (1u32 << 24) as f32
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_empty_query_or_reference() {
        let engine = CrossSimilarityMatrix::new(CrossSimilarityConfig::default()).unwrap();
        let chroma = chroma_sequence(20, 0);

        assert!(matches!(
            engine.compute(&[], &chroma),
            Err(SimilarityError::EmptyInput(_))
        ));
        assert!(matches!(
            engine.compute(&chroma, &[]),
            Err(SimilarityError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_self_similarity_diagonal() {
        let config = CrossSimilarityConfig {
            embed_dimension: 1,
            oti: false,
            oti_binary: false,
            optimise_threshold: true,
            ..Default::default()
        };
        let engine = CrossSimilarityMatrix::new(config).unwrap();
        let chroma = identity_pattern();

        let distances = pairwise_distance(&chroma, &chroma).unwrap();
        for i in 0..4 {
            assert_eq!(distances[[i, i]], 0.0);
        }

        let csm = engine.compute(&chroma, &chroma).unwrap();
        assert_eq!(csm.dim(), (4, 4));
        for i in 0..4 {
            assert_eq!(csm[[i, i]], 1.0);
        }
    }

    #[test]
    fn test_output_shape_with_embedding() {
        let config = CrossSimilarityConfig {
            embed_dimension: 3,
            tau: 2,
            ..Default::default()
        };
        let engine = CrossSimilarityMatrix::new(config).unwrap();

        let csm = engine
            .compute(&chroma_sequence(30, 0), &chroma_sequence(25, 3))
            .unwrap();
        assert_eq!(csm.dim(), (30 - 6, 25 - 6));
        assert!(csm.iter().all(|&v| v == 0.0 || v == 1.0));
    }

    #[test]
    fn test_too_short_for_embedding() {
        let engine = CrossSimilarityMatrix::new(CrossSimilarityConfig::default()).unwrap();
        assert!(matches!(
            engine.compute(&chroma_sequence(9, 0), &chroma_sequence(40, 0)),
            Err(SimilarityError::EmptyResult(_))
        ));
    }

    #[test]
    fn test_bin_mismatch() {
        let engine = CrossSimilarityMatrix::new(CrossSimilarityConfig::default()).unwrap();
        let query = vec![vec![0.0; 12]; 20];
        let reference = vec![vec![0.0; 24]; 20];
        assert!(matches!(
            engine.compute(&query, &reference),
            Err(SimilarityError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_oti_recovers_transposed_cover() {
        // The reference is the query played 3 semitones lower
        let reference = pseudo_chroma(24, 7);
        let query = rotate_sequence(&reference, 3);
        let config = CrossSimilarityConfig {
            embed_dimension: 2,
            kappa: 0.1,
            ..Default::default()
        };
        let engine = CrossSimilarityMatrix::new(config).unwrap();
        let csm = engine.compute(&query, &reference).unwrap();

        for i in 0..csm.nrows() {
            assert_eq!(csm[[i, i]], 1.0, "diagonal entry {} should be a recurrence", i);
        }
    }

    #[test]
    fn test_oti_binary_modes() {
        let query = chroma_sequence(15, 0);
        let reference = chroma_sequence(12, 1);

        let raw = CrossSimilarityMatrix::new(CrossSimilarityConfig {
            oti_binary: true,
            to_blocked: false,
            ..Default::default()
        })
        .unwrap()
        .compute(&query, &reference)
        .unwrap();
        assert_eq!(raw.dim(), (15, 12));
        assert!(raw.iter().all(|&v| v == MATCH_COEF || v == MISMATCH_COEF));

        let blocked = CrossSimilarityMatrix::new(CrossSimilarityConfig {
            oti_binary: true,
            to_blocked: true,
            embed_dimension: 2,
            ..Default::default()
        })
        .unwrap()
        .compute(&query, &reference)
        .unwrap();
        assert_eq!(blocked.dim(), (13, 10));
    }
}
