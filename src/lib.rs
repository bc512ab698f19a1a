//! # Stratum CSM
//!
//! Binary cross-similarity matrices between two chroma feature sequences, the
//! input to cover song detection and cross recurrence analysis.
//!
//! ## Features
//!
//! - **Time-delay embedding**: stack consecutive chroma frames for temporal context
//! - **Key invariance**: optimal transposition index (OTI) moves the reference into the query key
//! - **Cross recurrence plots**: per-axis percentile thresholds over Euclidean distances
//! - **Chroma binary similarity**: OTI-based match/mismatch scoring per frame pair
//! - **Streaming**: bounded-lookback processing of an open-ended query stream
//!
//! ## Quick Start
//!
//! ```no_run
//! use stratum_csm::{compute_cross_similarity, CrossSimilarityConfig};
//!
//! // Chroma frames (e.g. 12-bin HPCP), one Vec per frame
//! let query: Vec<Vec<f32>> = vec![]; // Your query chroma
//! let reference: Vec<Vec<f32>> = vec![]; // Your reference chroma
//!
//! let csm = compute_cross_similarity(&query, &reference, CrossSimilarityConfig::default())?;
//! println!("Cross-similarity: {}x{}", csm.nrows(), csm.ncols());
//! # Ok::<(), stratum_csm::SimilarityError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Chroma → (OTI rotation) → Time Embedding → Distances → Thresholds (x2) → Combined Matrix
//!                                          ↘ OTI Binary Similarity ↗
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod similarity;

// Re-export main types
pub use config::{CrossSimilarityConfig, MATCH_COEF, MISMATCH_COEF};
pub use engine::{
    Acquire, CrossSimilarityMatrix, InputPort, OutputPort, ProcessStatus,
    StreamingCrossSimilarity,
};
pub use error::SimilarityError;

/// Main batch entry point
///
/// Computes the cross-similarity matrix between a query and a reference chroma
/// sequence in one call.
///
/// # Arguments
///
/// * `query` - Query chroma frames, all of the same width
/// * `reference` - Reference chroma frames, same width as the query
/// * `config` - Cross-similarity configuration parameters
///
/// # Returns
///
/// Matrix with one row per embedded query frame and one column per embedded
/// reference frame
///
/// # Errors
///
/// Returns `SimilarityError` if the configuration is invalid, either input is
/// empty, or the sequences are too short for the embedding window
///
/// # Example
///
/// ```
/// use stratum_csm::{compute_cross_similarity, CrossSimilarityConfig};
///
/// let chroma: Vec<Vec<f32>> = (0..20)
///     .map(|t| (0..12).map(|b| if b == t % 12 { 1.0 } else { 0.1 }).collect())
///     .collect();
/// let csm = compute_cross_similarity(&chroma, &chroma, CrossSimilarityConfig::default())?;
/// assert_eq!(csm.dim(), (11, 11));
/// # Ok::<(), stratum_csm::SimilarityError>(())
/// ```
pub fn compute_cross_similarity(
    query: &[Vec<f32>],
    reference: &[Vec<f32>],
    config: CrossSimilarityConfig,
) -> Result<ndarray::Array2<f32>, SimilarityError> {
    CrossSimilarityMatrix::new(config)?.compute(query, reference)
}
