//! Frame-pair similarity scoring
//!
//! Turns two (embedded) feature sequences into similarity masks:
//! - Pairwise Euclidean distances
//! - Percentile thresholding per axis (cross recurrence plots)
//! - OTI-based chroma binary similarity

pub mod binary;
pub mod distance;
pub mod threshold;

pub use binary::{chroma_binary_similarity, frame_oti, ShiftScratch};
pub use distance::pairwise_distance;
pub use threshold::{binarize_transposed, heaviside, percentile, threshold_mask};
