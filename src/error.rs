//! Error types for the cross-similarity engine

use std::fmt;

/// Errors that can occur while computing a cross-similarity matrix
#[derive(Debug, Clone, PartialEq)]
pub enum SimilarityError {
    /// Query or reference feature matrix has zero frames
    EmptyInput(String),

    /// An intermediate result (embedding, distance matrix) came out empty
    EmptyResult(String),

    /// Configuration parameter out of its valid range
    InvalidParameter(String),

    /// Malformed input (ragged frames, mismatched widths, too few frames)
    InvalidInput(String),
}

impl fmt::Display for SimilarityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimilarityError::EmptyInput(msg) => write!(f, "Empty input: {}", msg),
            SimilarityError::EmptyResult(msg) => write!(f, "Empty result: {}", msg),
            SimilarityError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            SimilarityError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for SimilarityError {}
