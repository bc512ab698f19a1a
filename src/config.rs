//! Configuration parameters for cross-similarity computation

use serde::{Deserialize, Serialize};

use crate::error::SimilarityError;

/// Value assigned to a frame pair whose optimal transposition is 0 or 1 semitone
pub const MATCH_COEF: f32 = 1.0;

/// Value assigned to every other frame pair in OTI-binary mode
pub const MISMATCH_COEF: f32 = 0.0;

/// Cross-similarity configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossSimilarityConfig {
    /// Time delay between stacked frames in the embedding (default: 1)
    pub tau: usize,

    /// Number of frames stacked into one embedded frame (default: 9)
    /// Use 1 to compare the raw feature frames.
    pub embed_dimension: usize,

    /// Fraction of nearest neighbours kept by the percentile threshold (default: 0.095)
    pub kappa: f32,

    /// Number of circular shifts checked for the optimal transposition index (default: 12)
    pub noti: usize,

    /// Transpose the reference to the key of the query before embedding (default: true)
    pub oti: bool,

    /// Use the OTI-based chroma binary similarity instead of distance thresholding (default: false)
    pub oti_binary: bool,

    /// Score stacked embeddings rather than raw frames in OTI-binary mode (default: true)
    pub to_blocked: bool,

    /// Skip thresholding on the query axis and use an all-ones mask (default: false)
    /// Only honoured by the batch engine; the streaming engine always skips it.
    pub optimise_threshold: bool,
}

impl Default for CrossSimilarityConfig {
    fn default() -> Self {
        Self {
            tau: 1,
            embed_dimension: 9,
            kappa: 0.095,
            noti: 12,
            oti: true,
            oti_binary: false,
            to_blocked: true,
            optimise_threshold: false,
        }
    }
}

impl CrossSimilarityConfig {
    /// Check every parameter against its valid range
    ///
    /// # Errors
    ///
    /// Returns `SimilarityError::InvalidParameter` if `tau` or `embed_dimension`
    /// is zero, or `kappa` is not a finite value in [0, 1].
    pub fn validate(&self) -> Result<(), SimilarityError> {
        if self.tau == 0 {
            return Err(SimilarityError::InvalidParameter(
                "tau must be at least 1".to_string(),
            ));
        }

        if self.embed_dimension == 0 {
            return Err(SimilarityError::InvalidParameter(
                "embed_dimension must be at least 1".to_string(),
            ));
        }

        if !self.kappa.is_finite() || !(0.0..=1.0).contains(&self.kappa) {
            return Err(SimilarityError::InvalidParameter(format!(
                "kappa must be in [0.0, 1.0], got {}",
                self.kappa
            )));
        }

        Ok(())
    }

    /// Minimum number of query frames the streaming engine buffers before it runs
    pub fn min_frames_size(&self) -> usize {
        self.embed_dimension + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CrossSimilarityConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_frames_size(), 10);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let config = CrossSimilarityConfig {
            tau: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimilarityError::InvalidParameter(_))
        ));

        let config = CrossSimilarityConfig {
            embed_dimension: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = CrossSimilarityConfig {
            kappa: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = CrossSimilarityConfig {
            kappa: f32::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: CrossSimilarityConfig =
            serde_json::from_str(r#"{"embed_dimension": 1, "oti": false}"#).unwrap();
        assert_eq!(config.embed_dimension, 1);
        assert!(!config.oti);
        assert_eq!(config.noti, 12);
        assert!((config.kappa - 0.095).abs() < 1e-6);
    }
}
