//! Streaming cross-similarity computation
//!
//! The query arrives frame by frame through an [`InputPort`]; the reference is
//! held in memory for the lifetime of the engine. Each run consumes a window of
//! `embed_dimension + 1` query frames, emits one cross-similarity matrix and then
//! drops `tau` frames from the front of the buffer.
//!
//! A scheduler drives the engine by calling [`StreamingCrossSimilarity::process`]
//! until it stops returning [`ProcessStatus::Ok`]. Nothing blocks: a window that
//! is not full yet is reported as [`ProcessStatus::Insufficient`] and the caller
//! comes back after pushing more frames. Once the stream is closed, a final
//! partial window is shrunk to what is left and processed exactly once.

use std::borrow::Cow;

use ndarray::Array2;

use super::port::{Acquire, InputPort, OutputPort};
use super::{combine_masks, embed_or_empty};
use crate::config::{CrossSimilarityConfig, MATCH_COEF, MISMATCH_COEF};
use crate::error::SimilarityError;
use crate::features::{rotate_sequence, sequence_oti, validate_frames};
use crate::similarity::{
    binarize_transposed, chroma_binary_similarity, pairwise_distance, threshold_mask,
};

/// Result of one call to [`StreamingCrossSimilarity::process`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// One matrix was emitted
    Ok,

    /// Not enough query frames buffered yet; push more and call again
    Insufficient,

    /// The stream is closed and fully consumed
    NoMoreInput,
}

/// Streaming cross-similarity engine
#[derive(Debug, Clone)]
pub struct StreamingCrossSimilarity {
    config: CrossSimilarityConfig,
    reference: Vec<Vec<f32>>,
    num_bins: usize,
    min_frames_size: usize,
    query: InputPort<Vec<f32>>,
    csm: OutputPort<Array2<f32>>,
}

impl StreamingCrossSimilarity {
    /// Create a streaming engine for a fixed reference sequence
    ///
    /// `optimise_threshold` and `to_blocked` are ignored: the query axis is never
    /// thresholded and OTI-binary mode always scores embedded frames.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` for an out-of-range configuration, or when both
    ///   `embed_dimension` and `tau` exceed 1 (the window could never hold an
    ///   embedded frame)
    /// - `EmptyInput` / `InvalidInput` for an empty or ragged reference
    /// - `EmptyResult` if the reference is too short to embed
    pub fn new(
        reference: Vec<Vec<f32>>,
        config: CrossSimilarityConfig,
    ) -> Result<Self, SimilarityError> {
        config.validate()?;
        if config.embed_dimension > 1 && config.tau > 1 {
            return Err(SimilarityError::InvalidParameter(format!(
                "a window of {} frames cannot embed with embed_dimension={} and tau={}",
                config.min_frames_size(),
                config.embed_dimension,
                config.tau
            )));
        }

        let num_bins = validate_frames(&reference, "referenceFeature")?;
        embed_or_empty(&reference, &config, "reference")?;

        let min_frames_size = config.min_frames_size();
        log::debug!(
            "Streaming cross-similarity: {} reference frames, window={}, hop={}",
            reference.len(),
            min_frames_size,
            config.tau
        );

        Ok(Self {
            query: InputPort::new(min_frames_size, config.tau),
            csm: OutputPort::new(),
            config,
            reference,
            num_bins,
            min_frames_size,
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &CrossSimilarityConfig {
        &self.config
    }

    /// Reference sequence as configured (never rotated)
    pub fn reference(&self) -> &[Vec<f32>] {
        &self.reference
    }

    /// Buffer one query frame
    pub fn push_frame(&mut self, frame: Vec<f32>) {
        self.query.push(frame);
    }

    /// Buffer several query frames in order
    pub fn push_frames<I: IntoIterator<Item = Vec<f32>>>(&mut self, frames: I) {
        self.query.extend(frames);
    }

    /// Signal that the query stream has ended
    pub fn end_of_stream(&mut self) {
        self.query.close();
    }

    /// Query input port
    pub fn query_port(&self) -> &InputPort<Vec<f32>> {
        &self.query
    }

    /// Output port holding emitted matrices
    pub fn output(&mut self) -> &mut OutputPort<Array2<f32>> {
        &mut self.csm
    }

    /// Run once if enough query frames are buffered
    ///
    /// # Errors
    ///
    /// Returns `SimilarityError` if a query frame has the wrong width or the
    /// window produces an empty matrix. Nothing is released on error.
    pub fn process(&mut self) -> Result<ProcessStatus, SimilarityError> {
        match self.query.try_acquire() {
            Acquire::Ready => {}
            Acquire::Insufficient => return Ok(ProcessStatus::Insufficient),
            Acquire::EndOfStream(0) => return Ok(ProcessStatus::NoMoreInput),
            Acquire::EndOfStream(available) => {
                log::debug!(
                    "End of query stream: {} frames left, window={}",
                    available,
                    self.query.acquire_size()
                );
                // Never widen past the normal window; release everything left
                self.query.set_acquire_size(available.min(self.min_frames_size));
                self.query.set_release_size(available);
                return self.process();
            }
        }

        let acquired = self.query.acquire_size();
        let mut window = self.query.tokens().to_vec();
        for (i, frame) in window.iter().enumerate() {
            if frame.len() != self.num_bins {
                return Err(SimilarityError::InvalidInput(format!(
                    "query frame at window index {} has {} bins, expected {}",
                    i,
                    frame.len(),
                    self.num_bins
                )));
            }
        }

        if acquired < self.min_frames_size {
            log::warn!(
                "Padding final query window from {} to {} frames",
                acquired,
                self.min_frames_size
            );
            for i in 0..(self.min_frames_size - acquired) {
                let frame = window[i % acquired].clone();
                window.push(frame);
            }
        }

        let csm = self.compute_window(&window)?;
        if csm.is_empty() {
            return Err(SimilarityError::EmptyResult(
                "cross-similarity matrix is empty".to_string(),
            ));
        }

        self.csm.produce(csm);
        self.query.release();
        Ok(ProcessStatus::Ok)
    }

    /// Process until no further progress is possible and collect every emitted matrix
    ///
    /// Stops at [`ProcessStatus::Insufficient`] (more frames may follow) or
    /// [`ProcessStatus::NoMoreInput`].
    pub fn run(&mut self) -> Result<Vec<Array2<f32>>, SimilarityError> {
        while self.process()? == ProcessStatus::Ok {}
        Ok(self.csm.drain())
    }

    /// Drop buffered frames and pending matrices and reopen the query stream
    pub fn reset(&mut self) {
        self.query.clear();
        self.query.set_acquire_size(self.min_frames_size);
        self.query.set_release_size(self.config.tau);
        self.csm.drain();
    }

    fn compute_window(&self, window: &[Vec<f32>]) -> Result<Array2<f32>, SimilarityError> {
        let cfg = &self.config;

        // Rotate a fresh copy so rotations never compound across windows
        let reference: Cow<'_, [Vec<f32>]> = if cfg.oti {
            let oti = sequence_oti(window, &self.reference, cfg.noti)?;
            Cow::Owned(rotate_sequence(&self.reference, oti))
        } else {
            Cow::Borrowed(self.reference.as_slice())
        };

        let query_embed = embed_or_empty(window, cfg, "query")?;
        let reference_embed = embed_or_empty(&reference, cfg, "reference")?;

        if cfg.oti_binary {
            return chroma_binary_similarity(
                &query_embed,
                &reference_embed,
                cfg.noti,
                self.num_bins,
                MATCH_COEF,
                MISMATCH_COEF,
            );
        }

        let distances = pairwise_distance(&query_embed, &reference_embed)?;
        if distances.is_empty() {
            return Err(SimilarityError::EmptyResult(
                "empty array found inside euclidean cross similarity matrix".to_string(),
            ));
        }
        let transposed = distances.t().to_owned();

        let query_mask = threshold_mask(&distances, cfg.kappa, true)?;
        let reference_mask = binarize_transposed(&transposed, cfg.kappa)?;

        combine_masks(&query_mask, &reference_mask)
    }
}
