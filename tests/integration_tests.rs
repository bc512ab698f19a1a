//! Integration tests for the cross-similarity engine

use stratum_csm::features::{rotate_sequence, time_embedding};
use stratum_csm::{
    compute_cross_similarity, CrossSimilarityConfig, ProcessStatus, SimilarityError,
    StreamingCrossSimilarity,
};

/// Deterministic chroma-like frames in [0, 1)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_dimensions() {
        for (m, tau) in [(1, 1), (1, 3), (2, 1), (4, 2), (9, 1)] {
            let config = CrossSimilarityConfig {
                embed_dimension: m,
                tau,
                ..Default::default()
            };
            let query = pseudo_chroma(40, 1);
            let reference = pseudo_chroma(33, 2);
            let csm = compute_cross_similarity(&query, &reference, config)
                .expect("Cross-similarity should succeed");

            let (rows, cols) = if m == 1 { (40, 33) } else { (40 - m * tau, 33 - m * tau) };
            assert_eq!(csm.dim(), (rows, cols), "m={}, tau={}", m, tau);
        }
    }

    #[test]
    fn test_empty_inputs() {
        let chroma = pseudo_chroma(20, 3);
        let config = CrossSimilarityConfig::default();

        assert!(matches!(
            compute_cross_similarity(&[], &chroma, config.clone()),
            Err(SimilarityError::EmptyInput(_))
        ));
        assert!(matches!(
            compute_cross_similarity(&chroma, &[], config),
            Err(SimilarityError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_identity_pattern_self_similarity() {
        let chroma = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
            vec![1.0, 0.0, 0.0],
        ];
        let config = CrossSimilarityConfig {
            embed_dimension: 1,
            oti: false,
            oti_binary: false,
            optimise_threshold: true,
            ..Default::default()
        };

        let csm = compute_cross_similarity(&chroma, &chroma, config).unwrap();
        for i in 0..4 {
            assert_eq!(csm[[i, i]], 1.0);
        }
        // Frames 0 and 3 are identical
        assert_eq!(csm[[0, 3]], 1.0);
        assert_eq!(csm[[3, 0]], 1.0);
    }

    #[test]
    fn test_transposed_cover_found_on_diagonal() {
        let original = pseudo_chroma(50, 5);
        let cover = rotate_sequence(&original, 4);
        let config = CrossSimilarityConfig {
            embed_dimension: 3,
            ..Default::default()
        };

        let csm = compute_cross_similarity(&cover, &original, config).unwrap();
        let diagonal_hits = (0..csm.nrows()).filter(|&i| csm[[i, i]] == 1.0).count();
        assert_eq!(diagonal_hits, csm.nrows());

        let density = csm.sum() / csm.len() as f32;
        assert!(density < 0.2, "recurrence density should stay sparse, got {:.3}", density);
    }

    #[test]
    fn test_embedding_rows_are_stacked_frames() {
        let frames: Vec<Vec<f32>> = (0..5)
            .map(|i| (0..3).map(|j| (i * 3 + j) as f32).collect())
            .collect();

        let embedded = time_embedding(&frames, 2, 1).unwrap();
        assert_eq!(embedded.len(), 3);
        assert_eq!(embedded[1], [frames[1].clone(), frames[2].clone()].concat());
    }

    #[test]
    fn test_streaming_end_to_end() {
        let reference = pseudo_chroma(30, 7);
        let query = pseudo_chroma(12, 8);
        let config = CrossSimilarityConfig {
            embed_dimension: 3,
            ..Default::default()
        };

        let mut engine = StreamingCrossSimilarity::new(reference, config).unwrap();
        let mut emitted = Vec::new();

        for chunk in query.chunks(5) {
            engine.push_frames(chunk.to_vec());
            emitted.extend(engine.run().unwrap());
        }
        engine.end_of_stream();
        emitted.extend(engine.run().unwrap());

        // Windows of 4 frames with hop 1 over 12 frames, plus the final partial window
        assert_eq!(emitted.len(), 10);
        for csm in &emitted {
            assert_eq!(csm.dim(), (1, 27));
            assert!(csm.iter().all(|&v| v == 0.0 || v == 1.0));
        }
        assert_eq!(engine.process().unwrap(), ProcessStatus::NoMoreInput);
    }
}
