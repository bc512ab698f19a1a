//! Pairwise Euclidean distances between two frame sequences

use ndarray::Array2;

use crate::error::SimilarityError;

/// Compute the Euclidean distance between every frame of `a` and every frame of `b`
///
/// Entry `[i, j]` is `||a[i] - b[j]||`. Either sequence being empty gives an
/// empty matrix; callers decide whether that is an error.
///
/// # Errors
///
/// Returns `SimilarityError::InvalidInput` if frames of `a` and `b` differ in width.
pub fn pairwise_distance(a: &[Vec<f32>], b: &[Vec<f32>]) -> Result<Array2<f32>, SimilarityError> {
    if let (Some(fa), Some(fb)) = (a.first(), b.first()) {
        if fa.len() != fb.len() {
            return Err(SimilarityError::InvalidInput(format!(
                "cannot compare frames of width {} and {}",
                fa.len(),
                fb.len()
            )));
        }
    }

    let mut distances = Array2::<f32>::zeros((a.len(), b.len()));
    for (i, frame_a) in a.iter().enumerate() {
        for (j, frame_b) in b.iter().enumerate() {
            let dist_sq: f32 = frame_a
                .iter()
                .zip(frame_b.iter())
                .map(|(x, y)| (x - y) * (x - y))
                .sum();
            distances[[i, j]] = dist_sq.sqrt();
        }
    }

    Ok(distances)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairwise_distance_values() {
        let a = vec![vec![0.0, 0.0], vec![3.0, 4.0]];
        let b = vec![vec![0.0, 0.0], vec![0.0, 4.0], vec![3.0, 0.0]];
        let d = pairwise_distance(&a, &b).unwrap();

        assert_eq!(d.dim(), (2, 3));
        assert!((d[[0, 0]] - 0.0).abs() < 1e-6);
        assert!((d[[0, 1]] - 4.0).abs() < 1e-6);
        assert!((d[[1, 0]] - 5.0).abs() < 1e-6);
        assert!((d[[1, 2]] - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_pairwise_distance_empty_side() {
        let a: Vec<Vec<f32>> = vec![];
        let b = vec![vec![1.0, 2.0]];
        let d = pairwise_distance(&a, &b).unwrap();
        assert!(d.is_empty());
    }

    #[test]
    fn test_pairwise_distance_width_mismatch() {
        let a = vec![vec![1.0, 2.0]];
        let b = vec![vec![1.0, 2.0, 3.0]];
        assert!(matches!(
            pairwise_distance(&a, &b),
            Err(SimilarityError::InvalidInput(_))
        ));
    }
}
