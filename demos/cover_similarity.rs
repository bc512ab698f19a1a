//! Example: Cross-similarity between a song and a transposed cover
//!
//! Builds a synthetic chord progression, transposes it as a "cover" and prints
//! how many recurrences the engine finds.

use stratum_csm::features::rotate_sequence;
use stratum_csm::{compute_cross_similarity, CrossSimilarityConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    // I - V - vi - IV, eight frames per chord
    let progression = [0usize, 7, 9, 5];
    let original: Vec<Vec<f32>> = (0..128)
        .map(|t| {
            let root = progression[(t / 8) % 4];
            let mut frame = vec![0.05f32; 12];
            frame[root] = 1.0;
            frame[(root + 4) % 12] = 0.7;
            frame[(root + 7) % 12] = 0.5;
            frame
        })
        .collect();
    let cover = rotate_sequence(&original, 3);

    let config = CrossSimilarityConfig::default();
    let csm = compute_cross_similarity(&cover, &original, config)?;

    let recurrences = csm.iter().filter(|&&v| v > 0.0).count();
    println!("Cross-similarity Results:");
    println!("  Shape: {} x {}", csm.nrows(), csm.ncols());
    println!(
        "  Recurrences: {} ({:.1}%)",
        recurrences,
        100.0 * recurrences as f32 / csm.len() as f32
    );

    Ok(())
}
