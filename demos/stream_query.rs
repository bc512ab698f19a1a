//! Example: Feed a query stream into the streaming engine
//!
//! Pushes query frames in small chunks, as a live chroma extractor would, and
//! collects one matrix per window.

use stratum_csm::{CrossSimilarityConfig, ProcessStatus, StreamingCrossSimilarity};

fn chroma(n_frames: usize, offset: usize) -> Vec<Vec<f32>> {
    (0..n_frames)
        .map(|t| {
            let mut frame = vec![0.05f32; 12];
            frame[(t / 4 + offset) % 12] = 1.0;
            frame
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = CrossSimilarityConfig {
        embed_dimension: 4,
        ..Default::default()
    };
    let mut engine = StreamingCrossSimilarity::new(chroma(96, 0), config)?;

    let query = chroma(40, 2);
    let mut windows = 0;
    for (i, chunk) in query.chunks(6).enumerate() {
        engine.push_frames(chunk.to_vec());
        let emitted = engine.run()?;
        windows += emitted.len();
        println!("[chunk {}] emitted {} matrices", i + 1, emitted.len());
    }

    engine.end_of_stream();
    windows += engine.run()?.len();
    assert_eq!(engine.process()?, ProcessStatus::NoMoreInput);

    println!("Processed {} windows", windows);
    Ok(())
}
