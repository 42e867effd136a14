use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

use crate::models::Record;

/// Draws `sample_size` distinct records uniformly without replacement. The
/// same input sequence, size, and seed always produce the same sample.
pub fn sample_records(records: &[Record], sample_size: usize, seed: u64) -> Vec<Record> {
    if records.len() <= sample_size {
        tracing::warn!(
            available = records.len(),
            requested = sample_size,
            "fewer records than requested sample size, keeping all of them"
        );
        return records.to_vec();
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let sampled: Vec<Record> = index::sample(&mut rng, records.len(), sample_size)
        .iter()
        .map(|position| records[position].clone())
        .collect();

    tracing::info!(
        input = records.len(),
        sampled = sampled.len(),
        seed,
        "drew random sample"
    );
    sampled
}
