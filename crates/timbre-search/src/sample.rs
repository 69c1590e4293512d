//! Seeded sampling of a feature space.

use rand::rngs::StdRng;
use rand::SeedableRng;
use timbre_core::FeatureSpace;

/// Draw up to `size` distinct entries without replacement.
///
/// The same seed always yields the same sample. Sampled entries keep their
/// identity/vector pairing and appear in draw order.
pub fn sample_space(space: &FeatureSpace, size: usize, seed: u64) -> FeatureSpace {
    let amount = size.min(space.len());
    let mut rng = StdRng::seed_from_u64(seed);
    let indices = rand::seq::index::sample(&mut rng, space.len(), amount).into_vec();
    log::debug!(
        "Sampled {} of {} entities with seed {}",
        amount,
        space.len(),
        seed
    );
    space.select(&indices)
}
