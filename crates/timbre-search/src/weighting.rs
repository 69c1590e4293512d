//! Per-feature re-weighting of a normalized space.

use timbre_core::{FeatureSpace, Weights};

/// Multiply every column by its weight, returning a new space.
///
/// Unweighted columns keep multiplier `1.0`; weights for features the space
/// does not carry have no effect. The input space is left untouched, so the
/// caller can always go back to the base normalization.
pub fn apply_weights(space: &FeatureSpace, weights: &Weights) -> FeatureSpace {
    let multipliers = weights.for_columns(space.columns());
    log::debug!(
        "Applying {} feature weights to {} entities",
        weights.len(),
        space.len()
    );
    space.map_vectors(|vector| {
        vector
            .iter()
            .zip(&multipliers)
            .map(|(value, weight)| value * weight)
            .collect()
    })
}
