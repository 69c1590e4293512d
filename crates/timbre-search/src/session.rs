//! Caller-owned weighting state.
//!
//! The search functions hold nothing between calls. An interactive caller
//! that lets a user tweak weights keeps one [`WeightSession`] per loaded
//! batch and hands [`WeightSession::current`] to the similarity and
//! projection functions.

use timbre_core::{FeatureSpace, Weights};

use crate::weighting::apply_weights;

#[derive(Debug, Clone, PartialEq)]
pub struct WeightSession {
    base: FeatureSpace,
    weights: Weights,
    weighted: FeatureSpace,
}

impl WeightSession {
    /// Start from a normalized base space with no weights.
    #[must_use]
    pub fn new(base: FeatureSpace) -> Self {
        Self {
            weighted: base.clone(),
            base,
            weights: Weights::new(),
        }
    }

    /// Replace the weights and recompute the weighted space from the base.
    pub fn set_weights(&mut self, weights: Weights) {
        self.weighted = apply_weights(&self.base, &weights);
        self.weights = weights;
    }

    /// Drop every weight and go back to the base normalization.
    pub fn reset_weights(&mut self) {
        self.weights.reset();
        self.weighted = self.base.clone();
    }

    /// Swap in a new base batch, discarding the cached weighted space.
    ///
    /// The current weights are re-applied to the new base.
    pub fn rebase(&mut self, base: FeatureSpace) {
        self.weighted = apply_weights(&base, &self.weights);
        self.base = base;
    }

    /// The space queries should run against.
    pub fn current(&self) -> &FeatureSpace {
        &self.weighted
    }

    pub fn base(&self) -> &FeatureSpace {
        &self.base
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }
}
