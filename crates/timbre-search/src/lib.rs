//! Similarity search for timbre.
//!
//! Turns per-entity audio-feature tables into normalized vector spaces,
//! re-weights them, ranks nearest neighbors by cosine similarity and lays
//! the space out in two dimensions for display. Raw profiles and per-period
//! trends are read from the aggregated tables before normalization.
//!
//! Every operation is a pure, synchronous function of its inputs; state that
//! outlives a request belongs to the caller (see [`WeightSession`]).

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod aggregate;
pub mod profile;
pub mod projection;
pub mod sample;
pub mod session;
pub mod similarity;
pub mod trend;
pub mod tsne;
pub mod vectorize;
pub mod weighting;

pub use aggregate::{aggregate_by_entity, aggregate_by_period, Aggregation};
pub use profile::{compare_profiles, Profile, ProfileComparison, ProfileMatch};
pub use projection::{project_2d, PointCategory, Projection, ProjectionOptions, ProjectedPoint};
pub use sample::sample_space;
pub use session::WeightSession;
pub use similarity::{
    cosine_similarity, find_neighbors, similarity_matrix, Neighbor, SimilarityMatrix,
    SimilarityResult,
};
pub use trend::{trend_changes, TrendChange, TrendReport};
pub use vectorize::{vectorize, Vectorized};
pub use weighting::apply_weights;
