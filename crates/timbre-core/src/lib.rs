//! Core domain model for timbre.
//!
//! This crate defines the fixed audio-feature vocabulary, the raw and
//! per-entity feature rows handed over by the data layer, the paired
//! identity/vector container every similarity operation works on, and the
//! validated feature weights.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;
pub mod weights;

pub use error::{Error, Result};
pub use model::{
    DropReport, EntityFeatureRow, EntityFeatureTable, Feature, FeatureRange, FeatureSpace,
    RawFeatureRow, SpaceEntry,
};
pub use weights::Weights;
