use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A row lacked a value for one of the required features.
    ///
    /// Aggregation and vectorization recover from this by dropping the row.
    #[error("missing feature data: {entity} has no value for {feature}")]
    MissingFeatureData { entity: String, feature: String },

    #[error("unknown entity: {name} is not in the current batch")]
    UnknownEntity { name: String },

    #[error("invalid weight: {name} is not a known audio feature")]
    InvalidWeightFeature { name: String },

    #[error("invalid weight for {feature}: {value} is not a positive finite multiplier")]
    InvalidWeightValue { feature: String, value: f64 },

    /// Identities and vectors fell out of step. Recompute from scratch.
    #[error("alignment violation: {identities} identities for {vectors} vectors")]
    AlignmentViolation { identities: usize, vectors: usize },

    /// A vector is wider or narrower than the space's column list.
    #[error("dimension mismatch: {entity} has {actual} values for {expected} columns")]
    DimensionMismatch {
        entity: String,
        expected: usize,
        actual: usize,
    },

    #[error("degenerate batch: {rows} usable rows, at least {required} required")]
    DegenerateBatch { rows: usize, required: usize },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` when the error names an entity that is not in the batch.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownEntity { .. })
    }

    /// Returns `true` when the caller can carry on with the rest of the batch
    /// or session after reporting the error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MissingFeatureData { .. }
                | Self::UnknownEntity { .. }
                | Self::InvalidWeightFeature { .. }
                | Self::InvalidWeightValue { .. }
                | Self::DegenerateBatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
