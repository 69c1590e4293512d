use serde::{Deserialize, Serialize};

use crate::model::feature::Feature;
use crate::model::row::{EntityFeatureRow, RawFeatureRow};

/// A table of per-entity feature values over a fixed, ordered column set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityFeatureTable {
    pub columns: Vec<Feature>,
    pub rows: Vec<EntityFeatureRow>,
}

impl EntityFeatureTable {
    /// An empty table over every audio feature.
    #[must_use]
    pub fn new() -> Self {
        Self::with_columns(Feature::ALL.to_vec())
    }

    #[must_use]
    pub fn with_columns(columns: Vec<Feature>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Treat every raw row as its own entity (the song view).
    ///
    /// Missing values are kept as `None`; vectorization drops those rows.
    #[must_use]
    pub fn from_raw_rows(rows: &[RawFeatureRow], columns: &[Feature]) -> Self {
        let rows = rows
            .iter()
            .map(|raw| {
                EntityFeatureRow::new(
                    raw.entity.clone(),
                    columns.iter().map(|&feature| raw.get(feature)).collect(),
                )
            })
            .collect();
        Self {
            columns: columns.to_vec(),
            rows,
        }
    }

    #[must_use]
    pub fn with_row(mut self, row: EntityFeatureRow) -> Self {
        self.rows.push(row);
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row.name.as_str())
    }
}

impl Default for EntityFeatureTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Rows excluded from a batch because a feature value was missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropReport {
    /// Entity names of the dropped rows, in input order.
    pub dropped: Vec<String>,
}

impl DropReport {
    pub fn record(&mut self, entity: impl Into<String>) {
        self.dropped.push(entity.into());
    }

    pub fn count(&self) -> usize {
        self.dropped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dropped.is_empty()
    }
}
