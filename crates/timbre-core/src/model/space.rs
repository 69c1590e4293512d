use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::feature::Feature;

/// An entity identity paired with its feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceEntry {
    pub name: String,
    pub vector: Vec<f64>,
}

impl SpaceEntry {
    #[must_use]
    pub fn new(name: impl Into<String>, vector: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            vector,
        }
    }
}

/// A batch of entity vectors over an ordered column set.
///
/// Identities and vectors live in the same entry, so filtering, sorting or
/// sampling can never pull them apart. Every vector has one component per
/// column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpace {
    columns: Vec<Feature>,
    entries: Vec<SpaceEntry>,
}

impl FeatureSpace {
    /// Build a space from already-paired entries.
    ///
    /// # Errors
    /// Returns [`Error::DimensionMismatch`] if any vector width differs from
    /// the column count.
    pub fn new(columns: Vec<Feature>, entries: Vec<SpaceEntry>) -> Result<Self> {
        if let Some(bad) = entries.iter().find(|e| e.vector.len() != columns.len()) {
            return Err(Error::DimensionMismatch {
                entity: bad.name.clone(),
                expected: columns.len(),
                actual: bad.vector.len(),
            });
        }
        Ok(Self { columns, entries })
    }

    /// Pair a separately-held identity list and matrix.
    ///
    /// # Errors
    /// Returns [`Error::AlignmentViolation`] if the two lengths differ and
    /// [`Error::DimensionMismatch`] if a row has the wrong width.
    pub fn from_parts(
        columns: Vec<Feature>,
        names: Vec<String>,
        matrix: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if names.len() != matrix.len() {
            return Err(Error::AlignmentViolation {
                identities: names.len(),
                vectors: matrix.len(),
            });
        }
        let entries = names
            .into_iter()
            .zip(matrix)
            .map(|(name, vector)| SpaceEntry { name, vector })
            .collect();
        Self::new(columns, entries)
    }

    pub fn columns(&self) -> &[Feature] {
        &self.columns
    }

    pub fn entries(&self) -> &[SpaceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn vectors(&self) -> impl Iterator<Item = &[f64]> {
        self.entries.iter().map(|e| e.vector.as_slice())
    }

    /// Index of the first entry carrying this identity.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    /// Column index of a feature, if the space carries it.
    pub fn column_index(&self, feature: Feature) -> Option<usize> {
        self.columns.iter().position(|&c| c == feature)
    }

    /// Keep the columns, transform every vector. Widths are preserved.
    #[must_use]
    pub fn map_vectors(&self, mut f: impl FnMut(&[f64]) -> Vec<f64>) -> Self {
        let entries = self
            .entries
            .iter()
            .map(|e| SpaceEntry::new(e.name.clone(), f(&e.vector)))
            .collect();
        Self {
            columns: self.columns.clone(),
            entries,
        }
    }

    /// A new space holding the entries at `indices`, in that order.
    ///
    /// Out-of-range indices are skipped.
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> Self {
        let entries = indices
            .iter()
            .filter_map(|&i| self.entries.get(i).cloned())
            .collect();
        Self {
            columns: self.columns.clone(),
            entries,
        }
    }

    pub fn into_entries(self) -> Vec<SpaceEntry> {
        self.entries
    }
}
