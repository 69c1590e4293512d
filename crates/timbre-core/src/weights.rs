//! Per-feature multipliers applied on top of a normalized feature space.
//!
//! Weights are sparse: a feature without an entry has multiplier `1.0`.
//! Every key is validated against the audio-feature vocabulary when the
//! weights are built, so an unknown name is rejected before any computation.
//!
//! A weights file is a TOML document with a `[weights]` table:
//!
//! ```toml
//! [weights]
//! tempo = 5.0
//! danceability = 1.5
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::Feature;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Weights {
    multipliers: BTreeMap<Feature, f64>,
}

/// On-disk layout of a weights file.
#[derive(Debug, Deserialize)]
struct WeightsFile {
    #[serde(default)]
    weights: HashMap<String, f64>,
}

impl Weights {
    /// Empty weights: every multiplier is `1.0`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a name-keyed map.
    ///
    /// # Errors
    /// Returns [`Error::InvalidWeightFeature`] for a key outside the feature
    /// set and [`Error::InvalidWeightValue`] for a non-positive or non-finite
    /// multiplier.
    pub fn from_map<K: AsRef<str>>(map: impl IntoIterator<Item = (K, f64)>) -> Result<Self> {
        let mut weights = Self::new();
        for (name, value) in map {
            let feature: Feature = name.as_ref().parse()?;
            weights.set(feature, value)?;
        }
        Ok(weights)
    }

    /// Load weights from a TOML file with a `[weights]` table.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        let file: WeightsFile = toml::from_str(&content).map_err(|e| {
            Error::InvalidData(format!(
                "failed to parse weights from {}: {}",
                path.display(),
                e
            ))
        })?;
        let weights = Self::from_map(file.weights)?;
        log::debug!(
            "Loaded {} feature weights from {}",
            weights.len(),
            path.display()
        );
        Ok(weights)
    }

    /// Parse a `feature=value` pair, as given on the command line.
    pub fn parse_pair(pair: &str) -> Result<(Feature, f64)> {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| Error::InvalidData(format!("expected feature=value, got {pair}")))?;
        let feature: Feature = name.parse()?;
        let value: f64 = value.trim().parse().map_err(|_| {
            Error::InvalidData(format!(
                "weight for {feature} is not a number: '{}'",
                value.trim()
            ))
        })?;
        Ok((feature, value))
    }

    pub fn set(&mut self, feature: Feature, value: f64) -> Result<()> {
        if !value.is_finite() || value <= 0.0 {
            return Err(Error::InvalidWeightValue {
                feature: feature.name().to_string(),
                value,
            });
        }
        self.multipliers.insert(feature, value);
        Ok(())
    }

    pub fn with(mut self, feature: Feature, value: f64) -> Result<Self> {
        self.set(feature, value)?;
        Ok(self)
    }

    /// Multiplier for a feature, `1.0` when unset.
    pub fn get(&self, feature: Feature) -> f64 {
        self.multipliers.get(&feature).copied().unwrap_or(1.0)
    }

    /// Multipliers laid out along the given columns.
    pub fn for_columns(&self, columns: &[Feature]) -> Vec<f64> {
        columns.iter().map(|&feature| self.get(feature)).collect()
    }

    /// Drop every multiplier.
    pub fn reset(&mut self) {
        self.multipliers.clear();
    }

    pub fn len(&self) -> usize {
        self.multipliers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.multipliers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        self.multipliers.iter().map(|(&feature, &value)| (feature, value))
    }
}
