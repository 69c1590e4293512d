//! Side-by-side feature profiles of an entity and its matches.
//!
//! Profiles are read from the aggregated table before normalization, so the
//! values are in each feature's natural units (tempo in BPM, loudness in dB).

use std::collections::HashSet;

use serde::Serialize;
use timbre_core::{EntityFeatureTable, Error, Feature, Result};

/// Raw mean feature values of one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub name: String,
    pub values: Vec<f64>,
}

/// A matched entity's profile and how far each value sits from the selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileMatch {
    pub name: String,
    pub values: Vec<f64>,
    /// `match - selected`, per column.
    pub differences: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileComparison {
    pub columns: Vec<Feature>,
    pub selected: Profile,
    pub matches: Vec<ProfileMatch>,
}

impl ProfileComparison {
    /// The match whose profile is closest to the selection in mean absolute
    /// difference, if there is any match.
    pub fn closest(&self) -> Option<&ProfileMatch> {
        self.matches.iter().min_by(|a, b| {
            mean_abs(&a.differences).total_cmp(&mean_abs(&b.differences))
        })
    }
}

fn mean_abs(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| v.abs()).sum::<f64>() / values.len() as f64
}

/// Compare the raw profile of `selected` with each of `matches`.
///
/// Matches keep their given order. A name repeated in `matches`, or equal
/// to `selected`, is listed once or not at all. When the table holds the
/// same name twice, its first row is used.
///
/// # Errors
/// Returns [`Error::UnknownEntity`] for a name not in the table and
/// [`Error::MissingFeatureData`] when a compared row has a missing value.
pub fn compare_profiles(
    table: &EntityFeatureTable,
    selected: &str,
    matches: &[&str],
) -> Result<ProfileComparison> {
    let base = profile(table, selected)?;

    let mut seen: HashSet<&str> = HashSet::from([selected]);
    let mut compared = Vec::with_capacity(matches.len());
    for &name in matches {
        if !seen.insert(name) {
            continue;
        }
        let other = profile(table, name)?;
        let differences = other
            .values
            .iter()
            .zip(&base.values)
            .map(|(theirs, ours)| theirs - ours)
            .collect();
        compared.push(ProfileMatch {
            name: other.name,
            values: other.values,
            differences,
        });
    }

    log::debug!("Compared {} with {} matches", selected, compared.len());

    Ok(ProfileComparison {
        columns: table.columns.clone(),
        selected: base,
        matches: compared,
    })
}

fn profile(table: &EntityFeatureTable, name: &str) -> Result<Profile> {
    let row = table
        .rows
        .iter()
        .find(|row| row.name == name)
        .ok_or_else(|| Error::UnknownEntity {
            name: name.to_string(),
        })?;
    Ok(Profile {
        name: row.name.clone(),
        values: row.complete_values(&table.columns)?,
    })
}
