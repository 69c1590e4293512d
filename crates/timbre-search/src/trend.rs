//! How one period's sound differs from the average across all periods.

use serde::Serialize;
use timbre_core::{EntityFeatureTable, Error, Feature, Result};

/// The shift of one feature in one period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendChange {
    pub feature: Feature,
    /// Mean of the per-period means.
    pub baseline: f64,
    pub period_mean: f64,
    /// `baseline - period_mean`: positive when the period sits below the
    /// long-run average.
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub period: String,
    pub changes: Vec<TrendChange>,
}

impl TrendReport {
    /// The change with the largest magnitude.
    pub fn largest(&self) -> Option<&TrendChange> {
        self.changes
            .iter()
            .max_by(|a, b| a.change.abs().total_cmp(&b.change.abs()))
    }
}

/// Compare `period` with the average over every period in `table`.
///
/// `table` holds one row per period, as built by
/// [`aggregate_by_period`](crate::aggregate_by_period). Each period counts
/// once in the baseline however many tracks it had.
///
/// # Errors
/// Returns [`Error::UnknownEntity`] when `period` is not a row of the table
/// and [`Error::MissingFeatureData`] when any row has a missing value.
pub fn trend_changes(table: &EntityFeatureTable, period: &str) -> Result<TrendReport> {
    let rows = table
        .rows
        .iter()
        .map(|row| row.complete_values(&table.columns))
        .collect::<Result<Vec<_>>>()?;

    let current = table
        .rows
        .iter()
        .position(|row| row.name == period)
        .ok_or_else(|| Error::UnknownEntity {
            name: period.to_string(),
        })?;

    let count = rows.len() as f64;
    let changes = table
        .columns
        .iter()
        .enumerate()
        .map(|(j, &feature)| {
            let baseline = rows.iter().map(|values| values[j]).sum::<f64>() / count;
            let period_mean = rows[current][j];
            TrendChange {
                feature,
                baseline,
                period_mean,
                change: baseline - period_mean,
            }
        })
        .collect();

    Ok(TrendReport {
        period: period.to_string(),
        changes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use timbre_core::EntityFeatureRow;

    fn years() -> EntityFeatureTable {
        EntityFeatureTable::with_columns(vec![Feature::Energy, Feature::Acousticness])
            .with_row(EntityFeatureRow::complete("2018", &[0.5, 0.4]))
            .with_row(EntityFeatureRow::complete("2019", &[0.6, 0.3]))
            .with_row(EntityFeatureRow::complete("2020", &[0.7, 0.2]))
    }

    #[test]
    fn test_change_is_baseline_minus_period() {
        let report = trend_changes(&years(), "2020").unwrap();

        assert_eq!(report.period, "2020");
        assert_eq!(report.changes.len(), 2);
        let energy = report.changes[0];
        assert_eq!(energy.feature, Feature::Energy);
        assert!((energy.baseline - 0.6).abs() < 1e-12);
        assert!((energy.period_mean - 0.7).abs() < 1e-12);
        assert!((energy.change + 0.1).abs() < 1e-12);
        assert!((report.changes[1].change - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_middle_period_has_no_change() {
        let report = trend_changes(&years(), "2019").unwrap();
        assert!(report.changes.iter().all(|c| c.change.abs() < 1e-12));
    }

    #[test]
    fn test_largest_change() {
        let table = EntityFeatureTable::with_columns(vec![Feature::Energy, Feature::Valence])
            .with_row(EntityFeatureRow::complete("2019", &[0.5, 0.9]))
            .with_row(EntityFeatureRow::complete("2020", &[0.6, 0.1]));
        let report = trend_changes(&table, "2020").unwrap();
        assert_eq!(report.largest().unwrap().feature, Feature::Valence);
    }

    #[test]
    fn test_unknown_period() {
        assert!(matches!(
            trend_changes(&years(), "1999"),
            Err(Error::UnknownEntity { ref name }) if name == "1999"
        ));
    }

    #[test]
    fn test_incomplete_period_row() {
        let table = years().with_row(EntityFeatureRow::new("2021", vec![Some(0.1), None]));
        assert!(matches!(
            trend_changes(&table, "2020"),
            Err(Error::MissingFeatureData { .. })
        ));
    }
}
