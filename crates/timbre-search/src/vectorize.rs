//! Min-max normalization of an entity feature table.

use timbre_core::{DropReport, EntityFeatureTable, Error, FeatureSpace, Result, SpaceEntry};

/// A normalized space and the rows that were left out of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Vectorized {
    pub space: FeatureSpace,
    pub report: DropReport,
}

/// Rescale every column of the table to `[0, 1]` using the batch's own
/// minimum and maximum.
///
/// Rows with any missing value are dropped before the ranges are fitted. A
/// column that is constant across the batch maps to `0.0` for every row.
///
/// # Errors
/// Returns [`Error::DegenerateBatch`] when no complete row remains.
pub fn vectorize(table: &EntityFeatureTable) -> Result<Vectorized> {
    let columns = table.columns.clone();
    let mut report = DropReport::default();
    let mut entries = Vec::with_capacity(table.len());

    for row in &table.rows {
        match row.complete_values(&columns) {
            Ok(values) => entries.push(SpaceEntry::new(row.name.clone(), values)),
            Err(Error::MissingFeatureData { .. }) => report.record(row.name.clone()),
            Err(e) => return Err(e),
        }
    }

    if !report.is_empty() {
        log::warn!(
            "Dropped {} of {} rows with missing feature data before vectorizing",
            report.count(),
            table.len()
        );
    }

    if entries.is_empty() {
        return Err(Error::DegenerateBatch {
            rows: 0,
            required: 1,
        });
    }

    let ranges: Vec<(f64, f64)> = (0..columns.len())
        .map(|col| {
            entries
                .iter()
                .map(|e| e.vector[col])
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v), hi.max(v))
                })
        })
        .collect();

    for entry in &mut entries {
        for (value, &(lo, hi)) in entry.vector.iter_mut().zip(&ranges) {
            *value = rescale(*value, lo, hi);
        }
    }

    log::debug!(
        "Vectorized {} entities over {} features",
        entries.len(),
        columns.len()
    );

    Ok(Vectorized {
        space: FeatureSpace::new(columns, entries)?,
        report,
    })
}

/// Map `value` from `[lo, hi]` onto `[0, 1]`; a zero-width range maps to 0.
fn rescale(value: f64, lo: f64, hi: f64) -> f64 {
    let span = hi - lo;
    let scaled = if span.is_finite() {
        if span > 0.0 {
            (value - lo) / span
        } else {
            0.0
        }
    } else {
        // hi - lo overflowed; halving keeps every term finite
        (value * 0.5 - lo * 0.5) / (hi * 0.5 - lo * 0.5)
    };
    scaled.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use timbre_core::{EntityFeatureRow, Feature};

    fn table(rows: &[(&str, [Option<f64>; 2])]) -> EntityFeatureTable {
        let mut table = EntityFeatureTable::with_columns(vec![Feature::Energy, Feature::Tempo]);
        for (name, values) in rows {
            table.rows.push(EntityFeatureRow::new(*name, values.to_vec()));
        }
        table
    }

    #[test]
    fn test_min_max_per_column() {
        let t = table(&[
            ("A", [Some(0.2), Some(100.0)]),
            ("B", [Some(0.6), Some(150.0)]),
            ("C", [Some(1.0), Some(200.0)]),
        ]);

        let out = vectorize(&t).unwrap();
        let vectors: Vec<&[f64]> = out.space.vectors().collect();

        assert_eq!(vectors[0], &[0.0, 0.0]);
        assert!((vectors[1][0] - 0.5).abs() < 1e-12);
        assert!((vectors[1][1] - 0.5).abs() < 1e-12);
        assert_eq!(vectors[2], &[1.0, 1.0]);
    }

    #[test]
    fn test_drops_incomplete_rows_and_keeps_alignment() {
        let t = table(&[
            ("A", [Some(0.2), Some(100.0)]),
            ("B", [None, Some(150.0)]),
            ("C", [Some(1.0), Some(200.0)]),
        ]);

        let out = vectorize(&t).unwrap();

        assert_eq!(out.space.names().collect::<Vec<_>>(), vec!["A", "C"]);
        assert_eq!(out.space.entries()[1].vector, vec![1.0, 1.0]);
        assert_eq!(out.report.dropped, vec!["B"]);
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let t = table(&[
            ("A", [Some(0.5), Some(100.0)]),
            ("B", [Some(0.5), Some(120.0)]),
        ]);

        let out = vectorize(&t).unwrap();

        for v in out.space.vectors() {
            assert_eq!(v[0], 0.0);
            assert!(v.iter().all(|x| x.is_finite()));
        }
    }

    #[test]
    fn test_extreme_range_stays_finite() {
        let table = EntityFeatureTable::with_columns(vec![Feature::Tempo])
            .with_row(EntityFeatureRow::complete("low", &[-1e308]))
            .with_row(EntityFeatureRow::complete("high", &[1e308]))
            .with_row(EntityFeatureRow::complete("mid", &[0.0]));
        let out = vectorize(&table).unwrap();
        let values: Vec<f64> = out.space.vectors().map(|v| v[0]).collect();
        assert_eq!(values, vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn test_single_row_is_all_zero() {
        let t = table(&[("A", [Some(0.5), Some(100.0)])]);
        let out = vectorize(&t).unwrap();
        assert_eq!(out.space.entries()[0].vector, vec![0.0, 0.0]);
    }

    #[test]
    fn test_empty_table_is_degenerate() {
        let t = table(&[("A", [None, None])]);
        let err = vectorize(&t).unwrap_err();
        assert!(matches!(err, Error::DegenerateBatch { rows: 0, .. }));

        let empty = EntityFeatureTable::new();
        assert!(matches!(
            vectorize(&empty).unwrap_err(),
            Error::DegenerateBatch { .. }
        ));
    }
}
