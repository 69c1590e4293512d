//! Reduce raw rows (tracks) to one mean feature row per owning entity or
//! per period.

use std::collections::HashMap;

use serde::Serialize;
use timbre_core::{
    DropReport, EntityFeatureRow, EntityFeatureTable, Error, Feature, RawFeatureRow, Result,
};

/// The per-entity table plus the raw rows that could not contribute to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    pub table: EntityFeatureTable,
    pub report: DropReport,
}

struct Accumulator {
    name: String,
    sums: Vec<f64>,
    count: usize,
}

/// Average every requested column over the rows of each entity.
///
/// Output rows follow the order in which entities first appear. A raw row
/// missing any requested column is left out and recorded in the report; an
/// entity left with no rows does not appear in the table.
///
/// # Errors
/// Returns [`Error::InvalidData`] if `columns` is empty or repeats a feature.
pub fn aggregate_by_entity(rows: &[RawFeatureRow], columns: &[Feature]) -> Result<Aggregation> {
    validate_columns(columns)?;

    let aggregation = group_means(rows, columns, |row| Some(row.entity.as_str()));

    log::info!(
        "Aggregated {} rows into {} entities",
        rows.len() - aggregation.report.count(),
        aggregation.table.len()
    );

    Ok(aggregation)
}

/// Average every requested column over the rows of each period.
///
/// The table has one row per period label, named after it and sorted by
/// label, so `"2019"` comes before `"2020"`. Rows with no period or a
/// missing requested column are left out and recorded in the report.
///
/// # Errors
/// Returns [`Error::InvalidData`] if `columns` is empty or repeats a feature.
pub fn aggregate_by_period(rows: &[RawFeatureRow], columns: &[Feature]) -> Result<Aggregation> {
    validate_columns(columns)?;

    let mut aggregation = group_means(rows, columns, |row| row.period.as_deref());
    aggregation.table.rows.sort_by(|a, b| a.name.cmp(&b.name));

    log::info!(
        "Aggregated {} rows into {} periods",
        rows.len() - aggregation.report.count(),
        aggregation.table.len()
    );

    Ok(aggregation)
}

/// Mean of each column per group key, in first-appearance order.
fn group_means<'a, F>(rows: &'a [RawFeatureRow], columns: &[Feature], key: F) -> Aggregation
where
    F: Fn(&'a RawFeatureRow) -> Option<&'a str>,
{
    let mut report = DropReport::default();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut accumulators: Vec<Accumulator> = Vec::new();

    for row in rows {
        let Some(group) = key(row) else {
            log::debug!("Skipping row for {}: no group", row.entity);
            report.record(row.entity.clone());
            continue;
        };
        let values = match row.require(columns) {
            Ok(values) => values,
            Err(e) => {
                log::debug!("Skipping row: {}", e);
                report.record(row.entity.clone());
                continue;
            }
        };

        let slot = *index.entry(group).or_insert_with(|| {
            accumulators.push(Accumulator {
                name: group.to_string(),
                sums: vec![0.0; columns.len()],
                count: 0,
            });
            accumulators.len() - 1
        });

        let acc = &mut accumulators[slot];
        for (sum, value) in acc.sums.iter_mut().zip(values) {
            *sum += value;
        }
        acc.count += 1;
    }

    if !report.is_empty() {
        log::warn!(
            "Dropped {} of {} rows with missing feature data",
            report.count(),
            rows.len()
        );
    }

    let mut table = EntityFeatureTable::with_columns(columns.to_vec());
    for acc in accumulators {
        let count = acc.count as f64;
        let means: Vec<f64> = acc.sums.iter().map(|sum| sum / count).collect();
        table.rows.push(EntityFeatureRow::complete(acc.name, &means));
    }

    Aggregation { table, report }
}

fn validate_columns(columns: &[Feature]) -> Result<()> {
    if columns.is_empty() {
        return Err(Error::InvalidData(
            "at least one feature column is required".to_string(),
        ));
    }
    for (i, feature) in columns.iter().enumerate() {
        if columns[..i].contains(feature) {
            return Err(Error::InvalidData(format!(
                "feature column {feature} requested more than once"
            )));
        }
    }
    Ok(())
}
