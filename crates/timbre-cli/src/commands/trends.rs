use std::path::Path;

use anyhow::{Context, Result};
use timbre_core::{Feature, RawFeatureRow};
use timbre_search::{aggregate_by_period, trend_changes, TrendReport};

use crate::input::load_rows;
use crate::output;

/// Show how a period's audio descriptors differ from the all-period average.
///
/// Without `period`, the latest one in the input is used.
pub fn run(input: &Path, period: Option<&str>, json: bool) -> Result<()> {
    let rows = load_rows(input)?;
    let report = build(&rows, period)?;

    if json {
        output::print_json(&report)?;
    } else {
        output::print_trends(&report);
    }
    Ok(())
}

fn build(rows: &[RawFeatureRow], period: Option<&str>) -> Result<TrendReport> {
    let aggregation = aggregate_by_period(rows, &Feature::DESCRIPTORS)?;
    if !aggregation.report.is_empty() {
        eprintln!(
            "⚠ Skipped {} rows without a period or audio features",
            aggregation.report.count()
        );
    }

    let period = match period {
        Some(period) => period,
        None => aggregation
            .table
            .rows
            .last()
            .map(|row| row.name.as_str())
            .context("No rows carry a period (\"period\" or \"year\")")?,
    };

    trend_changes(&aggregation.table, period)
        .with_context(|| format!("Failed to compute trends for {period}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<RawFeatureRow> {
        let row = |period: &str, value: f64| {
            Feature::DESCRIPTORS
                .iter()
                .fold(RawFeatureRow::new("track").in_period(period), |row, &f| {
                    row.with(f, value)
                })
        };
        vec![row("2019", 0.2), row("2021", 0.6), row("2020", 0.4), row("2021", 0.8)]
    }

    #[test]
    fn test_defaults_to_latest_period() {
        let report = build(&rows(), None).unwrap();
        assert_eq!(report.period, "2021");
        assert_eq!(report.changes.len(), Feature::DESCRIPTORS.len());
        // baseline (0.2 + 0.4 + 0.7) / 3 against 0.7
        let change = report.changes[0].change;
        assert!((change - (1.3 / 3.0 - 0.7)).abs() < 1e-12);
    }

    #[test]
    fn test_named_period() {
        let report = build(&rows(), Some("2019")).unwrap();
        assert_eq!(report.period, "2019");
        assert!(report.changes.iter().all(|c| c.change > 0.0));
    }

    #[test]
    fn test_rows_without_periods() {
        let rows = vec![RawFeatureRow::new("track").with(Feature::Energy, 0.5)];
        assert!(build(&rows, None).is_err());
    }

    #[test]
    fn test_unknown_period() {
        let err = build(&rows(), Some("1999")).unwrap_err();
        assert!(format!("{err:#}").contains("1999"));
    }
}
