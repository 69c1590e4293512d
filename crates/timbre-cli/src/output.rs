//! Terminal rendering of search results.

use anyhow::{Context, Result};
use serde::Serialize;
use timbre_core::EntityFeatureTable;
use timbre_search::{
    PointCategory, ProfileComparison, Projection, SimilarityMatrix, SimilarityResult, TrendReport,
};

/// Widest label printed before it is truncated.
const LABEL_WIDTH: usize = 28;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn label(name: &str) -> String {
    if name.chars().count() <= LABEL_WIDTH {
        name.to_string()
    } else {
        let short: String = name.chars().take(LABEL_WIDTH - 1).collect();
        format!("{short}…")
    }
}

pub fn print_neighbors(result: &SimilarityResult) {
    println!("\n🎧 Entities similar to {}\n", result.query);

    if result.others().is_empty() {
        println!("  No other entities to compare against");
        return;
    }

    let offset = usize::from(!result.includes_self);
    for (rank, neighbor) in result.neighbors.iter().enumerate() {
        println!(
            "  {:>3}. {:<width$}  {:.4}",
            rank + offset,
            label(&neighbor.name),
            neighbor.score,
            width = LABEL_WIDTH
        );
    }
}

pub fn print_projection(projection: &Projection) {
    println!(
        "\n🗺  t-SNE layout of {} entities (perplexity {})\n",
        projection.points.len(),
        projection.perplexity
    );

    for point in &projection.points {
        let marker = match point.category {
            PointCategory::Selected => "★",
            PointCategory::TopSimilar => "●",
            PointCategory::Other => "·",
        };
        let score = point
            .score
            .map_or_else(|| String::from("     -"), |s| format!("{s:.4}"));
        println!(
            "  {marker} {:<width$}  x={:>9.3}  y={:>9.3}  score={score}  size={:.1}",
            label(&point.name),
            point.x,
            point.y,
            point.size,
            width = LABEL_WIDTH
        );
    }
}

pub fn print_matrix(matrix: &SimilarityMatrix) {
    println!("\n🔥 Cosine similarity of {} sampled entities\n", matrix.len());

    for (i, name) in matrix.labels.iter().enumerate() {
        println!("  [{i:>2}] {name}");
    }
    println!();

    let header: String = (0..matrix.len()).map(|j| format!(" [{j:>2}]")).collect();
    println!("      {header}");
    for (i, row) in matrix.values.iter().enumerate() {
        let cells: String = row.iter().map(|v| format!(" {v:>4.2}")).collect();
        println!("  [{i:>2}]{cells}");
    }
}

pub fn print_table(table: &EntityFeatureTable) {
    let header: String = table
        .columns
        .iter()
        .map(|f| format!(" {:>8.8}", f.name()))
        .collect();
    println!("\n  {:<width$}{header}", "entity", width = LABEL_WIDTH);

    for row in &table.rows {
        let cells: String = row
            .values
            .iter()
            .map(|v| v.map_or_else(|| format!(" {:>8}", "-"), |v| format!(" {v:>8.3}")))
            .collect();
        println!("  {:<width$}{cells}", label(&row.name), width = LABEL_WIDTH);
    }

    println!("\n  {} entities", table.len());
}

pub fn print_profiles(comparison: &ProfileComparison) {
    println!("\n📊 Feature profile of {}\n", comparison.selected.name);

    let header: String = comparison
        .matches
        .iter()
        .map(|m| format!(" {:>12.12}", m.name))
        .collect();
    println!("  {:<18} {:>10}{header}", "feature", label(&comparison.selected.name));

    for (j, feature) in comparison.columns.iter().enumerate() {
        let cells: String = comparison
            .matches
            .iter()
            .map(|m| format!(" {:>+12.3}", m.differences[j]))
            .collect();
        println!(
            "  {:<18} {:>10.3}{cells}",
            feature.name(),
            comparison.selected.values[j]
        );
    }

    match comparison.closest() {
        Some(closest) => println!("\n  Closest profile: {}", closest.name),
        None => println!("\n  No matches to compare against"),
    }
}

pub fn print_trends(report: &TrendReport) {
    println!("\n📈 Audio trends for {} against the average of all periods\n", report.period);

    println!(
        "  {:<18} {:>10} {:>10} {:>10}",
        "feature", "average", report.period, "change"
    );
    for change in &report.changes {
        println!(
            "  {:<18} {:>10.3} {:>10.3} {:>+10.3}",
            change.feature.name(),
            change.baseline,
            change.period_mean,
            change.change
        );
    }

    if let Some(largest) = report.largest() {
        println!("\n  Largest shift: {}", largest.feature);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_keeps_short_names() {
        assert_eq!(label("Air"), "Air");
    }

    #[test]
    fn test_label_truncates_long_names() {
        let long = "Godspeed You! Black Emperor & Friends";
        let short = label(long);
        assert_eq!(short.chars().count(), LABEL_WIDTH);
        assert!(short.ends_with('…'));
    }
}
