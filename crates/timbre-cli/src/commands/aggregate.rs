use std::path::Path;

use anyhow::Result;
use timbre_core::Feature;
use timbre_search::aggregate_by_entity;

use crate::input::load_rows;
use crate::output;

/// Average the rows in `input` per entity and print the resulting table.
pub fn run(input: &Path, json: bool) -> Result<()> {
    let rows = load_rows(input)?;
    let aggregation = aggregate_by_entity(&rows, &Feature::ALL)?;

    if json {
        return output::print_json(&aggregation);
    }

    output::print_table(&aggregation.table);
    if !aggregation.report.is_empty() {
        println!(
            "\n  ⚠ Skipped {} rows with missing audio features:",
            aggregation.report.count()
        );
        for name in &aggregation.report.dropped {
            println!("    - {name}");
        }
    }
    Ok(())
}
