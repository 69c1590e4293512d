use anyhow::{Context, Result};
use timbre_core::EntityFeatureTable;
use timbre_search::{compare_profiles, find_neighbors, ProfileComparison};

use crate::config::Config;
use crate::input::{load_table, weighted_space_of, InputArgs, WeightArgs};
use crate::output;

/// Compare the raw feature profile of `selected` with other entities.
///
/// With no `others`, the `k` most similar entities in the weighted space
/// are compared.
pub fn run(
    selected: &str,
    others: &[String],
    input: &InputArgs,
    weights: &WeightArgs,
    k: usize,
    json: bool,
    config: &Config,
) -> Result<()> {
    let table = load_table(input)?;
    let comparison = build(&table, selected, others, weights, k, config)?;

    if json {
        output::print_json(&comparison)?;
    } else {
        output::print_profiles(&comparison);
    }
    Ok(())
}

fn build(
    table: &EntityFeatureTable,
    selected: &str,
    others: &[String],
    weights: &WeightArgs,
    k: usize,
    config: &Config,
) -> Result<ProfileComparison> {
    let matches: Vec<String> = if others.is_empty() {
        let space = weighted_space_of(table, weights, config)?;
        find_neighbors(selected, &space, k, false)
            .with_context(|| format!("Failed to rank neighbors of '{selected}'"))?
            .neighbors
            .into_iter()
            .map(|n| n.name)
            .collect()
    } else {
        others.to_vec()
    };

    let names: Vec<&str> = matches.iter().map(String::as_str).collect();
    compare_profiles(table, selected, &names)
        .with_context(|| format!("Failed to compare profiles of '{selected}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use timbre_core::{EntityFeatureRow, Feature};

    fn table() -> EntityFeatureTable {
        let row = |name: &str, energy: f64, tempo: f64| {
            let mut values = vec![0.5; Feature::ALL.len()];
            values[Feature::Energy.index()] = energy;
            values[Feature::Tempo.index()] = tempo;
            EntityFeatureRow::complete(name, &values)
        };
        EntityFeatureTable::new()
            .with_row(row("Air", 0.3, 125.0))
            .with_row(row("Nick Drake", 0.25, 120.0))
            .with_row(row("Justice", 0.9, 80.0))
            .with_row(row("Daft Punk", 0.85, 130.0))
            .with_row(row("Burial", 0.2, 100.0))
    }

    #[test]
    fn test_top_neighbors_when_no_others_given() {
        let comparison = build(
            &table(),
            "Air",
            &[],
            &WeightArgs::default(),
            1,
            &Config::default(),
        )
        .unwrap();

        assert_eq!(comparison.matches.len(), 1);
        assert_eq!(comparison.matches[0].name, "Nick Drake");
        let tempo = Feature::Tempo.index();
        assert!((comparison.selected.values[tempo] - 125.0).abs() < 1e-12);
        assert!((comparison.matches[0].differences[tempo] + 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_explicit_others_keep_their_order() {
        let others = vec!["Justice".to_string(), "Daft Punk".to_string()];
        let comparison = build(
            &table(),
            "Air",
            &others,
            &WeightArgs::default(),
            1,
            &Config::default(),
        )
        .unwrap();
        let names: Vec<_> = comparison.matches.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Justice", "Daft Punk"]);
    }

    #[test]
    fn test_unknown_selection() {
        let err = build(
            &table(),
            "Bjork",
            &["Air".to_string()],
            &WeightArgs::default(),
            1,
            &Config::default(),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("unknown entity: Bjork"));
    }
}
