//! Loading feature rows and weights from disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use timbre_core::{EntityFeatureTable, Feature, FeatureSpace, RawFeatureRow, Weights};
use timbre_search::{aggregate_by_entity, vectorize, WeightSession};

use crate::config::Config;

/// Where the rows come from and how they are grouped.
#[derive(Debug, Clone, clap::Args)]
pub struct InputArgs {
    /// JSON file holding an array of rows: {"entity": ..., "danceability": ..., ...}
    #[arg(long, short)]
    pub input: PathBuf,

    /// Average rows per entity before comparing (artist view)
    ///
    /// Without this flag every row is compared on its own (song view).
    #[arg(long)]
    pub by_entity: bool,
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct WeightArgs {
    /// Feature weight, e.g. --weight tempo=5 (repeatable)
    #[arg(long = "weight", value_name = "FEATURE=VALUE")]
    pub weights: Vec<String>,

    /// TOML file with a [weights] table
    #[arg(long)]
    pub weights_file: Option<PathBuf>,
}

/// Read a JSON array of raw rows.
pub fn load_rows(path: &Path) -> Result<Vec<RawFeatureRow>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file {}", path.display()))?;
    let rows: Vec<RawFeatureRow> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse rows from {}", path.display()))?;
    log::info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Build the per-entity table the input arguments ask for.
pub fn load_table(args: &InputArgs) -> Result<EntityFeatureTable> {
    let rows = load_rows(&args.input)?;
    if args.by_entity {
        let aggregation = aggregate_by_entity(&rows, &Feature::ALL)?;
        if !aggregation.report.is_empty() {
            eprintln!(
                "⚠ Skipped {} rows with missing audio features",
                aggregation.report.count()
            );
        }
        Ok(aggregation.table)
    } else {
        Ok(EntityFeatureTable::from_raw_rows(&rows, &Feature::ALL))
    }
}

/// Load, group and normalize the input into a base space.
pub fn load_space(args: &InputArgs) -> Result<FeatureSpace> {
    normalize(&load_table(args)?)
}

fn normalize(table: &EntityFeatureTable) -> Result<FeatureSpace> {
    let vectorized = vectorize(table)?;
    if !vectorized.report.is_empty() {
        eprintln!(
            "⚠ Skipped {} entities with missing audio features",
            vectorized.report.count()
        );
    }
    Ok(vectorized.space)
}

/// Resolve weights: CLI pairs and file first, then the configured file.
pub fn resolve_weights(args: &WeightArgs, config: &Config) -> Result<Weights> {
    let file = args.weights_file.as_ref().or(config.weights_file.as_ref());
    let mut weights = match file {
        Some(path) => Weights::load(path)
            .with_context(|| format!("Failed to load weights from {}", path.display()))?,
        None => Weights::new(),
    };
    for pair in &args.weights {
        let (feature, value) = Weights::parse_pair(pair)?;
        weights.set(feature, value)?;
    }
    Ok(weights)
}

/// The weighted space a query runs against.
pub fn weighted_space(
    input: &InputArgs,
    weights: &WeightArgs,
    config: &Config,
) -> Result<FeatureSpace> {
    weighted_space_of(&load_table(input)?, weights, config)
}

/// Normalize an already loaded table and apply the resolved weights.
pub fn weighted_space_of(
    table: &EntityFeatureTable,
    weights: &WeightArgs,
    config: &Config,
) -> Result<FeatureSpace> {
    let mut session = WeightSession::new(normalize(table)?);
    let weights = resolve_weights(weights, config)?;
    if !weights.is_empty() {
        log::info!(
            "Applying weights: {}",
            weights
                .iter()
                .map(|(f, w)| format!("{f}={w}"))
                .collect::<Vec<_>>()
                .join(", ")
        );
        session.set_weights(weights);
    }
    Ok(session.current().clone())
}
