use anyhow::Result;
use timbre_search::{sample_space, similarity_matrix};

use crate::config::Config;
use crate::input::{weighted_space, InputArgs, WeightArgs};
use crate::output;

/// Print the pairwise similarities of a seeded sample of the batch.
pub fn run(
    input: &InputArgs,
    weights: &WeightArgs,
    sample: usize,
    seed: u64,
    json: bool,
    config: &Config,
) -> Result<()> {
    let space = weighted_space(input, weights, config)?;
    let matrix = similarity_matrix(&sample_space(&space, sample, seed));

    if json {
        output::print_json(&matrix)?;
    } else {
        output::print_matrix(&matrix);
    }
    Ok(())
}
