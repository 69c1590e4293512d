use anyhow::{Context, Result};
use timbre_search::find_neighbors;

use crate::config::Config;
use crate::input::{weighted_space, InputArgs, WeightArgs};
use crate::output;

/// Rank the entities most similar to `query` and print them.
pub fn run(
    query: &str,
    input: &InputArgs,
    weights: &WeightArgs,
    k: usize,
    include_self: bool,
    json: bool,
    config: &Config,
) -> Result<()> {
    let space = weighted_space(input, weights, config)?;
    let result = find_neighbors(query, &space, k, include_self)
        .with_context(|| format!("Failed to rank neighbors of '{query}'"))?;

    if json {
        output::print_json(&result)?;
    } else {
        output::print_neighbors(&result);
    }
    Ok(())
}
