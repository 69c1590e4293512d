use anyhow::{Context, Result};
use timbre_core::FeatureSpace;
use timbre_search::{find_neighbors, project_2d, Projection, ProjectionOptions};

use crate::config::Config;
use crate::input::{weighted_space, InputArgs, WeightArgs};
use crate::output;

#[derive(Debug, Clone)]
pub struct Options {
    /// Neighbors projected around the query.
    pub neighbors: usize,
    pub seed: u64,
    pub perplexity: f64,
    pub iterations: usize,
}

impl Options {
    pub fn from_config(config: &Config) -> Self {
        Self {
            neighbors: config.projection_neighbors,
            seed: config.seed,
            perplexity: config.perplexity,
            iterations: config.iterations,
        }
    }
}

/// Project the query's neighborhood, or the whole batch, onto a 2-D map.
pub fn run(
    query: Option<&str>,
    input: &InputArgs,
    weights: &WeightArgs,
    options: &Options,
    json: bool,
    config: &Config,
) -> Result<()> {
    let space = weighted_space(input, weights, config)?;
    let projection = build(&space, query, options)?;

    if json {
        output::print_json(&projection)?;
    } else {
        output::print_projection(&projection);
    }
    Ok(())
}

fn build(space: &FeatureSpace, query: Option<&str>, options: &Options) -> Result<Projection> {
    let projection_options = ProjectionOptions {
        perplexity: options.perplexity,
        iterations: options.iterations,
        seed: options.seed,
    };

    match query {
        Some(query) => {
            let result = find_neighbors(query, space, options.neighbors, true)
                .with_context(|| format!("Failed to rank neighbors of '{query}'"))?;
            let scores = result.scores();
            let neighborhood = result.into_space()?;
            project_2d(&neighborhood, Some(&scores), &projection_options)
        }
        None => project_2d(space, None, &projection_options),
    }
    .context("Failed to project feature space")
}
