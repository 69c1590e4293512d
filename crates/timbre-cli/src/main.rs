use anyhow::Result;
use clap::Parser;

mod commands;
mod config;
mod input;
mod output;

use config::Config;
use input::{InputArgs, WeightArgs};

#[derive(Debug, Parser)]
#[command(name = "timbre", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Recommend the entities that sound most like a query
    ///
    /// Loads a JSON array of feature rows, normalizes every feature column to
    /// [0, 1], applies any feature weights, and ranks the other entities by
    /// cosine similarity to the query.
    ///
    /// - Each identity appears at most once in the results
    /// - The query itself is never a neighbor (see --include-self)
    /// - Rows with missing features are skipped and counted
    ///
    /// Weights multiply normalized columns, so --weight tempo=5 makes tempo
    /// dominate the ranking and --weight key=0.1 all but ignores it.
    Neighbors {
        /// Name of the song or artist to start from
        query: String,

        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        weights: WeightArgs,

        /// Number of neighbors (default: from config)
        #[arg(short, long)]
        k: Option<usize>,

        /// List the query itself at rank 0 (default: from config)
        #[arg(long, overrides_with = "no_include_self")]
        include_self: bool,

        /// Leave the query out even when the config includes it
        #[arg(long, overrides_with = "include_self")]
        no_include_self: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Lay out entities on a 2-D map with t-SNE
    ///
    /// With a query, the query and its nearest neighbors are projected and
    /// the closest ones are highlighted. Without one, the whole batch is
    /// projected. The layout is reproducible for a given seed.
    Project {
        /// Name of the song or artist to centre the map on
        query: Option<String>,

        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        weights: WeightArgs,

        /// Neighbors drawn around the query; the 3 closest are highlighted
        /// (default: projection_neighbors from config)
        #[arg(short, long)]
        k: Option<usize>,

        /// Seed for the initial layout (default: from config)
        #[arg(long)]
        seed: Option<u64>,

        /// t-SNE perplexity, capped at rows - 1 (default: from config)
        #[arg(long)]
        perplexity: Option<f64>,

        /// Gradient descent iterations (default: from config)
        #[arg(long)]
        iterations: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Pairwise similarity heatmap of a random sample
    Matrix {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        weights: WeightArgs,

        /// Entities to draw (default: from config)
        #[arg(long)]
        sample: Option<usize>,

        /// Seed for the sample (default: from config)
        #[arg(long)]
        seed: Option<u64>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Compare an entity's raw feature profile with its matches
    ///
    /// Prints the mean of every feature in its natural units, and how far
    /// each match sits from it. Without OTHERS, the k most similar entities
    /// are compared.
    Compare {
        /// Name of the song or artist to profile
        selected: String,

        /// Entities to compare against (default: the top k neighbors)
        others: Vec<String>,

        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        weights: WeightArgs,

        /// Number of neighbors when no OTHERS are given (default: from config)
        #[arg(short, long)]
        k: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show how one period's sound differs from the average of all periods
    ///
    /// Rows are grouped by their "period" (or "year") field and the seven
    /// audio descriptors are averaged per period. A positive change means
    /// the period sits below the long-run average.
    Trends {
        /// JSON file holding an array of rows
        #[arg(long, short)]
        input: std::path::PathBuf,

        /// Period to report on (default: the latest)
        #[arg(long)]
        period: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Average raw rows per entity and print the table
    Aggregate {
        /// JSON file holding an array of rows
        #[arg(long, short)]
        input: std::path::PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List the audio features and their natural ranges
    Features,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the current effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults
    Init,
    /// Print one value, or the whole config file
    Get {
        key: Option<String>,
    },
    /// Set a value in the config file
    Set {
        key: String,
        value: String,
    },
}

/// A `--flag` / `--no-flag` pair over a configured default.
fn resolve_flag(on: bool, off: bool, configured: bool) -> bool {
    if off {
        false
    } else {
        on || configured
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    if let Err(e) = twyg::setup(config.logging.clone()) {
        eprintln!("⚠ Failed to set up logging: {e:?}");
    }

    match cli.command {
        Commands::Neighbors {
            query,
            input,
            weights,
            k,
            include_self,
            no_include_self,
            json,
        } => {
            let k = k.unwrap_or(config.neighbors);
            let include_self = resolve_flag(include_self, no_include_self, config.include_self);
            commands::neighbors::run(&query, &input, &weights, k, include_self, json, &config)?;
        }
        Commands::Project {
            query,
            input,
            weights,
            k,
            seed,
            perplexity,
            iterations,
            json,
        } => {
            let defaults = commands::project::Options::from_config(&config);
            let options = commands::project::Options {
                neighbors: k.unwrap_or(defaults.neighbors),
                seed: seed.unwrap_or(defaults.seed),
                perplexity: perplexity.unwrap_or(defaults.perplexity),
                iterations: iterations.unwrap_or(defaults.iterations),
            };
            commands::project::run(query.as_deref(), &input, &weights, &options, json, &config)?;
        }
        Commands::Matrix {
            input,
            weights,
            sample,
            seed,
            json,
        } => {
            let sample = sample.unwrap_or(config.sample_size);
            let seed = seed.unwrap_or(config.seed);
            commands::matrix::run(&input, &weights, sample, seed, json, &config)?;
        }
        Commands::Compare {
            selected,
            others,
            input,
            weights,
            k,
            json,
        } => {
            let k = k.unwrap_or(config.neighbors);
            commands::compare::run(&selected, &others, &input, &weights, k, json, &config)?;
        }
        Commands::Trends {
            input,
            period,
            json,
        } => {
            commands::trends::run(&input, period.as_deref(), json)?;
        }
        Commands::Aggregate { input, json } => {
            commands::aggregate::run(&input, json)?;
        }
        Commands::Features => {
            commands::features::list_features();
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show_config(&config),
            ConfigAction::Path => commands::config::show_path(),
            ConfigAction::Example => commands::config::show_example(),
            ConfigAction::Init => commands::config::init_config()?,
            ConfigAction::Get { key } => commands::config::get_config(&config, key.as_deref())?,
            ConfigAction::Set { key, value } => commands::config::set_config(&key, &value)?,
        },
    }

    Ok(())
}
