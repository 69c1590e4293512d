use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for timbre.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (TIMBRE_* prefix)
/// 3. Config file (~/.config/timbre/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// How many similar entities to recommend.
    #[serde(default = "default_neighbors")]
    pub neighbors: usize,

    /// How many neighbors surround the query on a projection map.
    #[serde(default = "default_projection_neighbors")]
    pub projection_neighbors: usize,

    /// Whether the queried entity is listed at rank 0.
    #[serde(default)]
    pub include_self: bool,

    /// Entities drawn for the similarity matrix.
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// Seed for sampling and for the t-SNE initial layout.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Upper bound on the t-SNE perplexity.
    #[serde(default = "default_perplexity")]
    pub perplexity: f64,

    /// t-SNE gradient descent iterations.
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Feature weights applied when no --weight or --weights-file is given.
    ///
    /// Can be set via:
    /// - CLI: --weights-file /path/to/weights.toml
    /// - ENV: TIMBRE_WEIGHTS_FILE
    /// - Config: weights_file = "/path/to/weights.toml"
    #[serde(default)]
    pub weights_file: Option<PathBuf>,

    #[serde(default)]
    pub logging: twyg::Opts,
}

/// Keys accepted by `timbre config get` and `timbre config set`.
pub const KEYS: &[&str] = &[
    "neighbors",
    "projection_neighbors",
    "include_self",
    "sample_size",
    "seed",
    "perplexity",
    "iterations",
    "weights_file",
];

fn default_neighbors() -> usize {
    3
}

fn default_projection_neighbors() -> usize {
    20
}

fn default_sample_size() -> usize {
    30
}

fn default_seed() -> u64 {
    42
}

fn default_perplexity() -> f64 {
    30.0
}

fn default_iterations() -> usize {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            neighbors: default_neighbors(),
            projection_neighbors: default_projection_neighbors(),
            include_self: false,
            sample_size: default_sample_size(),
            seed: default_seed(),
            perplexity: default_perplexity(),
            iterations: default_iterations(),
            weights_file: None,
            logging: twyg::Opts::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("timbre");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }

    /// The value of a config key, rendered for display.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "neighbors" => self.neighbors.to_string(),
            "projection_neighbors" => self.projection_neighbors.to_string(),
            "include_self" => self.include_self.to_string(),
            "sample_size" => self.sample_size.to_string(),
            "seed" => self.seed.to_string(),
            "perplexity" => self.perplexity.to_string(),
            "iterations" => self.iterations.to_string(),
            "weights_file" => self
                .weights_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| String::from("<not set>")),
            _ => return None,
        };
        Some(value)
    }
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/timbre/config.toml
/// - macOS: ~/Library/Application Support/timbre/config.toml
/// - Windows: %APPDATA%\timbre\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("timbre")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Timbre Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (TIMBRE_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Number of similar songs/artists to recommend
neighbors = 3

# Neighbors drawn around the selection on `timbre project` maps; the 3 closest
# are highlighted and the rest give context
projection_neighbors = 20

# List the selected entity itself at rank 0
include_self = false

# Entities drawn for `timbre matrix`
sample_size = 30

# Seed for sampling and for the t-SNE layout
seed = 42

# t-SNE settings; perplexity is capped at (rows - 1) for small batches
perplexity = 30.0
iterations = 1000

# Default feature weights, a TOML file with a [weights] table:
#
#   [weights]
#   tempo = 5.0
#
#weights_file = "/path/to/weights.toml"

# Logging options (twyg)
#[logging]
#coloured = true
#level = "debug"
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.neighbors, 3);
        assert_eq!(config.projection_neighbors, 20);
        assert_eq!(config.sample_size, 30);
        assert_eq!(config.seed, 42);
        assert!(!config.include_self);
        assert!(config.weights_file.is_none());
    }

    #[test]
    fn test_get_known_and_unknown_keys() {
        let config = Config::default();
        for key in KEYS {
            assert!(config.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(config.get("perplexity").as_deref(), Some("30"));
        assert!(config.get("database_path").is_none());
    }

    #[test]
    fn test_example_config_is_valid_toml() {
        let doc: toml_edit::DocumentMut = example_config().parse().unwrap();
        assert_eq!(doc["neighbors"].as_integer(), Some(3));
        assert_eq!(doc["seed"].as_integer(), Some(42));
        assert_eq!(doc["projection_neighbors"].as_integer(), Some(20));
    }
}
