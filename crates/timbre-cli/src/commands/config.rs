use anyhow::{Context, Result};
use toml_edit::{value, DocumentMut, Item};

use crate::config::{self, Config, KEYS};

/// Show the current effective configuration.
pub fn show_config(config: &Config) {
    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config::config_file_path().display());

    let exists = config::config_file_path().exists();
    println!("File exists: {}\n", if exists { "yes" } else { "no (using defaults)" });

    println!("Settings:");
    for key in KEYS {
        if let Some(value) = config.get(key) {
            println!("  {key}: {value}");
        }
    }
    println!("  logging.level: {:?}", config.logging.level());
    println!("  logging.coloured: {}", config.logging.coloured());
    println!("  logging.output: {:?}", config.logging.output());

    println!("\nPriority: CLI args > ENV vars (TIMBRE_*) > Config file > Defaults");
}

/// Get a specific config value, or the whole config file without a key.
pub fn get_config(config: &Config, key: Option<&str>) -> Result<()> {
    if let Some(key) = key {
        let value = config.get(key).ok_or_else(|| unknown_key(key))?;
        println!("{value}");
    } else {
        let config_path = config::config_file_path();

        if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).context("Failed to read config file")?;
            print!("{contents}");
        } else {
            println!("Config file does not exist: {}", config_path.display());
            println!("\nRun 'timbre config init' to create it.");
        }
    }

    Ok(())
}

/// Set a config value, keeping the rest of the file and its comments.
pub fn set_config(key: &str, raw: &str) -> Result<()> {
    let config_path = config::config_file_path();
    config::ensure_config_file()?;

    let contents = std::fs::read_to_string(&config_path).context("Failed to read config file")?;
    let updated = update_document(&contents, key, raw)?;

    std::fs::write(&config_path, updated).context("Failed to write config file")?;

    println!("✓ Updated {key} = {raw}");
    println!("  in {}", config_path.display());

    Ok(())
}

/// Show the config file path.
pub fn show_path() {
    println!("{}", config::config_file_path().display());
}

/// Show example configuration.
pub fn show_example() {
    print!("{}", config::example_config());
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure timbre.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}

fn unknown_key(key: &str) -> anyhow::Error {
    anyhow::anyhow!("Unknown config key: {key}\n\nValid keys: {}", KEYS.join(", "))
}

fn update_document(contents: &str, key: &str, raw: &str) -> Result<String> {
    if !KEYS.contains(&key) {
        return Err(unknown_key(key));
    }

    let mut doc: DocumentMut = contents.parse().context("Failed to parse config file")?;
    doc[key] = typed_value(key, raw)?;
    Ok(doc.to_string())
}

fn typed_value(key: &str, raw: &str) -> Result<Item> {
    let item = match key {
        "neighbors" | "projection_neighbors" | "sample_size" | "iterations" | "seed" => {
            let n: i64 = raw
                .parse()
                .with_context(|| format!("{key} must be a non-negative integer, got '{raw}'"))?;
            anyhow::ensure!(n >= 0, "{key} must be a non-negative integer, got '{raw}'");
            value(n)
        }
        "perplexity" => {
            let p: f64 = raw
                .parse()
                .with_context(|| format!("perplexity must be a number, got '{raw}'"))?;
            anyhow::ensure!(p > 0.0, "perplexity must be positive, got '{raw}'");
            value(p)
        }
        "include_self" => {
            let b: bool = raw
                .parse()
                .with_context(|| format!("include_self must be true or false, got '{raw}'"))?;
            value(b)
        }
        _ => value(raw),
    };
    Ok(item)
}
