//! Config command - manage configuration.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use rkeep_core::models::config::RkeepConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "extraction.tip_window_chars")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value (JSON, or a bare string)
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => show_config(&path),
        ConfigCommand::Init(init_args) => init_config(init_args, path),
        ConfigCommand::Get { key } => get_config(&path, &key),
        ConfigCommand::Set { key, value } => set_config(&path, &key, &value),
        ConfigCommand::Path => show_path(&path),
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rkeep")
        .join("config.json")
}

fn read_or_default(path: &PathBuf) -> anyhow::Result<RkeepConfig> {
    if path.exists() {
        Ok(RkeepConfig::from_file(path)?)
    } else {
        Ok(RkeepConfig::default())
    }
}

fn show_config(path: &PathBuf) -> anyhow::Result<()> {
    if !path.exists() {
        println!(
            "{} No config file found, showing defaults.",
            style("ℹ").blue()
        );
    }
    let config = read_or_default(path)?;

    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn init_config(args: InitArgs, default_path: PathBuf) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or(default_path);

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    RkeepConfig::default().save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

fn get_config(path: &PathBuf, key: &str) -> anyhow::Result<()> {
    let json = serde_json::to_value(read_or_default(path)?)?;
    let value = lookup(&json, key)?;

    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}

fn set_config(path: &PathBuf, key: &str, value: &str) -> anyhow::Result<()> {
    let config = read_or_default(path)?;

    let parsed_value: Value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    let mut json = serde_json::to_value(&config)?;
    assign(&mut json, key, parsed_value.clone())?;

    let config: RkeepConfig = serde_json::from_value(json)?;
    // Reject keyword lists that cannot be compiled before they reach disk.
    config.build_extractor()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&parsed_value)?
    );

    Ok(())
}

fn show_path(path: &PathBuf) -> anyhow::Result<()> {
    println!("Configuration file: {}", path.display());

    if path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'rkeep config init' to create a configuration file.");
    }

    Ok(())
}

/// Follow a dotted key path through a JSON object.
fn lookup<'a>(json: &'a Value, key: &str) -> anyhow::Result<&'a Value> {
    let mut current = json;
    for part in key.split('.') {
        current = current
            .get(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
    }
    Ok(current)
}

/// Replace the value at an existing dotted key path.
fn assign(json: &mut Value, key: &str, value: Value) -> anyhow::Result<()> {
    let (parent_key, last) = match key.rsplit_once('.') {
        Some((parent, last)) => (Some(parent), last),
        None => (None, key),
    };

    let mut current = json;
    if let Some(parent_key) = parent_key {
        for part in parent_key.split('.') {
            current = current
                .get_mut(part)
                .ok_or_else(|| anyhow::anyhow!("Configuration path not found: {}", key))?;
        }
    }

    let obj = current
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("Cannot set value at non-object path"))?;
    if !obj.contains_key(last) {
        anyhow::bail!("Configuration key not found: {}", key);
    }
    obj.insert(last.to_string(), value);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup() {
        let json = serde_json::to_value(RkeepConfig::default()).unwrap();
        assert_eq!(lookup(&json, "extraction.tip_window_chars").unwrap(), &json!(100));
        assert!(lookup(&json, "extraction.nope").is_err());
    }

    #[test]
    fn test_assign() {
        let mut json = serde_json::to_value(RkeepConfig::default()).unwrap();
        assign(&mut json, "extraction.tip_window_chars", json!(60)).unwrap();
        assign(&mut json, "ocr.keep_unk", json!(true)).unwrap();

        let config: RkeepConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.extraction.tip_window_chars, 60);
        assert!(config.ocr.keep_unk);
    }

    #[test]
    fn test_assign_rejects_unknown_key() {
        let mut json = serde_json::to_value(RkeepConfig::default()).unwrap();
        assert!(assign(&mut json, "extraction.typo", json!(1)).is_err());
        assert!(assign(&mut json, "missing.key", json!(1)).is_err());
    }
}
