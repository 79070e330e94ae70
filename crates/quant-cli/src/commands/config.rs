//! Configuration management subcommands

use super::load_config;
use crate::ConfigFormat;
use colored::Colorize;
use quant_core::{ConfigLoader, QuantConfig, QuantError, Result};
use std::fs;
use std::path::{Path, PathBuf};

fn file_name(format: ConfigFormat) -> &'static str {
    match format {
        ConfigFormat::Json => ".quantrc.json",
        ConfigFormat::Toml => ".quantrc.toml",
        ConfigFormat::Yaml => "quant.yaml",
    }
}

/// Write a default configuration file into the working directory
pub async fn config_init_command(format: ConfigFormat, force: bool) -> Result<()> {
    let path = PathBuf::from(file_name(format));
    init_config_at(&path, force)?;
    println!("{} Created {}", "✓".green(), path.display());
    Ok(())
}

fn init_config_at(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(QuantError::config_error(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    let content = ConfigLoader::render(&QuantConfig::default(), path)?;
    fs::write(path, content).map_err(|e| QuantError::io_error(path, e))
}

/// Print the resolved configuration as JSON
pub async fn config_show_command(config_path: Option<PathBuf>) -> Result<()> {
    let loaded = load_config(config_path.as_deref())?;
    match &loaded.path {
        Some(path) => eprintln!("{} {}", "Config:".bold(), path.display()),
        None => eprintln!("{} defaults (no config file found)", "Config:".bold()),
    }

    let json = serde_json::to_string_pretty(&loaded.config)
        .map_err(|e| QuantError::internal_error(format!("Failed to serialize config: {e}")))?;
    println!("{json}");
    Ok(())
}

/// Print or write the configuration JSON Schema
pub async fn config_schema_command(output: Option<PathBuf>) -> Result<()> {
    let schema = ConfigLoader::schema_json()?;
    match output {
        Some(path) => {
            fs::write(&path, schema).map_err(|e| QuantError::io_error(&path, e))?;
            println!("{} Wrote schema to {}", "✓".green(), path.display());
        }
        None => println!("{schema}"),
    }
    Ok(())
}
