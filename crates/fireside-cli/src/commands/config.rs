use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use fireside_config::ArchiveConfig;

use crate::cli::{ConfigCommands, OutputFormat};

/// Execute config subcommand
pub async fn execute(
    config: &ArchiveConfig,
    cmd: ConfigCommands,
    format: OutputFormat,
) -> Result<()> {
    match cmd {
        ConfigCommands::Init { path, force } => init(path, force),
        ConfigCommands::Show => show(config, format),
    }
}

/// Initialize a new config file
fn init(path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = match path {
        Some(path) => path,
        None => ArchiveConfig::default_config_path()
            .context("Could not determine config file path")?,
    };

    if config_path.exists() && !force {
        println!(
            "{} Config file already exists at: {}",
            "Error:".red().bold(),
            config_path.display()
        );
        println!("Use {} to overwrite", "--force".yellow());
        return Ok(());
    }

    ArchiveConfig::create_example(&config_path)?;

    println!(
        "{} Created config file at: {}",
        "Success:".green().bold(),
        config_path.display()
    );
    println!(
        "\n{}",
        "Edit this file to choose where the archive database lives.".dimmed()
    );
    Ok(())
}

/// Show the current effective configuration
fn show(config: &ArchiveConfig, format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Json => config.display_as_json()?,
        OutputFormat::Table => config.display_as_toml()?,
    };
    println!("{}", rendered);
    Ok(())
}
