//! Fireside Archive command line interface
//!
//! Parses the command line, layers configuration, opens the SQLite archive
//! and dispatches to one module per command group under [`commands`].

pub mod cli;
pub mod commands;
pub mod context;
pub mod output;
pub mod tag_args;

use anyhow::Result;
use tracing::debug;

use fireside_config::{ArchiveConfig, ConfigOverrides};
use fireside_core::ArchiveError;

use crate::cli::{Cli, Commands};
use crate::context::CliContext;

/// Load configuration, start logging and run one command
pub async fn run(cli: Cli) -> Result<()> {
    let overrides = ConfigOverrides {
        database_path: cli.db_path.clone(),
        log_level: cli.log_level.map(|level| level.as_str().to_string()),
    };
    let config = ArchiveConfig::load(cli.config.clone(), overrides)?;
    context::init_logging(&config.logging, cli.verbose);
    debug!(database = %config.storage.database_path.display(), "Configuration loaded");

    // Config commands never touch the database
    if let Commands::Config(cmd) = cli.command {
        return commands::config::execute(&config, cmd, cli.format).await;
    }

    let ctx = CliContext::open(&config, cli.format)?;

    match cli.command {
        Commands::Seed => commands::seed::execute(&ctx).await,
        Commands::Tags(cmd) => commands::tags::execute(&ctx, cmd).await,
        Commands::Snippet(cmd) => commands::snippet::execute(&ctx, cmd).await,
        Commands::Deepening(cmd) => commands::deepening::execute(&ctx, cmd).await,
        Commands::Fireside(cmd) => commands::fireside::execute(&ctx, cmd).await,
        Commands::Family(cmd) => commands::family::execute(&ctx, cmd).await,
        Commands::Outline(cmd) => commands::outline::execute(&ctx, cmd).await,
        Commands::Config(_) => Ok(()),
    }
}

/// Text shown to the user for a failed command.
///
/// Archive errors use their end-user wording; anything else (bad arguments,
/// unreadable files, config problems) prints the full context chain.
pub fn error_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ArchiveError>() {
        Some(archive_err) => archive_err.user_message(),
        None => format!("{:#}", err),
    }
}
