use clap::Parser;
use colored::Colorize;

use fireside_cli::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = fireside_cli::run(cli).await {
        tracing::debug!(error = ?err, "Command failed");
        eprintln!("{} {}", "Error:".red().bold(), fireside_cli::error_message(&err));
        std::process::exit(1);
    }
}
