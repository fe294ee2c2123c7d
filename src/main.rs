//! Studyfeed CLI entry point.

use clap::Parser;
use std::sync::Arc;

use studyfeed::cli::commands::{login, logout, visibility, watch, whoami};
use studyfeed::cli::{handle_error, load_config, Cli, Commands};
use studyfeed::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref(), cli.server.as_deref()) {
        Ok(config) => Arc::new(config),
        Err(err) => handle_error(err, cli.json),
    };

    // Held for the whole run so the file writer flushes on exit.
    let _logger = match LoggerImpl::init(&LogConfig::from(&config.logging)) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Watch(args) => watch::execute(args, config, cli.json).await,
        Commands::Login(args) => login::execute(args, config, cli.json).await,
        Commands::Logout => logout::execute(config, cli.json).await,
        Commands::Whoami => whoami::execute(config, cli.json).await,
        Commands::Hide(args) => visibility::execute(args, false, config, cli.json).await,
        Commands::Show(args) => visibility::execute(args, true, config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
