mod cli;
mod commands;
mod config;
mod database;
mod http;

use crate::cli::{Cli, Command};
use crate::config::Config;
use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

#[actix_web::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    simple_logger::SimpleLogger::new()
        .with_module_level("actix_server", LevelFilter::Off)
        .with_module_level("mio", LevelFilter::Off)
        .with_level(if cli.quiet {
            LevelFilter::Warn
        } else {
            LevelFilter::Debug
        })
        .init()?;

    let config = Config::load(&cli)?;
    match cli.command {
        Command::Serve(_) => commands::serve(config).await,
        Command::Migrate => commands::migrate(&config),
        Command::Rollback => commands::rollback(&config),
    }
}
