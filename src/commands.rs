use crate::config::Config;
use crate::database::Database;
use crate::http;
use anyhow::{Context, Result};
use log::info;

fn open_database(config: &Config) -> Result<Database> {
    info!("Opening database {}", config.database.display());
    Database::open(&config.database, config.pool_size)
}

/// Implementation for the `serve` CLI command
pub async fn serve(config: Config) -> Result<()> {
    let db = open_database(&config)?;
    db.migrate()?;

    // The server stops gracefully on SIGINT and SIGTERM
    http::create_server(db, &config)?
        .await
        .context("Failed to run HTTP server")?;
    info!("HTTP server stopped");

    Ok(())
}

/// Implementation for the `migrate` CLI command
pub fn migrate(config: &Config) -> Result<()> {
    open_database(config)?.migrate()
}

/// Implementation for the `rollback` CLI command
pub fn rollback(config: &Config) -> Result<()> {
    open_database(config)?.rollback()
}
