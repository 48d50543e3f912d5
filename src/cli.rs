use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[clap(about, version, author)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[clap(short = 'c', long, env = "INBOX_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite database file
    #[clap(short = 'd', long, env = "INBOX_DATABASE", global = true)]
    pub database: Option<PathBuf>,

    /// Log fewer messages
    #[clap(short = 'q', long, global = true)]
    pub quiet: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve the email API over HTTP
    Serve(ServeArgs),

    /// Create or upgrade the database schema, seeding sample emails on first run
    Migrate,

    /// Revert the most recent database migration
    Rollback,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to bind the HTTP server to
    #[clap(long, env = "HOST")]
    pub host: Option<String>,

    /// HTTP server port
    #[clap(short = 'p', long, env = "PORT")]
    pub port: Option<u16>,
}
