use crate::cli::{Cli, Command};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_POOL_SIZE: u32 = 8;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct RawConfig {
    host: Option<String>,
    port: Option<u16>,
    database: Option<PathBuf>,
    pool_size: Option<u32>,
    #[serde(default)]
    allowed_origins: Vec<String>,
}

/// Settings passed on the command line or through environment variables
/// These take precedence over the configuration file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<PathBuf>,
}

impl Overrides {
    pub fn from_cli(cli: &Cli) -> Self {
        let (host, port) = match &cli.command {
            Command::Serve(args) => (args.host.clone(), args.port),
            Command::Migrate | Command::Rollback => (None, None),
        };
        Self {
            host,
            port,
            database: cli.database.clone(),
        }
    }
}

#[derive(Debug, Eq, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database: PathBuf,
    pub pool_size: u32,
    /// Origins allowed to make cross-origin requests, where empty allows any origin
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Resolve the configuration from the optional config file and the command line
    pub fn load(cli: &Cli) -> Result<Self> {
        let raw = match &cli.config {
            Some(path) => read_raw(path)?,
            None => RawConfig::default(),
        };
        Self::from_raw(raw, Overrides::from_cli(cli), default_database_path)
    }

    fn from_raw(
        raw: RawConfig,
        overrides: Overrides,
        default_database: impl FnOnce() -> Result<PathBuf>,
    ) -> Result<Self> {
        let pool_size = raw.pool_size.unwrap_or(DEFAULT_POOL_SIZE);
        if pool_size == 0 {
            bail!("`poolSize` must be at least 1");
        }

        let database = match overrides.database.or(raw.database) {
            Some(database) => database,
            None => default_database()?,
        };

        Ok(Self {
            host: overrides
                .host
                .or(raw.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port: overrides.port.or(raw.port).unwrap_or(DEFAULT_PORT),
            database,
            pool_size,
            allowed_origins: raw.allowed_origins,
        })
    }
}

fn read_raw(path: &Path) -> Result<RawConfig> {
    let toml_str = read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&toml_str)
        .with_context(|| format!("Failed to deserialize TOML config file {}", path.display()))
}

/// Return the path of the database in the platform's application data directory
fn default_database_path() -> Result<PathBuf> {
    let project_dirs = directories::ProjectDirs::from("com", "inbox", "inbox")
        .context("Failed to determine application directories")?;
    Ok(project_dirs.data_local_dir().join("inbox.db"))
}
