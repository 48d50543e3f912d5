mod db;
mod models;
mod schema;

pub use self::models::{flag, Email, EmailDraft, EmailFilter, EmailPatch};
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::{debug, info};
use std::path::Path;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;
type Connection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Settings applied to every connection as it is checked out of the pool
#[derive(Debug)]
struct ConnectionOptions;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        // Wait for other writers to finish instead of failing immediately with SQLITE_BUSY
        conn.batch_execute("PRAGMA busy_timeout = 1000")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Handle to the email store
/// Cloning the handle is cheap and shares the underlying connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the SQLite database at `path`, creating it if necessary
    pub fn open(path: &Path, pool_size: u32) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory {}", parent.display())
            })?;
        }

        let manager = ConnectionManager::<SqliteConnection>::new(path.to_string_lossy());
        let pool = Pool::builder()
            .max_size(pool_size)
            .connection_customizer(Box::new(ConnectionOptions))
            .build(manager)
            .with_context(|| format!("Failed to open SQLite database {}", path.display()))?;
        let db = Self { pool };

        db.connection()?
            .batch_execute("PRAGMA journal_mode = WAL")
            .context("Failed to enable write-ahead logging")?;
        Ok(db)
    }

    /// Check a connection out of the pool
    /// The connection goes back to the pool when the returned guard is dropped.
    fn connection(&self) -> Result<Connection> {
        self.pool
            .get()
            .context("Failed to get a database connection from the pool")
    }

    /// Ensure that a connection to the database can be established
    pub fn ping(&self) -> Result<()> {
        self.connection()?
            .batch_execute("SELECT 1")
            .context("Failed to query the database")
    }

    /// Apply any pending migrations, creating and seeding the emails table on first run
    pub fn migrate(&self) -> Result<()> {
        let conn: &mut SqliteConnection = &mut *self.connection()?;
        let versions = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|err| anyhow!(err))
            .context("Failed to run database migrations")?;
        if versions.is_empty() {
            debug!("Database schema is up to date");
        }
        for version in versions {
            info!("Applied migration {version}");
        }
        Ok(())
    }

    /// Revert the most recently applied migration
    pub fn rollback(&self) -> Result<()> {
        let conn: &mut SqliteConnection = &mut *self.connection()?;
        let version = conn
            .revert_last_migration(MIGRATIONS)
            .map_err(|err| anyhow!(err))
            .context("Failed to revert database migration")?;
        info!("Reverted migration {version}");
        Ok(())
    }

    /// Return the emails matching a filter, newest first
    pub fn list_emails(&self, filter: EmailFilter) -> Result<Vec<Email>> {
        db::list_emails(&mut *self.connection()?, filter)
            .context("Failed to load emails from the database")
    }

    /// Return an email by its id
    pub fn get_email(&self, id: i32) -> Result<Option<Email>> {
        db::get_email(&mut *self.connection()?, id)
            .context("Failed to load email from the database")
    }

    /// Save a new email created at `now` and return the stored record
    pub fn create_email(&self, draft: EmailDraft, now: &DateTime<Utc>) -> Result<Email> {
        let new_email = draft.into_new_email(now);
        let email = self
            .connection()?
            .immediate_transaction(|conn| db::insert_email(conn, &new_email))
            .context("Failed to save email to the database")?;
        debug!("Created email {}", email.id);
        Ok(email)
    }

    /// Apply a patch to an email at `now`
    /// Returns `None` if the email doesn't exist.
    pub fn update_email(
        &self,
        id: i32,
        patch: EmailPatch,
        now: &DateTime<Utc>,
    ) -> Result<Option<Email>> {
        let email = self
            .connection()?
            .immediate_transaction(|conn| db::update_email(conn, id, patch, now))
            .context("Failed to update email in the database")?;
        if email.is_some() {
            debug!("Updated email {id}");
        }
        Ok(email)
    }

    /// Permanently delete an email
    /// Returns `false` if the email doesn't exist.
    pub fn delete_email(&self, id: i32) -> Result<bool> {
        let deleted = self
            .connection()?
            .immediate_transaction(|conn| db::delete_email(conn, id))
            .context("Failed to delete email from the database")?;
        if deleted {
            debug!("Deleted email {id}");
        }
        Ok(deleted)
    }
}
