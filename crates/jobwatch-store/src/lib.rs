//! Jobwatch Storage Layer
//!
//! Implements the `JobLedger` trait using SQLite.
//!
//! # Architecture
//!
//! - `freelance_joblist`: one row per processed job identifier, unique on `jobid`
//! - `freelance_config`: key/value metadata seeded on first contact
//!
//! The store is an explicit handle: open it, pass it to whoever needs it, and
//! close it when done. Dropping it also closes the connection.
//!
//! # Examples
//!
//! ```no_run
//! use jobwatch_store::SqliteStore;
//! use jobwatch_domain::traits::JobLedger;
//!
//! let mut store = SqliteStore::new(":memory:").unwrap();
//! store.mark_seen("1899").unwrap();
//! assert!(store.has_seen("1899").unwrap());
//! store.close().unwrap();
//! ```

#![warn(missing_docs)]

use jobwatch_domain::traits::JobLedger;
use jobwatch_domain::LedgerEntry;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Schema version recorded in `freelance_config`
pub const SCHEMA_VERSION: &str = "1.0";

/// Config key holding the schema version
pub const CONFIG_VERSION_KEY: &str = "version_db";

/// Config key holding the ledger creation date
pub const CONFIG_CREATED_KEY: &str = "db_created_date";

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Job identifier already recorded
    #[error("Job already recorded: {0}")]
    Duplicate(String),
}

/// SQLite-based implementation of `JobLedger`
///
/// Every `record_job` call is a single-row insert, so a failure partway through
/// a batch never affects identifiers recorded earlier.
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Wrap the store in a `Mutex` to share it.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the ledger at the given path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create tables and seed metadata on first contact only
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;

        if self.config_value(CONFIG_VERSION_KEY)?.is_some() {
            info!("Connected to existing job ledger");
            return Ok(());
        }

        info!("New job ledger detected, seeding metadata");
        let created = chrono::Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO freelance_config (id, value) VALUES (?1, ?2)",
            params![CONFIG_VERSION_KEY, SCHEMA_VERSION],
        )?;
        tx.execute(
            "INSERT OR IGNORE INTO freelance_config (id, value) VALUES (?1, ?2)",
            params![CONFIG_CREATED_KEY, created],
        )?;
        tx.commit()?;

        Ok(())
    }

    /// Read a metadata value
    pub fn config_value(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self.conn.query_row(
            "SELECT value FROM freelance_config WHERE id = ?1",
            params![key],
            |row| row.get(0),
        ).optional()?;

        Ok(value)
    }

    /// Number of recorded job identifiers
    pub fn count_jobs(&self) -> Result<u64, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM freelance_joblist",
            [],
            |row| row.get(0),
        )?;

        Ok(count as u64)
    }

    /// Close the connection, reporting any error SQLite raises while doing so
    pub fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, e)| StoreError::Database(e))?;
        debug!("Job ledger connection closed");
        Ok(())
    }
}

impl JobLedger for SqliteStore {
    type Error = StoreError;

    fn record_job(&mut self, job_id: &str) -> Result<i64, Self::Error> {
        let result = self.conn.execute(
            "INSERT INTO freelance_joblist (jobid) VALUES (?1)",
            params![job_id],
        );

        match result {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Duplicate(job_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn find_job(&self, job_id: &str) -> Result<Option<LedgerEntry>, Self::Error> {
        let entry = self.conn.query_row(
            "SELECT id, jobid, date_create FROM freelance_joblist WHERE jobid = ?1",
            params![job_id],
            |row| {
                Ok(LedgerEntry {
                    id: row.get(0)?,
                    job_id: row.get(1)?,
                    created_at: row.get(2)?,
                })
            },
        ).optional()?;

        Ok(entry)
    }
}
