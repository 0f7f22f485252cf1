//! SQLite storage bootstrap for persisted card state.
//!
//! # Responsibility
//! - Open and configure SQLite connections backing `SqliteStore`.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Stores must not read/write blobs before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failures while opening or upgrading the card store file.
#[derive(Debug)]
pub enum DbError {
    /// Connection setup or pragma access failed.
    Sqlite(rusqlite::Error),
    /// The file records a schema version this build cannot read.
    SchemaTooNew { found: u32, supported: u32 },
    /// One migration step failed; its transaction was rolled back.
    MigrationFailed {
        version: u32,
        source: rusqlite::Error,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "card store error: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "card store schema v{found} was written by a newer build (this build reads up to v{supported})"
            ),
            Self::MigrationFailed { version, source } => {
                write!(f, "card store migration to v{version} failed: {source}")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::MigrationFailed { source: err, .. } => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
