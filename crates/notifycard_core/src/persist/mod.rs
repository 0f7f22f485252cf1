//! Persistence capability for the last accepted notification list.
//!
//! # Responsibility
//! - Define the injected key/value blob store contract.
//! - Provide in-memory and SQLite-backed stores.
//! - Encode/decode notification lists under per-identity keys.
//!
//! # Invariants
//! - Core code reaches storage only through `KeyValueStore`.
//! - Persistence failures are reported, never fatal to the card.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod bridge;
pub mod store;

pub type PersistResult<T> = Result<T, PersistError>;

/// Opaque key/value blob store.
pub trait KeyValueStore {
    fn read(&self, key: &str) -> PersistResult<Option<String>>;
    fn write(&self, key: &str, blob: &str) -> PersistResult<()>;
}

/// Storage and encoding failures.
#[derive(Debug)]
pub enum PersistError {
    Db(DbError),
    Encode(String),
    Unavailable(String),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(message) => write!(f, "failed to encode notifications: {message}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for PersistError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PersistError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
