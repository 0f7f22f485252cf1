//! Schema migrations for the key/value store.
//!
//! # Invariants
//! - Versions are strictly increasing and mirrored to `PRAGMA user_version`.
//! - Pending migrations run in one transaction; a failure applies none.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;

/// `(version, sql)` pairs in apply order.
const MIGRATIONS: &[(u32, &str)] = &[(1, include_str!("0001_kv_store.sql"))];

/// Schema versions before and after `apply_migrations`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: u32,
    pub to_version: u32,
}

impl MigrationReport {
    pub fn applied_any(&self) -> bool {
        self.from_version != self.to_version
    }
}

/// Latest schema version this build understands.
pub fn latest_version() -> u32 {
    newest(MIGRATIONS)
}

fn newest(steps: &[(u32, &str)]) -> u32 {
    steps.last().map_or(0, |(version, _)| *version)
}

/// Brings `conn` up to `latest_version()`.
///
/// # Errors
/// - `SchemaTooNew` when the file was written by a newer build.
/// - `MigrationFailed` naming the step that could not be applied.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<MigrationReport> {
    apply_steps(conn, MIGRATIONS)
}

fn apply_steps(conn: &mut Connection, steps: &[(u32, &str)]) -> DbResult<MigrationReport> {
    let from_version: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    let latest = newest(steps);
    if from_version > latest {
        return Err(DbError::SchemaTooNew {
            found: from_version,
            supported: latest,
        });
    }

    let pending: Vec<&(u32, &str)> = steps
        .iter()
        .filter(|(version, _)| *version > from_version)
        .collect();
    if !pending.is_empty() {
        let tx = conn.transaction()?;
        for &(version, sql) in pending {
            let applied = tx
                .execute_batch(sql)
                .and_then(|()| tx.pragma_update(None, "user_version", version));
            if let Err(source) = applied {
                error!(
                    "event=db_migrate module=db status=error version={} error={}",
                    version, source
                );
                return Err(DbError::MigrationFailed { version, source });
            }
            info!("event=db_migrate module=db status=ok version={}", version);
        }
        tx.commit()?;
    }

    Ok(MigrationReport {
        from_version,
        to_version: latest,
    })
}
