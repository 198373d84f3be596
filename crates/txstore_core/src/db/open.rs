//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by the store.
//! - Reset the database file for throwaway runs.
//!
//! # Invariants
//! - Returned connections have a busy timeout configured.
//! - Schema is NOT applied here; callers run `migrate` explicitly.

use super::DbResult;
use crate::config::StoreConfig;
use log::{error, info};
use rusqlite::Connection;
use std::io::ErrorKind;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens a SQLite database file with default connection settings.
///
/// # Side effects
/// - Creates the file when it does not exist.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let busy_timeout = Duration::from_millis(StoreConfig::default().busy_timeout_ms);
    open_file(path.as_ref(), busy_timeout)
}

/// Opens the database file named by `config.db_path` with its busy timeout.
pub fn open_db_with(config: &StoreConfig) -> DbResult<Connection> {
    open_file(
        config.db_path.as_path(),
        Duration::from_millis(config.busy_timeout_ms),
    )
}

/// Opens an in-memory SQLite database.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory");

    let busy_timeout = Duration::from_millis(StoreConfig::default().busy_timeout_ms);
    let conn = Connection::open_in_memory().and_then(|conn| {
        configure_connection(&conn, busy_timeout)?;
        Ok(conn)
    });

    finish_open(conn, "memory", started_at)
}

/// Removes the database file at `path`. A missing file is not an error.
pub fn reset_db_file(path: impl AsRef<Path>) -> DbResult<()> {
    let path = path.as_ref();
    match std::fs::remove_file(path) {
        Ok(()) => {
            info!("event=db_reset module=db status=ok path={}", path.display());
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => {
            error!(
                "event=db_reset module=db status=error path={} error={}",
                path.display(),
                err
            );
            Err(err.into())
        }
    }
}

fn open_file(path: &Path, busy_timeout: Duration) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=file");

    let conn = Connection::open(path).and_then(|conn| {
        configure_connection(&conn, busy_timeout)?;
        Ok(conn)
    });

    finish_open(conn, "file", started_at)
}

fn finish_open(
    result: rusqlite::Result<Connection>,
    mode: &str,
    started_at: Instant,
) -> DbResult<Connection> {
    match result {
        Ok(conn) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err.into())
        }
    }
}

fn configure_connection(conn: &Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.busy_timeout(busy_timeout)?;
    Ok(())
}
