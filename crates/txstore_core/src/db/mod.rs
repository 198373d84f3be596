//! SQLite storage bootstrap and schema entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the transaction store.
//! - Expose the single idempotent schema step used by `migrate`.
//! - Bound in-flight statements and lock waits by an `ExecContext`.
//!
//! # Invariants
//! - Opening a connection never touches application data.
//! - Schema creation is `IF NOT EXISTS` only; there is no version tracking.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod busy;
mod interrupt;
pub mod migrations;
mod open;

pub(crate) use busy::{is_busy, pause, BusyWaitGuard};
pub(crate) use interrupt::InterruptGuard;
pub use open::{open_db, open_db_in_memory, open_db_with, reset_db_file};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    Io(std::io::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "database file error: {err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<std::io::Error> for DbError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
