//! Lock waiting bounded by an `ExecContext`.
//!
//! SQLite's own busy timeout sleeps inside the library where neither the
//! progress handler nor a cancel flag can reach it. While a guard is alive the
//! connection fails fast on a lock and the caller retries in short steps.
//!
//! # Invariants
//! - Dropping the guard restores the connection's busy timeout.
//! - No retry step sleeps past the context deadline.

use crate::context::ExecContext;
use rusqlite::{Connection, ErrorCode};
use std::time::Duration;

/// Pause between attempts while the database is locked.
const BUSY_RETRY_INTERVAL: Duration = Duration::from_millis(5);

/// Disables SQLite's internal lock wait on `conn` until dropped.
pub(crate) struct BusyWaitGuard<'conn> {
    conn: &'conn Connection,
    restore: Duration,
}

impl<'conn> BusyWaitGuard<'conn> {
    pub(crate) fn install(conn: &'conn Connection, restore: Duration) -> rusqlite::Result<Self> {
        conn.busy_timeout(Duration::ZERO)?;
        Ok(Self { conn, restore })
    }
}

impl Drop for BusyWaitGuard<'_> {
    fn drop(&mut self) {
        let _ = self.conn.busy_timeout(self.restore);
    }
}

/// Whether `err` means another connection holds a conflicting lock.
pub(crate) fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if matches!(
                failure.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
            )
    )
}

/// Sleeps one retry step, cut short by the context deadline.
pub(crate) fn pause(ctx: &ExecContext) {
    let step = ctx
        .remaining()
        .map_or(BUSY_RETRY_INTERVAL, |left| left.min(BUSY_RETRY_INTERVAL));
    std::thread::sleep(step);
}
