//! Statement interruption bound to an `ExecContext`.
//!
//! # Invariants
//! - At most one guard is alive per connection; installing replaces the
//!   previous progress handler.
//! - Dropping the guard always removes the handler.

use crate::context::ExecContext;
use rusqlite::Connection;

/// Number of SQLite VM instructions between context polls.
const PROGRESS_POLL_OPS: i32 = 1_000;

/// Interrupts statements on `conn` once the context is cancelled or expired.
pub(crate) struct InterruptGuard<'conn> {
    conn: &'conn Connection,
}

impl<'conn> InterruptGuard<'conn> {
    pub(crate) fn install(conn: &'conn Connection, ctx: &ExecContext) -> Self {
        conn.progress_handler(PROGRESS_POLL_OPS, Some(ctx.interrupt_predicate()));
        Self { conn }
    }
}

impl Drop for InterruptGuard<'_> {
    fn drop(&mut self) {
        self.conn.progress_handler(0, None::<fn() -> bool>);
    }
}
