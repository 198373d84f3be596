//! Idempotent schema step for the transaction store.
//!
//! # Responsibility
//! - Create the `transactions` table and its `txid` unique index if missing.
//!
//! # Invariants
//! - Safe to run on every startup; existing rows are never touched.
//! - Table and index are created atomically.

use crate::db::DbResult;
use rusqlite::Connection;

/// Name of the single table owned by the store.
pub const TRANSACTIONS_TABLE: &str = "transactions";

/// Name of the unique index rejecting duplicate transaction ids.
pub const TXID_UNIQUE_INDEX: &str = "idx_transactions_txid";

const SCHEMA_SQL: &str = include_str!("0001_transactions.sql");

/// Ensures the store schema exists on the provided connection.
pub fn apply_schema(conn: &Connection) -> DbResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(SCHEMA_SQL)?;
    tx.commit()?;
    Ok(())
}
