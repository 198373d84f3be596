//! Domain model for persisted financial transactions.
//!
//! # Responsibility
//! - Define the record shape shared by repository, service and callers.
//!
//! # Invariants
//! - Row identity is assigned by the store, never by callers.
//! - Deletion is a hard delete; there are no tombstones.

pub mod transaction;
