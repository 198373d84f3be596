//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract for transaction records.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `Duplicate`,
//!   `UpdateFailed`, `DeleteFailed`) in addition to store errors.

pub mod transaction_repo;
