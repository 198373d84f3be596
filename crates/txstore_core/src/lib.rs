//! Core persistence for financial transaction records.
//! Repository contract, SQLite backend and ambient wiring live here.

pub mod config;
pub mod context;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, StoreConfig};
pub use context::{ContextError, ExecContext};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::transaction::{decode_amount, encode_amount, Transaction, TransactionRowId};
pub use repo::transaction_repo::{
    RepoError, RepoResult, SqliteTransactionRepository, TransactionRepository,
};
pub use service::transaction_service::TransactionService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
