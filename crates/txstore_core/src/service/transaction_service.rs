//! Transaction use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for store callers.
//! - Emit one metadata-only log event per operation.
//!
//! # Invariants
//! - Repository results are returned unchanged.
//! - Log events never include transaction ids, asset ids or amounts.

use crate::context::ExecContext;
use crate::model::transaction::{Transaction, TransactionRowId};
use crate::repo::transaction_repo::{RepoResult, TransactionRepository};
use log::{info, warn};
use std::time::Instant;

/// Use-case service wrapper for transaction CRUD operations.
pub struct TransactionService<R: TransactionRepository> {
    repo: R,
}

impl<R: TransactionRepository> TransactionService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn migrate(&self, ctx: &ExecContext) -> RepoResult<()> {
        observe("tx_migrate", || self.repo.migrate(ctx))
    }

    pub fn create(&self, ctx: &ExecContext, transaction: &Transaction) -> RepoResult<Transaction> {
        observe("tx_create", || self.repo.create(ctx, transaction))
    }

    pub fn all(&self, ctx: &ExecContext) -> RepoResult<Vec<Transaction>> {
        observe("tx_list", || self.repo.all(ctx))
    }

    pub fn get_by_txid(&self, ctx: &ExecContext, tx_id: &[u8]) -> RepoResult<Transaction> {
        observe("tx_get", || self.repo.get_by_txid(ctx, tx_id))
    }

    pub fn update(
        &self,
        ctx: &ExecContext,
        id: TransactionRowId,
        updated: &Transaction,
    ) -> RepoResult<Transaction> {
        observe("tx_update", || self.repo.update(ctx, id, updated))
    }

    pub fn delete(&self, ctx: &ExecContext, id: TransactionRowId) -> RepoResult<()> {
        observe("tx_delete", || self.repo.delete(ctx, id))
    }
}

fn observe<T>(event: &str, op: impl FnOnce() -> RepoResult<T>) -> RepoResult<T> {
    let started_at = Instant::now();
    let result = op();
    match &result {
        Ok(_) => info!(
            "event={} module=service status=ok duration_ms={}",
            event,
            started_at.elapsed().as_millis()
        ),
        Err(err) => warn!(
            "event={} module=service status=error duration_ms={} error={}",
            event,
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}
