//! Transaction repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `transactions` table.
//! - Keep SQL and driver error codes inside the persistence boundary.
//!
//! # Invariants
//! - Every call checks its `ExecContext` before touching the store and is
//!   interrupted if the context is cancelled or expires mid-statement or
//!   while waiting on a lock.
//! - Caller-supplied ids are ignored on create; the store assigns them.
//! - Driver errors reach callers only as `RepoError` kinds.

use crate::config::StoreConfig;
use crate::context::{ContextError, ExecContext};
use crate::db::migrations::apply_schema;
use crate::db::{is_busy, pause, BusyWaitGuard, DbError, InterruptGuard};
use crate::model::transaction::{decode_amount, encode_amount, Transaction, TransactionRowId};
use rusqlite::{ffi, params, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

const TRANSACTION_SELECT_SQL: &str = "SELECT
    id,
    txid,
    asset_id,
    amount,
    type
FROM transactions";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for transaction persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    /// Another row already holds this transaction id.
    Duplicate,
    /// Point lookup matched no rows.
    NotFound,
    UpdateFailed(TransactionRowId),
    DeleteFailed(TransactionRowId),
    InvalidArgument(String),
    Timeout,
    Cancelled,
    Db(DbError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duplicate => write!(f, "record already exists"),
            Self::NotFound => write!(f, "row not exists"),
            Self::UpdateFailed(id) => write!(f, "update failed: no transaction with id {id}"),
            Self::DeleteFailed(id) => write!(f, "delete failed: no transaction with id {id}"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::Timeout => write!(f, "operation timed out"),
            Self::Cancelled => write!(f, "operation cancelled"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<ContextError> for RepoError {
    fn from(value: ContextError) -> Self {
        match value {
            ContextError::Cancelled => Self::Cancelled,
            ContextError::DeadlineExceeded => Self::Timeout,
        }
    }
}

/// Repository interface for transaction CRUD operations.
pub trait TransactionRepository {
    /// Ensures the backing schema exists. Idempotent.
    fn migrate(&self, ctx: &ExecContext) -> RepoResult<()>;
    /// Inserts a new row and returns it with the store-assigned id.
    fn create(&self, ctx: &ExecContext, transaction: &Transaction) -> RepoResult<Transaction>;
    /// Returns every row in store order.
    fn all(&self, ctx: &ExecContext) -> RepoResult<Vec<Transaction>>;
    /// Returns the row whose transaction id equals `tx_id` byte for byte.
    fn get_by_txid(&self, ctx: &ExecContext, tx_id: &[u8]) -> RepoResult<Transaction>;
    /// Replaces every column except `id` of row `id`.
    fn update(
        &self,
        ctx: &ExecContext,
        id: TransactionRowId,
        updated: &Transaction,
    ) -> RepoResult<Transaction>;
    /// Removes row `id`.
    fn delete(&self, ctx: &ExecContext, id: TransactionRowId) -> RepoResult<()>;
}

/// SQLite-backed transaction repository.
pub struct SqliteTransactionRepository<'conn> {
    conn: &'conn Connection,
    busy_timeout: Duration,
}

impl<'conn> SqliteTransactionRepository<'conn> {
    /// Binds the repository with the default lock-wait budget.
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_config(conn, &StoreConfig::default())
    }

    /// Binds the repository with the lock-wait budget from `config`.
    pub fn with_config(conn: &'conn Connection, config: &StoreConfig) -> Self {
        Self {
            conn,
            busy_timeout: Duration::from_millis(config.busy_timeout_ms),
        }
    }

    /// Runs `op` bounded by the context and maps driver errors.
    ///
    /// A locked database is retried until the busy timeout elapses or the
    /// context stops the call.
    fn run<T>(
        &self,
        ctx: &ExecContext,
        mut op: impl FnMut(&Connection) -> RepoResult<T>,
    ) -> RepoResult<T> {
        ctx.check()?;
        let _interrupt = InterruptGuard::install(self.conn, ctx);
        let _busy = BusyWaitGuard::install(self.conn, self.busy_timeout).map_err(DbError::from)?;
        let started_at = Instant::now();

        loop {
            match op(self.conn) {
                Err(RepoError::Db(DbError::Sqlite(err)))
                    if is_busy(&err) && started_at.elapsed() < self.busy_timeout =>
                {
                    ctx.check()?;
                    pause(ctx);
                }
                Err(RepoError::Db(DbError::Sqlite(err))) => {
                    return Err(classify_sqlite_error(err, ctx));
                }
                other => return other,
            }
        }
    }
}

impl TransactionRepository for SqliteTransactionRepository<'_> {
    fn migrate(&self, ctx: &ExecContext) -> RepoResult<()> {
        self.run(ctx, |conn| Ok(apply_schema(conn)?))
    }

    fn create(&self, ctx: &ExecContext, transaction: &Transaction) -> RepoResult<Transaction> {
        self.run(ctx, |conn| {
            conn.execute(
                "INSERT INTO transactions (txid, asset_id, amount, type)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    transaction.tx_id,
                    transaction.asset_id,
                    encode_amount(&transaction.amount),
                    transaction.kind,
                ],
            )
            .map_err(DbError::from)?;

            Ok(Transaction {
                id: conn.last_insert_rowid(),
                ..transaction.clone()
            })
        })
    }

    fn all(&self, ctx: &ExecContext) -> RepoResult<Vec<Transaction>> {
        self.run(ctx, |conn| {
            let mut stmt = conn
                .prepare(TRANSACTION_SELECT_SQL)
                .map_err(DbError::from)?;
            let mut rows = stmt.query([]).map_err(DbError::from)?;
            let mut transactions = Vec::new();

            while let Some(row) = rows.next().map_err(DbError::from)? {
                transactions.push(parse_transaction_row(row)?);
            }

            Ok(transactions)
        })
    }

    fn get_by_txid(&self, ctx: &ExecContext, tx_id: &[u8]) -> RepoResult<Transaction> {
        self.run(ctx, |conn| {
            let mut stmt = conn
                .prepare(&format!("{TRANSACTION_SELECT_SQL} WHERE txid = ?1 LIMIT 1;"))
                .map_err(DbError::from)?;
            let mut rows = stmt.query([tx_id]).map_err(DbError::from)?;

            match rows.next().map_err(DbError::from)? {
                Some(row) => parse_transaction_row(row),
                None => Err(RepoError::NotFound),
            }
        })
    }

    fn update(
        &self,
        ctx: &ExecContext,
        id: TransactionRowId,
        updated: &Transaction,
    ) -> RepoResult<Transaction> {
        if id < 1 {
            return Err(RepoError::InvalidArgument(format!(
                "invalid update id {id}; ids start at 1"
            )));
        }

        self.run(ctx, |conn| {
            let changed = conn
                .execute(
                    "UPDATE transactions
                     SET
                        txid = ?1,
                        asset_id = ?2,
                        amount = ?3,
                        type = ?4
                     WHERE id = ?5;",
                    params![
                        updated.tx_id,
                        updated.asset_id,
                        encode_amount(&updated.amount),
                        updated.kind,
                        id,
                    ],
                )
                .map_err(DbError::from)?;

            if changed == 0 {
                return Err(RepoError::UpdateFailed(id));
            }

            Ok(Transaction {
                id,
                ..updated.clone()
            })
        })
    }

    fn delete(&self, ctx: &ExecContext, id: TransactionRowId) -> RepoResult<()> {
        self.run(ctx, |conn| {
            let changed = conn
                .execute("DELETE FROM transactions WHERE id = ?1;", [id])
                .map_err(DbError::from)?;

            if changed == 0 {
                return Err(RepoError::DeleteFailed(id));
            }

            Ok(())
        })
    }
}

/// Maps a driver error onto a domain error kind.
///
/// Interrupts and lock failures are attributed to the context when it is
/// cancelled or expired; with a live context they stay store errors.
pub(crate) fn classify_sqlite_error(err: rusqlite::Error, ctx: &ExecContext) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        match failure.code {
            ErrorCode::ConstraintViolation
                if failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                return RepoError::Duplicate;
            }
            ErrorCode::OperationInterrupted
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked => {
                if let Err(reason) = ctx.check() {
                    return reason.into();
                }
            }
            _ => {}
        }
    }

    RepoError::Db(DbError::Sqlite(err))
}

fn parse_transaction_row(row: &Row<'_>) -> RepoResult<Transaction> {
    let read = || -> rusqlite::Result<Transaction> {
        let amount: Option<Vec<u8>> = row.get("amount")?;
        Ok(Transaction {
            id: row.get("id")?,
            tx_id: row.get("txid")?,
            asset_id: row.get("asset_id")?,
            amount: decode_amount(amount.as_deref().unwrap_or_default()),
            kind: row.get("type")?,
        })
    };

    read().map_err(|err| RepoError::Db(err.into()))
}
