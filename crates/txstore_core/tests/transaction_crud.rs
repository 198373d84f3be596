use num_bigint::BigUint;
use rusqlite::{params, Connection};
use txstore_core::db::open_db_in_memory;
use txstore_core::{
    ExecContext, RepoError, SqliteTransactionRepository, Transaction, TransactionRepository,
    TransactionService,
};

const SETTLEMENT_TXID: &str = "05ed06557eb93800fa2e70143da255857c6a9ca80206bffed3f96a39a8507c7d";
const SETTLEMENT_ASSET_ID: &str =
    "deadbeef7eb93800fa2e70143da255857c6a9ca80206bffed3f96a39a8507c7d";

fn migrated_conn() -> Connection {
    let conn = open_db_in_memory().unwrap();
    SqliteTransactionRepository::new(&conn)
        .migrate(&ExecContext::background())
        .unwrap();
    conn
}

fn settlement() -> Transaction {
    Transaction::new(
        hex::decode(SETTLEMENT_TXID).unwrap(),
        hex::decode(SETTLEMENT_ASSET_ID).unwrap(),
        4_242_424_242_u64,
        "settlement",
    )
}

fn sample(seed: u8) -> Transaction {
    Transaction::new(vec![seed; 32], vec![0xAA; 32], u64::from(seed) * 100, "transfer")
}

#[test]
fn create_and_get_by_txid_roundtrip() {
    let conn = migrated_conn();
    let repo = SqliteTransactionRepository::new(&conn);
    let ctx = ExecContext::background();

    let tx = settlement();
    let saved = repo.create(&ctx, &tx).unwrap();
    assert!(saved.id > 0);
    assert_eq!(saved.tx_id, tx.tx_id);
    assert_eq!(saved.asset_id, tx.asset_id);
    assert_eq!(saved.amount, BigUint::from(4_242_424_242_u64));
    assert_eq!(saved.kind, "settlement");

    let loaded = repo.get_by_txid(&ctx, &tx.tx_id).unwrap();
    assert_eq!(loaded, saved);
}

#[test]
fn create_ignores_caller_supplied_id() {
    let conn = migrated_conn();
    let repo = SqliteTransactionRepository::new(&conn);
    let ctx = ExecContext::background();

    let mut tx = sample(1);
    tx.id = 777;
    let saved = repo.create(&ctx, &tx).unwrap();
    assert_eq!(saved.id, 1);

    let second = repo.create(&ctx, &sample(2)).unwrap();
    assert_eq!(second.id, 2);
}

#[test]
fn amounts_of_any_size_roundtrip() {
    let conn = migrated_conn();
    let repo = SqliteTransactionRepository::new(&conn);
    let ctx = ExecContext::background();

    let huge = BigUint::parse_bytes(
        b"123456789012345678901234567890123456789012345678901234567890123456789",
        10,
    )
    .unwrap();
    let amounts = [BigUint::from(0_u8), BigUint::from(1_u8), BigUint::from(u128::MAX), huge];

    for (index, amount) in amounts.iter().enumerate() {
        let mut tx = sample(index as u8 + 10);
        tx.amount = amount.clone();
        repo.create(&ctx, &tx).unwrap();

        let loaded = repo.get_by_txid(&ctx, &tx.tx_id).unwrap();
        assert_eq!(&loaded.amount, amount);
    }
}

#[test]
fn null_amount_reads_as_zero() {
    let conn = migrated_conn();
    conn.execute(
        "INSERT INTO transactions (txid, asset_id, amount, type) VALUES (?1, ?2, NULL, 'fee');",
        params![vec![9_u8; 32], vec![8_u8; 32]],
    )
    .unwrap();

    let repo = SqliteTransactionRepository::new(&conn);
    let loaded = repo
        .get_by_txid(&ExecContext::background(), &[9_u8; 32])
        .unwrap();
    assert_eq!(loaded.amount, BigUint::from(0_u8));
    assert_eq!(loaded.kind, "fee");
}

#[test]
fn zero_amount_is_stored_as_empty_blob() {
    let conn = migrated_conn();
    let repo = SqliteTransactionRepository::new(&conn);
    let ctx = ExecContext::background();

    let mut tx = sample(5);
    tx.amount = BigUint::from(0_u8);
    let saved = repo.create(&ctx, &tx).unwrap();

    let stored_len: i64 = conn
        .query_row(
            "SELECT length(amount) FROM transactions WHERE id = ?1;",
            [saved.id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored_len, 0);
    assert_eq!(
        repo.get_by_txid(&ctx, &tx.tx_id).unwrap().amount,
        BigUint::from(0_u8)
    );
}

#[test]
fn all_on_empty_store_returns_empty_vec() {
    let conn = migrated_conn();
    let repo = SqliteTransactionRepository::new(&conn);

    let all = repo.all(&ExecContext::background()).unwrap();
    assert!(all.is_empty());
}

#[test]
fn all_returns_every_row_in_insert_order() {
    let conn = migrated_conn();
    let repo = SqliteTransactionRepository::new(&conn);
    let ctx = ExecContext::background();

    let first = repo.create(&ctx, &sample(1)).unwrap();
    let second = repo.create(&ctx, &sample(2)).unwrap();
    let third = repo.create(&ctx, &sample(3)).unwrap();

    let all = repo.all(&ctx).unwrap();
    assert_eq!(all, vec![first, second, third]);
}

#[test]
fn duplicate_txid_is_rejected() {
    let conn = migrated_conn();
    let repo = SqliteTransactionRepository::new(&conn);
    let ctx = ExecContext::background();

    repo.create(&ctx, &settlement()).unwrap();
    let err = repo.create(&ctx, &settlement()).unwrap_err();
    assert!(matches!(err, RepoError::Duplicate));
    assert_eq!(repo.all(&ctx).unwrap().len(), 1);
}

#[test]
fn get_by_unknown_txid_returns_not_found() {
    let conn = migrated_conn();
    let repo = SqliteTransactionRepository::new(&conn);

    let err = repo
        .get_by_txid(&ExecContext::background(), &[0_u8; 32])
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound));
}

#[test]
fn update_replaces_every_field_but_id() {
    let conn = migrated_conn();
    let repo = SqliteTransactionRepository::new(&conn);
    let ctx = ExecContext::background();

    let saved = repo.create(&ctx, &sample(1)).unwrap();
    let replacement = Transaction::new(vec![0x42; 32], vec![0x24; 32], 5_u32, "refund");

    let updated = repo.update(&ctx, saved.id, &replacement).unwrap();
    assert_eq!(updated.id, saved.id);
    assert_eq!(updated.kind, "refund");

    let loaded = repo.get_by_txid(&ctx, &[0x42; 32]).unwrap();
    assert_eq!(loaded, updated);
    assert!(matches!(
        repo.get_by_txid(&ctx, &saved.tx_id),
        Err(RepoError::NotFound)
    ));
}

#[test]
fn update_missing_id_returns_update_failed() {
    let conn = migrated_conn();
    let repo = SqliteTransactionRepository::new(&conn);

    let err = repo
        .update(&ExecContext::background(), 41, &sample(1))
        .unwrap_err();
    assert!(matches!(err, RepoError::UpdateFailed(41)));
}

#[test]
fn update_non_positive_id_returns_invalid_argument() {
    let conn = migrated_conn();
    let repo = SqliteTransactionRepository::new(&conn);
    let ctx = ExecContext::background();

    for id in [0, -1] {
        let err = repo.update(&ctx, id, &sample(1)).unwrap_err();
        assert!(matches!(err, RepoError::InvalidArgument(_)));
    }
}

#[test]
fn update_onto_existing_txid_returns_duplicate() {
    let conn = migrated_conn();
    let repo = SqliteTransactionRepository::new(&conn);
    let ctx = ExecContext::background();

    repo.create(&ctx, &sample(1)).unwrap();
    let second = repo.create(&ctx, &sample(2)).unwrap();

    let err = repo.update(&ctx, second.id, &sample(1)).unwrap_err();
    assert!(matches!(err, RepoError::Duplicate));
}

#[test]
fn delete_removes_row() {
    let conn = migrated_conn();
    let repo = SqliteTransactionRepository::new(&conn);
    let ctx = ExecContext::background();

    let saved = repo.create(&ctx, &settlement()).unwrap();
    repo.delete(&ctx, saved.id).unwrap();

    let err = repo.get_by_txid(&ctx, &saved.tx_id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound));
    assert!(repo.all(&ctx).unwrap().is_empty());
}

#[test]
fn delete_missing_id_returns_delete_failed() {
    let conn = migrated_conn();
    let repo = SqliteTransactionRepository::new(&conn);
    let ctx = ExecContext::background();

    let saved = repo.create(&ctx, &sample(1)).unwrap();
    repo.delete(&ctx, saved.id).unwrap();

    let err = repo.delete(&ctx, saved.id).unwrap_err();
    assert!(matches!(err, RepoError::DeleteFailed(id) if id == saved.id));
}

#[test]
fn operations_before_migrate_surface_store_errors() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTransactionRepository::new(&conn);

    let err = repo.all(&ExecContext::background()).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
}

#[test]
fn service_wraps_repository_calls() {
    let conn = migrated_conn();
    let service = TransactionService::new(SqliteTransactionRepository::new(&conn));
    let ctx = ExecContext::background();

    service.migrate(&ctx).unwrap();
    let saved = service.create(&ctx, &settlement()).unwrap();
    let fetched = service.get_by_txid(&ctx, &saved.tx_id).unwrap();
    assert_eq!(fetched, saved);

    let repriced = Transaction {
        amount: BigUint::from(1_u8),
        ..saved.clone()
    };
    let updated = service.update(&ctx, saved.id, &repriced).unwrap();
    assert_eq!(updated.amount, BigUint::from(1_u8));
    assert_eq!(service.all(&ctx).unwrap(), vec![updated]);

    service.delete(&ctx, saved.id).unwrap();
    assert!(matches!(
        service.delete(&ctx, saved.id),
        Err(RepoError::DeleteFailed(_))
    ));
}
