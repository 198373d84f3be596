//! Demonstration harness for `txstore_core`.
//!
//! # Responsibility
//! - Recreate the configured database, store one settlement and read it back.
//! - Abort with a non-zero exit code on the first error.

use num_bigint::BigUint;
use std::error::Error;
use std::process::ExitCode;
use txstore_core::db::{open_db_with, reset_db_file};
use txstore_core::{
    init_logging_from_config, SqliteTransactionRepository, StoreConfig, Transaction,
    TransactionService,
};

const SAMPLE_TXID_HEX: &str = "05ed06557eb93800fa2e70143da255857c6a9ca80206bffed3f96a39a8507c7d";
const SAMPLE_ASSET_ID_HEX: &str =
    "dead06557eb93800fa2e70143da255857c6a9ca80206bffed3f96a39a850beef";
const SAMPLE_AMOUNT: u32 = 42;
const SAMPLE_TYPE: &str = "settlement";

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_run module=cli status=error error={err}");
            eprintln!("txstore: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = StoreConfig::from_env()?;
    init_logging_from_config(&config)?;
    println!("txstore_core version={}", txstore_core::core_version());

    reset_db_file(&config.db_path)?;
    let conn = open_db_with(&config)?;
    let repo = SqliteTransactionRepository::with_config(&conn, &config);
    let service = TransactionService::new(repo);
    let ctx = config.exec_context();

    service.migrate(&ctx)?;

    let tx = Transaction::new(
        hex::decode(SAMPLE_TXID_HEX)?,
        hex::decode(SAMPLE_ASSET_ID_HEX)?,
        BigUint::from(SAMPLE_AMOUNT),
        SAMPLE_TYPE,
    );
    let saved = service.create(&ctx, &tx)?;
    println!("saved: {}", serde_json::to_string_pretty(&saved)?);

    let read = service.get_by_txid(&ctx, &saved.tx_id)?;
    println!("retrieved: {}", serde_json::to_string_pretty(&read)?);

    Ok(())
}
