use std::path::Path;

use rusqlite::{Connection, TransactionBehavior, params};

use crate::CoreResult;
use crate::ingest::parse::IngestRow;
use crate::state::map_sqlite_error;

/// Writes validated rows in one immediate transaction. Rows without a
/// caller-supplied id get a fresh ulid so the detector's date tie-break
/// stays stable across identical reruns of the same file. Rows whose
/// caller-supplied id is already stored are skipped, so re-ingesting the
/// same export is safe and reports only the newly inserted count.
pub fn insert_rows(
    conn: &mut Connection,
    db_path: &Path,
    space_id: &str,
    rows: &[IngestRow],
    now: i64,
) -> CoreResult<i64> {
    let transaction = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut inserted = 0_i64;
    {
        let mut statement = transaction
            .prepare(
                "INSERT INTO internal_transactions (
                    txn_id,
                    space_id,
                    account_id,
                    posted_at,
                    amount,
                    description,
                    merchant,
                    created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT (txn_id) DO NOTHING",
            )
            .map_err(|error| map_sqlite_error(db_path, &error))?;

        for row in rows {
            let txn_id = match &row.txn_id {
                Some(value) if !value.trim().is_empty() => value.clone(),
                _ => ulid::Ulid::new().to_string(),
            };
            let changed = statement
                .execute(params![
                    txn_id,
                    space_id,
                    &row.account_id,
                    &row.posted_at,
                    row.amount,
                    &row.description,
                    &row.merchant,
                    now,
                ])
                .map_err(|error| map_sqlite_error(db_path, &error))?;
            inserted += i64::try_from(changed).unwrap_or(0);
        }
    }

    transaction
        .commit()
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    Ok(inserted)
}
