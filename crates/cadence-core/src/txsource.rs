use std::path::Path;

use rusqlite::{Connection, params};

use crate::CoreResult;
use crate::detect::dates::{format_iso_date, parse_transaction_date};
use crate::detect::types::{DetectionFilter, TransactionRecord};
use crate::state::map_sqlite_error;

/// The transaction-source collaborator: a read-only, date-ascending view
/// of a space's posted transactions. Zero amounts and rows with
/// unparseable dates are dropped here so the detector never sees them.
pub fn load_transactions(
    conn: &Connection,
    db_path: &Path,
    space_id: &str,
    account_id: Option<&str>,
    filter: &DetectionFilter,
) -> CoreResult<Vec<TransactionRecord>> {
    let mut statement = conn
        .prepare(
            "SELECT
                txn_id,
                account_id,
                posted_at,
                amount,
                description,
                merchant
             FROM internal_transactions
             WHERE space_id = ?1
               AND amount <> 0
               AND (?2 IS NULL OR account_id = ?2)
               AND (?3 IS NULL OR posted_at >= ?3)
               AND (?4 IS NULL OR posted_at <= ?4)
             ORDER BY posted_at ASC, txn_id ASC",
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let from_bound = filter.from.as_ref().map(format_iso_date);
    let to_bound = filter.to.as_ref().map(format_iso_date);

    let rows_iter = statement
        .query_map(
            params![space_id, account_id, from_bound, to_bound],
            |row| {
                let txn_id: String = row.get(0)?;
                let account_id: String = row.get(1)?;
                let posted_at: String = row.get(2)?;
                let amount: f64 = row.get(3)?;
                let description: String = row.get(4)?;
                let merchant: Option<String> = row.get(5)?;
                Ok((txn_id, account_id, posted_at, amount, description, merchant))
            },
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut rows: Vec<TransactionRecord> = Vec::new();
    for row in rows_iter {
        let (txn_id, account_id, posted_at, amount, description, merchant) =
            row.map_err(|error| map_sqlite_error(db_path, &error))?;
        let Some(parsed_date) = parse_transaction_date(&posted_at) else {
            continue;
        };

        rows.push(TransactionRecord {
            txn_id,
            account_id,
            posted_at: parsed_date,
            amount,
            description: description.trim().to_string(),
            merchant: merchant
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
        });
    }

    Ok(rows)
}
