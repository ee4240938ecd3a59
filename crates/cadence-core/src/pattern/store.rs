use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::detect::dates::{format_iso_date, parse_transaction_date};
use crate::detect::frequency::Frequency;
use crate::pattern::types::{PatternFilter, PatternStatus, RecurringPattern};
use crate::state::map_sqlite_error;
use crate::{CoreError, CoreResult};

const PATTERN_COLUMNS: &str = "pattern_id,
    space_id,
    account_id,
    merchant_key,
    display_name,
    frequency,
    expected_amount,
    amount_tolerance,
    status,
    first_seen_at,
    last_seen_at,
    next_expected_at,
    occurrences,
    confidence,
    linked_txn_ids,
    created_at,
    updated_at";

/// Idempotent write keyed by `(space_id, account_id, merchant_key)`.
///
/// A conflicting insert refreshes the detection-owned fields but leaves
/// `pattern_id`, `status` and `created_at` alone, so two overlapping runs
/// for the same space converge to one row and user-owned state survives.
pub fn upsert(conn: &Connection, db_path: &Path, pattern: &RecurringPattern) -> CoreResult<()> {
    let linked = serde_json::to_string(&pattern.linked_txn_ids)
        .map_err(|error| CoreError::internal_serialization(&error.to_string()))?;

    conn.execute(
        "INSERT INTO internal_recurring_patterns (
            pattern_id,
            space_id,
            account_id,
            merchant_key,
            display_name,
            frequency,
            expected_amount,
            amount_tolerance,
            status,
            first_seen_at,
            last_seen_at,
            next_expected_at,
            occurrences,
            confidence,
            linked_txn_ids,
            created_at,
            updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
         ON CONFLICT (space_id, account_id, merchant_key) DO UPDATE SET
            display_name = excluded.display_name,
            frequency = excluded.frequency,
            expected_amount = excluded.expected_amount,
            amount_tolerance = excluded.amount_tolerance,
            first_seen_at = excluded.first_seen_at,
            last_seen_at = excluded.last_seen_at,
            next_expected_at = excluded.next_expected_at,
            occurrences = excluded.occurrences,
            confidence = excluded.confidence,
            linked_txn_ids = excluded.linked_txn_ids,
            updated_at = excluded.updated_at",
        params![
            &pattern.pattern_id,
            &pattern.space_id,
            &pattern.account_id,
            &pattern.merchant_key,
            &pattern.display_name,
            pattern.frequency.as_str(),
            pattern.expected_amount,
            pattern.amount_tolerance,
            pattern.status.as_str(),
            format_iso_date(&pattern.first_seen_at),
            format_iso_date(&pattern.last_seen_at),
            format_iso_date(&pattern.next_expected_at),
            pattern.occurrences,
            pattern.confidence,
            linked,
            pattern.created_at,
            pattern.updated_at,
        ],
    )
    .map_err(|error| map_sqlite_error(db_path, &error))?;

    Ok(())
}

pub fn get(
    conn: &Connection,
    db_path: &Path,
    pattern_id: &str,
) -> CoreResult<Option<RecurringPattern>> {
    let sql = format!(
        "SELECT {PATTERN_COLUMNS} FROM internal_recurring_patterns WHERE pattern_id = ?1"
    );
    let raw = conn
        .query_row(&sql, params![pattern_id], raw_pattern_row)
        .optional()
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    match raw {
        Some(row) => Ok(Some(pattern_from_raw(db_path, row)?)),
        None => Ok(None),
    }
}

pub fn find_by_account_and_key(
    conn: &Connection,
    db_path: &Path,
    space_id: &str,
    account_id: &str,
    merchant_key: &str,
) -> CoreResult<Option<RecurringPattern>> {
    let sql = format!(
        "SELECT {PATTERN_COLUMNS} FROM internal_recurring_patterns
         WHERE space_id = ?1 AND account_id = ?2 AND merchant_key = ?3"
    );
    let raw = conn
        .query_row(&sql, params![space_id, account_id, merchant_key], raw_pattern_row)
        .optional()
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    match raw {
        Some(row) => Ok(Some(pattern_from_raw(db_path, row)?)),
        None => Ok(None),
    }
}

pub fn list_by_space(
    conn: &Connection,
    db_path: &Path,
    space_id: &str,
    filter: &PatternFilter,
) -> CoreResult<Vec<RecurringPattern>> {
    let sql = format!(
        "SELECT {PATTERN_COLUMNS} FROM internal_recurring_patterns
         WHERE space_id = ?1
           AND (?2 IS NULL OR status = ?2)
           AND (?3 = 1 OR ?2 IS NOT NULL OR status <> 'detected')
         ORDER BY next_expected_at ASC, merchant_key ASC, pattern_id ASC"
    );

    let status_bound = filter.status.map(PatternStatus::as_str);
    let include_detected = i64::from(filter.include_detected);

    let mut statement = conn
        .prepare(&sql)
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    let rows_iter = statement
        .query_map(params![space_id, status_bound, include_detected], raw_pattern_row)
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut patterns = Vec::new();
    for row in rows_iter {
        let raw = row.map_err(|error| map_sqlite_error(db_path, &error))?;
        patterns.push(pattern_from_raw(db_path, raw)?);
    }
    Ok(patterns)
}

/// Returns false when no row matched the id.
pub fn set_status(
    conn: &Connection,
    db_path: &Path,
    pattern_id: &str,
    status: PatternStatus,
    now: i64,
) -> CoreResult<bool> {
    let changed = conn
        .execute(
            "UPDATE internal_recurring_patterns
             SET status = ?2, updated_at = ?3
             WHERE pattern_id = ?1",
            params![pattern_id, status.as_str(), now],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    Ok(changed > 0)
}

pub fn delete(conn: &Connection, db_path: &Path, pattern_id: &str) -> CoreResult<bool> {
    let changed = conn
        .execute(
            "DELETE FROM internal_recurring_patterns WHERE pattern_id = ?1",
            params![pattern_id],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    Ok(changed > 0)
}

type RawPatternRow = (
    String,
    String,
    String,
    String,
    String,
    String,
    f64,
    f64,
    String,
    String,
    String,
    String,
    i64,
    f64,
    String,
    i64,
    i64,
);

fn raw_pattern_row(row: &Row<'_>) -> rusqlite::Result<RawPatternRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
        row.get(11)?,
        row.get(12)?,
        row.get(13)?,
        row.get(14)?,
        row.get(15)?,
        row.get(16)?,
    ))
}

fn pattern_from_raw(db_path: &Path, raw: RawPatternRow) -> CoreResult<RecurringPattern> {
    let (
        pattern_id,
        space_id,
        account_id,
        merchant_key,
        display_name,
        frequency,
        expected_amount,
        amount_tolerance,
        status,
        first_seen_at,
        last_seen_at,
        next_expected_at,
        occurrences,
        confidence,
        linked_txn_ids,
        created_at,
        updated_at,
    ) = raw;

    let frequency =
        Frequency::parse_str(&frequency).ok_or_else(|| CoreError::store_corrupt(db_path))?;
    let status =
        PatternStatus::parse_str(&status).ok_or_else(|| CoreError::store_corrupt(db_path))?;
    let first_seen_at =
        parse_transaction_date(&first_seen_at).ok_or_else(|| CoreError::store_corrupt(db_path))?;
    let last_seen_at =
        parse_transaction_date(&last_seen_at).ok_or_else(|| CoreError::store_corrupt(db_path))?;
    let next_expected_at = parse_transaction_date(&next_expected_at)
        .ok_or_else(|| CoreError::store_corrupt(db_path))?;
    let linked_txn_ids: Vec<String> = serde_json::from_str(&linked_txn_ids)
        .map_err(|error| CoreError::internal_serialization(&error.to_string()))?;

    Ok(RecurringPattern {
        pattern_id,
        space_id,
        account_id,
        merchant_key,
        display_name,
        frequency,
        expected_amount,
        amount_tolerance,
        status,
        first_seen_at,
        last_seen_at,
        next_expected_at,
        occurrences,
        confidence,
        linked_txn_ids,
        created_at,
        updated_at,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::Builder;

    use crate::detect::frequency::Frequency;
    use crate::pattern::types::{PatternFilter, PatternStatus, RecurringPattern};
    use crate::setup::ensure_initialized_at;
    use crate::state::open_connection;

    use super::{list_by_space, upsert};

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap_or(NaiveDate::MIN)
    }

    fn stored_pattern(pattern_id: &str, space_id: &str, status: PatternStatus) -> RecurringPattern {
        RecurringPattern {
            pattern_id: pattern_id.to_string(),
            space_id: space_id.to_string(),
            account_id: "acct".to_string(),
            merchant_key: pattern_id.to_string(),
            display_name: pattern_id.to_uppercase(),
            frequency: Frequency::Monthly,
            expected_amount: -12.0,
            amount_tolerance: 1.0,
            status,
            first_seen_at: date("2026-01-01"),
            last_seen_at: date("2026-05-01"),
            next_expected_at: date("2026-06-01"),
            occurrences: 5,
            confidence: 0.9,
            linked_txn_ids: Vec::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn listing_binds_the_space_and_honors_the_detected_gate() {
        let dir = Builder::new().prefix("cadence-store").tempdir_in("/tmp");
        assert!(dir.is_ok());
        let Ok(dir) = dir else {
            return;
        };

        let setup = ensure_initialized_at(dir.path());
        assert!(setup.is_ok());
        let Ok(setup) = setup else {
            return;
        };
        let conn = open_connection(&setup.db_path);
        assert!(conn.is_ok());
        let Ok(conn) = conn else {
            return;
        };

        let rows = [
            stored_pattern("netflix", "alpha", PatternStatus::Detected),
            stored_pattern("gym", "alpha", PatternStatus::Confirmed),
            stored_pattern("spotify", "beta", PatternStatus::Confirmed),
        ];
        for row in &rows {
            assert!(upsert(&conn, &setup.db_path, row).is_ok());
        }

        let all_alpha = list_by_space(&conn, &setup.db_path, "alpha", &PatternFilter::all());
        assert!(all_alpha.is_ok());
        if let Ok(patterns) = all_alpha {
            let ids: Vec<&str> = patterns.iter().map(|p| p.pattern_id.as_str()).collect();
            assert_eq!(ids, vec!["gym", "netflix"]);
        }

        let default_alpha = list_by_space(
            &conn,
            &setup.db_path,
            "alpha",
            &PatternFilter::default(),
        );
        assert!(default_alpha.is_ok());
        if let Ok(patterns) = default_alpha {
            let ids: Vec<&str> = patterns.iter().map(|p| p.pattern_id.as_str()).collect();
            assert_eq!(ids, vec!["gym"]);
        }

        let beta = list_by_space(&conn, &setup.db_path, "beta", &PatternFilter::all());
        assert!(beta.is_ok());
        if let Ok(patterns) = beta {
            assert_eq!(patterns.len(), 1);
            assert_eq!(patterns[0].pattern_id, "spotify");
        }
    }
}
