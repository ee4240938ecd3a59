use std::fs;
use std::path::{Path, PathBuf};

use cadence_core::commands::detect::{self, DetectRunOptions};
use cadence_core::commands::ingest::{self, IngestRunOptions};
use cadence_core::commands::patterns::{self, ListOptions};
use serde_json::{Value, json};
use tempfile::{Builder, TempDir};

pub const TEST_SPACE: &str = "test-space";

pub fn temp_home_in_tmp(prefix: &str) -> std::io::Result<(TempDir, PathBuf)> {
    let dir = Builder::new().prefix(prefix).tempdir_in("/tmp")?;
    let home = dir.path().join("cadence-home");
    fs::create_dir_all(&home)?;
    Ok((dir, home))
}

pub fn ingest_rows(home: &Path, rows: &[Value]) {
    let temp_dir = Builder::new()
        .prefix("cadence-ingest-fixture")
        .tempdir_in("/tmp");
    assert!(temp_dir.is_ok());
    if let Ok(dir) = temp_dir {
        let fixture = write_fixture_json(dir.path(), "rows.json", rows);
        assert!(fixture.is_ok());
        if let Ok(path) = fixture {
            let result = ingest::run_with_options(IngestRunOptions {
                space_id: TEST_SPACE.to_string(),
                path: path.display().to_string(),
                home_override: Some(home),
            });
            assert!(result.is_ok());
        }
    }
}

pub fn detect_payload(home: &Path) -> Value {
    let result = detect::run_with_options(DetectRunOptions {
        space_id: TEST_SPACE.to_string(),
        account_id: None,
        from: None,
        to: None,
        home_override: Some(home),
    });
    assert!(result.is_ok());
    if let Ok(success) = result {
        let payload = serde_json::to_value(success);
        assert!(payload.is_ok());
        if let Ok(value) = payload {
            return value;
        }
    }
    Value::Null
}

pub fn list_patterns(home: &Path) -> Vec<Value> {
    let result = patterns::list_with_options(ListOptions {
        space_id: TEST_SPACE.to_string(),
        status: None,
        include_detected: true,
        home_override: Some(home),
    });
    assert!(result.is_ok());
    if let Ok(success) = result {
        let payload = serde_json::to_value(success);
        assert!(payload.is_ok());
        if let Ok(value) = payload {
            return value["data"]["patterns"]
                .as_array()
                .cloned()
                .unwrap_or_default();
        }
    }
    Vec::new()
}

pub fn pattern_id_for_merchant(home: &Path, merchant_key: &str) -> Option<String> {
    list_patterns(home)
        .iter()
        .find(|row| row.get("merchant_key").and_then(Value::as_str) == Some(merchant_key))
        .and_then(|row| row.get("pattern_id").and_then(Value::as_str))
        .map(std::string::ToString::to_string)
}

pub fn transaction(
    account_id: &str,
    posted_at: &str,
    amount: f64,
    description: &str,
    merchant: Option<&str>,
) -> Value {
    json!({
        "account_id": account_id,
        "posted_at": posted_at,
        "amount": amount,
        "description": description,
        "merchant": merchant,
    })
}

/// One transaction per month for `months` months, anchored on `day`.
pub fn monthly_transactions(
    account_id: &str,
    year: i32,
    start_month: u32,
    months: u32,
    day: u32,
    amount: f64,
    description: &str,
    merchant: Option<&str>,
) -> Vec<Value> {
    let mut rows = Vec::new();
    for offset in 0..months {
        let month = start_month + offset;
        let (year, month) = if month > 12 {
            (year + 1, month - 12)
        } else {
            (year, month)
        };
        let posted_at = format!("{year:04}-{month:02}-{day:02}");
        rows.push(transaction(account_id, &posted_at, amount, description, merchant));
    }
    rows
}

pub fn run_detection_scenario(rows: &[Value]) -> (Option<(TempDir, PathBuf)>, Value) {
    let temp = temp_home_in_tmp("cadence-detect-scenario");
    assert!(temp.is_ok());
    if let Ok((dir, home)) = temp {
        ingest_rows(&home, rows);
        let payload = detect_payload(&home);
        return (Some((dir, home)), payload);
    }
    (None, Value::Null)
}

pub fn candidate_exists(payload: &Value, merchant_key: &str, frequency: &str) -> bool {
    payload["data"]["candidates"]
        .as_array()
        .is_some_and(|rows| {
            rows.iter().any(|row| {
                row.get("merchant_key").and_then(Value::as_str) == Some(merchant_key)
                    && row.get("frequency").and_then(Value::as_str) == Some(frequency)
            })
        })
}

fn write_fixture_json(base: &Path, name: &str, rows: &[Value]) -> std::io::Result<PathBuf> {
    let path = base.join(name);
    let body = serde_json::to_string_pretty(rows).map_err(std::io::Error::other)?;
    fs::write(&path, body)?;
    Ok(path)
}
